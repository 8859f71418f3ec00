pub mod command;
pub mod locker;

// Trait-based abstractions for testability
pub mod executor;

pub use command::{expand_placeholders, CommandLine, ProcessError};
pub use executor::{CommandExecutor, RealExecutor};

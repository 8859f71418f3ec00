use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cloud_backup::config::{self, Config, UploadConfig};
use cloud_backup::managers::backup::{log_failure, BackupManager};
use cloud_backup::managers::logging::{self, LoggingConfig};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cloud-backup")]
#[command(about = "Dump a database, archive it and upload the archive", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "/etc/cloud-backup/config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump, archive, upload and clean up
    Run {
        /// Print the run report as JSON on success
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file and required tools
    Validate,

    /// Show what a run would do without running it
    Plan,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // If no command specified, show the plan
    let command = cli.command.unwrap_or(Commands::Plan);

    match command {
        Commands::Run { json } => {
            let config = config::load_config(&cli.config)
                .with_context(|| format!("Failed to load {:?}", cli.config))?;

            // Setup logging with file rotation (must keep guard alive)
            let log_guard = logging::init_logging(&LoggingConfig::from_config(&config.global))?;

            let manager = BackupManager::from_config(&config);
            let succeeded = match manager.run() {
                Ok(report) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&report)?);
                    } else {
                        println!("✓ Backup uploaded: {}", report.filename);
                    }
                    true
                }
                Err(e) => {
                    log_failure(&e);
                    eprintln!("✗ {}", e);
                    false
                }
            };

            // Flush the file log before a non-zero exit
            drop(log_guard);
            if !succeeded {
                std::process::exit(1);
            }
        }

        Commands::Validate => {
            logging::init_console_logging();
            handle_validate(&cli.config)?;
        }

        Commands::Plan => {
            logging::init_console_logging();
            let config = config::load_config(&cli.config)
                .with_context(|| format!("Failed to load {:?}", cli.config))?;
            print_plan(&config);
        }
    }

    Ok(())
}

fn handle_validate(path: &Path) -> Result<()> {
    println!("Validating configuration: {}", path.display());

    let config = config::load_config(path)
        .with_context(|| format!("Failed to load {:?}", path))?;
    println!("✓ Configuration is valid");

    let mut programs = vec!["tar".to_string(), config.database.program.clone()];
    if let UploadConfig::Command { ref program, .. } = config.upload {
        programs.push(program.clone());
    }

    let missing: Vec<&String> = programs
        .iter()
        .filter(|program| which::which(program.as_str()).is_err())
        .collect();

    for program in &programs {
        if missing.contains(&program) {
            println!("✗ {} not found in PATH", program);
        } else {
            println!("✓ {} found", program);
        }
    }

    for folder in &config.processor.folders {
        if !config::expand_tilde(folder).is_dir() {
            println!("⚠️  Folder does not exist and will be skipped: {}", folder.display());
        }
    }

    if !missing.is_empty() {
        anyhow::bail!("{} required program(s) missing", missing.len());
    }

    Ok(())
}

fn print_plan(config: &Config) {
    let manager = BackupManager::from_config(config);
    let plan = manager.plan();

    println!("=== Backup plan ===\n");
    println!("Working directory: {}", plan.job.base_path.display());
    println!("Dump directory:    {}", plan.job.data_path.display());
    println!("Dump command:      {}", plan.dump);

    if plan.folders.is_empty() {
        println!("Folders:           (none)");
    } else {
        println!("Folders:");
        for folder in &plan.folders {
            println!("  {}", folder.display());
        }
    }

    println!("Archive:           {}", plan.archive.archive_path.display());
    println!("Archive command:   {}", plan.archive.to_command());
    println!("Upload:            {} -> {}", plan.client, plan.target);
    println!(
        "Timeout:           {}",
        config
            .global
            .timeout_seconds
            .map(|s| format!("{}s", s))
            .unwrap_or_else(|| "none".to_string())
    );
    println!("Locking:           {}", if config.global.lock { "yes" } else { "no" });
}

//! Reading archives produced by real `tar` runs

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Entry paths of a gzip-compressed tar archive, without the leading `./`
/// and trailing `/`; the root entry is dropped
pub fn archive_entries(path: &Path) -> anyhow::Result<Vec<String>> {
    let file = File::open(path)?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));

    let mut entries = Vec::new();
    for entry in archive.entries()? {
        let entry = entry?;
        let name = entry.path()?.to_string_lossy().to_string();
        let name = name.trim_start_matches("./").trim_end_matches('/').to_string();
        if !name.is_empty() && name != "." {
            entries.push(name);
        }
    }

    entries.sort();
    Ok(entries)
}

/// Content of one file inside a gzip-compressed tar archive
pub fn archive_file(path: &Path, name: &str) -> anyhow::Result<String> {
    let file = File::open(path)?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_name = entry.path()?.to_string_lossy().to_string();
        if entry_name.trim_start_matches("./") == name {
            let mut content = String::new();
            entry.read_to_string(&mut content)?;
            return Ok(content);
        }
    }

    anyhow::bail!("{} not found in {}", name, path.display())
}

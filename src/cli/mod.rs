pub mod pack;
pub mod unflatten;

use std::path::{Path, PathBuf};
use std::process;

use texpack::PackError;

/// Derive the fixed-suffix sibling output path next to the input file.
pub fn sibling_output(input: &Path, name: &str) -> PathBuf {
    input.parent().unwrap_or(Path::new(".")).join(name)
}

pub fn read_json(path: &Path) -> serde_json::Value {
    match load(path) {
        Ok(json) => json,
        Err(e) => fatal(e),
    }
}

fn load(path: &Path) -> texpack::Result<serde_json::Value> {
    let content = std::fs::read_to_string(path).map_err(|e| PackError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(serde_json::from_str(&content)?)
}

pub fn write_json(path: &Path, json: &serde_json::Value) {
    if let Err(e) = store(path, json) {
        fatal(e);
    }
}

fn store(path: &Path, json: &serde_json::Value) -> texpack::Result<()> {
    let content = serde_json::to_string(json)?;
    std::fs::write(path, content).map_err(|e| PackError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn fatal(err: impl std::fmt::Display) -> ! {
    eprintln!("error: {err}");
    process::exit(1);
}

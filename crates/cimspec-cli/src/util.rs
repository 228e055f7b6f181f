use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CliError, ExitStatus};

#[derive(Clone, Copy, Debug, Default)]
pub struct Verbosity {
    pub json: bool,
    pub verbose: bool,
}

pub fn validate_project(value: &str) -> Result<(), CliError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CliError::new(
            "project name must not be empty",
            ExitStatus::Usage,
        ));
    }
    if trimmed
        .chars()
        .any(|ch| !(ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'))
    {
        return Err(CliError::new(
            format!("project name '{trimmed}' must be alphanumeric with '-' or '_' separators"),
            ExitStatus::Usage,
        ));
    }
    Ok(())
}

/// Writes rendered output, creating missing parent directories.
pub fn write_output(path: &Path, content: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|err| CliError::from(err).within(parent.display()))?;
    }
    fs::write(path, content).map_err(|err| CliError::from(err).within(path.display()))
}

pub fn path_arg(matches: &clap::ArgMatches, id: &str) -> Option<PathBuf> {
    matches.get_one::<String>(id).map(PathBuf::from)
}

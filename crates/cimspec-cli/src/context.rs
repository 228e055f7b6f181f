use std::path::PathBuf;

use cimspec::StyleTable;

use crate::error::CliError;
use crate::util::{self, Verbosity};

pub const DEFAULT_PROJECT: &str = "cmip6";

/// Settings shared by every subcommand, resolved once from the global flags.
pub struct CliSession {
    pub project: String,
    pub styles: StyleTable,
    pub style_source: Option<PathBuf>,
    pub verbosity: Verbosity,
}

impl CliSession {
    pub fn bootstrap(
        project: Option<String>,
        style_override: Option<PathBuf>,
        verbosity: Verbosity,
    ) -> Result<Self, CliError> {
        let project = project.unwrap_or_else(|| DEFAULT_PROJECT.to_string());
        util::validate_project(&project)?;

        let styles = match &style_override {
            Some(path) => {
                StyleTable::from_path(path).map_err(|err| CliError::reading(err, path))?
            }
            None => StyleTable::embedded()?,
        };

        Ok(Self {
            project: project.trim().to_string(),
            styles,
            style_source: style_override,
            verbosity,
        })
    }
}

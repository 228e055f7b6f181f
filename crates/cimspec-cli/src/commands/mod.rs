use std::path::Path;

use cimspec::{Generator, Specialization, load_path};
use serde::Serialize;

use crate::error::{CliError, ExitStatus};
use crate::util;

pub mod json;
pub mod mindmap;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandResult {
    Rendered {
        format: &'static str,
        specialization: String,
        nodes: usize,
        bytes: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
}

impl CommandResult {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            CommandResult::Rendered { .. } => ExitStatus::Ok,
        }
    }
}

fn input_arg() -> clap::Arg {
    clap::Arg::new("input")
        .value_name("INPUT")
        .required(true)
        .help("Specialization document (YAML or JSON)")
}

fn output_arg() -> clap::Arg {
    clap::Arg::new("output")
        .long("output")
        .short('o')
        .value_name("PATH")
        .help("Write output to PATH instead of stdout")
}

fn load_input(matches: &clap::ArgMatches) -> Result<Specialization, CliError> {
    let input = util::path_arg(matches, "input")
        .ok_or_else(|| CliError::new("missing INPUT argument", ExitStatus::Usage))?;
    let spec = load_path(&input).map_err(|err| CliError::reading(err, &input))?;
    tracing::debug!(input = %input.display(), nodes = spec.len(), "loaded specialization");
    Ok(spec)
}

/// Writes `content` to `--output` when given, otherwise hands it back for stdout.
fn finish(
    format: &'static str,
    spec: &Specialization,
    matches: &clap::ArgMatches,
    content: String,
) -> Result<CommandResult, CliError> {
    let specialization = spec
        .root_node()
        .map(|root| root.header.id.clone())
        .map_err(cimspec::CimspecError::from)?;
    let bytes = content.len();
    let (path, content) = match util::path_arg(matches, "output") {
        Some(path) => {
            util::write_output(&path, &content)?;
            (Some(display(&path)), None)
        }
        None => (None, Some(content)),
    };

    Ok(CommandResult::Rendered {
        format,
        specialization,
        nodes: spec.len(),
        bytes,
        path,
        content,
    })
}

fn format_of<'a, G: Generator<'a>>(_: &G) -> &'static str {
    G::FORMAT
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

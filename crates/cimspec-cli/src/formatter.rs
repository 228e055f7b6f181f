use std::io::{self, Write};
use std::process::ExitCode;

use serde_json::json;

use crate::commands::CommandResult;
use crate::error::CliError;

pub enum OutputFormat {
    Text,
    Json,
}

/// Prints a `CommandResult` and converts it into the process exit code.
///
/// In text mode rendered content goes to stdout verbatim; when it was written to a file a
/// one-line summary is printed instead. JSON mode emits a single JSON object per result.
pub fn emit_result(result: CommandResult, format: OutputFormat) -> Result<ExitCode, CliError> {
    match format {
        OutputFormat::Text => print_text(&result)?,
        OutputFormat::Json => print_json(&result)?,
    };
    Ok(ExitCode::from(result.exit_status().code()))
}

fn print_text(result: &CommandResult) -> Result<(), CliError> {
    match result {
        CommandResult::Rendered {
            content: Some(content),
            ..
        } => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            stdout.flush()?;
        }
        CommandResult::Rendered {
            format,
            specialization,
            nodes,
            bytes,
            path,
            content: None,
        } => {
            println!(
                "Rendered {format} for '{specialization}' ({nodes} nodes, {bytes} bytes) to {}",
                path.as_deref().unwrap_or("stdout")
            );
        }
    }
    Ok(())
}

fn print_json(result: &CommandResult) -> Result<(), CliError> {
    let payload = json!(result);
    println!("{payload}");
    Ok(())
}

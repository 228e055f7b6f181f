use std::ffi::OsString;
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::commands;
use crate::context::{CliSession, DEFAULT_PROJECT};
use crate::error::{CliError, ExitStatus};
use crate::formatter::{OutputFormat, emit_result};
use crate::util::{self, Verbosity};

const NAME: &str = "cimspec";

pub fn run() -> ExitCode {
    init_tracing();
    match run_cli(std::env::args()) {
        Ok(code) => code,
        Err(err) => {
            err.print();
            err.exit_code()
        }
    }
}

/// Parses CLI arguments, resolves the shared session, and dispatches to the selected
/// generator. Returns a POSIX `sysexits`-compatible `ExitCode`.
pub fn run_cli<I, S>(args: I) -> Result<ExitCode, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let command = build_cli();
    let matches = command.try_get_matches_from(args)?;

    let verbosity = Verbosity {
        json: matches.get_flag("json"),
        verbose: matches.get_flag("verbose"),
    };
    let output = if verbosity.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let session = CliSession::bootstrap(
        matches.get_one::<String>("project").cloned(),
        util::path_arg(&matches, "style"),
        verbosity,
    )?;
    if session.verbosity.verbose {
        let styles = session
            .style_source
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "embedded".into());
        tracing::info!(
            project = %session.project,
            styles = %styles,
            sections = session.styles.len(),
            "resolved session"
        );
    }

    let result = dispatch(&session, &matches)?;
    emit_result(result, output)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn build_cli() -> Command {
    Command::new(NAME)
        .about("Render CIM specializations as JSON trees or mindmaps")
        .arg(
            Arg::new("project")
                .long("project")
                .value_name("NAME")
                .global(true)
                .help(format!(
                    "Project the specialization belongs to. Defaults to {DEFAULT_PROJECT}."
                )),
        )
        .arg(
            Arg::new("style")
                .long("style")
                .value_name("PATH")
                .global(true)
                .help("YAML style table overriding the embedded mindmap styles."),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Emit a JSON result object instead of raw output."),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Log the resolved project and style source."),
        )
        .subcommand_required(true)
        .subcommand(commands::json::command())
        .subcommand(commands::mindmap::command())
}

fn dispatch(
    session: &CliSession,
    matches: &ArgMatches,
) -> Result<commands::CommandResult, CliError> {
    match matches.subcommand() {
        Some(("json", sub)) => commands::json::run(session, sub),
        Some(("mindmap", sub)) => commands::mindmap::run(session, sub),
        _ => Err(CliError::new("missing command", ExitStatus::Usage)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn missing_subcommand_is_a_usage_error() {
        let err = run_cli(["cimspec"]).unwrap_err();
        assert_eq!(err.status(), ExitStatus::Usage);
    }

    #[test]
    fn unreadable_style_table_is_an_io_error() {
        let err = run_cli([
            "cimspec",
            "--style",
            "/nonexistent/styles.yaml",
            "mindmap",
            "ocean.yaml",
        ])
        .unwrap_err();
        assert_eq!(err.status(), ExitStatus::Io);
        assert!(err.to_string().starts_with("/nonexistent/styles.yaml: "));
    }
}

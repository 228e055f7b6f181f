use cimspec::{Generator, MindmapGenerator};
use clap::Command;

use crate::commands::{self, CommandResult};
use crate::context::CliSession;
use crate::error::CliError;

pub fn command() -> Command {
    Command::new("mindmap")
        .about("Render a specialization as a FreeMind mindmap")
        .arg(commands::input_arg())
        .arg(commands::output_arg())
}

pub fn run(session: &CliSession, matches: &clap::ArgMatches) -> Result<CommandResult, CliError> {
    let spec = commands::load_input(matches)?;

    let mut generator =
        MindmapGenerator::new(session.project.as_str(), &spec, &session.styles);
    let content = generator.generate()?;
    tracing::debug!(map_nodes = generator.map().len(), "assembled mindmap");
    commands::finish(commands::format_of(&generator), &spec, matches, content)
}

use cimspec::{Generator, JsonGenerator, JsonTemplate};
use clap::{Arg, ArgAction, Command};

use crate::commands::{self, CommandResult};
use crate::context::CliSession;
use crate::error::CliError;
use crate::util;

pub fn command() -> Command {
    Command::new("json")
        .about("Render a specialization as a JSON document tree")
        .arg(commands::input_arg())
        .arg(commands::output_arg())
        .arg(
            Arg::new("template")
                .long("template")
                .value_name("PATH")
                .help("Wrapper template; its TOPIC placeholder receives the JSON document"),
        )
        .arg(
            Arg::new("bare")
                .long("bare")
                .action(ArgAction::SetTrue)
                .conflicts_with("template")
                .help("Emit the bare JSON document without a wrapper"),
        )
}

pub fn run(session: &CliSession, matches: &clap::ArgMatches) -> Result<CommandResult, CliError> {
    let spec = commands::load_input(matches)?;

    let template = if matches.get_flag("bare") {
        JsonTemplate::bare()
    } else {
        match util::path_arg(matches, "template") {
            Some(path) => JsonTemplate::from_path(&path)
                .map_err(|err| CliError::reading(err, &path))?,
            None => JsonTemplate::default(),
        }
    };

    let mut generator =
        JsonGenerator::new(session.project.as_str(), &spec).with_template(template);
    let content = generator.generate()?;
    commands::finish(commands::format_of(&generator), &spec, matches, content)
}

use crate::app::cli::{help_text, parse_cli_verb, CliVerb};

pub mod resolve;
pub mod resume;
pub mod sections;
pub mod state;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    if args.is_empty() {
        return Ok(help_text());
    }

    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Resolve => resolve::cmd_resolve(&args[1..]),
        CliVerb::Resume => resume::cmd_resume(&args[1..]),
        CliVerb::State => state::cmd_state(&args[1..]),
        CliVerb::Sections => sections::cmd_sections(&args[1..]),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{}`", args[0])),
    }
}

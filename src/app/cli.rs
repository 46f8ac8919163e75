#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Resolve,
    Resume,
    State,
    Sections,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "resolve" => CliVerb::Resolve,
        "resume" => CliVerb::Resume,
        "state" => CliVerb::State,
        "sections" => CliVerb::Sections,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  resolve <snapshot.json>              Print the step an application snapshot resumes at"
            .to_string(),
        "  resume [application-id]              Load the active application and route to its step"
            .to_string(),
        "  state show                           Show the stored session state".to_string(),
        "  state clear                          Forget the active application".to_string(),
        "  state set <field> <value>            Set deal-id|borrower-id|co-borrower-id|form-step|loan-purpose"
            .to_string(),
        "  state progress <deal|borrower> <section> <true|false>".to_string(),
        "                                       Mark a section complete or incomplete".to_string(),
        "  state sync <payload.json>            Copy identifiers from an application response"
            .to_string(),
        "  state complete <section> <true|false>".to_string(),
        "                                       Mark a deal section and report it to the API"
            .to_string(),
        "  state sync-progress [payload.json]   Replace deal progress from a file or the API"
            .to_string(),
        "  sections <step>                      Show the sidebar outline for a step".to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    cli_help_lines().join("\n")
}

use crate::app::command_support::{load_settings, open_store};
use crate::progress::{section_outline, FormStep};

pub fn cmd_sections(args: &[String]) -> Result<String, String> {
    let [step] = args else {
        return Err("usage: sections <step>".to_string());
    };
    let step = FormStep::parse(step)?;
    let settings = load_settings()?;
    let store = open_store(&settings)?;
    let state = store.get();

    let lines: Vec<String> = section_outline(step, state.deal_progress.as_ref())
        .into_iter()
        .map(|entry| {
            format!(
                "{:<9} {:<22} {}",
                entry.status.as_str(),
                entry.section.id(),
                entry.section.title()
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

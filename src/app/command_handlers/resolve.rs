use crate::app::command_support::read_json_file;
use crate::navigation::WizardRoute;
use crate::progress::{resolve_next_step, ApplicationSnapshot};
use crate::shared::ApplicationId;

pub fn cmd_resolve(args: &[String]) -> Result<String, String> {
    let [path] = args else {
        return Err("usage: resolve <snapshot.json>".to_string());
    };
    let payload = read_json_file(path)?;
    let snapshot = ApplicationSnapshot::from_value(&payload);
    let resolution = resolve_next_step(&snapshot);
    let id = ApplicationId::from_json(&payload["id"]);
    let route = WizardRoute::new(resolution.purpose, resolution.step, id);
    Ok(format!(
        "step={}\nroute={}\nrule={}",
        resolution.step,
        route.path(),
        resolution.rule.as_str()
    ))
}

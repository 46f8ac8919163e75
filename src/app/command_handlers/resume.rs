use crate::app::command_support::{load_settings, open_store};
use crate::navigation::{NavigationController, PageOutcome, RouteParams};

pub fn cmd_resume(args: &[String]) -> Result<String, String> {
    let params = match args {
        [] => RouteParams::none(),
        [id] => RouteParams::with_application_id(id.as_str()),
        _ => return Err("usage: resume [application-id]".to_string()),
    };
    let settings = load_settings()?;
    let store = open_store(&settings)?;
    let client = settings.api_client();
    let controller = NavigationController::new(&store, &client, settings.event_log());

    match controller.mount(&params) {
        PageOutcome::Navigate {
            navigation,
            resolution,
        } => Ok(format!(
            "application={}\nstep={}\nroute={}\nrule={}",
            store.get().deal_id.unwrap_or_default(),
            resolution.step,
            navigation.route().path(),
            resolution.rule.as_str()
        )),
        PageOutcome::NoActiveApplication => {
            Ok("no active application; start a new one".to_string())
        }
        PageOutcome::FetchFailed {
            application_id,
            error,
            stale_id_cleared,
        } => {
            let mut message = format!("failed to load application {application_id}: {error}");
            if stale_id_cleared {
                message.push_str("\nstored application id cleared");
            }
            Err(message)
        }
        PageOutcome::AlreadyResolving => Err("resolution already in progress".to_string()),
    }
}

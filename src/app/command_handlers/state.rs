use crate::app::command_support::{
    format_state, load_settings, open_store, parse_bool_arg, read_json_file, CliStore,
};
use crate::config::WizardSettings;
use crate::navigation::{NavigationController, ProgressRefresh, RemoteSave, RouteParams};
use crate::progress::{FormStep, LoanPurpose};
use crate::shared::ApplicationId;
use crate::state::ProgressScope;

const STATE_USAGE: &str =
    "usage: state show|clear|set <field> <value>|progress <scope> <section> <bool>|complete <section> <bool>|sync <payload.json>|sync-progress [payload.json]";

pub fn cmd_state(args: &[String]) -> Result<String, String> {
    let Some(action) = args.first() else {
        return Err(STATE_USAGE.to_string());
    };
    let settings = load_settings()?;
    let store = open_store(&settings)?;

    match (action.as_str(), &args[1..]) {
        ("show", []) => Ok(show(&store)),
        ("clear", []) => {
            store.clear();
            Ok(show(&store))
        }
        ("set", [field, value]) => {
            set_field(&store, field, value)?;
            Ok(show(&store))
        }
        ("progress", [scope, section, completed]) => {
            let scope = ProgressScope::parse(scope)?;
            store.update_progress(scope, section_arg(section)?, parse_bool_arg(completed)?);
            Ok(show(&store))
        }
        ("complete", [section, completed]) => {
            complete_section(&settings, &store, section_arg(section)?, parse_bool_arg(completed)?)
        }
        ("sync", [path]) => {
            store.sync_from_api(&read_json_file(path)?);
            Ok(show(&store))
        }
        ("sync-progress", []) => refresh_progress(&settings, &store),
        ("sync-progress", [path]) => {
            store.sync_progress_from_api(&read_json_file(path)?);
            Ok(show(&store))
        }
        _ => Err(STATE_USAGE.to_string()),
    }
}

fn section_arg(section: &str) -> Result<&str, String> {
    let section = section.trim();
    if section.is_empty() {
        return Err("section must be non-empty".to_string());
    }
    Ok(section)
}

fn refresh_progress(settings: &WizardSettings, store: &CliStore) -> Result<String, String> {
    let client = settings.api_client();
    let controller = NavigationController::new(store, &client, settings.event_log());
    match controller.refresh_progress(&RouteParams::none()) {
        ProgressRefresh::Synced(_) => Ok(show(store)),
        ProgressRefresh::NoActiveApplication => {
            Err("no active application; set deal-id first".to_string())
        }
        ProgressRefresh::FetchFailed {
            application_id,
            error,
            stale_id_cleared,
        } => {
            let mut message = format!("failed to load progress for {application_id}: {error}");
            if stale_id_cleared {
                message.push_str("\nstored application id cleared");
            }
            Err(message)
        }
    }
}

fn complete_section(
    settings: &WizardSettings,
    store: &CliStore,
    section: &str,
    completed: bool,
) -> Result<String, String> {
    let client = settings.api_client();
    let controller = NavigationController::new(store, &client, settings.event_log());
    let update = controller.complete_section(section, completed, &RouteParams::none());
    let remote = match update.remote {
        RemoteSave::Saved => "saved".to_string(),
        RemoteSave::NoActiveApplication => "skipped".to_string(),
        RemoteSave::Failed(err) => format!("failed: {err}"),
    };
    Ok(format!("{}\nremote={remote}", show(store)))
}

fn show(store: &CliStore) -> String {
    format_state(&store.get(), store.loan_purpose().as_deref())
}

fn set_field(store: &CliStore, field: &str, value: &str) -> Result<(), String> {
    match field {
        "deal-id" => {
            store.set_deal_id(ApplicationId::parse(value)?.as_str());
        }
        "borrower-id" => {
            store.set_borrower_id(value.trim());
        }
        "co-borrower-id" => {
            store.set_co_borrower_id(value.trim());
        }
        "form-step" => {
            store.set_current_form_step(FormStep::parse(value)?.as_str());
        }
        "loan-purpose" => {
            store.set_loan_purpose(LoanPurpose::classify(Some(value)).as_str());
        }
        other => {
            return Err(format!(
                "unknown state field `{other}`; expected deal-id, borrower-id, co-borrower-id, form-step or loan-purpose"
            ))
        }
    }
    Ok(())
}

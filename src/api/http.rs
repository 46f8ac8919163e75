use super::{ApplicationDataSource, FetchError};
use crate::shared::ApplicationId;
use serde_json::{json, Value};

pub const DEFAULT_API_BASE: &str = "http://localhost:8080/api/v1";

#[derive(Debug, Clone)]
pub struct HttpApplicationClient {
    api_base: String,
    token: Option<String>,
}

impl HttpApplicationClient {
    pub fn new(api_base: impl Into<String>, token: Option<String>) -> Self {
        Self {
            api_base: api_base.into(),
            token: token.filter(|value| !value.trim().is_empty()),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, id: &ApplicationId, suffix: &str) -> String {
        format!(
            "{}/urla/applications/{}{}",
            self.api_base.trim_end_matches('/'),
            urlencoding::encode(id.as_str()),
            suffix
        )
    }

    fn authorize(&self, request: ureq::Request) -> ureq::Request {
        match self.token.as_deref() {
            Some(token) => request.set("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }

    fn get_json(&self, id: &ApplicationId, suffix: &str) -> Result<Value, FetchError> {
        let request = self.authorize(ureq::get(&self.endpoint(id, suffix)));
        let response = request.call().map_err(|err| map_ureq_error(id, err))?;
        response
            .into_json::<Value>()
            .map_err(|err| FetchError::Decode(err.to_string()))
    }

    fn send_json(
        &self,
        method: &str,
        id: &ApplicationId,
        suffix: &str,
        body: &Value,
    ) -> Result<(), FetchError> {
        let request = self.authorize(ureq::request(method, &self.endpoint(id, suffix)));
        request
            .send_json(body.clone())
            .map(|_| ())
            .map_err(|err| map_ureq_error(id, err))
    }
}

fn map_ureq_error(id: &ApplicationId, err: ureq::Error) -> FetchError {
    match err {
        ureq::Error::Status(404, _) => FetchError::NotFound {
            id: id.to_string(),
        },
        ureq::Error::Status(status @ (401 | 403), _) => FetchError::Unauthorized { status },
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            FetchError::Status {
                status,
                message: error_message(&body),
            }
        }
        ureq::Error::Transport(transport) => FetchError::Request(transport.to_string()),
    }
}

/// Error bodies look like `{"error": "..."}`; anything else is passed through.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

impl ApplicationDataSource for HttpApplicationClient {
    fn fetch_application(&self, id: &ApplicationId) -> Result<Value, FetchError> {
        self.get_json(id, "")
    }

    fn save_application(&self, id: &ApplicationId, update: &Value) -> Result<(), FetchError> {
        self.send_json("POST", id, "/save", update)
    }

    fn fetch_progress(&self, id: &ApplicationId) -> Result<Value, FetchError> {
        self.get_json(id, "/progress")
    }

    fn update_progress_section(
        &self,
        id: &ApplicationId,
        section: &str,
        complete: bool,
    ) -> Result<(), FetchError> {
        self.send_json(
            "PATCH",
            id,
            "/progress/section",
            &json!({ "section": section, "complete": complete }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_and_encodes_id() {
        let client = HttpApplicationClient::new("http://api.test/v1/", None);
        let id = ApplicationId::parse("42").expect("id");
        assert_eq!(
            client.endpoint(&id, "/progress"),
            "http://api.test/v1/urla/applications/42/progress"
        );
    }

    #[test]
    fn blank_token_is_ignored() {
        let client = HttpApplicationClient::new(DEFAULT_API_BASE, Some("  ".to_string()));
        assert!(client.token.is_none());
    }

    #[test]
    fn error_message_prefers_error_field() {
        assert_eq!(error_message(r#"{"error":"deal not found"}"#), "deal not found");
        assert_eq!(error_message(" upstream timeout "), "upstream timeout");
    }
}

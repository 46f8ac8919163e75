use crate::progress::steps::FormStep;
use crate::shared::identifier_from_json;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Point-in-time read of an application as returned by the API.
///
/// Built leniently: a field with an unexpected type or a blank value is
/// treated as absent, so parsing a snapshot never fails on shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationSnapshot {
    pub id: Option<String>,
    pub loan_purpose: Option<String>,
    pub borrower: Option<BorrowerRecord>,
    pub co_borrower: Option<Value>,
    pub co_borrower_id: Option<String>,
    pub has_co_borrower: Option<bool>,
    pub current_form_step: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BorrowerRecord {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub marital_status: Option<String>,
    pub current_address: Option<Value>,
}

/// JSON presence as the wizard understands it: not null, not a blank string,
/// not an empty object or array.
pub fn value_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(raw) => !raw.trim().is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

fn text_field(object: &Value, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(raw) if !raw.trim().is_empty() => Some(raw.trim().to_string()),
        _ => None,
    }
}

fn present_field(object: &Value, key: &str) -> Option<Value> {
    object.get(key).filter(|value| value_present(value)).cloned()
}

impl BorrowerRecord {
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Some(Self {
            id: value.get("id").and_then(identifier_from_json),
            first_name: text_field(value, "firstName"),
            last_name: text_field(value, "lastName"),
            email: text_field(value, "email"),
            marital_status: text_field(value, "maritalStatus"),
            current_address: present_field(value, "currentAddress"),
        })
    }

    pub fn has_basic_identity(&self) -> bool {
        self.first_name.is_some() && self.last_name.is_some() && self.email.is_some()
    }

    pub fn has_extended_identity(&self) -> bool {
        self.marital_status.is_some() && self.current_address.is_some()
    }
}

impl ApplicationSnapshot {
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: value.get("id").and_then(identifier_from_json),
            loan_purpose: text_field(value, "loanPurpose"),
            borrower: value.get("borrower").and_then(BorrowerRecord::from_value),
            co_borrower: present_field(value, "coBorrower").filter(Value::is_object),
            co_borrower_id: value.get("coBorrowerId").and_then(identifier_from_json),
            has_co_borrower: value.get("hasCoBorrower").and_then(Value::as_bool),
            current_form_step: text_field(value, "currentFormStep"),
        }
    }

    pub fn has_basic_identity(&self) -> bool {
        self.borrower
            .as_ref()
            .is_some_and(BorrowerRecord::has_basic_identity)
    }

    pub fn has_extended_identity(&self) -> bool {
        self.borrower
            .as_ref()
            .is_some_and(BorrowerRecord::has_extended_identity)
    }

    pub fn has_co_borrower_record(&self) -> bool {
        self.co_borrower.is_some() || self.co_borrower_id.is_some()
    }

    pub fn form_step_marker(&self) -> Option<FormStep> {
        self.current_form_step.as_deref().and_then(FormStep::from_marker)
    }

    /// Whether the co-borrower question has an answer on record: an explicit
    /// flag, an existing co-borrower, or a persisted step past the question.
    pub fn co_borrower_answer_recorded(&self) -> bool {
        self.has_co_borrower.is_some()
            || self.has_co_borrower_record()
            || self
                .form_step_marker()
                .is_some_and(|step| step.is_after(FormStep::CoBorrowerQuestion))
    }
}

impl<'de> Deserialize<'de> for ApplicationSnapshot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

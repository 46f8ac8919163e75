//! Storage key names. The deal id keeps its historical `applicationId` key so
//! existing sessions survive upgrades.

pub const DEAL_ID_KEY: &str = "applicationId";
pub const BORROWER_ID_KEY: &str = "borrowerId";
pub const CO_BORROWER_ID_KEY: &str = "coBorrowerId";
pub const CURRENT_FORM_STEP_KEY: &str = "currentFormStep";
pub const DEAL_PROGRESS_KEY: &str = "dealProgress";
pub const BORROWER_PROGRESS_KEY: &str = "borrowerProgress";
pub const LOAN_PURPOSE_KEY: &str = "loanPurpose";

pub const ALL_STATE_KEYS: [&str; 7] = [
    DEAL_ID_KEY,
    BORROWER_ID_KEY,
    CO_BORROWER_ID_KEY,
    CURRENT_FORM_STEP_KEY,
    DEAL_PROGRESS_KEY,
    BORROWER_PROGRESS_KEY,
    LOAN_PURPOSE_KEY,
];

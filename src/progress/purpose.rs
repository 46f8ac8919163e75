/// The two flows the wizard distinguishes. Anything that is not a purchase is
/// handled by the refinance flow, including a missing or unknown purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoanPurpose {
    Purchase,
    #[default]
    Refinance,
}

impl LoanPurpose {
    pub fn classify(raw: Option<&str>) -> Self {
        match raw.map(|value| value.trim().to_ascii_lowercase()) {
            Some(value) if value == "purchase" => Self::Purchase,
            _ => Self::Refinance,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Purchase => "Purchase",
            Self::Refinance => "Refinance",
        }
    }

    /// Route namespace the wizard pages are rendered under.
    pub fn route_namespace(self) -> &'static str {
        match self {
            Self::Purchase => "buy",
            Self::Refinance => "refinance",
        }
    }
}

impl std::fmt::Display for LoanPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One wizard page, in catalogue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormStep {
    BorrowerInfo1,
    BorrowerInfo2,
    CoBorrowerQuestion,
    CoBorrowerInfo1,
    CoBorrowerInfo2,
    Review,
    GettingToKnowYouIntro,
    Loan,
    Assets,
    RealEstate,
    Declarations,
    DemographicInfo,
    AdditionalQuestions,
    Done,
}

pub const ALL_FORM_STEPS: [FormStep; 14] = [
    FormStep::BorrowerInfo1,
    FormStep::BorrowerInfo2,
    FormStep::CoBorrowerQuestion,
    FormStep::CoBorrowerInfo1,
    FormStep::CoBorrowerInfo2,
    FormStep::Review,
    FormStep::GettingToKnowYouIntro,
    FormStep::Loan,
    FormStep::Assets,
    FormStep::RealEstate,
    FormStep::Declarations,
    FormStep::DemographicInfo,
    FormStep::AdditionalQuestions,
    FormStep::Done,
];

// Older deployments persisted a single co-borrower page marker.
const LEGACY_PREFIXES: [(&str, FormStep); 1] = [("co-borrower-info", FormStep::CoBorrowerInfo1)];

impl FormStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BorrowerInfo1 => "borrower-info-1",
            Self::BorrowerInfo2 => "borrower-info-2",
            Self::CoBorrowerQuestion => "co-borrower-question",
            Self::CoBorrowerInfo1 => "co-borrower-info-1",
            Self::CoBorrowerInfo2 => "co-borrower-info-2",
            Self::Review => "review",
            Self::GettingToKnowYouIntro => "getting-to-know-you-intro",
            Self::Loan => "loan",
            Self::Assets => "assets",
            Self::RealEstate => "real-estate",
            Self::Declarations => "declarations",
            Self::DemographicInfo => "demographic-info",
            Self::AdditionalQuestions => "additional-questions",
            Self::Done => "done",
        }
    }

    /// Exact token match, case-insensitive.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let normalized = raw.trim().to_ascii_lowercase();
        ALL_FORM_STEPS
            .iter()
            .copied()
            .find(|step| step.as_str() == normalized)
            .ok_or_else(|| format!("unknown form step `{}`", raw.trim()))
    }

    /// Reads a persisted step marker, accepting exact tokens, suffixed tokens
    /// such as `loan-completed`, and legacy names.
    pub fn from_marker(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return None;
        }
        if let Ok(step) = Self::parse(&normalized) {
            return Some(step);
        }
        if let Some(step) = ALL_FORM_STEPS
            .iter()
            .copied()
            .find(|step| normalized.starts_with(step.as_str()))
        {
            return Some(step);
        }
        LEGACY_PREFIXES
            .iter()
            .find(|(prefix, _)| normalized.starts_with(prefix))
            .map(|(_, step)| *step)
    }

    pub fn position(self) -> usize {
        ALL_FORM_STEPS
            .iter()
            .position(|step| *step == self)
            .unwrap_or(ALL_FORM_STEPS.len())
    }

    /// The page that follows this one. Co-borrower pages are skipped when the
    /// application has a single borrower.
    pub fn next(self, has_co_borrower: bool) -> Option<Self> {
        match self {
            Self::CoBorrowerQuestion if !has_co_borrower => Some(Self::Review),
            Self::Done => None,
            other => ALL_FORM_STEPS.get(other.position() + 1).copied(),
        }
    }

    pub fn is_after(self, other: Self) -> bool {
        self.position() > other.position()
    }
}

impl std::fmt::Display for FormStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FormStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for FormStep {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FormStep {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error as _;
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(D::Error::custom)
    }
}

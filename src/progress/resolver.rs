use crate::progress::purpose::LoanPurpose;
use crate::progress::snapshot::ApplicationSnapshot;
use crate::progress::steps::FormStep;

/// Names the rule that produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionRule {
    BasicIdentityIncomplete,
    ExtendedIdentityIncomplete,
    CoBorrowerUnanswered,
    PersistedStep,
    DefaultReview,
}

impl ResolutionRule {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BasicIdentityIncomplete => "basic_identity_incomplete",
            Self::ExtendedIdentityIncomplete => "extended_identity_incomplete",
            Self::CoBorrowerUnanswered => "co_borrower_unanswered",
            Self::PersistedStep => "persisted_step",
            Self::DefaultReview => "default_review",
        }
    }
}

/// An entry of the gating table: when `incomplete` holds, the wizard sends
/// the user to `step`.
struct GateRule {
    rule: ResolutionRule,
    incomplete: fn(&ApplicationSnapshot) -> bool,
    step: FormStep,
}

fn basic_identity_incomplete(snapshot: &ApplicationSnapshot) -> bool {
    !snapshot.has_basic_identity()
}

fn extended_identity_incomplete(snapshot: &ApplicationSnapshot) -> bool {
    !snapshot.has_extended_identity()
}

fn co_borrower_unanswered(snapshot: &ApplicationSnapshot) -> bool {
    !snapshot.co_borrower_answer_recorded()
}

const GATES: [GateRule; 3] = [
    GateRule {
        rule: ResolutionRule::BasicIdentityIncomplete,
        incomplete: basic_identity_incomplete,
        step: FormStep::BorrowerInfo1,
    },
    GateRule {
        rule: ResolutionRule::ExtendedIdentityIncomplete,
        incomplete: extended_identity_incomplete,
        step: FormStep::BorrowerInfo2,
    },
    GateRule {
        rule: ResolutionRule::CoBorrowerUnanswered,
        incomplete: co_borrower_unanswered,
        step: FormStep::CoBorrowerQuestion,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub step: FormStep,
    pub purpose: LoanPurpose,
    pub rule: ResolutionRule,
}

impl Resolution {
    pub fn route_namespace(&self) -> &'static str {
        self.purpose.route_namespace()
    }
}

/// Picks the next step for a snapshot. Gates are checked in order and the
/// first incomplete one wins; past the gates the persisted marker decides.
pub fn resolve_next_step(snapshot: &ApplicationSnapshot) -> Resolution {
    let purpose = LoanPurpose::classify(snapshot.loan_purpose.as_deref());
    if let Some(gate) = GATES.iter().find(|gate| (gate.incomplete)(snapshot)) {
        return Resolution {
            step: gate.step,
            purpose,
            rule: gate.rule,
        };
    }
    match snapshot.form_step_marker() {
        Some(step) => Resolution {
            step,
            purpose,
            rule: ResolutionRule::PersistedStep,
        },
        None => Resolution {
            step: FormStep::Review,
            purpose,
            rule: ResolutionRule::DefaultReview,
        },
    }
}

/// Where "Back" on the review summary leads.
pub fn review_back_step(snapshot: Option<&ApplicationSnapshot>) -> FormStep {
    if snapshot.is_some_and(ApplicationSnapshot::has_co_borrower_record) {
        FormStep::CoBorrowerInfo2
    } else {
        FormStep::BorrowerInfo2
    }
}

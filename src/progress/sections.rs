use crate::progress::steps::FormStep;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardSection {
    GettingStarted,
    GettingToKnowYou,
    Assets,
    RealEstate,
    Declarations,
    DemographicInfo,
    AdditionalQuestions,
}

pub const ALL_WIZARD_SECTIONS: [WizardSection; 7] = [
    WizardSection::GettingStarted,
    WizardSection::GettingToKnowYou,
    WizardSection::Assets,
    WizardSection::RealEstate,
    WizardSection::Declarations,
    WizardSection::DemographicInfo,
    WizardSection::AdditionalQuestions,
];

impl WizardSection {
    pub fn id(self) -> &'static str {
        match self {
            Self::GettingStarted => "getting-started",
            Self::GettingToKnowYou => "getting-to-know-you",
            Self::Assets => "assets",
            Self::RealEstate => "real-estate",
            Self::Declarations => "declarations",
            Self::DemographicInfo => "demographic-info",
            Self::AdditionalQuestions => "additional-questions",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::GettingStarted => "Getting Started",
            Self::GettingToKnowYou => "Loan & Property",
            Self::Assets => "Assets",
            Self::RealEstate => "Real Estate",
            Self::Declarations => "Declarations",
            Self::DemographicInfo => "Demographic Info",
            Self::AdditionalQuestions => "Additional Questions",
        }
    }

    /// Section a wizard page belongs to; `done` sits outside every section.
    pub fn for_step(step: FormStep) -> Option<Self> {
        match step {
            FormStep::BorrowerInfo1
            | FormStep::BorrowerInfo2
            | FormStep::CoBorrowerQuestion
            | FormStep::CoBorrowerInfo1
            | FormStep::CoBorrowerInfo2
            | FormStep::Review => Some(Self::GettingStarted),
            FormStep::GettingToKnowYouIntro | FormStep::Loan => Some(Self::GettingToKnowYou),
            FormStep::Assets => Some(Self::Assets),
            FormStep::RealEstate => Some(Self::RealEstate),
            FormStep::Declarations => Some(Self::Declarations),
            FormStep::DemographicInfo => Some(Self::DemographicInfo),
            FormStep::AdditionalQuestions => Some(Self::AdditionalQuestions),
            FormStep::Done => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionStatus {
    Completed,
    Current,
    Locked,
}

impl SectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Current => "current",
            Self::Locked => "locked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionEntry {
    pub section: WizardSection,
    pub status: SectionStatus,
}

/// Sidebar checklist for the page at `step`. Sections ahead of the current one
/// are locked unless the progress map already marks them complete; sections
/// behind it count as completed.
pub fn section_outline(
    step: FormStep,
    progress: Option<&BTreeMap<String, bool>>,
) -> Vec<SectionEntry> {
    let current = WizardSection::for_step(step);
    let marked_complete =
        |section: WizardSection| progress.and_then(|map| map.get(section.id())) == Some(&true);

    ALL_WIZARD_SECTIONS
        .iter()
        .map(|section| {
            let status = match current {
                Some(current) if *section == current => SectionStatus::Current,
                Some(current) if *section < current => SectionStatus::Completed,
                None => SectionStatus::Completed,
                _ if marked_complete(*section) => SectionStatus::Completed,
                _ => SectionStatus::Locked,
            };
            SectionEntry {
                section: *section,
                status,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statuses(outline: &[SectionEntry]) -> Vec<&'static str> {
        outline.iter().map(|entry| entry.status.as_str()).collect()
    }

    #[test]
    fn early_pages_lock_everything_after_getting_started() {
        let outline = section_outline(FormStep::BorrowerInfo2, None);
        assert_eq!(outline.len(), 7);
        assert_eq!(
            statuses(&outline),
            vec!["current", "locked", "locked", "locked", "locked", "locked", "locked"]
        );
    }

    #[test]
    fn loan_page_completes_getting_started() {
        let outline = section_outline(FormStep::Loan, None);
        assert_eq!(outline[0].status, SectionStatus::Completed);
        assert_eq!(outline[1].section, WizardSection::GettingToKnowYou);
        assert_eq!(outline[1].status, SectionStatus::Current);
        assert_eq!(outline[2].status, SectionStatus::Locked);
    }

    #[test]
    fn progress_map_unlocks_sections_ahead() {
        let progress = BTreeMap::from([
            ("declarations".to_string(), true),
            ("assets".to_string(), false),
        ]);
        let outline = section_outline(FormStep::Review, Some(&progress));
        assert_eq!(outline[2].status, SectionStatus::Locked);
        assert_eq!(outline[4].status, SectionStatus::Completed);
    }

    #[test]
    fn done_marks_every_section_completed() {
        let outline = section_outline(FormStep::Done, None);
        assert!(outline
            .iter()
            .all(|entry| entry.status == SectionStatus::Completed));
    }
}

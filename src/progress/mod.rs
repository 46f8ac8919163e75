pub mod purpose;
pub mod resolver;
pub mod sections;
pub mod snapshot;
pub mod steps;

pub use purpose::LoanPurpose;
pub use resolver::{resolve_next_step, review_back_step, Resolution, ResolutionRule};
pub use sections::{
    section_outline, SectionEntry, SectionStatus, WizardSection, ALL_WIZARD_SECTIONS,
};
pub use snapshot::{value_present, ApplicationSnapshot, BorrowerRecord};
pub use steps::{FormStep, ALL_FORM_STEPS};

//! The annotated ECG document root and its clinical-trial context.

use serde::{Deserialize, Serialize};

use crate::codes::{CodedValue, LocalCode};
use crate::ids::Identifier;
use crate::series::Series;
use crate::time::{TimeInterval, Timestamp};
use crate::vocab::{
    ConfidentialityCode, DocumentCode, GenderCode, RaceCode, ReasonCode, SubjectRoleCode,
};

/// A person name.
///
/// `Option<PersonName>` distinguishes "no name element" (`None`) from an
/// explicitly empty name (`Some` with every part unset), which is written
/// as `<name/>`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersonName {
    pub prefix: Option<String>,
    pub given: Option<String>,
    pub family: Option<String>,
    pub suffix: Option<String>,
}

impl PersonName {
    /// Build from parts, treating empty strings as absent.
    pub fn from_parts(prefix: &str, given: &str, family: &str, suffix: &str) -> Self {
        let part = |value: &str| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        Self {
            prefix: part(prefix),
            given: part(given),
            family: part(family),
            suffix: part(suffix),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.prefix.is_none() && self.given.is_none() && self.family.is_none() && self.suffix.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.state.is_none() && self.country.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubjectDemographics {
    pub name: Option<PersonName>,
    pub gender: Option<CodedValue<GenderCode>>,
    pub birth_time: Option<Timestamp>,
    pub race: Option<CodedValue<RaceCode>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrialSubject {
    pub id: Option<Identifier>,
    pub role: Option<CodedValue<SubjectRoleCode>>,
    pub demographics: Option<SubjectDemographics>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SiteLocation {
    pub name: Option<String>,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Investigator {
    pub id: Option<Identifier>,
    pub name: Option<PersonName>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrialSite {
    pub id: Option<Identifier>,
    pub location: Option<SiteLocation>,
    pub investigator: Option<Investigator>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClinicalTrial {
    pub id: Option<Identifier>,
    pub title: Option<String>,
    pub site: Option<TrialSite>,
}

/// The protocol timepoint (visit) at which the ECG was recorded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimepointEvent {
    pub code: Option<LocalCode>,
    pub effective_time: Option<TimeInterval>,
    /// Free-text reason for an unscheduled or off-protocol timepoint.
    pub reason: Option<String>,
}

/// Clinical-trial and subject context of a document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrialContext {
    pub timepoint: TimepointEvent,
    pub subject: TrialSubject,
    pub trial: ClinicalTrial,
}

/// Root of an annotated ECG.
///
/// The document exclusively owns its subtree. Required fields are optional
/// here and checked by the validator, so partially built or partially
/// decoded documents are representable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub id: Option<Identifier>,
    pub code: Option<CodedValue<DocumentCode>>,
    pub text: Option<String>,
    pub effective_time: Option<TimeInterval>,
    pub confidentiality: Option<CodedValue<ConfidentialityCode>>,
    pub reason: Option<CodedValue<ReasonCode>>,
    pub trial_context: Option<TrialContext>,
    pub series: Vec<Series>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(&self) -> Option<&TrialSubject> {
        self.trial_context.as_ref().map(|context| &context.subject)
    }

    /// Total number of sampled values across every series and lead.
    pub fn sample_count(&self) -> usize {
        self.series
            .iter()
            .flat_map(|series| series.sequence_sets.iter())
            .flat_map(|set| set.leads())
            .map(|(_, samples)| samples.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_parts_are_absent() {
        let name = PersonName::from_parts("Dr.", "", " Smith ", "");
        assert_eq!(name.prefix.as_deref(), Some("Dr."));
        assert_eq!(name.given, None);
        assert_eq!(name.family.as_deref(), Some("Smith"));
        assert!(!name.is_empty());
    }

    #[test]
    fn all_blank_parts_yield_empty_name() {
        let name = PersonName::from_parts("", "", "", "");
        assert!(name.is_empty());
        assert_eq!(name, PersonName::default());
    }
}

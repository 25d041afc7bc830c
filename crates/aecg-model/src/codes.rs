//! Coded values: a closed-vocabulary code paired with its code system.
//!
//! Every coded field in an annotated ECG carries a code drawn from a fixed
//! vocabulary (lead codes, series types, genders, ...) together with the
//! identifier of the code system that defines it. [`CodedValue`] is generic
//! over the vocabulary so an out-of-vocabulary code cannot be constructed:
//! each field picks its own [`Code`] enum and the compiler rejects the rest.
//!
//! # Example
//!
//! ```
//! use aecg_model::{Code, CodedValue, CodeSystem, LeadCode};
//!
//! let lead: CodedValue<LeadCode> = CodedValue::of(LeadCode::II);
//! assert_eq!(lead.code.as_str(), "MDC_ECG_LEAD_II");
//! assert_eq!(lead.code_system, CodeSystem::Mdc);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// A member of a closed code vocabulary.
pub trait Code: Copy + Eq + fmt::Debug + 'static {
    /// Vocabulary name used in error messages.
    const VOCABULARY: &'static str;

    /// The wire literal for this code.
    fn as_str(&self) -> &'static str;

    /// Resolve a wire literal; `None` when it is not part of the vocabulary.
    fn from_code(code: &str) -> Option<Self>;

    /// The code system that defines this code.
    fn code_system(&self) -> CodeSystem;

    /// Human-readable name, when the vocabulary defines one.
    fn display_name(&self) -> Option<&'static str> {
        None
    }
}

/// Parse a wire literal into a vocabulary member.
pub fn parse_code<C: Code>(code: &str) -> Result<C> {
    C::from_code(code.trim()).ok_or_else(|| ModelError::UnknownCode {
        vocabulary: C::VOCABULARY,
        code: code.to_string(),
    })
}

/// Identifier type for a code system.
pub trait CodeSystemId: Clone + PartialEq + fmt::Debug {
    fn oid(&self) -> &str;

    fn from_oid(oid: &str) -> Option<Self>;
}

/// HL7 and ISO/IEEE 11073 code systems referenced by annotated ECGs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CodeSystem {
    /// HL7 ActCode (series types, time axes, ROI codes).
    ActCode,
    /// ISO/IEEE 11073 Medical Device Communications nomenclature.
    Mdc,
    /// CPT-4 procedure codes.
    Cpt4,
    Confidentiality,
    ActReason,
    AdministrativeGender,
    Race,
    ParticipationFunction,
    ResearchSubjectRole,
}

impl CodeSystem {
    pub const ALL: [CodeSystem; 9] = [
        CodeSystem::ActCode,
        CodeSystem::Mdc,
        CodeSystem::Cpt4,
        CodeSystem::Confidentiality,
        CodeSystem::ActReason,
        CodeSystem::AdministrativeGender,
        CodeSystem::Race,
        CodeSystem::ParticipationFunction,
        CodeSystem::ResearchSubjectRole,
    ];

    pub fn as_oid(&self) -> &'static str {
        match self {
            CodeSystem::ActCode => "2.16.840.1.113883.5.4",
            CodeSystem::Mdc => "2.16.840.1.113883.6.24",
            CodeSystem::Cpt4 => "2.16.840.1.113883.6.12",
            CodeSystem::Confidentiality => "2.16.840.1.113883.5.25",
            CodeSystem::ActReason => "2.16.840.1.113883.5.8",
            CodeSystem::AdministrativeGender => "2.16.840.1.113883.5.1",
            CodeSystem::Race => "2.16.840.1.113883.5.104",
            CodeSystem::ParticipationFunction => "2.16.840.1.113883.5.88",
            CodeSystem::ResearchSubjectRole => "2.16.840.1.113883.5.111",
        }
    }

    /// Conventional `codeSystemName` for this system.
    pub fn name(&self) -> &'static str {
        match self {
            CodeSystem::ActCode => "ActCode",
            CodeSystem::Mdc => "MDC",
            CodeSystem::Cpt4 => "CPT-4",
            CodeSystem::Confidentiality => "Confidentiality",
            CodeSystem::ActReason => "ActReason",
            CodeSystem::AdministrativeGender => "AdministrativeGender",
            CodeSystem::Race => "Race",
            CodeSystem::ParticipationFunction => "ParticipationFunction",
            CodeSystem::ResearchSubjectRole => "ResearchSubjectRole",
        }
    }
}

impl CodeSystemId for CodeSystem {
    fn oid(&self) -> &str {
        self.as_oid()
    }

    fn from_oid(oid: &str) -> Option<Self> {
        let oid = oid.trim();
        CodeSystem::ALL.into_iter().find(|system| system.as_oid() == oid)
    }
}

impl fmt::Display for CodeSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_oid())
    }
}

/// An arbitrary code system OID, for fields whose codes come from a fixed
/// vocabulary but whose publishing system varies by vendor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Oid(String);

impl Oid {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CodeSystemId for Oid {
    fn oid(&self) -> &str {
        &self.0
    }

    fn from_oid(oid: &str) -> Option<Self> {
        let trimmed = oid.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }
}

impl From<CodeSystem> for Oid {
    fn from(system: CodeSystem) -> Self {
        Self(system.as_oid().to_string())
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A code from vocabulary `C`, published by code system `S`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodedValue<C, S = CodeSystem> {
    pub code: C,
    pub code_system: S,
    pub code_system_name: Option<String>,
    pub display_name: Option<String>,
}

impl<C: Code, S: CodeSystemId> CodedValue<C, S> {
    pub fn new(
        code: C,
        code_system: S,
        code_system_name: Option<String>,
        display_name: Option<String>,
    ) -> Self {
        Self {
            code,
            code_system,
            code_system_name,
            display_name,
        }
    }

    /// Replace every part of the coded value in place.
    pub fn set_code(
        &mut self,
        code: C,
        code_system: S,
        code_system_name: Option<String>,
        display_name: Option<String>,
    ) {
        self.code = code;
        self.code_system = code_system;
        self.code_system_name = code_system_name;
        self.display_name = display_name;
    }
}

impl<C: Code, S: CodeSystemId + From<CodeSystem>> CodedValue<C, S> {
    /// Coded value using the code's own system, system name and display name.
    pub fn of(code: C) -> Self {
        let system = code.code_system();
        Self {
            code,
            code_system: S::from(system),
            code_system_name: Some(system.name().to_string()),
            display_name: code.display_name().map(str::to_string),
        }
    }
}

/// A code from a sponsor-defined vocabulary (visit and timepoint codes).
///
/// Protocol vocabularies cannot be enumerated ahead of time, so this stays a
/// plain string and is never used where a closed vocabulary applies.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalCode {
    pub code: String,
    pub code_system: Option<String>,
    pub code_system_name: Option<String>,
    pub display_name: Option<String>,
}

impl LocalCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{GenderCode, LeadCode, SeriesCode};

    #[test]
    fn of_uses_vocabulary_defaults() {
        let series: CodedValue<SeriesCode> = CodedValue::of(SeriesCode::Rhythm);
        assert_eq!(series.code_system, CodeSystem::ActCode);
        assert_eq!(series.code_system_name.as_deref(), Some("ActCode"));
        assert_eq!(series.display_name.as_deref(), Some("Rhythm Waveforms"));
    }

    #[test]
    fn set_code_replaces_all_parts() {
        let mut gender: CodedValue<GenderCode> = CodedValue::of(GenderCode::Female);
        gender.set_code(
            GenderCode::Male,
            CodeSystem::AdministrativeGender,
            None,
            Some("Male".to_string()),
        );
        assert_eq!(gender.code, GenderCode::Male);
        assert_eq!(gender.code_system_name, None);
        assert_eq!(gender.display_name.as_deref(), Some("Male"));
    }

    #[test]
    fn parse_code_rejects_unknown_literals() {
        assert_eq!(parse_code::<LeadCode>("MDC_ECG_LEAD_V1"), Ok(LeadCode::V1));
        let err = parse_code::<LeadCode>("MDC_ECG_LEAD_BOGUS").unwrap_err();
        assert!(matches!(err, ModelError::UnknownCode { vocabulary: "lead", .. }));
    }

    #[test]
    fn code_system_round_trips_through_oid() {
        for system in CodeSystem::ALL {
            assert_eq!(CodeSystem::from_oid(system.as_oid()), Some(system));
        }
        assert_eq!(CodeSystem::from_oid("1.2.3"), None);
        assert_eq!(Oid::from_oid("1.2.3"), Some(Oid::new("1.2.3")));
        assert_eq!(Oid::from_oid("  "), None);
    }
}

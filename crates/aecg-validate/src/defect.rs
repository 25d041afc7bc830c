//! Conformance defects.
//!
//! Each variant carries only the data its message needs. Rule identifiers are
//! stable across releases so reports can be diffed and filtered.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DefectKind {
    MissingDocumentId,
    MissingDocumentCode,
    MissingEffectiveTime,
    /// No clinical-trial or subject context at all.
    MissingTrialContext,
    MissingSubjectId,
    MissingTrialId,
    /// Identifier whose root is empty.
    IdentifierWithoutRoot { extension: Option<String> },
    /// `low` is later than `high`.
    InvertedEffectiveTime,
    MissingSeriesCode,
    /// Series without any non-empty sequence set.
    MissingSequenceSet,
    EmptySequenceSet,
    /// First sequence of a set is not a time axis.
    MissingTimeAxis,
    /// Sampled list with no digits.
    EmptySampleList,
    /// Two sibling annotations share a code.
    DuplicateAnnotationCode { code: String },
}

impl DefectKind {
    pub fn rule_id(&self) -> &'static str {
        match self {
            DefectKind::MissingDocumentId => "AECG0001",
            DefectKind::MissingDocumentCode => "AECG0002",
            DefectKind::MissingEffectiveTime => "AECG0003",
            DefectKind::MissingTrialContext => "AECG0004",
            DefectKind::MissingSubjectId => "AECG0005",
            DefectKind::MissingTrialId => "AECG0006",
            DefectKind::IdentifierWithoutRoot { .. } => "AECG0007",
            DefectKind::InvertedEffectiveTime => "AECG0008",
            DefectKind::MissingSeriesCode => "AECG0009",
            DefectKind::MissingSequenceSet => "AECG0010",
            DefectKind::EmptySequenceSet => "AECG0011",
            DefectKind::MissingTimeAxis => "AECG0012",
            DefectKind::EmptySampleList => "AECG0013",
            DefectKind::DuplicateAnnotationCode { .. } => "AECG0014",
        }
    }

    pub fn message(&self) -> String {
        match self {
            DefectKind::MissingDocumentId => "document identifier is missing".to_string(),
            DefectKind::MissingDocumentCode => "document code is missing".to_string(),
            DefectKind::MissingEffectiveTime => "effective time is missing".to_string(),
            DefectKind::MissingTrialContext => {
                "clinical trial and subject context is missing".to_string()
            }
            DefectKind::MissingSubjectId => "trial subject identifier is missing".to_string(),
            DefectKind::MissingTrialId => "clinical trial identifier is missing".to_string(),
            DefectKind::IdentifierWithoutRoot {
                extension: Some(extension),
            } => format!("identifier '{extension}' has no root"),
            DefectKind::IdentifierWithoutRoot { extension: None } => {
                "identifier has no root".to_string()
            }
            DefectKind::InvertedEffectiveTime => {
                "effective time starts after it ends".to_string()
            }
            DefectKind::MissingSeriesCode => "series code is missing".to_string(),
            DefectKind::MissingSequenceSet => {
                "series has no non-empty sequence set".to_string()
            }
            DefectKind::EmptySequenceSet => "sequence set has no sequences".to_string(),
            DefectKind::MissingTimeAxis => {
                "first sequence of the set is not a time axis".to_string()
            }
            DefectKind::EmptySampleList => "sampled sequence has no digits".to_string(),
            DefectKind::DuplicateAnnotationCode { code } => {
                format!("annotation code {code} appears more than once among siblings")
            }
        }
    }
}

/// One conformance violation at a node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defect {
    pub kind: DefectKind,
    /// XPath-like location, 1-based (`/AnnotatedECG/component[2]/series`).
    pub path: String,
}

impl Defect {
    pub fn rule_id(&self) -> &'static str {
        self.kind.rule_id()
    }

    pub fn message(&self) -> String {
        self.kind.message()
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.rule_id(), self.path, self.message())
    }
}

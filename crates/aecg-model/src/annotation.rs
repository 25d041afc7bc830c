//! Annotations: coded measurements nested to arbitrary depth.

use serde::{Deserialize, Serialize};

use crate::codes::CodedValue;
use crate::document::PersonName;
use crate::time::{TimeInterval, Timestamp};
use crate::vocab::{AnnotationCode, LeadCode, RoiCode, SequenceCode};

/// Scalar payload of an annotation, tagged on the wire by `xsi:type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnnotationValue {
    /// `PQ`: decimal text kept verbatim plus an optional unit.
    Quantity { value: String, unit: Option<String> },
    /// `CD`: a coded finding.
    Coded(CodedValue<AnnotationCode>),
    /// `ST`: free text.
    Text(String),
}

impl AnnotationValue {
    pub fn quantity(value: impl Into<String>, unit: impl Into<String>) -> Self {
        AnnotationValue::Quantity {
            value: value.into(),
            unit: Some(unit.into()),
        }
    }
}

/// One boundary of a region of interest: a time axis or lead, optionally
/// restricted to a time span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiBoundary {
    pub code: CodedValue<SequenceCode>,
    pub value: Option<TimeInterval>,
}

/// Region of interest an annotation is bound to.
///
/// Boundaries are descriptive labels, not links into the sequence data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportingRoi {
    pub code: CodedValue<RoiCode>,
    pub boundaries: Vec<RoiBoundary>,
}

impl SupportingRoi {
    /// A partially specified region covering one lead.
    pub fn lead(lead: LeadCode) -> Self {
        Self {
            code: CodedValue::of(RoiCode::PartiallySpecified),
            boundaries: vec![RoiBoundary {
                code: CodedValue::of(SequenceCode::Lead(lead)),
                value: None,
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub code: CodedValue<AnnotationCode>,
    pub value: Option<AnnotationValue>,
    pub support: Option<SupportingRoi>,
    /// Nested annotations; codes are unique among siblings.
    pub children: Vec<Annotation>,
}

impl Annotation {
    pub fn new(code: AnnotationCode) -> Self {
        Self {
            code: CodedValue::of(code),
            value: None,
            support: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: AnnotationValue) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn with_support(mut self, support: SupportingRoi) -> Self {
        self.support = Some(support);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Annotation) -> Self {
        self.children.push(child);
        self
    }
}

/// A group of annotations attached to a series (`subjectOf/annotationSet`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnnotationSet {
    pub activity_time: Option<Timestamp>,
    /// Person who made the annotations, when not the acquiring device.
    pub author: Option<PersonName>,
    pub annotations: Vec<Annotation>,
}

impl AnnotationSet {
    pub fn new(activity_time: Option<Timestamp>) -> Self {
        Self {
            activity_time,
            author: None,
            annotations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

//! Shallow lookups over annotation trees.
//!
//! Annotated ECGs have a fixed two-level shape: global measurements at the top
//! of an annotation set, and per-lead groups whose children hold that lead's
//! measurements. The lookups here follow that shape explicitly; none of them
//! recurse past one level.
//!
//! ```
//! use aecg_model::{Annotation, AnnotationCode, AnnotationSet, AnnotationValue};
//!
//! let set = AnnotationSet::new(None).with_annotation(
//!     Annotation::new(AnnotationCode::HeartRate)
//!         .with_value(AnnotationValue::quantity("57", "bpm")),
//! );
//! let heart_rate = set.find_by_code("MDC_ECG_HEART_RATE").unwrap();
//! assert_eq!(heart_rate.value_as_f64(), Some(57.0));
//! assert!(set.find_by_code("NOT_PRESENT").is_none());
//! ```

use crate::annotation::{Annotation, AnnotationSet, AnnotationValue};
use crate::codes::Code;
use crate::vocab::{LeadCode, SequenceCode};

impl AnnotationSet {
    /// First top-level annotation with the given wire code.
    pub fn find_by_code(&self, code: &str) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|annotation| annotation.code.code.as_str() == code)
    }

    /// First top-level annotation whose region of interest names `lead`.
    pub fn find_by_lead(&self, lead: LeadCode) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|annotation| annotation.references_lead(lead))
    }
}

impl Annotation {
    /// Direct child with the given wire code.
    pub fn find_nested_by_code(&self, code: &str) -> Option<&Annotation> {
        self.children
            .iter()
            .find(|child| child.code.code.as_str() == code)
    }

    /// True when a support boundary is coded with `lead`.
    pub fn references_lead(&self, lead: LeadCode) -> bool {
        self.support.as_ref().is_some_and(|support| {
            support
                .boundaries
                .iter()
                .any(|boundary| boundary.code.code == SequenceCode::Lead(lead))
        })
    }

    /// The value parsed as a number.
    ///
    /// Only physical-quantity values are numeric; coded and text values, an
    /// absent value and unparsable text all yield `None`.
    pub fn value_as_f64(&self) -> Option<f64> {
        match self.value.as_ref()? {
            AnnotationValue::Quantity { value, .. } => value.trim().parse::<f64>().ok(),
            AnnotationValue::Coded(_) | AnnotationValue::Text(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::SupportingRoi;
    use crate::vocab::AnnotationCode;

    fn lead_group(lead: LeadCode, qt: &str) -> Annotation {
        Annotation::new(AnnotationCode::Beat)
            .with_support(SupportingRoi::lead(lead))
            .with_child(
                Annotation::new(AnnotationCode::QtInterval)
                    .with_value(AnnotationValue::quantity(qt, "ms")),
            )
    }

    #[test]
    fn find_by_code_ignores_nested_annotations() {
        let set = AnnotationSet::new(None).with_annotation(lead_group(LeadCode::II, "400"));
        assert!(set.find_by_code("MDC_ECG_TIME_PD_QT").is_none());
        assert!(set.find_by_code("MDC_ECG_BEAT").is_some());
    }

    #[test]
    fn lead_then_nested_lookup() {
        let set = AnnotationSet::new(None)
            .with_annotation(lead_group(LeadCode::I, "398"))
            .with_annotation(lead_group(LeadCode::V2, "412"));

        let qt = set
            .find_by_lead(LeadCode::V2)
            .and_then(|group| group.find_nested_by_code("MDC_ECG_TIME_PD_QT"))
            .and_then(Annotation::value_as_f64);
        assert_eq!(qt, Some(412.0));
        assert!(set.find_by_lead(LeadCode::V6).is_none());
    }

    #[test]
    fn nested_lookup_is_one_level_deep() {
        let inner = Annotation::new(AnnotationCode::QrsWave)
            .with_child(Annotation::new(AnnotationCode::RAmplitude));
        let outer = Annotation::new(AnnotationCode::Beat).with_child(inner);
        assert!(outer.find_nested_by_code("MDC_ECG_WAVC_QRSWAVE").is_some());
        assert!(outer.find_nested_by_code("MDC_ECG_AMPL_R").is_none());
    }

    #[test]
    fn non_numeric_values_are_none() {
        let absent = Annotation::new(AnnotationCode::HeartRate);
        assert_eq!(absent.value_as_f64(), None);

        let garbage = absent
            .clone()
            .with_value(AnnotationValue::quantity("fast", "bpm"));
        assert_eq!(garbage.value_as_f64(), None);

        let text = absent.with_value(AnnotationValue::Text("57".into()));
        assert_eq!(text.value_as_f64(), None);
    }
}

//! Sequences and the generic sequence value union.
//!
//! A sequence slot holds one of two incompatible shapes, selected on the wire
//! by an `xsi:type` discriminator:
//!
//! - [`RegularTimeGrid`] (`GLIST_TS`): an implicit, evenly spaced time axis
//!   described by a start and a step.
//! - [`SampledQuantityList`] (`SLIST_PQ`): raw integer sample codes plus the
//!   origin and scale that turn them into physical values.
//!
//! The discriminator is never stored; it is derived from the active variant.

use serde::{Deserialize, Serialize};

use crate::codes::CodedValue;
use crate::time::Timestamp;
use crate::vocab::{LeadCode, SequenceCode};

/// Wire discriminator of [`SequenceValue::TimeGrid`].
pub const GLIST_TS: &str = "GLIST_TS";

/// Wire discriminator of [`SequenceValue::Samples`].
pub const SLIST_PQ: &str = "SLIST_PQ";

/// A value with a unit (`PQ`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalQuantity {
    pub value: f64,
    pub unit: Option<String>,
}

impl PhysicalQuantity {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: Some(unit.into()),
        }
    }

    pub fn unitless(value: f64) -> Self {
        Self { value, unit: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularTimeGrid {
    pub head: Timestamp,
    pub head_unit: Option<String>,
    pub increment: PhysicalQuantity,
}

impl RegularTimeGrid {
    /// Offset of sample `index` from `head`, in the increment's unit.
    pub fn time_at(&self, index: usize) -> f64 {
        index as f64 * self.increment.value
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledQuantityList {
    pub origin: PhysicalQuantity,
    pub scale: PhysicalQuantity,
    pub digits: Vec<i32>,
}

impl SampledQuantityList {
    /// `origin + digits[index] * scale`, or `None` past the end.
    pub fn physical_value(&self, index: usize) -> Option<f64> {
        self.digits
            .get(index)
            .map(|digit| self.origin.value + f64::from(*digit) * self.scale.value)
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SequenceValue {
    #[serde(rename = "GLIST_TS")]
    TimeGrid(RegularTimeGrid),
    #[serde(rename = "SLIST_PQ")]
    Samples(SampledQuantityList),
}

impl SequenceValue {
    /// The wire discriminator for the active variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            SequenceValue::TimeGrid(_) => GLIST_TS,
            SequenceValue::Samples(_) => SLIST_PQ,
        }
    }

    pub fn as_time_grid(&self) -> Option<&RegularTimeGrid> {
        match self {
            SequenceValue::TimeGrid(grid) => Some(grid),
            SequenceValue::Samples(_) => None,
        }
    }

    pub fn as_samples(&self) -> Option<&SampledQuantityList> {
        match self {
            SequenceValue::Samples(samples) => Some(samples),
            SequenceValue::TimeGrid(_) => None,
        }
    }
}

/// A time axis or lead channel within a sequence set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub code: CodedValue<SequenceCode>,
    pub value: SequenceValue,
}

impl Sequence {
    pub fn lead(&self) -> Option<LeadCode> {
        self.code.code.lead()
    }
}

/// Ordered sequences: the time axis first, then leads in canonical order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SequenceSet {
    pub sequences: Vec<Sequence>,
}

impl SequenceSet {
    pub fn time_axis(&self) -> Option<&RegularTimeGrid> {
        self.sequences
            .first()
            .filter(|sequence| sequence.code.code.is_time())
            .and_then(|sequence| sequence.value.as_time_grid())
    }

    /// Lead channels in stored order.
    pub fn leads(&self) -> impl Iterator<Item = (LeadCode, &SampledQuantityList)> {
        self.sequences.iter().filter_map(|sequence| {
            let lead = sequence.lead()?;
            let samples = sequence.value.as_samples()?;
            Some((lead, samples))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(digits: Vec<i32>) -> SampledQuantityList {
        SampledQuantityList {
            origin: PhysicalQuantity::new(10.0, "uV"),
            scale: PhysicalQuantity::new(2.5, "uV"),
            digits,
        }
    }

    #[test]
    fn physical_value_applies_origin_and_scale() {
        let list = samples(vec![0, 4, -2]);
        assert_eq!(list.physical_value(0), Some(10.0));
        assert_eq!(list.physical_value(1), Some(20.0));
        assert_eq!(list.physical_value(2), Some(5.0));
        assert_eq!(list.physical_value(3), None);
    }

    #[test]
    fn type_name_follows_variant() {
        let value = SequenceValue::Samples(samples(vec![1]));
        assert_eq!(value.type_name(), SLIST_PQ);
        assert!(value.as_time_grid().is_none());
    }

    #[test]
    fn serde_tags_with_wire_discriminator() {
        let value = SequenceValue::Samples(samples(vec![1, 2]));
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["type"], "SLIST_PQ");
        let back: SequenceValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }
}

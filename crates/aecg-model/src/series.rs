//! Series: one rhythm strip or representative beat and its provenance.

use serde::{Deserialize, Serialize};

use crate::annotation::AnnotationSet;
use crate::codes::{CodedValue, Oid};
use crate::document::PersonName;
use crate::ids::Identifier;
use crate::sequence::{PhysicalQuantity, SampledQuantityList, SequenceSet};
use crate::time::TimeInterval;
use crate::vocab::{ControlVariableCode, DeviceTypeCode, LeadCode, PerformerFunction, SeriesCode};

/// The acquiring device of a series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Device {
    pub id: Option<Identifier>,
    /// Device type; vendors publish these under their own system OIDs.
    pub code: Option<CodedValue<DeviceTypeCode, Oid>>,
    pub model_name: Option<String>,
    pub software_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesAuthor {
    pub id: Option<Identifier>,
    pub device: Device,
    /// Manufacturer organization name.
    pub manufacturer: Option<String>,
}

impl SeriesAuthor {
    pub fn device(
        model_name: impl Into<String>,
        software_name: impl Into<String>,
        manufacturer: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            device: Device {
                id: None,
                code: Some(CodedValue::of(DeviceTypeCode::TwelveLeadElectrocardiograph)),
                model_name: Some(model_name.into()),
                software_name: Some(software_name.into()),
            },
            manufacturer: Some(manufacturer.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SecondaryPerformer {
    pub function_code: Option<CodedValue<PerformerFunction>>,
    pub id: Option<Identifier>,
    pub name: Option<PersonName>,
}

impl SecondaryPerformer {
    pub fn new(function: PerformerFunction, id: Option<Identifier>, name: PersonName) -> Self {
        Self {
            function_code: Some(CodedValue::of(function)),
            id,
            name: Some(name),
        }
    }
}

/// An acquisition setting such as a filter, with nested component settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlVariable {
    pub code: CodedValue<ControlVariableCode>,
    pub value: Option<PhysicalQuantity>,
    pub components: Vec<ControlVariable>,
}

impl ControlVariable {
    pub fn new(code: ControlVariableCode) -> Self {
        Self {
            code: CodedValue::of(code),
            value: None,
            components: Vec::new(),
        }
    }

    /// A filter setting with a single frequency component.
    pub fn filter(filter: ControlVariableCode, setting: ControlVariableCode, hz: f64) -> Self {
        let mut component = ControlVariable::new(setting);
        component.value = Some(PhysicalQuantity::new(hz, "Hz"));
        let mut variable = ControlVariable::new(filter);
        variable.components.push(component);
        variable
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Series {
    pub id: Option<Identifier>,
    pub code: Option<CodedValue<SeriesCode>>,
    pub effective_time: Option<TimeInterval>,
    pub author: Option<SeriesAuthor>,
    pub secondary_performers: Vec<SecondaryPerformer>,
    pub control_variables: Vec<ControlVariable>,
    pub sequence_sets: Vec<SequenceSet>,
    pub annotation_sets: Vec<AnnotationSet>,
}

impl Series {
    pub fn series_code(&self) -> Option<SeriesCode> {
        self.code.as_ref().map(|code| code.code)
    }

    /// Lead channels of the first sequence set, in stored order.
    pub fn leads(&self) -> impl Iterator<Item = (LeadCode, &SampledQuantityList)> {
        self.sequence_sets.iter().take(1).flat_map(SequenceSet::leads)
    }

    /// Samples per second implied by the first sequence set's time axis.
    pub fn sample_rate(&self) -> Option<f64> {
        let grid = self.sequence_sets.first()?.time_axis()?;
        (grid.increment.value > 0.0).then(|| 1.0 / grid.increment.value)
    }
}

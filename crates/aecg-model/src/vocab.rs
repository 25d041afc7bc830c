//! Closed vocabularies used by annotated ECG documents.
//!
//! Each vocabulary is a fieldless enum implementing [`Code`]; wire literals,
//! display names and owning code systems are declared once in the table for
//! the enum.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codes::{Code, CodeSystem, parse_code};
use crate::error::ModelError;

macro_rules! opt {
    () => {
        None
    };
    ($value:expr) => {
        Some($value)
    };
}

macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($vocabulary:literal, $system:expr) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $code:literal $(, $display:literal)?
            );+ $(;)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every member of the vocabulary, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];
        }

        impl Code for $name {
            const VOCABULARY: &'static str = $vocabulary;

            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                }
            }

            fn from_code(code: &str) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }

            fn code_system(&self) -> CodeSystem {
                $system
            }

            fn display_name(&self) -> Option<&'static str> {
                match self {
                    $($name::$variant => opt!($($display)?),)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_code(s)
            }
        }
    };
}

code_enum! {
    /// Document type (CPT-4 procedure performed).
    pub enum DocumentCode ("document type", CodeSystem::Cpt4) {
        RoutineEcg => "93000", "Electrocardiogram, routine ECG with at least 12 leads";
        EcgTracingOnly => "93005", "Electrocardiogram, tracing only";
        EcgInterpretationOnly => "93010", "Electrocardiogram, interpretation and report only";
    }
}

code_enum! {
    /// Blinding applied to the document.
    pub enum ConfidentialityCode ("confidentiality", CodeSystem::Confidentiality) {
        SponsorBlinded => "S", "Sponsor blinded";
        InvestigatorBlinded => "I", "Investigator blinded";
        BothBlinded => "B", "Sponsor and investigator blinded";
        Custom => "C", "Custom blinding";
    }
}

code_enum! {
    /// Why the ECG was recorded relative to the protocol.
    pub enum ReasonCode ("reason", CodeSystem::ActReason) {
        PerProtocol => "PER_PROTOCOL", "Per protocol";
        NotInProtocol => "NOT_IN_PROTOCOL", "Not in protocol";
        InProtocolWrongEvent => "IN_PROTOCOL_WRONG_EVENT", "In protocol, wrong event";
    }
}

code_enum! {
    pub enum SeriesCode ("series type", CodeSystem::ActCode) {
        Rhythm => "RHYTHM", "Rhythm Waveforms";
        RepresentativeBeat => "REPRESENTATIVE_BEAT", "Representative Beat Waveforms";
    }
}

code_enum! {
    pub enum TimeAxisCode ("time axis", CodeSystem::ActCode) {
        Absolute => "TIME_ABSOLUTE", "Absolute Time";
        Relative => "TIME_RELATIVE", "Relative Time";
    }
}

code_enum! {
    /// ECG leads (MDC nomenclature).
    ///
    /// The twelve standard leads come first in declaration order; the rest are
    /// extended placements that sort after them.
    #[allow(clippy::upper_case_acronyms)]
    pub enum LeadCode ("lead", CodeSystem::Mdc) {
        I => "MDC_ECG_LEAD_I", "Lead I";
        II => "MDC_ECG_LEAD_II", "Lead II";
        III => "MDC_ECG_LEAD_III", "Lead III";
        AVR => "MDC_ECG_LEAD_AVR", "Lead aVR";
        AVL => "MDC_ECG_LEAD_AVL", "Lead aVL";
        AVF => "MDC_ECG_LEAD_AVF", "Lead aVF";
        V1 => "MDC_ECG_LEAD_V1", "Lead V1";
        V2 => "MDC_ECG_LEAD_V2", "Lead V2";
        V3 => "MDC_ECG_LEAD_V3", "Lead V3";
        V4 => "MDC_ECG_LEAD_V4", "Lead V4";
        V5 => "MDC_ECG_LEAD_V5", "Lead V5";
        V6 => "MDC_ECG_LEAD_V6", "Lead V6";
        V7 => "MDC_ECG_LEAD_V7", "Lead V7";
        V8 => "MDC_ECG_LEAD_V8", "Lead V8";
        V9 => "MDC_ECG_LEAD_V9", "Lead V9";
        V2R => "MDC_ECG_LEAD_V2R", "Lead V2R";
        V3R => "MDC_ECG_LEAD_V3R", "Lead V3R";
        V4R => "MDC_ECG_LEAD_V4R", "Lead V4R";
        V5R => "MDC_ECG_LEAD_V5R", "Lead V5R";
        V6R => "MDC_ECG_LEAD_V6R", "Lead V6R";
        X => "MDC_ECG_LEAD_X", "Frank lead X";
        Y => "MDC_ECG_LEAD_Y", "Frank lead Y";
        Z => "MDC_ECG_LEAD_Z", "Frank lead Z";
        Unspecified => "MDC_ECG_LEAD_CONFIG", "Unspecified lead";
    }
}

impl LeadCode {
    /// Position in the canonical lead order (limb, augmented, precordial).
    ///
    /// Every non-standard lead shares the same rank so a stable sort keeps
    /// them in their input order after the standard twelve.
    pub fn canonical_rank(&self) -> u8 {
        match self {
            LeadCode::I => 0,
            LeadCode::II => 1,
            LeadCode::III => 2,
            LeadCode::AVR => 3,
            LeadCode::AVL => 4,
            LeadCode::AVF => 5,
            LeadCode::V1 => 6,
            LeadCode::V2 => 7,
            LeadCode::V3 => 8,
            LeadCode::V4 => 9,
            LeadCode::V5 => 10,
            LeadCode::V6 => 11,
            _ => 12,
        }
    }

    pub fn is_standard(&self) -> bool {
        self.canonical_rank() < 12
    }

    /// Short clinical label ("I", "aVR", "V1", ...).
    pub fn label(&self) -> &'static str {
        match self {
            LeadCode::AVR => "aVR",
            LeadCode::AVL => "aVL",
            LeadCode::AVF => "aVF",
            LeadCode::Unspecified => "?",
            other => other.as_str().trim_start_matches("MDC_ECG_LEAD_"),
        }
    }
}

code_enum! {
    /// Measurements and findings carried by annotations (MDC nomenclature).
    pub enum AnnotationCode ("annotation", CodeSystem::Mdc) {
        HeartRate => "MDC_ECG_HEART_RATE", "Heart rate";
        RrInterval => "MDC_ECG_TIME_PD_RR", "RR interval";
        PrInterval => "MDC_ECG_TIME_PD_PR", "PR interval";
        QrsDuration => "MDC_ECG_TIME_PD_QRS", "QRS duration";
        QtInterval => "MDC_ECG_TIME_PD_QT", "QT interval";
        QtcInterval => "MDC_ECG_TIME_PD_QTc", "QTc interval";
        QtcBazett => "MDC_ECG_TIME_PD_QTcB", "QTc interval, Bazett correction";
        QtcFridericia => "MDC_ECG_TIME_PD_QTcF", "QTc interval, Fridericia correction";
        PAxis => "MDC_ECG_ANGLE_P_FRONT", "P axis";
        QrsAxis => "MDC_ECG_ANGLE_QRS_FRONT", "QRS axis";
        TAxis => "MDC_ECG_ANGLE_T_FRONT", "T axis";
        Beat => "MDC_ECG_BEAT", "Beat";
        PWave => "MDC_ECG_WAVC_PWAVE", "P wave";
        QrsWave => "MDC_ECG_WAVC_QRSWAVE", "QRS wave";
        TWave => "MDC_ECG_WAVC_TWAVE", "T wave";
        PAmplitude => "MDC_ECG_AMPL_P", "P amplitude";
        QAmplitude => "MDC_ECG_AMPL_Q", "Q amplitude";
        RAmplitude => "MDC_ECG_AMPL_R", "R amplitude";
        SAmplitude => "MDC_ECG_AMPL_S", "S amplitude";
        TAmplitude => "MDC_ECG_AMPL_T", "T amplitude";
        StAmplitude => "MDC_ECG_AMPL_ST", "ST amplitude";
        Interpretation => "MDC_ECG_INTERPRETATION", "Interpretation";
        InterpretationStatement => "MDC_ECG_INTERPRETATION_STATEMENT", "Interpretation statement";
        SinusRhythm => "MDC_ECG_RHY_SINUS_RHY", "Sinus rhythm";
        SinusBradycardia => "MDC_ECG_RHY_SINUS_BRADY", "Sinus bradycardia";
        SinusTachycardia => "MDC_ECG_RHY_SINUS_TACHY", "Sinus tachycardia";
        AtrialFibrillation => "MDC_ECG_RHY_ATR_FIB", "Atrial fibrillation";
    }
}

code_enum! {
    /// Region-of-interest specification.
    pub enum RoiCode ("region of interest", CodeSystem::ActCode) {
        FullySpecified => "ROIFS", "Fully specified ROI";
        PartiallySpecified => "ROIPS", "Partially specified ROI";
    }
}

code_enum! {
    pub enum GenderCode ("administrative gender", CodeSystem::AdministrativeGender) {
        Female => "F", "Female";
        Male => "M", "Male";
        Undifferentiated => "UN", "Undifferentiated";
    }
}

code_enum! {
    pub enum RaceCode ("race", CodeSystem::Race) {
        AmericanIndianOrAlaskaNative => "1002-5", "American Indian or Alaska Native";
        Asian => "2028-9", "Asian";
        BlackOrAfricanAmerican => "2054-5", "Black or African American";
        NativeHawaiianOrPacificIslander => "2076-8", "Native Hawaiian or Other Pacific Islander";
        White => "2106-3", "White";
        Other => "2131-1", "Other Race";
    }
}

code_enum! {
    pub enum SubjectRoleCode ("subject role", CodeSystem::ResearchSubjectRole) {
        Screening => "SCREENING", "Screening";
        Enrolled => "ENROLLED", "Enrolled";
    }
}

code_enum! {
    /// Function of a secondary performer of a series.
    pub enum PerformerFunction ("performer function", CodeSystem::ParticipationFunction) {
        Technician => "ELECTROCARDIOGRAPH_TECHNICIAN", "Electrocardiograph technician";
        ReviewingCardiologist => "REVIEWING_CARDIOLOGIST", "Reviewing cardiologist";
        Annotator => "ANNOTATOR", "Annotator";
    }
}

code_enum! {
    /// Acquisition settings recorded as control variables.
    pub enum ControlVariableCode ("control variable", CodeSystem::Mdc) {
        LowPassFilter => "MDC_ATTR_FILTER_LOW_PASS", "Low pass filter";
        HighPassFilter => "MDC_ATTR_FILTER_HIGH_PASS", "High pass filter";
        NotchFilter => "MDC_ATTR_FILTER_NOTCH", "Notch filter";
        CutoffFrequency => "MDC_ATTR_FILTER_CUTOFF_FREQ", "Cutoff frequency";
        NotchFrequency => "MDC_ATTR_NOTCH_FREQ", "Notch frequency";
    }
}

code_enum! {
    pub enum DeviceTypeCode ("device type", CodeSystem::ActCode) {
        TwelveLeadElectrocardiograph => "12LEAD_ELECTROCARDIOGRAPH", "12-lead electrocardiograph";
        HolterMonitor => "HOLTER_MONITOR", "Holter monitor";
    }
}

/// Code of a sequence: either the time axis or a lead channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SequenceCode {
    Time(TimeAxisCode),
    Lead(LeadCode),
}

impl SequenceCode {
    pub fn is_time(&self) -> bool {
        matches!(self, SequenceCode::Time(_))
    }

    pub fn lead(&self) -> Option<LeadCode> {
        match self {
            SequenceCode::Lead(lead) => Some(*lead),
            SequenceCode::Time(_) => None,
        }
    }
}

impl Code for SequenceCode {
    const VOCABULARY: &'static str = "sequence";

    fn as_str(&self) -> &'static str {
        match self {
            SequenceCode::Time(code) => code.as_str(),
            SequenceCode::Lead(code) => code.as_str(),
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        TimeAxisCode::from_code(code)
            .map(SequenceCode::Time)
            .or_else(|| LeadCode::from_code(code).map(SequenceCode::Lead))
    }

    fn code_system(&self) -> CodeSystem {
        match self {
            SequenceCode::Time(code) => code.code_system(),
            SequenceCode::Lead(code) => code.code_system(),
        }
    }

    fn display_name(&self) -> Option<&'static str> {
        match self {
            SequenceCode::Time(code) => code.display_name(),
            SequenceCode::Lead(code) => code.display_name(),
        }
    }
}

impl From<LeadCode> for SequenceCode {
    fn from(lead: LeadCode) -> Self {
        SequenceCode::Lead(lead)
    }
}

impl From<TimeAxisCode> for SequenceCode {
    fn from(axis: TimeAxisCode) -> Self {
        SequenceCode::Time(axis)
    }
}

impl fmt::Display for SequenceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_literals_round_trip() {
        for lead in LeadCode::ALL {
            assert_eq!(LeadCode::from_code(lead.as_str()), Some(*lead));
        }
        for code in AnnotationCode::ALL {
            assert_eq!(code.as_str().parse::<AnnotationCode>(), Ok(*code));
        }
    }

    #[test]
    fn standard_leads_rank_before_extended() {
        let standard: Vec<_> = LeadCode::ALL.iter().filter(|l| l.is_standard()).collect();
        assert_eq!(standard.len(), 12);
        assert!(LeadCode::V6.canonical_rank() < LeadCode::V7.canonical_rank());
        assert_eq!(LeadCode::X.canonical_rank(), LeadCode::V4R.canonical_rank());
    }

    #[test]
    fn lead_labels() {
        assert_eq!(LeadCode::AVR.label(), "aVR");
        assert_eq!(LeadCode::V1.label(), "V1");
        assert_eq!(LeadCode::III.label(), "III");
    }

    #[test]
    fn sequence_code_dispatches_to_both_vocabularies() {
        assert_eq!(
            SequenceCode::from_code("TIME_ABSOLUTE"),
            Some(SequenceCode::Time(TimeAxisCode::Absolute))
        );
        assert_eq!(
            SequenceCode::from_code("MDC_ECG_LEAD_AVF"),
            Some(SequenceCode::Lead(LeadCode::AVF))
        );
        assert_eq!(SequenceCode::from_code("RHYTHM"), None);
        assert_eq!(SequenceCode::Lead(LeadCode::I).code_system(), CodeSystem::Mdc);
    }
}

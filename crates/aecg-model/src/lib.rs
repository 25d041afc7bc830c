//! Annotated ECG document model.
//!
//! The document tree (header, trial context, series, sequences, annotations),
//! the closed vocabularies its coded fields draw from, the annotation lookups
//! and the builder that assembles waveform series in canonical lead order.

pub mod annotation;
pub mod builder;
pub mod codes;
pub mod document;
pub mod error;
pub mod ids;
pub mod lookup;
pub mod sequence;
pub mod series;
pub mod time;
pub mod vocab;

pub use annotation::{Annotation, AnnotationSet, AnnotationValue, RoiBoundary, SupportingRoi};
pub use builder::{SubjectDetails, TIME_UNIT, VOLTAGE_UNIT, WaveformSeries};
pub use codes::{Code, CodeSystem, CodeSystemId, CodedValue, LocalCode, Oid, parse_code};
pub use document::{
    Address, ClinicalTrial, Document, Investigator, PersonName, SiteLocation, SubjectDemographics,
    TimepointEvent, TrialContext, TrialSite, TrialSubject,
};
pub use error::{ModelError, Result};
pub use ids::{Identifier, clear_default_root, default_root, set_default_root};
pub use sequence::{
    GLIST_TS, PhysicalQuantity, RegularTimeGrid, SLIST_PQ, SampledQuantityList, Sequence,
    SequenceSet, SequenceValue,
};
pub use series::{ControlVariable, Device, SecondaryPerformer, Series, SeriesAuthor};
pub use time::{TimeBound, TimeInterval, Timestamp, TimestampPrecision};
pub use vocab::{
    AnnotationCode, ConfidentialityCode, ControlVariableCode, DeviceTypeCode, DocumentCode,
    GenderCode, LeadCode, PerformerFunction, RaceCode, ReasonCode, RoiCode, SequenceCode,
    SeriesCode, SubjectRoleCode, TimeAxisCode,
};

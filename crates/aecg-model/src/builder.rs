//! Incremental construction of annotated ECG documents.
//!
//! All operations take `&mut self` and return `&mut Self` so calls chain.
//! Series refinements (author, performers, control variables, series code,
//! annotations) apply to the most recently added series and do nothing when
//! the document has no series yet.

use tracing::debug;

use crate::annotation::AnnotationSet;
use crate::codes::{CodedValue, LocalCode};
use crate::document::{
    Address, ClinicalTrial, Document, Investigator, PersonName, SiteLocation, TimepointEvent,
    TrialContext, TrialSite,
};
use crate::error::{ModelError, Result};
use crate::ids::{Identifier, set_default_root};
use crate::sequence::{
    PhysicalQuantity, RegularTimeGrid, SampledQuantityList, Sequence, SequenceSet, SequenceValue,
};
use crate::series::{ControlVariable, SecondaryPerformer, Series, SeriesAuthor};
use crate::time::{TimeBound, TimeInterval, Timestamp};
use crate::vocab::{
    ConfidentialityCode, DocumentCode, GenderCode, LeadCode, RaceCode, ReasonCode, SequenceCode,
    SeriesCode, SubjectRoleCode, TimeAxisCode,
};

/// Unit of the time axis head and increment.
pub const TIME_UNIT: &str = "s";

/// Unit of lead origin and scale.
pub const VOLTAGE_UNIT: &str = "uV";

/// Input for [`Document::add_rhythm_series`] and
/// [`Document::add_representative_beat_series`].
///
/// Leads may be given in any order; the builder stores them in canonical
/// order. Sample vectors are moved into the document, not copied.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformSeries {
    pub start: Timestamp,
    pub end: Timestamp,
    pub low_inclusive: Option<bool>,
    pub high_inclusive: Option<bool>,
    /// Samples per second.
    pub sample_rate: f64,
    pub leads: Vec<(LeadCode, Vec<i32>)>,
    /// Physical value of digit zero, in microvolts.
    pub origin: f64,
    /// Microvolts per digit.
    pub scale: f64,
}

impl WaveformSeries {
    pub fn new(start: Timestamp, end: Timestamp, sample_rate: f64) -> Self {
        Self {
            start,
            end,
            low_inclusive: None,
            high_inclusive: None,
            sample_rate,
            leads: Vec::new(),
            origin: 0.0,
            scale: 1.0,
        }
    }

    #[must_use]
    pub fn lead(mut self, lead: LeadCode, samples: Vec<i32>) -> Self {
        self.leads.push((lead, samples));
        self
    }

    #[must_use]
    pub fn origin_scale(mut self, origin: f64, scale: f64) -> Self {
        self.origin = origin;
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn inclusive(mut self, low: bool, high: bool) -> Self {
        self.low_inclusive = Some(low);
        self.high_inclusive = Some(high);
        self
    }
}

/// Subject fields for [`Document::set_subject`]; unset fields are left as
/// they are in the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectDetails {
    pub id: Option<Identifier>,
    pub role: Option<SubjectRoleCode>,
    pub name: Option<PersonName>,
    pub gender: Option<GenderCode>,
    pub birth_time: Option<Timestamp>,
    pub race: Option<RaceCode>,
}

impl SubjectDetails {
    /// Subject identified by an extension under the default root.
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            id: Some(Identifier::extension(extension)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn role(mut self, role: SubjectRoleCode) -> Self {
        self.role = Some(role);
        self
    }

    /// Blank parts stay unset; all four blank keeps an explicit empty name.
    #[must_use]
    pub fn name(mut self, prefix: &str, given: &str, family: &str, suffix: &str) -> Self {
        self.name = Some(PersonName::from_parts(prefix, given, family, suffix));
        self
    }

    #[must_use]
    pub fn gender(mut self, gender: GenderCode) -> Self {
        self.gender = Some(gender);
        self
    }

    #[must_use]
    pub fn birth_time(mut self, birth_time: Timestamp) -> Self {
        self.birth_time = Some(birth_time);
        self
    }

    #[must_use]
    pub fn race(mut self, race: RaceCode) -> Self {
        self.race = Some(race);
        self
    }

    fn has_demographics(&self) -> bool {
        self.name.is_some()
            || self.gender.is_some()
            || self.birth_time.is_some()
            || self.race.is_some()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

impl Document {
    /// Configure the process-wide default root and identify the document.
    pub fn set_root_id(&mut self, root: &str, extension: Option<&str>) -> &mut Self {
        set_default_root(root);
        self.id = Some(Identifier {
            root: root.to_string(),
            extension: non_blank(extension),
        });
        self
    }

    pub fn set_id(&mut self, id: Identifier) -> &mut Self {
        self.id = Some(id);
        self
    }

    pub fn set_code(&mut self, code: DocumentCode) -> &mut Self {
        self.code = Some(CodedValue::of(code));
        self
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(text.into());
        self
    }

    pub fn set_effective_time(&mut self, low: Timestamp, high: Timestamp) -> &mut Self {
        self.effective_time = Some(TimeInterval::between(low, high));
        self
    }

    pub fn set_confidentiality(&mut self, code: ConfidentialityCode) -> &mut Self {
        self.confidentiality = Some(CodedValue::of(code));
        self
    }

    pub fn set_reason(&mut self, code: ReasonCode) -> &mut Self {
        self.reason = Some(CodedValue::of(code));
        self
    }

    fn context_mut(&mut self) -> &mut TrialContext {
        self.trial_context.get_or_insert_with(TrialContext::default)
    }

    pub fn set_trial(&mut self, id: Identifier, title: Option<&str>) -> &mut Self {
        let trial = &mut self.context_mut().trial;
        trial.id = Some(id);
        if let Some(title) = non_blank(title) {
            trial.title = Some(title);
        }
        self
    }

    pub fn set_timepoint(
        &mut self,
        code: LocalCode,
        effective_time: Option<TimeInterval>,
    ) -> &mut Self {
        let timepoint: &mut TimepointEvent = &mut self.context_mut().timepoint;
        timepoint.code = Some(code);
        if effective_time.is_some() {
            timepoint.effective_time = effective_time;
        }
        self
    }

    /// Fill in subject fields, creating the trial context on first use.
    pub fn set_subject(&mut self, details: SubjectDetails) -> &mut Self {
        let has_demographics = details.has_demographics();
        let subject = &mut self.context_mut().subject;
        if details.id.is_some() {
            subject.id = details.id;
        }
        if let Some(role) = details.role {
            subject.role = Some(CodedValue::of(role));
        }
        if has_demographics {
            let demographics = subject.demographics.get_or_insert_with(Default::default);
            if details.name.is_some() {
                demographics.name = details.name;
            }
            if let Some(gender) = details.gender {
                demographics.gender = Some(CodedValue::of(gender));
            }
            if details.birth_time.is_some() {
                demographics.birth_time = details.birth_time;
            }
            if let Some(race) = details.race {
                demographics.race = Some(CodedValue::of(race));
            }
        }
        self
    }

    /// Fill in the trial site, creating the trial context on first use.
    pub fn set_location(
        &mut self,
        site_id: &str,
        name: Option<&str>,
        city: Option<&str>,
        state: Option<&str>,
        country: Option<&str>,
    ) -> &mut Self {
        let site: &mut TrialSite = self
            .context_mut()
            .trial
            .site
            .get_or_insert_with(TrialSite::default);
        site.id = Some(Identifier::extension(site_id));

        let location = site.location.get_or_insert_with(SiteLocation::default);
        if let Some(name) = non_blank(name) {
            location.name = Some(name);
        }
        let address = Address {
            city: non_blank(city),
            state: non_blank(state),
            country: non_blank(country),
        };
        if !address.is_empty() {
            location.address = Some(address);
        }
        self
    }

    /// Set the site's responsible investigator.
    ///
    /// Blank name parts are left unset. When every part is blank the
    /// investigator still gets an explicit empty name.
    pub fn set_responsible_party(
        &mut self,
        investigator_id: &str,
        prefix: &str,
        given: &str,
        family: &str,
        suffix: &str,
    ) -> &mut Self {
        let site = self
            .context_mut()
            .trial
            .site
            .get_or_insert_with(TrialSite::default);
        site.investigator = Some(Investigator {
            id: Some(Identifier::extension(investigator_id)),
            name: Some(PersonName::from_parts(prefix, given, family, suffix)),
        });
        self
    }

    /// Trial context accessor for read-only callers.
    pub fn trial(&self) -> Option<&ClinicalTrial> {
        self.trial_context.as_ref().map(|context| &context.trial)
    }

    pub fn add_series(&mut self, series: Series) -> &mut Self {
        self.series.push(series);
        self
    }

    /// The series that refinement operations apply to.
    pub fn last_series_mut(&mut self) -> Option<&mut Series> {
        self.series.last_mut()
    }

    pub fn add_rhythm_series(&mut self, waveform: WaveformSeries) -> Result<&mut Self> {
        self.add_waveform_series(SeriesCode::Rhythm, waveform)
    }

    pub fn add_representative_beat_series(
        &mut self,
        waveform: WaveformSeries,
    ) -> Result<&mut Self> {
        self.add_waveform_series(SeriesCode::RepresentativeBeat, waveform)
    }

    fn add_waveform_series(
        &mut self,
        code: SeriesCode,
        waveform: WaveformSeries,
    ) -> Result<&mut Self> {
        let WaveformSeries {
            start,
            end,
            low_inclusive,
            high_inclusive,
            sample_rate,
            mut leads,
            origin,
            scale,
        } = waveform;

        if !(sample_rate > 0.0 && sample_rate.is_finite()) {
            return Err(ModelError::InvalidSampleRate { sample_rate });
        }
        let increment = 1.0 / sample_rate;

        leads.sort_by_key(|(lead, _)| lead.canonical_rank());

        let mut sequences = Vec::with_capacity(leads.len() + 1);
        sequences.push(Sequence {
            code: CodedValue::of(SequenceCode::Time(TimeAxisCode::Absolute)),
            value: SequenceValue::TimeGrid(RegularTimeGrid {
                head: start,
                head_unit: Some(TIME_UNIT.to_string()),
                increment: PhysicalQuantity::new(increment, TIME_UNIT),
            }),
        });
        let lead_count = leads.len();
        let mut sample_count = 0usize;
        for (lead, digits) in leads {
            sample_count += digits.len();
            sequences.push(Sequence {
                code: CodedValue::of(SequenceCode::Lead(lead)),
                value: SequenceValue::Samples(SampledQuantityList {
                    origin: PhysicalQuantity::new(origin, VOLTAGE_UNIT),
                    scale: PhysicalQuantity::new(scale, VOLTAGE_UNIT),
                    digits,
                }),
            });
        }

        let effective_time = TimeInterval {
            low: Some(TimeBound {
                value: start,
                inclusive: low_inclusive,
            }),
            high: Some(TimeBound {
                value: end,
                inclusive: high_inclusive,
            }),
        };

        self.series.push(Series {
            code: Some(CodedValue::of(code)),
            effective_time: Some(effective_time),
            sequence_sets: vec![SequenceSet { sequences }],
            ..Series::default()
        });
        debug!(
            series_code = %code,
            series_index = self.series.len() - 1,
            sample_rate,
            increment,
            lead_count,
            sample_count,
            "waveform series added"
        );
        Ok(self)
    }

    fn refine_last_series(
        &mut self,
        operation: &'static str,
        apply: impl FnOnce(&mut Series),
    ) -> &mut Self {
        match self.series.last_mut() {
            Some(series) => apply(series),
            None => debug!(operation, "no series to refine, ignoring"),
        }
        self
    }

    pub fn set_series_author(&mut self, author: SeriesAuthor) -> &mut Self {
        self.refine_last_series("set_series_author", |series| {
            series.author = Some(author);
        })
    }

    pub fn add_secondary_performer(&mut self, performer: SecondaryPerformer) -> &mut Self {
        self.refine_last_series("add_secondary_performer", |series| {
            series.secondary_performers.push(performer);
        })
    }

    pub fn add_control_variable(&mut self, variable: ControlVariable) -> &mut Self {
        self.refine_last_series("add_control_variable", |series| {
            series.control_variables.push(variable);
        })
    }

    pub fn set_series_code(&mut self, code: SeriesCode) -> &mut Self {
        self.refine_last_series("set_series_code", |series| {
            series.code = Some(CodedValue::of(code));
        })
    }

    pub fn set_series_id(&mut self, id: Identifier) -> &mut Self {
        self.refine_last_series("set_series_id", |series| {
            series.id = Some(id);
        })
    }

    pub fn add_annotation_set(&mut self, set: AnnotationSet) -> &mut Self {
        self.refine_last_series("add_annotation_set", |series| {
            series.annotation_sets.push(set);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(value: &str) -> Timestamp {
        Timestamp::parse(value).unwrap()
    }

    #[test]
    fn non_finite_sample_rate_is_rejected() {
        let mut doc = Document::new();
        let waveform = WaveformSeries::new(ts("20240101"), ts("20240101"), f64::NAN);
        assert!(matches!(
            doc.add_rhythm_series(waveform),
            Err(ModelError::InvalidSampleRate { .. })
        ));
        assert!(doc.series.is_empty());
    }

    #[test]
    fn extended_leads_keep_input_order_after_standard_ones() {
        let mut doc = Document::new();
        let waveform = WaveformSeries::new(ts("20240101"), ts("20240101"), 250.0)
            .lead(LeadCode::Z, vec![1])
            .lead(LeadCode::V7, vec![2])
            .lead(LeadCode::AVL, vec![3]);
        doc.add_representative_beat_series(waveform).unwrap();

        let leads: Vec<_> = doc.series[0].leads().map(|(lead, _)| lead).collect();
        assert_eq!(leads, vec![LeadCode::AVL, LeadCode::Z, LeadCode::V7]);
        assert_eq!(doc.series[0].series_code(), Some(SeriesCode::RepresentativeBeat));
    }

    #[test]
    fn location_leaves_missing_address_parts_unset() {
        let mut doc = Document::new();
        doc.set_location("site-1", Some("Clinic"), Some("Boston"), None, Some(""));
        let location = doc
            .trial()
            .and_then(|trial| trial.site.as_ref())
            .and_then(|site| site.location.as_ref())
            .unwrap();
        assert_eq!(location.name.as_deref(), Some("Clinic"));
        let address = location.address.as_ref().unwrap();
        assert_eq!(address.city.as_deref(), Some("Boston"));
        assert_eq!(address.state, None);
        assert_eq!(address.country, None);
    }
}

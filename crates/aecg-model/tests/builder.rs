use aecg_model::{
    Document, GenderCode, LeadCode, ModelError, PersonName, SeriesAuthor, SeriesCode,
    SubjectDetails, Timestamp, WaveformSeries,
};

fn ts(value: &str) -> Timestamp {
    Timestamp::parse(value).unwrap()
}

fn waveform(sample_rate: f64) -> WaveformSeries {
    WaveformSeries::new(ts("20021122091000"), ts("20021122091010"), sample_rate)
}

#[test]
fn leads_are_stored_in_canonical_order() {
    let mut doc = Document::new();
    doc.add_rhythm_series(
        waveform(500.0)
            .lead(LeadCode::V1, vec![3, 3])
            .lead(LeadCode::II, vec![2, 2])
            .lead(LeadCode::I, vec![1, 1]),
    )
    .unwrap();

    let set = &doc.series[0].sequence_sets[0];
    let codes: Vec<&str> = set
        .sequences
        .iter()
        .map(|sequence| aecg_model::Code::as_str(&sequence.code.code))
        .collect();
    assert_eq!(
        codes,
        vec![
            "TIME_ABSOLUTE",
            "MDC_ECG_LEAD_I",
            "MDC_ECG_LEAD_II",
            "MDC_ECG_LEAD_V1"
        ]
    );
    let first_lead = set.leads().next().unwrap();
    assert_eq!(first_lead.0, LeadCode::I);
    assert_eq!(first_lead.1.digits, vec![1, 1]);
}

#[test]
fn increment_is_reciprocal_of_sample_rate() {
    let mut doc = Document::new();
    doc.add_rhythm_series(waveform(500.0).lead(LeadCode::II, vec![0]))
        .unwrap();

    let grid = doc.series[0].sequence_sets[0].time_axis().unwrap();
    assert_eq!(grid.increment.value, 0.002);
    assert_eq!(grid.increment.unit.as_deref(), Some("s"));
    assert_eq!(grid.head, ts("20021122091000"));
    assert_eq!(doc.series[0].sample_rate(), Some(500.0));
}

#[test]
fn zero_or_negative_sample_rate_is_an_error() {
    let mut doc = Document::new();
    let err = doc.add_rhythm_series(waveform(0.0)).unwrap_err();
    assert_eq!(err, ModelError::InvalidSampleRate { sample_rate: 0.0 });
    assert!(doc.add_rhythm_series(waveform(-250.0)).is_err());
    assert!(doc.series.is_empty());
}

#[test]
fn effective_time_carries_inclusive_flags() {
    let mut doc = Document::new();
    doc.add_rhythm_series(waveform(250.0).inclusive(true, false))
        .unwrap();
    let window = doc.series[0].effective_time.unwrap();
    assert_eq!(window.low.unwrap().inclusive, Some(true));
    assert_eq!(window.high.unwrap().inclusive, Some(false));
    assert_eq!(window.high.unwrap().value, ts("20021122091010"));
}

#[test]
fn origin_and_scale_apply_to_every_lead() {
    let mut doc = Document::new();
    doc.add_rhythm_series(
        waveform(1000.0)
            .origin_scale(-5.0, 2.5)
            .lead(LeadCode::III, vec![4])
            .lead(LeadCode::AVF, vec![-2]),
    )
    .unwrap();
    let values: Vec<Option<f64>> = doc.series[0]
        .leads()
        .map(|(_, samples)| samples.physical_value(0))
        .collect();
    assert_eq!(values, vec![Some(5.0), Some(-10.0)]);
}

#[test]
fn refinement_before_any_series_is_a_no_op() {
    let mut doc = Document::new();
    doc.set_series_author(SeriesAuthor::device("MAC 5500", "12SL v239", "ACME"))
        .set_series_code(SeriesCode::RepresentativeBeat);
    assert!(doc.series.is_empty());
}

#[test]
fn refinement_targets_most_recent_series() {
    let mut doc = Document::new();
    doc.add_rhythm_series(waveform(500.0)).unwrap();
    doc.add_rhythm_series(waveform(500.0)).unwrap();
    doc.set_series_author(SeriesAuthor::device("MAC 5500", "12SL v239", "ACME"));

    assert!(doc.series[0].author.is_none());
    let author = doc.series[1].author.as_ref().unwrap();
    assert_eq!(author.manufacturer.as_deref(), Some("ACME"));
    assert_eq!(author.device.model_name.as_deref(), Some("MAC 5500"));
}

#[test]
fn subject_setter_creates_context_lazily() {
    let mut doc = Document::new();
    assert!(doc.trial_context.is_none());
    doc.set_subject(SubjectDetails::new("SUBJ-001").gender(GenderCode::Female));

    let subject = doc.subject().unwrap();
    assert_eq!(
        subject.id.as_ref().and_then(|id| id.extension.as_deref()),
        Some("SUBJ-001")
    );
    let demographics = subject.demographics.as_ref().unwrap();
    assert_eq!(demographics.gender.as_ref().unwrap().code, GenderCode::Female);
    assert!(demographics.name.is_none());
    assert!(demographics.birth_time.is_none());

    // A second call fills in more fields without clearing the first.
    doc.set_subject(SubjectDetails::default().birth_time(ts("19700101")));
    let demographics = doc.subject().unwrap().demographics.as_ref().unwrap();
    assert!(demographics.gender.is_some());
    assert_eq!(demographics.birth_time, Some(ts("19700101")));
}

#[test]
fn all_blank_name_is_an_explicit_empty_name() {
    let mut doc = Document::new();
    doc.set_responsible_party("INV-9", "", "", "", "");
    let investigator = doc
        .trial()
        .and_then(|trial| trial.site.as_ref())
        .and_then(|site| site.investigator.as_ref())
        .unwrap();
    assert_eq!(investigator.name, Some(PersonName::default()));

    doc.set_subject(SubjectDetails::default().name("", "", "", ""));
    let name = doc
        .subject()
        .and_then(|subject| subject.demographics.as_ref())
        .and_then(|demographics| demographics.name.as_ref());
    assert_eq!(name, Some(&PersonName::default()));
}

#[test]
fn partial_name_leaves_missing_parts_unset() {
    let mut doc = Document::new();
    doc.set_responsible_party("INV-9", "Dr.", "", "Jones", "");
    let name = doc
        .trial()
        .and_then(|trial| trial.site.as_ref())
        .and_then(|site| site.investigator.as_ref())
        .and_then(|investigator| investigator.name.clone())
        .unwrap();
    assert_eq!(name.prefix.as_deref(), Some("Dr."));
    assert_eq!(name.given, None);
    assert_eq!(name.family.as_deref(), Some("Jones"));
    assert_eq!(name.suffix, None);
}

use std::cell::Cell;
use std::sync::atomic::AtomicBool;

use aecg_model::{
    Annotation, AnnotationCode, AnnotationSet, CodedValue, Document, DocumentCode, Identifier,
    LeadCode, PhysicalQuantity, SampledQuantityList, Sequence, SequenceCode, SequenceSet,
    SequenceValue, Series, SubjectDetails, TimeInterval, Timestamp, WaveformSeries,
};
use aecg_validate::{
    CancelSignal, CancellationToken, DefectKind, NeverCancel, ValidationOutcome, validate,
};

fn ts(value: &str) -> Timestamp {
    Timestamp::parse(value).unwrap()
}

fn complete_document() -> Document {
    let start = ts("20021122091000");
    let end = ts("20021122091010");
    let mut doc = Document::new();
    doc.set_id(Identifier::new("1.2.3", "ecg"))
        .set_code(DocumentCode::RoutineEcg)
        .set_effective_time(start, end)
        .set_trial(Identifier::new("1.2.3", "trial"), None)
        .set_subject(SubjectDetails {
            id: Some(Identifier::new("1.2.3", "subject")),
            ..SubjectDetails::default()
        });
    doc.add_rhythm_series(
        WaveformSeries::new(start, end, 500.0)
            .lead(LeadCode::I, vec![1, 2, 3])
            .lead(LeadCode::II, vec![4, 5, 6]),
    )
    .unwrap();
    doc.add_rhythm_series(WaveformSeries::new(start, end, 500.0).lead(LeadCode::V1, vec![7]))
        .unwrap();
    doc
}

fn report(outcome: &ValidationOutcome) -> String {
    outcome
        .defects()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn complete_document_is_valid() {
    assert_eq!(
        validate(&complete_document(), &NeverCancel),
        ValidationOutcome::Valid
    );
}

#[test]
fn decoded_sample_is_valid() {
    let bytes = include_bytes!("../../aecg-xml/tests/data/annotated_ecg.xml");
    let doc = aecg_xml::decode(bytes).unwrap();
    assert!(validate(&doc, &NeverCancel).is_valid());
}

#[test]
fn missing_id_and_effective_time_yield_two_defects_in_order() {
    let mut doc = complete_document();
    doc.id = None;
    doc.effective_time = None;

    let outcome = validate(&doc, &NeverCancel);
    let kinds: Vec<&DefectKind> = outcome.defects().iter().map(|d| &d.kind).collect();
    assert_eq!(
        kinds,
        vec![
            &DefectKind::MissingDocumentId,
            &DefectKind::MissingEffectiveTime
        ]
    );
    insta::assert_snapshot!(report(&outcome), @r"
[AECG0001] /AnnotatedECG: document identifier is missing
[AECG0003] /AnnotatedECG: effective time is missing
");
}

#[test]
fn empty_document_reports_every_header_rule() {
    let outcome = validate(&Document::new(), &NeverCancel);
    insta::assert_snapshot!(report(&outcome), @r"
[AECG0001] /AnnotatedECG: document identifier is missing
[AECG0002] /AnnotatedECG: document code is missing
[AECG0003] /AnnotatedECG: effective time is missing
[AECG0004] /AnnotatedECG: clinical trial and subject context is missing
");
}

#[test]
fn series_level_defects_carry_node_paths() {
    let mut doc = complete_document();

    // Second series: no code, empty sequence set, lead-first set with no digits.
    let series = &mut doc.series[1];
    series.code = None;
    let lead_only = SequenceSet {
        sequences: vec![Sequence {
            code: CodedValue::of(SequenceCode::Lead(LeadCode::V2)),
            value: SequenceValue::Samples(SampledQuantityList {
                origin: PhysicalQuantity::new(0.0, "uV"),
                scale: PhysicalQuantity::new(1.0, "uV"),
                digits: Vec::new(),
            }),
        }],
    };
    series.sequence_sets = vec![SequenceSet::default(), lead_only];
    series.annotation_sets.push(
        AnnotationSet::new(None)
            .with_annotation(Annotation::new(AnnotationCode::HeartRate))
            .with_annotation(
                Annotation::new(AnnotationCode::Beat)
                    .with_child(Annotation::new(AnnotationCode::QtInterval))
                    .with_child(Annotation::new(AnnotationCode::QtInterval)),
            )
            .with_annotation(Annotation::new(AnnotationCode::HeartRate)),
    );

    let outcome = validate(&doc, &NeverCancel);
    insta::assert_snapshot!(report(&outcome), @r"
[AECG0009] /AnnotatedECG/component[2]/series: series code is missing
[AECG0011] /AnnotatedECG/component[2]/series/component[1]/sequenceSet: sequence set has no sequences
[AECG0012] /AnnotatedECG/component[2]/series/component[2]/sequenceSet/component[1]/sequence: first sequence of the set is not a time axis
[AECG0013] /AnnotatedECG/component[2]/series/component[2]/sequenceSet/component[1]/sequence/value: sampled sequence has no digits
[AECG0014] /AnnotatedECG/component[2]/series/subjectOf[1]/annotationSet/component[3]/annotation: annotation code MDC_ECG_HEART_RATE appears more than once among siblings
[AECG0014] /AnnotatedECG/component[2]/series/subjectOf[1]/annotationSet/component[2]/annotation/component[2]/annotation: annotation code MDC_ECG_TIME_PD_QT appears more than once among siblings
");
}

#[test]
fn series_without_sequence_sets_is_reported() {
    let mut doc = complete_document();
    let code = doc.series[0].code.clone();
    doc.add_series(Series {
        code,
        ..Series::default()
    });
    let outcome = validate(&doc, &NeverCancel);
    assert_eq!(outcome.defects().len(), 1);
    assert_eq!(outcome.defects()[0].kind, DefectKind::MissingSequenceSet);
    assert_eq!(outcome.defects()[0].path, "/AnnotatedECG/component[3]/series");
}

#[test]
fn trial_context_without_subject_or_trial_id_is_reported() {
    let mut doc = complete_document();
    let context = doc.trial_context.as_mut().unwrap();
    context.subject.id = None;
    context.trial.id = None;

    let outcome = validate(&doc, &NeverCancel);
    insta::assert_snapshot!(report(&outcome), @r"
[AECG0005] /AnnotatedECG/componentOf/timepointEvent/componentOf/subjectAssignment/subject/trialSubject: trial subject identifier is missing
[AECG0006] /AnnotatedECG/componentOf/timepointEvent/componentOf/subjectAssignment/componentOf/clinicalTrial: clinical trial identifier is missing
");
}

#[test]
fn rootless_identifiers_and_inverted_windows_are_reported() {
    let mut doc = complete_document();
    doc.id = Some(Identifier {
        root: String::new(),
        extension: Some("ecg".to_string()),
    });
    doc.series[0].effective_time = Some(TimeInterval::between(
        ts("20021122091010"),
        ts("20021122091000"),
    ));

    let outcome = validate(&doc, &NeverCancel);
    insta::assert_snapshot!(report(&outcome), @r"
[AECG0007] /AnnotatedECG/id: identifier 'ecg' has no root
[AECG0008] /AnnotatedECG/component[1]/series/effectiveTime: effective time starts after it ends
");
}

#[test]
fn pre_cancelled_token_wins_over_defects() {
    let mut doc = complete_document();
    doc.id = None;
    doc.series[1].code = None;

    let token = CancellationToken::new();
    token.cancel();
    assert_eq!(validate(&doc, &token), ValidationOutcome::Cancelled);

    let flag = AtomicBool::new(true);
    assert!(validate(&complete_document(), &flag).is_cancelled());
}

/// Fires after a fixed number of polls.
struct CancelAfter {
    polls: Cell<usize>,
    limit: usize,
}

impl CancelSignal for CancelAfter {
    fn is_cancelled(&self) -> bool {
        let polls = self.polls.get() + 1;
        self.polls.set(polls);
        polls > self.limit
    }
}

#[test]
fn cancellation_mid_traversal_discards_partial_defects() {
    let mut doc = complete_document();
    doc.id = None;
    let signal = CancelAfter {
        polls: Cell::new(0),
        limit: 3,
    };
    assert_eq!(validate(&doc, &signal), ValidationOutcome::Cancelled);
    assert_eq!(signal.polls.get(), 4);
}

#[test]
fn large_sample_lists_cost_one_poll() {
    let start = ts("20021122091000");
    let mut doc = complete_document();
    doc.series.clear();
    doc.add_rhythm_series(
        WaveformSeries::new(start, start, 1000.0).lead(LeadCode::I, vec![0; 100_000]),
    )
    .unwrap();

    let signal = CancelAfter {
        polls: Cell::new(0),
        limit: usize::MAX,
    };
    assert!(validate(&doc, &signal).is_valid());
    // document, trial context, series, sequence set, two sequences
    assert_eq!(signal.polls.get(), 6);
}

use aecg_model::{
    Annotation, AnnotationCode, AnnotationSet, AnnotationValue, Document, LeadCode,
    SupportingRoi, Timestamp, WaveformSeries,
};

fn annotated_document() -> Document {
    let start = Timestamp::parse("20021122091000").unwrap();
    let end = Timestamp::parse("20021122091010").unwrap();
    let mut doc = Document::new();
    doc.add_rhythm_series(WaveformSeries::new(start, end, 500.0).lead(LeadCode::II, vec![1, 2]))
        .unwrap()
        .add_annotation_set(
            AnnotationSet::new(Some(start))
                .with_annotation(
                    Annotation::new(AnnotationCode::HeartRate)
                        .with_value(AnnotationValue::quantity("57", "bpm")),
                )
                .with_annotation(
                    Annotation::new(AnnotationCode::Beat)
                        .with_support(SupportingRoi::lead(LeadCode::II))
                        .with_child(
                            Annotation::new(AnnotationCode::QrsDuration)
                                .with_value(AnnotationValue::quantity("96", "ms")),
                        ),
                ),
        );
    doc
}

#[test]
fn heart_rate_is_found_at_top_level() {
    let doc = annotated_document();
    let set = &doc.series[0].annotation_sets[0];

    let heart_rate = set.find_by_code("MDC_ECG_HEART_RATE").unwrap();
    assert_eq!(heart_rate.code.code, AnnotationCode::HeartRate);
    assert_eq!(heart_rate.value_as_f64(), Some(57.0));
    assert!(set.find_by_code("NOT_PRESENT").is_none());
}

#[test]
fn per_lead_measurement_is_reached_through_the_lead_group() {
    let doc = annotated_document();
    let set = &doc.series[0].annotation_sets[0];

    let group = set.find_by_lead(LeadCode::II).unwrap();
    let qrs = group.find_nested_by_code("MDC_ECG_TIME_PD_QRS").unwrap();
    assert_eq!(qrs.value_as_f64(), Some(96.0));
    assert!(set.find_by_lead(LeadCode::I).is_none());
}

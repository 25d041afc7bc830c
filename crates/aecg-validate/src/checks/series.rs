//! Series, sequence sets and sequences.

use aecg_model::{SequenceSet, SequenceValue, Series};

use crate::checks::annotations;
use crate::defect::DefectKind;
use crate::engine::{Visit, Walker};

pub(crate) fn visit(walker: &mut Walker<'_>, path: &str, series: &Series) -> Visit {
    walker.enter()?;

    if let Some(id) = &series.id {
        walker.check_identifier(&format!("{path}/id"), id);
    }
    if series.code.is_none() {
        walker.report(path, DefectKind::MissingSeriesCode);
    }
    if let Some(window) = &series.effective_time {
        walker.check_interval(&format!("{path}/effectiveTime"), window);
    }
    if let Some(author) = &series.author {
        let author_path = format!("{path}/author/seriesAuthor");
        if let Some(id) = &author.id {
            walker.check_identifier(&format!("{author_path}/id"), id);
        }
        if let Some(id) = &author.device.id {
            walker.check_identifier(&format!("{author_path}/manufacturedSeriesDevice/id"), id);
        }
    }
    for (index, performer) in series.secondary_performers.iter().enumerate() {
        if let Some(id) = &performer.id {
            walker.check_identifier(
                &format!("{path}/secondaryPerformer[{}]/seriesPerformer/id", index + 1),
                id,
            );
        }
    }
    if series.sequence_sets.is_empty() {
        walker.report(path, DefectKind::MissingSequenceSet);
    }

    for (index, set) in series.sequence_sets.iter().enumerate() {
        let set_path = format!("{path}/component[{}]/sequenceSet", index + 1);
        visit_sequence_set(walker, &set_path, set)?;
    }
    for (index, set) in series.annotation_sets.iter().enumerate() {
        let set_path = format!("{path}/subjectOf[{}]/annotationSet", index + 1);
        annotations::visit_set(walker, &set_path, set)?;
    }
    Ok(())
}

fn visit_sequence_set(walker: &mut Walker<'_>, path: &str, set: &SequenceSet) -> Visit {
    walker.enter()?;

    match set.sequences.first() {
        None => walker.report(path, DefectKind::EmptySequenceSet),
        Some(first) if !first.code.code.is_time() => walker.report(
            &format!("{path}/component[1]/sequence"),
            DefectKind::MissingTimeAxis,
        ),
        Some(_) => {}
    }

    for (index, sequence) in set.sequences.iter().enumerate() {
        walker.enter()?;
        if let SequenceValue::Samples(samples) = &sequence.value
            && samples.is_empty()
        {
            walker.report(
                &format!("{path}/component[{}]/sequence/value", index + 1),
                DefectKind::EmptySampleList,
            );
        }
    }
    Ok(())
}

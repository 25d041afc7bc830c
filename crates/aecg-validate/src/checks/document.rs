//! Document header and clinical-trial context.

use aecg_model::{Document, TrialContext};

use crate::checks::series;
use crate::defect::DefectKind;
use crate::engine::{Visit, Walker};

const ROOT: &str = "/AnnotatedECG";

pub(crate) fn visit(walker: &mut Walker<'_>, document: &Document) -> Visit {
    walker.enter()?;

    match &document.id {
        Some(id) => walker.check_identifier(&format!("{ROOT}/id"), id),
        None => walker.report(ROOT, DefectKind::MissingDocumentId),
    }
    if document.code.is_none() {
        walker.report(ROOT, DefectKind::MissingDocumentCode);
    }
    match &document.effective_time {
        Some(window) => walker.check_interval(&format!("{ROOT}/effectiveTime"), window),
        None => walker.report(ROOT, DefectKind::MissingEffectiveTime),
    }

    match &document.trial_context {
        Some(context) => visit_trial_context(walker, context)?,
        None => walker.report(ROOT, DefectKind::MissingTrialContext),
    }

    for (index, item) in document.series.iter().enumerate() {
        let path = format!("{ROOT}/component[{}]/series", index + 1);
        series::visit(walker, &path, item)?;
    }
    Ok(())
}

fn visit_trial_context(walker: &mut Walker<'_>, context: &TrialContext) -> Visit {
    walker.enter()?;

    let timepoint = format!("{ROOT}/componentOf/timepointEvent");
    if let Some(window) = &context.timepoint.effective_time {
        walker.check_interval(&format!("{timepoint}/effectiveTime"), window);
    }

    let assignment = format!("{timepoint}/componentOf/subjectAssignment");
    let subject = format!("{assignment}/subject/trialSubject");
    match &context.subject.id {
        Some(id) => walker.check_identifier(&format!("{subject}/id"), id),
        None => walker.report(&subject, DefectKind::MissingSubjectId),
    }

    let trial = format!("{assignment}/componentOf/clinicalTrial");
    match &context.trial.id {
        Some(id) => walker.check_identifier(&format!("{trial}/id"), id),
        None => walker.report(&trial, DefectKind::MissingTrialId),
    }
    if let Some(site) = &context.trial.site {
        let site_path = format!("{trial}/location/trialSite");
        if let Some(id) = &site.id {
            walker.check_identifier(&format!("{site_path}/id"), id);
        }
        if let Some(id) = site.investigator.as_ref().and_then(|i| i.id.as_ref()) {
            walker.check_identifier(
                &format!("{site_path}/responsibleParty/trialInvestigator/id"),
                id,
            );
        }
    }
    Ok(())
}

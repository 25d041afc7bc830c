//! Annotation sets and the recursive annotation tree.

use std::collections::HashSet;

use aecg_model::{Annotation, AnnotationCode, AnnotationSet, Code};

use crate::defect::DefectKind;
use crate::engine::{Visit, Walker};

pub(crate) fn visit_set(walker: &mut Walker<'_>, path: &str, set: &AnnotationSet) -> Visit {
    walker.enter()?;
    check_siblings(walker, path, &set.annotations);
    for (index, annotation) in set.annotations.iter().enumerate() {
        visit_annotation(walker, &component_path(path, index), annotation)?;
    }
    Ok(())
}

fn visit_annotation(walker: &mut Walker<'_>, path: &str, annotation: &Annotation) -> Visit {
    walker.enter()?;
    check_siblings(walker, path, &annotation.children);
    for (index, child) in annotation.children.iter().enumerate() {
        visit_annotation(walker, &component_path(path, index), child)?;
    }
    Ok(())
}

fn component_path(parent: &str, index: usize) -> String {
    format!("{parent}/component[{}]/annotation", index + 1)
}

/// Codes must be unique among direct siblings; each repeat is reported at
/// its own position.
fn check_siblings(walker: &mut Walker<'_>, parent: &str, siblings: &[Annotation]) {
    let mut seen: HashSet<AnnotationCode> = HashSet::with_capacity(siblings.len());
    for (index, sibling) in siblings.iter().enumerate() {
        if !seen.insert(sibling.code.code) {
            walker.report(
                &component_path(parent, index),
                DefectKind::DuplicateAnnotationCode {
                    code: sibling.code.code.as_str().to_string(),
                },
            );
        }
    }
}

//! Depth-first, pre-order traversal with a cancellation check at every node.
//!
//! Local checks append to a shared accumulator and never stop the walk. The
//! only early exit is cancellation, which discards everything collected so
//! far.

use aecg_model::{Document, Identifier, TimeInterval};
use tracing::{debug, info, info_span, warn};

use crate::cancel::CancelSignal;
use crate::checks;
use crate::defect::{Defect, DefectKind};

/// Result of [`validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Valid,
    /// Every defect in the document, in document order.
    Invalid(Vec<Defect>),
    /// The signal fired before the traversal finished.
    Cancelled,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ValidationOutcome::Cancelled)
    }

    /// Defects of an `Invalid` outcome; empty otherwise.
    pub fn defects(&self) -> &[Defect] {
        match self {
            ValidationOutcome::Invalid(defects) => defects,
            ValidationOutcome::Valid | ValidationOutcome::Cancelled => &[],
        }
    }
}

/// Marker returned through `?` when the traversal must stop.
#[derive(Debug)]
pub(crate) struct Cancelled;

pub(crate) type Visit = Result<(), Cancelled>;

pub(crate) struct Walker<'a> {
    cancel: &'a dyn CancelSignal,
    defects: Vec<Defect>,
    nodes: usize,
}

impl<'a> Walker<'a> {
    fn new(cancel: &'a dyn CancelSignal) -> Self {
        Self {
            cancel,
            defects: Vec::new(),
            nodes: 0,
        }
    }

    /// Called once on entering each node, before its local checks.
    pub(crate) fn enter(&mut self) -> Visit {
        if self.cancel.is_cancelled() {
            return Err(Cancelled);
        }
        self.nodes += 1;
        Ok(())
    }

    pub(crate) fn report(&mut self, path: &str, kind: DefectKind) {
        debug!(rule_id = kind.rule_id(), path, "defect");
        self.defects.push(Defect {
            kind,
            path: path.to_string(),
        });
    }

    pub(crate) fn check_identifier(&mut self, path: &str, id: &Identifier) {
        if !id.has_root() {
            self.report(
                path,
                DefectKind::IdentifierWithoutRoot {
                    extension: id.extension.clone(),
                },
            );
        }
    }

    pub(crate) fn check_interval(&mut self, path: &str, window: &TimeInterval) {
        if window.is_inverted() {
            self.report(path, DefectKind::InvertedEffectiveTime);
        }
    }
}

/// Check a document against the annotated ECG conformance rules.
///
/// `cancel` is polled once per node; a large sample list is a single node,
/// so cancellation latency does not grow with sample count.
pub fn validate<C: CancelSignal>(document: &Document, cancel: &C) -> ValidationOutcome {
    let span = info_span!("validate", series = document.series.len());
    let _guard = span.enter();

    let mut walker = Walker::new(cancel);
    if checks::document::visit(&mut walker, document).is_err() {
        info!(nodes_visited = walker.nodes, "validation cancelled");
        return ValidationOutcome::Cancelled;
    }

    if walker.defects.is_empty() {
        info!(nodes_visited = walker.nodes, "document is valid");
        ValidationOutcome::Valid
    } else {
        warn!(
            nodes_visited = walker.nodes,
            defect_count = walker.defects.len(),
            "document has conformance defects"
        );
        ValidationOutcome::Invalid(walker.defects)
    }
}

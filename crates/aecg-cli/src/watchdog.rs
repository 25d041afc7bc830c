//! Time-limited validation.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use aecg_model::Document;
use aecg_validate::{CancellationToken, NeverCancel, ValidationOutcome, validate};
use tracing::warn;

/// Validate `document`, cancelling from a watchdog thread once `timeout` elapses.
///
/// The watchdog exits without cancelling as soon as validation returns.
pub fn validate_with_timeout(document: &Document, timeout: Option<Duration>) -> ValidationOutcome {
    let Some(timeout) = timeout else {
        return validate(document, &NeverCancel);
    };
    let token = CancellationToken::new();
    let (done_tx, done_rx) = mpsc::channel::<()>();
    let watchdog = {
        let token = token.clone();
        thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = done_rx.recv_timeout(timeout) {
                warn!(timeout_ms = timeout.as_millis(), "validation timed out");
                token.cancel();
            }
        })
    };
    let outcome = validate(document, &token);
    drop(done_tx);
    if watchdog.join().is_err() {
        warn!("watchdog thread panicked");
    }
    outcome
}

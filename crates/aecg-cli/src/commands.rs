use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span, warn};

use aecg_cli::logging::redact_value;
use aecg_cli::summary::{print_defects, print_summary, summarize};
use aecg_cli::watchdog::validate_with_timeout;
use aecg_model::Document;
use aecg_validate::ValidationOutcome;
use aecg_xml::{EncodeOptions, decode, encode_with};

use crate::cli::{FormatArgs, InspectArgs, ValidateArgs};

pub fn run_validate(args: &ValidateArgs) -> Result<ValidationOutcome> {
    let span = info_span!("validate", file = %args.file.display());
    let _guard = span.enter();
    let document = read_document(&args.file)?;
    let outcome = validate_with_timeout(&document, args.timeout_ms.map(Duration::from_millis));
    match &outcome {
        ValidationOutcome::Valid => println!("valid"),
        ValidationOutcome::Invalid(defects) => print_defects(defects),
        ValidationOutcome::Cancelled => println!("cancelled"),
    }
    Ok(outcome)
}

pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    let span = info_span!("inspect", file = %args.file.display());
    let _guard = span.enter();
    let document = read_document(&args.file)?;
    let summary = summarize(&document);
    if let Some(subject) = &summary.subject {
        debug!(subject = redact_value(subject), "subject");
    }
    if args.json {
        let json = serde_json::to_string_pretty(&summary).context("serialize summary")?;
        println!("{json}");
    } else {
        print_summary(&summary);
    }
    Ok(())
}

pub fn run_format(args: &FormatArgs) -> Result<()> {
    let span = info_span!("format", file = %args.input.display());
    let _guard = span.enter();
    let document = read_document(&args.input)?;
    let options = EncodeOptions {
        indent: args.indent,
    };
    let bytes = encode_with(&document, &options).context("encode document")?;
    match &args.output {
        Some(path) => {
            fs::write(path, &bytes).with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), bytes = bytes.len(), "document written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes).context("write stdout")?;
            stdout.write_all(b"\n").context("write stdout")?;
        }
    }
    Ok(())
}

fn read_document(path: &Path) -> Result<Document> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let document = decode(&bytes)
        .inspect_err(|error| warn!(%error, "undecodable document"))
        .with_context(|| format!("decode {}", path.display()))?;
    info!(
        series = document.series.len(),
        samples = document.sample_count(),
        "document loaded"
    );
    Ok(document)
}

//! XML to document tree.

use aecg_model::{
    Address, Annotation, AnnotationSet, AnnotationValue, ClinicalTrial, Code, CodeSystem,
    CodeSystemId, CodedValue, ControlVariable, Device, Document, Identifier, Investigator,
    LocalCode, ModelError, PersonName, PhysicalQuantity, RoiBoundary, SecondaryPerformer,
    Sequence, SequenceSet, Series, SeriesAuthor, SiteLocation, SubjectDemographics,
    SupportingRoi, TimeBound, TimeInterval, Timestamp, TimepointEvent, TrialContext, TrialSite,
    TrialSubject, parse_code,
};
use tracing::debug;

use crate::common::ROOT_ELEMENT;
use crate::element::Element;
use crate::error::{CodecError, Result};
use crate::sequence::decode_sequence_value;

pub(crate) fn decode_document(root: &Element) -> Result<Document> {
    if root.name != ROOT_ELEMENT {
        return Err(CodecError::malformed(format!(
            "root element is <{}>, expected <{ROOT_ELEMENT}>",
            root.name
        )));
    }

    let mut series = Vec::new();
    for component in root.children_named("component") {
        if let Some(element) = component.child("series") {
            debug!(series_index = series.len(), "decoding series");
            series.push(decode_series(element)?);
        }
    }

    Ok(Document {
        id: optional(root, "id", decode_identifier)?,
        code: optional(root, "code", decode_coded)?,
        text: free_text_of(root, "text"),
        effective_time: optional(root, "effectiveTime", decode_interval)?,
        confidentiality: optional(root, "confidentialityCode", decode_coded)?,
        reason: optional(root, "reasonCode", decode_coded)?,
        trial_context: root
            .path(&["componentOf", "timepointEvent"])
            .map(decode_trial_context)
            .transpose()?,
        series,
    })
}

/// Decode the first `name` child when present.
fn optional<T>(
    parent: &Element,
    name: &str,
    decode: impl FnOnce(&Element) -> Result<T>,
) -> Result<Option<T>> {
    parent.child(name).map(decode).transpose()
}

/// Token-like content: names, places, model numbers.
fn text_of(parent: &Element, name: &str) -> Option<String> {
    parent.child(name).map(|child| child.text().to_string())
}

/// Narrative content, whitespace included.
fn free_text_of(parent: &Element, name: &str) -> Option<String> {
    parent.child(name).map(|child| child.raw_text().to_string())
}

/// A rootless identifier with an extension takes the configured default root.
fn decode_identifier(element: &Element) -> Result<Identifier> {
    let root = element.attr("root").unwrap_or_default();
    Ok(match element.attr("extension") {
        Some(extension) if root.trim().is_empty() => Identifier::extension(extension),
        extension => Identifier {
            root: root.to_string(),
            extension: extension.map(str::to_string),
        },
    })
}

fn decode_coded<C: Code, S: CodeSystemId + From<CodeSystem>>(
    element: &Element,
) -> Result<CodedValue<C, S>> {
    let code: C = parse_code(element.require_attr("code")?)?;
    let code_system = match element.attr("codeSystem") {
        Some(oid) => S::from_oid(oid).ok_or_else(|| ModelError::UnknownCodeSystem {
            value: oid.to_string(),
        })?,
        None => S::from(code.code_system()),
    };
    Ok(CodedValue::new(
        code,
        code_system,
        element.attr("codeSystemName").map(str::to_string),
        element.attr("displayName").map(str::to_string),
    ))
}

fn decode_local_code(element: &Element) -> Result<LocalCode> {
    Ok(LocalCode {
        code: element.require_attr("code")?.to_string(),
        code_system: element.attr("codeSystem").map(str::to_string),
        code_system_name: element.attr("codeSystemName").map(str::to_string),
        display_name: element.attr("displayName").map(str::to_string),
    })
}

fn decode_timestamp(element: &Element) -> Result<Timestamp> {
    Ok(Timestamp::parse(element.require_attr("value")?)?)
}

fn decode_bound(element: &Element) -> Result<TimeBound> {
    let inclusive = match element.attr("inclusive") {
        None => None,
        Some("true") => Some(true),
        Some("false") => Some(false),
        Some(other) => {
            return Err(CodecError::malformed(format!(
                "<{}> inclusive must be 'true' or 'false', got '{other}'",
                element.name
            )));
        }
    };
    Ok(TimeBound {
        value: decode_timestamp(element)?,
        inclusive,
    })
}

fn decode_interval(element: &Element) -> Result<TimeInterval> {
    Ok(TimeInterval {
        low: optional(element, "low", decode_bound)?,
        high: optional(element, "high", decode_bound)?,
    })
}

fn decode_name(element: &Element) -> PersonName {
    PersonName {
        prefix: text_of(element, "prefix"),
        given: text_of(element, "given"),
        family: text_of(element, "family"),
        suffix: text_of(element, "suffix"),
    }
}

fn decode_quantity_value(element: &Element) -> Result<PhysicalQuantity> {
    let raw = element.require_attr("value")?;
    let value = raw.trim().parse::<f64>().map_err(|_| {
        CodecError::malformed(format!("<{}> value '{raw}' is not a number", element.name))
    })?;
    Ok(PhysicalQuantity {
        value,
        unit: element.attr("unit").map(str::to_string),
    })
}

fn decode_trial_context(timepoint: &Element) -> Result<TrialContext> {
    let assignment = timepoint.path(&["componentOf", "subjectAssignment"]);
    let subject = assignment
        .and_then(|assignment| assignment.path(&["subject", "trialSubject"]))
        .map(decode_subject)
        .transpose()?
        .unwrap_or_default();
    let trial = assignment
        .and_then(|assignment| assignment.path(&["componentOf", "clinicalTrial"]))
        .map(decode_trial)
        .transpose()?
        .unwrap_or_default();

    Ok(TrialContext {
        timepoint: TimepointEvent {
            code: optional(timepoint, "code", decode_local_code)?,
            effective_time: optional(timepoint, "effectiveTime", decode_interval)?,
            reason: free_text_of(timepoint, "text"),
        },
        subject,
        trial,
    })
}

fn decode_subject(element: &Element) -> Result<TrialSubject> {
    let demographics = element
        .child("subjectDemographicPerson")
        .map(|person| -> Result<SubjectDemographics> {
            Ok(SubjectDemographics {
                name: person.child("name").map(decode_name),
                gender: optional(person, "administrativeGenderCode", decode_coded)?,
                birth_time: optional(person, "birthTime", decode_timestamp)?,
                race: optional(person, "raceCode", decode_coded)?,
            })
        })
        .transpose()?;
    Ok(TrialSubject {
        id: optional(element, "id", decode_identifier)?,
        role: optional(element, "code", decode_coded)?,
        demographics,
    })
}

fn decode_trial(element: &Element) -> Result<ClinicalTrial> {
    Ok(ClinicalTrial {
        id: optional(element, "id", decode_identifier)?,
        title: free_text_of(element, "title"),
        site: element
            .path(&["location", "trialSite"])
            .map(decode_site)
            .transpose()?,
    })
}

fn decode_site(element: &Element) -> Result<TrialSite> {
    let location = element.child("location").map(|location| SiteLocation {
        name: text_of(location, "name"),
        address: location.child("addr").map(|addr| Address {
            city: text_of(addr, "city"),
            state: text_of(addr, "state"),
            country: text_of(addr, "country"),
        }),
    });
    let investigator = element
        .path(&["responsibleParty", "trialInvestigator"])
        .map(|investigator| -> Result<Investigator> {
            Ok(Investigator {
                id: optional(investigator, "id", decode_identifier)?,
                name: investigator
                    .path(&["investigatorPerson", "name"])
                    .map(decode_name),
            })
        })
        .transpose()?;
    Ok(TrialSite {
        id: optional(element, "id", decode_identifier)?,
        location,
        investigator,
    })
}

fn decode_series(element: &Element) -> Result<Series> {
    let secondary_performers = element
        .children_named("secondaryPerformer")
        .map(decode_secondary_performer)
        .collect::<Result<Vec<_>>>()?;
    let control_variables = element
        .children_named("controlVariable")
        .filter_map(|wrapper| wrapper.child("controlVariable"))
        .map(decode_control_variable)
        .collect::<Result<Vec<_>>>()?;
    let sequence_sets = element
        .children_named("component")
        .filter_map(|component| component.child("sequenceSet"))
        .map(decode_sequence_set)
        .collect::<Result<Vec<_>>>()?;
    let annotation_sets = element
        .children_named("subjectOf")
        .filter_map(|subject_of| subject_of.child("annotationSet"))
        .map(decode_annotation_set)
        .collect::<Result<Vec<_>>>()?;

    Ok(Series {
        id: optional(element, "id", decode_identifier)?,
        code: optional(element, "code", decode_coded)?,
        effective_time: optional(element, "effectiveTime", decode_interval)?,
        author: element
            .path(&["author", "seriesAuthor"])
            .map(decode_series_author)
            .transpose()?,
        secondary_performers,
        control_variables,
        sequence_sets,
        annotation_sets,
    })
}

fn decode_series_author(element: &Element) -> Result<SeriesAuthor> {
    let device = match element.child("manufacturedSeriesDevice") {
        Some(device) => Device {
            id: optional(device, "id", decode_identifier)?,
            code: optional(device, "code", decode_coded)?,
            model_name: text_of(device, "manufacturerModelName"),
            software_name: text_of(device, "softwareName"),
        },
        None => Device::default(),
    };
    Ok(SeriesAuthor {
        id: optional(element, "id", decode_identifier)?,
        device,
        manufacturer: element
            .path(&["manufacturerOrganization", "name"])
            .map(|name| name.text().to_string()),
    })
}

fn decode_secondary_performer(element: &Element) -> Result<SecondaryPerformer> {
    let performer = element.child("seriesPerformer");
    Ok(SecondaryPerformer {
        function_code: optional(element, "functionCode", decode_coded)?,
        id: performer
            .and_then(|performer| performer.child("id"))
            .map(decode_identifier)
            .transpose()?,
        name: performer
            .and_then(|performer| performer.path(&["assignedPerson", "name"]))
            .map(decode_name),
    })
}

fn decode_control_variable(element: &Element) -> Result<ControlVariable> {
    let components = element
        .children_named("component")
        .filter_map(|component| component.child("controlVariable"))
        .map(decode_control_variable)
        .collect::<Result<Vec<_>>>()?;
    Ok(ControlVariable {
        code: decode_coded(element.require_child("code")?)?,
        value: optional(element, "value", decode_quantity_value)?,
        components,
    })
}

fn decode_sequence_set(element: &Element) -> Result<SequenceSet> {
    let sequences = element
        .children_named("component")
        .filter_map(|component| component.child("sequence"))
        .map(|sequence| -> Result<Sequence> {
            Ok(Sequence {
                code: decode_coded(sequence.require_child("code")?)?,
                value: decode_sequence_value(sequence.child("value").ok_or_else(|| {
                    CodecError::sequence("<sequence> has no <value>")
                })?)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(SequenceSet { sequences })
}

fn decode_annotation_set(element: &Element) -> Result<AnnotationSet> {
    let annotations = element
        .children_named("component")
        .filter_map(|component| component.child("annotation"))
        .map(decode_annotation)
        .collect::<Result<Vec<_>>>()?;
    Ok(AnnotationSet {
        activity_time: optional(element, "activityTime", decode_timestamp)?,
        author: element
            .path(&["author", "assignedEntity", "assignedPerson", "name"])
            .map(decode_name),
        annotations,
    })
}

fn decode_annotation(element: &Element) -> Result<Annotation> {
    let children = element
        .children_named("component")
        .filter_map(|component| component.child("annotation"))
        .map(decode_annotation)
        .collect::<Result<Vec<_>>>()?;
    Ok(Annotation {
        code: decode_coded(element.require_child("code")?)?,
        value: optional(element, "value", decode_annotation_value)?,
        support: element
            .path(&["support", "supportingROI"])
            .map(decode_support)
            .transpose()?,
        children,
    })
}

fn decode_annotation_value(element: &Element) -> Result<AnnotationValue> {
    match element.attr("type").map(str::trim) {
        Some("PQ") => Ok(AnnotationValue::Quantity {
            value: element.attr("value").unwrap_or_default().to_string(),
            unit: element.attr("unit").map(str::to_string),
        }),
        Some("CD") => decode_coded(element).map(AnnotationValue::Coded),
        Some("ST") => Ok(AnnotationValue::Text(element.raw_text().to_string())),
        Some(other) => Err(CodecError::malformed(format!(
            "unsupported annotation value type '{other}'"
        ))),
        None => Err(CodecError::malformed("annotation <value> has no xsi:type")),
    }
}

fn decode_support(element: &Element) -> Result<SupportingRoi> {
    let boundaries = element
        .children_named("component")
        .filter_map(|component| component.child("boundary"))
        .map(|boundary| -> Result<RoiBoundary> {
            Ok(RoiBoundary {
                code: decode_coded(boundary.require_child("code")?)?,
                value: optional(boundary, "value", decode_interval)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(SupportingRoi {
        code: decode_coded(element.require_child("code")?)?,
        boundaries,
    })
}

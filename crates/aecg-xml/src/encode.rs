//! Document tree to XML.

use aecg_model::{
    Annotation, AnnotationSet, AnnotationValue, ClinicalTrial, Code, CodeSystemId, CodedValue,
    ControlVariable, Document, Identifier, LocalCode, PersonName, PhysicalQuantity,
    SecondaryPerformer, Sequence, SequenceSet, Series, SeriesAuthor, SupportingRoi, TimeBound,
    TimeInterval, Timestamp, TrialContext, TrialSite, TrialSubject,
};
use quick_xml::events::BytesStart;
use tracing::debug;

use crate::common::{EncodeOptions, HL7_NS, ROOT_ELEMENT, XSI_NS, XmlSink, format_decimal};
use crate::error::Result;
use crate::sequence::encode_sequence_value;

pub(crate) fn encode_document(document: &Document, options: &EncodeOptions) -> Result<Vec<u8>> {
    let mut sink = XmlSink::new(options);
    sink.declaration()?;

    let mut root = BytesStart::new(ROOT_ELEMENT);
    root.push_attribute(("xmlns", HL7_NS));
    root.push_attribute(("xmlns:xsi", XSI_NS));
    sink.open(root)?;

    if let Some(id) = &document.id {
        write_identifier(&mut sink, "id", id)?;
    }
    if let Some(code) = &document.code {
        write_coded(&mut sink, "code", code)?;
    }
    if let Some(text) = &document.text {
        sink.text_element("text", text)?;
    }
    if let Some(window) = &document.effective_time {
        write_interval(&mut sink, "effectiveTime", window, &[])?;
    }
    if let Some(code) = &document.confidentiality {
        write_coded(&mut sink, "confidentialityCode", code)?;
    }
    if let Some(code) = &document.reason {
        write_coded(&mut sink, "reasonCode", code)?;
    }
    if let Some(context) = &document.trial_context {
        write_trial_context(&mut sink, context)?;
    }
    for (index, series) in document.series.iter().enumerate() {
        debug!(series_index = index, "encoding series");
        sink.open_tag("component")?;
        write_series(&mut sink, series)?;
        sink.close("component")?;
    }

    sink.close(ROOT_ELEMENT)?;
    Ok(sink.finish())
}

fn write_identifier(sink: &mut XmlSink, name: &str, id: &Identifier) -> Result<()> {
    let mut element = BytesStart::new(name);
    element.push_attribute(("root", id.root.as_str()));
    if let Some(extension) = &id.extension {
        element.push_attribute(("extension", extension.as_str()));
    }
    sink.empty(element)
}

fn coded_attributes<C: Code, S: CodeSystemId>(element: &mut BytesStart<'_>, coded: &CodedValue<C, S>) {
    element.push_attribute(("code", coded.code.as_str()));
    element.push_attribute(("codeSystem", coded.code_system.oid()));
    if let Some(name) = &coded.code_system_name {
        element.push_attribute(("codeSystemName", name.as_str()));
    }
    if let Some(display) = &coded.display_name {
        element.push_attribute(("displayName", display.as_str()));
    }
}

fn write_coded<C: Code, S: CodeSystemId>(
    sink: &mut XmlSink,
    name: &str,
    coded: &CodedValue<C, S>,
) -> Result<()> {
    let mut element = BytesStart::new(name);
    coded_attributes(&mut element, coded);
    sink.empty(element)
}

fn write_local_code(sink: &mut XmlSink, name: &str, code: &LocalCode) -> Result<()> {
    let mut element = BytesStart::new(name);
    element.push_attribute(("code", code.code.as_str()));
    let optional = [
        ("codeSystem", &code.code_system),
        ("codeSystemName", &code.code_system_name),
        ("displayName", &code.display_name),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            element.push_attribute((key, value.as_str()));
        }
    }
    sink.empty(element)
}

fn write_timestamp(sink: &mut XmlSink, name: &str, value: &Timestamp) -> Result<()> {
    let rendered = value.to_string();
    let mut element = BytesStart::new(name);
    element.push_attribute(("value", rendered.as_str()));
    sink.empty(element)
}

fn write_bound(sink: &mut XmlSink, name: &str, bound: &TimeBound) -> Result<()> {
    let rendered = bound.value.to_string();
    let mut element = BytesStart::new(name);
    element.push_attribute(("value", rendered.as_str()));
    if let Some(inclusive) = bound.inclusive {
        element.push_attribute(("inclusive", if inclusive { "true" } else { "false" }));
    }
    sink.empty(element)
}

fn write_interval(
    sink: &mut XmlSink,
    name: &str,
    window: &TimeInterval,
    attributes: &[(&str, &str)],
) -> Result<()> {
    let mut element = BytesStart::new(name);
    for attribute in attributes {
        element.push_attribute(*attribute);
    }
    if window.low.is_none() && window.high.is_none() {
        return sink.empty(element);
    }
    sink.open(element)?;
    if let Some(low) = &window.low {
        write_bound(sink, "low", low)?;
    }
    if let Some(high) = &window.high {
        write_bound(sink, "high", high)?;
    }
    sink.close(name)
}

fn write_quantity_value(sink: &mut XmlSink, quantity: &PhysicalQuantity) -> Result<()> {
    let value = format_decimal(quantity.value);
    let mut element = BytesStart::new("value");
    element.push_attribute(("xsi:type", "PQ"));
    element.push_attribute(("value", value.as_str()));
    if let Some(unit) = &quantity.unit {
        element.push_attribute(("unit", unit.as_str()));
    }
    sink.empty(element)
}

fn write_name(sink: &mut XmlSink, name: &PersonName) -> Result<()> {
    if name.is_empty() {
        return sink.empty(BytesStart::new("name"));
    }
    sink.open_tag("name")?;
    let parts = [
        ("prefix", &name.prefix),
        ("given", &name.given),
        ("family", &name.family),
        ("suffix", &name.suffix),
    ];
    for (part, value) in parts {
        if let Some(value) = value {
            sink.text_element(part, value)?;
        }
    }
    sink.close("name")
}

fn write_trial_context(sink: &mut XmlSink, context: &TrialContext) -> Result<()> {
    let timepoint = &context.timepoint;
    sink.open_tag("componentOf")?;
    sink.open_tag("timepointEvent")?;
    if let Some(code) = &timepoint.code {
        write_local_code(sink, "code", code)?;
    }
    if let Some(window) = &timepoint.effective_time {
        write_interval(sink, "effectiveTime", window, &[])?;
    }
    if let Some(reason) = &timepoint.reason {
        sink.text_element("text", reason)?;
    }
    sink.open_tag("componentOf")?;
    sink.open_tag("subjectAssignment")?;
    write_subject(sink, &context.subject)?;
    write_trial(sink, &context.trial)?;
    sink.close("subjectAssignment")?;
    sink.close("componentOf")?;
    sink.close("timepointEvent")?;
    sink.close("componentOf")
}

fn write_subject(sink: &mut XmlSink, subject: &TrialSubject) -> Result<()> {
    sink.open_tag("subject")?;
    sink.open_tag("trialSubject")?;
    if let Some(id) = &subject.id {
        write_identifier(sink, "id", id)?;
    }
    if let Some(role) = &subject.role {
        write_coded(sink, "code", role)?;
    }
    if let Some(demographics) = &subject.demographics {
        sink.open_tag("subjectDemographicPerson")?;
        if let Some(name) = &demographics.name {
            write_name(sink, name)?;
        }
        if let Some(gender) = &demographics.gender {
            write_coded(sink, "administrativeGenderCode", gender)?;
        }
        if let Some(birth_time) = &demographics.birth_time {
            write_timestamp(sink, "birthTime", birth_time)?;
        }
        if let Some(race) = &demographics.race {
            write_coded(sink, "raceCode", race)?;
        }
        sink.close("subjectDemographicPerson")?;
    }
    sink.close("trialSubject")?;
    sink.close("subject")
}

fn write_trial(sink: &mut XmlSink, trial: &ClinicalTrial) -> Result<()> {
    sink.open_tag("componentOf")?;
    sink.open_tag("clinicalTrial")?;
    if let Some(id) = &trial.id {
        write_identifier(sink, "id", id)?;
    }
    if let Some(title) = &trial.title {
        sink.text_element("title", title)?;
    }
    if let Some(site) = &trial.site {
        sink.open_tag("location")?;
        write_site(sink, site)?;
        sink.close("location")?;
    }
    sink.close("clinicalTrial")?;
    sink.close("componentOf")
}

fn write_site(sink: &mut XmlSink, site: &TrialSite) -> Result<()> {
    sink.open_tag("trialSite")?;
    if let Some(id) = &site.id {
        write_identifier(sink, "id", id)?;
    }
    if let Some(location) = &site.location {
        sink.open_tag("location")?;
        if let Some(name) = &location.name {
            sink.text_element("name", name)?;
        }
        if let Some(address) = &location.address {
            sink.open_tag("addr")?;
            let parts = [
                ("city", &address.city),
                ("state", &address.state),
                ("country", &address.country),
            ];
            for (part, value) in parts {
                if let Some(value) = value {
                    sink.text_element(part, value)?;
                }
            }
            sink.close("addr")?;
        }
        sink.close("location")?;
    }
    if let Some(investigator) = &site.investigator {
        sink.open_tag("responsibleParty")?;
        sink.open_tag("trialInvestigator")?;
        if let Some(id) = &investigator.id {
            write_identifier(sink, "id", id)?;
        }
        if let Some(name) = &investigator.name {
            sink.open_tag("investigatorPerson")?;
            write_name(sink, name)?;
            sink.close("investigatorPerson")?;
        }
        sink.close("trialInvestigator")?;
        sink.close("responsibleParty")?;
    }
    sink.close("trialSite")
}

fn write_series(sink: &mut XmlSink, series: &Series) -> Result<()> {
    sink.open_tag("series")?;
    if let Some(id) = &series.id {
        write_identifier(sink, "id", id)?;
    }
    if let Some(code) = &series.code {
        write_coded(sink, "code", code)?;
    }
    if let Some(window) = &series.effective_time {
        write_interval(sink, "effectiveTime", window, &[])?;
    }
    if let Some(author) = &series.author {
        write_series_author(sink, author)?;
    }
    for performer in &series.secondary_performers {
        write_secondary_performer(sink, performer)?;
    }
    for variable in &series.control_variables {
        sink.open_tag("controlVariable")?;
        write_control_variable(sink, variable)?;
        sink.close("controlVariable")?;
    }
    for set in &series.sequence_sets {
        sink.open_tag("component")?;
        write_sequence_set(sink, set)?;
        sink.close("component")?;
    }
    for set in &series.annotation_sets {
        sink.open_tag("subjectOf")?;
        write_annotation_set(sink, set)?;
        sink.close("subjectOf")?;
    }
    sink.close("series")
}

fn write_series_author(sink: &mut XmlSink, author: &SeriesAuthor) -> Result<()> {
    sink.open_tag("author")?;
    sink.open_tag("seriesAuthor")?;
    if let Some(id) = &author.id {
        write_identifier(sink, "id", id)?;
    }
    let device = &author.device;
    sink.open_tag("manufacturedSeriesDevice")?;
    if let Some(id) = &device.id {
        write_identifier(sink, "id", id)?;
    }
    if let Some(code) = &device.code {
        write_coded(sink, "code", code)?;
    }
    if let Some(model) = &device.model_name {
        sink.text_element("manufacturerModelName", model)?;
    }
    if let Some(software) = &device.software_name {
        sink.text_element("softwareName", software)?;
    }
    sink.close("manufacturedSeriesDevice")?;
    if let Some(manufacturer) = &author.manufacturer {
        sink.open_tag("manufacturerOrganization")?;
        sink.text_element("name", manufacturer)?;
        sink.close("manufacturerOrganization")?;
    }
    sink.close("seriesAuthor")?;
    sink.close("author")
}

fn write_secondary_performer(sink: &mut XmlSink, performer: &SecondaryPerformer) -> Result<()> {
    sink.open_tag("secondaryPerformer")?;
    if let Some(function) = &performer.function_code {
        write_coded(sink, "functionCode", function)?;
    }
    sink.open_tag("seriesPerformer")?;
    if let Some(id) = &performer.id {
        write_identifier(sink, "id", id)?;
    }
    if let Some(name) = &performer.name {
        sink.open_tag("assignedPerson")?;
        write_name(sink, name)?;
        sink.close("assignedPerson")?;
    }
    sink.close("seriesPerformer")?;
    sink.close("secondaryPerformer")
}

fn write_control_variable(sink: &mut XmlSink, variable: &ControlVariable) -> Result<()> {
    sink.open_tag("controlVariable")?;
    write_coded(sink, "code", &variable.code)?;
    if let Some(value) = &variable.value {
        write_quantity_value(sink, value)?;
    }
    for component in &variable.components {
        sink.open_tag("component")?;
        write_control_variable(sink, component)?;
        sink.close("component")?;
    }
    sink.close("controlVariable")
}

fn write_sequence_set(sink: &mut XmlSink, set: &SequenceSet) -> Result<()> {
    sink.open_tag("sequenceSet")?;
    for sequence in &set.sequences {
        sink.open_tag("component")?;
        write_sequence(sink, sequence)?;
        sink.close("component")?;
    }
    sink.close("sequenceSet")
}

fn write_sequence(sink: &mut XmlSink, sequence: &Sequence) -> Result<()> {
    sink.open_tag("sequence")?;
    write_coded(sink, "code", &sequence.code)?;
    encode_sequence_value(sink, &sequence.value)?;
    sink.close("sequence")
}

fn write_annotation_set(sink: &mut XmlSink, set: &AnnotationSet) -> Result<()> {
    sink.open_tag("annotationSet")?;
    if let Some(activity_time) = &set.activity_time {
        write_timestamp(sink, "activityTime", activity_time)?;
    }
    if let Some(author) = &set.author {
        sink.open_tag("author")?;
        sink.open_tag("assignedEntity")?;
        sink.open_tag("assignedPerson")?;
        write_name(sink, author)?;
        sink.close("assignedPerson")?;
        sink.close("assignedEntity")?;
        sink.close("author")?;
    }
    for annotation in &set.annotations {
        sink.open_tag("component")?;
        write_annotation(sink, annotation)?;
        sink.close("component")?;
    }
    sink.close("annotationSet")
}

fn write_annotation(sink: &mut XmlSink, annotation: &Annotation) -> Result<()> {
    sink.open_tag("annotation")?;
    write_coded(sink, "code", &annotation.code)?;
    if let Some(value) = &annotation.value {
        write_annotation_value(sink, value)?;
    }
    if let Some(support) = &annotation.support {
        write_support(sink, support)?;
    }
    for child in &annotation.children {
        sink.open_tag("component")?;
        write_annotation(sink, child)?;
        sink.close("component")?;
    }
    sink.close("annotation")
}

fn write_annotation_value(sink: &mut XmlSink, value: &AnnotationValue) -> Result<()> {
    let mut element = BytesStart::new("value");
    match value {
        AnnotationValue::Quantity { value, unit } => {
            element.push_attribute(("xsi:type", "PQ"));
            element.push_attribute(("value", value.as_str()));
            if let Some(unit) = unit {
                element.push_attribute(("unit", unit.as_str()));
            }
            sink.empty(element)
        }
        AnnotationValue::Coded(coded) => {
            element.push_attribute(("xsi:type", "CD"));
            coded_attributes(&mut element, coded);
            sink.empty(element)
        }
        AnnotationValue::Text(text) => {
            element.push_attribute(("xsi:type", "ST"));
            sink.open(element)?;
            sink.text(text)?;
            sink.close("value")
        }
    }
}

fn write_support(sink: &mut XmlSink, support: &SupportingRoi) -> Result<()> {
    sink.open_tag("support")?;
    sink.open_tag("supportingROI")?;
    write_coded(sink, "code", &support.code)?;
    for boundary in &support.boundaries {
        sink.open_tag("component")?;
        sink.open_tag("boundary")?;
        write_coded(sink, "code", &boundary.code)?;
        if let Some(window) = &boundary.value {
            write_interval(sink, "value", window, &[("xsi:type", "IVL_TS")])?;
        }
        sink.close("boundary")?;
        sink.close("component")?;
    }
    sink.close("supportingROI")?;
    sink.close("support")
}

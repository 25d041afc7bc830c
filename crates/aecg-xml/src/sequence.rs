//! Codec for the `GLIST_TS` / `SLIST_PQ` sequence value union.
//!
//! The `xsi:type` attribute is read first and alone selects the variant.
//! On encode the attribute is derived from the variant and only that
//! variant's fields are written.

use aecg_model::{
    GLIST_TS, PhysicalQuantity, RegularTimeGrid, SLIST_PQ, SampledQuantityList, SequenceValue,
    Timestamp,
};
use quick_xml::events::BytesStart;

use crate::common::{XmlSink, format_decimal, format_digits};
use crate::element::Element;
use crate::error::{CodecError, Result};

pub(crate) fn encode_sequence_value(sink: &mut XmlSink, value: &SequenceValue) -> Result<()> {
    let mut element = BytesStart::new("value");
    element.push_attribute(("xsi:type", value.type_name()));
    sink.open(element)?;
    match value {
        SequenceValue::TimeGrid(grid) => {
            let head = grid.head.to_string();
            let mut start = BytesStart::new("head");
            start.push_attribute(("value", head.as_str()));
            if let Some(unit) = &grid.head_unit {
                start.push_attribute(("unit", unit.as_str()));
            }
            sink.empty(start)?;
            write_quantity(sink, "increment", &grid.increment)?;
        }
        SequenceValue::Samples(samples) => {
            write_quantity(sink, "origin", &samples.origin)?;
            write_quantity(sink, "scale", &samples.scale)?;
            sink.text_element("digits", &format_digits(&samples.digits))?;
        }
    }
    sink.close("value")
}

fn write_quantity(sink: &mut XmlSink, name: &str, quantity: &PhysicalQuantity) -> Result<()> {
    let value = format_decimal(quantity.value);
    let mut element = BytesStart::new(name);
    element.push_attribute(("value", value.as_str()));
    if let Some(unit) = &quantity.unit {
        element.push_attribute(("unit", unit.as_str()));
    }
    sink.empty(element)
}

pub(crate) fn decode_sequence_value(element: &Element) -> Result<SequenceValue> {
    let discriminator = element
        .attr("type")
        .ok_or_else(|| CodecError::sequence("sequence value has no xsi:type"))?;
    match discriminator.trim() {
        GLIST_TS => decode_time_grid(element).map(SequenceValue::TimeGrid),
        SLIST_PQ => decode_samples(element).map(SequenceValue::Samples),
        other => Err(CodecError::sequence(format!(
            "unknown sequence value type '{other}', expected {GLIST_TS} or {SLIST_PQ}"
        ))),
    }
}

fn required<'a>(element: &'a Element, name: &str, variant: &str) -> Result<&'a Element> {
    element
        .child(name)
        .ok_or_else(|| CodecError::sequence(format!("{variant} value is missing <{name}>")))
}

fn read_quantity(element: &Element, variant: &str) -> Result<PhysicalQuantity> {
    let raw = element.attr("value").ok_or_else(|| {
        CodecError::sequence(format!("{variant} <{}> has no value", element.name))
    })?;
    let value = raw.trim().parse::<f64>().map_err(|_| {
        CodecError::sequence(format!(
            "{variant} <{}> value '{raw}' is not a number",
            element.name
        ))
    })?;
    Ok(PhysicalQuantity {
        value,
        unit: element.attr("unit").map(str::to_string),
    })
}

fn decode_time_grid(element: &Element) -> Result<RegularTimeGrid> {
    let head = required(element, "head", GLIST_TS)?;
    let head_value = head
        .attr("value")
        .ok_or_else(|| CodecError::sequence("GLIST_TS <head> has no value"))?;
    let increment = required(element, "increment", GLIST_TS)?;
    Ok(RegularTimeGrid {
        head: Timestamp::parse(head_value)
            .map_err(|err| CodecError::sequence(format!("GLIST_TS <head>: {err}")))?,
        head_unit: head.attr("unit").map(str::to_string),
        increment: read_quantity(increment, GLIST_TS)?,
    })
}

fn decode_samples(element: &Element) -> Result<SampledQuantityList> {
    let origin = read_quantity(required(element, "origin", SLIST_PQ)?, SLIST_PQ)?;
    let scale = read_quantity(required(element, "scale", SLIST_PQ)?, SLIST_PQ)?;
    let digits = required(element, "digits", SLIST_PQ)?
        .text()
        .split_ascii_whitespace()
        .map(|token| {
            token.parse::<i32>().map_err(|_| {
                CodecError::sequence(format!("SLIST_PQ digit '{token}' is not an integer"))
            })
        })
        .collect::<Result<Vec<i32>>>()?;
    Ok(SampledQuantityList {
        origin,
        scale,
        digits,
    })
}

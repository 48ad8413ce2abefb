use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, Event},
    Writer,
};

use crate::{encoder::TargetProgram, ConvertError, Result};

pub const MANUFACTURER_CODE: &str = "1414483522";
pub const PLUGIN_CODE: &str = "1412515152";
const CATEGORY: &str = "Presets";

/// Renders a program as a pretty-printed TB Equalizer Pro preset document.
pub fn to_xml_string(program: &TargetProgram) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    let mut root = BytesStart::new("tpb");
    root.push_attribute(("manufacturerCode", MANUFACTURER_CODE));
    root.push_attribute(("pluginCode", PLUGIN_CODE));

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write(&mut writer, Event::Start(root))?;
    write(&mut writer, Event::Empty(program_element(program)))?;
    write(&mut writer, Event::End(BytesEnd::new("tpb")))?;

    let mut xml = String::from_utf8(writer.into_inner())
        .map_err(|err| ConvertError::Xml(err.to_string()))?;
    xml.push('\n');
    Ok(xml)
}

/// Flattens the program into `(attribute, value)` pairs in document order.
pub fn program_attributes(program: &TargetProgram) -> Vec<(String, String)> {
    let mut attrs = vec![
        ("Name".to_string(), program.name().to_string()),
        ("Category".to_string(), CATEGORY.to_string()),
        ("OutGain".to_string(), program.out_gain().to_string()),
        ("ScnIdx".to_string(), program.bands().len().to_string()),
    ];

    for band in program.bands() {
        let i = band.index;
        attrs.push((format!("Visibl{i}"), flag(band.visible)));
        attrs.push((format!("Enable{i}"), flag(band.enabled)));
        attrs.push((format!("Hue{i}"), band.hue.to_string()));
        attrs.push((format!("Freq{i}"), band.freq.to_string()));
        attrs.push((format!("Gain{i}"), band.gain.to_string()));
        attrs.push((format!("Q{i}"), band.q.to_string()));
        if let (Some(kind), Some(order)) = (band.kind, band.order) {
            attrs.push((format!("Type{i}"), kind.to_string()));
            attrs.push((format!("Order{i}"), order.to_string()));
        }
    }

    attrs
}

fn program_element(program: &TargetProgram) -> BytesStart<'static> {
    let mut element = BytesStart::new("Program");
    for (key, value) in program_attributes(program) {
        element.push_attribute((key.as_str(), value.as_str()));
    }
    element
}

fn flag(value: bool) -> String {
    String::from(if value { "1" } else { "0" })
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|err| ConvertError::Xml(err.to_string()))
}

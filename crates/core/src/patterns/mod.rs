//! Line classification for the Equalizer APO configuration dialect.
//!
//! Rules are tried in a fixed order (device, channel, stage, include,
//! preamp, filter, graphic EQ) and the first match wins. Keywords match
//! case-insensitively. Lines that match no rule are reported as
//! [`Directive::Unrecognized`] and skipped by the caller.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::model::{CurvePoint, Filter, FilterKind, Stage};

const DEFAULT_GAIN_DB: f64 = 0.0;
const DEFAULT_Q: f64 = 0.707;

/// A classified, non-empty, non-comment line.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive<'a> {
    Device(&'a str),
    Channel(&'a str),
    Stage(Stage),
    Include(&'a str),
    Preamp(f64),
    Filter(Filter),
    GraphicEq(Vec<CurvePoint>),
    Unrecognized,
}

/// A recognised directive whose numeric field did not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidField {
    pub field: &'static str,
    pub value: String,
}

struct PatternTable {
    device: Regex,
    channel: Regex,
    stage: Regex,
    include: Regex,
    preamp: Regex,
    filter: Regex,
    graphic: Regex,
}

impl PatternTable {
    fn new() -> Self {
        Self {
            device: compile(r"^Device:\s*(.*)"),
            channel: compile(r"^Channel:\s*(.*)"),
            stage: compile(r"^Stage:\s*(pre-mix|post-mix|capture)"),
            include: compile(r"^Include:\s*(.*)"),
            preamp: compile(r"^Preamp:\s*(\S+?)\s*dB"),
            filter: compile(
                r"^Filter(?:\s+\d+)?:\s*(ON|OFF)\s+([A-Z0-9]+)\s+Fc\s+(\S+)\s+Hz(?:(?:\s+Gain\s+(\S+)\s+dB)?(?:\s+(?:Q|BW Oct)\s+(\S+))?)?",
            ),
            graphic: compile(r"^GraphicEQ:\s*(.*)"),
        }
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("directive patterns are valid regexes")
}

fn table() -> &'static PatternTable {
    static TABLE: OnceLock<PatternTable> = OnceLock::new();
    TABLE.get_or_init(PatternTable::new)
}

/// Classifies one trimmed line.
pub fn classify(line: &str) -> Result<Directive<'_>, InvalidField> {
    let table = table();

    if let Some(caps) = table.device.captures(line) {
        return Ok(Directive::Device(group(&caps, 1).trim()));
    }
    if let Some(caps) = table.channel.captures(line) {
        return Ok(Directive::Channel(group(&caps, 1).trim()));
    }
    if let Some(caps) = table.stage.captures(line) {
        // The pattern only admits the three known stage names.
        if let Ok(stage) = group(&caps, 1).parse() {
            return Ok(Directive::Stage(stage));
        }
    }
    if let Some(caps) = table.include.captures(line) {
        return Ok(Directive::Include(group(&caps, 1).trim()));
    }
    if let Some(caps) = table.preamp.captures(line) {
        return Ok(Directive::Preamp(number("preamp", group(&caps, 1))?));
    }
    if let Some(caps) = table.filter.captures(line) {
        return parse_filter(&caps).map(Directive::Filter);
    }
    if let Some(caps) = table.graphic.captures(line) {
        return parse_curve(group(&caps, 1)).map(Directive::GraphicEq);
    }

    Ok(Directive::Unrecognized)
}

fn group<'t>(caps: &Captures<'t>, index: usize) -> &'t str {
    caps.get(index).map(|m| m.as_str()).unwrap_or_default()
}

fn parse_filter(caps: &Captures<'_>) -> Result<Filter, InvalidField> {
    let gain = match caps.get(4) {
        Some(value) => number("gain", value.as_str())?,
        None => DEFAULT_GAIN_DB,
    };
    let q = match caps.get(5) {
        Some(value) => number("Q", value.as_str())?,
        None => DEFAULT_Q,
    };

    Ok(Filter {
        kind: FilterKind::from_token(group(caps, 2)),
        fc: number("Fc", group(caps, 3))?,
        gain,
        q,
        enabled: group(caps, 1).eq_ignore_ascii_case("ON"),
    })
}

/// Parses `freq gain; freq gain; ...`. Entries that are not exactly two
/// tokens are dropped; a two-token entry with a non-numeric token fails.
fn parse_curve(body: &str) -> Result<Vec<CurvePoint>, InvalidField> {
    let mut points = Vec::new();
    for entry in body.split(';') {
        let tokens: Vec<&str> = entry.split_whitespace().collect();
        if let [freq, gain] = tokens.as_slice() {
            points.push(CurvePoint {
                freq: number("graphic EQ frequency", freq)?,
                gain: number("graphic EQ gain", gain)?,
            });
        }
    }
    Ok(points)
}

fn number(field: &'static str, value: &str) -> Result<f64, InvalidField> {
    value
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .ok_or_else(|| InvalidField {
            field,
            value: value.to_string(),
        })
}

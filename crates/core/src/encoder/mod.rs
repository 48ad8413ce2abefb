use serde::Serialize;

use crate::model::{Command, CommandSequence, Filter};

/// Number of band slots available in a TB Equalizer Pro program.
pub const MAX_BANDS: usize = 32;

/// Band colours cycled in order so neighbouring bands stay distinguishable.
pub const HUE_CYCLE: [i64; 6] = [52, 36, 0, 180, 260, 300];

const OUT_GAIN_ZERO: f64 = 200.0;
const GAIN_ZERO: f64 = 3000.0;
const FREQ_OFFSET_HZ: f64 = 5.0;
const Q_OFFSET: f64 = 20.0;

const SHELF_LOW: i64 = 1;
const SHELF_HIGH: i64 = 2;
const FIRST_ORDER: i64 = 1;

/// One encoded band slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetBand {
    /// 1-based slot index.
    pub index: usize,
    pub visible: bool,
    pub enabled: bool,
    pub hue: i64,
    pub freq: i64,
    pub gain: i64,
    pub q: i64,
    /// Shelf type, present only for shelving filters.
    pub kind: Option<i64>,
    pub order: Option<i64>,
}

impl TargetBand {
    fn encode(index: usize, filter: &Filter) -> Self {
        let (kind, order) = if filter.kind.is_low_shelf() {
            (Some(SHELF_LOW), Some(FIRST_ORDER))
        } else if filter.kind.is_high_shelf() {
            (Some(SHELF_HIGH), Some(FIRST_ORDER))
        } else {
            (None, None)
        };

        Self {
            index,
            visible: true,
            enabled: filter.enabled,
            hue: HUE_CYCLE[(index - 1) % HUE_CYCLE.len()],
            freq: round(filter.fc - FREQ_OFFSET_HZ),
            gain: round(GAIN_ZERO + 100.0 * filter.gain),
            q: round(1000.0 * filter.q - Q_OFFSET),
            kind,
            order,
        }
    }
}

/// A complete preset ready for serialisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetProgram {
    name: String,
    out_gain: i64,
    bands: Vec<TargetBand>,
}

impl TargetProgram {
    /// Folds a command sequence into a program named `name`.
    ///
    /// Every preamp contributes to the output gain. Filters fill band slots
    /// in sequence order until [`MAX_BANDS`] is reached; the rest are
    /// dropped. Graphic EQ curves have no band equivalent and are ignored.
    pub fn encode(name: impl Into<String>, sequence: &CommandSequence) -> Self {
        let name = name.into();
        let mut bands = Vec::new();
        let mut dropped = 0usize;

        for command in sequence {
            match command {
                Command::Filter { filter, .. } => {
                    if bands.len() < MAX_BANDS {
                        bands.push(TargetBand::encode(bands.len() + 1, filter));
                    } else {
                        dropped += 1;
                    }
                }
                Command::Preamp { .. } | Command::GraphicEq { .. } => {}
            }
        }

        if dropped > 0 {
            tracing::debug!(program = %name, dropped, "band capacity reached, filters dropped");
        }

        Self {
            name,
            out_gain: round(OUT_GAIN_ZERO + 10.0 * sequence.total_preamp_db()),
            bands,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn out_gain(&self) -> i64 {
        self.out_gain
    }

    pub fn bands(&self) -> &[TargetBand] {
        &self.bands
    }
}

/// Rounds half to even before truncating to an integer attribute value.
fn round(value: f64) -> i64 {
    value.round_ties_even() as i64
}

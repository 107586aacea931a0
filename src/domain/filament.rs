// Filament timeline: per-spool remaining-percentage series
use super::telemetry::align;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

pub const EXTERNAL_TRAY: &str = "External";

/// Used when a stored colour cannot be parsed.
const FALLBACK_COLOR: Rgb = Rgb {
    r: 0x80,
    g: 0x80,
    b: 0x80,
};

/// Alpha byte appended to the solid colour for the translucent fill.
const FILL_ALPHA: &str = "33";

/// Where a spool is fed from: an AMS bay or the external spool holder.
///
/// The derived ordering puts every bay before `External` and bays in
/// ascending numeric order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TraySlot {
    Bay(u32),
    External,
}

impl TraySlot {
    /// Anything that is not a bay number is treated as the external holder.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<u32>() {
            Ok(bay) => TraySlot::Bay(bay),
            Err(_) => TraySlot::External,
        }
    }
}

impl fmt::Display for TraySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraySlot::Bay(bay) => write!(f, "{}", bay),
            TraySlot::External => f.write_str(EXTERNAL_TRAY),
        }
    }
}

impl<'de> Deserialize<'de> for TraySlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawTray {
            Number(serde_json::Number),
            Text(String),
            Other(serde_json::Value),
        }

        Ok(match RawTray::deserialize(deserializer)? {
            RawTray::Number(number) => match number.as_u64().and_then(|n| u32::try_from(n).ok()) {
                Some(bay) => TraySlot::Bay(bay),
                None => {
                    tracing::debug!("Tray id {} is not a bay number, treating as external", number);
                    TraySlot::External
                }
            },
            RawTray::Text(text) => TraySlot::parse(&text),
            RawTray::Other(value) => {
                tracing::debug!("Unexpected tray id {}, treating as external", value);
                TraySlot::External
            }
        })
    }
}

impl Serialize for TraySlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One `filament_timeline` entry as sent by the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilamentRecord {
    pub tray_id: TraySlot,
    #[serde(rename = "type", default)]
    pub material: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub color: String,
    #[serde(rename = "start_idx", default)]
    pub start_index: usize,
    #[serde(rename = "remain_data", default)]
    pub remaining: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb {
        r: 0xFF,
        g: 0xFF,
        b: 0xFF,
    };
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// Parse the first six hex digits of `RRGGBB[AA]`, with or without `#`.
    pub fn parse_hex(raw: &str) -> Option<Self> {
        let digits = raw.trim().trim_start_matches('#');
        let rgb = digits.get(..6)?;
        if !rgb.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&rgb[range], 16).ok();
        Some(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn translucent_hex(self) -> String {
        format!("{}{}", self.to_hex(), FILL_ALPHA)
    }

    /// Text colour readable on top of this colour.
    ///
    /// Luminance is `(0.299 R + 0.587 G + 0.114 B) / 255`; at or below 0.5
    /// white wins. Compared in integer thousandths so 0.5 is exact.
    pub fn contrast(self) -> Rgb {
        let weighted = 299 * u32::from(self.r) + 587 * u32::from(self.g) + 114 * u32::from(self.b);
        if weighted * 2 <= 255 * 1000 {
            Rgb::WHITE
        } else {
            Rgb::BLACK
        }
    }
}

/// A plottable remaining-percentage series for one spool segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilamentSeries {
    pub key: String,
    pub tray: TraySlot,
    pub label: String,
    pub material: String,
    pub brand: String,
    pub border_color: String,
    pub fill_color: String,
    pub text_color: String,
    pub start_index: usize,
    pub data: Vec<Option<f64>>,
    /// Always false: a hole in the series marks a spool change.
    pub span_gaps: bool,
}

/// Legend label for a spool segment.
pub fn series_label(tray: TraySlot, material: &str, brand: &str) -> String {
    let mut label = match tray {
        TraySlot::Bay(bay) => format!("Tray {} ({})", bay, material),
        TraySlot::External => format!("External ({})", material),
    };
    if !brand.is_empty() && brand != material && brand != EXTERNAL_TRAY {
        label.push_str(" - ");
        label.push_str(brand);
    }
    label
}

fn segment_order(a: (&String, &FilamentRecord), b: (&String, &FilamentRecord)) -> Ordering {
    a.1.tray_id
        .cmp(&b.1.tray_id)
        .then(a.1.start_index.cmp(&b.1.start_index))
        .then_with(|| a.0.cmp(b.0))
}

/// Turn the `filament_timeline` mapping into ordered, labelled series.
///
/// Bays come first in ascending order, then the external holder; segments
/// of the same tray follow each other chronologically by start index.
pub fn build_filament_series(
    timeline: &HashMap<String, FilamentRecord>,
    points: usize,
) -> Vec<FilamentSeries> {
    let mut segments: Vec<(&String, &FilamentRecord)> = timeline.iter().collect();
    segments.sort_by(|a, b| segment_order(*a, *b));

    segments
        .into_iter()
        .map(|(key, record)| {
            let color = Rgb::parse_hex(&record.color).unwrap_or_else(|| {
                tracing::debug!("Unparsable colour {:?} for spool {}", record.color, key);
                FALLBACK_COLOR
            });

            FilamentSeries {
                key: key.clone(),
                tray: record.tray_id,
                label: series_label(record.tray_id, &record.material, &record.brand),
                material: record.material.clone(),
                brand: record.brand.clone(),
                border_color: color.to_hex(),
                fill_color: color.translucent_hex(),
                text_color: color.contrast().to_hex(),
                start_index: record.start_index,
                data: align(&record.remaining, points),
                span_gaps: false,
            }
        })
        .collect()
}

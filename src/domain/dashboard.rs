// Dashboard domain model
use super::annotation::TooltipView;
use super::chart::{ChartSlot, ThemePalette};
use super::suggestions::FilamentForm;
use super::telemetry::{Channel, TelemetryResponse};
use super::time_range::ResolvedWindow;
use serde::Serialize;

/// Latest reading of one channel in the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileData {
    pub id: String,
    pub title: String,
    pub unit: String,
    pub value: Option<f64>,
    pub precision: i32,
}

impl TileData {
    pub fn new(channel: Channel, value: Option<f64>) -> Self {
        Self {
            id: channel.key().to_string(),
            title: channel.title().to_string(),
            unit: channel.unit().to_string(),
            value,
            precision: channel.precision(),
        }
    }
}

/// Last present sample of every channel.
pub fn latest_tiles(response: &TelemetryResponse) -> Vec<TileData> {
    Channel::ALL
        .iter()
        .map(|&channel| {
            let value = response
                .channel(channel)
                .iter()
                .take(response.len())
                .rev()
                .find_map(|sample| *sample);
            TileData::new(channel, value)
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub window: ResolvedWindow,
    pub full_day: bool,
    pub theme: ThemePalette,
    pub tiles: Vec<TileData>,
    pub charts: Vec<ChartSlot>,
    pub tooltip: Option<TooltipView>,
    pub form: FilamentForm,
}

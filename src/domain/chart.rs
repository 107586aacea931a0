// Correlated charts sharing one time axis
use super::annotation::{MarkerLayer, PlotArea, SharedTooltip};
use super::filament::FilamentSeries;
use super::markers::ProjectMarker;
use super::telemetry::{Channel, TelemetryResponse};
use serde::Serialize;
use std::collections::BTreeMap;

pub const NO_DATA_MESSAGE: &str = "No data available for selected time range";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartId {
    Temperature,
    PrintProgress,
    Fans,
    Wifi,
    AmsHumidity,
    AmsTemperature,
    Layers,
    Filament,
}

impl ChartId {
    pub const ALL: [ChartId; 8] = [
        ChartId::Temperature,
        ChartId::PrintProgress,
        ChartId::Fans,
        ChartId::Wifi,
        ChartId::AmsHumidity,
        ChartId::AmsTemperature,
        ChartId::Layers,
        ChartId::Filament,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ChartId::Temperature => "temperature",
            ChartId::PrintProgress => "print_progress",
            ChartId::Fans => "fans",
            ChartId::Wifi => "wifi",
            ChartId::AmsHumidity => "ams_humidity",
            ChartId::AmsTemperature => "ams_temperature",
            ChartId::Layers => "layers",
            ChartId::Filament => "filament",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.key() == key)
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartId::Temperature => "Temperatures",
            ChartId::PrintProgress => "Print Progress",
            ChartId::Fans => "Fan Speeds",
            ChartId::Wifi => "Wi-Fi Signal",
            ChartId::AmsHumidity => "AMS Humidity",
            ChartId::AmsTemperature => "AMS Temperature",
            ChartId::Layers => "Layers",
            ChartId::Filament => "Filament Remaining",
        }
    }

    /// Channels bound to this chart, in dataset slot order.
    pub fn channels(self) -> &'static [Channel] {
        match self {
            ChartId::Temperature => &[
                Channel::NozzleTemp,
                Channel::NozzleTargetTemp,
                Channel::BedTemp,
                Channel::BedTargetTemp,
            ],
            ChartId::PrintProgress => &[Channel::PrintPercent],
            ChartId::Fans => &[Channel::CoolingFanSpeed, Channel::HeatbreakFanSpeed],
            ChartId::Wifi => &[Channel::WifiSignalDbm],
            ChartId::AmsHumidity => &[Channel::AmsHumidityRaw],
            ChartId::AmsTemperature => &[Channel::AmsTemp],
            ChartId::Layers => &[Channel::LayerNum, Channel::TotalLayerNum],
            ChartId::Filament => &[],
        }
    }
}

fn channel_color(channel: Channel) -> &'static str {
    match channel {
        Channel::NozzleTemp => "#ef4444",
        Channel::NozzleTargetTemp => "#fca5a5",
        Channel::BedTemp => "#3b82f6",
        Channel::BedTargetTemp => "#93c5fd",
        Channel::PrintPercent => "#22c55e",
        Channel::CoolingFanSpeed => "#06b6d4",
        Channel::HeatbreakFanSpeed => "#8b5cf6",
        Channel::WifiSignalDbm => "#f59e0b",
        Channel::AmsHumidityRaw => "#0ea5e9",
        Channel::AmsTemp => "#f97316",
        Channel::LayerNum => "#a855f7",
        Channel::TotalLayerNum => "#64748b",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub border_color: String,
    pub fill_color: Option<String>,
    pub data: Vec<Option<f64>>,
    pub span_gaps: bool,
}

impl Dataset {
    fn for_channel(channel: Channel) -> Self {
        Self {
            label: channel.title().to_string(),
            border_color: channel_color(channel).to_string(),
            fill_color: None,
            data: Vec::new(),
            span_gaps: true,
        }
    }
}

impl From<&FilamentSeries> for Dataset {
    fn from(series: &FilamentSeries) -> Self {
        Self {
            label: series.label.clone(),
            border_color: series.border_color.clone(),
            fill_color: Some(series.fill_color.clone()),
            data: series.data.clone(),
            span_gaps: series.span_gaps,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThemePalette {
    pub dark: bool,
    pub tick_color: &'static str,
    pub grid_color: &'static str,
    pub legend_color: &'static str,
}

impl ThemePalette {
    pub fn for_mode(dark: bool) -> Self {
        if dark {
            Self {
                dark,
                tick_color: "#cbd5e1",
                grid_color: "rgba(255, 255, 255, 0.1)",
                legend_color: "#e2e8f0",
            }
        } else {
            Self {
                dark,
                tick_color: "#475569",
                grid_color: "rgba(0, 0, 0, 0.1)",
                legend_color: "#1e293b",
            }
        }
    }
}

/// A constructed chart: its bound data, styling and marker layer.
#[derive(Debug, Clone, Serialize)]
pub struct ChartState {
    pub id: ChartId,
    pub title: &'static str,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub palette: ThemePalette,
    pub plot: PlotArea,
    pub markers: MarkerLayer,
}

impl ChartState {
    pub fn new(id: ChartId, palette: ThemePalette, plot: PlotArea) -> Self {
        Self {
            id,
            title: id.title(),
            labels: Vec::new(),
            datasets: id.channels().iter().copied().map(Dataset::for_channel).collect(),
            palette,
            plot,
            markers: MarkerLayer::new(id),
        }
    }

    /// Assign channel sequences to dataset slots by position. Channels
    /// without a slot are dropped.
    pub fn bind_channels(&mut self, channels: &[Channel], response: &TelemetryResponse) {
        for (slot, channel) in channels.iter().enumerate() {
            match self.datasets.get_mut(slot) {
                Some(dataset) => dataset.data = response.aligned_channel(*channel),
                None => tracing::debug!("Chart {} has no slot {} for {}", self.id.key(), slot, channel.key()),
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSlot {
    /// Nothing loaded yet.
    Pending,
    Placeholder { message: &'static str },
    Live(Box<ChartState>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderOutcome {
    NoData,
    Rendered,
}

/// Fixed set of charts kept in step on every refresh and theme change.
pub struct ChartRegistry {
    slots: BTreeMap<ChartId, ChartSlot>,
    palette: ThemePalette,
    plot: PlotArea,
    constructed: usize,
}

impl ChartRegistry {
    pub fn new(plot: PlotArea, dark: bool) -> Self {
        Self {
            slots: ChartId::ALL.into_iter().map(|id| (id, ChartSlot::Pending)).collect(),
            palette: ThemePalette::for_mode(dark),
            plot,
            constructed: 0,
        }
    }

    pub fn slots(&self) -> impl Iterator<Item = (&ChartId, &ChartSlot)> {
        self.slots.iter()
    }

    #[cfg(test)]
    pub fn chart(&self, id: ChartId) -> Option<&ChartState> {
        match self.slots.get(&id) {
            Some(ChartSlot::Live(chart)) => Some(&**chart),
            _ => None,
        }
    }

    pub fn chart_mut(&mut self, id: ChartId) -> Option<&mut ChartState> {
        match self.slots.get_mut(&id) {
            Some(ChartSlot::Live(chart)) => Some(&mut **chart),
            _ => None,
        }
    }

    pub fn palette(&self) -> ThemePalette {
        self.palette
    }

    /// Number of chart objects built so far.
    #[cfg(test)]
    pub fn constructed(&self) -> usize {
        self.constructed
    }

    /// Push a response into every chart. With no timestamps every chart is
    /// swapped for the placeholder and nothing is constructed.
    pub fn render(
        &mut self,
        response: &TelemetryResponse,
        filament: &[FilamentSeries],
        tooltip: &mut SharedTooltip,
    ) -> RenderOutcome {
        if response.is_empty() {
            for (id, slot) in self.slots.iter_mut() {
                if let ChartSlot::Live(chart) = slot {
                    chart.markers.clear(tooltip);
                }
                tracing::debug!("Chart {} showing placeholder", id.key());
                *slot = ChartSlot::Placeholder {
                    message: NO_DATA_MESSAGE,
                };
            }
            return RenderOutcome::NoData;
        }

        for (id, slot) in self.slots.iter_mut() {
            if !matches!(slot, ChartSlot::Live(_)) {
                *slot = ChartSlot::Live(Box::new(ChartState::new(*id, self.palette, self.plot)));
                self.constructed += 1;
                tracing::debug!(total = self.constructed, "Constructed chart {}", id.key());
            }
            let ChartSlot::Live(chart) = slot else {
                continue;
            };

            chart.labels = response.timestamps.clone();
            if *id == ChartId::Filament {
                chart.datasets = filament.iter().map(Dataset::from).collect();
            } else {
                chart.bind_channels(id.channels(), response);
            }
        }

        RenderOutcome::Rendered
    }

    /// Rebuild marker lines on every live chart.
    pub fn install_markers(&mut self, markers: &[ProjectMarker], tooltip: &mut SharedTooltip) {
        for slot in self.slots.values_mut() {
            if let ChartSlot::Live(chart) = slot {
                let points = chart.labels.len();
                let plot = chart.plot;
                chart.markers.rebuild(markers, points, plot, tooltip);
            }
        }
    }

    /// Recolour axes, grid and legend. Safe before the first render; charts
    /// built later pick up the stored palette.
    pub fn apply_theme(&mut self, dark: bool) {
        self.palette = ThemePalette::for_mode(dark);
        for slot in self.slots.values_mut() {
            if let ChartSlot::Live(chart) = slot {
                chart.palette = self.palette;
            }
        }
    }
}

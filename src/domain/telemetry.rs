// Telemetry data domain models
use super::filament::FilamentRecord;
use super::markers::{derive_project_markers, ProjectMarker};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One numeric telemetry channel of the printer response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    NozzleTemp,
    NozzleTargetTemp,
    BedTemp,
    BedTargetTemp,
    PrintPercent,
    CoolingFanSpeed,
    HeatbreakFanSpeed,
    WifiSignalDbm,
    AmsHumidityRaw,
    AmsTemp,
    LayerNum,
    TotalLayerNum,
}

impl Channel {
    pub const ALL: [Channel; 12] = [
        Channel::NozzleTemp,
        Channel::NozzleTargetTemp,
        Channel::BedTemp,
        Channel::BedTargetTemp,
        Channel::PrintPercent,
        Channel::CoolingFanSpeed,
        Channel::HeatbreakFanSpeed,
        Channel::WifiSignalDbm,
        Channel::AmsHumidityRaw,
        Channel::AmsTemp,
        Channel::LayerNum,
        Channel::TotalLayerNum,
    ];

    /// Field name in the JSON response.
    pub fn key(self) -> &'static str {
        match self {
            Channel::NozzleTemp => "nozzle_temp",
            Channel::NozzleTargetTemp => "nozzle_target_temp",
            Channel::BedTemp => "bed_temp",
            Channel::BedTargetTemp => "bed_target_temp",
            Channel::PrintPercent => "print_percent",
            Channel::CoolingFanSpeed => "cooling_fan_speed",
            Channel::HeatbreakFanSpeed => "heatbreak_fan_speed",
            Channel::WifiSignalDbm => "wifi_signal_dbm",
            Channel::AmsHumidityRaw => "ams_humidity_raw",
            Channel::AmsTemp => "ams_temp",
            Channel::LayerNum => "layer_num",
            Channel::TotalLayerNum => "total_layer_num",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Channel::NozzleTemp => "Nozzle",
            Channel::NozzleTargetTemp => "Nozzle Target",
            Channel::BedTemp => "Bed",
            Channel::BedTargetTemp => "Bed Target",
            Channel::PrintPercent => "Progress",
            Channel::CoolingFanSpeed => "Cooling Fan",
            Channel::HeatbreakFanSpeed => "Heatbreak Fan",
            Channel::WifiSignalDbm => "Wi-Fi Signal",
            Channel::AmsHumidityRaw => "AMS Humidity",
            Channel::AmsTemp => "AMS Temperature",
            Channel::LayerNum => "Current Layer",
            Channel::TotalLayerNum => "Total Layers",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Channel::NozzleTemp
            | Channel::NozzleTargetTemp
            | Channel::BedTemp
            | Channel::BedTargetTemp
            | Channel::AmsTemp => "°C",
            Channel::PrintPercent
            | Channel::CoolingFanSpeed
            | Channel::HeatbreakFanSpeed
            | Channel::AmsHumidityRaw => "%",
            Channel::WifiSignalDbm => "dBm",
            Channel::LayerNum | Channel::TotalLayerNum => "",
        }
    }

    pub fn precision(self) -> i32 {
        match self {
            Channel::NozzleTemp
            | Channel::NozzleTargetTemp
            | Channel::BedTemp
            | Channel::BedTargetTemp
            | Channel::AmsTemp => 1,
            _ => 0,
        }
    }
}

/// Body of a telemetry query for one window.
///
/// `timestamps` defines the shared index space; every channel sequence and
/// every filament `remain_data` is indexed against it. A `None` sample means
/// the printer reported nothing at that index, which is not the same as zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelemetryResponse {
    #[serde(default)]
    pub timestamps: Vec<String>,
    #[serde(default)]
    pub nozzle_temp: Vec<Option<f64>>,
    #[serde(default)]
    pub nozzle_target_temp: Vec<Option<f64>>,
    #[serde(default)]
    pub bed_temp: Vec<Option<f64>>,
    #[serde(default)]
    pub bed_target_temp: Vec<Option<f64>>,
    #[serde(default)]
    pub print_percent: Vec<Option<f64>>,
    #[serde(default)]
    pub cooling_fan_speed: Vec<Option<f64>>,
    #[serde(default)]
    pub heatbreak_fan_speed: Vec<Option<f64>>,
    #[serde(default)]
    pub wifi_signal_dbm: Vec<Option<f64>>,
    #[serde(default)]
    pub ams_humidity_raw: Vec<Option<f64>>,
    #[serde(default)]
    pub ams_temp: Vec<Option<f64>>,
    #[serde(default)]
    pub layer_num: Vec<Option<f64>>,
    #[serde(default)]
    pub total_layer_num: Vec<Option<f64>>,
    #[serde(default)]
    pub filament_timeline: HashMap<String, FilamentRecord>,
    #[serde(default)]
    pub project_markers: Option<Vec<ProjectMarker>>,
    #[serde(default)]
    pub gcode_state: Vec<Option<String>>,
    #[serde(default)]
    pub subtask_name: Vec<Option<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TelemetryResponse {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn channel(&self, channel: Channel) -> &[Option<f64>] {
        match channel {
            Channel::NozzleTemp => &self.nozzle_temp,
            Channel::NozzleTargetTemp => &self.nozzle_target_temp,
            Channel::BedTemp => &self.bed_temp,
            Channel::BedTargetTemp => &self.bed_target_temp,
            Channel::PrintPercent => &self.print_percent,
            Channel::CoolingFanSpeed => &self.cooling_fan_speed,
            Channel::HeatbreakFanSpeed => &self.heatbreak_fan_speed,
            Channel::WifiSignalDbm => &self.wifi_signal_dbm,
            Channel::AmsHumidityRaw => &self.ams_humidity_raw,
            Channel::AmsTemp => &self.ams_temp,
            Channel::LayerNum => &self.layer_num,
            Channel::TotalLayerNum => &self.total_layer_num,
        }
    }

    /// Channel samples aligned to `timestamps`: short sequences are padded
    /// with absent samples, long ones truncated.
    pub fn aligned_channel(&self, channel: Channel) -> Vec<Option<f64>> {
        align(self.channel(channel), self.len())
    }

    /// Print job markers, derived from the gcode state columns when the
    /// server did not send them.
    pub fn markers(&self) -> Vec<ProjectMarker> {
        match &self.project_markers {
            Some(markers) => markers.clone(),
            None => derive_project_markers(&self.gcode_state, &self.subtask_name),
        }
    }
}

pub fn align(samples: &[Option<f64>], len: usize) -> Vec<Option<f64>> {
    let mut aligned: Vec<Option<f64>> = samples.iter().take(len).copied().collect();
    aligned.resize(len, None);
    aligned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::markers::MarkerKind;

    #[test]
    fn test_parse_response_keeps_absent_samples() {
        let body = r#"{
            "timestamps": ["10:00", "10:01", "10:02"],
            "nozzle_temp": [210.5, null, 0],
            "layer_num": [1, 2, 3],
            "project_markers": [{"type": "start", "index": 1, "project_name": "benchy"}]
        }"#;
        let response: TelemetryResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.len(), 3);
        assert_eq!(response.channel(Channel::NozzleTemp), &[Some(210.5), None, Some(0.0)]);
        assert_eq!(response.channel(Channel::LayerNum), &[Some(1.0), Some(2.0), Some(3.0)]);
        assert!(response.channel(Channel::BedTemp).is_empty());
        assert!(response.error.is_none());

        let markers = response.markers();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].kind, MarkerKind::Start);
    }

    #[test]
    fn test_aligned_channel_pads_and_truncates() {
        let response = TelemetryResponse {
            timestamps: vec!["a".into(), "b".into(), "c".into()],
            bed_temp: vec![Some(60.0)],
            ams_temp: vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)],
            ..Default::default()
        };

        assert_eq!(response.aligned_channel(Channel::BedTemp), vec![Some(60.0), None, None]);
        assert_eq!(
            response.aligned_channel(Channel::AmsTemp),
            vec![Some(1.0), Some(2.0), Some(3.0)]
        );
    }

    #[test]
    fn test_markers_fall_back_to_gcode_states() {
        let response = TelemetryResponse {
            timestamps: vec!["a".into(), "b".into(), "c".into()],
            gcode_state: vec![Some("IDLE".into()), Some("RUNNING".into()), Some("FINISH".into())],
            subtask_name: vec![None, Some("cube".into()), Some("cube".into())],
            ..Default::default()
        };

        let markers = response.markers();
        assert_eq!(markers.len(), 2);
        assert_eq!((markers[0].kind, markers[0].index), (MarkerKind::Start, 1));
        assert_eq!((markers[1].kind, markers[1].index), (MarkerKind::End, 2));
    }

    #[test]
    fn test_channel_keys_are_unique() {
        let mut keys: Vec<&str> = Channel::ALL.iter().map(|c| c.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), Channel::ALL.len());
    }
}

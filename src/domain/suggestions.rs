// Filament field suggestions
use super::filament::{FilamentSeries, EXTERNAL_TRAY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const PRESET_TYPES: &[&str] = &["PLA", "PETG", "PET", "ABS", "ASA", "TPU", "PA", "PC", "PPS"];

pub const PRESET_SUB_TYPES: &[&str] = &[
    "PLA Basic", "PLA Matte", "PLA Silk", "PLA Metal", "PLA Marble", "PLA Glow", "PLA-CF",
    "PETG Basic", "PETG-CF", "PETG-HF", "ABS", "TPU 95A", "PA6-CF", "ASA", "PC", "PPS-CF",
    "Support W", "Support G",
];

pub const PRESET_BRANDS: &[&str] = &[
    "Bambu Lab", "eSUN", "Polymaker", "Hatchbox", "Prusament", "MatterHackers", "Overture",
    "3DXTech", "ColorFabb",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionField {
    Type,
    SubType,
    Brand,
}

impl SuggestionField {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "type" => Some(SuggestionField::Type),
            "sub_type" => Some(SuggestionField::SubType),
            "brand" => Some(SuggestionField::Brand),
            _ => None,
        }
    }

    pub fn presets(self) -> &'static [&'static str] {
        match self {
            SuggestionField::Type => PRESET_TYPES,
            SuggestionField::SubType => PRESET_SUB_TYPES,
            SuggestionField::Brand => PRESET_BRANDS,
        }
    }
}

/// Filament master data as seen by the suggestion list.
pub trait SuggestionSource {
    fn existing_values(&self, field: SuggestionField) -> Vec<String>;

    fn preset_values(&self, field: SuggestionField) -> Vec<String> {
        field.presets().iter().map(|s| s.to_string()).collect()
    }
}

/// Values currently loaded in the printer, taken from the filament timeline.
#[derive(Debug, Clone, Default)]
pub struct LoadedFilaments {
    types: BTreeSet<String>,
    sub_types: BTreeSet<String>,
}

impl LoadedFilaments {
    pub fn from_series(series: &[FilamentSeries]) -> Self {
        let mut loaded = Self::default();
        for s in series {
            if !s.material.is_empty() {
                loaded.types.insert(s.material.clone());
            }
            if !s.brand.is_empty() && s.brand != EXTERNAL_TRAY {
                loaded.sub_types.insert(s.brand.clone());
            }
        }
        loaded
    }
}

impl SuggestionSource for LoadedFilaments {
    fn existing_values(&self, field: SuggestionField) -> Vec<String> {
        match field {
            SuggestionField::Type => self.types.iter().cloned().collect(),
            SuggestionField::SubType => self.sub_types.iter().cloned().collect(),
            SuggestionField::Brand => Vec::new(),
        }
    }
}

/// A plain text input that suggestions write into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextField {
    pub value: String,
}

/// The type, sub-type and brand inputs of the filament form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilamentForm {
    #[serde(rename = "type")]
    pub material: TextField,
    pub sub_type: TextField,
    pub brand: TextField,
}

impl FilamentForm {
    pub fn field_mut(&mut self, field: SuggestionField) -> &mut TextField {
        match field {
            SuggestionField::Type => &mut self.material,
            SuggestionField::SubType => &mut self.sub_type,
            SuggestionField::Brand => &mut self.brand,
        }
    }
}

/// Existing values first, then presets, without case-insensitive duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionList {
    pub field: SuggestionField,
    pub items: Vec<String>,
}

impl SuggestionList {
    pub fn build(source: &dyn SuggestionSource, field: SuggestionField, typed: &str) -> Self {
        let needle = typed.trim().to_lowercase();
        let mut seen = BTreeSet::new();
        let items = source
            .existing_values(field)
            .into_iter()
            .chain(source.preset_values(field))
            .filter(|value| !value.trim().is_empty())
            .filter(|value| value.to_lowercase().contains(&needle))
            .filter(|value| seen.insert(value.to_lowercase()))
            .collect();

        Self { field, items }
    }

    /// Copy the chosen entry into `target` as-is. Out of range does nothing.
    pub fn select(&self, index: usize, target: &mut TextField) -> bool {
        match self.items.get(index) {
            Some(value) => {
                target.value = value.clone();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<&'static str>);

    impl SuggestionSource for Fixed {
        fn existing_values(&self, _field: SuggestionField) -> Vec<String> {
            self.0.iter().map(|s| s.to_string()).collect()
        }
    }

    #[test]
    fn test_existing_values_come_first_without_duplicates() {
        let list = SuggestionList::build(&Fixed(vec!["Silk+", "pla", "PETG"]), SuggestionField::Type, "");
        assert_eq!(&list.items[..3], &["Silk+", "pla", "PETG"]);
        assert!(!list.items.iter().any(|s| s == "PLA"));
        assert_eq!(list.items.len(), 3 + PRESET_TYPES.len() - 2);
    }

    #[test]
    fn test_filter_by_typed_text() {
        let list = SuggestionList::build(&Fixed(vec![]), SuggestionField::SubType, "cf");
        assert_eq!(list.items, vec!["PLA-CF", "PETG-CF", "PA6-CF", "PPS-CF"]);
    }

    #[test]
    fn test_select_writes_into_field() {
        let list = SuggestionList::build(&Fixed(vec![]), SuggestionField::Brand, "poly");
        let mut field = TextField::default();

        assert!(list.select(0, &mut field));
        assert_eq!(field.value, "Polymaker");
        assert!(!list.select(5, &mut field));
        assert_eq!(field.value, "Polymaker");
    }

    #[test]
    fn test_loaded_filaments_from_series() {
        use crate::domain::filament::{build_filament_series, FilamentRecord, TraySlot};
        use std::collections::HashMap;

        let mut timeline = HashMap::new();
        for (key, tray, material, brand) in [
            ("a", TraySlot::Bay(0), "PLA", "PLA Matte"),
            ("b", TraySlot::External, "PETG", "External"),
        ] {
            timeline.insert(
                key.to_string(),
                FilamentRecord {
                    tray_id: tray,
                    material: material.to_string(),
                    brand: brand.to_string(),
                    color: "FFFFFF".to_string(),
                    start_index: 0,
                    remaining: vec![],
                },
            );
        }

        let loaded = LoadedFilaments::from_series(&build_filament_series(&timeline, 1));
        assert_eq!(loaded.existing_values(SuggestionField::Type), vec!["PETG", "PLA"]);
        assert_eq!(loaded.existing_values(SuggestionField::SubType), vec!["PLA Matte"]);
        assert!(loaded.existing_values(SuggestionField::Brand).is_empty());
    }
}

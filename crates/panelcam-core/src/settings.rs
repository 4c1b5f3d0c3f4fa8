//! Settings Merger (C1): resolves effective run parameters from
//! `request ∪ factory ∪ defaults`, first non-null wins. Downstream
//! components only ever see `EffectiveSettings` — never a raw map with
//! nulls in it.

use serde::{Deserialize, Serialize};

/// Schema version of the default table. Bumping this is a deliberate code
/// change, not something that happens implicitly.
pub const SETTINGS_SCHEMA_VERSION: u32 = 1;

/// Fully-resolved settings. Every field is non-nullable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveSettings {
    pub sheet_width_mm: f64,
    pub sheet_length_mm: f64,
    pub default_thickness_mm: f64,
    pub gap_mm: f64,
    pub machine_profile: String,
    pub spindle_speed_rpm: f64,
    pub feed_rate_cutting_mm_min: f64,
    pub feed_rate_plunge_mm_min: f64,
    pub cut_depth_mm: f64,
    pub safe_height_mm: f64,
    pub tool_diameter_mm: f64,
    pub max_shelf_span_mm: f64,
    pub shelf_gap_mm: f64,
    pub tie_beam_height_mm: f64,
    pub drawer_gap_mm: f64,
    pub confirmat_front_offset_mm: f64,
    pub system32_front_offset_mm: f64,
}

impl Default for EffectiveSettings {
    fn default() -> Self {
        Self {
            sheet_width_mm: 2800.0,
            sheet_length_mm: 2070.0,
            default_thickness_mm: 16.0,
            gap_mm: 4.0,
            machine_profile: "weihong".into(),
            spindle_speed_rpm: 18000.0,
            feed_rate_cutting_mm_min: 6000.0,
            feed_rate_plunge_mm_min: 1500.0,
            cut_depth_mm: 16.0,
            safe_height_mm: 10.0,
            tool_diameter_mm: 6.0,
            max_shelf_span_mm: 600.0,
            shelf_gap_mm: 0.0,
            tie_beam_height_mm: 100.0,
            drawer_gap_mm: 20.0,
            confirmat_front_offset_mm: 37.0,
            system32_front_offset_mm: 37.0,
        }
    }
}

/// Per-tenant overrides. `None` means "use the default or request value."
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactorySettings {
    pub sheet_width_mm: Option<f64>,
    pub sheet_length_mm: Option<f64>,
    pub default_thickness_mm: Option<f64>,
    pub gap_mm: Option<f64>,
    pub machine_profile: Option<String>,
    pub spindle_speed_rpm: Option<f64>,
    pub feed_rate_cutting_mm_min: Option<f64>,
    pub feed_rate_plunge_mm_min: Option<f64>,
    pub cut_depth_mm: Option<f64>,
    pub safe_height_mm: Option<f64>,
    pub tool_diameter_mm: Option<f64>,
    pub max_shelf_span_mm: Option<f64>,
    pub shelf_gap_mm: Option<f64>,
    pub tie_beam_height_mm: Option<f64>,
    pub drawer_gap_mm: Option<f64>,
    pub confirmat_front_offset_mm: Option<f64>,
    pub system32_front_offset_mm: Option<f64>,
}

/// Per-request overrides, e.g. fields present in a job's `context`. Same
/// shape as `FactorySettings` — unknown/absent fields are simply ignored,
/// never an error.
pub type RequestOverrides = FactorySettings;

/// Resolve effective settings: first non-null of request, then factory,
/// then the built-in default table.
pub fn merge(
    request: &RequestOverrides,
    factory: &FactorySettings,
    defaults: &EffectiveSettings,
) -> EffectiveSettings {
    macro_rules! pick {
        ($field:ident) => {
            request
                .$field
                .clone()
                .or_else(|| factory.$field.clone())
                .unwrap_or_else(|| defaults.$field.clone())
        };
    }

    EffectiveSettings {
        sheet_width_mm: pick!(sheet_width_mm),
        sheet_length_mm: pick!(sheet_length_mm),
        default_thickness_mm: pick!(default_thickness_mm),
        gap_mm: pick!(gap_mm),
        machine_profile: pick!(machine_profile),
        spindle_speed_rpm: pick!(spindle_speed_rpm),
        feed_rate_cutting_mm_min: pick!(feed_rate_cutting_mm_min),
        feed_rate_plunge_mm_min: pick!(feed_rate_plunge_mm_min),
        cut_depth_mm: pick!(cut_depth_mm),
        safe_height_mm: pick!(safe_height_mm),
        tool_diameter_mm: pick!(tool_diameter_mm),
        max_shelf_span_mm: pick!(max_shelf_span_mm),
        shelf_gap_mm: pick!(shelf_gap_mm),
        tie_beam_height_mm: pick!(tie_beam_height_mm),
        drawer_gap_mm: pick!(drawer_gap_mm),
        confirmat_front_offset_mm: pick!(confirmat_front_offset_mm),
        system32_front_offset_mm: pick!(system32_front_offset_mm),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_overrides_win_over_factory_and_default() {
        let defaults = EffectiveSettings::default();
        let factory = FactorySettings { gap_mm: Some(3.0), ..Default::default() };
        let request = RequestOverrides { gap_mm: Some(5.0), ..Default::default() };
        let effective = merge(&request, &factory, &defaults);
        assert!((effective.gap_mm - 5.0).abs() < 1e-9);
    }

    #[test]
    fn factory_wins_over_default_when_request_absent() {
        let defaults = EffectiveSettings::default();
        let factory = FactorySettings { gap_mm: Some(3.0), ..Default::default() };
        let request = RequestOverrides::default();
        let effective = merge(&request, &factory, &defaults);
        assert!((effective.gap_mm - 3.0).abs() < 1e-9);
    }

    #[test]
    fn default_used_when_nothing_overrides() {
        let defaults = EffectiveSettings::default();
        let effective = merge(&RequestOverrides::default(), &FactorySettings::default(), &defaults);
        assert_eq!(effective, defaults);
    }

    #[test]
    fn unknown_request_fields_are_simply_absent_not_an_error() {
        let json = "{}";
        let request: RequestOverrides = serde_json::from_str(json).unwrap();
        assert!(request.gap_mm.is_none());
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-rebuild configuration, with environment overrides.

use floorplan_geometry::{Dimensions, RoofConfig, RoofKind};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Everything a rebuild needs besides the plan itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Wall, opening and plane dimensions.
    #[serde(flatten)]
    pub dimensions: Dimensions,
    /// Roof kind, thickness, overhang, pitch and color.
    pub roof: RoofConfig,
    /// Minimum time between two rebuilds, in seconds.
    pub cooldown_secs: f64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            dimensions: Dimensions::default(),
            roof: RoofConfig::default(),
            cooldown_secs: 0.5,
        }
    }
}

impl BuildConfig {
    /// Load configuration from `FLOORPLAN_*` environment variables.
    ///
    /// Missing or unparsable values keep their default.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Self::default();
        let get = |key: &str, default: f64| parse_or(lookup(key), default);
        let dims = base.dimensions;
        let roof = base.roof;

        Self {
            dimensions: Dimensions {
                wall_height: get("FLOORPLAN_WALL_HEIGHT", dims.wall_height),
                door_height: get("FLOORPLAN_DOOR_HEIGHT", dims.door_height),
                interior_thickness: get("FLOORPLAN_INTERIOR_THICKNESS", dims.interior_thickness),
                exterior_thickness: get("FLOORPLAN_EXTERIOR_THICKNESS", dims.exterior_thickness),
                frame_width: get("FLOORPLAN_FRAME_WIDTH", dims.frame_width),
                frame_thickness: get("FLOORPLAN_FRAME_THICKNESS", dims.frame_thickness),
                bar_width: get("FLOORPLAN_BAR_WIDTH", dims.bar_width),
                association_tolerance: get("FLOORPLAN_ASSOCIATION_TOLERANCE", dims.association_tolerance),
                miter_limit: get("FLOORPLAN_MITER_LIMIT", dims.miter_limit),
                ..dims
            },
            roof: RoofConfig {
                kind: lookup("FLOORPLAN_ROOF_KIND")
                    .and_then(|v| parse_roof_kind(&v))
                    .unwrap_or(roof.kind),
                thickness: get("FLOORPLAN_ROOF_THICKNESS", roof.thickness),
                overhang: get("FLOORPLAN_ROOF_OVERHANG", roof.overhang),
                pitch_degrees: get("FLOORPLAN_ROOF_PITCH", roof.pitch_degrees),
                ..roof
            },
            cooldown_secs: get("FLOORPLAN_COOLDOWN_SECS", base.cooldown_secs),
        }
    }

    /// Rebuild cooldown as a duration; negative values mean no cooldown.
    pub fn cooldown(&self) -> Duration {
        Duration::try_from_secs_f64(self.cooldown_secs).unwrap_or(Duration::ZERO)
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn parse_roof_kind(value: &str) -> Option<RoofKind> {
    match value.trim().to_ascii_lowercase().as_str() {
        "flat" => Some(RoofKind::Flat),
        "hipped" | "hip" => Some(RoofKind::Hipped),
        "gabled" | "gable" => Some(RoofKind::Gabled),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_vars() {
        assert_eq!(BuildConfig::from_vars(lookup(&[])), BuildConfig::default());
    }

    #[test]
    fn test_vars_override_fields() {
        let config = BuildConfig::from_vars(lookup(&[
            ("FLOORPLAN_WALL_HEIGHT", "3.1"),
            ("FLOORPLAN_ROOF_KIND", "Gabled"),
            ("FLOORPLAN_ROOF_PITCH", " 45 "),
            ("FLOORPLAN_COOLDOWN_SECS", "2"),
        ]));

        assert_eq!(config.dimensions.wall_height, 3.1);
        assert_eq!(config.roof.kind, RoofKind::Gabled);
        assert_eq!(config.roof.pitch_degrees, 45.0);
        assert_eq!(config.cooldown(), Duration::from_secs(2));
        assert_eq!(config.dimensions.door_height, Dimensions::default().door_height);
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let config = BuildConfig::from_vars(lookup(&[
            ("FLOORPLAN_WALL_HEIGHT", "tall"),
            ("FLOORPLAN_ROOF_KIND", "dome"),
        ]));
        assert_eq!(config, BuildConfig::default());
    }

    #[test]
    fn test_negative_cooldown_is_zero() {
        let config = BuildConfig {
            cooldown_secs: -1.0,
            ..BuildConfig::default()
        };
        assert_eq!(config.cooldown(), Duration::ZERO);
    }
}

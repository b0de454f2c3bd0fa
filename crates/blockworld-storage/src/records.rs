//! Persisted record schemas.
//!
//! World metadata is a single JSON object stored under [`META_KEY`]:
//!
//! ```json
//! {"version":1,"seed":23021990,"player":{"x":0,"y":52,"z":0,"yaw":0,"pitch":0},
//!  "selectedSlot":0,"volume":0.7}
//! ```
//!
//! Chunk records are stored under `"cx,cz"` as a flat JSON array of
//! run-length pairs `[code, count, code, count, ...]`.

use serde::{Deserialize, Deserializer, Serialize};

/// Key of the world metadata record.
pub const META_KEY: &str = "world";

/// The only metadata schema this build reads and writes.
pub const META_VERSION: u32 = 1;

/// Position used when no pose has been saved yet.
pub const DEFAULT_PLAYER_POSITION: [f64; 3] = [0.0, 52.0, 0.0];

pub const DEFAULT_VOLUME: f64 = 0.7;

/// Saved observer position and orientation.
///
/// Fields that are missing, `null`, or non-finite decode as NaN and are
/// replaced by [`PlayerPose::normalized`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PlayerPose {
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub x: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub y: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub z: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub yaw: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub pitch: f64,
}

impl PlayerPose {
    /// A pose at `position` looking straight ahead.
    pub fn at(position: [f64; 3]) -> Self {
        let [x, y, z] = position;
        Self {
            x,
            y,
            z,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// A pose with every component unset.
    pub fn unset() -> Self {
        Self {
            x: f64::NAN,
            y: f64::NAN,
            z: f64::NAN,
            yaw: f64::NAN,
            pitch: f64::NAN,
        }
    }

    /// Replaces non-finite position components with `spawn` and non-finite
    /// angles with 0.
    pub fn normalized(&self, spawn: [f64; 3]) -> Self {
        Self {
            x: finite_or(self.x, spawn[0]),
            y: finite_or(self.y, spawn[1]),
            z: finite_or(self.z, spawn[2]),
            yaw: finite_or(self.yaw, 0.0),
            pitch: finite_or(self.pitch, 0.0),
        }
    }

    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl PartialEq for PlayerPose {
    // Unset (NaN) components compare equal to each other.
    fn eq(&self, other: &Self) -> bool {
        let same = |a: f64, b: f64| a == b || (a.is_nan() && b.is_nan());
        same(self.x, other.x)
            && same(self.y, other.y)
            && same(self.z, other.z)
            && same(self.yaw, other.yaw)
            && same(self.pitch, other.pitch)
    }
}

/// The world metadata record, overwritten wholesale on every save.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldMeta {
    pub version: u32,
    pub seed: i32,
    #[serde(default = "PlayerPose::unset")]
    pub player: PlayerPose,
    #[serde(default, alias = "selectedHotbar", deserialize_with = "lenient_slot")]
    pub selected_slot: usize,
    #[serde(default = "default_volume")]
    pub volume: f64,
}

impl WorldMeta {
    /// Fresh metadata for a new world.
    pub fn new(seed: i32) -> Self {
        Self {
            version: META_VERSION,
            seed,
            player: PlayerPose::at(DEFAULT_PLAYER_POSITION),
            selected_slot: 0,
            volume: DEFAULT_VOLUME,
        }
    }

    /// Pose to resume from, falling back to `spawn` for unusable components.
    pub fn resume_pose(&self, spawn: [f64; 3]) -> PlayerPose {
        self.player.normalized(spawn)
    }
}

/// Returns `value` if it is finite, otherwise `fallback`.
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

fn nan() -> f64 {
    f64::NAN
}

fn default_volume() -> f64 {
    DEFAULT_VOLUME
}

/// Accepts a number or `null`; `null` becomes NaN.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// Accepts any number or `null`; floors it and clamps negatives to 0.
fn lenient_slot<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let slot = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    Ok(if slot.is_finite() && slot > 0.0 {
        slot.floor() as usize
    } else {
        0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_meta_serializes_camel_case() {
        let json = serde_json::to_value(WorldMeta::new(42)).unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(json["seed"], 42);
        assert_eq!(json["selectedSlot"], 0);
        assert_eq!(json["player"]["y"], 52.0);
        assert_eq!(json["volume"], 0.7);
    }

    #[test]
    fn test_roundtrip() {
        let mut meta = WorldMeta::new(-5);
        meta.player = PlayerPose {
            x: 1.5,
            y: 40.0,
            z: -3.25,
            yaw: 0.5,
            pitch: -0.1,
        };
        meta.selected_slot = 4;
        let bytes = serde_json::to_vec(&meta).unwrap();
        let back: WorldMeta = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn test_null_and_missing_components_fall_back() {
        let json = r#"{"version":1,"seed":7,"player":{"x":null,"y":12.5,"yaw":1.0}}"#;
        let meta: WorldMeta = serde_json::from_str(json).unwrap();
        let pose = meta.resume_pose([0.0, 30.0, 0.0]);
        assert_eq!(pose.x, 0.0);
        assert_eq!(pose.y, 12.5);
        assert_eq!(pose.z, 0.0);
        assert_eq!(pose.yaw, 1.0);
        assert_eq!(pose.pitch, 0.0);
        assert_eq!(meta.selected_slot, 0);
        assert_eq!(meta.volume, DEFAULT_VOLUME);
    }

    #[test]
    fn test_missing_player_uses_spawn() {
        let meta: WorldMeta = serde_json::from_str(r#"{"version":1,"seed":7}"#).unwrap();
        let pose = meta.resume_pose([1.0, 2.0, 3.0]);
        assert_eq!(pose, PlayerPose::at([1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_legacy_slot_field_is_accepted() {
        let json = r#"{"version":1,"seed":7,"selectedHotbar":3}"#;
        let meta: WorldMeta = serde_json::from_str(json).unwrap();
        assert_eq!(meta.selected_slot, 3);
    }

    #[test]
    fn test_odd_slot_values_are_tolerated() {
        let parse = |slot: &str| {
            let json = format!(r#"{{"version":1,"seed":7,"selectedSlot":{slot}}}"#);
            serde_json::from_str::<WorldMeta>(&json).unwrap().selected_slot
        };
        assert_eq!(parse("-3"), 0);
        assert_eq!(parse("4.7"), 4);
        assert_eq!(parse("null"), 0);
        assert_eq!(parse("6"), 6);
    }

    #[test]
    fn test_non_finite_pose_serializes_as_null() {
        let mut meta = WorldMeta::new(1);
        meta.player.x = f64::INFINITY;
        let text = serde_json::to_string(&meta).unwrap();
        let back: WorldMeta = serde_json::from_str(&text).unwrap();
        assert_eq!(back.resume_pose([9.0, 9.0, 9.0]).x, 9.0);
    }
}

//! 3D noise-based cave carving.
//!
//! A 3D fBm field is sampled for voxels comfortably below the surface and
//! above the cave floor; where the signal exceeds a threshold the voxel stays
//! air, producing connected void pockets.

use crate::noise::{FbmField, FbmParams};

/// Configuration for cave carving.
#[derive(Clone, Debug, PartialEq)]
pub struct CaveConfig {
    /// XOR-ed into the world seed to decorrelate caves from terrain. Default: `0x77aa`.
    pub salt: i32,
    /// Voxels whose noise value is strictly above this become air. Default: 0.68.
    pub threshold: f64,
    /// Horizontal world-to-noise scale. Default: 0.045.
    pub horizontal_frequency: f64,
    /// Vertical world-to-noise scale. Default: 0.05.
    pub vertical_frequency: f64,
    /// Octave settings. Default: 3 octaves, lacunarity 2, gain 0.5.
    pub fbm: FbmParams,
    /// Lowest y that may be carved. Default: 6.
    pub min_y: i32,
    /// Voxels within this many blocks of the surface are never carved. Default: 3.
    pub surface_margin: i32,
}

impl Default for CaveConfig {
    fn default() -> Self {
        Self {
            salt: 0x77aa,
            threshold: 0.68,
            horizontal_frequency: 0.045,
            vertical_frequency: 0.05,
            fbm: FbmParams::new(3, 2.0, 0.5),
            min_y: 6,
            surface_margin: 3,
        }
    }
}

/// Decides which subsurface voxels are hollow.
#[derive(Clone, Debug)]
pub struct CaveCarver {
    field: FbmField,
    config: CaveConfig,
}

impl CaveCarver {
    pub fn new(seed: i32, config: CaveConfig) -> Self {
        Self {
            field: FbmField::new_3d(seed ^ config.salt, config.fbm),
            config,
        }
    }

    /// Returns the cave configuration.
    pub fn config(&self) -> &CaveConfig {
        &self.config
    }

    /// Returns `true` if the voxel at `(wx, y, wz)` should be left as air.
    ///
    /// `surface` is the column's terrain height.
    pub fn is_cave(&self, wx: i32, y: i32, wz: i32, surface: i32) -> bool {
        if y >= surface - self.config.surface_margin || y < self.config.min_y {
            return false;
        }

        let signal = self.field.sample3(
            wx as f64 * self.config.horizontal_frequency,
            y as f64 * self.config.vertical_frequency,
            wz as f64 * self.config.horizontal_frequency,
        );
        signal > self.config.threshold
    }
}

//! Column surface height from three additive fBm bands.
//!
//! Broad "base" rolling hills, fine "detail" bumps, and very low-frequency
//! "mountain" swells are each centered on zero, scaled, summed onto the sea
//! level, and clamped away from the world's vertical bounds.

use blockworld_voxel::CHUNK_HEIGHT;

use crate::noise::{FbmField, FbmParams};

/// One additive noise band of the height field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightBand {
    /// XOR-ed into the world seed to decorrelate this band from the others.
    pub salt: i32,
    /// World-to-noise coordinate scale.
    pub frequency: f64,
    /// Octave settings.
    pub fbm: FbmParams,
    /// Height contribution of a full-range swing (`noise - 0.5` is multiplied by this).
    pub weight: f64,
}

/// Configuration for the height field.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightmapParams {
    /// Bands summed onto the sea level.
    pub bands: Vec<HeightBand>,
    /// Minimum distance kept from the bottom and top of the world.
    pub vertical_margin: i32,
}

impl Default for HeightmapParams {
    fn default() -> Self {
        Self {
            bands: vec![
                // base
                HeightBand {
                    salt: 0,
                    frequency: 0.010,
                    fbm: FbmParams::new(4, 2.0, 0.5),
                    weight: 26.0,
                },
                // detail
                HeightBand {
                    salt: 0x9341,
                    frequency: 0.03,
                    fbm: FbmParams::new(3, 2.4, 0.45),
                    weight: 8.0,
                },
                // mountain
                HeightBand {
                    salt: 0x4217,
                    frequency: 0.004,
                    fbm: FbmParams::new(2, 2.0, 0.5),
                    weight: 22.0,
                },
            ],
            vertical_margin: 8,
        }
    }
}

/// Samples the integer surface height of a world column.
#[derive(Clone, Debug)]
pub struct HeightmapSampler {
    sea_level: i32,
    vertical_margin: i32,
    bands: Vec<(HeightBand, FbmField)>,
}

impl HeightmapSampler {
    pub fn new(seed: i32, sea_level: i32, params: HeightmapParams) -> Self {
        let bands = params
            .bands
            .into_iter()
            .map(|band| (band, FbmField::new_2d(seed ^ band.salt, band.fbm)))
            .collect();
        Self {
            sea_level,
            vertical_margin: params.vertical_margin,
            bands,
        }
    }

    /// Surface height (y of the topmost terrain voxel) at world column `(wx, wz)`.
    pub fn height(&self, wx: i32, wz: i32) -> i32 {
        let (x, z) = (wx as f64, wz as f64);
        let combined: f64 = self
            .bands
            .iter()
            .map(|(band, field)| {
                let n = field.sample2(x * band.frequency, z * band.frequency);
                (n - 0.5) * band.weight
            })
            .sum();

        let h = (self.sea_level as f64 + combined).floor() as i32;
        let margin = self.vertical_margin;
        h.clamp(margin, CHUNK_HEIGHT - margin)
    }
}

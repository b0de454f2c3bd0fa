//! Seeded value-noise fields built on the `noise` crate.
//!
//! Each field owns one [`Value`] source per octave. Raw samples in `[-1, 1]`
//! are remapped to `[0, 1]` so band weights can be centered on `0.5`.

use std::fmt;

use noise::{NoiseFn, Value};

/// Octave settings for one fBm field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FbmParams {
    /// Number of octaves to sum.
    pub octaves: u32,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves.
    pub gain: f64,
}

impl FbmParams {
    pub const fn new(octaves: u32, lacunarity: f64, gain: f64) -> Self {
        Self {
            octaves,
            lacunarity,
            gain,
        }
    }
}

/// Per-octave seed stride for 2D fields.
const OCTAVE_STRIDE_2D: i32 = 911;
/// Per-octave seed stride for 3D fields.
const OCTAVE_STRIDE_3D: i32 = 613;

#[inline]
fn to_unit(raw: f64) -> f64 {
    (raw * 0.5 + 0.5).clamp(0.0, 1.0)
}

/// Single-octave value noise in `[0, 1]`.
#[derive(Clone)]
pub struct ValueField {
    seed: i32,
    source: Value,
}

impl ValueField {
    pub fn new(seed: i32) -> Self {
        Self {
            seed,
            source: Value::new(seed as u32),
        }
    }

    pub fn sample2(&self, x: f64, z: f64) -> f64 {
        to_unit(self.source.get([x, z]))
    }

    pub fn sample3(&self, x: f64, y: f64, z: f64) -> f64 {
        to_unit(self.source.get([x, y, z]))
    }
}

impl fmt::Debug for ValueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueField")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

/// Fractal Brownian motion over value noise, normalized by the amplitude sum
/// so the result stays in `[0, 1]`.
#[derive(Clone)]
pub struct FbmField {
    seed: i32,
    params: FbmParams,
    octaves: Vec<Value>,
}

impl FbmField {
    /// Field for 2D sampling. Octave `i` is seeded with `seed + 911 * i`.
    pub fn new_2d(seed: i32, params: FbmParams) -> Self {
        Self::with_stride(seed, params, OCTAVE_STRIDE_2D)
    }

    /// Field for 3D sampling. Octave `i` is seeded with `seed + 613 * i`.
    pub fn new_3d(seed: i32, params: FbmParams) -> Self {
        Self::with_stride(seed, params, OCTAVE_STRIDE_3D)
    }

    fn with_stride(seed: i32, params: FbmParams, stride: i32) -> Self {
        let octaves = (0..params.octaves)
            .map(|i| {
                let octave_seed = seed.wrapping_add((i as i32).wrapping_mul(stride));
                Value::new(octave_seed as u32)
            })
            .collect();
        Self {
            seed,
            params,
            octaves,
        }
    }

    pub fn params(&self) -> FbmParams {
        self.params
    }

    pub fn sample2(&self, x: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        let mut max_amplitude = 0.0;

        for source in &self.octaves {
            total += to_unit(source.get([x * frequency, z * frequency])) * amplitude;
            max_amplitude += amplitude;

            frequency *= self.params.lacunarity;
            amplitude *= self.params.gain;
        }

        if max_amplitude > 0.0 { total / max_amplitude } else { 0.0 }
    }

    pub fn sample3(&self, x: f64, y: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        let mut max_amplitude = 0.0;

        for source in &self.octaves {
            let raw = source.get([x * frequency, y * frequency, z * frequency]);
            total += to_unit(raw) * amplitude;
            max_amplitude += amplitude;

            frequency *= self.params.lacunarity;
            amplitude *= self.params.gain;
        }

        if max_amplitude > 0.0 { total / max_amplitude } else { 0.0 }
    }
}

impl fmt::Debug for FbmField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FbmField")
            .field("seed", &self.seed)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> impl Iterator<Item = (f64, f64)> {
        (0..100).flat_map(|i| {
            (0..100).map(move |j| (i as f64 * 0.37 - 18.0, j as f64 * 0.41 - 20.0))
        })
    }

    #[test]
    fn test_value_field_range_and_determinism() {
        let a = ValueField::new(42);
        let b = ValueField::new(42);
        for (x, z) in grid() {
            let v = a.sample2(x, z);
            assert!((0.0..=1.0).contains(&v));
            assert_eq!(v, b.sample2(x, z));
        }
    }

    #[test]
    fn test_value_field_covers_both_halves() {
        let field = ValueField::new(-7);
        let samples: Vec<f64> = grid().map(|(x, z)| field.sample2(x, z)).collect();
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        assert!((0.4..0.6).contains(&mean), "mean {mean}");
        assert!(samples.iter().any(|v| *v < 0.25));
        assert!(samples.iter().any(|v| *v > 0.75));
    }

    #[test]
    fn test_value_field_depends_on_seed() {
        let a = ValueField::new(1);
        let b = ValueField::new(2);
        let differing = grid()
            .filter(|&(x, z)| a.sample2(x, z) != b.sample2(x, z))
            .count();
        assert!(differing > 9_000, "only {differing} samples changed with the seed");
    }

    #[test]
    fn test_fbm_stays_normalized_and_centered() {
        let params = FbmParams::new(4, 2.0, 0.5);
        let field2 = FbmField::new_2d(23_021_990, params);
        let field3 = FbmField::new_3d(23_021_990, params);
        let mut sum = 0.0;
        let mut count = 0.0;
        for (x, z) in grid() {
            let v2 = field2.sample2(x, z);
            let v3 = field3.sample3(x, 12.0, -z);
            assert!((0.0..=1.0).contains(&v2));
            assert!((0.0..=1.0).contains(&v3));
            sum += v2;
            count += 1.0;
        }
        let mean = sum / count;
        assert!((0.4..0.6).contains(&mean), "mean {mean}");
    }

    #[test]
    fn test_single_octave_fbm_matches_value_field() {
        let fbm = FbmField::new_2d(9, FbmParams::new(1, 2.0, 0.5));
        let value = ValueField::new(9);
        assert_eq!(fbm.sample2(3.25, -4.5), value.sample2(3.25, -4.5));
    }

    #[test]
    fn test_zero_octaves_is_zero() {
        let field = FbmField::new_2d(1, FbmParams::new(0, 2.0, 0.5));
        assert_eq!(field.sample2(0.5, 0.5), 0.0);
    }

    #[test]
    fn test_extreme_seeds_do_not_overflow() {
        let params = FbmParams::new(4, 2.0, 0.5);
        for seed in [i32::MIN, -1, i32::MAX] {
            let field = FbmField::new_3d(seed, params);
            assert!((0.0..=1.0).contains(&field.sample3(1.5, 2.5, 3.5)));
        }
    }
}

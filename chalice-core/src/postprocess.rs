//! The post-processing stage.
//!
//! The finished frame goes through one fixed effect, an ordered (Bayer) dither. This module holds
//! the effect description, a CPU reference of the per-pixel transform that the GPU pass mirrors,
//! and [`StageCache`], which builds the GPU pass once and reuses it until an input it owns
//! changes.

use glam::Vec3;

/// The 4x4 Bayer threshold matrix, row-major, values `0..16`.
pub const BAYER_4X4: [f32; 16] = [
    0.0, 8.0, 2.0, 10.0, //
    12.0, 4.0, 14.0, 6.0, //
    3.0, 11.0, 1.0, 9.0, //
    15.0, 7.0, 13.0, 5.0,
];

/// Ordered-dither settings. These are fixed; nothing outside the stage tunes them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DitherEffect {
    /// Size in screen pixels of one dither cell.
    pub cell_size: f32,
    /// Number of output levels per color channel.
    pub levels: f32,
}

impl Default for DitherEffect {
    fn default() -> Self {
        Self {
            cell_size: 2.0,
            levels: 4.0,
        }
    }
}

impl DitherEffect {
    /// The threshold in `[-0.5, 0.5)` for the dither cell containing pixel `(x, y)`.
    pub fn threshold(&self, x: u32, y: u32) -> f32 {
        let cell = self.cell_size.max(1.0) as u32;
        let (cx, cy) = ((x / cell) % 4, (y / cell) % 4);
        (BAYER_4X4[(cy * 4 + cx) as usize] + 0.5) / 16.0 - 0.5
    }

    /// Dithers one color (components in `[0, 1]`) at pixel `(x, y)`.
    pub fn apply(&self, color: Vec3, x: u32, y: u32) -> Vec3 {
        let steps = (self.levels - 1.0).max(1.0);
        let t = self.threshold(x, y);
        let quantize = |c: f32| ((c.clamp(0.0, 1.0) * steps + t).round().clamp(0.0, steps)) / steps;
        Vec3::new(quantize(color.x), quantize(color.y), quantize(color.z))
    }
}

/// The always-on stage applied to every rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PostProcessStage {
    pub dither: DitherEffect,
}

/// Builds a value once and rebuilds it only when its key changes.
pub struct StageCache<K, T> {
    entry: Option<(K, T)>,
    builds: usize,
}

impl<K, T> Default for StageCache<K, T> {
    fn default() -> Self {
        Self {
            entry: None,
            builds: 0,
        }
    }
}

impl<K: PartialEq + Clone, T> StageCache<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, building it when absent or built for another key.
    pub fn get_or_build<E>(
        &mut self,
        key: &K,
        build: impl FnOnce(&K) -> Result<T, E>,
    ) -> Result<&mut T, E> {
        let stale = !matches!(&self.entry, Some((k, _)) if k == key);
        if stale {
            let value = build(key)?;
            self.builds += 1;
            self.entry = Some((key.clone(), value));
        }
        match &mut self.entry {
            Some((_, value)) => Ok(value),
            None => unreachable!("entry was just built"),
        }
    }

    /// How many times a value has been built.
    pub fn builds(&self) -> usize {
        self.builds
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_and_white_are_stable() {
        let effect = DitherEffect::default();
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(effect.apply(Vec3::ZERO, x, y), Vec3::ZERO);
                assert_eq!(effect.apply(Vec3::ONE, x, y), Vec3::ONE);
            }
        }
    }

    #[test]
    fn test_dither_preserves_average() {
        let effect = DitherEffect {
            cell_size: 1.0,
            levels: 2.0,
        };
        let mut sum = 0.0;
        for y in 0..4 {
            for x in 0..4 {
                sum += effect.apply(Vec3::splat(0.5), x, y).x;
            }
        }
        assert_eq!(sum / 16.0, 0.5);
    }

    #[test]
    fn test_cells_span_cell_size_pixels() {
        let effect = DitherEffect::default();
        assert_eq!(effect.threshold(0, 0), effect.threshold(1, 1));
        assert_ne!(effect.threshold(0, 0), effect.threshold(2, 0));
        assert_eq!(effect.threshold(0, 0), effect.threshold(8, 8));
    }

    #[test]
    fn test_cache_builds_once_per_key() {
        let mut cache: StageCache<(u32, u32), String> = StageCache::new();
        let build = |k: &(u32, u32)| Ok::<_, ()>(format!("{}x{}", k.0, k.1));

        assert_eq!(cache.get_or_build(&(800, 600), build).unwrap(), "800x600");
        cache.get_or_build(&(800, 600), build).unwrap();
        assert_eq!(cache.builds(), 1);

        assert_eq!(cache.get_or_build(&(1024, 768), build).unwrap(), "1024x768");
        assert_eq!(cache.builds(), 2);
    }

    #[test]
    fn test_failed_build_is_retried() {
        let mut cache: StageCache<u32, u32> = StageCache::new();
        assert!(cache.get_or_build(&1, |_| Err("no context")).is_err());
        assert_eq!(cache.builds(), 0);
        assert_eq!(*cache.get_or_build(&1, |k| Ok::<_, &str>(*k)).unwrap(), 1);
    }
}

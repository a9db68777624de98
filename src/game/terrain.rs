//! Terrain grid: a fixed square array of terrain classes
//!
//! Classes rank water (0) up to peaks (7). Movement reads the class under a
//! player, projectiles compare the class under them against the class at
//! their origin.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::Serialize;

pub const WATER: u8 = 0;
pub const PEAKS: u8 = 7;

/// Upper bounds (exclusive) of each class on normalized noise
const CLASS_THRESHOLDS: [f64; 7] = [0.3, 0.38, 0.46, 0.6, 0.7, 0.75, 0.85];

/// Noise sampling frequency per cell
const FREQUENCY: f64 = 0.03;
const OCTAVES: usize = 5;

/// Square grid of terrain classes, indexed `[y][x]`
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct TerrainGrid {
    rows: Vec<Vec<u8>>,
}

impl TerrainGrid {
    /// A grid where every cell has the same class
    #[cfg(test)]
    pub fn uniform(size: usize, class: u8) -> Self {
        Self {
            rows: vec![vec![class.min(PEAKS); size]; size],
        }
    }

    /// Generate terrain from fractal Perlin noise
    pub fn generate(size: usize, seed: u64) -> Self {
        let fbm = Fbm::<Perlin>::new(noise_seed(seed)).set_octaves(OCTAVES);

        let samples: Vec<Vec<f64>> = (0..size)
            .map(|y| {
                (0..size)
                    .map(|x| fbm.get([x as f64 * FREQUENCY, y as f64 * FREQUENCY]))
                    .collect()
            })
            .collect();

        let (min, max) = samples
            .iter()
            .flatten()
            .fold((f64::MAX, f64::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let span = (max - min).max(f64::EPSILON);

        let rows = samples
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|v| classify((v - min) / span))
                    .collect()
            })
            .collect();

        Self { rows }
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Class at a grid cell, `None` off the map
    pub fn class_at(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 {
            return None;
        }
        self.rows
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
    }

    /// Class at the nearest on-map cell
    pub fn class_at_clamped(&self, x: i32, y: i32) -> u8 {
        let max = self.size() as i32 - 1;
        self.class_at(x.clamp(0, max), y.clamp(0, max))
            .unwrap_or(WATER)
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    #[cfg(test)]
    pub fn set(&mut self, x: usize, y: usize, class: u8) {
        self.rows[y][x] = class;
    }
}

/// Bucket a normalized noise value into a terrain class
pub fn classify(value: f64) -> u8 {
    CLASS_THRESHOLDS
        .iter()
        .position(|&bound| value < bound)
        .map(|class| class as u8)
        .unwrap_or(PEAKS)
}

fn noise_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_buckets() {
        assert_eq!(classify(0.0), WATER);
        assert_eq!(classify(0.29), 0);
        assert_eq!(classify(0.3), 1);
        assert_eq!(classify(0.45), 2);
        assert_eq!(classify(0.59), 3);
        assert_eq!(classify(0.65), 4);
        assert_eq!(classify(0.74), 5);
        assert_eq!(classify(0.8), 6);
        assert_eq!(classify(0.85), PEAKS);
        assert_eq!(classify(1.0), PEAKS);
    }

    #[test]
    fn generated_grid_is_square_and_deterministic() {
        let a = TerrainGrid::generate(32, 7);
        let b = TerrainGrid::generate(32, 7);
        assert_eq!(a.size(), 32);
        assert!(a.rows().iter().all(|row| row.len() == 32));
        assert_eq!(a.rows(), b.rows());
        assert!(a.rows().iter().flatten().all(|&c| c <= PEAKS));
    }

    #[test]
    fn lookups_outside_the_map() {
        let mut grid = TerrainGrid::uniform(4, 2);
        grid.set(0, 0, 5);
        assert_eq!(grid.class_at(0, 0), Some(5));
        assert_eq!(grid.class_at(-1, 0), None);
        assert_eq!(grid.class_at(0, 4), None);
        assert_eq!(grid.class_at_clamped(-3, -3), 5);
    }
}

//! Player movement and terrain speed modifiers

use super::terrain::{TerrainGrid, WATER};
use super::GridPos;

/// Distance covered per applied move (not per tick)
pub const BASE_SPEED: f64 = 1.1;

/// Fraction of base speed kept while standing in water
pub const WATER_SPEED_FACTOR: f64 = 0.4;

/// Round to the nearest cell, halves toward positive infinity
pub fn to_cell(v: f64) -> i32 {
    (v + 0.5).floor() as i32
}

/// Movement system for resolving player intents into positions
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Speed for a player standing on `cell`
    pub fn movement_multiplier(terrain: &TerrainGrid, cell: GridPos) -> f64 {
        if terrain.class_at_clamped(cell.0, cell.1) == WATER {
            BASE_SPEED * WATER_SPEED_FACTOR
        } else {
            BASE_SPEED
        }
    }

    /// Advance a continuous position one step along `direction`.
    /// Returns (new_exact, new_cell)
    pub fn step(
        exact: (f64, f64),
        cell: GridPos,
        direction: f64,
        terrain: &TerrainGrid,
    ) -> ((f64, f64), GridPos) {
        let multiplier = Self::movement_multiplier(terrain, cell);
        let max = (terrain.size() as f64 - 1.0).max(0.0);

        let x = (exact.0 + direction.cos() * multiplier).clamp(0.0, max);
        let y = (exact.1 + direction.sin() * multiplier).clamp(0.0, max);

        ((x, y), (to_cell(x), to_cell(y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn displacement(terrain: &TerrainGrid, direction: f64) -> f64 {
        let start = (10.0, 10.0);
        let ((x, y), _) = PhysicsSystem::step(start, (10, 10), direction, terrain);
        ((x - start.0).powi(2) + (y - start.1).powi(2)).sqrt()
    }

    #[test]
    fn rounding_matches_half_up() {
        assert_eq!(to_cell(1.5), 2);
        assert_eq!(to_cell(1.49), 1);
        assert_eq!(to_cell(-0.5), 0);
        assert_eq!(to_cell(-0.51), -1);
    }

    #[test]
    fn dry_land_moves_base_speed() {
        let land = TerrainGrid::uniform(20, 3);
        let ((x, y), cell) = PhysicsSystem::step((10.0, 10.0), (10, 10), 0.0, &land);
        assert!((x - 11.1).abs() < 1e-9);
        assert!((y - 10.0).abs() < 1e-9);
        assert_eq!(cell, (11, 10));
    }

    #[test]
    fn water_cuts_displacement_to_forty_percent() {
        let land = TerrainGrid::uniform(20, 2);
        let water = TerrainGrid::uniform(20, WATER);
        for direction in [0.0, 0.7, 2.0, -1.3] {
            let ratio = displacement(&water, direction) / displacement(&land, direction);
            assert!((ratio - 0.4).abs() < 1e-9, "ratio {ratio} at {direction}");
        }
    }

    #[test]
    fn position_is_clamped_to_map() {
        let land = TerrainGrid::uniform(10, 3);
        let ((x, y), cell) =
            PhysicsSystem::step((9.0, 0.2), (9, 0), -std::f64::consts::FRAC_PI_4, &land);
        assert_eq!(x, 9.0);
        assert_eq!(y, 0.0);
        assert_eq!(cell, (9, 0));
    }
}

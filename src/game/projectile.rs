//! Projectiles - ballistic motion and termination rules
//!
//! Position is never integrated step by step. It is recomputed from the
//! origin and the ticks elapsed since launch, so two evaluations at the same
//! tick always agree.

use serde::Serialize;

use crate::util::time::Tick;

use super::physics::to_cell;
use super::terrain::TerrainGrid;
use super::GridPos;

/// Height a projectile flies above the terrain class it was launched from
pub const BULLET_HEIGHT: u8 = 2;

/// Render tag for projectiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProjectileKind {
    #[serde(rename = "bullet")]
    Bullet,
    #[serde(rename = "grenadeLit")]
    GrenadeLit,
}

impl ProjectileKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bullet => "bullet",
            Self::GrenadeLit => "grenadeLit",
        }
    }
}

/// Who a kill is attributed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shooter {
    Player { name: String, color: String },
    /// Chained projectiles with no player behind them
    Named(String),
}

impl Shooter {
    pub fn name(&self) -> &str {
        match self {
            Self::Player { name, .. } | Self::Named(name) => name,
        }
    }

    pub fn color(&self) -> Option<&str> {
        match self {
            Self::Player { color, .. } => Some(color),
            Self::Named(_) => None,
        }
    }
}

/// Effect triggered where a projectile stops
#[derive(Debug, Clone, PartialEq)]
pub enum Burst {
    /// Ring of bullets evenly spaced around a full circle
    Shrapnel {
        count: usize,
        speed: f64,
        range: f64,
        source: &'static str,
    },
}

impl Burst {
    /// Projectiles released at `at`
    pub fn release(&self, at: GridPos, now: Tick) -> Vec<Projectile> {
        match self {
            Self::Shrapnel {
                count,
                speed,
                range,
                source,
            } => {
                let step = std::f64::consts::TAU / *count as f64;
                (0..*count)
                    .map(|i| {
                        Projectile::new(
                            ProjectileKind::Bullet,
                            at,
                            step * i as f64,
                            *speed,
                            *range,
                            now,
                            Shooter::Named(source.to_string()),
                        )
                    })
                    .collect()
            }
        }
    }
}

/// Why a projectile left the live set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Range,
    Edge,
    Terrain,
}

/// Active projectile in the game
#[derive(Debug, Clone)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub origin: GridPos,
    pub direction: f64,
    pub speed: f64,
    pub range: f64,
    pub start_tick: Tick,
    /// Whether tall terrain stops this projectile
    pub terrain_interaction: bool,
    pub shooter: Shooter,
    pub on_terminate: Option<Burst>,
}

impl Projectile {
    /// Create a new projectile that collides with terrain and has no burst
    pub fn new(
        kind: ProjectileKind,
        origin: GridPos,
        direction: f64,
        speed: f64,
        range: f64,
        start_tick: Tick,
        shooter: Shooter,
    ) -> Self {
        Self {
            kind,
            origin,
            direction,
            speed,
            range,
            start_tick,
            terrain_interaction: true,
            shooter,
            on_terminate: None,
        }
    }

    pub fn ignoring_terrain(mut self) -> Self {
        self.terrain_interaction = false;
        self
    }

    pub fn with_burst(mut self, burst: Burst) -> Self {
        self.on_terminate = Some(burst);
        self
    }

    /// Distance traveled by tick `now`
    pub fn distance(&self, now: Tick) -> f64 {
        now.saturating_sub(self.start_tick) as f64 * self.speed
    }

    /// Cell occupied at tick `now`
    pub fn position(&self, now: Tick) -> GridPos {
        let dist = self.distance(now);
        (
            to_cell(self.origin.0 as f64 + self.direction.cos() * dist),
            to_cell(self.origin.1 as f64 + self.direction.sin() * dist),
        )
    }

    /// First termination condition met at `pos`, if any
    pub fn termination(&self, now: Tick, pos: GridPos, terrain: &TerrainGrid) -> Option<Termination> {
        if self.distance(now) >= self.range {
            return Some(Termination::Range);
        }

        let Some(class) = terrain.class_at(pos.0, pos.1) else {
            return Some(Termination::Edge);
        };

        if self.terrain_interaction {
            let launch = terrain.class_at_clamped(self.origin.0, self.origin.1);
            if class > launch + BULLET_HEIGHT - 1 {
                return Some(Termination::Terrain);
            }
        }

        None
    }

    /// Whether the player called `name` fired this projectile
    pub fn fired_by(&self, name: &str) -> bool {
        matches!(&self.shooter, Shooter::Player { name: shooter, .. } if shooter == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, TAU};

    fn bullet(origin: GridPos, direction: f64, speed: f64, range: f64) -> Projectile {
        Projectile::new(
            ProjectileKind::Bullet,
            origin,
            direction,
            speed,
            range,
            100,
            Shooter::Named("test".to_string()),
        )
    }

    #[test]
    fn position_is_a_pure_function_of_elapsed_ticks() {
        let p = bullet((10, 10), 0.3, 1.5, 100.0);
        for t in [100, 101, 105, 120] {
            let dist = (t - 100) as f64 * 1.5;
            let expected = (
                to_cell(10.0 + 0.3_f64.cos() * dist),
                to_cell(10.0 + 0.3_f64.sin() * dist),
            );
            assert_eq!(p.position(t), expected);
            assert_eq!(p.position(t), p.position(t));
        }
        assert_eq!(p.position(100), (10, 10));
    }

    #[test]
    fn terminates_on_the_tick_range_is_reached() {
        let terrain = TerrainGrid::uniform(100, 2);
        let p = bullet((10, 50), 0.0, 2.0, 10.0);
        assert_eq!(p.termination(104, p.position(104), &terrain), None);
        assert_eq!(
            p.termination(105, p.position(105), &terrain),
            Some(Termination::Range)
        );
    }

    #[test]
    fn terminates_at_map_edge() {
        let terrain = TerrainGrid::uniform(20, 2);
        let p = bullet((18, 5), 0.0, 1.0, 50.0);
        assert_eq!(p.termination(101, p.position(101), &terrain), None);
        assert_eq!(
            p.termination(102, p.position(102), &terrain),
            Some(Termination::Edge)
        );
    }

    #[test]
    fn flies_over_one_step_but_hits_two() {
        let mut terrain = TerrainGrid::uniform(20, 2);
        terrain.set(6, 5, 3);
        terrain.set(7, 5, 4);
        let p = bullet((5, 5), 0.0, 1.0, 50.0);
        assert_eq!(p.termination(101, (6, 5), &terrain), None);
        assert_eq!(
            p.termination(102, (7, 5), &terrain),
            Some(Termination::Terrain)
        );

        let lobbed = bullet((5, 5), 0.0, 1.0, 50.0).ignoring_terrain();
        assert_eq!(lobbed.termination(102, (7, 5), &terrain), None);
    }

    #[test]
    fn shrapnel_ring_is_evenly_spaced() {
        let burst = Burst::Shrapnel {
            count: 30,
            speed: 1.0,
            range: 6.0,
            source: "grenade",
        };
        let shards = burst.release((40, 40), 200);
        assert_eq!(shards.len(), 30);
        for (i, shard) in shards.iter().enumerate() {
            assert!((shard.direction - TAU / 30.0 * i as f64).abs() < 1e-12);
            assert_eq!(shard.origin, (40, 40));
            assert_eq!(shard.start_tick, 200);
            assert_eq!(shard.kind, ProjectileKind::Bullet);
            assert_eq!(shard.shooter, Shooter::Named("grenade".to_string()));
            assert!(shard.terrain_interaction);
        }
    }

    #[test]
    fn shooter_identity() {
        let mut p = bullet((0, 0), FRAC_PI_2, 1.0, 1.0);
        assert!(!p.fired_by("test"));
        p.shooter = Shooter::Player {
            name: "red".to_string(),
            color: "#e50000".to_string(),
        };
        assert!(p.fired_by("red"));
        assert!(!p.fired_by("blue"));
        assert_eq!(p.shooter.color(), Some("#e50000"));
    }
}

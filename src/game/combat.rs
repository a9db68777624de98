//! Combat system - item catalog, weapon state machine, shoot patterns

use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::util::time::Tick;

use super::projectile::{Burst, Projectile, ProjectileKind, Shooter};
use super::GridPos;

/// Every kind of item that can lie on the map or sit in a hotbar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Assault rifle
    Ar,
    Pistol,
    Shotgun,
    /// Submachine gun
    Smg,
    Minigun,
    Grenade,
    /// Absorbs one killing hit
    Shield,
}

impl ItemKind {
    pub const ALL: [ItemKind; 7] = [
        Self::Ar,
        Self::Pistol,
        Self::Shotgun,
        Self::Smg,
        Self::Minigun,
        Self::Grenade,
        Self::Shield,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ar => "ar",
            Self::Pistol => "pistol",
            Self::Shotgun => "shotgun",
            Self::Smg => "smg",
            Self::Minigun => "minigun",
            Self::Grenade => "grenade",
            Self::Shield => "shield",
        }
    }

    /// Uniformly random kind
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn stats(&self) -> ItemStats {
        ItemStats::for_kind(*self)
    }
}

/// How an item turns one use into projectiles
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShootPattern {
    /// One projectile along the holder's facing
    Single,
    /// One projectile per angular offset
    Spread(&'static [f64]),
    /// One projectile with uniform random jitter in `±amplitude`
    Jitter(f64),
    /// A lit grenade that bursts into shrapnel where it lands
    Grenade {
        shards: usize,
        shard_speed: f64,
        shard_range: f64,
    },
}

const SHOTGUN_SPREAD: [f64; 3] = [-0.1, 0.0, 0.1];

/// Per-kind numeric parameters
#[derive(Debug, Clone, Copy)]
pub struct ItemStats {
    /// Max ammo; `None` for items without a magazine
    pub capacity: Option<u32>,
    /// Ticks that must pass between shots
    pub cooldown: Option<Tick>,
    /// Ticks a reload takes; `None` means the item never reloads
    pub reload: Option<Tick>,
    pub projectile_speed: f64,
    pub projectile_range: f64,
    /// Destroyed after the first use
    pub single_use: bool,
    pub pattern: Option<ShootPattern>,
}

impl ItemStats {
    pub fn for_kind(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Ar => Self {
                capacity: Some(20),
                cooldown: Some(2),
                reload: Some(12),
                projectile_speed: 1.5,
                projectile_range: 100.0,
                single_use: false,
                pattern: Some(ShootPattern::Single),
            },
            ItemKind::Pistol => Self {
                capacity: Some(10),
                cooldown: Some(3),
                reload: Some(6),
                projectile_speed: 1.5,
                projectile_range: 50.0,
                single_use: false,
                pattern: Some(ShootPattern::Single),
            },
            ItemKind::Shotgun => Self {
                capacity: Some(1),
                cooldown: None,
                reload: Some(5),
                projectile_speed: 1.2,
                projectile_range: 20.0,
                single_use: false,
                pattern: Some(ShootPattern::Spread(&SHOTGUN_SPREAD)),
            },
            ItemKind::Smg => Self {
                capacity: Some(40),
                cooldown: Some(1),
                reload: Some(15),
                projectile_speed: 2.0,
                projectile_range: 30.0,
                single_use: false,
                pattern: Some(ShootPattern::Single),
            },
            ItemKind::Minigun => Self {
                capacity: Some(100),
                cooldown: None,
                reload: Some(30),
                projectile_speed: 2.5,
                projectile_range: 30.0,
                single_use: false,
                pattern: Some(ShootPattern::Jitter(0.15)),
            },
            ItemKind::Grenade => Self {
                capacity: None,
                cooldown: None,
                reload: None,
                projectile_speed: 1.0,
                projectile_range: 15.0,
                single_use: true,
                pattern: Some(ShootPattern::Grenade {
                    shards: 30,
                    shard_speed: 1.0,
                    shard_range: 6.0,
                }),
            },
            ItemKind::Shield => Self {
                capacity: None,
                cooldown: None,
                reload: None,
                projectile_speed: 0.0,
                projectile_range: 0.0,
                single_use: false,
                pattern: None,
            },
        }
    }
}

/// Render status of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Loaded,
    /// Only on the tick a shot was fired
    Firing,
    Unloaded,
    Reloading,
}

/// Result of pulling the trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Nothing fired
    Idle,
    Fired,
    /// Fired and the item is used up
    Spent,
}

/// Back-reference from an item to the slot holding it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub player: String,
    pub slot: usize,
}

/// An item in the shared pool
#[derive(Debug, Clone)]
pub struct Item {
    pub id: Uuid,
    pub kind: ItemKind,
    pub pos: GridPos,
    pub owner: Option<Owner>,
    ammo: Option<u32>,
    reloaded: bool,
    reload_started: Tick,
    last_used: Option<Tick>,
}

impl Item {
    pub fn new(kind: ItemKind, pos: GridPos) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            pos,
            owner: None,
            ammo: kind.stats().capacity,
            reloaded: true,
            reload_started: 0,
            last_used: None,
        }
    }

    pub fn stats(&self) -> ItemStats {
        self.kind.stats()
    }

    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }

    fn reload_finished(&self, now: Tick) -> bool {
        match self.stats().reload {
            Some(duration) => now.saturating_sub(self.reload_started) >= duration,
            None => true,
        }
    }

    /// Whether the reload window is still open at `now`
    pub fn is_reloading(&self, now: Tick) -> bool {
        !self.reloaded && !self.reload_finished(now)
    }

    /// Ammo as seen at `now`, counting a reload that has just expired
    pub fn ammo(&self, now: Tick) -> Option<u32> {
        if !self.reloaded && self.reload_finished(now) {
            self.stats().capacity
        } else {
            self.ammo
        }
    }

    /// Close an expired reload window
    fn settle(&mut self, now: Tick) {
        if !self.reloaded && self.reload_finished(now) {
            self.ammo = self.stats().capacity;
            self.reloaded = true;
        }
    }

    pub fn status(&self, now: Tick) -> ItemStatus {
        if self.last_used == Some(now) {
            ItemStatus::Firing
        } else if self.is_reloading(now) {
            ItemStatus::Reloading
        } else if self.ammo(now) == Some(0) {
            ItemStatus::Unloaded
        } else {
            ItemStatus::Loaded
        }
    }

    /// Try to use the item. The caller spawns projectiles for `Fired` and
    /// `Spent`, and destroys the item on `Spent`.
    pub fn trigger(&mut self, now: Tick) -> Trigger {
        let stats = self.stats();
        if stats.pattern.is_none() {
            return Trigger::Idle;
        }

        if stats.single_use {
            self.last_used = Some(now);
            return Trigger::Spent;
        }

        self.settle(now);
        if !self.reloaded || self.ammo.unwrap_or(0) == 0 {
            return Trigger::Idle;
        }

        let cooled = match (stats.cooldown, self.last_used) {
            (Some(cooldown), Some(last)) => now.saturating_sub(last) > cooldown,
            _ => true,
        };
        if !cooled {
            return Trigger::Idle;
        }

        self.ammo = self.ammo.map(|a| a - 1);
        self.last_used = Some(now);
        Trigger::Fired
    }

    /// Start the reload window regardless of remaining ammo
    pub fn reload(&mut self, now: Tick) {
        if self.stats().reload.is_some() {
            self.settle(now);
            self.reload_started = now;
            self.reloaded = false;
        }
    }
}

/// Combat system for turning item uses into projectiles
pub struct CombatSystem;

impl CombatSystem {
    /// Projectiles produced by one use of `kind` fired from `origin`
    pub fn shoot<R: Rng + ?Sized>(
        kind: ItemKind,
        origin: GridPos,
        direction: f64,
        shooter: &Shooter,
        now: Tick,
        rng: &mut R,
    ) -> Vec<Projectile> {
        let stats = kind.stats();
        let bullet = |dir: f64| {
            Projectile::new(
                ProjectileKind::Bullet,
                origin,
                dir,
                stats.projectile_speed,
                stats.projectile_range,
                now,
                shooter.clone(),
            )
        };

        match stats.pattern {
            None => Vec::new(),
            Some(ShootPattern::Single) => vec![bullet(direction)],
            Some(ShootPattern::Spread(offsets)) => {
                offsets.iter().map(|offset| bullet(direction + offset)).collect()
            }
            Some(ShootPattern::Jitter(amplitude)) => {
                vec![bullet(direction + rng.gen_range(-amplitude..=amplitude))]
            }
            Some(ShootPattern::Grenade {
                shards,
                shard_speed,
                shard_range,
            }) => {
                let grenade = Projectile::new(
                    ProjectileKind::GrenadeLit,
                    origin,
                    direction,
                    stats.projectile_speed,
                    stats.projectile_range,
                    now,
                    shooter.clone(),
                )
                .ignoring_terrain()
                .with_burst(Burst::Shrapnel {
                    count: shards,
                    speed: shard_speed,
                    range: shard_range,
                    source: kind.name(),
                });
                vec![grenade]
            }
        }
    }
}

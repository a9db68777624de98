//! World state and player lifecycle
//!
//! `World` is the single owner of every player, item and projectile. Callers
//! share it behind one mutex (see `scheduler`), so every method here runs with
//! exclusive access and no method needs to be re-entrant.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::util::time::{Tick, TickClock};

use super::combat::{CombatSystem, Item, ItemKind, Owner, Trigger};
use super::events::{KillCause, WorldEvent};
use super::identity::{Identity, IdentityCatalog};
use super::physics::PhysicsSystem;
use super::player::{Player, HOTBAR_SIZE};
use super::projectile::{Projectile, Shooter};
use super::snapshot::{Snapshot, SnapshotBuilder};
use super::terrain::TerrainGrid;
use super::{chebyshev, Action, GridPos, Intent};

/// Tunables the world needs at runtime
#[derive(Debug, Clone)]
pub struct WorldSettings {
    /// Pool items kept per registered player
    pub items_per_player: usize,
    /// Inactivity window in ticks
    pub player_timeout_ticks: Tick,
    /// Snapshot view radius; negative disables bounding
    pub view_radius: i32,
}

impl WorldSettings {
    pub fn from_config(config: &Config, clock: &TickClock) -> Self {
        Self {
            items_per_player: config.items_per_player,
            player_timeout_ticks: clock.ticks_in(config.player_timeout_ms),
            view_radius: config.view_radius,
        }
    }
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            items_per_player: 20,
            player_timeout_ticks: 100,
            view_radius: 27,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JoinError {
    #[error("No unused player identity is available")]
    CatalogExhausted,
}

/// What a non-forced kill ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillOutcome {
    /// A shield was consumed and the player lives
    Absorbed,
    Killed,
}

/// The authoritative world
pub struct World {
    settings: WorldSettings,
    terrain: Arc<TerrainGrid>,
    catalog: Arc<IdentityCatalog>,
    players: BTreeMap<String, Player>,
    items: Vec<Item>,
    projectiles: Vec<Projectile>,
    rng: ChaCha8Rng,
    events: Vec<WorldEvent>,
}

impl World {
    pub fn new(
        terrain: Arc<TerrainGrid>,
        catalog: Arc<IdentityCatalog>,
        settings: WorldSettings,
        seed: u64,
    ) -> Self {
        Self {
            settings,
            terrain,
            catalog,
            players: BTreeMap::new(),
            items: Vec::new(),
            projectiles: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.get(name)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: Uuid) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Take every event raised since the last drain
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Register a new player and grow the item pool to match
    pub fn join(&mut self, now: Tick) -> Result<Identity, JoinError> {
        let players = &self.players;
        let identity = self
            .catalog
            .allocate(&mut self.rng, |name| players.contains_key(name))
            .ok_or(JoinError::CatalogExhausted)?;

        let pos = self.random_pos();
        self.players.insert(
            identity.name.clone(),
            Player::new(identity.clone(), pos, now),
        );
        self.top_up_items();

        self.events.push(WorldEvent::Joined {
            name: identity.name.clone(),
            color: identity.color.clone(),
        });
        Ok(identity)
    }

    /// Kill a player. Shots are absorbed by the first shield in the hotbar;
    /// forced kills (timeout, leaving) are not.
    pub fn kill(&mut self, name: &str, cause: KillCause) -> Option<KillOutcome> {
        let player = self.players.get(name)?;

        if !cause.is_forced() {
            let shield = player.held_items().map(|(_, id)| id).find(|id| {
                self.item(*id)
                    .is_some_and(|item| item.kind == ItemKind::Shield)
            });

            if let Some(shield_id) = shield {
                self.destroy_item(shield_id);
                let attacker = match &cause {
                    KillCause::Shot { killer, .. } => killer.clone(),
                    _ => String::new(),
                };
                self.events.push(WorldEvent::ShieldAbsorbed {
                    name: name.to_string(),
                    attacker,
                });
                return Some(KillOutcome::Absorbed);
            }
        }

        let player = self.players.remove(name)?;
        for (_, id) in player.held_items() {
            if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
                item.owner = None;
            }
        }
        self.shrink_pool(self.settings.items_per_player);

        self.events.push(WorldEvent::Killed {
            name: player.name,
            color: player.color,
            cause,
        });
        Some(KillOutcome::Killed)
    }

    /// Remove a player at their own request
    pub fn leave(&mut self, name: &str) -> bool {
        self.kill(name, KillCause::Left).is_some()
    }

    /// Force-kill every player silent for longer than the timeout window.
    /// Returns the number removed.
    pub fn sweep_timeouts(&mut self, now: Tick) -> usize {
        let timeout = self.settings.player_timeout_ticks;
        let stale: Vec<String> = self
            .players
            .values()
            .filter(|player| player.is_timed_out(now, timeout))
            .map(|player| player.name.clone())
            .collect();

        for name in &stale {
            self.kill(name, KillCause::Timeout);
        }
        stale.len()
    }

    // ------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------

    /// Apply one player's intent. Returns `false` if the player is not alive.
    /// The intent only takes effect once per tick per player.
    pub fn apply_intent(&mut self, intent: &Intent, now: Tick) -> bool {
        let Some(player) = self.players.get_mut(&intent.name) else {
            return false;
        };

        let fresh = now > player.last_active;
        player.last_active = player.last_active.max(now);
        if !fresh {
            return true;
        }

        if let Some(direction) = intent.direction {
            player.direction = direction;
        }

        let name = intent.name.as_str();
        if intent.holds(Action::Move) {
            self.move_player(name);
        }

        if intent.holds(Action::Pickup) {
            self.pickup(name);
            return true;
        }

        for slot in (0..HOTBAR_SIZE).filter(|slot| intent.active_slots[*slot]) {
            if intent.holds(Action::Drop) {
                self.drop_item(name, slot);
            } else if intent.holds(Action::Reload) {
                self.reload_slot(name, slot, now);
            } else {
                self.use_slot(name, slot, now);
            }
        }
        true
    }

    fn move_player(&mut self, name: &str) {
        let Some(player) = self.players.get_mut(name) else {
            return;
        };
        let (exact, pos) =
            PhysicsSystem::step(player.exact, player.pos, player.direction, &self.terrain);
        player.exact = exact;
        player.pos = pos;
        self.sync_hotbar(name);
    }

    /// Mount every unowned item within one cell, lowest free slot first
    pub fn pickup(&mut self, name: &str) -> usize {
        let Some(player) = self.players.get_mut(name) else {
            return 0;
        };

        let mut taken = 0;
        let center = player.pos;
        for item in self
            .items
            .iter_mut()
            .filter(|item| !item.is_owned() && chebyshev(item.pos, center) <= 1)
        {
            let Some(slot) = player.free_slot() else {
                break;
            };
            player.hotbar[slot] = Some(item.id);
            item.owner = Some(Owner {
                player: name.to_string(),
                slot,
            });
            taken += 1;
        }

        self.sync_hotbar(name);
        taken
    }

    /// Unmount the item in `slot`, leaving it where it is
    pub fn drop_item(&mut self, name: &str, slot: usize) -> bool {
        let Some(id) = self
            .players
            .get_mut(name)
            .and_then(|player| player.hotbar.get_mut(slot))
            .and_then(Option::take)
        else {
            return false;
        };

        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.owner = None;
        }
        true
    }

    fn reload_slot(&mut self, name: &str, slot: usize, now: Tick) {
        let Some(id) = self.players.get(name).and_then(|p| p.hotbar[slot]) else {
            return;
        };
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.reload(now);
        }
    }

    fn use_slot(&mut self, name: &str, slot: usize, now: Tick) {
        let Some(player) = self.players.get(name) else {
            return;
        };
        let Some(id) = player.hotbar[slot] else {
            return;
        };
        let shooter = Shooter::Player {
            name: player.name.clone(),
            color: player.color.clone(),
        };
        let direction = player.direction;

        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return;
        };
        let outcome = item.trigger(now);
        if outcome == Trigger::Idle {
            return;
        }

        let (kind, origin) = (item.kind, item.pos);
        let shots = CombatSystem::shoot(kind, origin, direction, &shooter, now, &mut self.rng);
        debug!(
            player = %name,
            item = kind.name(),
            projectiles = shots.len(),
            "Item used"
        );
        self.projectiles.extend(shots);

        if outcome == Trigger::Spent {
            self.destroy_item(id);
        }
    }

    // ------------------------------------------------------------------
    // Global step
    // ------------------------------------------------------------------

    /// Evaluate every live projectile once at tick `now`
    pub fn advance_projectiles(&mut self, now: Tick) {
        let live = std::mem::take(&mut self.projectiles);
        let mut kept = Vec::with_capacity(live.len());
        let mut released = Vec::new();

        for projectile in live {
            let pos = projectile.position(now);

            if let Some(reason) = projectile.termination(now, pos, &self.terrain) {
                trace!(
                    projectile = projectile.kind.name(),
                    ?reason,
                    x = pos.0,
                    y = pos.1,
                    "Projectile terminated"
                );
                if let Some(burst) = &projectile.on_terminate {
                    released.extend(burst.release(pos, now));
                }
                continue;
            }

            let victims: Vec<String> = self
                .players
                .values()
                .filter(|player| player.pos == pos && !projectile.fired_by(&player.name))
                .map(|player| player.name.clone())
                .collect();

            for victim in victims {
                self.kill(
                    &victim,
                    KillCause::Shot {
                        killer: projectile.shooter.name().to_string(),
                        killer_color: projectile.shooter.color().map(str::to_string),
                    },
                );
            }

            kept.push(projectile);
        }

        kept.extend(released);
        self.projectiles = kept;
    }

    pub fn snapshot(&self, name: &str, now: Tick) -> Option<Snapshot> {
        SnapshotBuilder::new(self.settings.view_radius).build(self, name, now)
    }

    // ------------------------------------------------------------------
    // Item pool
    // ------------------------------------------------------------------

    fn random_pos(&mut self) -> GridPos {
        let size = self.terrain.size() as i32;
        (self.rng.gen_range(0..size), self.rng.gen_range(0..size))
    }

    fn spawn_random_item(&mut self) {
        let kind = ItemKind::random(&mut self.rng);
        let pos = self.random_pos();
        self.items.push(Item::new(kind, pos));
    }

    fn top_up_items(&mut self) {
        let target = self.settings.items_per_player * self.players.len();
        while self.items.len() < target {
            self.spawn_random_item();
        }
    }

    /// Remove an item and replace it with a fresh random one
    fn destroy_item(&mut self, id: Uuid) {
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            return;
        };
        let item = self.items.remove(index);

        if let Some(owner) = item.owner {
            if let Some(player) = self.players.get_mut(&owner.player) {
                if player.hotbar[owner.slot] == Some(id) {
                    player.hotbar[owner.slot] = None;
                }
            }
        }
        self.spawn_random_item();
    }

    /// Remove up to `count` unowned items, sampled without replacement.
    /// Returns how many were removed.
    fn shrink_pool(&mut self, count: usize) -> usize {
        let unowned: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.is_owned())
            .map(|(index, _)| index)
            .collect();

        let amount = count.min(unowned.len());
        if amount < count {
            warn!(
                requested = count,
                available = unowned.len(),
                "Not enough unowned items to shrink the pool"
            );
        }

        let doomed: HashSet<Uuid> = sample(&mut self.rng, unowned.len(), amount)
            .into_iter()
            .map(|k| self.items[unowned[k]].id)
            .collect();
        self.items.retain(|item| !doomed.contains(&item.id));
        amount
    }

    /// Re-mount held items around their holder
    fn sync_hotbar(&mut self, name: &str) {
        let Some(player) = self.players.get(name) else {
            return;
        };
        for (slot, id) in player.held_items() {
            let mount = player.mount_position(slot);
            if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
                item.pos = mount;
            }
        }
    }
}

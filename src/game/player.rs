//! Player state

use uuid::Uuid;

use crate::util::time::Tick;

use super::identity::Identity;
use super::GridPos;

/// Number of weapon mounts on every player
pub const HOTBAR_SIZE: usize = 4;

/// Mount offsets relative to the player: up, right, down, left
pub const SLOT_OFFSETS: [GridPos; HOTBAR_SIZE] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Player state (authoritative)
#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub color: String,

    // Position and movement
    /// Continuous position, never leaves `[0, MAP_SIZE-1]`
    pub exact: (f64, f64),
    /// Rounded cell used for rendering, pickup and hits
    pub pos: GridPos,
    pub direction: f64,

    /// Item ids mounted in each slot
    pub hotbar: [Option<Uuid>; HOTBAR_SIZE],

    /// Last tick this player was heard from
    pub last_active: Tick,
}

impl Player {
    pub fn new(identity: Identity, pos: GridPos, now: Tick) -> Self {
        Self {
            name: identity.name,
            color: identity.color,
            exact: (pos.0 as f64, pos.1 as f64),
            pos,
            direction: 0.0,
            hotbar: [None; HOTBAR_SIZE],
            last_active: now,
        }
    }

    /// First empty slot in ascending order
    pub fn free_slot(&self) -> Option<usize> {
        self.hotbar.iter().position(Option::is_none)
    }

    /// Cell where the item in `slot` is mounted
    pub fn mount_position(&self, slot: usize) -> GridPos {
        let (dx, dy) = SLOT_OFFSETS[slot % HOTBAR_SIZE];
        (self.pos.0 + dx, self.pos.1 + dy)
    }

    pub fn held_items(&self) -> impl Iterator<Item = (usize, Uuid)> + '_ {
        self.hotbar
            .iter()
            .enumerate()
            .filter_map(|(slot, id)| id.map(|id| (slot, id)))
    }

    /// Whether no request has been seen for longer than `timeout` ticks
    pub fn is_timed_out(&self, now: Tick, timeout: Tick) -> bool {
        now.saturating_sub(self.last_active) > timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_at(pos: GridPos) -> Player {
        Player::new(
            Identity {
                name: "teal".to_string(),
                color: "#029386".to_string(),
            },
            pos,
            10,
        )
    }

    #[test]
    fn new_player_starts_on_its_cell() {
        let player = player_at((3, 4));
        assert_eq!(player.exact, (3.0, 4.0));
        assert_eq!(player.pos, (3, 4));
        assert!(player.hotbar.iter().all(Option::is_none));
        assert_eq!(player.last_active, 10);
    }

    #[test]
    fn mounts_surround_the_player() {
        let player = player_at((5, 5));
        assert_eq!(player.mount_position(0), (5, 4));
        assert_eq!(player.mount_position(1), (6, 5));
        assert_eq!(player.mount_position(2), (5, 6));
        assert_eq!(player.mount_position(3), (4, 5));
    }

    #[test]
    fn free_slot_is_lowest_empty() {
        let mut player = player_at((0, 0));
        assert_eq!(player.free_slot(), Some(0));
        player.hotbar[0] = Some(Uuid::new_v4());
        player.hotbar[2] = Some(Uuid::new_v4());
        assert_eq!(player.free_slot(), Some(1));
        player.hotbar[1] = Some(Uuid::new_v4());
        player.hotbar[3] = Some(Uuid::new_v4());
        assert_eq!(player.free_slot(), None);
    }

    #[test]
    fn timeout_is_strictly_greater() {
        let player = player_at((0, 0));
        assert!(!player.is_timed_out(110, 100));
        assert!(player.is_timed_out(111, 100));
        assert!(!player.is_timed_out(5, 100));
    }
}

//! Game simulation modules

pub mod combat;
pub mod events;
pub mod identity;
pub mod physics;
pub mod player;
pub mod projectile;
pub mod scheduler;
pub mod snapshot;
pub mod terrain;
pub mod world;

pub use scheduler::{FixedRateScheduler, SharedWorld, Stepper};
pub use world::{JoinError, World, WorldSettings};

use std::collections::HashSet;
use std::f64::consts::TAU;

use player::HOTBAR_SIZE;

/// Integer cell on the terrain grid, serialized as `[x, y]`
pub type GridPos = (i32, i32);

/// Chebyshev distance between two cells
pub fn chebyshev(a: GridPos, b: GridPos) -> i32 {
    (a.0 - b.0).abs().max((a.1 - b.1).abs())
}

/// Actions a client can hold down during a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Move,
    Pickup,
    Drop,
    Reload,
    Use,
}

impl Action {
    /// Parse a wire action name; unknown names yield `None`
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "move" => Some(Self::Move),
            "pickup" => Some(Self::Pickup),
            "drop" => Some(Self::Drop),
            "reload" => Some(Self::Reload),
            "use" => Some(Self::Use),
            _ => None,
        }
    }
}

/// One player's intent for a single request
#[derive(Debug, Clone)]
pub struct Intent {
    pub name: String,
    /// New facing in radians; `None` keeps the previous facing
    pub direction: Option<f64>,
    pub actions: HashSet<Action>,
    pub active_slots: [bool; HOTBAR_SIZE],
}

impl Intent {
    /// Build an intent from raw wire values, dropping anything unusable
    pub fn from_wire<S: AsRef<str>>(
        name: impl Into<String>,
        direction: Option<f64>,
        actions: &[S],
        active_slots: &[bool],
    ) -> Self {
        let mut slots = [false; HOTBAR_SIZE];
        for (slot, active) in slots.iter_mut().zip(active_slots) {
            *slot = *active;
        }

        Self {
            name: name.into(),
            direction: direction.filter(|d| d.is_finite() && d.abs() <= TAU),
            actions: actions
                .iter()
                .filter_map(|a| Action::parse(a.as_ref()))
                .collect(),
            active_slots: slots,
        }
    }

    pub fn holds(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_actions_are_dropped() {
        let intent = Intent::from_wire("red", Some(0.0), &["move", "use0", "dance", "pickup"], &[]);
        assert!(intent.holds(Action::Move));
        assert!(intent.holds(Action::Pickup));
        assert_eq!(intent.actions.len(), 2);
    }

    #[test]
    fn bad_directions_become_none() {
        let none: [&str; 0] = [];
        assert_eq!(Intent::from_wire("a", Some(f64::NAN), &none, &[]).direction, None);
        assert_eq!(Intent::from_wire("a", Some(f64::INFINITY), &none, &[]).direction, None);
        assert_eq!(Intent::from_wire("a", Some(100.0), &none, &[]).direction, None);
        assert_eq!(Intent::from_wire("a", None, &none, &[]).direction, None);
        assert_eq!(Intent::from_wire("a", Some(-1.5), &none, &[]).direction, Some(-1.5));
    }

    #[test]
    fn slot_mask_is_padded_and_truncated() {
        let none: [&str; 0] = [];
        let short = Intent::from_wire("a", None, &none, &[true]);
        assert_eq!(short.active_slots, [true, false, false, false]);

        let long = Intent::from_wire("a", None, &none, &[false, true, false, true, true, true]);
        assert_eq!(long.active_slots, [false, true, false, true]);
    }

    #[test]
    fn chebyshev_distance() {
        assert_eq!(chebyshev((0, 0), (1, 1)), 1);
        assert_eq!(chebyshev((0, 0), (-2, 1)), 2);
        assert_eq!(chebyshev((5, 5), (5, 5)), 0);
    }
}

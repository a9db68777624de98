//! Lifecycle notifications raised by the world

use tracing::info;

/// Why a player is being killed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillCause {
    /// Hit by a projectile
    Shot {
        killer: String,
        killer_color: Option<String>,
    },
    /// No request within the timeout window
    Timeout,
    /// Client asked to leave
    Left,
}

impl KillCause {
    /// Forced kills ignore shields
    pub fn is_forced(&self) -> bool {
        !matches!(self, Self::Shot { .. })
    }
}

/// Something players or operators should hear about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldEvent {
    Joined {
        name: String,
        color: String,
    },
    /// A shield took the hit instead of its holder
    ShieldAbsorbed {
        name: String,
        attacker: String,
    },
    Killed {
        name: String,
        color: String,
        cause: KillCause,
    },
}

impl WorldEvent {
    /// Emit this event to the log
    pub fn log(&self) {
        match self {
            Self::Joined { name, color } => {
                info!(player = %name, color = %color, "Player joined the server");
            }
            Self::ShieldAbsorbed { name, attacker } => {
                info!(player = %name, attacker = %attacker, "Shield absorbed a kill");
            }
            Self::Killed { name, color, cause } => match cause {
                KillCause::Shot {
                    killer,
                    killer_color,
                } => {
                    info!(
                        player = %name,
                        color = %color,
                        killer = %killer,
                        killer_color = killer_color.as_deref().unwrap_or("none"),
                        "{} killed {}", killer, name
                    );
                }
                KillCause::Timeout => {
                    info!(player = %name, color = %color, "{} disconnected (timeout)", name);
                }
                KillCause::Left => {
                    info!(player = %name, color = %color, "{} left the server", name);
                }
            },
        }
    }
}

/// Log and discard a batch of events
pub fn log_events(events: Vec<WorldEvent>) {
    for event in &events {
        event.log();
    }
}

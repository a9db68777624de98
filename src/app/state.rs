//! Application state shared across routes

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::Config;
use crate::game::identity::IdentityCatalog;
use crate::game::terrain::TerrainGrid;
use crate::game::{SharedWorld, World, WorldSettings};
use crate::util::rate_limit::JoinRateLimiter;
use crate::util::time::TickClock;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub clock: TickClock,
    pub terrain: Arc<TerrainGrid>,
    pub world: SharedWorld,
    pub join_limiter: JoinRateLimiter,
}

impl AppState {
    pub fn new(config: Config, catalog: IdentityCatalog) -> Self {
        let config = Arc::new(config);
        let clock = TickClock::new(config.tick_rate_ms);

        // Terrain is generated once and never changes
        let terrain = Arc::new(TerrainGrid::generate(config.map_size, config.map_seed));

        let world = World::new(
            terrain.clone(),
            Arc::new(catalog),
            WorldSettings::from_config(&config, &clock),
            config.map_seed,
        );

        let join_limiter = JoinRateLimiter::new(config.join_rate_limit);

        Self {
            config,
            clock,
            terrain,
            world: Arc::new(Mutex::new(world)),
            join_limiter,
        }
    }
}

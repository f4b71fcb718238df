//! Fluent builder for constructing a [`World`].

use std::sync::Arc;

use rg_core::SimConfig;
use rg_network::{AStarRouter, Router, TrackNetwork};

use crate::{SimResult, World};

/// Fluent builder for [`World`].
///
/// # Required inputs
///
/// - [`SimConfig`] — tick duration, safety buffer, router penalty, …
/// - [`TrackNetwork`] — from [`rg_network::TrackNetworkBuilder`]
///
/// # Optional inputs (have defaults)
///
/// | Method        | Default                                          |
/// |---------------|--------------------------------------------------|
/// | `.router(r)`  | `AStarRouter::new(config.occupied_penalty)`      |
///
/// # Example
///
/// ```rust,ignore
/// let world = SimBuilder::new(config, network)
///     .router(AStarRouter::new(5_000))
///     .build()?;
/// ```
pub struct SimBuilder {
    config:  SimConfig,
    network: TrackNetwork,
    router:  Option<Arc<dyn Router>>,
}

impl SimBuilder {
    pub fn new(config: SimConfig, network: TrackNetwork) -> Self {
        Self { config, network, router: None }
    }

    /// Replace the default A* router.
    pub fn router<R: Router + 'static>(mut self, router: R) -> Self {
        self.router = Some(Arc::new(router));
        self
    }

    /// Validate the configuration and return an empty [`World`] at tick 0.
    pub fn build(self) -> SimResult<World> {
        self.config.validate()?;
        let router = self
            .router
            .unwrap_or_else(|| Arc::new(AStarRouter::new(self.config.occupied_penalty)));
        Ok(World::new(self.config, self.network, router))
    }
}

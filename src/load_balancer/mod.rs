//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher attempt
//!     → registry.rs (point-in-time snapshot)
//!     → Selector (narrow to an eligible candidate tier)
//!     → Apply load balancing algorithm:
//!         - random.rs (uniform pick)
//!         - round_robin.rs (rotate through candidates)
//!     → Return chosen backend
//! ```
//!
//! # Candidate tiers (health-aware mode)
//! 1. healthy, not tried by this request
//! 2. healthy
//! 3. any, not tried by this request (degraded: nothing healthy)
//! 4. any
//!
//! Health-unaware mode skips the first two tiers.

pub mod backend;
pub mod random;
pub mod registry;
pub mod round_robin;

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use self::backend::Backend;
use self::random::UniformRandom;
use self::registry::RegistrySnapshot;
use self::round_robin::RoundRobin;

/// A strategy that picks one backend out of a non-empty candidate list.
pub trait LoadBalancer: Send + Sync + Debug {
    fn next_server(&self, candidates: &[Backend]) -> Option<Backend>;
}

/// Configured load balancing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Random,
    RoundRobin,
}

impl Strategy {
    pub fn build(self) -> Box<dyn LoadBalancer> {
        match self {
            Strategy::Random => Box::new(UniformRandom::new()),
            Strategy::RoundRobin => Box::new(RoundRobin::new()),
        }
    }
}

/// Two-phase backend selection over a registry snapshot.
#[derive(Debug)]
pub struct Selector {
    balancer: Box<dyn LoadBalancer>,
    health_aware: bool,
}

impl Selector {
    pub fn new(balancer: Box<dyn LoadBalancer>, health_aware: bool) -> Self {
        Self {
            balancer,
            health_aware,
        }
    }

    /// Pick a backend, skipping ones in `tried` while alternatives exist.
    ///
    /// Returns `None` only for an empty snapshot.
    pub fn select(&self, snapshot: &RegistrySnapshot, tried: &[Backend]) -> Option<Backend> {
        let untried = |b: &&Backend| !tried.contains(*b);

        if self.health_aware {
            let healthy: Vec<Backend> = snapshot.healthy().cloned().collect();
            if !healthy.is_empty() {
                let fresh: Vec<Backend> = healthy.iter().filter(untried).cloned().collect();
                return self.pick(if fresh.is_empty() { &healthy } else { &fresh });
            }
            tracing::debug!(
                backends = snapshot.len(),
                "No healthy backends, falling back to the full set"
            );
        }

        let all: Vec<Backend> = snapshot.backends().cloned().collect();
        let fresh: Vec<Backend> = all.iter().filter(untried).cloned().collect();
        self.pick(if fresh.is_empty() { &all } else { &fresh })
    }

    fn pick(&self, candidates: &[Backend]) -> Option<Backend> {
        if candidates.is_empty() {
            return None;
        }
        self.balancer.next_server(candidates)
    }
}

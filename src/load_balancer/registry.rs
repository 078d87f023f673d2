//! Backend health registry.
//!
//! # Responsibilities
//! - Own the fixed, ordered set of configured backends
//! - Hold the current health state of each one
//! - Hand out independent point-in-time snapshots
//!
//! Every access takes a single mutex for the duration of the map read or
//! write only. No I/O ever happens while it is held.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::ConfigError;
use crate::health::state::HealthState;
use crate::load_balancer::backend::Backend;

/// Synchronized owner of the `Backend -> HealthState` mapping.
///
/// The key set is fixed at registration; entries are only overwritten.
#[derive(Debug)]
pub struct BackendRegistry {
    entries: Mutex<Vec<(Backend, HealthState)>>,
}

impl BackendRegistry {
    /// Register the configured backends, in order.
    ///
    /// Every entry starts as [`HealthState::Unknown`].
    pub fn register<I, S>(addresses: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: Vec<(Backend, HealthState)> = Vec::new();
        for address in addresses {
            let backend = Backend::parse(address.as_ref())?;
            if entries.iter().any(|(b, _)| *b == backend) {
                return Err(ConfigError::DuplicateBackend(backend.to_string()));
            }
            entries.push((backend, HealthState::Unknown));
        }

        Ok(Self {
            entries: Mutex::new(entries),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(Backend, HealthState)>> {
        // Writers never leave a half-updated entry, so a poisoned lock is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, backend: &Backend, state: HealthState) -> Option<HealthState> {
        let mut entries = self.lock();
        let entry = entries.iter_mut().find(|(b, _)| b == backend)?;
        Some(std::mem::replace(&mut entry.1, state))
    }

    /// Mark a backend healthy. Returns the previous state, or `None` if the
    /// backend is not registered (a no-op).
    pub fn mark_healthy(&self, backend: &Backend) -> Option<HealthState> {
        self.set(backend, HealthState::Healthy)
    }

    /// Mark a backend unhealthy. Returns the previous state, or `None` if the
    /// backend is not registered (a no-op).
    pub fn mark_unhealthy(&self, backend: &Backend) -> Option<HealthState> {
        self.set(backend, HealthState::Unhealthy)
    }

    pub fn state(&self, backend: &Backend) -> Option<HealthState> {
        self.lock()
            .iter()
            .find(|(b, _)| b == backend)
            .map(|(_, state)| *state)
    }

    /// Copy of the whole mapping, taken under one lock acquisition.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            entries: self.lock().clone(),
        }
    }

    /// Unhealthy backends in registration order.
    pub fn unhealthy_addresses(&self) -> Vec<Backend> {
        self.snapshot().unhealthy().cloned().collect()
    }

    /// All registered backends in registration order.
    pub fn backends(&self) -> Vec<Backend> {
        self.lock().iter().map(|(b, _)| b.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Independent, ordered copy of the registry at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySnapshot {
    entries: Vec<(Backend, HealthState)>,
}

impl RegistrySnapshot {
    pub fn iter(&self) -> impl Iterator<Item = (&Backend, HealthState)> {
        self.entries.iter().map(|(b, s)| (b, *s))
    }

    pub fn get(&self, backend: &Backend) -> Option<HealthState> {
        self.iter().find(|(b, _)| *b == backend).map(|(_, s)| s)
    }

    pub fn backends(&self) -> impl Iterator<Item = &Backend> {
        self.entries.iter().map(|(b, _)| b)
    }

    /// Backends that are eligible under health-aware selection.
    pub fn healthy(&self) -> impl Iterator<Item = &Backend> {
        self.entries
            .iter()
            .filter(|(_, s)| s.is_healthy())
            .map(|(b, _)| b)
    }

    pub fn unhealthy(&self) -> impl Iterator<Item = &Backend> {
        self.entries
            .iter()
            .filter(|(_, s)| !s.is_healthy())
            .map(|(b, _)| b)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

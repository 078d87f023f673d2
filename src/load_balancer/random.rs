//! Uniform random load balancing strategy.

use std::sync::Mutex;

use crate::load_balancer::{backend::Backend, LoadBalancer};

/// Picks uniformly among the candidates.
#[derive(Debug)]
pub struct UniformRandom {
    rng: Mutex<fastrand::Rng>,
}

impl UniformRandom {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Deterministic sequence, for tests and reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }
}

impl Default for UniformRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadBalancer for UniformRandom {
    fn next_server(&self, candidates: &[Backend]) -> Option<Backend> {
        if candidates.is_empty() {
            return None;
        }
        let index = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .usize(..candidates.len());
        candidates.get(index).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_covers_every_candidate() {
        let lb = UniformRandom::with_seed(3);
        let backends: Vec<Backend> = (0..3)
            .map(|i| Backend::parse(&format!("http://127.0.0.1:{}", 8080 + i)).unwrap())
            .collect();

        let mut hits = [0usize; 3];
        for _ in 0..3_000 {
            let picked = lb.next_server(&backends).unwrap();
            let index = backends.iter().position(|b| *b == picked).unwrap();
            hits[index] += 1;
        }
        assert!(hits.iter().all(|&h| h > 800), "skewed distribution: {hits:?}");
    }

    #[test]
    fn test_random_empty() {
        assert!(UniformRandom::new().next_server(&[]).is_none());
    }
}

//! Host pool management.
//!
//! # Responsibilities
//! - Hold the fixed, non-empty set of interchangeable hosts for one service
//! - Randomize the stored order once at construction
//! - Produce an independent uniform permutation for every call

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{DispatchError, DispatchResult};
use crate::pool::host::Host;
use crate::pool::order::HostOrder;

/// Non-empty set of candidate hosts owned by one dispatcher.
#[derive(Debug, Clone)]
pub struct HostPool {
    head: Host,
    tail: Vec<Host>,
}

impl HostPool {
    /// Build a pool from already parsed hosts.
    ///
    /// Fails with `Configuration` when `hosts` is empty.
    pub fn new<I>(hosts: I) -> DispatchResult<Self>
    where
        I: IntoIterator<Item = Host>,
    {
        let mut hosts: Vec<Host> = hosts.into_iter().collect();
        // Randomize the usage order so repeated instantiation does not favour hosts[0]
        hosts.shuffle(&mut rand::thread_rng());

        let mut hosts = hosts.into_iter();
        let head = hosts
            .next()
            .ok_or_else(|| DispatchError::Configuration("host pool is empty".to_string()))?;
        Ok(Self {
            head,
            tail: hosts.collect(),
        })
    }

    /// Parse and build a pool from raw base URLs.
    pub fn parse<I, S>(raw: I) -> DispatchResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hosts = raw
            .into_iter()
            .map(|h| Host::parse(h.as_ref()))
            .collect::<DispatchResult<Vec<_>>>()?;
        Self::new(hosts)
    }

    /// Pool with exactly one host.
    pub fn single(host: Host) -> Self {
        Self {
            head: host,
            tail: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tail.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Hosts in their construction-time order.
    pub fn hosts(&self) -> impl Iterator<Item = &Host> {
        std::iter::once(&self.head).chain(self.tail.iter())
    }

    /// A fresh uniformly shuffled order for one call.
    pub fn shuffled(&self) -> HostOrder {
        self.shuffled_with(&mut rand::thread_rng())
    }

    /// Fisher–Yates: pick the final slot uniformly, then shuffle the rest.
    pub fn shuffled_with<R: Rng>(&self, rng: &mut R) -> HostOrder {
        let mut leading = self.tail.clone();
        let mut last = self.head.clone();

        let slot = rng.gen_range(0..self.len());
        if slot < leading.len() {
            std::mem::swap(&mut last, &mut leading[slot]);
        }
        leading.shuffle(rng);

        HostOrder::new(leading, last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn hosts(n: usize) -> Vec<Host> {
        (0..n)
            .map(|i| Host::parse(&format!("http://10.0.0.{}:8080", i + 1)).unwrap())
            .collect()
    }

    #[test]
    fn test_empty_pool_is_configuration_error() {
        let err = HostPool::new(Vec::new()).unwrap_err();
        assert!(matches!(err, DispatchError::Configuration(_)));

        let err = HostPool::parse(Vec::<String>::new()).unwrap_err();
        assert!(err.to_string().contains("host pool is empty"));
    }

    #[test]
    fn test_parse_rejects_bad_entry() {
        assert!(HostPool::parse(["http://ok.internal", "nope"]).is_err());
    }

    #[test]
    fn test_shuffled_is_permutation() {
        let pool = HostPool::new(hosts(5)).unwrap();
        for _ in 0..50 {
            let order = pool.shuffled();
            assert_eq!(order.len(), 5);
            let mut seen: Vec<String> = order.iter().map(|h| h.to_string()).collect();
            let mut all: Vec<String> = pool.hosts().map(|h| h.to_string()).collect();
            seen.sort();
            all.sort();
            assert_eq!(seen, all);
        }
    }

    #[test]
    fn test_single_host_order() {
        let pool = HostPool::single(hosts(1).remove(0));
        let order = pool.shuffled();
        assert_eq!(order.len(), 1);
        assert_eq!(order.last().url().as_str(), "http://10.0.0.1:8080/");
    }

    #[test]
    fn test_two_host_order_is_balanced() {
        let pool = HostPool::new(hosts(2)).unwrap();
        let mut first_counts: HashMap<String, usize> = HashMap::new();
        let trials = 1000;
        for _ in 0..trials {
            let order = pool.shuffled();
            let first = order.iter().next().unwrap().to_string();
            *first_counts.entry(first).or_default() += 1;
        }
        assert_eq!(first_counts.len(), 2);
        for count in first_counts.values() {
            assert!(*count < trials * 60 / 100, "order bias: {:?}", first_counts);
        }
    }

    #[test]
    fn test_three_host_permutations_are_uniform() {
        let pool = HostPool::new(hosts(3)).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts: HashMap<Vec<String>, usize> = HashMap::new();
        let trials = 6000;
        for _ in 0..trials {
            let order: Vec<String> =
                pool.shuffled_with(&mut rng).iter().map(|h| h.to_string()).collect();
            *counts.entry(order).or_default() += 1;
        }
        assert_eq!(counts.len(), 6);
        for count in counts.values() {
            // expected 1000 each
            assert!((800..1200).contains(count), "skewed permutations: {:?}", counts);
        }
    }
}

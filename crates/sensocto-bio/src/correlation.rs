// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Pairwise co-activity affinity graph between sensor streams.
//!
//! Every `record_co_access` strengthens all unordered pairs in the accessed
//! set by an exponential-moving-average step toward 1.0, so strength is
//! strictly increasing under repeated co-access and never exceeds 1.0.
//! Pair keys are normalized lexicographically, making the graph symmetric
//! by construction.

use std::time::{Duration, Instant};

use ahash::AHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Correlation tracker configuration
#[derive(Debug, Clone)]
pub struct CorrelationConfig {
    /// EMA step applied per co-access: `strength += rate * (1 - strength)`.
    pub learning_rate: f64,

    /// Peers below this strength are omitted from `get_correlated`.
    pub correlation_threshold: f64,

    /// Hard cap on stored edges.
    pub max_edges: usize,

    /// Edges not refreshed within this window are dropped during eviction.
    pub edge_ttl: Duration,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            correlation_threshold: 0.3,
            max_edges: 50_000,
            edge_ttl: Duration::from_secs(3600),
        }
    }
}

/// A correlated peer as returned by `get_correlated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedPeer {
    pub peer_id: String,
    pub strength: f64,
}

#[derive(Debug, Clone)]
struct CorrelationEdge {
    strength: f64,
    last_updated: Instant,
}

/// Co-activity affinity graph over opaque stream ids.
///
/// Unseen pairs have strength 0.0. Strength is symmetric:
/// `get_strength(a, b) == get_strength(b, a)`.
pub struct CorrelationTracker {
    config: CorrelationConfig,
    edges: RwLock<AHashMap<(String, String), CorrelationEdge>>,
}

impl CorrelationTracker {
    pub fn new(config: CorrelationConfig) -> Self {
        Self {
            config,
            edges: RwLock::new(AHashMap::new()),
        }
    }

    /// Strengthen every unordered pair in `stream_ids`.
    ///
    /// A no-op for fewer than two ids. Duplicate ids in the list do not
    /// produce self-edges.
    pub fn record_co_access(&self, stream_ids: &[&str]) {
        if stream_ids.len() < 2 {
            return;
        }
        let now = Instant::now();
        let rate = self.config.learning_rate;
        let mut edges = self.edges.write();

        for i in 0..stream_ids.len() {
            for j in (i + 1)..stream_ids.len() {
                if stream_ids[i] == stream_ids[j] {
                    continue;
                }
                let key = pair_key(stream_ids[i], stream_ids[j]);
                let edge = edges.entry(key).or_insert(CorrelationEdge {
                    strength: 0.0,
                    last_updated: now,
                });
                edge.strength += rate * (1.0 - edge.strength);
                edge.strength = edge.strength.min(1.0);
                edge.last_updated = now;
            }
        }

        if edges.len() > self.config.max_edges {
            evict_edges(&mut edges, self.config.max_edges, self.config.edge_ttl, now);
        }
    }

    /// Affinity strength of an unordered pair; 0.0 if never observed.
    pub fn get_strength(&self, a: &str, b: &str) -> f64 {
        let key = pair_key(a, b);
        self.edges.read().get(&key).map_or(0.0, |e| e.strength)
    }

    /// Peers of `stream_id` above the correlation threshold, strongest first.
    pub fn get_correlated(&self, stream_id: &str) -> Vec<CorrelatedPeer> {
        let threshold = self.config.correlation_threshold;
        let edges = self.edges.read();
        let mut peers: Vec<CorrelatedPeer> = edges
            .iter()
            .filter_map(|((a, b), edge)| {
                let peer = if a == stream_id {
                    Some(b)
                } else if b == stream_id {
                    Some(a)
                } else {
                    None
                }?;
                (edge.strength > threshold).then(|| CorrelatedPeer {
                    peer_id: peer.clone(),
                    strength: edge.strength,
                })
            })
            .collect();
        peers.sort_by(|x, y| y.strength.total_cmp(&x.strength));
        peers
    }

    /// Full correlation map for diagnostics: `(a, b) → strength` with `a < b`.
    pub fn get_all_correlations(&self) -> AHashMap<(String, String), f64> {
        self.edges
            .read()
            .iter()
            .map(|(key, edge)| (key.clone(), edge.strength))
            .collect()
    }

    /// Number of stored edges.
    pub fn edge_count(&self) -> usize {
        self.edges.read().len()
    }

    /// Drop all learned edges.
    pub fn reset(&self) {
        self.edges.write().clear();
    }
}

impl Default for CorrelationTracker {
    fn default() -> Self {
        Self::new(CorrelationConfig::default())
    }
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Drop stale edges first; if the table is still over capacity, drop the
/// weakest edges until it fits.
fn evict_edges(
    edges: &mut AHashMap<(String, String), CorrelationEdge>,
    max_edges: usize,
    ttl: Duration,
    now: Instant,
) {
    edges.retain(|_, edge| now.duration_since(edge.last_updated) <= ttl);
    if edges.len() <= max_edges {
        return;
    }
    let excess = edges.len() - max_edges;
    let mut by_strength: Vec<((String, String), f64)> = edges
        .iter()
        .map(|(key, edge)| (key.clone(), edge.strength))
        .collect();
    by_strength.sort_by(|x, y| x.1.total_cmp(&y.1));
    for (key, _) in by_strength.into_iter().take(excess) {
        edges.remove(&key);
    }
    trace!(
        target: "sensocto-bio",
        "[CORRELATION] Evicted {} weakest edges ({} remain)",
        excess,
        edges.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unseen_pair_has_zero_strength() {
        let tracker = CorrelationTracker::default();
        assert_eq!(tracker.get_strength("a", "b"), 0.0);
    }

    #[test]
    fn test_strength_is_symmetric() {
        let tracker = CorrelationTracker::default();
        tracker.record_co_access(&["a", "b"]);
        assert_eq!(tracker.get_strength("a", "b"), tracker.get_strength("b", "a"));
        assert!(tracker.get_strength("a", "b") > 0.0);
    }

    #[test]
    fn test_strength_strictly_increases() {
        let tracker = CorrelationTracker::default();
        let mut previous = 0.0;
        for _ in 0..20 {
            tracker.record_co_access(&["a", "b"]);
            let current = tracker.get_strength("a", "b");
            assert!(current > previous);
            previous = current;
        }
        assert!(previous <= 1.0);
    }

    #[test]
    fn test_short_lists_are_no_ops() {
        let tracker = CorrelationTracker::default();
        tracker.record_co_access(&[]);
        tracker.record_co_access(&["a"]);
        assert_eq!(tracker.edge_count(), 0);
    }

    #[test]
    fn test_duplicate_ids_do_not_create_self_edges() {
        let tracker = CorrelationTracker::default();
        tracker.record_co_access(&["a", "a", "b"]);
        assert_eq!(tracker.get_strength("a", "a"), 0.0);
        assert!(tracker.get_strength("a", "b") > 0.0);
    }

    #[test]
    fn test_correlated_peers_sorted_descending_above_threshold() {
        let tracker = CorrelationTracker::default();
        // b co-accessed with a 8 times, c only 5 times.
        for _ in 0..5 {
            tracker.record_co_access(&["a", "b", "c"]);
        }
        for _ in 0..3 {
            tracker.record_co_access(&["a", "b"]);
        }
        let peers = tracker.get_correlated("a");
        assert_eq!(peers.len(), 2);
        assert_eq!(peers[0].peer_id, "b");
        assert_eq!(peers[1].peer_id, "c");
        assert!(peers[0].strength > peers[1].strength);
        for peer in &peers {
            assert!(peer.strength > 0.3);
        }
    }

    #[test]
    fn test_weak_peers_are_filtered() {
        let tracker = CorrelationTracker::default();
        tracker.record_co_access(&["a", "b"]);
        // One co-access at rate 0.1 leaves strength 0.1 < 0.3.
        assert!(tracker.get_correlated("a").is_empty());
    }

    #[test]
    fn test_five_co_accesses_correlate_the_triple() {
        let tracker = CorrelationTracker::default();
        for _ in 0..5 {
            tracker.record_co_access(&["a", "b", "c"]);
        }
        let peers = tracker.get_correlated("a");
        let ids: Vec<&str> = peers.iter().map(|p| p.peer_id.as_str()).collect();
        assert!(ids.contains(&"b"));
        assert!(ids.contains(&"c"));
    }

    #[test]
    fn test_edge_count_respects_cap() {
        let config = CorrelationConfig {
            max_edges: 10,
            ..CorrelationConfig::default()
        };
        let tracker = CorrelationTracker::new(config);
        for i in 0..30 {
            let left = format!("s{i}");
            let right = format!("s{}", i + 100);
            tracker.record_co_access(&[&left, &right]);
        }
        assert!(tracker.edge_count() <= 10);
    }

    #[test]
    fn test_reset_clears_edges() {
        let tracker = CorrelationTracker::default();
        tracker.record_co_access(&["a", "b"]);
        tracker.reset();
        assert_eq!(tracker.edge_count(), 0);
        assert_eq!(tracker.get_strength("a", "b"), 0.0);
    }
}

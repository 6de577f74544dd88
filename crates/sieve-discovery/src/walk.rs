//! Reachability walk from root types.

use serde::Serialize;
use std::collections::{HashSet, VecDeque};

use tracing::{debug, trace};

use crate::error::DiscoveryError;
use crate::graph::{EdgeProvider, TypeGraph};

/// The closed set of types reachable from the roots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Discovery {
    /// Types in the order the walk first visited them.
    types: Vec<String>,
    #[serde(skip)]
    visited: HashSet<String>,
}

impl Discovery {
    pub fn contains(&self, id: &str) -> bool {
        self.visited.contains(id)
    }

    /// Discovered types in walk order.
    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Discovered object and interface types, i.e. the ones that need
    /// generated filter/order inputs.
    pub fn entities<'a>(&'a self, graph: &TypeGraph) -> Vec<&'a str> {
        self.iter()
            .filter(|id| graph.kind(id).is_some_and(|k| k.is_entity()))
            .collect()
    }

    pub fn into_types(self) -> Vec<String> {
        self.types
    }
}

/// Walk every type reachable from `roots`.
///
/// FIFO over a work queue seeded with the roots; the visited set is the only
/// termination guard, so cycles are safe. Types no root reaches are never
/// visited.
pub fn discover<S, P>(roots: &[S], provider: &P) -> Result<Discovery, DiscoveryError>
where
    S: AsRef<str>,
    P: EdgeProvider + ?Sized,
{
    let mut queue: VecDeque<String> = VecDeque::with_capacity(roots.len());
    for root in roots {
        let root = root.as_ref();
        if !provider.resolves(root) {
            return Err(DiscoveryError::UnknownRoot(root.to_string()));
        }
        queue.push_back(root.to_string());
    }

    let mut discovery = Discovery::default();
    while let Some(current) = queue.pop_front() {
        if !discovery.visited.insert(current.clone()) {
            continue;
        }
        trace!(id = %current, "Visiting type");

        for next in provider.edges(&current)? {
            if !discovery.visited.contains(&next) {
                queue.push_back(next);
            }
        }
        discovery.types.push(current);
    }

    debug!(
        roots = roots.len(),
        discovered = discovery.len(),
        "Discovery complete"
    );
    Ok(discovery)
}

//! Dependency graph with level-synchronous topological scheduling.

use std::collections::HashMap;

use tracing::debug;

use crate::error::Error;

/// A directed graph of task prerequisites: `deps[node]` lists the ids whose
/// outputs `node` consumes. Built fresh for every run.
pub(crate) struct DependencyGraph {
    deps: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub(crate) fn new(deps: HashMap<String, Vec<String>>) -> Self {
        Self { deps }
    }

    /// Groups nodes into execution levels via Kahn's algorithm.
    ///
    /// Every prerequisite of a node in level `i` sits in some level `j < i`,
    /// so the nodes of one level can run concurrently. Level boundaries are
    /// deterministic; order within a level is not.
    ///
    /// Fails with [`Error::MissingDependency`] when a prerequisite is not a
    /// node, and [`Error::CyclicDependency`] when a cycle (including a
    /// self-edge) prevents completing the ordering.
    pub(crate) fn execution_levels(&self) -> Result<Vec<Vec<String>>, Error> {
        if self.deps.is_empty() {
            return Ok(Vec::new());
        }

        // Each listed prerequisite counts once per listing.
        let mut in_degree: HashMap<&str, usize> = HashMap::with_capacity(self.deps.len());
        for (node, prereqs) in &self.deps {
            for prereq in prereqs {
                if !self.deps.contains_key(prereq.as_str()) {
                    return Err(Error::MissingDependency {
                        node: node.clone(),
                        dependency: prereq.clone(),
                    });
                }
            }
            in_degree.insert(node.as_str(), prereqs.len());
        }

        let mut successors: HashMap<&str, Vec<&str>> = HashMap::with_capacity(self.deps.len());
        for (node, prereqs) in &self.deps {
            for prereq in prereqs {
                successors
                    .entry(prereq.as_str())
                    .or_default()
                    .push(node.as_str());
            }
        }

        let mut frontier: Vec<&str> = in_degree
            .iter()
            .filter(|&(_, degree)| *degree == 0)
            .map(|(&node, _)| node)
            .collect();

        let mut levels = Vec::new();
        let mut emitted = 0;

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for node in &frontier {
                if let Some(dependents) = successors.get(node) {
                    for dependent in dependents {
                        if let Some(degree) = in_degree.get_mut(dependent) {
                            *degree -= 1;
                            if *degree == 0 {
                                next.push(*dependent);
                            }
                        }
                    }
                }
            }
            emitted += frontier.len();
            levels.push(frontier.iter().map(|node| (*node).to_owned()).collect());
            frontier = next;
        }

        if emitted != self.deps.len() {
            return Err(Error::CyclicDependency);
        }

        debug!(level_count = levels.len(), "execution levels computed");
        Ok(levels)
    }
}

#[cfg(test)]
mod tests;

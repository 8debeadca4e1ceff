//! Dependency tracking for incremental re-rendering.
//!
//! Every time a document successfully pulls in another file (an include,
//! a layout it extends, the head snippet) an edge `from -> to` is recorded.
//! The set of files reachable from a root document is exactly the set of
//! files whose change must trigger a re-render of that root.
//!
//! The graph is expected to be a DAG: the expander refuses to follow an
//! include that re-enters its own ancestor chain, so no cyclic edge is ever
//! recorded during a render. [`DependencyTracker::has_cycle`] exists for
//! graphs assembled by hand or merged across renders.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::path::{Path, PathBuf};

/// Why one file depends on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Include,
    Layout,
    Head,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyKind::Include => f.write_str("include"),
            DependencyKind::Layout => f.write_str("layout"),
            DependencyKind::Head => f.write_str("head"),
        }
    }
}

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Node has not been visited.
    White,
    /// Node is currently being visited (in the DFS stack).
    Gray,
    /// Node has been fully visited.
    Black,
}

/// Directed graph of file dependencies, keyed by absolute path.
#[derive(Debug, Clone, Default)]
pub struct DependencyTracker {
    graph: DiGraph<PathBuf, DependencyKind>,
    node_map: HashMap<PathBuf, NodeIndex>,
}

impl DependencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_node(&mut self, path: &Path) -> NodeIndex {
        if let Some(&index) = self.node_map.get(path) {
            index
        } else {
            let index = self.graph.add_node(path.to_path_buf());
            self.node_map.insert(path.to_path_buf(), index);
            index
        }
    }

    /// Record that `from` includes `to`. Idempotent.
    pub fn record(&mut self, from: &Path, to: &Path) {
        self.record_as(from, to, DependencyKind::Include);
    }

    /// Record an edge of a specific kind. The first recorded kind for an
    /// edge wins; re-recording has no effect.
    pub fn record_as(&mut self, from: &Path, to: &Path, kind: DependencyKind) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);

        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, kind);
        }
    }

    /// Add every edge of `other`, keeping its recording order.
    pub fn merge(&mut self, other: &DependencyTracker) {
        for edge in other.graph.edge_references() {
            let from = &other.graph[edge.source()];
            let to = &other.graph[edge.target()];
            self.record_as(from, to, *edge.weight());
        }
    }

    /// Children of `idx` in the order their edges were recorded.
    fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        // petgraph yields neighbors most-recent-first
        let mut children: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
        children.reverse();
        children
    }

    /// Every file reachable from `root`, depth-first preorder, each once.
    /// `root` itself is not included.
    pub fn get_dependencies(&self, root: &Path) -> Vec<PathBuf> {
        let Some(&root_idx) = self.node_map.get(root) else {
            return Vec::new();
        };

        let mut ordered = Vec::new();
        let mut seen = HashSet::from([root_idx]);
        let mut stack: Vec<NodeIndex> = self.children(root_idx).into_iter().rev().collect();

        while let Some(node) = stack.pop() {
            if !seen.insert(node) {
                continue;
            }
            ordered.push(self.graph[node].clone());
            stack.extend(
                self.children(node).into_iter().rev().filter(|child| !seen.contains(child)),
            );
        }

        ordered
    }

    /// Files `path` depends on directly, in recording order.
    pub fn direct_dependencies(&self, path: &Path) -> Vec<PathBuf> {
        self.node_map
            .get(path)
            .map(|&idx| self.children(idx).into_iter().map(|c| self.graph[c].clone()).collect())
            .unwrap_or_default()
    }

    /// Every file that transitively depends on `path`, breadth-first.
    ///
    /// This is the incremental-rebuild lookup: when `path` changes, these
    /// are the documents to re-render.
    pub fn dependents(&self, path: &Path) -> Vec<PathBuf> {
        let Some(&start) = self.node_map.get(path) else {
            return Vec::new();
        };

        let mut ordered = Vec::new();
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            let mut parents: Vec<NodeIndex> = self
                .graph
                .neighbors_directed(current, petgraph::Direction::Incoming)
                .collect();
            parents.reverse();
            for parent in parents {
                if seen.insert(parent) {
                    ordered.push(self.graph[parent].clone());
                    queue.push_back(parent);
                }
            }
        }

        ordered
    }

    /// Whether a cycle is reachable from `path`.
    pub fn has_cycle(&self, path: &Path) -> bool {
        self.find_cycle(path).is_some()
    }

    /// The first cycle reachable from `path`, closed by repeating its first
    /// node (`a -> b -> a`).
    pub fn find_cycle(&self, path: &Path) -> Option<Vec<PathBuf>> {
        let &start = self.node_map.get(path)?;
        let mut colors: HashMap<NodeIndex, Color> =
            self.graph.node_indices().map(|idx| (idx, Color::White)).collect();

        // Gray nodes with their children and the next child to visit
        let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> = Vec::new();
        colors.insert(start, Color::Gray);
        stack.push((start, self.children(start), 0));

        while let Some((node, children, next)) = stack.last_mut() {
            let Some(&neighbor) = children.get(*next) else {
                colors.insert(*node, Color::Black);
                stack.pop();
                continue;
            };
            *next += 1;

            match colors.get(&neighbor) {
                Some(Color::Gray) => {
                    let cycle_start =
                        stack.iter().position(|(n, _, _)| *n == neighbor).unwrap_or(0);
                    let mut cycle: Vec<PathBuf> =
                        stack[cycle_start..].iter().map(|(n, _, _)| self.graph[*n].clone()).collect();
                    cycle.push(self.graph[neighbor].clone());
                    return Some(cycle);
                }
                Some(Color::White) => {
                    colors.insert(neighbor, Color::Gray);
                    stack.push((neighbor, self.children(neighbor), 0));
                }
                _ => {}
            }
        }

        None
    }

    /// Every file that is the target of at least one `kind` edge.
    pub fn targets_of_kind(&self, kind: DependencyKind) -> HashSet<PathBuf> {
        self.graph
            .edge_references()
            .filter(|edge| *edge.weight() == kind)
            .map(|edge| self.graph[edge.target()].clone())
            .collect()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.node_map.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Human-readable tree of everything under `root`. Paths are shown
    /// relative to `base` when they live under it.
    pub fn to_tree_string(&self, root: &Path, base: &Path) -> String {
        let mut result = format!("{}\n", display_path(root, base));
        let Some(&root_idx) = self.node_map.get(root) else {
            return result;
        };
        let mut visited = HashSet::from([root_idx]);

        // (parent, node, prefix, is_last), popped in preorder
        let mut stack: Vec<(NodeIndex, NodeIndex, String, bool)> = Vec::new();
        self.push_children(root_idx, "", &mut stack);

        while let Some((parent, node, prefix, is_last)) = stack.pop() {
            let connector = if is_last {
                "└── "
            } else {
                "├── "
            };
            let label = match self.graph.find_edge(parent, node).map(|edge| self.graph[edge]) {
                Some(DependencyKind::Include) | None => String::new(),
                Some(kind) => format!(" ({kind})"),
            };
            let path = display_path(&self.graph[node], base);

            if !visited.insert(node) {
                result.push_str(&format!("{prefix}{connector}{path}{label} (already shown)\n"));
                continue;
            }
            result.push_str(&format!("{prefix}{connector}{path}{label}\n"));

            let child_prefix = if is_last {
                format!("{prefix}    ")
            } else {
                format!("{prefix}│   ")
            };
            self.push_children(node, &child_prefix, &mut stack);
        }
        result
    }

    fn push_children(
        &self,
        node: NodeIndex,
        prefix: &str,
        stack: &mut Vec<(NodeIndex, NodeIndex, String, bool)>,
    ) {
        let children = self.children(node);
        let last = children.len().saturating_sub(1);
        for (i, child) in children.into_iter().enumerate().rev() {
            stack.push((node, child, prefix.to_string(), i == last));
        }
    }
}

fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base).unwrap_or(path).display().to_string()
}

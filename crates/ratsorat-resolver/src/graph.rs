//! Graph of the dependency requests observed while resolving modules.

use std::collections::{HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// Module-level dependency graph backed by petgraph.
///
/// An edge `a -> b` means the resolution of `a` requested `b`.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or retrieve a module node.
    pub fn add_module(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }

    /// Record that `from` requested `to`. Duplicate edges are ignored.
    pub fn add_dependency(&mut self, from: &str, to: &str) {
        let from = self.add_module(from);
        let to = self.add_module(to);
        if !self.graph.edges(from).any(|e| e.target() == to) {
            self.graph.add_edge(from, to, ());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Modules requested by `name`, sorted.
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, Direction::Outgoing)
    }

    /// Modules that requested `name`, sorted.
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, Direction::Incoming)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.index.get(name) else {
            return Vec::new();
        };
        let mut names: Vec<&str> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n].as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Every module ordered so that dependencies come before their dependents.
    ///
    /// Returns `None` if the recorded edges contain a cycle.
    pub fn topological_order(&self) -> Option<Vec<&str>> {
        let mut order = toposort(&self.graph, None).ok()?;
        order.reverse();
        Some(order.into_iter().map(|idx| self.graph[idx].as_str()).collect())
    }

    /// Find a chain of requests leading from `from` to `to`, both included.
    pub fn find_path(&self, from: &str, to: &str) -> Option<Vec<&str>> {
        let start = *self.index.get(from)?;
        let target = *self.index.get(to)?;
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        if self.dfs_path(start, target, &mut path, &mut visited) {
            Some(path.iter().map(|&idx| self.graph[idx].as_str()).collect())
        } else {
            None
        }
    }

    fn dfs_path(
        &self,
        current: NodeIndex,
        target: NodeIndex,
        path: &mut Vec<NodeIndex>,
        visited: &mut HashSet<NodeIndex>,
    ) -> bool {
        path.push(current);
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            path.pop();
            return false;
        }
        for edge in self.graph.edges(current) {
            if self.dfs_path(edge.target(), target, path, visited) {
                return true;
            }
        }
        path.pop();
        false
    }

    /// Render the dependencies of `root` as a tree.
    ///
    /// A module already shown on the current branch is printed once more with
    /// a `(*)` marker and not expanded again.
    pub fn render_tree(&self, root: &str) -> String {
        let mut output = String::new();
        if !self.contains(root) {
            return output;
        }
        output.push_str(&format!("{root}\n"));

        let mut visited = HashSet::new();
        visited.insert(root.to_string());
        let deps = self.dependencies_of(root);
        let count = deps.len();
        for (i, dep) in deps.iter().enumerate() {
            self.render_subtree(&mut output, dep, "", i == count - 1, &mut visited);
        }
        output
    }

    fn render_subtree(
        &self,
        output: &mut String,
        name: &str,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<String>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        if !visited.insert(name.to_string()) {
            output.push_str(&format!("{prefix}{connector}{name} (*)\n"));
            return;
        }
        output.push_str(&format!("{prefix}{connector}{name}\n"));

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let deps = self.dependencies_of(name);
        let count = deps.len();
        for (i, dep) in deps.iter().enumerate() {
            self.render_subtree(output, dep, &child_prefix, i == count - 1, visited);
        }

        visited.remove(name);
    }

    /// Number of modules in the graph.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> DependencyGraph {
        let mut g = DependencyGraph::new();
        g.add_dependency("app", "http");
        g.add_dependency("app", "log");
        g.add_dependency("http", "log");
        g
    }

    #[test]
    fn duplicate_add_returns_same_index() {
        let mut g = DependencyGraph::new();
        let idx1 = g.add_module("a");
        let idx2 = g.add_module("a");
        assert_eq!(idx1, idx2);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn duplicate_edges_are_ignored() {
        let mut g = DependencyGraph::new();
        g.add_dependency("a", "b");
        g.add_dependency("a", "b");
        assert_eq!(g.dependencies_of("a"), vec!["b"]);
    }

    #[test]
    fn forward_and_reverse_edges() {
        let g = chain();
        assert_eq!(g.dependencies_of("app"), vec!["http", "log"]);
        assert_eq!(g.dependents_of("log"), vec!["app", "http"]);
        assert!(g.dependencies_of("missing").is_empty());
    }

    #[test]
    fn topological_order_puts_dependencies_first() {
        let g = chain();
        let order = g.topological_order().unwrap();
        let pos = |name: &str| order.iter().position(|n| *n == name).unwrap();
        assert!(pos("log") < pos("http"));
        assert!(pos("http") < pos("app"));
    }

    #[test]
    fn topological_order_rejects_cycles() {
        let mut g = DependencyGraph::new();
        g.add_dependency("a", "b");
        g.add_dependency("b", "a");
        assert!(g.topological_order().is_none());
    }

    #[test]
    fn find_path_exists() {
        let g = chain();
        assert_eq!(g.find_path("app", "log").unwrap().first(), Some(&"app"));
        assert_eq!(g.find_path("http", "log").unwrap(), vec!["http", "log"]);
        assert!(g.find_path("log", "app").is_none());
    }

    #[test]
    fn tree_rendering() {
        let g = chain();
        let tree = g.render_tree("app");
        assert_eq!(tree, "app\n├── http\n│   └── log\n└── log\n");
    }

    #[test]
    fn tree_marks_repeated_modules() {
        let mut g = DependencyGraph::new();
        g.add_dependency("a", "b");
        g.add_dependency("b", "a");
        assert_eq!(g.render_tree("a"), "a\n└── b\n    └── a (*)\n");
    }

    #[test]
    fn tree_for_unknown_root_is_empty() {
        assert!(chain().render_tree("nope").is_empty());
    }
}

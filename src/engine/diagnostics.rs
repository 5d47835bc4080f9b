use std::collections::HashMap;
use std::fmt::Display;

use petgraph::Graph;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Kind of data-quality problem found in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Issue {
    MissingRequiredInput,
    InconsistentCrossDocumentInfo,
}

/// Non-fatal entry of the run log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub issue: Issue,
    pub message: String,
}

impl Diagnostic {
    pub fn new(issue: Issue, message: impl Into<String>) -> Self {
        Self {
            issue,
            message: message.into(),
        }
    }
}

/// Record of a single evaluation run.
///
/// Tracks which units were built, in which order, how many times each build
/// routine ran, and which unit referenced which. The reference graph is kept
/// in a [`petgraph::Graph`] so it can be rendered as a Mermaid diagram.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    /// Units in the order their builds completed.
    pub build_order: Vec<String>,
    /// Number of times each build routine executed.
    pub build_counts: HashMap<String, usize>,
    graph: Graph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl Diagnostics {
    pub(crate) fn built(&mut self, name: &str) {
        self.build_order.push(name.to_string());
        *self.build_counts.entry(name.to_string()).or_default() += 1;
    }

    /// Record that `dependent` read from `dependency`. Repeated references
    /// share a single edge.
    pub(crate) fn reference(&mut self, dependent: Option<&str>, dependency: &str) {
        let target = self.node(dependency);
        if let Some(dependent) = dependent {
            let source = self.node(dependent);
            if self.graph.find_edge(target, source).is_none() {
                self.graph.add_edge(target, source, ());
            }
        }
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(index) = self.nodes.get(name) {
            return *index;
        }
        let index = self.graph.add_node(name.to_string());
        self.nodes.insert(name.to_string(), index);
        index
    }

    pub fn build_count(&self, name: &str) -> usize {
        self.build_counts.get(name).copied().unwrap_or(0)
    }

    /// Units that `name` read while it was being built.
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        let Some(&index) = self.nodes.get(name) else {
            return Vec::new();
        };
        let mut deps: Vec<&str> = self
            .graph
            .neighbors_directed(index, petgraph::Direction::Incoming)
            .map(|i| self.graph[i].as_str())
            .collect();
        deps.sort_unstable();
        deps
    }

    /// The reference graph as a Mermaid flowchart.
    pub fn render_mermaid(&self) -> impl Display + '_ {
        Mermaid(self)
    }
}

struct Mermaid<'a>(&'a Diagnostics);

impl Display for Mermaid<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let graph = &self.0.graph;
        writeln!(f, "graph LR")?;

        for index in graph.node_indices() {
            let name = graph[index].replace('"', "\\\"");
            writeln!(f, "    {}[\"{}\"]", index.index(), name)?;
        }

        for edge in graph.raw_edges() {
            writeln!(f, "    {} --> {}", edge.source().index(), edge.target().index())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_references_deduplicated() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.reference(None, "root");
        diagnostics.reference(Some("root"), "leaf");
        diagnostics.reference(Some("root"), "leaf");

        assert_eq!(diagnostics.dependencies_of("root"), vec!["leaf"]);
        assert!(diagnostics.dependencies_of("leaf").is_empty());

        let mermaid = diagnostics.render_mermaid().to_string();
        assert!(mermaid.starts_with("graph LR"));
        assert_eq!(mermaid.matches("-->").count(), 1);
    }

    #[test]
    fn test_build_counts() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.built("a");
        diagnostics.built("b");
        assert_eq!(diagnostics.build_count("a"), 1);
        assert_eq!(diagnostics.build_count("c"), 0);
        assert_eq!(diagnostics.build_order, vec!["a", "b"]);
    }
}

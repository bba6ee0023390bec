use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ShapeError;

/// A named node of a flow (Sankey-style) graph.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FlowNode {
    pub name: String,
}

/// A directed weighted edge between node indices.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FlowLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

/// Node/edge input for the Sankey layout, which stays outside this crate.
/// The core only validates and prepares the structure.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
}

impl FlowGraph {
    /// Parse the `{"nodes": [{"name": …}], "links": [{"source", "target",
    /// "value"}]}` JSON shape.
    pub fn parse(text: &str) -> Result<FlowGraph, ShapeError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Check the graph is layoutable: every link endpoint indexes an existing
    /// node, and there is no cycle (the layout would not terminate on one).
    /// Disconnected graphs are fine.
    pub fn validate(&self) -> Result<(), ShapeError> {
        let nodes = self.nodes.len();
        for (i, link) in self.links.iter().enumerate() {
            for endpoint in [link.source, link.target] {
                if endpoint >= nodes {
                    return Err(ShapeError::InvalidGraphReference {
                        link: i,
                        node: endpoint,
                        nodes,
                    });
                }
            }
        }

        // Kahn's algorithm; anything left unprocessed sits on a cycle.
        let mut indegree = vec![0usize; nodes];
        for link in &self.links {
            indegree[link.target] += 1;
        }
        let mut queue: Vec<usize> = (0..nodes).filter(|&n| indegree[n] == 0).collect();
        let mut processed = 0;
        while let Some(n) = queue.pop() {
            processed += 1;
            for link in self.links.iter().filter(|l| l.source == n) {
                indegree[link.target] -= 1;
                if indegree[link.target] == 0 {
                    queue.push(link.target);
                }
            }
        }
        if processed < nodes {
            return Err(ShapeError::CyclicGraph);
        }

        debug!(nodes, links = self.links.len(), "flow graph validated");
        Ok(())
    }

    /// Total weight flowing through a node: the larger of its inbound and
    /// outbound sums (a root has no inbound, a leaf no outbound). This is the
    /// figure a node reports as its share of the whole.
    pub fn node_throughput(&self, node: usize) -> Option<f64> {
        if node >= self.nodes.len() {
            return None;
        }
        let inbound: f64 = self
            .links
            .iter()
            .filter(|l| l.target == node)
            .map(|l| l.value)
            .sum();
        let outbound: f64 = self
            .links
            .iter()
            .filter(|l| l.source == node)
            .map(|l| l.value)
            .sum();
        Some(inbound.max(outbound))
    }
}

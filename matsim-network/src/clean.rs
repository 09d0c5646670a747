use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::Result;
use log::info;
use petgraph::algo::kosaraju_scc;
use petgraph::graphmap::DiGraphMap;

use crate::{Network, NodeID};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CleanSummary {
    pub removed_nodes: usize,
    pub removed_links: usize,
}

impl Network {
    /// Keep only the biggest cluster of nodes where every node can reach every other one, plus
    /// the links between them. Agents routed anywhere else could get stuck, for example at the
    /// dead end of a one-way motorway clipped at the edge of the input.
    pub fn retain_largest_strongly_connected(&mut self) -> CleanSummary {
        let mut graph: DiGraphMap<NodeID, ()> = DiGraphMap::new();
        for idx in 0..self.nodes.len() {
            graph.add_node(NodeID(idx as u32));
        }
        for link in &self.links {
            graph.add_edge(link.from, link.to, ());
        }

        // Ties go to the first cluster found
        let mut largest: Vec<NodeID> = Vec::new();
        for cluster in kosaraju_scc(&graph) {
            if cluster.len() > largest.len() {
                largest = cluster;
            }
        }
        let keep: HashSet<NodeID> = largest.into_iter().collect();

        let num_nodes = self.nodes.len();
        let num_links = self.links.len();

        let mut remap: HashMap<NodeID, NodeID> = HashMap::new();
        let mut nodes = Vec::new();
        for (idx, node) in std::mem::take(&mut self.nodes).into_iter().enumerate() {
            let old = NodeID(idx as u32);
            if keep.contains(&old) {
                remap.insert(old, NodeID(nodes.len() as u32));
                nodes.push(node);
            }
        }
        self.nodes = nodes;

        self.links
            .retain(|link| keep.contains(&link.from) && keep.contains(&link.to));
        for link in &mut self.links {
            link.from = remap[&link.from];
            link.to = remap[&link.to];
        }

        CleanSummary {
            removed_nodes: num_nodes - self.nodes.len(),
            removed_links: num_links - self.links.len(),
        }
    }
}

/// Read a network file, keep its largest strongly connected part, and write that to `output`.
pub fn clean_network_file(input: &Path, output: &Path) -> Result<CleanSummary> {
    let mut network = Network::read_xml(input)?;
    let summary = network.retain_largest_strongly_connected();
    info!(
        "Removed {} nodes and {} links that aren't strongly connected to the rest",
        summary.removed_nodes, summary.removed_links
    );
    network.write_xml(output)?;
    Ok(summary)
}

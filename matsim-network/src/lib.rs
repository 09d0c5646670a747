use std::collections::BTreeSet;

use geo::{Coord, LineString};

mod clean;
mod geometry;
mod io;
mod transit;

pub use clean::{clean_network_file, CleanSummary};
pub use transit::{write_transit_stops, write_transit_stops_to, StopFacility};

/// A MATSim network: nodes with planar coordinates and directed links between them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Network {
    pub name: Option<String>,
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub id: String,
    pub from: NodeID,
    pub to: NodeID,
    /// Meters
    pub length: f64,
    /// Meters per second
    pub freespeed: f64,
    /// Vehicles per hour
    pub capacity: f64,
    pub permlanes: f64,
    /// MATSim modes, such as "car" or "pt"
    pub modes: BTreeSet<String>,
    // Not part of the network file; only used for the detailed geometry output
    pub geometry: Option<LineString>,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeID(pub u32);
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct LinkID(pub u32);

impl Network {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn add_node(&mut self, id: String, x: f64, y: f64) -> NodeID {
        self.nodes.push(Node { id, x, y });
        NodeID(self.nodes.len() as u32 - 1)
    }

    pub fn add_link(&mut self, link: Link) -> LinkID {
        self.links.push(link);
        LinkID(self.links.len() as u32 - 1)
    }

    pub fn node(&self, id: NodeID) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn link(&self, id: LinkID) -> &Link {
        &self.links[id.0 as usize]
    }

    /// The detailed geometry of a link, falling back to a straight line between its nodes.
    pub fn link_geometry(&self, id: LinkID) -> LineString {
        let link = self.link(id);
        if let Some(geometry) = &link.geometry {
            return geometry.clone();
        }
        let from = self.node(link.from);
        let to = self.node(link.to);
        LineString::new(vec![
            Coord {
                x: from.x,
                y: from.y,
            },
            Coord { x: to.x, y: to.y },
        ])
    }
}

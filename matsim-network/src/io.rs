use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use log::info;
use xml::attribute::OwnedAttribute;
use xml::reader::{EventReader, XmlEvent as ReadEvent};
use xml::writer::{EmitterConfig, XmlEvent as WriteEvent};

use crate::{Link, Network, NodeID};

const DOCTYPE: &str =
    r#"<!DOCTYPE network SYSTEM "http://www.matsim.org/files/dtd/network_v2.dtd">"#;

impl Network {
    /// Persist as a MATSim `network_v2` XML file.
    pub fn write_xml(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        self.write_xml_to(BufWriter::new(file))?;
        info!(
            "Wrote {} nodes and {} links to {}",
            self.nodes.len(),
            self.links.len(),
            path.display()
        );
        Ok(())
    }

    pub fn write_xml_to<W: Write>(&self, mut out: W) -> Result<()> {
        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(out, "{DOCTYPE}")?;

        let mut writer = EmitterConfig::new()
            .perform_indent(true)
            .write_document_declaration(false)
            .create_writer(out);

        let mut network = WriteEvent::start_element("network");
        if let Some(name) = &self.name {
            network = network.attr("name", name);
        }
        writer.write(network)?;

        writer.write(WriteEvent::start_element("nodes"))?;
        for node in &self.nodes {
            let x = node.x.to_string();
            let y = node.y.to_string();
            writer.write(
                WriteEvent::start_element("node")
                    .attr("id", &node.id)
                    .attr("x", &x)
                    .attr("y", &y),
            )?;
            writer.write(WriteEvent::end_element())?;
        }
        writer.write(WriteEvent::end_element())?;

        writer.write(
            WriteEvent::start_element("links")
                .attr("capperiod", "01:00:00")
                .attr("effectivecellsize", "7.5")
                .attr("effectivelanewidth", "3.75"),
        )?;
        for link in &self.links {
            let length = link.length.to_string();
            let freespeed = link.freespeed.to_string();
            let capacity = link.capacity.to_string();
            let permlanes = link.permlanes.to_string();
            let modes = link.modes.iter().cloned().collect::<Vec<_>>().join(",");
            writer.write(
                WriteEvent::start_element("link")
                    .attr("id", &link.id)
                    .attr("from", &self.node(link.from).id)
                    .attr("to", &self.node(link.to).id)
                    .attr("length", &length)
                    .attr("freespeed", &freespeed)
                    .attr("capacity", &capacity)
                    .attr("permlanes", &permlanes)
                    .attr("oneway", "1")
                    .attr("modes", &modes),
            )?;
            writer.write(WriteEvent::end_element())?;
        }
        writer.write(WriteEvent::end_element())?;

        writer.write(WriteEvent::end_element())?;
        writer.into_inner().flush()?;
        Ok(())
    }

    /// Read a MATSim network XML file. Link geometry is not stored in the file, so every link
    /// comes back without one.
    pub fn read_xml(path: &Path) -> Result<Network> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        Self::read_xml_from(BufReader::new(file))
            .with_context(|| format!("reading MATSim network {}", path.display()))
    }

    pub fn read_xml_from<R: Read>(input: R) -> Result<Network> {
        let mut network = Network::default();
        let mut node_lookup: HashMap<String, NodeID> = HashMap::new();

        for event in EventReader::new(input) {
            let ReadEvent::StartElement {
                name, attributes, ..
            } = event?
            else {
                continue;
            };
            match name.local_name.as_str() {
                "network" => {
                    network.name = attribute(&attributes, "name").map(|x| x.to_string());
                }
                "node" => {
                    let id = required(&attributes, "id", "node")?.to_string();
                    let x = parse_number(&attributes, "x", "node")?;
                    let y = parse_number(&attributes, "y", "node")?;
                    let node = network.add_node(id.clone(), x, y);
                    node_lookup.insert(id, node);
                }
                "link" => {
                    let id = required(&attributes, "id", "link")?.to_string();
                    let lookup = |key| -> Result<NodeID> {
                        let node_id = required(&attributes, key, "link")?;
                        node_lookup.get(node_id).copied().ok_or_else(|| {
                            anyhow!("link {id} references unknown node {node_id}")
                        })
                    };
                    let from = lookup("from")?;
                    let to = lookup("to")?;
                    let modes: BTreeSet<String> = attribute(&attributes, "modes")
                        .unwrap_or_default()
                        .split(',')
                        .map(|x| x.trim())
                        .filter(|x| !x.is_empty())
                        .map(|x| x.to_string())
                        .collect();
                    network.add_link(Link {
                        id,
                        from,
                        to,
                        length: parse_number(&attributes, "length", "link")?,
                        freespeed: parse_number(&attributes, "freespeed", "link")?,
                        capacity: parse_number(&attributes, "capacity", "link")?,
                        permlanes: parse_number(&attributes, "permlanes", "link")?,
                        modes,
                        geometry: None,
                    });
                }
                _ => {}
            }
        }

        Ok(network)
    }
}

fn attribute<'a>(attributes: &'a [OwnedAttribute], key: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|attr| attr.name.local_name == key)
        .map(|attr| attr.value.as_str())
}

fn required<'a>(attributes: &'a [OwnedAttribute], key: &str, element: &str) -> Result<&'a str> {
    match attribute(attributes, key) {
        Some(value) => Ok(value),
        None => bail!("<{element}> is missing the {key} attribute"),
    }
}

fn parse_number(attributes: &[OwnedAttribute], key: &str, element: &str) -> Result<f64> {
    let value = required(attributes, key, element)?;
    value
        .parse()
        .with_context(|| format!("<{element}> has a non-numeric {key}: {value}"))
}

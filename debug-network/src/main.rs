use std::path::Path;

use anyhow::{bail, Result};
use geojson::{FeatureCollection, GeoJson};
use matsim_network::Network;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        bail!("Pass in a MATSim network.xml file");
    }
    let network = Network::read_xml(Path::new(&args[1]))?;

    // Same properties as network_geometry.geojson, plus the nodes, so a cleaned network can be
    // compared against the original in a GeoJSON viewer
    let mut features = network.link_features();
    features.extend(network.node_features());
    let gj = GeoJson::from(features.into_iter().collect::<FeatureCollection>());
    std::fs::write("debug.geojson", serde_json::to_string_pretty(&gj)?)?;
    println!(
        "Wrote debug.geojson with {} nodes and {} links",
        network.nodes.len(),
        network.links.len()
    );
    Ok(())
}

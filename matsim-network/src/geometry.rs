use std::path::Path;

use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry};
use log::info;

use crate::{LinkID, Network};

impl Network {
    /// One LineString feature per link, using the detailed geometry when it's known.
    pub fn link_features(&self) -> Vec<Feature> {
        let mut features = Vec::new();
        for (idx, link) in self.links.iter().enumerate() {
            let geometry = self.link_geometry(LinkID(idx as u32));
            let mut f = Feature::from(Geometry::from(&geometry));
            f.set_property("link_id", link.id.clone());
            f.set_property("from", self.node(link.from).id.clone());
            f.set_property("to", self.node(link.to).id.clone());
            f.set_property("length", link.length);
            f.set_property("freespeed", link.freespeed);
            f.set_property("capacity", link.capacity);
            f.set_property("permlanes", link.permlanes);
            f.set_property(
                "modes",
                link.modes.iter().cloned().collect::<Vec<_>>().join(","),
            );
            features.push(f);
        }
        features
    }

    pub fn node_features(&self) -> Vec<Feature> {
        let mut features = Vec::new();
        for node in &self.nodes {
            let mut f = Feature::from(Geometry::from(geojson::Value::Point(vec![node.x, node.y])));
            f.set_property("node_id", node.id.clone());
            features.push(f);
        }
        features
    }

    /// Write the detailed link geometry as a GeoJSON FeatureCollection, so the network can be
    /// drawn with real road shapes instead of straight node-to-node lines.
    pub fn write_geometry_geojson(&self, path: &Path) -> Result<()> {
        let gj = GeoJson::from(
            self.link_features()
                .into_iter()
                .collect::<FeatureCollection>(),
        );
        std::fs::write(path, gj.to_string())
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Wrote detailed link geometry to {}", path.display());
        Ok(())
    }
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};

use matsim_network::{clean_network_file, write_transit_stops, Network, StopFacility};

use crate::settings::{NetworkCleaner, WriterSettings};

pub const NETWORK_FILE_NAME: &str = "network";
pub const CLEANED_SUFFIX: &str = "_cleaned";
pub const XML_EXTENSION: &str = ".xml";
pub const GEOMETRY_FILE_NAME: &str = "network_geometry.geojson";
pub const TRANSIT_SCHEDULE_FILE_NAME: &str = "transitschedule.xml";

/// Persists a converted network as MATSim files in one output directory.
#[derive(Clone, Debug)]
pub struct MatsimNetworkWriter {
    output_directory: PathBuf,
    generate_detailed_geometry: bool,
}

impl WriterSettings for MatsimNetworkWriter {
    fn set_output_directory(&mut self, directory: &Path) {
        self.output_directory = directory.to_path_buf();
    }

    fn set_generate_detailed_geometry(&mut self, generate: bool) {
        self.generate_detailed_geometry = generate;
    }

    fn network_file(&self) -> PathBuf {
        self.output_directory
            .join(format!("{NETWORK_FILE_NAME}{XML_EXTENSION}"))
    }

    fn cleaned_network_file(&self) -> PathBuf {
        self.output_directory
            .join(format!("{NETWORK_FILE_NAME}{CLEANED_SUFFIX}{XML_EXTENSION}"))
    }
}

impl MatsimNetworkWriter {
    pub fn new(output_directory: &Path) -> Self {
        Self {
            output_directory: output_directory.to_path_buf(),
            generate_detailed_geometry: false,
        }
    }

    pub fn geometry_file(&self) -> PathBuf {
        self.output_directory.join(GEOMETRY_FILE_NAME)
    }

    pub fn transit_schedule_file(&self) -> PathBuf {
        self.output_directory.join(TRANSIT_SCHEDULE_FILE_NAME)
    }

    pub fn write(&self, network: &Network, stops: &[StopFacility]) -> Result<()> {
        std::fs::create_dir_all(&self.output_directory).with_context(|| {
            format!(
                "creating output directory {}",
                self.output_directory.display()
            )
        })?;

        network.write_xml(&self.network_file())?;
        if self.generate_detailed_geometry {
            network.write_geometry_geojson(&self.geometry_file())?;
        }
        if !stops.is_empty() {
            write_transit_stops(stops, &self.transit_schedule_file())?;
        }
        Ok(())
    }
}

/// Removes everything outside the largest strongly connected part of a MATSim network file.
pub struct MatsimNetworkCleaner;

impl NetworkCleaner for MatsimNetworkCleaner {
    fn clean(&self, input: &Path, output: &Path) -> Result<()> {
        info!("Cleaning MATSim network {}", input.display());
        clean_network_file(input, output)?;
        info!("Persisted cleaned MATSim network to {}", output.display());
        // The cleaned network only loses links, so the geometry of the original still covers it
        debug!("Detailed geometry is left as generated for the uncleaned network");
        Ok(())
    }
}

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::output::BoundingBox;

/// What a network reader lets us configure before a conversion.
pub trait ReaderSettings {
    fn set_country(&mut self, country: &str);
    fn set_input_source(&mut self, input: &str);
    fn set_bounding_box(&mut self, bbox: Option<BoundingBox>);
    /// Deactivate every highway type, except for these
    fn activate_highway_types_except(&mut self, highway_types: &[&str]);
    fn activate_railway_parser(&mut self, activate: bool);
    fn activate_pt_infrastructure(&mut self, activate: bool);
    fn activate_mode(&mut self, mode: &str);
    fn deactivate_mode(&mut self, mode: &str);
}

/// What a network writer lets us configure before a conversion.
pub trait WriterSettings {
    fn set_output_directory(&mut self, directory: &Path);
    fn set_generate_detailed_geometry(&mut self, generate: bool);

    /// Where the network ends up after a conversion
    fn network_file(&self) -> PathBuf;
    /// Where a cleaned copy of the network should go
    fn cleaned_network_file(&self) -> PathBuf;
}

pub trait Converter {
    fn convert(&mut self) -> Result<()>;
}

pub trait NetworkCleaner {
    fn clean(&self, input: &Path, output: &Path) -> Result<()>;
}

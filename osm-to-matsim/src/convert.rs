use anyhow::Result;
use log::info;

use crate::config::ResolvedConfig;
use crate::reader::OsmNetworkReader;
use crate::settings::{Converter, NetworkCleaner, WriterSettings};
use crate::writer::{MatsimNetworkCleaner, MatsimNetworkWriter};

/// Reads OSM with the reader's settings and persists the result with the writer's.
pub struct NetworkConverter {
    pub reader: OsmNetworkReader,
    pub writer: MatsimNetworkWriter,
}

impl Converter for NetworkConverter {
    fn convert(&mut self) -> Result<()> {
        let output = self.reader.read()?;
        self.writer.write(&output.network, &output.stops)
    }
}

/// Configure a reader and writer from `config`, convert, then clean if that was asked for.
pub fn execute(config: &ResolvedConfig) -> Result<()> {
    config.log_summary();
    if config.pt_infrastructure {
        info!("Running an intermodal conversion, including public transport infrastructure");
    }

    let mut reader = OsmNetworkReader::new(&config.country);
    config.configure_reader(&mut reader);
    let mut writer = MatsimNetworkWriter::new(&config.output_directory);
    config.configure_writer(&mut writer);

    let mut converter = NetworkConverter { reader, writer };
    converter.convert()?;

    if config.clean_network {
        create_cleaned_network(&converter.writer, &MatsimNetworkCleaner)?;
    }
    Ok(())
}

/// Clean the network the writer produced into its `_cleaned` sibling.
pub fn create_cleaned_network(
    writer: &impl WriterSettings,
    cleaner: &impl NetworkCleaner,
) -> Result<()> {
    cleaner.clean(&writer.network_file(), &writer.cleaned_network_file())
}

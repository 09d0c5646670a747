//! Convert OpenStreetMap data into a MATSim network, configured by `--key value` command line
//! options.

mod config;
mod convert;
mod error;
mod fidelity;
mod input;
mod modes;
mod options;
mod output;
mod rail;
mod reader;
mod settings;
mod writer;

pub use config::{ResolvedConfig, RunContext};
pub use convert::{create_cleaned_network, execute, NetworkConverter};
pub use error::{parse_yes_no, ConfigError};
pub use fidelity::{resolve_fidelity, Fidelity};
pub use input::{resolve_country, resolve_input_source, GLOBAL_COUNTRY};
pub use modes::{classify_mode, resolve_mode_overrides, ModeKind, ModeSets};
pub use options::OptionMap;
pub use output::{
    resolve_bounding_box, resolve_clean_network_flag, resolve_output_directory, BoundingBox,
};
pub use rail::{
    resolve_default_rail_activation, resolve_pt_infrastructure_flag, resolve_rail_activation,
};
pub use reader::{OsmNetworkReader, OsmWay, ReadOutput, ScrapedOsm};
pub use settings::{Converter, NetworkCleaner, ReaderSettings, WriterSettings};
pub use writer::{MatsimNetworkCleaner, MatsimNetworkWriter};

/// Every option the command line understands, for `--help`
pub const OPTIONS_HELP: &str = "\
Options are given as --<key> <value>; keys are case-insensitive.

  --input <path or URL>        Required. A local .osm.pbf/.osm file, or a URL to stream
  --country <name>             Used for locale defaults. Default: Global
  --fidelity <level>           coarse, medium or fine. Default: medium
  --rail <yes|no>              Parse railways, activating light_rail, train and tram.
                               Default: same as --ptinfra
  --ptinfra <yes|no>           Parse public transport stops, stations and platforms, also
                               activating bus. Default: no
  --bbox <minX,minY,maxX,maxY> Only keep links that intersect this box. Default: everything
  --addmode <modes>            Comma separated OSM modes to activate
  --rmmode <modes>             Comma separated OSM modes to deactivate; wins over --addmode
  --output <directory>         Where to write network.xml. Default: the working directory
  --clean <yes|no>             Also write network_cleaned.xml with unreachable links removed.
                               Default: yes
  --help                       Print this and exit
";

#[cfg(test)]
mod tests;

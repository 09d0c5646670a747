use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::error::ConfigError;
use crate::fidelity::{resolve_fidelity, Fidelity};
use crate::input::{resolve_country, resolve_input_source};
use crate::modes::{
    resolve_mode_overrides, ModeSets, DEFAULT_INTERMODAL_ROAD_MODES, DEFAULT_RAIL_MODES,
    DEFAULT_ROAD_MODES, RAIL_MODES, ROAD_MODES,
};
use crate::options::OptionMap;
use crate::output::{
    resolve_bounding_box, resolve_clean_network_flag, resolve_output_directory, BoundingBox,
};
use crate::rail::{resolve_pt_infrastructure_flag, resolve_rail_activation};
use crate::settings::{ReaderSettings, WriterSettings};

/// State captured once at startup and handed to everything that needs it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunContext {
    /// Relative inputs are resolved against this, and output goes here by default
    pub working_dir: PathBuf,
}

impl RunContext {
    pub fn capture() -> Result<Self> {
        let working_dir =
            std::env::current_dir().context("couldn't determine the working directory")?;
        Ok(Self { working_dir })
    }
}

/// Everything a conversion needs, validated and with defaults filled in.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedConfig {
    pub input: String,
    pub country: String,
    pub fidelity: Fidelity,
    pub modes: ModeSets,
    pub rail: bool,
    pub pt_infrastructure: bool,
    pub bounding_box: Option<BoundingBox>,
    pub output_directory: PathBuf,
    pub clean_network: bool,
}

impl ResolvedConfig {
    pub fn resolve(options: &OptionMap, context: &RunContext) -> Result<Self, ConfigError> {
        let country = resolve_country(options);
        let input = resolve_input_source(options, &context.working_dir)?;
        let bounding_box = resolve_bounding_box(options)?;
        let pt_infrastructure = resolve_pt_infrastructure_flag(options)?;
        let rail = resolve_rail_activation(options)?;
        let fidelity = resolve_fidelity(options)?;

        let no_rail: &[&str] = &[];
        let base = ModeSets::new(
            if pt_infrastructure {
                DEFAULT_INTERMODAL_ROAD_MODES
            } else {
                DEFAULT_ROAD_MODES
            },
            if rail { DEFAULT_RAIL_MODES } else { no_rail },
        );
        let modes = resolve_mode_overrides(options, base);
        if !rail && !modes.rail.is_empty() {
            warn!(
                "Rail modes {:?} have no effect unless rail is parsed, try --rail yes",
                modes.rail
            );
        }

        let output_directory = resolve_output_directory(options, &context.working_dir);
        let clean_network = resolve_clean_network_flag(options)?;

        Ok(Self {
            input,
            country,
            fidelity,
            modes,
            rail,
            pt_infrastructure,
            bounding_box,
            output_directory,
            clean_network,
        })
    }

    pub fn configure_reader(&self, settings: &mut impl ReaderSettings) {
        settings.set_country(&self.country);
        settings.set_input_source(&self.input);
        settings.set_bounding_box(self.bounding_box);
        settings.activate_railway_parser(self.rail);
        settings.activate_pt_infrastructure(self.pt_infrastructure);
        settings.activate_highway_types_except(self.fidelity.highway_types());
        // Override whatever modes the reader starts with
        for mode in ROAD_MODES.iter().chain(RAIL_MODES) {
            if self.modes.contains(mode) {
                settings.activate_mode(mode);
            } else {
                settings.deactivate_mode(mode);
            }
        }
    }

    pub fn configure_writer(&self, settings: &mut impl WriterSettings) {
        // Always on, so the output can be drawn with real road shapes
        settings.set_generate_detailed_geometry(true);
        settings.set_output_directory(&self.output_directory);
    }

    pub fn log_summary(&self) {
        info!("Input: {}", self.input);
        info!("Country: {}", self.country);
        info!(
            "Fidelity: {} ({} highway types)",
            self.fidelity,
            self.fidelity.highway_types().len()
        );
        let modes: Vec<&str> = self.modes.iter().collect();
        info!("Modes: {}", modes.join(", "));
        info!(
            "Rail: {}, public transport infrastructure: {}",
            yes_no(self.rail),
            yes_no(self.pt_infrastructure)
        );
        if let Some(bbox) = &self.bounding_box {
            info!(
                "Bounding box: {}, {}, {}, {}",
                bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y
            );
        }
        info!("Output directory: {}", self.output_directory.display());
        info!("Clean network: {}", yes_no(self.clean_network));
    }
}

fn yes_no(x: bool) -> &'static str {
    if x {
        "yes"
    } else {
        "no"
    }
}

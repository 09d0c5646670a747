use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::options::OptionMap;

pub const FIDELITY_KEY: &str = "fidelity";

/// How much of the road network to keep, from national connectors only up to local streets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Fidelity {
    Coarse,
    #[default]
    Medium,
    Fine,
}

pub const FIDELITY_VALUES: &[&str] = &["coarse", "medium", "fine"];

// Ordered so every fidelity keeps a prefix of this list; that makes the tiers nest by
// construction.
const HIGHWAY_TYPES: [&str; 15] = [
    // coarse
    "motorway",
    "motorway_link",
    "trunk",
    "trunk_link",
    "primary",
    "primary_link",
    // medium
    "secondary",
    "secondary_link",
    // fine
    "tertiary",
    "tertiary_link",
    "residential",
    "living_street",
    "service",
    "unclassified",
    "road",
];

impl Fidelity {
    /// The OSM highway types kept at this level of detail
    pub fn highway_types(self) -> &'static [&'static str] {
        match self {
            Fidelity::Coarse => &HIGHWAY_TYPES[..6],
            Fidelity::Medium => &HIGHWAY_TYPES[..8],
            Fidelity::Fine => &HIGHWAY_TYPES,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Fidelity::Coarse => "coarse",
            Fidelity::Medium => "medium",
            Fidelity::Fine => "fine",
        }
    }
}

impl fmt::Display for Fidelity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Fidelity {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "coarse" => Ok(Fidelity::Coarse),
            "medium" => Ok(Fidelity::Medium),
            "fine" => Ok(Fidelity::Fine),
            _ => Err(ConfigError::UnknownOptionValue {
                key: FIDELITY_KEY,
                value: value.to_string(),
                allowed: FIDELITY_VALUES,
            }),
        }
    }
}

/// Medium when not given
pub fn resolve_fidelity(options: &OptionMap) -> Result<Fidelity, ConfigError> {
    match options.non_blank(FIDELITY_KEY) {
        Some(value) => value.parse(),
        None => Ok(Fidelity::default()),
    }
}

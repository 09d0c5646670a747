use std::collections::BTreeSet;

use log::warn;

use crate::options::OptionMap;

pub const ADD_MODE_KEY: &str = "addmode";
pub const REMOVE_MODE_KEY: &str = "rmmode";

/// OSM access tags for modes that travel on highways
pub const ROAD_MODES: &[&str] = &[
    "foot",
    "bicycle",
    "motor_car",
    "motorcycle",
    "moped",
    "mofa",
    "bus",
    "goods",
    "hgv",
    "motor_vehicle",
];

/// OSM modes that travel on railways
pub const RAIL_MODES: &[&str] = &[
    "train",
    "tram",
    "light_rail",
    "subway",
    "monorail",
    "funicular",
    "narrow_gauge",
];

pub const DEFAULT_ROAD_MODES: &[&str] = &["motor_car"];
/// When public transport infrastructure is parsed, buses need the road network too
pub const DEFAULT_INTERMODAL_ROAD_MODES: &[&str] = &["motor_car", "bus"];
pub const DEFAULT_RAIL_MODES: &[&str] = &["light_rail", "train", "tram"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeKind {
    Road,
    Rail,
}

pub fn classify_mode(tag: &str) -> Option<ModeKind> {
    if ROAD_MODES.contains(&tag) {
        Some(ModeKind::Road)
    } else if RAIL_MODES.contains(&tag) {
        Some(ModeKind::Rail)
    } else {
        None
    }
}

/// Modes the reader should keep, split by the kind of infrastructure they use
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModeSets {
    pub road: BTreeSet<String>,
    pub rail: BTreeSet<String>,
}

impl ModeSets {
    pub fn new(road: &[&str], rail: &[&str]) -> Self {
        Self {
            road: road.iter().map(|x| x.to_string()).collect(),
            rail: rail.iter().map(|x| x.to_string()).collect(),
        }
    }

    fn set_for(&mut self, kind: ModeKind) -> &mut BTreeSet<String> {
        match kind {
            ModeKind::Road => &mut self.road,
            ModeKind::Rail => &mut self.rail,
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.road.contains(tag) || self.rail.contains(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.road.iter().chain(self.rail.iter()).map(|x| x.as_str())
    }
}

/// Apply `--addmode` then `--rmmode` on top of the defaults. Removals happen after every
/// addition, so a mode named in both lists ends up removed.
pub fn resolve_mode_overrides(options: &OptionMap, base: ModeSets) -> ModeSets {
    let mut modes = base;

    for tag in mode_list(options, ADD_MODE_KEY) {
        match classify_mode(tag) {
            Some(kind) => {
                modes.set_for(kind).insert(tag.to_string());
            }
            None => warn!("Unsupported mode {tag} in --{ADD_MODE_KEY}, ignoring it"),
        }
    }

    for tag in mode_list(options, REMOVE_MODE_KEY) {
        match classify_mode(tag) {
            Some(kind) => {
                modes.set_for(kind).remove(tag);
            }
            None => warn!("Unsupported mode {tag} in --{REMOVE_MODE_KEY}, ignoring it"),
        }
    }

    modes
}

fn mode_list<'a>(options: &'a OptionMap, key: &str) -> impl Iterator<Item = &'a str> {
    options
        .get(key)
        .unwrap_or_default()
        .split(',')
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
}

use std::collections::{BTreeSet, HashMap};

use anyhow::{anyhow, Context, Result};
use geo::{coord, line_measures::LengthMeasurable, Coord, Haversine, Intersects, LineString, Rect};
use log::info;
use osm_reader::Element;

use matsim_network::{Link, Network, NodeID, StopFacility};

use crate::fidelity::Fidelity;
use crate::input::{is_remote, GLOBAL_COUNTRY};
use crate::modes::{DEFAULT_ROAD_MODES, ROAD_MODES};
use crate::output::BoundingBox;
use crate::settings::ReaderSettings;

/// Reads OSM PBF or XML into a MATSim network, keeping the highway types, modes and area it's
/// configured with.
#[derive(Clone, Debug)]
pub struct OsmNetworkReader {
    country: String,
    input: Option<String>,
    bounding_box: Option<BoundingBox>,
    highway_types: BTreeSet<String>,
    railway_parser: bool,
    pt_infrastructure: bool,
    modes: BTreeSet<String>,
}

/// What a conversion produces
pub struct ReadOutput {
    pub network: Network,
    pub stops: Vec<StopFacility>,
}

impl Default for OsmNetworkReader {
    fn default() -> Self {
        Self {
            country: GLOBAL_COUNTRY.to_string(),
            input: None,
            bounding_box: None,
            highway_types: to_set(Fidelity::default().highway_types()),
            railway_parser: false,
            pt_infrastructure: false,
            modes: to_set(DEFAULT_ROAD_MODES),
        }
    }
}

impl ReaderSettings for OsmNetworkReader {
    fn set_country(&mut self, country: &str) {
        self.country = country.to_string();
    }

    fn set_input_source(&mut self, input: &str) {
        self.input = Some(input.to_string());
    }

    fn set_bounding_box(&mut self, bbox: Option<BoundingBox>) {
        self.bounding_box = bbox;
    }

    fn activate_highway_types_except(&mut self, highway_types: &[&str]) {
        self.highway_types = to_set(highway_types);
    }

    fn activate_railway_parser(&mut self, activate: bool) {
        self.railway_parser = activate;
    }

    fn activate_pt_infrastructure(&mut self, activate: bool) {
        self.pt_infrastructure = activate;
    }

    fn activate_mode(&mut self, mode: &str) {
        self.modes.insert(mode.to_string());
    }

    fn deactivate_mode(&mut self, mode: &str) {
        self.modes.remove(mode);
    }
}

impl OsmNetworkReader {
    pub fn new(country: &str) -> Self {
        let mut reader = Self::default();
        reader.set_country(country);
        reader
    }

    pub fn read(&self) -> Result<ReadOutput> {
        let input = self
            .input
            .as_deref()
            .ok_or_else(|| anyhow!("no input source configured for the OSM reader"))?;
        let input_bytes = load_input(input)?;

        info!("Scraping OSM data");
        let scraped = self.scrape_elements(&input_bytes)?;
        info!(
            "Got {} nodes and {} ways. Splitting into links",
            scraped.nodes.len(),
            scraped.ways.len(),
        );
        Ok(self.build(scraped))
    }

    pub(crate) fn scrape_elements(&self, input_bytes: &[u8]) -> Result<ScrapedOsm> {
        let mut scraped = ScrapedOsm::default();

        osm_reader::parse(input_bytes, |elem| match elem {
            Element::Node {
                id, lon, lat, tags, ..
            } => {
                scraped.nodes.insert(id.0, Coord { x: lon, y: lat });
                if self.pt_infrastructure {
                    let tags = keep_tags(|key| tags.get(key).map(|x| x.to_string()));
                    if is_stop(&tags) {
                        scraped.stop_nodes.push((id.0, tags));
                    }
                }
            }
            Element::Way {
                id, node_ids, tags, ..
            } => {
                if tags.contains_key("highway") || tags.contains_key("railway") {
                    scraped.ways.push(OsmWay {
                        id: id.0,
                        node_ids: node_ids.into_iter().map(|x| x.0).collect(),
                        tags: keep_tags(|key| tags.get(key).map(|x| x.to_string())),
                    });
                }
            }
            _ => {}
        })?;

        Ok(scraped)
    }

    /// Turn the scraped elements into MATSim nodes and links, plus stop facilities.
    pub fn build(&self, scraped: ScrapedOsm) -> ReadOutput {
        let ScrapedOsm {
            nodes,
            ways,
            stop_nodes,
        } = scraped;
        let boundary = self.bounding_box.map(|bbox| {
            Rect::new(
                coord! { x: bbox.min_x, y: bbox.min_y },
                coord! { x: bbox.max_x, y: bbox.max_y },
            )
        });

        let kept: Vec<(OsmWay, LinkProfile)> = ways
            .into_iter()
            .filter_map(|way| {
                let profile = self.profile(&way.tags)?;
                Some((way, profile))
            })
            .collect();

        // Count how many ways reference each node
        let mut node_counter: HashMap<i64, usize> = HashMap::new();
        for (way, _) in &kept {
            for node in &way.node_ids {
                *node_counter.entry(*node).or_insert(0) += 1;
            }
        }

        let mut network = Network::new(Some(format!("OSM network, {}", self.country)));
        let mut node_id_lookup: HashMap<i64, NodeID> = HashMap::new();

        for (way, profile) in kept {
            // Nodes outside of an extract can still be referenced
            let way_nodes: Vec<i64> = way
                .node_ids
                .into_iter()
                .filter(|node| nodes.contains_key(node))
                .collect();
            if way_nodes.len() < 2 {
                continue;
            }

            let mut node1 = way_nodes[0];
            let mut pts = Vec::new();
            let mut segment = 0;
            let num_nodes = way_nodes.len();
            for (idx, node) in way_nodes.into_iter().enumerate() {
                pts.push(nodes[&node]);
                // Links start/end at intersections between two ways. The endpoints of the way
                // also count as intersections.
                let is_endpoint = idx == 0
                    || idx == num_nodes - 1
                    || node_counter.get(&node).copied().unwrap_or(0) > 1;
                if is_endpoint && pts.len() > 1 {
                    let geometry = LineString::new(std::mem::take(&mut pts));
                    let in_bounds = boundary
                        .map(|rect| rect.intersects(&geometry))
                        .unwrap_or(true);
                    if in_bounds {
                        let from =
                            add_node(&mut network, &mut node_id_lookup, node1, geometry.0[0]);
                        let to = add_node(&mut network, &mut node_id_lookup, node, nodes[&node]);
                        add_links(&mut network, &profile, way.id, segment, from, to, geometry);
                        segment += 1;
                    }

                    // Start the next link
                    node1 = node;
                    pts.push(nodes[&node]);
                }
            }
        }
        info!(
            "{} nodes and {} links total",
            network.nodes.len(),
            network.links.len()
        );

        let mut stops = Vec::new();
        if self.pt_infrastructure {
            for (id, tags) in stop_nodes {
                let Some(pt) = nodes.get(&id) else {
                    continue;
                };
                if boundary.map(|rect| rect.intersects(pt)).unwrap_or(true) {
                    stops.push(StopFacility {
                        id: id.to_string(),
                        x: pt.x,
                        y: pt.y,
                        name: tags.get("name").cloned(),
                    });
                }
            }
            info!("{} public transport stop facilities", stops.len());
        }

        ReadOutput { network, stops }
    }

    /// How to turn a way into links, or `None` if it shouldn't be part of the network
    fn profile(&self, tags: &Tags) -> Option<LinkProfile> {
        if let Some(highway) = tags.get("highway") {
            if !self.highway_types.contains(highway) {
                return None;
            }
            let matsim_modes: BTreeSet<String> = self
                .modes
                .iter()
                .filter(|mode| ROAD_MODES.contains(&mode.as_str()))
                .filter(|mode| road_mode_allowed(tags, mode))
                .map(|mode| matsim_road_mode(mode).to_string())
                .collect();
            if matsim_modes.is_empty() {
                return None;
            }
            return Some(road_profile(highway, tags, matsim_modes));
        }

        if !self.railway_parser {
            return None;
        }
        let mode = rail_mode(tags.get("railway")?)?;
        if !self.modes.contains(mode) {
            return None;
        }
        Some(rail_profile(mode))
    }
}

/// Only the tags needed to build links and stops
type Tags = HashMap<String, String>;

#[derive(Default)]
pub struct ScrapedOsm {
    pub nodes: HashMap<i64, Coord>,
    pub ways: Vec<OsmWay>,
    pub stop_nodes: Vec<(i64, Tags)>,
}

pub struct OsmWay {
    pub id: i64,
    pub node_ids: Vec<i64>,
    pub tags: Tags,
}

fn load_input(input: &str) -> Result<Vec<u8>> {
    if is_remote(input) {
        info!("Downloading {input}");
        let response = reqwest::blocking::get(input)
            .and_then(|resp| resp.error_for_status())
            .with_context(|| format!("requesting {input}"))?;
        let bytes = response
            .bytes()
            .with_context(|| format!("downloading {input}"))?;
        return Ok(bytes.to_vec());
    }
    std::fs::read(input).with_context(|| format!("reading {input}"))
}

const KEPT_TAGS: &[&str] = &[
    "highway",
    "railway",
    "public_transport",
    "name",
    "oneway",
    "junction",
    "maxspeed",
    "lanes",
    "access",
    "motorcar",
    "motorcycle",
    "motor_vehicle",
    "moped",
    "mofa",
    "bus",
    "goods",
    "hgv",
    "foot",
    "bicycle",
];

fn keep_tags(get: impl Fn(&str) -> Option<String>) -> Tags {
    let mut tags = Tags::new();
    for key in KEPT_TAGS {
        if let Some(value) = get(key) {
            tags.insert(key.to_string(), value);
        }
    }
    tags
}

fn tag<'a>(tags: &'a Tags, key: &str) -> Option<&'a str> {
    tags.get(key).map(|x| x.as_str())
}

fn is_stop(tags: &Tags) -> bool {
    matches!(tag(tags, "highway"), Some("bus_stop"))
        || matches!(
            tag(tags, "railway"),
            Some("station" | "halt" | "tram_stop" | "stop")
        )
        || matches!(
            tag(tags, "public_transport"),
            Some("platform" | "stop_position" | "station")
        )
}

/// The OSM access key for a mode
fn access_key(mode: &str) -> &str {
    match mode {
        "motor_car" => "motorcar",
        x => x,
    }
}

fn road_mode_allowed(tags: &Tags, mode: &str) -> bool {
    match tag(tags, access_key(mode)) {
        Some(value) => value != "no",
        None => !matches!(tag(tags, "access"), Some("no" | "private")),
    }
}

fn matsim_road_mode(mode: &str) -> &'static str {
    match mode {
        "bus" => "pt",
        _ => "car",
    }
}

fn rail_mode(railway: &str) -> Option<&'static str> {
    match railway {
        "rail" => Some("train"),
        "tram" => Some("tram"),
        "light_rail" => Some("light_rail"),
        "subway" => Some("subway"),
        "monorail" => Some("monorail"),
        "funicular" => Some("funicular"),
        "narrow_gauge" => Some("narrow_gauge"),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Direction {
    Both,
    Forwards,
    Backwards,
}

#[derive(Clone, Debug)]
struct LinkProfile {
    direction: Direction,
    /// Meters per second
    freespeed: f64,
    /// Vehicles per hour per lane
    lane_capacity: f64,
    /// Per direction
    lanes: f64,
    modes: BTreeSet<String>,
}

fn road_profile(highway: &str, tags: &Tags, modes: BTreeSet<String>) -> LinkProfile {
    // km/h, vehicles per hour per lane, lanes per direction
    let (speed, lane_capacity, default_lanes) = match highway {
        "motorway" => (120.0, 2000.0, 2.0),
        "motorway_link" => (80.0, 1500.0, 1.0),
        "trunk" => (100.0, 2000.0, 2.0),
        "trunk_link" => (70.0, 1500.0, 1.0),
        "primary" => (80.0, 1500.0, 1.0),
        "primary_link" => (60.0, 1500.0, 1.0),
        "secondary" => (60.0, 1000.0, 1.0),
        "secondary_link" => (50.0, 1000.0, 1.0),
        "tertiary" | "unclassified" | "road" => (50.0, 600.0, 1.0),
        "tertiary_link" => (40.0, 600.0, 1.0),
        "residential" => (30.0, 600.0, 1.0),
        "service" => (20.0, 300.0, 1.0),
        "living_street" => (10.0, 300.0, 1.0),
        _ => (30.0, 600.0, 1.0),
    };

    let direction = match tag(tags, "oneway") {
        Some("yes" | "1" | "true") => Direction::Forwards,
        Some("-1" | "reverse") => Direction::Backwards,
        Some("no") => Direction::Both,
        _ => {
            if highway == "motorway" || tag(tags, "junction") == Some("roundabout") {
                Direction::Forwards
            } else {
                Direction::Both
            }
        }
    };

    let speed = tag(tags, "maxspeed").and_then(parse_maxspeed).unwrap_or(speed);
    let lanes = match tag(tags, "lanes").and_then(|x| x.parse::<f64>().ok()) {
        Some(total) if direction == Direction::Both => (total / 2.0).floor().max(1.0),
        Some(total) => total.max(1.0),
        None => default_lanes,
    };

    LinkProfile {
        direction,
        freespeed: speed / 3.6,
        lane_capacity,
        lanes,
        modes,
    }
}

fn rail_profile(mode: &str) -> LinkProfile {
    let speed = match mode {
        "train" => 100.0,
        "light_rail" => 70.0,
        "tram" => 50.0,
        _ => 80.0,
    };
    LinkProfile {
        direction: Direction::Both,
        freespeed: speed / 3.6,
        lane_capacity: 9999.0,
        lanes: 1.0,
        modes: BTreeSet::from(["pt".to_string()]),
    }
}

/// km/h, from values like "50" or "30 mph"
fn parse_maxspeed(value: &str) -> Option<f64> {
    let value = value.trim();
    if let Some(mph) = value.strip_suffix("mph") {
        return mph.trim().parse::<f64>().ok().map(|x| x * 1.609344);
    }
    value.parse().ok()
}

fn add_node(
    network: &mut Network,
    lookup: &mut HashMap<i64, NodeID>,
    osm_id: i64,
    pt: Coord,
) -> NodeID {
    *lookup
        .entry(osm_id)
        .or_insert_with(|| network.add_node(osm_id.to_string(), pt.x, pt.y))
}

fn add_links(
    network: &mut Network,
    profile: &LinkProfile,
    way_id: i64,
    segment: usize,
    from: NodeID,
    to: NodeID,
    geometry: LineString,
) {
    let length = geometry.length(&Haversine);
    let make_link = |id: String, from: NodeID, to: NodeID, geometry: LineString| Link {
        id,
        from,
        to,
        length,
        freespeed: profile.freespeed,
        capacity: profile.lane_capacity * profile.lanes,
        permlanes: profile.lanes,
        modes: profile.modes.clone(),
        geometry: Some(geometry),
    };

    if profile.direction != Direction::Backwards {
        network.add_link(make_link(
            format!("{way_id}_{segment}"),
            from,
            to,
            geometry.clone(),
        ));
    }
    if profile.direction != Direction::Forwards {
        let mut reversed = geometry;
        reversed.0.reverse();
        network.add_link(make_link(
            format!("{way_id}_{segment}_r"),
            to,
            from,
            reversed,
        ));
    }
}

fn to_set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|x| x.to_string()).collect()
}

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use geo::Coord;

use crate::*;

fn context() -> RunContext {
    RunContext {
        working_dir: PathBuf::from("/nonexistent/working/dir"),
    }
}

fn options(pairs: &[(&str, &str)]) -> OptionMap {
    pairs.iter().copied().collect()
}

fn resolve(pairs: &[(&str, &str)]) -> Result<ResolvedConfig, ConfigError> {
    let mut all = vec![("input", "https://example.com/map.osm")];
    all.extend_from_slice(pairs);
    ResolvedConfig::resolve(&options(&all), &context())
}

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|x| x.to_string()).collect()
}

#[test]
fn test_option_map_from_args() {
    let options = OptionMap::from_args([
        "stray",
        "--Input",
        "map.osm",
        "--HELP",
        "--bbox",
        "1,2",
        "3,4",
        "--country=Germany",
        "--fidelity",
        "coarse",
        "--fidelity",
        "fine",
    ]);
    assert_eq!(options.len(), 5);
    assert_eq!(options.get("input"), Some("map.osm"));
    assert!(options.contains("help"));
    assert_eq!(options.get("help"), Some(""));
    assert_eq!(options.non_blank("help"), None);
    assert_eq!(options.get("bbox"), Some("1,2 3,4"));
    assert_eq!(options.get("country"), Some("Germany"));
    assert_eq!(options.get("fidelity"), Some("fine"));
    assert!(!options.contains("stray"));
}

#[test]
fn test_fidelity_tiers_nest() {
    let coarse = Fidelity::Coarse.highway_types();
    let medium = Fidelity::Medium.highway_types();
    let fine = Fidelity::Fine.highway_types();
    assert_eq!(coarse.len(), 6);
    assert_eq!(medium.len(), 8);
    assert_eq!(fine.len(), 15);
    assert!(coarse.iter().all(|x| medium.contains(x)));
    assert!(medium.iter().all(|x| fine.contains(x)));
    assert!(medium.contains(&"secondary_link"));
    assert!(!medium.contains(&"residential"));
    assert!(fine.contains(&"road"));
}

#[test]
fn test_unknown_fidelity() {
    let err = resolve_fidelity(&options(&[("fidelity", "ultra")])).unwrap_err();
    assert_eq!(
        err,
        ConfigError::UnknownOptionValue {
            key: "fidelity",
            value: "ultra".to_string(),
            allowed: &["coarse", "medium", "fine"],
        }
    );
    assert!(err.to_string().contains("coarse, medium, fine"));
}

#[test]
fn test_blank_fidelity_is_medium() {
    assert_eq!(
        resolve_fidelity(&options(&[("fidelity", "  ")])),
        Ok(Fidelity::Medium)
    );
    assert_eq!(
        resolve_fidelity(&options(&[("fidelity", "fine")])),
        Ok(Fidelity::Fine)
    );
}

#[test]
fn test_defaults() {
    let config = resolve(&[]).unwrap();
    assert_eq!(
        config,
        ResolvedConfig {
            input: "https://example.com/map.osm".to_string(),
            country: "Global".to_string(),
            fidelity: Fidelity::Medium,
            modes: ModeSets {
                road: set(&["motor_car"]),
                rail: BTreeSet::new(),
            },
            rail: false,
            pt_infrastructure: false,
            bounding_box: None,
            output_directory: PathBuf::from("/nonexistent/working/dir"),
            clean_network: true,
        }
    );
}

#[test]
fn test_resolve_twice() {
    let pairs = [
        ("country", "Australia"),
        ("fidelity", "coarse"),
        ("addmode", "bus,tram"),
        ("bbox", "144.9,-37.9,145.0,-37.8"),
    ];
    assert_eq!(resolve(&pairs), resolve(&pairs));
}

#[test]
fn test_missing_input() {
    let err = ResolvedConfig::resolve(&options(&[("fidelity", "fine")]), &context()).unwrap_err();
    assert_eq!(err, ConfigError::MissingRequiredOption("input"));
    assert_eq!(
        resolve_input_source(&options(&[("input", "")]), Path::new("/")),
        Err(ConfigError::MissingRequiredOption("input"))
    );
}

#[test]
fn test_input_source() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    std::fs::write(dir.join("map.osm"), "<osm/>").unwrap();
    let absolute = std::fs::canonicalize(dir.join("map.osm")).unwrap();

    // Relative to the working directory
    assert_eq!(
        resolve_input_source(&options(&[("input", "map.osm")]), dir),
        Ok(absolute.display().to_string())
    );

    let file_url = url::Url::from_file_path(dir.join("map.osm")).unwrap();
    assert_eq!(
        resolve_input_source(&options(&[("input", file_url.as_str())]), dir),
        Ok(dir.join("map.osm").display().to_string())
    );

    // Things that aren't local files stay as they are
    for input in ["https://example.com/map.osm", "missing.osm.pbf"] {
        assert_eq!(
            resolve_input_source(&options(&[("input", input)]), dir),
            Ok(input.to_string())
        );
    }
}

#[test]
fn test_country() {
    assert_eq!(resolve_country(&options(&[])), "Global");
    assert_eq!(resolve_country(&options(&[("country", " ")])), "Global");
    assert_eq!(
        resolve_country(&options(&[("country", "Germany")])),
        "Germany"
    );
}

#[test]
fn test_bounding_box() {
    assert_eq!(resolve_bounding_box(&options(&[])), Ok(None));
    assert_eq!(resolve_bounding_box(&options(&[("bbox", "")])), Ok(None));
    // Ordinates pass through in the given order, even if min > max
    assert_eq!(
        resolve_bounding_box(&options(&[("bbox", "13.47, 52.5, 13.46,52.51")])),
        Ok(Some(BoundingBox {
            min_x: 13.47,
            min_y: 52.5,
            max_x: 13.46,
            max_y: 52.51,
        }))
    );
    for raw in ["1,2,3", "1,2,3,4,5", "1,2,three,4", "1 2 3 4"] {
        assert_eq!(
            resolve_bounding_box(&options(&[("bbox", raw)])),
            Err(ConfigError::MalformedBoundingBox(raw.to_string())),
            "{raw}"
        );
    }
}

#[test]
fn test_pt_infrastructure_activates_rail() {
    let config = resolve(&[("ptinfra", "yes")]).unwrap();
    assert!(config.pt_infrastructure);
    assert!(config.rail);
    assert_eq!(config.modes.rail, set(&["light_rail", "train", "tram"]));
    assert_eq!(config.modes.road, set(&["bus", "motor_car"]));
}

#[test]
fn test_explicit_rail_beats_pt_default() {
    let config = resolve(&[("rail", "no"), ("ptinfra", "yes")]).unwrap();
    assert!(!config.rail);
    assert!(config.pt_infrastructure);
    assert!(config.modes.rail.is_empty());

    let config = resolve(&[("rail", "yes")]).unwrap();
    assert!(config.rail);
    assert!(!config.pt_infrastructure);
    assert_eq!(config.modes.rail, set(&["light_rail", "train", "tram"]));
}

#[test]
fn test_rail_default_follows_pt() {
    assert_eq!(resolve_default_rail_activation(&options(&[])), Ok(false));
    assert_eq!(
        resolve_default_rail_activation(&options(&[("ptinfra", "yes")])),
        Ok(true)
    );
    assert_eq!(
        resolve_rail_activation(&options(&[("rail", " "), ("ptinfra", "yes")])),
        Ok(true)
    );
}

#[test]
fn test_yes_no_values_are_strict() {
    for (key, value) in [
        ("rail", "maybe"),
        ("ptinfra", "true"),
        ("clean", "YES"),
        ("clean_network", "false"),
    ] {
        let err = resolve(&[(key, value)]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownOptionValue {
                key,
                value: value.to_string(),
                allowed: &["yes", "no"],
            }
        );
    }
}

#[test]
fn test_clean_flag() {
    assert_eq!(resolve_clean_network_flag(&options(&[])), Ok(true));
    assert_eq!(resolve_clean_network_flag(&options(&[("clean", "")])), Ok(true));
    assert_eq!(
        resolve_clean_network_flag(&options(&[("clean", "no")])),
        Ok(false)
    );
    assert_eq!(
        resolve_clean_network_flag(&options(&[("clean_network", "no")])),
        Ok(false)
    );
    assert_eq!(
        resolve_clean_network_flag(&options(&[("clean", "yes"), ("clean_network", "no")])),
        Ok(true)
    );
}

#[test]
fn test_output_directory() {
    let default = Path::new("/somewhere");
    assert_eq!(
        resolve_output_directory(&options(&[]), default),
        PathBuf::from("/somewhere")
    );
    assert_eq!(
        resolve_output_directory(&options(&[("output", "./output/Germany")]), default),
        PathBuf::from("./output/Germany")
    );
}

#[test]
fn test_remove_mode_wins() {
    let base = ModeSets::new(&["motor_car"], &["light_rail", "train", "tram"]);
    let modes = resolve_mode_overrides(
        &options(&[("addmode", "bus, tram,,subway"), ("rmmode", "bus,tram")]),
        base.clone(),
    );
    assert_eq!(modes.road, set(&["motor_car"]));
    assert_eq!(modes.rail, set(&["light_rail", "subway", "train"]));

    // Argument order doesn't matter either
    let options = OptionMap::from_args(["--rmmode", "motor_car", "--addmode", "motor_car,bicycle"]);
    let modes = resolve_mode_overrides(&options, base);
    assert_eq!(modes.road, set(&["bicycle"]));
}

#[test]
fn test_unsupported_modes_are_skipped() {
    let modes = resolve_mode_overrides(
        &options(&[("addmode", "hovercraft,bicycle"), ("rmmode", "teleporter")]),
        ModeSets::new(&["motor_car"], &[]),
    );
    assert_eq!(modes.road, set(&["bicycle", "motor_car"]));
    assert!(modes.rail.is_empty());
    assert_eq!(classify_mode("tram"), Some(ModeKind::Rail));
    assert_eq!(classify_mode("hgv"), Some(ModeKind::Road));
    assert_eq!(classify_mode("hovercraft"), None);
}

#[derive(Default)]
struct RecordingReader {
    calls: Vec<String>,
}

impl ReaderSettings for RecordingReader {
    fn set_country(&mut self, country: &str) {
        self.calls.push(format!("country {country}"));
    }
    fn set_input_source(&mut self, input: &str) {
        self.calls.push(format!("input {input}"));
    }
    fn set_bounding_box(&mut self, bbox: Option<BoundingBox>) {
        self.calls.push(format!("bbox {}", bbox.is_some()));
    }
    fn activate_highway_types_except(&mut self, highway_types: &[&str]) {
        self.calls.push(format!("highways {}", highway_types.len()));
    }
    fn activate_railway_parser(&mut self, activate: bool) {
        self.calls.push(format!("rail {activate}"));
    }
    fn activate_pt_infrastructure(&mut self, activate: bool) {
        self.calls.push(format!("ptinfra {activate}"));
    }
    fn activate_mode(&mut self, mode: &str) {
        self.calls.push(format!("+{mode}"));
    }
    fn deactivate_mode(&mut self, mode: &str) {
        self.calls.push(format!("-{mode}"));
    }
}

#[test]
fn test_configure_reader() {
    let config = resolve(&[
        ("country", "Australia"),
        ("fidelity", "fine"),
        ("rail", "yes"),
        ("rmmode", "train"),
    ])
    .unwrap();
    let mut reader = RecordingReader::default();
    config.configure_reader(&mut reader);
    assert_eq!(
        reader.calls,
        vec![
            "country Australia",
            "input https://example.com/map.osm",
            "bbox false",
            "rail true",
            "ptinfra false",
            "highways 15",
            "-foot",
            "-bicycle",
            "+motor_car",
            "-motorcycle",
            "-moped",
            "-mofa",
            "-bus",
            "-goods",
            "-hgv",
            "-motor_vehicle",
            "-train",
            "+tram",
            "+light_rail",
            "-subway",
            "-monorail",
            "-funicular",
            "-narrow_gauge",
        ]
    );
}

#[test]
fn test_configure_writer() {
    let config = resolve(&[("output", "/tmp/out")]).unwrap();
    let mut writer = MatsimNetworkWriter::new(Path::new("unused"));
    config.configure_writer(&mut writer);
    assert_eq!(writer.network_file(), PathBuf::from("/tmp/out/network.xml"));
    assert_eq!(
        writer.cleaned_network_file(),
        PathBuf::from("/tmp/out/network_cleaned.xml")
    );
}

fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn way(id: i64, node_ids: &[i64], pairs: &[(&str, &str)]) -> OsmWay {
    OsmWay {
        id,
        node_ids: node_ids.to_vec(),
        tags: tags(pairs),
    }
}

// A two-way primary road 1-2-3 with a residential side street 2-4, a one-way primary 3-5,
// a road closed to everyone 5-1, a railway 1-5, and a bus stop at 4.
fn scraped() -> ScrapedOsm {
    let mut nodes = HashMap::new();
    nodes.insert(1, Coord { x: 0.0, y: 0.0 });
    nodes.insert(2, Coord { x: 0.001, y: 0.0 });
    nodes.insert(3, Coord { x: 0.002, y: 0.0 });
    nodes.insert(4, Coord { x: 0.001, y: 0.001 });
    nodes.insert(5, Coord { x: 0.003, y: 0.0 });
    ScrapedOsm {
        nodes,
        ways: vec![
            way(10, &[1, 2, 3], &[("highway", "primary")]),
            way(11, &[2, 4], &[("highway", "residential")]),
            way(12, &[3, 5], &[("highway", "primary"), ("oneway", "yes")]),
            way(13, &[5, 1], &[("highway", "primary"), ("access", "no")]),
            way(20, &[1, 5], &[("railway", "rail")]),
        ],
        stop_nodes: vec![(4, tags(&[("highway", "bus_stop"), ("name", "Main St")]))],
    }
}

fn link_ids(output: &ReadOutput) -> Vec<&str> {
    let mut ids: Vec<&str> = output
        .network
        .links
        .iter()
        .map(|l| l.id.as_str())
        .collect();
    ids.sort();
    ids
}

#[test]
fn test_build_medium_road_network() {
    let reader = OsmNetworkReader::new("Global");
    let output = reader.build(scraped());

    // The residential street is dropped, so 1-2-3 isn't split at 2
    assert_eq!(link_ids(&output), vec!["10_0", "10_0_r", "12_0"]);
    assert_eq!(output.network.nodes.len(), 3);
    assert!(output.stops.is_empty());

    let link = output.network.links.iter().find(|l| l.id == "10_0").unwrap();
    assert_eq!(output.network.node(link.from).id, "1");
    assert_eq!(output.network.node(link.to).id, "3");
    assert_eq!(link.modes, set(&["car"]));
    assert_eq!(link.geometry.as_ref().unwrap().0.len(), 3);
    // About 222m along the equator
    assert!((link.length - 222.0).abs() < 2.0, "{}", link.length);

    let reversed = output.network.links.iter().find(|l| l.id == "10_0_r").unwrap();
    assert_eq!(output.network.node(reversed.from).id, "3");
}

#[test]
fn test_build_fine_rail_and_pt() {
    let mut reader = OsmNetworkReader::new("Global");
    let config = resolve(&[("fidelity", "fine"), ("ptinfra", "yes")]).unwrap();
    config.configure_reader(&mut reader);
    let output = reader.build(scraped());

    assert_eq!(
        link_ids(&output),
        vec!["10_0", "10_0_r", "10_1", "10_1_r", "11_0", "11_0_r", "12_0", "20_0", "20_0_r"]
    );
    let rail = output.network.links.iter().find(|l| l.id == "20_0").unwrap();
    assert_eq!(rail.modes, set(&["pt"]));
    let road = output.network.links.iter().find(|l| l.id == "12_0").unwrap();
    assert_eq!(road.modes, set(&["car", "pt"]));

    assert_eq!(output.stops.len(), 1);
    assert_eq!(output.stops[0].id, "4");
    assert_eq!(output.stops[0].name.as_deref(), Some("Main St"));
}

#[test]
fn test_build_bounding_box() {
    let mut reader = OsmNetworkReader::new("Global");
    reader.set_bounding_box(Some(BoundingBox {
        min_x: 0.0025,
        min_y: -1.0,
        max_x: 1.0,
        max_y: 1.0,
    }));
    let output = reader.build(scraped());
    assert_eq!(link_ids(&output), vec!["12_0"]);
}

#[test]
fn test_write_and_clean() {
    let dir = tempfile::tempdir().unwrap();
    let output = OsmNetworkReader::new("Global").build(scraped());

    let mut writer = MatsimNetworkWriter::new(&dir.path().join("nested"));
    writer.set_generate_detailed_geometry(true);
    writer.write(&output.network, &output.stops).unwrap();
    assert!(writer.network_file().is_file());
    assert!(writer.geometry_file().is_file());
    assert!(!writer.transit_schedule_file().exists());

    create_cleaned_network(&writer, &MatsimNetworkCleaner).unwrap();
    let cleaned = matsim_network::Network::read_xml(&writer.cleaned_network_file()).unwrap();
    // The one-way link to 5 is a dead end
    let mut ids: Vec<&str> = cleaned.links.iter().map(|l| l.id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["10_0", "10_0_r"]);
    assert_eq!(cleaned.nodes.len(), 2);
    assert_eq!(cleaned.name.as_deref(), Some("OSM network, Global"));
}

#[test]
fn test_private_access() {
    let mut scraped = scraped();
    scraped.ways = vec![
        way(10, &[1, 2, 3], &[("highway", "primary"), ("access", "private")]),
        way(
            12,
            &[3, 5],
            &[("highway", "primary"), ("access", "private"), ("motorcar", "yes")],
        ),
    ];
    let output = OsmNetworkReader::new("Global").build(scraped);
    // The mode's own access key beats the general one
    assert_eq!(link_ids(&output), vec!["12_0", "12_0_r"]);
}

fn fixture() -> String {
    format!("{}/tests/data/small.osm", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn test_read_osm_xml() {
    let mut reader = OsmNetworkReader::new("Global");
    reader.set_input_source(&fixture());

    let scraped = reader.scrape_elements(&std::fs::read(fixture()).unwrap()).unwrap();
    assert_eq!(scraped.nodes.len(), 6);
    // The building isn't a highway or railway
    let mut way_ids: Vec<i64> = scraped.ways.iter().map(|w| w.id).collect();
    way_ids.sort();
    assert_eq!(way_ids, vec![10, 11, 12, 13, 20]);
    let primary = scraped.ways.iter().find(|w| w.id == 10).unwrap();
    assert_eq!(primary.tags, tags(&[("highway", "primary")]));
    assert!(scraped.stop_nodes.is_empty());

    let output = reader.read().unwrap();
    assert_eq!(link_ids(&output), vec!["10_0", "10_0_r", "12_0"]);
    assert!(output.stops.is_empty());
}

#[test]
fn test_read_osm_xml_with_pt() {
    let input = fixture();
    let config = ResolvedConfig::resolve(
        &options(&[("input", input.as_str()), ("ptinfra", "yes")]),
        &context(),
    )
    .unwrap();
    let mut reader = OsmNetworkReader::default();
    config.configure_reader(&mut reader);

    let scraped = reader.scrape_elements(&std::fs::read(fixture()).unwrap()).unwrap();
    assert_eq!(scraped.stop_nodes.len(), 1);

    let output = reader.read().unwrap();
    assert_eq!(
        link_ids(&output),
        vec!["10_0", "10_0_r", "12_0", "20_0", "20_0_r"]
    );
    assert_eq!(
        output.stops,
        vec![matsim_network::StopFacility {
            id: "4".to_string(),
            x: 0.001,
            y: 0.001,
            name: Some("Main St".to_string()),
        }]
    );
}

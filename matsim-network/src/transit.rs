use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use xml::writer::{EmitterConfig, XmlEvent};

const DOCTYPE: &str =
    r#"<!DOCTYPE transitSchedule SYSTEM "http://www.matsim.org/files/dtd/transitSchedule_v2.dtd">"#;

/// A place where public transport vehicles stop, like a bus stop or a station platform.
#[derive(Clone, Debug, PartialEq)]
pub struct StopFacility {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub name: Option<String>,
}

/// Write a MATSim transit schedule holding only stop facilities. Routes and lines aren't known
/// from infrastructure alone.
pub fn write_transit_stops(stops: &[StopFacility], path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_transit_stops_to(stops, BufWriter::new(file))?;
    info!("Wrote {} stop facilities to {}", stops.len(), path.display());
    Ok(())
}

pub fn write_transit_stops_to<W: Write>(stops: &[StopFacility], mut out: W) -> Result<()> {
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(out, "{DOCTYPE}")?;

    let mut writer = EmitterConfig::new()
        .perform_indent(true)
        .write_document_declaration(false)
        .create_writer(out);
    writer.write(XmlEvent::start_element("transitSchedule"))?;
    writer.write(XmlEvent::start_element("transitStops"))?;
    for stop in stops {
        let x = stop.x.to_string();
        let y = stop.y.to_string();
        let mut element = XmlEvent::start_element("stopFacility")
            .attr("id", &stop.id)
            .attr("x", &x)
            .attr("y", &y);
        if let Some(name) = &stop.name {
            element = element.attr("name", name);
        }
        writer.write(element)?;
        writer.write(XmlEvent::end_element())?;
    }
    writer.write(XmlEvent::end_element())?;
    writer.write(XmlEvent::end_element())?;
    writer.into_inner().flush()?;
    Ok(())
}

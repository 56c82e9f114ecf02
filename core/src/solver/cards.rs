//! Reading solver input descriptions into antennas.

use crate::geometry::antenna::{Antenna, AntennaType};
use crate::geometry::element::{Wire, WireElement};
use crate::geometry::point::Point;
use crate::prelude::{AntennaError, AntennaResult};
use crate::solver::tokens::Tokens;
use log::{debug, info};
use std::fs;
use std::path::Path;

/// File length units per internal unit.
pub const FILE_UNITS: f64 = 100.0;

/// Two-letter card mnemonic, or `""` for lines too short to carry one.
pub fn mnemonic(card: &str) -> &str {
    card.get(..2).unwrap_or("")
}

/// Parses a wire card. Coordinates and radius are converted from file units.
pub fn card_to_wire(card: &str) -> AntennaResult<(i64, Wire)> {
    let mut tokens = Tokens::after_mnemonic(card);
    let tag = tokens.next_i64("tag");
    let segments = tokens.next_i64("segments");
    let mut coords = [0.0; 6];
    for (slot, name) in coords
        .iter_mut()
        .zip(["x1", "y1", "z1", "x2", "y2", "z2"])
    {
        *slot = tokens.next_f64(name) / FILE_UNITS;
    }
    let radius = tokens.next_f64("radius") / FILE_UNITS;

    let segments = u32::try_from(segments).map_err(|_| {
        AntennaError::MalformedGeometry(format!("negative segment count in {:?}", card.trim_end()))
    })?;
    let wire = Wire::new(
        Point::new(coords[0], coords[1], coords[2]),
        Point::new(coords[3], coords[4], coords[5]),
        radius,
        segments,
    )
    .map_err(|_| {
        AntennaError::MalformedGeometry(format!("wire without segments in {:?}", card.trim_end()))
    })?;
    Ok((tag, wire))
}

/// Builds an antenna from the text of a solver description.
///
/// Every line is kept verbatim for re-serialization. The first comment card
/// supplies the type hint; a `GN` card marks the ground as specified; the
/// last `FR` card sets the frequency. Fails without side effects when the
/// text holds no wire card.
pub fn parse_description(name: &str, text: &str) -> AntennaResult<Antenna> {
    let mut antenna = Antenna::new(name);
    let mut seen_comment = false;

    for line in text.lines() {
        let card = line.trim_end_matches('\r');
        match mnemonic(card) {
            "CM" if !seen_comment => {
                antenna.kind = AntennaType::from_comment(card.get(2..).unwrap_or(""));
                seen_comment = true;
            }
            "GW" => {
                let (tag, wire) = card_to_wire(card)?;
                debug!("{}: wire tag {} with {} segments", name, tag, wire.segments());
                antenna.insert(WireElement::Wire(wire));
            }
            "GN" => antenna.ground_specified = true,
            "FR" => {
                let mut tokens = Tokens::after_mnemonic(card);
                tokens.skip(4);
                antenna.frequency = tokens.next_f64("frequency");
            }
            _ => {}
        }
        antenna.push_card(card);
    }

    if antenna.element_count() == 0 {
        return Err(AntennaError::MalformedGeometry(format!(
            "no wire cards in {}",
            name
        )));
    }

    antenna.update_visual_scale();
    antenna.select_first_element();
    info!(
        "parsed {} as {} with {} wires at {} MHz",
        name,
        antenna.kind.label(),
        antenna.element_count(),
        antenna.frequency
    );
    Ok(antenna)
}

/// Reads and parses a description file. The antenna is named after the file
/// stem.
pub fn load_file(path: impl AsRef<Path>) -> AntennaResult<Antenna> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| AntennaError::io(path, e))?;
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("antenna");
    parse_description(name, &text)
}

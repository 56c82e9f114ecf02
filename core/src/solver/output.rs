//! Reading the solver's output listing.

use crate::field::data::{FieldData, FieldSample, PolarizationSense};
use crate::geometry::antenna::Antenna;
use crate::geometry::element::SegmentCurrent;
use crate::prelude::{AntennaError, AntennaResult};
use crate::solver::tokens::Tokens;
use crate::solver::writer::{TagKind, TagLayout};
use log::{debug, warn};

pub const PATTERN_MARKER: &str = "RADIATION PATTERNS";
pub const CURRENTS_MARKER: &str = "CURRENTS AND LOCATION";

/// Lines from the pattern marker to the first data row.
const PATTERN_HEADER_LINES: usize = 5;
/// Lines from the currents marker to the first data row.
const CURRENTS_HEADER_LINES: usize = 7;

#[derive(Debug, Clone)]
pub struct ParsedPattern {
    pub field: FieldData,
    pub anomalies: usize,
}

/// One row of the currents table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentRecord {
    pub segment: i64,
    pub tag: i64,
    pub magnitude: f64,
    pub phase: f64,
}

#[derive(Debug, Clone)]
pub struct ParsedCurrents {
    pub records: Vec<CurrentRecord>,
    pub anomalies: usize,
}

/// Data rows of the section opened by `marker`, up to the first blank line.
fn section_rows<'a>(
    text: &'a str,
    marker: &'static str,
    header_lines: usize,
) -> AntennaResult<impl Iterator<Item = &'a str>> {
    let mut lines = text.lines();
    if !lines.by_ref().any(|line| line.contains(marker)) {
        return Err(AntennaError::MissingSection(marker));
    }
    // The marker line itself counts toward the header.
    let mut rows = lines.skip(header_lines - 1).peekable();
    if rows.peek().is_none() {
        warn!("solver output ends inside the {} header", marker);
        return Err(AntennaError::MissingSection(marker));
    }
    Ok(rows.take_while(|line| !line.trim().is_empty()))
}

/// Reads the radiation pattern table into a fresh `FieldData`.
pub fn parse_pattern(text: &str, step_size: f64) -> AntennaResult<ParsedPattern> {
    let mut field = FieldData::new(step_size);
    let mut anomalies = 0;

    for row in section_rows(text, PATTERN_MARKER, PATTERN_HEADER_LINES)? {
        let mut tokens = Tokens::new(row);
        let mut sample = FieldSample {
            theta: tokens.next_f64("theta"),
            phi: tokens.next_f64("phi"),
            vertical_gain: tokens.next_f64("vertical gain"),
            horizontal_gain: tokens.next_f64("horizontal gain"),
            total_gain: tokens.next_f64("total gain"),
            axial_ratio: tokens.next_f64("axial ratio"),
            tilt: tokens.next_f64("tilt"),
            ..Default::default()
        };
        let sense = tokens.next_word("sense");
        match PolarizationSense::from_token(sense) {
            Some(parsed) => sample.sense = parsed,
            None if !sense.is_empty() => {
                warn!("unknown polarization sense {:?}, using linear", sense);
                anomalies += 1;
            }
            None => {}
        }
        sample.theta_magnitude = tokens.next_f64("theta magnitude");
        sample.theta_phase = tokens.next_f64("theta phase");
        sample.phi_magnitude = tokens.next_f64("phi magnitude");
        sample.phi_phase = tokens.next_f64("phi phase");

        anomalies += tokens.anomalies();
        field.push(sample);
    }

    debug!("read {} pattern samples", field.len());
    Ok(ParsedPattern { field, anomalies })
}

/// Reads up to `expected` rows of the currents table.
pub fn parse_currents(text: &str, expected: usize) -> AntennaResult<ParsedCurrents> {
    let mut records = Vec::with_capacity(expected);
    let mut anomalies = 0;

    for row in section_rows(text, CURRENTS_MARKER, CURRENTS_HEADER_LINES)?.take(expected) {
        let mut tokens = Tokens::new(row);
        let segment = tokens.next_i64("segment");
        let tag = tokens.next_i64("tag");
        // Position, length and the real and imaginary parts.
        tokens.skip(6);
        let magnitude = tokens.next_f64("current magnitude");
        let phase = tokens.next_f64("current phase");

        anomalies += tokens.anomalies();
        records.push(CurrentRecord {
            segment,
            tag,
            magnitude,
            phase,
        });
    }

    if records.len() < expected {
        warn!(
            "currents table holds {} of {} expected segments",
            records.len(),
            expected
        );
    }
    Ok(ParsedCurrents { records, anomalies })
}

/// Distributes current records onto the wires named by `layout`.
///
/// Records are consumed in order; a tag change moves to the next entry.
/// Rows for walls are dropped. Returns the number of rows that named a tag
/// outside the layout.
pub fn assign_currents(
    records: &[CurrentRecord],
    layout: &TagLayout,
    antennas: &mut [Antenna],
) -> usize {
    for idx in layout.antennas() {
        if let Some(antenna) = antennas.get_mut(idx) {
            antenna.clear_currents();
        }
    }

    let mut unknown = 0;
    let mut pending: Vec<SegmentCurrent> = Vec::new();
    let mut cursor: Option<i64> = None;

    let flush = |tag: Option<i64>, pending: &mut Vec<SegmentCurrent>, antennas: &mut [Antenna]| {
        let Some(entry) = tag.and_then(|t| layout.lookup(t)) else {
            pending.clear();
            return;
        };
        let currents = std::mem::take(pending);
        if entry.kind == TagKind::Wire {
            if let Some(antenna) = antennas.get_mut(entry.antenna) {
                antenna.set_wire_currents(entry.element, currents);
            }
        }
    };

    for record in records {
        if cursor != Some(record.tag) {
            flush(cursor, &mut pending, &mut *antennas);
            cursor = Some(record.tag);
            if layout.lookup(record.tag).is_none() {
                warn!("current row names unknown tag {}", record.tag);
                unknown += 1;
            }
        }
        pending.push(SegmentCurrent::new(record.magnitude, record.phase));
    }
    flush(cursor, &mut pending, &mut *antennas);

    for idx in layout.antennas() {
        if let Some(antenna) = antennas.get_mut(idx) {
            antenna.update_current_ranges();
        }
    }
    unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::element::{Obstruction, Wire, WireElement};
    use crate::geometry::point::Point;
    use crate::prelude::VisualConfig;
    use crate::solver::writer::write_single;

    const LISTING: &str = "\
 header noise
                     - - - CURRENTS AND LOCATION - - -

                        DISTANCES IN WAVELENGTHS


   SEG.  TAG    COORD. OF SEG. CENTER     SEG.            - - - CURRENT (AMPS) - - -
   NO.   NO.     X         Y         Z      LENGTH     REAL      IMAG.     MAG.        PHASE
     1    1   0.0000    0.0000   -0.3000   0.2000  1.0E-03 -2.0E-04  1.0198E-03   -11.310
     2    1   0.0000    0.0000   -0.1000   0.2000  2.0E-03 -3.0E-04  2.0224E-03    -8.531
     3    1   0.0000    0.0000    0.1000   0.2000  2.0E-03 -3.0E-04  2.0224E-03    -8.531
     4    2   0.1000    0.0000    0.3000   0.2000  1.0E-03 -2.0E-04  1.0198E-03   -11.310

                             - - - RADIATION PATTERNS - - -

  - - ANGLES - -          - POWER GAINS -       - - - POLARIZATION - - -
  THETA     PHI       VERT.   HOR.    TOTAL      AXIAL     TILT   SENSE
 DEGREES  DEGREES      DB      DB       DB       RATIO     DEG.
    0.00     0.00    -3.10 -999.99    -3.10    0.00000    90.00  LINEAR   1.0E+00    0.00  0.0E+00    0.00
    0.00     5.00    -2.10 -999.99    -2.10    0.10000   -45.00  RIGHT    1.0E+00    0.00  0.0E+00    0.00
    5.00     0.00     1.50 -999.99     1.50    0.20000     0.00  LEFT     1.0E+00    0.00  0.0E+00    0.00

 trailer
";

    #[test]
    fn pattern_rows_stop_at_blank_line() {
        let parsed = parse_pattern(LISTING, 5.0).unwrap();
        assert_eq!(parsed.anomalies, 0);
        assert_eq!(parsed.field.len(), 3);
        let samples = parsed.field.samples();
        assert_eq!(samples[1].phi, 5.0);
        assert_eq!(samples[1].sense, PolarizationSense::Right);
        assert_eq!(samples[2].sense, PolarizationSense::Left);
        assert_eq!(samples[0].tilt, 90.0);

        let ranges = parsed.field.ranges().unwrap();
        assert_eq!((ranges.gain.min, ranges.gain.max), (-3.10, 1.50));
        assert_eq!((ranges.tilt.min, ranges.tilt.max), (-45.0, 90.0));
    }

    #[test]
    fn currents_rows_are_positional() {
        let parsed = parse_currents(LISTING, 4).unwrap();
        assert_eq!(parsed.records.len(), 4);
        assert_eq!(parsed.records[3].tag, 2);
        assert_eq!(parsed.records[0].magnitude, 1.0198e-3);
        assert_eq!(parsed.records[1].phase, -8.531);
    }

    #[test]
    fn currents_read_only_expected_rows() {
        let parsed = parse_currents(LISTING, 2).unwrap();
        assert_eq!(parsed.records.len(), 2);
    }

    #[test]
    fn missing_markers_are_reported() {
        let err = parse_pattern("nothing here\n", 5.0).unwrap_err();
        assert!(matches!(err, AntennaError::MissingSection(PATTERN_MARKER)));
        let err = parse_currents("RADIATION PATTERNS only\n", 3).unwrap_err();
        assert!(matches!(err, AntennaError::MissingSection(CURRENTS_MARKER)));
    }

    #[test]
    fn truncated_header_is_missing_section() {
        let err = parse_pattern("RADIATION PATTERNS\n\n\n", 5.0).unwrap_err();
        assert!(matches!(err, AntennaError::MissingSection(_)));
    }

    #[test]
    fn garbled_row_zero_fills() {
        let text = "RADIATION PATTERNS\n\n\n\n\n  10.0  x  1.0\n\n";
        let parsed = parse_pattern(text, 5.0).unwrap();
        assert_eq!(parsed.field.len(), 1);
        assert!(parsed.anomalies > 0);
        assert_eq!(parsed.field.samples()[0].theta, 10.0);
        assert_eq!(parsed.field.samples()[0].phi, 0.0);
    }

    #[test]
    fn currents_skip_walls_and_land_on_wires() {
        let mut antenna = Antenna::new("pair");
        antenna.insert(WireElement::Wire(
            Wire::new(Point::new(0.0, 0.0, -0.4), Point::new(0.0, 0.0, 0.2), 0.01, 3).unwrap(),
        ));
        antenna.insert(WireElement::Obstruction(Obstruction::new(
            Point::new(-2.0, 0.0, 0.0),
            Point::new(-1.0, 2.0, 4.0),
        )));
        antenna.insert(WireElement::Wire(
            Wire::new(Point::new(0.1, 0.0, 0.2), Point::new(0.1, 0.0, 0.4), 0.01, 1).unwrap(),
        ));
        let deck = write_single(&antenna, 0, &VisualConfig::default());

        let records = vec![
            CurrentRecord { segment: 1, tag: 1, magnitude: 1.0, phase: 0.0 },
            CurrentRecord { segment: 2, tag: 1, magnitude: 2.0, phase: 5.0 },
            CurrentRecord { segment: 3, tag: 1, magnitude: 3.0, phase: 10.0 },
            CurrentRecord { segment: 4, tag: 2, magnitude: 9.0, phase: 90.0 },
            CurrentRecord { segment: 5, tag: 3, magnitude: 0.5, phase: -5.0 },
        ];
        let mut antennas = vec![antenna];
        let unknown = assign_currents(&records, &deck.layout, &mut antennas);
        assert_eq!(unknown, 0);

        let antenna = &antennas[0];
        let first = antenna.elements()[0].as_wire().unwrap();
        assert_eq!(first.currents().len(), 3);
        assert_eq!(first.currents()[2].magnitude, 3.0);
        let last = antenna.elements()[2].as_wire().unwrap();
        assert_eq!(last.currents(), &[SegmentCurrent::new(0.5, -5.0)]);

        let ranges = antenna.current_ranges().unwrap();
        assert_eq!((ranges.magnitude.min, ranges.magnitude.max), (0.5, 3.0));
        assert_eq!((ranges.phase.min, ranges.phase.max), (-5.0, 10.0));
    }
}

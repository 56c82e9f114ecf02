//! Serializing antennas into solver input decks.

use crate::geometry::antenna::Antenna;
use crate::geometry::element::{Obstruction, Wire, WireElement};
use crate::geometry::point::Point;
use crate::prelude::VisualConfig;
use crate::solver::cards::{mnemonic, FILE_UNITS};
use std::fmt::Write as _;

/// Fill wires per wall along each axis (each axis gets `WALL_FILL + 1`).
pub const WALL_FILL: usize = 10;
/// Segments on every wire approximating a wall.
pub const WALL_WIRE_SEGMENTS: u32 = 5;
/// Radius of the two wall boundary wires, in file units.
const WALL_BOUNDARY_RADIUS: f64 = 5.0;
/// Wire cards written per wall: two boundaries plus two per fill step.
pub const WALL_CARDS: usize = 2 + 2 * (WALL_FILL + 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Wire,
    Obstruction,
}

/// Where one solver tag came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagEntry {
    pub tag: u32,
    pub antenna: usize,
    pub element: usize,
    pub kind: TagKind,
    /// Segments the solver reports for this tag.
    pub segments: u32,
}

/// Maps the sequential tags of a deck back to scene elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagLayout {
    entries: Vec<TagEntry>,
}

impl TagLayout {
    fn push(&mut self, antenna: usize, element: usize, kind: TagKind, segments: u32) -> u32 {
        let tag = self.entries.len() as u32 + 1;
        self.entries.push(TagEntry {
            tag,
            antenna,
            element,
            kind,
            segments,
        });
        tag
    }

    pub fn entries(&self) -> &[TagEntry] {
        &self.entries
    }

    /// Tags are dense and start at 1.
    pub fn lookup(&self, tag: i64) -> Option<&TagEntry> {
        usize::try_from(tag - 1).ok().and_then(|idx| self.entries.get(idx))
    }

    /// Segment count the solver's current table will hold.
    pub fn total_segments(&self) -> usize {
        self.entries.iter().map(|e| e.segments as usize).sum()
    }

    /// Antennas that own at least one tag, in first-seen order.
    pub fn antennas(&self) -> Vec<usize> {
        let mut seen = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.antenna) {
                seen.push(entry.antenna);
            }
        }
        seen
    }
}

/// A composed input deck and the tag map needed to read currents back.
#[derive(Debug, Clone)]
pub struct SolverDeck {
    pub text: String,
    pub layout: TagLayout,
}

struct DeckBuilder<'a> {
    config: &'a VisualConfig,
    frequency: f64,
    text: String,
    layout: TagLayout,
    geometry_written: bool,
    seen_fr: bool,
    seen_rp: bool,
}

impl<'a> DeckBuilder<'a> {
    fn new(config: &'a VisualConfig, frequency: f64) -> Self {
        Self {
            config,
            frequency,
            text: String::new(),
            layout: TagLayout::default(),
            geometry_written: false,
            seen_fr: false,
            seen_rp: false,
        }
    }

    fn echo(&mut self, card: &str) {
        self.text.push_str(card);
        self.text.push('\n');
    }

    fn geometry(&mut self, antenna: &Antenna, antenna_idx: usize, offset: Point) {
        for (element_idx, element) in antenna.elements().iter().enumerate() {
            match element {
                WireElement::Wire(wire) => {
                    let tag = self
                        .layout
                        .push(antenna_idx, element_idx, TagKind::Wire, wire.segments());
                    self.wire_card(tag, wire, offset);
                }
                WireElement::Obstruction(wall) => {
                    let segments = WALL_WIRE_SEGMENTS * WALL_CARDS as u32;
                    let tag = self.layout.push(
                        antenna_idx,
                        element_idx,
                        TagKind::Obstruction,
                        segments,
                    );
                    self.wall_cards(tag, wall, offset);
                }
            }
        }
    }

    fn wire_card(&mut self, tag: u32, wire: &Wire, offset: Point) {
        let e1 = (wire.e1 + offset).scaled(FILE_UNITS);
        let e2 = (wire.e2 + offset).scaled(FILE_UNITS);
        self.gw(tag, wire.segments(), e1, e2, wire.radius * FILE_UNITS);
    }

    /// Two boundary wires and a grid of fill wires in the `x = e1.x` plane.
    fn wall_cards(&mut self, tag: u32, wall: &Obstruction, offset: Point) {
        let e1 = (wall.e1 + offset).scaled(FILE_UNITS);
        let e2 = (wall.e2 + offset).scaled(FILE_UNITS);
        let segments = WALL_WIRE_SEGMENTS;

        self.gw(tag, segments, e1, Point::new(e1.x, e1.y, e2.z), WALL_BOUNDARY_RADIUS);
        self.gw(
            tag,
            segments,
            Point::new(e1.x, e2.y, e2.z),
            Point::new(e1.x, e2.y, e1.z),
            WALL_BOUNDARY_RADIUS,
        );

        // Written unscaled, as the solver has always been fed.
        let fill_radius = 0.5 * (wall.e2.z - wall.e1.z).abs() / WALL_FILL as f64;
        for i in 0..=WALL_FILL {
            let t = i as f64 / WALL_FILL as f64;
            let z = e1.z + (e2.z - e1.z) * t;
            self.gw(
                tag,
                segments,
                Point::new(e1.x, e1.y, z),
                Point::new(e1.x, e2.y, z),
                fill_radius,
            );
            let y = e1.y + (e2.y - e1.y) * t;
            self.gw(
                tag,
                segments,
                Point::new(e1.x, y, e1.z),
                Point::new(e1.x, y, e2.z),
                fill_radius,
            );
        }
    }

    fn gw(&mut self, tag: u32, segments: u32, e1: Point, e2: Point, radius: f64) {
        let _ = writeln!(
            self.text,
            "GW {} {} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6}",
            tag, segments, e1.x, e1.y, e1.z, e2.x, e2.y, e2.z, radius
        );
    }

    fn frequency_card(&mut self) {
        if self.seen_fr {
            return;
        }
        let _ = writeln!(
            self.text,
            "FR  0    1    0   0   {:.6}     .0000     .0000     .0000    .0000    .0000",
            self.frequency
        );
        self.seen_fr = true;
    }

    fn pattern_card(&mut self) {
        if self.seen_rp {
            return;
        }
        // The pattern request starts the computation, so frequency goes first.
        self.frequency_card();
        let step = self.config.pattern_step();
        let increments = 361 / step;
        let _ = writeln!(
            self.text,
            "RP  0   {}   {}    1001   0   0   {}   {}     0   0",
            increments, increments, step, step
        );
        self.seen_rp = true;
    }

    /// Handles one card after the geometry. Returns false for cards the
    /// caller should echo.
    fn control_card(&mut self, card: &str) -> bool {
        match mnemonic(card) {
            "FR" => self.frequency_card(),
            "RP" => self.pattern_card(),
            "EN" => {
                self.pattern_card();
                return false;
            }
            _ => return false,
        }
        true
    }

    fn finish(mut self) -> SolverDeck {
        self.pattern_card();
        SolverDeck {
            text: self.text,
            layout: self.layout,
        }
    }
}

fn is_header(card: &str) -> bool {
    matches!(mnemonic(card), "CM" | "CE")
}

/// Cards that must come after every geometry card.
fn follows_geometry(card: &str) -> bool {
    matches!(mnemonic(card), "GE" | "FR" | "RP" | "EN")
}

/// Writes one antenna at its own coordinates.
///
/// The wires replace the first `GW` card in place. Without one they go
/// before the first `GE`, `FR`, `RP` or `EN` card, or at the end. `FR` and
/// `RP` are written once from the current frequency and the configured
/// step; every other card is echoed verbatim in its original position.
pub fn write_single(antenna: &Antenna, antenna_idx: usize, config: &VisualConfig) -> SolverDeck {
    let mut deck = DeckBuilder::new(config, antenna.frequency);

    for card in antenna.cards() {
        let is_wire = mnemonic(card) == "GW";
        if !deck.geometry_written && (is_wire || follows_geometry(card)) {
            deck.geometry(antenna, antenna_idx, Point::ORIGIN);
            deck.geometry_written = true;
        }
        if is_wire || deck.control_card(card) {
            continue;
        }
        deck.echo(card);
    }

    if !deck.geometry_written {
        deck.geometry(antenna, antenna_idx, Point::ORIGIN);
    }
    deck.finish()
}

/// Writes every antenna into one deck, each shifted by its offset and with
/// tags numbered across antennas.
///
/// Comment cards come from the first antenna only. Control and passthrough
/// cards come from the last antenna, with ground cards dropped. The
/// frequency is taken from `current`.
pub fn write_combined(antennas: &[Antenna], current: usize, config: &VisualConfig) -> SolverDeck {
    let frequency = antennas.get(current).map(|a| a.frequency).unwrap_or_default();
    let mut deck = DeckBuilder::new(config, frequency);

    if let Some(first) = antennas.first() {
        for card in first.cards().iter().filter(|card| is_header(card)) {
            deck.echo(card);
        }
    }

    for (idx, antenna) in antennas.iter().enumerate() {
        deck.geometry(antenna, idx, antenna.offset);
    }
    deck.geometry_written = true;

    if let Some(last) = antennas.last() {
        for card in last.cards() {
            if is_header(card) || matches!(mnemonic(card), "GW" | "GN") {
                continue;
            }
            if !deck.control_card(card) {
                deck.echo(card);
            }
        }
    }
    deck.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::cards::parse_description;

    const DIPOLE: &str = "\
CM DIPOLE
CE
GW 1 7 0 0 -50 0 0 50 0.5
GE 0
GN 1
EX 0 1 4 0 1.0 0.0
FR 0 1 0 0 14.2 0
RP 0 37 73 1000 0 0 10 5
RP 0 19 37 1000 0 0 10 10
EN
";

    fn dipole() -> Antenna {
        parse_description("dipole", DIPOLE).unwrap()
    }

    fn count(text: &str, prefix: &str) -> usize {
        text.lines().filter(|l| mnemonic(l) == prefix).count()
    }

    #[test]
    fn single_deck_rewrites_control_cards() {
        let config = VisualConfig::default();
        let deck = write_single(&dipole(), 0, &config);
        let lines: Vec<&str> = deck.text.lines().collect();

        assert_eq!(lines[0], "CM DIPOLE");
        assert_eq!(lines[1], "CE");
        assert_eq!(
            lines[2],
            "GW 1 7 0.000000 0.000000 -50.000000 0.000000 0.000000 50.000000 0.500000"
        );
        assert_eq!(lines[3], "GE 0");
        assert_eq!(lines[4], "GN 1");
        assert_eq!(count(&deck.text, "RP"), 1);
        assert_eq!(count(&deck.text, "FR"), 1);
        assert!(deck.text.contains("RP  0   72   72    1001   0   0   5   5     0   0"));
        assert!(deck.text.contains("FR  0    1    0   0   14.200000"));
        assert_eq!(lines.last(), Some(&"EN"));
        assert_eq!(deck.layout.total_segments(), 7);
    }

    #[test]
    fn missing_control_cards_are_added_before_end() {
        let antenna = parse_description("bare", "GW 1 3 0 0 0 0 0 100 1\nEN\n").unwrap();
        let deck = write_single(&antenna, 0, &VisualConfig::default());
        let lines: Vec<&str> = deck.text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("FR"));
        assert!(lines[2].starts_with("RP"));
        assert_eq!(lines[3], "EN");
    }

    #[test]
    fn cards_before_first_wire_keep_their_place() {
        let antenna = parse_description(
            "symbols",
            "CM DIPOLE\nCE\nSY len=50\nGW 1 7 0 0 -50 0 0 50 0.5\nGE 0\nEN\n",
        )
        .unwrap();
        let deck = write_single(&antenna, 0, &VisualConfig::default());
        let lines: Vec<&str> = deck.text.lines().collect();
        assert_eq!(lines[2], "SY len=50");
        assert!(lines[3].starts_with("GW 1 7 "));
        assert_eq!(lines[4], "GE 0");
    }

    #[test]
    fn geometry_without_wire_cards_precedes_ge() {
        let mut antenna = Antenna::new("built");
        antenna.insert(WireElement::Wire(
            Wire::new(Point::ORIGIN, Point::new(0.0, 0.0, 1.0), 0.01, 3).unwrap(),
        ));
        for card in ["CM built by hand", "SY h=2", "GE 0", "EN"] {
            antenna.push_card(card);
        }
        let deck = write_single(&antenna, 0, &VisualConfig::default());
        let lines: Vec<&str> = deck.text.lines().collect();
        assert_eq!(lines[1], "SY h=2");
        assert!(lines[2].starts_with("GW 1 3 "));
        assert_eq!(lines[3], "GE 0");
        assert_eq!(lines.last(), Some(&"EN"));
    }

    #[test]
    fn round_trip_preserves_geometry() {
        let mut antenna = dipole();
        if let Some(WireElement::Wire(wire)) = antenna.current_element_mut() {
            wire.translate(0.123456, -0.5, 2.25);
            wire.radius = 0.0031;
        }
        let deck = write_single(&antenna, 0, &VisualConfig::default());
        let reparsed = parse_description("again", &deck.text).unwrap();

        assert_eq!(reparsed.kind, antenna.kind);
        assert_eq!(reparsed.element_count(), antenna.element_count());
        for ((_, a), (_, b)) in antenna.wires().zip(reparsed.wires()) {
            assert!(a.e1.distance(&b.e1) < 1e-6);
            assert!(a.e2.distance(&b.e2) < 1e-6);
            assert!((a.radius - b.radius).abs() < 1e-6);
            assert_eq!(a.segments(), b.segments());
        }
    }

    #[test]
    fn wall_expands_to_wire_grid() {
        let mut antenna = dipole();
        antenna.insert(WireElement::Obstruction(Obstruction::new(
            Point::new(-2.0, 0.0, 0.0),
            Point::new(-1.0, 2.0, 4.0),
        )));
        let deck = write_single(&antenna, 0, &VisualConfig::default());

        assert_eq!(count(&deck.text, "GW"), 1 + WALL_CARDS);
        let wall_lines: Vec<&str> = deck.text.lines().filter(|l| l.starts_with("GW 2 ")).collect();
        assert_eq!(wall_lines.len(), WALL_CARDS);
        assert!(wall_lines.iter().all(|l| l.split_whitespace().nth(2) == Some("5")));
        assert_eq!(
            wall_lines[0],
            "GW 2 5 -200.000000 0.000000 0.000000 -200.000000 0.000000 400.000000 5.000000"
        );
        // Fill radius 0.5 * 4 / 10.
        assert!(wall_lines[2].ends_with(" 0.200000"));

        let entry = deck.layout.lookup(2).unwrap();
        assert_eq!(entry.kind, TagKind::Obstruction);
        assert_eq!(entry.element, 1);
        assert_eq!(deck.layout.total_segments(), 7 + 5 * WALL_CARDS);
    }

    #[test]
    fn combined_deck_offsets_and_renumbers() {
        let first = dipole();
        let mut second = parse_description(
            "second",
            "CM VERTICAL\nGW 1 9 0 0 0 0 0 500 1\nGW 2 3 0 0 500 100 0 500 1\nGN 1\nFR 0 1 0 0 7.1 0\nEN\n",
        )
        .unwrap();
        second.offset = Point::new(1.0, 0.0, 0.0);
        let antennas = vec![first, second];

        let deck = write_combined(&antennas, 1, &VisualConfig::default());
        let lines: Vec<&str> = deck.text.lines().collect();

        assert_eq!(lines[0], "CM DIPOLE");
        assert_eq!(count(&deck.text, "CM"), 1);
        assert_eq!(count(&deck.text, "GN"), 0);
        assert_eq!(count(&deck.text, "RP"), 1);
        assert!(deck.text.contains("   7.100000"));

        let gw: Vec<&str> = lines.iter().copied().filter(|l| mnemonic(l) == "GW").collect();
        assert_eq!(gw.len(), 3);
        assert!(gw[1].starts_with("GW 2 9 100.000000 "));
        assert!(gw[2].starts_with("GW 3 3 100.000000 "));

        assert_eq!(deck.layout.antennas(), vec![0, 1]);
        assert_eq!(deck.layout.lookup(3).map(|e| (e.antenna, e.element)), Some((1, 1)));
        assert!(deck.layout.lookup(0).is_none());
        assert!(deck.layout.lookup(4).is_none());
    }
}

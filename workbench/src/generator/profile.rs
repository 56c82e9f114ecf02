use crate::generator::template::{self, CurrentRow, PatternRow};
use antcore::prelude::{AntennaError, AntennaResult, SolverRunner};
use antcore::solver::cards::mnemonic;
use antcore::solver::tokens::Tokens;
use log::{debug, info};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fs;
use std::path::Path;

/// Speed of light over 1 MHz, in metres.
const WAVELENGTH_AT_1MHZ: f64 = 299.792_458;

/// Configuration for the synthetic far-field generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed: u64,
    /// Peak-to-peak jitter added to every gain value, in dB.
    pub noise: f64,
    /// Gain of the main lobe, in dBi.
    pub peak_gain: f64,
    /// Floor applied to the normalized pattern before conversion to dB.
    pub floor_db: f64,
    /// Amperes on the segment nearest the feed.
    pub feed_current: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            noise: 0.2,
            peak_gain: 2.15,
            floor_db: -40.0,
            feed_current: 0.02,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct DeckWire {
    tag: i64,
    segments: usize,
    e1: [f64; 3],
    e2: [f64; 3],
}

/// The parts of an input deck the generator needs.
#[derive(Debug, Clone)]
struct DeckSummary {
    wires: Vec<DeckWire>,
    frequency: f64,
    theta_count: usize,
    phi_count: usize,
    theta_step: f64,
    phi_step: f64,
}

impl DeckSummary {
    fn read(text: &str) -> Self {
        let mut summary = DeckSummary {
            wires: Vec::new(),
            frequency: 0.0,
            theta_count: 0,
            phi_count: 0,
            theta_step: 0.0,
            phi_step: 0.0,
        };
        for card in text.lines() {
            let mut tokens = Tokens::after_mnemonic(card);
            match mnemonic(card) {
                "GW" => {
                    let tag = tokens.next_i64("tag");
                    let segments = tokens.next_i64("segments").max(0) as usize;
                    let mut coords = [0.0; 6];
                    for slot in coords.iter_mut() {
                        *slot = tokens.next_f64("coordinate");
                    }
                    summary.wires.push(DeckWire {
                        tag,
                        segments,
                        e1: [coords[0], coords[1], coords[2]],
                        e2: [coords[3], coords[4], coords[5]],
                    });
                }
                "FR" => {
                    tokens.skip(4);
                    summary.frequency = tokens.next_f64("frequency");
                }
                "RP" => {
                    tokens.skip(1);
                    summary.theta_count = tokens.next_i64("theta count").max(0) as usize;
                    summary.phi_count = tokens.next_i64("phi count").max(0) as usize;
                    tokens.skip(3);
                    summary.theta_step = tokens.next_f64("theta step");
                    summary.phi_step = tokens.next_f64("phi step");
                }
                _ => {}
            }
        }
        summary
    }

    fn total_segments(&self) -> usize {
        self.wires.iter().map(|w| w.segments).sum()
    }

    /// Distinct wire tags, which stand in for the number of driven or
    /// parasitic elements.
    fn element_count(&self) -> usize {
        let mut tags: Vec<i64> = self.wires.iter().map(|w| w.tag).collect();
        tags.dedup();
        tags.len()
    }
}

/// Deterministic stand-in for the external solver. Reads the deck it is
/// given and writes a listing with a currents table for every wire card and
/// a full pattern grid at the requested step.
pub struct SyntheticSolver {
    config: GeneratorConfig,
    rng: StdRng,
}

impl SyntheticSolver {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    fn current_rows(&mut self, deck: &DeckSummary) -> Vec<CurrentRow> {
        let wavelength = if deck.frequency > 0.0 {
            WAVELENGTH_AT_1MHZ / deck.frequency
        } else {
            1.0
        };
        let mut rows = Vec::with_capacity(deck.total_segments());
        let mut segment = 1;
        for wire in &deck.wires {
            let n = wire.segments.max(1) as f64;
            for i in 0..wire.segments {
                let t = (i as f64 + 0.5) / n;
                let center = [
                    (wire.e1[0] + (wire.e2[0] - wire.e1[0]) * t) / 100.0 / wavelength,
                    (wire.e1[1] + (wire.e2[1] - wire.e1[1]) * t) / 100.0 / wavelength,
                    (wire.e1[2] + (wire.e2[2] - wire.e1[2]) * t) / 100.0 / wavelength,
                ];
                let length = distance(wire.e1, wire.e2) / 100.0 / wavelength / n;
                let jitter = self.rng.gen_range(0.95..1.05);
                rows.push(CurrentRow {
                    segment,
                    tag: wire.tag,
                    center,
                    length,
                    magnitude: self.config.feed_current * (PI * t).sin() * jitter,
                    phase: 90.0 * (t - 0.5) + wire.tag as f64,
                });
                segment += 1;
            }
        }
        rows
    }

    fn pattern_rows(&mut self, deck: &DeckSummary) -> Vec<PatternRow> {
        // Parasitic elements sharpen the forward lobe along +x.
        let directivity = deck.element_count().saturating_sub(1) as f64;
        let noise = self.config.noise.abs();
        let mut rows = Vec::with_capacity(deck.theta_count * deck.phi_count);

        for p in 0..deck.phi_count {
            let phi = p as f64 * deck.phi_step;
            for t in 0..deck.theta_count {
                let theta = t as f64 * deck.theta_step;
                let (st, ct) = theta.to_radians().sin_cos();
                let cp = phi.to_radians().cos();
                let forward = ((1.0 + st * cp) / 2.0).powf(directivity);
                let normalized = (st * st * forward).max(1e-12);
                let jitter = if noise > 0.0 {
                    self.rng.gen_range(-noise / 2.0..noise / 2.0)
                } else {
                    0.0
                };
                let total = (self.config.peak_gain + 10.0 * normalized.log10())
                    .max(self.config.peak_gain + self.config.floor_db)
                    + jitter;
                let horizontal = total - 20.0 - 10.0 * ct.abs();
                let axial_ratio = 0.05 * ct * cp;
                let sense = if axial_ratio.abs() < 0.01 {
                    "LINEAR"
                } else if axial_ratio > 0.0 {
                    "RIGHT"
                } else {
                    "LEFT"
                };
                let magnitude = 10f64.powf(total / 20.0);
                rows.push(PatternRow {
                    theta,
                    phi,
                    vertical: total,
                    horizontal,
                    total,
                    axial_ratio,
                    tilt: 90.0 - 10.0 * ct * cp,
                    sense,
                    theta_magnitude: magnitude,
                    theta_phase: -phi / 2.0,
                    phi_magnitude: magnitude * 0.1,
                    phi_phase: 90.0 - phi / 2.0,
                });
            }
        }
        rows
    }

    /// Listing text for `deck`.
    pub fn listing(&mut self, deck: &str) -> String {
        let summary = DeckSummary::read(deck);
        debug!(
            "synthetic solve of {} wires, {} x {} pattern",
            summary.wires.len(),
            summary.theta_count,
            summary.phi_count
        );
        let currents = self.current_rows(&summary);
        let pattern = self.pattern_rows(&summary);

        let mut out = String::new();
        template::banner(&mut out, summary.frequency);
        template::currents_section(&mut out, &currents);
        template::pattern_section(&mut out, &pattern);
        template::trailer(&mut out);
        out
    }
}

impl SolverRunner for SyntheticSolver {
    fn run(&mut self, input: &Path, output: &Path) -> AntennaResult<()> {
        let deck = fs::read_to_string(input).map_err(|e| AntennaError::io(input, e))?;
        let listing = self.listing(&deck);
        fs::write(output, listing).map_err(|e| AntennaError::io(output, e))?;
        info!("synthetic solver wrote {}", output.display());
        Ok(())
    }
}

fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2) + (b[2] - a[2]).powi(2)).sqrt()
}

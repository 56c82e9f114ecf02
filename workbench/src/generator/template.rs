//! Fixed-layout sections of a solver output listing.

use antcore::solver::{CURRENTS_MARKER, PATTERN_MARKER};
use std::fmt::Write;

/// One row of the currents table.
#[derive(Debug, Clone, Copy)]
pub struct CurrentRow {
    pub segment: usize,
    pub tag: i64,
    pub center: [f64; 3],
    pub length: f64,
    pub magnitude: f64,
    /// Degrees.
    pub phase: f64,
}

/// One row of the radiation pattern table.
#[derive(Debug, Clone, Copy)]
pub struct PatternRow {
    pub theta: f64,
    pub phi: f64,
    pub vertical: f64,
    pub horizontal: f64,
    pub total: f64,
    pub axial_ratio: f64,
    pub tilt: f64,
    pub sense: &'static str,
    pub theta_magnitude: f64,
    pub theta_phase: f64,
    pub phi_magnitude: f64,
    pub phi_phase: f64,
}

pub fn banner(out: &mut String, frequency: f64) {
    let _ = writeln!(out, "          SYNTHETIC FIELD SOLVER");
    let _ = writeln!(out);
    let _ = writeln!(out, "          FREQUENCY= {:.4E} MHZ", frequency);
    let _ = writeln!(out);
}

pub fn currents_section(out: &mut String, rows: &[CurrentRow]) {
    let _ = writeln!(out, "                        - - - {} - - -", CURRENTS_MARKER);
    let _ = writeln!(out);
    let _ = writeln!(out, "                           DISTANCES IN WAVELENGTHS");
    let _ = writeln!(out);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "   SEG.  TAG    COORD. OF SEG. CENTER     SEG.            - - - CURRENT (AMPS) - - -"
    );
    let _ = writeln!(
        out,
        "   NO.   NO.     X         Y         Z      LENGTH     REAL      IMAG.     MAG.     PHASE"
    );
    for row in rows {
        let radians = row.phase.to_radians();
        let _ = writeln!(
            out,
            "{:6}{:5} {:9.4} {:9.4} {:9.4} {:9.5} {:11.4E} {:11.4E} {:11.4E} {:8.3}",
            row.segment,
            row.tag,
            row.center[0],
            row.center[1],
            row.center[2],
            row.length,
            row.magnitude * radians.cos(),
            row.magnitude * radians.sin(),
            row.magnitude,
            row.phase
        );
    }
    let _ = writeln!(out);
}

pub fn pattern_section(out: &mut String, rows: &[PatternRow]) {
    let _ = writeln!(out, "                        - - - {} - - -", PATTERN_MARKER);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        " - - ANGLES - -           - POWER GAINS -       - - - POLARIZATION - - -   - - - E(THETA) - - -    - - - E(PHI) - - -"
    );
    let _ = writeln!(
        out,
        "  THETA     PHI       VERT.    HOR.    TOTAL      AXIAL      TILT   SENSE   MAGNITUDE    PHASE    MAGNITUDE    PHASE"
    );
    let _ = writeln!(
        out,
        " DEGREES   DEGREES     DB       DB       DB       RATIO      DEG.            VOLTS/M   DEGREES     VOLTS/M   DEGREES"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:8.2} {:8.2} {:8.2} {:8.2} {:8.2} {:10.5} {:8.2} {:>7} {:11.4E} {:8.2} {:11.4E} {:8.2}",
            row.theta,
            row.phi,
            row.vertical,
            row.horizontal,
            row.total,
            row.axial_ratio,
            row.tilt,
            row.sense,
            row.theta_magnitude,
            row.theta_phase,
            row.phi_magnitude,
            row.phi_phase
        );
    }
    let _ = writeln!(out);
}

pub fn trailer(out: &mut String) {
    let _ = writeln!(out, "          RUN COMPLETE");
}

#[cfg(test)]
mod tests {
    use super::*;
    use antcore::solver::{parse_currents, parse_pattern};

    #[test]
    fn sections_line_up_with_the_output_reader() {
        let mut out = String::new();
        banner(&mut out, 14.2);
        currents_section(
            &mut out,
            &[
                CurrentRow {
                    segment: 1,
                    tag: 1,
                    center: [0.0, 0.0, -0.1],
                    length: 0.05,
                    magnitude: 2.5e-3,
                    phase: -12.0,
                },
                CurrentRow {
                    segment: 2,
                    tag: 1,
                    center: [0.0, 0.0, 0.1],
                    length: 0.05,
                    magnitude: 1.5e-3,
                    phase: 8.0,
                },
            ],
        );
        pattern_section(
            &mut out,
            &[PatternRow {
                theta: 90.0,
                phi: 0.0,
                vertical: 2.1,
                horizontal: -999.99,
                total: 2.1,
                axial_ratio: 0.0,
                tilt: 90.0,
                sense: "LINEAR",
                theta_magnitude: 1.0,
                theta_phase: 0.0,
                phi_magnitude: 0.0,
                phi_phase: 0.0,
            }],
        );
        trailer(&mut out);

        let currents = parse_currents(&out, 2).unwrap();
        assert_eq!(currents.anomalies, 0);
        assert_eq!(currents.records.len(), 2);
        assert!((currents.records[0].magnitude - 2.5e-3).abs() < 1e-7);
        assert!((currents.records[1].phase - 8.0).abs() < 1e-9);

        let pattern = parse_pattern(&out, 5.0).unwrap();
        assert_eq!(pattern.anomalies, 0);
        assert_eq!(pattern.field.len(), 1);
        assert_eq!(pattern.field.samples()[0].total_gain, 2.1);
    }
}

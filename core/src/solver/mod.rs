//! Solver I/O: description cards in, input decks out, the subprocess in
//! between and the output listing back into field data and currents.

pub mod cards;
pub mod output;
pub mod process;
pub mod session;
pub mod tokens;
pub mod writer;

pub use cards::{load_file, parse_description, FILE_UNITS};
pub use output::{
    assign_currents, parse_currents, parse_pattern, CurrentRecord, ParsedCurrents, ParsedPattern,
    CURRENTS_MARKER, PATTERN_MARKER,
};
pub use process::ProcessRunner;
pub use session::{SolveState, SolveSummary, Solver};
pub use writer::{write_combined, write_single, SolverDeck, TagEntry, TagKind, TagLayout};

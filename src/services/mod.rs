pub mod matching;

pub use matching::{select_candidate, MatchOutcome, MatchPolicy, AMBIGUOUS_PREVIEW};

/// Daily-double lookups against the hosted clue database.
pub mod clue_lookup;

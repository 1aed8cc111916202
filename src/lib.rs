pub mod arc_consistency;
pub mod backtracking_search;
pub mod grid;
pub mod types;
pub mod word_list;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

use std::collections::HashMap;

/// An identifier for a given variable (slot), based on its index in the `Crossword`'s
/// `variables` field.
pub type VariableId = usize;

/// An identifier for a given word, based on its index in the `WordList`'s `words` field.
pub type WordId = usize;

/// A mapping from variables to chosen words. Partial during search; a complete, consistent
/// assignment covers every variable with a distinct word whose letters agree at every overlap.
pub type Assignment = HashMap<VariableId, WordId>;

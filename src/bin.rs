use clap::Parser;
use crossfill::backtracking_search::Solver;
use crossfill::grid::Crossword;
use crossfill::word_list::WordList;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;

/// crossfill: Command-line crossword fill tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the structure file, as ASCII with # representing blocks and . representing open
    /// squares
    structure_path: String,

    /// Path to a wordlist file with one candidate word per line
    words_path: String,
}

struct Error(String);

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0) // Print error unquoted
    }
}

fn main() -> Result<(), Error> {
    env_logger::init();

    let args = Args::parse();

    let structure = fs::read_to_string(&args.structure_path)
        .map_err(|_| Error(format!("Couldn't read file '{}'", args.structure_path)))?;

    let word_list =
        WordList::from_file(Path::new(&args.words_path)).map_err(|err| Error(err.to_string()))?;

    let crossword =
        Crossword::new(&structure, word_list).map_err(|err| Error(err.to_string()))?;

    let mut solver = Solver::new(&crossword);

    match solver.solve() {
        Some(assignment) => println!("{}", crossword.render(&assignment)),
        None => println!("No solution."),
    }

    Ok(())
}

mod book;

pub use book::{ScoreBook, ScoreEntry, ScoreKey, INDIRECT_ASSESSMENT, INDIRECT_CO};

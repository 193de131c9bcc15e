// =============================================================================
// News Module
// =============================================================================
//
// Everything between a directory of text dumps and a list of Articles:
// - Dump discovery within the run window
// - Block parser
// - Headline deduplication (hard drop + damping)

pub mod dedup;
pub mod discovery;
pub mod parser;

pub use discovery::find_dumps;
pub use parser::parse_file;

mod align_finder;
mod types;

pub use align_finder::find_alignments;
pub use types::{CoarseHit, RefinedMatch, SearchParams, SearchResult, TargetGeometry};

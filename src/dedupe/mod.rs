//! Duplicate Detection & Merge for AI-import batches
//!
//! The vision collaborator's output is reviewed (`extraction`), each person
//! is fuzzy-matched against the chart (`matching`), and a merge strategy is
//! suggested per person (`merge`). `OrgEngine::apply_merge_decisions`
//! applies the (possibly overridden) decisions.

pub mod extraction;
pub mod matching;
pub mod merge;

pub use extraction::{
    review_extraction, ExtractedKind, ExtractedPerson, ExtractedRelationship, ExtractionMetadata, ExtractionResult,
    ExtractionReview, ExtractionWarning, ReviewedRelationship,
};
pub use matching::{find_duplicates, match_score, name_similarity, title_similarity, DuplicateMatch, PersonFields};
pub use merge::{suggest_merge_strategies, MergeConflict, MergeDecision, MergeStrategy};

/// Lowercase, trim and collapse inner whitespace
pub(crate) fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

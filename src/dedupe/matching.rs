//! Fuzzy person matching: name, title and location similarity

use serde::Serialize;
use std::cmp::Ordering;
use unicode_segmentation::UnicodeSegmentation;

use super::extraction::ExtractedPerson;
use super::normalize;
use crate::config::DuplicateConfig;
use crate::document::{GraphNode, NodeId, PersonNode};

/// The fields duplicate detection looks at
#[derive(Debug, Clone, Copy)]
pub struct PersonFields<'a> {
    pub name: &'a str,
    pub title: &'a str,
    pub location: Option<&'a str>,
}

impl<'a> From<&'a PersonNode> for PersonFields<'a> {
    fn from(p: &'a PersonNode) -> Self {
        Self {
            name: &p.name,
            title: &p.title,
            location: p.location.as_deref(),
        }
    }
}

impl<'a> From<&'a ExtractedPerson> for PersonFields<'a> {
    fn from(p: &'a ExtractedPerson) -> Self {
        Self {
            name: &p.name,
            title: &p.title,
            location: p.location.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateMatch {
    pub existing_id: NodeId,
    pub existing_name: String,
    pub score: f64,
    pub name_score: f64,
    pub title_score: f64,
    /// `None` when either side has no location
    pub location_score: Option<f64>,
}

// =============================================================================
// Name similarity
// =============================================================================

/// 1.0 exact, 0.95 containment, 0.9 same first and last word, otherwise
/// normalized Levenshtein similarity
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a.contains(&b) || b.contains(&a) {
        return 0.95;
    }

    let ta: Vec<&str> = a.unicode_words().collect();
    let tb: Vec<&str> = b.unicode_words().collect();
    if ta.len() >= 2 && tb.len() >= 2 && ta.first() == tb.first() && ta.last() == tb.last() {
        return 0.9;
    }

    strsim::normalized_levenshtein(&a, &b)
}

// =============================================================================
// Title similarity
// =============================================================================

const ABBREVIATIONS: &[(&str, &str)] = &[
    ("vp", "vice president"),
    ("svp", "senior vice president"),
    ("evp", "executive vice president"),
    ("avp", "assistant vice president"),
    ("ceo", "chief executive officer"),
    ("cto", "chief technology officer"),
    ("cfo", "chief financial officer"),
    ("coo", "chief operating officer"),
    ("cmo", "chief marketing officer"),
    ("cio", "chief information officer"),
    ("dir", "director"),
    ("mgr", "manager"),
    ("sr", "senior"),
    ("jr", "junior"),
    ("eng", "engineering"),
    ("hr", "human resources"),
];

/// Lowercased title with every known abbreviation spelled out
fn expand_title(title: &str) -> String {
    title
        .unicode_words()
        .map(|word| {
            let lower = word.to_lowercase();
            ABBREVIATIONS
                .iter()
                .find(|(short, _)| *short == lower)
                .map_or(lower.clone(), |(_, long)| long.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 1.0 exact, 0.8 containment, 0.7 equal after abbreviation expansion
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a.contains(&b) || b.contains(&a) {
        return 0.8;
    }

    let ea = expand_title(&a);
    let eb = expand_title(&b);
    if !ea.is_empty() && !eb.is_empty() && (ea == eb || ea.contains(&eb) || eb.contains(&ea)) {
        return 0.7;
    }
    0.0
}

fn location_similarity(a: Option<&str>, b: Option<&str>) -> Option<f64> {
    match (a.map(normalize), b.map(normalize)) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => Some(if a == b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

// =============================================================================
// Scoring
// =============================================================================

/// Weighted blend of name, title and (when both present) location
///
/// The blend is divided by the weight actually used, so identical people
/// always score 1.0 whether or not they carry a location.
pub fn match_score(a: PersonFields<'_>, b: PersonFields<'_>, config: &DuplicateConfig) -> f64 {
    score_parts(a, b, config).0
}

fn score_parts(a: PersonFields<'_>, b: PersonFields<'_>, config: &DuplicateConfig) -> (f64, f64, f64, Option<f64>) {
    let name = name_similarity(a.name, b.name);
    let title = title_similarity(a.title, b.title);
    let location = location_similarity(a.location, b.location);

    let mut total = config.name_weight * name + config.title_weight * title;
    let mut weight = config.name_weight + config.title_weight;
    if let Some(loc) = location {
        total += config.location_weight * loc;
        weight += config.location_weight;
    }

    let score = if weight > 0.0 { total / weight } else { 0.0 };
    (score, name, title, location)
}

/// Existing people resembling `candidate`, best first
///
/// Matches under the configured threshold are discarded.
pub fn find_duplicates(candidate: &ExtractedPerson, existing: &[GraphNode], config: &DuplicateConfig) -> Vec<DuplicateMatch> {
    let mut matches: Vec<DuplicateMatch> = existing
        .iter()
        .filter_map(GraphNode::as_person)
        .filter_map(|person| {
            let (score, name_score, title_score, location_score) =
                score_parts(candidate.into(), person.into(), config);
            (score >= config.match_threshold).then(|| DuplicateMatch {
                existing_id: person.id.clone(),
                existing_name: person.name.clone(),
                score,
                name_score,
                title_score,
                location_score,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.existing_id.cmp(&b.existing_id))
    });
    matches
}

//! Configuration types and defaults for OrgCore
//!
//! Every tunable constant used by history, layout, analysis and duplicate
//! detection lives here so callers can override them from JSON.

use serde::{Deserialize, Serialize};

use crate::error::Result;

// =============================================================================
// Layout
// =============================================================================

/// Node/rank separation pair for one layout pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Separation {
    /// Horizontal gap between neighbouring nodes in a rank
    pub node_sep: f64,
    /// Vertical gap between ranks
    pub rank_sep: f64,
}

impl Separation {
    pub const fn new(node_sep: f64, rank_sep: f64) -> Self {
        Self { node_sep, rank_sep }
    }
}

/// Layout engine parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Fixed card width. Default: 240
    pub node_width: f64,
    /// Fixed card height. Default: 110
    pub node_height: f64,
    /// Separations for the plain hierarchical layout. Default: (50, 100)
    pub base: Separation,
    /// Separations for cleanup in compact mode. Default: (80, 140)
    pub compact: Separation,
    /// Separations for cleanup in spacious mode. Default: (140, 200)
    pub spacious: Separation,
    /// Offset applied to duplicated nodes. Default: 40
    pub duplicate_offset: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 240.0,
            node_height: 110.0,
            base: Separation::new(50.0, 100.0),
            compact: Separation::new(80.0, 140.0),
            spacious: Separation::new(140.0, 200.0),
            duplicate_offset: 40.0,
        }
    }
}

// =============================================================================
// Analysis
// =============================================================================

/// Span-of-control status thresholds (inclusive upper bounds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpanThresholds {
    /// Largest direct-report count still "healthy". Default: 8
    pub healthy_max: usize,
    /// Largest direct-report count still "high"; above is "critical". Default: 10
    pub high_max: usize,
}

impl Default for SpanThresholds {
    fn default() -> Self {
        Self {
            healthy_max: 8,
            high_max: 10,
        }
    }
}

/// Bounds for the graph analysis routines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// Maximum hop count explored by all-paths enumeration. Default: 4
    pub max_path_depth: usize,
    /// Number of paths returned by all-paths. Default: 5
    pub max_paths: usize,
    /// Default sphere-of-influence depth. Default: 2
    pub sphere_depth: usize,
    /// Number of connection suggestions returned. Default: 5
    pub max_suggestions: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_path_depth: 4,
            max_paths: 5,
            sphere_depth: 2,
            max_suggestions: 5,
        }
    }
}

// =============================================================================
// Duplicate detection
// =============================================================================

/// Weights and score bands for duplicate detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DuplicateConfig {
    /// Matches scoring below this are discarded. Default: 0.6
    pub match_threshold: f64,
    /// Default: 0.6
    pub name_weight: f64,
    /// Default: 0.3
    pub title_weight: f64,
    /// Only counted when both sides have a location. Default: 0.1
    pub location_weight: f64,
    /// Scores strictly above this suggest skip/update. Default: 0.9
    pub skip_threshold: f64,
    /// Scores strictly above this (and up to skip) need review. Default: 0.7
    pub review_threshold: f64,
    /// Extraction confidence below this is flagged. Default: 0.6
    pub low_confidence: f64,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            match_threshold: 0.6,
            name_weight: 0.6,
            title_weight: 0.3,
            location_weight: 0.1,
            skip_threshold: 0.9,
            review_threshold: 0.7,
            low_confidence: 0.6,
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Undo/redo stack capacity. Default: 100
    pub history_capacity: usize,
    pub layout: LayoutConfig,
    pub span: SpanThresholds,
    pub analysis: AnalysisConfig,
    pub duplicates: DuplicateConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: 100,
            layout: LayoutConfig::default(),
            span: SpanThresholds::default(),
            analysis: AnalysisConfig::default(),
            duplicates: DuplicateConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON config; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Stricter duplicate matching for imports into large, name-dense charts
    pub fn strict_dedupe() -> Self {
        Self {
            duplicates: DuplicateConfig {
                match_threshold: 0.75,
                skip_threshold: 0.95,
                review_threshold: 0.8,
                low_confidence: 0.75,
                ..DuplicateConfig::default()
            },
            ..Self::default()
        }
    }

    /// Preset for large organizations: wider spans tolerated, shallower path search
    pub fn large_org() -> Self {
        Self {
            span: SpanThresholds {
                healthy_max: 12,
                high_max: 15,
            },
            analysis: AnalysisConfig {
                max_path_depth: 3,
                ..AnalysisConfig::default()
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = EngineConfig::default();
        assert_eq!(config.history_capacity, 100);
        assert_eq!(config.span.healthy_max, 8);
        assert_eq!(config.span.high_max, 10);
        assert_eq!(config.analysis.max_path_depth, 4);
        assert_eq!(config.analysis.max_paths, 5);
        assert!((config.duplicates.match_threshold - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = EngineConfig::from_json(r#"{"historyCapacity": 10, "span": {"highMax": 12}}"#).unwrap();
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.span.high_max, 12);
        assert_eq!(config.span.healthy_max, 8);
        assert_eq!(config.layout, LayoutConfig::default());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(EngineConfig::from_json("{not json").is_err());
    }

    #[test]
    fn test_presets() {
        assert!(EngineConfig::strict_dedupe().duplicates.match_threshold > 0.6);
        assert_eq!(EngineConfig::large_org().span.healthy_max, 12);
    }
}

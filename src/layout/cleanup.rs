//! Cleanup pass: wider hierarchical layout, row alignment, recentering

use std::cmp::Ordering;

use super::hierarchical::hierarchical_layout;
use super::{LayoutMode, PositionMap};
use crate::config::{LayoutConfig, Separation};
use crate::document::{GraphDocument, NodeId, Position};

/// Hierarchical layout with the mode's separations, re-spaced row by row and
/// centered on the origin
pub fn cleanup_layout(doc: &GraphDocument, mode: LayoutMode, config: &LayoutConfig) -> PositionMap {
    let separation = mode.separation(config);
    let mut positions = hierarchical_layout(doc, separation, config);

    for row in bucket_rows(&positions, separation.rank_sep) {
        respace_row(&mut positions, &row, mode, separation, config);
    }
    center_on_origin(&mut positions, config);
    positions
}

/// Groups nodes whose y lies within `tolerance` of the first node of the row
fn bucket_rows(positions: &PositionMap, tolerance: f64) -> Vec<Vec<NodeId>> {
    let mut by_y: Vec<(&NodeId, &Position)> = positions.iter().collect();
    by_y.sort_by(|a, b| a.1.y.partial_cmp(&b.1.y).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(b.0)));

    let mut rows: Vec<Vec<NodeId>> = Vec::new();
    let mut row_y = f64::NEG_INFINITY;
    for (id, pos) in by_y {
        if rows.is_empty() || pos.y - row_y > tolerance {
            row_y = pos.y;
            rows.push(Vec::new());
        }
        if let Some(row) = rows.last_mut() {
            row.push(id.clone());
        }
    }
    rows
}

fn respace_row(positions: &mut PositionMap, row: &[NodeId], mode: LayoutMode, sep: Separation, config: &LayoutConfig) {
    let mut members: Vec<(NodeId, Position)> = row
        .iter()
        .filter_map(|id| positions.get(id).map(|p| (id.clone(), *p)))
        .collect();
    if members.is_empty() {
        return;
    }
    members.sort_by(|a, b| a.1.x.partial_cmp(&b.1.x).unwrap_or(Ordering::Equal));

    let y = members[0].1.y;
    let min_x = members[0].1.x;
    let max_x = members[members.len() - 1].1.x;
    let gaps = members.len().saturating_sub(1);

    let even = if gaps == 0 { 0.0 } else { (max_x - min_x) / gaps as f64 };
    let step = match mode {
        LayoutMode::Spacious => even.max(config.node_width + sep.node_sep),
        _ => even,
    };

    for (i, (id, _)) in members.into_iter().enumerate() {
        positions.insert(id, Position::new(min_x + step * i as f64, y));
    }
}

/// Translate so the bounding box (node extents included) is centered at 0,0
fn center_on_origin(positions: &mut PositionMap, config: &LayoutConfig) {
    if positions.is_empty() {
        return;
    }
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in positions.values() {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x + config.node_width);
        max_y = max_y.max(p.y + config.node_height);
    }
    let dx = (min_x + max_x) / 2.0;
    let dy = (min_y + max_y) / 2.0;
    for p in positions.values_mut() {
        p.x -= dx;
        p.y -= dy;
    }
}

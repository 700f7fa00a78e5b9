//! Rank-based hierarchical layout driven by manager edges
//!
//! Ranks are longest-path layers over the manager DAG. Within ranks, nodes
//! are placed as a tidy forest: each node owns a horizontal interval wide
//! enough for its whole subtree, so siblings never overlap.

use std::collections::{HashMap, HashSet, VecDeque};

use super::PositionMap;
use crate::config::{LayoutConfig, Separation};
use crate::document::{GraphDocument, Position};

// =============================================================================
// Rank assignment
// =============================================================================

/// Rank (layer) of every node, 0 at the top
///
/// Manager edges between existing nodes are the only input. Nodes caught in
/// a reporting cycle still get a finite rank: one below their deepest ranked
/// manager, or 0.
pub fn assign_ranks(doc: &GraphDocument) -> HashMap<&str, usize> {
    let ids: Vec<&str> = doc.nodes.iter().map(|n| n.id()).collect();
    let position: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
    let mut parents: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
    let mut in_degree: Vec<usize> = vec![0; ids.len()];

    for edge in doc.manager_edges() {
        let (Some(&s), Some(&t)) = (position.get(edge.source.as_str()), position.get(edge.target.as_str())) else {
            continue;
        };
        if s == t {
            continue;
        }
        children[s].push(t);
        parents[t].push(s);
        in_degree[t] += 1;
    }

    let mut rank: Vec<Option<usize>> = vec![None; ids.len()];
    let mut level: Vec<usize> = vec![0; ids.len()];
    let mut queue: VecDeque<usize> = (0..ids.len()).filter(|i| in_degree[*i] == 0).collect();

    // Kahn's algorithm, carrying the longest distance from any root
    while let Some(node) = queue.pop_front() {
        rank[node] = Some(level[node]);
        for &child in &children[node] {
            level[child] = level[child].max(level[node] + 1);
            in_degree[child] -= 1;
            if in_degree[child] == 0 {
                queue.push_back(child);
            }
        }
    }

    // cycle leftovers, in document order
    for node in 0..ids.len() {
        if rank[node].is_some() {
            continue;
        }
        let below = parents[node].iter().filter_map(|p| rank[*p]).max().map_or(0, |r| r + 1);
        rank[node] = Some(below);
    }

    ids.into_iter()
        .zip(rank)
        .map(|(id, r)| (id, r.unwrap_or(0)))
        .collect()
}

// =============================================================================
// Placement
// =============================================================================

/// Top-left position of every node in `doc`
pub fn hierarchical_layout(doc: &GraphDocument, separation: Separation, config: &LayoutConfig) -> PositionMap {
    let ranks = assign_ranks(doc);
    let forest = Forest::build(doc, &ranks);

    let mut widths: HashMap<&str, f64> = HashMap::with_capacity(ranks.len());
    for root in &forest.roots {
        forest.measure(*root, separation, config, &mut widths);
    }

    let mut positions = PositionMap::new();
    let mut left = 0.0;
    for root in &forest.roots {
        let width = widths.get(root).copied().unwrap_or(config.node_width);
        forest.place(*root, left, &ranks, &widths, separation, config, &mut positions);
        left += width + separation.node_sep;
    }
    positions
}

/// Spanning forest of the manager graph: every node hangs below its first
/// manager that sits on a higher rank
struct Forest<'a> {
    roots: Vec<&'a str>,
    children: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> Forest<'a> {
    fn build(doc: &'a GraphDocument, ranks: &HashMap<&'a str, usize>) -> Self {
        let mut parent: HashMap<&'a str, &'a str> = HashMap::new();
        for edge in doc.manager_edges() {
            let (Some(&rs), Some(&rt)) = (ranks.get(edge.source.as_str()), ranks.get(edge.target.as_str())) else {
                continue;
            };
            if rs < rt {
                parent.entry(edge.target.as_str()).or_insert(edge.source.as_str());
            }
        }

        let mut roots = Vec::new();
        let mut children: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
        let mut seen = HashSet::new();
        for node in &doc.nodes {
            let id = node.id();
            if !seen.insert(id) {
                continue;
            }
            match parent.get(id) {
                Some(p) => children.entry(*p).or_default().push(id),
                None => roots.push(id),
            }
        }

        Self { roots, children }
    }

    fn kids(&self, id: &str) -> &[&'a str] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Width of the interval reserved for `id` and its subtree
    fn measure(&self, id: &'a str, sep: Separation, config: &LayoutConfig, widths: &mut HashMap<&'a str, f64>) -> f64 {
        let kids = self.kids(id);
        let mut block = 0.0;
        for (i, child) in kids.iter().enumerate() {
            if i > 0 {
                block += sep.node_sep;
            }
            block += self.measure(*child, sep, config, widths);
        }
        let width = block.max(config.node_width);
        widths.insert(id, width);
        width
    }

    #[allow(clippy::too_many_arguments)]
    fn place(
        &self,
        id: &'a str,
        left: f64,
        ranks: &HashMap<&str, usize>,
        widths: &HashMap<&str, f64>,
        sep: Separation,
        config: &LayoutConfig,
        positions: &mut PositionMap,
    ) {
        let width = widths.get(id).copied().unwrap_or(config.node_width);
        let rank = ranks.get(id).copied().unwrap_or(0) as f64;
        positions.insert(
            id.to_string(),
            Position::new(left + (width - config.node_width) / 2.0, rank * (config.node_height + sep.rank_sep)),
        );

        let kids = self.kids(id);
        let block: f64 = kids
            .iter()
            .map(|k| widths.get(k).copied().unwrap_or(config.node_width))
            .sum::<f64>()
            + sep.node_sep * kids.len().saturating_sub(1) as f64;

        let mut cursor = left + (width - block) / 2.0;
        for child in kids {
            self.place(*child, cursor, ranks, widths, sep, config, positions);
            cursor += widths.get(child).copied().unwrap_or(config.node_width) + sep.node_sep;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{create_empty_document, GraphEdge, GraphNode, PersonNode, RelationshipType};

    fn build(nodes: &[&str], edges: &[(&str, &str, RelationshipType)]) -> GraphDocument {
        let mut doc = create_empty_document();
        for id in nodes {
            doc.nodes.push(GraphNode::Person(PersonNode::new(*id, *id, "", 0)));
        }
        for (i, (s, t, rel)) in edges.iter().enumerate() {
            doc.edges.push(GraphEdge::new(format!("e{}", i), *s, *t, *rel));
        }
        doc
    }

    fn overlaps(a: Position, b: Position, config: &LayoutConfig) -> bool {
        (a.x - b.x).abs() < config.node_width && (a.y - b.y).abs() < config.node_height
    }

    // -------------------------------------------------------------------------
    // Ranks
    // -------------------------------------------------------------------------

    #[test]
    fn test_ranks_follow_longest_path() {
        use RelationshipType::Manager;
        // a -> b -> c and a -> c: c sits below b
        let doc = build(&["a", "b", "c"], &[("a", "b", Manager), ("b", "c", Manager), ("a", "c", Manager)]);
        let ranks = assign_ranks(&doc);
        assert_eq!(ranks["a"], 0);
        assert_eq!(ranks["b"], 1);
        assert_eq!(ranks["c"], 2);
    }

    #[test]
    fn test_ranks_ignore_other_relationships() {
        use RelationshipType::*;
        let doc = build(&["a", "b"], &[("a", "b", Dotted), ("b", "a", Sponsor)]);
        let ranks = assign_ranks(&doc);
        assert_eq!(ranks["a"], 0);
        assert_eq!(ranks["b"], 0);
    }

    #[test]
    fn test_ranks_finite_on_cycle() {
        use RelationshipType::Manager;
        let doc = build(
            &["root", "x", "y"],
            &[("root", "x", Manager), ("x", "y", Manager), ("y", "x", Manager)],
        );
        let ranks = assign_ranks(&doc);
        assert_eq!(ranks.len(), 3);
        assert_eq!(ranks["root"], 0);
        assert_eq!(ranks["x"], 1);
        assert_eq!(ranks["y"], 2);
    }

    // -------------------------------------------------------------------------
    // Placement
    // -------------------------------------------------------------------------

    #[test]
    fn test_parent_centered_over_children() {
        use RelationshipType::Manager;
        let doc = build(&["boss", "l", "r"], &[("boss", "l", Manager), ("boss", "r", Manager)]);
        let config = LayoutConfig::default();
        let positions = hierarchical_layout(&doc, config.base, &config);

        let (boss, l, r) = (positions["boss"], positions["l"], positions["r"]);
        assert_eq!(l.y, r.y);
        assert_eq!(l.y, config.node_height + config.base.rank_sep);
        assert_eq!(boss.y, 0.0);
        assert!((boss.x - (l.x + r.x) / 2.0).abs() < 1e-9);
        assert!((r.x - l.x - (config.node_width + config.base.node_sep)).abs() < 1e-9);
    }

    #[test]
    fn test_disconnected_nodes_are_separate_trees() {
        let doc = build(&["a", "b", "c"], &[]);
        let config = LayoutConfig::default();
        let positions = hierarchical_layout(&doc, config.base, &config);
        assert_eq!(positions.len(), 3);
        assert!(positions.values().all(|p| p.y == 0.0));
        assert!(!overlaps(positions["a"], positions["b"], &config));
        assert!(!overlaps(positions["b"], positions["c"], &config));
    }

    #[test]
    fn test_no_overlap_in_uneven_tree() {
        use RelationshipType::Manager;
        let doc = build(
            &["ceo", "cto", "cfo", "dev1", "dev2", "dev3", "acct", "intern"],
            &[
                ("ceo", "cto", Manager),
                ("ceo", "cfo", Manager),
                ("cto", "dev1", Manager),
                ("cto", "dev2", Manager),
                ("cto", "dev3", Manager),
                ("cfo", "acct", Manager),
                ("dev1", "intern", Manager),
            ],
        );
        let config = LayoutConfig::default();
        let positions = hierarchical_layout(&doc, config.base, &config);
        let all: Vec<Position> = positions.values().copied().collect();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert!(!overlaps(*a, *b, &config), "{:?} overlaps {:?}", a, b);
            }
        }
    }
}

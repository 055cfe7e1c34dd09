mod error;
mod gantt;
pub mod hierarchy;
mod summary;
pub mod text;
pub mod timeline;
pub(crate) mod types;
pub use error::{DataIntegrityIssue, TimelineError};
pub use hierarchy::{
    ExpandedSet, HierarchyIndex, assign_levels, resolve_visibility, toggle_expanded,
};
pub use summary::Summary;
pub use text::{format_date, range_caption, truncate_label};
pub use timeline::{
    AxisTick, BarGeometry, DateRange, DateSpan, MAX_AXIS_TICKS, axis_ticks, compute_date_span,
    effective_range, layout_bar, marker_fraction, order_for_display,
};
pub use types::*;
use gantt::*;

use crate::config::LayoutConfig;
use crate::ir::Node;
use std::collections::HashMap;

/// Resolves the visible tree for `expanded` and lays the visible nodes out on
/// a shared timeline.
///
/// "Today" is resolved once up front, so a single call never mixes dates
/// when it runs across midnight.
pub fn compute_layout(nodes: &[Node], expanded: &ExpandedSet, config: &LayoutConfig) -> Layout {
    let index = HierarchyIndex::new(nodes, config.sibling_order);
    compute_layout_with_index(&index, expanded, config)
}

/// [`compute_layout`] over an index the caller already built, e.g. to derive
/// the expanded set from it first. Sibling order is the index's, not
/// `config.sibling_order`.
pub fn compute_layout_with_index(
    index: &HierarchyIndex<'_>,
    expanded: &ExpandedSet,
    config: &LayoutConfig,
) -> Layout {
    let config = config.pinned();
    let nodes = index.nodes();
    let levels = index.levels();
    let visible = index.visible_positions(expanded);

    let rows: Vec<RowLayout> = visible
        .iter()
        .map(|&idx| {
            let node = &nodes[idx];
            let has_children = index.has_children(&node.id);
            RowLayout {
                id: node.id.clone(),
                label: truncate_label(&node.title, config.title_max_chars),
                title: node.title.clone(),
                status: node.status,
                rag: node.rag,
                level: index.level_at(idx),
                has_children,
                expanded: has_children && expanded.contains(node.id.as_str()),
                start_date: node.start_date,
                due_date: node.due_date,
                range: effective_range(node, &config),
            }
        })
        .collect();

    let visible_nodes: Vec<&Node> = visible.iter().map(|&idx| &nodes[idx]).collect();
    let timeline = match compute_date_span(visible_nodes.iter().copied(), &config) {
        Ok(span) => {
            tracing::debug!(
                start = %span.start,
                end = %span.end,
                bars = visible_nodes.len(),
                "laid out timeline"
            );
            TimelineData::Gantt(compute_gantt_layout(&visible_nodes, &levels, span, &config))
        }
        Err(err) => {
            tracing::debug!(%err, "skipping gantt layout");
            TimelineData::Empty
        }
    };

    Layout {
        reference_date: config.reference_date(),
        rows,
        levels,
        timeline,
        issues: index.issues().to_vec(),
        summary: Summary::collect(index),
    }
}

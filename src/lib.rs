//! Hierarchy visibility and timeline layout for epic → story → sub-task trees.
//!
//! The engine is pure: [`compute_layout`] (or the individual operations in
//! [`layout::hierarchy`] and [`layout::timeline`]) take a node collection and
//! the caller's expanded-id set and return rows, levels and bar geometry.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, SiblingOrder, load_config};
pub use ir::{Node, NodeDocument, Rag, Status, load_nodes, parse_nodes};
pub use layout::{
    DataIntegrityIssue, ExpandedSet, HierarchyIndex, Layout, TimelineData, TimelineError,
    assign_levels, compute_date_span, compute_layout, compute_layout_with_index, effective_range,
    layout_bar, order_for_display, resolve_visibility, toggle_expanded,
};

use serde::Serialize;
use std::collections::BTreeMap;

use super::hierarchy::HierarchyIndex;
use crate::ir::{Rag, Status};

/// Header metrics for a node collection. Duplicate records are not counted.
/// Epics are nodes without a parent reference; nodes made roots by repair
/// (dangling parent, cut cycle) are not epics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub epics: usize,
    pub done: usize,
    pub in_progress: usize,
    pub todo: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_rag: BTreeMap<String, usize>,
}

impl Summary {
    pub fn collect(index: &HierarchyIndex<'_>) -> Self {
        let mut summary = Summary {
            total: index.len(),
            ..Summary::default()
        };
        let mut statuses: BTreeMap<Status, usize> = BTreeMap::new();
        let mut rags: BTreeMap<Option<Rag>, usize> = BTreeMap::new();
        for (idx, node) in index.nodes().iter().enumerate() {
            if !index.is_included(idx) {
                continue;
            }
            if node.parent().is_none() {
                summary.epics += 1;
            }
            *statuses.entry(node.status).or_default() += 1;
            *rags.entry(node.rag).or_default() += 1;
        }
        summary.done = statuses.get(&Status::Done).copied().unwrap_or(0);
        summary.in_progress = statuses.get(&Status::InProgress).copied().unwrap_or(0);
        summary.todo = statuses.get(&Status::Todo).copied().unwrap_or(0);
        summary.by_status = statuses
            .into_iter()
            .map(|(status, count)| (status.label().to_string(), count))
            .collect();
        summary.by_rag = rags
            .into_iter()
            .map(|(rag, count)| (rag.map_or("Unset", Rag::label).to_string(), count))
            .collect();
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiblingOrder;
    use crate::ir::Node;

    #[test]
    fn repaired_roots_are_not_epics() {
        let nodes = vec![
            Node::new("E1", None),
            Node::new("X1", Some("ghost")),
            Node::new("A", Some("B")),
            Node::new("B", Some("A")),
        ];
        let index = HierarchyIndex::new(&nodes, SiblingOrder::Input);
        assert_eq!(index.root_count(), 3);
        let summary = Summary::collect(&index);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.epics, 1);
    }

    #[test]
    fn counts_statuses_rags_and_epics() {
        let nodes = vec![
            Node::new("E1", None).with_status(Status::InProgress).with_rag(Rag::Green),
            Node::new("E2", None).with_status(Status::Done).with_rag(Rag::Green),
            Node::new("S1", Some("E1")).with_status(Status::Done).with_rag(Rag::Red),
            Node::new("S2", Some("E1")),
            Node::new("S2", Some("E2")).with_status(Status::Done),
        ];
        let index = HierarchyIndex::new(&nodes, SiblingOrder::Input);
        let summary = Summary::collect(&index);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.epics, 2);
        assert_eq!(summary.done, 2);
        assert_eq!(summary.in_progress, 1);
        assert_eq!(summary.todo, 1);
        assert_eq!(summary.by_status["Done"], 2);
        assert_eq!(summary.by_rag["Green"], 2);
        assert_eq!(summary.by_rag["Red"], 1);
        assert_eq!(summary.by_rag["Unset"], 1);
    }
}

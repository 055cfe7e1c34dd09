use std::collections::{HashMap, HashSet, VecDeque};

use super::error::DataIntegrityIssue;
use crate::config::SiblingOrder;
use crate::ir::Node;

/// Ids whose children are currently shown. Owned by the caller.
pub type ExpandedSet = HashSet<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unseen,
    OnPath,
    Done,
}

/// Parent-indexed view of a node collection, built once in O(n).
///
/// Construction repairs malformed input so that the result is always a
/// forest: later duplicates of an id are left out, dangling parents become
/// roots, and every parent cycle is cut at the member that comes first in the
/// input. Each repair is recorded in [`HierarchyIndex::issues`].
#[derive(Debug, Clone)]
pub struct HierarchyIndex<'a> {
    nodes: &'a [Node],
    positions: HashMap<&'a str, usize>,
    included: Vec<bool>,
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
    levels: Vec<Option<usize>>,
    issues: Vec<DataIntegrityIssue>,
}

impl<'a> HierarchyIndex<'a> {
    pub fn new(nodes: &'a [Node], order: SiblingOrder) -> Self {
        let mut issues = Vec::new();
        let mut positions: HashMap<&'a str, usize> = HashMap::with_capacity(nodes.len());
        let mut included = vec![true; nodes.len()];
        for (idx, node) in nodes.iter().enumerate() {
            if positions.contains_key(node.id.as_str()) {
                included[idx] = false;
                issues.push(DataIntegrityIssue::DuplicateId {
                    id: node.id.clone(),
                    position: idx,
                });
            } else {
                positions.insert(node.id.as_str(), idx);
            }
        }

        let mut parents = vec![None; nodes.len()];
        for (idx, node) in nodes.iter().enumerate() {
            if !included[idx] {
                continue;
            }
            let Some(parent) = node.parent() else {
                continue;
            };
            match positions.get(parent) {
                Some(&parent_idx) => parents[idx] = Some(parent_idx),
                None => issues.push(DataIntegrityIssue::DanglingParent {
                    id: node.id.clone(),
                    parent: parent.to_string(),
                }),
            }
        }

        break_cycles(nodes, &included, &mut parents, &mut issues);

        let mut children = vec![Vec::new(); nodes.len()];
        let mut roots = Vec::new();
        for idx in (0..nodes.len()).filter(|&idx| included[idx]) {
            match parents[idx] {
                Some(parent_idx) => children[parent_idx].push(idx),
                None => roots.push(idx),
            }
        }
        if order == SiblingOrder::Id {
            let by_id = |a: &usize, b: &usize| nodes[*a].id.cmp(&nodes[*b].id);
            roots.sort_by(by_id);
            for list in &mut children {
                list.sort_by(by_id);
            }
        }

        let levels = compute_levels(nodes.len(), &roots, &children);

        for issue in &issues {
            tracing::warn!(%issue, "repaired node hierarchy");
        }
        tracing::debug!(
            nodes = nodes.len(),
            roots = roots.len(),
            issues = issues.len(),
            "built hierarchy index"
        );

        Self {
            nodes,
            positions,
            included,
            parents,
            children,
            roots,
            levels,
            issues,
        }
    }

    pub fn nodes(&self) -> &'a [Node] {
        self.nodes
    }

    pub fn issues(&self) -> &[DataIntegrityIssue] {
        &self.issues
    }

    pub fn get(&self, id: &str) -> Option<&'a Node> {
        let nodes = self.nodes;
        self.positions.get(id).map(move |&idx| &nodes[idx])
    }

    /// Number of distinct ids in the tree.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn roots(&self) -> impl Iterator<Item = &'a Node> + '_ {
        let nodes = self.nodes;
        self.roots.iter().map(move |&idx| &nodes[idx])
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// The effective parent after repairs; `None` for roots and unknown ids.
    pub fn parent_of(&self, id: &str) -> Option<&'a Node> {
        let nodes = self.nodes;
        let idx = *self.positions.get(id)?;
        self.parents[idx].map(move |parent_idx| &nodes[parent_idx])
    }

    pub fn children_of(&self, id: &str) -> impl Iterator<Item = &'a Node> + '_ {
        let list = match self.positions.get(id) {
            Some(&idx) => self.children[idx].as_slice(),
            None => &[],
        };
        let nodes = self.nodes;
        list.iter().map(move |&idx| &nodes[idx])
    }

    /// Whether the node would render an expand/collapse toggle.
    pub fn has_children(&self, id: &str) -> bool {
        self.positions
            .get(id)
            .is_some_and(|&idx| !self.children[idx].is_empty())
    }

    /// Every id with at least one child, i.e. the "expand all" set.
    pub fn expandable_ids(&self) -> ExpandedSet {
        self.positions
            .iter()
            .filter(|&(_, &idx)| !self.children[idx].is_empty())
            .map(|(id, _)| (*id).to_string())
            .collect()
    }

    pub fn level(&self, id: &str) -> Option<usize> {
        self.positions.get(id).and_then(|&idx| self.levels[idx])
    }

    /// Depth from the nearest root for every node in the tree.
    pub fn levels(&self) -> HashMap<String, usize> {
        self.positions
            .iter()
            .filter_map(|(id, &idx)| self.levels[idx].map(|level| ((*id).to_string(), level)))
            .collect()
    }

    /// Visible nodes in display order: pre-order from the roots, descending
    /// into a node's children only when its id is expanded.
    pub fn visible_nodes(&self, expanded: &ExpandedSet) -> Vec<&'a Node> {
        let nodes = self.nodes;
        self.visible_positions(expanded)
            .into_iter()
            .map(|idx| &nodes[idx])
            .collect()
    }

    pub fn visible_ids(&self, expanded: &ExpandedSet) -> Vec<&'a str> {
        let nodes = self.nodes;
        self.visible_positions(expanded)
            .into_iter()
            .map(|idx| nodes[idx].id.as_str())
            .collect()
    }

    pub(crate) fn visible_positions(&self, expanded: &ExpandedSet) -> Vec<usize> {
        let mut visible = Vec::new();
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            if std::mem::replace(&mut visited[idx], true) {
                continue;
            }
            visible.push(idx);
            if expanded.contains(self.nodes[idx].id.as_str()) {
                stack.extend(
                    self.children[idx]
                        .iter()
                        .rev()
                        .copied()
                        .filter(|&child| !visited[child]),
                );
            }
        }
        visible
    }

    pub(crate) fn level_at(&self, idx: usize) -> usize {
        self.levels.get(idx).copied().flatten().unwrap_or(0)
    }

    pub(crate) fn is_included(&self, idx: usize) -> bool {
        self.included.get(idx).copied().unwrap_or(false)
    }
}

fn break_cycles(
    nodes: &[Node],
    included: &[bool],
    parents: &mut [Option<usize>],
    issues: &mut Vec<DataIntegrityIssue>,
) {
    let mut marks = vec![Mark::Unseen; nodes.len()];
    let mut path = Vec::new();
    for start in 0..nodes.len() {
        if !included[start] || marks[start] != Mark::Unseen {
            continue;
        }
        path.clear();
        let mut current = Some(start);
        while let Some(idx) = current {
            match marks[idx] {
                Mark::Done => break,
                Mark::OnPath => {
                    let from = path.iter().position(|&p| p == idx).unwrap_or(0);
                    let members = &path[from..];
                    let cut = members.iter().copied().min().unwrap_or(idx);
                    parents[cut] = None;
                    issues.push(DataIntegrityIssue::Cycle {
                        members: members.iter().map(|&m| nodes[m].id.clone()).collect(),
                        cut: nodes[cut].id.clone(),
                    });
                    break;
                }
                Mark::Unseen => {
                    marks[idx] = Mark::OnPath;
                    path.push(idx);
                    current = parents[idx];
                }
            }
        }
        for &idx in &path {
            marks[idx] = Mark::Done;
        }
    }
}

fn compute_levels(len: usize, roots: &[usize], children: &[Vec<usize>]) -> Vec<Option<usize>> {
    let mut levels = vec![None; len];
    let mut queue = VecDeque::with_capacity(len);
    for &root in roots {
        levels[root] = Some(0);
        queue.push_back(root);
    }
    while let Some(idx) = queue.pop_front() {
        let next = levels[idx].unwrap_or(0) + 1;
        for &child in &children[idx] {
            if levels[child].is_none() {
                levels[child] = Some(next);
                queue.push_back(child);
            }
        }
    }
    levels
}

/// Ordered ids a tree view would render for `expanded`, siblings in input order.
pub fn resolve_visibility(nodes: &[Node], expanded: &ExpandedSet) -> Vec<String> {
    HierarchyIndex::new(nodes, SiblingOrder::Input)
        .visible_ids(expanded)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Depth of every node below its nearest root (roots are level 0).
pub fn assign_levels(nodes: &[Node]) -> HashMap<String, usize> {
    HierarchyIndex::new(nodes, SiblingOrder::Input).levels()
}

/// Flips the expansion of `id` and returns whether it is now expanded.
pub fn toggle_expanded(expanded: &mut ExpandedSet, id: &str) -> bool {
    if expanded.remove(id) {
        false
    } else {
        expanded.insert(id.to_string());
        true
    }
}

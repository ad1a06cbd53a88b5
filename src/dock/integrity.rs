use ahash::{HashMap, HashSet};
use itertools::Itertools as _;

use super::tree::{Node, SplitterTree};
use super::types::NodeId;
use super::DockContainer;

pub(super) fn tree_integrity_issues(tree: &SplitterTree) -> Vec<String> {
    let mut issues: Vec<String> = Vec::new();

    let Some(root) = tree.root() else {
        if tree.node_ids().next().is_some() {
            issues.push("integrity: root=None but nodes non-empty".to_owned());
        }
        return issues;
    };

    match tree.get(root) {
        None => {
            issues.push(format!("integrity: root {root} missing"));
            return issues;
        }
        Some(Node::Section(_)) => issues.push(format!("integrity: root {root} is a section")),
        Some(Node::Splitter(_)) => {}
    }

    let mut visited: HashSet<NodeId> = HashSet::default();
    let mut parent_of: HashMap<NodeId, NodeId> = HashMap::default();
    let mut stack: Vec<NodeId> = vec![root];

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }

        let Some(node) = tree.get(id) else {
            issues.push(format!("integrity: missing node {id} (reachable)"));
            continue;
        };

        let splitter = match node {
            Node::Section(section) => {
                let active_ok = match section.active_index() {
                    Some(active) => active < section.len(),
                    None => section.is_empty(),
                };
                if !active_ok {
                    issues.push(format!(
                        "integrity: section {id} active {:?} with {} contents",
                        section.active_index(),
                        section.len()
                    ));
                }
                continue;
            }
            Node::Splitter(splitter) => splitter,
        };

        if splitter.sizes().len() != splitter.len() {
            issues.push(format!(
                "integrity: splitter {id} has {} sizes for {} children",
                splitter.sizes().len(),
                splitter.len()
            ));
        }

        let mut local_set: HashSet<NodeId> = HashSet::default();
        for &child in splitter.children() {
            if !local_set.insert(child) {
                issues.push(format!(
                    "integrity: splitter {id} contains duplicate child {child}"
                ));
                continue;
            }

            if tree.get(child).is_none() {
                issues.push(format!(
                    "integrity: splitter {id} references missing child {child}"
                ));
                continue;
            }

            if let Some(prev_parent) = parent_of.insert(child, id) {
                issues.push(format!(
                    "integrity: child {child} has multiple parents {prev_parent} and {id}"
                ));
            }

            stack.push(child);
        }
    }

    issues.extend(
        tree.parent_links()
            .filter(|(child, parent)| parent_of.get(child) != Some(parent))
            .sorted()
            .map(|(child, parent)| format!("integrity: stale parent link {child} -> {parent}")),
    );
    for (&child, &parent) in parent_of.iter().sorted() {
        if tree.parent_of(child) != Some(parent) {
            issues.push(format!(
                "integrity: child {child} of {parent} has parent link {:?}",
                tree.parent_of(child)
            ));
        }
    }

    let total = tree.len();
    if visited.len() != total {
        issues.push(format!(
            "integrity: unreachable nodes {} of {}",
            total.saturating_sub(visited.len()),
            total
        ));
    }

    issues
}

/// Tree checks plus "every content is placed exactly once".
pub(super) fn layout_integrity_issues(container: &DockContainer) -> Vec<String> {
    let mut issues = tree_integrity_issues(&container.tree);

    let mut seen: HashMap<u32, String> = HashMap::default();
    let mut record = |uid: u32, place: String, name: &str| {
        if let Some(first) = seen.insert(uid, place.clone()) {
            issues.push(format!(
                "integrity: content {name:?} (uid {uid}) placed in both {first} and {place}"
            ));
        }
    };

    for id in container.tree.sections() {
        let Some(section) = container.tree.section(id) else {
            continue;
        };
        for content in section.contents() {
            record(content.uid(), format!("section {id}"), content.unique_name());
        }
    }
    for panel in &container.floating {
        record(
            panel.payload.uid(),
            format!("floating panel {:?}", panel.id),
            panel.content().unique_name(),
        );
    }

    issues
}

impl SplitterTree {
    /// Structural problems with the tree, empty if it is consistent.
    pub fn integrity_issues(&self) -> Vec<String> {
        tree_integrity_issues(self)
    }
}

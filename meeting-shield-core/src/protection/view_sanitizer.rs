use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::models::config::EngineConfig;
use crate::models::policy::RedactionVocabulary;
use crate::traits::ui_node::UiNode;

/// Bounds on one traversal of a third-party view tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLimits {
    pub max_depth: usize,
    pub max_nodes: usize,
}

impl ScanLimits {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            max_depth: config.max_scan_depth,
            max_nodes: config.max_scan_nodes,
        }
    }
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_depth: 32,
            max_nodes: 4096,
        }
    }
}

/// Result of one sanitization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub visited: usize,
    pub concealed: usize,
    /// A depth or node limit cut the traversal short.
    pub truncated: bool,
}

#[derive(Default)]
struct ScanPass {
    seen: HashSet<u64>,
    report: ScanReport,
}

/// Walks a view tree and conceals the containing group of every node whose
/// visible text contains a redaction phrase.
///
/// Never fails: adapter errors and panics are logged and the walk moves on to
/// the next sibling.
#[derive(Debug, Clone)]
pub struct ViewSanitizer {
    vocabulary: RedactionVocabulary,
    limits: ScanLimits,
}

impl ViewSanitizer {
    pub fn new(vocabulary: RedactionVocabulary, limits: ScanLimits) -> Self {
        Self { vocabulary, limits }
    }

    /// Number of groups concealed by this pass.
    pub fn scan(&self, root: Option<&Arc<dyn UiNode>>) -> usize {
        self.scan_with_report(root).concealed
    }

    pub fn scan_with_report(&self, root: Option<&Arc<dyn UiNode>>) -> ScanReport {
        let Some(root) = root else {
            return ScanReport::default();
        };

        let mut pass = ScanPass::default();
        self.visit(root, 0, &mut pass);

        if pass.report.truncated {
            log::debug!(
                "sanitizer pass truncated after {} nodes (depth cap {}, node cap {})",
                pass.report.visited,
                self.limits.max_depth,
                self.limits.max_nodes
            );
        }
        pass.report
    }

    fn visit(&self, node: &Arc<dyn UiNode>, depth: usize, pass: &mut ScanPass) {
        if depth >= self.limits.max_depth || pass.report.visited >= self.limits.max_nodes {
            pass.report.truncated = true;
            return;
        }

        let children = match panic::catch_unwind(AssertUnwindSafe(|| self.inspect(node, pass))) {
            Ok(children) => children,
            Err(_) => {
                log::warn!("view node panicked during inspection; skipping its subtree");
                return;
            }
        };

        for child in children.iter().flatten() {
            self.visit(child, depth + 1, pass);
        }
    }

    /// Match and conceal one node, then hand back its children.
    fn inspect(&self, node: &Arc<dyn UiNode>, pass: &mut ScanPass) -> Vec<Option<Arc<dyn UiNode>>> {
        if let Some(key) = node.node_key() {
            if !pass.seen.insert(key) {
                return Vec::new();
            }
        }
        pass.report.visited += 1;

        let is_match = node
            .visible_text()
            .map(|text| self.vocabulary.matches(&text.to_lowercase()))
            .unwrap_or(false);
        if is_match {
            let group = node.containing_group().unwrap_or_else(|| Arc::clone(node));
            if !group.is_concealed() {
                match group.conceal() {
                    Ok(()) => pass.report.concealed += 1,
                    Err(e) => log::warn!("failed to conceal sensitive view group: {}", e),
                }
            }
        }

        node.children()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeNode;

    fn sanitizer() -> ViewSanitizer {
        ViewSanitizer::new(RedactionVocabulary::default(), ScanLimits::default())
    }

    #[test]
    fn conceals_group_of_meeting_id_leaf() {
        let root = FakeNode::group(1);
        let row = FakeNode::group(2);
        let leaf = FakeNode::text(3, "Meeting ID: 123 456 7890");
        row.push(&leaf);
        root.push(&row);

        let count = sanitizer().scan(Some(&FakeNode::as_node(&root)));

        assert!(count >= 1);
        assert!(row.concealed());
        assert!(!leaf.concealed());
        assert!(!root.concealed());
    }

    #[test]
    fn tree_without_matches_is_untouched() {
        let root = FakeNode::group(1);
        let a = FakeNode::text(2, "Mute");
        let b = FakeNode::text(3, "Participants (3)");
        root.push(&a);
        root.push(&b);

        let count = sanitizer().scan(Some(&FakeNode::as_node(&root)));

        assert_eq!(count, 0);
        assert!(!root.concealed() && !a.concealed() && !b.concealed());
        assert_eq!(root.conceal_calls() + a.conceal_calls() + b.conceal_calls(), 0);
    }

    #[test]
    fn cyclic_tree_terminates() {
        let root = FakeNode::group(1);
        let child = FakeNode::group(2);
        let leaf = FakeNode::text(3, "Passcode: 998877");
        child.push(&leaf);
        child.push(&root);
        root.push(&child);

        let report = sanitizer().scan_with_report(Some(&FakeNode::as_node(&root)));

        assert_eq!(report.concealed, 1);
        assert!(report.truncated);
        assert!(report.visited <= ScanLimits::default().max_nodes);
    }

    #[test]
    fn node_keys_stop_revisits() {
        let root = FakeNode::group(1).keyed();
        let child = FakeNode::group(2).keyed();
        child.push(&root);
        root.push(&child);

        let report = sanitizer().scan_with_report(Some(&FakeNode::as_node(&root)));

        assert_eq!(report.visited, 2);
        assert!(!report.truncated);
    }

    #[test]
    fn branching_cycle_hits_node_budget() {
        let root = FakeNode::group(1);
        root.push(&root);
        root.push(&root);

        let limits = ScanLimits {
            max_depth: 64,
            max_nodes: 500,
        };
        let report = ViewSanitizer::new(RedactionVocabulary::default(), limits)
            .scan_with_report(Some(&FakeNode::as_node(&root)));

        assert_eq!(report.visited, 500);
        assert!(report.truncated);
    }

    #[test]
    fn multiple_matches_in_one_group_count_once() {
        let root = FakeNode::group(1);
        let panel = FakeNode::group(2);
        let id = FakeNode::text(3, "Meeting ID");
        let link = FakeNode::text(4, "Invite link: https://zoom.us/j/1");
        panel.push(&id);
        panel.push(&link);
        root.push(&panel);

        let count = sanitizer().scan(Some(&FakeNode::as_node(&root)));

        assert_eq!(count, 1);
        assert_eq!(panel.conceal_calls(), 1);
    }

    #[test]
    fn missing_root_and_null_children_are_skipped() {
        assert_eq!(sanitizer().scan(None), 0);

        let root = FakeNode::group(1);
        let row = FakeNode::group(2);
        let leaf = FakeNode::text(3, "PASSWORD");
        root.push_missing();
        row.push(&leaf);
        root.push(&row);

        assert_eq!(sanitizer().scan(Some(&FakeNode::as_node(&root))), 1);
    }

    #[test]
    fn failures_and_panics_do_not_stop_siblings() {
        let root = FakeNode::group(1);
        let broken_row = FakeNode::group(2).failing_conceal();
        let exploding = FakeNode::text(3, "boom").panicking();
        let good_row = FakeNode::group(4);

        broken_row.push(&FakeNode::text(5, "meeting id"));
        good_row.push(&FakeNode::text(6, "passcode"));
        root.push(&broken_row);
        root.push(&exploding);
        root.push(&good_row);

        let count = sanitizer().scan(Some(&FakeNode::as_node(&root)));

        assert_eq!(count, 1);
        assert!(good_row.concealed());
        assert!(!broken_row.concealed());
    }

    #[test]
    fn orphan_match_conceals_itself() {
        let orphan = FakeNode::text(1, "zoom.us/j/42");
        let count = sanitizer().scan(Some(&FakeNode::as_node(&orphan)));
        assert_eq!(count, 1);
        assert!(orphan.concealed());
    }

    #[test]
    fn already_concealed_group_is_not_counted() {
        let root = FakeNode::group(1);
        let row = FakeNode::group(2);
        row.push(&FakeNode::text(3, "Meeting ID"));
        root.push(&row);
        let root_node = FakeNode::as_node(&root);

        assert_eq!(sanitizer().scan(Some(&root_node)), 1);
        assert_eq!(sanitizer().scan(Some(&root_node)), 0);
        assert!(row.concealed());
    }
}

//! Page scanner
//!
//! Walks a [`DocumentTree`] depth-first and wraps driver names found in text
//! nodes. Already annotated subtrees and non-content elements are skipped, so
//! scanning the same tree again changes nothing.

use super::matcher::DriverMatcher;
use super::tree::{DocumentTree, Fragment, NodeKind};
use crate::models::DirectoryEntry;

/// Class carried by annotation elements
pub const DRIVER_CLASS: &str = "f1-driver";

/// Class carried by the popup container
pub const POPUP_CLASS: &str = "f1-popup";

/// Tags whose content is never scanned
pub const IGNORED_TAGS: &[&str] = &[
    "script", "style", "noscript", "textarea", "input", "code", "pre", "option",
];

/// Upper bound on matches wrapped in one text node
pub const MAX_MATCHES_PER_NODE: usize = 100;

/// Scanner over a loaded drivers directory
#[derive(Debug, Clone, Default)]
pub struct PageScanner {
    matcher: DriverMatcher,
}

impl PageScanner {
    pub fn new(directory: &[DirectoryEntry]) -> Self {
        Self {
            matcher: DriverMatcher::new(directory),
        }
    }

    /// Whether a non-empty directory is loaded
    pub fn is_ready(&self) -> bool {
        !self.matcher.is_empty()
    }

    pub fn matcher(&self) -> &DriverMatcher {
        &self.matcher
    }

    /// Annotate every driver name under `root`
    ///
    /// Returns the number of names wrapped. Without a directory this is a
    /// no-op.
    pub fn scan<T: DocumentTree>(&self, tree: &mut T, root: T::NodeId) -> usize {
        if !self.is_ready() {
            tracing::debug!("Directory not loaded, skipping scan");
            return 0;
        }

        let mut wrapped = 0;
        let mut pending = vec![root];

        while let Some(node) = pending.pop() {
            match tree.kind(node) {
                NodeKind::Text => wrapped += self.annotate_node(tree, node),
                NodeKind::Other => {}
                NodeKind::Element if self.is_skipped(tree, node) => {}
                NodeKind::Element | NodeKind::Container => {
                    pending.extend(tree.children(node).into_iter().rev());
                }
            }
        }

        wrapped
    }

    fn is_skipped<T: DocumentTree>(&self, tree: &T, node: T::NodeId) -> bool {
        let ignored_tag = tree
            .tag_name(node)
            .is_some_and(|tag| IGNORED_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag)));
        ignored_tag || tree.has_class(node, DRIVER_CLASS) || tree.has_class(node, POPUP_CLASS)
    }

    fn annotate_node<T: DocumentTree>(&self, tree: &mut T, node: T::NodeId) -> usize {
        let Some((fragments, wrapped)) = tree.text(node).and_then(|text| self.split_text(text))
        else {
            return 0;
        };
        tree.replace_with(node, fragments);
        wrapped
    }

    /// Split text into plain and annotated fragments
    ///
    /// Returns `None` when the text mentions no driver.
    pub fn split_text(&self, text: &str) -> Option<(Vec<Fragment>, usize)> {
        if text.is_empty() || !self.matcher.contains_driver(text) {
            return None;
        }

        let mut fragments = Vec::new();
        let mut last = 0;
        let mut wrapped = 0;

        while wrapped < MAX_MATCHES_PER_NODE {
            let Some(found) = self.matcher.find_best_match(text, last) else {
                break;
            };

            if found.offset > last {
                fragments.push(Fragment::Text(text[last..found.offset].to_string()));
            }
            fragments.push(Fragment::Driver {
                key: found.entry.key.clone(),
                name: found.entry.name.clone(),
                text: text[found.offset..found.end()].to_string(),
            });
            wrapped += 1;

            if found.end() <= last {
                tracing::warn!(offset = found.offset, "Scan made no progress, stopping");
                break;
            }
            last = found.end();
        }

        if last < text.len() {
            fragments.push(Fragment::Text(text[last..].to_string()));
        }

        Some((fragments, wrapped))
    }
}

//! Driver name annotation
//!
//! This module finds driver names in page text and wraps them in annotation
//! elements. The scanner works over the [`DocumentTree`] interface;
//! [`PageTree`] is the HTML binding.

pub mod html;
pub mod matcher;
pub mod scanner;
pub mod tree;

pub use html::PageTree;
pub use matcher::{DriverMatcher, NameMatch};
pub use scanner::PageScanner;
pub use tree::{DocumentTree, Fragment, NodeKind};

use crate::models::DirectoryEntry;

/// Result of annotating a piece of HTML
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotated {
    pub html: String,
    /// Number of names wrapped
    pub wrapped: usize,
}

/// Annotate HTML against a directory
///
/// `full_document` selects document parsing (doctype, `<html>`, `<head>`
/// and `<body>` are emitted) over fragment parsing. Documents are only
/// scanned from `<body>` down.
pub fn annotate_html(directory: &[DirectoryEntry], input: &str, full_document: bool) -> Annotated {
    let mut tree = if full_document {
        PageTree::parse_document(input)
    } else {
        PageTree::parse_fragment(input)
    };
    let root = match tree.body() {
        Some(body) if full_document => body,
        _ => tree.root(),
    };
    let wrapped = PageScanner::new(directory).scan(&mut tree, root);

    Annotated {
        html: tree.to_html(),
        wrapped,
    }
}

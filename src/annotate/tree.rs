//! Abstract document tree
//!
//! The scanner only sees this interface, so it works the same over the
//! crate's HTML adapter and any other DOM binding.

use crate::models::DriverKey;

/// Coarse node classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Document or fragment root
    Container,
    Element,
    Text,
    /// Comments, doctypes and anything else without scannable content
    Other,
}

/// Replacement content for a text node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    /// Annotated driver mention
    Driver {
        key: DriverKey,
        /// Directory display name, used for the accessible label
        name: String,
        /// Page text that matched, kept as the element's content
        text: String,
    },
}

/// Tree that can be walked and have text nodes replaced in place
pub trait DocumentTree {
    type NodeId: Copy;

    fn kind(&self, node: Self::NodeId) -> NodeKind;

    /// Element tag name, `None` for non-elements
    fn tag_name(&self, node: Self::NodeId) -> Option<&str>;

    fn has_class(&self, node: Self::NodeId, class: &str) -> bool;

    /// Child nodes in document order
    fn children(&self, node: Self::NodeId) -> Vec<Self::NodeId>;

    /// Content of a text node
    fn text(&self, node: Self::NodeId) -> Option<&str>;

    /// Replace `node` with the fragments, in order
    fn replace_with(&mut self, node: Self::NodeId, fragments: Vec<Fragment>);
}

//! HTML binding of the document tree
//!
//! Edits the `scraper` DOM in place and serializes it with html5ever, so
//! namespaced attributes and foreign content survive untouched.

use ego_tree::NodeId;
use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, Namespace, QualName};
use scraper::node::{Element, Text};
use scraper::{CaseSensitivity, ElementRef, Html, Node};

use super::scanner::DRIVER_CLASS;
use super::tree::{DocumentTree, Fragment, NodeKind};
use crate::models::DriverKey;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Parsed page with a designated serialization root
#[derive(Debug, Clone)]
pub struct PageTree {
    html: Html,
    root: NodeId,
}

impl PageTree {
    /// Parse a full document
    pub fn parse_document(html: &str) -> Self {
        let html = Html::parse_document(html);
        let root = html.tree.root().id();
        Self { html, root }
    }

    /// Parse a fragment; serialization emits only the fragment's own nodes
    pub fn parse_fragment(html: &str) -> Self {
        let html = Html::parse_fragment(html);
        // html5ever wraps fragments in a synthetic <html> element
        let root = html
            .tree
            .root()
            .children()
            .find(|child| child.value().is_element())
            .map_or_else(|| html.tree.root().id(), |wrapper| wrapper.id());
        Self { html, root }
    }

    /// Root of the serialized content
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `<body>` element of a parsed document
    pub fn body(&self) -> Option<NodeId> {
        self.html
            .tree
            .root()
            .descendants()
            .find(|node| node.value().as_element().is_some_and(|e| e.name() == "body"))
            .map(|node| node.id())
    }

    /// Serialize the content under the root
    pub fn to_html(&self) -> String {
        self.html
            .tree
            .get(self.root)
            .and_then(ElementRef::wrap)
            .map_or_else(|| self.html.html(), |wrapper| wrapper.inner_html())
    }
}

fn text_node(text: String) -> Node {
    Node::Text(Text {
        text: StrTendril::from(text),
    })
}

fn attribute(name: &str, value: String) -> Attribute {
    Attribute {
        name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
        value: StrTendril::from(value),
    }
}

fn driver_span(key: &DriverKey, name: &str) -> Node {
    let tag = QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from("span"));
    Node::Element(Element::new(
        tag,
        vec![
            attribute("class", DRIVER_CLASS.to_string()),
            attribute("data-driver", key.to_string()),
            attribute("tabindex", "0".to_string()),
            attribute("role", "button".to_string()),
            attribute("aria-label", format!("{name} stats")),
        ],
    ))
}

impl DocumentTree for PageTree {
    type NodeId = NodeId;

    fn kind(&self, node: NodeId) -> NodeKind {
        match self.html.tree.get(node).map(|n| n.value()) {
            Some(Node::Document | Node::Fragment) => NodeKind::Container,
            Some(Node::Element(_)) => NodeKind::Element,
            Some(Node::Text(_)) => NodeKind::Text,
            _ => NodeKind::Other,
        }
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.html
            .tree
            .get(node)?
            .value()
            .as_element()
            .map(|element| element.name())
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.html
            .tree
            .get(node)
            .and_then(|n| n.value().as_element())
            .is_some_and(|element| element.has_class(class, CaseSensitivity::CaseSensitive))
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.html
            .tree
            .get(node)
            .map(|n| n.children().map(|child| child.id()).collect())
            .unwrap_or_default()
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        self.html
            .tree
            .get(node)?
            .value()
            .as_text()
            .map(|text| &**text)
    }

    fn replace_with(&mut self, node: NodeId, fragments: Vec<Fragment>) {
        let Some(mut target) = self.html.tree.get_mut(node) else {
            return;
        };
        if target.parent().is_none() {
            return;
        }

        for fragment in fragments {
            match fragment {
                Fragment::Text(text) => {
                    target.insert_before(text_node(text));
                }
                Fragment::Driver { key, name, text } => {
                    let mut span = target.insert_before(driver_span(&key, &name));
                    span.append(text_node(text));
                }
            }
        }
        target.detach();
    }
}

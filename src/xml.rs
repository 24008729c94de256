//! Owned XML element tree.
//!
//! Responses are parsed with `roxmltree` and copied into an owned [`Element`]
//! so that an envelope can outlive the response body it came from.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::XmlError;

/// An XML element with its attributes, direct text and child elements
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    /// Concatenated direct text content, `None` when there is none
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse a document and return its root element
    pub fn parse(xml: &str) -> Result<Element, XmlError> {
        let document = roxmltree::Document::parse(xml)?;
        Ok(Self::from_node(document.root_element()))
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Element {
        let attributes = node
            .attributes()
            .map(|attr| (attr.name().to_string(), attr.value().to_string()))
            .collect();

        let mut text = String::new();
        let mut children = Vec::new();
        for child in node.children() {
            if child.is_element() {
                children.push(Self::from_node(child));
            } else if child.is_text()
                && let Some(t) = child.text()
            {
                text.push_str(t);
            }
        }

        Element {
            name: node.tag_name().name().to_string(),
            attributes,
            text: if text.is_empty() { None } else { Some(text) },
            children,
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Direct text content
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// First child element with the given tag name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first child element with the given tag name
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(Element::text)
    }

    /// The child `rowset` whose `name` attribute matches
    pub fn rowset(&self, name: &str) -> Option<&Element> {
        self.children_named("rowset")
            .find(|rowset| rowset.attr("name") == Some(name))
    }

    /// The `row` children of a rowset
    pub fn rows(&self) -> impl Iterator<Item = &Element> + '_ {
        self.children_named("row")
    }
}

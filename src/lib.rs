use std::collections::HashMap;
use std::fmt::Display;

#[derive(Debug, Eq, PartialEq)]
pub struct MarkupNode {
    pub tag_name: String,
    pub attributes: MarkupAttributes,
    pub children: Vec<MarkupNode>,
}

#[derive(Debug, Eq, PartialEq, Default)]
pub struct MarkupAttributes(pub HashMap<String, String>);

impl MarkupAttributes {
    pub fn empty() -> Self {
        Self(HashMap::new())
    }
}

#[macro_export]
macro_rules! attributes {
    ($($k:ident => $v:expr),* $(,)?) => {
        $crate::MarkupAttributes(std::collections::HashMap::from([
            $((stringify!($k).to_string(), $v.to_string())),*
        ]))
    };
}

impl MarkupNode {
    pub fn new(
        name: impl Display,
        attributes: Option<MarkupAttributes>,
        children: Vec<MarkupNode>,
    ) -> Self {
        Self {
            tag_name: name.to_string(),
            attributes: attributes.unwrap_or_else(MarkupAttributes::empty),
            children,
        }
    }

    pub fn get_attribute(&self, name: &str) -> Option<&String> {
        self.attributes.0.get(name)
    }

    /// Returns the children with the given tag name, in document order.
    /// If `recursive` is set the whole subtree is searched, not just the
    /// direct children.
    pub fn get_elements_by_name(&self, name: &str, recursive: bool) -> Vec<&MarkupNode> {
        let mut found = Vec::new();
        for child in &self.children {
            if child.tag_name == name {
                found.push(child);
            }
            if recursive {
                found.extend(child.get_elements_by_name(name, true));
            }
        }
        found
    }
}

mod parsing;

pub use parsing::{document, parse};

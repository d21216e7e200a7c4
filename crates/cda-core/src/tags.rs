//! Namespace-tolerant element and attribute lookup.
//!
//! CDA documents mix the default HL7 namespace with prefixed extensions
//! (`sdtc:`, `xsi:`). Tag matching compares local names only: the prefix is
//! stripped from both the element and the requested tag before comparing.
//! Namespace URIs are not resolved.

use crate::document::Node;

/// Strips a `prefix:` from a tag name.
pub fn local_part(tag: &str) -> &str {
    tag.rsplit_once(':').map_or(tag, |(_, local)| local)
}

impl<'a> Node<'a> {
    /// True when this element's local name equals `tag`'s local name.
    pub fn is_tag(&self, tag: &str) -> bool {
        self.local_name() == local_part(tag)
    }

    /// First direct child with the given local name.
    pub fn first_child_by_tag(&self, tag: &str) -> Option<Node<'a>> {
        self.children().find(|child| child.is_tag(tag))
    }

    /// All direct children with the given local name, in document order.
    pub fn all_children_by_tag(&self, tag: &str) -> Vec<Node<'a>> {
        self.children().filter(|child| child.is_tag(tag)).collect()
    }

    /// Literal value of an attribute, or `None` if it is not declared.
    ///
    /// The value is returned as written (after XML unescaping): no trimming,
    /// no case folding.
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.attributes()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    /// Follows `path` one step at a time through the first matching child.
    ///
    /// An empty path returns this element.
    pub fn first_by_path(&self, path: &[&str]) -> Option<Node<'a>> {
        path.iter()
            .try_fold(*self, |node, tag| node.first_child_by_tag(tag))
    }

    /// All elements reached by `path`, expanding every matching child at
    /// each step. Results stay in document order.
    ///
    /// An empty path returns this element alone.
    pub fn all_by_path(&self, path: &[&str]) -> Vec<Node<'a>> {
        let mut current = vec![*self];
        for tag in path {
            current = current
                .iter()
                .flat_map(|node| node.all_children_by_tag(tag))
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }
}

//! Template identifier lookup.
//!
//! CDA marks the kind of a section or entry with one or more
//! `<templateId root="OID"/>` children. An element can declare several
//! identifiers (a general template and its more specific versions), so a
//! lookup matches when the OID is anywhere in the declared set.

use cda_model::{C32_TEMPLATE_ID, CCDA_TEMPLATE_ID, DocumentKind};
use tracing::{debug, warn};

use crate::document::{Document, Node};

const TEMPLATE_ID_TAG: &str = "templateId";
const TEMPLATE_ID_ROOT: &str = "root";

impl<'a> Node<'a> {
    /// `root` values of this element's direct `templateId` children, in
    /// declaration order.
    pub fn template_ids(&self) -> Vec<&'a str> {
        self.children()
            .filter(|child| child.is_tag(TEMPLATE_ID_TAG))
            .filter_map(|child| child.attribute(TEMPLATE_ID_ROOT))
            .collect()
    }

    /// True when `oid` is among this element's declared template ids.
    pub fn has_template_id(&self, oid: &str) -> bool {
        self.children()
            .filter(|child| child.is_tag(TEMPLATE_ID_TAG))
            .any(|child| child.attribute(TEMPLATE_ID_ROOT) == Some(oid))
    }
}

/// First element at or below `root`, depth-first in document order, that
/// declares `oid` as one of its template ids.
pub fn find_by_template<'a>(root: Node<'a>, oid: &str) -> Option<Node<'a>> {
    root.descendants().find(|node| node.has_template_id(oid))
}

impl Document {
    /// Searches the whole document for the first element declaring `oid`.
    pub fn template(&self, oid: &str) -> Option<Node<'_>> {
        find_by_template(self.root(), oid)
    }
}

/// Classifies a document by the header templates it declares.
///
/// C32 is checked before C-CDA.
pub fn detect(document: &Document) -> DocumentKind {
    let kind = if document.template(C32_TEMPLATE_ID).is_some() {
        DocumentKind::C32
    } else if document.template(CCDA_TEMPLATE_ID).is_some() {
        DocumentKind::Ccda
    } else {
        DocumentKind::Unknown
    };
    match kind {
        DocumentKind::Unknown => warn!("document type not recognised"),
        _ => debug!(kind = %kind, "document type detected"),
    }
    kind
}

//! Read-only XML element tree built from the quick-xml event stream.
//!
//! Elements live in a flat arena in document (pre-order) order, so the
//! subtree of an element is the contiguous id range `id..subtree_end`.
//! [`Node`] is a cheap `Copy` handle into that arena and cannot outlive the
//! [`Document`] it came from.
//!
//! Only elements and their attributes are kept. Text, comments and
//! processing instructions are skipped while parsing.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::error::DocumentError;

/// Position of an element in its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Element {
    name: String,
    local_name: String,
    attributes: Vec<(String, String)>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// One past the last id in this element's subtree.
    subtree_end: usize,
}

/// A parsed, immutable XML document.
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    /// Parses a document held in memory.
    pub fn parse_str(xml: &str) -> Result<Self, DocumentError> {
        Self::from_reader(xml.as_bytes())
    }

    /// Parses a document from a file on disk.
    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        let file = File::open(path).map_err(|source| DocumentError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let document = Self::from_reader(BufReader::new(file))?;
        debug!(
            path = %path.display(),
            elements = document.element_count(),
            "document loaded"
        );
        Ok(document)
    }

    /// Parses a document from any buffered reader.
    pub fn from_reader<R: BufRead>(source: R) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_reader(source);
        let mut builder = TreeBuilder::default();
        let mut buf = Vec::new();
        loop {
            let decoder = reader.decoder();
            match reader.read_event_into(&mut buf)? {
                Event::Start(start) => builder.open(&start, decoder)?,
                Event::Empty(start) => {
                    builder.open(&start, decoder)?;
                    builder.close_current();
                }
                Event::End(end) => {
                    let qname = end.name();
                    let name = decoder.decode(qname.as_ref()).map_err(DocumentError::xml)?;
                    builder.close(&name)?;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        builder.finish()
    }

    /// The document element.
    pub fn root(&self) -> Node<'_> {
        Node {
            document: self,
            id: NodeId(0),
        }
    }

    /// Resolves an id to a handle, or `None` if the id is not part of this
    /// document.
    pub fn node(&self, id: NodeId) -> Option<Node<'_>> {
        (id.0 < self.elements.len()).then_some(Node { document: self, id })
    }

    /// Number of elements in the tree.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}

/// Handle to one element of a [`Document`].
#[derive(Clone, Copy)]
pub struct Node<'a> {
    document: &'a Document,
    id: NodeId,
}

impl<'a> Node<'a> {
    fn element(&self) -> &'a Element {
        &self.document.elements[self.id.0]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    /// Qualified tag name as written, including any namespace prefix.
    pub fn name(&self) -> &'a str {
        &self.element().name
    }

    /// Tag name with the namespace prefix removed.
    pub fn local_name(&self) -> &'a str {
        &self.element().local_name
    }

    /// Attributes in declaration order, with values unescaped.
    pub fn attributes(&self) -> impl Iterator<Item = (&'a str, &'a str)> + use<'a> {
        self.element()
            .attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn parent(&self) -> Option<Node<'a>> {
        self.element().parent.map(|id| self.with_id(id))
    }

    /// Direct child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = Node<'a>> + use<'a> {
        let document = self.document;
        self.element()
            .children
            .iter()
            .map(move |&id| Node { document, id })
    }

    /// This element followed by all its descendants, depth-first in
    /// document order.
    pub fn descendants(&self) -> impl Iterator<Item = Node<'a>> + use<'a> {
        let document = self.document;
        (self.id.0..self.element().subtree_end).map(move |index| Node {
            document,
            id: NodeId(index),
        })
    }

    fn with_id(&self, id: NodeId) -> Node<'a> {
        Node {
            document: self.document,
            id,
        }
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.document, other.document) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id.0)
            .field("name", &self.name())
            .finish()
    }
}

#[derive(Default)]
struct TreeBuilder {
    elements: Vec<Element>,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    fn open(&mut self, start: &BytesStart<'_>, decoder: Decoder) -> Result<(), DocumentError> {
        let name = decoder
            .decode(start.name().as_ref())
            .map_err(DocumentError::xml)?
            .into_owned();
        let parent = self.open.last().copied();
        if parent.is_none() && !self.elements.is_empty() {
            return Err(DocumentError::MultipleRoots { name });
        }
        let local_name = decoder
            .decode(start.local_name().as_ref())
            .map_err(DocumentError::xml)?
            .into_owned();

        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(DocumentError::xml)?;
            let key = decoder
                .decode(attribute.key.as_ref())
                .map_err(DocumentError::xml)?
                .into_owned();
            let value = attribute
                .decode_and_unescape_value(decoder)
                .map_err(DocumentError::xml)?
                .into_owned();
            attributes.push((key, value));
        }

        let id = NodeId(self.elements.len());
        self.elements.push(Element {
            name,
            local_name,
            attributes,
            parent,
            children: Vec::new(),
            subtree_end: id.0 + 1,
        });
        if let Some(parent) = parent {
            self.elements[parent.0].children.push(id);
        }
        self.open.push(id);
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<(), DocumentError> {
        match self.open.last() {
            Some(&id) if self.elements[id.0].name == name => {
                self.close_current();
                Ok(())
            }
            _ => Err(DocumentError::UnexpectedEnd {
                name: name.to_string(),
            }),
        }
    }

    fn close_current(&mut self) {
        if let Some(id) = self.open.pop() {
            self.elements[id.0].subtree_end = self.elements.len();
        }
    }

    fn finish(self) -> Result<Document, DocumentError> {
        if let Some(&id) = self.open.last() {
            return Err(DocumentError::Unclosed {
                name: self.elements[id.0].name.clone(),
            });
        }
        if self.elements.is_empty() {
            return Err(DocumentError::Empty);
        }
        Ok(Document {
            elements: self.elements,
        })
    }
}

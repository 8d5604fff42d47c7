//! A forward-only cursor over EWS XML documents.
//!
//! [`XmlCursor`] is the set of operations the decoders in this crate need from a document
//! reader. [`EwsXmlReader`] implements it on top of `quick-xml`'s namespace-aware reader.

use std::fmt;
use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::error::{Error, Result, StructuralError};

/// The XML namespaces that appear in EWS documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum XmlNamespace {
    /// Matches elements without a namespace.
    NotSpecified,
    /// `m:`, request and response messages.
    Messages,
    /// `t:`, the EWS type schema.
    Types,
    /// `e:`, error details.
    Errors,
    /// `soap:`, the SOAP 1.1 envelope.
    Soap,
}

impl XmlNamespace {
    /// The namespace URI.
    pub fn uri(self) -> &'static str {
        match self {
            XmlNamespace::NotSpecified => "",
            XmlNamespace::Messages => "http://schemas.microsoft.com/exchange/services/2006/messages",
            XmlNamespace::Types => "http://schemas.microsoft.com/exchange/services/2006/types",
            XmlNamespace::Errors => "http://schemas.microsoft.com/exchange/services/2006/errors",
            XmlNamespace::Soap => "http://schemas.xmlsoap.org/soap/envelope/",
        }
    }

    /// The prefix conventionally bound to this namespace.
    pub fn prefix(self) -> &'static str {
        match self {
            XmlNamespace::NotSpecified => "",
            XmlNamespace::Messages => "m",
            XmlNamespace::Types => "t",
            XmlNamespace::Errors => "e",
            XmlNamespace::Soap => "soap",
        }
    }

    /// Whether a resolved namespace URI belongs to this namespace.
    pub fn matches(self, uri: Option<&str>) -> bool {
        match (self, uri) {
            (XmlNamespace::NotSpecified, None) => true,
            (XmlNamespace::NotSpecified, Some(uri)) => uri.is_empty(),
            (ns, Some(uri)) => ns.uri() == uri,
            (_, None) => false,
        }
    }
}

/// The kind of node the cursor is positioned on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XmlNodeType {
    /// Nothing has been read yet.
    None,
    /// A start tag, or an empty element (see [`XmlCursor::is_empty_element`]).
    StartElement,
    /// An end tag.
    EndElement,
    /// Character data, including CDATA sections.
    Text,
}

/// The operations the decoders need from a forward-only document reader.
///
/// Implementations skip insignificant nodes (whitespace, comments, declarations and processing
/// instructions) and never rewind. An empty element is reported as a single start element for
/// which [`is_empty_element`](XmlCursor::is_empty_element) is `true`; no end element follows it.
pub trait XmlCursor {
    /// Advance to the next significant node.
    ///
    /// Reading past the end of the document is a [`StructuralError::UnexpectedEndOfDocument`].
    fn read(&mut self) -> Result<()>;

    /// The kind of the current node.
    fn node_type(&self) -> XmlNodeType;

    /// Local name of the current element, or `""` for other nodes.
    fn local_name(&self) -> &str;

    /// Resolved namespace URI of the current element, if it has one.
    fn namespace_uri(&self) -> Option<&str>;

    /// Nesting depth of the current node. Children of an element are one deeper than the
    /// element; its end tag has the element's depth.
    fn depth(&self) -> usize;

    /// Whether the current start element is self-closing.
    fn is_empty_element(&self) -> bool;

    /// Value of an attribute of the current start element, looked up by local name.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Content of the current text node, or `""` for other nodes.
    fn value(&self) -> &str;

    /// Whether the cursor is on a start element.
    fn is_start_element(&self) -> bool {
        self.node_type() == XmlNodeType::StartElement
    }

    /// Whether the cursor is on the start of the given element.
    fn is_start_element_named(&self, namespace: XmlNamespace, local_name: &str) -> bool {
        self.is_start_element()
            && self.local_name() == local_name
            && namespace.matches(self.namespace_uri())
    }

    /// Whether the cursor is on the end of the given element.
    fn is_end_element(&self, namespace: XmlNamespace, local_name: &str) -> bool {
        self.node_type() == XmlNodeType::EndElement
            && self.local_name() == local_name
            && namespace.matches(self.namespace_uri())
    }

    /// Read one node and require it to be the start of the given element.
    fn read_start_element(&mut self, namespace: XmlNamespace, local_name: &str) -> Result<()> {
        self.read()?;
        if self.is_start_element_named(namespace, local_name) {
            Ok(())
        } else {
            Err(unexpected(self, namespace, local_name))
        }
    }

    /// Read one node and require it to be the end of the given element.
    fn read_end_element(&mut self, namespace: XmlNamespace, local_name: &str) -> Result<()> {
        self.read()?;
        if self.is_end_element(namespace, local_name) {
            Ok(())
        } else {
            Err(unexpected(self, namespace, local_name))
        }
    }

    /// Consume the subtree of the current element, leaving the cursor on its end tag.
    ///
    /// Does nothing if the cursor is not on a start element, or if the element is empty.
    fn skip_current_element(&mut self) -> Result<()> {
        if !self.is_start_element() || self.is_empty_element() {
            return Ok(());
        }
        let depth = self.depth();
        loop {
            self.read()?;
            if self.node_type() == XmlNodeType::EndElement && self.depth() == depth {
                return Ok(());
            }
        }
    }

    /// Consume a simple element and return its text content.
    ///
    /// The cursor must be on the element's start tag and is left on its end tag.
    fn read_element_value(&mut self) -> Result<String> {
        if !self.is_start_element() {
            return Err(StructuralError::NotAtStartElement(describe(self)).into());
        }
        let mut value = String::new();
        if self.is_empty_element() {
            return Ok(value);
        }
        let depth = self.depth();
        loop {
            self.read()?;
            match self.node_type() {
                XmlNodeType::Text => value.push_str(self.value()),
                XmlNodeType::EndElement if self.depth() == depth => return Ok(value),
                _ => {
                    return Err(
                        StructuralError::UnexpectedChildElement(self.local_name().to_owned())
                            .into(),
                    )
                }
            }
        }
    }

    /// Move to the given element, if not already there, and return its text content.
    fn read_element_value_named(
        &mut self,
        namespace: XmlNamespace,
        local_name: &str,
    ) -> Result<String> {
        if !self.is_start_element_named(namespace, local_name) {
            self.read_start_element(namespace, local_name)?;
        }
        self.read_element_value()
    }

    /// Owned copy of an attribute of the current element.
    fn read_attribute_value(&self, name: &str) -> Option<String> {
        self.attribute(name).map(str::to_owned)
    }
}

impl<C: XmlCursor + ?Sized> XmlCursor for &mut C {
    fn read(&mut self) -> Result<()> {
        (**self).read()
    }

    fn node_type(&self) -> XmlNodeType {
        (**self).node_type()
    }

    fn local_name(&self) -> &str {
        (**self).local_name()
    }

    fn namespace_uri(&self) -> Option<&str> {
        (**self).namespace_uri()
    }

    fn depth(&self) -> usize {
        (**self).depth()
    }

    fn is_empty_element(&self) -> bool {
        (**self).is_empty_element()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        (**self).attribute(name)
    }

    fn value(&self) -> &str {
        (**self).value()
    }
}

pub(crate) fn describe<C: XmlCursor + ?Sized>(cursor: &C) -> String {
    match cursor.node_type() {
        XmlNodeType::None => "nothing".to_owned(),
        XmlNodeType::StartElement => format!("<{}>", cursor.local_name()),
        XmlNodeType::EndElement => format!("</{}>", cursor.local_name()),
        XmlNodeType::Text => "text".to_owned(),
    }
}

fn unexpected<C: XmlCursor + ?Sized>(cursor: &C, namespace: XmlNamespace, name: &str) -> Error {
    StructuralError::UnexpectedElement {
        expected: format!("{{{}}}{}", namespace.uri(), name),
        found: describe(cursor),
    }
    .into()
}

/// The node the reader is currently positioned on.
#[derive(Debug, Default)]
struct Node {
    namespace: Option<String>,
    local_name: String,
    attributes: Vec<(String, String)>,
    value: String,
    is_empty: bool,
}

/// An [`XmlCursor`] over any buffered byte source.
pub struct EwsXmlReader<R: BufRead> {
    reader: NsReader<R>,
    buf: Vec<u8>,
    node_type: XmlNodeType,
    node: Node,
    depth: usize,
    open: usize,
}

impl<'a> EwsXmlReader<&'a [u8]> {
    /// Make a reader over an in-memory document.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(document: &'a str) -> Self {
        EwsXmlReader::new(document.as_bytes())
    }
}

impl<R: BufRead> EwsXmlReader<R> {
    /// Make a reader over the given source. Nothing is read until the first call to
    /// [`XmlCursor::read`].
    pub fn new(source: R) -> Self {
        let mut reader = NsReader::from_reader(source);
        reader.config_mut().trim_text(true);
        EwsXmlReader {
            reader,
            buf: Vec::new(),
            node_type: XmlNodeType::None,
            node: Node::default(),
            depth: 0,
            open: 0,
        }
    }

    /// Byte offset of the reader in the source.
    pub fn buffer_position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }
}

fn namespace_of(resolved: ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        _ => None,
    }
}

impl<R: BufRead> XmlCursor for EwsXmlReader<R> {
    fn read(&mut self) -> Result<()> {
        loop {
            self.buf.clear();
            let (resolved, event) = self.reader.read_resolved_event_into(&mut self.buf)?;
            let mut node = Node::default();
            let node_type = match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    node.is_empty = matches!(event, Event::Empty(_));
                    node.namespace = namespace_of(resolved);
                    node.local_name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    for attr in e.attributes() {
                        let attr = attr.map_err(quick_xml::Error::from)?;
                        let key = attr.key;
                        if key.as_ref() == b"xmlns" || key.as_ref().starts_with(b"xmlns:") {
                            continue;
                        }
                        node.attributes.push((
                            String::from_utf8_lossy(key.local_name().as_ref()).into_owned(),
                            attr.unescape_value()
                                .map_err(quick_xml::Error::from)?
                                .into_owned(),
                        ));
                    }
                    self.depth = self.open;
                    if !node.is_empty {
                        self.open += 1;
                    }
                    XmlNodeType::StartElement
                }
                Event::End(ref e) => {
                    node.namespace = namespace_of(resolved);
                    node.local_name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    self.open = self.open.saturating_sub(1);
                    self.depth = self.open;
                    XmlNodeType::EndElement
                }
                Event::Text(ref e) => {
                    node.value = e.unescape().map_err(quick_xml::Error::from)?.into_owned();
                    if node.value.is_empty() {
                        continue;
                    }
                    self.depth = self.open;
                    XmlNodeType::Text
                }
                Event::CData(ref e) => {
                    node.value = String::from_utf8_lossy(e).into_owned();
                    self.depth = self.open;
                    XmlNodeType::Text
                }
                Event::Eof => return Err(StructuralError::UnexpectedEndOfDocument.into()),
                // declarations, comments, processing instructions, doctype
                _ => continue,
            };
            self.node_type = node_type;
            self.node = node;
            return Ok(());
        }
    }

    fn node_type(&self) -> XmlNodeType {
        self.node_type
    }

    fn local_name(&self) -> &str {
        &self.node.local_name
    }

    fn namespace_uri(&self) -> Option<&str> {
        self.node.namespace.as_deref()
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn is_empty_element(&self) -> bool {
        self.node_type == XmlNodeType::StartElement && self.node.is_empty
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.node
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn value(&self) -> &str {
        &self.node.value
    }
}

impl<R: BufRead> fmt::Debug for EwsXmlReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EwsXmlReader")
            .field("node_type", &self.node_type)
            .field("node", &self.node)
            .field("depth", &self.depth)
            .finish()
    }
}

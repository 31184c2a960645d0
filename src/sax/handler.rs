use std::fmt::Write as _;

use crate::sax::{attributes::Attributes, error::SAXParseError};

/// Receiver of parse events.
///
/// Every method has an empty default implementation, so a handler only needs to
/// implement the events it is interested in.
pub trait SAXHandler {
    /// # Reference
    /// [`ContentHandler` interface in Java SAX API](https://docs.oracle.com/javase/jp/21/docs/api/java.xml/org/xml/sax/ContentHandler.html)
    fn characters(&mut self, data: &str) {
        let _ = data;
    }

    /// Receive the XML declaration.
    ///
    /// This is reported at most once per document and before any element.
    /// `standalone` is `false` unless the declaration says `standalone='yes'`.
    fn declaration(&mut self, version: Option<&str>, encoding: Option<&str>, standalone: bool) {
        let _ = (version, encoding, standalone);
    }

    /// # Reference
    /// [`ContentHandler` interface in Java SAX API](https://docs.oracle.com/javase/jp/21/docs/api/java.xml/org/xml/sax/ContentHandler.html)
    fn processing_instruction(&mut self, target: &str, data: Option<&str>) {
        let _ = (target, data);
    }

    fn start_document(&mut self) {}
    fn end_document(&mut self) {}

    /// # Reference
    /// [`ContentHandler` interface in Java SAX API](https://docs.oracle.com/javase/jp/21/docs/api/java.xml/org/xml/sax/ContentHandler.html)
    fn start_element(
        &mut self,
        uri: Option<&str>,
        local_name: &str,
        qname: &str,
        atts: &Attributes,
    ) {
        let _ = (uri, local_name, qname, atts);
    }
    fn end_element(&mut self, uri: Option<&str>, local_name: &str, qname: &str) {
        let _ = (uri, local_name, qname);
    }

    /// Receive a namespace binding before the `start_element` of the element declaring it.
    ///
    /// `prefix` is `None` for the default namespace.
    fn start_prefix_mapping(&mut self, prefix: Option<&str>, uri: &str) {
        let _ = (prefix, uri);
    }
    /// Receive the end of a namespace binding after the `end_element` of the element
    /// that declared it.
    fn end_prefix_mapping(&mut self, prefix: Option<&str>) {
        let _ = prefix;
    }

    /// Receive a fatal error.
    ///
    /// The same error is also returned from the parser method that detected it.
    fn fatal_error(&mut self, error: SAXParseError) {
        let _ = error;
    }

    /// # Reference
    /// [`LexicalHandler` interface in Java SAX API](https://docs.oracle.com/javase/jp/21/docs/api/java.xml/org/xml/sax/ext/LexicalHandler.html)
    fn comment(&mut self, data: &str) {
        let _ = data;
    }

    fn start_cdata(&mut self) {}
    fn end_cdata(&mut self) {}
}

pub struct DefaultSAXHandler;

impl SAXHandler for DefaultSAXHandler {
    fn fatal_error(&mut self, error: SAXParseError) {
        log::warn!("{error}");
    }
}

/// A handler that records every event as one line of text.
///
/// Events are forwarded to `child` after being recorded.
pub struct DebugHandler<Child: SAXHandler = DefaultSAXHandler> {
    pub buffer: String,
    pub child: Child,
}

impl<Child: SAXHandler> DebugHandler<Child> {
    pub fn new(child: Child) -> Self {
        Self {
            buffer: String::new(),
            child,
        }
    }
}

impl<Child: SAXHandler> SAXHandler for DebugHandler<Child> {
    fn characters(&mut self, data: &str) {
        writeln!(self.buffer, "characters({data})").ok();
        self.child.characters(data);
    }

    fn declaration(&mut self, version: Option<&str>, encoding: Option<&str>, standalone: bool) {
        writeln!(
            self.buffer,
            "declaration({version:?}, {encoding:?}, {standalone})"
        )
        .ok();
        self.child.declaration(version, encoding, standalone);
    }

    fn processing_instruction(&mut self, target: &str, data: Option<&str>) {
        writeln!(self.buffer, "processingInstruction({target}, {data:?})").ok();
        self.child.processing_instruction(target, data);
    }

    fn start_document(&mut self) {
        writeln!(self.buffer, "startDocument()").ok();
        self.child.start_document();
    }
    fn end_document(&mut self) {
        writeln!(self.buffer, "endDocument()").ok();
        self.child.end_document();
    }

    fn start_element(
        &mut self,
        uri: Option<&str>,
        local_name: &str,
        qname: &str,
        atts: &Attributes,
    ) {
        write!(self.buffer, "startElement({uri:?}, {local_name}, {qname}").ok();
        for att in atts {
            write!(self.buffer, ", ").ok();
            if let Some(uri) = att.uri.as_deref() {
                write!(self.buffer, "{{{uri}}}{}='{}'", att.local_name, att.value).ok();
            } else {
                write!(self.buffer, "{}='{}'", att.qname, att.value).ok();
            }
        }
        writeln!(self.buffer, ")").ok();
        self.child.start_element(uri, local_name, qname, atts);
    }
    fn end_element(&mut self, uri: Option<&str>, local_name: &str, qname: &str) {
        writeln!(self.buffer, "endElement({uri:?}, {local_name}, {qname})").ok();
        self.child.end_element(uri, local_name, qname);
    }

    fn start_prefix_mapping(&mut self, prefix: Option<&str>, uri: &str) {
        writeln!(self.buffer, "startPrefixMapping({prefix:?}, {uri})").ok();
        self.child.start_prefix_mapping(prefix, uri);
    }
    fn end_prefix_mapping(&mut self, prefix: Option<&str>) {
        writeln!(self.buffer, "endPrefixMapping({prefix:?})").ok();
        self.child.end_prefix_mapping(prefix);
    }

    fn fatal_error(&mut self, error: SAXParseError) {
        writeln!(self.buffer, "fatalError({:?})", error.error).ok();
        self.child.fatal_error(error);
    }

    fn comment(&mut self, data: &str) {
        writeln!(self.buffer, "comment({data})").ok();
        self.child.comment(data);
    }

    fn start_cdata(&mut self) {
        writeln!(self.buffer, "startCDATA()").ok();
        self.child.start_cdata();
    }
    fn end_cdata(&mut self) {
        writeln!(self.buffer, "endCDATA()").ok();
        self.child.end_cdata();
    }
}

impl Default for DebugHandler {
    fn default() -> Self {
        Self::new(DefaultSAXHandler)
    }
}

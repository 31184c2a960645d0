use std::{collections::HashMap, sync::Arc};

use crate::{XML_NS_NAMESPACE, XML_XML_NAMESPACE, XMLVersion};

/// A qualified name after namespace processing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub uri: Option<Arc<str>>,
    pub local_name: Arc<str>,
    pub qname: Arc<str>,
}

/// Scoped prefix bindings consulted by the parser.
///
/// The parser pushes one scope for each element that declares namespaces and pops
/// it exactly once when that element ends, or when the parser is unwound.
pub trait NamespaceResolver {
    /// Forget every binding except the predeclared ones.
    fn reset(&mut self);

    fn push_scope(&mut self);
    fn pop_scope(&mut self);

    /// Bind `prefix` (empty for the default namespace) to `uri` in the current scope.
    ///
    /// Returns `false` if the binding is not allowed.
    fn declare_prefix(&mut self, prefix: &str, uri: &str) -> bool;

    /// Split `raw` into prefix and local part and look up the namespace name.
    ///
    /// Unprefixed attributes never take the default namespace.
    /// Returns `None` if the prefix is not bound or `raw` is not a QName.
    fn resolve_qname(&self, raw: &str, is_attribute: bool) -> Option<QName>;
}

/// The default [`NamespaceResolver`].
///
/// `xml` is always bound to `http://www.w3.org/XML/1998/namespace` and `xmlns` to
/// `http://www.w3.org/2000/xmlns/`.
#[derive(Debug, Clone, Default)]
pub struct NamespaceSupport {
    // (prefix, uri, the index of the binding shadowed by this one)
    bindings: Vec<(Arc<str>, Arc<str>, Option<usize>)>,
    // prefix -> index of the active binding in `bindings`
    prefix_map: HashMap<Arc<str>, usize>,
    // the length of `bindings` when each scope was pushed
    scopes: Vec<usize>,
}

impl NamespaceSupport {
    pub fn new() -> Self {
        Self::default()
    }

    /// The namespace name bound to `prefix`, if any.
    pub fn get_uri(&self, prefix: &str) -> Option<&str> {
        match prefix {
            "xml" => Some(XML_XML_NAMESPACE),
            "xmlns" => Some(XML_NS_NAMESPACE),
            prefix => {
                let &index = self.prefix_map.get(prefix)?;
                let uri = self.bindings[index].1.as_ref();
                // `xmlns=''` undeclares the default namespace
                (!uri.is_empty()).then_some(uri)
            }
        }
    }

    /// The number of scopes currently pushed.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl NamespaceResolver for NamespaceSupport {
    fn reset(&mut self) {
        self.bindings.clear();
        self.prefix_map.clear();
        self.scopes.clear();
    }

    fn push_scope(&mut self) {
        self.scopes.push(self.bindings.len());
    }

    fn pop_scope(&mut self) {
        let Some(len) = self.scopes.pop() else {
            return;
        };
        while self.bindings.len() > len {
            let Some((prefix, _, shadowed)) = self.bindings.pop() else {
                break;
            };
            match shadowed {
                Some(index) => {
                    self.prefix_map.insert(prefix, index);
                }
                None => {
                    self.prefix_map.remove(&prefix);
                }
            }
        }
    }

    fn declare_prefix(&mut self, prefix: &str, uri: &str) -> bool {
        // Namespaces in XML 1.0, 3 Declaring Namespaces
        if prefix == "xmlns" || uri == XML_NS_NAMESPACE {
            return false;
        }
        if (prefix == "xml") != (uri == XML_XML_NAMESPACE) {
            return false;
        }
        if prefix == "xml" {
            // rebinding `xml` to its own namespace name is allowed and changes nothing
            return true;
        }
        if !prefix.is_empty() && uri.is_empty() {
            return false;
        }

        let prefix: Arc<str> = prefix.into();
        let shadowed = self.prefix_map.insert(prefix.clone(), self.bindings.len());
        self.bindings.push((prefix, uri.into(), shadowed));
        true
    }

    fn resolve_qname(&self, raw: &str, is_attribute: bool) -> Option<QName> {
        if !XMLVersion::default().validate_qname(raw) {
            return None;
        }
        let (uri, local_name) = match raw.split_once(':') {
            Some((prefix, local_name)) => (Some(self.get_uri(prefix)?), local_name),
            None if raw == "xmlns" && is_attribute => (Some(XML_NS_NAMESPACE), raw),
            None if is_attribute => (None, raw),
            None => (self.get_uri(""), raw),
        };
        Some(QName {
            uri: uri.map(Arc::from),
            local_name: local_name.into(),
            qname: raw.into(),
        })
    }
}

use std::{collections::HashMap, ops::Index, sync::Arc};

use crate::error::XMLError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub uri: Option<Arc<str>>,
    pub local_name: Arc<str>,
    pub qname: Arc<str>,
    pub value: Box<str>,
    pub(crate) nsdecl: bool,
}

impl Attribute {
    /// Check if this attribute is a namespace declaration attribute.
    pub fn is_nsdecl(&self) -> bool {
        self.nsdecl
    }
}

/// A list of attributes in document order.
///
/// This list may contain namespace declarations.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    attributes: Vec<Attribute>,
    index_by_qname: HashMap<Arc<str>, usize>,
    // key      : local_name
    // value    : uri_map
    index_by_expanded_name: HashMap<Arc<str>, HashMap<Arc<str>, usize>>,
}

impl Attributes {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Get the index of an attribute whose QName is `qname`.
    pub fn get_index_by_qname(&self, qname: &str) -> Option<usize> {
        self.index_by_qname.get(qname).copied()
    }

    /// Get the index of an attribute whose extended name is `{namespace_name}local_name`.
    pub fn get_index_by_expanded_name(
        &self,
        namespace_name: Option<&str>,
        local_name: &str,
    ) -> Option<usize> {
        self.index_by_expanded_name
            .get(local_name)?
            .get(namespace_name.unwrap_or(""))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_local_name(&self, index: usize) -> Option<&str> {
        Some(self.attributes.get(index)?.local_name.as_ref())
    }

    pub fn get_qname(&self, index: usize) -> Option<&str> {
        Some(self.attributes.get(index)?.qname.as_ref())
    }

    pub fn get_namespace_uri(&self, index: usize) -> Option<&str> {
        self.attributes.get(index)?.uri.as_deref()
    }

    pub fn get_value(&self, index: usize) -> Option<&str> {
        Some(self.attributes.get(index)?.value.as_ref())
    }

    /// Get the value of an attribute whose QName is `qname`.
    pub fn get_value_by_qname(&self, qname: &str) -> Option<&str> {
        let index = self.get_index_by_qname(qname)?;
        self.get_value(index)
    }

    /// Get the value of an attribute whose extended name is `{namespace_name}local_name`.
    pub fn get_value_by_expanded_name(
        &self,
        namespace_name: Option<&str>,
        local_name: &str,
    ) -> Option<&str> {
        let index = self.get_index_by_expanded_name(namespace_name, local_name)?;
        self.get_value(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.attributes.iter()
    }

    /// Append `attribute`.
    ///
    /// Two attributes with the same QName, or with the same expanded name, are rejected.
    pub(crate) fn push(&mut self, attribute: Attribute) -> Result<usize, (Attribute, XMLError)> {
        use std::collections::hash_map::Entry::*;

        if self.index_by_qname.contains_key(&attribute.qname) {
            return Err((attribute, XMLError::ParserDuplicateAttributes));
        }
        let index = self.attributes.len();
        let namespace_name = attribute.uri.clone().unwrap_or_default();
        match self
            .index_by_expanded_name
            .entry(attribute.local_name.clone())
            .or_default()
            .entry(namespace_name)
        {
            Vacant(entry) => {
                entry.insert(index);
            }
            Occupied(_) => return Err((attribute, XMLError::ParserDuplicateAttributes)),
        }
        self.index_by_qname.insert(attribute.qname.clone(), index);
        self.attributes.push(attribute);
        Ok(index)
    }

    /// Drop all namespace declarations, keeping the order of the rest.
    pub(crate) fn remove_nsdecls(&mut self) {
        let attributes = std::mem::take(&mut self.attributes);
        *self = Self::new();
        for attribute in attributes.into_iter().filter(|att| !att.nsdecl) {
            // the remaining attributes were already checked for duplicates
            let _ = self.push(attribute);
        }
    }
}

impl Index<usize> for Attributes {
    type Output = Attribute;

    fn index(&self, index: usize) -> &Self::Output {
        &self.attributes[index]
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type IntoIter = std::slice::Iter<'a, Attribute>;
    type Item = &'a Attribute;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

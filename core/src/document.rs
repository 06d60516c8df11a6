//! The document side: elements addressable by id with settable HTML content.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::error::DocumentError;

/// A host document the dispatcher writes responses into.
pub trait Document: Send + Sync {
    fn inner_html(&self, id: &str) -> Option<String>;

    /// Replace the content of `id`. Fails if no such element exists.
    fn set_inner_html(&self, id: &str, html: &str) -> Result<(), DocumentError>;
}

/// Id → HTML map. Elements must be created before they can be updated.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    elements: RwLock<HashMap<String, String>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(self, id: impl Into<String>, html: impl Into<String>) -> Self {
        self.insert_element(id, html);
        self
    }

    pub fn insert_element(&self, id: impl Into<String>, html: impl Into<String>) {
        self.elements
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into(), html.into());
    }

    pub fn remove_element(&self, id: &str) -> Option<String> {
        self.elements
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    pub fn element_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .elements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }
}

impl Document for MemoryDocument {
    fn inner_html(&self, id: &str) -> Option<String> {
        self.elements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn set_inner_html(&self, id: &str, html: &str) -> Result<(), DocumentError> {
        let mut elements = self.elements.write().unwrap_or_else(PoisonError::into_inner);
        let slot = elements
            .get_mut(id)
            .ok_or_else(|| DocumentError::ElementNotFound(id.to_string()))?;
        *slot = html.to_string();
        Ok(())
    }
}

//! # Reference Resolution
//!
//! Flat id index over every element of a document, plus the one-hop
//! indirection through reference records such as `bpmn:DataObjectReference`.

use crate::document::{tags, Element};
use crate::error::{GraphError, Result};
use crate::model::Descriptor;
use std::collections::HashMap;

/// Reference record types and the property holding the id they point at
const REFERENCE_POINTERS: &[(&str, &str)] = &[
    (tags::DATA_OBJECT_REFERENCE, "dataObjectRef"),
    (tags::DATA_STORE_REFERENCE, "dataStoreRef"),
];

/// Result of resolving a reference
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    /// The real element
    pub element: &'a Element,
    /// The reference record that was followed, if any
    pub via: Option<&'a Element>,
}

impl<'a> Resolved<'a> {
    pub fn descriptor(&self) -> Descriptor {
        Descriptor::new(
            self.element.id.clone().unwrap_or_default(),
            self.element.element_type.clone(),
        )
    }
}

/// Every element of a document keyed by id
#[derive(Debug, Default)]
pub struct ElementPool<'a> {
    elements: HashMap<&'a str, &'a Element>,
}

impl<'a> ElementPool<'a> {
    /// Index `root` and everything below it
    pub fn index(root: &'a Element) -> Self {
        let mut elements = HashMap::new();
        root.walk(&mut |element| {
            if let Some(id) = element.id.as_deref() {
                elements.insert(id, element);
            }
        });
        Self { elements }
    }

    pub fn get(&self, id: &str) -> Option<&'a Element> {
        self.elements.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Look up `ref_id`, following at most one reference record
    pub fn resolve(&self, ref_id: &str) -> Result<Resolved<'a>> {
        let element = self.require(ref_id)?;

        let Some(pointer) = reference_pointer(element) else {
            return Ok(Resolved { element, via: None });
        };

        let target_id = element
            .attribute_str(pointer)
            .ok_or_else(|| GraphError::DanglingReference {
                id: format!("{}.{}", ref_id, pointer),
            })?;
        let target = self.require(target_id)?;

        if reference_pointer(target).is_some() {
            return Err(GraphError::ReferenceChain {
                id: ref_id.to_string(),
            });
        }

        tracing::debug!("[RESOLVE] {} -> {} ({})", ref_id, target_id, target.element_type);

        Ok(Resolved {
            element: target,
            via: Some(element),
        })
    }

    fn require(&self, id: &str) -> Result<&'a Element> {
        self.get(id).ok_or_else(|| GraphError::DanglingReference { id: id.to_string() })
    }
}

/// Property naming the real object, when `element` is a reference record
fn reference_pointer(element: &Element) -> Option<&'static str> {
    REFERENCE_POINTERS
        .iter()
        .find(|(tag, _)| element.is_type(tag))
        .map(|(_, pointer)| *pointer)
}

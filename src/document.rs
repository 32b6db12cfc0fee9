//! # Document Source
//!
//! The already parsed, already validated process definition the compiler reads.
//!
//! Elements are moddle shaped: a `$type` tag, an optional `id` and `name`, the
//! text `body` of expression elements, and any number of named properties. A
//! property holds a single child element, an ordered list of child elements, or
//! a plain JSON value (attribute, reference id, list of reference ids).

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Type tags the compiler treats structurally
pub mod tags {
    pub const DEFINITIONS: &str = "bpmn:Definitions";
    pub const PROCESS: &str = "bpmn:Process";
    pub const COLLABORATION: &str = "bpmn:Collaboration";
    pub const PARTICIPANT: &str = "bpmn:Participant";
    pub const SEQUENCE_FLOW: &str = "bpmn:SequenceFlow";
    pub const MESSAGE_FLOW: &str = "bpmn:MessageFlow";
    pub const DATA_OBJECT: &str = "bpmn:DataObject";
    pub const DATA_STORE: &str = "bpmn:DataStore";
    pub const DATA_OBJECT_REFERENCE: &str = "bpmn:DataObjectReference";
    pub const DATA_STORE_REFERENCE: &str = "bpmn:DataStoreReference";
    pub const ERROR: &str = "bpmn:Error";
    pub const FORMAL_EXPRESSION: &str = "bpmn:FormalExpression";
    pub const EXPRESSION: &str = "bpmn:Expression";
}

/// Root of a parsed document: the `bpmn:Definitions` element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub definitions: Element,
}

impl Document {
    pub fn new(definitions: Element) -> Self {
        Self { definitions }
    }

    /// Read a moddle shaped JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// One element of the document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "$type")]
    pub element_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Text content, set on expression elements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(flatten)]
    pub properties: BTreeMap<String, Property>,
}

/// A named property of an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Property {
    Element(Box<Element>),
    Elements(Vec<Element>),
    Value(Value),
}

impl Element {
    pub fn new(element_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            element_type: element_type.into(),
            id: Some(id.into()),
            name: None,
            body: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn is_type(&self, tag: &str) -> bool {
        self.element_type == tag
    }

    /// True for `bpmn:FormalExpression` and `bpmn:Expression` elements
    pub fn is_expression(&self) -> bool {
        self.is_type(tags::FORMAL_EXPRESSION) || self.is_type(tags::EXPRESSION)
    }

    /// Child elements held under `key`, in document order
    pub fn children(&self, key: &str) -> &[Element] {
        match self.properties.get(key) {
            Some(Property::Elements(elements)) => elements,
            Some(Property::Element(element)) => std::slice::from_ref(element.as_ref()),
            _ => &[],
        }
    }

    /// The single child element held under `key`
    pub fn child(&self, key: &str) -> Option<&Element> {
        self.children(key).first()
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        match self.properties.get(key) {
            Some(Property::Value(value)) => Some(value),
            _ => None,
        }
    }

    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attribute(key).and_then(Value::as_str)
    }

    /// Ids held by a reference property, either a single id or a list of ids
    pub fn reference_ids(&self, key: &str) -> Vec<&str> {
        match self.attribute(key) {
            Some(Value::String(id)) => vec![id.as_str()],
            Some(Value::Array(ids)) => ids.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// First id of a reference property
    pub fn reference_id(&self, key: &str) -> Option<&str> {
        self.reference_ids(key).into_iter().next()
    }

    /// Visit this element and every element nested below it, depth first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Element)) {
        visit(self);
        for property in self.properties.values() {
            match property {
                Property::Element(element) => element.walk(visit),
                Property::Elements(elements) => {
                    for element in elements {
                        element.walk(visit);
                    }
                }
                Property::Value(_) => {}
            }
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties
            .insert(key.into(), Property::Value(value.into()));
        self
    }

    pub fn with_children(mut self, key: impl Into<String>, children: Vec<Element>) -> Self {
        self.properties
            .insert(key.into(), Property::Elements(children));
        self
    }
}

//! # Entity Records
//!
//! The entities of a compiled graph. Every record is generic over its binding:
//! a live graph holds `Entity<Binding>`, a snapshot holds `Entity<()>`. Both
//! directions go through [`Entity::rebind`], so a deserialized graph resolves
//! its bindings exactly the way the compiler did.

use crate::error::Result;
use crate::registry::{Binding, TypeRegistry, SERVICE_IMPLEMENTATION};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::convert::Infallible;

/// Lightweight `{id, type}` pointer to another entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Descriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: String,
}

impl Descriptor {
    pub fn new(id: impl Into<String>, element_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            element_type: element_type.into(),
        }
    }
}

/// Common shape of processes, activities, data objects, errors and the
/// nested records found in a behaviour bag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity<B = Binding> {
    /// Empty only for nested records whose element has no id
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(rename = "type")]
    pub element_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Descriptor>,

    #[serde(default)]
    pub behaviour: Bag<B>,

    /// Resolved behaviour, never serialized
    #[serde(skip)]
    pub binding: B,
}

pub type Definition<B = Binding> = Entity<B>;
pub type Process<B = Binding> = Entity<B>;
pub type Activity<B = Binding> = Entity<B>;
pub type DataObject<B = Binding> = Entity<B>;
pub type BpmnError<B = Binding> = Entity<B>;

/// Attribute bag of an entity: its own scalar fields plus typed slots for the
/// nested structures the compiler resolves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bag<B = Binding> {
    #[serde(flatten)]
    pub fields: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io_specification: Option<Box<Entity<B>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_characteristics: Option<Box<Entity<B>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_definitions: Option<Vec<Entity<B>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<Expression>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_ref: Option<Descriptor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_inputs: Option<Vec<DataPort>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_outputs: Option<Vec<DataPort>>,

    /// Service implementation binding, present iff `implementation` is set
    #[serde(skip)]
    pub service: Option<B>,
}

impl<B> Default for Bag<B> {
    fn default() -> Self {
        Self {
            fields: Map::new(),
            io_specification: None,
            loop_characteristics: None,
            event_definitions: None,
            condition_expression: None,
            error_ref: None,
            data_inputs: None,
            data_outputs: None,
            service: None,
        }
    }
}

/// Expression text kept verbatim, never evaluated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression {
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// A data input or output of an io specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPort {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub behaviour: PortBehaviour,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBehaviour {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub association: Option<Association>,
}

/// Data association of a port; inputs carry a `source`, outputs a `target`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<AssociationEnd>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<AssociationEnd>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationEnd {
    /// Id named by the association, possibly a reference element
    pub id: String,
    /// The data object behind `id` after one level of indirection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_object: Option<Descriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceFlow<B = Binding> {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub parent: Descriptor,
    pub source_id: String,
    pub target_id: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub behaviour: Bag<B>,
    #[serde(skip)]
    pub binding: B,
}

/// Endpoint of a message flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEndpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_id: Option<String>,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageFlow<B = Binding> {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub parent: Descriptor,
    pub source: FlowEndpoint,
    pub target: FlowEndpoint,
    #[serde(default)]
    pub behaviour: Bag<B>,
    #[serde(skip)]
    pub binding: B,
}

impl<B> Entity<B> {
    pub fn descriptor(&self) -> Descriptor {
        Descriptor::new(self.id.clone(), self.element_type.clone())
    }

    /// Parent scope id, if any
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_ref().map(|parent| parent.id.as_str())
    }

    pub fn is_executable(&self) -> bool {
        self.behaviour.flag("isExecutable")
    }

    /// Replace every binding, the entity's own and those nested in its bag
    ///
    /// `resolve` receives the type tag each binding belongs to.
    pub fn rebind<C, E, F>(&self, resolve: &mut F) -> std::result::Result<Entity<C>, E>
    where
        F: FnMut(&str) -> std::result::Result<C, E>,
    {
        Ok(Entity {
            id: self.id.clone(),
            element_type: self.element_type.clone(),
            name: self.name.clone(),
            parent: self.parent.clone(),
            binding: resolve(&self.element_type)?,
            behaviour: self.behaviour.rebind(resolve)?,
        })
    }

    /// Copy without bindings, as stored in a snapshot
    pub fn strip(&self) -> Entity<()> {
        unbound(self.rebind(&mut |_| Ok::<(), Infallible>(())))
    }
}

impl Entity<()> {
    /// Resolve every binding through `registry`
    pub fn bind(&self, registry: &TypeRegistry) -> Result<Entity> {
        self.rebind(&mut |tag| registry.resolve(tag).cloned())
    }
}

impl<B> Bag<B> {
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.field(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Whether the bag names a service implementation
    pub fn has_implementation(&self) -> bool {
        self.field_str("implementation")
            .is_some_and(|implementation| !implementation.is_empty())
    }

    pub fn rebind<C, E, F>(&self, resolve: &mut F) -> std::result::Result<Bag<C>, E>
    where
        F: FnMut(&str) -> std::result::Result<C, E>,
    {
        let io_specification = match &self.io_specification {
            Some(io) => Some(Box::new(io.rebind(resolve)?)),
            None => None,
        };
        let loop_characteristics = match &self.loop_characteristics {
            Some(characteristics) => Some(Box::new(characteristics.rebind(resolve)?)),
            None => None,
        };
        let event_definitions = match &self.event_definitions {
            Some(definitions) => Some(
                definitions
                    .iter()
                    .map(|definition| definition.rebind(resolve))
                    .collect::<std::result::Result<Vec<_>, E>>()?,
            ),
            None => None,
        };
        let service = if self.has_implementation() {
            Some(resolve(SERVICE_IMPLEMENTATION)?)
        } else {
            None
        };

        Ok(Bag {
            fields: self.fields.clone(),
            io_specification,
            loop_characteristics,
            event_definitions,
            condition_expression: self.condition_expression.clone(),
            error_ref: self.error_ref.clone(),
            data_inputs: self.data_inputs.clone(),
            data_outputs: self.data_outputs.clone(),
            service,
        })
    }
}

impl<B> SequenceFlow<B> {
    pub fn rebind<C, E, F>(&self, resolve: &mut F) -> std::result::Result<SequenceFlow<C>, E>
    where
        F: FnMut(&str) -> std::result::Result<C, E>,
    {
        Ok(SequenceFlow {
            id: self.id.clone(),
            element_type: self.element_type.clone(),
            name: self.name.clone(),
            parent: self.parent.clone(),
            source_id: self.source_id.clone(),
            target_id: self.target_id.clone(),
            is_default: self.is_default,
            binding: resolve(&self.element_type)?,
            behaviour: self.behaviour.rebind(resolve)?,
        })
    }

    pub fn strip(&self) -> SequenceFlow<()> {
        unbound(self.rebind(&mut |_| Ok::<(), Infallible>(())))
    }
}

impl SequenceFlow<()> {
    pub fn bind(&self, registry: &TypeRegistry) -> Result<SequenceFlow> {
        self.rebind(&mut |tag| registry.resolve(tag).cloned())
    }
}

impl<B> MessageFlow<B> {
    pub fn rebind<C, E, F>(&self, resolve: &mut F) -> std::result::Result<MessageFlow<C>, E>
    where
        F: FnMut(&str) -> std::result::Result<C, E>,
    {
        Ok(MessageFlow {
            id: self.id.clone(),
            element_type: self.element_type.clone(),
            name: self.name.clone(),
            parent: self.parent.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
            binding: resolve(&self.element_type)?,
            behaviour: self.behaviour.rebind(resolve)?,
        })
    }

    /// True when either endpoint lives in `process_id`
    pub fn touches(&self, process_id: &str) -> bool {
        self.source.process_id.as_deref() == Some(process_id)
            || self.target.process_id.as_deref() == Some(process_id)
    }

    pub fn strip(&self) -> MessageFlow<()> {
        unbound(self.rebind(&mut |_| Ok::<(), Infallible>(())))
    }
}

impl MessageFlow<()> {
    pub fn bind(&self, registry: &TypeRegistry) -> Result<MessageFlow> {
        self.rebind(&mut |tag| registry.resolve(tag).cloned())
    }
}

fn unbound<T>(result: std::result::Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

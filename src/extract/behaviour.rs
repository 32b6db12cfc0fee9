//! # Behaviour Extractor
//!
//! Converts one document element, with its nested io specification, loop
//! characteristics and event definitions, into an entity whose bindings are
//! resolved through the type registry.

use super::references::ElementPool;
use crate::document::{tags, Element, Property};
use crate::error::{GraphError, Result};
use crate::model::{
    Association, AssociationEnd, Bag, DataPort, Descriptor, Entity, Expression, PortBehaviour,
};
use crate::registry::TypeRegistry;
use serde_json::{Map, Value};

/// Properties turned into typed bag slots or walked by the compiler, never
/// copied as plain fields
const STRUCTURAL_PROPERTIES: &[&str] = &[
    "ioSpecification",
    "loopCharacteristics",
    "eventDefinitions",
    "conditionExpression",
    "errorRef",
    "dataInputs",
    "dataOutputs",
    "dataInputAssociations",
    "dataOutputAssociations",
    "flowElements",
    "rootElements",
    "messageFlows",
    "participants",
    "laneSets",
    "artifacts",
];

/// Extracts entities from elements of one document
pub struct BehaviourExtractor<'p, 'a> {
    pool: &'p ElementPool<'a>,
    registry: &'p TypeRegistry,
}

impl<'p, 'a> BehaviourExtractor<'p, 'a> {
    pub fn new(pool: &'p ElementPool<'a>, registry: &'p TypeRegistry) -> Self {
        Self { pool, registry }
    }

    pub fn pool(&self) -> &'p ElementPool<'a> {
        self.pool
    }

    pub fn registry(&self) -> &'p TypeRegistry {
        self.registry
    }

    /// Extract `element` as an entity scoped to `parent`
    pub fn extract(&self, element: &Element, parent: Option<Descriptor>) -> Result<Entity> {
        self.record(element, parent)?.bind(self.registry)
    }

    /// Extract the unbound record of `element`
    pub fn record(&self, element: &Element, parent: Option<Descriptor>) -> Result<Entity<()>> {
        Ok(Entity {
            id: element.id.clone().unwrap_or_default(),
            element_type: element.element_type.clone(),
            name: element.name.clone(),
            parent,
            behaviour: self.bag(element)?,
            binding: (),
        })
    }

    /// Build the attribute bag of `element`
    pub fn bag(&self, element: &Element) -> Result<Bag<()>> {
        let mut bag = Bag {
            fields: scalar_fields(element),
            ..Bag::default()
        };

        if let Some(io) = element.child("ioSpecification") {
            bag.io_specification = Some(Box::new(self.io_specification(element, io)?));
        }

        if let Some(characteristics) = element.child("loopCharacteristics") {
            bag.loop_characteristics = Some(Box::new(self.record(characteristics, None)?));
        }

        if element.properties.contains_key("eventDefinitions") {
            let definitions = element
                .children("eventDefinitions")
                .iter()
                .map(|definition| self.record(definition, None))
                .collect::<Result<Vec<_>>>()?;
            bag.event_definitions = Some(definitions);
        }

        if let Some(error_id) = element.reference_id("errorRef") {
            bag.error_ref = Some(self.pool.resolve(error_id)?.descriptor());
        }

        if let Some(condition) = element.child("conditionExpression") {
            bag.condition_expression = Some(Expression {
                element_type: condition.element_type.clone(),
                body: condition.body.clone(),
                language: condition.attribute_str("language").map(str::to_string),
            });
        }

        Ok(bag)
    }

    /// Extract an io specification of `owner`, wiring each port to the data
    /// object its association names
    fn io_specification(&self, owner: &Element, io: &Element) -> Result<Entity<()>> {
        let mut record = Entity {
            id: io.id.clone().unwrap_or_default(),
            element_type: io.element_type.clone(),
            name: io.name.clone(),
            parent: None,
            behaviour: Bag {
                fields: scalar_fields(io),
                ..Bag::default()
            },
            binding: (),
        };

        let inputs = io
            .children("dataInputs")
            .iter()
            .map(|input| {
                let association = self.input_association(owner, input)?;
                Ok(data_port(input, association))
            })
            .collect::<Result<Vec<_>>>()?;

        let outputs = io
            .children("dataOutputs")
            .iter()
            .map(|output| {
                let association = self.output_association(owner, output)?;
                Ok(data_port(output, association))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "[EXTRACT] {} io: {} inputs, {} outputs",
            owner.id.as_deref().unwrap_or("?"),
            inputs.len(),
            outputs.len()
        );

        record.behaviour.data_inputs = Some(inputs);
        record.behaviour.data_outputs = Some(outputs);
        Ok(record)
    }

    /// The input association targeting `input`, with its source resolved
    fn input_association(&self, owner: &Element, input: &Element) -> Result<Option<Association>> {
        let Some(input_id) = input.id.as_deref() else {
            return Ok(None);
        };
        let Some(association) = owner
            .children("dataInputAssociations")
            .iter()
            .find(|association| association.reference_ids("targetRef").contains(&input_id))
        else {
            return Ok(None);
        };

        let source = match association.reference_id("sourceRef") {
            Some(source_id) => Some(self.association_end(source_id)?),
            None => None,
        };

        Ok(Some(Association {
            id: association.id.clone(),
            source,
            target: None,
        }))
    }

    /// The output association fed by `output`, with its target resolved
    fn output_association(&self, owner: &Element, output: &Element) -> Result<Option<Association>> {
        let Some(output_id) = output.id.as_deref() else {
            return Ok(None);
        };
        let Some(association) = owner
            .children("dataOutputAssociations")
            .iter()
            .find(|association| association.reference_ids("sourceRef").contains(&output_id))
        else {
            return Ok(None);
        };

        let target = match association.reference_id("targetRef") {
            Some(target_id) => Some(self.association_end(target_id)?),
            None => None,
        };

        Ok(Some(Association {
            id: association.id.clone(),
            source: None,
            target,
        }))
    }

    fn association_end(&self, ref_id: &str) -> Result<AssociationEnd> {
        let resolved = self.pool.resolve(ref_id)?;
        let data_object = (resolved.element.is_type(tags::DATA_OBJECT)
            || resolved.element.is_type(tags::DATA_STORE))
        .then(|| resolved.descriptor());

        Ok(AssociationEnd {
            id: ref_id.to_string(),
            data_object,
        })
    }

    /// Check that the `default` of `element`, if any, is one of its outbound flows
    pub fn check_default_flow(&self, element: &Element) -> Result<()> {
        let (Some(activity_id), Some(flow_id)) =
            (element.id.as_deref(), element.attribute_str("default"))
        else {
            return Ok(());
        };

        let flow = self
            .pool
            .get(flow_id)
            .ok_or_else(|| GraphError::DanglingReference { id: flow_id.to_string() })?;

        if !flow.is_type(tags::SEQUENCE_FLOW) || flow.reference_id("sourceRef") != Some(activity_id) {
            return Err(GraphError::InvalidDefaultFlow {
                activity: activity_id.to_string(),
                flow: flow_id.to_string(),
            });
        }
        Ok(())
    }
}

fn data_port(element: &Element, association: Option<Association>) -> DataPort {
    DataPort {
        id: element.id.clone().unwrap_or_default(),
        element_type: element.element_type.clone(),
        name: element.name.clone(),
        behaviour: PortBehaviour { association },
    }
}

/// Plain attributes of `element`, with expression children flattened to their
/// verbatim body text
fn scalar_fields(element: &Element) -> Map<String, Value> {
    let mut fields = Map::new();
    for (key, property) in &element.properties {
        if STRUCTURAL_PROPERTIES.contains(&key.as_str()) {
            continue;
        }
        match property {
            Property::Value(value) => {
                fields.insert(key.clone(), value.clone());
            }
            Property::Element(child) if child.is_expression() => {
                let body = child.body.clone().map(Value::String).unwrap_or(Value::Null);
                fields.insert(key.clone(), body);
            }
            _ => {}
        }
    }
    fields
}

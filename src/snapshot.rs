//! # Snapshot Serialization
//!
//! A snapshot is the graph with every binding dropped. Only type tags survive,
//! and [`deserialize`] resolves them again through a type registry, which may
//! differ from the one the graph was compiled with.

use crate::error::Result;
use crate::graph::{EntityGraph, GraphParts};
use crate::model::{Entity, MessageFlow, SequenceFlow};
use crate::registry::TypeRegistry;
use serde::{Deserialize, Serialize};

/// Serializable form of an [`EntityGraph`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub definition: Entity<()>,
    #[serde(default)]
    pub processes: Vec<Entity<()>>,
    #[serde(default)]
    pub activities: Vec<Entity<()>>,
    #[serde(default)]
    pub sequence_flows: Vec<SequenceFlow<()>>,
    #[serde(default)]
    pub message_flows: Vec<MessageFlow<()>>,
    #[serde(default)]
    pub data_objects: Vec<Entity<()>>,
    #[serde(default)]
    pub errors: Vec<Entity<()>>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Strip every binding from `graph`
pub fn serialize(graph: &EntityGraph) -> Snapshot {
    let parts = graph.parts();
    let definition = parts.definition.strip();

    let snapshot = Snapshot {
        id: definition.id.clone(),
        element_type: definition.element_type.clone(),
        name: definition.name.clone(),
        processes: parts.processes.iter().map(Entity::strip).collect(),
        activities: parts.activities.iter().map(Entity::strip).collect(),
        sequence_flows: parts.sequence_flows.iter().map(SequenceFlow::strip).collect(),
        message_flows: parts.message_flows.iter().map(MessageFlow::strip).collect(),
        data_objects: parts.data_objects.iter().map(Entity::strip).collect(),
        errors: parts.errors.iter().map(Entity::strip).collect(),
        definition,
    };

    tracing::debug!(
        "[SNAPSHOT] Serialized {} ({} activities, {} sequence flows)",
        snapshot.id,
        snapshot.activities.len(),
        snapshot.sequence_flows.len()
    );

    snapshot
}

/// Rebuild a graph from `snapshot`, resolving every type tag through `registry`
///
/// Fails on the first tag `registry` cannot resolve; no partial graph is
/// returned.
pub fn deserialize(snapshot: &Snapshot, registry: &TypeRegistry) -> Result<EntityGraph> {
    tracing::info!("[PEGC] Deserializing snapshot {}", snapshot.id);

    let parts = GraphParts {
        definition: snapshot.definition.bind(registry)?,
        processes: bind_all(&snapshot.processes, registry)?,
        activities: bind_all(&snapshot.activities, registry)?,
        sequence_flows: snapshot
            .sequence_flows
            .iter()
            .map(|flow| flow.bind(registry))
            .collect::<Result<_>>()?,
        message_flows: snapshot
            .message_flows
            .iter()
            .map(|flow| flow.bind(registry))
            .collect::<Result<_>>()?,
        data_objects: bind_all(&snapshot.data_objects, registry)?,
        errors: bind_all(&snapshot.errors, registry)?,
    };

    Ok(EntityGraph::new(parts))
}

fn bind_all(records: &[Entity<()>], registry: &TypeRegistry) -> Result<Vec<Entity>> {
    records.iter().map(|record| record.bind(registry)).collect()
}

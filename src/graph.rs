//! # Entity Graph
//!
//! Read-only query surface over a compiled definition. Entities are stored in
//! document order and reached through id and scope indices; no query walks the
//! source document or mutates the graph.

use crate::model::{
    Activity, BpmnError, DataObject, Definition, MessageFlow, Process, SequenceFlow,
};
use crate::snapshot::{self, Snapshot};
use std::collections::HashMap;

/// Entities of one definition, in document order
#[derive(Debug, Clone)]
pub struct GraphParts {
    pub definition: Definition,
    pub processes: Vec<Process>,
    pub activities: Vec<Activity>,
    pub sequence_flows: Vec<SequenceFlow>,
    pub message_flows: Vec<MessageFlow>,
    pub data_objects: Vec<DataObject>,
    pub errors: Vec<BpmnError>,
}

/// Positions into the entity vectors
#[derive(Debug, Clone, Default)]
struct GraphIndex {
    processes: HashMap<String, usize>,
    activities: HashMap<String, usize>,
    activities_by_scope: HashMap<String, Vec<usize>>,
    sequence_flows: HashMap<String, usize>,
    sequence_flows_by_scope: HashMap<String, Vec<usize>>,
    outbound: HashMap<String, Vec<usize>>,
    inbound: HashMap<String, Vec<usize>>,
    message_flows_by_process: HashMap<String, Vec<usize>>,
    data_objects: HashMap<String, usize>,
    data_objects_by_scope: HashMap<String, Vec<usize>>,
    errors: HashMap<String, usize>,
}

impl GraphIndex {
    fn build(parts: &GraphParts) -> Self {
        let mut index = GraphIndex::default();

        for (i, process) in parts.processes.iter().enumerate() {
            index.processes.insert(process.id.clone(), i);
        }

        for (i, activity) in parts.activities.iter().enumerate() {
            index.activities.insert(activity.id.clone(), i);
            if let Some(scope) = activity.parent_id() {
                push(&mut index.activities_by_scope, scope, i);
            }
        }

        for (i, flow) in parts.sequence_flows.iter().enumerate() {
            index.sequence_flows.insert(flow.id.clone(), i);
            push(&mut index.sequence_flows_by_scope, &flow.parent.id, i);
            push(&mut index.outbound, &flow.source_id, i);
            push(&mut index.inbound, &flow.target_id, i);
        }

        for (i, flow) in parts.message_flows.iter().enumerate() {
            let source = flow.source.process_id.as_deref();
            let target = flow.target.process_id.as_deref();
            if let Some(process_id) = source {
                push(&mut index.message_flows_by_process, process_id, i);
            }
            if let Some(process_id) = target.filter(|target| Some(*target) != source) {
                push(&mut index.message_flows_by_process, process_id, i);
            }
        }

        for (i, data_object) in parts.data_objects.iter().enumerate() {
            index.data_objects.insert(data_object.id.clone(), i);
            if let Some(scope) = data_object.parent_id() {
                push(&mut index.data_objects_by_scope, scope, i);
            }
        }

        for (i, error) in parts.errors.iter().enumerate() {
            index.errors.insert(error.id.clone(), i);
        }

        index
    }
}

fn push(map: &mut HashMap<String, Vec<usize>>, key: &str, position: usize) {
    map.entry(key.to_string()).or_default().push(position);
}

fn pick<'a, T>(items: &'a [T], positions: Option<&Vec<usize>>) -> Vec<&'a T> {
    positions
        .map(|positions| positions.iter().filter_map(|&i| items.get(i)).collect())
        .unwrap_or_default()
}

/// Compiled, immutable entity graph
#[derive(Debug, Clone)]
pub struct EntityGraph {
    parts: GraphParts,
    index: GraphIndex,
}

impl EntityGraph {
    pub fn new(parts: GraphParts) -> Self {
        let index = GraphIndex::build(&parts);
        Self { parts, index }
    }

    pub fn id(&self) -> &str {
        &self.parts.definition.id
    }

    pub fn element_type(&self) -> &str {
        &self.parts.definition.element_type
    }

    pub fn name(&self) -> Option<&str> {
        self.parts.definition.name.as_deref()
    }

    pub fn definition(&self) -> &Definition {
        &self.parts.definition
    }

    pub fn get_processes(&self) -> Vec<&Process> {
        self.parts.processes.iter().collect()
    }

    pub fn get_executable_processes(&self) -> Vec<&Process> {
        self.parts
            .processes
            .iter()
            .filter(|process| process.is_executable())
            .collect()
    }

    pub fn get_process_by_id(&self, id: &str) -> Option<&Process> {
        self.index
            .processes
            .get(id)
            .and_then(|&i| self.parts.processes.get(i))
    }

    /// All activities, or those whose immediate parent is `scope_id`
    pub fn get_activities(&self, scope_id: Option<&str>) -> Vec<&Activity> {
        match scope_id {
            None => self.parts.activities.iter().collect(),
            Some(scope) => pick(&self.parts.activities, self.index.activities_by_scope.get(scope)),
        }
    }

    pub fn get_activity_by_id(&self, id: &str) -> Option<&Activity> {
        self.index
            .activities
            .get(id)
            .and_then(|&i| self.parts.activities.get(i))
    }

    pub fn get_sequence_flows(&self, scope_id: Option<&str>) -> Vec<&SequenceFlow> {
        match scope_id {
            None => self.parts.sequence_flows.iter().collect(),
            Some(scope) => pick(
                &self.parts.sequence_flows,
                self.index.sequence_flows_by_scope.get(scope),
            ),
        }
    }

    pub fn get_sequence_flow_by_id(&self, id: &str) -> Option<&SequenceFlow> {
        self.index
            .sequence_flows
            .get(id)
            .and_then(|&i| self.parts.sequence_flows.get(i))
    }

    pub fn get_outbound_sequence_flows(&self, activity_id: &str) -> Vec<&SequenceFlow> {
        pick(&self.parts.sequence_flows, self.index.outbound.get(activity_id))
    }

    pub fn get_inbound_sequence_flows(&self, activity_id: &str) -> Vec<&SequenceFlow> {
        pick(&self.parts.sequence_flows, self.index.inbound.get(activity_id))
    }

    /// All message flows, or those with either endpoint in process `scope_id`
    pub fn get_message_flows(&self, scope_id: Option<&str>) -> Vec<&MessageFlow> {
        match scope_id {
            None => self.parts.message_flows.iter().collect(),
            Some(scope) => pick(
                &self.parts.message_flows,
                self.index.message_flows_by_process.get(scope),
            ),
        }
    }

    pub fn get_data_objects(&self, scope_id: Option<&str>) -> Vec<&DataObject> {
        match scope_id {
            None => self.parts.data_objects.iter().collect(),
            Some(scope) => pick(
                &self.parts.data_objects,
                self.index.data_objects_by_scope.get(scope),
            ),
        }
    }

    pub fn get_data_object_by_id(&self, id: &str) -> Option<&DataObject> {
        self.index
            .data_objects
            .get(id)
            .and_then(|&i| self.parts.data_objects.get(i))
    }

    pub fn get_errors(&self) -> Vec<&BpmnError> {
        self.parts.errors.iter().collect()
    }

    pub fn get_error_by_id(&self, id: &str) -> Option<&BpmnError> {
        self.index
            .errors
            .get(id)
            .and_then(|&i| self.parts.errors.get(i))
    }

    /// Snapshot of the graph with bindings replaced by their type tags
    pub fn serialize(&self) -> Snapshot {
        snapshot::serialize(self)
    }

    pub fn parts(&self) -> &GraphParts {
        &self.parts
    }
}

//! # Entity Graph Compiler
//!
//! Main entry point for compiling a parsed process definition into an
//! [`EntityGraph`].

use crate::document::{tags, Document, Element};
use crate::error::{GraphError, Result};
use crate::extract::{BehaviourExtractor, ElementPool};
use crate::graph::{EntityGraph, GraphParts};
use crate::model::{
    Activity, BpmnError, DataObject, Descriptor, Entity, FlowEndpoint, MessageFlow, Process,
    SequenceFlow,
};
use crate::registry::TypeRegistry;
use std::collections::HashMap;

/// Root elements that are neither scopes nor entities
const IGNORED_ROOT_TYPES: &[&str] = &[tags::PARTICIPANT, "bpmn:LaneSet", "bpmn:Lane"];

/// Compile a parsed definition into an entity graph
///
/// This is the main entry point of the compiler. Every element is visited
/// once, every type tag is resolved through `registry` and every reference is
/// resolved against the document.
///
/// # Arguments
///
/// * `document` - The parsed definition
/// * `registry` - Type tag to behaviour mapping
///
/// # Returns
///
/// * `Ok(EntityGraph)` - The indexed, read-only graph
/// * `Err(GraphError)` - The first unknown type tag or dangling reference; no
///   partial graph is returned
///
/// # Examples
///
/// ```rust,no_run
/// use pegc::{build_graph, Behaviours, Document, TypeRegistry};
///
/// # let behaviours = Behaviours::new();
/// let registry = TypeRegistry::from_behaviours(&behaviours);
/// let document = Document::from_json(&std::fs::read_to_string("definition.json")?)?;
/// let graph = build_graph(&document, &registry)?;
/// for process in graph.get_executable_processes() {
///     println!("{}: {} activities", process.id, graph.get_activities(Some(process.id.as_str())).len());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn build_graph(document: &Document, registry: &TypeRegistry) -> Result<EntityGraph> {
    let root = &document.definitions;

    tracing::info!("[PEGC] Starting compilation");
    tracing::info!(
        "[PEGC] Definition: {} ({} root elements)",
        root.id.as_deref().unwrap_or("?"),
        root.children("rootElements").len()
    );

    // Phase 1: Index every element by id
    tracing::info!("[PEGC] Phase 1: Indexing elements...");
    let pool = ElementPool::index(root);
    tracing::info!("[PEGC] Indexed {} elements", pool.len());

    let extractor = BehaviourExtractor::new(&pool, registry);

    // Phase 2: Definition record
    tracing::info!("[PEGC] Phase 2: Resolving definition...");
    let definition = extractor.extract(root, None)?;
    let scope = definition.descriptor();
    let mut compiler = GraphCompiler::new(&extractor, scope.clone());

    // Phase 3: Processes and everything scoped below them
    tracing::info!("[PEGC] Phase 3: Walking processes...");
    let mut collaborations = Vec::new();
    for element in root.children("rootElements") {
        match element.element_type.as_str() {
            tags::PROCESS => compiler.process(element, &scope)?,
            tags::COLLABORATION => collaborations.push(element),
            tags::ERROR => compiler.error(element, &scope)?,
            tag if IGNORED_ROOT_TYPES.contains(&tag) => {}
            _ => compiler.activity(element, &scope)?,
        }
    }

    // Phase 4: Message flows across processes
    tracing::info!("[PEGC] Phase 4: Resolving message flows...");
    for collaboration in collaborations {
        compiler.collaboration(collaboration, &scope)?;
    }

    // Phase 5: Query indices
    tracing::info!("[PEGC] Phase 5: Building graph indices...");
    let parts = compiler.finish(definition);
    tracing::info!(
        "[PEGC] Compiled {} processes, {} activities, {} sequence flows, {} message flows, {} data objects, {} errors",
        parts.processes.len(),
        parts.activities.len(),
        parts.sequence_flows.len(),
        parts.message_flows.len(),
        parts.data_objects.len(),
        parts.errors.len()
    );
    let graph = EntityGraph::new(parts);
    tracing::info!("[PEGC] Compilation successful!");

    Ok(graph)
}

/// Accumulates entities in document order during one compilation
struct GraphCompiler<'e, 'p, 'a> {
    extractor: &'e BehaviourExtractor<'p, 'a>,
    definition: Descriptor,
    processes: Vec<Process>,
    activities: Vec<Activity>,
    sequence_flows: Vec<SequenceFlow>,
    message_flows: Vec<MessageFlow>,
    data_objects: Vec<DataObject>,
    errors: Vec<BpmnError>,
    /// Element id to the id of the top-level process that declares it
    owners: HashMap<String, String>,
}

impl<'e, 'p, 'a> GraphCompiler<'e, 'p, 'a> {
    fn new(extractor: &'e BehaviourExtractor<'p, 'a>, definition: Descriptor) -> Self {
        Self {
            extractor,
            definition,
            processes: Vec::new(),
            activities: Vec::new(),
            sequence_flows: Vec::new(),
            message_flows: Vec::new(),
            data_objects: Vec::new(),
            errors: Vec::new(),
            owners: HashMap::new(),
        }
    }

    fn process(&mut self, element: &Element, definition: &Descriptor) -> Result<()> {
        let id = require_id(element)?;
        let mut process = self.extractor.extract(element, Some(definition.clone()))?;
        process
            .behaviour
            .fields
            .entry("isExecutable")
            .or_insert(serde_json::Value::Bool(false));

        tracing::debug!(
            "[PEGC] Process {} (executable: {})",
            id,
            process.is_executable()
        );

        let scope = process.descriptor();
        self.processes.push(process);
        self.scope(element, &scope, id)
    }

    /// Walk the flow elements lexically contained in `element`
    fn scope(&mut self, element: &Element, scope: &Descriptor, process_id: &str) -> Result<()> {
        for child in element.children("flowElements") {
            if let Some(id) = child.id.as_deref() {
                self.owners.insert(id.to_string(), process_id.to_string());
            }

            match child.element_type.as_str() {
                tags::SEQUENCE_FLOW => self.sequence_flow(child, scope)?,
                tags::DATA_OBJECT => {
                    require_id(child)?;
                    let data_object = self.extractor.extract(child, Some(scope.clone()))?;
                    self.data_objects.push(data_object);
                }
                tags::DATA_OBJECT_REFERENCE | tags::DATA_STORE_REFERENCE => {}
                tags::ERROR => {
                    // errors are global whatever scope declares them
                    let definition = self.definition.clone();
                    self.error(child, &definition)?;
                }
                _ => {
                    self.activity(child, scope)?;
                    if child.properties.contains_key("flowElements") {
                        let sub_scope =
                            Descriptor::new(require_id(child)?, child.element_type.clone());
                        self.scope(child, &sub_scope, process_id)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn activity(&mut self, element: &Element, scope: &Descriptor) -> Result<()> {
        require_id(element)?;
        self.extractor.check_default_flow(element)?;
        let activity = self.extractor.extract(element, Some(scope.clone()))?;
        tracing::debug!("[PEGC] Activity {} ({})", activity.id, activity.element_type);
        self.activities.push(activity);
        Ok(())
    }

    fn sequence_flow(&mut self, element: &Element, scope: &Descriptor) -> Result<()> {
        let id = require_id(element)?;
        let source_id = flow_end(element, id, "sourceRef")?;
        let target_id = flow_end(element, id, "targetRef")?;

        let is_default = self
            .extractor
            .pool()
            .get(source_id)
            .and_then(|source| source.attribute_str("default"))
            == Some(id);

        let mut record = self.extractor.record(element, Some(scope.clone()))?;
        if is_default {
            record.behaviour.condition_expression = None;
        }

        let flow = SequenceFlow {
            id: record.id,
            element_type: record.element_type,
            name: record.name,
            parent: scope.clone(),
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            is_default,
            behaviour: record.behaviour,
            binding: (),
        }
        .bind(self.extractor.registry())?;

        self.sequence_flows.push(flow);
        Ok(())
    }

    fn error(&mut self, element: &Element, definition: &Descriptor) -> Result<()> {
        require_id(element)?;
        let error = self.extractor.extract(element, Some(definition.clone()))?;
        self.errors.push(error);
        Ok(())
    }

    fn collaboration(&mut self, element: &Element, definition: &Descriptor) -> Result<()> {
        let participants: HashMap<&str, &str> = element
            .children("participants")
            .iter()
            .filter_map(|participant| {
                Some((participant.id.as_deref()?, participant.reference_id("processRef")?))
            })
            .collect();

        for flow in element.children("messageFlows") {
            require_id(flow)?;
            let source = self.endpoint(flow, "sourceRef", &participants)?;
            let target = self.endpoint(flow, "targetRef", &participants)?;
            let record = self.extractor.record(flow, Some(definition.clone()))?;

            let message_flow = MessageFlow {
                id: record.id,
                element_type: record.element_type,
                name: record.name,
                parent: definition.clone(),
                source,
                target,
                behaviour: record.behaviour,
                binding: (),
            }
            .bind(self.extractor.registry())?;

            tracing::debug!(
                "[PEGC] Message flow {}: {:?} -> {:?}",
                message_flow.id,
                message_flow.source.process_id,
                message_flow.target.process_id
            );
            self.message_flows.push(message_flow);
        }
        Ok(())
    }

    /// Resolve one end of a message flow to `{processId, id}`
    fn endpoint(
        &self,
        flow: &Element,
        key: &str,
        participants: &HashMap<&str, &str>,
    ) -> Result<FlowEndpoint> {
        let ref_id = flow.reference_id(key).ok_or_else(|| GraphError::DanglingReference {
            id: format!("{}.{}", flow.id.as_deref().unwrap_or("?"), key),
        })?;
        let resolved = self.extractor.pool().resolve(ref_id)?;
        let id = resolved.descriptor().id;

        let process_id = self
            .owners
            .get(&id)
            .cloned()
            .or_else(|| participants.get(id.as_str()).map(|process| process.to_string()));

        Ok(FlowEndpoint { process_id, id })
    }

    fn finish(self, definition: Entity) -> GraphParts {
        GraphParts {
            definition,
            processes: self.processes,
            activities: self.activities,
            sequence_flows: self.sequence_flows,
            message_flows: self.message_flows,
            data_objects: self.data_objects,
            errors: self.errors,
        }
    }
}

fn require_id(element: &Element) -> Result<&str> {
    element.id.as_deref().ok_or_else(|| GraphError::MissingId {
        element_type: element.element_type.clone(),
    })
}

/// Referenced id at one end of a sequence flow
fn flow_end<'a>(flow: &'a Element, id: &str, key: &str) -> Result<&'a str> {
    flow.reference_id(key)
        .filter(|ref_id| !ref_id.is_empty())
        .ok_or_else(|| GraphError::DanglingReference {
            id: format!("{}.{}", id, key),
        })
}

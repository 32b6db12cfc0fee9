//! # Type Registry
//!
//! Maps element type tags to the behaviour implementations an execution engine
//! instantiates for them. The implementations themselves are opaque to the
//! compiler; it only hands out shared handles ([`Binding`]) and compares them by
//! identity.

use crate::error::{GraphError, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Registry tag of the binding attached to elements with an `implementation`
pub const SERVICE_IMPLEMENTATION: &str = "ServiceImplementation";

/// A behaviour implementation supplied by the execution engine
pub trait Behaviour: Send + Sync + 'static {
    /// Implementation name, used in diagnostics only
    fn name(&self) -> &str;
}

/// Shared handle to a resolved behaviour implementation
///
/// Two bindings are equal when they point at the same implementation instance.
#[derive(Clone)]
pub struct Binding(Arc<dyn Behaviour>);

impl Binding {
    pub fn new(behaviour: impl Behaviour) -> Self {
        Self(Arc::new(behaviour))
    }

    pub fn from_arc(behaviour: Arc<dyn Behaviour>) -> Self {
        Self(behaviour)
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn behaviour(&self) -> &Arc<dyn Behaviour> {
        &self.0
    }

    pub fn ptr_eq(&self, other: &Binding) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.0) as *const (),
            Arc::as_ptr(&other.0) as *const (),
        )
    }
}

impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Binding({})", self.name())
    }
}

/// Type tag to behaviour table
pub type TypeTable = HashMap<String, Binding>;

/// Behaviour implementations keyed by behaviour name (`Task`, `SignalTask`, ...)
pub type Behaviours = HashMap<String, Binding>;

/// Tags seeded into the default table, paired with the behaviour key they use
pub const DEFAULT_TYPE_MAPPINGS: &[(&str, &str)] = &[
    ("bpmn:Definitions", "Definition"),
    ("bpmn:Process", "Process"),
    ("bpmn:Error", "BpmnError"),
    ("bpmn:DataObject", "DataObject"),
    ("bpmn:DataStore", "DataStore"),
    ("bpmn:DataObjectReference", "Dummy"),
    ("bpmn:DataStoreReference", "Dummy"),
    ("bpmn:Message", "Dummy"),
    ("bpmn:Signal", "Dummy"),
    ("bpmn:ItemDefinition", "Dummy"),
    ("bpmn:SequenceFlow", "SequenceFlow"),
    ("bpmn:MessageFlow", "MessageFlow"),
    ("bpmn:IoSpecification", "IoSpecification"),
    ("bpmn:MultiInstanceLoopCharacteristics", "MultiInstanceLoopCharacteristics"),
    ("bpmn:StandardLoopCharacteristics", "StandardLoopCharacteristics"),
    ("bpmn:Task", "Task"),
    ("bpmn:ScriptTask", "ScriptTask"),
    ("bpmn:ServiceTask", "ServiceTask"),
    ("bpmn:SendTask", "ServiceTask"),
    ("bpmn:BusinessRuleTask", "ServiceTask"),
    ("bpmn:UserTask", "SignalTask"),
    ("bpmn:ManualTask", "SignalTask"),
    ("bpmn:ReceiveTask", "SignalTask"),
    ("bpmn:CallActivity", "CallActivity"),
    ("bpmn:SubProcess", "SubProcess"),
    ("bpmn:Transaction", "SubProcess"),
    ("bpmn:AdHocSubProcess", "SubProcess"),
    ("bpmn:StartEvent", "StartEvent"),
    ("bpmn:EndEvent", "EndEvent"),
    ("bpmn:BoundaryEvent", "BoundaryEvent"),
    ("bpmn:IntermediateCatchEvent", "IntermediateCatchEvent"),
    ("bpmn:IntermediateThrowEvent", "IntermediateThrowEvent"),
    ("bpmn:ExclusiveGateway", "ExclusiveGateway"),
    ("bpmn:InclusiveGateway", "InclusiveGateway"),
    ("bpmn:ParallelGateway", "ParallelGateway"),
    ("bpmn:EventBasedGateway", "EventBasedGateway"),
    ("bpmn:ErrorEventDefinition", "ErrorEventDefinition"),
    ("bpmn:TimerEventDefinition", "TimerEventDefinition"),
    ("bpmn:MessageEventDefinition", "MessageEventDefinition"),
    ("bpmn:SignalEventDefinition", "SignalEventDefinition"),
    ("bpmn:TerminateEventDefinition", "TerminateEventDefinition"),
    ("bpmn:ConditionalEventDefinition", "ConditionalEventDefinition"),
    ("bpmn:CompensateEventDefinition", "CompensateEventDefinition"),
    ("bpmn:EscalationEventDefinition", "EscalationEventDefinition"),
    ("bpmn:LinkEventDefinition", "LinkEventDefinition"),
    (SERVICE_IMPLEMENTATION, "ServiceImplementation"),
];

/// Build the default tag table from the behaviours the caller provides
///
/// Tags whose behaviour key is missing from `behaviours` are left out and fail
/// to resolve later.
pub fn default_table(behaviours: &Behaviours) -> TypeTable {
    DEFAULT_TYPE_MAPPINGS
        .iter()
        .filter_map(|(tag, key)| {
            behaviours
                .get(*key)
                .map(|binding| (tag.to_string(), binding.clone()))
        })
        .collect()
}

/// Immutable type tag resolver
#[derive(Clone, Default)]
pub struct TypeRegistry {
    table: TypeTable,
}

impl TypeRegistry {
    pub fn new(table: TypeTable) -> Self {
        tracing::debug!("[REGISTRY] Created with {} type tags", table.len());
        Self { table }
    }

    /// Create a registry from `table` after `extend` adds or overrides entries
    pub fn with_extension<F>(table: TypeTable, extend: F) -> Self
    where
        F: FnOnce(TypeTable) -> TypeTable,
    {
        Self::new(extend(table))
    }

    /// Create a registry seeded with [`default_table`]
    pub fn from_behaviours(behaviours: &Behaviours) -> Self {
        Self::new(default_table(behaviours))
    }

    pub fn from_behaviours_with<F>(behaviours: &Behaviours, extend: F) -> Self
    where
        F: FnOnce(TypeTable) -> TypeTable,
    {
        Self::with_extension(default_table(behaviours), extend)
    }

    /// Resolve a type tag to its behaviour
    pub fn resolve(&self, tag: &str) -> Result<&Binding> {
        self.table
            .get(tag)
            .ok_or_else(|| GraphError::UnknownType(tag.to_string()))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.table.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.table.keys().collect();
        tags.sort();
        f.debug_struct("TypeRegistry").field("tags", &tags).finish()
    }
}

/// Behaviour stand-ins shared by the unit and integration tests
#[doc(hidden)]
pub mod testing {
    use super::*;

    pub struct Named(pub &'static str);

    impl Behaviour for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    pub const BEHAVIOUR_KEYS: &[&str] = &[
        "Definition",
        "Process",
        "BoundaryEvent",
        "BpmnError",
        "DataObject",
        "Dummy",
        "EndEvent",
        "ErrorEventDefinition",
        "ExclusiveGateway",
        "InclusiveGateway",
        "IntermediateCatchEvent",
        "IoSpecification",
        "MessageEventDefinition",
        "MessageFlow",
        "MultiInstanceLoopCharacteristics",
        "ParallelGateway",
        "ScriptTask",
        "SequenceFlow",
        "ServiceImplementation",
        "ServiceTask",
        "SignalTask",
        "StartEvent",
        "SubProcess",
        "Task",
        "TerminateEventDefinition",
        "TimerEventDefinition",
    ];

    pub fn behaviours() -> Behaviours {
        BEHAVIOUR_KEYS
            .iter()
            .map(|key| (key.to_string(), Binding::new(Named(*key))))
            .collect()
    }

    pub fn registry() -> TypeRegistry {
        TypeRegistry::from_behaviours(&behaviours())
    }
}

//! Shared fixtures for the integration tests
#![allow(dead_code, unused_imports)]

pub use pegc::registry::testing::{behaviours, Named, BEHAVIOUR_KEYS};
use pegc::{build_graph, Behaviours, Document, EntityGraph, TypeRegistry};
use serde_json::{json, Value};
use std::sync::Once;

static INIT: Once = Once::new();

/// Install a debug-level fmt subscriber once per test binary
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

pub fn document(value: Value) -> Document {
    Document::from_value(value).unwrap()
}

/// Build `value` against a registry over `behaviours`
pub fn build(value: Value, behaviours: &Behaviours) -> EntityGraph {
    init_test_logging();
    build_graph(&document(value), &TypeRegistry::from_behaviours(behaviours)).unwrap()
}

fn flow(id: &str, source: &str, target: &str) -> Value {
    json!({ "$type": "bpmn:SequenceFlow", "id": id, "sourceRef": source, "targetRef": target })
}

fn expression(body: &str) -> Value {
    json!({ "$type": "bpmn:FormalExpression", "body": body })
}

/// Two processes in one collaboration, one executable, with message flows both ways
pub fn lanes() -> Value {
    json!({
        "$type": "bpmn:Definitions",
        "id": "Definitions_1",
        "name": "Lanes",
        "rootElements": [
            {
                "$type": "bpmn:Collaboration",
                "id": "Collaboration_1",
                "participants": [
                    { "$type": "bpmn:Participant", "id": "mainParticipant", "processRef": "mainProcess" },
                    { "$type": "bpmn:Participant", "id": "partnerParticipant", "processRef": "participantProcess" }
                ],
                "messageFlows": [
                    {
                        "$type": "bpmn:MessageFlow",
                        "id": "fromMainTaskMessageFlow",
                        "sourceRef": "task1",
                        "targetRef": "messageStartEvent"
                    },
                    {
                        "$type": "bpmn:MessageFlow",
                        "id": "fromCompleteTaskMessageFlow",
                        "sourceRef": "completeTask",
                        "targetRef": "intermediate"
                    }
                ]
            },
            {
                "$type": "bpmn:Process",
                "id": "mainProcess",
                "isExecutable": true,
                "laneSets": [{
                    "$type": "bpmn:LaneSet",
                    "id": "LaneSet_1",
                    "lanes": [{
                        "$type": "bpmn:Lane",
                        "id": "Lane_1",
                        "flowNodeRef": ["theStart", "task1", "intermediate", "theEnd"]
                    }]
                }],
                "flowElements": [
                    { "$type": "bpmn:StartEvent", "id": "theStart" },
                    { "$type": "bpmn:Task", "id": "task1" },
                    {
                        "$type": "bpmn:IntermediateCatchEvent",
                        "id": "intermediate",
                        "eventDefinitions": [{ "$type": "bpmn:MessageEventDefinition" }]
                    },
                    { "$type": "bpmn:EndEvent", "id": "theEnd" },
                    flow("flow1", "theStart", "task1"),
                    flow("flow2", "task1", "intermediate"),
                    flow("flow3", "intermediate", "theEnd")
                ]
            },
            {
                "$type": "bpmn:Process",
                "id": "participantProcess",
                "flowElements": [
                    {
                        "$type": "bpmn:StartEvent",
                        "id": "messageStartEvent",
                        "eventDefinitions": [{ "$type": "bpmn:MessageEventDefinition" }]
                    },
                    { "$type": "bpmn:UserTask", "id": "completeTask" },
                    {
                        "$type": "bpmn:ScriptTask",
                        "id": "scriptTask",
                        "scriptFormat": "JavaScript",
                        "script": "next();"
                    },
                    { "$type": "bpmn:EndEvent", "id": "participantEnd" },
                    flow("flow-p-1", "messageStartEvent", "completeTask"),
                    flow("flow-p-2", "completeTask", "scriptTask"),
                    flow("flow-p-3", "scriptTask", "participantEnd")
                ]
            }
        ]
    })
}

/// One process holding a sub process with its own start, end and flow
pub fn sub_process() -> Value {
    json!({
        "$type": "bpmn:Definitions",
        "id": "Definitions_2",
        "rootElements": [{
            "$type": "bpmn:Process",
            "id": "mainProcess",
            "isExecutable": true,
            "flowElements": [
                { "$type": "bpmn:StartEvent", "id": "theStart" },
                {
                    "$type": "bpmn:SubProcess",
                    "id": "subProcess",
                    "flowElements": [
                        { "$type": "bpmn:StartEvent", "id": "subStart" },
                        { "$type": "bpmn:EndEvent", "id": "subEnd" },
                        flow("subFlow1", "subStart", "subEnd")
                    ]
                },
                { "$type": "bpmn:EndEvent", "id": "theEnd" },
                flow("flow1", "theStart", "subProcess"),
                flow("flow2", "subProcess", "theEnd")
            ]
        }]
    })
}

/// Exclusive gateway with a default flow and a conditional flow
pub fn decision() -> Value {
    json!({
        "$type": "bpmn:Definitions",
        "id": "Definitions_3",
        "rootElements": [{
            "$type": "bpmn:Process",
            "id": "theProcess",
            "isExecutable": true,
            "flowElements": [
                { "$type": "bpmn:StartEvent", "id": "theStart" },
                { "$type": "bpmn:ExclusiveGateway", "id": "decision", "default": "flow2" },
                { "$type": "bpmn:EndEvent", "id": "end1" },
                { "$type": "bpmn:EndEvent", "id": "end2" },
                flow("flow1", "theStart", "decision"),
                flow("flow2", "decision", "end1"),
                {
                    "$type": "bpmn:SequenceFlow",
                    "id": "flow3",
                    "sourceRef": "decision",
                    "targetRef": "end2",
                    "conditionExpression": {
                        "$type": "bpmn:FormalExpression",
                        "language": "JavaScript",
                        "body": "next(null, this.environment.variables.input <= 50);"
                    }
                }
            ]
        }]
    })
}

/// User tasks whose io specifications reach data objects through references
pub fn io() -> Value {
    json!({
        "$type": "bpmn:Definitions",
        "id": "Definitions_4",
        "rootElements": [
            {
                "$type": "bpmn:Process",
                "id": "theProcess",
                "isExecutable": true,
                "flowElements": [
                    { "$type": "bpmn:DataObjectReference", "id": "inputToUserRef", "dataObjectRef": "userInfo" },
                    { "$type": "bpmn:DataObjectReference", "id": "outputFromUserRef", "dataObjectRef": "global" },
                    { "$type": "bpmn:DataObjectReference", "id": "globalRef", "dataObjectRef": "global" },
                    { "$type": "bpmn:DataObject", "id": "userInfo" },
                    { "$type": "bpmn:DataObject", "id": "global" },
                    { "$type": "bpmn:DataObject", "id": "noref" },
                    {
                        "$type": "bpmn:UserTask",
                        "id": "userTask",
                        "ioSpecification": {
                            "$type": "bpmn:IoSpecification",
                            "id": "inputSpec",
                            "dataInputs": [{ "$type": "bpmn:DataInput", "id": "userInput", "name": "info" }],
                            "dataOutputs": [{ "$type": "bpmn:DataOutput", "id": "userOutput", "name": "result" }]
                        },
                        "dataInputAssociations": [{
                            "$type": "bpmn:DataInputAssociation",
                            "id": "associatedWith",
                            "sourceRef": ["inputToUserRef"],
                            "targetRef": "userInput"
                        }],
                        "dataOutputAssociations": [{
                            "$type": "bpmn:DataOutputAssociation",
                            "id": "associatedWithOut",
                            "sourceRef": ["userOutput"],
                            "targetRef": "outputFromUserRef"
                        }]
                    }
                ]
            },
            {
                "$type": "bpmn:Process",
                "id": "theOtherProcess",
                "isExecutable": true,
                "flowElements": [
                    { "$type": "bpmn:DataObjectReference", "id": "inputToUserRefTo", "dataObjectRef": "duplex" },
                    { "$type": "bpmn:DataObject", "id": "duplex" },
                    {
                        "$type": "bpmn:UserTask",
                        "id": "userTaskTo",
                        "ioSpecification": {
                            "$type": "bpmn:IoSpecification",
                            "id": "inputSpecTo",
                            "dataInputs": [{ "$type": "bpmn:DataInput", "id": "userInputTo", "name": "info" }],
                            "dataOutputs": [{ "$type": "bpmn:DataOutput", "id": "userOutputTo", "name": "info" }],
                            "inputSets": [{
                                "$type": "bpmn:InputSet",
                                "id": "inputGroup",
                                "dataInputRefs": ["userInputTo"]
                            }],
                            "outputSets": [{
                                "$type": "bpmn:OutputSet",
                                "id": "outputGroup",
                                "dataOutputRefs": ["userOutputTo"]
                            }]
                        },
                        "dataInputAssociations": [{
                            "$type": "bpmn:DataInputAssociation",
                            "id": "associatedWithTo",
                            "sourceRef": ["inputToUserRefTo"],
                            "targetRef": "userInputTo"
                        }],
                        "dataOutputAssociations": [{
                            "$type": "bpmn:DataOutputAssociation",
                            "id": "associatedWithToOut",
                            "sourceRef": ["userOutputTo"],
                            "targetRef": "inputToUserRefTo"
                        }]
                    }
                ]
            }
        ]
    })
}

/// A task with an error boundary event and a timer boundary event
pub fn bound_error_and_timer() -> Value {
    json!({
        "$type": "bpmn:Definitions",
        "id": "Definitions_1",
        "rootElements": [
            { "$type": "bpmn:Error", "id": "Error_0", "name": "InputError", "errorCode": "404" },
            {
                "$type": "bpmn:Process",
                "id": "theProcess",
                "isExecutable": true,
                "flowElements": [
                    { "$type": "bpmn:StartEvent", "id": "theStart" },
                    { "$type": "bpmn:ScriptTask", "id": "scriptTask", "scriptFormat": "JavaScript" },
                    {
                        "$type": "bpmn:BoundaryEvent",
                        "id": "errorEvent",
                        "attachedToRef": "scriptTask",
                        "eventDefinitions": [{
                            "$type": "bpmn:ErrorEventDefinition",
                            "errorRef": "Error_0"
                        }]
                    },
                    {
                        "$type": "bpmn:BoundaryEvent",
                        "id": "timerEvent",
                        "attachedToRef": "scriptTask",
                        "cancelActivity": true,
                        "eventDefinitions": [{
                            "$type": "bpmn:TimerEventDefinition",
                            "timeDuration": expression("PT0.05S")
                        }]
                    },
                    { "$type": "bpmn:EndEvent", "id": "theEnd" },
                    { "$type": "bpmn:EndEvent", "id": "errorEnd" },
                    flow("flow1", "theStart", "scriptTask"),
                    flow("flow2", "scriptTask", "theEnd"),
                    flow("flow3", "errorEvent", "errorEnd"),
                    flow("flow4", "timerEvent", "theEnd")
                ]
            }
        ]
    })
}

/// A task with multi instance loop characteristics
pub fn multi_instance() -> Value {
    json!({
        "$type": "bpmn:Definitions",
        "id": "Definitions_5",
        "rootElements": [{
            "$type": "bpmn:Process",
            "id": "theProcess",
            "isExecutable": true,
            "flowElements": [{
                "$type": "bpmn:Task",
                "id": "loop",
                "loopCharacteristics": {
                    "$type": "bpmn:MultiInstanceLoopCharacteristics",
                    "loopCardinality": expression("${environment.variables.maxCardinality}"),
                    "completionCondition": expression("${environment.services.completed}")
                }
            }]
        }]
    })
}

/// Service and send tasks, one without an implementation
pub fn services() -> Value {
    json!({
        "$type": "bpmn:Definitions",
        "id": "Definitions_6",
        "rootElements": [{
            "$type": "bpmn:Process",
            "id": "theProcess",
            "isExecutable": true,
            "flowElements": [
                { "$type": "bpmn:SendTask", "id": "send", "implementation": "${environment.services.request}" },
                { "$type": "bpmn:ServiceTask", "id": "service", "implementation": "${environment.services.request}" },
                { "$type": "bpmn:ServiceTask", "id": "dummyService" }
            ]
        }]
    })
}

/// An escalation thrown from a process, needing extension types
pub fn escalation() -> Value {
    json!({
        "$type": "bpmn:Definitions",
        "id": "Definitions_7",
        "rootElements": [
            { "$type": "bpmn:Escalation", "id": "escalation_1", "name": "Escalate", "escalationCode": "10" },
            {
                "$type": "bpmn:Process",
                "id": "theProcess",
                "isExecutable": true,
                "flowElements": [
                    { "$type": "bpmn:StartEvent", "id": "theStart" },
                    {
                        "$type": "bpmn:IntermediateThrowEvent",
                        "id": "intermediateThrowEvent_1",
                        "eventDefinitions": [{
                            "$type": "bpmn:EscalationEventDefinition",
                            "escalationRef": "escalation_1"
                        }]
                    },
                    { "$type": "bpmn:EndEvent", "id": "theEnd" },
                    flow("flow1", "theStart", "intermediateThrowEvent_1"),
                    flow("flow2", "intermediateThrowEvent_1", "theEnd")
                ]
            }
        ]
    })
}

/// Every buildable fixture
pub fn fixtures() -> Vec<(&'static str, Value)> {
    vec![
        ("lanes", lanes()),
        ("sub_process", sub_process()),
        ("decision", decision()),
        ("io", io()),
        ("bound_error_and_timer", bound_error_and_timer()),
        ("multi_instance", multi_instance()),
        ("services", services()),
    ]
}

/// Assert that `a` and `b` answer every query identically
pub fn assert_same_answers(a: &EntityGraph, b: &EntityGraph) {
    assert_eq!(a.id(), b.id());
    assert_eq!(a.element_type(), b.element_type());
    assert_eq!(a.name(), b.name());
    assert_eq!(a.definition(), b.definition());
    assert_eq!(a.get_processes(), b.get_processes());
    assert_eq!(a.get_executable_processes(), b.get_executable_processes());
    assert_eq!(a.get_activities(None), b.get_activities(None));
    assert_eq!(a.get_sequence_flows(None), b.get_sequence_flows(None));
    assert_eq!(a.get_message_flows(None), b.get_message_flows(None));
    assert_eq!(a.get_data_objects(None), b.get_data_objects(None));
    assert_eq!(a.get_errors(), b.get_errors());

    for process in a.get_processes() {
        let id = process.id.as_str();
        assert_eq!(a.get_process_by_id(id), b.get_process_by_id(id));
        assert_eq!(a.get_activities(Some(id)), b.get_activities(Some(id)));
        assert_eq!(a.get_sequence_flows(Some(id)), b.get_sequence_flows(Some(id)));
        assert_eq!(a.get_message_flows(Some(id)), b.get_message_flows(Some(id)));
        assert_eq!(a.get_data_objects(Some(id)), b.get_data_objects(Some(id)));
    }

    for activity in a.get_activities(None) {
        let id = activity.id.as_str();
        assert_eq!(a.get_activity_by_id(id), b.get_activity_by_id(id));
        assert_eq!(a.get_activities(Some(id)), b.get_activities(Some(id)));
        assert_eq!(a.get_outbound_sequence_flows(id), b.get_outbound_sequence_flows(id));
        assert_eq!(a.get_inbound_sequence_flows(id), b.get_inbound_sequence_flows(id));
    }

    for flow in a.get_sequence_flows(None) {
        assert_eq!(a.get_sequence_flow_by_id(&flow.id), b.get_sequence_flow_by_id(&flow.id));
    }
    for data_object in a.get_data_objects(None) {
        assert_eq!(
            a.get_data_object_by_id(&data_object.id),
            b.get_data_object_by_id(&data_object.id)
        );
    }
    for error in a.get_errors() {
        assert_eq!(a.get_error_by_id(&error.id), b.get_error_by_id(&error.id));
    }
}

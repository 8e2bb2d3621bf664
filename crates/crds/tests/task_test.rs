//! Tests for the persisted Task shape
//!
//! Drives Task values through JSON the way the API server stores them.

use bmc_crds::*;
use kube::CustomResourceExt;
use serde_json::json;

fn task_json(task: serde_json::Value) -> serde_json::Value {
    json!({
        "apiVersion": "bmc.tinkerbell.org/v1alpha1",
        "kind": "Task",
        "metadata": { "name": "machine-1-task-0", "namespace": "tink-system" },
        "spec": {
            "task": task,
            "connection": {
                "host": "10.0.0.5",
                "port": 623,
                "authSecretRef": { "name": "bmc-creds", "namespace": "tink-system" },
                "insecureTLS": false
            }
        }
    })
}

#[test]
fn test_power_task_from_stored_json() {
    let task: Task = serde_json::from_value(task_json(json!({ "powerAction": "off" })))
        .expect("deserialize power task");

    assert_eq!(task.action().power(), Some(PowerAction::Off));
    assert_eq!(task.spec.connection.host, "10.0.0.5");
    assert!(task.status.is_none());
    assert!(!task.is_finished());
}

#[test]
fn test_boot_device_task_only_first_device_effective() {
    let task: Task = serde_json::from_value(task_json(json!({
        "oneTimeBootDeviceAction": { "device": ["disk", "pxe"], "efiBoot": true }
    })))
    .expect("deserialize boot device task");

    let boot = task.action().one_time_boot_device().expect("boot device action");
    assert_eq!(boot.effective_device(), Some(&BootDevice::DISK));
    assert!(boot.efi_boot);

    // The second device survives a write back to storage
    let stored = serde_json::to_value(&task).expect("serialize task");
    assert_eq!(stored["spec"]["task"]["oneTimeBootDeviceAction"]["device"], json!(["disk", "pxe"]));
}

#[test]
fn test_task_without_action_is_rejected() {
    let err = serde_json::from_value::<Task>(task_json(json!({})))
        .expect_err("no action selected must not deserialize");
    assert!(err.to_string().contains("no action selected"), "unexpected error: {err}");
}

#[test]
fn test_task_with_both_actions_is_rejected() {
    let err = serde_json::from_value::<Task>(task_json(json!({
        "powerAction": "on",
        "oneTimeBootDeviceAction": { "device": ["pxe"] }
    })))
    .expect_err("both actions must not deserialize");
    assert!(err.to_string().contains("multiple actions selected"), "unexpected error: {err}");
}

#[test]
fn test_status_round_trip_through_storage() {
    let mut task: Task = serde_json::from_value(task_json(json!({ "powerAction": "cycle" })))
        .expect("deserialize task");

    task.mark_started("2024-01-02T03:04:05Z".parse().expect("timestamp"));
    task.set_condition_with(
        TaskConditionType::FAILED,
        ConditionStatus::False,
        [with_message("retrying")],
    );
    task.mark_completed("2024-01-02T03:05:00Z".parse().expect("timestamp"));

    let stored = serde_json::to_value(&task).expect("serialize task");
    assert_eq!(
        stored["status"]["conditions"],
        json!([
            { "type": "Failed", "status": "False", "message": "retrying" },
            { "type": "Completed", "status": "True" }
        ])
    );
    assert_eq!(stored["status"]["startTime"], json!("2024-01-02T03:04:05Z"));
    assert_eq!(stored["status"]["completionTime"], json!("2024-01-02T03:05:00Z"));

    let reloaded: Task = serde_json::from_value(stored).expect("reload task");
    assert!(reloaded.has_condition(&TaskConditionType::COMPLETED, ConditionStatus::True));
    assert!(reloaded.is_finished());
}

#[test]
fn test_unknown_condition_types_are_preserved() {
    let mut stored = task_json(json!({ "powerAction": "status" }));
    stored["status"] = json!({
        "conditions": [
            { "type": "PowerStateObserved", "status": "Unknown" },
            { "type": "Completed", "status": "False" }
        ]
    });
    let mut task: Task = serde_json::from_value(stored).expect("deserialize task");

    task.set_condition(TaskConditionType::COMPLETED, ConditionStatus::True);

    let types: Vec<&str> = task.conditions().iter().map(|c| c.type_.as_str()).collect();
    assert_eq!(types, ["PowerStateObserved", "Completed"]);
    assert!(task.has_condition(
        &TaskConditionType::new("PowerStateObserved"),
        ConditionStatus::Unknown
    ));
}

#[test]
fn test_crd_metadata() {
    let crd = Task::crd();
    assert_eq!(crd.spec.group, "bmc.tinkerbell.org");
    assert_eq!(crd.spec.names.kind, "Task");
    assert_eq!(crd.spec.names.plural, "tasks");
    assert_eq!(crd.spec.names.short_names, Some(vec!["t".to_string()]));
    assert_eq!(crd.spec.names.categories, Some(vec!["tinkerbell".to_string()]));
    assert_eq!(crd.spec.scope, "Namespaced");

    let schema = serde_json::to_value(&crd.spec.versions[0].schema).expect("serialize schema");
    let action = &schema["openAPIV3Schema"]["properties"]["spec"]["properties"]["task"];
    assert_eq!(action["maxProperties"], json!(1), "action schema: {action}");
    assert!(action["properties"]["powerAction"].is_object());
    assert!(action["properties"]["oneTimeBootDeviceAction"].is_object());

    let conditions = &schema["openAPIV3Schema"]["properties"]["status"]["properties"]["conditions"];
    assert_eq!(
        conditions["x-kubernetes-list-type"],
        json!("map"),
        "conditions schema: {conditions}"
    );
    assert_eq!(conditions["x-kubernetes-list-map-keys"], json!(["type"]));
}

#[test]
fn test_stored_duplicate_conditions_collapse_on_load() {
    let mut stored = task_json(json!({ "powerAction": "reset" }));
    stored["status"] = json!({
        "conditions": [
            { "type": "Completed", "status": "False" },
            { "type": "Completed", "status": "Unknown" }
        ]
    });
    let mut task: Task = serde_json::from_value(stored).expect("deserialize task");

    task.set_condition(TaskConditionType::COMPLETED, ConditionStatus::True);

    assert_eq!(task.conditions().len(), 1, "conditions: {:?}", task.conditions());
    assert!(task.has_condition(&TaskConditionType::COMPLETED, ConditionStatus::True));
}

//! Task CRD
//!
//! A single BMC operation and the conditions observed while performing it.

use chrono::{DateTime, Utc};
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::action::{Action, ActionFields};
use crate::condition::{
    ConditionOption, ConditionStatus, TaskCondition, TaskConditionType, TaskConditions,
    with_message,
};
use crate::connection::Connection;

/// TaskSpec defines the desired state of a Task
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "bmc.tinkerbell.org",
    version = "v1alpha1",
    kind = "Task",
    plural = "tasks",
    singular = "task",
    shortname = "t",
    category = "tinkerbell",
    namespaced,
    status = "TaskStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    /// Task defines the specific action to be performed.
    /// A single task can only perform one type of action.
    #[schemars(with = "ActionFields")]
    pub task: Action,

    /// Connection represents the BMC connectivity information.
    #[serde(default)]
    pub connection: Connection,
}

/// TaskStatus defines the observed state of a Task
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    /// Latest available observations of the Task's state, one per type
    #[serde(default, skip_serializing_if = "TaskConditions::is_empty")]
    pub conditions: TaskConditions,

    /// Time the Task started processing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    /// Time the Task completed.
    /// Only set when the Task finishes successfully.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Utc>>,
}

impl Task {
    /// The operation this Task performs
    pub fn action(&self) -> &Action {
        &self.spec.task
    }

    /// Recorded conditions, empty when there is no status yet
    pub fn conditions(&self) -> &[TaskCondition] {
        self.status
            .as_ref()
            .map(|status| status.conditions.as_slice())
            .unwrap_or_default()
    }

    /// Set `condition_type` to `status`, updating the existing entry if there is one.
    pub fn set_condition(&mut self, condition_type: TaskConditionType, status: ConditionStatus) {
        self.set_condition_with(condition_type, status, std::iter::empty::<ConditionOption>());
    }

    /// Like [`Task::set_condition`], applying `options` after the status is set.
    pub fn set_condition_with(
        &mut self,
        condition_type: TaskConditionType,
        status: ConditionStatus,
        options: impl IntoIterator<Item = ConditionOption>,
    ) {
        self.status
            .get_or_insert_with(TaskStatus::default)
            .conditions
            .set(condition_type, status, options);
    }

    /// Whether `condition_type` is present with `status`. Absent means false.
    pub fn has_condition(
        &self,
        condition_type: &TaskConditionType,
        status: ConditionStatus,
    ) -> bool {
        self.status
            .as_ref()
            .is_some_and(|s| s.conditions.has(condition_type, status))
    }

    /// The condition entry for `condition_type`
    pub fn condition(&self, condition_type: &TaskConditionType) -> Option<&TaskCondition> {
        self.status.as_ref().and_then(|s| s.conditions.get(condition_type))
    }

    /// Record the start time. Later calls keep the first value.
    pub fn mark_started(&mut self, at: DateTime<Utc>) {
        let name = self.name_any();
        let status = self.status.get_or_insert_with(TaskStatus::default);
        if status.start_time.is_none() {
            info!("Task {} started at {}", name, at);
            status.start_time = Some(at);
        }
    }

    /// Mark the Task completed and record the completion time.
    pub fn mark_completed(&mut self, at: DateTime<Utc>) {
        info!("Task {} completed at {}", self.name_any(), at);
        self.set_condition(TaskConditionType::COMPLETED, ConditionStatus::True);
        if let Some(status) = self.status.as_mut() {
            status.completion_time = Some(at);
        }
    }

    /// Mark the Task failed. The completion time is left untouched.
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("Task {} failed: {}", self.name_any(), message);
        self.set_condition_with(
            TaskConditionType::FAILED,
            ConditionStatus::True,
            [with_message(message)],
        );
    }

    /// True once the Task has completed or failed
    pub fn is_finished(&self) -> bool {
        self.has_condition(&TaskConditionType::COMPLETED, ConditionStatus::True)
            || self.has_condition(&TaskConditionType::FAILED, ConditionStatus::True)
    }
}

//! Task conditions
//!
//! Conditions record what a reconciler has observed about a Task. The list is
//! keyed by condition type: setting a type that is already present updates
//! that entry in place, a new type is appended at the end.

use std::borrow::Cow;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

/// Type of a Task condition
///
/// Open set. `Completed` and `Failed` are the well-known values; other
/// names are stored and compared like any other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct TaskConditionType(Cow<'static, str>);

impl TaskConditionType {
    /// Successful completion of the Task
    pub const COMPLETED: TaskConditionType = TaskConditionType(Cow::Borrowed("Completed"));

    /// Failure in Task execution
    pub const FAILED: TaskConditionType = TaskConditionType(Cow::Borrowed("Failed"));

    /// Condition type from an arbitrary name
    pub fn new(name: impl Into<String>) -> Self {
        TaskConditionType(Cow::Owned(name.into()))
    }

    /// Condition type name as stored
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskConditionType {
    fn from(name: &str) -> Self {
        TaskConditionType::new(name)
    }
}

/// Status of a condition
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "PascalCase")]
pub enum ConditionStatus {
    /// Condition holds
    True,

    /// Condition does not hold
    False,

    /// Not yet determined
    #[default]
    Unknown,
}

/// A single observation about a Task
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskCondition {
    /// Type of the Task condition
    #[serde(rename = "type")]
    pub type_: TaskConditionType,

    /// Status of the Task condition
    pub status: ConditionStatus,

    /// Human readable message indicating details about the last transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Mutator applied to a condition after its status has been set
///
/// Passed to [`TaskConditions::set`] so auxiliary fields change together with
/// the status. New effects are added as new constructors, the `set` signature
/// stays the same.
pub struct ConditionOption(Box<dyn FnOnce(&mut TaskCondition) + Send>);

impl ConditionOption {
    /// Option from an arbitrary mutation
    pub fn new(apply: impl FnOnce(&mut TaskCondition) + Send + 'static) -> Self {
        ConditionOption(Box::new(apply))
    }

    fn apply(self, condition: &mut TaskCondition) {
        (self.0)(condition);
    }
}

impl fmt::Debug for ConditionOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConditionOption").finish_non_exhaustive()
    }
}

/// Set the condition message
pub fn with_message(message: impl Into<String>) -> ConditionOption {
    let message = message.into();
    ConditionOption::new(move |condition| condition.message = Some(message))
}

/// Clear the condition message
///
/// Setting a condition without a message option keeps the previous message,
/// this option is the way to drop it.
pub fn without_message() -> ConditionOption {
    ConditionOption::new(|condition| condition.message = None)
}

/// Ordered conditions, at most one per type
///
/// Stored as a list-map keyed by `type`, so the API server rejects duplicate
/// types. Stored lists that still carry duplicates are merged on load: the
/// first occurrence keeps its position and the last occurrence's status and
/// message win.
#[derive(Debug, Clone, Default, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(transparent)]
#[schemars(extend(
    "x-kubernetes-list-type" = "map",
    "x-kubernetes-list-map-keys" = ["type"]
))]
pub struct TaskConditions(Vec<TaskCondition>);

impl From<Vec<TaskCondition>> for TaskConditions {
    fn from(stored: Vec<TaskCondition>) -> Self {
        let mut merged: Vec<TaskCondition> = Vec::with_capacity(stored.len());
        for condition in stored {
            match merged.iter_mut().find(|c| c.type_ == condition.type_) {
                Some(existing) => {
                    warn!("Merging duplicate condition {}", condition.type_);
                    existing.status = condition.status;
                    existing.message = condition.message;
                }
                None => merged.push(condition),
            }
        }
        TaskConditions(merged)
    }
}

impl<'de> Deserialize<'de> for TaskConditions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<TaskCondition>::deserialize(deserializer).map(TaskConditions::from)
    }
}

impl TaskConditions {
    /// Empty condition list
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `status` to the `condition_type` entry, creating it if missing.
    ///
    /// An existing entry keeps its position and its message unless an option
    /// changes it. Options run in order after the status is set.
    pub fn set(
        &mut self,
        condition_type: TaskConditionType,
        status: ConditionStatus,
        options: impl IntoIterator<Item = ConditionOption>,
    ) {
        let index = match self.0.iter().position(|c| c.type_ == condition_type) {
            Some(index) => {
                debug!(
                    "Updating condition {} from {:?} to {:?}",
                    condition_type, self.0[index].status, status
                );
                index
            }
            None => {
                debug!("Appending condition {} with status {:?}", condition_type, status);
                self.0.push(TaskCondition {
                    type_: condition_type,
                    status,
                    message: None,
                });
                self.0.len() - 1
            }
        };

        let condition = &mut self.0[index];
        condition.status = status;
        for option in options {
            option.apply(condition);
        }
    }

    /// Whether the `condition_type` entry exists with `status`.
    ///
    /// A missing entry is not in any state.
    pub fn has(&self, condition_type: &TaskConditionType, status: ConditionStatus) -> bool {
        self.get(condition_type).is_some_and(|c| c.status == status)
    }

    /// The entry for `condition_type`, if any
    pub fn get(&self, condition_type: &TaskConditionType) -> Option<&TaskCondition> {
        self.0.iter().find(|c| &c.type_ == condition_type)
    }

    /// Conditions in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, TaskCondition> {
        self.0.iter()
    }

    /// Number of distinct condition types
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no condition has been recorded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Conditions as a slice
    pub fn as_slice(&self) -> &[TaskCondition] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a TaskConditions {
    type Item = &'a TaskCondition;
    type IntoIter = std::slice::Iter<'a, TaskCondition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

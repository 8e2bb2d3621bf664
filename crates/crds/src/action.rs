//! Task actions
//!
//! A Task performs exactly one operation against a baseboard management
//! controller: a power operation or a one-time boot device change.
//!
//! On the wire the action is an object with two optional fields, at most one of
//! which may be set. In Rust it is the [`Action`] enum, so a value that reached
//! this crate always names exactly one operation.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a persisted action does not describe exactly one operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Neither action field is set
    #[error("no action selected: one of powerAction or oneTimeBootDeviceAction must be set")]
    NoneSelected,

    /// Both action fields are set
    #[error(
        "multiple actions selected: only one of powerAction or oneTimeBootDeviceAction may be set"
    )]
    MultipleSelected,

    /// Power action name outside the supported set
    #[error("unknown power action: {0}")]
    UnknownPowerAction(String),
}

/// The single operation a Task performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ActionFields", into = "ActionFields")]
pub enum Action {
    /// Baseboard management power operation
    Power(PowerAction),

    /// Baseboard management one time set boot device operation
    OneTimeBootDevice(OneTimeBootDeviceAction),
}

impl Action {
    /// Power operation, if this is a power action
    pub fn power(&self) -> Option<PowerAction> {
        match self {
            Action::Power(power) => Some(*power),
            Action::OneTimeBootDevice(_) => None,
        }
    }

    /// Boot device change, if this is a one-time boot device action
    pub fn one_time_boot_device(&self) -> Option<&OneTimeBootDeviceAction> {
        match self {
            Action::Power(_) => None,
            Action::OneTimeBootDevice(boot) => Some(boot),
        }
    }
}

impl From<PowerAction> for Action {
    fn from(power: PowerAction) -> Self {
        Action::Power(power)
    }
}

impl From<OneTimeBootDeviceAction> for Action {
    fn from(boot: OneTimeBootDeviceAction) -> Self {
        Action::OneTimeBootDevice(boot)
    }
}

/// Persisted shape of an [`Action`]
///
/// Two optional fields instead of a tagged enum keep the generated schema
/// structural. `maxProperties: 1` lets the API server reject values that set
/// both; [`ActionFields::action`] rejects the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(extend("maxProperties" = 1))]
pub struct ActionFields {
    /// PowerAction represents a baseboard management power operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_action: Option<PowerAction>,

    /// OneTimeBootDeviceAction represents a baseboard management one time set boot
    /// device operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_time_boot_device_action: Option<OneTimeBootDeviceAction>,
}

impl ActionFields {
    /// Resolve which operation is selected.
    ///
    /// Neither or both set is a data-integrity error, never a dispatchable action.
    pub fn action(&self) -> Result<Action, ActionError> {
        Action::try_from(self.clone())
    }
}

impl TryFrom<ActionFields> for Action {
    type Error = ActionError;

    fn try_from(fields: ActionFields) -> Result<Self, Self::Error> {
        match (fields.power_action, fields.one_time_boot_device_action) {
            (Some(power), None) => Ok(Action::Power(power)),
            (None, Some(boot)) => Ok(Action::OneTimeBootDevice(boot)),
            (None, None) => Err(ActionError::NoneSelected),
            (Some(_), Some(_)) => Err(ActionError::MultipleSelected),
        }
    }
}

impl From<Action> for ActionFields {
    fn from(action: Action) -> Self {
        match action {
            Action::Power(power) => ActionFields {
                power_action: Some(power),
                one_time_boot_device_action: None,
            },
            Action::OneTimeBootDevice(boot) => ActionFields {
                power_action: None,
                one_time_boot_device_action: Some(boot),
            },
        }
    }
}

/// Power operations supported by a baseboard management controller
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PowerAction {
    /// Power on
    On,

    /// Hard power off
    Off,

    /// Graceful (ACPI) power off
    Soft,

    /// Query power state only
    Status,

    /// Power off then on
    Cycle,

    /// Hard reset
    Reset,
}

impl PowerAction {
    /// Wire name of the power action
    pub fn as_str(self) -> &'static str {
        match self {
            PowerAction::On => "on",
            PowerAction::Off => "off",
            PowerAction::Soft => "soft",
            PowerAction::Status => "status",
            PowerAction::Cycle => "cycle",
            PowerAction::Reset => "reset",
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerAction {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(PowerAction::On),
            "off" => Ok(PowerAction::Off),
            "soft" => Ok(PowerAction::Soft),
            "status" => Ok(PowerAction::Status),
            "cycle" => Ok(PowerAction::Cycle),
            "reset" => Ok(PowerAction::Reset),
            other => Err(ActionError::UnknownPowerAction(other.to_string())),
        }
    }
}

/// Bootable device class understood by the BMC
///
/// Open set: the constants cover the common classes, any other name is
/// carried through untouched for the reconciler to interpret.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct BootDevice(Cow<'static, str>);

impl BootDevice {
    /// Network boot
    pub const PXE: BootDevice = BootDevice(Cow::Borrowed("pxe"));
    /// Local disk
    pub const DISK: BootDevice = BootDevice(Cow::Borrowed("disk"));
    /// Firmware setup
    pub const BIOS: BootDevice = BootDevice(Cow::Borrowed("bios"));
    /// Optical or virtual media
    pub const CDROM: BootDevice = BootDevice(Cow::Borrowed("cdrom"));
    /// Safe mode
    pub const SAFE: BootDevice = BootDevice(Cow::Borrowed("safe"));

    /// Device from an arbitrary name
    pub fn new(name: impl Into<String>) -> Self {
        BootDevice(Cow::Owned(name.into()))
    }

    /// Device name as stored
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BootDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BootDevice {
    fn from(name: &str) -> Self {
        BootDevice::new(name)
    }
}

/// One time boot device change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OneTimeBootDeviceAction {
    /// Boot devices, in order of preference.
    /// Currently only the first device in the list is used to set one time boot.
    #[serde(rename = "device")]
    pub devices: Vec<BootDevice>,

    /// Request EFI boot. When true, `options=efiboot` is passed while setting the
    /// boot device. Omitted from the stored record when false.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub efi_boot: bool,
}

impl OneTimeBootDeviceAction {
    /// Action for the given devices with EFI boot disabled
    pub fn new(devices: impl IntoIterator<Item = BootDevice>) -> Self {
        Self {
            devices: devices.into_iter().collect(),
            efi_boot: false,
        }
    }

    /// Enable or disable EFI boot
    #[must_use]
    pub fn with_efi_boot(mut self, efi_boot: bool) -> Self {
        self.efi_boot = efi_boot;
        self
    }

    /// The device a consumer acts on.
    ///
    /// Only index 0 is honoured. Later entries are kept in the record but
    /// have no effect.
    pub fn effective_device(&self) -> Option<&BootDevice> {
        self.devices.first()
    }

    /// True when there is no device to set
    pub fn is_noop(&self) -> bool {
        self.devices.is_empty()
    }
}

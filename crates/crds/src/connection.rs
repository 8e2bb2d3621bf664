//! BMC connection details
//!
//! How the reconciler reaches a baseboard management controller. Tasks carry
//! the connection by value; nothing in this crate interprets it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default IPMI/RMCP port
pub const DEFAULT_BMC_PORT: u16 = 623;

fn default_bmc_port() -> u16 {
    DEFAULT_BMC_PORT
}

/// Connection represents the baseboard management connectivity information.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Host is the host IP address or hostname of the BMC
    #[serde(default)]
    pub host: String,

    /// Port is the port number for connecting with the BMC
    #[serde(default = "default_bmc_port")]
    pub port: u16,

    /// Reference to the Secret holding the BMC username and password
    #[serde(default)]
    pub auth_secret_ref: SecretReference,

    /// Skip TLS verification when connecting to the BMC
    #[serde(default, rename = "insecureTLS")]
    pub insecure_tls: bool,
}

impl Default for Connection {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_BMC_PORT,
            auth_secret_ref: SecretReference::default(),
            insecure_tls: false,
        }
    }
}

impl Connection {
    /// Connection to `host` on the default port
    pub fn new(host: impl Into<String>, auth_secret_ref: SecretReference) -> Self {
        Self {
            host: host.into(),
            auth_secret_ref,
            ..Default::default()
        }
    }
}

/// Reference to a Secret by name (and optionally namespace)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretReference {
    /// Name of the Secret
    #[serde(default)]
    pub name: String,

    /// Namespace (defaults to same namespace as the Task)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl SecretReference {
    /// Reference in the same namespace
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }

    /// Reference in an explicit namespace
    pub fn with_namespace(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
        }
    }
}

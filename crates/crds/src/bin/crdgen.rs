//! CRD manifest generator
//!
//! Prints the Task CustomResourceDefinition as YAML. Set `CRD_OUTPUT` to write
//! to a file instead of stdout.

use std::env;
use std::fs;

use anyhow::{Context, Result};
use bmc_crds::Task;
use kube::CustomResourceExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let crd = Task::crd();
    let yaml = serde_yaml::to_string(&crd).context("Failed to serialize Task CRD")?;

    match env::var("CRD_OUTPUT").ok() {
        Some(path) => {
            fs::write(&path, &yaml).with_context(|| format!("Failed to write CRD to {path}"))?;
            info!("Wrote {} CRD to {}", Task::crd_name(), path);
        }
        None => print!("{yaml}"),
    }

    Ok(())
}

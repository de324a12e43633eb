//! Read-only lookups
//!
//! Single-entity sources take the entity id and write its attributes. List
//! sources take a `project_id` (projects take nothing), write a `results`
//! list and get a timestamp id.

mod images;
mod instances;
mod ips;
mod projects;
mod s3_users;
mod volumes;

pub use images::{ProjectImage, ProjectImages};
pub use instances::{ComputeInstance, ComputeInstances};
pub use ips::{NetworkIp, NetworkIps};
pub use projects::Projects;
pub use s3_users::{StorageS3User, StorageS3UserKeys, StorageS3Users};
pub use volumes::{DisksVolume, DisksVolumes};

use crate::data::{Attributes, ResourceData};
use crate::resource::DataSource;
use crate::schema::Attribute;
use serde_json::Value;
use std::sync::Arc;

/// Attribute every list source writes
pub const RESULTS_KEY: &str = "results";

/// Every data source the provider serves
pub fn all() -> Vec<Arc<dyn DataSource>> {
    vec![
        Arc::new(Projects),
        Arc::new(ProjectImages),
        Arc::new(ProjectImage),
        Arc::new(NetworkIp),
        Arc::new(NetworkIps),
        Arc::new(DisksVolume),
        Arc::new(DisksVolumes),
        Arc::new(ComputeInstance),
        Arc::new(ComputeInstances),
        Arc::new(StorageS3User),
        Arc::new(StorageS3Users),
        Arc::new(StorageS3UserKeys),
    ]
}

/// Copy flattened attributes into the data
fn write_all(d: &mut ResourceData, attributes: Attributes) {
    for (key, value) in attributes {
        d.set(&key, value);
    }
}

/// Write a list result under a fresh timestamp id
fn write_results(d: &mut ResourceData, results: Vec<Attributes>) {
    let results: Vec<Value> = results.into_iter().map(Value::Object).collect();
    d.set(RESULTS_KEY, results);
    d.set_id(chrono::Utc::now().timestamp().to_string());
}

/// Computed `results` list of blocks with the given fields
fn results_attribute(fields: Vec<Attribute>) -> Attribute {
    Attribute::blocks(RESULTS_KEY, fields.into_iter().map(Attribute::computed).collect())
        .computed()
}

/// Computed copies of the given fields
fn computed(fields: Vec<Attribute>) -> Vec<Attribute> {
    fields.into_iter().map(Attribute::computed).collect()
}

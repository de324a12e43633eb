//! CLO cloud API client
//!
//! Typed requests and responses for the parts of the CLO REST API the
//! provider manages: projects and images, compute instances, block-storage
//! volumes, floating addresses and object-storage users.
//!
//! Every call takes `&ApiClient` and returns either the decoded entity or an
//! [`ApiError`]. Non-success responses carry an explicit [`ErrorKind`] and
//! numeric code, so callers match on the variant instead of inspecting
//! messages:
//!
//! ```ignore
//! use clo_api::{ApiClient, ClientConfig};
//!
//! let client = ApiClient::new(ClientConfig::new("https://api.clo.ru", token))?;
//! match client.server_detail("3f1c…").await {
//!     Ok(server) => println!("{} is {}", server.name, server.status),
//!     Err(e) if e.is_not_found() => println!("gone"),
//!     Err(e) => return Err(e.into()),
//! }
//! ```

pub mod client;
pub mod disks;
pub mod error;
pub mod ip;
pub mod project;
pub mod servers;
pub mod storage;

// Re-exports
pub use client::{ApiClient, ClientConfig, Created};
pub use disks::{Volume, VolumeAttachBody, VolumeAttachResult, VolumeAttachment, VolumeCreateBody};
pub use error::{ApiError, ErrorKind, NOT_FOUND_CODE, Result};
pub use ip::{Address, AddressAttachBody, AddressCreateBody, AttachedTo};
pub use project::{Image, OperationSystem, Project};
pub use servers::{
    AddressBody, DiskData, Flavor, LicenseBody, Server, ServerAddress, ServerCreateBody,
    ServerDeleteBody, StorageBody,
};
pub use storage::{
    QuotaInfo, QuotaParams, QuotaPatch, S3Keys, S3User, S3UserCreateBody, S3UserQuotaPatchBody,
};

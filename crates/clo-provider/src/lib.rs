//! CLO cloud resources and data sources
//!
//! Declarative lifecycle for CLO entities on top of [`clo_api`] and the
//! convergence waiter in [`clo_converge`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                    clo CLI                       │
//! │        (apply / destroy / refresh / read)        │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 clo-provider                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  CloProvider: plan / apply / destroy      │   │
//! │  │  trait Resource, trait DataSource         │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │ Schema/Data  │  │  State Mgmt  │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐
//! │    clo-api    │ │ clo-converge  │
//! │  REST client  │ │ state waiter  │
//! └───────────────┘ └───────────────┘
//! ```
//!
//! # Resources
//!
//! `clo_compute_instance`, `clo_network_ip`, `clo_network_ip_attach`,
//! `clo_disks_volume`, `clo_disks_volume_attach`, `clo_storage_s3_user`,
//! `clo_storage_s3_user_keys`.

pub mod config;
pub mod context;
pub mod data;
pub mod data_sources;
pub mod error;
pub mod flatten;
pub mod provider;
pub mod resource;
pub mod resources;
pub mod schema;
pub mod state;
pub mod timeouts;
pub mod waiters;

// Re-exports
pub use config::{AUTH_TOKEN_ENV, AUTH_URL_ENV, ProviderConfig};
pub use context::{OpContext, PollSettings};
pub use data::{Attributes, ResourceData};
pub use error::{ProviderError, Result};
pub use provider::{ActionType, CloProvider, Plan, find_data_source, find_resource, plan};
pub use resource::{DataSource, Resource};
pub use schema::{AttrType, Attribute, REDACTED, Schema};
pub use state::{GlobalState, ResourceState, StateLock, StateManager, resource_key};
pub use timeouts::Timeouts;

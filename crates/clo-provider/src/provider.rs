//! Provider registry, planning and lifecycle driving
//!
//! [`CloProvider`] owns the configured API client and dispatches to the
//! registered resources and data sources. Planning is pure and works without
//! credentials, see [`plan`].

use crate::config::ProviderConfig;
use crate::context::OpContext;
use crate::data::{Attributes, ResourceData};
use crate::data_sources;
use crate::error::{ProviderError, Result};
use crate::resource::{DataSource, Resource};
use crate::resources;
use crate::state::ResourceState;
use crate::timeouts::TIMEOUTS_KEY;
use clo_api::ApiClient;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Look up a resource by type name
pub fn find_resource(name: &str) -> Result<Arc<dyn Resource>> {
    resources::all()
        .into_iter()
        .find(|r| r.type_name() == name)
        .ok_or_else(|| ProviderError::UnknownResource(name.to_string()))
}

/// Look up a data source by type name
pub fn find_data_source(name: &str) -> Result<Arc<dyn DataSource>> {
    data_sources::all()
        .into_iter()
        .find(|d| d.type_name() == name)
        .ok_or_else(|| ProviderError::UnknownDataSource(name.to_string()))
}

/// What applying a plan will do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    /// Create a new resource
    Create,
    /// Update the resource in place
    Update,
    /// Delete the existing resource, then create it again
    Replace,
    /// No changes needed
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Replace => write!(f, "replace"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// A planned change to one resource
#[derive(Debug, Clone)]
pub struct Plan {
    pub resource_type: &'static str,

    pub action: ActionType,

    /// The existing resource; consumed once a replacement has deleted it
    pub prior: Option<ResourceData>,

    /// Working data handed to the handlers
    pub data: ResourceData,

    /// The `timeouts` block from the configuration, kept for the state file
    pub timeouts: Option<Value>,

    /// Configurable attributes that differ from the prior state
    pub changed: Vec<&'static str>,

    /// Force-new attributes that caused a replacement
    pub replace_because: Vec<&'static str>,

    /// Replacement caused by a previously failed create
    pub tainted: bool,
}

impl Plan {
    pub fn has_changes(&self) -> bool {
        self.action != ActionType::NoOp
    }

    /// Whether applying creates a new remote entity
    pub fn creates(&self) -> bool {
        matches!(self.action, ActionType::Create | ActionType::Replace)
    }
}

/// Compute the plan for one resource
///
/// `config` may contain a `timeouts` block; it is split off before the
/// configuration is checked against the schema.
pub fn plan(
    resource: &dyn Resource,
    prior: Option<&ResourceState>,
    mut config: Attributes,
) -> Result<Plan> {
    let schema = resource.schema();
    let timeouts_block = config.remove(TIMEOUTS_KEY).filter(|v| !v.is_null());
    let timeouts = resource
        .timeouts()
        .with_overrides(timeouts_block.as_ref())?;

    schema.validate(&config)?;
    schema.apply_defaults(&mut config);

    let mut plan = Plan {
        resource_type: resource.type_name(),
        action: ActionType::Create,
        prior: None,
        data: ResourceData::new(config.clone()).with_timeouts(timeouts),
        timeouts: timeouts_block,
        changed: Vec::new(),
        replace_because: Vec::new(),
        tainted: false,
    };

    if let Some(prior) = prior {
        // Deleting the old entity honours the timeouts it was created with
        let prior_timeouts = resource
            .timeouts()
            .with_overrides(prior.timeouts.as_ref())?;
        let existing = ResourceData::from_state(&prior.id, prior.attributes.clone())
            .with_timeouts(prior_timeouts);

        let planned = schema.plan(&prior.attributes, &config);
        plan.changed = schema.changed(&prior.attributes, &planned);
        plan.replace_because = schema.requires_replacement(&prior.attributes, &planned);
        plan.tainted = prior.tainted;

        if prior.tainted || !plan.replace_because.is_empty() {
            plan.action = ActionType::Replace;
        } else {
            plan.action = if plan.changed.is_empty() {
                ActionType::NoOp
            } else {
                ActionType::Update
            };
            plan.data = ResourceData::planned(&prior.id, prior.attributes.clone(), planned)
                .with_timeouts(timeouts);
        }
        plan.prior = Some(existing);
    }

    resource.validate(&plan.data)?;
    debug!(
        resource_type = plan.resource_type,
        action = %plan.action,
        changed = ?plan.changed,
        "Planned"
    );
    Ok(plan)
}

/// Configured provider: API client plus the registry
pub struct CloProvider {
    ctx: OpContext,
    resources: BTreeMap<&'static str, Arc<dyn Resource>>,
    data_sources: BTreeMap<&'static str, Arc<dyn DataSource>>,
}

impl std::fmt::Debug for CloProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloProvider")
            .field("poll", &self.ctx.poll)
            .field("resources", &self.resource_names())
            .field("data_sources", &self.data_source_names())
            .finish_non_exhaustive()
    }
}

/// Run a read handler under the read timeout
async fn bounded_read<F>(operation: String, timeout: Duration, read: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    time::timeout(timeout, read)
        .await
        .map_err(|_| ProviderError::Timeout { operation, timeout })?
}

impl CloProvider {
    /// Validate the configuration and build the API client
    pub fn configure(config: ProviderConfig) -> Result<Self> {
        config.validate()?;
        let client = ApiClient::new(config.client_config())?;
        info!(auth_url = %config.auth_url, "Configured CLO provider");
        Ok(Self::with_context(OpContext::new(Arc::new(client), config.poll)))
    }

    /// Provider around an existing operation context
    pub fn with_context(ctx: OpContext) -> Self {
        Self {
            ctx,
            resources: resources::all()
                .into_iter()
                .map(|r| (r.type_name(), r))
                .collect(),
            data_sources: data_sources::all()
                .into_iter()
                .map(|d| (d.type_name(), d))
                .collect(),
        }
    }

    /// Abort waits when `cancel` fires
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.ctx = self.ctx.with_cancel(cancel);
        self
    }

    pub fn context(&self) -> &OpContext {
        &self.ctx
    }

    pub fn resource(&self, name: &str) -> Result<Arc<dyn Resource>> {
        self.resources
            .get(name)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownResource(name.to_string()))
    }

    pub fn data_source(&self, name: &str) -> Result<Arc<dyn DataSource>> {
        self.data_sources
            .get(name)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownDataSource(name.to_string()))
    }

    pub fn resource_names(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }

    pub fn data_source_names(&self) -> Vec<&'static str> {
        self.data_sources.keys().copied().collect()
    }

    /// Plan a change for a registered resource type
    pub fn plan(
        &self,
        resource_type: &str,
        prior: Option<&ResourceState>,
        config: Attributes,
    ) -> Result<Plan> {
        let resource = self.resource(resource_type)?;
        plan(resource.as_ref(), prior, config)
    }

    /// Execute a plan
    ///
    /// Handlers write into `plan.data` as they go, so after a failure it
    /// still holds the id of anything that was created. A replacement
    /// clears `plan.prior` once the old entity is gone.
    pub async fn apply(&self, plan: &mut Plan) -> Result<()> {
        let resource = self.resource(plan.resource_type)?;
        let ctx = &self.ctx;

        match plan.action {
            ActionType::NoOp => {}
            ActionType::Create => {
                resource.create(ctx, &mut plan.data).await?;
            }
            ActionType::Update => {
                resource.update(ctx, &mut plan.data).await?;
                let read_timeout = plan.data.timeouts().read;
                let operation = format!("read of {}", plan.resource_type);
                bounded_read(operation, read_timeout, resource.read(ctx, &mut plan.data)).await?;
            }
            ActionType::Replace => {
                if let Some(prior) = &plan.prior {
                    resource.delete(ctx, prior).await?;
                    info!(
                        resource_type = plan.resource_type,
                        id = prior.id().unwrap_or_default(),
                        "Deleted resource for replacement"
                    );
                }
                plan.prior = None;
                resource.create(ctx, &mut plan.data).await?;
            }
        }

        if plan.has_changes() {
            info!(
                resource_type = plan.resource_type,
                id = plan.data.id().unwrap_or_default(),
                action = %plan.action,
                "Applied"
            );
        }
        Ok(())
    }

    /// Delete a tracked resource
    pub async fn destroy(&self, state: &ResourceState) -> Result<()> {
        let resource = self.resource(&state.resource_type)?;
        let timeouts = resource.timeouts().with_overrides(state.timeouts.as_ref())?;
        let data = ResourceData::from_state(&state.id, state.attributes.clone())
            .with_timeouts(timeouts);
        resource.delete(&self.ctx, &data).await?;
        info!(resource_type = %state.resource_type, id = %state.id, "Destroyed");
        Ok(())
    }

    /// Re-read a tracked resource and return its fresh attributes
    pub async fn refresh(&self, state: &ResourceState) -> Result<Attributes> {
        let resource = self.resource(&state.resource_type)?;
        let timeouts = resource.timeouts().with_overrides(state.timeouts.as_ref())?;
        let mut data = ResourceData::from_state(&state.id, state.attributes.clone())
            .with_timeouts(timeouts);
        let operation = format!("read of {} {}", state.resource_type, state.id);
        bounded_read(operation, timeouts.read, resource.read(&self.ctx, &mut data)).await?;
        Ok(data.into_attributes())
    }

    /// Run a data source with the given arguments
    pub async fn read_data_source(&self, name: &str, mut args: Attributes) -> Result<Attributes> {
        let source = self.data_source(name)?;
        let schema = source.schema();
        schema.validate(&args)?;
        schema.apply_defaults(&mut args);

        let mut data = ResourceData::new(args);
        let read_timeout = data.timeouts().read;
        bounded_read(format!("read of {}", name), read_timeout, source.read(&self.ctx, &mut data))
            .await?;
        debug!(data_source = name, id = data.id().unwrap_or_default(), "Read data source");
        Ok(data.into_attributes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    fn volume_state(size: i64) -> ResourceState {
        ResourceState::new("vol-1", "clo_disks_volume").with_attributes(attrs(json!({
            "id": "vol-1",
            "project_id": "p1",
            "name": "data",
            "size": size,
            "status": "AVAILABLE",
            "created_in": "2024-01-01"
        })))
    }

    fn volume() -> Arc<dyn Resource> {
        find_resource("clo_disks_volume").unwrap()
    }

    #[test]
    fn test_registry_lookup() {
        assert!(find_resource("clo_compute_instance").is_ok());
        assert!(find_data_source("clo_projects").is_ok());
        assert!(matches!(
            find_resource("clo_nope"),
            Err(ProviderError::UnknownResource(_))
        ));
        assert!(matches!(
            find_data_source("clo_nope"),
            Err(ProviderError::UnknownDataSource(_))
        ));
    }

    #[test]
    fn test_registry_names_are_unique() {
        let mut names: Vec<_> = resources::all().iter().map(|r| r.type_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 7);

        let mut names: Vec<_> = data_sources::all().iter().map(|d| d.type_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 12);
    }

    #[test]
    fn test_plan_create() {
        let config = attrs(json!({"project_id": "p1", "size": 20}));
        let plan = plan(volume().as_ref(), None, config).unwrap();
        assert_eq!(plan.action, ActionType::Create);
        assert!(plan.prior.is_none());
        assert!(plan.creates());
    }

    #[test]
    fn test_plan_noop() {
        let config = attrs(json!({"project_id": "p1", "name": "data", "size": 20}));
        let plan = plan(volume().as_ref(), Some(&volume_state(20)), config).unwrap();
        assert_eq!(plan.action, ActionType::NoOp);
        assert!(!plan.has_changes());
    }

    #[test]
    fn test_plan_update_keeps_computed() {
        let config = attrs(json!({"project_id": "p1", "name": "data", "size": 30}));
        let plan = plan(volume().as_ref(), Some(&volume_state(20)), config).unwrap();
        assert_eq!(plan.action, ActionType::Update);
        assert_eq!(plan.changed, vec!["size"]);
        assert_eq!(plan.data.id(), Some("vol-1"));
        assert_eq!(plan.data.get::<String>("status").as_deref(), Some("AVAILABLE"));
        assert!(plan.data.has_change("size"));
    }

    #[test]
    fn test_plan_replace_on_force_new() {
        let config = attrs(json!({"project_id": "p1", "name": "renamed", "size": 20}));
        let plan = plan(volume().as_ref(), Some(&volume_state(20)), config).unwrap();
        assert_eq!(plan.action, ActionType::Replace);
        assert_eq!(plan.replace_because, vec!["name"]);
        assert_eq!(plan.prior.as_ref().and_then(|p| p.id()), Some("vol-1"));
        assert!(plan.data.id().is_none());
    }

    #[test]
    fn test_plan_replace_tainted() {
        let config = attrs(json!({"project_id": "p1", "name": "data", "size": 20}));
        let prior = volume_state(20).tainted(true);
        let plan = plan(volume().as_ref(), Some(&prior), config).unwrap();
        assert_eq!(plan.action, ActionType::Replace);
        assert!(plan.tainted);
    }

    #[test]
    fn test_plan_rejects_shrink() {
        let config = attrs(json!({"project_id": "p1", "name": "data", "size": 10}));
        let err = plan(volume().as_ref(), Some(&volume_state(20)), config).unwrap_err();
        assert!(err.to_string().contains("increased only"));
    }

    #[test]
    fn test_plan_timeouts_block() {
        let config = attrs(json!({
            "project_id": "p1",
            "size": 20,
            "timeouts": {"create": "45m"}
        }));
        let plan = plan(volume().as_ref(), None, config).unwrap();
        assert_eq!(
            plan.data.timeouts().create,
            std::time::Duration::from_secs(45 * 60)
        );
        assert_eq!(plan.timeouts, Some(json!({"create": "45m"})));
        assert!(plan.data.get::<Value>(TIMEOUTS_KEY).is_none());
    }

    #[test]
    fn test_plan_missing_required() {
        let config = attrs(json!({"size": 20}));
        let err = plan(volume().as_ref(), None, config).unwrap_err();
        assert!(matches!(err, ProviderError::MissingAttribute(ref name) if name == "project_id"));
    }
}

//! Resource and data source abstractions

use crate::context::OpContext;
use crate::data::ResourceData;
use crate::error::Result;
use crate::schema::Schema;
use crate::timeouts::Timeouts;
use async_trait::async_trait;

/// A managed CLO entity with a create/read/update/delete lifecycle
///
/// Handlers mutate [`ResourceData`]: `create` must call
/// [`ResourceData::set_id`] as soon as the remote entity exists, so the
/// caller can persist it even if a later step fails.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name, e.g. `clo_disks_volume`
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    fn timeouts(&self) -> Timeouts {
        Timeouts::default()
    }

    /// Checks that need more than the schema (value ranges, transitions)
    fn validate(&self, _data: &ResourceData) -> Result<()> {
        Ok(())
    }

    async fn create(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()>;

    /// Refresh computed attributes from the API
    async fn read(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()>;

    /// In-place update. Resources whose attributes are all force-new keep
    /// the default, since any change plans a replacement.
    async fn update(&self, _ctx: &OpContext, _data: &mut ResourceData) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, ctx: &OpContext, data: &ResourceData) -> Result<()>;
}

/// A read-only lookup
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Type name, e.g. `clo_projects`
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn read(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()>;
}

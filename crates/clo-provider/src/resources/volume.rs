//! `clo_disks_volume`

use crate::context::OpContext;
use crate::data::ResourceData;
use crate::error::{ProviderError, Result};
use crate::resource::Resource;
use crate::schema::{Attribute, Schema};
use crate::waiters::{self, volume};
use async_trait::async_trait;
use clo_api::VolumeCreateBody;

/// Smallest volume the API accepts, in GB
pub const MIN_SIZE_GB: i64 = 10;

pub struct DisksVolume;

#[async_trait]
impl Resource for DisksVolume {
    fn type_name(&self) -> &'static str {
        "clo_disks_volume"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Create a new volume in the project",
            vec![
                Attribute::string("project_id")
                    .required()
                    .describe("ID of the project where the volume should be created"),
                Attribute::string("name")
                    .optional()
                    .force_new()
                    .describe("Human-readable name of the new volume"),
                Attribute::int("size")
                    .required()
                    .describe("Size of the volume in GB, at least 10; can only grow"),
                Attribute::string("id").computed(),
                Attribute::string("status").computed(),
                Attribute::string("created_in")
                    .computed()
                    .describe("Timestamp the volume was created"),
            ],
        )
    }

    fn validate(&self, d: &ResourceData) -> Result<()> {
        let size: i64 = d.require("size")?;
        if size < MIN_SIZE_GB {
            return Err(ProviderError::invalid(
                "size",
                format!("size should be at least {}GB", MIN_SIZE_GB),
            ));
        }
        if let Some(prior) = d.prior::<i64>("size") {
            if size < prior {
                return Err(ProviderError::invalid("size", "size could be increased only"));
            }
        }
        Ok(())
    }

    async fn create(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let project_id = d.require_str("project_id")?;
        let body = VolumeCreateBody::new(d.get_ok("name"), d.require("size")?);
        let created = ctx.api().create_volume(&project_id, &body).await?;
        d.set_id(&created.id);

        waiters::volume_state(
            ctx,
            &created.id,
            &[volume::CREATING],
            &[volume::AVAILABLE],
            d.timeouts().create,
        )
        .await?;
        self.read(ctx, d).await
    }

    async fn read(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let vol = ctx.api().volume_detail(d.require_id()?).await?;
        d.set("status", vol.status);
        d.set("created_in", vol.created_in);
        Ok(())
    }

    async fn update(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        if d.has_change("size") {
            let id = d.require_id()?.to_string();
            let size: i64 = d.require("size")?;
            ctx.api().resize_volume(&id, size).await?;
            tracing::info!(id = %id, size, "Volume resize requested");
            waiters::volume_state(
                ctx,
                &id,
                &[volume::RESIZING],
                &[volume::AVAILABLE, volume::IN_USE],
                d.timeouts().update,
            )
            .await?;
        }
        Ok(())
    }

    async fn delete(&self, ctx: &OpContext, d: &ResourceData) -> Result<()> {
        let id = d.require_id()?;
        ctx.api().delete_volume(id).await?;
        waiters::volume_deleted(ctx, id, d.timeouts().delete).await
    }
}

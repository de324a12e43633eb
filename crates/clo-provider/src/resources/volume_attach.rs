//! `clo_disks_volume_attach`
//!
//! Identified by the volume id. Every argument is force-new, so there is no
//! in-place update.

use crate::context::OpContext;
use crate::data::ResourceData;
use crate::error::Result;
use crate::resource::Resource;
use crate::schema::{Attribute, Schema};
use crate::waiters::{self, volume};
use async_trait::async_trait;
use clo_api::VolumeAttachBody;

pub struct DisksVolumeAttach;

#[async_trait]
impl Resource for DisksVolumeAttach {
    fn type_name(&self) -> &'static str {
        "clo_disks_volume_attach"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Attach the volume to an instance",
            vec![
                Attribute::string("volume_id")
                    .required()
                    .force_new()
                    .describe("ID of the volume to attach"),
                Attribute::string("instance_id")
                    .required()
                    .force_new()
                    .describe("ID of the instance the volume will be attached to"),
                Attribute::string("mount_point_base")
                    .optional()
                    .computed()
                    .force_new()
                    .describe("Base directory the volume is mounted under"),
                Attribute::string("id").computed(),
                Attribute::string("device")
                    .computed()
                    .describe("Device name of the volume, for example `/dev/vdb`"),
            ],
        )
    }

    async fn create(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let volume_id = d.require_str("volume_id")?;
        let body = VolumeAttachBody {
            server_id: d.require_str("instance_id")?,
            mount_path: d.get_ok("mount_point_base"),
        };
        let attached = ctx.api().attach_volume(&volume_id, &body).await?;
        d.set_id(&volume_id);
        d.set("device", attached.device);
        if let Some(mountpoint) = attached.mountpoint {
            d.set("mount_point_base", mountpoint);
        }

        waiters::volume_attachment(
            ctx,
            &volume_id,
            &[volume::ATTACHING],
            &[volume::IN_USE],
            d.timeouts().create,
        )
        .await?;
        Ok(())
    }

    async fn read(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let vol = ctx.api().volume_detail(d.require_id()?).await?;
        if let Some(attachment) = vol.attachment {
            d.set("instance_id", attachment.id);
            d.set("device", attachment.device);
            if let Some(mountpoint) = attachment.mountpoint {
                d.set("mount_point_base", mountpoint);
            }
        }
        Ok(())
    }

    async fn delete(&self, ctx: &OpContext, d: &ResourceData) -> Result<()> {
        let id = d.require_id()?;
        ctx.api().detach_volume(id, true).await?;
        waiters::volume_attachment(
            ctx,
            id,
            &[volume::DETACHING],
            &[volume::AVAILABLE],
            d.timeouts().delete,
        )
        .await?;
        Ok(())
    }
}

//! `clo_disks_volume` and `clo_disks_volumes`

use super::{computed, results_attribute, write_all, write_results};
use crate::context::OpContext;
use crate::data::ResourceData;
use crate::error::Result;
use crate::flatten;
use crate::resource::DataSource;
use crate::schema::{Attribute, Schema};
use async_trait::async_trait;

fn volume_fields() -> Vec<Attribute> {
    vec![
        Attribute::string("name"),
        Attribute::string("status"),
        Attribute::string("created_in"),
        Attribute::string("description"),
        Attribute::int("size"),
        Attribute::bool("bootable"),
        Attribute::bool("undetachable"),
        Attribute::string("device"),
        Attribute::string("attached_to_instance_id"),
    ]
}

pub struct DisksVolume;

#[async_trait]
impl DataSource for DisksVolume {
    fn type_name(&self) -> &'static str {
        "clo_disks_volume"
    }

    fn schema(&self) -> Schema {
        let mut attributes = vec![
            Attribute::string("volume_id")
                .required()
                .describe("ID of the volume"),
            Attribute::string("id").computed(),
        ];
        attributes.extend(computed(volume_fields()));
        Schema::new("Fetch one volume", attributes)
    }

    async fn read(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let vol = ctx.api().volume_detail(&d.require_str("volume_id")?).await?;
        write_all(d, flatten::volume(&vol));
        d.set_id(vol.id);
        Ok(())
    }
}

pub struct DisksVolumes;

#[async_trait]
impl DataSource for DisksVolumes {
    fn type_name(&self) -> &'static str {
        "clo_disks_volumes"
    }

    fn schema(&self) -> Schema {
        let mut fields = vec![Attribute::string("id")];
        fields.extend(volume_fields());
        Schema::new(
            "List volumes of the project",
            vec![
                Attribute::string("project_id")
                    .required()
                    .describe("ID of the project"),
                Attribute::string("id").computed(),
                results_attribute(fields),
            ],
        )
    }

    async fn read(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let volumes = ctx.api().list_volumes(&d.require_str("project_id")?).await?;
        write_results(d, volumes.iter().map(flatten::volume).collect());
        Ok(())
    }
}

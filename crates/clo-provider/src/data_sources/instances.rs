//! `clo_compute_instance` and `clo_compute_instances`

use super::{computed, results_attribute, write_all, write_results};
use crate::context::OpContext;
use crate::data::ResourceData;
use crate::error::Result;
use crate::flatten;
use crate::resource::DataSource;
use crate::schema::{Attribute, Schema};
use async_trait::async_trait;

fn server_fields() -> Vec<Attribute> {
    vec![
        Attribute::string("name"),
        Attribute::string("status"),
        Attribute::string("created_in"),
        Attribute::string("image_id"),
        Attribute::string("recipe_id"),
        Attribute::string("rescue_mode"),
        Attribute::bool("guest_agent"),
        Attribute::int("flavor_ram"),
        Attribute::int("flavor_vcpus"),
        Attribute::blocks(
            "addresses",
            vec![
                Attribute::string("id"),
                Attribute::string("name"),
                Attribute::string("ptr"),
                Attribute::string("type"),
                Attribute::string("macaddr"),
                Attribute::int("version"),
                Attribute::bool("external"),
                Attribute::bool("ddos_protection"),
            ],
        ),
        Attribute::blocks(
            "disk_data",
            vec![Attribute::string("id"), Attribute::string("storage_type")],
        ),
    ]
}

pub struct ComputeInstance;

#[async_trait]
impl DataSource for ComputeInstance {
    fn type_name(&self) -> &'static str {
        "clo_compute_instance"
    }

    fn schema(&self) -> Schema {
        let mut attributes = vec![
            Attribute::string("id")
                .required()
                .describe("ID of the instance"),
            Attribute::string("project_id").computed(),
        ];
        attributes.extend(computed(server_fields()));
        Schema::new("Fetch one compute instance", attributes)
    }

    async fn read(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let server = ctx.api().server_detail(&d.require_str("id")?).await?;
        write_all(d, flatten::server(&server));
        d.set_id(server.id);
        Ok(())
    }
}

pub struct ComputeInstances;

#[async_trait]
impl DataSource for ComputeInstances {
    fn type_name(&self) -> &'static str {
        "clo_compute_instances"
    }

    fn schema(&self) -> Schema {
        let mut fields = vec![Attribute::string("id"), Attribute::string("project_id")];
        fields.extend(server_fields());
        Schema::new(
            "List compute instances of the project",
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
        let servers = ctx.api().list_servers(&d.require_str("project_id")?).await?;
        write_results(d, servers.iter().map(flatten::server).collect());
        Ok(())
    }
}

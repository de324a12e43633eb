//! `clo_compute_instance`

use crate::context::OpContext;
use crate::data::ResourceData;
use crate::error::Result;
use crate::resource::Resource;
use crate::schema::{AttrType, Attribute, Schema};
use crate::waiters::{self, server};
use async_trait::async_trait;
use clo_api::{AddressBody, Flavor, LicenseBody, ServerCreateBody, ServerDeleteBody, StorageBody};
use serde::Deserialize;

pub struct ComputeInstance;

#[derive(Debug, Deserialize)]
struct BlockDevice {
    bootable: bool,
    storage_type: String,
    size: i64,
}

#[derive(Debug, Deserialize)]
struct AddressSpec {
    external: bool,
    version: i64,
    ddos_protection: bool,
    #[serde(default)]
    address_id: Option<String>,
    #[serde(default)]
    bandwidth: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct LicenseSpec {
    addon: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    value: Option<i64>,
}

fn create_body(d: &ResourceData) -> Result<ServerCreateBody> {
    let storages = d
        .require::<Vec<BlockDevice>>("block_device")?
        .into_iter()
        .map(|b| StorageBody {
            size: b.size,
            bootable: b.bootable,
            storage_type: b.storage_type,
        })
        .collect();

    let addresses = d
        .get::<Vec<AddressSpec>>("addresses")
        .unwrap_or_default()
        .into_iter()
        .map(|a| AddressBody {
            external: a.external,
            version: a.version,
            ddos_protection: a.ddos_protection,
            address_id: a.address_id.filter(|id| !id.is_empty()),
            max_bandwidth: a.bandwidth.filter(|b| *b > 0),
        })
        .collect();

    let licenses = d
        .get::<Vec<LicenseSpec>>("licenses")
        .unwrap_or_default()
        .into_iter()
        .map(|l| LicenseBody {
            addon: l.addon,
            name: l.name,
            value: l.value,
        })
        .collect();

    Ok(ServerCreateBody {
        name: d.require_str("name")?,
        image: d.require_str("image_id")?,
        flavor: Flavor {
            ram: d.require("flavor_ram")?,
            vcpus: d.require("flavor_vcpus")?,
        },
        recipe: d.get_ok("recipe_id"),
        storages,
        addresses,
        licenses,
        keypairs: d.get_ok("keypairs").unwrap_or_default(),
    })
}

#[async_trait]
impl Resource for ComputeInstance {
    fn type_name(&self) -> &'static str {
        "clo_compute_instance"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Project compute instance",
            vec![
                Attribute::string("project_id")
                    .required()
                    .describe("ID of the project where the instance should be created"),
                Attribute::string("name")
                    .required()
                    .force_new()
                    .describe("Name of the new instance"),
                Attribute::string("password")
                    .optional()
                    .sensitive()
                    .describe("Password for the new instance"),
                Attribute::string("image_id")
                    .required()
                    .force_new()
                    .describe("ID of the image to install"),
                Attribute::int("flavor_ram")
                    .required()
                    .describe("Amount of RAM of the new instance"),
                Attribute::int("flavor_vcpus")
                    .required()
                    .describe("Number of VCPU of the new instance"),
                Attribute::blocks(
                    "block_device",
                    vec![
                        Attribute::bool("bootable").required(),
                        Attribute::string("storage_type")
                            .required()
                            .describe("`volume` or `local`"),
                        Attribute::int("size").required(),
                    ],
                )
                .required()
                .force_new()
                .describe("Disks of the new instance"),
                Attribute::blocks(
                    "addresses",
                    vec![
                        Attribute::bool("external").required(),
                        Attribute::int("version").required().describe("`4` or `6`"),
                        Attribute::string("address_id")
                            .optional()
                            .describe("Use an existing address with this ID"),
                        Attribute::bool("ddos_protection").required(),
                        Attribute::int("bandwidth")
                            .optional()
                            .describe("Max address bandwidth, 100 or 1024"),
                    ],
                )
                .optional()
                .force_new()
                .describe("Addresses for the new instance"),
                Attribute::list("keypairs", AttrType::String)
                    .optional()
                    .force_new()
                    .describe("IDs of SSH keypairs to install"),
                Attribute::string("recipe_id")
                    .optional()
                    .force_new()
                    .describe("ID of the recipe to install on the instance"),
                Attribute::blocks(
                    "licenses",
                    vec![
                        Attribute::string("addon").required(),
                        Attribute::string("name").optional(),
                        Attribute::int("value").optional(),
                    ],
                )
                .optional()
                .force_new()
                .describe("Licenses ordered with the instance"),
                Attribute::string("id").computed(),
                Attribute::string("status")
                    .computed()
                    .describe("Current status of the instance"),
                Attribute::string("created_in")
                    .computed()
                    .describe("Timestamp the instance was created"),
            ],
        )
    }

    async fn create(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let project_id = d.require_str("project_id")?;
        let body = create_body(d)?;
        let created = ctx.api().create_server(&project_id, &body).await?;
        d.set_id(&created.id);
        tracing::info!(id = %created.id, name = %body.name, "Instance created");

        waiters::server_state(
            ctx,
            &created.id,
            &[server::BUILDING],
            &[server::ACTIVE],
            d.timeouts().create,
        )
        .await?;

        if let Some(password) = d.get_ok::<String>("password") {
            ctx.api()
                .change_server_password(&created.id, &password)
                .await?;
        }
        self.read(ctx, d).await
    }

    async fn read(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let server = ctx.api().server_detail(d.require_id()?).await?;
        d.set("status", server.status);
        d.set("created_in", server.created_in);
        Ok(())
    }

    async fn update(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let id = d.require_id()?.to_string();

        if d.has_changes(&["flavor_ram", "flavor_vcpus"]) {
            let vcpus: i64 = d.require("flavor_vcpus")?;
            let ram: i64 = d.require("flavor_ram")?;
            ctx.api().resize_server(&id, vcpus, ram).await?;
            tracing::info!(id = %id, vcpus, ram, "Instance resize requested");
            waiters::server_state(
                ctx,
                &id,
                &[server::RESIZING],
                &[server::ACTIVE, server::STOPPED],
                d.timeouts().update,
            )
            .await?;
        }

        if d.has_change("password") {
            let password = d.get::<String>("password").unwrap_or_default();
            ctx.api().change_server_password(&id, &password).await?;
        }
        Ok(())
    }

    async fn delete(&self, ctx: &OpContext, d: &ResourceData) -> Result<()> {
        let id = d.require_id()?;
        let server = ctx.api().server_detail(id).await?;
        ctx.api()
            .delete_server(id, &ServerDeleteBody::everything_of(&server))
            .await?;
        waiters::server_deleted(ctx, id, d.timeouts().delete).await
    }
}

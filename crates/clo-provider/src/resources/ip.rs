//! `clo_network_ip`

use crate::context::OpContext;
use crate::data::ResourceData;
use crate::error::Result;
use crate::resource::Resource;
use crate::schema::{Attribute, Schema};
use crate::waiters::{self, address};
use async_trait::async_trait;
use clo_api::AddressCreateBody;

pub struct NetworkIp;

#[async_trait]
impl Resource for NetworkIp {
    fn type_name(&self) -> &'static str {
        "clo_network_ip"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Create a new address in the project",
            vec![
                Attribute::string("project_id")
                    .required()
                    .describe("ID of the project where the address should be created"),
                Attribute::bool("ddos_protection")
                    .optional()
                    .force_new()
                    .describe("Should the address be protected from DDoS"),
                Attribute::string("ptr")
                    .optional()
                    .describe("PTR record of the address"),
                Attribute::string("id").computed(),
                Attribute::string("status").computed(),
                Attribute::bool("is_primary").computed(),
                Attribute::int("bandwidth").computed(),
                Attribute::string("address")
                    .computed()
                    .describe("String representation of the address"),
                Attribute::string("created_in")
                    .computed()
                    .describe("Timestamp the address was created"),
            ],
        )
    }

    async fn create(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let project_id = d.require_str("project_id")?;
        let body = AddressCreateBody {
            ddos_protection: d.get_ok("ddos_protection").unwrap_or(false),
        };
        let created = ctx.api().create_address(&project_id, &body).await?;
        d.set_id(&created.id);

        waiters::address_state(
            ctx,
            &created.id,
            &[address::PROCESSING],
            &[address::DOWN],
            d.timeouts().create,
        )
        .await?;

        if let Some(ptr) = d.get_ok::<String>("ptr") {
            ctx.api().change_address_ptr(&created.id, &ptr).await?;
        }
        self.read(ctx, d).await
    }

    async fn read(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let addr = ctx.api().address_detail(d.require_id()?).await?;
        d.set("status", addr.status);
        d.set("address", addr.address);
        d.set("created_in", addr.created_in);
        d.set("bandwidth", addr.bandwidth);
        d.set("is_primary", addr.is_primary);
        Ok(())
    }

    async fn update(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        if d.has_change("ptr") {
            let ptr = d.get::<String>("ptr").unwrap_or_default();
            ctx.api().change_address_ptr(d.require_id()?, &ptr).await?;
        }
        Ok(())
    }

    async fn delete(&self, ctx: &OpContext, d: &ResourceData) -> Result<()> {
        let id = d.require_id()?;
        ctx.api().delete_address(id).await?;
        waiters::address_deleted(ctx, id, d.timeouts().delete).await
    }
}

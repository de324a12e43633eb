//! `clo_network_ip_attach`
//!
//! The resource id is the address id; the attachment lives as long as the
//! address is bound to the entity.

use crate::context::OpContext;
use crate::data::ResourceData;
use crate::error::{ProviderError, Result};
use crate::resource::Resource;
use crate::schema::{Attribute, Schema};
use crate::waiters::{self, address};
use async_trait::async_trait;
use clo_api::AddressAttachBody;
use std::time::Duration;

const ENTITIES: [&str; 2] = ["server", "loadbalancer"];

pub struct NetworkIpAttach;

impl NetworkIpAttach {
    async fn make_primary(&self, ctx: &OpContext, id: &str, timeout: Duration) -> Result<()> {
        ctx.api().make_address_primary(id).await?;
        waiters::address_attachment(
            ctx,
            id,
            &[address::PROCESSING],
            &[address::ACTIVE],
            timeout,
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Resource for NetworkIpAttach {
    fn type_name(&self) -> &'static str {
        "clo_network_ip_attach"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Attach an address to an entity, for example a loadbalancer or a server",
            vec![
                Attribute::string("address_id")
                    .required()
                    .force_new()
                    .describe("ID of the attached address"),
                Attribute::string("entity_id")
                    .required()
                    .force_new()
                    .describe("ID of the entity the address will be attached to"),
                Attribute::string("entity_name")
                    .required()
                    .force_new()
                    .describe("Kind of the entity, `loadbalancer` or `server`"),
                Attribute::bool("is_primary")
                    .optional()
                    .computed()
                    .describe("Use the address as the primary one"),
                Attribute::string("id").computed(),
                Attribute::string("status").computed(),
                Attribute::string("address").computed(),
            ],
        )
    }

    fn validate(&self, d: &ResourceData) -> Result<()> {
        let entity = d.get::<String>("entity_name").unwrap_or_default();
        if !ENTITIES.contains(&entity.as_str()) {
            return Err(ProviderError::invalid(
                "entity_name",
                format!("should be one of {}", ENTITIES.join(", ")),
            ));
        }
        Ok(())
    }

    async fn create(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let address_id = d.require_str("address_id")?;
        let body = AddressAttachBody {
            id: d.require_str("entity_id")?,
            entity: d.require_str("entity_name")?,
        };
        ctx.api().attach_address(&address_id, &body).await?;
        d.set_id(&address_id);

        waiters::address_attached(ctx, &address_id, d.timeouts().create).await?;

        if d.get_ok::<bool>("is_primary").is_some() {
            self.make_primary(ctx, &address_id, d.timeouts().create)
                .await?;
        }
        self.read(ctx, d).await
    }

    async fn read(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let addr = ctx.api().address_detail(d.require_id()?).await?;
        d.set("status", addr.status);
        d.set("address", addr.address);
        d.set("is_primary", addr.is_primary);
        Ok(())
    }

    async fn update(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        if d.has_change("is_primary") && d.get_ok::<bool>("is_primary").is_some() {
            let id = d.require_id()?.to_string();
            self.make_primary(ctx, &id, d.timeouts().update).await?;
        }
        Ok(())
    }

    async fn delete(&self, ctx: &OpContext, d: &ResourceData) -> Result<()> {
        let id = d.require_id()?;
        ctx.api().detach_address(id).await?;
        waiters::address_attachment(
            ctx,
            id,
            &[address::PROCESSING],
            &[address::DOWN],
            d.timeouts().delete,
        )
        .await?;
        Ok(())
    }
}

//! `clo_network_ip` and `clo_network_ips`

use super::{computed, results_attribute, write_all, write_results};
use crate::context::OpContext;
use crate::data::ResourceData;
use crate::error::Result;
use crate::flatten;
use crate::resource::DataSource;
use crate::schema::{Attribute, Schema};
use async_trait::async_trait;

fn address_fields() -> Vec<Attribute> {
    vec![
        Attribute::string("address"),
        Attribute::string("status"),
        Attribute::string("ptr"),
        Attribute::string("type"),
        Attribute::string("created_in"),
        Attribute::bool("is_primary"),
        Attribute::bool("ddos_protection"),
        Attribute::int("bandwidth"),
        Attribute::blocks(
            "attached_to",
            vec![Attribute::string("id"), Attribute::string("entity")],
        ),
    ]
}

pub struct NetworkIp;

#[async_trait]
impl DataSource for NetworkIp {
    fn type_name(&self) -> &'static str {
        "clo_network_ip"
    }

    fn schema(&self) -> Schema {
        let mut attributes = vec![
            Attribute::string("address_id")
                .required()
                .describe("ID of the address"),
            Attribute::string("id").computed(),
        ];
        attributes.extend(computed(address_fields()));
        Schema::new("Fetch one address", attributes)
    }

    async fn read(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let addr = ctx
            .api()
            .address_detail(&d.require_str("address_id")?)
            .await?;
        write_all(d, flatten::address(&addr));
        d.set_id(addr.id);
        Ok(())
    }
}

pub struct NetworkIps;

#[async_trait]
impl DataSource for NetworkIps {
    fn type_name(&self) -> &'static str {
        "clo_network_ips"
    }

    fn schema(&self) -> Schema {
        let mut fields = vec![Attribute::string("id")];
        fields.extend(address_fields());
        Schema::new(
            "List addresses of the project",
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
        let addresses = ctx
            .api()
            .list_addresses(&d.require_str("project_id")?)
            .await?;
        write_results(d, addresses.iter().map(flatten::address).collect());
        Ok(())
    }
}

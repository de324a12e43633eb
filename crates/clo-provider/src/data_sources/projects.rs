//! `clo_projects`

use super::{results_attribute, write_results};
use crate::context::OpContext;
use crate::data::ResourceData;
use crate::error::Result;
use crate::flatten;
use crate::resource::DataSource;
use crate::schema::{Attribute, Schema};
use async_trait::async_trait;

pub struct Projects;

#[async_trait]
impl DataSource for Projects {
    fn type_name(&self) -> &'static str {
        "clo_projects"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Projects visible to the token",
            vec![
                Attribute::string("id").computed(),
                results_attribute(vec![
                    Attribute::string("id"),
                    Attribute::string("name"),
                    Attribute::string("status"),
                    Attribute::string("created_in"),
                    Attribute::string("stopping_reason"),
                    Attribute::bool("has_abuse"),
                ]),
            ],
        )
    }

    async fn read(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let projects = ctx.api().list_projects().await?;
        write_results(d, projects.iter().map(flatten::project).collect());
        Ok(())
    }
}

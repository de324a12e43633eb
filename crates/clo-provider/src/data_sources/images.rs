//! `clo_project_images` and `clo_project_image`

use super::{computed, results_attribute, write_results};
use crate::context::OpContext;
use crate::data::ResourceData;
use crate::error::{ProviderError, Result};
use crate::flatten;
use crate::resource::DataSource;
use crate::schema::{Attribute, Schema};
use async_trait::async_trait;

fn image_fields() -> Vec<Attribute> {
    vec![
        Attribute::string("os_family"),
        Attribute::string("os_version"),
        Attribute::string("os_distribution"),
    ]
}

pub struct ProjectImages;

#[async_trait]
impl DataSource for ProjectImages {
    fn type_name(&self) -> &'static str {
        "clo_project_images"
    }

    fn schema(&self) -> Schema {
        let mut fields = vec![Attribute::string("id"), Attribute::string("name")];
        fields.extend(image_fields());
        Schema::new(
            "OS images available in the project",
            vec![
                Attribute::string("project_id")
                    .required()
                    .describe("ID of the project that owns the images"),
                Attribute::string("id").computed(),
                results_attribute(fields),
            ],
        )
    }

    async fn read(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let images = ctx.api().list_images(&d.require_str("project_id")?).await?;
        write_results(d, images.iter().map(flatten::image).collect());
        Ok(())
    }
}

pub struct ProjectImage;

#[async_trait]
impl DataSource for ProjectImage {
    fn type_name(&self) -> &'static str {
        "clo_project_image"
    }

    fn schema(&self) -> Schema {
        let mut attributes = vec![
            Attribute::string("project_id")
                .required()
                .describe("ID of the project that owns the image"),
            Attribute::string("name")
                .required()
                .describe("Exact name of the image"),
            Attribute::string("id").computed(),
            Attribute::string("image_id")
                .computed()
                .describe("ID of the image"),
        ];
        attributes.extend(computed(image_fields()));
        Schema::new("Look up one OS image by name", attributes)
    }

    async fn read(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let name = d.require_str("name")?;
        let images = ctx.api().list_images(&d.require_str("project_id")?).await?;
        let image = images
            .iter()
            .find(|i| i.name == name)
            .ok_or_else(|| ProviderError::invalid("name", format!("no image named '{}'", name)))?;

        let mut attributes = flatten::image(image);
        attributes.remove("name");
        d.set("image_id", image.id.clone());
        super::write_all(d, attributes);
        d.set_id(&image.id);
        Ok(())
    }
}

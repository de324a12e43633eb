//! `clo_storage_s3_user`, `clo_storage_s3_users` and `clo_storage_s3_user_keys`

use super::{computed, results_attribute, write_all, write_results};
use crate::context::OpContext;
use crate::data::ResourceData;
use crate::error::Result;
use crate::flatten;
use crate::resource::DataSource;
use crate::schema::{Attribute, Schema};
use async_trait::async_trait;

fn user_fields() -> Vec<Attribute> {
    vec![
        Attribute::string("name"),
        Attribute::string("canonical_name"),
        Attribute::string("status"),
        Attribute::string("tenant"),
        Attribute::int("max_buckets"),
        Attribute::blocks(
            "quotas",
            vec![
                Attribute::string("type"),
                Attribute::int("max_size"),
                Attribute::int("max_objects"),
            ],
        ),
    ]
}

pub struct StorageS3User;

#[async_trait]
impl DataSource for StorageS3User {
    fn type_name(&self) -> &'static str {
        "clo_storage_s3_user"
    }

    fn schema(&self) -> Schema {
        let mut attributes = vec![
            Attribute::string("user_id")
                .required()
                .describe("ID of the storage user"),
            Attribute::string("id").computed(),
        ];
        attributes.extend(computed(user_fields()));
        Schema::new("Fetch one object storage user", attributes)
    }

    async fn read(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let user = ctx.api().s3_user_detail(&d.require_str("user_id")?).await?;
        write_all(d, flatten::s3_user(&user));
        d.set_id(user.id);
        Ok(())
    }
}

pub struct StorageS3Users;

#[async_trait]
impl DataSource for StorageS3Users {
    fn type_name(&self) -> &'static str {
        "clo_storage_s3_users"
    }

    fn schema(&self) -> Schema {
        let mut fields = vec![Attribute::string("id")];
        fields.extend(user_fields());
        Schema::new(
            "List object storage users of the project",
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
        let users = ctx.api().list_s3_users(&d.require_str("project_id")?).await?;
        write_results(d, users.iter().map(flatten::s3_user).collect());
        Ok(())
    }
}

pub struct StorageS3UserKeys;

#[async_trait]
impl DataSource for StorageS3UserKeys {
    fn type_name(&self) -> &'static str {
        "clo_storage_s3_user_keys"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Fetch the current key pair of an object storage user",
            vec![
                Attribute::string("user_id")
                    .required()
                    .describe("ID of the storage user"),
                Attribute::string("id").computed(),
                Attribute::string("access_key").computed(),
                Attribute::string("secret_key").computed().sensitive(),
            ],
        )
    }

    async fn read(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let user_id = d.require_str("user_id")?;
        let keys = ctx.api().s3_user_keys(&user_id).await?;
        d.set("access_key", keys.access_key);
        d.set("secret_key", keys.secret_key);
        d.set_id(user_id);
        Ok(())
    }
}

//! `clo_storage_s3_user_keys`
//!
//! Creating the resource issues a fresh key pair for the user. Deleting it
//! only forgets the keys; the API has no call to revoke them.

use crate::context::OpContext;
use crate::data::ResourceData;
use crate::error::Result;
use crate::resource::Resource;
use crate::schema::{Attribute, Schema};
use async_trait::async_trait;
use clo_api::S3Keys;

pub struct StorageS3UserKeys;

fn set_keys(d: &mut ResourceData, keys: S3Keys) {
    d.set("access_key", keys.access_key);
    d.set("secret_key", keys.secret_key);
}

#[async_trait]
impl Resource for StorageS3UserKeys {
    fn type_name(&self) -> &'static str {
        "clo_storage_s3_user_keys"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Issue a key pair for an object storage user",
            vec![
                Attribute::string("user_id")
                    .required()
                    .force_new()
                    .describe("ID of the user the keys are issued for"),
                Attribute::string("id").computed(),
                Attribute::string("access_key").computed(),
                Attribute::string("secret_key").computed().sensitive(),
            ],
        )
    }

    async fn create(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let user_id = d.require_str("user_id")?;
        let keys = ctx.api().reset_s3_user_keys(&user_id).await?;
        d.set_id(&user_id);
        set_keys(d, keys);
        Ok(())
    }

    async fn read(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let keys = ctx.api().s3_user_keys(d.require_id()?).await?;
        set_keys(d, keys);
        Ok(())
    }

    async fn delete(&self, _ctx: &OpContext, d: &ResourceData) -> Result<()> {
        tracing::debug!(user_id = ?d.id(), "Dropping keys from state");
        Ok(())
    }
}

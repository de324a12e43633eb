//! `clo_storage_s3_user`

use crate::context::OpContext;
use crate::data::ResourceData;
use crate::error::Result;
use crate::resource::Resource;
use crate::schema::{Attribute, Schema};
use crate::waiters::{self, s3_user};
use async_trait::async_trait;
use clo_api::{QuotaParams, QuotaPatch, S3User, S3UserCreateBody, S3UserQuotaPatchBody};

const USER_QUOTA: &str = "user";
const BUCKET_QUOTA: &str = "bucket";

pub struct StorageS3User;

fn create_body(d: &ResourceData) -> Result<S3UserCreateBody> {
    let canonical_name = d.require_str("canonical_name")?;
    Ok(S3UserCreateBody {
        name: d.get_ok("name").unwrap_or_else(|| canonical_name.clone()),
        canonical_name,
        max_buckets: d.require("max_buckets")?,
        default_bucket: d.get("default_bucket").unwrap_or(false),
        user_quota: QuotaParams {
            max_size: d.require("user_quota_max_size")?,
            max_objects: d.get("user_quota_max_objects").unwrap_or(0),
        },
        bucket_quota: QuotaParams {
            max_size: d.get("bucket_quota_max_size").unwrap_or(0),
            max_objects: d.get("bucket_quota_max_objects").unwrap_or(0),
        },
    })
}

/// Only the quota fields that changed
fn quota_patch(d: &ResourceData) -> S3UserQuotaPatchBody {
    let changed = |key: &str| -> Option<i64> {
        if d.has_change(key) {
            Some(d.get(key).unwrap_or(0))
        } else {
            None
        }
    };
    S3UserQuotaPatchBody {
        max_buckets: changed("max_buckets"),
        user_quota: QuotaPatch {
            max_size: changed("user_quota_max_size"),
            max_objects: changed("user_quota_max_objects"),
        },
        bucket_quota: QuotaPatch {
            max_size: changed("bucket_quota_max_size"),
            max_objects: changed("bucket_quota_max_objects"),
        },
    }
}

fn set_user(d: &mut ResourceData, user: S3User) {
    for (prefix, quota_type) in [("user_quota", USER_QUOTA), ("bucket_quota", BUCKET_QUOTA)] {
        if let Some(quota) = user.quota(quota_type) {
            d.set(&format!("{}_max_size", prefix), quota.max_size);
            d.set(&format!("{}_max_objects", prefix), quota.max_objects);
        }
    }
    d.set("user_id", user.id);
    d.set("status", user.status);
    d.set("tenant", user.tenant);
    d.set("max_buckets", user.max_buckets);
}

#[async_trait]
impl Resource for StorageS3User {
    fn type_name(&self) -> &'static str {
        "clo_storage_s3_user"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Create a new user of the object storage",
            vec![
                Attribute::string("project_id")
                    .required()
                    .describe("ID of the project where the user should be created"),
                Attribute::string("canonical_name")
                    .required()
                    .force_new()
                    .describe("Name the storage uses; unique within the tenant"),
                Attribute::bool("default_bucket")
                    .optional()
                    .force_new()
                    .describe("Create a default bucket together with the user"),
                Attribute::int("max_buckets")
                    .required()
                    .describe("How many buckets the user can create"),
                Attribute::string("name")
                    .optional()
                    .describe("Human-readable name of the user"),
                Attribute::int("user_quota_max_size")
                    .required()
                    .describe("Total size of the objects the user can store"),
                Attribute::int("user_quota_max_objects")
                    .optional()
                    .computed()
                    .describe("How many objects the user can create"),
                Attribute::int("bucket_quota_max_size")
                    .default_value(0)
                    .describe("Maximum size of a bucket"),
                Attribute::int("bucket_quota_max_objects")
                    .default_value(0)
                    .describe("How many objects a bucket can hold"),
                Attribute::string("id").computed(),
                Attribute::string("user_id")
                    .computed()
                    .describe("ID of the created user"),
                Attribute::string("status").computed(),
                Attribute::string("tenant")
                    .computed()
                    .describe("Tenant of the user, the project name by default"),
            ],
        )
    }

    async fn create(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let project_id = d.require_str("project_id")?;
        let body = create_body(d)?;
        let created = ctx.api().create_s3_user(&project_id, &body).await?;
        d.set_id(&created.id);

        waiters::s3_user_state(
            ctx,
            &created.id,
            &[s3_user::CREATING],
            &[s3_user::AVAILABLE],
            d.timeouts().create,
        )
        .await?;
        self.read(ctx, d).await
    }

    async fn read(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let user = ctx.api().s3_user_detail(d.require_id()?).await?;
        set_user(d, user);
        Ok(())
    }

    async fn update(&self, ctx: &OpContext, d: &mut ResourceData) -> Result<()> {
        let id = d.require_id()?.to_string();

        if d.has_change("name") {
            let name = d
                .get_ok::<String>("name")
                .unwrap_or(d.require_str("canonical_name")?);
            ctx.api().rename_s3_user(&id, &name).await?;
        }

        let patch = quota_patch(d);
        if !patch.is_empty() {
            ctx.api().patch_s3_user_quota(&id, &patch).await?;
        }
        Ok(())
    }

    async fn delete(&self, ctx: &OpContext, d: &ResourceData) -> Result<()> {
        let id = d.require_id()?;
        ctx.api().delete_s3_user(id).await?;
        waiters::s3_user_deleted(ctx, id, d.timeouts().delete).await
    }
}

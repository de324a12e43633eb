//! Object storage (S3) users and their keys

use crate::client::{ApiClient, Created};
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct S3User {
    pub id: String,
    pub name: String,
    pub canonical_name: String,
    pub status: String,
    pub tenant: String,
    pub max_buckets: i64,
    pub quotas: Vec<QuotaInfo>,
}

impl S3User {
    /// Quota entry of the given type (`user` or `bucket`)
    pub fn quota(&self, quota_type: &str) -> Option<&QuotaInfo> {
        self.quotas
            .iter()
            .find(|q| q.quota_type.eq_ignore_ascii_case(quota_type))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaInfo {
    #[serde(rename = "type")]
    pub quota_type: String,
    pub max_size: i64,
    pub max_objects: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaParams {
    pub max_size: i64,
    pub max_objects: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3UserCreateBody {
    pub name: String,
    pub canonical_name: String,
    pub max_buckets: i64,
    pub default_bucket: bool,
    pub user_quota: QuotaParams,
    pub bucket_quota: QuotaParams,
}

/// Partial quota update; absent fields are left untouched by the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_objects: Option<i64>,
}

impl QuotaPatch {
    pub fn is_empty(&self) -> bool {
        self.max_size.is_none() && self.max_objects.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3UserQuotaPatchBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_buckets: Option<i64>,
    #[serde(skip_serializing_if = "QuotaPatch::is_empty")]
    pub user_quota: QuotaPatch,
    #[serde(skip_serializing_if = "QuotaPatch::is_empty")]
    pub bucket_quota: QuotaPatch,
}

impl S3UserQuotaPatchBody {
    pub fn is_empty(&self) -> bool {
        self.max_buckets.is_none() && self.user_quota.is_empty() && self.bucket_quota.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Keys {
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Debug, Serialize)]
struct NamePatch<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct Empty {}

impl ApiClient {
    pub async fn list_s3_users(&self, project_id: &str) -> Result<Vec<S3User>> {
        self.get_list(&format!("v2/projects/{}/s3/users", project_id))
            .await
    }

    pub async fn s3_user_detail(&self, user_id: &str) -> Result<S3User> {
        self.get_result(&format!("v2/s3/users/{}/detail", user_id))
            .await
    }

    pub async fn create_s3_user(&self, project_id: &str, body: &S3UserCreateBody) -> Result<Created> {
        self.post_result(&format!("v2/projects/{}/s3/users", project_id), body)
            .await
    }

    pub async fn delete_s3_user(&self, user_id: &str) -> Result<()> {
        self.delete_unit(&format!("v2/s3/users/{}", user_id)).await
    }

    pub async fn rename_s3_user(&self, user_id: &str, name: &str) -> Result<()> {
        self.patch_unit(&format!("v2/s3/users/{}", user_id), &NamePatch { name })
            .await
    }

    pub async fn patch_s3_user_quota(&self, user_id: &str, body: &S3UserQuotaPatchBody) -> Result<()> {
        self.patch_unit(&format!("v2/s3/users/{}/quota", user_id), body)
            .await
    }

    pub async fn s3_user_keys(&self, user_id: &str) -> Result<S3Keys> {
        self.get_result(&format!("v2/s3/users/{}/credentials", user_id))
            .await
    }

    /// Issue a fresh key pair, invalidating the previous one
    pub async fn reset_s3_user_keys(&self, user_id: &str) -> Result<S3Keys> {
        self.post_result(
            &format!("v2/s3/users/{}/credentials/reset", user_id),
            &Empty {},
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_patch_serializes_only_changes() {
        let body = S3UserQuotaPatchBody {
            max_buckets: None,
            user_quota: QuotaPatch {
                max_size: Some(100),
                max_objects: None,
            },
            bucket_quota: QuotaPatch::default(),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"user_quota": {"max_size": 100}}));
        assert!(!body.is_empty());
        assert!(S3UserQuotaPatchBody::default().is_empty());
    }

    #[test]
    fn test_quota_lookup_ignores_case() {
        let user = S3User {
            quotas: vec![QuotaInfo {
                quota_type: "USER".to_string(),
                max_size: 10,
                max_objects: 5,
            }],
            ..Default::default()
        };
        assert_eq!(user.quota("user").map(|q| q.max_objects), Some(5));
        assert!(user.quota("bucket").is_none());
    }
}

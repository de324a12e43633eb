//! Block-storage volumes

use crate::client::{ApiClient, Created};
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Volume {
    pub id: String,
    pub name: String,
    pub status: String,
    pub created_in: String,
    pub description: Option<String>,
    pub size: i64,
    pub bootable: bool,
    pub undetachable: bool,
    pub attachment: Option<VolumeAttachment>,
}

/// Where a volume is currently plugged in
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeAttachment {
    /// ID of the server the volume is attached to
    pub id: String,
    pub device: String,
    pub mountpoint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeCreateBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub size: i64,
    /// Let the API pick a name when none is given
    pub autorename: bool,
}

impl VolumeCreateBody {
    pub fn new(name: Option<String>, size: i64) -> Self {
        let autorename = name.is_none();
        Self {
            name,
            size,
            autorename,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeAttachBody {
    pub server_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mount_path: Option<String>,
}

/// Answer of the attach call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeAttachResult {
    pub device: String,
    pub mountpoint: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExtendBody {
    new_size: i64,
}

#[derive(Debug, Serialize)]
struct DetachBody {
    force: bool,
}

impl ApiClient {
    pub async fn list_volumes(&self, project_id: &str) -> Result<Vec<Volume>> {
        self.get_list(&format!("v2/projects/{}/volumes", project_id))
            .await
    }

    pub async fn volume_detail(&self, volume_id: &str) -> Result<Volume> {
        self.get_result(&format!("v2/volumes/{}/detail", volume_id))
            .await
    }

    pub async fn create_volume(&self, project_id: &str, body: &VolumeCreateBody) -> Result<Created> {
        self.post_result(&format!("v2/projects/{}/volumes", project_id), body)
            .await
    }

    pub async fn delete_volume(&self, volume_id: &str) -> Result<()> {
        self.delete_unit(&format!("v2/volumes/{}", volume_id)).await
    }

    pub async fn resize_volume(&self, volume_id: &str, new_size: i64) -> Result<()> {
        self.post_unit(
            &format!("v2/volumes/{}/extend", volume_id),
            &ExtendBody { new_size },
        )
        .await
    }

    pub async fn attach_volume(
        &self,
        volume_id: &str,
        body: &VolumeAttachBody,
    ) -> Result<VolumeAttachResult> {
        self.post_result(&format!("v2/volumes/{}/attach", volume_id), body)
            .await
    }

    pub async fn detach_volume(&self, volume_id: &str, force: bool) -> Result<()> {
        self.post_unit(
            &format!("v2/volumes/{}/detach", volume_id),
            &DetachBody { force },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_body_autorenames_without_name() {
        let body = VolumeCreateBody::new(None, 20);
        assert!(body.autorename);
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("name").is_none());

        let named = VolumeCreateBody::new(Some("data".to_string()), 20);
        assert!(!named.autorename);
    }
}

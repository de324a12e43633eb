//! Projects and OS images

use crate::client::ApiClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub status: String,
    pub created_in: String,
    pub stopping_reason: Option<String>,
    pub has_abuse: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    pub id: String,
    pub name: String,
    pub operation_system: Option<OperationSystem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationSystem {
    pub os_family: String,
    pub version: String,
    pub distribution: String,
}

impl ApiClient {
    /// List the projects visible to the token
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.get_list("v2/projects").await
    }

    /// List the OS images available in a project
    pub async fn list_images(&self, project_id: &str) -> Result<Vec<Image>> {
        self.get_list(&format!("v2/projects/{}/images", project_id))
            .await
    }
}

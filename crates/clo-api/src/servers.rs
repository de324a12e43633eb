//! Compute instances (servers)

use crate::client::{ApiClient, Created};
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub id: String,
    pub name: String,
    pub status: String,
    pub created_in: String,
    pub project_id: String,
    pub image: String,
    pub recipe: Option<String>,
    pub rescue_mode: Option<String>,
    pub guest_agent: bool,
    pub flavor: Flavor,
    pub addresses: Vec<ServerAddress>,
    pub disk_data: Vec<DiskData>,
}

impl Server {
    /// IDs of the attached disks that live on network volumes
    pub fn volume_ids(&self) -> Vec<String> {
        self.disk_data
            .iter()
            .filter(|d| d.storage_type == "volume")
            .map(|d| d.id.clone())
            .collect()
    }

    pub fn address_ids(&self) -> Vec<String> {
        self.addresses.iter().map(|a| a.id.clone()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flavor {
    pub ram: i64,
    pub vcpus: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerAddress {
    pub id: String,
    pub name: String,
    pub ptr: String,
    #[serde(rename = "type")]
    pub address_type: String,
    pub mac_addr: String,
    pub version: i64,
    pub external: bool,
    pub ddos_protection: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskData {
    pub id: String,
    pub storage_type: String,
}

// ============ Request bodies ============

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerCreateBody {
    pub name: String,
    pub image: String,
    pub flavor: Flavor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,
    pub storages: Vec<StorageBody>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<AddressBody>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<LicenseBody>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keypairs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageBody {
    pub size: i64,
    pub bootable: bool,
    pub storage_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressBody {
    pub external: bool,
    pub version: i64,
    pub ddos_protection: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bandwidth: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LicenseBody {
    pub addon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
}

/// What to remove together with the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerDeleteBody {
    pub delete_addresses: Vec<String>,
    pub delete_volumes: Vec<String>,
}

impl ServerDeleteBody {
    /// Release every address and network volume the server holds
    pub fn everything_of(server: &Server) -> Self {
        Self {
            delete_addresses: server.address_ids(),
            delete_volumes: server.volume_ids(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResizeBody {
    vcpus: i64,
    ram: i64,
}

#[derive(Debug, Serialize)]
struct PasswordBody<'a> {
    password: &'a str,
}

impl ApiClient {
    pub async fn list_servers(&self, project_id: &str) -> Result<Vec<Server>> {
        self.get_list(&format!("v2/projects/{}/servers", project_id))
            .await
    }

    pub async fn server_detail(&self, server_id: &str) -> Result<Server> {
        self.get_result(&format!("v2/servers/{}/detail", server_id))
            .await
    }

    pub async fn create_server(&self, project_id: &str, body: &ServerCreateBody) -> Result<Created> {
        self.post_result(&format!("v2/projects/{}/servers", project_id), body)
            .await
    }

    pub async fn delete_server(&self, server_id: &str, body: &ServerDeleteBody) -> Result<()> {
        self.delete_with_body(&format!("v2/servers/{}", server_id), body)
            .await
    }

    pub async fn resize_server(&self, server_id: &str, vcpus: i64, ram: i64) -> Result<()> {
        self.post_unit(
            &format!("v2/servers/{}/resize", server_id),
            &ResizeBody { vcpus, ram },
        )
        .await
    }

    pub async fn change_server_password(&self, server_id: &str, password: &str) -> Result<()> {
        self.post_unit(
            &format!("v2/servers/{}/password", server_id),
            &PasswordBody { password },
        )
        .await
    }
}

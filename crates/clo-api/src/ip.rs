//! Floating IP addresses

use crate::client::{ApiClient, Created};
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub id: String,
    pub address: String,
    pub status: String,
    pub ptr: String,
    #[serde(rename = "type")]
    pub address_type: String,
    pub created_in: String,
    pub is_primary: bool,
    pub ddos_protection: bool,
    pub bandwidth: i64,
    pub attached_to: Option<AttachedTo>,
}

/// The entity an address is bound to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachedTo {
    pub id: String,
    /// `server` or `loadbalancer`
    pub entity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressCreateBody {
    pub ddos_protection: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressAttachBody {
    pub id: String,
    pub entity: String,
}

#[derive(Debug, Serialize)]
struct PtrBody<'a> {
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct Empty {}

impl ApiClient {
    pub async fn list_addresses(&self, project_id: &str) -> Result<Vec<Address>> {
        self.get_list(&format!("v2/projects/{}/addresses", project_id))
            .await
    }

    pub async fn address_detail(&self, address_id: &str) -> Result<Address> {
        self.get_result(&format!("v2/addresses/{}/detail", address_id))
            .await
    }

    pub async fn create_address(&self, project_id: &str, body: &AddressCreateBody) -> Result<Created> {
        self.post_result(&format!("v2/projects/{}/addresses", project_id), body)
            .await
    }

    pub async fn delete_address(&self, address_id: &str) -> Result<()> {
        self.delete_unit(&format!("v2/addresses/{}", address_id))
            .await
    }

    pub async fn attach_address(&self, address_id: &str, body: &AddressAttachBody) -> Result<()> {
        self.post_unit(&format!("v2/addresses/{}/attach", address_id), body)
            .await
    }

    pub async fn detach_address(&self, address_id: &str) -> Result<()> {
        self.post_unit(&format!("v2/addresses/{}/detach", address_id), &Empty {})
            .await
    }

    pub async fn change_address_ptr(&self, address_id: &str, ptr: &str) -> Result<()> {
        self.post_unit(
            &format!("v2/addresses/{}/ptr", address_id),
            &PtrBody { value: ptr },
        )
        .await
    }

    pub async fn make_address_primary(&self, address_id: &str) -> Result<()> {
        self.post_unit(&format!("v2/addresses/{}/primary", address_id), &Empty {})
            .await
    }
}

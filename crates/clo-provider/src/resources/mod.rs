//! Managed resources

mod instance;
mod ip;
mod ip_attach;
mod s3_user;
mod s3_user_keys;
mod volume;
mod volume_attach;

pub use instance::ComputeInstance;
pub use ip::NetworkIp;
pub use ip_attach::NetworkIpAttach;
pub use s3_user::StorageS3User;
pub use s3_user_keys::StorageS3UserKeys;
pub use volume::{DisksVolume, MIN_SIZE_GB};
pub use volume_attach::DisksVolumeAttach;

use crate::resource::Resource;
use std::sync::Arc;

/// Every resource the provider serves
pub fn all() -> Vec<Arc<dyn Resource>> {
    vec![
        Arc::new(ComputeInstance),
        Arc::new(NetworkIp),
        Arc::new(NetworkIpAttach),
        Arc::new(DisksVolume),
        Arc::new(DisksVolumeAttach),
        Arc::new(StorageS3User),
        Arc::new(StorageS3UserKeys),
    ]
}

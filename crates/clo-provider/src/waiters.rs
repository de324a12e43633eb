//! State sources for each CLO entity kind and the waits built on them

use crate::context::OpContext;
use crate::error::Result;
use async_trait::async_trait;
use clo_api::{Address, ApiClient, S3User, Server, Volume};
use clo_converge::{EntityRef, Observed, StateSource, UntilGone, WaitSpec};
use std::sync::Arc;
use std::time::Duration;

pub mod server {
    pub const BUILDING: &str = "BUILDING";
    pub const ACTIVE: &str = "ACTIVE";
    pub const RESIZING: &str = "RESIZING";
    pub const STOPPED: &str = "STOPPED";
    pub const DELETING: &str = "DELETING";
    pub const DELETED: &str = "DELETED";
}

pub mod volume {
    pub const CREATING: &str = "CREATING";
    pub const AVAILABLE: &str = "AVAILABLE";
    pub const RESIZING: &str = "RESIZING";
    pub const ATTACHING: &str = "ATTACHING";
    pub const IN_USE: &str = "IN-USE";
    pub const DETACHING: &str = "DETACHING";
    pub const DELETING: &str = "DELETING";
    pub const DELETED: &str = "DELETED";
}

pub mod address {
    pub const PROCESSING: &str = "PROCESSING";
    pub const DOWN: &str = "DOWN";
    pub const ACTIVE: &str = "ACTIVE";
    pub const DELETED: &str = "DELETED";
}

pub mod s3_user {
    pub const CREATING: &str = "CREATING";
    pub const AVAILABLE: &str = "AVAILABLE";
    pub const DELETING: &str = "DELETING";
    pub const DELETE: &str = "DELETE";
}

/// Server status as returned
pub struct ServerSource {
    client: Arc<ApiClient>,
    id: String,
}

#[async_trait]
impl StateSource for ServerSource {
    type Snapshot = Server;

    async fn fetch(&self) -> clo_api::Result<Observed<Server>> {
        let server = self.client.server_detail(&self.id).await?;
        Ok(Observed::new(server.status.clone(), server))
    }
}

/// Volume status, uppercased for lifecycle waits and compared as returned
/// by attach and detach
pub struct VolumeSource {
    client: Arc<ApiClient>,
    id: String,
    uppercase: bool,
}

#[async_trait]
impl StateSource for VolumeSource {
    type Snapshot = Volume;

    async fn fetch(&self) -> clo_api::Result<Observed<Volume>> {
        let volume = self.client.volume_detail(&self.id).await?;
        let state = if self.uppercase {
            volume.status.to_uppercase()
        } else {
            volume.status.clone()
        };
        Ok(Observed::new(state, volume))
    }
}

/// Address status as returned, or `PROCESSING` when the API reports none
/// yet (the attach flow sees this right after the request)
pub struct AddressSource {
    client: Arc<ApiClient>,
    id: String,
    empty_is_processing: bool,
}

#[async_trait]
impl StateSource for AddressSource {
    type Snapshot = Address;

    async fn fetch(&self) -> clo_api::Result<Observed<Address>> {
        let address = self.client.address_detail(&self.id).await?;
        let state = if self.empty_is_processing && address.status.is_empty() {
            address::PROCESSING.to_string()
        } else {
            address.status.clone()
        };
        Ok(Observed::new(state, address))
    }
}

/// Storage user status as returned
pub struct S3UserSource {
    client: Arc<ApiClient>,
    id: String,
}

#[async_trait]
impl StateSource for S3UserSource {
    type Snapshot = S3User;

    async fn fetch(&self) -> clo_api::Result<Observed<S3User>> {
        let user = self.client.s3_user_detail(&self.id).await?;
        Ok(Observed::new(user.status.clone(), user))
    }
}

/// One wait with the given state sets, retried within the timeout
async fn converge<S: StateSource>(ctx: &OpContext, spec: WaitSpec, source: S) -> Result<S::Snapshot> {
    let observed = spec.wait_retrying(&source, &ctx.retry, &ctx.cancel).await?;
    Ok(observed.snapshot)
}

/// One wait with the given state sets, failing on the first error
async fn converge_once<S: StateSource>(ctx: &OpContext, spec: WaitSpec, source: S) -> Result<S::Snapshot> {
    let observed = spec.wait(&source, &ctx.cancel).await?;
    Ok(observed.snapshot)
}

fn server_source(ctx: &OpContext, id: &str) -> ServerSource {
    ServerSource {
        client: ctx.client.clone(),
        id: id.to_string(),
    }
}

fn volume_source(ctx: &OpContext, id: &str, uppercase: bool) -> VolumeSource {
    VolumeSource {
        client: ctx.client.clone(),
        id: id.to_string(),
        uppercase,
    }
}

fn address_source(ctx: &OpContext, id: &str, empty_is_processing: bool) -> AddressSource {
    AddressSource {
        client: ctx.client.clone(),
        id: id.to_string(),
        empty_is_processing,
    }
}

fn s3_user_source(ctx: &OpContext, id: &str) -> S3UserSource {
    S3UserSource {
        client: ctx.client.clone(),
        id: id.to_string(),
    }
}

pub async fn server_state(
    ctx: &OpContext,
    id: &str,
    pending: &[&str],
    target: &[&str],
    timeout: Duration,
) -> Result<Server> {
    let spec = ctx.wait_spec(EntityRef::server(id), pending, target, timeout);
    converge(ctx, spec, server_source(ctx, id)).await
}

pub async fn server_deleted(ctx: &OpContext, id: &str, timeout: Duration) -> Result<()> {
    let spec = ctx.wait_spec(
        EntityRef::server(id),
        &[server::DELETING],
        &[server::DELETED],
        timeout,
    );
    converge(ctx, spec, UntilGone::new(server_source(ctx, id), server::DELETED)).await?;
    Ok(())
}

pub async fn volume_state(
    ctx: &OpContext,
    id: &str,
    pending: &[&str],
    target: &[&str],
    timeout: Duration,
) -> Result<Volume> {
    let spec = ctx.wait_spec(EntityRef::volume(id), pending, target, timeout);
    converge(ctx, spec, volume_source(ctx, id, true)).await
}

/// Attach and detach waits are not retried
pub async fn volume_attachment(
    ctx: &OpContext,
    id: &str,
    pending: &[&str],
    target: &[&str],
    timeout: Duration,
) -> Result<Volume> {
    let spec = ctx.wait_spec(EntityRef::volume(id), pending, target, timeout);
    converge_once(ctx, spec, volume_source(ctx, id, false)).await
}

pub async fn volume_deleted(ctx: &OpContext, id: &str, timeout: Duration) -> Result<()> {
    let spec = ctx.wait_spec(
        EntityRef::volume(id),
        &[volume::DELETING],
        &[volume::DELETED],
        timeout,
    );
    converge(ctx, spec, UntilGone::new(volume_source(ctx, id, true), volume::DELETED)).await?;
    Ok(())
}

pub async fn address_state(
    ctx: &OpContext,
    id: &str,
    pending: &[&str],
    target: &[&str],
    timeout: Duration,
) -> Result<Address> {
    let spec = ctx.wait_spec(EntityRef::address(id), pending, target, timeout);
    converge(ctx, spec, address_source(ctx, id, false)).await
}

/// Attach wait, where an address without status is still processing;
/// not retried
pub async fn address_attached(ctx: &OpContext, id: &str, timeout: Duration) -> Result<Address> {
    let spec = ctx.wait_spec(
        EntityRef::address(id),
        &[address::PROCESSING],
        &[address::ACTIVE],
        timeout,
    );
    converge_once(ctx, spec, address_source(ctx, id, true)).await
}

/// Detach and make-primary waits; not retried
pub async fn address_attachment(
    ctx: &OpContext,
    id: &str,
    pending: &[&str],
    target: &[&str],
    timeout: Duration,
) -> Result<Address> {
    let spec = ctx.wait_spec(EntityRef::address(id), pending, target, timeout);
    converge_once(ctx, spec, address_source(ctx, id, false)).await
}

pub async fn address_deleted(ctx: &OpContext, id: &str, timeout: Duration) -> Result<()> {
    let spec = ctx.wait_spec(
        EntityRef::address(id),
        &[address::PROCESSING],
        &[address::DELETED],
        timeout,
    );
    converge(
        ctx,
        spec,
        UntilGone::new(address_source(ctx, id, false), address::DELETED),
    )
    .await?;
    Ok(())
}

pub async fn s3_user_state(
    ctx: &OpContext,
    id: &str,
    pending: &[&str],
    target: &[&str],
    timeout: Duration,
) -> Result<S3User> {
    let spec = ctx.wait_spec(EntityRef::storage_user(id), pending, target, timeout);
    converge(ctx, spec, s3_user_source(ctx, id)).await
}

pub async fn s3_user_deleted(ctx: &OpContext, id: &str, timeout: Duration) -> Result<()> {
    let spec = ctx.wait_spec(
        EntityRef::storage_user(id),
        &[s3_user::DELETING],
        &[s3_user::DELETE],
        timeout,
    );
    converge(
        ctx,
        spec,
        UntilGone::new(s3_user_source(ctx, id), s3_user::DELETE),
    )
    .await?;
    Ok(())
}

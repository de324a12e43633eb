//! API entities flattened into attribute maps

use crate::data::Attributes;
use clo_api::{Address, Image, Project, S3User, Server, Volume};
use serde_json::{Value, json};

fn object(value: Value) -> Attributes {
    match value {
        Value::Object(map) => map,
        _ => Attributes::new(),
    }
}

pub fn project(p: &Project) -> Attributes {
    object(json!({
        "id": p.id,
        "name": p.name,
        "status": p.status,
        "created_in": p.created_in,
        "stopping_reason": p.stopping_reason,
        "has_abuse": p.has_abuse,
    }))
}

pub fn image(i: &Image) -> Attributes {
    let os = i.operation_system.clone().unwrap_or_default();
    object(json!({
        "id": i.id,
        "name": i.name,
        "os_family": os.os_family,
        "os_version": os.version,
        "os_distribution": os.distribution,
    }))
}

pub fn server(s: &Server) -> Attributes {
    let addresses: Vec<Value> = s
        .addresses
        .iter()
        .map(|a| {
            json!({
                "id": a.id,
                "name": a.name,
                "ptr": a.ptr,
                "type": a.address_type,
                "macaddr": a.mac_addr,
                "version": a.version,
                "external": a.external,
                "ddos_protection": a.ddos_protection,
            })
        })
        .collect();
    let disks: Vec<Value> = s
        .disk_data
        .iter()
        .map(|d| json!({"id": d.id, "storage_type": d.storage_type}))
        .collect();

    object(json!({
        "id": s.id,
        "name": s.name,
        "status": s.status,
        "created_in": s.created_in,
        "project_id": s.project_id,
        "image_id": s.image,
        "recipe_id": s.recipe,
        "rescue_mode": s.rescue_mode,
        "guest_agent": s.guest_agent,
        "flavor_ram": s.flavor.ram,
        "flavor_vcpus": s.flavor.vcpus,
        "addresses": addresses,
        "disk_data": disks,
    }))
}

pub fn volume(v: &Volume) -> Attributes {
    let attachment = v.attachment.as_ref();
    object(json!({
        "id": v.id,
        "name": v.name,
        "status": v.status,
        "created_in": v.created_in,
        "description": v.description,
        "size": v.size,
        "bootable": v.bootable,
        "undetachable": v.undetachable,
        "device": attachment.map(|a| a.device.clone()),
        "attached_to_instance_id": attachment.map(|a| a.id.clone()),
    }))
}

pub fn address(a: &Address) -> Attributes {
    let attached_to: Vec<Value> = a
        .attached_to
        .iter()
        .map(|t| json!({"id": t.id, "entity": t.entity}))
        .collect();
    object(json!({
        "id": a.id,
        "address": a.address,
        "status": a.status,
        "ptr": a.ptr,
        "type": a.address_type,
        "created_in": a.created_in,
        "is_primary": a.is_primary,
        "ddos_protection": a.ddos_protection,
        "bandwidth": a.bandwidth,
        "attached_to": attached_to,
    }))
}

pub fn s3_user(u: &S3User) -> Attributes {
    let quotas: Vec<Value> = u
        .quotas
        .iter()
        .map(|q| json!({"type": q.quota_type, "max_size": q.max_size, "max_objects": q.max_objects}))
        .collect();
    object(json!({
        "id": u.id,
        "name": u.name,
        "canonical_name": u.canonical_name,
        "status": u.status,
        "tenant": u.tenant,
        "max_buckets": u.max_buckets,
        "quotas": quotas,
    }))
}

use super::super::StateCommands;
use crate::utils;
use clo_provider::{StateManager, find_resource, resource_key};
use colored::Colorize;
use std::path::Path;

pub async fn handle(cmd: StateCommands, root: &Path) -> anyhow::Result<()> {
    let state = StateManager::new(root).load().await?;

    match cmd {
        StateCommands::List => {
            if state.resources.is_empty() {
                println!("No resources in state.");
                return Ok(());
            }
            for (key, resource) in &state.resources {
                let marker = if resource.tainted {
                    " (tainted)".red().to_string()
                } else {
                    String::new()
                };
                println!("{}  {}{}", key.cyan(), resource.id, marker);
            }
        }
        StateCommands::Show {
            resource_type,
            name,
        } => {
            let key = resource_key(&resource_type, &name);
            let resource = state
                .get_resource(&key)
                .ok_or_else(|| anyhow::anyhow!("{} is not in the state", key))?;
            println!("{} {}", key.bold(), resource.id);
            println!("  created: {}", resource.created_at);
            println!("  updated: {}", resource.updated_at);
            if resource.tainted {
                println!("  {}", "tainted".red());
            }
            let schema = find_resource(&resource.resource_type)?.schema();
            utils::print_attributes(&schema, &resource.attributes, false);
        }
    }

    Ok(())
}

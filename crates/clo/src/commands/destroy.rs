use clo_provider::{CloProvider, StateManager, resource_key};
use colored::Colorize;
use std::path::Path;

pub async fn handle(
    provider: &CloProvider,
    root: &Path,
    resource_type: &str,
    name: &str,
) -> anyhow::Result<()> {
    let manager = StateManager::new(root);
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;
    let key = resource_key(resource_type, name);

    let Some(resource) = state.get_resource(&key).cloned() else {
        lock.release().await?;
        anyhow::bail!("{} is not in the state", key);
    };

    println!("{} {} ({})", "Destroying".yellow(), key.cyan(), resource.id);
    provider.destroy(&resource).await?;

    state.remove_resource(&key);
    manager.save(&state).await?;
    lock.release().await?;

    println!("{} {} destroyed", "✓".green(), key.cyan());
    Ok(())
}

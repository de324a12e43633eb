use clo_provider::{CloProvider, StateManager};
use colored::Colorize;
use std::path::Path;

pub async fn handle(provider: &CloProvider, root: &Path) -> anyhow::Result<()> {
    let manager = StateManager::new(root);
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;

    if state.resources.is_empty() {
        println!("No resources in state.");
        lock.release().await?;
        return Ok(());
    }

    let mut failed = 0;
    let keys: Vec<String> = state.resources.keys().cloned().collect();
    for key in keys {
        let Some(resource) = state.get_resource(&key).cloned() else {
            continue;
        };
        match provider.refresh(&resource).await {
            Ok(attributes) => {
                if let Some(entry) = state.resources.get_mut(&key) {
                    entry.refresh(attributes);
                }
                println!("  {} {}", "✓".green(), key.cyan());
            }
            Err(e) if e.is_not_found() => {
                state.remove_resource(&key);
                println!(
                    "  {} {} no longer exists, removed from state",
                    "⚠".yellow(),
                    key.cyan()
                );
            }
            Err(e) => {
                failed += 1;
                println!("  {} {}: {}", "✗".red(), key.cyan(), e);
            }
        }
    }

    manager.save(&state).await?;
    lock.release().await?;

    if failed > 0 {
        anyhow::bail!("{} resource(s) failed to refresh", failed);
    }
    Ok(())
}

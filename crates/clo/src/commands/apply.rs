use crate::utils;
use clo_provider::{ActionType, CloProvider, Plan, ResourceState, StateManager, resource_key};
use colored::Colorize;
use std::path::Path;

pub async fn handle(
    provider: &CloProvider,
    root: &Path,
    resource_type: &str,
    name: &str,
    file: &Path,
) -> anyhow::Result<()> {
    let config = utils::read_attributes(file)?;
    let manager = StateManager::new(root);
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;
    let key = resource_key(resource_type, name);

    let prior = state.get_resource(&key).cloned();
    let mut plan = provider.plan(resource_type, prior.as_ref(), config)?;
    print_plan(&key, &plan);

    if !plan.has_changes() {
        println!("{}", "No changes.".green());
        lock.release().await?;
        return Ok(());
    }

    let result = provider.apply(&mut plan).await;

    // Whatever was created is recorded, even when a later step failed
    match (&result, plan.data.id()) {
        (Ok(()), Some(id)) => {
            let record = record(prior.as_ref(), &plan, id, false);
            state.set_resource(key.clone(), record);
        }
        (Err(_), Some(id)) if plan.creates() => {
            let record = record(prior.as_ref(), &plan, id, true);
            state.set_resource(key.clone(), record);
        }
        (Err(_), None) if plan.action == ActionType::Replace && plan.prior.is_none() => {
            state.remove_resource(&key);
        }
        _ => {}
    }
    manager.save(&state).await?;
    lock.release().await?;

    if let Err(e) = result {
        if plan.creates() && plan.data.id().is_some() {
            eprintln!(
                "{} {} was created but did not converge; it is marked tainted and will be replaced on the next apply",
                "⚠".yellow(),
                key.cyan()
            );
        }
        return Err(e.into());
    }

    println!(
        "{} {} {}",
        "✓".green(),
        key.cyan(),
        format!("{}d", plan.action).green()
    );
    let schema = provider.resource(resource_type)?.schema();
    utils::print_attributes(&schema, plan.data.attributes(), false);
    Ok(())
}

fn print_plan(key: &str, plan: &Plan) {
    let action = match plan.action {
        ActionType::Create => "create".green(),
        ActionType::Update => "update".yellow(),
        ActionType::Replace => "replace".red(),
        ActionType::NoOp => "no-op".normal(),
    };
    println!("{} {}", key.bold(), action);
    if plan.tainted {
        println!("  (tainted by a failed create)");
    }
    for attr in &plan.replace_because {
        println!("  {} {} forces replacement", "•".red(), attr);
    }
    for attr in plan.changed.iter().filter(|a| !plan.replace_because.contains(a)) {
        println!("  {} {}", "•".yellow(), attr);
    }
}

fn record(prior: Option<&ResourceState>, plan: &Plan, id: &str, tainted: bool) -> ResourceState {
    let mut record = prior
        .filter(|p| p.id == id)
        .cloned()
        .unwrap_or_else(|| ResourceState::new(id, plan.resource_type));
    record.refresh(plan.data.attributes().clone());
    record.timeouts = plan.timeouts.clone();
    record.tainted = tainted;
    record
}

//! Logistics save inspector
//!
//! Loads the persisted transfer registry named by `config/{env}.yaml` and
//! prints what is in transit and what awaits review.
//!
//! ```text
//! logistics_engine [--env dev] [--save PATH] [--clear-expired]
//! ```

use anyhow::Context;

use logistics_engine::config::AppConfig;
use logistics_engine::logistics::{ProfileSet, SaveStore, TransferRequest, TransferScheduler};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Save file override from command line (--save argument)
fn get_save_override() -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--save" && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

fn use_clear_expired() -> bool {
    std::env::args().any(|a| a == "--clear-expired")
}

fn print_transfer(transfer: &TransferRequest) {
    println!(
        "  {}  {:<6} {:<9} {} -> {}  {} x{:.2}  arrival={:.1}  delivered={:.2}{}",
        transfer.id(),
        transfer.kind(),
        transfer.status(),
        transfer.origin(),
        transfer.destination(),
        transfer.resource().name,
        transfer.amount(),
        transfer.arrival_time(),
        transfer.delivered_amount(),
        if transfer.abort_requested() { "  (abort requested)" } else { "" }
    );
}

fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    if let Some(path) = get_save_override() {
        app_config.logistics.persistence.save_path = path;
    }
    let _log_guard = logistics_engine::logging::init_logging(&app_config);

    tracing::info!("Starting logistics inspector in {} mode", env);

    let store = SaveStore::from_config(&app_config.logistics.persistence);
    let Some(block) = store
        .load()
        .with_context(|| format!("Failed to load save: {}", store.path().display()))?
    else {
        println!("No save at {}", store.path().display());
        return Ok(());
    };

    let mut scheduler = TransferScheduler::new(ProfileSet::from_config(&app_config.logistics), 0.0);
    scheduler.load(&block)?;

    let registry = scheduler.registry();
    println!("=== Logistics: {} ===", store.path().display());
    if let Some(saved_at) = block.saved_at {
        println!("Saved at {}", saved_at.to_rfc3339());
    }
    println!("Pending ({}):", registry.pending().len());
    registry.pending().iter().for_each(print_transfer);
    println!("Expired ({}):", registry.expired().len());
    registry.expired().iter().for_each(print_transfer);

    if use_clear_expired() && !registry.expired().is_empty() {
        scheduler.clear_expired();
        store.save(&scheduler.save())?;
        println!("Expired transfers cleared");
    }

    Ok(())
}

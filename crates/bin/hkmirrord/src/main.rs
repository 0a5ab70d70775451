//! # hkmirrord
//!
//! Composition root that wires the notification core to the virtual home.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and initialise logging
//! - Build the preview home and hand it to the virtual source
//! - Subscribe to the watched characteristics *before* any home is known,
//!   so the subscriptions go through the deferred-home queue
//! - Pump source events into the manager, announce the homes and wait for
//!   arming to settle
//! - Inject random value changes until Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;
mod simulation;

use std::sync::Arc;

use anyhow::Context;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

use hkmirror_adapter_virtual::VirtualHome;
use hkmirror_app::manager::Manager;
use hkmirror_app::ports::HomeSource;
use hkmirror_app::services::mirror_service::MirrorService;
use hkmirror_domain::service::ServiceCategory;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Source
    let (source, events) = VirtualHome::preview().context("building the preview home")?;
    let source = Arc::new(source);

    // Core
    let manager = Manager::new(Arc::clone(&source), Handle::current());
    let subscription = manager.on_update_any(
        &config.subscriptions.categories,
        ServiceCategory::ALL,
        |service, value| {
            tracing::info!(
                service = service.name(),
                category = %service.category(),
                value = ?value,
                "characteristic changed"
            );
        },
    );
    let (ready_tx, ready_rx) = oneshot::channel();
    manager.on_homes_updated(move |home| {
        let _ = ready_tx.send(home.id());
    });

    let pump = tokio::spawn({
        let manager = manager.clone();
        async move { manager.run(events).await }
    });

    let renamed = source
        .homes()
        .into_iter()
        .find(|h| h.is_primary() && h.name() != config.home.name);
    if let Some(mut home) = renamed {
        MirrorService::new(Arc::clone(&source))
            .rename(&mut home, &config.home.name)
            .await
            .context("renaming the demo home")?;
    }
    source.announce();

    let home_id = ready_rx.await.context("home source never reported a home")?;
    manager.wait_idle().await;
    tracing::info!(
        home = %home_id,
        %subscription,
        armed = source.enable_requests(),
        "mirror ready"
    );

    if config.simulation.enabled {
        simulate(&source, &manager, &config).await?;
    } else {
        tokio::signal::ctrl_c().await?;
    }

    manager.unsubscribe(subscription);
    pump.abort();
    tracing::info!("shutting down");
    Ok(())
}

/// Inject a random change every interval until Ctrl-C.
async fn simulate(
    source: &VirtualHome,
    manager: &Manager<VirtualHome>,
    config: &Config,
) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(config.interval());
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            result = tokio::signal::ctrl_c() => return result.map_err(Into::into),
        }
        let Some(selected) = manager.home() else {
            continue;
        };
        let Some(home) = source.homes().into_iter().find(|h| h.id() == selected.id()) else {
            continue;
        };
        let change = simulation::next_change(
            &home,
            &config.subscriptions.categories,
            &mut rand::thread_rng(),
        );
        if let Some(change) = change {
            tracing::debug!(
                service = %change.service_name,
                category = %change.category,
                value = %change.value,
                "simulating change"
            );
            source.set_value(change.service, change.category, change.value)?;
        }
    }
}

//! Configuration file watcher for hot reload.
//!
//! Reloaded snapshots replace the live `ArcSwap<GatewayConfig>`. Upstream
//! and admin credentials apply on the next request; listener, token and
//! admin route mounting are fixed at startup and only produce a warning.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};

use crate::config::loader::load_config;
use crate::config::schema::GatewayConfig;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching the file on notify's background thread.
    ///
    /// The returned watcher must be kept alive for as long as reloads are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, update_tx } = self;
        let reload_path = path.clone();

        let handler = move |res: notify::Result<Event>| match res {
            Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                match load_config(&reload_path) {
                    Ok(new_config) => {
                        if update_tx.send(new_config).is_err() {
                            tracing::debug!("Config receiver dropped, ignoring reload");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Config reload rejected, keeping current configuration");
                    }
                }
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = ?e, "Config watch error"),
        };

        let mut watcher = RecommendedWatcher::new(
            handler,
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}

/// Swap a reloaded configuration into the live snapshot.
///
/// Returns the names of changed sections that need a restart to apply.
pub fn apply_update(live: &ArcSwap<GatewayConfig>, new_config: GatewayConfig) -> Vec<&'static str> {
    let current = live.load();
    let mut restart_only = Vec::new();
    if current.listener != new_config.listener {
        restart_only.push("listener");
    }
    if current.upstream.connect_timeout_secs != new_config.upstream.connect_timeout_secs {
        restart_only.push("upstream.connect_timeout_secs");
    }
    if current.auth != new_config.auth {
        restart_only.push("auth");
    }
    if current.admin.enabled != new_config.admin.enabled {
        restart_only.push("admin.enabled");
    }
    if current.observability != new_config.observability {
        restart_only.push("observability");
    }
    live.store(Arc::new(new_config));
    restart_only
}

/// Apply updates from the watcher until shutdown or the channel closes.
pub async fn apply_updates(
    live: Arc<ArcSwap<GatewayConfig>>,
    mut updates: mpsc::UnboundedReceiver<GatewayConfig>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(new_config) = update else { break };
                let restart_only = apply_update(&live, new_config);
                tracing::info!(
                    fallback_url = %live.load().upstream.fallback_url,
                    "Configuration reloaded"
                );
                if !restart_only.is_empty() {
                    tracing::warn!(sections = ?restart_only, "Changed sections take effect after restart");
                }
            }
            _ = shutdown.recv() => break,
        }
    }
}

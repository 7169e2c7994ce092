//! Configuration file watcher for hot reload.
//!
//! Only the dispatch policy is applied live. Changes to the listener, the
//! limits or the hosted worker are reported and left for the next restart;
//! a worker's routes are registered exactly once.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::HostConfig;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    current: HostConfig,
    update_tx: mpsc::UnboundedSender<HostConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher for the config currently in effect.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path, current: HostConfig) -> (Self, mpsc::UnboundedReceiver<HostConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                current,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file. Keep the returned watcher alive for as long
    /// as reloads should happen.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            mut current,
            update_tx,
        } = self;
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    match load_config(&path) {
                        Ok(new_config) if new_config == current => {}
                        Ok(new_config) => {
                            for section in restart_required(&current, &new_config) {
                                tracing::warn!(
                                    section,
                                    "Config change requires a restart; ignoring it"
                                );
                            }
                            tracing::info!(
                                path = ?path,
                                "Config file changed, applying dispatch policy"
                            );
                            current = new_config.clone();
                            let _ = update_tx.send(new_config);
                        }
                        Err(e) => {
                            tracing::error!(
                                "Failed to reload config: {}. Keeping current configuration.",
                                e
                            );
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watched, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?watched, "Config watcher started");
        Ok(watcher)
    }
}

/// Sections that differ but cannot be applied to a running host.
fn restart_required(current: &HostConfig, new: &HostConfig) -> Vec<&'static str> {
    let mut sections = Vec::new();
    if current.listener != new.listener {
        sections.push("listener");
    }
    if current.limits != new.limits {
        sections.push("limits");
    }
    if current.observability != new.observability {
        sections.push("observability");
    }
    if current.worker != new.worker {
        sections.push("worker");
    }
    if current.dispatch.max_in_flight != new.dispatch.max_in_flight {
        sections.push("dispatch.max_in_flight");
    }
    sections
}

//! Route-table file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::handlers::HandlerRegistry;
use crate::config::loader::load_config;
use crate::config::schema::TableConfig;

/// A watcher that monitors a route-table file for changes.
pub struct TableWatcher {
    path: PathBuf,
    handlers: HandlerRegistry,
    update_tx: mpsc::UnboundedSender<TableConfig>,
}

impl TableWatcher {
    /// Create a new TableWatcher.
    ///
    /// Returns the watcher and a receiver for validated table updates.
    pub fn new(
        path: &Path,
        handlers: HandlerRegistry,
    ) -> (Self, mpsc::UnboundedReceiver<TableConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                handlers,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for as long as updates are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();
        let handlers = self.handlers;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Route table change detected, reloading...");
                        match load_config(&path, &handlers) {
                            Ok(new_config) => {
                                let _ = tx.send(new_config);
                            }
                            Err(e) => {
                                tracing::error!(
                                    "Failed to reload route table: {}. Keeping current table.",
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Route table watcher started");
        Ok(watcher)
    }
}

//! Configuration file watcher for hot reload.
//!
//! Editors and `fs::write` usually emit several events per save (truncate,
//! then write). Each event rereads the file, and only contents that differ
//! from the last accepted version and pass validation are forwarded, so one
//! save produces at most one table swap.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::parse_config;
use crate::config::schema::RouterConfig;

/// Watches one routing config file and forwards validated updates.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<RouterConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RouterConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. Dropping the returned watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, update_tx } = self;
        let mut accepted = fs::read_to_string(&path).ok();
        let reload_path = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    if let Some(config) = reload(&reload_path, &mut accepted) {
                        let _ = update_tx.send(config);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}

/// Reread `path`. Returns the config when its text differs from `accepted`
/// and validates; `accepted` then holds the new text.
fn reload(path: &Path, accepted: &mut Option<String>) -> Option<RouterConfig> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = ?path, error = %e, "Config file unreadable; keeping current routes");
            return None;
        }
    };
    if accepted.as_deref() == Some(content.as_str()) {
        return None;
    }

    match parse_config(&content) {
        Ok(config) => {
            tracing::info!(
                path = ?path,
                root = %config.routing.root,
                sites = config.routing.sites.len(),
                "Config file changed, reloading routes"
            );
            *accepted = Some(content);
            Some(config)
        }
        Err(e) => {
            tracing::error!(path = ?path, error = %e, "Changed config rejected; keeping current routes");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routing_toml(root: &str) -> String {
        format!(
            r#"
            [routing]
            root = "{root}"
            [[routing.sites]]
            name = "{root}"
            routes = [{{ name = "HomeR", pattern = "/" }}]
            "#
        )
    }

    #[test]
    fn test_reload_skips_unchanged_and_invalid() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), routing_toml("App")).unwrap();
        let mut accepted = fs::read_to_string(file.path()).ok();

        assert!(reload(file.path(), &mut accepted).is_none());

        fs::write(file.path(), "[routing]\nroot = \"Missing\"\n").unwrap();
        assert!(reload(file.path(), &mut accepted).is_none());
        assert_eq!(accepted.as_deref(), Some(routing_toml("App").as_str()));

        fs::write(file.path(), routing_toml("Next")).unwrap();
        let config = reload(file.path(), &mut accepted).unwrap();
        assert_eq!(config.routing.root, "Next");
        assert!(reload(file.path(), &mut accepted).is_none());
    }

    #[tokio::test]
    async fn test_watcher_forwards_rewritten_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), routing_toml("App")).unwrap();

        let (watcher, mut updates) = ConfigWatcher::new(file.path());
        let _watcher = watcher.run().unwrap();

        fs::write(file.path(), routing_toml("Next")).unwrap();
        let config = tokio::time::timeout(Duration::from_secs(10), updates.recv())
            .await
            .expect("no update received")
            .unwrap();
        assert_eq!(config.routing.root, "Next");
    }
}

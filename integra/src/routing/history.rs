use integra_core::routing::{NavigateOptions, Navigator};
use std::sync::Mutex;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub path: String,
    /// Path the guard redirected away from, read by the login page
    pub from: Option<String>,
}

/// Browser-like history stack with change notifications.
pub struct HistoryRouter {
    entries: Mutex<Vec<HistoryEntry>>,
    location: watch::Sender<String>,
}

impl HistoryRouter {
    pub fn new(initial_path: &str) -> Self {
        let (location, _) = watch::channel(initial_path.to_string());
        Self {
            entries: Mutex::new(vec![HistoryEntry {
                path: initial_path.to_string(),
                from: None,
            }]),
            location,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.location.subscribe()
    }

    /// User initiated navigation, e.g. following a link.
    pub fn push(&self, path: &str) {
        self.navigate(path, NavigateOptions::default());
    }

    /// Step back one entry, like the browser back button.
    pub fn back(&self) -> Option<String> {
        let path = {
            let mut entries = self.entries.lock().ok()?;
            if entries.len() < 2 {
                return None;
            }
            entries.pop();
            entries.last()?.path.clone()
        };
        self.location.send_replace(path.clone());
        Some(path)
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

}

impl Navigator for HistoryRouter {
    fn current_path(&self) -> String {
        self.location.borrow().clone()
    }

    fn navigate(&self, path: &str, options: NavigateOptions) {
        let entry = HistoryEntry {
            path: path.to_string(),
            from: options.from,
        };
        if let Ok(mut entries) = self.entries.lock() {
            if options.replace {
                entries.pop();
            }
            entries.push(entry);
            debug!("Navigated to {} ({} history entries)", path, entries.len());
        }
        self.location.send_replace(path.to_string());
    }

    fn redirected_from(&self) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.last().and_then(|entry| entry.from.clone()))
    }
}

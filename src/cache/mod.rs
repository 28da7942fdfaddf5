use std::collections::HashMap;
use std::sync::Mutex;

/// Cache invalidation signal emitted after every successful mutation.
/// Consumers (a fronting page cache, a CDN hook) watch the per-path epoch.
pub trait Revalidator: Send + Sync {
    fn revalidate(&self, path: &str);
}

/// Default revalidator: bumps an in-process epoch per path and logs the
/// signal. The epoch is what a cache layer keys its freshness checks on.
#[derive(Default)]
pub struct PathRevalidator {
    epochs: Mutex<HashMap<String, u64>>,
}

impl PathRevalidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self, path: &str) -> u64 {
        self.epochs
            .lock()
            .map(|map| map.get(path).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

impl Revalidator for PathRevalidator {
    fn revalidate(&self, path: &str) {
        if let Ok(mut epochs) = self.epochs.lock() {
            let counter = epochs.entry(path.to_string()).or_insert(0);
            *counter += 1;
            tracing::debug!("Revalidated path {} (epoch {})", path, counter);
        }
    }
}

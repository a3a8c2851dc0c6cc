//! External image adoption: URL list diffing and async load completion.
//!
//! The host owns the list of image URLs; the session owns the layers. The
//! importer reconciles the two: new URLs become pending loads, vanished URLs
//! tear their layers down, and decoded images become layers in the order
//! their loads complete (not the order they were requested).

use crate::layer::{ImageData, LayerId, LayerManager};
use std::collections::HashMap;

/// Lifecycle of an adopted URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImportState {
    /// Load requested, image not decoded yet.
    Pending,
    /// Load finished and a layer exists for it.
    Loaded(LayerId),
    /// Load failed; the URL stays known so it is not retried every sync.
    Failed,
}

/// Tracks which external URLs have been adopted as layers.
#[derive(Debug, Clone, Default)]
pub struct ImageImporter {
    /// Every URL ever seen, with its current state. Keyed by the URL string;
    /// duplicate URLs in the host list collapse to one layer.
    known: HashMap<String, ImportState>,
}

impl ImageImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile the host's URL list with the known set.
    ///
    /// Returns the URLs the host must start loading. URLs no longer in the
    /// list are forgotten and their layers removed. Already-known URLs
    /// (pending, loaded, or failed) produce no new work.
    pub fn sync(&mut self, urls: &[String], layers: &mut LayerManager) -> Vec<String> {
        let mut fresh = Vec::new();
        for url in urls {
            if !self.known.contains_key(url) {
                self.known.insert(url.clone(), ImportState::Pending);
                fresh.push(url.clone());
            }
        }

        let removed: Vec<String> = self
            .known
            .keys()
            .filter(|known| !urls.contains(known))
            .cloned()
            .collect();
        for url in removed {
            if let Some(ImportState::Loaded(id)) = self.known.remove(&url) {
                layers.remove(id);
            }
            log::debug!("image url dropped: {url}");
        }

        fresh
    }

    /// Adopt a finished load as a new layer.
    ///
    /// Layers are created in completion order, so a slow first image ends up
    /// below a fast second one. Completions for URLs that were dropped from
    /// the list in the meantime are ignored.
    pub fn complete(
        &mut self,
        url: &str,
        image: ImageData,
        layers: &mut LayerManager,
    ) -> Option<LayerId> {
        match self.known.get(url) {
            Some(ImportState::Pending) => {
                let id = layers.add_layer(image);
                self.known.insert(url.to_owned(), ImportState::Loaded(id));
                Some(id)
            }
            _ => {
                log::debug!("ignoring stale image completion for {url}");
                None
            }
        }
    }

    /// Record a failed load. The URL stays known so `sync` does not request
    /// it again; a later removal and re-add retries it.
    pub fn fail(&mut self, url: &str) {
        if let Some(state) = self.known.get_mut(url) {
            if *state == ImportState::Pending {
                *state = ImportState::Failed;
            }
        }
    }

    /// The layer backing a URL, if its load completed.
    pub fn layer_for(&self, url: &str) -> Option<LayerId> {
        match self.known.get(url) {
            Some(ImportState::Loaded(id)) => Some(*id),
            _ => None,
        }
    }

    /// Number of loads still in flight.
    pub fn pending(&self) -> usize {
        self.known
            .values()
            .filter(|state| **state == ImportState::Pending)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn image() -> ImageData {
        ImageData::solid(2, 2, [0, 255, 0, 255])
    }

    #[test]
    fn test_sync_returns_only_new_urls() {
        let mut importer = ImageImporter::new();
        let mut layers = LayerManager::new();

        let fresh = importer.sync(&urls(&["a.png", "b.png"]), &mut layers);
        assert_eq!(fresh, urls(&["a.png", "b.png"]));

        // Re-syncing the same list requests nothing.
        let fresh = importer.sync(&urls(&["a.png", "b.png"]), &mut layers);
        assert!(fresh.is_empty());

        // Appending one URL requests just that one.
        let fresh = importer.sync(&urls(&["a.png", "b.png", "c.png"]), &mut layers);
        assert_eq!(fresh, urls(&["c.png"]));
    }

    #[test]
    fn test_layers_created_in_completion_order() {
        let mut importer = ImageImporter::new();
        let mut layers = LayerManager::new();
        importer.sync(&urls(&["slow.png", "fast.png"]), &mut layers);

        let fast = importer.complete("fast.png", image(), &mut layers).unwrap();
        let slow = importer.complete("slow.png", image(), &mut layers).unwrap();

        assert_eq!(layers.layers()[0].id(), fast);
        assert_eq!(layers.layers()[1].id(), slow);
    }

    #[test]
    fn test_removed_url_tears_down_layer() {
        let mut importer = ImageImporter::new();
        let mut layers = LayerManager::new();
        importer.sync(&urls(&["a.png", "b.png"]), &mut layers);
        importer.complete("a.png", image(), &mut layers);
        importer.complete("b.png", image(), &mut layers);
        assert_eq!(layers.len(), 2);

        importer.sync(&urls(&["b.png"]), &mut layers);
        assert_eq!(layers.len(), 1);
        assert!(importer.layer_for("a.png").is_none());
        assert!(importer.layer_for("b.png").is_some());
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut importer = ImageImporter::new();
        let mut layers = LayerManager::new();
        importer.sync(&urls(&["a.png"]), &mut layers);

        // URL dropped before the load finished.
        importer.sync(&urls(&[]), &mut layers);
        assert_eq!(importer.complete("a.png", image(), &mut layers), None);
        assert!(layers.is_empty());

        // Completions for never-requested URLs are ignored too.
        assert_eq!(importer.complete("x.png", image(), &mut layers), None);
    }

    #[test]
    fn test_failed_load_is_not_retried() {
        let mut importer = ImageImporter::new();
        let mut layers = LayerManager::new();
        importer.sync(&urls(&["bad.png"]), &mut layers);
        importer.fail("bad.png");
        assert_eq!(importer.pending(), 0);

        let fresh = importer.sync(&urls(&["bad.png"]), &mut layers);
        assert!(fresh.is_empty());

        // Removing and re-adding the URL retries the load.
        importer.sync(&urls(&[]), &mut layers);
        let fresh = importer.sync(&urls(&["bad.png"]), &mut layers);
        assert_eq!(fresh, urls(&["bad.png"]));
    }

    #[test]
    fn test_duplicate_completion_is_ignored() {
        let mut importer = ImageImporter::new();
        let mut layers = LayerManager::new();
        importer.sync(&urls(&["a.png"]), &mut layers);

        importer.complete("a.png", image(), &mut layers);
        assert_eq!(importer.complete("a.png", image(), &mut layers), None);
        assert_eq!(layers.len(), 1);
    }
}

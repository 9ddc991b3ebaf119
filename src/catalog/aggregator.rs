use futures::future::join_all;
use log::{debug, info};

use super::Track;
use super::provider::CatalogProvider;

/// Merges catalog adapters' outputs into one ordered playlist.
///
/// The adapter list order is the priority order: the first adapter's tracks
/// always precede the second's, both for trending and for search results.
pub struct Aggregator {
    providers: Vec<Box<dyn CatalogProvider>>,
    trending: Vec<Track>,
}

impl Aggregator {
    pub fn new(providers: Vec<Box<dyn CatalogProvider>>) -> Self {
        Self {
            providers,
            trending: Vec::new(),
        }
    }

    /// Fetch every adapter's trending list concurrently and concatenate in
    /// priority order, so total latency is the slowest adapter, not the sum.
    /// The merged list is kept as the fallback corpus for [`search`].
    ///
    /// [`search`]: Aggregator::search
    pub async fn aggregate_trending(&mut self) -> Vec<Track> {
        let fetches = self
            .providers
            .iter()
            .map(|p| async move { (p.name(), p.fetch_trending().await) });
        let mut merged: Vec<Track> = Vec::new();
        for (name, tracks) in join_all(fetches).await {
            debug!("{name}: {} trending tracks", tracks.len());
            merged.extend(tracks);
        }
        info!("aggregated {} trending tracks", merged.len());
        self.trending = merged.clone();
        merged
    }

    /// Fan `query` out to every adapter concurrently. When every catalog
    /// comes back empty (unreachable providers included), fall back to a
    /// case-insensitive substring filter over the trending playlist, so a
    /// transient provider failure never hides a local match. An empty result
    /// is a valid outcome, not an error.
    pub async fn search(&self, query: &str) -> Vec<Track> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let searches = self.providers.iter().map(|p| p.search(query));
        let merged: Vec<Track> = join_all(searches).await.into_iter().flatten().collect();
        if !merged.is_empty() {
            return merged;
        }

        debug!("no remote results for {query:?}, filtering trending locally");
        let needle = query.to_lowercase();
        self.trending
            .iter()
            .filter(|t| t.title.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// The trending playlist from the last [`aggregate_trending`] call.
    ///
    /// [`aggregate_trending`]: Aggregator::aggregate_trending
    pub fn trending(&self) -> &[Track] {
        &self.trending
    }
}

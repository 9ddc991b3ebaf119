use futures::future::BoxFuture;

use super::Track;

/// A remote catalog normalized to the common [`Track`] shape.
///
/// Both calls are total from the aggregator's point of view: adapters absorb
/// their own network and parse failures, log them and degrade to an empty
/// list, so one unreachable catalog never blocks playback or search.
pub trait CatalogProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn fetch_trending(&self) -> BoxFuture<'_, Vec<Track>>;

    /// Blank queries resolve to an empty list without a network call.
    fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Vec<Track>>;
}

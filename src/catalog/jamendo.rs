use futures::FutureExt;
use futures::future::BoxFuture;
use log::warn;
use serde::Deserialize;

use super::Track;
use super::provider::CatalogProvider;

/// Jamendo catalog adapter.
///
/// Requires a client id; an empty id disables the adapter (empty results,
/// no request ever leaves the process).
pub struct Jamendo {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    trending_limit: u32,
    search_limit: u32,
}

#[derive(Deserialize)]
struct TrackListing {
    results: Option<Vec<JamendoTrack>>,
}

#[derive(Deserialize)]
struct JamendoTrack {
    name: Option<String>,
    artist_name: Option<String>,
    audio: Option<String>,
}

impl Jamendo {
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        client_id: String,
        trending_limit: u32,
        search_limit: u32,
    ) -> Self {
        Self {
            http,
            base_url,
            client_id,
            trending_limit,
            search_limit,
        }
    }

    async fn trending(&self) -> Vec<Track> {
        let limit = self.trending_limit.to_string();
        self.query_tracks(&[("limit", limit.as_str())]).await
    }

    async fn run_search(&self, query: &str) -> Vec<Track> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let limit = self.search_limit.to_string();
        self.query_tracks(&[("limit", limit.as_str()), ("search", query)])
            .await
    }

    async fn query_tracks(&self, params: &[(&str, &str)]) -> Vec<Track> {
        if self.client_id.is_empty() {
            return Vec::new();
        }
        match self.fetch(params).await {
            Ok(listing) => listing
                .results
                .unwrap_or_default()
                .into_iter()
                // Tracks without an audio URL are not playable; drop them here.
                .filter_map(|t| {
                    let url = t.audio?;
                    Some(Track::titled(t.artist_name.as_deref(), t.name.as_deref(), url))
                })
                .collect(),
            Err(e) => {
                warn!("jamendo: fetch failed: {e}");
                Vec::new()
            }
        }
    }

    async fn fetch(&self, params: &[(&str, &str)]) -> Result<TrackListing, reqwest::Error> {
        self.http
            .get(format!("{}/tracks/", self.base_url))
            .query(&[
                ("client_id", self.client_id.as_str()),
                ("format", "json"),
                ("audioformat", "mp31"),
            ])
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

impl CatalogProvider for Jamendo {
    fn name(&self) -> &'static str {
        "jamendo"
    }

    fn fetch_trending(&self) -> BoxFuture<'_, Vec<Track>> {
        self.trending().boxed()
    }

    fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Vec<Track>> {
        self.run_search(query).boxed()
    }
}

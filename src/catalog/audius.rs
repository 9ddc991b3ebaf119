use futures::FutureExt;
use futures::future::BoxFuture;
use log::{debug, warn};
use serde::Deserialize;
use tokio::sync::OnceCell;

use super::Track;
use super::provider::CatalogProvider;

/// Audius catalog adapter.
///
/// Audius is served by a rotating set of discovery hosts; the first host
/// published by the public directory is resolved once and cached for the
/// process lifetime. A failed resolution disables the adapter (empty
/// results) without affecting the other catalogs.
pub struct Audius {
    http: reqwest::Client,
    directory_url: String,
    app_name: String,
    trending_limit: usize,
    host: OnceCell<Option<String>>,
}

#[derive(Deserialize)]
struct HostDirectory {
    data: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct TrackListing {
    data: Option<Vec<AudiusTrack>>,
}

#[derive(Deserialize)]
struct AudiusTrack {
    id: String,
    title: Option<String>,
    user: Option<AudiusUser>,
}

#[derive(Deserialize)]
struct AudiusUser {
    name: Option<String>,
}

impl Audius {
    pub fn new(
        http: reqwest::Client,
        directory_url: String,
        app_name: String,
        trending_limit: usize,
    ) -> Self {
        Self {
            http,
            directory_url,
            app_name,
            trending_limit,
            host: OnceCell::new(),
        }
    }

    async fn host(&self) -> Option<String> {
        self.host
            .get_or_init(|| self.resolve_host())
            .await
            .clone()
    }

    async fn resolve_host(&self) -> Option<String> {
        match self.try_resolve_host().await {
            Ok(Some(host)) => {
                debug!("audius: serving host {host}");
                Some(host)
            }
            Ok(None) => {
                warn!("audius: directory returned no hosts");
                None
            }
            Err(e) => {
                warn!("audius: host discovery failed: {e}");
                None
            }
        }
    }

    async fn try_resolve_host(&self) -> Result<Option<String>, reqwest::Error> {
        let directory: HostDirectory = self
            .http
            .get(&self.directory_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(directory.data.unwrap_or_default().into_iter().next())
    }

    fn map_tracks(&self, host: &str, listing: TrackListing) -> Vec<Track> {
        listing
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|t| {
                let artist = t.user.as_ref().and_then(|u| u.name.as_deref());
                let url = format!(
                    "{host}/v1/tracks/{}/stream?app_name={}",
                    t.id, self.app_name
                );
                Track::titled(artist, t.title.as_deref(), url)
            })
            .collect()
    }

    async fn trending(&self) -> Vec<Track> {
        let Some(host) = self.host().await else {
            return Vec::new();
        };
        match self.fetch(&host, "/v1/tracks/trending", &[]).await {
            // The trending endpoint has no limit parameter; cut client-side.
            Ok(listing) => {
                let mut tracks = self.map_tracks(&host, listing);
                tracks.truncate(self.trending_limit);
                tracks
            }
            Err(e) => {
                warn!("audius: trending fetch failed: {e}");
                Vec::new()
            }
        }
    }

    async fn run_search(&self, query: &str) -> Vec<Track> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let Some(host) = self.host().await else {
            return Vec::new();
        };
        match self.fetch(&host, "/v1/tracks/search", &[("q", query)]).await {
            Ok(listing) => self.map_tracks(&host, listing),
            Err(e) => {
                warn!("audius: search failed: {e}");
                Vec::new()
            }
        }
    }

    async fn fetch(
        &self,
        host: &str,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<TrackListing, reqwest::Error> {
        self.http
            .get(format!("{host}{path}"))
            .query(&[("app_name", self.app_name.as_str())])
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

impl CatalogProvider for Audius {
    fn name(&self) -> &'static str {
        "audius"
    }

    fn fetch_trending(&self) -> BoxFuture<'_, Vec<Track>> {
        self.trending().boxed()
    }

    fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Vec<Track>> {
        self.run_search(query).boxed()
    }
}

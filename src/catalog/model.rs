/// One playable track as produced by a catalog adapter. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Conventionally `"Artist - Title"`.
    pub title: String,
    /// Streamable audio resource.
    pub url: String,
}

impl Track {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }

    /// Build a track from optional artist/name fields, filling the gaps the
    /// way the catalogs' sparse responses require.
    pub fn titled(artist: Option<&str>, name: Option<&str>, url: String) -> Self {
        let artist = artist.filter(|s| !s.trim().is_empty()).unwrap_or("Unknown Artist");
        let name = name.filter(|s| !s.trim().is_empty()).unwrap_or("Unknown Title");
        Self::new(format!("{artist} - {name}"), url)
    }

    /// Split the conventional title into artist and name for display.
    pub fn artist_and_name(&self) -> (&str, &str) {
        match self.title.split_once(" - ") {
            Some((artist, name)) => (artist, name),
            None => ("Unknown Artist", self.title.as_str()),
        }
    }
}

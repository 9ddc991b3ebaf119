use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/vivace/config.toml` or `~/.config/vivace/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `VIVACE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub providers: ProviderSettings,
    pub playback: PlaybackSettings,
    pub visualizer: VisualizerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            providers: ProviderSettings::default(),
            playback: PlaybackSettings::default(),
            visualizer: VisualizerSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// App name reported to the Audius API.
    pub app_name: String,
    /// Directory endpoint listing the live Audius API hosts.
    pub audius_directory: String,
    /// Jamendo API root.
    pub jamendo_base_url: String,
    /// Jamendo client id; leave empty to disable the Jamendo source.
    pub jamendo_client_id: String,
    /// Tracks requested per source for the startup playlist.
    pub trending_limit: u32,
    /// Tracks requested per source per search.
    pub search_limit: u32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            app_name: "vivace".to_string(),
            audius_directory: "https://api.audius.co".to_string(),
            jamendo_base_url: "https://api.jamendo.com/v3.0".to_string(),
            jamendo_client_id: String::new(),
            trending_limit: 10,
            search_limit: 25,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether random track selection starts enabled.
    pub random: bool,
    /// Whether tracks chain automatically at end-of-track.
    pub autoplay: bool,
    /// Initial output volume, `0.0..=1.0`.
    pub volume: f32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            random: false,
            autoplay: false,
            volume: 0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisualizerSettings {
    /// FFT window size; must be a power of two, at least 64.
    pub fft_size: usize,
    /// Bars rendered on wide terminals.
    pub bars_wide: usize,
    /// Bars rendered on narrow terminals.
    pub bars_narrow: usize,
    /// Column threshold below which the narrow bar count applies.
    pub narrow_below_cols: u16,
}

impl Default for VisualizerSettings {
    fn default() -> Self {
        Self {
            fft_size: 512,
            bars_wide: 50,
            bars_narrow: 25,
            narrow_below_cols: 62,
        }
    }
}

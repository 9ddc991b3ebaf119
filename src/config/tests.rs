use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_vivace_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("VIVACE_CONFIG_PATH", "/tmp/vivace-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/vivace-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("vivace")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("vivace")
            .join("config.toml")
    );
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[providers]
app_name = "testapp"
jamendo_client_id = "abc123"
trending_limit = 4
search_limit = 7

[playback]
random = true
autoplay = true
volume = 0.8

[visualizer]
fft_size = 1024
bars_wide = 40
bars_narrow = 20
narrow_below_cols = 50
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("VIVACE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("VIVACE__PLAYBACK__VOLUME");

    let s = Settings::load().unwrap();
    assert_eq!(s.providers.app_name, "testapp");
    assert_eq!(s.providers.jamendo_client_id, "abc123");
    assert_eq!(s.providers.trending_limit, 4);
    assert_eq!(s.providers.search_limit, 7);
    // Sections the file does not touch keep their struct defaults.
    assert_eq!(s.providers.audius_directory, "https://api.audius.co");
    assert!(s.playback.random);
    assert!(s.playback.autoplay);
    assert_eq!(s.playback.volume, 0.8);
    assert_eq!(s.visualizer.fft_size, 1024);
    assert_eq!(s.visualizer.bars_wide, 40);
    assert_eq!(s.visualizer.bars_narrow, 20);
    assert_eq!(s.visualizer.narrow_below_cols, 50);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
volume = 0.3
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("VIVACE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("VIVACE__PLAYBACK__VOLUME", "0.9");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.volume, 0.9);
}

#[test]
fn validate_rejects_bad_fft_and_volume() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.visualizer.fft_size = 500;
    assert!(s.validate().is_err());
    s.visualizer.fft_size = 32;
    assert!(s.validate().is_err());
    s.visualizer.fft_size = 256;
    assert!(s.validate().is_ok());

    s.playback.volume = 1.5;
    assert!(s.validate().is_err());
}

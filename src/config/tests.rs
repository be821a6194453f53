use super::load::{default_config_path, default_log_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
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
fn resolve_config_path_prefers_streamsic_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("STREAMSIC_CONFIG_PATH", "/tmp/streamsic-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/streamsic-test-config.toml")
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
            .join("streamsic")
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
            .join("streamsic")
            .join("config.toml")
    );
}

#[test]
fn default_log_path_falls_back_to_local_state() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_STATE_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_log_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/state")
            .join("streamsic")
            .join("streamsic.log")
    );
}

#[test]
fn defaults_accept_flac_and_wav_only() {
    let s = Settings::default();
    assert_eq!(s.ingest.extensions, vec!["flac".to_string(), "wav".to_string()]);
    assert_eq!(s.ingest.assumed_bit_depth, 24);
    assert!(!s.ingest.keep_unplayable);
    assert!(s.validate().is_ok());
}

#[test]
fn validate_rejects_out_of_range_volume_and_empty_extensions() {
    let mut s = Settings::default();
    s.audio.volume = 1.5;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.audio.volume_step = 0.0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.ingest.extensions = vec![" ".into(), ".".into()];
    assert!(s.validate().is_err());
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
volume = 0.5
volume_step = 0.1
quit_fade_out_ms = 0

[controls]
scrub_seconds = 9

[ui]
header_text = "hello"
row_fields = ["artist", "title", "quality"]
row_separator = " | "
start_page = "your-library"

[ingest]
extensions = ["flac"]
assumed_bit_depth = 16
keep_unplayable = true
recursive = false
include_hidden = true
follow_links = false

[logging]
level = "streamsic=debug"
file = "/tmp/streamsic.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("STREAMSIC_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("STREAMSIC__AUDIO__VOLUME");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.volume, 0.5);
    assert_eq!(s.audio.volume_step, 0.1);
    assert_eq!(s.audio.quit_fade_out_ms, 0);
    assert_eq!(s.controls.scrub_seconds, 9);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(
        s.ui.row_fields,
        vec![SongField::Artist, SongField::Title, SongField::Quality]
    );
    assert_eq!(s.ui.row_separator, " | ");
    assert_eq!(s.ui.start_page, StartPage::Library);
    assert_eq!(s.ingest.extensions, vec!["flac".to_string()]);
    assert_eq!(s.ingest.assumed_bit_depth, 16);
    assert!(s.ingest.keep_unplayable);
    assert!(!s.ingest.recursive);
    assert!(s.ingest.include_hidden);
    assert!(!s.ingest.follow_links);
    assert_eq!(s.logging.level, "streamsic=debug");
    assert_eq!(
        s.logging.file,
        Some(std::path::PathBuf::from("/tmp/streamsic.log"))
    );
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[controls]
scrub_seconds = 30
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("STREAMSIC_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("STREAMSIC__CONTROLS__SCRUB_SECONDS", "2");

    let s = Settings::load().unwrap();
    assert_eq!(s.controls.scrub_seconds, 2);
}

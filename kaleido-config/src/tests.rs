use super::*;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use toml::Value;

static TEST_MUTEX: Mutex<()> = Mutex::new(());
static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

#[test]
fn config_default_targets_dall_e_3() {
    let config = Config::default();
    assert_eq!(config.model, DEFAULT_MODEL);
    assert_eq!(config.file_name_prefix, DEFAULT_FILE_NAME_PREFIX);
    assert!(config.default_flags.is_empty());
}

#[test]
fn load_or_init_creates_file_with_defaults() {
    with_isolated_home(|home| {
        let outcome = load_or_init().expect("load default config");
        assert!(outcome.created);
        assert!(!outcome.backfilled);
        assert_eq!(outcome.config, Config::default());
        assert_eq!(outcome.path, home.join(".kaleido").join("config.toml"));

        let contents = fs::read_to_string(outcome.path).expect("read config");
        let parsed: toml::Table = toml::from_str(&contents).expect("config is valid TOML");
        assert_eq!(
            parsed.get("model").and_then(Value::as_str),
            Some(DEFAULT_MODEL)
        );
        assert_eq!(
            parsed.get("file_name_prefix").and_then(Value::as_str),
            Some(DEFAULT_FILE_NAME_PREFIX)
        );
        assert_eq!(parsed.get("default_flags").and_then(Value::as_str), Some(""));
    });
}

#[test]
fn load_or_init_reads_existing_file() {
    with_isolated_home(|home| {
        let path = write_config(
            home,
            r#"
model = "dall-e-3-preview"
file_name_prefix = "shrine"
default_flags = "-quality hd"
"#,
        );

        let outcome = load_or_init().expect("load existing config");
        assert!(!outcome.created);
        assert!(!outcome.backfilled);
        assert_eq!(outcome.path, path);
        assert_eq!(outcome.config.model, "dall-e-3-preview");
        assert_eq!(outcome.config.file_name_prefix, "shrine");
        assert_eq!(outcome.config.default_flags, "-quality hd");
    });
}

#[test]
fn load_or_init_backfills_missing_keys() {
    with_isolated_home(|home| {
        let path = write_config(home, "default_flags = \"-style natural\"\n");

        let outcome = load_or_init().expect("load partial config");
        assert!(outcome.backfilled);
        assert_eq!(outcome.config.default_flags, "-style natural");
        assert_eq!(outcome.config.model, DEFAULT_MODEL);

        let contents = fs::read_to_string(&path).expect("read config");
        assert!(contents.contains(&format!("model = \"{DEFAULT_MODEL}\"")));
        assert!(contents.contains(&format!(
            "file_name_prefix = \"{DEFAULT_FILE_NAME_PREFIX}\""
        )));
        assert!(contents.contains("default_flags = \"-style natural\""));
    });
}

#[test]
fn load_or_init_rejects_invalid_toml() {
    with_isolated_home(|home| {
        write_config(home, "model = [unterminated");
        let error = load_or_init().expect_err("invalid config");
        assert!(matches!(error, ConfigError::Deserialize(_)));
    });
}

#[test]
fn save_round_trips_through_load() {
    with_isolated_home(|_| {
        let outcome = load_or_init().expect("load default config");
        let mut config = outcome.config;
        config.default_flags = "-size portrait".to_string();
        save(&config, &outcome.path).expect("save config");

        let reloaded = load_or_init().expect("reload config");
        assert_eq!(reloaded.config, config);
    });
}

fn write_config(home: &Path, contents: &str) -> PathBuf {
    let config_dir = home.join(".kaleido");
    fs::create_dir_all(&config_dir).expect("create config dir");
    let path = config_dir.join("config.toml");
    fs::write(&path, contents).expect("write config");
    path
}

fn with_isolated_home<F>(func: F)
where
    F: FnOnce(&Path),
{
    let _guard = TEST_MUTEX.lock().unwrap();
    let temp_home = create_unique_home();
    let snapshot = EnvSnapshot::capture();
    set_home_env(&temp_home);

    func(&temp_home);

    snapshot.restore();
    let _ = fs::remove_dir_all(&temp_home);
}

fn create_unique_home() -> PathBuf {
    let id = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!(
        "kaleido-config-test-home-{}-{}",
        std::process::id(),
        id
    ));
    fs::create_dir_all(&path).expect("create unique test home");
    path
}

fn set_home_env(path: &Path) {
    set_env("HOME", path.as_os_str());
    set_env("USERPROFILE", path.as_os_str());
}

struct EnvSnapshot {
    home: Option<OsString>,
    userprofile: Option<OsString>,
}

impl EnvSnapshot {
    fn capture() -> Self {
        Self {
            home: std::env::var_os("HOME"),
            userprofile: std::env::var_os("USERPROFILE"),
        }
    }

    fn restore(self) {
        if let Some(value) = self.home {
            set_env("HOME", &value);
        } else {
            remove_env("HOME");
        }

        if let Some(value) = self.userprofile {
            set_env("USERPROFILE", &value);
        } else {
            remove_env("USERPROFILE");
        }
    }
}

fn set_env(key: &str, value: &OsStr) {
    // SAFETY: tests touching the environment hold TEST_MUTEX, and keys and
    // values never contain interior null bytes.
    unsafe { std::env::set_var(key, value) };
}

fn remove_env(key: &str) {
    unsafe { std::env::remove_var(key) };
}

use port_finder::{
    app::{App, AppConfig},
    cli::{Command, RunOptions},
    config::{Config, DisplayKind},
};
use std::{
    env, fs,
    path::Path,
    process::Command as Process,
    sync::{Mutex, OnceLock},
};
use tempfile::TempDir;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn with_temp_home<F: FnOnce(&Path)>(f: F) {
    let _guard = ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let original_home = env::var_os("HOME");
    let home = TempDir::new().expect("failed to create temp HOME");
    env::set_var("HOME", home.path());
    f(home.path());
    match original_home {
        Some(val) => env::set_var("HOME", val),
        None => env::remove_var("HOME"),
    }
}

fn write_config(home: &Path, contents: &str) {
    let cfg_dir = home.join(".port_finder");
    fs::create_dir_all(&cfg_dir).expect("failed to create config dir");
    fs::write(cfg_dir.join("config.toml"), contents).expect("failed to write config");
}

fn binary() -> Process {
    Process::new(env!("CARGO_BIN_EXE_port-finder"))
}

#[test]
fn help_and_version_exit_cleanly() {
    let out = binary().arg("--help").output().unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("--interface"));

    let out = binary().arg("-V").output().unwrap();
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout).trim(),
        env!("CARGO_PKG_VERSION")
    );
}

#[test]
fn bad_flag_exits_with_error() {
    let out = binary().arg("--frobnicate").output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("error: invalid arguments"));
}

#[test]
fn invalid_config_file_aborts_startup() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "tick_ms = 1\n").unwrap();
    let out = binary()
        .args(["run", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("tick_ms"));
}

#[test]
fn home_config_is_created_and_cli_wins() {
    with_temp_home(|home| {
        let args = vec!["--interface".to_string(), "usb0".to_string()];
        let opts = match Command::parse(&args).unwrap() {
            Command::Run(opts) => opts,
            other => panic!("unexpected command {other:?}"),
        };
        let app = App::from_options(opts).unwrap();
        assert_eq!(app.config().interface, "usb0");
        assert!(home.join(".port_finder").join("config.toml").exists());
    });
}

#[test]
fn home_config_values_are_used() {
    with_temp_home(|home| {
        write_config(
            home,
            "interface = \"eth2\"\ndisplay = \"framebuffer\"\nframebuffer_path = \"/tmp/pf-fb\"\n",
        );
        let app = App::from_options(RunOptions::default()).unwrap();
        assert_eq!(app.config().interface, "eth2");
        assert_eq!(app.config().display, DisplayKind::Framebuffer);
        assert_eq!(app.config().framebuffer_path, "/tmp/pf-fb");
    });
}

#[test]
fn home_config_with_unknown_key_is_rejected() {
    with_temp_home(|home| {
        write_config(home, "device = \"/dev/ttyUSB0\"\n");
        let err = App::from_options(RunOptions::default())
            .err()
            .expect("unknown key should be rejected");
        assert!(format!("{err}").contains("unknown field"));
    });
}

#[test]
fn dev_flag_survives_merge() {
    let opts = RunOptions {
        dev_mode: true,
        ..RunOptions::default()
    };
    let cfg = AppConfig::from_sources(Config::default(), opts).unwrap();
    assert!(cfg.loop_settings().dev_mode);
}

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const INVITE: &str = "https://gemelo.org/j/yv7K_sr-yvO";
const OTHER_INVITE: &str = "https://gemelo.org/j/AAAAAAAAAAB";

struct Host {
    _root: TempDir,
    config_dir: std::path::PathBuf,
    data_dir: std::path::PathBuf,
}

impl Host {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let config_dir = root.path().join("config");
        let data_dir = root.path().join("data");
        fs::create_dir_all(&config_dir).unwrap();
        fs::create_dir_all(&data_dir).unwrap();
        fs::write(
            config_dir.join("gemelo.toml"),
            "version = 1\n\n[replay]\nevent_interval = 0\n",
        )
        .unwrap();
        Self {
            _root: root,
            config_dir,
            data_dir,
        }
    }

    fn gemelo(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_gemelo"))
            .env("GEMELO_CONFIG_DIR", &self.config_dir)
            .env("GEMELO_DATA_DIR", &self.data_dir)
            .env_remove("GEMELO_PLAYER_NAME")
            .env("RUST_LOG", "warn")
            .args(args)
            .output()
            .expect("failed to run gemelo")
    }

    fn state(&self) -> String {
        fs::read_to_string(self.config_dir.join("state.toml")).unwrap()
    }

    fn write_script(&self, name: &str, body: &str) -> std::path::PathBuf {
        let path = self.data_dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "gemelo failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn script_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn invite_then_tap_is_saved() {
    let host = Host::new();
    let tap = host.write_script(
        "tap.jsonl",
        "{\"phase\":\"down\",\"id\":0,\"x\":10,\"y\":20}\n{\"phase\":\"up\",\"id\":0}\n",
    );

    let out = stdout(&host.gemelo(&[
        "run",
        "--invite",
        INVITE,
        "--script",
        script_arg(&tap),
        "--name",
        "Klara",
    ]));
    assert!(out.contains("person_id=cafecafecafecafe,invite_visible=n"), "{out}");

    let state = host.state();
    assert!(state.contains(INVITE), "{state}");
    assert!(state.contains("Klara"), "{state}");
}

#[test]
fn redelivered_invite_keeps_the_snapshot() {
    let host = Host::new();
    let tap = host.write_script("tap.jsonl", "{\"phase\":\"down\"}\n{\"phase\":\"up\"}\n");

    stdout(&host.gemelo(&["run", "--invite", INVITE, "--script", script_arg(&tap)]));

    let again = stdout(&host.gemelo(&["run", "--invite", INVITE]));
    assert!(
        again.contains("person_id=cafecafecafecafe,invite_visible=n"),
        "{again}"
    );

    let fresh = stdout(&host.gemelo(&["run", "--invite", OTHER_INVITE]));
    assert!(
        fresh.contains("person_id=0000000000000001,invite_visible=y"),
        "{fresh}"
    );
    assert!(host.state().contains(OTHER_INVITE));
}

#[test]
fn state_show_and_clear() {
    let host = Host::new();
    stdout(&host.gemelo(&["run", "--invite", INVITE, "--size", "100x200"]));

    let shown = stdout(&host.gemelo(&["state", "show"]));
    assert!(shown.contains("cafecafecafecafe"), "{shown}");
    assert!(shown.contains(INVITE), "{shown}");

    let cleared = stdout(&host.gemelo(&["state", "clear"]));
    assert!(cleared.contains("Removed"), "{cleared}");
    assert!(!host.config_dir.join("state.toml").exists());

    let empty = stdout(&host.gemelo(&["state", "show"]));
    assert!(empty.contains("Session snapshot: (none)"), "{empty}");
}

#[test]
fn where_reports_overridden_directories() {
    let host = Host::new();
    let out = stdout(&host.gemelo(&["where"]));
    assert!(out.contains(&host.config_dir.display().to_string()), "{out}");
    assert!(out.contains(&host.data_dir.display().to_string()), "{out}");
    assert!(out.contains("state.toml"), "{out}");
}

#[test]
fn invalid_config_is_rejected() {
    let host = Host::new();
    fs::write(host.config_dir.join("gemelo.toml"), "version = 7\n").unwrap();
    let output = host.gemelo(&["run"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported config version 7"), "{stderr}");
    assert!(!host.config_dir.join("state.toml").exists());
}

#[test]
fn malformed_script_fails_before_touching_state() {
    let host = Host::new();
    let bad = host.write_script("bad.jsonl", "{\"phase\":\"wiggle\"}\n");
    let output = host.gemelo(&["run", "--script", script_arg(&bad)]);
    assert!(!output.status.success());
    assert!(!host.config_dir.join("state.toml").exists());
}

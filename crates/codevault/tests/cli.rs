// SPDX-FileCopyrightText: 2026 Codevault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests driving the `codevault` binary.
//!
//! Passwords are supplied through the environment; stdin is never a TTY here.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    config: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("codevault.toml");
        std::fs::write(
            &config,
            format!(
                r#"
[vault]
directory = "{}"
salt = "AAECAwQFBgcICQoLDA0ODw=="

[kdf]
time_cost = 2
memory_cost = 32768
parallelism = 1

[logging]
level = "warn"
"#,
                dir.path().join("keyvault").display()
            ),
        )
        .unwrap();
        Self { dir, config }
    }

    fn vault_dir(&self) -> PathBuf {
        self.dir.path().join("keyvault")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_codevault"));
        cmd.arg("--config")
            .arg(&self.config)
            .args(args)
            .env_remove("CODEVAULT_PASSWORD")
            .env_remove("CODEVAULT_PASSWORD_1")
            .env_remove("CODEVAULT_PASSWORD_2")
            .env_remove("CODEVAULT_PASSWORD_3")
            .env_remove("RUST_LOG")
            .stdin(Stdio::null());
        cmd
    }

    fn init(&self, passwords: [&str; 3]) -> Output {
        self.command(&["init"])
            .env("CODEVAULT_PASSWORD_1", passwords[0])
            .env("CODEVAULT_PASSWORD_2", passwords[1])
            .env("CODEVAULT_PASSWORD_3", passwords[2])
            .output()
            .unwrap()
    }

    fn seal(&self, password: &str, input: &[u8]) -> Output {
        let mut child = self
            .command(&["seal"])
            .env("CODEVAULT_PASSWORD", password)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        child.stdin.take().unwrap().write_all(input).unwrap();
        child.wait_with_output().unwrap()
    }

    fn open(&self, password: &str, token: &str) -> Output {
        self.command(&["open", token])
            .env("CODEVAULT_PASSWORD", password)
            .output()
            .unwrap()
    }
}

fn share_count(dir: &Path) -> usize {
    (0..3)
        .filter(|i| dir.join(format!("master_key_{i}.enc")).is_file())
        .count()
}

#[test]
fn init_seal_open_roundtrip() {
    let fx = Fixture::new();

    let init = fx.init(["p1", "p2", "p3"]);
    assert!(init.status.success(), "init failed: {init:?}");
    assert_eq!(share_count(&fx.vault_dir()), 3);

    let sealed = fx.seal("p2", b"ABCD-EFGH\n");
    assert!(sealed.status.success(), "seal failed: {sealed:?}");
    let token = String::from_utf8(sealed.stdout).unwrap().trim().to_string();

    let opened = fx.open("p3", &token);
    assert!(opened.status.success(), "open failed: {opened:?}");
    assert_eq!(opened.stdout, b"ABCD-EFGH");
}

#[test]
fn wrong_password_fails_unlock() {
    let fx = Fixture::new();
    assert!(fx.init(["a1", "b2", "c3"]).status.success());

    let out = fx
        .command(&["unlock"])
        .env("CODEVAULT_PASSWORD", "nope")
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("wrong password or corrupted data"), "{stderr}");
}

#[test]
fn second_init_is_refused() {
    let fx = Fixture::new();
    assert!(fx.init(["a1", "b2", "c3"]).status.success());

    let again = fx.init(["d4", "e5", "f6"]);
    assert!(!again.status.success());
    assert!(String::from_utf8_lossy(&again.stderr).contains("already initialized"));
}

#[test]
fn rotate_keeps_tokens_readable() {
    let fx = Fixture::new();
    assert!(fx.init(["a1", "b2", "c3"]).status.success());
    let sealed = fx.seal("a1", b"recovery-code");
    let token = String::from_utf8(sealed.stdout).unwrap().trim().to_string();

    let rotate = fx
        .command(&["rotate"])
        .env("CODEVAULT_PASSWORD", "b2")
        .env("CODEVAULT_PASSWORD_1", "x7")
        .env("CODEVAULT_PASSWORD_2", "y8")
        .env("CODEVAULT_PASSWORD_3", "z9")
        .output()
        .unwrap();
    assert!(rotate.status.success(), "rotate failed: {rotate:?}");

    assert!(!fx.open("a1", &token).status.success());
    let opened = fx.open("z9", &token);
    assert!(opened.status.success());
    assert_eq!(opened.stdout, b"recovery-code");
}

#[test]
fn status_reports_state_as_json() {
    let fx = Fixture::new();

    let before = fx.command(&["status", "--json"]).output().unwrap();
    assert!(before.status.success());
    let json: serde_json::Value = serde_json::from_slice(&before.stdout).unwrap();
    assert_eq!(json["state"], "uninitialized");

    assert!(fx.init(["a1", "b2", "c3"]).status.success());
    let after = fx.command(&["status", "--json"]).output().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&after.stdout).unwrap();
    assert_eq!(json["state"], "locked");
    assert_eq!(json["shares_present"], serde_json::json!([0, 1, 2]));
}

#[test]
fn salt_needs_no_config() {
    let out = Command::new(env!("CARGO_BIN_EXE_codevault"))
        .arg("salt")
        .output()
        .unwrap();
    assert!(out.status.success());
    let salt = String::from_utf8(out.stdout).unwrap();
    assert_eq!(salt.trim().len(), 24); // 16 bytes, base64
}

#[test]
fn missing_salt_is_reported_before_anything_runs() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("codevault.toml");
    std::fs::write(&config, "[logging]\nlevel = \"warn\"\n").unwrap();

    let out = Command::new(env!("CARGO_BIN_EXE_codevault"))
        .arg("--config")
        .arg(&config)
        .arg("status")
        .env_remove("CODEVAULT_VAULT_SALT")
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("vault.salt"));
}

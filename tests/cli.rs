use std::path::Path;
use std::sync::OnceLock;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SMALL_PARAMS: [&str; 6] = ["--time-cost", "1", "--mem-cost", "64", "--parallelism", "1"];

/// Empty working directory, so dotenvy finds no `.env` from the checkout.
fn empty_cwd() -> &'static Path {
    static DIR: OnceLock<TempDir> = OnceLock::new();
    DIR.get_or_init(|| tempfile::tempdir().unwrap()).path()
}

fn bin() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("saltkdf"));
    cmd.current_dir(empty_cwd())
        .env_remove("SALTKDF_SALT_KEY")
        .env_remove("SALTKDF_PASSWORD")
        .env_remove("SALTKDF_TIME_COST")
        .env_remove("SALTKDF_MEM_COST")
        .env_remove("SALTKDF_PARALLELISM");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

#[test]
fn salt_is_deterministic_hex() {
    let a = stdout_of(bin().arg("salt").arg("User-ID-123"));
    let b = stdout_of(bin().arg("salt").arg("User-ID-123"));

    assert_eq!(a, b);
    assert_eq!(a.trim().len(), 64);
    assert!(a.trim().chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn salt_key_flag_changes_salt() {
    let default = stdout_of(bin().arg("salt").arg("alice"));
    let custom = stdout_of(
        bin()
            .arg("--salt-key")
            .arg("42".repeat(32))
            .arg("salt")
            .arg("alice"),
    );

    assert_ne!(default, custom);
}

#[test]
fn salt_key_env_matches_flag() {
    let key = "ab".repeat(32);
    let from_flag = stdout_of(bin().arg("--salt-key").arg(&key).arg("salt").arg("bob"));
    let from_env = stdout_of(bin().env("SALTKDF_SALT_KEY", &key).arg("salt").arg("bob"));

    assert_eq!(from_flag, from_env);
}

#[test]
fn embedded_key_fallback_is_warned() {
    bin()
        .arg("salt")
        .arg("carol")
        .assert()
        .success()
        .stderr(predicate::str::contains("embedded default key"));
}

#[test]
fn short_salt_key_fails_validation() {
    bin()
        .arg("--salt-key")
        .arg("abcd")
        .arg("salt")
        .arg("alice")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid salt key"));
}

#[test]
fn empty_seed_fails_validation() {
    bin()
        .arg("salt")
        .arg("")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("salt seed must not be empty"));
}

#[test]
fn derive_is_reproducible() {
    let run = || {
        stdout_of(
            bin()
                .env("SALTKDF_PASSWORD", "your_secure_password")
                .arg("derive")
                .arg("--seed")
                .arg("User-ID-123")
                .args(SMALL_PARAMS),
        )
    };

    let first = run();
    assert!(first.contains("key:"));
    assert_eq!(first, run());
}

#[test]
fn different_passwords_give_different_keys() {
    let derive = |pw: &str| {
        stdout_of(
            bin()
                .env("SALTKDF_PASSWORD", pw)
                .arg("derive")
                .arg("--seed")
                .arg("alice")
                .args(SMALL_PARAMS),
        )
    };

    assert_ne!(derive("pw1"), derive("pw2"));
}

#[test]
fn password_can_be_piped() {
    let from_env = stdout_of(
        bin()
            .env("SALTKDF_PASSWORD", "piped")
            .arg("derive")
            .arg("--seed")
            .arg("alice")
            .args(SMALL_PARAMS),
    );
    let from_stdin = stdout_of(
        bin()
            .write_stdin("piped\n")
            .arg("derive")
            .arg("--seed")
            .arg("alice")
            .args(SMALL_PARAMS),
    );

    assert_eq!(from_env, from_stdin);
}

#[test]
fn derive_json_output_parses() {
    let out = stdout_of(
        bin()
            .env("SALTKDF_PASSWORD", "pw")
            .arg("--json")
            .arg("derive")
            .arg("--seed")
            .arg("alice")
            .args(SMALL_PARAMS)
            .arg("--hash-len")
            .arg("64"),
    );

    let json: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
    assert_eq!(json["key"].as_str().unwrap().len(), 128);
    assert_eq!(json["salt"].as_str().unwrap().len(), 64);
    assert_eq!(json["params"]["hash_len"], 64);
    assert!(json.get("seed").is_none());
}

#[test]
fn derive_with_raw_salt_hex() {
    bin()
        .env("SALTKDF_PASSWORD", "pw")
        .arg("derive")
        .arg("--salt-hex")
        .arg("0001020304050607")
        .args(SMALL_PARAMS)
        .assert()
        .success()
        .stdout(predicate::str::contains("salt: 0001020304050607"));
}

#[test]
fn short_raw_salt_fails_validation() {
    bin()
        .env("SALTKDF_PASSWORD", "pw")
        .arg("derive")
        .arg("--salt-hex")
        .arg("0102030405")
        .args(SMALL_PARAMS)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid salt"));
}

#[test]
fn random_seed_is_reported() {
    let out = stdout_of(
        bin()
            .env("SALTKDF_PASSWORD", "pw")
            .arg("derive")
            .arg("--random-seed")
            .args(SMALL_PARAMS),
    );

    assert!(out.contains("seed: "));
}

#[test]
fn derive_requires_a_salt_source() {
    bin()
        .env("SALTKDF_PASSWORD", "pw")
        .arg("derive")
        .args(SMALL_PARAMS)
        .assert()
        .failure();
}

#[test]
fn salt_sources_are_exclusive() {
    bin()
        .env("SALTKDF_PASSWORD", "pw")
        .arg("derive")
        .arg("--seed")
        .arg("alice")
        .arg("--random-seed")
        .assert()
        .failure();
}

#[test]
fn zero_time_cost_fails_validation() {
    bin()
        .env("SALTKDF_PASSWORD", "pw")
        .arg("derive")
        .arg("--seed")
        .arg("alice")
        .arg("--time-cost")
        .arg("0")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("time cost"));
}

#[test]
fn memory_below_lane_floor_fails_validation() {
    bin()
        .env("SALTKDF_PASSWORD", "pw")
        .arg("derive")
        .arg("--seed")
        .arg("alice")
        .arg("--mem-cost")
        .arg("1")
        .arg("--parallelism")
        .arg("8")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("memory cost"));
}

#[test]
fn weak_params_are_warned() {
    bin()
        .env("SALTKDF_PASSWORD", "pw")
        .arg("derive")
        .arg("--seed")
        .arg("alice")
        .args(SMALL_PARAMS)
        .assert()
        .success()
        .stderr(predicate::str::contains("below the recommended floor"));
}

#[test]
fn params_from_env() {
    let from_flags = stdout_of(
        bin()
            .env("SALTKDF_PASSWORD", "pw")
            .arg("derive")
            .arg("--seed")
            .arg("alice")
            .args(SMALL_PARAMS),
    );
    let from_env = stdout_of(
        bin()
            .env("SALTKDF_PASSWORD", "pw")
            .env("SALTKDF_TIME_COST", "1")
            .env("SALTKDF_MEM_COST", "64")
            .env("SALTKDF_PARALLELISM", "1")
            .arg("derive")
            .arg("--seed")
            .arg("alice"),
    );

    assert_eq!(from_flags, from_env);
}

#[test]
fn seed_prints_random_hex() {
    let a = stdout_of(bin().arg("seed"));
    let b = stdout_of(bin().arg("seed"));

    assert_eq!(a.trim().len(), 32);
    assert_ne!(a, b);
}

#[test]
fn params_lists_defaults() {
    bin()
        .arg("params")
        .assert()
        .success()
        .stdout(predicate::str::contains("102400 KiB"))
        .stdout(predicate::str::contains("parallelism:  8"));

    let out = stdout_of(bin().arg("--json").arg("params"));
    let json: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
    assert_eq!(json["default"]["parallelism"], 8);
    assert_eq!(json["recommended_min_mem_cost_kib"], 65536);
}

#[test]
fn dotenv_in_working_directory_supplies_salt_key() {
    let dir = tempfile::tempdir().unwrap();
    let key = "cd".repeat(32);
    std::fs::write(dir.path().join(".env"), format!("SALTKDF_SALT_KEY={key}\n")).unwrap();

    let from_dotenv = stdout_of(bin().current_dir(dir.path()).arg("salt").arg("dave"));
    let from_flag = stdout_of(bin().arg("--salt-key").arg(&key).arg("salt").arg("dave"));

    assert_eq!(from_dotenv, from_flag);
}

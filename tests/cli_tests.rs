//! CLI integration tests.

mod harness;

use harness::TestEnv;
use predicates::prelude::*;

#[test]
fn test_set_then_get_round_trip() {
    let env = TestEnv::new();
    env.cmd()
        .args(["set", "DB_HOST", "db.internal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("set /PJT/ENV/DB_HOST"));

    env.cmd()
        .args(["get", "DB_HOST"])
        .assert()
        .success()
        .stdout("db.internal\n");
}

#[test]
fn test_secret_round_trip_and_sealed_read() {
    let env = TestEnv::new();
    env.cmd()
        .args(["set", "-t", "SecureString", "DB_PASSWORD", "hunter2"])
        .assert()
        .success();

    env.cmd()
        .args(["get", "DB_PASSWORD"])
        .assert()
        .success()
        .stdout("hunter2\n");

    env.cmd()
        .args(["get", "--no-decrypt", "DB_PASSWORD"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BEGIN AGE ENCRYPTED FILE"));
}

#[test]
fn test_get_applies_cast() {
    let env = TestEnv::new();
    env.set("RETRIES", "3", None);
    env.cmd()
        .args(["get", "-t", "int", "RETRIES"])
        .assert()
        .success()
        .stdout("3\n");

    env.set("BAD", "not-a-number", None);
    env.cmd()
        .args(["get", "-t", "int", "BAD"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid integer value"));
}

#[test]
fn test_get_missing_fails_with_search_path() {
    let env = TestEnv::new();
    env.set("PRESENT", "x", None);

    env.cmd()
        .args(["get", "ABSENT"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("parameter not found: ABSENT"))
        .stderr(predicate::str::contains("/All/All/ABSENT"));

    env.cmd()
        .args(["get", "--default", "fallback", "ABSENT"])
        .assert()
        .success()
        .stdout("fallback\n");
}

#[test]
fn test_scope_fallback_across_environments() {
    let env = TestEnv::new();
    // Written under /PJT/All/, read back from the ENV scope.
    let output = env
        .cmd_scoped("PJT", "All")
        .args(["set", "REGION", "eu-west-1"])
        .output()
        .expect("failed to run backstop set");
    assert!(output.status.success());

    env.cmd()
        .args(["get", "--path", "REGION"])
        .assert()
        .success()
        .stdout("/PJT/All/REGION\teu-west-1\n");
}

#[test]
fn test_show_masks_secrets_unless_decrypted() {
    let env = TestEnv::new();
    env.set("PLAIN", "visible", None);
    env.set("SECRET", "hidden", Some("SecureString"));

    env.cmd()
        .args(["show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("visible"))
        .stdout(predicate::str::contains("<encrypted>"))
        .stdout(predicate::str::contains("hidden").not());

    env.cmd()
        .args(["show", "-x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hidden"));
}

#[test]
fn test_delete_is_forgiving_about_missing_keys() {
    let env = TestEnv::new();
    env.set("DOOMED", "x", None);

    env.cmd()
        .args(["delete", "DOOMED"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted /PJT/ENV/DOOMED"));

    env.cmd()
        .args(["delete", "DOOMED"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not found"));

    env.cmd()
        .args(["get", "DOOMED"])
        .assert()
        .failure();
}

#[test]
fn test_path_normalizes_partial_keys() {
    let env = TestEnv::new();
    env.cmd()
        .args(["path", "KEY"])
        .assert()
        .success()
        .stdout("/PJT/ENV/KEY\n");

    env.cmd()
        .args(["path", "staging/KEY"])
        .assert()
        .success()
        .stdout("/PJT/staging/KEY\n");
}

#[test]
fn test_missing_project_fails_with_hint() {
    let env = TestEnv::new();
    let mut cmd = assert_cmd::Command::cargo_bin("backstop").expect("binary");
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("BACKSTOP_PROJECT");
    cmd.env_remove("ENVIRONMENT");
    cmd.current_dir(env.dir.path());
    cmd.args(["show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no config file found"));
}

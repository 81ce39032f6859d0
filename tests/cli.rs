use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn bin(home: &Path, password: &str) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("passguardian"));
    cmd.env("PASSGUARDIAN_PASSWORD", password)
        .env_remove("PASSGUARDIAN_LANG")
        .env_remove("PASSGUARDIAN_HOME")
        .arg("--home")
        .arg(home);
    cmd
}

fn signed_in(home: &Path) {
    bin(home, "pw")
        .args(["signup", "--email", "ana@example.com", "--username", "ana"])
        .assert()
        .success();
    bin(home, "pw")
        .args(["signin", "--email", "ana@example.com"])
        .assert()
        .success();
}

fn add(home: &Path, service: &str, value: &str) -> String {
    let output = bin(home, "pw")
        .args(["add", service, "octocat", value])
        .assert()
        .success()
        .stdout(predicate::str::contains("stored secret"))
        .get_output()
        .stdout
        .clone();

    String::from_utf8(output)
        .unwrap()
        .split_whitespace()
        .last()
        .unwrap()
        .to_string()
}

#[test]
fn signup_signin_and_whoami() {
    let dir = tempdir().unwrap();

    bin(dir.path(), "pw")
        .args(["signup", "--email", "Ana@Example.com", "--username", "ana"])
        .assert()
        .success()
        .stdout(predicate::str::contains("account created for ana@example.com"));

    bin(dir.path(), "pw")
        .args(["signin", "--email", "ana@example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("signed in as ana"));

    bin(dir.path(), "pw")
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("ana <ana@example.com>"));
}

#[test]
fn signin_with_wrong_password_fails() {
    let dir = tempdir().unwrap();
    signed_in(dir.path());

    bin(dir.path(), "wrong_pw")
        .args(["signin", "--email", "ana@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid login credentials"));
}

#[test]
fn add_list_show_roundtrip() {
    let dir = tempdir().unwrap();
    signed_in(dir.path());

    let id = add(dir.path(), "GitHub", "hunter2");

    bin(dir.path(), "pw")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("GitHub"))
        .stdout(predicate::str::contains("1 credentials"))
        .stdout(predicate::str::contains("hunter2").not());

    bin(dir.path(), "pw")
        .args(["show", id.as_str()])
        .assert()
        .success()
        .stdout("hunter2\n");

    let db = std::fs::read_to_string(dir.path().join("passguardian.db")).unwrap();
    assert!(db.contains(&id));
    assert!(!db.contains("hunter2"));
}

#[test]
fn show_with_wrong_password_fails() {
    let dir = tempdir().unwrap();
    signed_in(dir.path());
    let id = add(dir.path(), "GitHub", "hunter2");

    bin(dir.path(), "wrong_pw")
        .args(["show", id.as_str()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("hunter2").not())
        .stderr(predicate::str::contains("decryption failed"));
}

#[test]
fn add_with_wrong_password_is_refused() {
    let dir = tempdir().unwrap();
    signed_in(dir.path());

    bin(dir.path(), "wrong_pw")
        .args(["add", "GitHub", "octocat", "hunter2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("master password does not match"));
}

#[test]
fn add_without_value_generates_one() {
    let dir = tempdir().unwrap();
    signed_in(dir.path());

    bin(dir.path(), "pw")
        .args(["add", "Mail", "me", "--length", "24", "--no-symbols"])
        .assert()
        .success();

    let output = bin(dir.path(), "pw")
        .args(["search", "mail"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let listing = String::from_utf8(output).unwrap();
    let id = listing
        .lines()
        .find(|l| l.contains("Mail"))
        .and_then(|l| l.split_whitespace().next())
        .unwrap()
        .to_string();

    let output = bin(dir.path(), "pw")
        .args(["show", id.as_str()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let generated = String::from_utf8(output).unwrap();
    let generated = generated.trim_end();
    assert_eq!(generated.len(), 24);
    assert!(generated.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn search_filters_by_service() {
    let dir = tempdir().unwrap();
    signed_in(dir.path());
    add(dir.path(), "GitHub", "a");
    add(dir.path(), "Mailbox", "b");

    bin(dir.path(), "pw")
        .args(["search", "git"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GitHub"))
        .stdout(predicate::str::contains("Mailbox").not());
}

#[test]
fn update_replaces_password() {
    let dir = tempdir().unwrap();
    signed_in(dir.path());
    let id = add(dir.path(), "GitHub", "hunter2");

    bin(dir.path(), "pw")
        .args(["update", id.as_str(), "--value", "correct horse", "--notes", "rotated"])
        .assert()
        .success()
        .stdout(predicate::str::contains("updated"));

    bin(dir.path(), "pw")
        .args(["show", id.as_str()])
        .assert()
        .success()
        .stdout("correct horse\n");
}

#[test]
fn delete_hides_secret() {
    let dir = tempdir().unwrap();
    signed_in(dir.path());
    let id = add(dir.path(), "GitHub", "hunter2");

    bin(dir.path(), "pw")
        .args(["delete", id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted"));

    bin(dir.path(), "pw")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("no credentials yet"));

    bin(dir.path(), "pw")
        .args(["show", id.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn vault_commands_require_session() {
    let dir = tempdir().unwrap();

    bin(dir.path(), "pw")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no active session"));

    signed_in(dir.path());
    bin(dir.path(), "pw").arg("signout").assert().success();

    bin(dir.path(), "pw")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no active session"));
    bin(dir.path(), "pw")
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("not signed in"));
}

#[test]
fn generate_digits_only() {
    let dir = tempdir().unwrap();

    let output = bin(dir.path(), "")
        .args(["generate", "--length", "16", "--no-upper", "--no-lower", "--no-symbols"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let password = String::from_utf8(output).unwrap();
    let password = password.trim_end();
    assert_eq!(password.len(), 16);
    assert!(password.chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn generate_with_no_classes_fails() {
    let dir = tempdir().unwrap();

    bin(dir.path(), "")
        .args(["generate", "--no-upper", "--no-lower", "--no-numbers", "--no-symbols"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("character class"));
}

#[test]
fn salt_prints_sixteen_bytes_of_base64() {
    let dir = tempdir().unwrap();

    bin(dir.path(), "")
        .arg("salt")
        .assert()
        .success()
        .stdout(predicate::str::is_match("^[A-Za-z0-9+/]{22}==\n$").unwrap());
}

#[test]
fn spanish_messages() {
    let dir = tempdir().unwrap();
    signed_in(dir.path());

    bin(dir.path(), "pw")
        .args(["--lang", "es", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bóveda vacía"));

    bin(dir.path(), "pw")
        .env("PASSGUARDIAN_LANG", "es")
        .arg("signout")
        .assert()
        .success()
        .stdout(predicate::str::contains("bóveda sellada"));
}

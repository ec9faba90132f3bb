#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::Path;
use std::process::Command as StdCommand;

pub fn new_command_with_temp_home() -> (Command, tempfile::TempDir) {
    let temp_home = tempfile::tempdir().expect("temp home");
    let binary = assert_cmd::cargo::cargo_bin!("twig");
    let mut command = Command::new(binary);
    command.env("HOME", temp_home.path());
    command.env("XDG_CONFIG_HOME", temp_home.path().join(".config"));
    command.env("GIT_CONFIG_NOSYSTEM", "1");
    (command, temp_home)
}

pub fn write_config(home: &Path, raw: &str) {
    let config_dir = home.join(".config").join("twig");
    fs::create_dir_all(&config_dir).expect("create config dir");
    fs::write(config_dir.join("config.toml"), raw).expect("write config");
}

pub fn git(path: &Path, args: &[&str]) -> String {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .expect("spawn git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub fn init_git_repo(path: &Path) {
    fs::create_dir_all(path).expect("create repo dir");
    git(path, &["init", "--initial-branch=main"]);
    git(path, &["config", "user.name", "twig-test"]);
    git(path, &["config", "user.email", "twig-test@example.com"]);
}

pub fn init_git_repo_with_commit(path: &Path) {
    init_git_repo(path);
    commit_file(path, "README.md", "hello\n", "initial");
}

pub fn commit_file(path: &Path, file: &str, contents: &str, message: &str) {
    fs::write(path.join(file), contents).expect("write file");
    git(path, &["add", file]);
    git(path, &["commit", "-m", message]);
}

pub fn branch_exists(path: &Path, branch: &str) -> bool {
    StdCommand::new("git")
        .args(["rev-parse", "--verify", "--quiet"])
        .arg(format!("refs/heads/{branch}"))
        .current_dir(path)
        .output()
        .expect("spawn git")
        .status
        .success()
}

pub fn assert_timestamp_log_names(entries: &[std::fs::DirEntry]) {
    assert!(!entries.is_empty(), "expected at least one diagnostics log");

    for entry in entries {
        let name = entry
            .file_name()
            .into_string()
            .expect("diagnostics filename utf8");
        let stem = name
            .strip_suffix(".log")
            .unwrap_or_else(|| panic!("diagnostics file should end with .log: {name}"));
        assert!(
            !stem.is_empty() && stem.chars().all(|character| character.is_ascii_digit()),
            "diagnostics filename must be <timestamp>.log, got: {name}"
        );
    }
}

//! Integration tests for task commands, projections and access control.
//!
//! These tests verify that:
//! - `tf task add/edit/move/delete/view` work against the saved store
//! - summary, assigned and labels reflect saved tasks
//! - roles from flags and config.toml are enforced
//! - export, backup and completions produce output

mod common;

use common::TestEnv;
use predicates::prelude::*;

fn env_with_task() -> TestEnv {
    let env = TestEnv::new();
    env.tf()
        .args([
            "task",
            "add",
            "To Do",
            "Fix login redirect",
            "--assignee",
            "Sarah Chen",
            "--label",
            "Frontend, bug",
            "--type",
            "bug",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added task"));
    env
}

// === Tasks ===

#[test]
fn test_task_add_and_view() {
    let env = env_with_task();

    env.tf()
        .args(["task", "view", "fix login redirect"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Column:      To Do"))
        .stdout(predicate::str::contains("Type:        Bug"))
        .stdout(predicate::str::contains("Assignee:    Sarah Chen"))
        .stdout(predicate::str::contains("Labels:      bug, frontend"));
}

#[test]
fn test_task_add_to_missing_column() {
    let env = TestEnv::new();

    env.tf()
        .args(["task", "add", "Backlog", "Nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("column not found"));
}

#[test]
fn test_task_move_reports_labels() {
    let env = env_with_task();

    env.tf()
        .args(["task", "move", "Fix login redirect", "In Progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Moved 'Fix login redirect' from To Do to In Progress",
        ));

    env.tf()
        .args(["task", "move", "Fix login redirect", "inprogress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task already in that column"));

    assert!(env.boards_json().contains("\"status\": \"inprogress\""));
}

#[test]
fn test_task_edit_clears_assignee() {
    let env = env_with_task();

    env.tf()
        .args(["task", "edit", "Fix login redirect", "--title", "Fix SSO redirect", "--clear-assignee"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated task"));

    env.tf()
        .args(["task", "view", "Fix SSO redirect"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Assignee:    -"));
}

#[test]
fn test_task_edit_without_changes() {
    let env = env_with_task();

    env.tf()
        .args(["task", "edit", "Fix login redirect"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to update."));
}

#[test]
fn test_task_delete_is_idempotent() {
    let env = env_with_task();

    env.tf()
        .args(["task", "delete", "Fix login redirect"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted task"));

    env.tf()
        .args(["task", "delete", "Fix login redirect"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already deleted"));
}

#[test]
fn test_task_delete_blank_identifier_is_rejected() {
    let env = env_with_task();

    env.tf()
        .args(["task", "delete", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("task identifier cannot be empty"));

    assert!(env.boards_json().contains("Fix login redirect"));
}

// === Projections ===

#[test]
fn test_summary_counts_columns_and_assignees() {
    let env = env_with_task();
    env.tf().args(["task", "add", "done", "Ship it"]).assert().success();

    env.tf()
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Main Board - 2 task(s)"))
        .stdout(predicate::str::contains("Sarah Chen"));
}

#[test]
fn test_assigned_spans_boards() {
    let env = env_with_task();
    env.tf().args(["board", "create", "Ops"]).assert().success();
    env.tf()
        .args(["task", "add", "todo", "Rotate keys", "--assignee", "Sarah Chen"])
        .assert()
        .success();

    env.tf()
        .args(["assigned", "Sarah Chen"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fix login redirect"))
        .stdout(predicate::str::contains("Rotate keys"));

    env.tf()
        .args(["assigned", "Nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks assigned to Nobody"));
}

#[test]
fn test_labels_counts_usage() {
    let env = env_with_task();

    env.tf()
        .arg("labels")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"frontend\s+1").unwrap())
        .stdout(predicate::str::is_match(r"backend\s+0").unwrap());
}

// === Access control ===

#[test]
fn test_viewer_cannot_add_tasks() {
    let env = TestEnv::new();

    env.tf()
        .args(["--role", "viewer", "task", "add", "todo", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("viewer role lacks"));

    env.tf()
        .args(["--role", "viewer", "board", "show"])
        .assert()
        .success();
}

#[test]
fn test_role_from_config_file() {
    let env = TestEnv::new();
    std::fs::write(
        env.data_path().join("config.toml"),
        "[user]\nname = \"Dana\"\nrole = \"user\"\n",
    )
    .unwrap();

    env.tf()
        .args(["board", "create", "Mine"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("user role lacks"));

    env.tf()
        .arg("whoami")
        .env_remove("TRACKFLOW_USER")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dana (Regular User)"));

    env.tf()
        .args(["--role", "manager", "board", "create", "Mine"])
        .assert()
        .success();
}

#[test]
fn test_bad_config_is_reported() {
    let env = TestEnv::new();
    std::fs::write(env.data_path().join("config.toml"), "[user]\nrole = \"owner\"\n").unwrap();

    env.tf()
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config error"));
}

// === Export / backup / completions ===

#[test]
fn test_export_to_stdout() {
    let env = env_with_task();

    env.tf()
        .arg("export")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Main Board\""))
        .stdout(predicate::str::contains("\"title\": \"Fix login redirect\""));
}

#[test]
fn test_manager_cannot_export() {
    let env = env_with_task();

    env.tf()
        .args(["--role", "manager", "export"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("export:data"));
}

#[test]
fn test_backup_copies_store() {
    let env = env_with_task();

    env.tf()
        .arg("backup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup created:"));

    let backups: Vec<_> = std::fs::read_dir(env.data_path().join("backup")).unwrap().collect();
    assert_eq!(backups.len(), 1);
}

#[test]
fn test_completions_bash() {
    let env = TestEnv::new();

    env.tf()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_tf"));
}

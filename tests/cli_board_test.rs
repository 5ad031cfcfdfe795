//! Integration tests for board and column commands.
//!
//! These tests verify that:
//! - a fresh data directory starts with a single "Main Board"
//! - boards can be created, renamed, switched and deleted, but never the last one
//! - column deletion cascades and asks for confirmation
//! - column moves follow the remove-then-insert rule

mod common;

use common::TestEnv;
use predicates::prelude::*;

// === Boards ===

#[test]
fn test_fresh_store_has_main_board() {
    let env = TestEnv::new();

    env.tf()
        .args(["board", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Main Board"));

    env.tf()
        .args(["board", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("To Do (0)"))
        .stdout(predicate::str::contains("In Progress (0)"))
        .stdout(predicate::str::contains("In Review (0)"))
        .stdout(predicate::str::contains("Done (0)"));
}

#[test]
fn test_board_create_switches_active() {
    let env = TestEnv::new();

    env.tf()
        .args(["board", "create", "Sprint 12"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created board Sprint 12"));

    env.tf()
        .args(["board", "show"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Sprint 12"));

    env.tf()
        .args(["board", "use", "main board"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Active board: Main Board"));
}

#[test]
fn test_board_create_rejects_blank_name() {
    let env = TestEnv::new();

    env.tf()
        .args(["board", "create", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("board name cannot be empty"));
}

#[test]
fn test_board_rename() {
    let env = TestEnv::new();

    env.tf()
        .args(["board", "rename", "Main Board", "Platform"])
        .assert()
        .success();

    env.tf()
        .args(["board", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Platform"))
        .stdout(predicate::str::contains("Main Board").not());
}

#[test]
fn test_last_board_cannot_be_deleted() {
    let env = TestEnv::new();

    env.tf()
        .args(["board", "delete", "Main Board", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one board is required"));
}

#[test]
fn test_board_delete_with_yes() {
    let env = TestEnv::new();
    env.tf().args(["board", "create", "Scratch"]).assert().success();

    env.tf()
        .args(["board", "delete", "Scratch", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted board Scratch"));

    env.tf()
        .args(["board", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scratch").not());
}

#[test]
fn test_board_clear_prompt_declined() {
    let env = TestEnv::new();

    env.tf()
        .args(["board", "clear", "Main Board"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled."));

    env.tf()
        .args(["board", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("To Do (0)"));
}

// === Columns ===

#[test]
fn test_column_add_with_wip_limit() {
    let env = TestEnv::new();

    env.tf()
        .args(["column", "add", "QA", "--wip", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added column qa-"));

    env.tf()
        .args(["board", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("QA (0/2)"));
}

#[test]
fn test_column_delete_cascades() {
    let env = TestEnv::new();
    env.tf().args(["task", "add", "todo", "First"]).assert().success();
    env.tf().args(["task", "add", "todo", "Second"]).assert().success();

    env.tf()
        .args(["column", "delete", "To Do", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted column To Do and 2 task(s)"));

    let json = env.boards_json();
    assert!(!json.contains("\"todo\""));
    assert!(!json.contains("First"));
}

#[test]
fn test_column_delete_declined_keeps_tasks() {
    let env = TestEnv::new();
    env.tf().args(["task", "add", "todo", "Keep me"]).assert().success();

    env.tf()
        .args(["column", "delete", "todo"])
        .write_stdin("no\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled."));

    assert!(env.boards_json().contains("Keep me"));
}

#[test]
fn test_column_move_onto() {
    let env = TestEnv::new();

    env.tf()
        .args(["column", "move", "done", "--onto", "todo"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Column order: Done | To Do | In Progress | In Review",
        ));

    env.tf()
        .args(["column", "move", "Done", "--onto", "In Progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Column order: To Do | Done | In Progress | In Review",
        ));
}

#[test]
fn test_column_move_to_index_out_of_range() {
    let env = TestEnv::new();

    env.tf()
        .args(["column", "move", "todo", "--to", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_unknown_column_reports_not_found() {
    let env = TestEnv::new();

    env.tf()
        .args(["column", "rename", "Backlog", "Icebox"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("column not found: Backlog"));
}

#[test]
fn test_board_show_all() {
    let env = TestEnv::new();
    env.tf().args(["board", "create", "Ops"]).assert().success();

    env.tf()
        .args(["board", "show", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Main Board ("))
        .stdout(predicate::str::contains("Ops ("));
}

//! End-to-end CLI tests
//!
//! Drives the built binary against a temporary data directory.

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

/// A `tally` command pointed at an isolated data directory
fn tally(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tally").unwrap();
    cmd.env("TALLY_DATA_DIR", data_dir.path());
    cmd
}

#[test]
fn init_and_config() {
    let dir = TempDir::new().unwrap();

    tally(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(contains("Initialized ledger"));

    tally(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(contains("ledger.json"));
}

#[test]
fn add_accounts_and_list() {
    let dir = TempDir::new().unwrap();

    tally(&dir)
        .args(["account", "add", "Checking", "--kind", "checking"])
        .assert()
        .success()
        .stdout(contains("Checking"));

    tally(&dir)
        .args(["account", "add", "Groceries", "--kind", "expense"])
        .assert()
        .success();

    tally(&dir)
        .args(["account", "list"])
        .assert()
        .success()
        .stdout(contains("Checking").and(contains("Groceries")));
}

#[test]
fn categorize_flow_keeps_two_legs() {
    let dir = TempDir::new().unwrap();

    tally(&dir)
        .args(["account", "add", "Checking", "--kind", "checking"])
        .assert()
        .success();
    tally(&dir)
        .args(["account", "add", "Groceries", "--kind", "expense"])
        .assert()
        .success();
    tally(&dir)
        .args(["account", "add", "Dining", "--kind", "expense"])
        .assert()
        .success();

    tally(&dir)
        .args([
            "txn", "add", "Checking", "-50.00", "--payee", "Market", "--category", "Groceries",
            "--date", "2025-02-10",
        ])
        .assert()
        .success()
        .stdout(contains("Market"));

    // Recategorize: the existing category leg moves, nothing is inserted
    tally(&dir)
        .args(["categorize", "set", "txn-1", "Dining"])
        .assert()
        .success()
        .stdout(contains("Groceries -> Dining"));

    tally(&dir)
        .args(["txn", "show", "txn-1"])
        .assert()
        .success()
        .stdout(contains("Dining").and(contains("$50.00")));
}

#[test]
fn bulk_dry_run_reports_without_writing() {
    let dir = TempDir::new().unwrap();

    tally(&dir)
        .args(["account", "add", "Checking", "--kind", "checking"])
        .assert()
        .success();
    tally(&dir)
        .args(["account", "add", "Office", "--kind", "expense"])
        .assert()
        .success();

    for day in ["01", "02"] {
        tally(&dir)
            .args([
                "txn",
                "add",
                "Checking",
                "-10.00",
                "--payee",
                "Acme Corp",
                "--date",
                &format!("2025-02-{}", day),
            ])
            .assert()
            .success();
    }

    tally(&dir)
        .args(["categorize", "bulk", "acme", "Office", "--dry-run"])
        .assert()
        .success()
        .stdout(contains("Dry run: 2 transactions"));

    // The dry run wrote nothing: both are still uncategorized
    tally(&dir)
        .args(["categorize", "bulk", "acme", "Office", "--uncategorized-only"])
        .assert()
        .success()
        .stdout(contains("Moved 2 transactions"));
}

#[test]
fn statement_reconciliation_flow() {
    let dir = TempDir::new().unwrap();

    tally(&dir)
        .args(["account", "add", "Checking", "--kind", "checking"])
        .assert()
        .success();

    tally(&dir)
        .args([
            "txn", "add", "Checking", "-50.00", "--payee", "Market", "--date", "2025-02-10",
        ])
        .assert()
        .success();

    tally(&dir)
        .args([
            "statement", "create", "Checking", "2025-02-01", "2025-02-28", "1000.00", "950.00",
        ])
        .assert()
        .success()
        .stdout(contains("stmt-1"));

    // Overlapping period is rejected
    tally(&dir)
        .args([
            "statement", "create", "Checking", "2025-02-15", "2025-03-15", "950.00", "900.00",
        ])
        .assert()
        .failure()
        .stderr(contains("overlaps"));

    tally(&dir)
        .args(["statement", "reconcile", "stmt-1", "item-1"])
        .assert()
        .success()
        .stdout(contains("Balanced"));

    tally(&dir)
        .args(["statement", "show", "stmt-1"])
        .assert()
        .success()
        .stdout(contains("Status:      Balanced"));

    tally(&dir)
        .args(["statement", "delete", "stmt-1"])
        .assert()
        .success()
        .stdout(contains("unreconciled"));
}

#[test]
fn suggest_merges_rules_and_history() {
    let dir = TempDir::new().unwrap();

    tally(&dir)
        .args(["account", "add", "Checking", "--kind", "checking"])
        .assert()
        .success();
    tally(&dir)
        .args(["account", "add", "Office Supplies", "--kind", "expense"])
        .assert()
        .success();
    tally(&dir)
        .args(["account", "add", "Shipping", "--kind", "expense"])
        .assert()
        .success();

    tally(&dir)
        .args(["rule", "add", "Acme.*", "Office Supplies"])
        .assert()
        .success();

    tally(&dir)
        .args([
            "txn",
            "add",
            "Checking",
            "-5.00",
            "--payee",
            "Acme Corp",
            "--category",
            "Shipping",
            "--date",
            "2025-02-10",
        ])
        .assert()
        .success();

    tally(&dir)
        .arg("suggest")
        .arg("Acme Corp")
        .assert()
        .success()
        .stdout(
            contains("0.90")
                .and(contains("Office Supplies"))
                .and(contains("Shipping")),
        );
}

#[test]
fn register_shows_running_balance_and_exports() {
    let dir = TempDir::new().unwrap();

    tally(&dir)
        .args(["account", "add", "Checking", "--kind", "checking"])
        .assert()
        .success();

    tally(&dir)
        .args([
            "txn", "add", "Checking", "-50.00", "--payee", "Market", "--date", "2025-02-10",
        ])
        .assert()
        .success();
    tally(&dir)
        .args([
            "txn", "add", "Checking", "-30.00", "--payee", "Cafe", "--date", "2025-02-11",
        ])
        .assert()
        .success();

    tally(&dir)
        .args(["txn", "register", "Checking"])
        .assert()
        .success()
        .stdout(contains("-$80.00"));

    tally(&dir)
        .args(["export", "register", "Checking"])
        .assert()
        .success()
        .stdout(contains("Item,Date,Payee").and(contains("-80.00")));
}

#[test]
fn blocked_ledger_refuses_writes() {
    let dir = TempDir::new().unwrap();

    tally(&dir)
        .args(["account", "add", "Checking", "--kind", "checking"])
        .assert()
        .success();

    // A foreign process marks the ledger as held open
    let lock = serde_json::json!({
        "pid": std::process::id().wrapping_add(1),
        "holder": "sync-agent",
        "acquired_at": chrono::Utc::now(),
    });
    std::fs::write(
        dir.path().join("data").join("ledger.lock"),
        lock.to_string(),
    )
    .unwrap();

    tally(&dir)
        .args(["account", "add", "Savings", "--kind", "savings"])
        .assert()
        .failure()
        .stderr(contains("Write blocked"));

    // Reads still work
    tally(&dir)
        .args(["account", "list"])
        .assert()
        .success()
        .stdout(contains("Checking"));
}

use anyhow::Result;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Abstraction for managing a disposable vigil project on disk:
/// secrets.toml, a rule catalog, and one DuckDB file per lender.
struct VigilTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl VigilTestEnv {
    fn new(rules_yaml: &str) -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path().to_path_buf();

        std::fs::create_dir_all(root.join("config"))?;
        std::fs::write(root.join("config/rules.yaml"), rules_yaml)?;

        Ok(Self { _tmp: tmp, root })
    }

    /// Register a lender whose database is a freshly created DuckDB file
    /// seeded with the given SQL.
    fn add_lender(&self, lender_id: &str, seed_sql: &str) -> Result<()> {
        let db_path = self.root.join(format!("{}.duckdb", lender_id));
        let conn = duckdb::Connection::open(&db_path)?;
        conn.execute_batch(seed_sql)?;
        drop(conn);

        self.append_secrets(lender_id, &db_path.to_string_lossy())
    }

    /// Register a lender pointing at a database file that does not exist.
    fn add_broken_lender(&self, lender_id: &str) -> Result<()> {
        let ghost = self.root.join(format!("{}_missing.duckdb", lender_id));
        self.append_secrets(lender_id, &ghost.to_string_lossy())
    }

    fn append_secrets(&self, lender_id: &str, db_path: &str) -> Result<()> {
        let path = self.root.join("secrets.toml");
        let mut content = if path.exists() {
            std::fs::read_to_string(&path)?
        } else {
            String::new()
        };
        content.push_str(&format!(
            "[lenders.{}]\nuser = \"dq_reader\"\npassword = \"x\"\ndb = \"{}\"\n\n",
            lender_id, db_path
        ));
        std::fs::write(path, content)?;
        Ok(())
    }

    fn vigil(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vigil"));
        cmd.current_dir(&self.root);
        cmd
    }

    fn report(&self) -> Result<serde_json::Value> {
        let content = std::fs::read_to_string(self.root.join("target/fleet_report.json"))?;
        Ok(serde_json::from_str(&content)?)
    }
}

const LOANS_RULES: &str = r#"
tables:
  loans:
    - type: not_null
      kwargs: {column: loan_id}
      meta: {severity: critical}
    - type: values_between
      kwargs: {column: amount, min: 0}
    - type: custom_sql
      kwargs: {sql: "SELECT * FROM loans WHERE amount IS NULL"}
      meta: {alias: "Amount populated"}
"#;

const CLEAN_SEED: &str = "
CREATE TABLE loans (loan_id INTEGER, amount DOUBLE);
INSERT INTO loans VALUES (1, 100.0), (2, 250.0), (3, 75.5);
";

const DIRTY_SEED: &str = "
CREATE TABLE loans (loan_id INTEGER, amount DOUBLE);
INSERT INTO loans VALUES (1, 100.0), (NULL, -50.0), (3, 75.5);
";

#[test]
fn test_run_all_green_skips_the_alert() -> Result<()> {
    let env = VigilTestEnv::new(LOANS_RULES)?;
    env.add_lender("acme", CLEAN_SEED)?;

    env.vigil()
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("All checks passed"));

    assert!(env.root.join("target/fleet_report.json").exists());
    assert!(!env.root.join("target/alert.html").exists());

    let report = env.report()?;
    let results = report["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r["status"] == "PASS"));
    // population reconciled through the fallback count
    assert!(results.iter().all(|r| r["total_rows"] == 3));
    Ok(())
}

#[test]
fn test_run_with_failures_renders_the_alert() -> Result<()> {
    let env = VigilTestEnv::new(LOANS_RULES)?;
    env.add_lender("acme", DIRTY_SEED)?;

    // DQ failures are report rows, not process failures: still exit 0
    env.vigil().arg("run").assert().success();

    let alert = std::fs::read_to_string(env.root.join("target/alert.html"))?;
    assert!(alert.contains("Data Quality Alert"));
    assert!(alert.contains("not_null (loan_id)"));
    assert!(alert.contains("class=\"critical\""));
    Ok(())
}

#[test]
fn test_unreachable_lender_yields_critical_record_without_sinking_fleet() -> Result<()> {
    let env = VigilTestEnv::new(LOANS_RULES)?;
    env.add_lender("acme", CLEAN_SEED)?;
    env.add_broken_lender("globex")?;

    env.vigil().arg("run").assert().success();

    let report = env.report()?;
    let results = report["results"].as_array().unwrap();

    // acme: 3 rule rows; globex: exactly one synthetic record
    assert_eq!(results.len(), 4);
    let globex: Vec<_> = results.iter().filter(|r| r["lender"] == "globex").collect();
    assert_eq!(globex.len(), 1);
    assert_eq!(globex[0]["status"], "CRITICAL_ERROR");
    assert_eq!(globex[0]["table"], "SYSTEM");
    Ok(())
}

#[test]
fn test_check_single_lender_single_table() -> Result<()> {
    let env = VigilTestEnv::new(LOANS_RULES)?;
    env.add_lender("acme", CLEAN_SEED)?;

    env.vigil()
        .args(["check", "--lender", "acme", "--table", "loans"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS").and(predicate::str::contains("All systems green")));
    Ok(())
}

#[test]
fn test_check_unknown_table_is_a_quiet_skip() -> Result<()> {
    let env = VigilTestEnv::new(LOANS_RULES)?;
    env.add_lender("acme", CLEAN_SEED)?;

    env.vigil()
        .args(["check", "--lender", "acme", "--table", "payments"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No results returned"));
    Ok(())
}

#[test]
fn test_rules_command_gates_a_broken_catalog() -> Result<()> {
    let env = VigilTestEnv::new(
        "tables: {loans: [{type: levitation_check}, {type: not_null, kwargs: {column: id}}]}",
    )?;
    env.add_lender("acme", CLEAN_SEED)?;

    env.vigil()
        .arg("rules")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown rule type"));
    Ok(())
}

#[test]
fn test_missing_config_is_fatal() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vigil"));
    cmd.current_dir(tmp.path());
    cmd.arg("run").assert().failure();
    Ok(())
}

use chrono::Utc;
use helpdesk_core::{Database, SlotStore, Ticket, TICKETS_KEY};
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_data: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_data = base.join("xdg-data");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_data).expect("failed to create XDG_DATA_HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_data,
            xdg_config,
            xdg_state,
        }
    }

    fn db_path(&self) -> PathBuf {
        self.xdg_data.join("helpdesk/helpdesk.db")
    }

    fn write_config(&self, contents: &str) {
        let dir = self.xdg_config.join("helpdesk");
        fs::create_dir_all(&dir).expect("failed to create config dir");
        fs::write(dir.join("config.toml"), contents).expect("failed to write config");
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(assert_cmd::cargo::cargo_bin!("helpdesk"))
            .args(args)
            .env("HOME", &self.home)
            .env("XDG_DATA_HOME", &self.xdg_data)
            .env("XDG_CONFIG_HOME", &self.xdg_config)
            .env("XDG_STATE_HOME", &self.xdg_state)
            .env_remove("RUST_LOG")
            .output()
            .unwrap_or_else(|e| panic!("failed to execute helpdesk: {e}"))
    }

    /// Run and require success, returning stdout
    fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert_success(args, &output);
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    fn run_json<T: serde::de::DeserializeOwned>(&self, args: &[&str]) -> T {
        let mut full = args.to_vec();
        full.extend(["--format", "json"]);
        let stdout = self.run_ok(&full);
        serde_json::from_str(&stdout)
            .unwrap_or_else(|e| panic!("invalid JSON from helpdesk {:?}: {e}\n{stdout}", args))
    }
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "helpdesk {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

#[test]
fn list_shows_sample_tickets_on_first_run() {
    let env = CliTestEnv::new();

    let stdout = env.run_ok(&["list"]);
    assert!(stdout.contains("all 5 | open 3"), "unexpected tabs:\n{stdout}");
    assert!(stdout.contains("1001"));
    assert!(stdout.contains("Login issues with mobile app"));

    let unassigned: Vec<Ticket> = env.run_json(&["list", "--assignee", "unassigned"]);
    let ids: Vec<u64> = unassigned.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1004, 1005]);
}

#[test]
fn create_persists_across_runs() {
    let env = CliTestEnv::new();

    let created: Ticket = env.run_json(&[
        "create",
        "--customer",
        "102",
        "--subject",
        "Invoices missing VAT number",
        "--message",
        "Our last two invoices do not show our VAT number.",
        "--priority",
        "high",
        "--tag",
        "Billing",
    ]);
    assert_eq!(created.id, 1006);
    assert_eq!(created.tags, vec!["billing".to_string()]);

    let found: Vec<Ticket> = env.run_json(&["list", "--search", "vat number"]);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, 1006);

    let db = Database::open(&env.db_path()).expect("failed to open db");
    let raw = db
        .read(TICKETS_KEY)
        .expect("failed to read slot")
        .expect("tickets slot should exist");
    let saved: Vec<Ticket> = serde_json::from_str(&raw).expect("slot should hold tickets");
    assert_eq!(saved.len(), 6);
    assert_eq!(saved[0].id, 1006);
}

#[test]
fn reply_moves_open_ticket_in_progress() {
    let env = CliTestEnv::new();

    let ticket: Ticket = env.run_json(&["reply", "1004", "Slack app review is underway.", "--as", "3"]);
    assert_eq!(ticket.status.as_str(), "in_progress");
    assert_eq!(ticket.conversation.len(), 2);
    assert_eq!(ticket.conversation[1].from, 3);

    let stdout = env.run_ok(&["show", "1004"]);
    assert!(stdout.contains("[agent] Emily Chen"), "unexpected detail:\n{stdout}");
}

#[test]
fn missing_ticket_and_bad_input_fail() {
    let env = CliTestEnv::new();

    let output = env.run(&["show", "9999"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ticket not found: 9999"));

    let output = env.run(&[
        "create",
        "--customer",
        "101",
        "--subject",
        "   ",
        "--message",
        "body",
    ]);
    assert!(!output.status.success());

    let output = env.run(&["list", "--sort", "customer"]);
    assert!(!output.status.success());

    let output = env.run(&["assign", "1004", "42"]);
    assert!(!output.status.success());

    // nothing above reached the database
    let all: Vec<Ticket> = env.run_json(&["list"]);
    assert_eq!(all.len(), 5);
    assert!(!env.db_path().exists() || {
        let db = Database::open(&env.db_path()).expect("failed to open db");
        db.read(TICKETS_KEY).ok().flatten().is_none()
    });
}

#[test]
fn reset_discards_changes() {
    let env = CliTestEnv::new();

    env.run_ok(&["status", "1001", "closed"]);
    let ticket: Ticket = env.run_json(&["show", "1001"]);
    assert_eq!(ticket.status.as_str(), "closed");

    let stdout = env.run_ok(&["reset"]);
    assert!(stdout.contains("Reset to 5 sample tickets"));

    let ticket: Ticket = env.run_json(&["show", "1001"]);
    assert_eq!(ticket.status.as_str(), "open");
}

#[test]
fn config_controls_slot_key_and_default_sort() {
    let env = CliTestEnv::new();
    env.write_config(
        r#"
[storage]
tickets_key = "staging-tickets"

[inbox]
sort = "id"
order = "asc"
"#,
    );

    let listed: Vec<Ticket> = env.run_json(&["list"]);
    let ids: Vec<u64> = listed.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1001, 1002, 1003, 1004, 1005]);

    env.run_ok(&["assign", "1005", "2"]);

    let db = Database::open(&env.db_path()).expect("failed to open db");
    assert!(db.read("staging-tickets").expect("read").is_some());
    assert!(db.read(TICKETS_KEY).expect("read").is_none());
}

#[test]
fn invalid_config_is_reported() {
    let env = CliTestEnv::new();
    env.write_config("[inbox]\norder = \"sideways\"\n");

    let output = env.run(&["list"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load configuration"));
}

#[test]
fn log_goes_to_dated_file_in_state_dir() {
    let env = CliTestEnv::new();

    env.run_ok(&["list"]);

    let expected = env
        .xdg_state
        .join("helpdesk")
        .join(format!("helpdesk.log.{}", Utc::now().format("%Y-%m-%d")));
    assert!(expected.exists(), "missing log file {}", expected.display());
    assert!(!env.xdg_state.join("helpdesk/helpdesk.log").exists());
}

#[test]
fn stats_and_directories_render() {
    let env = CliTestEnv::new();

    let stdout = env.run_ok(&["stats"]);
    assert!(stdout.contains("Needs assignment:"));
    assert!(stdout.contains("#1004"));

    let stdout = env.run_ok(&["customers", "--sort", "tickets"]);
    let david = stdout.find("David Kim").expect("David Kim listed");
    let maria = stdout.find("Maria Rodriguez").expect("Maria listed");
    assert!(david < maria);

    let users: serde_json::Value = env.run_json(&["users", "--role", "agent"]);
    assert_eq!(users.as_array().map(Vec::len), Some(2));
}

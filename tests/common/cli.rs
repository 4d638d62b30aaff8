use std::fs;
use std::path::PathBuf;
use std::process::ExitStatus;

use assert_cmd::Command;
use tempfile::TempDir;

/// A throwaway working directory with its own HOME, so user config and the
/// upvote ledger never touch the real machine.
pub struct CivWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub home: PathBuf,
}

impl CivWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let root = temp_dir.path().join("work");
        let home = temp_dir.path().join("home");
        fs::create_dir_all(&root).expect("create work dir");
        fs::create_dir_all(&home).expect("create home dir");
        Self {
            temp_dir,
            root,
            home,
        }
    }

    /// Write `.civic/config.yaml` in the workspace.
    pub fn write_config(&self, yaml: &str) {
        let dir = self.root.join(".civic");
        fs::create_dir_all(&dir).expect("create .civic");
        fs::write(dir.join("config.yaml"), yaml).expect("write config");
    }

    pub fn ledger_path(&self, client_id: &str) -> PathBuf {
        self.root
            .join(".civic")
            .join(format!("upvotes-{client_id}.json"))
    }
}

pub struct CivOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CivOutput {
    /// Parse stdout as one JSON document per line.
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("bad JSON line {l:?}: {e}")))
            .collect()
    }
}

fn command(workspace: &CivWorkspace) -> Command {
    let mut cmd = Command::cargo_bin("civ").expect("civ binary");
    cmd.current_dir(&workspace.root)
        .env("HOME", &workspace.home)
        .env("XDG_CONFIG_HOME", workspace.home.join(".config"))
        .env_remove("RUST_LOG")
        .env_remove("CIVIC_USER")
        .env_remove("CIVIC_ADMIN")
        .env_remove("CIVIC_CLIENT_ID")
        .env_remove("CIVIC_DATA_DIR");
    cmd
}

fn finish(output: std::process::Output, label: &str) -> CivOutput {
    let out = CivOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    if std::env::var_os("CIV_TEST_VERBOSE").is_some() {
        eprintln!("--- {label} stdout ---\n{}", out.stdout);
        eprintln!("--- {label} stderr ---\n{}", out.stderr);
    }
    out
}

/// Run `civ` with arguments and no input.
pub fn run_civ<I, S>(workspace: &CivWorkspace, args: I, label: &str) -> CivOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    run_civ_with_stdin(workspace, args, "", label)
}

/// Run `civ` with arguments, feeding `stdin` as the session script.
pub fn run_civ_with_stdin<I, S>(
    workspace: &CivWorkspace,
    args: I,
    stdin: &str,
    label: &str,
) -> CivOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let output = command(workspace)
        .args(args)
        .write_stdin(stdin.to_string())
        .output()
        .unwrap_or_else(|e| panic!("{label}: failed to run civ: {e}"));
    finish(output, label)
}

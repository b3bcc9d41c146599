//! Helpers for running the solver binary in integration tests.
#![allow(
    dead_code,
    reason = "is used in integration tests but unable to find a way to silence these warnings"
)]

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;
use std::process::Stdio;
use std::time::Duration;

use wait_timeout::ChildExt;

const TEST_TIMEOUT: Duration = Duration::from_secs(60);

/// The output of one run of the solver.
#[derive(Debug)]
pub(crate) struct SolverRun {
    pub(crate) success: bool,
    pub(crate) stdout: String,
    pub(crate) stderr: String,
}

pub(crate) fn instance_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("instances")
        .join(name)
}

pub(crate) fn run_solver(instance_path: impl AsRef<Path>) -> SolverRun {
    run_solver_with_options(instance_path, std::iter::empty())
}

pub(crate) fn run_solver_with_options(
    instance_path: impl AsRef<Path>,
    args: impl IntoIterator<Item = String>,
) -> SolverRun {
    let solver = PathBuf::from(env!("CARGO_BIN_EXE_splitlink-solver"));

    let mut command = Command::new(solver);
    for arg in args {
        let _ = command.arg(arg);
    }

    let mut child = command
        .arg(instance_path.as_ref())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(Stdio::null())
        .spawn()
        .expect("Failed to run solver.");

    let status = match child.wait_timeout(TEST_TIMEOUT) {
        Ok(None) => {
            let _ = child.kill();
            panic!("solver took more than {} seconds", TEST_TIMEOUT.as_secs())
        }
        Ok(Some(status)) => status,
        Err(e) => panic!("error starting solver: {e}"),
    };

    let Output { stdout, stderr, .. } = child
        .wait_with_output()
        .expect("Failed to collect the solver output.");

    SolverRun {
        success: status.success(),
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    }
}

/// Writes `contents` to a fresh instance file in the target directory.
pub(crate) fn write_instance(name: &str, contents: &str) -> PathBuf {
    let directory = PathBuf::from(env!("CARGO_TARGET_TMPDIR"));
    let path = directory.join(name);
    std::fs::write(&path, contents).expect("Failed to write the instance.");
    path
}

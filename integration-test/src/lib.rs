//! Test driver for the libopt demonstration binaries.
//!
//! Locates the binaries built alongside this workspace and runs them with
//! captured output, so their command line behavior can be asserted end to
//! end.

use std::process::{Command, Output};

fn target_dir() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    format!("{manifest_dir}/../target/debug")
}

pub fn echo_binary() -> String {
    format!("{}/echo", target_dir())
}

pub fn fnv1a_binary() -> String {
    format!("{}/fnv1a", target_dir())
}

/// Run a binary with the given arguments, returning the raw output.
pub fn run(binary: &str, args: &[&str]) -> Output {
    Command::new(binary)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {binary}: {e}"))
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

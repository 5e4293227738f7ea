//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use astlens::{Materialized, NodeWrapper};

/// Run the astlens binary in `dir` with colors disabled.
pub fn run_astlens_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_astlens"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("ASTLENS_ASCII")
        .output()
        .expect("Failed to execute astlens binary")
}

/// Run the astlens binary in `dir` with `input` piped to its stdin.
pub fn run_astlens_with_input(dir: &Path, args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_astlens"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn astlens binary");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");
    child.wait_with_output().expect("Failed to wait for astlens")
}

/// Stdout of a finished command, asserting it succeeded.
pub fn success_stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Kinds of a wrapper's children, in order.
pub fn child_kinds(view: &Materialized<'_>, wrapper: &NodeWrapper<'_>) -> Vec<&'static str> {
    view.children(wrapper).map(|child| child.kind).collect()
}

/// The first wrapper of `kind` in pre-order.
pub fn find_kind<'v, 'a>(view: &'v Materialized<'a>, kind: &str) -> Option<&'v NodeWrapper<'a>> {
    view.preorder().into_iter().find(|wrapper| wrapper.kind == kind)
}

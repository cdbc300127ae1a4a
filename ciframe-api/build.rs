//! Build script for ciframe-api
//!
//! Exposes build identification to the binary as compile-time env vars,
//! printed in the startup log line. No `rerun-if-changed` is declared, so
//! the values are refreshed on every build.

use std::process::Command;

const UNKNOWN: &str = "unknown";

/// Trimmed stdout of a successful command
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn main() {
    let vars = [
        (
            "GIT_HASH",
            command_output("git", &["rev-parse", "--short=8", "HEAD"]),
        ),
        (
            "BUILD_TIMESTAMP",
            Some(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
        ),
        ("BUILD_PROFILE", std::env::var("PROFILE").ok()),
    ];

    for (name, value) in vars {
        let value = value.unwrap_or_else(|| UNKNOWN.to_string());
        println!("cargo:rustc-env={name}={value}");
    }
}

// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::process::Output;

use serde::{Deserialize, Serialize};

use crate::{utils::color::strip_color, Error, Result};

/// Captured output of an external tool run.
#[derive(Debug, Deserialize, Serialize)]
pub struct ProcessOutput {
    pub process_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    /// Returns stdout when the process succeeded, the whole capture as an error otherwise.
    pub fn check(process_name: impl Into<String>, output: Output) -> Result<String> {
        let process_output = ProcessOutput {
            process_name: process_name.into(),
            stdout: String::from_utf8(output.stdout)?,
            stderr: strip_color(String::from_utf8_lossy(&output.stderr)),
            exit_code: output.status.code(),
        };
        if output.status.success() {
            Ok(process_output.stdout)
        } else {
            Err(Error::CommandFailure(process_output))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::process::Command;

    use super::*;

    #[test]
    fn failure_keeps_capture() {
        let output = Command::new("sh")
            .args(["-c", "echo partial; printf '\\033[31moops\\033[0m' >&2; exit 3"])
            .output()
            .unwrap();
        match ProcessOutput::check("sh", output) {
            Err(Error::CommandFailure(out)) => {
                assert_eq!(out.stdout, "partial\n");
                assert_eq!(out.stderr, "oops");
                assert_eq!(out.exit_code, Some(3));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn success_returns_stdout() {
        let output = Command::new("sh").args(["-c", "echo ok"]).output().unwrap();
        assert_eq!(ProcessOutput::check("sh", output).unwrap(), "ok\n");
    }
}

//! Thin wrapper for external command invocation.
//!
//! Every external tool call in this crate goes through [`Cmd`] so a
//! nonzero exit status becomes an error carrying the tool name and any
//! caller-supplied message instead of being silently dropped.

use anyhow::{bail, Context, Result};
use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::{Command, ExitStatus};

/// Captured result of a finished command.
#[derive(Debug)]
pub struct CmdOutput {
    status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Builder for a single external command invocation.
pub struct Cmd {
    program: String,
    args: Vec<OsString>,
    error_msg: Option<String>,
    allow_fail: bool,
}

impl Cmd {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            error_msg: None,
            allow_fail: false,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_os_string());
        }
        self
    }

    /// Append a path argument without lossy string conversion.
    pub fn arg_path(mut self, path: &Path) -> Self {
        self.args.push(path.as_os_str().to_os_string());
        self
    }

    /// Message to report if the command exits nonzero.
    pub fn error_msg(mut self, msg: impl Into<String>) -> Self {
        self.error_msg = Some(msg.into());
        self
    }

    /// Treat a nonzero exit status as a normal result instead of an error.
    pub fn allow_fail(mut self) -> Self {
        self.allow_fail = true;
        self
    }

    /// Run the command to completion, capturing its output.
    pub fn run(self) -> Result<CmdOutput> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .with_context(|| format!("Failed to run {}", self.program))?;

        let result = CmdOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.success() && !self.allow_fail {
            let msg = self
                .error_msg
                .unwrap_or_else(|| format!("{} failed", self.program));
            let detail = result.stderr.trim();
            if detail.is_empty() {
                bail!("{} ({})", msg, result.status);
            }
            bail!("{} ({})\n{}", msg, result.status, detail);
        }

        Ok(result)
    }
}

/// Fail with a clear message if `path` does not exist.
pub fn ensure_exists(path: &Path, description: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} not found: {}", description, path.display());
    }
    Ok(())
}

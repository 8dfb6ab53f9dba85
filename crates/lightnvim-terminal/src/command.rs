//! The editor's command line and environment.

use std::ffi::OsString;
use std::path::PathBuf;

use portable_pty::CommandBuilder;

use crate::TERM;

/// Everything needed to launch the editor inside the terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorCommand {
    /// Executable name or path; bare names are resolved through `PATH`.
    pub program: String,
    /// Directory prepended to the editor's `runtimepath`.
    pub runtime_dir: PathBuf,
    /// Forwarded verbatim after the runtime-path option.
    pub args: Vec<String>,
    /// Environment variable naming the listen socket.
    pub listen_env: String,
    pub socket: PathBuf,
}

impl EditorCommand {
    /// `<program> "+set rtp^=<runtime dir>" <args...>`
    pub fn argv(&self) -> Vec<OsString> {
        let mut argv = Vec::with_capacity(self.args.len() + 2);
        argv.push(OsString::from(&self.program));
        argv.push(OsString::from(format!(
            "+set rtp^={}",
            escape_option_value(&self.runtime_dir.to_string_lossy())
        )));
        argv.extend(self.args.iter().map(OsString::from));
        argv
    }

    /// Variables added on top of the inherited environment.
    pub fn env(&self) -> Vec<(OsString, OsString)> {
        vec![
            (
                OsString::from(&self.listen_env),
                self.socket.clone().into_os_string(),
            ),
            (OsString::from("TERM"), OsString::from(TERM)),
        ]
    }

    /// Build the PTY command: inherited environment plus [`Self::env`], run in
    /// the current working directory.
    pub fn to_command_builder(&self) -> CommandBuilder {
        let mut cmd = CommandBuilder::from_argv(self.argv());
        for (key, value) in self.env() {
            cmd.env(key, value);
        }
        match std::env::current_dir() {
            Ok(dir) => cmd.cwd(dir),
            Err(e) => tracing::warn!(error = %e, "no current directory; editor starts in $HOME"),
        }
        cmd
    }
}

/// `:set` treats spaces and backslashes specially; escape them.
fn escape_option_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == ' ' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

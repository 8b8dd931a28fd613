//! The remote command runner.
//!
//! One command, one synchronous execution, full output capture. A
//! non-zero exit is an error carrying the command text, exit code, and
//! captured stderr; success returns captured stdout. No retries and no
//! timeout beyond the session's connect timeout.

use crate::error::{Error, Result};
use crate::ssh::CommandChannel;

/// Run `command` over the channel, optionally escalated with sudo.
///
/// Escalation prefixes `sudo ` unless the command already starts with it.
pub fn run<C: CommandChannel + ?Sized>(
    channel: &mut C,
    command: &str,
    use_sudo: bool,
) -> Result<String> {
    let command = if use_sudo && !command.starts_with("sudo ") {
        format!("sudo {}", command)
    } else {
        command.to_string()
    };

    let output = channel.exec(&command)?;
    if !output.success() {
        return Err(Error::RemoteCommandFailed {
            command,
            exit_code: output.exit_code,
            stderr: output.stderr,
        });
    }

    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssh::ExecOutput;

    /// Channel double that records executed commands and replays a
    /// scripted outcome.
    struct ScriptedChannel {
        executed: Vec<String>,
        exit_code: i32,
        stdout: &'static str,
        stderr: &'static str,
    }

    impl ScriptedChannel {
        fn new(exit_code: i32, stdout: &'static str, stderr: &'static str) -> Self {
            Self {
                executed: Vec::new(),
                exit_code,
                stdout,
                stderr,
            }
        }
    }

    impl CommandChannel for ScriptedChannel {
        fn exec(&mut self, command: &str) -> Result<ExecOutput> {
            self.executed.push(command.to_string());
            Ok(ExecOutput {
                stdout: self.stdout.to_string(),
                stderr: self.stderr.to_string(),
                exit_code: self.exit_code,
            })
        }
    }

    #[test]
    fn zero_exit_returns_stdout() {
        let mut channel = ScriptedChannel::new(0, "ok\n", "");
        let out = run(&mut channel, "echo ok", false).unwrap();
        assert_eq!(out, "ok\n");
        assert_eq!(channel.executed, vec!["echo ok"]);
    }

    #[test]
    fn nonzero_exit_carries_command_and_stderr() {
        let mut channel = ScriptedChannel::new(1, "", "boom");
        let err = run(&mut channel, "false", false).unwrap_err();
        match &err {
            Error::RemoteCommandFailed {
                command,
                exit_code,
                stderr,
            } => {
                assert_eq!(command, "false");
                assert_eq!(*exit_code, 1);
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        let message = err.to_string();
        assert!(message.contains("false"));
        assert!(message.contains("boom"));
    }

    #[test]
    fn sudo_flag_prefixes_command() {
        let mut channel = ScriptedChannel::new(0, "", "");
        run(&mut channel, "ls", true).unwrap();
        assert_eq!(channel.executed, vec!["sudo ls"]);
    }

    #[test]
    fn sudo_prefix_is_not_doubled() {
        let mut channel = ScriptedChannel::new(0, "", "");
        run(&mut channel, "sudo ls", true).unwrap();
        assert_eq!(channel.executed, vec!["sudo ls"]);
    }

    #[test]
    fn no_sudo_leaves_command_alone() {
        let mut channel = ScriptedChannel::new(0, "", "");
        run(&mut channel, "sudo ls", false).unwrap();
        assert_eq!(channel.executed, vec!["sudo ls"]);
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Remote command failed ({exit_code}): {command}\n{stderr}")]
    RemoteCommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("SSH error: {0}")]
    Ssh(#[from] ssh2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::Connect(_) => "CONNECT_FAILED",
            Error::Auth(_) => "AUTH_FAILED",
            Error::RemoteCommandFailed { .. } => "REMOTE_COMMAND_FAILED",
            Error::Ssh(_) => "SSH_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::Other(_) => "ERROR",
        }
    }

    /// Process exit code for this error.
    ///
    /// A failed remote command surfaces its own exit code so the caller's
    /// exit status mirrors the remote one; configuration problems exit 2
    /// before any connection is opened; transport failures exit 10.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) => 2,
            Error::Connect(_) | Error::Auth(_) => 10,
            Error::RemoteCommandFailed { exit_code, .. } => *exit_code,
            Error::Ssh(_) | Error::Io(_) | Error::Other(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_command_failed_message_carries_command_and_stderr() {
        let err = Error::RemoteCommandFailed {
            command: "sudo nginx -t".to_string(),
            exit_code: 1,
            stderr: "unknown directive".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("sudo nginx -t"));
        assert!(message.contains("unknown directive"));
        assert!(message.contains("(1)"));
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(Error::Config("x".into()).code(), "CONFIG_ERROR");
        assert_eq!(Error::Auth("x".into()).code(), "AUTH_FAILED");
        let remote = Error::RemoteCommandFailed {
            command: "ls".into(),
            exit_code: 1,
            stderr: String::new(),
        };
        assert_eq!(remote.code(), "REMOTE_COMMAND_FAILED");
    }

    #[test]
    fn exit_codes_by_category() {
        assert_eq!(Error::Config("x".into()).exit_code(), 2);
        assert_eq!(Error::Connect("x".into()).exit_code(), 10);
        assert_eq!(Error::Auth("x".into()).exit_code(), 10);
        let remote = Error::RemoteCommandFailed {
            command: "ls".into(),
            exit_code: 127,
            stderr: String::new(),
        };
        assert_eq!(remote.exit_code(), 127);
    }
}

//! The SSH transport: one authenticated session per invocation.
//!
//! Two channel abstractions live here. [`CommandChannel`] runs a single
//! shell command and reports its exit status and captured output;
//! [`FileTransfer`] lists, creates, and writes remote filesystem entries
//! over SFTP. [`SshSession`] implements both on one connection, which is
//! used by exactly one caller at a time and closed when dropped.

use std::fs;
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;

use ssh2::{ErrorCode, Session, Sftp};

use crate::config::HostConfig;
use crate::error::{Error, Result};

// SFTP status codes for "the path is not there" (SSH_FXP_STATUS values).
const SFTP_NO_SUCH_FILE: i32 = 2;
const SFTP_NO_SUCH_PATH: i32 = 10;

pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// A channel that can run one shell command and return its outcome.
pub trait CommandChannel {
    fn exec(&mut self, command: &str) -> Result<ExecOutput>;
}

/// A channel that can inspect and write remote filesystem entries.
pub trait FileTransfer {
    /// Whether a remote path exists. Only "no such file" answers false;
    /// other stat failures propagate as errors.
    fn exists(&mut self, path: &str) -> Result<bool>;

    /// Create a single remote directory (parent must exist).
    fn mkdir(&mut self, path: &str) -> Result<()>;

    /// Write bytes to a remote file, creating or truncating it.
    fn write(&mut self, path: &str, content: &[u8]) -> Result<()>;

    /// Copy a local file's bytes to a remote path, overwriting it.
    fn upload(&mut self, local: &Path, remote: &str) -> Result<()>;
}

pub struct SshSession {
    session: Session,
    sftp: Option<Sftp>,
}

impl SshSession {
    /// Connect and authenticate with a password.
    ///
    /// The connect timeout applies to the TCP dial only; established
    /// commands block until the remote process exits.
    pub fn connect(config: &HostConfig) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        log_status!("ssh", "Connecting to {}@{}", config.user, addr);

        let sockaddr = addr
            .to_socket_addrs()
            .map_err(|e| Error::Connect(format!("{}: {}", addr, e)))?
            .next()
            .ok_or_else(|| Error::Connect(format!("{}: no addresses resolved", addr)))?;
        let tcp = TcpStream::connect_timeout(&sockaddr, config.connect_timeout)
            .map_err(|e| Error::Connect(format!("{}: {}", addr, e)))?;

        let mut session = Session::new()?;
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| Error::Connect(format!("{}: handshake failed: {}", addr, e)))?;
        session
            .userauth_password(&config.user, &config.password)
            .map_err(|e| {
                Error::Auth(format!(
                    "password auth for {}@{} rejected: {}",
                    config.user, config.host, e
                ))
            })?;

        Ok(Self {
            session,
            sftp: None,
        })
    }

    fn sftp(&mut self) -> Result<&Sftp> {
        if self.sftp.is_none() {
            self.sftp = Some(self.session.sftp()?);
        }
        Ok(self.sftp.as_ref().expect("sftp subsystem just opened"))
    }
}

impl CommandChannel for SshSession {
    fn exec(&mut self, command: &str) -> Result<ExecOutput> {
        let mut channel = self.session.channel_session()?;
        channel.exec(command)?;

        let mut stdout = Vec::new();
        channel.read_to_end(&mut stdout)?;
        let mut stderr = Vec::new();
        channel.stderr().read_to_end(&mut stderr)?;

        channel.wait_close()?;
        let exit_code = channel.exit_status()?;

        Ok(ExecOutput {
            stdout: String::from_utf8_lossy(&stdout).to_string(),
            stderr: String::from_utf8_lossy(&stderr).to_string(),
            exit_code,
        })
    }
}

impl FileTransfer for SshSession {
    fn exists(&mut self, path: &str) -> Result<bool> {
        match self.sftp()?.stat(Path::new(path)) {
            Ok(_) => Ok(true),
            Err(err) if is_not_found(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn mkdir(&mut self, path: &str) -> Result<()> {
        self.sftp()?.mkdir(Path::new(path), 0o755)?;
        Ok(())
    }

    fn write(&mut self, path: &str, content: &[u8]) -> Result<()> {
        let mut file = self.sftp()?.create(Path::new(path))?;
        file.write_all(content)?;
        Ok(())
    }

    fn upload(&mut self, local: &Path, remote: &str) -> Result<()> {
        let mut src = fs::File::open(local)?;
        let mut dst = self.sftp()?.create(Path::new(remote))?;
        io::copy(&mut src, &mut dst)?;
        Ok(())
    }
}

fn is_not_found(err: &ssh2::Error) -> bool {
    matches!(
        err.code(),
        ErrorCode::SFTP(SFTP_NO_SUCH_FILE) | ErrorCode::SFTP(SFTP_NO_SUCH_PATH)
    )
}

use dockhand::config::{ExecConfig, HostConfig};
use dockhand::ssh::SshSession;
use dockhand::{remote, shell, Result};

/// Run the command from `CMD` under a remote login shell and print its
/// output. Configuration is validated before any connection is opened.
pub fn run() -> Result<()> {
    let host = HostConfig::from_env()?;
    let cfg = ExecConfig::from_env()?;

    let mut session = SshSession::connect(&host)?;
    let output = remote::run(&mut session, &shell::bash_lc(&cfg.command), false)?;
    print!("{}", output);
    Ok(())
}

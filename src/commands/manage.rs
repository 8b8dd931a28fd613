use dockhand::config::{HostConfig, ManageConfig};
use dockhand::ssh::SshSession;
use dockhand::{remote, shell, Result};

/// Run a Django management command inside the remote virtualenv.
pub fn run() -> Result<()> {
    let host = HostConfig::from_env()?;
    let cfg = ManageConfig::from_env()?;

    let mut session = SshSession::connect(&host)?;
    let command = format!(
        "cd {} && source .venv/bin/activate && {}",
        shell::quote_path(&cfg.app_dir),
        cfg.command,
    );
    let output = remote::run(&mut session, &shell::bash_lc(&command), false)?;
    print!("{}", output);
    Ok(())
}

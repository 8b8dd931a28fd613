use dockhand::config::{HostConfig, SyncConfig};
use dockhand::provision as workflow;
use dockhand::ssh::SshSession;
use dockhand::Result;

/// Push the fixed asset files and restart the service.
pub fn run() -> Result<()> {
    let host = HostConfig::from_env()?;
    let cfg = SyncConfig::from_env()?;

    let mut session = SshSession::connect(&host)?;
    workflow::sync_assets(&mut session, &cfg)?;
    println!("Synced files and reloaded services");
    Ok(())
}

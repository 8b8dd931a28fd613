use dockhand::config::{HostConfig, ProvisionConfig};
use dockhand::provision as workflow;
use dockhand::ssh::SshSession;
use dockhand::Result;

/// Provision the target host end to end. Any step failure aborts the
/// run; re-running after a fix is the recovery path.
pub fn run() -> Result<()> {
    let host = HostConfig::from_env()?;
    let cfg = ProvisionConfig::from_env(&host.host)?;

    let mut session = SshSession::connect(&host)?;
    workflow::run(&mut session, &host, &cfg)?;
    println!("Deploy complete.");
    Ok(())
}

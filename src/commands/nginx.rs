use dockhand::config::HostConfig;
use dockhand::provision as workflow;
use dockhand::ssh::SshSession;
use dockhand::Result;

/// Apply the fixed upload-size fragment and reload nginx.
pub fn run() -> Result<()> {
    let host = HostConfig::from_env()?;

    let mut session = SshSession::connect(&host)?;
    workflow::set_body_size_limit(&mut session)?;
    println!("nginx: client_max_body_size set to 20M and reloaded");
    Ok(())
}

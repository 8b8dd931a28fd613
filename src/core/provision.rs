//! Provisioning tasks: the full workflow and the narrow one-shot tasks.
//!
//! The workflow is a fixed, linear step list. Every step is fatal on
//! failure; there is no retry and no rollback. Re-running after a fix is
//! the recovery path, and relies on the remote commands' own idempotence
//! (`mkdir -p`, `apt install`, `ln -sf`).

use crate::config::{HostConfig, ProvisionConfig, SyncConfig};
use crate::error::{Error, Result};
use crate::mirror::{self, MirrorOptions};
use crate::remote;
use crate::render::{EnvFile, ServiceUnit, SiteConfig, BODY_SIZE_CONF};
use crate::ssh::{CommandChannel, FileTransfer};
use crate::utils::shell;

pub const PACKAGE_INSTALL: &str = "apt update && apt install -y python3-venv python3-pip nginx";

/// Generates the application secret on the remote host, so it only ever
/// exists in process memory and on the target machine.
pub const SECRET_COMMAND: &str =
    "python3 - <<'PY'\nimport secrets; print(secrets.token_urlsafe(50))\nPY";

pub const SERVICE_UNIT_PATH: &str = "/etc/systemd/system/gunicorn.service";
pub const SITE_AVAILABLE_PATH: &str = "/etc/nginx/sites-available/webapp";
pub const SITE_ENABLED_PATH: &str = "/etc/nginx/sites-enabled/webapp";
pub const BODY_SIZE_CONF_PATH: &str = "/etc/nginx/conf.d/body_size.conf";

/// Files pushed by the asset sync task, relative to the project root.
pub const SYNC_FILES: &[&str] = &["static/css/style.css", "templates/profiles/list.html"];

/// Run the full provisioning workflow against one host.
pub fn run<S>(session: &mut S, host: &HostConfig, cfg: &ProvisionConfig) -> Result<()>
where
    S: CommandChannel + FileTransfer,
{
    log_status!("provision", "Ensuring application directory {}", cfg.app_dir);
    remote::run(
        session,
        &format!("mkdir -p {}", shell::quote_path(&cfg.app_dir)),
        false,
    )?;

    log_status!("provision", "Installing OS packages");
    remote::run(session, PACKAGE_INSTALL, true)?;

    log_status!(
        "provision",
        "Mirroring {} to {}",
        cfg.project_dir.display(),
        cfg.app_dir
    );
    mirror::mirror_tree(session, &cfg.project_dir, &cfg.app_dir, &MirrorOptions::default())?;

    log_status!("provision", "Creating virtualenv and installing requirements");
    let venv_dir = format!("{}/.venv", cfg.app_dir);
    remote::run(
        session,
        &format!("python3 -m venv {}", shell::quote_path(&venv_dir)),
        false,
    )?;
    let pip_install = format!(
        "source {} && pip install --upgrade pip && pip install -r {}",
        shell::quote_path(&format!("{}/bin/activate", venv_dir)),
        shell::quote_path(&format!("{}/requirements.txt", cfg.app_dir)),
    );
    remote::run(session, &shell::bash_lc(&pip_install), false)?;

    log_status!("provision", "Writing environment file");
    let secret = remote::run(session, SECRET_COMMAND, false)?.trim().to_string();
    let env_file = EnvFile::production(secret, &cfg.domain, &host.host);
    // The secret travels over the transfer channel, never through a shell.
    session.write(
        &format!("{}/.env", cfg.app_dir),
        env_file.render().as_bytes(),
    )?;

    log_status!("provision", "Running migrations and collecting static files");
    let manage = format!(
        "cd {} && source .venv/bin/activate && python manage.py migrate \
         && python manage.py collectstatic --noinput",
        shell::quote_path(&cfg.app_dir),
    );
    remote::run(session, &shell::bash_lc(&manage), false)?;

    log_status!("provision", "Installing systemd unit");
    let unit = ServiceUnit {
        app_dir: cfg.app_dir.clone(),
    };
    session.write(SERVICE_UNIT_PATH, unit.render().as_bytes())?;
    remote::run(
        session,
        "systemctl daemon-reload && systemctl enable --now gunicorn",
        true,
    )?;

    log_status!("provision", "Installing nginx site for {}", cfg.domain);
    let site = SiteConfig {
        domain: cfg.domain.clone(),
        host: host.host.clone(),
        app_dir: cfg.app_dir.clone(),
    };
    session.write(SITE_AVAILABLE_PATH, site.render().as_bytes())?;
    remote::run(
        session,
        &format!(
            "ln -sf {} {} && nginx -t && systemctl reload nginx",
            shell::quote_path(SITE_AVAILABLE_PATH),
            shell::quote_path(SITE_ENABLED_PATH),
        ),
        true,
    )?;

    Ok(())
}

/// Push the stylesheet and list template, then collect static files and
/// restart the service.
pub fn sync_assets<S>(session: &mut S, cfg: &SyncConfig) -> Result<()>
where
    S: CommandChannel + FileTransfer,
{
    for rel in SYNC_FILES {
        let local = cfg.project_dir.join(rel);
        if !local.is_file() {
            return Err(Error::Other(format!(
                "local file not found: {}",
                local.display()
            )));
        }
        let remote_path = format!("{}/{}", cfg.app_dir.trim_end_matches('/'), rel);
        if let Some((parent, _)) = remote_path.rsplit_once('/') {
            mirror::ensure_dir(session, parent)?;
        }
        log_status!("sync", "Uploading {} -> {}", local.display(), remote_path);
        session.upload(&local, &remote_path)?;
    }

    let collectstatic = format!(
        "cd {} && source .venv/bin/activate && python manage.py collectstatic --noinput",
        shell::quote_path(&cfg.app_dir),
    );
    remote::run(session, &shell::bash_lc(&collectstatic), true)?;
    remote::run(session, "systemctl restart gunicorn", true)?;

    Ok(())
}

/// Write the upload-size fragment, validate the nginx config, and reload.
pub fn set_body_size_limit<S>(session: &mut S) -> Result<()>
where
    S: CommandChannel + FileTransfer,
{
    if let Some((parent, _)) = BODY_SIZE_CONF_PATH.rsplit_once('/') {
        mirror::ensure_dir(session, parent)?;
    }
    log_status!("nginx", "Writing {}", BODY_SIZE_CONF_PATH);
    session.write(BODY_SIZE_CONF_PATH, BODY_SIZE_CONF.as_bytes())?;

    remote::run(session, "nginx -t", true)?;
    remote::run(session, "systemctl reload nginx", true)?;

    Ok(())
}

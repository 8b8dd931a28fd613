use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod commands;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "dockhand")]
#[command(version = VERSION)]
#[command(about = "One-shot SSH provisioning for a single-host Django site")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full provisioning workflow
    /// (env: VPS_HOST, PASSWORD, VPS_USER, DOMAIN, APP_DIR, PROJECT_DIR)
    Provision,
    /// Execute one remote shell command (env: VPS_HOST, PASSWORD, CMD)
    Exec,
    /// Run a management command in the remote virtualenv
    /// (env: VPS_HOST, PASSWORD, APP_DIR, MANAGE_CMD)
    Manage,
    /// Push the stylesheet and list template, collect static files, and
    /// restart the service (env: VPS_HOST, PASSWORD, APP_DIR, PROJECT_DIR)
    SyncAssets,
    /// Set the nginx upload size limit and reload (env: VPS_HOST, PASSWORD)
    NginxBodySize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Provision => commands::provision::run(),
        Commands::Exec => commands::exec::run(),
        Commands::Manage => commands::manage::run(),
        Commands::SyncAssets => commands::sync::run(),
        Commands::NginxBodySize => commands::nginx::run(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::from(exit_code_to_u8(err.exit_code()))
        }
    }
}

/// A remote failure can report a zero or negative status through the
/// transport; the error path must still exit non-zero.
fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        1
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}

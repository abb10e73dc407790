//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to [`run`] or
//! [`health`]. Each handler lives in its own submodule.

pub mod health;
pub mod run;

use crate::cli::{Cli, Commands};
use crate::error::AuditProxyError;

pub async fn dispatch(cli: Cli) -> Result<(), AuditProxyError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Health(args)) => health::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  audit-proxy v{version} \u{2014} authenticating HTTP forward proxy\n\n  \
         No command provided. To get started:\n\n    \
         audit-proxy run                   Start the proxy (needs SUPABASE_URL, SUPABASE_ANON_KEY)\n    \
         audit-proxy health                Check a running instance\n    \
         audit-proxy --help                See all commands and options\n"
    );
}

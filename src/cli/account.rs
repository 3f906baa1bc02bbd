//! Account command implementation
//!
//! Prints the signed-in email, or signs out the same way the panel does.

use clap::Args;

use crate::credentials::{CredentialStore, KeyringCredentialStore};
use crate::panel::{self, NOT_SIGNED_IN_PROMPT};
use crate::vpn::{TunnelServiceController, VpnController};

/// Arguments for the account command
#[derive(Args, Debug)]
pub struct AccountArgs {
    /// Sign out (disconnects the VPN first if it is up)
    #[arg(long)]
    pub sign_out: bool,
}

/// Run the account command
pub async fn run(args: AccountArgs) -> anyhow::Result<()> {
    let credentials = KeyringCredentialStore::new()?;
    let vpn = TunnelServiceController::new()?;
    println!("{}", execute(&args, &credentials, &vpn));
    Ok(())
}

fn execute(args: &AccountArgs, credentials: &dyn CredentialStore, vpn: &dyn VpnController) -> String {
    match credentials.current_session() {
        Some(session) if args.sign_out => {
            panel::sign_out(credentials, vpn);
            format!("Signed out {}.", session.email)
        }
        Some(session) => format!("{} (VPN {})", session.email, vpn.current_status()),
        None => NOT_SIGNED_IN_PROMPT.replace('\n', " - "),
    }
}

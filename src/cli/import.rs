//! Handler for `keyforge import-roles`.

use crate::admin::AdminClient;
use crate::auth::{AuthSession, CredentialCache};
use crate::cli::ImportRolesArgs;
use crate::config::Settings;
use crate::error::Result;
use crate::import::{self, ImportOrchestrator, RowStatus};

/// Authenticate, then drive the bulk import and print the tally.
///
/// A run with row failures still returns Ok: the tally is the report, not
/// the process exit code.
pub async fn run(args: ImportRolesArgs) -> Result<()> {
    let settings = Settings::load(args.env_file.as_deref())?;
    let rows = import::load_rows(&args.csv_path)?;

    let cache = if args.no_cache {
        CredentialCache::disabled()
    } else {
        CredentialCache::new(CredentialCache::default_path())
    };
    let mut session = AuthSession::new(
        settings.base_url,
        settings.login_realm,
        settings.client_id,
        cache,
    );
    session.authenticate().await?;

    let admin = AdminClient::new(session, &args.realm);
    let mut orchestrator = ImportOrchestrator::new(admin);
    let result = orchestrator.run(&args.client_id, rows).await?;

    println!(
        "Processed {} row(s): {} succeeded, {} failed",
        result.outcomes.len(),
        result.succeeded(),
        result.failed()
    );
    for outcome in &result.outcomes {
        if let RowStatus::Failed(detail) = &outcome.status {
            println!("  {detail}");
        }
    }
    Ok(())
}

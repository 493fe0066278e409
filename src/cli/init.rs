//! Handler for `keyforge init-env`.

use std::io::{self, BufRead, Write};

use crate::config;
use crate::error::Result;

/// Prompt for the three connection settings and write the default `.env`.
pub fn run() -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();

    let base_url = prompt(&mut input, "KEYCLOAK_URL (e.g. https://your-keycloak/)")?;
    let realm = prompt(&mut input, "KEYCLOAK_REALM (e.g. your-realm)")?;
    let client_id = prompt(&mut input, "KEYCLOAK_CLIENT_ID (e.g. your-app-client-id)")?;

    let path = config::default_env_path();
    config::write_env_file(&path, base_url.trim(), realm.trim(), client_id.trim())?;
    println!(".env file written to {}", path.display());
    Ok(())
}

fn prompt(input: &mut impl BufRead, label: &str) -> Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line)
}

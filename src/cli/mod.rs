//! Command-line interface for keyforge.

pub mod import;
pub mod init;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Keycloak realm administration from the command line.
#[derive(Parser, Debug)]
#[command(name = "keyforge", version, about = "Keycloak realm administration CLI")]
pub struct Cli {
    /// Log level filter (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import client roles and map them to groups from a CSV file
    ImportRoles(ImportRolesArgs),
    /// Interactively create the default .env configuration file
    InitEnv,
}

/// Arguments for `keyforge import-roles`.
#[derive(Parser, Debug)]
pub struct ImportRolesArgs {
    /// Path to a CSV file with role_name and group_name columns
    pub csv_path: PathBuf,

    /// Human identifier of the target client
    #[arg(long)]
    pub client_id: String,

    /// Target realm to modify
    #[arg(long)]
    pub realm: String,

    /// Disable credential caching
    #[arg(long)]
    pub no_cache: bool,

    /// Path to a .env file (defaults to the platform config location)
    #[arg(long)]
    pub env_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_import_roles() {
        let cli = Cli::try_parse_from([
            "keyforge",
            "import-roles",
            "roles.csv",
            "--client-id",
            "my-app",
            "--realm",
            "my-realm",
        ])
        .unwrap();
        match cli.command {
            Commands::ImportRoles(args) => {
                assert_eq!(args.csv_path, PathBuf::from("roles.csv"));
                assert_eq!(args.client_id, "my-app");
                assert_eq!(args.realm, "my-realm");
                assert!(!args.no_cache);
                assert!(args.env_file.is_none());
            }
            other => panic!("expected ImportRoles, got {other:?}"),
        }
    }

    #[test]
    fn parse_import_roles_with_no_cache_and_env_file() {
        let cli = Cli::try_parse_from([
            "keyforge",
            "import-roles",
            "roles.csv",
            "--client-id",
            "my-app",
            "--realm",
            "my-realm",
            "--no-cache",
            "--env-file",
            "/tmp/custom.env",
        ])
        .unwrap();
        match cli.command {
            Commands::ImportRoles(args) => {
                assert!(args.no_cache);
                assert_eq!(args.env_file, Some(PathBuf::from("/tmp/custom.env")));
            }
            other => panic!("expected ImportRoles, got {other:?}"),
        }
    }

    #[test]
    fn parse_init_env() {
        let cli = Cli::try_parse_from(["keyforge", "init-env"]).unwrap();
        assert!(matches!(cli.command, Commands::InitEnv));
    }

    #[test]
    fn import_roles_requires_client_id_and_realm() {
        assert!(Cli::try_parse_from(["keyforge", "import-roles", "roles.csv"]).is_err());
        assert!(Cli::try_parse_from([
            "keyforge",
            "import-roles",
            "roles.csv",
            "--client-id",
            "my-app"
        ])
        .is_err());
    }

    #[test]
    fn log_level_defaults_to_info() {
        let cli = Cli::try_parse_from(["keyforge", "init-env"]).unwrap();
        assert_eq!(cli.log_level, "info");
    }
}

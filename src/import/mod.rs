//! Bulk import: CSV rows driven through an idempotent four-step
//! reconciliation with per-row failure isolation.

use std::path::Path;

use serde::Deserialize;

use crate::admin::AdminClient;
use crate::error::Result;

/// One input record: a client role to ensure and the group to map it onto.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImportRow {
    pub role_name: String,
    pub group_name: String,
}

/// Per-row terminal state.
#[derive(Debug, Clone)]
pub enum RowStatus {
    Succeeded,
    Failed(String),
}

/// Result of processing a single row.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub row: ImportRow,
    pub status: RowStatus,
}

/// Aggregate of an import run, in input order.
#[derive(Debug, Default)]
pub struct ImportResult {
    pub outcomes: Vec<ImportOutcome>,
}

impl ImportResult {
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, RowStatus::Succeeded))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Read import rows from a CSV file.
///
/// The header row is required and must name the `role_name` and
/// `group_name` columns.
pub fn load_rows(path: &Path) -> Result<Vec<ImportRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

/// Walks import rows against one resolved client, isolating row failures.
pub struct ImportOrchestrator {
    client: AdminClient,
}

impl ImportOrchestrator {
    pub fn new(client: AdminClient) -> Self {
        Self { client }
    }

    /// Reconcile every row against the target client.
    ///
    /// The client is resolved once up front and that resolution is the only
    /// fatal path. Each row's failure is recorded with a descriptive
    /// message and the remaining rows still run; the run itself never
    /// fails for row-level errors.
    pub async fn run(
        &mut self,
        client_identifier: &str,
        rows: Vec<ImportRow>,
    ) -> Result<ImportResult> {
        let client_internal_id = self.client.resolve_client_id(client_identifier).await?;

        let mut result = ImportResult::default();
        for row in rows {
            tracing::info!(role = %row.role_name, group = %row.group_name, "Processing row");
            let status = match self.process_row(&client_internal_id, &row).await {
                Ok(()) => RowStatus::Succeeded,
                Err(err) => {
                    let message = format!(
                        "Failed to process role '{}' for group '{}': {}",
                        row.role_name, row.group_name, err
                    );
                    tracing::error!("{message}");
                    RowStatus::Failed(message)
                }
            };
            result.outcomes.push(ImportOutcome { row, status });
        }

        if result.failed() > 0 {
            tracing::warn!(
                failures = result.failed(),
                successes = result.succeeded(),
                "Import completed with errors"
            );
        } else {
            tracing::info!(rows = result.outcomes.len(), "Import completed successfully");
        }
        Ok(result)
    }

    async fn process_row(&mut self, client_internal_id: &str, row: &ImportRow) -> Result<()> {
        self.client
            .ensure_role(client_internal_id, &row.role_name)
            .await?;
        let group_id = self.client.resolve_group_id(&row.group_name).await?;
        let role = self
            .client
            .get_role(client_internal_id, &row.role_name)
            .await?;
        self.client
            .map_role_to_group(&group_id, client_internal_id, &role)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_rows_parses_header_and_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roles.csv");
        fs::write(&path, "role_name,group_name\nviewer,team-a\neditor,team-b\n").unwrap();

        let rows = load_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            ImportRow {
                role_name: "viewer".to_string(),
                group_name: "team-a".to_string(),
            }
        );
        assert_eq!(rows[1].group_name, "team-b");
    }

    #[test]
    fn load_rows_accepts_extra_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roles.csv");
        fs::write(&path, "role_name,group_name,comment\nviewer,team-a,ok\n").unwrap();

        let rows = load_rows(&path).unwrap();
        assert_eq!(rows[0].role_name, "viewer");
    }

    #[test]
    fn load_rows_fails_on_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roles.csv");
        fs::write(&path, "role_name\nviewer\n").unwrap();

        assert!(load_rows(&path).is_err());
    }

    #[test]
    fn empty_result_counts_zero() {
        let result = ImportResult::default();
        assert_eq!(result.succeeded(), 0);
        assert_eq!(result.failed(), 0);
    }
}

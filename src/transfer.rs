//! Environment Import/Export
//!
//! JSON transfer of environment configurations between installations.
//! Exported client secrets are masked with a fixed placeholder — the
//! round trip is intentionally lossy for secrets, not an oversight.

use std::collections::HashSet;

use crate::error::{ImportError, StorageError, TokenError, TokenResult};
use crate::token::store::CredentialStore;
use crate::types::{Credentials, Environment};

/// Fixed placeholder written in place of non-empty client secrets.
pub const MASKED_SECRET: &str = "***MASKED***";

/// Counts returned by an import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: u32,
    pub skipped: u32,
}

/// Export every environment as a JSON array, masking non-empty secrets.
pub async fn export_environments<S: CredentialStore>(store: &S) -> TokenResult<String> {
    let mut environments = store.environments().await?;
    for environment in &mut environments {
        if !environment.credentials.client_secret.is_empty() {
            environment.credentials.client_secret = MASKED_SECRET.to_string();
        }
    }

    serde_json::to_string_pretty(&environments).map_err(|e| {
        TokenError::Storage(StorageError::WriteFailed {
            message: e.to_string(),
        })
    })
}

/// Import a JSON array of environments.
///
/// The top level must be an array (hard failure otherwise). An entry
/// without a non-empty `name` and a `credentials` object is skipped and
/// counted; an existing name is skipped unless `overwrite` was requested.
pub async fn import_environments<S: CredentialStore>(
    store: &S,
    json: &str,
    overwrite: bool,
) -> TokenResult<ImportSummary> {
    let payload: serde_json::Value = serde_json::from_str(json).map_err(|e| {
        TokenError::Import(ImportError::InvalidJson {
            message: e.to_string(),
        })
    })?;
    let entries = payload
        .as_array()
        .ok_or(TokenError::Import(ImportError::NotAnArray))?;

    let existing: HashSet<String> = store
        .environments()
        .await?
        .into_iter()
        .map(|environment| environment.name)
        .collect();

    let mut summary = ImportSummary::default();
    for entry in entries {
        let name = entry
            .get("name")
            .and_then(|value| value.as_str())
            .map(str::trim)
            .filter(|name| !name.is_empty());
        let credentials = entry
            .get("credentials")
            .filter(|value| value.is_object())
            .and_then(|value| serde_json::from_value::<Credentials>(value.clone()).ok());

        let (Some(name), Some(credentials)) = (name, credentials) else {
            tracing::warn!("skipping import entry without a name and credentials object");
            summary.skipped += 1;
            continue;
        };

        if existing.contains(name) && !overwrite {
            summary.skipped += 1;
            continue;
        }

        store
            .save_environment(&Environment::new(name, credentials.normalized()))
            .await?;
        summary.imported += 1;
    }

    tracing::info!(
        imported = summary.imported,
        skipped = summary.skipped,
        "environment import finished"
    );
    Ok(summary)
}

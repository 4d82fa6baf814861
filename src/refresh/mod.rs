mod sample;

use std::path::Path;

pub use sample::sample_records;

use crate::loader::RecordSource;
use crate::store::{self, StoreError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The data file now holds `count` freshly fetched records.
    Updated { count: usize },
    /// The source could not be read; the data file was left as it was.
    KeptLocal { reason: String, local_exists: bool },
}

/// Pulls the record collection from `source` and persists it to
/// `data_file`.
///
/// A failing source is not an error: the existing data file keeps serving
/// and the reason is reported in the outcome. Only a failed write is.
pub async fn refresh_data_file(
    source: &RecordSource,
    data_file: &Path,
) -> Result<RefreshOutcome, StoreError> {
    tracing::info!(source = %source.describe(), "fetching consultation records for refresh");
    let records = match source.fetch().await {
        Ok(records) => records,
        Err(e) => {
            let local_exists = tokio::fs::try_exists(data_file).await.unwrap_or(false);
            tracing::warn!(
                error = %e,
                data_file = %data_file.display(),
                local_exists,
                "refresh source failed, keeping local data file"
            );
            return Ok(RefreshOutcome::KeptLocal {
                reason: e.to_string(),
                local_exists,
            });
        }
    };

    store::write_data_file(data_file, &records).await?;
    tracing::info!(
        count = records.len(),
        data_file = %data_file.display(),
        "data file refreshed"
    );
    Ok(RefreshOutcome::Updated {
        count: records.len(),
    })
}

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::model::{self, ConsultationRecord};
use crate::store::{self, StoreError};

/// Path of the record collection on a backend.
pub const RECORDS_PATH: &str = "/api/consultas";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid backend URL: {url}")]
    InvalidUrl { url: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error! status: {status} ({url})")]
    Status { url: String, status: u16 },

    #[error("failed to decode records from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// An HTTP endpoint that answers `GET` with a JSON array of records.
#[derive(Clone, Debug)]
pub struct HttpSource {
    client: reqwest::Client,
    url: reqwest::Url,
}

impl HttpSource {
    /// Source for a backend's fixed record path, e.g. `http://host:5000`
    /// becomes `http://host:5000/api/consultas`.
    pub fn backend(base_url: &str) -> Result<Self, LoadError> {
        let base = parse_url(base_url)?;
        let url = base
            .join(RECORDS_PATH)
            .map_err(|_| LoadError::InvalidUrl {
                url: base_url.to_string(),
            })?;
        Self::with_client(url, None)
    }

    /// Source for an arbitrary URL, used for upstream refreshes.
    pub fn endpoint(url: &str, timeout: Option<Duration>) -> Result<Self, LoadError> {
        Self::with_client(parse_url(url)?, timeout)
    }

    fn with_client(url: reqwest::Url, timeout: Option<Duration>) -> Result<Self, LoadError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|source| LoadError::HttpClientBuild { source })?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &reqwest::Url {
        &self.url
    }

    pub async fn fetch(&self) -> Result<Vec<ConsultationRecord>, LoadError> {
        let url = self.url.to_string();
        tracing::debug!(%url, "fetching consultation records");
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|source| LoadError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| LoadError::Transport {
                url: url.clone(),
                source,
            })?;
        let records = model::parse_records(&body).map_err(|source| LoadError::Decode {
            url: url.clone(),
            source,
        })?;
        tracing::debug!(%url, count = records.len(), "fetched consultation records");
        Ok(records)
    }
}

fn parse_url(raw: &str) -> Result<reqwest::Url, LoadError> {
    let url = reqwest::Url::parse(raw.trim()).map_err(|_| LoadError::InvalidUrl {
        url: raw.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(LoadError::InvalidUrl {
            url: raw.to_string(),
        }),
    }
}

/// Where a load reads its record collection from.
#[derive(Clone, Debug)]
pub enum RecordSource {
    Http(HttpSource),
    DataFile(PathBuf),
    Inline(Vec<ConsultationRecord>),
}

impl RecordSource {
    /// One attempt, no retry.
    pub async fn fetch(&self) -> Result<Vec<ConsultationRecord>, LoadError> {
        match self {
            Self::Http(source) => source.fetch().await,
            Self::DataFile(path) => Ok(store::read_data_file(path).await?),
            Self::Inline(records) => Ok(records.clone()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Http(source) => source.url().to_string(),
            Self::DataFile(path) => path.display().to_string(),
            Self::Inline(_) => "built-in dataset".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_url_gets_fixed_records_path() {
        let source = HttpSource::backend("http://127.0.0.1:5000").unwrap();
        assert_eq!(source.url().as_str(), "http://127.0.0.1:5000/api/consultas");
        let source = HttpSource::backend("http://clinic.local/app/").unwrap();
        assert_eq!(source.url().as_str(), "http://clinic.local/api/consultas");
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(matches!(
            HttpSource::backend("ftp://clinic.local"),
            Err(LoadError::InvalidUrl { .. })
        ));
        assert!(matches!(
            HttpSource::endpoint("not a url", None),
            Err(LoadError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn status_error_message_names_the_status() {
        let err = LoadError::Status {
            url: "http://x/api/consultas".to_string(),
            status: 500,
        };
        assert_eq!(
            err.to_string(),
            "HTTP error! status: 500 (http://x/api/consultas)"
        );
    }

    #[tokio::test]
    async fn inline_source_returns_its_records() {
        let records = crate::refresh::sample_records();
        let source = RecordSource::Inline(records.clone());
        assert_eq!(source.fetch().await.unwrap(), records);
        assert_eq!(source.describe(), "built-in dataset");
    }
}

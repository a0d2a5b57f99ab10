use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, RANGE};
use serde::Deserialize;
use url::Url;

use super::{EntrySource, ObjectStorage, ProbeReport};
use crate::domain::EntryRow;
use crate::error::{Error, Result};

const SELECT_COLUMNS: &str = "id,full_name,image_path,cohort_id,created_at";

/// REST backend in the Supabase dialect: PostgREST range queries for rows,
/// `storage/v1` object endpoints for public and signed URLs.
pub struct HttpBackend {
    client: reqwest::Client,
    base: Url,
    api_key: String,
    table: String,
    cohort_table: String,
    bucket: String,
}

#[derive(Debug, Deserialize)]
struct CohortRow {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: &str, api_key: &str, table: &str, bucket: &str) -> Result<Self> {
        // A trailing slash keeps Url::join from eating the last path segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Ok(Self {
            client: reqwest::Client::new(),
            base: Url::parse(&normalized)?,
            api_key: api_key.to_string(),
            table: table.to_string(),
            cohort_table: "cohorts".to_string(),
            bucket: bucket.to_string(),
        })
    }

    /// Override the table used for the cohort name lookup.
    pub fn with_cohort_table(mut self, table: &str) -> Self {
        self.cohort_table = table.to_string();
        self
    }

    fn rest_url(&self, table: &str) -> Result<Url> {
        Ok(self.base.join(&format!("rest/v1/{table}"))?)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
    }
}

/// PostgREST expresses pagination as an inclusive `Range` header.
fn range_header(from: usize, to: usize) -> String {
    format!("{from}-{to}")
}

/// The sign endpoint answers with a URL relative to `storage/v1`.
fn absolute_signed_url(base: &Url, signed: &str) -> String {
    let relative = signed.trim_start_matches('/');
    format!("{base}storage/v1/{relative}")
}

#[async_trait]
impl EntrySource for HttpBackend {
    async fn fetch_range(&self, from: usize, to: usize) -> Result<Vec<EntryRow>> {
        let url = self.rest_url(&self.table)?;
        let response = self
            .authed(self.client.get(url))
            .query(&[("select", SELECT_COLUMNS), ("order", "created_at.desc")])
            .header(RANGE, range_header(from, to))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::RangeRejected {
                from,
                to,
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }

    async fn fetch_cohorts(&self, ids: &[i64]) -> Result<HashMap<i64, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let id_list = ids
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let filter = format!("in.({id_list})");
        let url = self.rest_url(&self.cohort_table)?;
        let response = self
            .authed(self.client.get(url))
            .query(&[("select", "id,name"), ("id", filter.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::LookupRejected {
                status: status.as_u16(),
            });
        }
        let rows: Vec<CohortRow> = response.json().await?;
        Ok(rows.into_iter().map(|row| (row.id, row.name)).collect())
    }
}

#[async_trait]
impl ObjectStorage for HttpBackend {
    fn public_url(&self, path: &str) -> String {
        format!(
            "{}storage/v1/object/public/{}/{}",
            self.base, self.bucket, path
        )
    }

    async fn sign_url(&self, path: &str, ttl: Duration) -> Result<String> {
        let url = self
            .base
            .join(&format!("storage/v1/object/sign/{}/{path}", self.bucket))?;
        let response = self
            .authed(self.client.post(url))
            .json(&serde_json::json!({ "expiresIn": ttl.as_secs() }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::SignRejected {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        let body: SignResponse = response.json().await?;
        let signed = body.signed_url.ok_or(Error::MissingSignedUrl)?;
        Ok(absolute_signed_url(&self.base, &signed))
    }

    async fn probe(&self, url: &str) -> Result<ProbeReport> {
        let response = self
            .client
            .get(url)
            .header(RANGE, "bytes=0-0")
            .send()
            .await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        Ok(ProbeReport {
            ok: response.status().is_success(),
            content_type,
        })
    }
}

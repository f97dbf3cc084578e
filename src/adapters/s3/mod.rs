//! S3-compatible object storage directory backend.
//!
//! Lists a bucket with `ListObjectsV2` and downloads the selected object into a
//! local staging directory, where the placer opens it like any local file.
//! Requests use path-style addressing and are signed with SigV4 when
//! credentials are available.

pub mod listing;
pub mod sign;

use std::io::Write;
use std::path::{Path, PathBuf};

use reqwest::{Client, Response, Url};
use tracing::{debug, info};

use self::listing::parse_list_page;
use self::sign::{canonical_query, sign_get, uri_encode, Credentials, SigningRequest};
use crate::error::DirectoryError;
use crate::picker::Picker;
use crate::ports::directory::{is_original, Directory, Image, ListFuture, RandomImageFuture};

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "us-west-2";

/// Default staging directory: `{temp_dir}/placechicken`.
#[must_use]
pub fn default_staging_dir() -> PathBuf {
    std::env::temp_dir().join("placechicken")
}

/// Directory backend over an S3-compatible bucket.
pub struct S3Directory {
    client: Client,
    endpoint: String,
    region: String,
    credentials: Option<Credentials>,
    staging_dir: PathBuf,
    picker: Picker,
}

impl S3Directory {
    /// Create a backend for the given region, using the AWS endpoint for that
    /// region, credentials from the environment, and the default staging
    /// directory.
    pub fn new(region: impl Into<String>) -> Self {
        let region = region.into();
        Self {
            client: Client::new(),
            endpoint: format!("https://s3.{region}.amazonaws.com"),
            region,
            credentials: Credentials::from_env(),
            staging_dir: default_staging_dir(),
            picker: Picker::new(),
        }
    }

    /// Use a different endpoint, as `scheme://host[:port]`.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the credentials; `None` sends unsigned requests.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Stage downloads in `dir`.
    #[must_use]
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    /// Select with the given picker.
    #[must_use]
    pub fn with_picker(mut self, picker: Picker) -> Self {
        self.picker = picker;
        self
    }

    /// Where selected objects are downloaded to.
    #[must_use]
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Issue a GET and fail on any non-success status.
    async fn get(
        &self,
        canonical_uri: &str,
        query: &[(String, String)],
    ) -> Result<Response, String> {
        let mut raw = format!("{}{canonical_uri}", self.endpoint);
        if !query.is_empty() {
            raw.push('?');
            raw.push_str(&canonical_query(query));
        }
        let url = Url::parse(&raw).map_err(|e| format!("invalid URL {raw}: {e}"))?;

        let mut request = self.client.get(url.clone());
        if let Some(credentials) = &self.credentials {
            let host = match (url.host_str(), url.port()) {
                (Some(host), Some(port)) => format!("{host}:{port}"),
                (Some(host), None) => host.to_string(),
                (None, _) => return Err(format!("URL {raw} has no host")),
            };
            let signing = SigningRequest { host: &host, canonical_uri, query };
            let headers = sign_get(credentials, &self.region, &signing, chrono::Utc::now());
            for (name, value) in headers {
                request = request.header(name, value);
            }
        }

        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let truncated: String = body.chars().take(500).collect();
            return Err(format!("HTTP {}: {truncated}", status.as_u16()));
        }
        Ok(response)
    }

    /// Fetch one page of keys.
    async fn list_page(
        &self,
        bucket: &str,
        token: Option<&str>,
    ) -> Result<listing::ListPage, String> {
        let mut query = vec![("list-type".to_string(), "2".to_string())];
        if let Some(token) = token {
            query.push(("continuation-token".to_string(), uri_encode(token, true)));
        }
        let uri = format!("/{}", uri_encode(bucket, true));
        let body = self.get(&uri, &query).await?.text().await.map_err(|e| e.to_string())?;
        parse_list_page(&body)
    }

    /// Download `key` into the staging directory, returning the staged image.
    async fn download(&self, bucket: &str, key: &str) -> Result<Image, DirectoryError> {
        let download_err = |reason: String| DirectoryError::Download {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason,
        };

        let uri = format!("/{}/{}", uri_encode(bucket, true), uri_encode(key, false));
        let bytes = self
            .get(&uri, &[])
            .await
            .map_err(download_err)?
            .bytes()
            .await
            .map_err(|e| download_err(e.to_string()))?;

        let name = staged_name(key);
        let path = stage(&self.staging_dir, &name, &bytes)?;
        info!(key, bytes = bytes.len(), path = %path.display(), "Downloaded object");
        Ok(Image::new(name))
    }
}

impl Directory for S3Directory {
    fn list<'a>(&'a self, bucket: &'a str) -> ListFuture<'a> {
        Box::pin(async move {
            let mut images = Vec::new();
            let mut token: Option<String> = None;
            loop {
                let page = self.list_page(bucket, token.as_deref()).await.map_err(|reason| {
                    DirectoryError::List { bucket: bucket.to_string(), reason }
                })?;
                images.extend(page.keys.into_iter().filter(|k| is_original(k)).map(Image::new));
                match page.next_token {
                    Some(next) => token = Some(next),
                    None => break,
                }
            }
            debug!(bucket, count = images.len(), "Listed bucket");
            Ok(images)
        })
    }

    fn random_image<'a>(&'a self, bucket: &'a str) -> RandomImageFuture<'a> {
        Box::pin(async move {
            let objects = self.list(bucket).await?;
            match self.picker.pick(&objects) {
                Some(object) => self.download(bucket, &object.name).await,
                None => Ok(Image::empty()),
            }
        })
    }

    fn locate(&self, _bucket: &str, image: &Image) -> PathBuf {
        self.staging_dir.join(&image.name)
    }
}

/// File name a key is staged under. Percent-encoding keeps distinct keys
/// distinct and never yields a path separator.
fn staged_name(key: &str) -> String {
    uri_encode(key, true)
}

/// Write `bytes` to `dir/name` through a temporary file so readers never see
/// a partial download.
fn stage(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, DirectoryError> {
    let path = dir.join(name);
    let staging_err =
        |source: std::io::Error| DirectoryError::Staging { path: path.clone(), source };

    std::fs::create_dir_all(dir).map_err(staging_err)?;
    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(staging_err)?;
    file.write_all(bytes).map_err(staging_err)?;
    file.persist(&path).map_err(|e| staging_err(e.error))?;
    Ok(path)
}

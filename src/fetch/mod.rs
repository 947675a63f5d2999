//! HTTP download of satellite source imagery.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Client;

pub mod manifest;
pub mod periods;

#[derive(Debug)]
pub enum FetchError {
    Http(reqwest::Error),
    Status { code: u16, url: String, body: String },
    Io(std::io::Error),
    Csv(csv::Error),
    MissingColumn { column: String, available: Vec<String> },
    Config(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FetchError::Http(e) => write!(f, "HTTP request failed: {}", e),
            FetchError::Status { code, url, body } => {
                write!(f, "Failed to download: HTTP {} from {}: {}", code, url, body)
            }
            FetchError::Io(e) => write!(f, "I/O error: {}", e),
            FetchError::Csv(e) => write!(f, "Failed to read CSV manifest: {}", e),
            FetchError::MissingColumn { column, available } => {
                write!(
                    f,
                    "Missing expected column in CSV: '{}'. Available columns: {:?}",
                    column, available
                )
            }
            FetchError::Config(msg) => write!(f, "Invalid fetch configuration: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        FetchError::Http(error)
    }
}

impl From<std::io::Error> for FetchError {
    fn from(error: std::io::Error) -> Self {
        FetchError::Io(error)
    }
}

impl From<csv::Error> for FetchError {
    fn from(error: csv::Error) -> Self {
        FetchError::Csv(error)
    }
}

/// One file to fetch, consumed exactly once.
#[derive(Debug, Clone)]
pub struct DownloadTarget {
    pub url: String,
    pub dest: PathBuf,
    pub token: Option<String>,
}

/// Retry behavior for a download. The default makes a single attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            attempts: 1,
            initial_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// A policy making one attempt plus `retries` extra tries.
    pub fn with_retries(retries: u32) -> Self {
        RetryPolicy {
            attempts: retries + 1,
            ..RetryPolicy::default()
        }
    }
}

pub fn build_client(timeout: Duration) -> Result<Client, FetchError> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!("tethys/", env!("CARGO_PKG_VERSION")))
        .build()?;

    Ok(client)
}

/// Fetch one target, retrying per the policy with doubling backoff.
pub fn download(
    client: &Client,
    target: &DownloadTarget,
    policy: &RetryPolicy,
) -> Result<PathBuf, FetchError> {
    let attempts = policy.attempts.max(1);
    let mut backoff = policy.initial_backoff;
    let mut last_error = None;

    for attempt in 1..=attempts {
        debug!("Download attempt {} of {} for {}", attempt, attempts, target.url);

        match try_download_once(client, target) {
            Ok(path) => return Ok(path),
            Err(e) => {
                if attempt < attempts {
                    warn!("Attempt {} failed ({}), retrying in {:?}", attempt, e, backoff);
                    std::thread::sleep(backoff);
                    backoff *= 2;
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| FetchError::Config("download made no attempts".to_string())))
}

fn try_download_once(client: &Client, target: &DownloadTarget) -> Result<PathBuf, FetchError> {
    let mut request = client.get(&target.url);
    if let Some(token) = &target.token {
        request = request.bearer_auth(token);
    }

    let mut response = request.send()?;

    // Inspect the status before touching the filesystem, so a failed
    // request leaves no partial or empty file behind.
    if !response.status().is_success() {
        let code = response.status().as_u16();
        let body: String = response.text().unwrap_or_default().chars().take(200).collect();
        return Err(FetchError::Status {
            code,
            url: target.url.clone(),
            body,
        });
    }

    if let Some(parent) = target.dest.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = File::create(&target.dest)?;
    let bytes = io::copy(&mut response, &mut file)?;
    debug!("Downloaded {} bytes to {}", bytes, target.dest.display());

    Ok(target.dest.clone())
}

/// Final path segment of a URL, ignoring any query string.
pub fn filename_from_url(url: &str) -> Option<String> {
    let without_query = url.split('?').next().unwrap_or(url);
    let name = without_query.rsplit('/').next()?;

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Resolve a manifest path fragment against a base URL, normalizing slashes.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use tempfile::tempdir;

    // Minimal single-shot HTTP server for download tests.
    fn serve(responses: Vec<(u16, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        thread::spawn(move || {
            for (status, body) in responses {
                let (mut stream, _) = match listener.accept() {
                    Ok(conn) => conn,
                    Err(_) => return,
                };

                let mut request = [0u8; 1024];
                let _ = stream.read(&mut request);

                let reason = if status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        format!("http://{}", addr)
    }

    fn test_client() -> Client {
        build_client(Duration::from_secs(5)).expect("Failed to build client")
    }

    #[test]
    fn test_download_writes_body() {
        let base = serve(vec![(200, "granule-bytes")]);
        let dir = tempdir().expect("Failed to create temp dir");
        let dest = dir.path().join("nested").join("granule.hdf");

        let target = DownloadTarget {
            url: format!("{}/archive/granule.hdf", base),
            dest: dest.clone(),
            token: Some("secret".to_string()),
        };

        let path = download(&test_client(), &target, &RetryPolicy::default())
            .expect("Failed to download");

        assert_eq!(path, dest);
        let contents = std::fs::read_to_string(&dest).expect("Failed to read download");
        assert_eq!(contents, "granule-bytes");
    }

    #[test]
    fn test_failed_status_leaves_no_file() {
        let base = serve(vec![(404, "not here")]);
        let dir = tempdir().expect("Failed to create temp dir");
        let dest = dir.path().join("missing.hdf");

        let target = DownloadTarget {
            url: format!("{}/archive/missing.hdf", base),
            dest: dest.clone(),
            token: None,
        };

        let result = download(&test_client(), &target, &RetryPolicy::default());

        match result {
            Err(FetchError::Status { code, body, .. }) => {
                assert_eq!(code, 404);
                assert_eq!(body, "not here");
            }
            other => panic!("Expected status error, got {:?}", other),
        }
        assert!(!dest.exists());
    }

    #[test]
    fn test_retry_recovers_after_server_error() {
        let base = serve(vec![(500, "boom"), (200, "second try")]);
        let dir = tempdir().expect("Failed to create temp dir");
        let dest = dir.path().join("retry.tif");

        let target = DownloadTarget {
            url: format!("{}/retry.tif", base),
            dest: dest.clone(),
            token: None,
        };

        let policy = RetryPolicy {
            attempts: 2,
            initial_backoff: Duration::from_millis(10),
        };

        download(&test_client(), &target, &policy).expect("Failed to download with retry");

        let contents = std::fs::read_to_string(&dest).expect("Failed to read download");
        assert_eq!(contents, "second try");
    }

    #[test]
    fn test_filename_from_url() {
        assert_eq!(
            filename_from_url("https://host/archive/MOD021KM.A2024153.hdf"),
            Some("MOD021KM.A2024153.hdf".to_string())
        );
        assert_eq!(
            filename_from_url("https://host/servlet/RenderData?si=1955852"),
            Some("RenderData".to_string())
        );
        assert_eq!(filename_from_url("https://host/dir/"), None);
    }

    #[test]
    fn test_join_url_normalizes_slashes() {
        let expected = "https://ladsweb.modaps.eosdis.nasa.gov/archive/file.hdf";
        assert_eq!(
            join_url("https://ladsweb.modaps.eosdis.nasa.gov/", "/archive/file.hdf"),
            expected
        );
        assert_eq!(
            join_url("https://ladsweb.modaps.eosdis.nasa.gov", "archive/file.hdf"),
            expected
        );
    }
}

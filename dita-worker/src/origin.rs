//! Where shell assets come from when they are not cached: a local directory
//! or an http(s) server.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use dita_core::config::DitaConfig;
use dita_core::error::{DitaError, DitaResult};

const ORIGIN_TIMEOUT_SECS: u64 = 30;

pub enum Origin {
    Dir(PathBuf),
    Http { client: reqwest::Client, base: String },
}

impl Origin {
    pub fn from_config(config: &DitaConfig) -> DitaResult<Self> {
        match config.origin() {
            Some(origin) if origin.starts_with("http://") || origin.starts_with("https://") => {
                let client = reqwest::Client::builder()
                    .timeout(Duration::from_secs(ORIGIN_TIMEOUT_SECS))
                    .build()
                    .map_err(|e| DitaError::Config(format!("Failed to create HTTP client: {e}")))?;
                Ok(Origin::Http {
                    client,
                    base: origin.trim_end_matches('/').to_string(),
                })
            }
            Some(dir) => Ok(Origin::Dir(PathBuf::from(dir))),
            None => Ok(Origin::Dir(Self::default_dir()?)),
        }
    }

    /// ~/.local/share/dita/public on Linux.
    pub fn default_dir() -> DitaResult<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| DitaError::Config("Could not determine data directory".into()))?;
        Ok(data_dir.join("dita").join("public"))
    }

    /// Fetch an asset by its request path. `Ok(None)` means not found.
    pub async fn fetch(&self, key: &str) -> DitaResult<Option<Vec<u8>>> {
        match self {
            Origin::Dir(root) => {
                let Some(path) = resolve(root, key) else {
                    return Ok(None);
                };
                match tokio::fs::read(&path).await {
                    Ok(bytes) => Ok(Some(bytes)),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(DitaError::Fetch {
                        key: key.to_string(),
                        reason: e.to_string(),
                    }),
                }
            }
            Origin::Http { client, base } => {
                let fetch_error = |e: reqwest::Error| DitaError::Fetch {
                    key: key.to_string(),
                    reason: e.to_string(),
                };

                let resp = client
                    .get(format!("{base}{key}"))
                    .send()
                    .await
                    .map_err(fetch_error)?;

                if resp.status() == reqwest::StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                let resp = resp.error_for_status().map_err(fetch_error)?;
                let bytes = resp.bytes().await.map_err(fetch_error)?;
                Ok(Some(bytes.to_vec()))
            }
        }
    }
}

/// Map a request path into `root`. `/` is the entry document; paths that
/// would escape `root` resolve to nothing.
fn resolve(root: &Path, key: &str) -> Option<PathBuf> {
    let relative = key.trim_start_matches('/');
    let relative = if relative.is_empty() { "index.html" } else { relative };

    let path = Path::new(relative);
    if !path.components().all(|c| matches!(c, Component::Normal(_))) {
        return None;
    }
    Some(root.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_root_to_entry_document() {
        let root = Path::new("/srv/dita");
        assert_eq!(resolve(root, "/"), Some(root.join("index.html")));
        assert_eq!(resolve(root, "/icon-192.png"), Some(root.join("icon-192.png")));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let root = Path::new("/srv/dita");
        assert_eq!(resolve(root, "/../etc/passwd"), None);
    }

    #[test]
    fn test_http_origin_from_config() {
        let mut config = DitaConfig::default();
        config.worker.origin = Some("https://dita.example/app/".to_string());

        match Origin::from_config(&config).unwrap() {
            Origin::Http { base, .. } => assert_eq!(base, "https://dita.example/app"),
            Origin::Dir(dir) => panic!("Expected an http origin, got {}", dir.display()),
        }
    }

    #[tokio::test]
    async fn test_dir_origin_fetch() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>").unwrap();
        let origin = Origin::Dir(dir.path().to_path_buf());

        assert_eq!(origin.fetch("/").await.unwrap().as_deref(), Some(b"<html>".as_slice()));
        assert_eq!(origin.fetch("/manifest.json").await.unwrap(), None);
    }
}

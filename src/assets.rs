//! Fonts and images referenced by URL.
//!
//! Nothing here talks to the network. An [AssetFetcher] resolves a URL to bytes
//! however the host application likes: from memory, from a directory of
//! pre-downloaded files, or by wrapping its own HTTP client.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SARABUN_REGULAR_URL: &str =
    "https://raw.githubusercontent.com/google/fonts/main/ofl/sarabun/Sarabun-Regular.ttf";
pub const SARABUN_BOLD_URL: &str =
    "https://raw.githubusercontent.com/google/fonts/main/ofl/sarabun/Sarabun-Bold.ttf";
/// PNG rendering of the national Garuda emblem. A [DirAssets] directory serves
/// it from a file named `Emblem_of_Thailand.svg` holding the PNG bytes.
pub const DEFAULT_EMBLEM_URL: &str =
    "https://commons.wikimedia.org/wiki/Special:FilePath/Emblem_of_Thailand.svg?width=256";

#[derive(Error, Debug)]
pub enum AssetFetchError {
    #[error("no asset is available for {0}")]
    NotFound(String),

    #[error("asset {0} is empty")]
    Empty(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Resolves asset URLs to their bytes
pub trait AssetFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetFetchError>;
}

impl<F: AssetFetcher + ?Sized> AssetFetcher for &F {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetFetchError> {
        (**self).fetch(url)
    }
}

/// Where the composers find their fonts and the fallback emblem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetConfig {
    pub regular_font_url: String,
    pub bold_font_url: String,
    /// Drawn on leave forms that do not supply their own emblem
    pub emblem_url: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        AssetConfig {
            regular_font_url: SARABUN_REGULAR_URL.to_string(),
            bold_font_url: SARABUN_BOLD_URL.to_string(),
            emblem_url: DEFAULT_EMBLEM_URL.to_string(),
        }
    }
}

/// Assets held in memory, keyed by URL
#[derive(Debug, Default, Clone)]
pub struct MemoryAssets {
    assets: HashMap<String, Vec<u8>>,
}

impl MemoryAssets {
    pub fn new() -> MemoryAssets {
        MemoryAssets::default()
    }

    /// Register `bytes` under `url`, modifying `self`
    pub fn with<S: Into<String>>(mut self, url: S, bytes: Vec<u8>) -> Self {
        self.insert(url, bytes);
        self
    }

    pub fn insert<S: Into<String>>(&mut self, url: S, bytes: Vec<u8>) {
        self.assets.insert(url.into(), bytes);
    }
}

impl AssetFetcher for MemoryAssets {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetFetchError> {
        match self.assets.get(url) {
            Some(bytes) if bytes.is_empty() => Err(AssetFetchError::Empty(url.to_string())),
            Some(bytes) => Ok(bytes.clone()),
            None => Err(AssetFetchError::NotFound(url.to_string())),
        }
    }
}

/// Assets stored as files in one directory, looked up by the last path segment
/// of the URL. `.../ofl/sarabun/Sarabun-Bold.ttf` resolves to
/// `<root>/Sarabun-Bold.ttf`.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new<P: AsRef<Path>>(root: P) -> DirAssets {
        DirAssets {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, url: &str) -> Option<PathBuf> {
        file_name(url).map(|name| self.root.join(name))
    }
}

/// Last path segment of `url`, without query or fragment
fn file_name(url: &str) -> Option<&str> {
    let url = url.split(['?', '#']).next().unwrap_or(url);
    url.rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && *name != "..")
}

impl AssetFetcher for DirAssets {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetFetchError> {
        let path = self
            .path_for(url)
            .ok_or_else(|| AssetFetchError::NotFound(url.to_string()))?;
        if !path.is_file() {
            return Err(AssetFetchError::NotFound(url.to_string()));
        }
        let bytes = std::fs::read(&path)?;
        if bytes.is_empty() {
            return Err(AssetFetchError::Empty(url.to_string()));
        }
        Ok(bytes)
    }
}

/// The two font programs every composition needs
#[derive(Debug, Clone)]
pub struct FontSet {
    pub regular: Vec<u8>,
    pub bold: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_assets_report_missing_and_empty() {
        let assets = MemoryAssets::new()
            .with("a.ttf", vec![1, 2, 3])
            .with("empty.png", Vec::new());
        assert_eq!(assets.fetch("a.ttf").unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            assets.fetch("b.ttf"),
            Err(AssetFetchError::NotFound(_))
        ));
        assert!(matches!(
            assets.fetch("empty.png"),
            Err(AssetFetchError::Empty(_))
        ));
    }

    #[test]
    fn dir_assets_resolve_by_file_name() {
        let assets = DirAssets::new(concat!(env!("CARGO_MANIFEST_DIR"), "/assets"));
        let bytes = assets
            .fetch("https://example.com/fonts/DejaVuSans.ttf?raw=1")
            .unwrap();
        assert!(!bytes.is_empty());
        assert!(assets.fetch("https://example.com/fonts/").is_err());
        assert!(assets.fetch("missing.ttf").is_err());
    }

    #[test]
    fn default_assets_are_remote_urls() {
        let config = AssetConfig::default();
        for url in [
            &config.regular_font_url,
            &config.bold_font_url,
            &config.emblem_url,
        ] {
            assert!(url.starts_with("https://"), "{url}");
        }
        assert_eq!(
            file_name(&config.emblem_url),
            Some("Emblem_of_Thailand.svg")
        );
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: AssetConfig =
            serde_json::from_str(r#"{ "emblemUrl": "https://example.com/crest.png" }"#).unwrap();
        assert_eq!(config.regular_font_url, SARABUN_REGULAR_URL);
        assert_eq!(config.bold_font_url, SARABUN_BOLD_URL);
        assert_eq!(config.emblem_url, "https://example.com/crest.png");
    }
}

use crate::{error::MarketError, models::Album};
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::RwLock;

/// In-memory album store standing in for the relational catalog.
#[derive(Default)]
pub struct Catalog {
    albums: RwLock<BTreeMap<u64, Album>>,
}

impl Catalog {
    pub fn new(albums: Vec<Album>) -> Self {
        Self {
            albums: RwLock::new(albums.into_iter().map(|a| (a.id, a)).collect()),
        }
    }

    /// Seed from a JSON array of albums.
    pub async fn from_json_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        let albums: Vec<Album> = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid catalog JSON in {}", path.display()))?;

        if let Some(bad) = albums
            .iter()
            .find(|a| !a.price_usd.is_finite() || a.price_usd < 0.0)
        {
            bail!("Album {} has invalid price {}", bad.id, bad.price_usd);
        }

        tracing::info!("Loaded {} albums from {}", albums.len(), path.display());
        Ok(Self::new(albums))
    }

    pub async fn get(&self, id: u64) -> Result<Album, MarketError> {
        self.albums
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(MarketError::AlbumNotFound(id))
    }

    /// Newest first. `genre` of `"all"` matches everything; `search` is a
    /// case-insensitive substring of title or artist name.
    pub async fn list(&self, genre: Option<&str>, search: Option<&str>) -> Vec<Album> {
        let genre = genre.filter(|g| !g.is_empty() && !g.eq_ignore_ascii_case("all"));
        let needle = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        self.albums
            .read()
            .await
            .values()
            .rev()
            .filter(|album| match genre {
                Some(g) => album
                    .genre
                    .as_deref()
                    .is_some_and(|ag| ag.eq_ignore_ascii_case(g)),
                None => true,
            })
            .filter(|album| match &needle {
                Some(n) => {
                    album.title.to_lowercase().contains(n)
                        || album.artist_name.to_lowercase().contains(n)
                }
                None => true,
            })
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.albums.read().await.len()
    }
}

// src/fetch/mod.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::join_all;
use reqwest::Client;
use tokio::{fs, sync::Semaphore};
use tracing::{error, info};
use url::Url;

/// Where a dataset file comes from. The dashboards serve their data from a
/// static directory; tools and tests may point at http(s) URLs instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Http(Url),
}

impl Source {
    /// Interpret `s` as an http(s) URL when it parses as one, else as a path.
    pub fn parse(s: &str) -> Source {
        match Url::parse(s) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Source::Http(url),
            _ => Source::File(PathBuf::from(s)),
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Http(url) => write!(f, "{url}"),
        }
    }
}

/// Fetch one dataset file as text.
pub async fn fetch_text(client: &Client, source: &Source) -> Result<String> {
    match source {
        Source::File(path) => fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display())),
        Source::Http(url) => {
            let resp = client
                .get(url.clone())
                .send()
                .await
                .with_context(|| format!("requesting {url}"))?
                .error_for_status()
                .with_context(|| format!("fetching {url}"))?;
            resp.text()
                .await
                .with_context(|| format!("reading body of {url}"))
        }
    }
}

/// Fetch every source concurrently, bounded by `max_in_flight`.
///
/// Each chart's fetch is independent: a failure logs and yields `None` for
/// its slot, the other slots still fill. Results are aligned with the input
/// order.
pub async fn fetch_all(
    client: &Client,
    sources: &[Source],
    max_in_flight: usize,
) -> Vec<Option<String>> {
    let sem = Arc::new(Semaphore::new(max_in_flight.max(1)));
    let handles: Vec<_> = sources
        .iter()
        .cloned()
        .map(|source| {
            let client = client.clone();
            let sem = sem.clone();
            tokio::spawn(async move {
                let _permit = sem.acquire().await.expect("semaphore never closed");
                match fetch_text(&client, &source).await {
                    Ok(text) => {
                        info!(source = %source, bytes = text.len(), "fetched");
                        Some(text)
                    }
                    Err(err) => {
                        error!(source = %source, "fetch failed: {err:#}");
                        None
                    }
                }
            })
        })
        .collect();

    join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.ok().flatten())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn source_parsing() {
        assert_eq!(
            Source::parse("https://example.org/data.csv"),
            Source::Http(Url::parse("https://example.org/data.csv").unwrap())
        );
        assert_eq!(
            Source::parse("data/meat_world.csv"),
            Source::File(PathBuf::from("data/meat_world.csv"))
        );
    }

    #[tokio::test]
    async fn reads_local_files_and_degrades_per_source() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(b"Entity,Year,Annual\nWorld,1987,1.0\n")?;

        let sources = vec![
            Source::File(tmp.path().to_path_buf()),
            Source::File(PathBuf::from("/definitely/not/here.csv")),
        ];
        let client = Client::new();
        let fetched = fetch_all(&client, &sources, 2).await;

        assert_eq!(fetched.len(), 2);
        assert!(fetched[0].as_deref().unwrap().starts_with("Entity,"));
        assert!(fetched[1].is_none());
        Ok(())
    }
}

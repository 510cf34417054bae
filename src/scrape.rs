use crate::error::LinkError;
use crate::models::LinkEntry;
use anyhow::{Context, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info};

static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector"));
static DOWNLOAD_OPTIONS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".item-download-options").expect("static selector"));
static DOWNLOAD_BUTTON: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".download-button").expect("static selector"));

/// Thin GET-and-read-body wrapper around a shared reqwest client.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(proxy: Option<&str>) -> Result<Self> {
        let mut client_builder = Client::builder()
            .timeout(Duration::from_secs(300))
            .user_agent(concat!("archive-dl/", env!("CARGO_PKG_VERSION")));

        if let Some(proxy_url) = proxy {
            client_builder = client_builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        let client = client_builder
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LinkError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))
    }
}

/// True when a detail page carries both the download-options panel and a download button.
pub fn has_download_options(html: &str) -> bool {
    let doc = Html::parse_document(html);
    doc.select(&DOWNLOAD_OPTIONS).next().is_some() && doc.select(&DOWNLOAD_BUTTON).next().is_some()
}

/// File hrefs of a listing page, in page order, duplicates kept.
pub fn extract_links(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    doc.select(&ANCHORS)
        .filter_map(|a| a.value().attr("href"))
        .filter(|h| !h.is_empty())
        .filter(|h| !h.ends_with('/'))
        .filter(|h| !h.starts_with('#'))
        .filter(|h| !h.starts_with('/') && !h.starts_with("https://"))
        .filter(|h| h.contains('.'))
        .map(str::to_string)
        .collect()
}

pub async fn scrape_links(fetcher: &PageFetcher, listing_url: &str) -> Result<Vec<LinkEntry>> {
    let html = fetcher.fetch(listing_url).await?;
    let links: Vec<LinkEntry> = extract_links(&html)
        .iter()
        .map(|h| LinkEntry::new(h))
        .collect();
    info!("Found {} file links on {}", links.len(), listing_url);
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn anchors(hrefs: &[&str]) -> String {
        let body: String = hrefs
            .iter()
            .map(|h| format!("<a href=\"{}\">{}</a>\n", h, h))
            .collect();
        format!("<html><body>{}</body></html>", body)
    }

    #[test]
    fn filter_keeps_only_relative_files() {
        let html = anchors(&[
            "file.jpg",
            "sub/",
            "#top",
            "/root.html",
            "https://archive.org/x",
            "noext",
        ]);
        assert_eq!(extract_links(&html), vec!["file.jpg"]);
    }

    #[test]
    fn filter_preserves_order_and_duplicates() {
        let html = anchors(&["b.png", "a.jpg", "sub/", "b.png", "c%20d.txt"]);
        assert_eq!(
            extract_links(&html),
            vec!["b.png", "a.jpg", "b.png", "c%20d.txt"]
        );
    }

    #[test]
    fn anchors_without_href_are_ignored() {
        let html = "<html><body><a name=\"x.y\">x</a><a href=\"\">e</a><a href=\"ok.zip\">z</a></body></html>";
        assert_eq!(extract_links(html), vec!["ok.zip"]);
    }

    #[test]
    fn download_options_need_both_markers() {
        let both = r#"<div class="item-download-options"><a class="download-button">d</a></div>"#;
        let panel_only = r#"<div class="item-download-options"></div>"#;
        let button_only = r#"<a class="download-button">d</a>"#;

        assert!(has_download_options(both));
        assert!(!has_download_options(panel_only));
        assert!(!has_download_options(button_only));
    }

    #[tokio::test]
    async fn scrape_links_reads_listing_page() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/download/item")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(anchors(&["../", "a.jpg", "b%20c.png", "/details/item"]))
            .create_async()
            .await;

        let fetcher = PageFetcher::new(None).unwrap();
        let url = format!("{}/download/item", server.url());
        let links = scrape_links(&fetcher, &url).await.unwrap();

        let decoded: Vec<&str> = links.iter().map(|l| l.decoded.as_str()).collect();
        assert_eq!(decoded, vec!["a.jpg", "b c.png"]);
    }

    #[tokio::test]
    async fn non_success_status_is_an_http_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/download/missing")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = PageFetcher::new(None).unwrap();
        let url = format!("{}/download/missing", server.url());
        let err = fetcher.fetch(&url).await.unwrap_err();

        match err.downcast_ref::<LinkError>() {
            Some(LinkError::Http { status, .. }) => assert_eq!(*status, 404),
            other => panic!("expected Http error, got {:?}", other),
        }
    }
}

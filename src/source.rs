use crate::error::LinkError;
use crate::scrape::{self, PageFetcher};
use tracing::debug;
use url::Url;

const HOST: &str = "archive.org";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceForm {
    Details,
    Download,
}

/// A remote archive item, in the form the user supplied plus its listing URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub input_url: String,
    pub form: SourceForm,
    pub listing_url: String,
}

impl Source {
    /// Check host and path shape. Does not touch the network.
    pub fn parse(input: &str) -> Result<Self, LinkError> {
        Self::parse_with_hosts(input, &[HOST])
    }

    pub(crate) fn parse_with_hosts(input: &str, hosts: &[&str]) -> Result<Self, LinkError> {
        let url = Url::parse(input).map_err(|e| LinkError::unsupported(input, e.to_string()))?;

        let host = url.host_str().unwrap_or_default();
        let known = hosts
            .iter()
            .any(|h| host == *h || host.ends_with(&format!(".{}", h)));
        if !known {
            return Err(LinkError::unsupported(input, "not an archive.org URL"));
        }

        let (form, id) = if let Some(id) = item_id(url.path(), "/details/") {
            (SourceForm::Details, id)
        } else if let Some(id) = item_id(url.path(), "/download/") {
            (SourceForm::Download, id)
        } else {
            return Err(LinkError::unsupported(
                input,
                "expected a /details/ or /download/ item page",
            ));
        };

        let mut listing = url.clone();
        listing.set_path(&format!("/download/{}", id));
        listing.set_query(None);
        listing.set_fragment(None);

        Ok(Self {
            input_url: input.to_string(),
            form,
            listing_url: listing.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Detail pages must advertise download options; listing pages are taken as-is.
    pub async fn validate(input: &str, fetcher: &PageFetcher) -> anyhow::Result<Self> {
        Self::validate_with_hosts(input, fetcher, &[HOST]).await
    }

    pub(crate) async fn validate_with_hosts(
        input: &str,
        fetcher: &PageFetcher,
        hosts: &[&str],
    ) -> anyhow::Result<Self> {
        let source = Self::parse_with_hosts(input, hosts)?;
        if source.form == SourceForm::Download {
            return Ok(source);
        }

        let html = fetcher.fetch(&source.input_url).await?;
        if !scrape::has_download_options(&html) {
            return Err(LinkError::unsupported(input, "page has no download options").into());
        }
        debug!("{} exposes download options", source.input_url);

        Ok(source)
    }

    /// Full remote URL of one link on the listing page.
    pub fn file_url(&self, link: &str) -> String {
        format!("{}/{}", self.listing_url, link)
    }
}

/// Item path after `prefix`, without surrounding slashes.
fn item_id<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    path.strip_prefix(prefix)
        .map(|id| id.trim_matches('/'))
        .filter(|id| !id.is_empty())
}

use std::fmt;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use fnv::FnvHashSet;
use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use reqwest::header::{HeaderMap, USER_AGENT};
use reqwest::{Client, IntoUrl, Url};
use select::document::Document;

use crate::error::AvizierError;
use crate::publication::{DefaultExtractor, Extractor, Publication};
use crate::storage::PublicationStore;

/// The listing of draft normative acts on `dialogsocial.gov.ro`.
pub const INDEX_URL: &str = "http://dialogsocial.gov.ro/categorie/proiecte-de-acte-normative/";

/// Walks the index pages of a site and stores every publication it finds.
#[derive(Debug)]
pub struct Crawler<TExtractor: Extractor = DefaultExtractor> {
    /// The [`reqwest::Client`] that drives requests.
    client: Client,
    /// Url of the first index page.
    pub index_url: Url,
    /// The [`Extractor`] used for content retrieval.
    ///
    /// Default is [`DefaultExtractor`].
    pub extractor: TExtractor,
    config: Config,
}

impl Crawler {
    /// Convenience method for creating a new [`CrawlerBuilder`]
    ///
    /// Same as calling [`CrawlerBuilder::new`]
    #[inline]
    pub fn builder<T: IntoUrl>(index_url: T) -> Result<CrawlerBuilder> {
        CrawlerBuilder::new(index_url)
    }
}

impl<TExtractor: Extractor> Crawler<TExtractor> {
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Request `url` and parse the response, returning the final url after
    /// redirects along with the document.
    pub async fn get_document(&self, url: Url) -> Result<(Url, Document)> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(AvizierError::from)
            .with_context(|| format!("Request to {} failed", url))?;

        if self.config.http_success_only && !resp.status().is_success() {
            let msg = format!("Unsuccessful request to {}", resp.url());
            return Err(AvizierError::NoHttpSuccess {
                status: resp.status(),
            })
            .context(msg);
        }

        let url = resp.url().to_owned();
        let body = resp
            .bytes()
            .await
            .map_err(AvizierError::from)
            .with_context(|| format!("Failed to read body of {}", url))?;
        let doc = Document::from_read(&*body)
            .with_context(|| format!("Failed to read {} html as document.", url))?;
        debug!("Fetched {}", url);

        Ok((url, doc))
    }

    /// Fetch a single detail page and assemble its publication.
    pub async fn publication(&self, url: Url) -> Result<Publication> {
        let (url, doc) = self.get_document(url).await?;
        let publication = self
            .extractor
            .publication(&url, &doc)
            .with_context(|| format!("Failed to extract publication from {}", url))?;
        Ok(publication)
    }

    /// Visit all index pages, starting at [`Crawler::index_url`], and upsert
    /// every publication into `store`.
    ///
    /// Pages that can't be fetched or don't look like a publication are
    /// logged and skipped. Only a failure of the first index page or of the
    /// store aborts the crawl.
    pub async fn crawl<S: PublicationStore>(&self, store: &mut S) -> Result<CrawlSummary> {
        let mut summary = CrawlSummary::default();
        let mut visited = FnvHashSet::default();
        let mut next_page = Some(self.index_url.clone());

        while let Some(page_url) = next_page.take() {
            if let Some(max_pages) = self.config.max_pages {
                if summary.index_pages >= max_pages {
                    break;
                }
            }
            if !visited.insert(page_url.clone()) {
                warn!("Index page {} was already visited", page_url);
                break;
            }

            let (article_urls, next) = match self.get_document(page_url.clone()).await {
                Ok((url, doc)) => (
                    self.extractor.article_urls(&url, &doc),
                    self.extractor.next_page(&url, &doc),
                ),
                Err(err) if summary.index_pages == 0 => return Err(err),
                Err(err) => {
                    warn!("Stopping at index page {}: {:#}", page_url, err);
                    summary.failed += 1;
                    break;
                }
            };
            summary.index_pages += 1;
            info!(
                "Index page {} lists {} publications",
                page_url,
                article_urls.len()
            );

            self.store_publications(article_urls, store, &mut summary)
                .await?;
            next_page = next;
        }

        info!("{}", summary);
        Ok(summary)
    }

    async fn store_publications<S: PublicationStore>(
        &self,
        urls: Vec<Url>,
        store: &mut S,
        summary: &mut CrawlSummary,
    ) -> Result<()> {
        let mut publications = stream::iter(urls.into_iter().map(|url| async move {
            let res = self.publication(url.clone()).await;
            (url, res)
        }))
        .buffer_unordered(self.config.concurrency.max(1));

        while let Some((url, res)) = publications.next().await {
            match res {
                Ok(publication) => {
                    let record = publication.to_record(self.config.include_documents)?;
                    store
                        .upsert(&publication.identifier, record)
                        .with_context(|| format!("Failed to store publication {}", url))?;
                    debug!("Stored publication {} from {}", publication.identifier, url);
                    summary.saved += 1;
                }
                Err(err) if is_structural_mismatch(&err) => {
                    warn!("Skipping {}: {:#}", url, err);
                    summary.skipped += 1;
                }
                Err(err) => {
                    warn!("Failed to fetch {}: {:#}", url, err);
                    summary.failed += 1;
                }
            }
        }
        Ok(())
    }
}

fn is_structural_mismatch(err: &anyhow::Error) -> bool {
    err.downcast_ref::<AvizierError>()
        .map_or(false, AvizierError::is_structural_mismatch)
}

/// What a crawl did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Index pages visited.
    pub index_pages: usize,
    /// Publications stored.
    pub saved: usize,
    /// Detail pages that didn't have the structure of a publication.
    pub skipped: usize,
    /// Pages that couldn't be fetched.
    pub failed: usize,
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Crawled {} index pages: {} publications saved, {} skipped, {} failed",
            self.index_pages, self.saved, self.skipped, self.failed
        )
    }
}

#[derive(Debug)]
pub struct CrawlerBuilder {
    index_url: Option<Url>,
    config: Option<Config>,
}

impl CrawlerBuilder {
    pub fn new<T: IntoUrl>(index_url: T) -> Result<Self> {
        Ok(Self {
            index_url: Some(index_url.into_url()?),
            config: None,
        })
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build_with_extractor<TExtractor: Extractor>(
        self,
        extractor: TExtractor,
    ) -> Result<Crawler<TExtractor>> {
        let index_url = self
            .index_url
            .context("Url of the index must be initialized.")?;

        if index_url.cannot_be_a_base() {
            return Err(anyhow!("url {:?} can not be a base url", index_url));
        }

        let config = self.config.unwrap_or_default();

        let mut headers = HeaderMap::with_capacity(1);
        headers.insert(
            USER_AGENT,
            config
                .browser_user_agent
                .parse()
                .context("Failed to parse user agent header.")?,
        );

        let client = Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()?;

        Ok(Crawler {
            client,
            index_url,
            extractor,
            config,
        })
    }

    pub fn build(self) -> Result<Crawler> {
        self.build_with_extractor(DefaultExtractor::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Max. number of index pages to visit.
    max_pages: Option<usize>,
    /// Number of detail pages requested at the same time.
    concurrency: usize,
    /// Whether stored records carry the attached documents.
    include_documents: bool,
    /// The user-agent used for requests.
    browser_user_agent: String,
    /// Timeout for requests.
    request_timeout: Duration,
    /// Whether to treat non 2XX responses as failures.
    http_success_only: bool,
}

impl Config {
    /// Default timeout for requests made inside `avizier`.
    pub const DEFAULT_REQ_TIMEOUT_SEC: u64 = 7;

    /// Default number of concurrent detail page requests.
    pub const DEFAULT_CONCURRENCY: usize = 4;

    /// Default user agent for `avizier`.
    #[inline]
    pub(crate) fn user_agent() -> String {
        format!("avizier/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Convenience method to create a [`ConfigBuilder`]
    #[inline]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    #[inline]
    pub fn max_pages(&self) -> Option<usize> {
        self.max_pages
    }

    #[inline]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    #[inline]
    pub fn include_documents(&self) -> bool {
        self.include_documents
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::builder().build()
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    /// Max. number of index pages to visit.
    max_pages: Option<usize>,
    /// Number of detail pages requested at the same time.
    concurrency: Option<usize>,
    /// Whether stored records carry the attached documents.
    include_documents: Option<bool>,
    /// The user-agent used for requests.
    browser_user_agent: Option<String>,
    /// Timeout for requests.
    request_timeout: Option<Duration>,
    /// Whether to treat non 2XX responses as failures.
    http_success_only: Option<bool>,
}

impl ConfigBuilder {
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    pub fn include_documents(mut self, include_documents: bool) -> Self {
        self.include_documents = Some(include_documents);
        self
    }

    pub fn browser_user_agent<T: ToString>(mut self, browser_user_agent: T) -> Self {
        self.browser_user_agent = Some(browser_user_agent.to_string());
        self
    }

    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = Some(request_timeout);
        self
    }

    pub fn http_success_only(mut self, http_success_only: bool) -> Self {
        self.http_success_only = Some(http_success_only);
        self
    }

    pub fn build(self) -> Config {
        Config {
            max_pages: self.max_pages,
            concurrency: self.concurrency.unwrap_or(Config::DEFAULT_CONCURRENCY),
            include_documents: self.include_documents.unwrap_or_default(),
            browser_user_agent: self
                .browser_user_agent
                .unwrap_or_else(Config::user_agent),
            request_timeout: self
                .request_timeout
                .unwrap_or_else(|| Duration::from_secs(Config::DEFAULT_REQ_TIMEOUT_SEC)),
            http_success_only: self.http_success_only.unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Mismatch;

    #[test]
    fn config_defaults() {
        let config = Config::default();
        assert_eq!(config.max_pages(), None);
        assert_eq!(config.concurrency(), Config::DEFAULT_CONCURRENCY);
        assert!(!config.include_documents());
        assert!(config.browser_user_agent.starts_with("avizier/"));
        assert_eq!(config.request_timeout, Duration::from_secs(7));
        assert!(config.http_success_only);
    }

    #[test]
    fn config_overrides() {
        let config = Config::builder()
            .max_pages(3)
            .concurrency(1)
            .include_documents(true)
            .browser_user_agent("test")
            .build();
        assert_eq!(config.max_pages(), Some(3));
        assert_eq!(config.concurrency(), 1);
        assert!(config.include_documents());
        assert_eq!(config.browser_user_agent, "test");
    }

    #[test]
    fn rejects_non_base_index_url() {
        assert!(Crawler::builder("mailto:contact@dialogsocial.gov.ro")
            .and_then(CrawlerBuilder::build)
            .is_err());
        let crawler = Crawler::builder(INDEX_URL).unwrap().build().unwrap();
        assert_eq!(crawler.index_url.as_str(), INDEX_URL);
    }

    #[test]
    fn structural_mismatch_survives_context() {
        let err = anyhow::Error::from(AvizierError::from(Mismatch::MissingArticle))
            .context("Failed to extract publication");
        assert!(is_structural_mismatch(&err));

        let err = anyhow::Error::from(AvizierError::NoHttpSuccess {
            status: reqwest::StatusCode::BAD_GATEWAY,
        })
        .context("Unsuccessful request");
        assert!(!is_structural_mismatch(&err));
    }

    #[test]
    fn summary_display() {
        let summary = CrawlSummary {
            index_pages: 2,
            saved: 18,
            skipped: 1,
            failed: 0,
        };
        assert_eq!(
            summary.to_string(),
            "Crawled 2 index pages: 18 publications saved, 1 skipped, 0 failed"
        );
    }
}

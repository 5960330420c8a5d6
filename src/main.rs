use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use futures::{stream, StreamExt};
use log::info;
use structopt::StructOpt;
use url::Url;

use avizier::crawler::INDEX_URL;
use avizier::{Config, Crawler, Record, SqliteStore};

#[allow(missing_docs)]
#[derive(Debug, StructOpt)]
#[structopt(
    name = "avizier",
    about = "Public consultation notices scraping and classification."
)]
enum App {
    #[structopt(name = "crawl", about = "Store all publications of the index.")]
    Crawl {
        #[structopt(
            long = "index-url",
            help = "The first page of the index.",
            default_value = INDEX_URL
        )]
        index_url: Url,
        #[structopt(
            long = "db",
            help = "The SQLite database to store publications in.",
            default_value = "data.sqlite",
            parse(from_os_str)
        )]
        db: PathBuf,
        #[structopt(flatten)]
        opts: Opts,
    },
    #[structopt(name = "article", about = "Extract single publications")]
    Article {
        #[structopt(name = "urls", help = "The urls of the publications to download.")]
        urls: Vec<Url>,
        #[structopt(
            long = "output",
            short = "o",
            help = "The file to store the publications as json.",
            parse(from_os_str)
        )]
        output: Option<PathBuf>,
        #[structopt(flatten)]
        opts: Opts,
    },
}

impl App {
    async fn run(self) -> anyhow::Result<()> {
        match self {
            App::Crawl { index_url, db, opts } => {
                let crawler = Crawler::builder(index_url)?
                    .config(opts.as_config())
                    .build()?;
                let mut store = SqliteStore::open(&db)
                    .with_context(|| format!("Failed to open database {}", db.display()))?;
                let summary = crawler.crawl(&mut store).await?;
                println!("{}", summary);
                Ok(())
            }
            App::Article {
                urls,
                output,
                opts,
            } => {
                let crawler = Crawler::builder(INDEX_URL)?
                    .config(opts.as_config())
                    .build()?;
                let include_documents = crawler.config().include_documents();
                let records = stream::iter(urls.into_iter().map(|url| crawler.publication(url)))
                    .buffered(crawler.config().concurrency().max(1))
                    .collect::<Vec<_>>()
                    .await
                    .into_iter()
                    .map(|res| res.and_then(|p| Ok(p.to_record(include_documents)?)))
                    .collect::<anyhow::Result<Vec<_>>>()?;
                Self::write(output, records).await
            }
        }
    }

    /// Writes the records as json.
    ///
    /// If a output file is configured, then the records will be stored there,
    /// otherwise to std::out.
    async fn write(out: Option<PathBuf>, records: Vec<Record>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&records)?;
        if let Some(out) = out {
            tokio::fs::write(&out, json).await?;
            info!("Wrote {} publications to {}", records.len(), out.display());
        } else {
            println!("{}", json);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, StructOpt)]
pub struct Opts {
    #[structopt(long = "max-pages", help = "Max number of index pages to visit.")]
    max_pages: Option<usize>,
    #[structopt(
        long = "concurrency",
        help = "Number of publications requested at the same time."
    )]
    concurrency: Option<usize>,
    #[structopt(
        long = "with-documents",
        help = "Store the attached documents with each publication."
    )]
    with_documents: bool,
    #[structopt(long = "user-agent", help = "The user-agent used for requests.")]
    user_agent: Option<String>,
    #[structopt(long = "timeout", help = "Timeout for requests in seconds.")]
    timeout: Option<u64>,
    #[structopt(
        long = "all-responses",
        help = "Parse non 2XX responses instead of treating them as failures."
    )]
    all_responses: bool,
}

impl Opts {
    fn as_config(&self) -> Config {
        let mut config = Config::builder()
            .include_documents(self.with_documents)
            .http_success_only(!self.all_responses);
        if let Some(max_pages) = self.max_pages {
            config = config.max_pages(max_pages);
        }
        if let Some(concurrency) = self.concurrency {
            config = config.concurrency(concurrency);
        }
        if let Some(user_agent) = self.user_agent.clone() {
            config = config.browser_user_agent(user_agent);
        }
        if let Some(timeout) = self.timeout {
            config = config.request_timeout(Duration::from_secs(timeout));
        }

        config.build()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    Ok(App::from_args().run().await?)
}

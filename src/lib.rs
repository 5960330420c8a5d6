pub use classify::{PublicationType, TypeClassifier, TypeRule};
pub use clean::{ArticleContent, ContentExtractor, PageLayout};
pub use crawler::{Config, CrawlSummary, Crawler, CrawlerBuilder};
pub use document::{DocumentFilter, DocumentLink};
pub use error::{AvizierError, Mismatch};
pub use publication::{DefaultExtractor, Extractor, Publication, Record};
pub use storage::{MemoryStore, PublicationStore, SqliteStore};

pub mod classify;
pub mod clean;
pub mod crawler;
pub mod document;
mod error;
pub mod publication;
pub mod storage;
pub mod text;

/// Rexported to implement custom extractors.
pub use select;

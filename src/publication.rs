use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use select::document::Document;
use select::node::Node;
use select::predicate::{Class, Name, Predicate};
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::classify::{PublicationType, TypeClassifier};
use crate::clean::{ContentExtractor, PageLayout};
use crate::document::{DocumentFilter, DocumentLink};
use crate::error::{Mismatch, Result};

lazy_static! {
    /// The article's `id` attribute, e.g. `post-482`.
    pub(crate) static ref RE_POST_ID: Regex = Regex::new(r"^post-(\d+)").unwrap();

    pub(crate) static ref RE_ISO_DATE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
}

/// Institution tag of `dialogsocial.gov.ro`.
pub const DEFAULT_INSTITUTION: &str = "dialog";

/// A record as handed to a [`crate::storage::PublicationStore`].
pub type Record = Map<String, Value>;

/// A public consultation notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Publication {
    /// Stable identifier of the notice on its site.
    pub identifier: String,
    /// The site the notice was published on.
    pub institution: String,
    /// The guessed kind of the proposed act.
    #[serde(rename = "type")]
    pub kind: PublicationType,
    pub title: String,
    pub date: NaiveDate,
    /// Text of the notice.
    pub description: String,
    /// Files attached to the notice.
    pub documents: Vec<DocumentLink>,
}

impl Publication {
    /// The fields of the publication keyed by name.
    ///
    /// `documents` is only part of the record if `include_documents` is set.
    pub fn to_record(&self, include_documents: bool) -> Result<Record> {
        let mut record = match serde_json::to_value(self)? {
            Value::Object(record) => record,
            _ => Record::new(),
        };
        if !include_documents {
            record.remove("documents");
        }
        Ok(record)
    }
}

pub trait Extractor {
    /// Urls of all publications listed on an index page.
    fn article_urls(&self, base_url: &Url, doc: &Document) -> Vec<Url>;

    /// The index page following this one.
    fn next_page(&self, base_url: &Url, doc: &Document) -> Option<Url>;

    /// Assemble the publication of a detail page.
    fn publication(&self, url: &Url, doc: &Document) -> Result<Publication>;
}

/// Extractor for the pages of `dialogsocial.gov.ro`, configurable to other
/// sites built on the same theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultExtractor {
    institution: String,
    content: ContentExtractor,
    classifier: TypeClassifier,
    documents: DocumentFilter,
}

impl DefaultExtractor {
    pub fn institution<T: ToString>(mut self, institution: T) -> Self {
        self.institution = institution.to_string();
        self
    }

    pub fn layout(mut self, layout: PageLayout) -> Self {
        self.content = ContentExtractor::new(layout);
        self
    }

    pub fn classifier(mut self, classifier: TypeClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn document_filter(mut self, documents: DocumentFilter) -> Self {
        self.documents = documents;
        self
    }

    #[inline]
    fn page_layout(&self) -> &PageLayout {
        self.content.layout()
    }

    /// Trimmed text of the page's first title element.
    pub fn title(&self, doc: &Document) -> String {
        doc.find(Name(self.page_layout().title_tag.as_str()))
            .next()
            .map(|node| node.text().trim().to_string())
            .unwrap_or_default()
    }

    /// The digits of the article's `post-<digits>` id.
    pub fn identifier(&self, article: &Node) -> Result<String, Mismatch> {
        let id = article.attr("id").ok_or(Mismatch::MissingIdentifier)?;
        RE_POST_ID
            .captures(id)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| Mismatch::InvalidIdentifier(id.to_string()))
    }

    /// The calendar date of the article's first timestamp.
    ///
    /// Only the leading `YYYY-MM-DD` of the ISO 8601 value is used.
    pub fn date(&self, article: &Node) -> Result<NaiveDate, Mismatch> {
        let layout = self.page_layout();
        let stamp = article
            .find(Name(layout.timestamp_tag.as_str()).and(Class(layout.timestamp_class.as_str())))
            .filter_map(|node| node.attr(layout.timestamp_attr.as_str()))
            .next()
            .ok_or(Mismatch::MissingTimestamp)?;

        stamp
            .get(..10)
            .filter(|day| RE_ISO_DATE.is_match(day))
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
            .ok_or_else(|| Mismatch::InvalidTimestamp(stamp.to_string()))
    }
}

impl Default for DefaultExtractor {
    fn default() -> Self {
        Self {
            institution: DEFAULT_INSTITUTION.to_string(),
            content: ContentExtractor::default(),
            classifier: TypeClassifier::default(),
            documents: DocumentFilter::default(),
        }
    }
}

impl Extractor for DefaultExtractor {
    fn article_urls(&self, base_url: &Url, doc: &Document) -> Vec<Url> {
        let layout = self.page_layout();
        layout
            .articles(doc)
            .filter_map(|article| {
                article
                    .find(Class(layout.entry_title_class.as_str()).descendant(Name("a")))
                    .filter_map(|link| link.attr("href"))
                    .next()
            })
            .filter_map(|href| base_url.join(href).ok())
            .collect()
    }

    fn next_page(&self, base_url: &Url, doc: &Document) -> Option<Url> {
        doc.find(Class(self.page_layout().next_page_class.as_str()).descendant(Name("a")))
            .filter_map(|link| link.attr("href"))
            .next()
            .and_then(|href| base_url.join(href).ok())
    }

    fn publication(&self, url: &Url, doc: &Document) -> Result<Publication> {
        let article = self.page_layout().article(doc)?;

        let identifier = self.identifier(&article)?;
        let date = self.date(&article)?;

        let title = self.title(doc);
        let kind = self.classifier.classify(&title);

        let content = self.content.extract_node(&article);
        let links = content.links.iter().map(|href| {
            url.join(href)
                .map(|link| link.to_string())
                .unwrap_or_else(|_| href.clone())
        });
        let documents = self.documents.filter(links);

        Ok(Publication {
            identifier,
            institution: self.institution.clone(),
            kind,
            title,
            date,
            description: content.text,
            documents,
        })
    }
}

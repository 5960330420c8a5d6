use serde::Serialize;

/// File extensions of the documents attached to a publication.
pub const DOC_EXTENSIONS: [&str; 9] = [
    ".docs", ".doc", ".txt", ".crt", ".xls", ".xml", ".pdf", ".docx", ".xlsx",
];

/// A file attached to a publication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DocumentLink {
    /// Everything after the last `.` of the url.
    #[serde(rename = "type")]
    pub kind: String,
    /// The address of the file.
    pub url: String,
}

impl DocumentLink {
    pub fn new<T: ToString>(url: T) -> Self {
        let url = url.to_string();
        let kind = url.rsplit('.').next().unwrap_or_default().to_string();
        Self { kind, url }
    }
}

/// Selects the links that point to attached files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFilter {
    extensions: Vec<String>,
}

impl DocumentFilter {
    pub fn new<I, T>(extensions: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        Self {
            extensions: extensions.into_iter().map(|ext| ext.to_string()).collect(),
        }
    }

    #[inline]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Whether the link ends with one of the extensions, case sensitive.
    pub fn is_document(&self, link: &str) -> bool {
        self.extensions.iter().any(|ext| link.ends_with(ext.as_str()))
    }

    /// Keep only the document links, in their original order.
    ///
    /// Duplicates are kept.
    pub fn filter<I, T>(&self, links: I) -> Vec<DocumentLink>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        links
            .into_iter()
            .filter(|link| self.is_document(link.as_ref()))
            .map(|link| DocumentLink::new(link.as_ref()))
            .collect()
    }
}

impl Default for DocumentFilter {
    fn default() -> Self {
        DocumentFilter::new(DOC_EXTENSIONS.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_is_case_sensitive() {
        let filter = DocumentFilter::new(vec![".pdf"]);
        assert_eq!(
            filter.filter(vec!["a.pdf", "b.html", "c.PDF"]),
            vec![DocumentLink {
                kind: "pdf".to_string(),
                url: "a.pdf".to_string()
            }]
        );
    }

    #[test]
    fn kind_is_text_after_last_dot() {
        let filter = DocumentFilter::default();
        let docs = filter.filter(vec![
            "http://dialogsocial.gov.ro/wp-content/uploads/2019/03/nota.fundamentare.docx",
            "http://dialogsocial.gov.ro/wp-content/uploads/anexa.docs",
        ]);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].kind, "docx");
        assert_eq!(docs[1].kind, "docs");
    }

    #[test]
    fn keeps_order_and_duplicates() {
        let filter = DocumentFilter::default();
        let docs = filter.filter(vec!["x.xml", "y.pdf", "page/", "x.xml"]);
        let urls: Vec<_> = docs.iter().map(|d| d.url.as_str()).collect();
        assert_eq!(urls, vec!["x.xml", "y.pdf", "x.xml"]);
    }

    #[test]
    fn query_string_is_part_of_the_link() {
        let filter = DocumentFilter::default();
        assert!(!filter.is_document("http://x/a.pdf?dl=1"));
        assert!(filter.is_document("http://x/download?file=a.pdf"));
    }

    #[test]
    fn empty_input() {
        let filter = DocumentFilter::default();
        assert!(filter.filter(Vec::<String>::new()).is_empty());
        assert!(DocumentFilter::new(Vec::<String>::new())
            .filter(vec!["a.pdf"])
            .is_empty());
    }

    #[test]
    fn serializes_kind_as_type() {
        let json = serde_json::to_value(DocumentLink::new("a/b.pdf")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "pdf", "url": "a/b.pdf"}));
    }
}

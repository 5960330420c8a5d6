use select::document::Document;
use select::node::Node;
use select::predicate::{Attr, Class, Name, Predicate};

use crate::error::Mismatch;

/// Where the interesting parts of the site's pages are found.
///
/// Defaults match the WordPress theme of `dialogsocial.gov.ro`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayout {
    /// `id` of the region holding the listing or the article.
    pub content_id: String,
    /// Element name of an article container.
    pub article_tag: String,
    /// Class of an article container.
    pub article_class: String,
    /// Class of the comments widget, the end of the article's content.
    pub marker_class: String,
    /// Element name of the page's title.
    pub title_tag: String,
    /// Class of the element wrapping an article's link on index pages.
    pub entry_title_class: String,
    /// Element name of the publishing timestamp.
    pub timestamp_tag: String,
    /// Class of the publishing timestamp.
    pub timestamp_class: String,
    /// Attribute of the timestamp holding the ISO 8601 value.
    pub timestamp_attr: String,
    /// Class of the element wrapping the link to the next index page.
    pub next_page_class: String,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            content_id: "content".to_string(),
            article_tag: "article".to_string(),
            article_class: "post".to_string(),
            marker_class: "fb-comments".to_string(),
            title_tag: "h1".to_string(),
            entry_title_class: "entry-title".to_string(),
            timestamp_tag: "time".to_string(),
            timestamp_class: "entry-date".to_string(),
            timestamp_attr: "datetime".to_string(),
            next_page_class: "nav-previous".to_string(),
        }
    }
}

impl PageLayout {
    /// All article containers of the content region, in document order.
    pub fn articles<'a>(&'a self, doc: &'a Document) -> impl Iterator<Item = Node<'a>> + 'a {
        doc.find(
            Attr("id", self.content_id.as_str()).descendant(
                Name(self.article_tag.as_str()).and(Class(self.article_class.as_str())),
            ),
        )
    }

    /// The first article container of the page.
    pub fn article<'a>(&'a self, doc: &'a Document) -> Result<Node<'a>, Mismatch> {
        self.articles(doc).next().ok_or(Mismatch::MissingArticle)
    }
}

/// The text and links of an article, up to its comments widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleContent {
    /// Text of the article, trimmed.
    pub text: String,
    /// All `href`s of the article, in document order.
    pub links: Vec<String>,
}

/// Extracts the content of an article, ignoring the comments widget and
/// everything that follows it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentExtractor {
    layout: PageLayout,
}

impl ContentExtractor {
    pub fn new(layout: PageLayout) -> Self {
        Self { layout }
    }

    #[inline]
    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// The first comments widget inside the article.
    pub fn marker<'a>(&self, article: &Node<'a>) -> Option<Node<'a>> {
        article
            .find(Class(self.layout.marker_class.as_str()))
            .next()
    }

    /// Locate the article of the page and extract its content.
    pub fn extract(&self, doc: &Document) -> Result<ArticleContent, Mismatch> {
        let article = self.layout.article(doc)?;
        Ok(self.extract_node(&article))
    }

    /// Extract the content of an already located article.
    ///
    /// The marker and all of its following siblings are skipped together with
    /// their descendants. The document itself is left as is.
    pub fn extract_node(&self, article: &Node) -> ArticleContent {
        fn recur(node: &Node, marker: Option<usize>, content: &mut ArticleContent) {
            if let Some(text) = node.as_text() {
                content.text.push_str(text);
            }
            if node.is(Name("a")) {
                if let Some(href) = node.attr("href") {
                    content.links.push(href.to_string());
                }
            }
            for child in node.children() {
                if Some(child.index()) == marker {
                    break;
                }
                recur(&child, marker, content);
            }
        }

        let marker = self.marker(article).map(|node| node.index());
        let mut content = ArticleContent::default();
        recur(article, marker, &mut content);
        content.text = content.text.trim().to_string();
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(article: &str) -> Document {
        Document::from(
            format!(
                r#"<html><body><h1>Outside</h1><div id="content">{}</div></body></html>"#,
                article
            )
            .as_str(),
        )
    }

    #[test]
    fn prunes_marker_and_following_siblings() {
        let doc = page(
            r#"<article id="post-1" class="post">
                <p>Kept <a href="a.pdf">one</a></p>
                <div class="fb-comments">Comment <a href="c.pdf">c</a></div>
                <p>After one</p>
                <div><span>After two</span><a href="d.pdf">d</a></div>
                <p>After three</p>
            </article>"#,
        );
        let content = ContentExtractor::default().extract(&doc).unwrap();
        assert_eq!(content.text, "Kept one");
        assert_eq!(content.links, vec!["a.pdf".to_string()]);
        for removed in &["Comment", "After one", "After two", "After three"] {
            assert!(!content.text.contains(removed));
        }
    }

    #[test]
    fn nested_marker_only_prunes_its_siblings() {
        let doc = page(
            r#"<article id="post-1" class="post"><div class="entry-content"><p>Body</p><div class="fb-comments">Widget</div><p>Hidden</p></div><footer>Footer</footer></article>"#,
        );
        let content = ContentExtractor::default().extract(&doc).unwrap();
        assert_eq!(content.text, "BodyFooter");
    }

    #[test]
    fn only_first_marker_counts() {
        let doc = page(
            r#"<article class="post"><section><p>A</p><div class="fb-comments">W1</div></section><p>B</p><div class="fb-comments">W2</div></article>"#,
        );
        let content = ContentExtractor::default().extract(&doc).unwrap();
        assert_eq!(content.text, "ABW2");
    }

    #[test]
    fn without_marker_keeps_everything() {
        let doc = page(
            "<article class=\"post\">\n  <p>First   paragraph</p>\n  <p>Second <a href=\"x.doc\">doc</a></p>\n</article>",
        );
        let content = ContentExtractor::default().extract(&doc).unwrap();
        assert_eq!(content.text, "First   paragraph\n  Second doc");
        assert_eq!(content.links, vec!["x.doc".to_string()]);
    }

    #[test]
    fn missing_article() {
        let doc = Document::from(r#"<html><body><article class="post">x</article></body></html>"#);
        assert_eq!(
            ContentExtractor::default().extract(&doc),
            Err(Mismatch::MissingArticle)
        );
    }

    #[test]
    fn document_is_not_mutated() {
        let doc = page(
            r#"<article class="post"><p>Body</p><div class="fb-comments">Widget</div></article>"#,
        );
        let extractor = ContentExtractor::default();
        let first = extractor.extract(&doc).unwrap();
        let second = extractor.extract(&doc).unwrap();
        assert_eq!(first, second);
        let article = extractor.layout().article(&doc).unwrap();
        assert_eq!(article.text(), "BodyWidget");
    }

    #[test]
    fn article_outlives_layout_borrow() {
        let doc = page(
            r#"<article id="post-1" class="post">One</article><article id="post-2" class="post">Two</article>"#,
        );
        let layout = PageLayout::default();
        let article = layout.article(&doc).unwrap();
        assert_eq!(article.attr("id"), Some("post-1"));
        assert_eq!(layout.articles(&doc).count(), 2);
        assert_eq!(ContentExtractor::new(layout.clone()).extract_node(&article).text, "One");
    }

    #[test]
    fn custom_marker() {
        let layout = PageLayout {
            marker_class: "comments".to_string(),
            ..Default::default()
        };
        let doc = page(
            r#"<article class="post"><p>Body</p><div class="comments">Talk</div><div class="fb-comments">Widget</div></article>"#,
        );
        let content = ContentExtractor::new(layout).extract(&doc).unwrap();
        assert_eq!(content.text, "Body");
    }
}

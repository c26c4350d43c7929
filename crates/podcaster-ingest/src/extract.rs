//! Readable-article extraction from fetched HTML.

use readability::extractor;
use scraper::{Html, Selector};
use url::Url;

/// Extracted article: plain text plus the title when the page supplied one.
#[derive(Debug, Clone)]
pub struct Article {
    /// Plain text with boilerplate removed.
    pub text: String,
    /// Title when the extractor found one.
    pub title: Option<String>,
}

/// Run boilerplate removal over an HTML document.
///
/// Primary path is the readability extractor; when it yields nothing usable
/// the paragraphs of the raw document are collected instead, so pages with
/// unusual markup still produce text.
#[must_use]
pub fn extract_article(html: &str, url: &Url) -> Article {
    let mut cursor = std::io::Cursor::new(html.as_bytes());
    if let Ok(product) = extractor::extract(&mut cursor, url) {
        let text = normalize_whitespace(&product.text);
        if !text.is_empty() {
            let title = Some(product.title)
                .filter(|t| !t.trim().is_empty())
                .map(|t| t.trim().to_string());
            return Article { text, title };
        }
    }

    Article {
        text: paragraph_fallback(html),
        title: None,
    }
}

/// Collect `<p>` text as a last resort.
fn paragraph_fallback(html: &str) -> String {
    let document = Html::parse_document(html);
    let selector = Selector::parse("p").expect("static selector is valid");
    let mut out = String::new();
    for p in document.select(&selector) {
        let text: String = p.text().collect::<Vec<_>>().join(" ");
        let text = text.trim();
        if !text.is_empty() {
            if !out.is_empty() {
                out.push_str("\n\n");
            }
            out.push_str(text);
        }
    }
    normalize_whitespace(&out)
}

fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0usize;
    for line in text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_article_body_and_title() {
        let html = r#"<html><head><title>The Title</title></head>
            <body><nav>skip me</nav>
            <article><h1>The Title</h1>
            <p>First paragraph of real content that carries the story.</p>
            <p>Second paragraph with more words to keep readability happy.</p>
            </article></body></html>"#;
        let url = Url::parse("https://example.com/story").unwrap();
        let article = extract_article(html, &url);
        assert!(article.text.contains("First paragraph"));
        assert!(article.text.contains("Second paragraph"));
    }

    #[test]
    fn paragraph_fallback_collects_text() {
        let text = paragraph_fallback("<p>alpha</p><div><p> beta </p></div>");
        assert_eq!(text, "alpha\n\nbeta");
    }

    #[test]
    fn whitespace_is_normalized() {
        assert_eq!(normalize_whitespace("a\n\n\n\nb\n"), "a\n\nb");
    }
}

//! HTML-scraping adapter for the Cosmos (Bluesoft) product catalog.
//!
//! Cosmos has no public JSON endpoint, so the adapter fetches the product
//! page and extracts a name with successive strategies: the description
//! element, the `og:title` meta tag, then the first heading.

use mise_core::OnlineProduct;
use regex::Regex;
use reqwest::{Client, StatusCode};

use crate::SourceError;

/// Looks a barcode up on the catalog site's product page.
///
/// # Errors
///
/// - [`SourceError::Http`] on network failure.
/// - [`SourceError::UnexpectedStatus`] on a non-2xx, non-404 status.
pub(crate) async fn lookup(
    client: &Client,
    base_url: &str,
    code: &str,
) -> Result<Option<OnlineProduct>, SourceError> {
    let url = format!("{base_url}/produtos/{code}");
    let response = client.get(&url).send().await?;

    match response.status() {
        StatusCode::NOT_FOUND => return Ok(None),
        status if !status.is_success() => return Err(SourceError::UnexpectedStatus(status)),
        _ => {}
    }

    let html = response.text().await?;
    Ok(extract_product_name(&html).map(|nome| OnlineProduct {
        nome,
        marca: None,
        categoria: None,
        fonte: "cosmos".to_string(),
    }))
}

/// Runs the extraction strategies in order and returns the first non-empty
/// candidate.
pub(crate) fn extract_product_name(html: &str) -> Option<String> {
    for extract in [extract_description, extract_og_title, extract_h1] {
        let candidate = extract(html);
        if !candidate.is_empty() {
            return Some(candidate);
        }
    }
    None
}

fn extract_description(html: &str) -> String {
    let re = Regex::new(
        r#"(?is)<(span|div|p)[^>]+class\s*=\s*["'][^"']*description[^"']*["'][^>]*>(.*?)</(?:span|div|p)>"#,
    )
    .expect("valid description regex");
    re.captures(html)
        .and_then(|cap| cap.get(2).map(|m| clean_text(m.as_str())))
        .unwrap_or_default()
}

fn extract_og_title(html: &str) -> String {
    let re = Regex::new(
        r#"(?is)<meta[^>]+property\s*=\s*["']og:title["'][^>]+content\s*=\s*["'](.*?)["'][^>]*>"#,
    )
    .expect("valid og title regex");

    if let Some(cap) = re.captures(html) {
        return clean_text(cap.get(1).map_or("", |m| m.as_str()));
    }

    let re_swapped = Regex::new(
        r#"(?is)<meta[^>]+content\s*=\s*["'](.*?)["'][^>]+property\s*=\s*["']og:title["'][^>]*>"#,
    )
    .expect("valid og title fallback regex");

    re_swapped
        .captures(html)
        .and_then(|cap| cap.get(1).map(|m| clean_text(m.as_str())))
        .unwrap_or_default()
}

fn extract_h1(html: &str) -> String {
    let re = Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").expect("valid h1 regex");
    let Some(cap) = re.captures(html) else {
        return String::new();
    };
    clean_text(cap.get(1).map_or("", |m| m.as_str()))
}

/// Strips tags and collapses whitespace.
fn clean_text(input: &str) -> String {
    let tags = Regex::new(r"(?is)<[^>]+>").expect("valid tags regex");
    let no_tags = tags.replace_all(input, " ");
    no_tags
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_element_wins_over_later_strategies() {
        let html = r#"
            <html><head>
              <meta property="og:title" content="Cosmos - Catalogo" />
            </head><body>
              <span class="product-description">Arroz Branco Tipo 1 5kg</span>
              <h1>Pagina do produto</h1>
            </body></html>"#;
        assert_eq!(
            extract_product_name(html).as_deref(),
            Some("Arroz Branco Tipo 1 5kg")
        );
    }

    #[test]
    fn og_title_is_the_second_strategy() {
        let html = r#"<head><meta property="og:title" content="Feijao Preto 1kg" /></head>"#;
        assert_eq!(extract_product_name(html).as_deref(), Some("Feijao Preto 1kg"));
    }

    #[test]
    fn og_title_matches_with_swapped_attribute_order() {
        let html = r#"<meta content="Sabonete Neutro" property="og:title" />"#;
        assert_eq!(extract_product_name(html).as_deref(), Some("Sabonete Neutro"));
    }

    #[test]
    fn first_heading_is_the_last_resort() {
        let html = "<body><h1>  Leite   Integral <b>2L</b> </h1><h1>Outro</h1></body>";
        assert_eq!(extract_product_name(html).as_deref(), Some("Leite Integral 2L"));
    }

    #[test]
    fn empty_page_yields_none() {
        assert!(extract_product_name("<html><body></body></html>").is_none());
    }
}

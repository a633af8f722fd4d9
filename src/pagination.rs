use log::info;
use scraper::{Html, Selector};

use crate::{config::ScrapingConfig, requests::PageSource, text_manipulators::extract_text};

/// Letters rendered as links in the pagination bar. Letters with no members
/// are rendered without an anchor and are left out.
pub fn parse_pagination(html: &str) -> Vec<String> {
    let pages_selector = Selector::parse("ul.pagination").unwrap();
    let anchor_selector = Selector::parse("a").unwrap();

    let document = Html::parse_document(html);
    let Some(pages) = document.select(&pages_selector).next() else {
        return vec![];
    };
    pages
        .select(&anchor_selector)
        .map(|anchor| extract_text(anchor).trim().to_string())
        .collect()
}

pub async fn get_pagination(
    source: &impl PageSource,
    config: &ScrapingConfig,
) -> anyhow::Result<Vec<String>> {
    let url = config.pagination_url()?;
    let html = source.fetch_page(&url).await?;
    let letters = parse_pagination(&html);
    info!("Found {} listing pages: {}", letters.len(), letters.join(" "));
    Ok(letters)
}

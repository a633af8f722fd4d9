use log::{debug, info};
use scraper::{Html, Selector};

use crate::{
    config::ScrapingConfig,
    legislator_string::{MunicipalityEntry, extract_legislator_from_string},
    requests::PageSource,
    text_manipulators::extract_text,
};

// The listing table opens with a "Currently Viewing" row and a column header row.
const HEADER_ROWS: usize = 2;

/// One municipality row of the listing, plus the profile link it carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingRow {
    pub entry: MunicipalityEntry,
    /// Relative path of the member's profile page, empty when the row has no link.
    pub detail_path: String,
}

pub fn parse_listing_page(html: &str) -> Vec<ListingRow> {
    let table_selector = Selector::parse("table.short-table.white").unwrap();
    let row_selector = Selector::parse("tr").unwrap();
    let cell_selector = Selector::parse("td.short-tabletdlf").unwrap();
    let link_selector = Selector::parse("a.btn.btn-default[href]").unwrap();

    let document = Html::parse_document(html);
    let Some(table) = document.select(&table_selector).next() else {
        return vec![];
    };

    table
        .select(&row_selector)
        .skip(HEADER_ROWS)
        .map(|row| {
            let entry = row
                .select(&cell_selector)
                .next()
                .map(|cell| extract_legislator_from_string(&extract_text(cell)))
                .unwrap_or_default();
            let detail_path = row
                .select(&link_selector)
                .next()
                .and_then(|link| link.value().attr("href"))
                .unwrap_or("")
                .to_string();
            ListingRow { entry, detail_path }
        })
        .collect()
}

/// Fetches and parses the listing page for one pagination key.
pub async fn collect_municipality_data(
    source: &impl PageSource,
    config: &ScrapingConfig,
    pagination_key: &str,
) -> anyhow::Result<Vec<ListingRow>> {
    let url = config.listing_url(pagination_key)?;
    debug!("Getting municipality listing from URL: {url}");
    let html = source.fetch_page(&url).await?;
    let rows = parse_listing_page(&html);
    info!("Page {pagination_key}: {} municipality rows", rows.len());
    Ok(rows)
}

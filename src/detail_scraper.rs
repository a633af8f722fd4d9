use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use scraper::{Html, Selector};

use crate::{
    committees::scrape_committees, config::ScrapingConfig, requests::PageSource,
    text_manipulators::extract_text,
};

// Optional leading 1, area code with or without parentheses, then 3 + 4 digits.
// Only the start is anchored so trailing notes like "(Cell)" are tolerated.
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:1[\s.-]?)?(?:\(\d{3}\)|\d{3})[\s.-]?\d{3}[\s.-]?\d{4}").unwrap()
});

/// Contact details and committee memberships from a member profile page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailInfo {
    pub email: String,
    pub phone: String,
    pub committees: String,
}

/// What a profile page actually held. `None` fields are the ones the page
/// was expected to carry but didn't.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub committees: String,
}

/// Returns `None` when the page has no `#main-info` container or no paragraph
/// inside it, i.e. it isn't a member profile at all.
pub fn parse_detail_page(html: &str) -> Option<ProfileFields> {
    let main_info_selector = Selector::parse("div#main-info").unwrap();
    let paragraph_selector = Selector::parse("p").unwrap();
    let email_selector = Selector::parse("a[href]").unwrap();
    let phone_selector = Selector::parse("span.text_right").unwrap();
    let spans_medium_selector = Selector::parse("span.font_weight_m").unwrap();

    let document = Html::parse_document(html);
    let main_info = document.select(&main_info_selector).next()?;
    let info_paragraph = main_info.select(&paragraph_selector).next()?;

    let committees = scrape_committees(main_info.select(&spans_medium_selector));

    let email = info_paragraph
        .select(&email_selector)
        .next()
        .map(|link| extract_text(link).trim().to_string());

    let phone = info_paragraph
        .select(&phone_selector)
        .map(|span| extract_text(span).trim().to_string())
        .find(|text| PHONE_PATTERN.is_match(text));

    Some(ProfileFields {
        email,
        phone,
        committees,
    })
}

/// Fetches one member's profile page. `name` only labels the warnings.
pub async fn scrape_detailed_legislator_info(
    source: &impl PageSource,
    config: &ScrapingConfig,
    path: &str,
    name: &str,
) -> anyhow::Result<DetailInfo> {
    let url = config.detail_url(path)?;
    debug!("Getting legislator data from URL: {url}");
    let html = source.fetch_page(&url).await?;

    let Some(fields) = parse_detail_page(&html) else {
        return Ok(DetailInfo::default());
    };

    let email = fields.email.unwrap_or_else(|| {
        warn!("Email not found for {name}");
        String::new()
    });
    let phone = fields.phone.unwrap_or_else(|| {
        warn!("Phone not found for {name}");
        String::new()
    });

    Ok(DetailInfo {
        email,
        phone,
        committees: fields.committees,
    })
}

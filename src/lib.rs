mod committees;
mod config;
mod detail_scraper;
mod export;
mod legislator_string;
mod listing_scraper;
mod pagination;
mod ratelimit;
mod requests;
mod roster;
mod scraping_context;
mod text_manipulators;
mod url_invalid_error;

#[cfg(test)]
mod test_support;

pub use committees::scrape_committees;
pub use config::{LoadFromEnv, RequestConfig, ScrapingConfig};
pub use detail_scraper::{DetailInfo, ProfileFields, parse_detail_page, scrape_detailed_legislator_info};
pub use export::{LegislatorRecord, write_csv, write_records};
pub use legislator_string::{MunicipalityEntry, extract_legislator_from_string};
pub use listing_scraper::{ListingRow, collect_municipality_data, parse_listing_page};
pub use pagination::{get_pagination, parse_pagination};
pub use ratelimit::RateLimiter;
pub use requests::{PageSource, RequestClient};
pub use roster::{
    MemberOccurrences, build_records, get_most_common_url, group_by_member, resolve_details,
    scrape_roster,
};
pub use scraping_context::ScrapingContext;
pub use url_invalid_error::UrlInvalidError;

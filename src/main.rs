use anyhow::Context;
use dotenv::dotenv;
use legislator_scraper::{ScrapingContext, scrape_roster, write_csv};

extern crate env_logger;
extern crate log;

use log::LevelFilter;

use log::info;

async fn run_roster_scraper_job(context: &ScrapingContext) -> anyhow::Result<()> {
    let records = scrape_roster(&context.request_client, &context.scraping_config).await?;

    let output_path = &context.scraping_config.output_path;
    write_csv(output_path, &records)?;
    info!(
        "CSV file '{}' has been created with {} records.",
        output_path.display(),
        records.len()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let context = ScrapingContext::new().context("failed to set up scraping context")?;
    run_roster_scraper_job(&context).await
}

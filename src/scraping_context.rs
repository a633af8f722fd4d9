use crate::{
    config::{RequestConfig, ScrapingConfig},
    requests::RequestClient,
};

pub struct ScrapingContext {
    pub scraping_config: ScrapingConfig,
    pub request_client: RequestClient,
}

impl ScrapingContext {
    pub fn new() -> anyhow::Result<Self> {
        let scraping_config = ScrapingConfig::new()?;
        let request_config = RequestConfig::new()?;
        let request_client = RequestClient::new(&request_config)?;
        Ok(ScrapingContext {
            scraping_config,
            request_client,
        })
    }
}

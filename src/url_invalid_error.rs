#[derive(Debug)]
pub struct UrlInvalidError {
    pub url: String,
}

impl std::fmt::Display for UrlInvalidError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "The supplied URL is not valid: {}", self.url)
    }
}

impl std::error::Error for UrlInvalidError {}

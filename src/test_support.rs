use std::{collections::HashMap, sync::Mutex};

use anyhow::anyhow;
use reqwest::Url;

use crate::{config::ScrapingConfig, requests::PageSource};

/// Serves canned HTML by URL and remembers what was asked for.
#[derive(Default)]
pub struct FakeSource {
    pages: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config() -> ScrapingConfig {
        ScrapingConfig::for_site("https://leg.maine.gov", "/municipalities").unwrap()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl PageSource for FakeSource {
    async fn fetch_page(&self, url: &Url) -> anyhow::Result<String> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| anyhow!("404 Not Found: {url}"))
    }
}

/// Records every `log` call made on the current thread. Installed once for the
/// whole test binary; each test reads back only what its own thread logged.
struct CapturingLogger;

thread_local! {
    static CAPTURED: std::cell::RefCell<Vec<(log::Level, String)>> =
        const { std::cell::RefCell::new(Vec::new()) };
}

impl log::Log for CapturingLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        CAPTURED.with(|captured| {
            captured
                .borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger;
static INSTALL_LOGGER: std::sync::Once = std::sync::Once::new();

/// Starts a fresh capture for the current thread.
pub fn capture_logs() {
    INSTALL_LOGGER.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(log::LevelFilter::Trace);
    });
    CAPTURED.with(|captured| captured.borrow_mut().clear());
}

/// Messages logged on this thread since `capture_logs`, at `level` or more severe.
pub fn captured_logs(level: log::Level) -> Vec<String> {
    CAPTURED.with(|captured| {
        captured
            .borrow()
            .iter()
            .filter(|(record_level, _)| *record_level <= level)
            .map(|(_, message)| message.clone())
            .collect()
    })
}

pub fn http_response(status_line: &str, headers: &[&str], body: &str) -> String {
    let mut response = format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n",
        body.len()
    );
    for header in headers {
        response.push_str(header);
        response.push_str("\r\n");
    }
    response.push_str("\r\n");
    response.push_str(body);
    response
}

/// A local HTTP server answering each connection with the next canned
/// response; the last one repeats once the list runs out.
pub struct CannedServer {
    pub base_url: String,
    hits: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

impl CannedServer {
    pub async fn start(responses: Vec<String>) -> Self {
        use std::sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        };
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let i = counter.fetch_add(1, Ordering::SeqCst);
                let response = &responses[i.min(responses.len() - 1)];

                let mut request: Vec<u8> = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self { base_url, hits }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn config(&self) -> ScrapingConfig {
        ScrapingConfig::for_site(&self.base_url, "/municipalities").unwrap()
    }
}

/// A real client with a negligible throttle and a 10ms backoff base.
pub fn fast_request_client() -> crate::requests::RequestClient {
    let vars = [
        ("REQUESTS_PER_PERIOD", "1000"),
        ("RATE_LIMIT_PERIOD_SECS", "1"),
        ("MIN_REQUEST_GAP_MS", "1"),
        ("MAX_ATTEMPTS", "3"),
        ("BACKOFF_BASE_MS", "10"),
    ]
    .map(|(k, v)| (k.to_string(), v.to_string()));
    let config: crate::config::RequestConfig = envy::from_iter(vars).unwrap();
    crate::requests::RequestClient::new(&config).unwrap()
}

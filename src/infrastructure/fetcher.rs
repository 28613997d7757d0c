//! Zalando.nl product-page fetcher

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::domain::product::PriceSnapshot;
use crate::shared::errors::FetchError;

/// URL in, snapshot out; the scheduler neither knows nor cares how the
/// page is obtained
#[async_trait]
pub trait ProductFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<PriceSnapshot, FetchError>;
}

const HOMEPAGE: &str = "https://www.zalando.nl/";

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/119.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Safari/605.1.15",
];

// data-testid selectors first, class names change with every frontend deploy
const NAME_SELECTORS: &[&str] = &[
    r#"span[data-testid="product-name"]"#,
    r#"h1[data-testid="product-name"]"#,
    "span.EKabf7",
    "h1.OEhtt9",
    "h1.FZrqF6",
    r#"div[data-testid="product-name"]"#,
];

const PRICE_SELECTORS: &[&str] = &[
    r#"span[data-testid="product-price"]"#,
    "span.sDq_FX",
    "span.VfpFfd",
    "span.QPDz2E",
    r#"p[data-testid="price"]"#,
];

const SOLD_OUT_MARKERS: &[&str] = &["uitverkocht", "niet op voorraad"];

/// Fetches product pages with browser-shaped requests: rotating desktop
/// user-agents, NL locale cookies, a homepage warm-up visit and a session
/// cookie jar
pub struct ZalandoFetcher {
    client: reqwest::Client,
    debug_dump: Option<PathBuf>,
}

impl ZalandoFetcher {
    pub fn new(debug_dump: Option<PathBuf>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .gzip(true)
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self { client, debug_dump })
    }

    fn request_headers() -> HeaderMap {
        let user_agent = USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);

        let mut headers = HeaderMap::new();
        headers.insert("User-Agent", HeaderValue::from_static(user_agent));
        headers.insert(
            "Accept",
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            "Accept-Language",
            HeaderValue::from_static("nl-NL,nl;q=0.9,en-US;q=0.8,en;q=0.7"),
        );
        headers.insert(
            "Cookie",
            HeaderValue::from_static("frsx-enabled=false; language=nl; country=NL"),
        );
        headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
        headers.insert("Sec-Fetch-Dest", HeaderValue::from_static("document"));
        headers.insert("Sec-Fetch-Mode", HeaderValue::from_static("navigate"));
        headers.insert("Sec-Fetch-Site", HeaderValue::from_static("none"));
        headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
        headers.insert("DNT", HeaderValue::from_static("1"));
        headers
    }

    /// Visit the homepage first so the product request carries a session,
    /// then pause briefly like a human would. Failures here are not fatal.
    async fn warm_up(&self) {
        let result = self
            .client
            .get(HOMEPAGE)
            .headers(Self::request_headers())
            .send()
            .await;
        if let Err(err) = result {
            warn!(error = %err, "failed to visit homepage before product fetch");
        }

        let pause = rand::thread_rng().gen_range(2.0..4.0);
        tokio::time::sleep(Duration::from_secs_f64(pause)).await;
    }

    fn dump_debug_body(&self, body: &str) {
        if let Some(path) = &self.debug_dump {
            if let Err(err) = std::fs::write(path, body) {
                warn!(error = %err, path = %path.display(), "failed to dump response body");
            }
        }
    }
}

#[async_trait]
impl ProductFetcher for ZalandoFetcher {
    async fn fetch(&self, url: &str) -> Result<PriceSnapshot, FetchError> {
        self.warm_up().await;

        let response = self
            .client
            .get(url)
            .headers(Self::request_headers())
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        match status.as_u16() {
            403 | 429 => return Err(FetchError::Blocked),
            404 => return Err(FetchError::NotFound),
            _ if !status.is_success() => {
                return Err(FetchError::Network(format!("unexpected status {status}")))
            }
            _ => {}
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        self.dump_debug_body(&body);

        if body.to_lowercase().contains("captcha") {
            return Err(FetchError::Blocked);
        }

        let snapshot = parse_product_page(&body)?;
        debug!(url, price = %snapshot.price, available = snapshot.available, "page parsed");
        Ok(snapshot)
    }
}

/// Pure HTML extraction, kept synchronous so the parsed document never
/// lives across an await point
fn parse_product_page(body: &str) -> Result<PriceSnapshot, FetchError> {
    let doc = Html::parse_document(body);

    let title =
        find_product_name(&doc).ok_or_else(|| FetchError::Parse("product name not found".into()))?;
    let price_text =
        find_price_text(&doc).ok_or_else(|| FetchError::Parse("price element not found".into()))?;
    let price = parse_price_text(&price_text)?;
    let available = !is_sold_out(body);

    Ok(PriceSnapshot::new(price, title, available))
}

fn element_text(element: scraper::ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn find_product_name(doc: &Html) -> Option<String> {
    for selector in NAME_SELECTORS {
        let selector = Selector::parse(selector).ok()?;
        if let Some(element) = doc.select(&selector).next() {
            let text = element_text(element);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }

    // fallback: any heading with product-like content
    let headings = Selector::parse("h1, h2").ok()?;
    doc.select(&headings)
        .map(element_text)
        .find(|text| text.len() > 10)
}

fn looks_like_price(text: &str) -> bool {
    text.contains('€') && text.chars().any(|c| c.is_ascii_digit())
}

fn find_price_text(doc: &Html) -> Option<String> {
    for selector in PRICE_SELECTORS {
        let selector = Selector::parse(selector).ok()?;
        if let Some(element) = doc.select(&selector).map(element_text).find(|t| looks_like_price(t)) {
            return Some(element);
        }
    }

    // fallback: any element with price-like content
    let any = Selector::parse("span, p, div").ok()?;
    doc.select(&any)
        .map(element_text)
        .find(|text| looks_like_price(text))
}

fn is_sold_out(body: &str) -> bool {
    let lower = body.to_lowercase();
    SOLD_OUT_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Normalise Dutch price notation ("1.234,56", "38,99") to an exact decimal
fn parse_price_text(raw: &str) -> Result<Decimal, FetchError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let mut cleaned = cleaned.replace(',', ".");

    // thousands separators leave extra dots, keep only the last one
    if cleaned.matches('.').count() > 1 {
        let parts: Vec<&str> = cleaned.split('.').collect();
        let (last, rest) = parts.split_last().unwrap();
        cleaned = format!("{}.{}", rest.concat(), last);
    }

    let mut price: Decimal = cleaned
        .parse()
        .map_err(|_| FetchError::Parse(format!("unparsable price text: {raw:?}")))?;

    // separator-less values above €1000 are almost always cents
    if !cleaned.contains('.') && price > Decimal::from(1000) {
        price /= Decimal::from(100);
    }

    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn parses_dutch_price_notations() {
        assert_eq!(parse_price_text("38,99 €").unwrap(), dec("38.99"));
        assert_eq!(parse_price_text("€ 1.234,56").unwrap(), dec("1234.56"));
        assert_eq!(parse_price_text("€50").unwrap(), dec("50"));
        assert_eq!(parse_price_text("Vanaf 29,95").unwrap(), dec("29.95"));
    }

    #[test]
    fn treats_large_separator_less_values_as_cents() {
        assert_eq!(parse_price_text("4999").unwrap(), dec("49.99"));
        // with a separator the value is taken at face value
        assert_eq!(parse_price_text("1299,00").unwrap(), dec("1299.00"));
    }

    #[test]
    fn rejects_text_without_digits() {
        assert!(matches!(
            parse_price_text("gratis verzending"),
            Err(FetchError::Parse(_))
        ));
    }

    const PRODUCT_PAGE: &str = r#"
        <html><body>
            <h1 data-testid="product-name">Nike Air Max 90 - Sneakers laag</h1>
            <span data-testid="product-price">59,95&nbsp;€</span>
            <span>gratis verzending</span>
        </body></html>
    "#;

    #[test]
    fn extracts_snapshot_from_product_page() {
        let snapshot = parse_product_page(PRODUCT_PAGE).unwrap();
        assert_eq!(snapshot.title, "Nike Air Max 90 - Sneakers laag");
        assert_eq!(snapshot.price, dec("59.95"));
        assert!(snapshot.available);
    }

    #[test]
    fn falls_back_to_class_selectors() {
        let page = r#"
            <html><body>
                <h1 class="OEhtt9">Adidas Samba OG</h1>
                <span class="sDq_FX">€ 119,95</span>
            </body></html>
        "#;
        let snapshot = parse_product_page(page).unwrap();
        assert_eq!(snapshot.title, "Adidas Samba OG");
        assert_eq!(snapshot.price, dec("119.95"));
    }

    #[test]
    fn detects_sold_out_pages() {
        let page = r#"
            <html><body>
                <h1 data-testid="product-name">Nike Air Max 90 - Sneakers laag</h1>
                <span data-testid="product-price">59,95 €</span>
                <p>Dit artikel is uitverkocht</p>
            </body></html>
        "#;
        let snapshot = parse_product_page(page).unwrap();
        assert!(!snapshot.available);
    }

    #[test]
    fn missing_price_is_a_parse_error() {
        let page = "<html><body><h1 data-testid=\"product-name\">Nike Air Max 90</h1></body></html>";
        assert!(matches!(
            parse_product_page(page),
            Err(FetchError::Parse(_))
        ));
    }
}

//! HTTP crawler for the Daesin dispatch board.
//!
//! The board is a legacy servlet that answers an urlencoded form POST with an
//! EUC-KR HTML page. Route rows live in `table.tab1` tables whose header row
//! carries the column label "노선코드" (line code); everything else on the page
//! is navigation chrome and gets skipped.

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::debug;

use crate::common::DomainError;
use crate::domains::routes::NewRoute;

/// Search-form knobs. The defaults cover the full line-code range, which is
/// what both the scheduled sync and the migration runner want.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub line_start: String,
    pub line_end: String,
    pub line_name: String,
    pub terminal_code: String,
    pub search_opt: String,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            line_start: "100000".to_string(),
            line_end: "999999".to_string(),
            line_name: String::new(),
            terminal_code: String::new(),
            search_opt: "2".to_string(),
        }
    }
}

#[async_trait]
pub trait Crawler: Send + Sync {
    /// Fetch every dispatch record for one `YYYYMMDD` search date.
    async fn crawl(&self, date: &str, options: &CrawlOptions)
        -> Result<Vec<NewRoute>, DomainError>;
}

pub struct DaesinCrawler {
    client: reqwest::Client,
    base_url: String,
}

impl DaesinCrawler {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .unwrap_or_default();
        Self { client, base_url }
    }

    fn parse_routes(html: &str, date: &str) -> Vec<NewRoute> {
        // Selectors are compile-time constants; parse failure is a bug.
        let table_sel = Selector::parse("table.tab1").expect("valid selector");
        let row_sel = Selector::parse("tr").expect("valid selector");
        let cell_sel = Selector::parse("td").expect("valid selector");

        let document = Html::parse_document(html);
        let mut routes = Vec::new();

        for table in document.select(&table_sel) {
            let rows: Vec<_> = table.select(&row_sel).collect();
            if rows.len() < 5 {
                continue;
            }
            let header: String = rows[0].text().collect();
            if !header.contains("노선코드") {
                continue;
            }

            for row in &rows[1..] {
                let cells: Vec<String> = row
                    .select(&cell_sel)
                    .map(|cell| cell.text().collect::<String>().trim().to_string())
                    .collect();
                if cells.len() < 10 {
                    continue;
                }
                let line_code = cells[0].clone();
                if line_code.len() != 6 {
                    continue;
                }

                routes.push(NewRoute {
                    search_date: date.to_string(),
                    line_code,
                    line_name: non_empty(&cells[1]),
                    car_code: non_empty(&cells[2]),
                    car_number: non_empty(&cells[3]),
                    count: parse_int(&cells[6]),
                    quantity: parse_int(&cells[7]),
                    section_fare: parse_fare(&cells[8]),
                    total_fare: parse_fare(&cells[9]),
                });
            }
        }

        routes
    }
}

#[async_trait]
impl Crawler for DaesinCrawler {
    async fn crawl(
        &self,
        date: &str,
        options: &CrawlOptions,
    ) -> Result<Vec<NewRoute>, DomainError> {
        let form = [
            ("mode", "1"),
            ("menuid", "27"),
            ("level", "01"),
            ("levelgrade", "Y"),
            ("centercode", ""),
            ("agencyCode", ""),
            ("cryptoKey", ""),
            ("fdate", date),
            ("searchDelayed", ""),
            ("searchOpt", options.search_opt.as_str()),
            ("line1", options.line_start.as_str()),
            ("line2", options.line_end.as_str()),
            ("lineName", options.line_name.as_str()),
            ("terminalCode", options.terminal_code.as_str()),
            ("arriveArea", ""),
        ];

        let response = self
            .client
            .post(&self.base_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| DomainError::Crawling(e.to_string()))?;

        let html = response
            .text_with_charset("euc-kr")
            .await
            .map_err(|e| DomainError::Crawling(e.to_string()))?;

        let routes = Self::parse_routes(&html, date);
        debug!(date, count = routes.len(), "crawl parsed dispatch board");
        Ok(routes)
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_int(value: &str) -> i32 {
    value.replace(',', "").trim().parse().unwrap_or(0)
}

fn parse_fare(value: &str) -> i64 {
    value.replace(',', "").trim().parse().unwrap_or(0)
}

use crate::http::*;
use encoding_rs::Encoding;
use lazy_static::lazy_static;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error, info, trace, warn};

// segments
// ----------------------------------------------------------------------------

/// One ISIN directory page. `market` keeps the three-way segment id, while
/// `prefix` is the coarser exchange label used in formatted codes; the
/// emerging market trades over the counter, so it shares the TPEX prefix.
pub struct Segment {
    pub market: &'static str,
    pub url: String,
    pub prefix: Prefix,
    pub encoding: &'static Encoding,
}

lazy_static! {
    /// The three directory pages of the TWSE ISIN service; `strMode=2` is
    /// the listed market, `4` the OTC market, `5` the emerging market. All
    /// three are served as Big5 (cp950).
    pub static ref SEGMENTS: [Segment; 3] = [
        Segment {
            market: "TWSE",
            url: "https://isin.twse.com.tw/isin/C_public.jsp?strMode=2".to_string(),
            prefix: Prefix::Twse,
            encoding: encoding_rs::BIG5,
        },
        Segment {
            market: "TPEX",
            url: "https://isin.twse.com.tw/isin/C_public.jsp?strMode=4".to_string(),
            prefix: Prefix::Tpex,
            encoding: encoding_rs::BIG5,
        },
        Segment {
            market: "EMERGING",
            url: "https://isin.twse.com.tw/isin/C_public.jsp?strMode=5".to_string(),
            prefix: Prefix::Tpex,
            encoding: encoding_rs::BIG5,
        },
    ];

    // the security listing is the single table styled with class "h4"
    static ref TABLE_SELECTOR: Selector = Selector::parse("table.h4").expect("valid selector");
    static ref ROW_SELECTOR: Selector = Selector::parse("tr").expect("valid selector");
    static ref CELL_SELECTOR: Selector = Selector::parse("td").expect("valid selector");
}

// scrape
// ----------------------------------------------------------------------------

/// Scrape all three ISIN directory pages into a fresh [`StockMapping`].
///
/// A failed segment is logged and skipped; a partial (or even empty)
/// mapping is still a valid result.
pub async fn scrape() -> anyhow::Result<StockMapping> {
    let http_client = crate::std_client_build();
    let time = std::time::Instant::now();

    let mut mapping = StockMapping::default();
    for segment in SEGMENTS.iter() {
        println!("fetching {} data from {} ...", segment.market, segment.url);
        match scrape_segment(&http_client, segment, &mut mapping).await {
            Ok(count) => println!("{}: {count} rows collected", segment.market),
            Err(err) => {
                error!("failed to scrape the {} segment, error({err})", segment.market);
                println!("{}: skipped ({err})", segment.market);
            }
        }
    }

    debug!(
        "ISIN directory scraped, {} entries. {}",
        mapping.len(),
        crate::time_elapsed(time)
    );

    Ok(mapping)
}

/// Scrape a single directory page into `mapping`, returning the number of
/// accepted rows. A page without the expected `table.h4` yields zero rows,
/// not an error.
pub async fn scrape_segment(
    http_client: &HttpClient,
    segment: &Segment,
    mapping: &mut StockMapping,
) -> anyhow::Result<usize> {
    let body = crate::fetch::fetch_decoded(http_client, &segment.url, segment.encoding).await?;

    let rows = match parse_directory_page(&body) {
        Some(rows) => rows,
        None => {
            warn!(
                "no table.h4 found on the {} directory page; segment skipped",
                segment.market
            );
            return Ok(0);
        }
    };

    let count = rows.len();
    for (code, name) in rows {
        trace!("[{}] {code} {name}", segment.market);
        mapping.insert(
            code,
            SecurityRecord {
                name,
                prefix: segment.prefix,
                market: segment.market.to_string(),
            },
        );
    }

    info!("{} directory parsed, {count} securities", segment.market);
    Ok(count)
}

/// Parse a directory page body into `(code, name)` pairs.
///
/// Returns `None` when the page carries no `table.h4` at all. Within the
/// table, a row is accepted when its first cell splits (on ASCII and
/// ideographic spaces) into at least two tokens and the first token is a
/// 4-, 5- or 6-digit security code; header, footer and section rows fail
/// that shape and are dropped silently.
pub(crate) fn parse_directory_page(body: &str) -> Option<Vec<(String, String)>> {
    let document = Html::parse_document(body);
    let table = document.select(&TABLE_SELECTOR).next()?;

    let mut rows = Vec::new();
    for row in table.select(&ROW_SELECTOR) {
        let cells: Vec<_> = row.select(&CELL_SELECTOR).collect();
        if cells.len() < 2 {
            continue;
        }

        // the first cell reads "1101　台泥", code and name joined by an
        // ideographic space (U+3000)
        let cell = cells[0].text().collect::<String>();
        let cell = cell.replace('\u{3000}', " ");
        let mut tokens = cell.split(' ').map(str::trim).filter(|t| !t.is_empty());

        let (Some(code), Some(name)) = (tokens.next(), tokens.next()) else {
            continue;
        };
        if !is_security_code(code) {
            continue;
        }

        rows.push((code.to_string(), name.to_string()));
    }

    Some(rows)
}

/// Security codes are 4 to 6 ASCII digits; anything else is a header or
/// some other non-security row.
pub(crate) fn is_security_code(code: &str) -> bool {
    matches!(code.len(), 4..=6) && code.bytes().all(|b| b.is_ascii_digit())
}

// data model
// ----------------------------------------------------------------------------

/// Exchange label prepended to formatted codes, e.g. `TWSE:2330`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prefix {
    #[serde(rename = "TWSE")]
    Twse,
    #[serde(rename = "TPEX")]
    Tpex,
}

impl std::fmt::Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prefix::Twse => write!(f, "TWSE"),
            Prefix::Tpex => write!(f, "TPEX"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SecurityRecord {
    pub name: String,
    pub prefix: Prefix,
    pub market: String,
}

/// The persisted `code → record` lookup table.
///
/// Rebuilt wholesale on every run of the mapping builder; codes that drop
/// out of the directory pages drop out of the file. The ordered map keeps
/// the serialized form byte-identical across runs over unchanged sources.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StockMapping(BTreeMap<String, SecurityRecord>);

#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("{path} not found; run `twscreen mapping` first")]
    Missing { path: String },

    #[error("failed to read mapping file {path}: {reason}")]
    Unreadable {
        path: String,
        reason: anyhow::Error,
    },
}

impl StockMapping {
    /// Insert or overwrite a record; last write wins when a code shows up
    /// on more than one directory page.
    pub fn insert(&mut self, code: String, record: SecurityRecord) {
        self.0.insert(code, record);
    }

    pub fn get(&self, code: &str) -> Option<&SecurityRecord> {
        self.0.get(code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Write the whole mapping to `path` as pretty JSON, replacing any
    /// previous file.
    pub async fn save(&self, path: &str) -> anyhow::Result<()> {
        crate::fs::write_json(path, self).await
    }

    /// Load a mapping previously written by [`StockMapping::save`]. A
    /// missing file is the operator's cue to build the mapping first.
    pub async fn load(path: &str) -> Result<Self, MappingError> {
        if !std::path::Path::new(path).exists() {
            return Err(MappingError::Missing {
                path: path.to_string(),
            });
        }
        crate::fs::read_json(path)
            .await
            .map_err(|reason| MappingError::Unreadable {
                path: path.to_string(),
                reason,
            })
    }
}

// tests
// ----------------------------------------------------------------------------

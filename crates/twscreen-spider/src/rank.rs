use crate::http::*;
use crate::mapping::StockMapping;
use colored::Colorize;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// MoneyDJ RS-rank result page. The three positional parameters ride inside
/// the single `A` query field: `x@250` is fixed, `a@` the lookback in weeks,
/// `b@` the minimum rank.
const RANK_URL: &str = "https://moneydj.emega.com.tw/z/zk/zkf/zkResult.asp";

lazy_static! {
    static ref STKLIST_RE: Regex =
        Regex::new(r"parent\.sStklistAll\s*=\s*'([^']+)'").expect("valid regex");
}

// fetch
// ----------------------------------------------------------------------------

pub fn rank_url(base: &str, weeks: u32, min_rank: i32) -> String {
    format!("{base}?D=1&A=x@250,a@{weeks},b@{min_rank}&site=")
}

/// Fetch the codes ranked at or above `min_rank` over the trailing `weeks`.
pub async fn fetch_ranked(weeks: u32, min_rank: i32) -> anyhow::Result<Vec<RankedEntry>> {
    let http_client = crate::std_client_build();
    fetch_ranked_from(&http_client, RANK_URL, weeks, min_rank).await
}

/// As [`fetch_ranked`], against an explicit endpoint.
///
/// A network failure is reported and treated the same as an empty result;
/// the screen run then ends with "no stocks found" instead of aborting.
pub async fn fetch_ranked_from(
    http_client: &HttpClient,
    base: &str,
    weeks: u32,
    min_rank: i32,
) -> anyhow::Result<Vec<RankedEntry>> {
    let url = rank_url(base, weeks, min_rank);
    debug!("fetching RS rank data, weeks: {weeks}, min rank: {min_rank}");

    // the result page is served as Big5
    let body = match crate::fetch::fetch_decoded(http_client, &url, encoding_rs::BIG5).await {
        Ok(body) => body,
        Err(err) => {
            error!("failed to fetch RS rank data, error({err})");
            eprintln!("error fetching RS rank data: {err}");
            return Ok(Vec::new());
        }
    };

    let codes = extract_stock_list(&body);
    if codes.is_empty() {
        warn!("no parent.sStklistAll assignment in the ranking response");
    }

    Ok(codes
        .into_iter()
        .map(|code| RankedEntry {
            code,
            rs_rank: format!(">{min_rank}"),
        })
        .collect())
}

/// Pull the comma-separated code list out of a ranking page body.
///
/// The page assigns a single-quoted literal to the script variable
/// `parent.sStklistAll`; the literal itself is a `\uXXXX`-escaped rendering
/// of the plain list. Returns the decoded codes, or an empty list when the
/// assignment is absent (no results for the query).
pub fn extract_stock_list(body: &str) -> Vec<String> {
    let Some(captures) = STKLIST_RE.captures(body) else {
        return Vec::new();
    };

    unescape_unicode(&captures[1])
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}

// decode `\uXXXX` escape sequences; anything else passes through untouched
fn unescape_unicode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'u') {
            chars.next();
            let hex: String = chars.by_ref().take(4).collect();
            let decoded = if hex.len() == 4 {
                u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
            } else {
                None
            };
            match decoded {
                Some(decoded) => out.push(decoded),
                None => {
                    // not a real escape; keep the text as it came
                    out.push('\\');
                    out.push('u');
                    out.push_str(&hex);
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

// join
// ----------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct RankedEntry {
    pub code: String,
    /// Always the requested threshold rendered as `">{min_rank}"`; the
    /// endpoint does not expose per-stock numeric ranks in this response.
    pub rs_rank: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilteredResult {
    /// Formatted `PREFIX:CODE` identifier.
    pub code: String,
    pub name: String,
    pub rs_rank: String,
}

/// Join ranked codes against the mapping, printing one console line per
/// code. Codes missing from the mapping are reported as `UNKNOWN:` lines
/// only; they never reach the persisted results.
pub fn join(entries: &[RankedEntry], mapping: &StockMapping) -> Vec<FilteredResult> {
    let mut results = Vec::new();
    for entry in entries {
        match mapping.get(&entry.code) {
            Some(record) => {
                let code = format!("{}:{}", record.prefix, entry.code);
                println!("{} ({})", code.green(), record.name);
                results.push(FilteredResult {
                    code,
                    name: record.name.clone(),
                    rs_rank: entry.rs_rank.clone(),
                });
            }
            None => {
                println!(
                    "{} (not in mapping)",
                    format!("UNKNOWN:{}", entry.code).yellow()
                );
            }
        }
    }
    results
}

/// Write the results as pretty JSON to `json_path` and as a single
/// comma-joined line to `txt_path`, returning that line.
pub async fn persist(
    results: &[FilteredResult],
    json_path: &str,
    txt_path: &str,
) -> anyhow::Result<String> {
    crate::fs::write_json(json_path, &results).await?;

    let line = results
        .iter()
        .map(|result| result.code.as_str())
        .collect::<Vec<_>>()
        .join(",");
    crate::fs::write_text(txt_path, &line).await?;

    Ok(line)
}

// tests
// ----------------------------------------------------------------------------

use dialoguer::Input;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;
use twscreen_spider as spider;

/// Run the RS rank screen end to end: collect parameters, fetch the ranked
/// code list, join it against the persisted mapping, and write both output
/// files.
pub(crate) async fn run(weeks: Option<u32>, min_rank: Option<i32>) -> anyhow::Result<()> {
    // flags bypass the prompts; blank input accepts the default; anything
    // non-numeric aborts before any network call
    let weeks = match weeks {
        Some(weeks) => weeks,
        None => prompt("Number of weeks", 1)?,
    };
    anyhow::ensure!(weeks >= 1, "weeks must be at least 1");
    let min_rank = match min_rank {
        Some(min_rank) => min_rank,
        None => prompt("Minimum RS rank", 80)?,
    };
    debug!("screening with weeks: {weeks}, min rank: {min_rank}");

    println!("fetching RS rank data (weeks: {weeks}, min rank: {min_rank}) ...");
    let entries = spider::rank::fetch_ranked(weeks, min_rank).await?;
    if entries.is_empty() {
        println!("no stocks found matching the criteria");
        return Ok(());
    }
    println!("found {} stocks", entries.len());

    let mapping_path = spider::paths::mapping_file();
    let mapping = spider::mapping::StockMapping::load(&mapping_path).await?;

    println!("\nfiltered stocks (RS rank >= {min_rank} over the last {weeks} week(s)):");
    println!("{}", "-".repeat(50));
    let results = spider::rank::join(&entries, &mapping);

    let json_path = spider::paths::result_json();
    let txt_path = spider::paths::result_txt();
    let line = spider::rank::persist(&results, &json_path, &txt_path).await?;

    println!("\ntotal: {} stocks", results.len());
    println!("saved JSON results to {json_path}");
    println!("saved TXT results to {txt_path}");

    // for copy-pasting into a watchlist
    if !line.is_empty() {
        println!("\ncomma-separated list:");
        println!("{line}");
    }

    Ok(())
}

fn prompt<T>(message: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr + Display,
{
    let raw: String = Input::new()
        .with_prompt(format!("{message} (default {default})"))
        .allow_empty(true)
        .interact_text()?;

    parse_or_default(&raw, default)
}

/// Blank input accepts the default; anything else must parse as a number.
fn parse_or_default<T>(raw: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
{
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(default);
    }
    raw.parse::<T>()
        .map_err(|_| anyhow::anyhow!("invalid input `{raw}`; please enter a number"))
}

/// Security code → name mapping, scraped from the [TWSE ISIN] directory pages.
///
/// [TWSE ISIN]: https://isin.twse.com.tw/isin/C_public.jsp?strMode=2
pub mod mapping;

/// Relative-strength screen against the [MoneyDJ] ranking endpoint.
///
/// [MoneyDJ]: https://moneydj.emega.com.tw/z/zk/zkf/zkResult.asp
pub mod rank;

pub mod fs;

pub(crate) mod fetch;

/// Shortcut for required API elements.
pub(crate) mod http {
    pub(crate) use reqwest::Client as HttpClient;
}

/// Output file locations, overridable through the environment.
pub mod paths {
    use dotenv::var;

    pub fn mapping_file() -> String {
        var("MAPPING_FILE").unwrap_or_else(|_| "stock_mapping.json".to_string())
    }

    pub fn result_json() -> String {
        var("RESULT_JSON").unwrap_or_else(|_| "filtered_stocks.json".to_string())
    }

    pub fn result_txt() -> String {
        var("RESULT_TXT").unwrap_or_else(|_| "filtered_stocks.txt".to_string())
    }
}

pub(crate) fn std_client_build() -> http::HttpClient {
    reqwest::ClientBuilder::new()
        .build()
        .expect("failed to build reqwest client")
}

pub(crate) fn time_elapsed(time: std::time::Instant) -> String {
    format!("time elapsed: {:?}", time.elapsed())
}

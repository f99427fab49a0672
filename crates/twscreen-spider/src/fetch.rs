use crate::http::*;
use encoding_rs::Encoding;
use tracing::{error, trace, warn};

/// GET request `url` and decode the raw body with `encoding`.
///
/// Both source sites serve legacy Big5 pages; decoding through the declared
/// encoding, rather than assuming UTF-8, is what keeps the security names
/// intact.
pub(crate) async fn fetch_decoded(
    http_client: &HttpClient,
    url: &str,
    encoding: &'static Encoding,
) -> anyhow::Result<String> {
    trace!("GET {url}, decoding as {}", encoding.name());
    let bytes = http_client
        .get(url)
        .send()
        .await
        .map_err(|err| {
            error!("failed to fetch {url}, error({err})");
            err
        })?
        .bytes()
        .await
        .map_err(|err| {
            error!("failed to read response body from {url}, error({err})");
            err
        })?;

    let (text, _, had_errors) = encoding.decode(&bytes);
    if had_errors {
        warn!(
            "malformed {} byte sequences in the response from {url}",
            encoding.name()
        );
    }

    Ok(text.into_owned())
}

use tracing::trace;

/// Reads a `.json` file from `path`.
pub async fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    trace!("reading file path: {path}");
    let file = tokio::fs::read(path).await?;
    trace!("file read; deserializing bytes ...");
    let data: T = serde_json::from_slice(&file)?;
    Ok(data)
}

/// Serialize `data` as pretty-printed JSON and write it to `path`,
/// replacing any previous content.
pub async fn write_json<T: serde::Serialize>(path: &str, data: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    trace!("writing {} bytes to {path}", json.len());
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Write a plain UTF-8 string to `path`, replacing any previous content.
pub async fn write_text(path: &str, text: &str) -> anyhow::Result<()> {
    trace!("writing {} bytes to {path}", text.len());
    tokio::fs::write(path, text).await?;
    Ok(())
}

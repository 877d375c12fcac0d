//! URL helpers shared by the backend client and the relay client.

use url::Url;

/// Parse a base URL, accepting only `http`/`https` URLs that can carry a path.
pub fn parse_base_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err("expected an http(s) base URL".to_string());
    }
    Ok(url)
}

/// Append percent-encoded path segments to `base`, keeping any base path.
pub fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

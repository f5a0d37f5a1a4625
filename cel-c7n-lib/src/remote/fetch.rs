use crate::Result;
use flate2::read::GzDecoder;
use ohno::{IntoAppError, bail};
use reqwest::header::{ACCEPT_ENCODING, CONTENT_ENCODING, HeaderMap};
use std::io::Read;

const LOG_TARGET: &str = "    remote";

const USER_AGENT: &str = concat!("cel-c7n/", env!("CARGO_PKG_VERSION"));

/// Map object-store URLs onto their HTTPS endpoint; other URLs pass through unchanged
///
/// `s3://bucket/key` becomes `https://bucket.s3.amazonaws.com/key`.
#[must_use]
pub fn resolve_url(url: &str) -> String {
    url.strip_prefix("s3://").map_or_else(
        || url.to_string(),
        |rest| {
            let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
            format!("https://{bucket}.s3.amazonaws.com/{key}")
        },
    )
}

/// Read the body of a URL as text
///
/// Asks for gzip and decompresses when the response says it is gzip-encoded. This blocks
/// the calling thread for the duration of the request.
///
/// # Errors
///
/// Returns an error on transport failure, a non-success status, a corrupt gzip body, or a
/// body that is not UTF-8.
pub fn text_from(url: &str) -> Result<String> {
    let url = resolve_url(url);
    log::debug!(target: LOG_TARGET, "Fetching '{url}'");

    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .into_app_err("unable to create HTTP client")?;

    let response = client
        .get(&url)
        .header(ACCEPT_ENCODING, "gzip")
        .send()
        .into_app_err_with(|| format!("unable to fetch '{url}'"))?;

    let status = response.status();
    if !status.is_success() {
        bail!("unable to fetch '{url}': HTTP {status}");
    }

    let gzipped = is_gzip(response.headers());
    let body = response.bytes().into_app_err_with(|| format!("unable to read response body from '{url}'"))?;
    log::debug!(target: LOG_TARGET, "Received {} bytes from '{url}' (gzip: {gzipped})", body.len());

    if gzipped {
        decompress(&body).into_app_err_with(|| format!("unable to decompress response body from '{url}'"))
    } else {
        String::from_utf8(body.to_vec()).into_app_err_with(|| format!("response body from '{url}' is not UTF-8"))
    }
}

fn is_gzip(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("gzip"))
}

fn decompress(body: &[u8]) -> std::io::Result<String> {
    let mut text = String::new();
    let _ = GzDecoder::new(body).read_to_string(&mut text)?;
    Ok(text)
}

use super::*;

/// Mergeable destination markup. `None` from `fetch_page` means the
/// navigation is not ours to handle.
#[derive(Debug, Clone)]
pub(crate) struct FetchedPage {
    pub(crate) html: String,
    pub(crate) media_type: String,
    /// Final URL when the transport was redirected; history must record
    /// where the content actually came from.
    pub(crate) redirected: Option<String>,
}

const MERGEABLE_MEDIA_TYPES: [&str; 2] = ["text/html", "application/xhtml+xml"];

pub(crate) fn fetch_page<W: Window>(window: &mut W, url: &str) -> Option<FetchedPage> {
    let response = window.fetch(url)?;
    // drop charset and other parameters before comparing
    let media_type = response
        .content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    if !MERGEABLE_MEDIA_TYPES.contains(&media_type.as_str()) {
        // anything else is for the browser, not for us
        return None;
    }
    Some(FetchedPage {
        html: response.body,
        media_type,
        redirected: response.redirected,
    })
}

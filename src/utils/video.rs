// src/utils/video.rs

use url::Url;

use crate::config::VIDEO_SEARCH_BASE;

/// Builds the explanatory video search link for a subject.
/// Returns `None` for a blank search phrase.
pub fn video_search_url(search_phrase: &str) -> Option<String> {
    let phrase = search_phrase.trim();
    if phrase.is_empty() {
        return None;
    }

    Url::parse_with_params(VIDEO_SEARCH_BASE, &[("search_query", phrase)])
        .ok()
        .map(String::from)
}

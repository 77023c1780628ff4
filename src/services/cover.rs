//! Cover URL normalization.

use crate::scrapers::SiteConfig;

/// Rewrite covers on unstable third-party hosts to the first-party image
/// endpoint for `entry_id`. Other URLs pass through unchanged.
pub fn normalize_cover_url(url: Option<&str>, entry_id: i64, site: &SiteConfig) -> Option<String> {
    let url = url.map(str::trim).filter(|u| !u.is_empty())?;
    if site.is_unstable_image_host(url) {
        Some(site.cover_url(entry_id))
    } else {
        Some(url.to_string())
    }
}

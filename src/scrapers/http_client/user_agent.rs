//! User agent pool for outbound requests.

use rand::seq::SliceRandom;
use rand::RngCore;

/// Fallback when a configured pool is empty.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/105.0.0.0 Safari/537.36";

/// Desktop browser user agents the upstream site serves full pages to.
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    // Chrome on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/105.0.0.0 Safari/537.36",
    // Chrome on Mac
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/105.0.0.0 Safari/537.36",
    // Chrome on 32-bit Windows
    "Mozilla/5.0 (Windows NT 10.0; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/105.0.0.0 Safari/537.36",
];

/// Pick a user agent uniformly from `pool`.
pub fn pick_user_agent<'a>(pool: &'a [String], rng: &mut dyn RngCore) -> &'a str {
    pool.choose(rng).map(|s| s.as_str()).unwrap_or(USER_AGENT)
}

//! URL classification against the curated site lists

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

pub const DISTRACTING_SITES: &[&str] = &[
    "youtube.com",
    "facebook.com",
    "twitter.com",
    "instagram.com",
    "reddit.com",
    "tiktok.com",
    "netflix.com",
    "discord.com",
];

pub const WORK_SITES: &[&str] = &[
    "github.com",
    "gitlab.com",
    "notion.so",
    "slack.com",
    "trello.com",
    "asana.com",
];

pub const RESEARCH_SITES: &[&str] = &[
    "google.com",
    "stackoverflow.com",
    "developer.mozilla.org",
    "medium.com",
    "wikipedia.org",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Distracting,
    Work,
    Research,
    Other,
}

/// Lists in precedence order; the first match wins
const PRECEDENCE: &[(Category, &[&str])] = &[
    (Category::Distracting, DISTRACTING_SITES),
    (Category::Work, WORK_SITES),
    (Category::Research, RESEARCH_SITES),
];

/// Lower-cased hostname of `url`
pub fn hostname(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|source| Error::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    parsed
        .host_str()
        .map(|host| host.to_lowercase())
        .ok_or_else(|| Error::MissingHost(url.to_string()))
}

pub fn classify(url: &str) -> Result<Category> {
    hostname(url).map(|host| classify_host(&host))
}

pub fn classify_host(host: &str) -> Category {
    let host = host.to_lowercase();
    PRECEDENCE
        .iter()
        .find(|(_, sites)| sites.iter().any(|site| host.contains(site)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}

/// Hostname of `url` if it is on the distracting list
pub fn distracting_host(url: &str) -> Option<String> {
    let host = hostname(url).ok()?;
    (classify_host(&host) == Category::Distracting).then_some(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_each_list() {
        assert_eq!(classify("https://www.youtube.com/watch?v=1").unwrap(), Category::Distracting);
        assert_eq!(classify("https://github.com/rust-lang/rust").unwrap(), Category::Work);
        assert_eq!(classify("https://en.wikipedia.org/wiki/Rust").unwrap(), Category::Research);
        assert_eq!(classify("https://example.org").unwrap(), Category::Other);
    }

    #[test]
    fn test_hostname_is_case_insensitive() {
        assert_eq!(classify("https://WWW.Reddit.COM/r/rust").unwrap(), Category::Distracting);
        assert_eq!(classify_host("M.YouTube.com"), Category::Distracting);
    }

    #[test]
    fn test_distracting_wins_over_other_lists() {
        // Matches both the distracting and research lists
        assert_eq!(classify_host("youtube.com.google.com"), Category::Distracting);
        assert_eq!(classify_host("github.com.reddit.com"), Category::Distracting);
        // Work outranks research
        assert_eq!(classify_host("github.com.medium.com"), Category::Work);
    }

    #[test]
    fn test_classify_is_deterministic() {
        for host in ["youtube.com", "notion.so", "stackoverflow.com", "localhost", ""] {
            let first = classify_host(host);
            assert_eq!(first, classify_host(host));
        }
    }

    #[test]
    fn test_malformed_url_is_an_error() {
        assert!(matches!(classify("not a url"), Err(Error::InvalidUrl { .. })));
        assert!(matches!(classify("data:text/plain,hi"), Err(Error::MissingHost(_))));
        assert_eq!(distracting_host("not a url"), None);
        assert_eq!(distracting_host("https://tiktok.com/@x").as_deref(), Some("tiktok.com"));
    }
}

//! Fixed channel catalog.
//!
//! Channels map to the upstream API's `category` parameter, except for the
//! two reserved pseudo-channels: `general` (default recommendation feed) and
//! `hot` (trending topics, served entirely from the local synthesizer).

/// Code of the default recommendation channel. Pinned at position 0 of the
/// user's selection and never removable.
pub const GENERAL: &str = "general";

/// Code of the trending-topics channel. Pinned at position 1 of the user's
/// selection, never removable, and never fetched from the network.
pub const HOT: &str = "hot";

/// A named content category filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Upstream category code (e.g. "sports").
    pub code: &'static str,
    /// Display name for presentation layers.
    pub name: &'static str,
}

/// Every channel the reader knows about, in catalog order.
pub const ALL_CHANNELS: &[Channel] = &[
    Channel { code: GENERAL, name: "For You" },
    Channel { code: HOT, name: "Trending" },
    Channel { code: "world", name: "World" },
    Channel { code: "nation", name: "Nation" },
    Channel { code: "business", name: "Business" },
    Channel { code: "technology", name: "Technology" },
    Channel { code: "entertainment", name: "Entertainment" },
    Channel { code: "sports", name: "Sports" },
    Channel { code: "science", name: "Science" },
    Channel { code: "health", name: "Health" },
];

/// Look up a channel by its code.
pub fn find(code: &str) -> Option<&'static Channel> {
    ALL_CHANNELS.iter().find(|c| c.code == code)
}

/// Human-readable label for a channel code, used by the mock generator to
/// stamp synthetic headlines. Unknown codes fall back to a generic label.
pub fn label(code: &str) -> &'static str {
    find(code).map(|c| c.name).unwrap_or("News")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_channels_lead_catalog() {
        assert_eq!(ALL_CHANNELS[0].code, GENERAL);
        assert_eq!(ALL_CHANNELS[1].code, HOT);
    }

    #[test]
    fn test_find_known_and_unknown() {
        assert_eq!(find("sports").map(|c| c.name), Some("Sports"));
        assert!(find("weather").is_none());
    }

    #[test]
    fn test_label_fallback() {
        assert_eq!(label("technology"), "Technology");
        assert_eq!(label("no-such-channel"), "News");
    }

    #[test]
    fn test_codes_are_unique() {
        for (i, a) in ALL_CHANNELS.iter().enumerate() {
            for b in &ALL_CHANNELS[i + 1..] {
                assert_ne!(a.code, b.code);
            }
        }
    }
}

//! Synthetic article payloads.
//!
//! Two generators feed the mediator when the network cannot: `mock_page`
//! stands in for any channel or search when the API yields nothing (quota
//! exhaustion, offline), and `hot_page` is the only source the trending
//! channel ever has. Both emit the same loosely-typed payload shape the wire
//! does, so everything downstream goes through the one mapper.

use sha2::{Digest, Sha256};

use super::PAGE_SIZE;
use crate::channel;
use crate::remote::{RawArticle, RawSource};

/// Topic phrases the trending synthesizer cycles through.
const HOT_TOPICS: &[&str] = &[
    "Markets rally on rate cut hopes",
    "Playoff race tightens in final week",
    "New flagship phone breaks preorder records",
    "Storm system moves up the coast",
    "Streaming hit renewed for third season",
    "Breakthrough battery promises faster charging",
    "Museum reopens after decade-long restoration",
    "Vaccine trial reports strong results",
];

fn mock_source() -> Option<RawSource> {
    Some(RawSource {
        name: Some("Newswire Mock".to_string()),
        url: Some("local".to_string()),
    })
}

/// Short hash embedded in mock image urls so repeated refreshes (fresh salt)
/// visibly change the pictures while staying deterministic per call.
fn image_seed(label: &str, page: u32, index: u32, salt: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(label.as_bytes());
    hasher.update(page.to_le_bytes());
    hasher.update(index.to_le_bytes());
    hasher.update(salt.to_le_bytes());
    let digest = hasher.finalize();
    digest[..4].iter().map(|b| format!("{:02x}", b)).collect()
}

/// Generate one page of placeholder articles for a channel or search.
///
/// Exactly [`PAGE_SIZE`] payloads. Urls are parameterized by channel/query,
/// page, index, and the per-call salt, so no two calls collide and duplicate
/// insertion across pages stays deliberate rather than accidental.
pub fn mock_page(page: u32, channel_code: &str, query: Option<&str>, salt: u64) -> Vec<RawArticle> {
    let label = match query.filter(|q| !q.is_empty()) {
        Some(q) => format!("search: {}", q),
        None => channel::label(channel_code).to_string(),
    };
    let path = match query.filter(|q| !q.is_empty()) {
        Some(q) => format!("search/{}", q),
        None => channel_code.to_string(),
    };

    (1..=PAGE_SIZE)
        .map(|i| RawArticle {
            title: Some(format!("[{}] page {}: sample headline No.{}", label, page, i)),
            description: Some(format!(
                "{} — the remote source returned nothing, so this placeholder keeps the feed scrolling.",
                label
            )),
            content: Some("Placeholder article body.".to_string()),
            url: Some(format!(
                "https://mock.newswire.local/{}/{}/{}?s={:016x}",
                path, page, i, salt
            )),
            image_url: Some(format!(
                "https://picsum.photos/400/300?random={}",
                image_seed(&label, page, i, salt)
            )),
            published_at: Some("2026-08-25".to_string()),
            source: mock_source(),
        })
        .collect()
}

/// Synthesize one page of the trending-topics ranked list.
///
/// Rank runs continuously across pages: `(page - 1) * PAGE_SIZE + i`. The
/// topic phrase set cycles and each entry carries a synthesized heat score in
/// its description. The mediator forces `HotRank` layout on every row of
/// this channel after mapping.
pub fn hot_page(page: u32) -> Vec<RawArticle> {
    (1..=PAGE_SIZE)
        .map(|i| {
            let rank = (page - 1) * PAGE_SIZE + i;
            let phrase = HOT_TOPICS[((rank - 1) as usize) % HOT_TOPICS.len()];
            // Heat decays with rank but never reaches zero
            let heat = 1_500_000u64.saturating_sub(rank as u64 * 12_345).max(10_000);
            RawArticle {
                title: Some(format!("{}. {}", rank, phrase)),
                description: Some(format!("{} reading now", heat)),
                content: None,
                url: Some(format!("https://mock.newswire.local/hot/{}/{}", page, i)),
                image_url: None,
                published_at: Some("2026-08-25".to_string()),
                source: mock_source(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_page_yields_full_page() {
        let articles = mock_page(1, "technology", None, 42);
        assert_eq!(articles.len(), PAGE_SIZE as usize);
        for a in &articles {
            assert!(a.title.as_deref().unwrap().contains("Technology"));
            assert!(a.url.is_some());
            assert!(a.image_url.is_some());
        }
    }

    #[test]
    fn test_mock_urls_unique_within_and_across_calls() {
        let first = mock_page(1, "technology", None, 1);
        let second = mock_page(1, "technology", None, 2);

        let mut urls: Vec<String> = first
            .iter()
            .chain(second.iter())
            .filter_map(|a| a.url.clone())
            .collect();
        let total = urls.len();
        urls.sort();
        urls.dedup();
        assert_eq!(urls.len(), total, "salt must keep repeated calls distinct");
    }

    #[test]
    fn test_mock_page_query_labels_and_path() {
        let articles = mock_page(2, "technology", Some("rust"), 7);
        let first = &articles[0];
        assert!(first.title.as_deref().unwrap().contains("search: rust"));
        assert!(first.url.as_deref().unwrap().contains("/search/rust/2/1"));
    }

    #[test]
    fn test_mock_images_differ_by_salt() {
        let a = mock_page(1, "sports", None, 1);
        let b = mock_page(1, "sports", None, 2);
        assert_ne!(a[0].image_url, b[0].image_url);
    }

    #[test]
    fn test_hot_page_ranks_continue_across_pages() {
        let page1 = hot_page(1);
        let page3 = hot_page(3);
        assert!(page1[0].title.as_deref().unwrap().starts_with("1. "));
        assert!(page1[9].title.as_deref().unwrap().starts_with("10. "));
        assert!(page3[0].title.as_deref().unwrap().starts_with("21. "));
        assert!(page3[4].title.as_deref().unwrap().starts_with("25. "));
    }

    #[test]
    fn test_hot_page_cycles_phrases_and_scores() {
        let page1 = hot_page(1);
        let page2 = hot_page(2);
        // 8 phrases cycling: rank 9 reuses phrase of rank 1
        let phrase_of = |title: &str| title.split_once(". ").unwrap().1.to_string();
        assert_eq!(
            phrase_of(page1[0].title.as_deref().unwrap()),
            phrase_of(page1[8].title.as_deref().unwrap())
        );
        // Heat decays with rank
        let heat_of = |a: &RawArticle| -> u64 {
            a.description
                .as_deref()
                .unwrap()
                .split_whitespace()
                .next()
                .unwrap()
                .parse()
                .unwrap()
        };
        assert!(heat_of(&page1[0]) > heat_of(&page2[0]));
    }
}

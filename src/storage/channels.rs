use anyhow::Result;

use super::schema::Database;
use crate::channel::{self, Channel, GENERAL, HOT};

/// Preference key holding the user's channel selection as comma-joined codes.
const KEY_MY_CHANNELS: &str = "channels.mine";

/// Selection used when no saved value exists yet.
const DEFAULT_CHANNELS: &[&str] = &[GENERAL, HOT, "technology", "sports", "entertainment"];

impl Database {
    // ========================================================================
    // Channel Selection
    // ========================================================================

    /// The user's followed channels, in their chosen order.
    ///
    /// `general` is always at position 0 and `hot` at position 1 regardless of
    /// what was saved; codes no longer present in the catalog are dropped.
    /// First use yields the default selection.
    pub async fn my_channels(&self) -> Result<Vec<&'static Channel>> {
        let saved = self.get_preference(KEY_MY_CHANNELS).await?;
        let codes: Vec<String> = match saved {
            Some(joined) => joined
                .split(',')
                .filter(|code| !code.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_CHANNELS.iter().map(|c| c.to_string()).collect(),
        };

        let mut channels: Vec<&'static Channel> = codes
            .iter()
            .filter_map(|code| channel::find(code))
            .filter(|c| c.code != GENERAL && c.code != HOT)
            .collect();

        // Pinned pseudo-channels lead the list and cannot be saved away
        channels.insert(0, channel::find(HOT).expect("catalog contains hot"));
        channels.insert(0, channel::find(GENERAL).expect("catalog contains general"));

        Ok(channels)
    }

    /// Catalog channels the user has not followed ("recommended").
    pub async fn other_channels(&self) -> Result<Vec<&'static Channel>> {
        let mine = self.my_channels().await?;
        Ok(channel::ALL_CHANNELS
            .iter()
            .filter(|c| !mine.iter().any(|m| m.code == c.code))
            .collect())
    }

    /// Follow a channel. Unknown codes and duplicates are no-ops.
    /// Persists immediately.
    pub async fn add_channel(&self, code: &str) -> Result<()> {
        if channel::find(code).is_none() {
            return Ok(());
        }
        let mut mine = self.my_channels().await?;
        if mine.iter().any(|c| c.code == code) {
            return Ok(());
        }
        mine.push(channel::find(code).expect("validated above"));
        self.save_channels(&mine).await
    }

    /// Unfollow a channel. The pinned `general` and `hot` channels cannot be
    /// removed. Persists immediately.
    pub async fn remove_channel(&self, code: &str) -> Result<()> {
        if code == GENERAL || code == HOT {
            return Ok(());
        }
        let mut mine = self.my_channels().await?;
        mine.retain(|c| c.code != code);
        self.save_channels(&mine).await
    }

    async fn save_channels(&self, mine: &[&'static Channel]) -> Result<()> {
        let joined = mine
            .iter()
            .map(|c| c.code)
            .collect::<Vec<_>>()
            .join(",");
        self.set_preference(KEY_MY_CHANNELS, &joined).await
    }
}

#[cfg(test)]
mod tests {
    use crate::channel::{GENERAL, HOT};
    use crate::storage::Database;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    fn codes(channels: &[&'static crate::channel::Channel]) -> Vec<&'static str> {
        channels.iter().map(|c| c.code).collect()
    }

    #[tokio::test]
    async fn test_first_use_yields_defaults_with_pins() {
        let db = test_db().await;
        let mine = db.my_channels().await.unwrap();
        let mine = codes(&mine);
        assert_eq!(mine[0], GENERAL);
        assert_eq!(mine[1], HOT);
        assert!(mine.contains(&"technology"));
    }

    #[tokio::test]
    async fn test_add_channel_persists() {
        let db = test_db().await;
        db.add_channel("science").await.unwrap();

        let mine = db.my_channels().await.unwrap();
        assert!(codes(&mine).contains(&"science"));

        // Saved value round-trips through the key-value store
        let saved = db.get_preference("channels.mine").await.unwrap().unwrap();
        assert!(saved.contains("science"));
    }

    #[tokio::test]
    async fn test_add_unknown_or_duplicate_is_noop() {
        let db = test_db().await;
        db.add_channel("weather").await.unwrap();
        db.add_channel("sports").await.unwrap();
        db.add_channel("sports").await.unwrap();

        let mine = db.my_channels().await.unwrap();
        let mine = codes(&mine);
        assert!(!mine.contains(&"weather"));
        assert_eq!(mine.iter().filter(|c| **c == "sports").count(), 1);
    }

    #[tokio::test]
    async fn test_remove_channel() {
        let db = test_db().await;
        db.remove_channel("sports").await.unwrap();

        let mine = db.my_channels().await.unwrap();
        assert!(!codes(&mine).contains(&"sports"));

        let others = db.other_channels().await.unwrap();
        assert!(codes(&others).contains(&"sports"));
    }

    #[tokio::test]
    async fn test_pinned_channels_cannot_be_removed() {
        let db = test_db().await;
        db.remove_channel(GENERAL).await.unwrap();
        db.remove_channel(HOT).await.unwrap();

        let mine = db.my_channels().await.unwrap();
        let mine = codes(&mine);
        assert_eq!(mine[0], GENERAL);
        assert_eq!(mine[1], HOT);
    }

    #[tokio::test]
    async fn test_pins_survive_corrupted_saved_order() {
        let db = test_db().await;
        // Saved value missing the pins and carrying an unknown code
        db.set_preference("channels.mine", "sports,weather,science")
            .await
            .unwrap();

        let mine = db.my_channels().await.unwrap();
        let mine = codes(&mine);
        assert_eq!(&mine[..2], &[GENERAL, HOT]);
        assert_eq!(&mine[2..], &["sports", "science"]);
    }

    #[tokio::test]
    async fn test_other_channels_complement() {
        let db = test_db().await;
        let mine = db.my_channels().await.unwrap();
        let others = db.other_channels().await.unwrap();
        assert_eq!(
            mine.len() + others.len(),
            crate::channel::ALL_CHANNELS.len()
        );
        for o in &others {
            assert!(!mine.iter().any(|m| m.code == o.code));
        }
    }
}

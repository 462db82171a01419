use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::slug::PostSlug;

/// Identifier of a content item, assigned from the creation timestamp
/// in milliseconds and immutable afterwards. Uniqueness within one
/// collection is load-bearing for edit and delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(i64);

impl ItemId {
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn from_timestamp(now: OffsetDateTime) -> Self {
        Self((now.unix_timestamp_nanos() / 1_000_000) as i64)
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(formatter)
    }
}

/// Shared surface of the two content variants, so collections and
/// stores can stay generic over posts and artworks.
pub trait ContentItem {
    fn id(&self) -> ItemId;
    fn title(&self) -> &str;
    fn category(&self) -> Option<&str>;
    fn tags(&self) -> &[String];
    fn featured(&self) -> bool;
}

/// A blog post. Field names serialize in camelCase so the JSON shape
/// matches the seed files (`featuredImage`, `readTime`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: ItemId,
    pub title: String,
    pub excerpt: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub slug: PostSlug,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<String>,
}

impl ContentItem for Post {
    fn id(&self) -> ItemId {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn featured(&self) -> bool {
        self.featured
    }
}

/// A gallery artwork. `price` stays a display string; no currency math
/// is ever performed on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    pub id: ItemId,
    pub title: String,
    pub description: String,
    pub medium: String,
    pub dimensions: String,
    pub year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

const fn default_available() -> bool {
    true
}

impl ContentItem for Artwork {
    fn id(&self) -> ItemId {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn featured(&self) -> bool {
        self.featured
    }
}

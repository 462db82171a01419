use serde::{Deserialize, Serialize};
use slug::slugify;
use std::{fmt, str::FromStr};

#[derive(Debug, thiserror::Error)]
#[error("generated post slug is empty")]
pub struct EmptySlug;

/// URL-safe identifier derived once from a post's title at creation.
///
/// The slug is frozen after that point: editing the title later never
/// changes the stored slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostSlug(String);

impl PostSlug {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Lowercases the title, collapses non-alphanumeric runs to a single
    /// hyphen and strips leading/trailing hyphens.
    pub fn from_title(title: &str) -> Result<Self, EmptySlug> {
        let generated = slugify(title);
        PostSlug::from_str(&generated)
    }
}

impl AsRef<str> for PostSlug {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PostSlug {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for PostSlug {
    type Err = EmptySlug;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(EmptySlug);
        }

        Ok(Self(trimmed.to_string()))
    }
}

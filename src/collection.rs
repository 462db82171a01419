use crate::model::{Artwork, ContentItem, ItemId, Post};

/// Ordered in-memory collection of content items, most recent first.
///
/// New items are prepended by the store; edits keep their position and
/// deletions remove exactly one element, so the stored order is itself
/// meaningful and queries never re-sort unless documented.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: ContentItem> Collection<T> {
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Exact, case-sensitive match against the stored category. Items
    /// without a category never match.
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<&T> {
        self.items
            .iter()
            .filter(|item| item.category() == Some(category))
            .collect()
    }

    #[must_use]
    pub fn by_tag(&self, tag: &str) -> Vec<&T> {
        self.items
            .iter()
            .filter(|item| item.tags().iter().any(|candidate| candidate == tag))
            .collect()
    }

    /// Featured items in their original relative order, truncated to
    /// `limit`. Deliberately not sorted by date.
    #[must_use]
    pub fn featured(&self, limit: usize) -> Vec<&T> {
        self.items
            .iter()
            .filter(|item| item.featured())
            .take(limit)
            .collect()
    }

    /// Distinct categories in first-seen order. Computed fresh on each
    /// call; the collections involved are small.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for item in &self.items {
            if let Some(category) = item.category() {
                if !seen.iter().any(|existing| existing == category) {
                    seen.push(category.to_string());
                }
            }
        }
        seen
    }

    /// Distinct tags in first-seen order.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for item in &self.items {
            for tag in item.tags() {
                if !seen.iter().any(|existing| existing == tag) {
                    seen.push(tag.clone());
                }
            }
        }
        seen
    }

    pub(crate) fn prepend(&mut self, item: T) {
        self.items.insert(0, item);
    }

    /// Replaces the item with the same id in place, keeping its
    /// position. Returns false when no item matched.
    pub(crate) fn replace(&mut self, item: T) -> bool {
        match self.items.iter().position(|existing| existing.id() == item.id()) {
            Some(index) => {
                self.items[index] = item;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: ItemId) -> Option<T> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }
}

impl Collection<Post> {
    #[must_use]
    pub fn by_slug(&self, slug: &str) -> Option<&Post> {
        self.items.iter().find(|post| post.slug.as_str() == slug)
    }

    /// Posts sorted by date descending and truncated to `limit`. The
    /// sort is stable, so same-date posts keep their stored order.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.items.iter().collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        posts.truncate(limit);
        posts
    }

    /// Case-insensitive substring search across title, excerpt,
    /// content, tags and category, in stored order.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Post> {
        let term = query.to_lowercase();
        self.items
            .iter()
            .filter(|post| {
                post.title.to_lowercase().contains(&term)
                    || post.excerpt.to_lowercase().contains(&term)
                    || post.content.to_lowercase().contains(&term)
                    || post.tags.iter().any(|tag| tag.to_lowercase().contains(&term))
                    || post.category.to_lowercase().contains(&term)
            })
            .collect()
    }
}

impl Collection<Artwork> {
    /// Artworks currently marked available for purchase.
    #[must_use]
    pub fn available(&self) -> Vec<&Artwork> {
        self.items.iter().filter(|artwork| artwork.available).collect()
    }
}

use time::OffsetDateTime;

use crate::{
    collection::Collection,
    model::{Artwork, ContentItem, ItemId, Post},
    slug::{EmptySlug, PostSlug},
};

/// A submitted form failed validation or finalization; nothing was
/// saved.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("{0} must not be empty")]
    MissingField(&'static str),
    #[error(transparent)]
    EmptySlug(#[from] EmptySlug),
}

/// Raw form input for a blog post, exactly as entered: tags are one
/// comma-separated string and optional fields are plain strings that
/// may be blank.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub tags: String,
    pub author: String,
    pub read_time: String,
    pub featured: bool,
    pub featured_image: Option<String>,
    pub image_alt: String,
}

impl PostDraft {
    /// Populates the form from an existing post, the edit entry point.
    #[must_use]
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            content: post.content.clone(),
            category: post.category.clone(),
            tags: post.tags.join(", "),
            author: post.author.clone().unwrap_or_default(),
            read_time: post.read_time.clone().unwrap_or_default(),
            featured: post.featured,
            featured_image: post.featured_image.clone(),
            image_alt: post.image_alt.clone().unwrap_or_default(),
        }
    }
}

/// Whether a submission creates a new post or edits an existing one.
///
/// The edit variant carries the fields that must survive the edit
/// unchanged: the id, the slug derived at creation, and the original
/// publication date.
#[derive(Debug, Clone)]
pub enum PostSubmission {
    Create,
    Edit {
        id: ItemId,
        slug: PostSlug,
        date: OffsetDateTime,
    },
}

impl PostSubmission {
    #[must_use]
    pub fn edit_of(post: &Post) -> Self {
        Self::Edit {
            id: post.id,
            slug: post.slug.clone(),
            date: post.date,
        }
    }
}

/// Validates the draft and builds the finalized post. On the create
/// path a fresh id, slug and date are assigned; on the edit path the
/// remembered ones are reused.
pub fn submit_post(
    draft: &PostDraft,
    submission: PostSubmission,
    existing: &Collection<Post>,
) -> Result<Post, SubmitError> {
    require(&draft.title, "title")?;
    require(&draft.excerpt, "excerpt")?;
    require(&draft.content, "content")?;
    require(&draft.category, "category")?;

    let (id, slug, date) = match submission {
        PostSubmission::Create => (
            allocate_id(existing),
            PostSlug::from_title(&draft.title)?,
            OffsetDateTime::now_utc(),
        ),
        PostSubmission::Edit { id, slug, date } => (id, slug, date),
    };

    let featured_image = draft
        .featured_image
        .as_deref()
        .and_then(non_blank)
        .map(str::to_string);
    // Alt text only means something alongside an image.
    let image_alt = featured_image
        .is_some()
        .then(|| non_blank(&draft.image_alt).map(str::to_string))
        .flatten();

    Ok(Post {
        id,
        title: draft.title.trim().to_string(),
        excerpt: draft.excerpt.trim().to_string(),
        content: draft.content.clone(),
        category: draft.category.trim().to_string(),
        tags: split_tags(&draft.tags),
        date,
        slug,
        featured: draft.featured,
        read_time: non_blank(&draft.read_time).map(str::to_string),
        author: non_blank(&draft.author).map(str::to_string),
        featured_image,
        image_alt,
    })
}

/// Raw form input for an artwork.
#[derive(Debug, Clone)]
pub struct ArtworkDraft {
    pub title: String,
    pub description: String,
    pub medium: String,
    pub dimensions: String,
    pub year: String,
    pub price: String,
    pub category: String,
    pub tags: String,
    pub image: Option<String>,
    pub image_alt: String,
    pub available: bool,
    pub featured: bool,
}

impl Default for ArtworkDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            medium: String::new(),
            dimensions: String::new(),
            year: String::new(),
            price: String::new(),
            category: String::new(),
            tags: String::new(),
            image: None,
            image_alt: String::new(),
            available: true,
            featured: false,
        }
    }
}

impl ArtworkDraft {
    #[must_use]
    pub fn from_artwork(artwork: &Artwork) -> Self {
        Self {
            title: artwork.title.clone(),
            description: artwork.description.clone(),
            medium: artwork.medium.clone(),
            dimensions: artwork.dimensions.clone(),
            year: artwork.year.clone(),
            price: artwork.price.clone().unwrap_or_default(),
            category: artwork.category.clone().unwrap_or_default(),
            tags: artwork.tags.join(", "),
            image: artwork.image.clone(),
            image_alt: artwork.image_alt.clone().unwrap_or_default(),
            available: artwork.available,
            featured: artwork.featured,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ArtworkSubmission {
    Create,
    Edit { id: ItemId },
}

impl ArtworkSubmission {
    #[must_use]
    pub const fn edit_of(artwork: &Artwork) -> Self {
        Self::Edit { id: artwork.id }
    }
}

pub fn submit_artwork(
    draft: &ArtworkDraft,
    submission: ArtworkSubmission,
    existing: &Collection<Artwork>,
) -> Result<Artwork, SubmitError> {
    require(&draft.title, "title")?;
    require(&draft.description, "description")?;
    require(&draft.medium, "medium")?;
    require(&draft.dimensions, "dimensions")?;
    require(&draft.year, "year")?;

    let id = match submission {
        ArtworkSubmission::Create => allocate_id(existing),
        ArtworkSubmission::Edit { id } => id,
    };

    let image = draft.image.as_deref().and_then(non_blank).map(str::to_string);
    let image_alt = image
        .is_some()
        .then(|| non_blank(&draft.image_alt).map(str::to_string))
        .flatten();

    Ok(Artwork {
        id,
        title: draft.title.trim().to_string(),
        description: draft.description.trim().to_string(),
        medium: draft.medium.trim().to_string(),
        dimensions: draft.dimensions.trim().to_string(),
        year: draft.year.trim().to_string(),
        price: non_blank(&draft.price).map(str::to_string),
        image,
        image_alt,
        available: draft.available,
        featured: draft.featured,
        category: non_blank(&draft.category).map(str::to_string),
        tags: split_tags(&draft.tags),
    })
}

/// Allocates a creation-timestamp id, bumping past any collision so
/// the id is unique within the collection at the moment of creation.
#[must_use]
pub fn allocate_id<T: ContentItem>(existing: &Collection<T>) -> ItemId {
    let mut id = ItemId::from_timestamp(OffsetDateTime::now_utc());
    while existing.get(id).is_some() {
        id = id.next();
    }
    id
}

/// Splits comma-separated tag input, trimming each entry and dropping
/// blanks. Applied uniformly to posts and artworks.
#[must_use]
pub fn split_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str, SubmitError> {
    non_blank(value).ok_or(SubmitError::MissingField(field))
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

use std::{fs, path::Path};

use pulldown_cmark::{Parser, html::push_html};
use time::macros::format_description;
use tracing::{debug, warn};

use crate::{
    collection::Collection,
    error::Result,
    manifest::PortfolioManifest,
    model::{Artwork, Post},
};

const FRONT_PAGE_POSTS: usize = 5;
const FRONT_PAGE_ARTWORKS: usize = 3;

/// Static read views: renders the collections into a plain HTML site
/// under the build directory. Query results come straight from the
/// collection; nothing here mutates state.
#[derive(Debug)]
pub struct SiteRenderer<'a> {
    manifest: &'a PortfolioManifest,
    posts: &'a Collection<Post>,
    artworks: &'a Collection<Artwork>,
}

impl<'a> SiteRenderer<'a> {
    #[must_use]
    pub const fn new(
        manifest: &'a PortfolioManifest,
        posts: &'a Collection<Post>,
        artworks: &'a Collection<Artwork>,
    ) -> Self {
        Self {
            manifest,
            posts,
            artworks,
        }
    }

    /// Builds the whole site, replacing any previous output.
    ///
    /// Failures on the output directories themselves are fatal; a
    /// failure while writing one post's page is logged and skipped so
    /// the rest of the site still comes out.
    pub fn generate(&self, output: impl AsRef<Path>) -> Result<()> {
        let output = output.as_ref();
        if output.exists() {
            fs::remove_dir_all(output)?;
        }
        fs::create_dir_all(output)?;

        fs::write(output.join("index.html"), self.front_page())?;

        let blog_dir = output.join("blog");
        fs::create_dir_all(&blog_dir)?;
        fs::write(blog_dir.join("index.html"), self.blog_index())?;
        let mut rendered: Vec<&str> = Vec::new();
        for post in self.posts.items() {
            if rendered.contains(&post.slug.as_str()) {
                warn!("duplicate slug '{}', keeping the first page", post.slug);
                continue;
            }
            if let Err(err) = self.write_post_page(&blog_dir, post) {
                warn!("skipping blog/{}: {err}", post.slug);
                continue;
            }
            rendered.push(post.slug.as_str());
            debug!("rendered blog/{}", post.slug);
        }

        let gallery_dir = output.join("gallery");
        fs::create_dir_all(&gallery_dir)?;
        fs::write(gallery_dir.join("index.html"), self.gallery_page())?;

        Ok(())
    }

    fn write_post_page(&self, blog_dir: &Path, post: &Post) -> Result<()> {
        let post_dir = blog_dir.join(post.slug.as_str());
        fs::create_dir_all(&post_dir)?;
        fs::write(post_dir.join("index.html"), self.post_page(post))?;
        Ok(())
    }

    fn front_page(&self) -> String {
        let mut body = format!("<h1>{}</h1>\n", escape_html(self.manifest.name()));
        if !self.manifest.description().is_empty() {
            body.push_str(&format!(
                "<p>{}</p>\n",
                escape_html(self.manifest.description())
            ));
        }

        body.push_str("<h2>Recent writing</h2>\n<ul>\n");
        for post in self.posts.recent(FRONT_PAGE_POSTS) {
            body.push_str(&format!(
                "<li><a href=\"blog/{}/\">{}</a> <time>{}</time></li>\n",
                post.slug,
                escape_html(&post.title),
                display_date(post),
            ));
        }
        body.push_str("</ul>\n");

        body.push_str("<h2>Featured work</h2>\n<ul>\n");
        for artwork in self.artworks.featured(FRONT_PAGE_ARTWORKS) {
            body.push_str(&format!(
                "<li>{} ({})</li>\n",
                escape_html(&artwork.title),
                escape_html(&artwork.year)
            ));
        }
        body.push_str("</ul>\n");

        page(self.manifest.name(), &body)
    }

    fn blog_index(&self) -> String {
        let mut body = String::from("<h1>Blog</h1>\n<ul>\n");
        for post in self.posts.recent(self.posts.len()) {
            body.push_str(&format!(
                "<li><a href=\"{}/\">{}</a> <time>{}</time> — {}</li>\n",
                post.slug,
                escape_html(&post.title),
                display_date(post),
                escape_html(&post.excerpt),
            ));
        }
        body.push_str("</ul>\n");
        page("Blog", &body)
    }

    fn post_page(&self, post: &Post) -> String {
        let mut body = format!("<h1>{}</h1>\n", escape_html(&post.title));
        body.push_str(&format!("<time>{}</time>\n", display_date(post)));
        if let Some(author) = &post.author {
            body.push_str(&format!("<p>By {}</p>\n", escape_html(author)));
        }
        if let Some(image) = &post.featured_image {
            let alt = post.image_alt.as_deref().unwrap_or(&post.title);
            body.push_str(&format!(
                "<img src=\"{image}\" alt=\"{}\">\n",
                escape_html(alt)
            ));
        }
        body.push_str(&render_markdown(&post.content));
        if !post.tags.is_empty() {
            body.push_str("<ul class=\"tags\">\n");
            for tag in &post.tags {
                body.push_str(&format!("<li>{}</li>\n", escape_html(tag)));
            }
            body.push_str("</ul>\n");
        }
        page(&post.title, &body)
    }

    fn gallery_page(&self) -> String {
        let mut body = String::from("<h1>Gallery</h1>\n");
        for artwork in self.artworks.items() {
            body.push_str("<article>\n");
            if let Some(image) = &artwork.image {
                let alt = artwork.image_alt.as_deref().unwrap_or(&artwork.title);
                body.push_str(&format!(
                    "<img src=\"{image}\" alt=\"{}\">\n",
                    escape_html(alt)
                ));
            }
            body.push_str(&format!("<h2>{}</h2>\n", escape_html(&artwork.title)));
            body.push_str(&format!(
                "<p>{}</p>\n<p>{}, {}, {}</p>\n",
                escape_html(&artwork.description),
                escape_html(&artwork.medium),
                escape_html(&artwork.dimensions),
                escape_html(&artwork.year),
            ));
            if let Some(price) = &artwork.price {
                body.push_str(&format!("<p>{}</p>\n", escape_html(price)));
            }
            if artwork.available {
                body.push_str("<p>Available</p>\n");
            }
            body.push_str("</article>\n");
        }
        page("Gallery", &body)
    }
}

pub fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut html = String::new();
    push_html(&mut html, parser);
    html
}

fn display_date(post: &Post) -> String {
    let format = format_description!("[year]-[month]-[day]");
    // The format covers only always-present date components.
    post.date.format(&format).unwrap_or_default()
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(title)
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(character),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemId;
    use time::macros::datetime;

    fn post(id: i64, title: &str) -> Post {
        Post {
            id: ItemId::new(id),
            title: title.into(),
            excerpt: "excerpt".into(),
            tags: vec!["studio".into()],
            category: "Process".into(),
            content: "# Heading\n\nSome **markdown** body.".into(),
            date: datetime!(2024-02-01 00:00 UTC),
            slug: crate::slug::PostSlug::from_title(title).unwrap(),
            featured: true,
            read_time: None,
            author: Some("Iris".into()),
            featured_image: None,
            image_alt: None,
        }
    }

    #[test]
    fn generates_the_site_tree() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = PortfolioManifest::new("Canvas & Soul");
        let posts = Collection::new(vec![post(1, "Morning Light")]);
        let artworks = Collection::<Artwork>::default();

        SiteRenderer::new(&manifest, &posts, &artworks)
            .generate(dir.path().join("build"))
            .unwrap();

        let build = dir.path().join("build");
        assert!(build.join("index.html").exists());
        assert!(build.join("blog/index.html").exists());
        assert!(build.join("blog/morning-light/index.html").exists());
        assert!(build.join("gallery/index.html").exists());

        let rendered =
            fs::read_to_string(build.join("blog/morning-light/index.html")).unwrap();
        assert!(rendered.contains("<strong>markdown</strong>"));
        assert!(rendered.contains("By Iris"));
    }

    #[test]
    fn unwritable_post_page_does_not_halt_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = PortfolioManifest::new("Canvas & Soul");
        // A slug longer than the filesystem's 255-byte name limit makes
        // this one page unwritable.
        let posts = Collection::new(vec![post(1, &"x".repeat(300)), post(2, "Still Standing")]);
        let artworks = Collection::<Artwork>::default();

        SiteRenderer::new(&manifest, &posts, &artworks)
            .generate(dir.path().join("build"))
            .unwrap();

        let build = dir.path().join("build");
        assert!(build.join("blog/still-standing/index.html").exists());
        assert!(build.join("gallery/index.html").exists());
        assert!(!build.join("blog").join("x".repeat(300)).exists());
    }

    #[test]
    fn colliding_slugs_keep_the_first_page() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = PortfolioManifest::new("Canvas & Soul");
        let mut first = post(1, "Tide Study");
        first.content = "the newer take".into();
        let mut second = post(2, "Tide Study");
        second.content = "the older take".into();
        let posts = Collection::new(vec![first, second]);
        let artworks = Collection::<Artwork>::default();

        SiteRenderer::new(&manifest, &posts, &artworks)
            .generate(dir.path().join("build"))
            .unwrap();

        let rendered = fs::read_to_string(
            dir.path().join("build/blog/tide-study/index.html"),
        )
        .unwrap();
        assert!(rendered.contains("the newer take"));
        assert!(!rendered.contains("the older take"));
    }

    #[test]
    fn titles_are_escaped() {
        let manifest = PortfolioManifest::new("Studio <script>");
        let posts = Collection::default();
        let artworks = Collection::default();
        let html = SiteRenderer::new(&manifest, &posts, &artworks).front_page();
        assert!(html.contains("Studio &lt;script&gt;"));
        assert!(!html.contains("Studio <script>"));
    }
}

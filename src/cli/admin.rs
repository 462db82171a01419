use atelier::{
    Error,
    editor::{
        ArtworkDraft, ArtworkSubmission, PostDraft, PostSubmission, submit_artwork, submit_post,
    },
    image,
    model::ItemId,
    workspace::Portfolio,
};
use color_eyre::eyre;
use dialoguer::{Confirm, Editor, Input, theme::ColorfulTheme};
use tracing::info;

pub fn post_list(portfolio: &Portfolio, emit_json: bool) -> eyre::Result<()> {
    let local = portfolio.local_store()?;
    let store = portfolio.posts(&local);
    let posts = store.collection();

    if emit_json {
        println!("{}", serde_json::to_string_pretty(posts.items())?);
        return Ok(());
    }

    if posts.is_empty() {
        println!("No posts yet. Create your first post to get started!");
        return Ok(());
    }

    println!("{} post(s):", posts.len());
    for post in posts.items() {
        let marker = if post.featured { " [featured]" } else { "" };
        println!("• {} ({}){marker}", post.title, post.slug);
    }
    Ok(())
}

pub fn post_create(portfolio: &Portfolio) -> eyre::Result<()> {
    let local = portfolio.local_store()?;
    let mut store = portfolio.posts(&local);

    let draft = post_form(&PostDraft::default())?;
    let post = submit_post(&draft, PostSubmission::Create, store.collection())?;
    let slug = post.slug.clone();
    store.create(post)?;
    info!("Created post '{slug}'");
    Ok(())
}

pub fn post_edit(portfolio: &Portfolio, slug: &str) -> eyre::Result<()> {
    let local = portfolio.local_store()?;
    let mut store = portfolio.posts(&local);
    let original = store
        .collection()
        .by_slug(slug)
        .ok_or_else(|| Error::PostNotFound(slug.to_string()))?
        .clone();

    let draft = post_form(&PostDraft::from_post(&original))?;
    let edited = submit_post(
        &draft,
        PostSubmission::edit_of(&original),
        store.collection(),
    )?;
    store.update(edited)?;
    info!("Updated post '{}'", original.slug);
    Ok(())
}

pub fn post_delete(portfolio: &Portfolio, slug: &str) -> eyre::Result<()> {
    let local = portfolio.local_store()?;
    let mut store = portfolio.posts(&local);
    let post = store
        .collection()
        .by_slug(slug)
        .ok_or_else(|| Error::PostNotFound(slug.to_string()))?;
    let id = post.id;
    let title = post.title.clone();

    if !confirm_delete(&format!("Delete post '{title}'? This cannot be undone."))? {
        info!("Delete cancelled");
        return Ok(());
    }

    store.delete(id)?;
    info!("Deleted post '{title}'");
    Ok(())
}

pub fn artwork_list(portfolio: &Portfolio, emit_json: bool) -> eyre::Result<()> {
    let local = portfolio.local_store()?;
    let store = portfolio.artworks(&local);
    let artworks = store.collection();

    if emit_json {
        println!("{}", serde_json::to_string_pretty(artworks.items())?);
        return Ok(());
    }

    if artworks.is_empty() {
        println!("No artworks yet. Add your first artwork to get started!");
        return Ok(());
    }

    println!("{} artwork(s):", artworks.len());
    for artwork in artworks.items() {
        let mut flags = Vec::new();
        if artwork.featured {
            flags.push("featured");
        }
        if artwork.available {
            flags.push("available");
        }
        let suffix = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!(
            "• #{} {} — {}, {}{suffix}",
            artwork.id, artwork.title, artwork.medium, artwork.year
        );
    }
    Ok(())
}

pub fn artwork_add(portfolio: &Portfolio) -> eyre::Result<()> {
    let local = portfolio.local_store()?;
    let mut store = portfolio.artworks(&local);

    let draft = artwork_form(&ArtworkDraft::default())?;
    let artwork = submit_artwork(&draft, ArtworkSubmission::Create, store.collection())?;
    let title = artwork.title.clone();
    store.create(artwork)?;
    info!("Added artwork '{title}'");
    Ok(())
}

pub fn artwork_edit(portfolio: &Portfolio, id: i64) -> eyre::Result<()> {
    let local = portfolio.local_store()?;
    let mut store = portfolio.artworks(&local);
    let id = ItemId::new(id);
    let original = store
        .collection()
        .get(id)
        .ok_or(Error::ItemNotFound(id))?
        .clone();

    let draft = artwork_form(&ArtworkDraft::from_artwork(&original))?;
    let edited = submit_artwork(
        &draft,
        ArtworkSubmission::edit_of(&original),
        store.collection(),
    )?;
    store.update(edited)?;
    info!("Updated artwork '{}'", original.title);
    Ok(())
}

pub fn artwork_delete(portfolio: &Portfolio, id: i64) -> eyre::Result<()> {
    let local = portfolio.local_store()?;
    let mut store = portfolio.artworks(&local);
    let id = ItemId::new(id);
    let artwork = store.collection().get(id).ok_or(Error::ItemNotFound(id))?;
    let title = artwork.title.clone();

    if !confirm_delete(&format!(
        "Delete artwork '{title}'? This cannot be undone."
    ))? {
        info!("Delete cancelled");
        return Ok(());
    }

    store.delete(id)?;
    info!("Deleted artwork '{title}'");
    Ok(())
}

fn post_form(defaults: &PostDraft) -> eyre::Result<PostDraft> {
    let theme = ColorfulTheme::default();

    let title: String = Input::with_theme(&theme)
        .with_prompt("Title")
        .with_initial_text(&defaults.title)
        .validate_with(required)
        .interact_text()?;
    let category: String = Input::with_theme(&theme)
        .with_prompt("Category")
        .with_initial_text(&defaults.category)
        .validate_with(required)
        .interact_text()?;
    let excerpt: String = Input::with_theme(&theme)
        .with_prompt("Excerpt")
        .with_initial_text(&defaults.excerpt)
        .validate_with(required)
        .interact_text()?;

    // The markdown body opens in $EDITOR; aborting keeps the previous
    // content.
    let content = Editor::new()
        .edit(&defaults.content)?
        .unwrap_or_else(|| defaults.content.clone());

    let tags: String = Input::with_theme(&theme)
        .with_prompt("Tags (comma separated)")
        .with_initial_text(&defaults.tags)
        .allow_empty(true)
        .interact_text()?;
    let author: String = Input::with_theme(&theme)
        .with_prompt("Author")
        .with_initial_text(&defaults.author)
        .allow_empty(true)
        .interact_text()?;
    let read_time: String = Input::with_theme(&theme)
        .with_prompt("Read time (e.g. 5 min read)")
        .with_initial_text(&defaults.read_time)
        .allow_empty(true)
        .interact_text()?;
    let featured = Confirm::with_theme(&theme)
        .with_prompt("Featured post?")
        .default(defaults.featured)
        .interact()?;

    let (featured_image, image_alt) = image_prompt(
        &theme,
        defaults.featured_image.as_deref(),
        &defaults.image_alt,
    )?;

    Ok(PostDraft {
        title,
        excerpt,
        content,
        category,
        tags,
        author,
        read_time,
        featured,
        featured_image,
        image_alt,
    })
}

fn artwork_form(defaults: &ArtworkDraft) -> eyre::Result<ArtworkDraft> {
    let theme = ColorfulTheme::default();

    let title: String = Input::with_theme(&theme)
        .with_prompt("Title")
        .with_initial_text(&defaults.title)
        .validate_with(required)
        .interact_text()?;
    let medium: String = Input::with_theme(&theme)
        .with_prompt("Medium (Oil on Canvas, Watercolor, ...)")
        .with_initial_text(&defaults.medium)
        .validate_with(required)
        .interact_text()?;
    let description: String = Input::with_theme(&theme)
        .with_prompt("Description")
        .with_initial_text(&defaults.description)
        .validate_with(required)
        .interact_text()?;
    let dimensions: String = Input::with_theme(&theme)
        .with_prompt("Dimensions (24\" x 36\")")
        .with_initial_text(&defaults.dimensions)
        .validate_with(required)
        .interact_text()?;
    let year: String = Input::with_theme(&theme)
        .with_prompt("Year")
        .with_initial_text(&defaults.year)
        .validate_with(required)
        .interact_text()?;
    let price: String = Input::with_theme(&theme)
        .with_prompt("Price (display string, e.g. $1,200)")
        .with_initial_text(&defaults.price)
        .allow_empty(true)
        .interact_text()?;
    let category: String = Input::with_theme(&theme)
        .with_prompt("Category")
        .with_initial_text(&defaults.category)
        .allow_empty(true)
        .interact_text()?;
    let tags: String = Input::with_theme(&theme)
        .with_prompt("Tags (comma separated)")
        .with_initial_text(&defaults.tags)
        .allow_empty(true)
        .interact_text()?;
    let available = Confirm::with_theme(&theme)
        .with_prompt("Available for purchase?")
        .default(defaults.available)
        .interact()?;
    let featured = Confirm::with_theme(&theme)
        .with_prompt("Featured artwork?")
        .default(defaults.featured)
        .interact()?;

    let (image, image_alt) = image_prompt(&theme, defaults.image.as_deref(), &defaults.image_alt)?;

    Ok(ArtworkDraft {
        title,
        description,
        medium,
        dimensions,
        year,
        price,
        category,
        tags,
        image,
        image_alt,
        available,
        featured,
    })
}

/// Prompts for an image file to embed. Blank keeps the current image,
/// `-` removes it, anything else is read and inlined as a data URI.
fn image_prompt(
    theme: &ColorfulTheme,
    current: Option<&str>,
    current_alt: &str,
) -> eyre::Result<(Option<String>, String)> {
    let prompt = if current.is_some() {
        "Image file (blank to keep current, '-' to remove)"
    } else {
        "Image file (blank for none)"
    };
    let path: String = Input::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;

    let image = match path.trim() {
        "" => current.map(str::to_string),
        "-" => None,
        path => Some(image::inline_data_uri(path)?),
    };

    let image_alt = if image.is_some() {
        Input::with_theme(theme)
            .with_prompt("Image alt text (for accessibility)")
            .with_initial_text(current_alt)
            .allow_empty(true)
            .interact_text()?
    } else {
        String::new()
    };

    Ok((image, image_alt))
}

fn confirm_delete(prompt: &str) -> eyre::Result<bool> {
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()?;
    Ok(confirmed)
}

fn required(input: &String) -> Result<(), &'static str> {
    if input.trim().is_empty() {
        Err("this field is required")
    } else {
        Ok(())
    }
}

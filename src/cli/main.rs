use core::time::Duration;
use std::{env::current_dir, path::PathBuf, process::exit};

use atelier::{
    environment,
    render::SiteRenderer,
    workspace::Portfolio,
};
use clap::{Parser, Subcommand};
use color_eyre::{
    Section,
    config::HookBuilder,
    eyre::{self, eyre},
};
use dialoguer::{Input, theme::ColorfulTheme};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod admin;

#[derive(Parser)]
#[command(about = "Curate your portfolio", long_about = None)]
#[command(version, author)]
struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit machine-readable JSON output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new portfolio workspace
    Init { name: Option<String> },

    /// Manage blog posts
    #[command(subcommand)]
    Post(PostCommands),

    /// Manage gallery artworks
    #[command(subcommand)]
    Artwork(ArtworkCommands),

    /// Render the static site into the build directory
    Generate,

    /// Search posts by title, excerpt, content, tags or category
    Search { query: String },

    /// Write the collections out as seed-shaped JSON files
    Export {
        /// Directory to write posts.json and artworks.json into
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Discard local edits and reload from the seed files
    Reset,
}

#[derive(Subcommand)]
enum PostCommands {
    List,
    Create,
    Edit { slug: String },
    Delete { slug: String },
}

#[derive(Subcommand)]
enum ArtworkCommands {
    List,
    Add,
    Edit { id: i64 },
    Delete { id: i64 },
}

fn main() {
    HookBuilder::default()
        .display_env_section(true)
        .panic_section("It looks like Atelier encountered a bug")
        .install()
        .expect("Failed to install color-eyre hook");

    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false);
    let filter_layer = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(tracing_error::ErrorLayer::default())
        .init();

    if let Err(err) = entry(cli) {
        error!("{:#}", err);
        exit(1);
    }
}

fn entry(cli: Cli) -> eyre::Result<()> {
    let current_dir = current_dir()?;
    let command = cli.command;

    match command {
        Commands::Init { name } => {
            let name = match name {
                Some(name) => name,
                None => prompt_portfolio_name()?,
            };
            Portfolio::create(current_dir, name)?;
            info!("Portfolio created successfully");
            Ok(())
        }
        command => {
            let portfolio = Portfolio::find(&current_dir).note("Can't find a portfolio here")?;
            match command {
                Commands::Post(post_cmd) => {
                    match post_cmd {
                        PostCommands::List => return admin::post_list(&portfolio, cli.json),
                        _ => ensure_admin()?,
                    }
                    match post_cmd {
                        PostCommands::Create => admin::post_create(&portfolio),
                        PostCommands::Edit { slug } => admin::post_edit(&portfolio, &slug),
                        PostCommands::Delete { slug } => admin::post_delete(&portfolio, &slug),
                        PostCommands::List => unreachable!(),
                    }
                }
                Commands::Artwork(artwork_cmd) => {
                    match artwork_cmd {
                        ArtworkCommands::List => return admin::artwork_list(&portfolio, cli.json),
                        _ => ensure_admin()?,
                    }
                    match artwork_cmd {
                        ArtworkCommands::Add => admin::artwork_add(&portfolio),
                        ArtworkCommands::Edit { id } => admin::artwork_edit(&portfolio, id),
                        ArtworkCommands::Delete { id } => admin::artwork_delete(&portfolio, id),
                        ArtworkCommands::List => unreachable!(),
                    }
                }
                Commands::Generate => {
                    long_task(
                        "Rendering site...",
                        || run_generate(&portfolio),
                        "Site rendered successfully",
                    )?;
                    Ok(())
                }
                Commands::Search { query } => run_search(&portfolio, &query, cli.json),
                Commands::Export { out } => {
                    ensure_admin()?;
                    run_export(&portfolio, out)
                }
                Commands::Reset => {
                    ensure_admin()?;
                    run_reset(&portfolio)
                }
                Commands::Init { .. } => unreachable!(),
            }
        }
    }
}

fn ensure_admin() -> eyre::Result<()> {
    if environment::admin_available() {
        Ok(())
    } else {
        Err(eyre!(
            "admin commands are disabled when {}=production",
            environment::ENV_VAR
        ))
    }
}

fn run_generate(portfolio: &Portfolio) -> eyre::Result<()> {
    let local = portfolio.local_store()?;
    let posts = portfolio.posts(&local);
    let artworks = portfolio.artworks(&local);

    SiteRenderer::new(
        portfolio.manifest(),
        posts.collection(),
        artworks.collection(),
    )
    .generate(portfolio.build_dir())?;
    Ok(())
}

fn run_search(portfolio: &Portfolio, query: &str, emit_json: bool) -> eyre::Result<()> {
    let local = portfolio.local_store()?;
    let posts = portfolio.posts(&local);
    let hits = posts.collection().search(query);

    if emit_json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("No results for \"{query}\"");
        return Ok(());
    }

    println!("Found {} result(s):", hits.len());
    for hit in hits {
        println!("• {} -> blog/{}/", hit.title, hit.slug);
        if !hit.excerpt.is_empty() {
            println!("  {}", hit.excerpt);
        }
    }
    Ok(())
}

fn run_export(portfolio: &Portfolio, out: Option<PathBuf>) -> eyre::Result<()> {
    let out = out.unwrap_or_else(|| portfolio.root().join("export"));
    std::fs::create_dir_all(&out)?;

    let local = portfolio.local_store()?;
    let posts = portfolio.posts(&local);
    let artworks = portfolio.artworks(&local);

    let posts_path = out.join("posts.json");
    let artworks_path = out.join("artworks.json");
    posts.export_to(&posts_path)?;
    artworks.export_to(&artworks_path)?;

    info!(
        "Exported {} post(s) and {} artwork(s) to {}",
        posts.collection().len(),
        artworks.collection().len(),
        out.display()
    );
    info!("Copy the files into seed/ to promote local edits to the seed");
    Ok(())
}

fn run_reset(portfolio: &Portfolio) -> eyre::Result<()> {
    let confirmed = dialoguer::Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Discard all local edits and reload from the seed files?")
        .default(false)
        .interact()?;
    if !confirmed {
        info!("Reset cancelled");
        return Ok(());
    }

    let local = portfolio.local_store()?;
    let mut posts = portfolio.posts(&local);
    let mut artworks = portfolio.artworks(&local);
    posts.reset()?;
    artworks.reset()?;
    info!(
        "Reset complete: {} post(s), {} artwork(s) from seed",
        posts.collection().len(),
        artworks.collection().len()
    );
    Ok(())
}

pub fn long_task<T, E>(
    loading_msg: &'static str,
    task: impl FnOnce() -> Result<T, E>,
    complete_msg: &'static str,
) -> Result<T, E> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(loading_msg);

    let result = task()?;

    pb.finish_with_message(complete_msg);
    Ok(result)
}

fn prompt_portfolio_name() -> eyre::Result<String> {
    let name: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Portfolio name")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Portfolio name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    Ok(name.trim().to_string())
}

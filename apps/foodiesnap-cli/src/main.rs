use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::broadcast;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use foodiesnap_browse::{load_recipe, load_top_rated, BrowseController, LoadOutcome, SearchResultState};
use foodiesnap_core::config::AppConfig;
use foodiesnap_core::kv::DirStore;
use foodiesnap_core::{KeyValueStore, Notification, NotificationKind, Notifier, Recipe, RecipeId, RecipeSource, ThemeMode};
use foodiesnap_mealdb::get_default_source;
use foodiesnap_store::{FavoritesStore, RatingStore, ThemeStore};

#[derive(Parser)]
#[command(name = "foodiesnap", about = "Browse recipes, keep favorites and rate what you cook")]
struct Cli {
    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show a batch of random recipes
    Browse {
        /// Pages to load, capped by browse.max_pages
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Search recipes by name
    Search { query: String },
    /// Show one recipe with its rating
    Show { id: RecipeId },
    /// Manage favorites (lists them by default)
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesAction>,
    },
    /// Rate a recipe from 1 to 5 stars
    Rate { id: RecipeId, stars: u8 },
    /// Show the rating summary for a recipe
    Rating { id: RecipeId },
    /// List the best rated recipes
    TopRated,
    /// Show or change the theme
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
}

#[derive(Subcommand)]
enum FavoritesAction {
    List,
    Add { id: RecipeId },
    Remove { id: RecipeId },
    Clear,
    /// Move the favorite at position FROM to position TO (1-based)
    Move { from: usize, to: usize },
}

#[derive(Subcommand)]
enum ThemeAction {
    Toggle,
    Light,
    Dark,
}

struct App {
    config: AppConfig,
    kv: Arc<dyn KeyValueStore>,
    notifier: Notifier,
    source: Arc<dyn RecipeSource>,
}

impl App {
    fn open(config: AppConfig) -> anyhow::Result<Self> {
        let dir = config.storage_dir()?;
        let kv: Arc<dyn KeyValueStore> =
            Arc::new(DirStore::open(dir.clone()).with_context(|| format!("opening storage at {}", dir.display()))?);
        debug!(dir = %dir.display(), "storage opened");
        let source = get_default_source(&config.api)?;
        Ok(Self { config, kv, notifier: Notifier::default(), source })
    }

    fn favorites(&self) -> FavoritesStore { FavoritesStore::open(self.kv.clone(), self.notifier.clone()) }

    fn ratings(&self) -> RatingStore { RatingStore::open(self.kv.clone()) }

    fn theme(&self) -> ThemeStore { ThemeStore::open(self.kv.clone(), self.config.theme.prefer_dark) }
}

fn spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn print_notifications(rx: &mut broadcast::Receiver<Notification>) {
    while let Ok(n) = rx.try_recv() {
        let icon = match n.kind {
            NotificationKind::Success => "✅",
            NotificationKind::Info => "ℹ️ ",
            NotificationKind::Error => "❌",
        };
        println!("{icon} {}", n.message);
    }
}

fn print_list(recipes: &[Recipe], favorites: &FavoritesStore) {
    for (i, recipe) in recipes.iter().enumerate() {
        let star = if favorites.is_favorite(recipe.id) { "♥" } else { " " };
        let category = recipe.category.as_deref().unwrap_or("-");
        println!("  {:>2}. {star} [{}] {}  ({category})", i + 1, recipe.id, recipe.title);
    }
}

fn print_view(state: &SearchResultState, favorites: &FavoritesStore) {
    if let Some(error) = &state.error {
        println!("❌ {error}");
    }
    if state.items.is_empty() {
        println!("No recipes found.");
        return;
    }
    print_list(&state.items, favorites);
}

async fn browse(app: &App, pages: u32) -> anyhow::Result<()> {
    let ctl = BrowseController::new(app.source.clone(), app.config.browse.clone());
    let pb = spinner("Loading recipes...")?;
    ctl.load_initial().await;
    for _ in 1..pages {
        if ctl.load_more().await != LoadOutcome::Applied {
            break;
        }
    }
    let state = ctl.snapshot();
    pb.finish_and_clear();

    println!("🍽  Page {} of up to {}", state.page, app.config.browse.max_pages);
    print_view(&state, &app.favorites());
    if state.has_more {
        println!("\n💡 More available: foodiesnap browse --pages {}", state.page + 1);
    }
    Ok(())
}

async fn search(app: &App, query: &str) -> anyhow::Result<()> {
    let ctl = BrowseController::new(app.source.clone(), app.config.browse.clone());
    let pb = spinner(&format!("Searching for \"{}\"...", query.trim()))?;
    ctl.set_query(query);
    // run now instead of waiting out the keystroke debounce
    ctl.load_initial().await;
    let state = ctl.snapshot();
    pb.finish_and_clear();

    println!("🔍 {} results for \"{}\"", state.items.len(), state.active_query());
    print_view(&state, &app.favorites());
    Ok(())
}

async fn show(app: &App, id: RecipeId) -> anyhow::Result<()> {
    let recipe = load_recipe(app.source.as_ref(), id).await?;
    let rating = app.ratings().aggregate(id);

    println!("{} [{}]", recipe.title, recipe.id);
    if let Some(category) = &recipe.category {
        let area = recipe.area.as_deref().map(|a| format!(" · {a}")).unwrap_or_default();
        println!("{category}{area}");
    }
    if app.favorites().is_favorite(id) {
        println!("♥ In your favorites");
    }
    if rating.total > 0 {
        println!("★ {:.1} ({} ratings)", rating.average, rating.total);
    }
    if rating.user_rating > 0 {
        println!("Your rating: {}", rating.user_rating);
    }
    println!("\n{}", recipe.description);
    if !recipe.ingredients.is_empty() {
        println!("\nIngredients:");
        for line in &recipe.ingredients {
            println!("  - {line}");
        }
    }
    if let Some(instructions) = &recipe.instructions {
        println!("\nInstructions:\n{instructions}");
    }
    if let Some(link) = &recipe.youtube_link {
        println!("\nVideo: {link}");
    }
    Ok(())
}

async fn favorites(app: &App, action: FavoritesAction) -> anyhow::Result<()> {
    let mut rx = app.notifier.subscribe();
    let store = app.favorites();
    match action {
        FavoritesAction::List => {
            let favorites = store.favorites();
            if favorites.is_empty() {
                println!("No favorites yet.");
            } else {
                print_list(&favorites, &store);
            }
        }
        FavoritesAction::Add { id } => {
            let recipe = load_recipe(app.source.as_ref(), id).await?;
            if !store.add(recipe) {
                println!("Already a favorite.");
            }
        }
        FavoritesAction::Remove { id } => {
            if store.remove(id).is_none() {
                println!("Recipe {id} is not a favorite.");
            }
        }
        FavoritesAction::Clear => store.clear_all(),
        FavoritesAction::Move { from, to } => {
            if from == 0 || to == 0 {
                bail!("positions start at 1");
            }
            store.move_favorite(from - 1, to - 1)?;
        }
    }
    print_notifications(&mut rx);
    Ok(())
}

async fn top_rated(app: &App) -> anyhow::Result<()> {
    let ratings = app.ratings();
    let ids = ratings.top_rated(app.config.ratings.top_limit);
    if ids.is_empty() {
        println!("Nothing rated yet.");
        return Ok(());
    }
    let pb = spinner("Loading top rated recipes...")?;
    let recipes = load_top_rated(app.source.as_ref(), &ids).await;
    pb.finish_and_clear();

    for (i, recipe) in recipes?.iter().enumerate() {
        let summary = ratings.aggregate(recipe.id);
        println!("  {:>2}. ★ {:.1} ({:>3})  [{}] {}", i + 1, summary.average, summary.total, recipe.id, recipe.title);
    }
    Ok(())
}

fn theme(app: &App, action: Option<ThemeAction>) {
    let store = app.theme();
    let mode = match action {
        None => store.mode(),
        Some(ThemeAction::Toggle) => store.toggle(),
        Some(ThemeAction::Light) => {
            store.set(ThemeMode::Light);
            ThemeMode::Light
        }
        Some(ThemeAction::Dark) => {
            store.set(ThemeMode::Dark);
            ThemeMode::Dark
        }
    };
    println!("Theme: {mode}");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    let app = App::open(config)?;

    match cli.command {
        Command::Browse { pages } => browse(&app, pages).await?,
        Command::Search { query } => search(&app, &query).await?,
        Command::Show { id } => show(&app, id).await?,
        Command::Favorites { action } => favorites(&app, action.unwrap_or(FavoritesAction::List)).await?,
        Command::Rate { id, stars } => {
            let summary = app.ratings().rate(id, stars)?;
            println!("★ {:.1} ({} ratings), yours: {}", summary.average, summary.total, summary.user_rating);
        }
        Command::Rating { id } => {
            let summary = app.ratings().aggregate(id);
            if summary.total == 0 {
                println!("Recipe {id} has no ratings yet.");
            } else {
                println!("★ {:.1} ({} ratings)", summary.average, summary.total);
            }
            if summary.user_rating > 0 {
                println!("Your rating: {}", summary.user_rating);
            }
        }
        Command::TopRated => top_rated(&app).await?,
        Command::Theme { action } => theme(&app, action),
    }
    Ok(())
}

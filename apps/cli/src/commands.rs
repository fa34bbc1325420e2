//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use poetryhub_core::analysis::{AnalysisAction, analyze_poem};
use poetryhub_core::search::{SearchHit, SearchKind, SearchOutcome, ai_search};
use poetryhub_core::{ImportOptions, ImportProgress, ImportSummary, import_archive};
use poetryhub_llm::OpenRouterClient;
use poetryhub_shared::{
    AppConfig, Collection, CollectionId, FavoriteAction, NewCollection, PoemId, PoemView, PoetId,
    init_config, load_config, resolve_database_path, validate_api_key,
};
use poetryhub_storage::{PoemQuery, Storage};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Poetry Hub: import, browse, and explore a poetry catalog.
#[derive(Parser)]
#[command(
    name = "poetryhub",
    version,
    about = "Import a poetry archive and browse poems, poets, and themes.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Catalog database path (overrides `defaults.database_path`).
    #[arg(long, global = true, env = "POETRYHUB_DB")]
    pub db: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// What `search` looks for.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum KindArg {
    Poem,
    Poet,
}

impl From<KindArg> for SearchKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Poem => Self::Poem,
            KindArg::Poet => Self::Poet,
        }
    }
}

/// Which analysis `analyze` runs.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum ActionArg {
    Analyze,
    Themes,
    Similar,
}

impl From<ActionArg> for AnalysisAction {
    fn from(action: ActionArg) -> Self {
        match action {
            ActionArg::Analyze => Self::Analyze,
            ActionArg::Themes => Self::Themes,
            ActionArg::Similar => Self::Similar,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Bulk-import poems from a ZIP archive containing a CSV export.
    Import {
        /// Path to the ZIP archive.
        archive: PathBuf,

        /// Records per batch (overrides `import.batch_size`).
        #[arg(long)]
        batch_size: Option<usize>,

        /// CSV file name inside the archive (overrides `import.archive_entry`).
        #[arg(long)]
        entry: Option<String>,
    },

    /// List poems, newest first.
    Poems {
        /// Only poems with this theme.
        #[arg(long)]
        theme: Option<String>,

        /// Title substring to match.
        #[arg(short, long)]
        search: Option<String>,

        /// Maximum number of poems.
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },

    /// Show a single poem.
    Poem {
        /// Poem ID.
        id: String,

        /// Record the read in this user's history.
        #[arg(long, env = "POETRYHUB_USER")]
        user: Option<String>,
    },

    /// List poets with their poem counts.
    Poets {
        /// Name substring to match.
        #[arg(short, long)]
        search: Option<String>,

        /// Maximum number of poets.
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Show a poet and their poems.
    Poet {
        /// Poet ID.
        id: String,
    },

    /// Show engagement totals for a poet's poems.
    PoetStats {
        /// Poet ID.
        id: String,
    },

    /// List themes with their poem counts.
    Themes,

    /// List the most-read poems.
    Featured {
        /// Maximum number of poems.
        #[arg(short, long, default_value = "6")]
        limit: u32,
    },

    /// Show a poem picked at random.
    Random,

    /// Search the catalog, asking the model when nothing matches.
    Search {
        /// Title or name to look for.
        query: String,

        /// Search for a poem or a poet.
        #[arg(short, long, value_enum, default_value = "poem")]
        kind: KindArg,
    },

    /// Ask the model about a poem.
    Analyze {
        /// Poem ID.
        poem_id: String,

        /// Kind of analysis.
        #[arg(short, long, value_enum, default_value = "analyze")]
        action: ActionArg,
    },

    /// Add a poem to favorites, or remove it if already there.
    Favorite {
        /// Poem ID.
        poem_id: String,

        #[arg(long, env = "POETRYHUB_USER")]
        user: String,
    },

    /// List favorite poems.
    Favorites {
        #[arg(long, env = "POETRYHUB_USER")]
        user: String,
    },

    /// List recently read poems.
    History {
        #[arg(long, env = "POETRYHUB_USER")]
        user: String,

        /// Maximum entries (overrides `defaults.history_limit`).
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Poem comments.
    Comment {
        #[command(subcommand)]
        action: CommentAction,
    },

    /// Poem collections.
    Collection {
        #[command(subcommand)]
        action: CollectionAction,
    },

    /// List past imports.
    Imports {
        /// Maximum number of runs.
        #[arg(short, long, default_value = "10")]
        limit: u32,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Comment subcommands.
#[derive(Subcommand)]
pub(crate) enum CommentAction {
    /// Comment on a poem.
    Add {
        /// Poem ID.
        poem_id: String,

        #[arg(long, env = "POETRYHUB_USER")]
        user: String,

        /// Comment text.
        #[arg(short, long)]
        body: String,
    },
    /// List a poem's comments.
    List {
        /// Poem ID.
        poem_id: String,
    },
    /// Delete one of your comments.
    Delete {
        /// Comment ID.
        comment_id: String,

        #[arg(long, env = "POETRYHUB_USER")]
        user: String,
    },
}

/// Collection subcommands.
#[derive(Subcommand)]
pub(crate) enum CollectionAction {
    /// Create a collection.
    Create {
        /// Collection name.
        name: String,

        #[arg(long, env = "POETRYHUB_USER")]
        user: String,

        /// Short description.
        #[arg(short, long)]
        description: Option<String>,

        /// Let every reader see the collection.
        #[arg(long)]
        public: bool,
    },
    /// List your collections, or all public ones without `--user`.
    List {
        #[arg(long, env = "POETRYHUB_USER")]
        user: Option<String>,
    },
    /// Show the poems in a collection.
    Show {
        /// Collection ID.
        collection_id: String,

        #[arg(long, env = "POETRYHUB_USER")]
        user: Option<String>,
    },
    /// Add a poem to one of your collections.
    Add {
        /// Collection ID.
        collection_id: String,

        /// Poem ID.
        poem_id: String,

        #[arg(long, env = "POETRYHUB_USER")]
        user: String,
    },
    /// Remove a poem from one of your collections.
    Remove {
        /// Collection ID.
        collection_id: String,

        /// Poem ID.
        poem_id: String,

        #[arg(long, env = "POETRYHUB_USER")]
        user: String,
    },
    /// Delete one of your collections.
    Delete {
        /// Collection ID.
        collection_id: String,

        #[arg(long, env = "POETRYHUB_USER")]
        user: String,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "poetryhub=info",
        1 => "poetryhub=debug",
        _ => "poetryhub=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Loaded config plus the resolved database location.
struct Context {
    config: AppConfig,
    db_path: PathBuf,
}

impl Context {
    fn load(db: Option<PathBuf>) -> Result<Self> {
        let config = load_config()?;
        let db_path = match db {
            Some(path) => path,
            None => resolve_database_path(&config)?,
        };
        Ok(Self { config, db_path })
    }

    async fn open(&self) -> Result<Storage> {
        Ok(Storage::open(&self.db_path).await?)
    }

    async fn open_readonly(&self) -> Result<Storage> {
        Ok(Storage::open_readonly(&self.db_path).await?)
    }

    fn completion_client(&self) -> Result<OpenRouterClient> {
        let api_key = validate_api_key(&self.config)?;
        Ok(OpenRouterClient::new(&self.config.ai, api_key)?)
    }
}

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    if let Command::Config { action } = &cli.command {
        return match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        };
    }

    let ctx = Context::load(cli.db)?;

    match cli.command {
        Command::Import {
            archive,
            batch_size,
            entry,
        } => cmd_import(&ctx, &archive, batch_size, entry).await,
        Command::Poems {
            theme,
            search,
            limit,
        } => cmd_poems(&ctx, theme, search, limit).await,
        Command::Poem { id, user } => cmd_poem(&ctx, &id, user.as_deref()).await,
        Command::Poets { search, limit } => cmd_poets(&ctx, search.as_deref(), limit).await,
        Command::Poet { id } => cmd_poet(&ctx, &id).await,
        Command::PoetStats { id } => cmd_poet_stats(&ctx, &id).await,
        Command::Themes => cmd_themes(&ctx).await,
        Command::Featured { limit } => cmd_featured(&ctx, limit).await,
        Command::Random => cmd_random(&ctx).await,
        Command::Search { query, kind } => cmd_search(&ctx, &query, kind.into()).await,
        Command::Analyze { poem_id, action } => cmd_analyze(&ctx, &poem_id, action.into()).await,
        Command::Favorite { poem_id, user } => cmd_favorite(&ctx, &poem_id, &user).await,
        Command::Favorites { user } => cmd_favorites(&ctx, &user).await,
        Command::History { user, limit } => cmd_history(&ctx, &user, limit).await,
        Command::Comment { action } => match action {
            CommentAction::Add {
                poem_id,
                user,
                body,
            } => cmd_comment_add(&ctx, &poem_id, &user, &body).await,
            CommentAction::List { poem_id } => cmd_comment_list(&ctx, &poem_id).await,
            CommentAction::Delete { comment_id, user } => {
                cmd_comment_delete(&ctx, &comment_id, &user).await
            }
        },
        Command::Collection { action } => cmd_collection(&ctx, action).await,
        Command::Imports { limit } => cmd_imports(&ctx, limit).await,
        Command::Config { .. } => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

async fn cmd_import(
    ctx: &Context,
    archive: &Path,
    batch_size: Option<usize>,
    entry: Option<String>,
) -> Result<()> {
    let bytes = tokio::fs::read(archive)
        .await
        .map_err(|e| eyre!("cannot read '{}': {e}", archive.display()))?;

    let mut options = ImportOptions::from(&ctx.config.import);
    if let Some(size) = batch_size {
        options.batch_size = size;
    }
    if let Some(entry) = entry {
        options.archive_entry = entry;
    }

    let storage = ctx.open().await?;
    let source = archive.display().to_string();
    let run_id = storage.insert_import_run(&source).await?;

    info!(
        archive = %source,
        bytes = bytes.len(),
        batch_size = options.batch_size,
        "starting import"
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let token = CancellationToken::new();
    let spinner = ImportSpinner::start(rx);

    let interrupt = {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, stopping after the current record");
                token.cancel();
            }
        })
    };

    let result = import_archive(&bytes, &storage, options, Some(tx), Some(token)).await;
    interrupt.abort();
    spinner.finish().await;

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            let failure = serde_json::json!({ "error": e.to_string() });
            storage
                .finish_import_run(&run_id, &failure.to_string())
                .await?;
            return Err(e.into());
        }
    };

    storage
        .finish_import_run(&run_id, &serde_json::to_string(&summary)?)
        .await?;

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &ImportSummary) {
    println!();
    if summary.cancelled {
        println!("  Import cancelled; partial results:");
    } else {
        println!("  Import complete!");
    }
    println!("  Processed:     {}", summary.total_processed);
    println!("  Poems added:   {}", summary.added_poems);
    println!("  Poets added:   {}", summary.added_poets);
    println!("  Poems skipped: {}", summary.skipped_poems);
    if summary.failed_records > 0 {
        println!("  Failed:        {}", summary.failed_records);
    }
    println!();
}

/// Spinner fed by the importer's progress stream.
struct ImportSpinner {
    bar: ProgressBar,
    task: tokio::task::JoinHandle<()>,
}

impl ImportSpinner {
    fn start(mut rx: mpsc::UnboundedReceiver<ImportProgress>) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        bar.set_message("Reading archive");

        let task = {
            let bar = bar.clone();
            tokio::spawn(async move {
                while let Some(progress) = rx.recv().await {
                    bar.set_message(format!(
                        "Importing [{} processed, {} added, {} skipped] {}",
                        progress.total_processed,
                        progress.added_poems,
                        progress.skipped_poems,
                        progress.current_title.trim()
                    ));
                }
            })
        };

        Self { bar, task }
    }

    /// Wait for the stream to close, then clear the spinner.
    async fn finish(self) {
        let _ = self.task.await;
        self.bar.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Browsing
// ---------------------------------------------------------------------------

async fn cmd_poems(
    ctx: &Context,
    theme: Option<String>,
    search: Option<String>,
    limit: u32,
) -> Result<()> {
    let storage = ctx.open_readonly().await?;
    let poems = storage
        .list_poems(&PoemQuery {
            theme,
            search,
            limit: Some(limit),
        })
        .await?;

    if poems.is_empty() {
        println!("No poems found.");
        return Ok(());
    }
    for view in &poems {
        print_poem_line(view);
    }
    Ok(())
}

async fn cmd_poem(ctx: &Context, id: &str, user: Option<&str>) -> Result<()> {
    let poem_id = parse_poem_id(id)?;
    let storage = match user {
        Some(_) => ctx.open().await?,
        None => ctx.open_readonly().await?,
    };

    let view = storage
        .get_poem(&poem_id)
        .await?
        .ok_or_else(|| eyre!("poem {id} not found"))?;

    if let Some(user) = user {
        storage.record_read(user, &poem_id).await?;
    }

    print_poem(&view);
    Ok(())
}

async fn cmd_poets(ctx: &Context, search: Option<&str>, limit: Option<u32>) -> Result<()> {
    let storage = ctx.open_readonly().await?;
    let poets = storage.list_poets(search, limit).await?;

    if poets.is_empty() {
        println!("No poets found.");
        return Ok(());
    }
    for summary in &poets {
        println!(
            "  {}  {} ({} poems)",
            summary.poet.id, summary.poet.name, summary.poem_count
        );
    }
    Ok(())
}

async fn cmd_poet(ctx: &Context, id: &str) -> Result<()> {
    let poet_id = parse_poet_id(id)?;
    let storage = ctx.open_readonly().await?;

    let poet = storage
        .get_poet(&poet_id)
        .await?
        .ok_or_else(|| eyre!("poet {id} not found"))?;

    println!();
    println!("  {}", poet.name);
    let years = match (poet.birth_year, poet.death_year) {
        (Some(b), Some(d)) => Some(format!("{b}–{d}")),
        (Some(b), None) => Some(format!("born {b}")),
        (None, Some(d)) => Some(format!("died {d}")),
        (None, None) => None,
    };
    if let Some(years) = years {
        println!("  {years}");
    }
    if let Some(nationality) = &poet.nationality {
        println!("  {nationality}");
    }
    if let Some(bio) = &poet.bio {
        println!();
        println!("  {bio}");
    }
    println!();

    for view in storage.list_poems_by_poet(&poet_id).await? {
        print_poem_line(&view);
    }
    Ok(())
}

async fn cmd_poet_stats(ctx: &Context, id: &str) -> Result<()> {
    let poet_id = parse_poet_id(id)?;
    let storage = ctx.open_readonly().await?;

    let stats = storage
        .poet_analytics(&poet_id)
        .await?
        .ok_or_else(|| eyre!("poet {id} not found"))?;

    println!();
    println!("  Poems:     {}", stats.total_poems);
    println!(
        "  Views:     {} (avg {})",
        stats.total_views, stats.average_views
    );
    println!(
        "  Favorites: {} (avg {})",
        stats.total_favorites, stats.average_favorites
    );
    println!("  Comments:  {}", stats.total_comments);
    println!();
    for poem in &stats.poems {
        println!(
            "  {:>6} views {:>4} favorites {:>4} comments  {}",
            poem.views,
            poem.favorites,
            poem.comments,
            poem.title.trim()
        );
    }
    Ok(())
}

async fn cmd_themes(ctx: &Context) -> Result<()> {
    let storage = ctx.open_readonly().await?;
    for theme in storage.list_themes().await? {
        println!("  {:<20} {} poems", theme.name, theme.poem_count);
    }
    Ok(())
}

async fn cmd_featured(ctx: &Context, limit: u32) -> Result<()> {
    let storage = ctx.open_readonly().await?;
    let poems = storage.featured_poems(limit).await?;

    if poems.is_empty() {
        println!("No poems yet.");
        return Ok(());
    }
    for view in &poems {
        print_poem_line(view);
    }
    Ok(())
}

async fn cmd_random(ctx: &Context) -> Result<()> {
    let storage = ctx.open_readonly().await?;
    match storage.random_poem().await? {
        Some(view) => print_poem(&view),
        None => println!("No poems yet."),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Model-assisted commands
// ---------------------------------------------------------------------------

async fn cmd_search(ctx: &Context, query: &str, kind: SearchKind) -> Result<()> {
    let client = ctx.completion_client()?;
    let storage = ctx.open().await?;

    let outcome = ai_search(&storage, &client, kind, query, ctx.config.ai.temperature).await?;

    match outcome {
        SearchOutcome::Database { hits } => {
            println!("Found in catalog:");
            for hit in &hits {
                print_hit(hit);
            }
        }
        SearchOutcome::Generated { hit, added } => {
            if added {
                println!("Added to catalog:");
            } else {
                println!("Already in catalog:");
            }
            print_hit(&hit);
        }
        SearchOutcome::NotFound { message } => println!("{message}"),
    }
    Ok(())
}

async fn cmd_analyze(ctx: &Context, poem_id: &str, action: AnalysisAction) -> Result<()> {
    let poem_id = parse_poem_id(poem_id)?;
    let client = ctx.completion_client()?;
    let storage = ctx.open().await?;

    let result = analyze_poem(
        &storage,
        &client,
        &poem_id,
        action,
        ctx.config.ai.temperature,
    )
    .await?;

    if result.cached {
        info!("served from cache");
    }
    println!("{}", result.text.trim());
    Ok(())
}

// ---------------------------------------------------------------------------
// Reader activity
// ---------------------------------------------------------------------------

async fn cmd_favorite(ctx: &Context, poem_id: &str, user: &str) -> Result<()> {
    let poem_id = parse_poem_id(poem_id)?;
    let storage = ctx.open().await?;

    match storage.toggle_favorite(user, &poem_id).await? {
        FavoriteAction::Added => println!("Added to favorites."),
        FavoriteAction::Removed => println!("Removed from favorites."),
    }
    Ok(())
}

async fn cmd_favorites(ctx: &Context, user: &str) -> Result<()> {
    let storage = ctx.open_readonly().await?;
    let favorites = storage.list_favorites(user).await?;

    if favorites.is_empty() {
        println!("No favorites yet.");
        return Ok(());
    }
    for entry in &favorites {
        print_poem_line(&entry.poem);
    }
    Ok(())
}

async fn cmd_history(ctx: &Context, user: &str, limit: Option<u32>) -> Result<()> {
    let storage = ctx.open_readonly().await?;
    let limit = limit.unwrap_or(ctx.config.defaults.history_limit);
    let history = storage.list_history(user, limit).await?;

    if history.is_empty() {
        println!("No reading history yet.");
        return Ok(());
    }
    for entry in &history {
        println!(
            "  {}  {} by {}",
            entry.read_at.format("%Y-%m-%d %H:%M"),
            entry.poem.poem.title.trim(),
            entry.poem.poet_name
        );
    }
    Ok(())
}

async fn cmd_comment_add(ctx: &Context, poem_id: &str, user: &str, body: &str) -> Result<()> {
    let poem_id = parse_poem_id(poem_id)?;
    let storage = ctx.open().await?;
    let comment = storage.add_comment(&poem_id, user, body).await?;
    println!("Comment added: {}", comment.id);
    Ok(())
}

async fn cmd_comment_list(ctx: &Context, poem_id: &str) -> Result<()> {
    let poem_id = parse_poem_id(poem_id)?;
    let storage = ctx.open_readonly().await?;
    let comments = storage.list_comments(&poem_id).await?;

    if comments.is_empty() {
        println!("No comments yet.");
        return Ok(());
    }
    for comment in &comments {
        println!(
            "  [{}] {} ({}):",
            comment.id,
            comment.user_id,
            comment.created_at.format("%Y-%m-%d %H:%M")
        );
        println!("    {}", comment.body);
    }
    Ok(())
}

async fn cmd_comment_delete(ctx: &Context, comment_id: &str, user: &str) -> Result<()> {
    let storage = ctx.open().await?;
    if storage.delete_comment(comment_id, user).await? {
        println!("Comment deleted.");
        Ok(())
    } else {
        Err(eyre!("no comment {comment_id} by {user}"))
    }
}

async fn cmd_collection(ctx: &Context, action: CollectionAction) -> Result<()> {
    match action {
        CollectionAction::Create {
            name,
            user,
            description,
            public,
        } => {
            let storage = ctx.open().await?;
            let collection = storage
                .create_collection(
                    &user,
                    &NewCollection {
                        name,
                        description,
                        is_public: public,
                    },
                )
                .await?;
            println!("Collection created: {}", collection.id);
        }
        CollectionAction::List { user } => {
            let storage = ctx.open_readonly().await?;
            let collections = storage.list_collections(user.as_deref()).await?;
            if collections.is_empty() {
                println!("No collections found.");
            }
            for collection in &collections {
                print_collection_line(collection);
            }
        }
        CollectionAction::Show {
            collection_id,
            user,
        } => {
            let id = parse_collection_id(&collection_id)?;
            let storage = ctx.open_readonly().await?;
            let entries = storage.collection_poems(&id, user.as_deref()).await?;
            if entries.is_empty() {
                println!("This collection is empty.");
            }
            for entry in &entries {
                print_poem_line(&entry.poem);
            }
        }
        CollectionAction::Add {
            collection_id,
            poem_id,
            user,
        } => {
            let id = parse_collection_id(&collection_id)?;
            let poem_id = parse_poem_id(&poem_id)?;
            let storage = ctx.open().await?;
            if storage.add_to_collection(&id, &user, &poem_id).await? {
                println!("Added to collection.");
            } else {
                println!("Already in collection.");
            }
        }
        CollectionAction::Remove {
            collection_id,
            poem_id,
            user,
        } => {
            let id = parse_collection_id(&collection_id)?;
            let poem_id = parse_poem_id(&poem_id)?;
            let storage = ctx.open().await?;
            if storage.remove_from_collection(&id, &user, &poem_id).await? {
                println!("Removed from collection.");
            } else {
                println!("Poem was not in the collection.");
            }
        }
        CollectionAction::Delete {
            collection_id,
            user,
        } => {
            let id = parse_collection_id(&collection_id)?;
            let storage = ctx.open().await?;
            if !storage.delete_collection(&id, &user).await? {
                return Err(eyre!("no collection {collection_id} owned by {user}"));
            }
            println!("Collection deleted.");
        }
    }
    Ok(())
}

async fn cmd_imports(ctx: &Context, limit: u32) -> Result<()> {
    let storage = ctx.open_readonly().await?;
    let runs = storage.list_import_runs(limit).await?;

    if runs.is_empty() {
        println!("No imports yet.");
        return Ok(());
    }
    for run in &runs {
        let status = match (&run.finished_at, &run.summary) {
            (None, _) => "unfinished".to_string(),
            (Some(_), Some(summary)) if summary.get("error").is_some() => {
                format!("failed: {}", summary["error"].as_str().unwrap_or("unknown"))
            }
            (Some(_), Some(summary)) => format!(
                "{} processed, {} added, {} skipped",
                summary["totalProcessed"], summary["addedPoems"], summary["skippedPoems"]
            ),
            (Some(_), None) => "finished".to_string(),
        };
        println!(
            "  {}  {}  {status}",
            run.started_at.format("%Y-%m-%d %H:%M"),
            run.source
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn parse_poem_id(id: &str) -> Result<PoemId> {
    id.parse().map_err(|e| eyre!("invalid poem ID '{id}': {e}"))
}

fn parse_poet_id(id: &str) -> Result<PoetId> {
    id.parse().map_err(|e| eyre!("invalid poet ID '{id}': {e}"))
}

fn parse_collection_id(id: &str) -> Result<CollectionId> {
    id.parse().map_err(|e| eyre!("invalid collection ID '{id}': {e}"))
}

fn print_poem(view: &PoemView) {
    println!();
    println!("  {}", view.poem.title.trim());
    match view.poem.year_published {
        Some(year) => println!("  by {} ({year})", view.poet_name),
        None => println!("  by {}", view.poet_name),
    }
    if !view.themes.is_empty() {
        println!("  Themes: {}", view.themes.join(", "));
    }
    println!();
    for line in view.poem.body.trim().lines() {
        println!("    {}", line.trim_end());
    }
    println!();
}

fn print_collection_line(collection: &Collection) {
    let visibility = if collection.is_public { "public" } else { "private" };
    println!(
        "  {}  {} ({} poems, {visibility})",
        collection.id, collection.name, collection.poem_count
    );
    if let Some(description) = &collection.description {
        println!("    {description}");
    }
}

fn print_poem_line(view: &PoemView) {
    let themes = if view.themes.is_empty() {
        String::new()
    } else {
        format!("  [{}]", view.themes.join(", "))
    };
    println!(
        "  {}  {} by {}{themes}",
        view.poem.id,
        view.poem.title.trim(),
        view.poet_name
    );
}

fn print_hit(hit: &SearchHit) {
    match hit {
        SearchHit::Poem(view) => print_poem_line(view),
        SearchHit::Poet(poet) => {
            println!("  {}  {}", poet.id, poet.name);
            if let Some(bio) = &poet.bio {
                println!("    {bio}");
            }
        }
    }
}

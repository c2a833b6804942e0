//! PanRes Explorer CLI - query the PanRes ontology from the terminal

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use panres_core::config::Config;
use panres_core::domain::ontology::{
    CategoryCount, CategoryListing, ChartData, GroupedGeneListing, ItemDetails, ItemGroup,
    References, RelatedSubject, SearchIndex, Suggestion, TripleStore, ValueDescriptor,
};
use panres_core::infrastructure::ontology::{
    SqliteOntologyService, SqliteSearchIndex, SqliteTripleStore,
};
use panres_core::storage::{self, Database};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "panres")]
#[command(author, version, about = "Explore the PanRes antimicrobial resistance ontology", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the triple store database
    #[arg(long, global = true, value_name = "PATH")]
    database: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Load triples from a JSONL file
    Load {
        /// JSONL file with one {"subject","predicate","object"} per line
        file: PathBuf,
    },

    /// Export all triples to a JSONL file
    Export {
        /// Destination file
        file: PathBuf,
    },

    /// Show the detail view of a node
    Item {
        /// Node identifier
        id: String,
    },

    /// Show item counts for every category
    Categories,

    /// List the items of one category
    List {
        /// Category key (see `panres categories`)
        category: String,
    },

    /// List pan genes grouped by resistance class and phenotype
    Genes,

    /// Show the value distribution of a predicate
    Chart {
        /// Predicate whose objects are counted
        predicate: String,
        /// Only count subjects of this type
        #[arg(short, long)]
        subject_type: Option<String>,
        /// Number of values shown before folding into "Others"
        #[arg(short = 'n', long)]
        top_n: Option<usize>,
        /// Show every value
        #[arg(short, long)]
        all: bool,
    },

    /// List subjects linked to an object through a predicate
    Related {
        /// Predicate
        predicate: String,
        /// Object identifier
        object: String,
    },

    /// Autocomplete a partial search query
    Suggest {
        /// Partial query
        query: String,
        /// Maximum number of suggestions
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Search index maintenance
    Index {
        #[command(subcommand)]
        action: IndexAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,
}

#[derive(Subcommand)]
enum IndexAction {
    /// Rebuild the full-text search index
    Rebuild,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show all configuration values and categories
    Show,
    /// Show config file path
    Path,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// Reset configuration to defaults
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("panres=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let result = run(cli).await;
    if let Err(e) = &result {
        report_hint(e);
    }
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    let quiet = cli.quiet;
    let database = cli.database.as_deref();

    match cli.command {
        Commands::Config { action } => cmd_config(action, format, quiet),

        Commands::Doctor => cmd_doctor(database, quiet).await,

        Commands::Load { file } => {
            let db = open_database(&Config::load()?, database).await?;
            cmd_load(&db, &file, format, quiet).await
        }

        Commands::Export { file } => {
            let db = open_database(&Config::load()?, database).await?;
            cmd_export(&db, &file, format, quiet).await
        }

        Commands::Index {
            action: IndexAction::Rebuild,
        } => {
            let config = Config::load()?;
            let db = open_database(&config, database).await?;
            cmd_index_rebuild(&db, &config, format, quiet).await
        }

        Commands::Item { id } => {
            let service = open_service(Config::load()?, database).await?;
            cmd_item(&service, &id, format, quiet).await
        }

        Commands::Categories => {
            let service = open_service(Config::load()?, database).await?;
            cmd_categories(&service, format, quiet).await
        }

        Commands::List { category } => {
            let service = open_service(Config::load()?, database).await?;
            cmd_list(&service, &category, format, quiet).await
        }

        Commands::Genes => {
            let service = open_service(Config::load()?, database).await?;
            cmd_genes(&service, format, quiet).await
        }

        Commands::Chart {
            predicate,
            subject_type,
            top_n,
            all,
        } => {
            let service = open_service(Config::load()?, database).await?;
            let chart = service
                .get_chart_data(&predicate, subject_type.as_deref(), top_n, all)
                .await?;
            print_chart(&predicate, &chart, format, quiet)
        }

        Commands::Related { predicate, object } => {
            let service = open_service(Config::load()?, database).await?;
            let related = service.get_related_subjects(&predicate, &object).await?;
            print_related(&predicate, &object, &related, format, quiet)
        }

        Commands::Suggest { query, limit } => {
            let service = open_service(Config::load()?, database).await?;
            let suggestions = service.get_autocomplete_suggestions(&query, limit).await;
            print_suggestions(&suggestions, format, quiet)
        }
    }
}

/// Print the code and suggested command of a core error to stderr
fn report_hint(error: &anyhow::Error) {
    if let Some(core) = error.downcast_ref::<panres_core::Error>() {
        eprintln!("error[{}]", core.code());
        if let Some(hint) = core.suggestion() {
            eprintln!("  hint: try `{}`", hint);
        }
    }
}

// ============================================================================
// Setup
// ============================================================================

async fn open_database(config: &Config, database: Option<&Path>) -> anyhow::Result<Database> {
    let db_config = config.database_config(database);
    let db = Database::new(db_config).await?;
    tracing::debug!(path = %db.path().display(), "Triple store opened");
    Ok(db)
}

/// Open the store and build the search index before any query runs
async fn open_service(
    config: Config,
    database: Option<&Path>,
) -> anyhow::Result<SqliteOntologyService> {
    let db = open_database(&config, database).await?;
    let report = storage::rebuild_search_index(db.pool(), &config.ontology.label_predicate)
        .await
        .context("Failed to build the search index at startup")?;
    info!(entries = report.entries, "Search index ready");

    Ok(SqliteOntologyService::sqlite(
        db.pool().clone(),
        Arc::new(config),
    ))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_load(
    db: &Database,
    file: &Path,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let result = storage::import_triples(db.pool(), file).await?;
    if format == OutputFormat::Json {
        return print_json(&result);
    }

    for warning in &result.warnings {
        warn!(file = %file.display(), "{}", warning);
    }
    if !quiet {
        println!("Loaded {}", file.display());
        println!("  Inserted:   {}", result.inserted);
        println!("  Duplicates: {}", result.duplicates);
        println!("  Malformed:  {}", result.malformed);
    }
    Ok(())
}

async fn cmd_export(
    db: &Database,
    file: &Path,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let result = storage::export_triples(db.pool(), file).await?;
    if format == OutputFormat::Json {
        return print_json(&result);
    }
    if !quiet {
        println!(
            "Exported {} triples to {}",
            result.triples,
            result.path.display()
        );
    }
    Ok(())
}

async fn cmd_index_rebuild(
    db: &Database,
    config: &Config,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let report = storage::rebuild_search_index(db.pool(), &config.ontology.label_predicate)
        .await
        .context("Failed to rebuild the search index")?;
    if format == OutputFormat::Json {
        return print_json(&report);
    }
    if !quiet {
        println!(
            "Search index rebuilt: {} entries ({})",
            report.entries,
            report.built_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    Ok(())
}

async fn cmd_item(
    service: &SqliteOntologyService,
    id: &str,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let Some(details) = service.get_item_details(id).await? else {
        anyhow::bail!("Item '{}' not found", id);
    };
    if format == OutputFormat::Json {
        return print_json(&details);
    }
    print_item(&details, quiet);
    Ok(())
}

fn print_item(details: &ItemDetails, quiet: bool) {
    if details.label == details.id {
        println!("{}", details.id);
    } else {
        println!("{} ({})", details.label, details.id);
    }
    if !quiet {
        println!("  View:     {}", details.view_type.as_str());
        if let Some(primary_type) = &details.primary_type {
            println!("  Type:     {}", primary_type);
        }
        if let Some(category) = &details.category {
            println!("  Category: {}", category);
        }
    }
    if let Some(description) = &details.description {
        println!();
        println!("{}", description);
    }

    if !details.properties.is_empty() {
        println!();
        println!("Properties:");
        for (name, values) in &details.properties {
            let rendered: Vec<String> = values.iter().map(render_value).collect();
            println!("  {}: {}", name, rendered.join(", "));
        }
    }

    match &details.references {
        References::Flat(references) if !references.is_empty() => {
            println!();
            println!("Referenced by:");
            for reference in references {
                println!(
                    "  {} ({}) via {}",
                    reference.label, reference.id, reference.predicate_label
                );
            }
        }
        References::Grouped(groups) if !groups.is_empty() => {
            println!();
            println!("Genes by resistance class:");
            for (class, genes) in groups {
                println!("  {} ({})", class, genes.len());
                for gene in genes {
                    println!("    {} ({})", gene.label, gene.id);
                }
            }
        }
        _ => {}
    }
}

fn render_value(value: &ValueDescriptor) -> String {
    if value.is_link && value.label != value.value {
        format!("{} [{}]", value.label, value.value)
    } else {
        value.label.clone()
    }
}

async fn cmd_categories(
    service: &SqliteOntologyService,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let counts = service.get_category_counts().await?;
    if format == OutputFormat::Json {
        return print_json(&counts);
    }
    print_category_counts(&counts, quiet);
    Ok(())
}

fn print_category_counts(counts: &[CategoryCount], quiet: bool) {
    if !quiet {
        println!("Categories:");
    }
    let width = counts.iter().map(|c| c.key.len()).max().unwrap_or(0);
    for count in counts {
        println!(
            "  {:<width$}  {:>7}  {}",
            count.key,
            count.count,
            count.name,
            width = width
        );
    }
}

async fn cmd_list(
    service: &SqliteOntologyService,
    category: &str,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let listing = service.list_category_items(category).await?;
    if format == OutputFormat::Json {
        return print_json(&listing);
    }
    print_listing(&listing, quiet);
    Ok(())
}

fn print_listing(listing: &CategoryListing, quiet: bool) {
    if !quiet {
        println!("{} ({} items)", listing.name, listing.items.len());
    }
    for item in &listing.items {
        let marker = if item.is_link { "" } else { " (no page)" };
        println!("  {} ({}){}", item.label, item.id, marker);
    }
}

async fn cmd_genes(
    service: &SqliteOntologyService,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let listing = service.get_grouped_gene_listing().await?;
    if format == OutputFormat::Json {
        return print_json(&listing);
    }
    print_grouped_genes(&listing, quiet);
    Ok(())
}

fn print_grouped_genes(listing: &GroupedGeneListing, quiet: bool) {
    if !quiet {
        println!("Pan genes: {}", listing.total);
        println!();
    }
    print_groups("By resistance class:", &listing.by_class);
    println!();
    print_groups("By predicted phenotype:", &listing.by_phenotype);
}

fn print_groups(title: &str, groups: &[ItemGroup]) {
    println!("{}", title);
    for group in groups {
        println!("  {} ({})", group.key, group.items.len());
        for item in &group.items {
            println!("    {} ({})", item.label, item.id);
        }
    }
}

fn print_chart(
    predicate: &str,
    chart: &ChartData,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(chart);
    }
    if !quiet {
        println!("Distribution of {} (total {})", predicate, chart.total);
    }
    let width = chart.labels.iter().map(String::len).max().unwrap_or(0);
    for ((label, value), color) in chart.labels.iter().zip(&chart.values).zip(&chart.colors) {
        println!(
            "  {:<width$}  {:>7}  {}",
            label,
            value,
            color,
            width = width
        );
    }
    Ok(())
}

fn print_related(
    predicate: &str,
    object: &str,
    related: &[RelatedSubject],
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(related);
    }
    if !quiet {
        println!(
            "Subjects with {} {} ({} found)",
            predicate,
            object,
            related.len()
        );
    }
    for subject in related {
        println!("  {} ({})", subject.label, subject.id);
    }
    Ok(())
}

fn print_suggestions(
    suggestions: &[Suggestion],
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(suggestions);
    }
    if suggestions.is_empty() {
        if !quiet {
            println!("No suggestions.");
        }
        return Ok(());
    }
    for suggestion in suggestions {
        println!(
            "  {:<14} {} ({})",
            suggestion.kind.as_str(),
            suggestion.label,
            suggestion.id
        );
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, format: OutputFormat, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            if format == OutputFormat::Json {
                return print_json(&config);
            }
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
            if !quiet {
                println!();
                println!("Categories:");
                for category in &config.categories {
                    println!(
                        "  {} ({}: {} {})",
                        category.key,
                        category.name,
                        category.query_type.as_str(),
                        category.value
                    );
                }
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
        ConfigAction::Init { force } => {
            let path = Config::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists: {} (use --force to overwrite)",
                    path.display()
                );
            }
            let path = Config::default().save()?;
            if !quiet {
                println!("Wrote default configuration to {}", path.display());
            }
        }
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
    }
    Ok(())
}

async fn cmd_doctor(database: Option<&Path>, quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        println!("PanRes Health Check");
        println!("===================");
        println!();
    }

    let mut all_ok = true;

    // Check configuration
    let config = match Config::load() {
        Ok(config) => {
            if !quiet {
                println!("[OK] Configuration: Valid");
                println!("     Categories: {}", config.categories.len());
            }
            config
        }
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] Configuration: Error - {}", e);
                println!("     Falling back to defaults");
            }
            Config::default()
        }
    };

    // Check config file location
    if !quiet {
        match Config::config_path() {
            Ok(path) => {
                if path.exists() {
                    println!("[OK] Config file: {}", path.display());
                } else {
                    println!("[--] Config file: {} (using defaults)", path.display());
                }
            }
            Err(e) => {
                println!("[!!] Config file: Error - {}", e);
            }
        }
    }

    // Check database
    match open_database(&config, database).await {
        Ok(db) => match db.health_check().await {
            Ok(()) => {
                if !quiet {
                    println!("[OK] Database: Connected");
                    println!("     Path: {}", db.path().display());
                }

                match db.migration_status().await {
                    Ok(status) => {
                        if status.needs_migration {
                            all_ok = false;
                            if !quiet {
                                println!(
                                    "[!!] Database: Migrations pending (v{} -> v{})",
                                    status.current_version, status.target_version
                                );
                            }
                        } else if !quiet {
                            println!("[OK] Database: Schema v{}", status.current_version);
                        }
                    }
                    Err(e) => {
                        all_ok = false;
                        if !quiet {
                            println!("[!!] Database: Migration check failed - {}", e);
                        }
                    }
                }

                let store = SqliteTripleStore::new(db.pool().clone());
                match store.stats().await {
                    Ok(stats) => {
                        if !quiet {
                            println!(
                                "[OK] Triples: {} ({} subjects, {} predicates)",
                                stats.triples, stats.subjects, stats.predicates
                            );
                        }
                    }
                    Err(e) => {
                        all_ok = false;
                        if !quiet {
                            println!("[!!] Triples: Error - {}", e);
                        }
                    }
                }

                let index = SqliteSearchIndex::new(db.pool().clone());
                match index.entry_count().await {
                    Ok(0) => {
                        if !quiet {
                            println!("[--] Search index: empty (built before each query)");
                        }
                    }
                    Ok(entries) => {
                        if !quiet {
                            println!("[OK] Search index: {} entries", entries);
                        }
                    }
                    Err(e) => {
                        all_ok = false;
                        if !quiet {
                            println!("[!!] Search index: Error - {}", e);
                        }
                    }
                }
            }
            Err(e) => {
                all_ok = false;
                if !quiet {
                    println!("[!!] Database: Health check failed - {}", e);
                }
            }
        },
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] Database: Failed to open - {}", e);
            }
        }
    }

    // Summary
    if !quiet {
        println!();
        if all_ok {
            println!("All checks passed!");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod main_tests;

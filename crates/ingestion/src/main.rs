//! PaperHub maintenance CLI
//!
//! Subcommands:
//! - `migrate`: apply SQL migrations
//! - `seed`: insert demo users, papers, comments and reviews
//! - `import-articles`: pull papers from arXiv or PubMed
//! - `check-articles`: report data-quality problems

mod arxiv;
mod check;
mod errors;
mod import;
mod pubmed;
mod seed;
mod source;
mod xml;

use clap::{Parser, Subcommand, ValueEnum};
use paperhub_common::{config::AppConfig, db::DbPool, observability, Repository, VERSION};
use source::ArticleSource;
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "paperhub-ingest", version = VERSION)]
#[command(about = "PaperHub database maintenance and article import")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending SQL migrations
    Migrate,

    /// Insert demo users, papers, comments and reviews
    Seed {
        /// Insert demo papers even if the owner already has one with the same title
        #[arg(long)]
        force: bool,
    },

    /// Import published papers from an external index
    ImportArticles {
        #[arg(long, value_enum)]
        source: SourceArg,

        /// Search query (arXiv fielded syntax or PubMed term)
        #[arg(long)]
        query: String,

        /// Maximum number of articles to fetch
        #[arg(long, default_value_t = 25)]
        max: usize,

        /// Fetch and report without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Report papers with missing fields, duplicates or dangling author ids
    CheckArticles {
        /// Exit non-zero when any issue is found
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SourceArg {
    Arxiv,
    Pubmed,
}

fn article_source(arg: SourceArg, config: &AppConfig) -> errors::Result<Box<dyn ArticleSource>> {
    let source: Box<dyn ArticleSource> = match arg {
        SourceArg::Arxiv => Box::new(arxiv::ArxivClient::new(&config.importer)?),
        SourceArg::Pubmed => Box::new(pubmed::PubmedClient::new(&config.importer)?),
    };
    Ok(source)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    observability::init_tracing(&config.observability);

    info!("PaperHub ingest v{}", VERSION);

    let db = DbPool::new(&config.database).await?;

    match cli.command {
        Command::Migrate => {
            db.migrate().await?;
        }

        Command::Seed { force } => {
            let report = seed::seed(&Repository::new(db), force).await?;
            println!(
                "users: {} created, {} existing; papers: {} created, {} skipped; {} comments, {} reviews",
                report.users_created,
                report.users_existing,
                report.papers_created,
                report.papers_skipped,
                report.comments_created,
                report.reviews_created,
            );
        }

        Command::ImportArticles {
            source,
            query,
            max,
            dry_run,
        } => {
            let source = article_source(source, &config)?;
            let report =
                import::import_articles(&Repository::new(db), source.as_ref(), &query, max, dry_run)
                    .await?;
            println!(
                "{}: fetched {}, {} {}, {} duplicates, {} invalid",
                source.source().as_str(),
                report.fetched,
                if dry_run { "would insert" } else { "inserted" },
                report.inserted,
                report.duplicates,
                report.invalid,
            );
        }

        Command::CheckArticles { strict } => {
            let (checked, issues) = check::run_check(&Repository::new(db)).await?;
            for issue in &issues {
                println!("{}", issue);
            }
            println!("{} papers checked, {} issues", checked, issues.len());

            if strict && !issues.is_empty() {
                warn!(issues = issues.len(), "Strict check failed");
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

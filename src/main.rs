//! Sitedeck - admin client for a small content-managed site

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sitedeck::{
    config::Config,
    dashboard::{Dashboard, EditPlan, PageData},
    models::{ComponentKind, PageDraft},
    tree,
};

#[derive(Parser)]
#[command(name = "sitedeck")]
#[command(about = "Manage the pages and page content of a Sitedeck site", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "PATH", default_value = "sitedeck.yml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the page tree
    Tree {
        /// Expand every branch
        #[arg(long)]
        all: bool,
    },

    /// Show the cards, carousel and about-us content of a page
    Show {
        #[arg(value_name = "PAGE_ID")]
        page: i64,
    },

    /// Create a page
    AddPage {
        #[arg(value_name = "TITLE")]
        title: String,

        /// Parent page id
        #[arg(long)]
        parent: Option<i64>,

        #[arg(long, default_value_t = 0)]
        nav_order: i32,
    },

    /// Delete a content item
    Delete {
        /// cards, carousel or aboutus
        #[arg(value_name = "KIND")]
        kind: ComponentKind,

        #[arg(value_name = "ID")]
        id: i64,
    },

    /// Run the edit wizard from a YAML plan
    Apply {
        #[arg(value_name = "PLAN")]
        plan: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitedeck=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config::load_with_env(Path::new(&cli.config))?;
    tracing::info!(backend = %config.backend.base_url, "Configuration loaded");

    let mut dashboard = Dashboard::connect(config).context("Failed to create backend client")?;

    let result = run(&mut dashboard, cli.command).await;
    if let Some(notice) = dashboard.notice() {
        println!("{}", notice);
    }
    result
}

async fn run(dashboard: &mut Dashboard, command: Commands) -> Result<()> {
    match command {
        Commands::Tree { all } => {
            dashboard.load_navigation().await?;
            let rows = if all {
                dashboard.all_rows()
            } else {
                dashboard.sidebar_rows()
            };
            for row in rows {
                println!("{}", row);
            }
        }
        Commands::Show { page } => {
            dashboard.load_navigation().await?;
            let title = tree::find_by_id(dashboard.tree(), page)
                .map(|p| p.title.clone())
                .with_context(|| format!("Page {} not found", page))?;
            let data = dashboard.load_page_data(page).await?;
            print_page(&title, data);
        }
        Commands::AddPage {
            title,
            parent,
            nav_order,
        } => {
            dashboard.load_navigation().await?;
            let id = dashboard
                .save_page_details(PageDraft {
                    id: None,
                    title,
                    subtitle: None,
                    parent,
                    nav_order,
                })
                .await?;
            println!("Created page {}", id);
        }
        Commands::Delete { kind, id } => {
            dashboard.delete_item(kind, id).await?;
        }
        Commands::Apply { plan } => {
            let plan = EditPlan::load(&plan)?;
            let report = dashboard.apply_plan(&plan).await?;
            for outcome in &report.outcomes {
                println!(
                    "{}: {} created, {} updated",
                    outcome.kind, outcome.created, outcome.updated
                );
            }
            for kind in &report.refresh_failures {
                println!("{}: saved, but the page could not be refreshed", kind);
            }
            if let Some(id) = report.page_id {
                println!("Page {}", id);
            }
        }
    }
    Ok(())
}

fn print_page(title: &str, data: &PageData) {
    println!("{} [{}]", title, data.page_id);
    if data.is_empty() {
        println!("  No content for this page.");
        return;
    }
    for card in &data.cards {
        println!("  card     {:>5}  {}", id_label(card.id), card.title);
    }
    for slide in &data.carousel {
        println!("  carousel {:>5}  {}", id_label(slide.id), slide.title);
    }
    for item in &data.about_us {
        println!("  aboutus  {:>5}  {}", id_label(item.id), item.title);
        for module in &item.module {
            println!("                  - {}: {}", module.title, module.subtitle);
        }
    }
}

fn id_label(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}

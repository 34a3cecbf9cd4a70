mod calendar_cmd;
mod config;
mod export_cmd;
mod generate_cmd;
mod media_cmds;
mod plan_cmds;
mod resolve;
#[cfg(test)]
mod test_util;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};

use huddle_core::SortOrder;
use huddle_core::calendar::YearMonth;
use huddle_core::generate::{Horizon, Planner, PromotionKind};
use huddle_db::config::StoreConfig;
use huddle_db::models::{MediaKind, Recurrence};
use huddle_db::{FileSnapshotStore, SnapshotStore};

use config::HuddleConfig;

#[derive(Parser)]
#[command(name = "huddle", about = "Youth ministry planning assistant", version)]
struct Cli {
    /// Directory holding saved plans and media (overrides HUDDLE_DATA_DIR and the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a config file with defaults
    Init {
        /// Organization name used in prompts and share text
        #[arg(long)]
        organization: Option<String>,
        /// Region the group meets in
        #[arg(long)]
        region: Option<String>,
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Ask the generator for plans; replaces the current results
    Generate {
        /// planner, ideas, spiritual, execution, or community
        planner: Planner,
        /// single, monthly, or quarterly (event planner only)
        #[arg(long, default_value = "single")]
        horizon: Horizon,
        /// Category, e.g. "Bible Study" (defaults to the planner's first)
        #[arg(long)]
        category: Option<String>,
        /// Free-text details; required by the execution planner
        #[arg(long)]
        details: Option<String>,
    },
    /// List the current generated results
    Results {
        /// Print the results as JSON
        #[arg(long)]
        json: bool,
        /// Discard the current results
        #[arg(long, conflicts_with = "json")]
        clear: bool,
    },
    /// Save a result, or unsave it if it is already saved
    Save {
        /// 1-based result index or id prefix
        reference: String,
        /// Skip the confirmation when unsaving
        #[arg(long, short)]
        yes: bool,
    },
    /// Manage saved plans
    Saved {
        #[command(subcommand)]
        command: SavedCommands,
    },
    /// Month view of saved plans
    Calendar {
        #[command(subcommand)]
        command: CalendarCommands,
    },
    /// Generate promotional text
    Promote {
        /// poster, script, caption, or whatsapp
        kind: PromotionKind,
        /// The event or topic being promoted
        #[arg(long)]
        context: Option<String>,
        /// Take the context from a saved plan and file media under its title
        #[arg(long)]
        plan: Option<String>,
        #[arg(long)]
        tone: Option<String>,
        /// Target platform for scripts
        #[arg(long)]
        platform: Option<String>,
        /// Message type for WhatsApp broadcasts
        #[arg(long)]
        message_type: Option<String>,
        /// Save the text to the media library
        #[arg(long)]
        save: bool,
        /// Media category when saving
        #[arg(long, requires = "save")]
        category: Option<String>,
    },
    /// Manage the media library
    Media {
        #[command(subcommand)]
        command: MediaCommands,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum SavedCommands {
    /// List saved plans
    List {
        /// newest, oldest, title, or date
        #[arg(long, default_value = "newest")]
        sort: SortOrder,
    },
    /// Show one saved plan
    Show {
        /// Plan id or unique prefix
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Delete a saved plan
    Remove {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Change the date, recurrence, or notes of a saved plan
    Set {
        id: String,
        /// Anchor date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_date")]
        date: Option<NaiveDate>,
        /// Remove the anchor date
        #[arg(long)]
        clear_date: bool,
        /// none, weekly, or monthly
        #[arg(long)]
        recurrence: Option<Recurrence>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Save a plan edited as TOML; writes the assigned id back into the file
    Edit {
        file: PathBuf,
    },
    /// Export a saved plan
    Export {
        id: String,
        #[arg(long, value_enum, default_value = "text")]
        format: ExportFormat,
        /// File or directory to write to (defaults to stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum CalendarCommands {
    /// Print the month grid and its plans
    Show {
        /// Month to show (YYYY-MM, defaults to the current month)
        #[arg(long)]
        month: Option<YearMonth>,
    },
    /// Move a plan's anchor date
    Move {
        id: String,
        /// New anchor date (YYYY-MM-DD)
        date: NaiveDate,
        /// The occurrence being moved (defaults to the anchor date)
        #[arg(long)]
        on: Option<NaiveDate>,
    },
    /// Print the month as shareable text
    Share {
        #[arg(long)]
        month: Option<YearMonth>,
    },
}

#[derive(Subcommand)]
pub enum MediaCommands {
    /// List media, newest first
    List {
        #[arg(long)]
        kind: Option<MediaKind>,
        #[arg(long)]
        category: Option<String>,
        /// Case-insensitive text search over title and content
        #[arg(long)]
        search: Option<String>,
    },
    /// List categories with item counts
    Categories,
    /// Show one media item
    Show {
        id: String,
    },
    /// Delete a media item
    Delete {
        id: String,
    },
    /// Edit a media item
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        kind: Option<MediaKind>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Text,
    Html,
    Toml,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Html => "html",
            Self::Toml => "toml",
        }
    }
}

/// Execute `huddle init`: write the config file.
fn cmd_init(
    cli_data_dir: Option<PathBuf>,
    organization: Option<String>,
    region: Option<String>,
    force: bool,
) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let mut cfg = config::ConfigFile::default();
    cfg.storage.data_dir = Some(cli_data_dir.unwrap_or_else(StoreConfig::default_data_dir));
    if let Some(name) = organization {
        cfg.organization.name = name;
    }
    if let Some(region) = region {
        cfg.organization.region = region;
    }

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    if let Some(dir) = &cfg.storage.data_dir {
        println!("  storage.data_dir   = {}", dir.display());
    }
    println!("  generator.command  = {}", cfg.generator.command);
    println!("  organization.name  = {}", cfg.organization.name);
    println!();
    println!("Next: run `huddle generate planner` to draft your first plans.");

    Ok(())
}

fn open_store(cfg: &HuddleConfig) -> Arc<dyn SnapshotStore> {
    Arc::new(FileSnapshotStore::from_config(&cfg.store))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Init {
            organization,
            region,
            force,
        } => cmd_init(cli.data_dir, organization, region, force),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "huddle", &mut std::io::stdout());
            Ok(())
        }
        Commands::Generate {
            planner,
            horizon,
            category,
            details,
        } => {
            let resolved = HuddleConfig::resolve(cli.data_dir.as_deref())?;
            let options = generate_cmd::GenerateOptions {
                planner,
                horizon,
                category,
                details,
            };
            generate_cmd::run_generate(&resolved, open_store(&resolved), options).await
        }
        Commands::Promote {
            kind,
            context,
            plan,
            tone,
            platform,
            message_type,
            save,
            category,
        } => {
            let resolved = HuddleConfig::resolve(cli.data_dir.as_deref())?;
            let options = generate_cmd::PromoteOptions {
                kind,
                context,
                plan,
                tone,
                platform,
                message_type,
                save,
                category,
            };
            generate_cmd::run_promote(&resolved, open_store(&resolved), options).await
        }
        Commands::Results { json, clear } => {
            let resolved = HuddleConfig::resolve(cli.data_dir.as_deref())?;
            plan_cmds::run_results(open_store(&resolved), json, clear)
        }
        Commands::Save { reference, yes } => {
            let resolved = HuddleConfig::resolve(cli.data_dir.as_deref())?;
            plan_cmds::run_save(open_store(&resolved), &reference, yes)
        }
        Commands::Saved { command } => {
            let resolved = HuddleConfig::resolve(cli.data_dir.as_deref())?;
            plan_cmds::run_saved_command(command, open_store(&resolved))
        }
        Commands::Calendar { command } => {
            let resolved = HuddleConfig::resolve(cli.data_dir.as_deref())?;
            calendar_cmd::run_calendar_command(command, &resolved, open_store(&resolved))
        }
        Commands::Media { command } => {
            let resolved = HuddleConfig::resolve(cli.data_dir.as_deref())?;
            media_cmds::run_media_command(command, open_store(&resolved))
        }
    }
}

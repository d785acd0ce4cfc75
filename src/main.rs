use anyhow::Result;
use clap::{Parser, Subcommand};

use traindash::cli::{self, FilterArgs};
use traindash::forms::ReportForm;

#[derive(Debug, Parser)]
#[command(name = "traindash")]
#[command(about = "Terminal dashboard for the school training-record system")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load and render the full dashboard
    Dashboard {
        /// Lookahead window for upcoming tasks, in days
        #[arg(long)]
        days: Option<u32>,
        /// Buddhist-era year for the monthly breakdown
        #[arg(long)]
        year: Option<i32>,
    },
    /// Show the filtered, paginated task table
    Tasks {
        #[command(flatten)]
        filters: FilterArgs,
        /// Page to show (out-of-range requests show page 1)
        #[arg(long, default_value = "1")]
        page: usize,
        /// Rows per page
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Submit a training report
    Report {
        /// Task identifier the report belongs to (generated when omitted)
        #[arg(long)]
        task: Option<String>,
        /// Knowledge gained from the training
        #[arg(long, default_value = "")]
        knowledge: String,
        /// Implementation plan going forward
        #[arg(long, default_value = "")]
        plan: String,
        /// How the knowledge will be shared
        #[arg(long, default_value = "")]
        sharing: String,
        /// Attachment reference (image link), optional
        #[arg(long)]
        images: Option<String>,
        /// Submitter LINE UID
        #[arg(long, default_value = "")]
        line_uid: String,
        /// ISO submission timestamp override
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// Mark a task as completed
    Complete {
        /// Task identifier
        task_id: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Export the filtered task list to a spreadsheet file
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        /// Download the file to this path instead of printing the URL
        #[arg(long)]
        output: Option<std::path::PathBuf>,
    },
    /// Sync task data from Asana
    Sync {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Auto-refreshing dashboard loop
    Watch {
        /// Refresh interval in seconds
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Check config, connectivity, and the backend round-trip
    Health,
    /// Serve the dashboard as a local web page
    Serve {
        /// Bind address, e.g. 0.0.0.0:9747
        #[arg(long)]
        addr: Option<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Show the effective (merged) configuration
    Show,
    /// Write the default config to ~/.traindash/config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Set one config key, e.g. `config set api.retry_attempts 5`
    Set { key: String, value: String },
    /// Reset the config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Dashboard { days, year } => cli::run_dashboard(days, year),
        Commands::Tasks {
            filters,
            page,
            page_size,
        } => cli::run_tasks(filters, page, page_size),
        Commands::Report {
            task,
            knowledge,
            plan,
            sharing,
            images,
            line_uid,
            timestamp,
        } => cli::run_report(ReportForm {
            task_gid: task,
            knowledge_gained: knowledge,
            implementation_plan: plan,
            knowledge_sharing: sharing,
            suggestions_images: images,
            line_uid,
            timestamp,
        }),
        Commands::Complete { task_id, yes } => cli::run_complete(task_id, yes),
        Commands::Export { filters, output } => cli::run_export(filters, output),
        Commands::Sync { yes } => cli::run_sync(yes),
        Commands::Watch { interval } => cli::run_watch(interval),
        Commands::Health => cli::run_health(),
        Commands::Serve { addr } => cli::run_serve(addr),
        Commands::Config { action } => match action {
            ConfigCommands::Show => cli::run_config_show(),
            ConfigCommands::Init { force } => cli::run_config_init(force),
            ConfigCommands::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigCommands::Reset => cli::run_config_reset(),
        },
    }
}

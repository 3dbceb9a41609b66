use clap::{Parser, Subcommand};
use hostblock_domain::CliOverrides;
use tracing::info;

mod bootstrap;
mod commands;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "hostblock")]
#[command(version)]
#[command(about = "hostblock - block distracting websites through the system hosts file")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Hosts file to edit instead of the system one
    #[arg(long, value_name = "FILE", global = true)]
    hosts_file: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the block page on ports 80 and 443 until interrupted
    Serve,

    /// Block domains
    Block {
        #[arg(required = true)]
        domains: Vec<String>,
    },

    /// Unblock domains
    Unblock {
        #[arg(required = true)]
        domains: Vec<String>,
    },

    /// Show whether domains are blocked (defaults to the configured sites)
    Status { domains: Vec<String> },

    /// Add a site to the configured list and block it
    Add { domain: String },

    /// Remove a site from the configured list and unblock it
    Remove { domain: String },

    /// Block domains for a fixed time, then unblock them (defaults to the configured sites)
    Timed {
        #[arg(short, long)]
        minutes: u64,

        domains: Vec<String>,
    },

    /// Generate a self-signed certificate for the HTTPS listener
    Cert {
        #[arg(long, value_name = "DIR")]
        out_dir: String,

        /// Hostname to include in the certificate (repeatable)
        #[arg(long = "host", value_name = "HOST")]
        hosts: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        hosts_file: cli.hosts_file.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;
    bootstrap::init_logging(&config);

    info!("hostblock v{}", env!("CARGO_PKG_VERSION"));

    if let Command::Cert { out_dir, hosts } = &cli.command {
        return commands::cert(out_dir, hosts);
    }

    bootstrap::warn_if_not_elevated();

    let config_path = bootstrap::config_file_path(cli.config.as_deref());
    let services = di::Services::new(&config, &config_path);

    match cli.command {
        Command::Serve => commands::serve(&config).await,
        Command::Block { domains } => commands::block(&services, domains).await,
        Command::Unblock { domains } => commands::unblock(&services, domains).await,
        Command::Status { domains } => commands::status(&services, &config, domains).await,
        Command::Add { domain } => commands::add(&services, &config, domain).await,
        Command::Remove { domain } => commands::remove(&services, &config, domain).await,
        Command::Timed { minutes, domains } => {
            commands::timed(&services, &config, minutes, domains).await
        }
        Command::Cert { .. } => Ok(()),
    }
}

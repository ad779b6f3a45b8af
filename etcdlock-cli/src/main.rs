mod commands;
mod output;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "etcdlock",
    about = "etcdlock — distributed locks on etcd leases",
    version
)]
struct Cli {
    #[command(flatten)]
    conn: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
pub struct ConnectionArgs {
    /// etcd endpoint
    #[arg(long, global = true, default_value = "127.0.0.1:2379", env = "ETCDLOCK_ENDPOINT")]
    pub endpoint: String,

    /// Prefix prepended to every lock name
    #[arg(long, global = true, default_value = "etcdlock/", env = "ETCDLOCK_PREFIX")]
    pub prefix: String,

    /// Default lease timeout in milliseconds
    #[arg(long, global = true, default_value = "5000", env = "ETCDLOCK_TIMEOUT_MS")]
    pub timeout_ms: u64,

    /// PEM root certificate; enables TLS
    #[arg(long, global = true, env = "ETCDLOCK_CA_FILE")]
    pub ca_file: Option<String>,

    /// PEM client private key (requires --cert-file)
    #[arg(long, global = true, env = "ETCDLOCK_KEY_FILE")]
    pub key_file: Option<String>,

    /// PEM client certificate chain (requires --key-file)
    #[arg(long, global = true, env = "ETCDLOCK_CERT_FILE")]
    pub cert_file: Option<String>,

    /// Use an in-process coordinator instead of etcd
    #[arg(long, global = true)]
    pub memory: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Acquire a lock, hold it, then release it
    Lock {
        /// Lock name
        name: String,

        /// Lease TTL in milliseconds (defaults to --timeout-ms)
        #[arg(long)]
        ttl_ms: Option<u64>,

        /// Release after this many milliseconds instead of waiting for Ctrl-C
        #[arg(long)]
        hold_ms: Option<u64>,
    },

    /// Report whether a lock is currently held
    Status {
        /// Lock name
        name: String,
    },

    /// Print the raw range snapshot behind `status`
    Range {
        /// Lock name
        name: String,
    },

    /// Print version information
    Version,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Lock {
            name,
            ttl_ms,
            hold_ms,
        } => commands::lock(&cli.conn, &name, ttl_ms, hold_ms).await,
        Commands::Status { name } => commands::status(&cli.conn, &name).await,
        Commands::Range { name } => commands::range(&cli.conn, &name).await,
        Commands::Version => {
            println!("etcdlock {}", env!("CARGO_PKG_VERSION"));
            println!("Distributed locks on etcd leases");
            Ok(())
        }
    };

    if let Err(e) = result {
        output::print_json(&output::CliResponse::<()>::err(e.to_string()));
        std::process::exit(1);
    }
}

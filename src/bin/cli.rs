//! EmDB CLI
//!
//! Command-line interface for reading and writing a local EmDB store.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use emdb::{AdapterKind, EmDb, ExitGuard, Options, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// EmDB CLI
#[derive(Parser, Debug)]
#[command(name = "emdb-cli")]
#[command(about = "CLI for the EmDB embedded key-value store")]
#[command(version)]
struct Args {
    /// Store path (file for JSON adapters, directory for file adapters)
    #[arg(short, long, default_value = "./emdb.db")]
    path: PathBuf,

    /// Adapter: json, compressed-json, file, compressed-file
    #[arg(short, long, default_value = "compressed-json")]
    adapter: AdapterKind,

    /// Log every operation
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key to a text value
    Put {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Set a key to the raw bytes of a file
    PutFile {
        /// The key to set
        key: String,

        /// File whose contents become the value
        file: PathBuf,
    },

    /// List all keys
    Keys,

    /// Print the number of keys
    Size,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();

    let args = Args::parse();

    let code = {
        // Fires the exit signal (final sync) before the process exits
        let _exit = ExitGuard::global();
        match run(args) {
            Ok(()) => 0,
            Err(e) => {
                tracing::error!("{}", e);
                1
            }
        }
    };

    std::process::exit(code);
}

fn run(args: Args) -> emdb::Result<()> {
    // Append mode so an existing store is loaded rather than overwritten
    let options = Options::builder()
        .adapter(args.adapter)
        .append_mode(true)
        .verbose(args.verbose)
        .build();

    let db = EmDb::new(&args.path, options)?;
    let mut stdout = std::io::stdout().lock();

    match args.command {
        Commands::Get { key } => match db.get(&key)? {
            Some(Value::Text(text)) => writeln!(stdout, "{}", text)?,
            Some(Value::Bytes(bytes)) => stdout.write_all(&bytes)?,
            None => {
                tracing::warn!(key = %key, "Key not found");
                writeln!(stdout, "(nil)")?;
            }
        },
        Commands::Put { key, value } => {
            db.put(&key, value)?;
            writeln!(stdout, "OK")?;
        }
        Commands::PutFile { key, file } => {
            let bytes = std::fs::read(&file)?;
            db.put(&key, bytes)?;
            writeln!(stdout, "OK")?;
        }
        Commands::Keys => {
            let mut keys = db.keys()?;
            keys.sort();
            for key in keys {
                writeln!(stdout, "{}", key)?;
            }
        }
        Commands::Size => writeln!(stdout, "{}", db.size()?)?,
    }

    db.close()
}

//! ObjectVault CLI
//!
//! Offline maintenance on a storage directory. Do not point it at a
//! directory a running server is writing to.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use objectvault::codec::Codec;
use objectvault::storage::DiskStore;
use objectvault::{CancelToken, Config, StorageEngine, VaultError};
use tracing_subscriber::{fmt, EnvFilter};

/// ObjectVault CLI
#[derive(Parser, Debug)]
#[command(name = "objectvault-cli")]
#[command(about = "Maintenance CLI for an ObjectVault storage directory")]
struct Args {
    /// Storage directory
    #[arg(short, long, env = "OBJECTVAULT_STORAGE_DIR", default_value = "./storage")]
    storage_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List stored keys
    List,

    /// Print (or write out) an object
    Get {
        /// The key to read
        key: String,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Store a file under a key
    Put {
        /// The key to write
        key: String,

        /// File whose contents become the object
        file: PathBuf,
    },

    /// Decompress every object and report the ones that fail
    Verify,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> objectvault::Result<ExitCode> {
    match args.command {
        Commands::Verify => verify(args.storage_dir),
        Commands::List => {
            let engine = StorageEngine::open_path(&args.storage_dir)?;
            for key in engine.list()? {
                println!("{key}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Get { key, output } => {
            let engine = StorageEngine::open_path(&args.storage_dir)?;
            let data = match engine.load(&key, &CancelToken::none()) {
                Ok(data) => data,
                Err(VaultError::NotFound) => {
                    eprintln!("object {key} not found");
                    return Ok(ExitCode::FAILURE);
                }
                Err(e) => return Err(e),
            };
            match output {
                Some(path) => fs::write(path, data)?,
                None => {
                    use std::io::Write;
                    std::io::stdout().write_all(&data)?;
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Put { key, file } => {
            let data = fs::read(&file)?;
            let config = Config::builder()
                .storage_dir(&args.storage_dir)
                .shutdown_drain_timeout(Duration::from_secs(30))
                .build();
            let engine = StorageEngine::open(config)?;
            engine.save(&key, &data, &CancelToken::none())?;
            engine.shutdown();

            let stats = engine.stats();
            if stats.persisted == 1 && stats.persist_failures == 0 {
                println!("object {key} saved");
                Ok(ExitCode::SUCCESS)
            } else {
                eprintln!("object {key} could not be persisted");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn verify(dir: PathBuf) -> objectvault::Result<ExitCode> {
    let disk = DiskStore::new(dir);
    let codec = Codec::default();
    let mut corrupt = 0usize;
    let mut checked = 0usize;

    for key in disk.list_directory()? {
        checked += 1;
        let result = disk.read_file(&key).and_then(|data| codec.decompress(&data));
        if let Err(e) = result {
            corrupt += 1;
            println!("CORRUPT {key}: {e}");
        }
    }

    println!("{checked} objects checked, {corrupt} corrupt");
    Ok(if corrupt == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

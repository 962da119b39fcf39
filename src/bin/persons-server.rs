use std::env::current_dir;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::exit;

use clap::Parser;
use log::{error, info, warn};

use persons::{PersonError, PersonServer, PersonStore, Result, SledPersonStore, SqlitePersonStore};

const DEFAULT_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_BACKEND: &str = "sqlite";
const BACKEND_FILE: &str = "backend";
const SQLITE_FILE: &str = "persons.db";
const SLED_DIR: &str = "persons.sled";

#[derive(Parser)]
#[command(name = "persons-server", version, about = "A CRUD REST API for person records")]
struct Cli {
    /// Server listening address
    #[arg(long, default_value = DEFAULT_ADDR, value_name = "IP-PORT")]
    addr: SocketAddr,

    /// Storage backend: "sqlite" or "sled"
    #[arg(long, value_name = "BACKEND-NAME")]
    backend: Option<String>,

    /// Directory holding the store [default: current directory]
    #[arg(long, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Create the `person` table if it does not exist (sqlite only)
    #[arg(long)]
    create_table: bool,

    /// Keep existing records instead of clearing the store at startup (sled only)
    #[arg(long)]
    keep_data: bool,
}

#[tokio::main]
async fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{}", e);
        exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => current_dir()?,
    };
    fs::create_dir_all(&data_dir)?;
    let backend = resolve_backend(&data_dir, cli.backend)?;

    info!("persons-server {}", env!("CARGO_PKG_VERSION"));
    info!("Storage backend: {}", backend);

    match backend.as_str() {
        "sqlite" => {
            if cli.keep_data {
                warn!("--keep-data has no effect with the sqlite backend");
            }
            let store = SqlitePersonStore::open(data_dir.join(SQLITE_FILE))?;
            if cli.create_table {
                store.create_table()?;
            }
            store.check_schema()?;
            run_with_store(store, cli.addr).await
        }
        "sled" => {
            if cli.create_table {
                warn!("--create-table has no effect with the sled backend");
            }
            let store = SledPersonStore::open(data_dir.join(SLED_DIR))?;
            if !cli.keep_data {
                info!("Clearing existing records");
                store.clear()?;
            }
            run_with_store(store, cli.addr).await
        }
        _ => unreachable!(),
    }
}

async fn run_with_store<E: PersonStore>(store: E, addr: SocketAddr) -> Result<()> {
    let server = PersonServer::new(store);
    server.run(addr).await
}

/// Resolves the backend name and records it in the data directory.
///
/// A data directory serves one backend for its whole life: a restart without
/// `--backend` reopens the same store, and asking for the other backend is an
/// error instead of silently serving an empty set of records.
fn resolve_backend(data_dir: &Path, backend: Option<String>) -> Result<String> {
    let backend_file = data_dir.join(BACKEND_FILE);
    let prev_backend = fs::read_to_string(&backend_file).ok();

    let backend = match (backend, prev_backend) {
        (Some(b), None) => b,
        (Some(b), Some(prev)) => {
            if b != prev {
                return Err(PersonError::StringError(format!(
                    "Wrong backend! Previously used '{}', but '{}' was requested.",
                    prev, b
                )));
            }
            b
        }
        (None, Some(prev)) => prev,
        (None, None) => DEFAULT_BACKEND.to_owned(),
    };

    if backend != "sqlite" && backend != "sled" {
        return Err(PersonError::StringError(format!(
            "Invalid backend: {}. Must be 'sqlite' or 'sled'.",
            backend
        )));
    }

    fs::write(&backend_file, &backend)?;

    Ok(backend)
}

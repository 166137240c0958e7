//! Create the database for a project, with empty configuration and log
//! tables.

use std::path::PathBuf;
use clap::Parser;
use confstore::config;
use confstore::configrefs::ENV_PREFIX;
use confstore::db;

/// Create a project database for the configuration and log store.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Project name.  The database is named `db_project_<PROJECT>`.
    project: String,

    /// Replace the project's database if it already exists.
    #[arg(short, long)]
    force: bool,

    /// YAML configuration file.  Environment variables prefixed with
    /// CONFSTORE_ override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), String> {
    env_logger::init();
    let args = Args::parse();

    if args.project.is_empty() {
        return Err("project name must not be empty".to_owned());
    }
    let cfg = config::load(args.config.as_ref(), ENV_PREFIX)?;
    let path = db::create_project(cfg.as_ref(), &args.project, args.force)?;
    println!("created database for project {} ({})",
             args.project, path.display());
    Ok(())
}

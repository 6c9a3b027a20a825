use std::env;

use anyhow::{Context, Result};
use project_mirror::{changelog, db, store, Config, Runner};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Keep the handle alive for the life of the process
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")
        .context("invalid log specification")?
        .start()
        .context("failed to start logger")?;

    log::info!("project-mirror v{} starting", project_mirror::VERSION);

    let config = Config::from_env();
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        None => run_service(&config),
        Some("once") => run_once(&config),
        Some("history") => run_history(&config, args.get(2).map(String::as_str)),
        Some("status") => run_status(&config),
        Some(other) => {
            eprintln!("unknown command: {}", other);
            eprintln!("usage: project-mirror [once | history <list_id> | status]");
            std::process::exit(2);
        }
    }
}

/// Default mode: one cycle immediately, then loop on the schedule forever.
fn run_service(config: &Config) -> Result<()> {
    let mut conn = db::open_database(&config.db_path)?;
    let mut runner = Runner::new(config.clone());

    runner.run_forever(&mut conn)
}

/// Run a single reconciliation cycle and exit (useful for cron and smoke
/// testing against a live page).
fn run_once(config: &Config) -> Result<()> {
    let mut conn = db::open_database(&config.db_path)?;
    let mut runner = Runner::new(config.clone());

    match runner.run_cycle(&mut conn) {
        Some(report) => println!("{}", report.summary()),
        None => println!("cycle skipped (fetch failed)"),
    }

    Ok(())
}

/// Print the full change history for one listing, oldest first.
fn run_history(config: &Config, list_id: Option<&str>) -> Result<()> {
    let Some(list_id) = list_id else {
        eprintln!("usage: project-mirror history <list_id>");
        std::process::exit(2);
    };

    let conn = db::open_database(&config.db_path)?;

    match store::get(&conn, list_id)? {
        Some(snapshot) => {
            println!(
                "{} - {} [{}] (last updated {})",
                snapshot.list_id, snapshot.title, snapshot.status, snapshot.last_updated
            );
        }
        None => {
            println!("no snapshot for {}", list_id);
        }
    }

    let entries = changelog::history(&conn, list_id)?;
    if entries.is_empty() {
        println!("no recorded changes");
        return Ok(());
    }

    for entry in &entries {
        println!(
            "{}  {}: {:?} -> {:?}",
            entry.changed_at, entry.field_name, entry.old_value, entry.new_value
        );
    }
    println!("{} changes", entries.len());

    Ok(())
}

/// Print mirror totals.
fn run_status(config: &Config) -> Result<()> {
    let conn = db::open_database(&config.db_path)?;

    println!("database: {}", config.db_path.display());
    println!("projects tracked: {}", store::count(&conn)?);
    println!("changes recorded: {}", changelog::count(&conn)?);

    Ok(())
}

mod admin;
mod auth;
mod cli;
mod config;
mod repo;
mod store;
mod user;

use anyhow::Result;
use clap::Parser;
use std::cell::RefCell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "userdesk",
    about = "A local user account manager with role-based dashboards"
)]
pub struct Args {
    #[arg(
        long,
        env = "USERDESK_DATA_DIR",
        help = "Data directory for the storage slots"
    )]
    pub data_dir: Option<PathBuf>,

    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Show stored passwords in the dashboard table")]
    pub show_password: bool,

    #[arg(long, help = "Print the current session identity and exit")]
    pub whoami: bool,

    #[arg(long, help = "Clear the current session and exit")]
    pub logout: bool,

    #[arg(long, help = "Debug output (print storage diagnostics)")]
    pub debug: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut cfg = if let Some(config_path) = &args.config {
        config::Config::load_from(config_path)?
    } else {
        config::Config::load().unwrap_or_default()
    };

    if let Err(errors) = cfg.validate() {
        for error in &errors {
            eprintln!("Config error: {}", error);
        }
        return Err(anyhow::anyhow!("Invalid configuration"));
    }

    // CLI flags override config values
    if args.show_password {
        cfg.show_password = true;
    }

    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| cfg.resolve_data_dir());
    std::fs::create_dir_all(&data_dir)?;

    if args.debug {
        eprintln!("[DEBUG] Data dir: {}", data_dir.display());
        eprintln!("[DEBUG] Date format: {}", cfg.date_format);
    }

    let store = store::FileStore::new(&data_dir, args.debug);
    let repo = repo::UserRepo::new(store);

    // Handle one-shot flags: inspect or clear the session and exit
    if args.whoami {
        match repo.current_user() {
            Some(user) => println!("{} ({}) id={}", user.username, user.role, user.id),
            None => println!("Not signed in"),
        }
        return Ok(());
    }
    if args.logout {
        repo.clear_current_user()?;
        println!("Signed out");
        return Ok(());
    }

    let show_password = cfg.show_password;
    let ctx = cli::Context {
        args,
        config: cfg,
        data_dir,
        repo,
        show_password: RefCell::new(show_password),
    };

    cli::run(ctx)
}

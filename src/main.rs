use anyhow::{Context, Result};
use log::*;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use structopt::StructOpt;

use sosika_admin::{session, Config, HttpApi, OrderFilter, Overrides, Tab, SUCCESS_BANNER};

#[derive(Debug, StructOpt)]
#[structopt(name = "sosika-admin", about = "Admin dashboard for the Sosika campus delivery platform")]
struct Opt {
    /// More output per occurrence
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
    /// API root, e.g. https://sosika-backend.onrender.com
    #[structopt(long, env = "SOSIKA_API_URL")]
    base_url: Option<String>,
    /// Per-request timeout in seconds (none by default)
    #[structopt(long)]
    timeout: Option<u64>,
    #[structopt(long)]
    config: Option<String>,
    /// Where the admin token is kept
    #[structopt(long)]
    session: Option<String>,
    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Sign in and open the overview
    Login {
        #[structopt(long)]
        email: String,
        /// Read from stdin when not given
        #[structopt(long, env = "SOSIKA_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored admin token
    Logout,
    /// Show one tab: overview, users, orders, vendors, delivery, colleges or reviews
    Dashboard {
        #[structopt(default_value = "overview")]
        tab: Tab,
        /// Case-insensitive filter over the text columns
        #[structopt(long)]
        search: Option<String>,
        #[structopt(flatten)]
        filter: FilterOpt,
    },
    /// Write every collection as JSON
    Export {
        #[structopt(short, long, parse(from_os_str))]
        output: Option<PathBuf>,
        #[structopt(flatten)]
        filter: FilterOpt,
    },
}

/// Sent as-is with the orders request
#[derive(Debug, StructOpt)]
struct FilterOpt {
    #[structopt(long)]
    user_id: Option<String>,
    #[structopt(long)]
    vendor_id: Option<String>,
    #[structopt(long)]
    delivery_person_id: Option<String>,
    #[structopt(long)]
    status: Option<String>,
    #[structopt(long)]
    from_date: Option<String>,
    #[structopt(long)]
    to_date: Option<String>,
}

impl From<FilterOpt> for OrderFilter {
    fn from(f: FilterOpt) -> Self {
        OrderFilter {
            user_id: f.user_id,
            vendor_id: f.vendor_id,
            delivery_person_id: f.delivery_person_id,
            status: f.status,
            from_date: f.from_date,
            to_date: f.to_date,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .with_context(|| "Error reading password from stdin")?;
    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_owned())
}

fn warn_if_logged_out(config: &Config) -> Result<()> {
    if session::read(&config.session_path)?.is_none() {
        warn!("No admin session at {:?}, run `sosika-admin login` first", config.session_path);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::from_args();
    init_logging(opt.verbose);

    let config = Config::resolve(Overrides {
        base_url: opt.base_url,
        timeout_secs: opt.timeout,
        config_path: opt.config,
        session_path: opt.session,
    })?;
    debug!("Using {:?}", config);
    let api = HttpApi::new(&config)?;

    match opt.cmd {
        Command::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            if let Err(e) = sosika_admin::login(&api, &config, &email, &password).await {
                error!("Login failed: {:#}", e);
                eprintln!("Login failed: {}", sosika_admin::login_failure_message(&e));
                std::process::exit(1);
            }
            println!("{}", SUCCESS_BANNER);
            println!();
            let overview = sosika_admin::show(&api, OrderFilter::default(), Tab::Overview, None).await;
            println!("{}", overview);
        }
        Command::Logout => {
            if session::clear(&config.session_path)? {
                println!("Logged out");
            } else {
                println!("No session to clear");
            }
        }
        Command::Dashboard { tab, search, filter } => {
            warn_if_logged_out(&config)?;
            let view = sosika_admin::show(&api, filter.into(), tab, search.as_deref()).await;
            println!("{}", view);
        }
        Command::Export { output, filter } => {
            warn_if_logged_out(&config)?;
            let snapshot = sosika_admin::export(&api, filter.into()).await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, snapshot)
                        .with_context(|| format!("Error writing snapshot to {:?}", path))?;
                    info!("Snapshot written to {:?}", path);
                }
                None => println!("{}", snapshot),
            }
        }
    }
    Ok(())
}

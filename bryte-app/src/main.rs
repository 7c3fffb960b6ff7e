use bryte_cms::pages;
use bryte_common::observability::init_logging;
use bryte_common::{BryteError, Result};
use bryte_config::{BryteConfig, BryteConfigLoader};
use bryte_contact::{ContactRequest, spawn_sweeper};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use site::Site;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod site;

const SWEEP_EVERY: Duration = Duration::from_secs(60);

#[derive(Parser, Debug)]
#[command(name = "bryte", version, about = "BRYTE site content and contact tooling")]
struct Cli {
    /// YAML configuration; environment variables prefixed `BRYTE_` override it.
    #[arg(long, short, env = "BRYTE_CONFIG", default_value = "bryte.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Home page sections and stats
    Home,
    /// About page accordion
    About,
    /// Parent and tutor resource links
    Resources,
    /// All blog posts
    Posts,
    /// One blog post
    Post { slug: String },
    /// Run a contact submission through validation, rate limiting and email
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
        #[arg(long, default_value = "cli")]
        client_id: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| BryteError::Internal(e.into()))?;
    println!("{text}");
    Ok(())
}

fn load_config(path: &Path) -> Result<BryteConfig> {
    BryteConfigLoader::new()
        .with_optional_file(path)
        .load()
        .map_err(|e| BryteError::Config(e.to_string()))
}

async fn run(command: Command, site: &Site) -> Result<()> {
    match command {
        Command::Home => print_json(&pages::load_home(&site.cms).await),
        Command::About => print_json(&pages::load_about(&site.cms).await),
        Command::Resources => print_json(&pages::load_resources(&site.cms).await),
        Command::Posts => print_json(&pages::load_posts(&site.posts).await?),
        Command::Post { slug } => match pages::find_post(&site.posts, &slug).await? {
            Some(post) => print_json(&post),
            None => Err(BryteError::NotFound(format!("post {slug:?}"))),
        },
        Command::Contact {
            name,
            email,
            message,
            client_id,
        } => {
            let request = ContactRequest {
                url: "http://localhost/api/contact".into(),
                real_ip: Some(client_id),
                body: json!({ "name": name, "email": email, "message": message }).to_string(),
                ..Default::default()
            };
            let response = site.contact.handle(&request).await;
            print_json(&response)?;
            if response.status != 200 {
                return Err(BryteError::Rejected(response.status));
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = load_config(&cli.config)?;
    let log_path = init_logging(cfg.logging.to_log_config("bryte"))?;
    tracing::debug!(config=?cfg, log=%log_path.display(), "app.start");

    let site = Site::from_config(&cfg)?;
    let sweeper = spawn_sweeper(site.rate_store.clone(), SWEEP_EVERY);

    let result = run(cli.command, &site).await;
    sweeper.abort();
    if let Err(err) = &result {
        tracing::error!(error=%err, "app.failed");
    }
    Ok(result?)
}

//! CLI running friendship scenarios against the fixture database.
//!
//! Saves the given users, applies links and unlinks in order, then prints
//! every user's friends.

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use self_siblings_core::{AttachMethod, RelationConfig, SelfLoopPolicy};
use self_siblings_fixtures::{
    friendship_config, friendship_config_from_json, seed_users, FixtureDb, FriendList, User,
};
use self_siblings_store::StoreConfig;

/// Command-line arguments for the sibling tool.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// User to create (repeatable)
    #[arg(short, long = "user", required = true)]
    users: Vec<String>,

    /// Friendship to attach, as `a:b` (repeatable)
    #[arg(short, long = "link")]
    links: Vec<String>,

    /// Friendship to detach after all links, as `a:b` (repeatable)
    #[arg(long = "unlink")]
    unlinks: Vec<String>,

    /// How links are attached
    #[arg(long, value_enum, default_value_t = MethodArg::IfNotExists)]
    method: MethodArg,

    /// Self-loop policy, overriding the config file
    #[arg(long, value_enum)]
    self_loop: Option<SelfLoopArg>,

    /// JSON file with the friendship relation config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip foreign key checks on the friendships pivot
    #[arg(long)]
    no_foreign_keys: bool,

    /// Print friend lists as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MethodArg {
    Always,
    IfNotExists,
}

impl From<MethodArg> for AttachMethod {
    fn from(method: MethodArg) -> Self {
        match method {
            MethodArg::Always => AttachMethod::Always,
            MethodArg::IfNotExists => AttachMethod::IfNotExists,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SelfLoopArg {
    Reject,
    Ignore,
    Permit,
}

impl From<SelfLoopArg> for SelfLoopPolicy {
    fn from(policy: SelfLoopArg) -> Self {
        match policy {
            SelfLoopArg::Reject => SelfLoopPolicy::Reject,
            SelfLoopArg::Ignore => SelfLoopPolicy::Ignore,
            SelfLoopArg::Permit => SelfLoopPolicy::Permit,
        }
    }
}

fn relation_config(args: &Args) -> anyhow::Result<RelationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            friendship_config_from_json(&json)?
        }
        None => friendship_config(),
    };
    if let Some(policy) = args.self_loop {
        config.self_loop = policy.into();
    }
    Ok(config)
}

fn parse_pair(pair: &str) -> anyhow::Result<(&str, &str)> {
    pair.split_once(':')
        .map(|(a, b)| (a.trim(), b.trim()))
        .filter(|(a, b)| !a.is_empty() && !b.is_empty())
        .ok_or_else(|| anyhow!("Expected a pair like `bill:ted`, got `{pair}`"))
}

fn lookup<'a>(users: &'a [User], name: &str) -> anyhow::Result<&'a User> {
    users
        .iter()
        .find(|user| user.name == name)
        .ok_or_else(|| anyhow!("Unknown user `{name}`"))
}

fn print_lists(lists: &[FriendList]) {
    for list in lists {
        let friends: Vec<&str> = list.friends.iter().map(|f| f.name.as_str()).collect();
        if friends.is_empty() {
            println!("{}: (no friends)", list.user.name);
        } else {
            println!("{}: {}", list.user.name, friends.join(", "));
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let relation = relation_config(&args)?;
    let store = StoreConfig {
        enforce_foreign_keys: !args.no_foreign_keys,
        ..Default::default()
    };
    let db = FixtureDb::with_config(&relation, store).context("Failed to set up relation")?;
    let users = seed_users(&db, args.users.as_slice())?;

    let method = AttachMethod::from(args.method);
    for link in &args.links {
        let (a, b) = parse_pair(link)?;
        let (a, b) = (lookup(&users, a)?, lookup(&users, b)?);
        if let Err(e) = db.friends_of(a).attach(b, method, |_| {}).await {
            tracing::error!("Failed to link {}: {}", link, e);
            return Err(e.into());
        }
    }
    for unlink in &args.unlinks {
        let (a, b) = parse_pair(unlink)?;
        let (a, b) = (lookup(&users, a)?, lookup(&users, b)?);
        if let Err(e) = db.friends_of(a).detach(b).await {
            tracing::error!("Failed to unlink {}: {}", unlink, e);
            return Err(e.into());
        }
    }

    let lists = db.friend_lists().await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&lists)?);
    } else {
        println!("{}", db.kind().name_for("User"));
        print_lists(&lists);
    }
    Ok(())
}

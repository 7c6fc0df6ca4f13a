use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use hearthis_api::{HearthisClient, HearthisClientConfig};
use hearthis_core::models::{Ref, RefKind, SearchQuery, SearchResult, TrackEntity};
use hearthis_core::secrets::{CredentialStore, SecretsError, SecretsResult};
use hearthis_core::uri::ROOT_URI;
use hearthis_core::{
    init_logging, AppDirs, CacheStats, Config, Credentials, HearthisConfig, HearthisLibrary,
    HearthisLibraryProvider, LibraryProvider, RemoteCatalog,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(name = "hearthis", version, about = "Browse the hearthis.at music community")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    /// Keep config and logs under this directory instead of the platform default
    #[arg(long, global = true)]
    home: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the children of a directory URI
    Browse {
        #[arg(default_value = ROOT_URI)]
        uri: String,
    },
    /// Resolve a track, artist or category URI to tracks
    Lookup { uri: String },
    /// Search tracks by free text
    Search(SearchCommand),
    /// Verify credentials and store the password in the OS keyring
    Login {
        /// Account email (defaults to hearthis.username from config)
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: String,
    },
    /// Remove the stored password from the OS keyring
    Logout {
        /// Account email (defaults to hearthis.username from config)
        #[arg(long)]
        username: Option<String>,
    },
    /// Interactive prompt sharing one catalog cache across commands
    Shell,
}

#[derive(Debug, Args, Clone)]
struct SearchCommand {
    /// Match anything (default)
    #[arg(long, conflicts_with_all = ["album", "artist"])]
    any: bool,
    /// Search by album
    #[arg(long, conflicts_with = "artist")]
    album: bool,
    /// Search by artist
    #[arg(long)]
    artist: bool,
    #[arg(required = true)]
    terms: Vec<String>,
}

impl SearchCommand {
    fn query(&self) -> SearchQuery {
        let term = self.terms.join(" ");
        if self.any {
            return SearchQuery::any(term);
        }
        search_query(&term, self.album, self.artist)
    }
}

fn search_query(term: &str, album: bool, artist: bool) -> SearchQuery {
    let terms = vec![term.to_string()];
    if album {
        SearchQuery {
            album: terms,
            ..SearchQuery::default()
        }
    } else if artist {
        SearchQuery {
            artist: terms,
            ..SearchQuery::default()
        }
    } else {
        SearchQuery {
            any: terms,
            ..SearchQuery::default()
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error("hearthis is disabled; set hearthis.enabled = true in config.toml")]
    Disabled,
    #[error("no account configured; set hearthis.username in config.toml")]
    MissingUsername,
    #[error("no password for {username}; run `hearthis login` or set hearthis.password")]
    MissingPassword { username: String },
    #[error("{0}")]
    Keyring(#[from] SecretsError),
}

/// Explicit `--username`, else the configured account.
fn account<'a>(
    username: Option<&'a str>,
    config: &'a HearthisConfig,
) -> Result<&'a str, CliError> {
    username
        .or(config.username.as_deref())
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(CliError::MissingUsername)
}

/// Config password first, then the keyring entry for the account.
fn resolve_credentials(
    config: &HearthisConfig,
    keyring_password: impl FnOnce(&str) -> SecretsResult<String>,
) -> Result<Credentials, CliError> {
    let username = account(None, config)?.to_string();

    let password = match config.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => password.to_string(),
        None => match keyring_password(&username) {
            Ok(password) => password,
            Err(SecretsError::NotFound { .. }) => {
                return Err(CliError::MissingPassword { username })
            }
            Err(err) => return Err(err.into()),
        },
    };

    Ok(Credentials { username, password })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    Browse(String),
    Lookup(String),
    Search(SearchQuery),
    Stats,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
enum ShellError {
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// `Ok(None)` for blank lines.
fn parse_shell_line(line: &str) -> Result<Option<ShellCommand>, ShellError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let parsed = match command {
        "browse" | "ls" => match rest.as_slice() {
            [] => ShellCommand::Browse(ROOT_URI.to_string()),
            [uri] => ShellCommand::Browse((*uri).to_string()),
            _ => return Err(ShellError::Usage("browse [URI]")),
        },
        "lookup" => match rest.as_slice() {
            [uri] => ShellCommand::Lookup((*uri).to_string()),
            _ => return Err(ShellError::Usage("lookup URI")),
        },
        "search" => {
            let (album, artist, terms) = match rest.as_slice() {
                ["--album", terms @ ..] => (true, false, terms),
                ["--artist", terms @ ..] => (false, true, terms),
                ["--any", terms @ ..] => (false, false, terms),
                terms => (false, false, terms),
            };
            if terms.is_empty() {
                return Err(ShellError::Usage("search [--any|--album|--artist] TERM..."));
            }
            ShellCommand::Search(search_query(&terms.join(" "), album, artist))
        }
        "stats" => ShellCommand::Stats,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(ShellError::Unknown(other.to_string())),
    };
    Ok(Some(parsed))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let dirs = match &cli.home {
        Some(base) => AppDirs::rooted_at(base),
        None => AppDirs::discover()?,
    };
    let config = Config::load_or_default(&dirs)?;
    let _logging = init_logging(&config.logging, &dirs)?;

    if let Command::Logout { username } = &cli.command {
        return logout(&config.hearthis, username.as_deref());
    }

    if !config.hearthis.enabled {
        bail!(CliError::Disabled);
    }
    let client = HearthisClient::new(HearthisClientConfig::from(&config.hearthis))?;

    if let Command::Login { username, password } = &cli.command {
        return login(&client, &config.hearthis, username.as_deref(), password);
    }

    let store = CredentialStore::new();
    let credentials = resolve_credentials(&config.hearthis, |user| store.password(user))?;
    tracing::info!(
        user = %credentials.username,
        base_url = %client.base_url(),
        config_dir = %dirs.config_dir().display(),
        "starting hearthis"
    );
    let provider = HearthisLibraryProvider::new(HearthisLibrary::new(client, credentials));

    match cli.command {
        Command::Browse { uri } => print_refs(&provider.browse(&uri), cli.json)?,
        Command::Lookup { uri } => print_tracks(&provider.lookup(&uri), cli.json)?,
        Command::Search(search) => print_search(provider.search(&search.query()), cli.json)?,
        Command::Shell => run_shell(&provider, cli.json)?,
        Command::Login { .. } | Command::Logout { .. } => {}
    }

    Ok(())
}

fn login(
    client: &HearthisClient,
    config: &HearthisConfig,
    username: Option<&str>,
    password: &str,
) -> Result<()> {
    let username = account(username, config)?;
    let session = client.login(username, password)?;
    CredentialStore::new().store_password(username, password)?;
    println!(
        "Logged in as {} (user {}); password stored in keyring.",
        session.username, session.user_id
    );
    Ok(())
}

fn logout(config: &HearthisConfig, username: Option<&str>) -> Result<()> {
    let username = account(username, config)?;
    CredentialStore::new().delete_password(username)?;
    tracing::info!(user = username, "removed stored password");
    println!("Removed stored password for {username}.");
    Ok(())
}

fn run_shell<C: RemoteCatalog>(provider: &HearthisLibraryProvider<C>, json: bool) -> Result<()> {
    let root = provider.root_directory();
    println!("{} ({}); type `help` for commands.", root.name, root.uri);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("hearthis> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let command = match parse_shell_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };

        match command {
            ShellCommand::Browse(uri) => print_refs(&provider.browse(&uri), json)?,
            ShellCommand::Lookup(uri) => print_tracks(&provider.lookup(&uri), json)?,
            ShellCommand::Search(query) => print_search(provider.search(&query), json)?,
            ShellCommand::Stats => print_stats(provider.library().cache_stats()),
            ShellCommand::Help => print_help(),
            ShellCommand::Quit => break,
        }
    }
    Ok(())
}

fn print_refs(refs: &[Ref], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(refs)?);
        return Ok(());
    }
    if refs.is_empty() {
        println!("(empty)");
    }
    for item in refs {
        let marker = match item.kind {
            RefKind::Directory => "dir",
            RefKind::Track => "track",
            RefKind::Artist => "artist",
        };
        println!("[{marker:>6}] {:<40} {}", item.uri, item.name);
    }
    Ok(())
}

fn print_tracks(tracks: &[TrackEntity], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(tracks)?);
        return Ok(());
    }
    if tracks.is_empty() {
        println!("(no tracks)");
    }
    for track in tracks {
        let duration = track
            .duration_seconds
            .map(|s| format!(" ({}:{:02})", s / 60, s % 60))
            .unwrap_or_default();
        println!(
            "{:<24} {} - {}{}",
            track.uri, track.artist.name, track.name, duration
        );
    }
    Ok(())
}

fn print_search(result: Option<SearchResult>, json: bool) -> Result<()> {
    let Some(result) = result else {
        println!("(search failed or had no terms)");
        return Ok(());
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    println!("{}", result.uri);
    print_tracks(&result.tracks, false)?;
    if !result.artists.is_empty() {
        println!("Artists:");
        for artist in &result.artists {
            println!("  {:<24} {}", artist.uri, artist.name);
        }
    }
    Ok(())
}

fn print_stats(stats: CacheStats) {
    println!(
        "tracks: {}, artists: {} ({} complete), categories: {}",
        stats.track_count, stats.artist_count, stats.complete_artist_count, stats.category_count
    );
}

fn print_help() {
    println!("browse [URI]                          list a directory (default hearthis:root)");
    println!("lookup URI                            resolve a track, artist or category");
    println!("search [--any|--album|--artist] TERM  search tracks");
    println!("stats                                 cache statistics");
    println!("quit                                  leave the shell");
}

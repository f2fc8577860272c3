mod config;
mod lyrics;
mod storage;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::ResolveMode;
use lyrics::{FailureKind, Query, ResolutionOutcome};
use std::io::Read;

#[derive(Debug, Parser)]
#[command(name = "lyricist", version, about = "Find lyrics for noisy title/artist tags")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Serve manual overrides and cached lyrics only.
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Look up lyrics and print them to stdout.
    Resolve {
        title: String,
        artist: String,
        /// Ask all sources at once for the unmodified query.
        #[arg(long)]
        racing: bool,
    },
    /// Manage user-supplied lyrics.
    Manual {
        #[command(subcommand)]
        cmd: ManualCommand,
    },
    /// Print the search variants generated for a query.
    Variants { title: String, artist: String },
    /// Print the configured sources in priority order.
    Sources,
}

#[derive(Debug, Subcommand)]
enum ManualCommand {
    /// Save lyrics from a file, or stdin when no file is given.
    Set {
        title: String,
        artist: String,
        #[arg(long)]
        file: Option<std::path::PathBuf>,
    },
    /// Remove saved lyrics.
    Clear { title: String, artist: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref()).context("load config")?;

    match cli.command {
        Command::Resolve {
            title,
            artist,
            racing,
        } => {
            let resolver = lyrics::build_resolver(&cfg, cli.offline)?;
            let outcome = if racing || cfg.lyrics.mode == ResolveMode::Racing {
                resolver.resolve_racing(&title, &artist).await
            } else {
                resolver.resolve(&title, &artist).await
            };

            match outcome {
                ResolutionOutcome::Success { lyrics, source } => {
                    tracing::info!("lyrics from {source}");
                    println!("{lyrics}");
                }
                ResolutionOutcome::NotFound => {
                    eprintln!("No lyrics found. Add your own with `lyricist manual set`.");
                }
                ResolutionOutcome::Error { kind, message } => match kind {
                    FailureKind::Connectivity => {
                        anyhow::bail!("{message}; try again when online")
                    }
                    _ => anyhow::bail!("{message}"),
                },
            }
        }
        Command::Manual { cmd } => {
            let resolver = lyrics::build_resolver(&cfg, true)?;
            match cmd {
                ManualCommand::Set {
                    title,
                    artist,
                    file,
                } => {
                    let text = match file {
                        Some(path) => std::fs::read_to_string(&path)
                            .with_context(|| format!("read {}", path.display()))?,
                        None => {
                            let mut buf = String::new();
                            std::io::stdin()
                                .read_to_string(&mut buf)
                                .context("read lyrics from stdin")?;
                            buf
                        }
                    };
                    resolver.save_manual_override(&title, &artist, &text)?;
                    println!("Saved lyrics for {title} by {artist}.");
                }
                ManualCommand::Clear { title, artist } => {
                    resolver.clear_manual_override(&title, &artist)?;
                    println!("Cleared lyrics for {title} by {artist}.");
                }
            }
        }
        Command::Variants { title, artist } => {
            for (i, v) in lyrics::variants::generate(&Query::new(title, artist))
                .iter()
                .enumerate()
            {
                println!("{}", variant_line(i, v));
            }
        }
        Command::Sources => {
            let resolver = lyrics::build_resolver(&cfg, true)?;
            for (i, name) in resolver.source_names().iter().enumerate() {
                println!("{}. {name}", i + 1);
            }
        }
    }

    Ok(())
}

/// One numbered line of `lyricist variants` output.
fn variant_line(index: usize, variant: &Query) -> String {
    format!("{:02}. {} / {}", index + 1, variant.title, variant.artist)
}

// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use dotme::{
    apply, clone::Git2Retrieval, filter::FilterConfig, path::default_config_path,
    store::AliasStore,
};

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use std::{env, path::PathBuf, process::exit};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Apply dotfiles from a Git repository to the current directory.
///
/// Only files and directories at the top-level of the repository whose names
/// start with a dot are copied, unless include patterns say otherwise.
/// Patterns are comma-separated globs supporting `*`, `?`, and `[abc]`.
#[derive(Debug, Clone, Parser)]
#[command(
    about,
    long_about,
    override_usage = "\n  dotme [options] <url>\n  dotme [options] --alias <alias>\n  dotme [options] <dotme-command>",
    subcommand_help_heading = "Commands",
    args_conflicts_with_subcommands = true,
    version
)]
struct Cli {
    /// Path to configuration file.
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub apply: ApplyOptions,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    fn run(self) -> Result<()> {
        match self.command {
            Some(Command::ListAliases) => run_list_aliases(&open_store(self.config)?),
            Some(Command::RemoveAlias(opts)) => run_remove_alias(open_store(self.config)?, opts),
            Some(Command::Config(ConfigCommand::SetDefaultPatterns(opts))) => {
                run_set_default_patterns(open_store(self.config)?, opts)
            }
            Some(Command::Config(ConfigCommand::Show)) => run_show_config(&open_store(self.config)?),
            Some(Command::Version) => {
                info!("{}", version_info());
                Ok(())
            }
            None => run_apply(open_store(self.config)?, self.apply),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// List all saved repository aliases.
    #[command(visible_alias = "ls")]
    ListAliases,

    /// Remove a saved repository alias.
    #[command(visible_alias = "rm", override_usage = "dotme remove-alias <alias>")]
    RemoveAlias(RemoveAliasOptions),

    /// Manage configuration settings.
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Print version information.
    Version,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Set default include and exclude patterns.
    ///
    /// Default patterns are used whenever neither --include nor --exclude
    /// are given.
    #[command(override_usage = "dotme config set-default-patterns [--include <patterns>] [--exclude <patterns>]")]
    SetDefaultPatterns(PatternOptions),

    /// Show current configuration.
    Show,
}

#[derive(Args, Clone, Debug)]
struct ApplyOptions {
    /// URL of repository to apply dotfiles from.
    #[arg(value_name = "url")]
    pub url: Option<String>,

    /// Use a saved repository by alias.
    #[arg(short, long, value_name = "alias", conflicts_with_all = ["url", "save"])]
    pub alias: Option<String>,

    /// Save the repository under given alias instead of applying it.
    #[arg(short, long, value_name = "alias", requires = "url")]
    pub save: Option<String>,

    #[command(flatten)]
    pub patterns: PatternOptions,
}

#[derive(Args, Clone, Debug)]
struct PatternOptions {
    /// Comma-separated list of patterns to include, e.g., ".vscode,.gitconfig".
    #[arg(long, value_name = "patterns", default_value = "")]
    pub include: String,

    /// Comma-separated list of patterns to exclude, e.g., ".DS_Store".
    #[arg(long, value_name = "patterns", default_value = "")]
    pub exclude: String,
}

impl PatternOptions {
    fn to_filter(&self) -> FilterConfig {
        FilterConfig::parse(&self.include, &self.exclude)
    }
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct RemoveAliasOptions {
    /// Name of alias to remove.
    #[arg(required = true, value_name = "alias")]
    pub alias: String,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn open_store(config: Option<PathBuf>) -> Result<AliasStore> {
    let path = match config {
        Some(path) => path,
        None => default_config_path()?,
    };

    Ok(AliasStore::open(path)?)
}

/// Version line followed by commit and build date stamped in at build time.
fn version_info() -> String {
    format!(
        "dotme version {}\ncommit: {}\nbuilt at: {}",
        env!("CARGO_PKG_VERSION"),
        option_env!("DOTME_COMMIT").unwrap_or("none"),
        option_env!("DOTME_BUILD_DATE").unwrap_or("unknown"),
    )
}

fn run_apply(mut store: AliasStore, opts: ApplyOptions) -> Result<()> {
    if let Some(alias) = opts.save {
        let url = opts
            .url
            .ok_or_else(|| anyhow!("repository URL is required when using --save"))?;
        store.save_alias(&alias, &url)?;
        info!("repository {url:?} saved with alias {alias:?}");
        return Ok(());
    }

    let url = match opts.alias {
        Some(alias) => {
            let url = store.get_alias(&alias)?.to_string();
            info!("using alias {alias:?} for repository: {url}");
            url
        }
        None => opts
            .url
            .ok_or_else(|| anyhow!("repository URL is required, see --help"))?,
    };

    // INVARIANT: Defaults are resolved once, before anything is copied.
    let filter = opts.patterns.to_filter().or_defaults(store.default_patterns());
    let dest = env::current_dir()?;
    let report = apply(&Git2Retrieval::default(), &url, &dest, &filter)?;
    info!("{report}");
    info!("done, dotfiles applied to {:?}", dest.display());

    Ok(())
}

fn run_list_aliases(store: &AliasStore) -> Result<()> {
    let mut aliases = store.aliases().peekable();
    if aliases.peek().is_none() {
        info!("no aliases found, save one with 'dotme --save <alias> <url>'");
        return Ok(());
    }

    let listing = aliases
        .map(|(alias, url)| format!("    {alias}: {url}"))
        .collect::<Vec<_>>()
        .join("\n");
    info!("saved repository aliases:\n{listing}");

    Ok(())
}

fn run_remove_alias(mut store: AliasStore, opts: RemoveAliasOptions) -> Result<()> {
    store.remove_alias(&opts.alias)?;
    info!("alias {:?} removed", opts.alias);

    Ok(())
}

fn run_set_default_patterns(mut store: AliasStore, opts: PatternOptions) -> Result<()> {
    let patterns = opts.to_filter();
    store.set_default_patterns(patterns.clone())?;

    info!("default patterns updated");
    if !patterns.include.is_empty() {
        info!("include patterns: {}", patterns.include.join(", "));
    }

    if !patterns.exclude.is_empty() {
        info!("exclude patterns: {}", patterns.exclude.join(", "));
    }

    Ok(())
}

fn run_show_config(store: &AliasStore) -> Result<()> {
    info!("configuration file: {:?}", store.path().display());

    let listing = store
        .aliases()
        .map(|(alias, url)| format!("    {alias}: {url}"))
        .collect::<Vec<_>>();
    if listing.is_empty() {
        info!("repository aliases: (none)");
    } else {
        info!("repository aliases:\n{}", listing.join("\n"));
    }

    let defaults = store.default_patterns();
    if defaults.is_empty() {
        info!("default patterns: (none, all dotfiles are included)");
    } else {
        if !defaults.include.is_empty() {
            info!("default include patterns: {}", defaults.include.join(", "));
        }

        if !defaults.exclude.is_empty() {
            info!("default exclude patterns: {}", defaults.exclude.join(", "));
        }
    }

    Ok(())
}

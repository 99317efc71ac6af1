// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use ibexa_postinstall::{
    config::SetupConfig,
    path::{default_config_file, default_resource_root, installed_packages_file},
    InstalledJson, LocalFilesystem, ProductIdentity, ResourceLayout, Setup,
};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    env::current_dir,
    fs::read_to_string,
    path::{Path, PathBuf},
    process::exit,
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "ibexa-postinstall [options] <command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Show more output, repeat for even more.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,
}

impl Cli {
    fn run(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        match self.command {
            Command::Setup(opts) => run_setup(opts, config),
            Command::Show(opts) => run_show(opts, config),
        }
    }

    fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Run post install configuration tool.
    #[command(override_usage = "ibexa-postinstall setup [options] --platformsh")]
    Setup(SetupOptions),

    /// Show resolved product and resource directories without copying.
    #[command(override_usage = "ibexa-postinstall show [options]")]
    Show(ShowOptions),
}

#[derive(Args, Clone, Debug)]
struct PathOptions {
    /// Project to install configuration files into.
    #[arg(short, long, value_name = "path")]
    pub project_dir: Option<PathBuf>,

    /// Directory holding common and product specific resources.
    #[arg(short, long, value_name = "path")]
    pub resource_root: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct SetupOptions {
    /// Install Platform.sh config files.
    #[arg(long)]
    pub platformsh: bool,

    #[command(flatten)]
    pub paths: PathOptions,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ShowOptions {
    #[command(flatten)]
    pub paths: PathOptions,
}

fn main() {
    let cli = Cli::parse();

    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(cli.log_filter()))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = cli.run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run_setup(opts: SetupOptions, config: SetupConfig) -> Result<()> {
    if !opts.platformsh {
        warn!("nothing to set up, pass --platformsh to install Platform.sh config files");
        return Ok(());
    }

    let (project_dir, resource_root) = resolve_paths(opts.paths, config)?;
    let registry = InstalledJson::load(installed_packages_file(&project_dir))?;
    let setup = Setup::new(LocalFilesystem::new(), ResourceLayout::new(resource_root));

    let bar = ProgressBar::new(0);
    let style = ProgressStyle::with_template(
        "{elapsed_precise:.green}  {msg:<30}  [{wide_bar:.yellow/blue}] {pos}/{len}",
    )?
    .progress_chars("-Cco.");
    bar.set_style(style);

    let report = setup.platform_sh(&registry, &project_dir, &bar)?;
    let collisions = report.collisions().count();
    if collisions > 0 {
        info!("{collisions} existing files were overwritten, rerun with -v to list them");
    }

    Ok(())
}

fn run_show(opts: ShowOptions, config: SetupConfig) -> Result<()> {
    let (project_dir, resource_root) = resolve_paths(opts.paths, config)?;
    let registry = InstalledJson::load(installed_packages_file(&project_dir))?;
    let setup = Setup::new(LocalFilesystem::new(), ResourceLayout::new(resource_root));

    let product = ProductIdentity::resolve(&registry)?;
    let plan = setup.plan(&product)?;
    info!("product: {}", plan.product.name());
    info!("version: {}", plan.product.installed_version());
    info!("aliases: {}", plan.product.aliases().join(", "));
    info!("common resources: {}", plan.common_dir.display());
    info!("product resources: {}", plan.specific_dir.display());

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SetupConfig> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_file() {
            Ok(path) => (path, false),
            Err(_) => return Ok(SetupConfig::default()),
        },
    };

    if !required && !path.exists() {
        return Ok(SetupConfig::default());
    }

    let data = read_to_string(&path)
        .with_context(|| format!("failed to read configuration file {:?}", path.display()))?;
    let config = data
        .parse::<SetupConfig>()
        .with_context(|| format!("failed to parse configuration file {:?}", path.display()))?;

    Ok(config)
}

fn resolve_paths(opts: PathOptions, config: SetupConfig) -> Result<(PathBuf, PathBuf)> {
    let project_dir = match opts.project_dir {
        Some(path) => path,
        None => match config.settings.project_dir {
            Some(path) => path.into_path_buf(),
            None => current_dir().context("failed to determine current directory")?,
        },
    };

    let resource_root = match opts.resource_root {
        Some(path) => path,
        None => match config.settings.resource_root {
            Some(path) => path.into_path_buf(),
            None => default_resource_root(&project_dir),
        },
    };

    Ok((project_dir, resource_root))
}

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{ArgEnum, Parser, Subcommand};
use log::LevelFilter;

use winthumb_ctl::{AssocScope, FormatCategory};

#[cfg(windows)]
use winthumb_ctl::{
    cache, catalog,
    elevate::ShellElevator,
    mutator::{BulkReport, Disposition, Mutator},
    registry::{LiveRegistry, RegistryView},
    resolver, Config, Elevator, FormatAssociation,
};

/// A command line tool for switching Explorer's thumbnail providers on and
/// off per file type.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Log verbosely to stderr
    #[clap(short, long, global = true)]
    verbose: bool,

    /// Registry tier that enable/disable writes target
    #[clap(long, arg_enum, global = true, default_value_t)]
    scope: ScopeArg,

    #[clap(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ArgEnum)]
enum ScopeArg {
    Machine,
    User,
}

impl Default for ScopeArg {
    fn default() -> Self {
        Self::Machine
    }
}

impl From<ScopeArg> for AssocScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Machine => AssocScope::Machine,
            ScopeArg::User => AssocScope::User,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ArgEnum)]
enum CategoryArg {
    #[clap(name = "3d")]
    Models,
    Images,
    Text,
    Documents,
}

impl From<CategoryArg> for FormatCategory {
    fn from(category: CategoryArg) -> Self {
        match category {
            CategoryArg::Models => FormatCategory::Models,
            CategoryArg::Images => FormatCategory::Images,
            CategoryArg::Text => FormatCategory::Text,
            CategoryArg::Documents => FormatCategory::Documents,
        }
    }
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Show every known format and whether its handler is currently active
    List {
        /// Limit the listing to one category
        #[clap(short, long, arg_enum)]
        category: Option<CategoryArg>,
    },
    /// Make our handler the active thumbnail provider for one extension
    Enable { extension: String },
    /// Remove our handler's association for one extension
    Disable { extension: String },
    /// Enable every known format at once
    EnableAll {
        #[clap(short, long, arg_enum)]
        category: Option<CategoryArg>,
    },
    /// Disable every known format at once
    DisableAll {
        #[clap(short, long, arg_enum)]
        category: Option<CategoryArg>,
    },
    /// Register the handler DLL with COM (regsvr32 /s)
    RegisterDll {
        /// Path to the handler DLL, overriding the configured one
        #[clap(long)]
        dll: Option<PathBuf>,
    },
    /// Unregister the handler DLL (regsvr32 /u /s)
    UnregisterDll {
        #[clap(long)]
        dll: Option<PathBuf>,
    },
    /// Restart Explorer and purge its thumbnail caches
    RebuildCache,
}

fn main() -> Result<()> {
    let args = Args::parse();
    simple_logging::log_to_stderr(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });

    #[cfg(windows)]
    return run(&args, &LiveRegistry, &ShellElevator);

    #[cfg(not(windows))]
    {
        bail!("winthumb-ctl drives the Windows registry and shell; there is nothing to manage on this platform");
    }
}

#[cfg(windows)]
fn run(args: &Args, view: &dyn RegistryView, elevator: &dyn Elevator) -> Result<()> {
    let config = Config::load_near_exe()?;
    let mutator = Mutator::new(view, elevator, args.scope.into());

    match &args.command {
        CliCommand::List { category } => {
            let mut list = load_catalog(&config, category.map(Into::into));
            for item in &mut list {
                item.refresh(view);
            }
            print_listing(&list, view);
            Ok(())
        }
        CliCommand::Enable { extension } => {
            let item = lookup(&config, extension)?;
            if mutator.enable(&item.extension, &item.handler)? {
                println!(
                    "Enabled thumbnails for {} ({}).",
                    item.extension, item.description
                );
                Ok(())
            } else {
                bail!(
                    "the association for {} was written but did not read back as active",
                    item.extension
                );
            }
        }
        CliCommand::Disable { extension } => {
            let item = lookup(&config, extension)?;
            match mutator.disable(&item.extension, &item.handler)? {
                Disposition::Removed => {
                    println!("Removed the association for {}.", item.extension)
                }
                Disposition::Skipped => println!(
                    "Nothing to do: our handler is not the active provider for {}.",
                    item.extension
                ),
            }
            Ok(())
        }
        CliCommand::EnableAll { category } => {
            let mut list = load_catalog(&config, category.map(Into::into));
            finish_bulk("enable-all", mutator.enable_all(&mut list))
        }
        CliCommand::DisableAll { category } => {
            let mut list = load_catalog(&config, category.map(Into::into));
            finish_bulk("disable-all", mutator.disable_all(&mut list))
        }
        CliCommand::RegisterDll { dll } => {
            let path = config.resolve_dll_path(dll.as_deref());
            mutator.register_dll(&path)?;
            println!("Registered {}.", path.display());
            Ok(())
        }
        CliCommand::UnregisterDll { dll } => {
            let path = config.resolve_dll_path(dll.as_deref());
            mutator.unregister_dll(&path)?;
            println!("Unregistered {}.", path.display());
            Ok(())
        }
        CliCommand::RebuildCache => {
            let report = cache::rebuild_thumbnail_cache()?;
            println!(
                "Explorer restarted; {} cache file(s) removed.",
                report.removed
            );
            Ok(())
        }
    }
}

#[cfg(windows)]
fn load_catalog(config: &Config, category: Option<FormatCategory>) -> Vec<FormatAssociation> {
    let mut list = catalog::associations(category);
    config.apply(&mut list, category);
    list
}

#[cfg(windows)]
fn lookup(config: &Config, extension: &str) -> Result<FormatAssociation> {
    use anyhow::Context;

    let wanted = catalog::normalize_extension(extension);
    load_catalog(config, None)
        .into_iter()
        .find(|item| item.extension == wanted)
        .with_context(|| format!("{} is not a known format; `list` shows what is", wanted))
}

#[cfg(windows)]
fn print_listing(list: &[FormatAssociation], view: &dyn RegistryView) {
    let mut current: Option<FormatCategory> = None;
    for item in list {
        if current != Some(item.category) {
            current = Some(item.category);
            println!("{}", item.category.label());
        }
        let mark = if item.active { "on " } else { "off" };
        let via = resolver::resolve_active(view, &item.extension, &item.handler)
            .map(|via| format!("  via {}", via))
            .unwrap_or_default();
        println!(
            "  [{}] {:<6} {:<30} {}{}",
            mark, item.extension, item.description, item.handler, via
        );
    }
}

#[cfg(windows)]
fn finish_bulk(action: &str, report: BulkReport) -> Result<()> {
    for (extension, reason) in &report.failures {
        eprintln!("{}: {}", extension, reason);
    }
    println!(
        "{}: {} changed, {} already in the requested state, {} failed.",
        action,
        report.changed,
        report.skipped,
        report.failures.len()
    );
    if report.ok() {
        Ok(())
    } else {
        bail!("{} of the requested changes failed", report.failures.len());
    }
}

use crate::cli::{AddArgs, Cli, Command, InitArgs, LinkArgs, RemoveArgs, StatusArgs};
use lnkr_core::config::{EnvConfig, ProjectConfig};
use lnkr_core::project::default_remote_path;
use lnkr_core::{
    AddRequest, EntryOutcome, InitOptions, LedgerUpdate, LinkDirection, LinkReport, Lnkr,
};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn run_command(cli: Cli, work_dir: &Path) -> anyhow::Result<()> {
    let lnkr = Lnkr::new(work_dir);
    debug!(
        "Project {} on {}",
        work_dir.display(),
        lnkr_core::platform::current_platform()
    );

    match cli.command {
        Command::Init(args) => cmd_init(&lnkr, args),
        Command::Add(args) => cmd_add(&lnkr, args),
        Command::Link(args) => cmd_link(&lnkr, args),
        Command::Unlink => cmd_unlink(&lnkr),
        Command::Status(args) => cmd_status(&lnkr, args),
        Command::Remove(args) => cmd_remove(&lnkr, args),
        Command::Clean => cmd_clean(&lnkr),
    }
}

fn cmd_init(lnkr: &Lnkr, args: InitArgs) -> anyhow::Result<()> {
    let remote = match args.remote {
        Some(remote) => remote,
        None => default_remote(
            lnkr.project().work_dir(),
            std::env::var_os(EnvConfig::REMOTE_ROOT),
            std::env::var(EnvConfig::REMOTE_DEPTH).ok(),
        ),
    };
    debug!("Using remote {}", remote.display());

    let report = lnkr.init(&InitOptions {
        remote: Some(remote),
        create_remote: args.create_remote,
        git_exclude_path: args.git_exclude_path,
    })?;

    if report.remote_created {
        if let Some(remote) = &report.remote {
            println!("Created remote directory: {}", remote.display());
        }
    }
    if report.created {
        println!(
            "Created {} with local and remote directories",
            ProjectConfig::REGISTRY_FILE_NAME
        );
    } else {
        println!(
            "Updated local and remote in {}",
            ProjectConfig::REGISTRY_FILE_NAME
        );
    }
    print_ledger(&report.ledger);
    println!("Project initialized successfully!");
    Ok(())
}

/// Remote used when `init` runs without `--remote`.
fn default_remote(work_dir: &Path, root: Option<OsString>, depth: Option<String>) -> PathBuf {
    let root = root.filter(|r| !r.is_empty()).map(PathBuf::from);
    let depth = depth
        .and_then(|d| d.trim().parse::<usize>().ok())
        .unwrap_or(if root.is_some() {
            ProjectConfig::DEFAULT_REMOTE_ROOT_DEPTH
        } else {
            ProjectConfig::DEFAULT_REMOTE_DEPTH
        });
    let base = root.unwrap_or_else(|| PathBuf::from(std::path::MAIN_SEPARATOR_STR));
    default_remote_path(work_dir, &base, depth)
}

fn cmd_add(lnkr: &Lnkr, args: AddArgs) -> anyhow::Result<()> {
    let request = AddRequest::new(&args.path, args.link_kind())
        .recursive(args.recursive)
        .from_remote(args.from_remote);
    let report = lnkr.add(&request)?;

    if report.is_empty() {
        println!("No new paths to add.");
        return Ok(());
    }
    for entry in &report.added {
        println!("Added link: {} (type: {})", entry.path, entry.kind);
    }
    if let Some(ledger) = &report.ledger {
        print_ledger(ledger);
    }
    Ok(())
}

fn cmd_link(lnkr: &Lnkr, args: LinkArgs) -> anyhow::Result<()> {
    let report = lnkr.link(LinkDirection::from_remote(args.from_remote))?;
    if report.is_empty() {
        print_no_links();
        return Ok(());
    }

    for result in &report.results {
        match &result.outcome {
            EntryOutcome::Created => println!(
                "Created {} link: {}",
                result.entry.kind,
                result.path.display()
            ),
            EntryOutcome::Skipped(reason) => println!("Skipped {}: {}", result.entry.path, reason),
            EntryOutcome::Failed(error) => {
                println!("Error creating link for {}: {}", result.entry.path, error)
            }
            EntryOutcome::Removed => {}
        }
    }
    print_summary("Link creation completed.", &report);
    Ok(())
}

fn cmd_unlink(lnkr: &Lnkr) -> anyhow::Result<()> {
    let report = lnkr.unlink()?;
    if report.is_empty() {
        print_no_links();
        return Ok(());
    }

    for result in &report.results {
        match &result.outcome {
            EntryOutcome::Removed => println!(
                "Removed {} link: {}",
                result.entry.kind,
                result.path.display()
            ),
            EntryOutcome::Skipped(_) => {
                println!("Link not found, skipping: {}", result.path.display())
            }
            EntryOutcome::Failed(error) => {
                println!("Error removing link for {}: {}", result.entry.path, error)
            }
            EntryOutcome::Created => {}
        }
    }
    print_summary("Link removal completed.", &report);
    Ok(())
}

fn cmd_status(lnkr: &Lnkr, args: StatusArgs) -> anyhow::Result<()> {
    let report = lnkr.status()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    if report.is_empty() {
        print_no_links();
        return Ok(());
    }
    print!("{}", report.render_table());
    Ok(())
}

fn cmd_remove(lnkr: &Lnkr, args: RemoveArgs) -> anyhow::Result<()> {
    let report = lnkr.remove(&args.path)?;
    if report.removed.is_empty() {
        println!("No links matched {}", args.path.display());
        return Ok(());
    }
    for entry in &report.removed {
        println!("Removed link: {} (type: {})", entry.path, entry.kind);
    }
    if let Some(ledger) = &report.ledger {
        print_ledger(ledger);
    }
    Ok(())
}

fn cmd_clean(lnkr: &Lnkr) -> anyhow::Result<()> {
    let report = lnkr.clean()?;
    if report.registry_removed {
        println!("Removed {}", report.registry_path.display());
    } else {
        println!("{} does not exist", report.registry_path.display());
    }
    match &report.ledger {
        LedgerUpdate::Unchanged { path } => {
            println!("No lnkr entries in {}", path.display())
        }
        other => print_ledger(other),
    }
    println!("Cleanup completed successfully!");
    Ok(())
}

fn print_no_links() {
    println!("No links found in {}", ProjectConfig::REGISTRY_FILE_NAME);
}

fn print_summary(headline: &str, report: &LinkReport) {
    println!(
        "{} ({} created, {} removed, {} skipped, {} failed)",
        headline,
        report.created(),
        report.removed(),
        report.skipped(),
        report.failed()
    );
}

fn print_ledger(update: &LedgerUpdate) {
    match update {
        LedgerUpdate::Changed { path } => println!("Updated {}", path.display()),
        LedgerUpdate::Unchanged { path } => debug!("{} unchanged", path.display()),
        LedgerUpdate::Failed { path, message } => {
            eprintln!("Warning: failed to update {}: {}", path.display(), message)
        }
    }
}

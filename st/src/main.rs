//! st - script template manager
//!
//! CLI entry point over the template catalog and its lifecycle operations.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::*;
use eyre::{Context, Result, bail, eyre};
use serde::Serialize;
use tracing::{debug, info};

use script_templates::cli::{Cli, Command, NameParts, OutputFormat};
use script_templates::config::Config;
use script_templates::{
    DirSource, NewTemplate, Origin, RestartNotice, TemplateEntry, TemplateError, TemplateManager, TemplateName,
    TemplateSpec,
};

fn setup_logging(verbose: bool) -> Result<()> {
    // Logs go to stderr so list/show output stays clean on stdout
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    debug!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let project = match cli.project {
        Some(project) => project,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    let mut config = Config::load(cli.config.as_ref(), &project).context("Failed to load configuration")?;
    if let Some(dir) = cli.built_in_dir {
        config.built_in_dir = Some(dir);
    }

    info!(project = %project.display(), "st starting");

    match cli.command {
        Command::Init => cmd_init(&config, &project),
        Command::List { format } => cmd_list(&open_manager(&config, &project)?, format),
        Command::Show { name, format } => cmd_show(&open_manager(&config, &project)?, &name, format),
        Command::New {
            name,
            parts,
            content_file,
            from,
            force,
        } => cmd_new(&config, &project, name, parts, content_file, from, force),
        Command::Customize { name } => cmd_customize(&config, &project, &name),
        Command::Restore { name, yes } => cmd_restore(&config, &project, &name, yes),
        Command::Delete { name, yes } => cmd_delete(&config, &project, &name, yes),
        Command::Edit { name, content_file } => cmd_edit(&config, &project, &name, content_file),
    }
}

fn open_manager(config: &Config, project: &Path) -> Result<TemplateManager> {
    let built_in_dir = config.built_in_dir(project)?;
    let custom_dir = config.custom_dir(project);

    if !custom_dir.is_dir() {
        bail!(
            "Custom template directory {} does not exist, run `st init` first",
            custom_dir.display()
        );
    }

    TemplateManager::open(
        DirSource::with_pattern(built_in_dir, &config.pattern),
        DirSource::with_pattern(custom_dir, &config.pattern),
    )
    .context("Failed to read script templates")
}

/// Open a manager that records whether a restart is needed
fn open_tracked(config: &Config, project: &Path) -> Result<(TemplateManager, RestartNotice)> {
    let mut manager = open_manager(config, project)?;
    let notice = RestartNotice::new();
    manager.add_observer(notice.clone());
    Ok((manager, notice))
}

fn print_restart_notice(notice: &RestartNotice) {
    if notice.is_pending() {
        eprintln!("{} {}", "!".yellow().bold(), notice.message().yellow());
    }
}

fn cmd_init(config: &Config, project: &Path) -> Result<()> {
    let custom_dir = config.custom_dir(project);
    if custom_dir.is_dir() {
        println!("Custom template directory already exists: {}", custom_dir.display());
        return Ok(());
    }

    fs::create_dir_all(&custom_dir)
        .with_context(|| format!("Failed to create directory {}", custom_dir.display()))?;
    println!("{} Created {}", "✓".green(), custom_dir.display().to_string().cyan());
    Ok(())
}

#[derive(Serialize)]
struct TemplateView<'a> {
    file_name: &'a str,
    origin: Origin,
    path: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<TemplateName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
}

impl<'a> TemplateView<'a> {
    fn new(entry: &'a TemplateEntry, origin: Origin) -> Self {
        Self {
            file_name: entry.file_name(),
            origin,
            path: entry.full_path(),
            name: TemplateName::parse(entry.file_name()),
            content: None,
        }
    }
}

fn origin_label(origin: Origin) -> ColoredString {
    match origin {
        Origin::BuiltIn => origin.name().dimmed(),
        Origin::CustomOverride => origin.name().yellow(),
        Origin::AdditionalCustom => origin.name().green(),
        Origin::UninitializedCustom => origin.name().red(),
    }
}

fn cmd_list(manager: &TemplateManager, format: OutputFormat) -> Result<()> {
    let catalog = manager.catalog();

    if format == OutputFormat::Json {
        let views: Vec<_> = catalog
            .entries()
            .iter()
            .map(|e| TemplateView::new(e, catalog.origin(e)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    let sections: [(&str, Vec<&TemplateEntry>); 2] = [
        ("Built-In Script Templates", catalog.built_in_entries().collect()),
        ("Custom Script Templates", catalog.custom_entries().collect()),
    ];

    for (title, entries) in sections {
        println!("{}", title.bold());
        if entries.is_empty() {
            println!("  {}", "No Elements".dimmed());
        }
        for entry in entries {
            let menu = TemplateName::parse(entry.file_name())
                .map(|n| n.menu_display())
                .unwrap_or_default();
            println!(
                "  {} [{}] {}",
                entry.file_name(),
                origin_label(catalog.origin(entry)),
                menu.dimmed()
            );
        }
    }

    Ok(())
}

fn cmd_show(manager: &TemplateManager, name: &str, format: OutputFormat) -> Result<()> {
    let catalog = manager.catalog();
    let entry = catalog
        .get(name)
        .ok_or_else(|| TemplateError::NotFound {
            file_name: name.to_string(),
        })?;

    match format {
        OutputFormat::Json => {
            let mut view = TemplateView::new(entry, catalog.origin(entry));
            view.content = Some(entry.working_content());
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        OutputFormat::Text => print!("{}", entry.working_content()),
    }
    Ok(())
}

fn cmd_new(
    config: &Config,
    project: &Path,
    name: Option<String>,
    parts: NameParts,
    content_file: Option<PathBuf>,
    from: Option<String>,
    force: bool,
) -> Result<()> {
    let (mut manager, notice) = open_tracked(config, project)?;

    let content = match (content_file, from) {
        (Some(path), _) => {
            fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?
        }
        (None, Some(source)) => manager
            .catalog()
            .get(&source)
            .map(|e| e.working_content().to_string())
            .ok_or(TemplateError::NotFound { file_name: source })?,
        (None, None) => String::new(),
    };

    let overwrite = |path: &Path| {
        force
            || confirm(&format!(
                "A template named {} already exists. Overwrite?",
                path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
            ))
    };

    let file_name = match name {
        Some(file_name) => {
            manager.create_custom(&TemplateSpec::new(file_name.clone(), content), overwrite)?;
            file_name
        }
        None => {
            let pending = manager.begin_new(NewTemplate {
                order: parts.order,
                menu_name: parts.menu,
                title: parts.title,
                extension: parts.ext,
            });
            pending.entry.set_working_content(content);
            manager.commit_new(overwrite)?
        }
    };

    let origin = manager.catalog().origin_of(&file_name).unwrap_or(Origin::AdditionalCustom);
    println!("{} Created {} [{}]", "✓".green(), file_name.cyan(), origin_label(origin));
    print_restart_notice(&notice);
    Ok(())
}

fn cmd_customize(config: &Config, project: &Path, name: &str) -> Result<()> {
    let (mut manager, notice) = open_tracked(config, project)?;
    manager.customize_built_in(name)?;

    let path = manager.custom_source().path_for(name);
    println!("{} Customized {} -> {}", "✓".green(), name.cyan(), path.display());
    print_restart_notice(&notice);
    Ok(())
}

/// Fail before prompting when the entry is missing or of another origin
fn require_origin(manager: &TemplateManager, name: &str, expected: Origin) -> Result<()> {
    let actual = manager
        .catalog()
        .origin_of(name)
        .ok_or_else(|| TemplateError::NotFound {
            file_name: name.to_string(),
        })?;
    if actual != expected {
        return Err(TemplateError::WrongOrigin {
            file_name: name.to_string(),
            expected,
            actual,
        }
        .into());
    }
    Ok(())
}

fn cmd_restore(config: &Config, project: &Path, name: &str, yes: bool) -> Result<()> {
    let (mut manager, notice) = open_tracked(config, project)?;
    require_origin(&manager, name, Origin::CustomOverride)?;

    let prompt = format!(
        "The custom script template {} will be deleted. The built-in one will be used instead. Continue?",
        name
    );
    if !yes && !confirm(&prompt) {
        println!("Cancelled");
        return Ok(());
    }

    manager.restore_built_in(name)?;
    println!("{} Restored built-in {}", "✓".green(), name.cyan());
    print_restart_notice(&notice);
    Ok(())
}

fn cmd_delete(config: &Config, project: &Path, name: &str, yes: bool) -> Result<()> {
    let (mut manager, notice) = open_tracked(config, project)?;
    require_origin(&manager, name, Origin::AdditionalCustom)?;

    let prompt = format!("The custom script template {} will be deleted. Continue?", name);
    if !yes && !confirm(&prompt) {
        println!("Cancelled");
        return Ok(());
    }

    manager.delete_custom(name)?;
    println!("{} Deleted {}", "✓".green(), name.cyan());
    print_restart_notice(&notice);
    Ok(())
}

fn cmd_edit(config: &Config, project: &Path, name: &str, content_file: Option<PathBuf>) -> Result<()> {
    let (mut manager, notice) = open_tracked(config, project)?;

    let current = {
        let catalog = manager.catalog();
        let entry = catalog
            .get(name)
            .ok_or_else(|| TemplateError::NotFound {
                file_name: name.to_string(),
            })?;
        if !catalog.origin(entry).is_writable() {
            return Err(TemplateError::ReadOnly {
                file_name: name.to_string(),
            }
            .into());
        }
        entry.working_content().to_string()
    };

    let content = match content_file {
        Some(path) => fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?,
        None => run_editor(&current)?,
    };

    manager.edit(name, content)?;
    let changed = manager.catalog().get(name).is_some_and(TemplateEntry::has_unsaved_changes);
    if !changed {
        println!("No changes to {}", name);
        return Ok(());
    }

    manager.commit_edit(name)?;
    println!("{} Saved {}", "✓".green(), name.cyan());
    print_restart_notice(&notice);
    Ok(())
}

/// Open $VISUAL or $EDITOR on a temporary copy and return the edited text
fn run_editor(initial: &str) -> Result<String> {
    let editor = std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string());
    let mut words = editor.split_whitespace();
    let program = words.next().ok_or_else(|| eyre!("Editor command is empty"))?;

    let mut file = tempfile::Builder::new()
        .prefix("st-")
        .suffix(".txt")
        .tempfile()
        .context("Failed to create temporary file")?;
    file.write_all(initial.as_bytes())?;
    file.flush()?;

    debug!(%editor, path = ?file.path(), "Launching editor");
    let status = std::process::Command::new(program)
        .args(words)
        .arg(file.path())
        .status()
        .with_context(|| format!("Failed to launch editor '{}'", editor))?;
    if !status.success() {
        bail!("Editor '{}' exited with {}", editor, status);
    }

    fs::read_to_string(file.path()).context("Failed to read edited template")
}

/// Ask a yes/no question on stdin, defaulting to no
fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

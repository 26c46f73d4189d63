//! CLI argument parsing for script-templates

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "st")]
#[command(author, version, about = "Manage built-in and custom script templates", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Project root holding the custom template directory (default: current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Built-in template directory, overrides the config
    #[arg(short, long, global = true)]
    pub built_in_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format for read commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Name parts of a new template, composed as `{order}-{menu}-{title}.{ext}.txt`
#[derive(Args, Debug, Clone)]
pub struct NameParts {
    /// Position in the create menu
    #[arg(long, default_value = "0")]
    pub order: i32,

    /// Menu entry, `__` separates sub-menus
    #[arg(long, default_value = "Scripting__New Custom Template")]
    pub menu: String,

    /// Default name of created scripts
    #[arg(long, default_value = "NewCustomScriptTemplate")]
    pub title: String,

    /// Extension of created scripts
    #[arg(long, default_value = "cs")]
    pub ext: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the custom template directory
    Init,

    /// List all templates
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print a template's content
    Show {
        /// Template file name
        #[arg(required = true)]
        name: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Create a new custom template
    New {
        /// Exact file name, instead of composing one from name parts
        #[arg(long, conflicts_with_all = ["order", "menu", "title", "ext"])]
        name: Option<String>,

        #[command(flatten)]
        parts: NameParts,

        /// Read the content from a file
        #[arg(long, conflicts_with = "from")]
        content_file: Option<PathBuf>,

        /// Start from the content of an existing template
        #[arg(long)]
        from: Option<String>,

        /// Overwrite an existing template without asking
        #[arg(short, long)]
        force: bool,
    },

    /// Copy a built-in template into the project so it can be edited
    Customize {
        /// Template file name
        #[arg(required = true)]
        name: String,
    },

    /// Delete a custom override and use the built-in template again
    Restore {
        /// Template file name
        #[arg(required = true)]
        name: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete an additional custom template
    Delete {
        /// Template file name
        #[arg(required = true)]
        name: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Edit a custom template and save the changes
    Edit {
        /// Template file name
        #[arg(required = true)]
        name: String,

        /// Take the new content from a file instead of opening $EDITOR
        #[arg(long)]
        content_file: Option<PathBuf>,
    },
}

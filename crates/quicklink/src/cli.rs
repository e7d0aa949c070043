//! Clap derive structures for the `quicklink` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// quicklink -- manage Home Assistant quick automation links
#[derive(Debug, Parser)]
#[command(
    name = "quicklink",
    version,
    about = "Manage Home Assistant quick automation links from the command line",
    long_about = "Browse, create and edit quick automation entries: links that make a\n\
        destination entity or device follow a source.\n\n\
        Talks to Home Assistant over its WebSocket API using a long-lived access token.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Instance profile to use
    #[arg(long, short = 'p', env = "QUICKLINK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Home Assistant URL (overrides profile)
    #[arg(long, short = 'u', env = "QUICKLINK_URL", global = true)]
    pub url: Option<String>,

    /// Long-lived access token
    #[arg(long, env = "QUICKLINK_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "QUICKLINK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "QUICKLINK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "QUICKLINK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse and edit quick automation entries
    #[command(alias = "e")]
    Entries(EntriesArgs),

    /// Inspect link types and preview link resolution
    #[command(alias = "l")]
    Links(LinksArgs),

    /// Check connectivity and authentication against the instance
    Status,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ENTRIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EntriesArgs {
    #[command(subcommand)]
    pub command: EntriesCommand,
}

#[derive(Debug, Subcommand)]
pub enum EntriesCommand {
    /// List stored entries
    #[command(alias = "ls")]
    List,

    /// Show an entry and its links
    Show {
        /// Entry ID
        entry: String,
    },

    /// Flip an entry between enabled and disabled
    Toggle {
        /// Entry ID
        entry: String,
    },

    /// Delete an entry
    #[command(alias = "rm")]
    Remove {
        /// Entry ID
        entry: String,
    },

    /// Create an entry linking a source to a destination
    Create {
        /// Source target (entity:<id>, device:<id>, or a bare entity id)
        #[arg(long, short = 's')]
        source: String,

        /// Destination target
        #[arg(long, short = 'd')]
        destination: String,

        #[command(flatten)]
        edits: EditFlags,
    },

    /// Edit an existing entry
    Edit {
        /// Entry ID
        entry: String,

        /// Replace the source target (links are re-resolved)
        #[arg(long, short = 's')]
        source: Option<String>,

        /// Replace the destination target (links are re-resolved)
        #[arg(long, short = 'd')]
        destination: Option<String>,

        #[command(flatten)]
        edits: EditFlags,
    },
}

/// Field edits shared by `entries create` and `entries edit`.
///
/// Link options address a link by its type identifier (`on_off`,
/// `brightness`, `left_right`, `toggle`).
#[derive(Debug, Default, Args)]
pub struct EditFlags {
    /// Entry title (defaults to the resolver's suggestion)
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// Save the entry disabled
    #[arg(long, conflicts_with = "enabled")]
    pub disabled: bool,

    /// Save the entry enabled
    #[arg(long)]
    pub enabled: bool,

    /// Enable a link
    #[arg(long = "enable", value_name = "TYPE")]
    pub enable_links: Vec<String>,

    /// Disable a link
    #[arg(long = "disable", value_name = "TYPE")]
    pub disable_links: Vec<String>,

    /// Reverse a link's direction
    #[arg(long = "reverse", value_name = "TYPE")]
    pub reverse: Vec<String>,

    /// Restore a link's default direction
    #[arg(long = "no-reverse", value_name = "TYPE")]
    pub no_reverse: Vec<String>,

    /// Pick a trigger option (TYPE=OPTION, empty OPTION clears it)
    #[arg(long, value_name = "TYPE=OPTION")]
    pub trigger: Vec<String>,

    /// Attach YAML extra data (TYPE=YAML or TYPE=@FILE, empty clears it)
    #[arg(long, value_name = "TYPE=YAML")]
    pub extra: Vec<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LINKS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LinksArgs {
    #[command(subcommand)]
    pub command: LinksCommand,
}

#[derive(Debug, Subcommand)]
pub enum LinksCommand {
    /// Ask the instance which links fit a source and destination
    Resolve {
        /// Source target
        #[arg(long, short = 's')]
        source: String,

        /// Destination target
        #[arg(long, short = 'd')]
        destination: String,
    },

    /// List known link types
    Types,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Store an access token in the system keyring
    SetToken {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,

    /// Write to a directory instead of stdout
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

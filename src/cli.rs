use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use reconcile::Mode;

use crate::paths::DEFAULT_PREFIX;

#[derive(Parser)]
#[command(name = "helm-bulk")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(
    about = "Save deployed Helm releases to a file and load them back into a cluster",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Snapshot file prefix (writes <prefix>.tar.gz)
    #[arg(
        short,
        long,
        global = true,
        env = "HELM_BULK_FILE_PREFIX",
        default_value = DEFAULT_PREFIX
    )]
    pub file_prefix: String,

    /// Directory holding the orderPref file
    #[arg(short = 'c', long, global = true, default_value = ".")]
    pub order_pref_config_dir: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Save every deployed release to the snapshot file
    Save,

    /// Restore the releases in the snapshot file into the cluster
    Load(LoadArgs),

    /// Print the releases stored in the snapshot file
    Show,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Load
// ============================================================================

#[derive(Args)]
pub struct LoadArgs {
    /// Upgrade releases that already exist in the cluster
    #[arg(short, long, conflicts_with = "delete")]
    pub upgrade: bool,

    /// Purge releases that already exist in the cluster, then reinstall them
    #[arg(short, long)]
    pub delete: bool,

    /// Dry run - show what would be done
    #[arg(short = 'r', long)]
    pub dry_run: bool,
}

impl LoadArgs {
    pub fn mode(&self) -> Mode {
        if self.delete {
            Mode::Delete
        } else if self.upgrade {
            Mode::Upgrade
        } else {
            Mode::InstallOnly
        }
    }
}

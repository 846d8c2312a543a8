use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::process::ExitCode;

use hostswap::{
    commands,
    paths::Paths,
    profiles::ProfileStore,
    ui::{ColorMode, Ui},
};

#[derive(Parser)]
#[command(name = "hostswap")]
#[command(about = "Hosts File Profile Switcher - keep named variants of the system hosts file and swap between them")]
#[command(version)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// When to use colors
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Log what hostswap does to stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every mapping as "ip domain" (comments are skipped)
    List {
        /// Read a saved profile instead of the live hosts file
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,

        /// Print mappings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Map a domain to an IP address
    Add {
        ip: String,
        domain: String,

        /// Edit a saved profile instead of the live hosts file
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },

    /// Remove the mapping for a domain
    Remove {
        domain: String,

        /// Edit a saved profile instead of the live hosts file
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },

    /// List saved profiles and show which one is current
    Profiles {
        /// Print profiles as JSON
        #[arg(long)]
        json: bool,
    },

    /// Activate a profile (overwrite the live hosts file with it)
    Use {
        /// Name of the profile to activate
        name: String,
    },

    /// Save the live hosts file as a profile
    Save {
        /// Name of the profile to create
        name: String,

        /// Overwrite an existing profile with the same name
        #[arg(long)]
        force: bool,
    },

    /// Copy a profile under a new name
    Copy {
        /// Profile to copy
        source: String,
        /// Name of the new profile
        new_name: String,
    },

    /// Create a new profile containing only a comment
    New {
        /// Name of the profile to create
        name: String,

        /// Text of the initial comment line
        #[arg(long)]
        note: Option<String>,
    },

    /// Delete a profile
    Delete {
        /// Name of the profile to delete
        name: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Print a profile's content
    Show {
        /// Name of the profile to show
        name: String,
    },

    /// Open a profile in your editor
    Edit {
        /// Name of the profile to edit
        name: String,
    },

    /// Run diagnostics on the hostswap setup
    Doctor,

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    hostswap::logging::init(cli.verbose);
    let ui = Ui::new(cli.color, cli.no_color);

    match run(cli, &ui) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui.err(format!("{:#}", e));
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli, ui: &Ui) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "hostswap", &mut std::io::stdout());
        return Ok(());
    }

    let paths = Paths::new()?;
    paths.ensure_dirs()?;
    let store = ProfileStore::from_paths(&paths);

    match cli.command {
        Commands::List { profile, json } => commands::list(&store, profile.as_deref(), json, ui),
        Commands::Add { ip, domain, profile } => {
            commands::add(&store, &ip, &domain, profile.as_deref(), ui)
        }
        Commands::Remove { domain, profile } => {
            commands::remove(&store, &domain, profile.as_deref(), ui)
        }
        Commands::Profiles { json } => commands::profiles(&store, json, ui),
        Commands::Use { name } => commands::use_profile(&store, &name, ui),
        Commands::Save { name, force } => commands::save(&store, &name, force, ui),
        Commands::Copy { source, new_name } => commands::copy(&store, &source, &new_name, ui),
        Commands::New { name, note } => commands::new_profile(&store, &name, note.as_deref(), ui),
        Commands::Delete { name, force } => commands::delete(&store, &name, force, ui),
        Commands::Show { name } => commands::show(&store, &name, ui),
        Commands::Edit { name } => commands::edit(&store, &name, ui),
        Commands::Doctor => commands::doctor(&paths, &store, ui),
        Commands::Completions { .. } => Ok(()),
    }
}

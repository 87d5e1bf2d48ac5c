// ABOUTME: Command-line surface: parses flags into a single action and runs it against storage
// ABOUTME: Management actions print a confirmation; connecting hands the process to ssh

use crate::config::Config;
use crate::ssh::SshLauncher;
use crate::ssh::export::{config_stanza, listing_line};
use crate::storage::{ConnectionRecord, Storage, StorageError};
use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "sshort")]
#[command(version)]
#[command(about = "SSH connection helper: short aliases for user@host targets", long_about = None)]
pub struct Args {
    /// Name of the stored connection to open
    pub name: Option<String>,

    /// Name of the sshort connection to create
    #[arg(short, long, value_name = "NAME", requires = "target", help_heading = "Creating new sshort connection")]
    pub store: Option<String>,

    /// SSH connection target, ie. user@host.com
    #[arg(short, long, requires = "store", help_heading = "Creating new sshort connection")]
    pub target: Option<String>,

    /// Optional ssh parameters for the connection
    #[arg(
        short,
        long,
        value_name = "PARAMS",
        requires = "store",
        allow_hyphen_values = true,
        help_heading = "Creating new sshort connection"
    )]
    pub params: Option<String>,

    /// Name of the sshort connection to delete
    #[arg(short, long, value_name = "NAME")]
    pub remove: Option<String>,

    /// List all saved sshort connections
    #[arg(short, long)]
    pub list: bool,

    /// Print one connection in ~/.ssh/config format
    #[arg(short, long, value_name = "NAME")]
    pub export: Option<String>,

    /// Print all connections in ~/.ssh/config format
    #[arg(short = 'x', long)]
    pub export_all: bool,

    /// Configuration file (default: <config dir>/sshort/config.toml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Alias file to use instead of the configured one
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Write a default configuration file (to --config or the default location)
    #[arg(long)]
    pub init_config: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Connect(String),
    List,
    Export(String),
    ExportAll,
    Store(ConnectionRecord),
    Remove(String),
    InitConfig,
    Help,
}

/// What is left to do once storage has been consulted.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Done,
    NotFound,
    Launch(ConnectionRecord),
}

impl Args {
    pub fn action(&self) -> Action {
        if let Some(name) = &self.name {
            return Action::Connect(name.clone());
        }
        if self.list {
            return Action::List;
        }
        if let Some(name) = &self.export {
            return Action::Export(name.clone());
        }
        if self.export_all {
            return Action::ExportAll;
        }
        if let (Some(name), Some(target)) = (&self.store, &self.target) {
            return Action::Store(ConnectionRecord::new(
                name.clone(),
                target.clone(),
                self.params.clone(),
            ));
        }
        if let Some(name) = &self.remove {
            return Action::Remove(name.clone());
        }
        if self.init_config {
            return Action::InitConfig;
        }
        Action::Help
    }
}

pub fn run(args: Args) -> Result<ExitCode> {
    let action = args.action();
    if action == Action::Help {
        Args::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    }
    if action == Action::InitConfig {
        let path = match &args.config {
            Some(path) => path.clone(),
            None => Config::default_config_path()?,
        };
        Config::save_default_config(&path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let config = Config::load(args.config.as_deref(), args.file.as_deref())?;

    let mut storage = Storage::open(config.storage_path())?;
    tracing::debug!("Using storage file {}", storage.path().display());
    let stdout = io::stdout();
    let stderr = io::stderr();

    let outcome = dispatch(action, &mut storage, &mut stdout.lock(), &mut stderr.lock())?;
    match outcome {
        Outcome::Done | Outcome::NotFound => Ok(ExitCode::from(exit_status(&outcome))),
        Outcome::Launch(record) => {
            {
                let mut out = stdout.lock();
                writeln!(out, "Executing connection {}", record.name)?;
                out.flush()?;
            }

            SshLauncher::new(config.ssh).execute(&record)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

pub fn dispatch(
    action: Action,
    storage: &mut Storage,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<Outcome> {
    match action {
        Action::Connect(name) => match storage.get(&name) {
            Ok(record) => Ok(Outcome::Launch(record.clone())),
            Err(e) => not_found(e, err),
        },
        Action::List => {
            for record in storage.connections() {
                writeln!(out, "{}", listing_line(record))?;
            }
            Ok(Outcome::Done)
        }
        Action::Export(name) => match storage.get(&name) {
            Ok(record) => {
                write!(out, "{}", config_stanza(record))?;
                Ok(Outcome::Done)
            }
            Err(e) => not_found(e, err),
        },
        Action::ExportAll => {
            for record in storage.connections() {
                write!(out, "{}", config_stanza(record))?;
            }
            Ok(Outcome::Done)
        }
        Action::Store(record) => {
            let name = record.name.clone();
            if storage.store(record)? {
                writeln!(out, "Saved connection {name}")?;
            } else {
                writeln!(out, "Connection {name} already exists")?;
            }
            Ok(Outcome::Done)
        }
        Action::Remove(name) => {
            if storage.remove(&name)? {
                writeln!(out, "Deleted connection {name}")?;
            } else {
                writeln!(out, "Connection {name} is not defined")?;
            }
            Ok(Outcome::Done)
        }
        Action::InitConfig | Action::Help => Ok(Outcome::Done),
    }
}

/// Process exit status for an outcome that does not hand off to ssh.
/// An unknown alias is reported as a failure.
pub fn exit_status(outcome: &Outcome) -> u8 {
    match outcome {
        Outcome::Done | Outcome::Launch(_) => 0,
        Outcome::NotFound => 1,
    }
}

fn not_found(e: StorageError, err: &mut impl Write) -> Result<Outcome> {
    tracing::debug!("Lookup failed: {e}");
    writeln!(err, "{e}")?;
    Ok(Outcome::NotFound)
}

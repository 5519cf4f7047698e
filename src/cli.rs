use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use sched2cal_schools::{School, SemesterSelection};

#[derive(Debug, Parser)]
#[command(name = "sched2cal", version, about = "Import a university timetable into Google Calendar")]
pub struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "SCHED2CAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Without a command the tool asks for everything interactively
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a calendar holding this term's classes
    Import(SyncArgs),
    /// Replace the classes in an existing calendar
    Update(SyncArgs),
    /// List the calendars of the signed-in Google account
    Calendars,
    /// Write every event of a calendar to a JSON file
    Export {
        #[arg(long)]
        calendar: String,
        #[arg(short, long, default_value = "response.json")]
        output: PathBuf,
    },
    /// Rename a calendar
    Rename {
        #[arg(long)]
        calendar: String,
        #[arg(long)]
        to: String,
    },
    /// Forget the stored Google token
    SignOut,
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    #[arg(long, value_enum)]
    pub school: SchoolArg,

    /// Calendar name; defaults to the configured one
    #[arg(long)]
    pub calendar: Option<String>,

    /// Semester code as the portal lists it; defaults to the first listed
    #[arg(long)]
    pub semester: Option<String>,

    /// Academic year, for portals that group terms by year
    #[arg(long)]
    pub year: Option<String>,

    /// Print the events as JSON instead of touching Google Calendar
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, env = "SCHOOL_USERNAME")]
    pub username: String,

    #[arg(long, env = "SCHOOL_PASSWORD", hide_env_values = true)]
    pub password: String,
}

impl SyncArgs {
    pub fn selection(&self) -> SemesterSelection {
        SemesterSelection::new(self.semester.clone().unwrap_or_default(), self.year.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchoolArg {
    Sgu,
    Huflit,
}

impl From<SchoolArg> for School {
    fn from(arg: SchoolArg) -> Self {
        match arg {
            SchoolArg::Sgu => School::Sgu,
            SchoolArg::Huflit => School::Huflit,
        }
    }
}

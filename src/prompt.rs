//! Interactive prompts used when no subcommand is given.

use anyhow::{Context, Result};
use dialoguer::{Input, Password, Select};

use sched2cal_schools::{Credentials, School, SemesterOptions, SemesterSelection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Import,
    Update,
    Exit,
}

impl Mode {
    const ALL: [Mode; 3] = [Mode::Import, Mode::Update, Mode::Exit];

    fn label(self) -> &'static str {
        match self {
            Mode::Import => "Import",
            Mode::Update => "Update",
            Mode::Exit => "Exit",
        }
    }
}

fn select<T: Copy>(prompt: &str, items: &[T], label: impl Fn(T) -> String) -> Result<T> {
    let labels: Vec<String> = items.iter().copied().map(label).collect();
    let index = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()
        .context("Prompt cancelled")?;
    items
        .get(index)
        .copied()
        .context("Selection out of range")
}

pub fn school() -> Result<School> {
    select("School", &School::ALL, |s| s.name().to_string())
}

pub fn mode() -> Result<Mode> {
    select("Mode", &Mode::ALL, |m| m.label().to_string())
}

pub fn calendar_name(default: &str) -> Result<String> {
    Input::new()
        .with_prompt("Calendar name")
        .default(default.to_string())
        .interact_text()
        .context("Prompt cancelled")
}

/// Username and password, skipping whichever the environment already has.
pub fn credentials(username: Option<String>, password: Option<String>) -> Result<Credentials> {
    let username = match username {
        Some(u) => u,
        None => Input::new()
            .with_prompt("Username")
            .interact_text()
            .context("Prompt cancelled")?,
    };
    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .context("Prompt cancelled")?,
    };
    Ok(Credentials::new(username, password))
}

fn pick_one(prompt: &str, values: &[String]) -> Result<String> {
    let index = Select::new()
        .with_prompt(prompt)
        .items(values)
        .default(0)
        .interact()
        .context("Prompt cancelled")?;
    values.get(index).cloned().context("Selection out of range")
}

/// Semester (and year, when offered) from the portal's lists.
pub fn semester(options: &SemesterOptions) -> Result<SemesterSelection> {
    let semester = if options.semesters.is_empty() {
        String::new()
    } else {
        pick_one("Semester", &options.semesters)?
    };

    let year = match &options.years {
        Some(years) if !years.is_empty() => Some(pick_one("Year", years)?),
        _ => None,
    };

    Ok(SemesterSelection::new(semester, year))
}

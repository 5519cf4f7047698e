mod cli;
mod error_mapping;
mod planner;
mod prompt;
mod sync;

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use sched2cal_auth::{ClientSecrets, GoogleAuth, TokenStore};
use sched2cal_calendar::{CalendarClient, RetryConfig};
use sched2cal_core::{AppError, Config};
use sched2cal_schools::{
    Credentials, HuflitPortal, School, SchoolPortal, SemesterOptions, SguPortal,
};

use cli::{Cli, Command, SyncArgs};
use prompt::Mode;
use sync::{Action, SemesterChoice, SyncOutcome};

/// Everything a sync run needs besides the Google connection.
struct SyncJob<'a> {
    action: Action,
    school: School,
    credentials: Credentials,
    calendar_name: String,
    choice: SemesterChoice<'a>,
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = sched2cal_core::init(cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn report(error: &anyhow::Error) {
    tracing::debug!("{:?}", error);

    match error.downcast_ref::<AppError>() {
        Some(AppError::Calendar(message)) => eprintln!("{}", message),
        Some(AppError::Config(e)) => eprintln!("{}\n{}", e.user_message(), e),
        Some(app) => eprintln!("{}", app.user_message()),
        None => eprintln!("Error: {:#}", error),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_validated(cli.config.as_deref())?;

    match cli.command {
        None => interactive(&config).await,
        Some(Command::Import(args)) => run_sync_args(&config, Action::Import, args).await,
        Some(Command::Update(args)) => run_sync_args(&config, Action::Update, args).await,
        Some(Command::Calendars) => {
            let client = calendar_client(&config).await?;
            let calendars = client
                .list_calendars()
                .await
                .map_err(error_mapping::calendar)?;
            for calendar in calendars {
                println!("{}\t{}", calendar.summary, calendar.id);
            }
            Ok(())
        }
        Some(Command::Export { calendar, output }) => {
            let client = calendar_client(&config).await?;
            export(&client, &calendar, &output).await
        }
        Some(Command::Rename { calendar, to }) => {
            let client = calendar_client(&config).await?;
            client
                .rename_calendar(&calendar, &to)
                .await
                .map_err(error_mapping::calendar)?;
            println!("Renamed {} to {}", calendar, to);
            Ok(())
        }
        Some(Command::SignOut) => {
            TokenStore::new(config.token_path())
                .delete()
                .map_err(AppError::from)?;
            println!("Signed out of Google");
            Ok(())
        }
    }
}

async fn interactive(config: &Config) -> Result<()> {
    let school = prompt::school()?;
    let action = match prompt::mode()? {
        Mode::Import => Action::Import,
        Mode::Update => Action::Update,
        Mode::Exit => return Ok(()),
    };
    let calendar_name = prompt::calendar_name(&config.calendar.default_name)?;

    // Checked before asking for school credentials
    let client = calendar_client(config).await?;
    if let Some(outcome) = sync::precheck(&client, action, &calendar_name).await? {
        return print_outcome(&calendar_name, outcome);
    }

    let credentials = prompt::credentials(
        std::env::var("SCHOOL_USERNAME").ok(),
        std::env::var("SCHOOL_PASSWORD").ok(),
    )?;

    let ask = |options: &SemesterOptions| prompt::semester(options);
    let job = SyncJob {
        action,
        school,
        credentials,
        calendar_name,
        choice: SemesterChoice::Ask(&ask),
        dry_run: false,
    };
    run_sync(config, job).await
}

async fn run_sync_args(config: &Config, action: Action, args: SyncArgs) -> Result<()> {
    let choice = SemesterChoice::Given(args.selection());
    let job = SyncJob {
        action,
        school: args.school.into(),
        credentials: Credentials::new(args.username, args.password),
        calendar_name: args
            .calendar
            .unwrap_or_else(|| config.calendar.default_name.clone()),
        choice,
        dry_run: args.dry_run,
    };
    run_sync(config, job).await
}

async fn run_sync(config: &Config, job: SyncJob<'_>) -> Result<()> {
    match job.school {
        School::Sgu => {
            let mut portal = SguPortal::new(&config.sgu, &config.http, job.credentials.clone())
                .map_err(AppError::from)?;
            let outcome = sync_with(&mut portal, config, &job).await?;
            if let Some(name) = portal.student_name() {
                tracing::info!("Schedule of {}", name);
            }
            print_outcome(&job.calendar_name, outcome)
        }
        School::Huflit => {
            let mut portal =
                HuflitPortal::new(&config.huflit, &config.http, job.credentials.clone())
                    .map_err(AppError::from)?;
            let outcome = sync_with(&mut portal, config, &job).await?;
            print_outcome(&job.calendar_name, outcome)
        }
    }
}

async fn sync_with<P: SchoolPortal>(
    portal: &mut P,
    config: &Config,
    job: &SyncJob<'_>,
) -> Result<SyncOutcome> {
    if job.dry_run {
        return Ok(sync::preview(portal, &job.choice, &config.calendar).await?);
    }

    let client = calendar_client(config).await?;
    let outcome = match job.action {
        Action::Import => {
            sync::import(
                portal,
                &job.choice,
                &client,
                &config.calendar,
                &job.calendar_name,
            )
            .await?
        }
        Action::Update => {
            sync::update(
                portal,
                &job.choice,
                &client,
                &config.calendar,
                &job.calendar_name,
            )
            .await?
        }
    };
    Ok(outcome)
}

fn print_outcome(calendar_name: &str, outcome: SyncOutcome) -> Result<()> {
    match outcome {
        SyncOutcome::Imported(n) => {
            println!("Imported {} classes into {}", n, calendar_name)
        }
        SyncOutcome::Updated(n) => {
            println!("Updated {} with {} classes", calendar_name, n)
        }
        SyncOutcome::AlreadyExists => println!(
            "Calendar {} already exists. Use update to replace it.",
            calendar_name
        ),
        SyncOutcome::Missing => println!(
            "Calendar {} does not exist. Use import to create it.",
            calendar_name
        ),
        SyncOutcome::NoSchedule => println!("No schedule is published for that term."),
        SyncOutcome::DryRun(events) => {
            let json = serde_json::to_string_pretty(&events).context("Failed to encode events")?;
            println!("{}", json);
        }
    }
    Ok(())
}

async fn calendar_client(config: &Config) -> Result<CalendarClient> {
    let secrets = ClientSecrets::resolve(
        &config.credentials_path(),
        config.google.client_id.as_deref(),
        config.google.client_secret.as_deref(),
    )
    .map_err(AppError::from)?;

    let auth = GoogleAuth::new(
        secrets,
        TokenStore::new(config.token_path()),
        config.google.callback_port,
    );
    let token = auth.access_token().await.map_err(AppError::from)?;

    let client = CalendarClient::new(&token)
        .with_retry(RetryConfig::new(config.http.max_retries, 500, 10_000))
        .with_timeout(Duration::from_secs(config.http.timeout_secs))
        .map_err(error_mapping::calendar)?;
    Ok(client)
}

async fn export(client: &CalendarClient, calendar: &str, output: &Path) -> Result<()> {
    let calendar_id = client
        .find_calendar_id(calendar)
        .await
        .map_err(error_mapping::calendar)?;
    let events = client
        .list_events(&calendar_id)
        .await
        .map_err(error_mapping::calendar)?;

    let json = serde_json::to_string_pretty(&events).context("Failed to encode events")?;
    std::fs::write(output, json)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Wrote {} events to {}", events.len(), output.display());
    Ok(())
}

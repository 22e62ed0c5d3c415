//! `birthday-tracker` command line entry point.
//!
//! # Responsibility
//! - Map subcommands onto `birthday_core` services.
//! - Own the tokio runtime that drives the daily reminder timer.

mod config;
mod console;

use anyhow::{bail, Context, Result};
use birthday_core::occurrence::classifier::{distinct_groups, grouped_list_view, list_view};
use birthday_core::occurrence::format::format_date;
use birthday_core::transfer::export::{
    export_file_name, write_csv, write_template, TEMPLATE_FILE_NAME,
};
use birthday_core::transfer::import::import_file;
use birthday_core::{
    Dashboard, LocalClock, NotificationSettings, PeopleFilter, PeopleService, PeopleStore,
    Permission, Person, PersonDraft, PersonId, ReminderScheduler, SortOrder,
    SqliteStorageRepository,
};
use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{print_report, print_section, person_line, ConsoleAlertFacility};
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "birthday-tracker", version, about = "Track birthdays and get reminded")]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// trace, debug, info, warn or error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Today's, tomorrow's and this week's birthdays
    Dashboard,
    /// List people
    List(ListArgs),
    /// Distinct roles and groups
    Groups,
    /// Add a person
    Add(PersonArgs),
    /// Edit a person; omitted fields keep their value
    Edit {
        id: String,
        #[command(flatten)]
        fields: EditArgs,
    },
    /// Remove a person
    Remove { id: String },
    /// Mark today's birthday as celebrated
    Celebrate {
        id: String,
        /// Clear the celebrated flag instead
        #[arg(long)]
        undo: bool,
    },
    /// Append people from a CSV or Excel file
    Import { file: PathBuf },
    /// Write people to a CSV file
    Export {
        file: Option<PathBuf>,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Write the blank import template
    Template { file: Option<PathBuf> },
    /// Show or change notification settings
    Settings(SettingsArgs),
    /// Run one reminder pass now
    Check,
    /// Run the daily reminder scheduler until Ctrl-C
    Watch {
        /// Local time of the daily check, HH:MM
        #[arg(long, value_parser = parse_check_time)]
        at: Option<NaiveTime>,
    },
    /// Delete all people and reset settings
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Name or group substring
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    group: Option<String>,
    /// Birth month, 1-12
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,
}

impl From<FilterArgs> for PeopleFilter {
    fn from(value: FilterArgs) -> Self {
        Self {
            search: value.search,
            group: value.group,
            month: value.month,
        }
    }
}

#[derive(Args)]
struct ListArgs {
    #[command(flatten)]
    filter: FilterArgs,
    #[arg(long, value_enum, default_value_t = SortArg::Upcoming)]
    sort: SortArg,
    /// Group the output by birth month
    #[arg(long)]
    by_month: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Upcoming,
    Name,
    Age,
}

impl From<SortArg> for SortOrder {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Upcoming => Self::Upcoming,
            SortArg::Name => Self::Name,
            SortArg::Age => Self::Age,
        }
    }
}

#[derive(Args)]
struct PersonArgs {
    #[arg(long)]
    name: String,
    /// YYYY-MM-DD
    #[arg(long)]
    date: String,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    group: String,
    /// Image data URL
    #[arg(long)]
    photo: Option<String>,
}

#[derive(Args)]
struct EditArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    date: Option<String>,
    /// Pass an empty value to clear
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    group: Option<String>,
    #[arg(long)]
    photo: Option<String>,
}

#[derive(Args)]
struct SettingsArgs {
    #[arg(long, conflicts_with = "disable")]
    enable: bool,
    #[arg(long)]
    disable: bool,
    #[arg(long)]
    days_before: Option<u32>,
}

type Service = PeopleService<SqliteStorageRepository>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    config::start_logging(cli.log_level.as_deref(), cli.log_dir.as_deref())?;

    let db_path = config::resolve_db_path(cli.db);
    let repo = SqliteStorageRepository::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    let service = PeopleService::new(Arc::new(PeopleStore::new(repo)));
    let today = Local::now().date_naive();
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        db_path.display()
    );

    match cli.command {
        Command::Dashboard => dashboard(&service, today),
        Command::List(args) => list(&service, args, today),
        Command::Groups => {
            for group in distinct_groups(&service.people()) {
                println!("{group}");
            }
        }
        Command::Add(args) => {
            let person = service.add_person(PersonDraft {
                full_name: args.name,
                date_of_birth: args.date,
                phone_number: args.phone,
                role_or_group: args.group,
                photo: args.photo,
                celebrated: Some(false),
            })?;
            println!("added {}", person_line(&person, today));
        }
        Command::Edit { id, fields } => {
            let id = PersonId::from(id);
            let current = service
                .find(&id)
                .with_context(|| format!("person not found: {id}"))?;
            let mut draft = current.to_draft();
            if let Some(name) = fields.name {
                draft.full_name = name;
            }
            if let Some(date) = fields.date {
                draft.date_of_birth = date;
            }
            if let Some(phone) = fields.phone {
                draft.phone_number = Some(phone);
            }
            if let Some(group) = fields.group {
                draft.role_or_group = group;
            }
            if let Some(photo) = fields.photo {
                draft.photo = Some(photo);
            }
            let person = service.update_person(&id, draft)?;
            println!(
                "updated {} (born {})",
                person_line(&person, today),
                format_date(&person.date_of_birth)
            );
        }
        Command::Remove { id } => {
            service.delete_person(&PersonId::from(id.as_str()))?;
            println!("removed {id}");
        }
        Command::Celebrate { id, undo } => {
            let person = service.mark_celebrated(&PersonId::from(id), !undo)?;
            println!("{}", person_line(&person, today));
        }
        Command::Import { file } => {
            let people = import_file(&file)
                .with_context(|| format!("failed to import {}", file.display()))?;
            let count = service.import_people(people)?;
            println!("imported {count} people");
        }
        Command::Export { file, filter } => {
            let path = file.unwrap_or_else(|| PathBuf::from(export_file_name(today)));
            let everyone = service.people();
            let people: Vec<Person> = PeopleFilter::from(filter)
                .select(&everyone)
                .into_iter()
                .cloned()
                .collect();
            write_csv(&people, BufWriter::new(create(&path)?))?;
            println!("exported {} people to {}", people.len(), path.display());
        }
        Command::Template { file } => {
            let path = file.unwrap_or_else(|| PathBuf::from(TEMPLATE_FILE_NAME));
            write_template(BufWriter::new(create(&path)?))?;
            println!("template written to {}", path.display());
        }
        Command::Settings(args) => settings(&service, args)?,
        Command::Check => {
            let report = scheduler(&service).run_pass();
            print_report(&report);
        }
        Command::Watch { at } => watch(&service, at).await?,
        Command::Clear { yes } => {
            if !yes {
                bail!("refusing to clear without --yes");
            }
            service.clear_all()?;
            println!("all data cleared");
        }
    }
    Ok(())
}

fn dashboard(service: &Service, today: NaiveDate) {
    let people = service.people();
    let view = Dashboard::build(&people, today);

    println!(
        "{} people, {} this week, {} in the next 30 days",
        view.total_count, view.this_week_count, view.upcoming_count
    );
    print_section("Today", &view.today, today);
    print_section("Tomorrow", &view.tomorrow, today);
    print_section("This week", &view.this_week, today);
}

fn list(service: &Service, args: ListArgs, today: NaiveDate) {
    let people = service.people();
    let filter = PeopleFilter::from(args.filter);
    if args.by_month {
        for group in grouped_list_view(&people, &filter, args.sort.into(), today) {
            print_section(group.month, &group.people, today);
        }
        return;
    }

    for person in list_view(&people, &filter, args.sort.into(), today) {
        println!("{}", person_line(person, today));
    }
}

fn settings(service: &Service, args: SettingsArgs) -> Result<()> {
    let current = service.settings();
    let enabled = if args.enable {
        true
    } else if args.disable {
        false
    } else {
        current.enabled
    };
    let updated = NotificationSettings {
        enabled,
        days_before: args.days_before.unwrap_or(current.days_before),
    };
    if updated != current {
        service.update_settings(updated)?;
    }

    let state = if updated.enabled { "enabled" } else { "disabled" };
    println!(
        "notifications {state}, reminder {} days before",
        updated.days_before
    );
    Ok(())
}

fn scheduler(service: &Service) -> ReminderScheduler {
    ReminderScheduler::new(
        service.store(),
        Arc::new(ConsoleAlertFacility),
        Arc::new(LocalClock),
    )
}

async fn watch(service: &Service, at: Option<NaiveTime>) -> Result<()> {
    let mut scheduler = scheduler(service);
    if let Some(check_time) = at {
        scheduler = scheduler.with_check_time(check_time);
    }
    if scheduler.request_permission() != Permission::Granted {
        println!("alerts are not permitted; passes will run without showing them");
    }
    let report = scheduler.schedule()?;
    print_report(&report);
    println!("watching for birthdays; press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    scheduler.cancel();
    println!("stopped after {} passes", scheduler.passes_run());
    Ok(())
}

fn create(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("failed to create {}", path.display()))
}

fn parse_check_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|err| format!("expected HH:MM, got `{value}`: {err}"))
}

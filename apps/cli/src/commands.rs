use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use studylog_core::{
    Category, Granularity, MetricKind, UserIdentity,
    dates::{format_iso, parse_iso, today},
    store::{MetricSink, MetricSource},
    timer::{TimerBoard, TimerEvent, format_duration},
    water::WaterLog,
};
use tracing::info;

use crate::state::{AppError, AppState};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Aggregated statistics for the week or the four weeks ending on a date.
    Stats {
        granularity: Granularity,
        #[arg(long, value_parser = parse_iso)]
        date: Option<NaiveDate>,
        /// Include averages, productivity score and insights.
        #[arg(long)]
        summary: bool,
    },
    /// Record a daily value, replacing any value already logged for that day.
    Log {
        metric: MetricKind,
        value: f64,
        #[arg(long, value_parser = parse_iso)]
        date: Option<NaiveDate>,
    },
    Water(WaterArgs),
    #[command(subcommand)]
    Timer(TimerCommand),
}

#[derive(Debug, Args)]
pub struct WaterArgs {
    #[command(subcommand)]
    pub action: WaterAction,
    #[arg(long, global = true, value_parser = parse_iso)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
pub enum WaterAction {
    Add,
    Remove,
    Set { glasses: u32 },
    Summary,
    /// Daily glasses and intensity levels for the configured number of weeks.
    Graph,
}

#[derive(Debug, Subcommand)]
pub enum TimerCommand {
    Start {
        title: String,
        #[arg(long, default_value = "study")]
        category: Category,
    },
    /// Stops the given entry, or the running one.
    Stop { id: Option<String> },
    Resume { id: String },
    Delete { id: String },
    List {
        #[arg(long, value_parser = parse_iso)]
        date: Option<NaiveDate>,
    },
}

#[derive(Serialize)]
struct TimerListing {
    date: String,
    total: String,
    active: Option<String>,
    entries: Vec<TimerRow>,
}

#[derive(Serialize)]
struct TimerRow {
    id: String,
    title: String,
    category: Category,
    elapsed: String,
    running: bool,
}

pub async fn run(
    command: Command,
    state: &AppState,
    user: Option<&UserIdentity>,
) -> Result<String, AppError> {
    match command {
        Command::Stats {
            granularity,
            date,
            summary,
        } => {
            let output = if summary {
                serde_json::to_string_pretty(
                    &state.service.report(user, date, granularity).await?,
                )?
            } else {
                serde_json::to_string_pretty(
                    &state
                        .service
                        .productivity_data(user, date, granularity)
                        .await?,
                )?
            };
            Ok(output)
        }
        Command::Log {
            metric,
            value,
            date,
        } => {
            let user = user.ok_or(AppError::MissingUser)?;
            let day = format_iso(date.unwrap_or_else(|| local_today(state)));
            state
                .store()
                .upsert_daily_metric(metric, &user.id, &day, value)
                .await?;
            state.save()?;
            info!(%metric, %day, value, "daily value logged");
            Ok(format!("{metric} {day}: {value}"))
        }
        Command::Water(args) => water(args, state, user.ok_or(AppError::MissingUser)?).await,
        Command::Timer(command) => timer(command, state, user.ok_or(AppError::MissingUser)?).await,
    }
}

fn local_today(state: &AppState) -> NaiveDate {
    today(state.settings().offset())
}

async fn water(args: WaterArgs, state: &AppState, user: &UserIdentity) -> Result<String, AppError> {
    let day = args.date.unwrap_or_else(|| local_today(state));
    let records = state
        .store()
        .daily_metrics(MetricKind::Water, &user.id, "0000-01-01", "9999-12-31")
        .await?;
    let mut log = WaterLog::with_days(
        state.settings().water.clone(),
        records.into_iter().filter_map(|record| {
            let date = parse_iso(&record.date).ok()?;
            Some((date, record.value.max(0.0).round() as u32))
        }),
    );

    let glasses = match args.action {
        WaterAction::Add => log.increment(day),
        WaterAction::Remove => log.decrement(day),
        WaterAction::Set { glasses } => {
            log.set(day, glasses)?;
            glasses
        }
        WaterAction::Summary => {
            return Ok(serde_json::to_string_pretty(&log.summary(day))?);
        }
        WaterAction::Graph => {
            return Ok(serde_json::to_string_pretty(&log.graph(day))?);
        }
    };

    state
        .store()
        .upsert_daily_metric(MetricKind::Water, &user.id, &format_iso(day), f64::from(glasses))
        .await?;
    state.save()?;
    Ok(format!("water {}: {glasses} glasses", format_iso(day)))
}

async fn timer(
    command: TimerCommand,
    state: &AppState,
    user: &UserIdentity,
) -> Result<String, AppError> {
    let now = Utc::now();
    let mut board = TimerBoard::new(&user.id, state.store().list_time_entries(&user.id).await?);

    let events = match command {
        TimerCommand::Start { title, category } => board.start(&title, category, now)?,
        TimerCommand::Stop { id } => {
            let id = match id {
                Some(id) => id,
                None => match board.active() {
                    Some(active) => active.id.clone(),
                    None => return Ok("no timer running".to_string()),
                },
            };
            board.stop(&id, now)
        }
        TimerCommand::Resume { id } => board.resume(&id, now)?,
        TimerCommand::Delete { id } => board.delete(&id, now)?,
        TimerCommand::List { date } => {
            let offset = state.settings().offset();
            let day = date.unwrap_or_else(|| local_today(state));
            let listing = TimerListing {
                date: format_iso(day),
                total: format_duration(board.total_on(day, offset, now)),
                active: board.active().map(|entry| entry.title.clone()),
                entries: board
                    .entries_on(day, offset)
                    .into_iter()
                    .map(|entry| TimerRow {
                        id: entry.id.clone(),
                        title: entry.title.clone(),
                        category: entry.category,
                        elapsed: format_duration(entry.elapsed_ms(now)),
                        running: entry.is_running,
                    })
                    .collect(),
            };
            return Ok(serde_json::to_string_pretty(&listing)?);
        }
    };

    persist_events(state, &board, &user.id, &events).await?;
    Ok(events.iter().map(describe).collect::<Vec<_>>().join("\n"))
}

async fn persist_events(
    state: &AppState,
    board: &TimerBoard,
    user_id: &str,
    events: &[TimerEvent],
) -> Result<(), AppError> {
    if events.is_empty() {
        return Ok(());
    }
    for event in events {
        match event {
            TimerEvent::Deleted(id) => {
                state.store().delete_time_entry(user_id, id).await?;
            }
            other => {
                if let Some(entry) = board.entry(other.entry_id()) {
                    state.store().save_time_entry(entry.clone()).await?;
                }
            }
        }
    }
    state.save()
}

fn describe(event: &TimerEvent) -> String {
    match event {
        TimerEvent::Started(id) => format!("started {id}"),
        TimerEvent::Stopped { id, duration_ms } => {
            format!("stopped {id} after {}", format_duration(*duration_ms))
        }
        TimerEvent::Resumed(id) => format!("resumed {id}"),
        TimerEvent::Deleted(id) => format!("deleted {id}"),
    }
}

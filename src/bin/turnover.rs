use anyhow::{bail, Context};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use turnover::calendar::{format_external, parse_external_date, WEEK_START};
use turnover::dashboard::{self, MonthView, TaskRow};
use turnover::prelude::*;

#[derive(Parser, Debug)]
#[clap(name = "turnover", version)]
#[clap(about = "Cleaning schedule for short-term rentals", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// Account email
    #[clap(long, env = "TURNOVER_EMAIL")]
    email: Option<String>,

    /// Account password
    #[clap(long, env = "TURNOVER_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show a month with the scheduled cleanings
    Calendar {
        /// Month as YYYY-MM; defaults to the current month
        #[clap(long)]
        month: Option<String>,
    },
    /// List cleaning tasks
    Tasks {
        /// all, today, tomorrow, this-week, next-week, this-month, upcoming, past
        #[clap(long, default_value = "all")]
        filter: String,
        #[clap(long)]
        apartment: Option<Uuid>,
        /// Only tasks without a cleaner
        #[clap(long)]
        unassigned: bool,
    },
    /// List apartments (hosts)
    Apartments,
    /// List cleaners (hosts)
    Cleaners,
    /// Schedule a cleaning (hosts)
    AddTask {
        #[clap(long)]
        apartment: Uuid,
        /// Cleaning date as DD/MM/YYYY
        #[clap(long)]
        date: String,
        /// Deadline as DD/MM/YYYY
        #[clap(long)]
        deadline: Option<String>,
        /// Defaults to the apartment's default cleaner
        #[clap(long)]
        cleaner: Option<Uuid>,
        #[clap(long)]
        note: Option<String>,
    },
    /// Mark days unavailable, both ends included (DD/MM/YYYY)
    Unavailable {
        start: String,
        end: String,
        /// Cleaner to edit; hosts only
        #[clap(long)]
        cleaner: Option<Uuid>,
    },
    /// Mark days available again, both ends included (DD/MM/YYYY)
    Available {
        start: String,
        end: String,
        /// Cleaner to edit; hosts only
        #[clap(long)]
        cleaner: Option<Uuid>,
    },
    /// Flip one day of your own availability (DD/MM/YYYY)
    Toggle { date: String },
    /// Set a password from an invitation link and link the cleaner account
    AcceptInvite {
        link: String,
        #[clap(long, env = "TURNOVER_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
}

enum Board {
    Host(HostDashboard<SupabaseStore>),
    Cleaner(CleanerDashboard<SupabaseStore>),
}

impl Board {
    fn task_rows(&self, filter: &TaskFilter, today: NaiveDate) -> Vec<TaskRow> {
        match self {
            Board::Host(board) => board.task_rows(filter, today),
            Board::Cleaner(board) => board.task_rows(filter, today),
        }
    }

    fn month_view(&self, year: i32, month0: u32, today: NaiveDate) -> Result<MonthView> {
        match self {
            Board::Host(board) => board.month_view(year, month0, today),
            Board::Cleaner(board) => board.month_view(year, month0, today),
        }
    }

    fn host(&mut self) -> anyhow::Result<&mut HostDashboard<SupabaseStore>> {
        match self {
            Board::Host(board) => Ok(board),
            Board::Cleaner(_) => bail!("This command is only available to hosts"),
        }
    }
}

async fn open_board(client: Arc<Turnover>, cli: &Cli) -> anyhow::Result<Board> {
    let email = cli
        .email
        .as_deref()
        .context("Set TURNOVER_EMAIL or pass --email")?;
    let password = cli
        .password
        .as_deref()
        .context("Set TURNOVER_PASSWORD or pass --password")?;

    let store = Arc::new(SupabaseStore::new(client.clone()));
    let identity = dashboard::sign_in(client.auth(), store.as_ref(), email, password).await?;
    debug!("signed in as {}, home is {}", identity.profile.email, identity.home());

    Ok(match identity.role() {
        Role::Host => Board::Host(
            HostDashboard::load(store, identity.profile)
                .await?
                .with_invite_redirect(client.options.invite_redirect.clone()),
        ),
        Role::Cleaner => Board::Cleaner(CleanerDashboard::load(store, identity.profile).await?),
    })
}

fn parse_month(input: Option<&str>, today: NaiveDate) -> anyhow::Result<(i32, u32)> {
    let input = match input {
        Some(input) => input,
        None => return Ok((today.year(), today.month0())),
    };
    let (year, month) = input
        .split_once('-')
        .with_context(|| format!("Expected YYYY-MM, got '{}'", input))?;
    let year: i32 = year.parse().with_context(|| format!("Bad year in '{}'", input))?;
    let month: u32 = month.parse().with_context(|| format!("Bad month in '{}'", input))?;
    if !(1..=12).contains(&month) {
        bail!("Month must be between 1 and 12, got {}", month);
    }
    Ok((year, month - 1))
}

fn print_month(view: &MonthView) {
    println!("{:^35}", view.title);
    let mut day = WEEK_START;
    for _ in 0..7 {
        print!("{:>5}", &day.to_string()[..2]);
        day = day.succ();
    }
    println!();

    for week in &view.weeks {
        for d in week.iter() {
            let mark = if d.unavailable {
                'x'
            } else if !d.task_ids.is_empty() {
                '*'
            } else if d.cell.is_today {
                '<'
            } else {
                ' '
            };
            if d.cell.in_month {
                print!("{:>4}{}", d.cell.date.day(), mark);
            } else {
                print!("{:>5}", "");
            }
        }
        println!();
    }
    println!("* cleaning scheduled   x unavailable   < today");
}

fn print_rows(rows: &[TaskRow]) {
    if rows.is_empty() {
        println!("No tasks.");
        return;
    }
    for row in rows {
        let deadline = row
            .task
            .deadline_date
            .map(|d| format!(" (by {})", format_external(d)))
            .unwrap_or_default();
        println!(
            "{}{}  {}  {}{}",
            format_external(row.task.cleaning_date),
            deadline,
            row.apartment_name,
            row.cleaner_name.as_deref().unwrap_or("unassigned"),
            if row.conflict { "  [cleaner unavailable]" } else { "" }
        );
        if let Some(note) = &row.task.note {
            println!("    {}", note);
        }
    }
}

async fn set_range(
    board: &mut Board,
    start: &str,
    end: &str,
    cleaner: Option<Uuid>,
    change: AvailabilityChange,
) -> anyhow::Result<()> {
    let dates = match board {
        Board::Cleaner(board) => board.mark_range(start, end, change).await?,
        Board::Host(board) => {
            let cleaner = cleaner.context("Pass --cleaner to choose whose days to change")?;
            board
                .set_cleaner_availability(cleaner, start, end, change)
                .await?
                .availability
        }
    };
    println!("{} unavailable dates saved", dates.len());
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = Arc::new(Turnover::from_env()?);
    let today = Local::now().date_naive();

    if let Commands::AcceptInvite { link, new_password } = &cli.command {
        let store = SupabaseStore::new(client.clone());
        let identity =
            dashboard::accept_invitation(client.auth(), &store, link, new_password, new_password)
                .await?;
        println!(
            "Welcome, {}. Sign in with your new password.",
            identity.profile.display_name()
        );
        return Ok(());
    }

    let mut board = open_board(client.clone(), &cli).await?;

    match &cli.command {
        Commands::Calendar { month } => {
            let (year, month0) = parse_month(month.as_deref(), today)?;
            print_month(&board.month_view(year, month0, today)?);
        }
        Commands::Tasks {
            filter,
            apartment,
            unassigned,
        } => {
            let mut filter = TaskFilter::quick(filter.parse()?);
            filter.apartment_id = *apartment;
            filter.unassigned_only = *unassigned;
            print_rows(&board.task_rows(&filter, today));
        }
        Commands::Apartments => {
            let host = board.host()?;
            for apartment in host.apartments() {
                let default = apartment
                    .default_cleaner_id
                    .and_then(|id| host.cleaner(id))
                    .map(|c| c.full_name.as_str())
                    .unwrap_or("-");
                println!(
                    "{}  {}  {}  default cleaner: {}",
                    apartment.id, apartment.external_id, apartment.name, default
                );
            }
        }
        Commands::Cleaners => {
            let host = board.host()?;
            for cleaner in host.cleaners() {
                println!(
                    "{}  {}  {}  {:?}",
                    cleaner.id,
                    cleaner.full_name,
                    cleaner.email,
                    cleaner.registration_status()
                );
            }
        }
        Commands::AddTask {
            apartment,
            date,
            deadline,
            cleaner,
            note,
        } => {
            let mut draft = TaskDraft::new(*apartment, parse_external_date(date)?);
            draft.deadline_date = deadline.as_deref().map(parse_external_date).transpose()?;
            draft.cleaner_id = *cleaner;
            draft.note = note.clone();
            let task = board.host()?.create_task(draft).await?;
            println!("Scheduled {} on {}", task.id, format_external(task.cleaning_date));
        }
        Commands::Unavailable { start, end, cleaner } => {
            set_range(&mut board, start, end, *cleaner, AvailabilityChange::MarkUnavailable)
                .await?;
        }
        Commands::Available { start, end, cleaner } => {
            set_range(&mut board, start, end, *cleaner, AvailabilityChange::MarkAvailable)
                .await?;
        }
        Commands::Toggle { date } => match &mut board {
            Board::Cleaner(board) => {
                let date = parse_external_date(date)?;
                board.toggle_date(date).await?;
                let state = if board.is_unavailable_on(date) {
                    "unavailable"
                } else {
                    "available"
                };
                println!("{} is now {}", format_external(date), state);
            }
            Board::Host(_) => bail!("Hosts change a cleaner's days with 'unavailable' or 'available'"),
        },
        Commands::AcceptInvite { .. } => unreachable!(),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run().await {
        match e.downcast_ref::<Error>() {
            Some(err) => eprintln!("Error: {}", err.user_message()),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

//! habitual - track habits, streaks and consistency from the terminal
//!
//! Uses XDG Base Directory specification for file locations:
//! - Database: $XDG_DATA_HOME/habitual/habits.db (~/.local/share/habitual/habits.db)
//! - Config: $XDG_CONFIG_HOME/habitual/config.toml (~/.config/habitual/config.toml)
//! - Logs: $XDG_STATE_HOME/habitual/ (~/.local/state/habitual/)

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use habitual_core::analytics::heatmap::{max_count, MAX_HEATMAP_DAYS};
use habitual_core::analytics::{
    find_badge, intensity, period_progress, week_run, HeatmapRange, Period, RateWindow, BADGES,
};
use habitual_core::format::{format_days, format_relative_time, intensity_cell, progress_bar};
use habitual_core::{
    CalendarDay, ChangeKind, CompletionChange, Config, Database, Frequency, Habit, HabitFilter,
    HeatmapDay, Tracker,
};

#[derive(Parser)]
#[command(name = "habitual")]
#[command(about = "Track habits, streaks and consistency")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create, list, archive and delete habits
    Habit {
        #[command(subcommand)]
        command: HabitCommand,
    },

    /// Mark a habit as done
    Done {
        /// Habit ID (unique prefix accepted)
        habit: String,

        /// Day to record, YYYY-MM-DD (default: today, UTC)
        #[arg(short, long)]
        date: Option<CalendarDay>,
    },

    /// Remove a completion
    Undo {
        /// Habit ID (unique prefix accepted)
        habit: String,

        /// Day to clear, YYYY-MM-DD (default: today, UTC)
        #[arg(short, long)]
        date: Option<CalendarDay>,
    },

    /// Mark done if not done yet, otherwise undo
    Toggle {
        /// Habit ID (unique prefix accepted)
        habit: String,

        /// Day to toggle, YYYY-MM-DD (default: today, UTC)
        #[arg(short, long)]
        date: Option<CalendarDay>,
    },

    /// Show streaks and completion rates
    Stats {
        /// Completion-rate window: 7d, 30d, 90d or 1y (default: from config)
        #[arg(short, long)]
        window: Option<RateWindow>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show a per-day completion heatmap
    Heatmap {
        /// Only count this habit (unique prefix accepted)
        #[arg(long)]
        habit: Option<String>,

        /// Calendar year to show
        #[arg(long, conflicts_with = "days")]
        year: Option<i32>,

        /// Number of days ending today, at most 100 years (default: from config)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_HEATMAP_DAYS as i64))]
        days: Option<u32>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Unlock earned badges and list all badges
    Badges {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Subcommand)]
enum HabitCommand {
    /// Create a habit
    Add {
        name: String,

        #[arg(short, long)]
        description: Option<String>,

        /// daily, weekly or monthly
        #[arg(short, long, default_value = "daily")]
        frequency: Frequency,

        /// Display colour (hex)
        #[arg(short, long)]
        color: Option<String>,

        #[arg(short, long)]
        icon: Option<String>,
    },

    /// Change a habit's details
    Edit {
        /// Habit ID (unique prefix accepted)
        id: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// daily, weekly or monthly
        #[arg(short, long)]
        frequency: Option<Frequency>,

        /// Display colour (hex)
        #[arg(short, long)]
        color: Option<String>,

        #[arg(short, long)]
        icon: Option<String>,

        /// Show the habit on dashboards again
        #[arg(long, conflicts_with = "inactive")]
        active: bool,

        /// Hide the habit from dashboards without archiving it
        #[arg(long)]
        inactive: bool,
    },

    /// List habits
    List {
        /// Include archived and inactive habits
        #[arg(short, long)]
        all: bool,
    },

    /// Archive a habit, keeping its history
    Archive {
        /// Habit ID (unique prefix accepted)
        id: String,
    },

    /// Delete a habit and all of its completions
    Delete {
        /// Habit ID (unique prefix accepted)
        id: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let _log_guard =
        habitual_core::logging::init(&config.logging).context("failed to initialize logging")?;

    // Open database
    let db_path = Config::database_path();
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    let today = CalendarDay::today();

    match args.command {
        Command::Habit { command } => cmd_habit(&db, command),
        Command::Done { habit, date } => cmd_mark(&db, &habit, date, today, Mark::Done),
        Command::Undo { habit, date } => cmd_mark(&db, &habit, date, today, Mark::Undo),
        Command::Toggle { habit, date } => cmd_mark(&db, &habit, date, today, Mark::Toggle),
        Command::Stats { window, format } => cmd_stats(
            &db,
            window.unwrap_or(config.analytics.rate_window),
            today,
            format,
        ),
        Command::Heatmap {
            habit,
            year,
            days,
            format,
        } => {
            let range = match (year, days) {
                (Some(year), _) => HeatmapRange::Year(year),
                (None, Some(days)) => HeatmapRange::Trailing(days),
                (None, None) => HeatmapRange::Trailing(config.analytics.heatmap_days),
            };
            cmd_heatmap(&db, habit.as_deref(), range, today, format)
        }
        Command::Badges { format } => cmd_badges(&db, today, format),
    }
}

fn short_id(id: &str) -> &str {
    &id[..id.len().min(8)]
}

// ============================================
// Habits
// ============================================

fn cmd_habit(db: &Database, command: HabitCommand) -> Result<()> {
    match command {
        HabitCommand::Add {
            name,
            description,
            frequency,
            color,
            icon,
        } => {
            let mut habit = Habit::new(name.trim());
            habit.description = description;
            habit.frequency = frequency;
            if let Some(color) = color {
                habit.color = color;
            }
            if let Some(icon) = icon {
                habit.icon = icon;
            }
            db.insert_habit(&habit).context("failed to create habit")?;
            println!("Created habit {} {} ({})", habit.icon, habit.name, short_id(&habit.id));
        }
        HabitCommand::Edit {
            id,
            name,
            description,
            frequency,
            color,
            icon,
            active,
            inactive,
        } => {
            let mut habit = db.find_habit(&id)?;
            if let Some(name) = name {
                habit.name = name.trim().to_string();
            }
            if let Some(description) = description {
                habit.description = Some(description).filter(|d| !d.is_empty());
            }
            if let Some(frequency) = frequency {
                habit.frequency = frequency;
            }
            if let Some(color) = color {
                habit.color = color;
            }
            if let Some(icon) = icon {
                habit.icon = icon;
            }
            if active {
                habit.is_active = true;
            } else if inactive {
                habit.is_active = false;
            }
            db.update_habit(&habit).context("failed to update habit")?;
            println!("Updated {} {} ({})", habit.icon, habit.name, short_id(&habit.id));
        }
        HabitCommand::List { all } => {
            let filter = if all {
                HabitFilter::all()
            } else {
                HabitFilter::default()
            };
            let habits = db.list_habits(&filter)?;
            if habits.is_empty() {
                println!("No habits yet. Create one with 'habitual habit add <name>'.");
                return Ok(());
            }

            println!(
                "{:<10} {:<24} {:<9} {:>8} {:>8}  {}",
                "ID", "NAME", "FREQ", "CURRENT", "LONGEST", "UPDATED"
            );
            for habit in habits {
                let snapshot = db.get_streak_snapshot(&habit.id)?;
                let (current, longest, updated) = match snapshot {
                    Some(s) => (
                        s.current_count,
                        s.longest_count,
                        format_relative_time(s.last_updated),
                    ),
                    None => (0, 0, "never".to_string()),
                };
                let mut name = format!("{} {}", habit.icon, habit.name);
                if habit.is_archived {
                    name.push_str(" [archived]");
                } else if !habit.is_active {
                    name.push_str(" [inactive]");
                }
                println!(
                    "{:<10} {:<24} {:<9} {:>8} {:>8}  {}",
                    short_id(&habit.id),
                    name,
                    habit.frequency,
                    current,
                    longest,
                    updated
                );
            }
        }
        HabitCommand::Archive { id } => {
            let habit = db.find_habit(&id)?;
            db.archive_habit(&habit.id)?;
            println!("Archived {} ({})", habit.name, short_id(&habit.id));
        }
        HabitCommand::Delete { id } => {
            let habit = db.find_habit(&id)?;
            db.delete_habit(&habit.id)?;
            println!("Deleted {} ({}) and its history", habit.name, short_id(&habit.id));
        }
    }
    Ok(())
}

// ============================================
// Completions
// ============================================

#[derive(Clone, Copy)]
enum Mark {
    Done,
    Undo,
    Toggle,
}

fn cmd_mark(
    db: &Database,
    habit: &str,
    date: Option<CalendarDay>,
    today: CalendarDay,
    mark: Mark,
) -> Result<()> {
    let habit = db.find_habit(habit)?;
    let day = date.unwrap_or(today);
    if day > today {
        anyhow::bail!("cannot record {} for {}: the day is in the future", habit.name, day);
    }

    tracing::debug!(habit_id = %habit.id, %day, "Updating completion from CLI");
    let tracker = Tracker::new(db);
    let change = match mark {
        Mark::Done => tracker.add_completion(&habit.id, day, today),
        Mark::Undo => tracker.remove_completion(&habit.id, day, today),
        Mark::Toggle => tracker.toggle_completion(&habit.id, day, today),
    }
    .with_context(|| format!("failed to update {}", habit.name))?;

    print_change(&habit, &change);
    Ok(())
}

fn print_change(habit: &Habit, change: &CompletionChange) {
    match (change.kind, change.applied) {
        (ChangeKind::Added, true) => println!("✓ {} done on {}", habit.name, change.day),
        (ChangeKind::Added, false) => {
            println!("{} was already done on {}", habit.name, change.day)
        }
        (ChangeKind::Removed, true) => println!("✗ {} undone on {}", habit.name, change.day),
        (ChangeKind::Removed, false) => {
            println!("{} had no completion on {}", habit.name, change.day)
        }
    }

    match &change.snapshot {
        Ok(snapshot) => println!(
            "  Streak: {} (longest {})",
            format_days(snapshot.current_count),
            format_days(snapshot.longest_count)
        ),
        Err(e) => eprintln!("warning: completion saved but streak was not updated: {}", e),
    }
}

// ============================================
// Stats
// ============================================

fn cmd_stats(db: &Database, window: RateWindow, today: CalendarDay, format: OutputFormat) -> Result<()> {
    let stats = db
        .get_dashboard_stats(today, window)
        .context("failed to compute stats")?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    if stats.total_habits == 0 {
        println!("No habits to report on.");
        return Ok(());
    }

    let name_of = |id: &Option<String>| {
        id.as_ref()
            .and_then(|id| stats.habits.iter().find(|h| &h.habit_id == id))
            .map(|h| h.name.clone())
            .unwrap_or_else(|| "-".to_string())
    };

    println!("Stats for {} ({} window)", today.display_long(), window);
    println!("=================================");
    println!("Habits:            {}", stats.total_habits);
    println!("Done today:        {}/{}", stats.completed_today, stats.total_habits);
    println!("Total completions: {}", stats.total_completions);
    println!("Average streak:    {}", format_days(stats.average_streak));
    println!("Best streak:       {}", format_days(stats.best_current_streak));
    println!("Best habit:        {}", name_of(&stats.best_habit));
    println!("Needs attention:   {}", name_of(&stats.worst_habit));
    println!();

    for habit in &stats.habits {
        let days = db.get_completion_days(&habit.habit_id)?;
        let week = period_progress(&days, Period::Week, today);
        let month = period_progress(&days, Period::Month, today);
        let year = period_progress(&days, Period::Year, today);
        println!(
            "{} {}",
            if habit.completed_today { "✓" } else { " " },
            habit.name
        );
        println!(
            "    streak {} (longest {}), rate {:>3}% {}",
            format_days(habit.current_streak),
            format_days(habit.longest_streak),
            habit.completion_rate,
            progress_bar(habit.completion_rate, 20)
        );
        if let Some(run) = &habit.longest_run {
            println!("    best run {} to {}", run.start, run.end);
        }
        println!(
            "    {}: {}/{} (run of {}), {}: {}%, {}: {}%",
            Period::Week.display_name(),
            week.completed_days,
            week.total_days,
            week_run(&days, today),
            Period::Month.display_name(),
            month.percent(),
            Period::Year.display_name(),
            year.percent()
        );
    }
    Ok(())
}

// ============================================
// Heatmap
// ============================================

fn cmd_heatmap(
    db: &Database,
    habit: Option<&str>,
    range: HeatmapRange,
    today: CalendarDay,
    format: OutputFormat,
) -> Result<()> {
    let habit = habit.map(|h| db.find_habit(h)).transpose()?;
    let (start, end) = range.bounds(today);
    let series = db
        .get_heatmap(habit.as_ref().map(|h| h.id.as_str()), start, end)
        .context("failed to build heatmap")?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    let title = habit.as_ref().map(|h| h.name.as_str()).unwrap_or("All habits");
    println!("{}: {} to {}", title, start, end);
    for line in render_heatmap(&series) {
        println!("{}", line);
    }

    let active_days = series.iter().filter(|d| d.count > 0).count();
    let total: u32 = series.iter().map(|d| d.count).sum();
    println!();
    println!("{} completions on {}", total, format_days(active_days as u32));
    Ok(())
}

/// Seven rows (Monday first), one column per week.
fn render_heatmap(series: &[HeatmapDay]) -> Vec<String> {
    const LABELS: [&str; 7] = ["Mon", "   ", "Wed", "   ", "Fri", "   ", "Sun"];

    let Some(first) = series.first() else {
        return Vec::new();
    };
    let offset = first.day.date().weekday().num_days_from_monday() as usize;
    let columns = (offset + series.len() + 6) / 7;
    let max = max_count(series);

    let mut grid = vec![vec![' '; columns]; 7];
    for (i, cell) in series.iter().enumerate() {
        let pos = offset + i;
        grid[pos % 7][pos / 7] = intensity_cell(intensity(cell.count, max));
    }

    grid.into_iter()
        .zip(LABELS)
        .map(|(row, label)| format!("{} {}", label, row.into_iter().collect::<String>()))
        .collect()
}

// ============================================
// Badges
// ============================================

fn cmd_badges(db: &Database, today: CalendarDay, format: OutputFormat) -> Result<()> {
    let fresh = db
        .evaluate_badges(today, Utc::now())
        .context("failed to evaluate badges")?;
    let unlocked = db.list_badges()?;
    let unlocked_at = |id: &str| {
        unlocked
            .iter()
            .find(|b| b.badge_id == id)
            .map(|b| b.unlocked_at)
    };

    if format == OutputFormat::Json {
        let badges: Vec<_> = BADGES
            .iter()
            .map(|badge| {
                serde_json::json!({
                    "id": badge.id,
                    "name": badge.name,
                    "description": badge.description,
                    "icon": badge.icon,
                    "requirement": badge.requirement_label(),
                    "unlocked_at": unlocked_at(badge.id).map(|t| t.to_rfc3339()),
                })
            })
            .collect();
        let output = serde_json::json!({
            "newly_unlocked": fresh.iter().map(|b| b.id).collect::<Vec<_>>(),
            "badges": badges,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for badge in &fresh {
        println!("🎉 Unlocked {} {}!", badge.icon, badge.name);
    }
    if !fresh.is_empty() {
        println!();
    }

    println!("Badges ({}/{})", unlocked.len(), BADGES.len());
    for record in &unlocked {
        if let Some(badge) = find_badge(&record.badge_id) {
            println!(
                "  {} {:<16} {} (unlocked {})",
                badge.icon,
                badge.name,
                badge.description,
                record.unlocked_at.format("%Y-%m-%d")
            );
        }
    }
    for badge in BADGES.iter().filter(|b| unlocked_at(b.id).is_none()) {
        println!("  🔒 {:<16} {}", badge.name, badge.requirement_label());
    }
    Ok(())
}

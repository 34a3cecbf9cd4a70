//! `huddle calendar` subcommands: month grid, moving plans, share text.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{Datelike, NaiveDate};

use huddle_core::PlanBook;
use huddle_core::calendar::{MonthView, YearMonth, occurrence_of, share_text};
use huddle_db::SnapshotStore;

use crate::CalendarCommands;
use crate::config::HuddleConfig;
use crate::plan_cmds::short_id;

/// Dispatch a `CalendarCommands` variant to the appropriate handler.
pub fn run_calendar_command(
    command: CalendarCommands,
    config: &HuddleConfig,
    store: Arc<dyn SnapshotStore>,
) -> Result<()> {
    let mut book = PlanBook::open_with_results_cache(store);
    match command {
        CalendarCommands::Show { month } => {
            let month = month.unwrap_or_else(current_month);
            print!("{}", render_month(&MonthView::build(book.saved(), month)));
            Ok(())
        }
        CalendarCommands::Move { id, date, on } => cmd_move(&mut book, &id, date, on),
        CalendarCommands::Share { month } => {
            let month = month.unwrap_or_else(current_month);
            let title = format!("{} Ministry Plan", config.audience.organization);
            match share_text(&title, month, book.saved()) {
                Some(text) => print!("{text}"),
                None => println!("Nothing scheduled in {month}."),
            }
            Ok(())
        }
    }
}

fn current_month() -> YearMonth {
    YearMonth::containing(chrono::Local::now().date_naive())
}

// -----------------------------------------------------------------------
// huddle calendar show
// -----------------------------------------------------------------------

/// Render the month grid followed by the plans on each busy day.
///
/// In the grid `*` marks a day with an anchor date and `~` a day with only
/// repeats. In the listing `~` marks a repeat of an earlier anchor.
pub fn render_month(view: &MonthView<'_>) -> String {
    let mut out = format!("{:^28}\n", view.month.to_string());
    out.push_str("Su  Mo  Tu  We  Th  Fr  Sa\n");

    for week in view.weeks() {
        let mut line = String::new();
        for cell in week {
            match cell {
                Some(cell) => {
                    let marker = if cell.occurrences.iter().any(|o| !o.derived) {
                        '*'
                    } else if cell.occurrences.is_empty() {
                        ' '
                    } else {
                        '~'
                    };
                    line.push_str(&format!("{:>2}{marker} ", cell.date.day()));
                }
                None => line.push_str("    "),
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    if view.is_empty() {
        out.push_str(&format!("\nNothing scheduled in {}.\n", view.month));
        return out;
    }

    out.push('\n');
    for cell in view.busy_days() {
        for occ in &cell.occurrences {
            let marker = if occ.derived { '~' } else { ' ' };
            out.push_str(&format!(
                "{} {:>2} {marker} {}  [{}]\n",
                cell.date.format("%a"),
                cell.date.day(),
                occ.item.title,
                short_id(occ.item),
            ));
        }
    }
    out
}

// -----------------------------------------------------------------------
// huddle calendar move
// -----------------------------------------------------------------------

/// Move the occurrence of plan `id` on `on` (its anchor date by default)
/// to `date`.
fn cmd_move(book: &mut PlanBook, id: &str, date: NaiveDate, on: Option<NaiveDate>) -> Result<()> {
    let plan = book.find_saved(id)?;
    let full_id = plan.id.clone().context("saved plan has no id")?;
    let title = plan.title.clone();
    let Some(day) = on.or(plan.assigned_date) else {
        bail!("{title:?} is not scheduled; set a date with `huddle saved set {id} --date YYYY-MM-DD`");
    };

    let saved = book.saved().to_vec();
    let Some(occurrence) = occurrence_of(&saved, &full_id, day) else {
        bail!("{title:?} does not occur on {day}");
    };

    match book.move_occurrence(&occurrence, date)? {
        Some(moved) => {
            println!("Moved \"{title}\" from {day} to {date}.");
            if moved.recurrence.is_recurring() {
                println!(
                    "  Repeats {} from the new date.",
                    moved.recurrence.to_string().to_lowercase()
                );
            }
        }
        None => println!("\"{title}\" is already on {date}."),
    }
    Ok(())
}

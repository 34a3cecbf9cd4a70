//! CLI handlers for results and saved plans.
//!
//! Implements:
//! - `huddle results [--json|--clear]` -- list or discard the current results
//! - `huddle save <ref> [--yes]`       -- toggle-save a result
//! - `huddle saved list|show|remove|set|edit|export`

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use huddle_core::{PlanBook, SortOrder, ToggleOutcome};
use huddle_core::export;
use huddle_db::SnapshotStore;
use huddle_db::models::PlanningItem;

use crate::SavedCommands;
use crate::export_cmd;
use crate::resolve::{read_plan_file, resolve_result, write_plan_id_to_file};

// -----------------------------------------------------------------------
// Public entry points
// -----------------------------------------------------------------------

/// Dispatch a `SavedCommands` variant to the appropriate handler.
pub fn run_saved_command(command: SavedCommands, store: Arc<dyn SnapshotStore>) -> Result<()> {
    let mut book = PlanBook::open_with_results_cache(store);
    match command {
        SavedCommands::List { sort } => cmd_list(&book, sort),
        SavedCommands::Show { id, json } => cmd_show(&book, &id, json),
        SavedCommands::Remove { id, yes } => cmd_remove(&mut book, &id, yes),
        SavedCommands::Set {
            id,
            date,
            clear_date,
            recurrence,
            notes,
        } => {
            let mut item = book.find_saved(&id)?.clone();
            if let Some(date) = date {
                item.assigned_date = Some(date);
            }
            if clear_date {
                item.assigned_date = None;
            }
            if let Some(recurrence) = recurrence {
                item.recurrence = recurrence;
            }
            if let Some(notes) = notes {
                item.notes = Some(notes).filter(|n| !n.trim().is_empty());
            }
            book.update(&item)
                .with_context(|| format!("failed to update {:?}", item.title))?;
            println!("Updated \"{}\".", item.title);
            print_schedule(&item);
            Ok(())
        }
        SavedCommands::Edit { file } => cmd_edit(&mut book, &file),
        SavedCommands::Export { id, format, output } => {
            let item = book.find_saved(&id)?;
            export_cmd::run_export(item, format, output.as_deref())
        }
    }
}

/// `huddle results`: list, print as JSON, or clear the current results.
pub fn run_results(store: Arc<dyn SnapshotStore>, json: bool, clear: bool) -> Result<()> {
    let mut book = PlanBook::open_with_results_cache(store);

    if clear {
        let count = book.results().len();
        book.reset_view();
        println!("Cleared {count} result(s).");
        return Ok(());
    }

    if json {
        let text = serde_json::to_string_pretty(book.results())
            .context("failed to serialize results")?;
        println!("{text}");
        return Ok(());
    }

    print_results(&book);
    Ok(())
}

/// Print the current results as a numbered table; `*` marks saved ones.
pub(crate) fn print_results(book: &PlanBook) {
    if book.results().is_empty() {
        println!("No current results. Use `huddle generate <planner>` to create some.");
        return;
    }

    let title_w = book
        .results()
        .iter()
        .map(|p| p.title.chars().count())
        .max()
        .unwrap_or(5)
        .max(5);

    println!(
        "{:>3}  {:<5}  {:<10}  {:<7}  {:<title_w$}  COST",
        "#", "SAVED", "DATE", "REPEAT", "TITLE"
    );
    for (i, item) in book.results().iter().enumerate() {
        let saved = if book.is_saved(item) { "*" } else { "" };
        println!(
            "{:>3}  {:<5}  {:<10}  {:<7}  {:<title_w$}  {}",
            i + 1,
            saved,
            date_cell(item),
            item.recurrence.to_string(),
            item.title,
            item.estimated_cost,
        );
    }
}

/// `huddle save <ref>`: save a result, or unsave it after confirmation.
pub fn run_save(store: Arc<dyn SnapshotStore>, reference: &str, yes: bool) -> Result<()> {
    let mut book = PlanBook::open_with_results_cache(store);
    let item = resolve_result(book.results(), reference)?.clone();

    match book.toggle_save(&item)? {
        ToggleOutcome::Saved(saved) => {
            println!("Saved \"{}\" ({}).", saved.title, short_id(&saved));
        }
        ToggleOutcome::PendingDeletion(pending) => {
            finish_deletion(&mut book, &pending, yes)?;
        }
    }

    Ok(())
}

// -----------------------------------------------------------------------
// huddle saved list
// -----------------------------------------------------------------------

fn cmd_list(book: &PlanBook, sort: SortOrder) -> Result<()> {
    let plans = book.sorted_saved(sort);

    if plans.is_empty() {
        println!("No saved plans. Use `huddle save <n>` to keep a result.");
        return Ok(());
    }

    println!("{:<8}  {:<10}  {:<7}  {:<10}  TITLE", "ID", "DATE", "REPEAT", "SAVED");
    for plan in plans {
        let saved_on = plan
            .saved_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!(
            "{:<8}  {:<10}  {:<7}  {:<10}  {}",
            short_id(plan),
            date_cell(plan),
            plan.recurrence.to_string(),
            saved_on,
            plan.title,
        );
    }

    Ok(())
}

// -----------------------------------------------------------------------
// huddle saved show <id>
// -----------------------------------------------------------------------

fn cmd_show(book: &PlanBook, id: &str, json: bool) -> Result<()> {
    let item = book.find_saved(id)?;

    if json {
        let text = serde_json::to_string_pretty(item).context("failed to serialize plan")?;
        println!("{text}");
        return Ok(());
    }

    println!("ID:         {}", item.id.as_deref().unwrap_or_default());
    if let Some(saved_at) = item.saved_at {
        println!("Saved:      {}", saved_at.format("%Y-%m-%d %H:%M"));
    }
    println!("Recurrence: {}", item.recurrence);
    println!();
    println!("{}", export::render_plain_text(item));

    Ok(())
}

// -----------------------------------------------------------------------
// huddle saved remove <id>
// -----------------------------------------------------------------------

fn cmd_remove(book: &mut PlanBook, id: &str, yes: bool) -> Result<()> {
    let item = book.find_saved(id)?.clone();
    match book.toggle_save(&item)? {
        ToggleOutcome::PendingDeletion(pending) => finish_deletion(book, &pending, yes),
        ToggleOutcome::Saved(_) => bail!("{:?} was not saved", item.title),
    }
}

/// Second phase of a deletion: confirm or cancel the pending plan.
fn finish_deletion(book: &mut PlanBook, pending: &PlanningItem, yes: bool) -> Result<()> {
    let question = format!("Remove \"{}\" from saved plans?", pending.title);
    if yes || confirm(&question)? {
        if let Some(removed) = book.confirm_deletion()? {
            println!("Removed \"{}\".", removed.title);
        }
    } else {
        book.cancel_deletion();
        println!("Kept \"{}\".", pending.title);
    }
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush().context("failed to flush stdout")?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

// -----------------------------------------------------------------------
// huddle saved edit <file>
// -----------------------------------------------------------------------

/// Save a plan edited by hand. A plan without an id is saved as new and
/// the assigned id is written back into the file.
fn cmd_edit(book: &mut PlanBook, file: &Path) -> Result<()> {
    let item = read_plan_file(file)?;
    let stored = book
        .save_edited(&item)
        .with_context(|| format!("failed to save {}", file.display()))?;
    let id = stored.id.as_deref().context("saved plan has no id")?;

    if item.id.as_deref() != Some(id) {
        write_plan_id_to_file(file, id)?;
        println!("Saved \"{}\" as {id} (id written to {}).", stored.title, file.display());
    } else {
        println!("Saved \"{}\".", stored.title);
    }
    print_schedule(&stored);

    Ok(())
}

// -----------------------------------------------------------------------
// Formatting helpers
// -----------------------------------------------------------------------

pub(crate) fn short_id(item: &PlanningItem) -> &str {
    let id = item.id.as_deref().unwrap_or("-");
    id.get(..8).unwrap_or(id)
}

fn date_cell(item: &PlanningItem) -> String {
    item.assigned_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_schedule(item: &PlanningItem) {
    match item.assigned_date {
        Some(date) if item.recurrence.is_recurring() => {
            println!("  Date: {date} (repeats {})", item.recurrence.to_string().to_lowercase());
        }
        Some(date) => println!("  Date: {date}"),
        None => println!("  Date: {}", export::NOT_SCHEDULED),
    }
}

mod cards;
mod catalog;
mod clipboard;
mod player;
mod records;
mod sequencer;
mod tui;
mod wake;

#[cfg(test)]
mod tests;

use anyhow::Result;

use crate::cli::{Cli, Command};
use crate::db::Database;
use crate::paths::database_file_path;

use self::cards::{NoSelection, build_cards, parse_id_list, resolve_selection, uniform_pick};
use self::catalog::{catalog_url, fetch_catalog};

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Command::Select { ids }) => run_select(&ids),
        Some(Command::List) => run_list(),
        Some(Command::Session { ids }) => run_session(ids.as_deref()),
        None => run_session(None),
    }
}

fn run_select(raw_ids: &str) -> Result<()> {
    let ids = parse_id_list(raw_ids);
    if ids.is_empty() {
        println!("No exercise ids provided. Example: gymcard select squat,bench,deadlift");
        return Ok(());
    }

    let mut db = open_db()?;
    db.save_selection(&ids)?;
    println!("Saved selection ({} exercises): {}", ids.len(), ids.join(", "));
    Ok(())
}

fn run_list() -> Result<()> {
    let catalog = fetch_catalog(&catalog_url())?;
    if catalog.exercises.is_empty() {
        println!("The catalog has no exercises.");
        return Ok(());
    }

    println!("{:<16} {:<32} {:>5} {:>5}", "ID", "TITLE", "REPS", "SETS");
    for exercise in &catalog.exercises {
        println!(
            "{:<16} {:<32} {:>5} {:>5}",
            truncate(&exercise.id, 16),
            truncate(&exercise.title, 32),
            exercise.standard_reps,
            exercise.standard_sets
        );
    }
    Ok(())
}

fn run_session(ids_arg: Option<&str>) -> Result<()> {
    // An explicit --ids list beats the saved selection.
    let ids = match ids_arg {
        Some(raw) => parse_id_list(raw),
        None => open_db()?.load_selection()?,
    };
    if ids.is_empty() {
        print_selection_guidance();
        return Ok(());
    }

    let catalog = fetch_catalog(&catalog_url())?;
    let selection = resolve_selection(&catalog, &ids);
    for id in &selection.unknown_ids {
        eprintln!("Warning: unknown exercise id skipped: {id}");
    }

    let mut pick = uniform_pick;
    let cards = match build_cards(
        &selection.exercises,
        &catalog.preparation_clips,
        &catalog.rest_clips,
        &catalog.end_clips,
        &mut pick,
    ) {
        Ok(cards) => cards,
        Err(NoSelection) => {
            print_selection_guidance();
            return Ok(());
        }
    };

    tui::run_session(cards)
}

fn print_selection_guidance() {
    println!("No exercises selected for this session.");
    println!("Run `gymcard select <id,id,...>` first, or pass `--ids`.");
    println!("`gymcard list` shows the available exercise ids.");
}

fn open_db() -> Result<Database> {
    let db_path = database_file_path()?;
    let db = Database::open(&db_path)?;
    db.migrate()?;
    Ok(db)
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    let mut out = s.to_string();
    if out.chars().count() > max {
        out = out.chars().take(max.saturating_sub(3)).collect::<String>() + "...";
    }
    out
}

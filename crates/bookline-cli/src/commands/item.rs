//! Item management commands for the CLI.

use std::path::Path;
use std::sync::Arc;

use bookline_core::{
    DiagnosticsSink, EngineConfig, ItemKind, LifecycleManager, NullDispatcher, RecurrenceRule,
    ReminderScheduler, SchedulableItem,
};
use chrono::{DateTime, Utc};
use clap::Subcommand;

use super::{load_items, save_items};

#[derive(Subcommand)]
pub enum ItemAction {
    /// Create a new item
    Add {
        /// Item title
        title: String,
        /// Due moment, RFC 3339 (e.g. 2025-06-01T09:00:00Z)
        #[arg(long)]
        due: DateTime<Utc>,
        /// Recurrence: none, daily, weekly, monthly
        #[arg(long, default_value = "none")]
        recurrence: String,
        /// Minutes before the due moment at which to remind
        #[arg(long)]
        offset_min: Option<i64>,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
        /// Appointment occurrence instead of a task
        #[arg(long)]
        appointment: bool,
    },
    /// List items
    List {
        /// Only not-completed items due from now on
        #[arg(long)]
        upcoming: bool,
        /// Only not-completed items already past due
        #[arg(long)]
        overdue: bool,
    },
    /// Mark an item completed; recurring items spawn their next occurrence
    Complete {
        /// Item ID
        id: String,
    },
    /// Clear an item's completion flag
    UndoComplete {
        /// Item ID
        id: String,
    },
    /// Delete an item
    Delete {
        /// Item ID
        id: String,
    },
}

fn parse_recurrence(value: &str) -> Result<RecurrenceRule, String> {
    match value {
        "none" => Ok(RecurrenceRule::None),
        "daily" => Ok(RecurrenceRule::Daily),
        "weekly" => Ok(RecurrenceRule::Weekly),
        "monthly" => Ok(RecurrenceRule::Monthly),
        other => Err(format!(
            "unknown recurrence '{other}' (expected none, daily, weekly, or monthly)"
        )),
    }
}

pub fn run(
    action: ItemAction,
    data: &Path,
    config_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::load_from(config_path)?;
    let sink = DiagnosticsSink::new(config.diagnostics.audit_capacity);
    let mut manager = LifecycleManager::with_items(sink.clone(), load_items(data)?);

    match action {
        ItemAction::Add {
            title,
            due,
            recurrence,
            offset_min,
            notes,
            appointment,
        } => {
            let mut item = SchedulableItem::new(title, due)
                .with_recurrence(parse_recurrence(&recurrence)?)
                .with_reminder_offset_min(
                    offset_min.unwrap_or(config.reminders.default_offset_min),
                );
            if let Some(notes) = notes {
                item = item.with_notes(notes);
            }
            if appointment {
                item = item.with_kind(ItemKind::AppointmentOccurrence);
            }

            let added = item.clone();
            manager.add(item)?;

            // Registration is in-memory only here; a desktop shell would
            // pass a real notification backend instead.
            let reminders =
                ReminderScheduler::new(Arc::new(NullDispatcher::new()), sink);
            if let Err(e) = reminders.schedule_reminder(&added, Utc::now()) {
                if e.is_soft() {
                    eprintln!("note: {e}");
                } else {
                    return Err(e.into());
                }
            }

            save_items(data, manager.items())?;
            println!("{}", serde_json::to_string_pretty(&added)?);
        }

        ItemAction::List { upcoming, overdue } => {
            let now = Utc::now();
            let rows: Vec<&SchedulableItem> = if upcoming {
                manager.upcoming(now)
            } else if overdue {
                manager.overdue(now)
            } else {
                manager.items().iter().collect()
            };
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }

        ItemAction::Complete { id } => {
            if manager.get(&id).is_none() {
                println!("no item with id {id}");
            } else {
                match manager.complete(&id) {
                    Some(next) => println!("completed {id}; spawned next occurrence {next}"),
                    None => println!("completed {id}"),
                }
                save_items(data, manager.items())?;
            }
        }

        ItemAction::UndoComplete { id } => {
            if manager.get(&id).is_none() {
                println!("no item with id {id}");
            } else {
                manager.undo_complete(&id);
                save_items(data, manager.items())?;
                println!("reactivated {id}");
            }
        }

        ItemAction::Delete { id } => {
            match manager.delete(&id) {
                Some(item) => println!("deleted '{}'", item.title),
                None => println!("no item with id {id}"),
            }
            save_items(data, manager.items())?;
        }
    }

    Ok(())
}

//! Interactive front end.
//!
//! A small line-based loop standing where a modal dialog would: `edit <id>`
//! opens an editor session for one goal, and the session's subcommands map
//! one-to-one onto [`GoalEditor`] operations until the modal closes (Save
//! confirmed by the backend, or Cancel). All logic lives in the editor; this
//! module only dispatches and displays.

use crate::api::GoalApi;
use crate::editor::{ClickEvent, GoalEditor, SaveOutcome};
use crate::errors::Result;
use crate::models::Goal;
use crate::store::{GoalStore, SharedGoalStore};
use chrono::NaiveDate;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, instrument};

type InputLines = Lines<BufReader<Stdin>>;

fn prompt(text: &str) -> Result<()> {
    print!("{text}");
    std::io::stdout().flush()?;
    Ok(())
}

fn render_goal(goal: &Goal) -> String {
    format!(
        "#{} {} {}, target {:.2} by {}, balance {:.2} (created {})",
        goal.id,
        goal.icon.as_deref().unwrap_or("·"),
        goal.name,
        goal.target_amount,
        goal.target_date,
        goal.balance,
        goal.created.format("%Y-%m-%d"),
    )
}

fn print_help() {
    println!("Commands:");
    println!("  goals        list all goals");
    println!("  edit <id>    open the editor for a goal");
    println!("  help         show this help");
    println!("  quit         exit");
}

fn print_editor_help() {
    println!("Editor commands:");
    println!("  name <text>     edit the name");
    println!("  amount <text>   edit the target amount");
    println!("  date <iso>      pick a target date, e.g. 2027-06-01");
    println!("  picker          toggle the icon picker overlay");
    println!("  icon <emoji>    pick an icon (picker must be open)");
    println!("  show            show the record, live store state and drafts");
    println!("  save            save and close on backend confirmation");
    println!("  cancel          close without saving");
}

/// Runs the shell until stdin closes or the user quits.
#[instrument(skip(store, api))]
pub async fn run_shell(store: Arc<SharedGoalStore>, api: Arc<dyn GoalApi>) -> Result<()> {
    info!("Starting interactive shell.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_help();

    loop {
        prompt("> ")?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        let (command, rest) = split_command(line);
        match command {
            "" => {}
            "goals" => {
                let goals = store.all();
                if goals.is_empty() {
                    println!("No goals yet.");
                }
                for goal in goals {
                    println!("{}", render_goal(&goal));
                }
            }
            "edit" => match rest.parse::<i64>() {
                Ok(id) => edit_goal(&mut lines, &store, Arc::clone(&api), id).await?,
                Err(_) => println!("Usage: edit <id>"),
            },
            "help" => print_help(),
            "quit" | "exit" => break,
            other => println!("Unknown command '{other}'. Try 'help'."),
        }
    }
    info!("Shell exiting.");
    Ok(())
}

async fn edit_goal(
    lines: &mut InputLines,
    store: &Arc<SharedGoalStore>,
    api: Arc<dyn GoalApi>,
    id: i64,
) -> Result<()> {
    let Some(goal) = store.get(id) else {
        println!("No goal with id {id}.");
        return Ok(());
    };

    println!("Editing {}", render_goal(&goal));
    print_editor_help();
    let store_capability: Arc<dyn GoalStore> = store.clone();
    let mut editor = GoalEditor::new(goal, store_capability, api);

    while editor.is_open() {
        // Re-read the live record each cycle, like a connected view: an
        // external rename or replacement resets the drafts (icon excepted).
        if let Some(live) = store.get(id) {
            editor.sync_source(live);
        }

        prompt(&format!("goal {id}> "))?;
        let Some(line) = lines.next_line().await? else {
            editor.cancel();
            break;
        };
        let (command, rest) = split_command(line.trim());
        match command {
            "" => {}
            "name" => editor.edit_name(rest),
            "amount" => editor.edit_target_amount(rest),
            "date" => match rest.parse::<NaiveDate>() {
                Ok(date) => editor.pick_target_date(date),
                Err(_) => println!("Dates look like 2027-06-01."),
            },
            "picker" => {
                if editor.icon_picker_is_open() {
                    editor.close_icon_picker();
                    println!("Icon picker closed.");
                } else {
                    editor.open_icon_picker();
                    println!("Icon picker open. Pick with: icon <emoji>");
                }
            }
            "icon" => {
                if !editor.icon_picker_is_open() {
                    println!("Open the picker first ('picker').");
                } else if rest.is_empty() {
                    println!("Usage: icon <emoji>");
                } else {
                    let mut click = ClickEvent::new();
                    editor.pick_icon(rest, &mut click);
                    println!("Icon set to {rest}.");
                }
            }
            "show" => {
                println!("source:  {}", render_goal(editor.source()));
                println!("store:   {}", render_goal(&editor.current()));
                println!("drafts:  {:?}", editor.draft());
            }
            "save" => match editor.save().await {
                SaveOutcome::Saved => println!("Saved."),
                SaveOutcome::Failed => println!(
                    "Save failed ({}); still editing.",
                    editor.last_failure().unwrap_or("unknown failure")
                ),
            },
            "cancel" => editor.cancel(),
            "help" => print_editor_help(),
            other => println!("Unknown editor command '{other}'. Try 'help'."),
        }
    }
    println!("Editor closed.");
    Ok(())
}

fn split_command(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    }
}

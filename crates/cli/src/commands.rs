//! Subcommand dispatch against a loaded gradebook snapshot.

use std::sync::Arc;

use anyhow::{Context, Result};
use gradevis_core::{Clock, Config, SystemClock};
use gradevis_rules::{on_item_created, preview, RuleAdmin, VisibilityTask};
use gradevis_store::{MemoryStore, TracingCache};
use serde::Serialize;
use tracing::info;

use crate::cli::{CliArgs, Command, RulesCommand};
use crate::terminal::Terminal;

/// Whether the command changed the store and it must be written back.
pub enum Outcome {
    ReadOnly,
    Modified,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn run(
    args: CliArgs,
    config: &Config,
    store: &mut MemoryStore,
    terminal: &Terminal,
) -> Result<Outcome> {
    let clock = SystemClock;
    let json = args.json;

    match args.command {
        Command::Tick => {
            let task = VisibilityTask::new(Arc::new(SystemClock), Arc::new(TracingCache))
                .with_lookback(config.worker.lookback());
            let report = task.tick(store).context("periodic task failed")?;
            if json {
                print_json(&report)?;
            } else {
                terminal.print_tick(&report)?;
            }
            Ok(Outcome::Modified)
        }

        Command::React { item_id } => {
            let changed = on_item_created(store, item_id, clock.now())
                .with_context(|| format!("reacting to grade item {}", item_id))?;
            if changed {
                info!(item = item_id, "item hidden under hidden category");
                terminal.print_info(&format!("Grade item {} hidden", item_id))?;
                Ok(Outcome::Modified)
            } else {
                terminal.print_info(&format!("Grade item {} unchanged", item_id))?;
                Ok(Outcome::ReadOnly)
            }
        }

        Command::Rules(cmd) => run_rules(cmd, args.actor, json, config, store, &clock, terminal),
    }
}

fn run_rules(
    cmd: RulesCommand,
    actor: Option<i64>,
    json: bool,
    config: &Config,
    store: &mut MemoryStore,
    clock: &dyn Clock,
    terminal: &Terminal,
) -> Result<Outcome> {
    if let RulesCommand::Test(rule) = cmd {
        let draft = rule.into_draft(None, clock.now());
        let preview = preview(&*store, &draft).context("previewing rule")?;
        if json {
            print_json(&preview)?;
        } else {
            terminal.print_preview(&preview)?;
        }
        return Ok(Outcome::ReadOnly);
    }

    let mut admin = RuleAdmin::new(store, clock, config.admin.clone());
    match cmd {
        RulesCommand::List { sort, dir } => {
            let rules = admin.list(sort, dir)?;
            if json {
                print_json(&rules)?;
            } else {
                terminal.print_rules(&rules)?;
            }
            Ok(Outcome::ReadOnly)
        }

        RulesCommand::Show { id } => {
            let rule = admin.get(id)?;
            if json {
                print_json(&rule)?;
            } else {
                terminal.print_rule(&rule)?;
            }
            Ok(Outcome::ReadOnly)
        }

        RulesCommand::Add(rule) => {
            let saved = admin.create(rule.into_draft(None, clock.now()), actor)?;
            terminal.print_warnings(&saved.warnings)?;
            terminal.print_info(&format!("Rule {} created", saved.id))?;
            Ok(Outcome::Modified)
        }

        RulesCommand::Edit { id, rule } => {
            let base = admin.get(id)?.draft();
            let saved = admin.update(id, rule.into_draft(Some(base), clock.now()), actor)?;
            terminal.print_warnings(&saved.warnings)?;
            terminal.print_info(&format!("Rule {} updated", saved.id))?;
            Ok(Outcome::Modified)
        }

        RulesCommand::Duplicate { id } => {
            let copy = admin.duplicate(id, actor)?;
            terminal.print_info(&format!("Rule {} duplicated as {}", id, copy))?;
            Ok(Outcome::Modified)
        }

        RulesCommand::Delete { id } => {
            admin.delete(id)?;
            terminal.print_info(&format!("Rule {} deleted", id))?;
            Ok(Outcome::Modified)
        }

        // Answered above, before the store is borrowed for writing.
        RulesCommand::Test(_) => Ok(Outcome::ReadOnly),
    }
}

use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use gradevis_core::{RuleStatus, ScheduleRule};
use gradevis_rules::validation::ValidationWarning;
use gradevis_rules::{Preview, TickReport};
use std::io::{self, Write};

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const HEADER: Color = Color::Magenta;
    const PLANNED: Color = Color::Yellow;
    const EXECUTED: Color = Color::Green;
    const ERROR: Color = Color::Red;
    const WARNING: Color = Color::DarkYellow;
    const DIM: Color = Color::DarkGrey;
}

fn status_color(status: RuleStatus) -> Color {
    match status {
        RuleStatus::Planned => Colors::PLANNED,
        RuleStatus::Executed => Colors::EXECUTED,
        RuleStatus::Error => Colors::ERROR,
    }
}

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn pattern(value: &str, label: &str) -> String {
    if value.is_empty() {
        "*".to_string()
    } else {
        format!("{} ({})", value, label)
    }
}

/// Formats command results for a terminal.
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    /// Print the rule table.
    pub fn print_rules(&self, rules: &[ScheduleRule]) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!(
                "{:>4}  {:<24}  {:<24}  {:<6}  {:<16}  {:<9}  {:<16}\n",
                "ID", "COURSE", "CATEGORY", "ACTION", "SCHEDULED", "STATUS", "EXECUTED"
            )),
            ResetColor,
        )?;
        if rules.is_empty() {
            execute!(
                stdout,
                SetForegroundColor(Colors::DIM),
                Print("(no rules)\n"),
                ResetColor
            )?;
        }
        for rule in rules {
            let executed = rule
                .executed_at
                .map(|t| t.format(TIME_FORMAT).to_string())
                .unwrap_or_else(|| "-".to_string());
            execute!(
                stdout,
                Print(format!(
                    "{:>4}  {:<24}  {:<24}  {:<6}  {:<16}  ",
                    rule.id,
                    pattern(&rule.course_shortname, rule.course_shortname_matchtype.label()),
                    pattern(&rule.category_idnumber, rule.category_idnumber_matchtype.label()),
                    rule.action,
                    rule.scheduled_at.format(TIME_FORMAT),
                )),
                SetForegroundColor(status_color(rule.status)),
                Print(format!("{:<9}", rule.status)),
                ResetColor,
                Print(format!("  {:<16}\n", executed)),
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    /// Print one rule with its execution log.
    pub fn print_rule(&self, rule: &ScheduleRule) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!("Rule {}\n", rule.id)),
            ResetColor,
            Print(format!(
                "  course:    {}\n",
                pattern(&rule.course_shortname, rule.course_shortname_matchtype.label())
            )),
            Print(format!(
                "  category:  {}\n",
                pattern(&rule.category_idnumber, rule.category_idnumber_matchtype.label())
            )),
            Print(format!("  action:    {}\n", rule.action)),
            Print(format!("  scheduled: {}\n", rule.scheduled_at.format(TIME_FORMAT))),
            Print("  status:    "),
            SetForegroundColor(status_color(rule.status)),
            Print(format!("{}\n", rule.status)),
            ResetColor,
            Print(format!("  author:    {}\n", rule.adminid)),
        )?;
        if let Some(at) = rule.executed_at {
            execute!(stdout, Print(format!("  executed:  {}\n", at.format(TIME_FORMAT))))?;
        }
        if !rule.log.is_empty() {
            execute!(
                stdout,
                Print("  log:\n"),
                SetForegroundColor(Colors::DIM),
            )?;
            for line in rule.log.lines() {
                execute!(stdout, Print(format!("    {}\n", line)))?;
            }
            execute!(stdout, ResetColor)?;
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn print_preview(&self, preview: &Preview) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, Print(preview.to_string()))?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_tick(&self, report: &TickReport) -> Result<()> {
        let mut stdout = io::stdout();
        let swept = match &report.sweep {
            Some(s) => format!(
                "{} scanned, {} items hidden, {} categories hidden",
                s.scanned, s.items_hidden, s.subtrees_hidden
            ),
            None => "skipped".to_string(),
        };
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!("Tick at {}\n", report.started_at.format(TIME_FORMAT))),
            ResetColor,
            Print(format!("  parent hiding: {}\n", swept)),
            Print(format!("  executed:      {:?}\n", report.run.executed)),
            Print(format!("  failed:        {:?}\n", report.run.failed)),
            Print(format!("  synced:        {} categories\n", report.run.categories_synced)),
        )?;
        if let Some(reason) = &report.run.aborted {
            self.print_error(&format!("rule loop aborted: {}", reason))?;
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn print_info(&self, message: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, Print(format!("{}\n", message)))?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_warnings(&self, warnings: &[ValidationWarning]) -> Result<()> {
        let mut stderr = io::stderr();
        for w in warnings {
            execute!(
                stderr,
                SetForegroundColor(Colors::WARNING),
                Print(format!("warning: {}: {}\n", w.path, w.message)),
                ResetColor,
            )?;
        }
        Ok(())
    }

    pub fn print_error(&self, message: &str) -> Result<()> {
        let mut stderr = io::stderr();
        execute!(
            stderr,
            SetForegroundColor(Colors::ERROR),
            Print(format!("error: {}\n", message)),
            ResetColor,
        )?;
        Ok(())
    }
}

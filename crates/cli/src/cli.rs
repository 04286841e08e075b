use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use gradevis_core::{MatchType, RuleAction, RuleDraft, RuleId, UserId};
use gradevis_rules::{SortColumn, SortDirection};

/// Scheduled gradebook visibility rules.
///
/// Operates on the gradebook snapshot named by `--store` or `STORE_PATH`.
#[derive(Parser, Debug)]
#[command(name = "gradevis", version, about = "Scheduled gradebook visibility rules")]
pub struct CliArgs {
    /// Gradebook snapshot file (overrides STORE_PATH)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Administrator id recorded on created or edited rules
    #[arg(long, global = true, env = "GRADEVIS_ACTOR")]
    pub actor: Option<UserId>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one tick of the periodic task: parent-hiding sweep, due rules, flag sweep
    Tick,

    /// React to a newly created grade item
    React {
        /// Grade item id
        item_id: i64,
    },

    /// Manage schedule rules
    #[command(subcommand)]
    Rules(RulesCommand),
}

#[derive(Subcommand, Debug)]
pub enum RulesCommand {
    /// List all rules
    List {
        /// course_shortname, category_idnumber, action, scheduled_at, status or executed_at
        #[arg(long, default_value = "scheduled_at")]
        sort: SortColumn,

        /// asc or desc
        #[arg(long, default_value = "desc")]
        dir: SortDirection,
    },

    /// Show one rule with its execution log
    Show { id: RuleId },

    /// Create a planned rule
    Add(RuleArgs),

    /// Edit a rule; omitted fields keep their value. The rule is re-armed.
    Edit {
        id: RuleId,
        #[command(flatten)]
        rule: RuleArgs,
    },

    /// Copy a rule, scheduled one offset from now
    Duplicate { id: RuleId },

    /// Delete a rule
    Delete { id: RuleId },

    /// Show which courses and categories a rule would affect, without applying it
    Test(RuleArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RuleArgs {
    /// Course short name pattern (empty = every course)
    #[arg(long)]
    pub course: Option<String>,

    /// equals, contains, startswith or endswith
    #[arg(long)]
    pub course_match: Option<MatchType>,

    /// Category id-number pattern (empty = every category)
    #[arg(long)]
    pub category: Option<String>,

    /// equals, contains, startswith or endswith
    #[arg(long)]
    pub category_match: Option<MatchType>,

    /// show or hide
    #[arg(long)]
    pub action: Option<RuleAction>,

    /// Scheduled time, "YYYY-MM-DD HH:MM" in UTC or RFC 3339
    #[arg(long, value_parser = parse_time)]
    pub at: Option<DateTime<Utc>>,
}

impl RuleArgs {
    /// Overlay the given fields on `base`, or on a blank hide rule scheduled at `now`.
    pub fn into_draft(self, base: Option<RuleDraft>, now: DateTime<Utc>) -> RuleDraft {
        let mut draft = base.unwrap_or(RuleDraft {
            course_shortname: String::new(),
            course_shortname_matchtype: MatchType::Equals,
            category_idnumber: String::new(),
            category_idnumber_matchtype: MatchType::Equals,
            action: RuleAction::Hide,
            scheduled_at: now,
        });
        if let Some(v) = self.course {
            draft.course_shortname = v;
        }
        if let Some(v) = self.course_match {
            draft.course_shortname_matchtype = v;
        }
        if let Some(v) = self.category {
            draft.category_idnumber = v;
        }
        if let Some(v) = self.category_match {
            draft.category_idnumber_matchtype = v;
        }
        if let Some(v) = self.action {
            draft.action = v;
        }
        if let Some(v) = self.at {
            draft.scheduled_at = v;
        }
        draft
    }
}

/// Parse a scheduled time given on the command line.
pub fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            format!("invalid time '{}': expected \"YYYY-MM-DD HH:MM\" or RFC 3339", s)
        })
}

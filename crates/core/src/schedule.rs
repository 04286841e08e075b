//! Schedule rule records: one admin-authored, time-triggered visibility instruction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::matcher::MatchType;
use crate::model::UserId;

pub type RuleId = i64;

/// What a rule does to the matched subtree.
///
/// Stored values other than `show` read as [`RuleAction::Hide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleAction {
    Show,
    #[default]
    Hide,
}

impl RuleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleAction::Show => "show",
            RuleAction::Hide => "hide",
        }
    }

    /// Target visibility: `true` when the rule shows.
    pub fn visible(&self) -> bool {
        matches!(self, RuleAction::Show)
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "show" => Ok(RuleAction::Show),
            "hide" => Ok(RuleAction::Hide),
            other => Err(format!("unknown action: '{}'", other)),
        }
    }
}

impl From<String> for RuleAction {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl From<RuleAction> for String {
    fn from(a: RuleAction) -> Self {
        a.as_str().to_string()
    }
}

/// Execution status, stored as `0` (planned), `1` (executed), `2` (error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RuleStatus {
    Planned = 0,
    Executed = 1,
    Error = 2,
}

impl RuleStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RuleStatus::Planned => "Planned",
            RuleStatus::Executed => "Executed",
            RuleStatus::Error => "Error",
        }
    }
}

impl TryFrom<u8> for RuleStatus {
    type Error = String;

    fn try_from(v: u8) -> std::result::Result<Self, String> {
        match v {
            0 => Ok(RuleStatus::Planned),
            1 => Ok(RuleStatus::Executed),
            2 => Ok(RuleStatus::Error),
            other => Err(format!("unknown rule status: {}", other)),
        }
    }
}

impl From<RuleStatus> for u8 {
    fn from(s: RuleStatus) -> Self {
        s as u8
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Persisted rule record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRule {
    pub id: RuleId,
    #[serde(default)]
    pub course_shortname: String,
    #[serde(default)]
    pub course_shortname_matchtype: MatchType,
    #[serde(default)]
    pub category_idnumber: String,
    #[serde(default)]
    pub category_idnumber_matchtype: MatchType,
    #[serde(default)]
    pub action: RuleAction,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub scheduled_at: DateTime<Utc>,
    pub status: RuleStatus,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub executed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub adminid: UserId,
}

impl ScheduleRule {
    pub fn from_draft(id: RuleId, draft: RuleDraft, adminid: UserId) -> Self {
        Self {
            id,
            course_shortname: draft.course_shortname,
            course_shortname_matchtype: draft.course_shortname_matchtype,
            category_idnumber: draft.category_idnumber,
            category_idnumber_matchtype: draft.category_idnumber_matchtype,
            action: draft.action,
            scheduled_at: draft.scheduled_at,
            status: RuleStatus::Planned,
            executed_at: None,
            log: String::new(),
            adminid,
        }
    }

    /// Due when still planned and its time has come. There is no lower bound.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == RuleStatus::Planned && self.scheduled_at <= now
    }

    /// Record a successful execution. Returns `false` (and changes nothing)
    /// if the rule already left the planned state.
    pub fn mark_executed(&mut self, at: DateTime<Utc>, log: impl Into<String>) -> bool {
        if self.status != RuleStatus::Planned {
            return false;
        }
        self.status = RuleStatus::Executed;
        self.executed_at = Some(at);
        self.log = log.into();
        true
    }

    /// Record a failed execution; same planned-only guard as [`mark_executed`](Self::mark_executed).
    pub fn mark_failed(&mut self, log: impl Into<String>) -> bool {
        if self.status != RuleStatus::Planned {
            return false;
        }
        self.status = RuleStatus::Error;
        self.log = log.into();
        true
    }

    pub fn draft(&self) -> RuleDraft {
        RuleDraft {
            course_shortname: self.course_shortname.clone(),
            course_shortname_matchtype: self.course_shortname_matchtype,
            category_idnumber: self.category_idnumber.clone(),
            category_idnumber_matchtype: self.category_idnumber_matchtype,
            action: self.action,
            scheduled_at: self.scheduled_at,
        }
    }
}

/// The editable part of a rule, as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDraft {
    pub course_shortname: String,
    pub course_shortname_matchtype: MatchType,
    pub category_idnumber: String,
    pub category_idnumber_matchtype: MatchType,
    pub action: RuleAction,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub scheduled_at: DateTime<Utc>,
}

impl RuleDraft {
    /// Trim both patterns, as the authoring surface does before saving.
    pub fn trimmed(mut self) -> Self {
        self.course_shortname = self.course_shortname.trim().to_string();
        self.category_idnumber = self.category_idnumber.trim().to_string();
        self
    }
}

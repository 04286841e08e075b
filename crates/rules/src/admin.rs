//! Rule administration: list, create, edit, duplicate, delete.
//!
//! Every mutation goes through [`validate_draft`]; an invalid draft is
//! rejected with `GradevisError::Validation` and nothing is written.
//! Editing a rule re-arms it: status returns to planned, the execution time
//! and log are cleared.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use gradevis_core::config::AdminConfig;
use gradevis_core::{Clock, Result, RuleDraft, RuleId, RuleStatus, ScheduleRule, UserId};
use gradevis_store::ScheduleStore;
use tracing::info;

use crate::validation::{validate_draft, ValidationWarning};

/// Sortable columns of the rule list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    CourseShortname,
    CategoryIdnumber,
    Action,
    #[default]
    ScheduledAt,
    Status,
    ExecutedAt,
}

impl SortColumn {
    pub const ALL: [SortColumn; 6] = [
        SortColumn::CourseShortname,
        SortColumn::CategoryIdnumber,
        SortColumn::Action,
        SortColumn::ScheduledAt,
        SortColumn::Status,
        SortColumn::ExecutedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortColumn::CourseShortname => "course_shortname",
            SortColumn::CategoryIdnumber => "category_idnumber",
            SortColumn::Action => "action",
            SortColumn::ScheduledAt => "scheduled_at",
            SortColumn::Status => "status",
            SortColumn::ExecutedAt => "executed_at",
        }
    }

    fn compare(&self, a: &ScheduleRule, b: &ScheduleRule) -> Ordering {
        match self {
            SortColumn::CourseShortname => a.course_shortname.cmp(&b.course_shortname),
            SortColumn::CategoryIdnumber => a.category_idnumber.cmp(&b.category_idnumber),
            SortColumn::Action => a.action.as_str().cmp(b.action.as_str()),
            SortColumn::ScheduledAt => a.scheduled_at.cmp(&b.scheduled_at),
            SortColumn::Status => a.status.cmp(&b.status),
            SortColumn::ExecutedAt => a.executed_at.cmp(&b.executed_at),
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        SortColumn::ALL
            .into_iter()
            .find(|c| c.as_str() == key)
            .ok_or_else(|| format!("unknown sort column: '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction: '{}'", other)),
        }
    }
}

/// A successful save, with any advisory warnings.
#[derive(Debug, Clone)]
pub struct Saved {
    pub id: RuleId,
    pub warnings: Vec<ValidationWarning>,
}

/// Administrative operations over a [`ScheduleStore`].
pub struct RuleAdmin<'a, S: ScheduleStore + ?Sized> {
    store: &'a mut S,
    clock: &'a dyn Clock,
    config: AdminConfig,
}

impl<'a, S: ScheduleStore + ?Sized> RuleAdmin<'a, S> {
    pub fn new(store: &'a mut S, clock: &'a dyn Clock, config: AdminConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// All rules, sorted by `column` with the rule id as tie-breaker.
    pub fn list(&self, column: SortColumn, direction: SortDirection) -> Result<Vec<ScheduleRule>> {
        let mut rules = self.store.rules()?;
        rules.sort_by(|a, b| {
            let ord = column.compare(a, b).then(a.id.cmp(&b.id));
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        Ok(rules)
    }

    pub fn get(&self, id: RuleId) -> Result<ScheduleRule> {
        Ok(self.store.require_rule(id)?)
    }

    /// Store a new planned rule authored by `actor` (or the configured default).
    pub fn create(&mut self, draft: RuleDraft, actor: Option<UserId>) -> Result<Saved> {
        let draft = draft.trimmed();
        let warnings = validate_draft(&draft, self.clock.now()).into_result()?;
        let adminid = actor.unwrap_or(self.config.default_actor_id);
        let id = self.store.insert_rule(draft, adminid)?;
        info!(rule = id, adminid, "rule created");
        Ok(Saved { id, warnings })
    }

    /// Replace a rule's fields and re-arm it.
    pub fn update(
        &mut self,
        id: RuleId,
        draft: RuleDraft,
        actor: Option<UserId>,
    ) -> Result<Saved> {
        let existing = self.store.require_rule(id)?;
        let draft = draft.trimmed();
        let warnings = validate_draft(&draft, self.clock.now()).into_result()?;
        let adminid = actor.unwrap_or(existing.adminid);
        let rule = ScheduleRule::from_draft(id, draft, adminid);
        self.store.update_rule(&rule)?;
        info!(rule = id, adminid, previous = %existing.status, "rule updated and re-armed");
        Ok(Saved { id, warnings })
    }

    /// Copy a rule as a new planned rule scheduled one offset from now.
    pub fn duplicate(&mut self, id: RuleId, actor: Option<UserId>) -> Result<RuleId> {
        let source = self.store.require_rule(id)?;
        let mut draft = source.draft();
        draft.scheduled_at = self.clock.now() + self.config.duplicate_offset();
        let adminid = actor.unwrap_or(self.config.default_actor_id);
        let copy = self.store.insert_rule(draft, adminid)?;
        info!(rule = id, copy, "rule duplicated");
        Ok(copy)
    }

    pub fn delete(&mut self, id: RuleId) -> Result<()> {
        self.store.delete_rule(id)?;
        info!(rule = id, "rule deleted");
        Ok(())
    }

    /// Rules still waiting to run.
    pub fn pending(&self) -> Result<Vec<ScheduleRule>> {
        Ok(self
            .store
            .rules()?
            .into_iter()
            .filter(|r| r.status == RuleStatus::Planned)
            .collect())
    }
}

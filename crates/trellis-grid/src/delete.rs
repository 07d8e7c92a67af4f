use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::GridError;
use crate::locale::Localizer;
use crate::predicate::Predicate;

/// Which delete entry point a dependency applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteMode {
    Delete,
    DeleteAll,
}

/// A dependent table cascaded before the main delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependency {
    pub table: String,
    pub foreign_key: String,
    #[serde(default = "all_modes")]
    pub on: Vec<DeleteMode>,
}

fn all_modes() -> Vec<DeleteMode> {
    vec![DeleteMode::Delete, DeleteMode::DeleteAll]
}

impl Dependency {
    pub fn new(table: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            foreign_key: foreign_key.into(),
            on: all_modes(),
        }
    }

    pub fn only_on(mut self, modes: Vec<DeleteMode>) -> Self {
        self.on = modes;
        self
    }
}

/// Declarative delete behavior for one grid target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRule {
    pub table: String,
    pub primary_key: String,
    /// Rows with this flag set to 1 are protected from deletion.
    #[serde(default)]
    pub lock_field: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    /// Tables whose auto-increment sequences are reset after delete-all.
    #[serde(default)]
    pub reset_tables: Vec<String>,
}

impl DeleteRule {
    pub fn new(table: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            primary_key: primary_key.into(),
            lock_field: None,
            dependencies: Vec::new(),
            reset_tables: Vec::new(),
        }
    }
}

/// Three-way outcome classification rendered by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeClass {
    Accept,
    Warning,
    Error,
}

/// Structured result of one delete call. Computed once, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteOutcome {
    pub selected: u64,
    pub deleted: u64,
    pub missed: u64,
    pub success: bool,
    pub classification: OutcomeClass,
    pub message: String,
}

/// External mutation collaborator for deletes.
pub trait DeleteTarget {
    /// Delete rows matching the predicate (all rows when `None`),
    /// returning the affected count.
    fn delete_where(&mut self, table: &str, predicate: Option<&Predicate>)
    -> Result<u64, GridError>;

    fn count_where(&self, table: &str, predicate: Option<&Predicate>) -> Result<u64, GridError>;

    fn reset_sequence(&mut self, table: &str) -> Result<(), GridError>;
}

pub type CleanupFn = Box<dyn Fn(&[Value], &mut dyn DeleteTarget) -> Result<(), GridError>>;
pub type ExpandFn = Box<dyn Fn(&[Value]) -> Vec<Value>>;
pub type BeforeFn = Box<dyn Fn(DeleteMode, &[Value]) -> bool>;
pub type AfterFn = Box<dyn Fn(&DeleteOutcome)>;

/// Orchestrates delete-by-selection and delete-all: cancelable before
/// hook, dependency cascade, row-lock guard, structured outcome.
///
/// Neither entry point fails: every path, including a failing store,
/// folds into a [`DeleteOutcome`] so the UI can render partial-success
/// messaging uniformly.
pub struct DeleteOrchestrator<'a> {
    rule: &'a DeleteRule,
    locale: &'a dyn Localizer,
    expand: Option<ExpandFn>,
    cleanups: Vec<CleanupFn>,
    before: Option<BeforeFn>,
    after: Option<AfterFn>,
}

impl<'a> DeleteOrchestrator<'a> {
    pub fn new(rule: &'a DeleteRule, locale: &'a dyn Localizer) -> Self {
        Self {
            rule,
            locale,
            expand: None,
            cleanups: Vec::new(),
            before: None,
            after: None,
        }
    }

    /// Adjacency resolver: widens the selection before deletion (e.g. to
    /// include child identifiers).
    pub fn expand_selection<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Value]) -> Vec<Value> + 'static,
    {
        self.expand = Some(Box::new(f));
        self
    }

    /// Cancelable pre-delete check. Returning false aborts with no side
    /// effects.
    pub fn on_before<F>(mut self, f: F) -> Self
    where
        F: Fn(DeleteMode, &[Value]) -> bool + 'static,
    {
        self.before = Some(Box::new(f));
        self
    }

    pub fn on_after<F>(mut self, f: F) -> Self
    where
        F: Fn(&DeleteOutcome) + 'static,
    {
        self.after = Some(Box::new(f));
        self
    }

    /// Custom cleanup invoked after the dependency cascade, before the
    /// main delete.
    pub fn add_cleanup<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Value], &mut dyn DeleteTarget) -> Result<(), GridError> + 'static,
    {
        self.cleanups.push(Box::new(f));
        self
    }

    pub fn delete_selection(&self, ids: &[Value], target: &mut dyn DeleteTarget) -> DeleteOutcome {
        let ids = match &self.expand {
            Some(expand) => expand(ids),
            None => ids.to_vec(),
        };
        let selected = ids.len() as u64;

        if !self.fire_before(DeleteMode::Delete, &ids) {
            return self.cancelled(selected);
        }

        if let Err(e) = self.cascade(DeleteMode::Delete, &ids, target) {
            warn!(error = %e, table = %self.rule.table, "dependency cascade failed");
            return self.finish(selected, 0, selected);
        }

        let condition = self.guarded(Predicate::In(self.rule.primary_key.clone(), ids));
        let deleted = match target.delete_where(&self.rule.table, Some(&condition)) {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, table = %self.rule.table, "delete failed");
                0
            }
        };
        let missed = selected.saturating_sub(deleted);
        self.finish(selected, deleted, missed)
    }

    pub fn delete_all(&self, target: &mut dyn DeleteTarget) -> DeleteOutcome {
        if !self.fire_before(DeleteMode::DeleteAll, &[]) {
            return self.cancelled(0);
        }

        let selected = match target.count_where(&self.rule.table, None) {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, table = %self.rule.table, "count failed");
                return self.finish(0, 0, 0);
            }
        };

        if let Err(e) = self.cascade(DeleteMode::DeleteAll, &[], target) {
            warn!(error = %e, table = %self.rule.table, "dependency cascade failed");
            return self.finish(selected, 0, selected);
        }

        let condition = self
            .rule
            .lock_field
            .as_ref()
            .map(|lock| Predicate::NotEq(lock.clone(), json!(1)));
        let deleted = match target.delete_where(&self.rule.table, condition.as_ref()) {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, table = %self.rule.table, "delete failed");
                0
            }
        };

        // Skipped rows are whatever survived the delete (locked rows).
        let missed = target.count_where(&self.rule.table, None).unwrap_or(0);

        for table in &self.rule.reset_tables {
            if let Err(e) = target.reset_sequence(table) {
                warn!(error = %e, table = %table, "sequence reset failed");
            }
        }

        self.finish(selected, deleted, missed)
    }

    fn guarded(&self, identity: Predicate) -> Predicate {
        match &self.rule.lock_field {
            Some(lock) => Predicate::And(vec![
                identity,
                Predicate::NotEq(lock.clone(), json!(1)),
            ]),
            None => identity,
        }
    }

    fn cascade(
        &self,
        mode: DeleteMode,
        ids: &[Value],
        target: &mut dyn DeleteTarget,
    ) -> Result<(), GridError> {
        for dependency in &self.rule.dependencies {
            if !dependency.on.contains(&mode) {
                continue;
            }
            let predicate = match mode {
                DeleteMode::Delete => {
                    Some(Predicate::In(dependency.foreign_key.clone(), ids.to_vec()))
                }
                DeleteMode::DeleteAll => None,
            };
            let n = target.delete_where(&dependency.table, predicate.as_ref())?;
            debug!(table = %dependency.table, deleted = n, "cascaded dependent delete");
        }
        for cleanup in &self.cleanups {
            cleanup(ids, target)?;
        }
        Ok(())
    }

    fn fire_before(&self, mode: DeleteMode, ids: &[Value]) -> bool {
        self.before.as_ref().is_none_or(|hook| hook(mode, ids))
    }

    fn finish(&self, selected: u64, deleted: u64, missed: u64) -> DeleteOutcome {
        let (classification, key) = if deleted > 0 && missed == 0 {
            (OutcomeClass::Accept, "grid.delete.success")
        } else if deleted > 0 {
            (OutcomeClass::Warning, "grid.delete.partial")
        } else {
            (OutcomeClass::Error, "grid.delete.failed")
        };
        let outcome = DeleteOutcome {
            selected,
            deleted,
            missed,
            success: missed == 0,
            classification,
            message: self
                .locale
                .t(key, &[&deleted.to_string(), &missed.to_string()]),
        };
        if let Some(hook) = &self.after {
            hook(&outcome);
        }
        outcome
    }

    fn cancelled(&self, selected: u64) -> DeleteOutcome {
        DeleteOutcome {
            selected,
            deleted: 0,
            missed: 0,
            success: true,
            classification: OutcomeClass::Warning,
            message: self.locale.t("grid.delete.cancelled", &[]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::KeyLocalizer;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Scripted target recording calls and returning canned counts.
    #[derive(Default)]
    struct ScriptedTarget {
        delete_results: Vec<Result<u64, GridError>>,
        count_results: RefCell<Vec<u64>>,
        deletes: Vec<(String, Option<Predicate>)>,
        resets: Vec<String>,
    }

    impl DeleteTarget for ScriptedTarget {
        fn delete_where(
            &mut self,
            table: &str,
            predicate: Option<&Predicate>,
        ) -> Result<u64, GridError> {
            self.deletes.push((table.to_string(), predicate.cloned()));
            if self.delete_results.is_empty() {
                Ok(0)
            } else {
                self.delete_results.remove(0)
            }
        }

        fn count_where(
            &self,
            _table: &str,
            _predicate: Option<&Predicate>,
        ) -> Result<u64, GridError> {
            let mut counts = self.count_results.borrow_mut();
            if counts.is_empty() {
                Ok(0)
            } else {
                Ok(counts.remove(0))
            }
        }

        fn reset_sequence(&mut self, table: &str) -> Result<(), GridError> {
            self.resets.push(table.to_string());
            Ok(())
        }
    }

    fn ids(values: &[i64]) -> Vec<Value> {
        values.iter().map(|v| json!(v)).collect()
    }

    #[test]
    fn full_success_classifies_accept() {
        let rule = DeleteRule::new("users", "id");
        let locale = KeyLocalizer;
        let orchestrator = DeleteOrchestrator::new(&rule, &locale);
        let mut target = ScriptedTarget {
            delete_results: vec![Ok(3)],
            ..Default::default()
        };
        let outcome = orchestrator.delete_selection(&ids(&[1, 2, 3]), &mut target);
        assert_eq!(outcome.selected, 3);
        assert_eq!(outcome.deleted, 3);
        assert_eq!(outcome.missed, 0);
        assert!(outcome.success);
        assert_eq!(outcome.classification, OutcomeClass::Accept);
    }

    #[test]
    fn partial_success_classifies_warning() {
        let rule = DeleteRule::new("users", "id");
        let locale = KeyLocalizer;
        let orchestrator = DeleteOrchestrator::new(&rule, &locale);
        let mut target = ScriptedTarget {
            delete_results: vec![Ok(3)],
            ..Default::default()
        };
        let outcome = orchestrator.delete_selection(&ids(&[1, 2, 3, 4, 5]), &mut target);
        assert_eq!(outcome.selected, 5);
        assert_eq!(outcome.deleted, 3);
        assert_eq!(outcome.missed, 2);
        assert!(!outcome.success);
        assert_eq!(outcome.classification, OutcomeClass::Warning);
    }

    #[test]
    fn store_failure_classifies_error_without_raising() {
        let rule = DeleteRule::new("users", "id");
        let locale = KeyLocalizer;
        let orchestrator = DeleteOrchestrator::new(&rule, &locale);
        let mut target = ScriptedTarget {
            delete_results: vec![Err(GridError::Delete("connection lost".into()))],
            ..Default::default()
        };
        let outcome = orchestrator.delete_selection(&ids(&[1, 2]), &mut target);
        assert_eq!(outcome.deleted, 0);
        assert_eq!(outcome.missed, 2);
        assert!(!outcome.success);
        assert_eq!(outcome.classification, OutcomeClass::Error);
    }

    #[test]
    fn success_iff_missed_is_zero() {
        // Nothing selected, nothing deleted: error classification but the
        // success flag still follows missed == 0.
        let rule = DeleteRule::new("users", "id");
        let locale = KeyLocalizer;
        let orchestrator = DeleteOrchestrator::new(&rule, &locale);
        let mut target = ScriptedTarget::default();
        let outcome = orchestrator.delete_selection(&[], &mut target);
        assert_eq!(outcome.classification, OutcomeClass::Error);
        assert!(outcome.success);
    }

    #[test]
    fn lock_guard_applied_in_both_modes() {
        let mut rule = DeleteRule::new("users", "id");
        rule.lock_field = Some("_lock".into());
        let locale = KeyLocalizer;
        let orchestrator = DeleteOrchestrator::new(&rule, &locale);

        let mut target = ScriptedTarget {
            delete_results: vec![Ok(1), Ok(5)],
            ..Default::default()
        };
        orchestrator.delete_selection(&ids(&[1]), &mut target);
        orchestrator.delete_all(&mut target);

        let (_, selection_condition) = &target.deletes[0];
        assert!(matches!(
            selection_condition,
            Some(Predicate::And(parts))
                if matches!(&parts[1], Predicate::NotEq(f, v) if f == "_lock" && *v == json!(1))
        ));
        let (_, all_condition) = &target.deletes[1];
        assert!(matches!(
            all_condition,
            Some(Predicate::NotEq(f, _)) if f == "_lock"
        ));
    }

    #[test]
    fn before_hook_cancels_with_no_side_effects() {
        let rule = DeleteRule::new("users", "id");
        let locale = KeyLocalizer;
        let orchestrator =
            DeleteOrchestrator::new(&rule, &locale).on_before(|_mode, _ids| false);
        let mut target = ScriptedTarget::default();
        let outcome = orchestrator.delete_selection(&ids(&[1, 2]), &mut target);
        assert!(target.deletes.is_empty());
        assert_eq!(outcome.deleted, 0);
        assert_eq!(outcome.message, "grid.delete.cancelled");
    }

    #[test]
    fn dependencies_cascade_before_main_delete() {
        let mut rule = DeleteRule::new("users", "id");
        rule.dependencies = vec![Dependency::new("user_roles", "user_id")];
        let locale = KeyLocalizer;
        let orchestrator = DeleteOrchestrator::new(&rule, &locale);
        let mut target = ScriptedTarget {
            delete_results: vec![Ok(4), Ok(2)],
            ..Default::default()
        };
        orchestrator.delete_selection(&ids(&[1, 2]), &mut target);

        assert_eq!(target.deletes[0].0, "user_roles");
        assert!(matches!(
            &target.deletes[0].1,
            Some(Predicate::In(f, items)) if f == "user_id" && items.len() == 2
        ));
        assert_eq!(target.deletes[1].0, "users");
    }

    #[test]
    fn dependency_mode_filter_respected() {
        let mut rule = DeleteRule::new("users", "id");
        rule.dependencies =
            vec![Dependency::new("audit_log", "user_id").only_on(vec![DeleteMode::DeleteAll])];
        let locale = KeyLocalizer;
        let orchestrator = DeleteOrchestrator::new(&rule, &locale);
        let mut target = ScriptedTarget {
            delete_results: vec![Ok(1)],
            ..Default::default()
        };
        orchestrator.delete_selection(&ids(&[1]), &mut target);
        assert_eq!(target.deletes.len(), 1);
        assert_eq!(target.deletes[0].0, "users");
    }

    #[test]
    fn delete_all_counts_remaining_as_missed_and_resets_sequences() {
        let mut rule = DeleteRule::new("users", "id");
        rule.lock_field = Some("_lock".into());
        rule.reset_tables = vec!["users".into()];
        let locale = KeyLocalizer;
        let orchestrator = DeleteOrchestrator::new(&rule, &locale);
        // 10 rows before, 2 locked rows survive.
        let mut target = ScriptedTarget {
            delete_results: vec![Ok(8)],
            count_results: RefCell::new(vec![10, 2]),
            ..Default::default()
        };
        let outcome = orchestrator.delete_all(&mut target);
        assert_eq!(outcome.selected, 10);
        assert_eq!(outcome.deleted, 8);
        assert_eq!(outcome.missed, 2);
        assert!(!outcome.success);
        assert_eq!(outcome.classification, OutcomeClass::Warning);
        assert_eq!(target.resets, ["users"]);
    }

    #[test]
    fn selection_expander_widens_ids() {
        let rule = DeleteRule::new("pages", "id");
        let locale = KeyLocalizer;
        let orchestrator = DeleteOrchestrator::new(&rule, &locale).expand_selection(|ids| {
            let mut all = ids.to_vec();
            all.push(json!(99)); // adjacency child
            all
        });
        let mut target = ScriptedTarget {
            delete_results: vec![Ok(2)],
            ..Default::default()
        };
        let outcome = orchestrator.delete_selection(&ids(&[7]), &mut target);
        assert_eq!(outcome.selected, 2);
        assert!(matches!(
            &target.deletes[0].1,
            Some(Predicate::And(_) | Predicate::In(..))
        ));
    }

    #[test]
    fn after_hook_sees_outcome() {
        let rule = DeleteRule::new("users", "id");
        let locale = KeyLocalizer;
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        let orchestrator = DeleteOrchestrator::new(&rule, &locale)
            .on_after(move |outcome| *sink.borrow_mut() = Some(outcome.classification));
        let mut target = ScriptedTarget {
            delete_results: vec![Ok(1)],
            ..Default::default()
        };
        orchestrator.delete_selection(&ids(&[1]), &mut target);
        assert_eq!(*seen.borrow(), Some(OutcomeClass::Accept));
    }
}

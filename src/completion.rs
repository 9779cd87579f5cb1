//! Completion-state coupling between a task and its subtasks.
//!
//! The coupling is asymmetric on purpose: completing a task sweeps every
//! subtask along with it, un-completing a task leaves the subtasks alone,
//! and any subtask mutation recomputes the parent flag from what remains.
//! Each rule runs strictly after the mutation that triggered it, inside the
//! same transaction.

/// Whether a task toggle must force every subtask to the completed state.
/// Only the completing direction cascades.
pub fn cascade_to_subtasks(now_completed: bool, has_subtasks: bool) -> bool {
    now_completed && has_subtasks
}

/// Parent flag derived from the remaining subtask flags after a subtask was
/// toggled or deleted. `None` when no subtasks remain: with nothing left to
/// aggregate, the stored flag is left untouched.
pub fn derived_parent_flag(subtask_flags: &[bool]) -> Option<bool> {
    if subtask_flags.is_empty() {
        None
    } else {
        Some(subtask_flags.iter().all(|completed| *completed))
    }
}

/// A completed task cannot silently absorb new unfinished work: adding a
/// subtask to it forces the task back to incomplete.
pub fn reopen_on_new_subtask(parent_completed: bool) -> bool {
    parent_completed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completing_cascades_only_with_subtasks() {
        assert!(cascade_to_subtasks(true, true));
        assert!(!cascade_to_subtasks(true, false));
    }

    #[test]
    fn uncompleting_never_cascades() {
        assert!(!cascade_to_subtasks(false, true));
        assert!(!cascade_to_subtasks(false, false));
    }

    #[test]
    fn parent_complete_iff_all_remaining_complete() {
        assert_eq!(derived_parent_flag(&[true, true, true]), Some(true));
        assert_eq!(derived_parent_flag(&[true, false, true]), Some(false));
        assert_eq!(derived_parent_flag(&[false]), Some(false));
        assert_eq!(derived_parent_flag(&[true]), Some(true));
    }

    #[test]
    fn empty_subtask_set_leaves_parent_untouched() {
        assert_eq!(derived_parent_flag(&[]), None);
    }

    #[test]
    fn new_subtask_reopens_completed_parent_only() {
        assert!(reopen_on_new_subtask(true));
        assert!(!reopen_on_new_subtask(false));
    }
}

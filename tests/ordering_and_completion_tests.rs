//! Integration tests for manual ordering, completion propagation, and the
//! dashboard read model.

use daywise::db::Database;
use daywise::db::ordering::MoveDirection;
use daywise::types::{Priority, Task, TimeBlock};
use std::collections::BTreeSet;

fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

fn setup_user(db: &Database) -> i64 {
    db.create_user("tester", None, false)
        .expect("Failed to create user")
        .id
}

fn quick_task(db: &Database, user_id: i64, description: &str) -> Task {
    db.create_task(user_id, description, 30, Priority::Medium, TimeBlock::Any, None)
        .expect("Failed to create task")
}

fn order_of(db: &Database, user_id: i64, task_id: i64) -> Option<i64> {
    db.get_task(user_id, task_id).unwrap().order_index
}

mod ordering_tests {
    use super::*;

    #[test]
    fn task_order_keys_strictly_increase() {
        let db = setup_db();
        let user_id = setup_user(&db);

        let mut previous = 0;
        for i in 0..5 {
            let task = quick_task(&db, user_id, &format!("task {}", i));
            let key = task.order_index.unwrap();
            assert!(key > previous);
            previous = key;
        }
    }

    #[test]
    fn subtask_order_keys_scoped_to_parent() {
        let db = setup_db();
        let user_id = setup_user(&db);
        let a = quick_task(&db, user_id, "a");
        let b = quick_task(&db, user_id, "b");

        let a1 = db.add_subtask(user_id, a.id, "a1").unwrap();
        let a2 = db.add_subtask(user_id, a.id, "a2").unwrap();
        let b1 = db.add_subtask(user_id, b.id, "b1").unwrap();

        assert_eq!(a1.order_index, Some(1));
        assert_eq!(a2.order_index, Some(2));
        // A fresh scope starts over at 1.
        assert_eq!(b1.order_index, Some(1));
    }

    #[test]
    fn move_up_then_down_restores_original_keys() {
        let db = setup_db();
        let user_id = setup_user(&db);
        let first = quick_task(&db, user_id, "first");
        let second = quick_task(&db, user_id, "second");

        assert!(db.move_task(user_id, second.id, MoveDirection::Up).unwrap());
        assert_eq!(order_of(&db, user_id, second.id), Some(1));
        assert_eq!(order_of(&db, user_id, first.id), Some(2));

        assert!(db.move_task(user_id, second.id, MoveDirection::Down).unwrap());
        assert_eq!(order_of(&db, user_id, second.id), Some(2));
        assert_eq!(order_of(&db, user_id, first.id), Some(1));
    }

    #[test]
    fn move_up_at_cohort_head_is_a_noop() {
        let db = setup_db();
        let user_id = setup_user(&db);
        let first = quick_task(&db, user_id, "first");
        let second = quick_task(&db, user_id, "second");

        assert!(!db.move_task(user_id, first.id, MoveDirection::Up).unwrap());
        assert_eq!(order_of(&db, user_id, first.id), Some(1));
        assert_eq!(order_of(&db, user_id, second.id), Some(2));
    }

    #[test]
    fn move_down_at_cohort_tail_is_a_noop() {
        let db = setup_db();
        let user_id = setup_user(&db);
        quick_task(&db, user_id, "first");
        let last = quick_task(&db, user_id, "last");

        assert!(!db.move_task(user_id, last.id, MoveDirection::Down).unwrap());
        assert_eq!(order_of(&db, user_id, last.id), Some(2));
    }

    #[test]
    fn moves_skip_over_the_other_completion_cohort() {
        let db = setup_db();
        let user_id = setup_user(&db);
        let a = quick_task(&db, user_id, "a"); // key 1, incomplete
        let b = quick_task(&db, user_id, "b"); // key 2, will complete
        let c = quick_task(&db, user_id, "c"); // key 3, incomplete
        db.toggle_task(user_id, b.id).unwrap();

        // Moving c up swaps with a, the nearest incomplete neighbor; the
        // completed b in between keeps its key.
        assert!(db.move_task(user_id, c.id, MoveDirection::Up).unwrap());
        assert_eq!(order_of(&db, user_id, c.id), Some(1));
        assert_eq!(order_of(&db, user_id, a.id), Some(3));
        assert_eq!(order_of(&db, user_id, b.id), Some(2));
    }

    #[test]
    fn sole_member_of_completed_cohort_cannot_move() {
        let db = setup_db();
        let user_id = setup_user(&db);
        quick_task(&db, user_id, "a");
        let b = quick_task(&db, user_id, "b");
        quick_task(&db, user_id, "c");
        db.toggle_task(user_id, b.id).unwrap();

        assert!(!db.move_task(user_id, b.id, MoveDirection::Up).unwrap());
        assert!(!db.move_task(user_id, b.id, MoveDirection::Down).unwrap());
    }

    #[test]
    fn swap_preserves_the_set_of_keys_in_scope() {
        let db = setup_db();
        let user_id = setup_user(&db);
        for i in 0..4 {
            quick_task(&db, user_id, &format!("task {}", i));
        }
        let keys_before: BTreeSet<Option<i64>> = db
            .list_tasks(user_id, None)
            .unwrap()
            .iter()
            .map(|t| t.order_index)
            .collect();

        let third = db.list_tasks(user_id, None).unwrap()[2].id;
        db.move_task(user_id, third, MoveDirection::Up).unwrap();
        db.move_task(user_id, third, MoveDirection::Up).unwrap();

        let keys_after: BTreeSet<Option<i64>> = db
            .list_tasks(user_id, None)
            .unwrap()
            .iter()
            .map(|t| t.order_index)
            .collect();
        assert_eq!(keys_before, keys_after);
    }

    #[test]
    fn subtask_moves_confined_to_their_cohort() {
        let db = setup_db();
        let user_id = setup_user(&db);
        let task = quick_task(&db, user_id, "parent");
        let s1 = db.add_subtask(user_id, task.id, "s1").unwrap();
        let s2 = db.add_subtask(user_id, task.id, "s2").unwrap();
        let s3 = db.add_subtask(user_id, task.id, "s3").unwrap();
        db.toggle_subtask(user_id, s2.id).unwrap();

        assert!(db.move_subtask(user_id, s3.id, MoveDirection::Up).unwrap());
        let subtasks = db.subtasks_for_task(user_id, task.id).unwrap();
        let key = |id: i64| {
            subtasks
                .iter()
                .find(|s| s.id == id)
                .unwrap()
                .order_index
        };
        assert_eq!(key(s3.id), Some(1));
        assert_eq!(key(s1.id), Some(3));
        assert_eq!(key(s2.id), Some(2));
    }
}

mod completion_tests {
    use super::*;

    #[test]
    fn completing_task_completes_every_subtask() {
        let db = setup_db();
        let user_id = setup_user(&db);
        let task = quick_task(&db, user_id, "parent");
        for i in 0..3 {
            db.add_subtask(user_id, task.id, &format!("step {}", i)).unwrap();
        }

        let task = db.toggle_task(user_id, task.id).unwrap();
        assert!(task.completed);
        let subtasks = db.subtasks_for_task(user_id, task.id).unwrap();
        assert!(subtasks.iter().all(|s| s.completed));
    }

    #[test]
    fn completing_task_without_subtasks_only_flips_task() {
        let db = setup_db();
        let user_id = setup_user(&db);
        let task = quick_task(&db, user_id, "solo");

        let task = db.toggle_task(user_id, task.id).unwrap();
        assert!(task.completed);
        assert!(db.subtasks_for_task(user_id, task.id).unwrap().is_empty());
    }

    #[test]
    fn uncompleting_task_leaves_subtasks_alone() {
        let db = setup_db();
        let user_id = setup_user(&db);
        let task = quick_task(&db, user_id, "parent");
        db.add_subtask(user_id, task.id, "step").unwrap();

        db.toggle_task(user_id, task.id).unwrap(); // complete: cascades
        let task = db.toggle_task(user_id, task.id).unwrap(); // reopen

        assert!(!task.completed);
        let subtasks = db.subtasks_for_task(user_id, task.id).unwrap();
        assert!(subtasks.iter().all(|s| s.completed));
    }

    #[test]
    fn completing_every_subtask_completes_the_parent() {
        let db = setup_db();
        let user_id = setup_user(&db);
        let task = quick_task(&db, user_id, "parent");
        let s1 = db.add_subtask(user_id, task.id, "one").unwrap();
        let s2 = db.add_subtask(user_id, task.id, "two").unwrap();

        db.toggle_subtask(user_id, s1.id).unwrap();
        assert!(!db.get_task(user_id, task.id).unwrap().completed);

        db.toggle_subtask(user_id, s2.id).unwrap();
        assert!(db.get_task(user_id, task.id).unwrap().completed);

        // Reopening any one subtask reopens the parent.
        db.toggle_subtask(user_id, s1.id).unwrap();
        assert!(!db.get_task(user_id, task.id).unwrap().completed);
    }

    #[test]
    fn adding_subtask_reopens_completed_task() {
        let db = setup_db();
        let user_id = setup_user(&db);
        let task = quick_task(&db, user_id, "parent");
        db.toggle_task(user_id, task.id).unwrap();
        assert!(db.get_task(user_id, task.id).unwrap().completed);

        let subtask = db.add_subtask(user_id, task.id, "new work").unwrap();
        assert!(!subtask.completed);
        assert!(!db.get_task(user_id, task.id).unwrap().completed);
    }

    #[test]
    fn deleting_last_incomplete_subtask_completes_parent() {
        let db = setup_db();
        let user_id = setup_user(&db);
        let task = quick_task(&db, user_id, "parent");
        let done = db.add_subtask(user_id, task.id, "done").unwrap();
        let pending = db.add_subtask(user_id, task.id, "pending").unwrap();
        db.toggle_subtask(user_id, done.id).unwrap();
        assert!(!db.get_task(user_id, task.id).unwrap().completed);

        db.delete_subtask(user_id, pending.id).unwrap();
        assert!(db.get_task(user_id, task.id).unwrap().completed);
    }

    #[test]
    fn deleting_the_only_subtask_leaves_parent_flag_untouched() {
        let db = setup_db();
        let user_id = setup_user(&db);

        // Complete parent loses its one complete subtask: stays complete.
        let task = quick_task(&db, user_id, "was complete");
        let only = db.add_subtask(user_id, task.id, "only").unwrap();
        db.toggle_subtask(user_id, only.id).unwrap();
        assert!(db.get_task(user_id, task.id).unwrap().completed);
        db.delete_subtask(user_id, only.id).unwrap();
        assert!(db.get_task(user_id, task.id).unwrap().completed);

        // Incomplete parent loses its one incomplete subtask: stays incomplete.
        let task = quick_task(&db, user_id, "still open");
        let only = db.add_subtask(user_id, task.id, "only").unwrap();
        db.delete_subtask(user_id, only.id).unwrap();
        assert!(!db.get_task(user_id, task.id).unwrap().completed);
    }

    #[test]
    fn reset_all_reopens_every_task_and_subtask() {
        let db = setup_db();
        let user_id = setup_user(&db);
        let a = quick_task(&db, user_id, "a");
        let b = quick_task(&db, user_id, "b");
        db.add_subtask(user_id, a.id, "step").unwrap();
        db.toggle_task(user_id, a.id).unwrap();
        db.toggle_task(user_id, b.id).unwrap();

        db.reset_all_tasks(user_id).unwrap();

        let tasks = db.list_tasks(user_id, None).unwrap();
        assert!(tasks.iter().all(|t| !t.completed));
        let subtasks = db.subtasks_for_task(user_id, a.id).unwrap();
        assert!(subtasks.iter().all(|s| !s.completed));
    }

    #[test]
    fn reset_all_scoped_to_the_acting_user() {
        let db = setup_db();
        let user_id = setup_user(&db);
        let other = db.create_user("other", None, false).unwrap().id;
        let theirs = quick_task(&db, other, "theirs");
        db.toggle_task(other, theirs.id).unwrap();
        let mine = quick_task(&db, user_id, "mine");
        db.toggle_task(user_id, mine.id).unwrap();

        db.reset_all_tasks(user_id).unwrap();

        assert!(!db.get_task(user_id, mine.id).unwrap().completed);
        assert!(db.get_task(other, theirs.id).unwrap().completed);
    }
}

mod dashboard_tests {
    use super::*;

    fn add_task(
        db: &Database,
        user_id: i64,
        description: &str,
        priority: Priority,
        time_block: TimeBlock,
    ) -> Task {
        db.create_task(user_id, description, 30, priority, time_block, None)
            .unwrap()
    }

    #[test]
    fn incomplete_tasks_render_before_complete_in_key_order() {
        let db = setup_db();
        let user_id = setup_user(&db);
        // A gets key 1 and completes; B and C stay open with keys 2 and 3.
        let a = add_task(&db, user_id, "Done", Priority::High, TimeBlock::Morning);
        add_task(&db, user_id, "Zeta", Priority::High, TimeBlock::Morning);
        add_task(&db, user_id, "Alpha", Priority::High, TimeBlock::Morning);
        db.toggle_task(user_id, a.id).unwrap();

        let dashboard = db.dashboard(user_id, None).unwrap();
        let names: Vec<&str> = dashboard
            .tasks
            .iter()
            .map(|d| d.task.description.as_str())
            .collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Done"]);
    }

    #[test]
    fn progress_counters_match_task_set() {
        let db = setup_db();
        let user_id = setup_user(&db);
        for i in 0..4 {
            quick_task(&db, user_id, &format!("task {}", i));
        }
        let first = db.list_tasks(user_id, None).unwrap()[0].id;
        db.toggle_task(user_id, first).unwrap();

        let dashboard = db.dashboard(user_id, None).unwrap();
        assert_eq!(dashboard.total_tasks, 4);
        assert_eq!(dashboard.completed_tasks, 1);
        assert_eq!(dashboard.in_progress_tasks, 3);
        assert_eq!(dashboard.percent_complete, 25);
    }

    #[test]
    fn percentage_rounds_to_nearest_whole() {
        let db = setup_db();
        let user_id = setup_user(&db);
        for i in 0..3 {
            quick_task(&db, user_id, &format!("task {}", i));
        }
        let first = db.list_tasks(user_id, None).unwrap()[0].id;
        db.toggle_task(user_id, first).unwrap();

        let dashboard = db.dashboard(user_id, None).unwrap();
        assert_eq!(dashboard.percent_complete, 33);
    }

    #[test]
    fn empty_dashboard_reports_zero_percent() {
        let db = setup_db();
        let user_id = setup_user(&db);

        let dashboard = db.dashboard(user_id, None).unwrap();
        assert!(dashboard.tasks.is_empty());
        assert_eq!(dashboard.percent_complete, 0);
    }

    #[test]
    fn category_filter_applies_to_list_and_counters() {
        let db = setup_db();
        let user_id = setup_user(&db);
        let category = db.create_category(user_id, "Work", None).unwrap();
        db.create_task(user_id, "filed", 30, Priority::Medium, TimeBlock::Any, Some(category.id))
            .unwrap();
        quick_task(&db, user_id, "loose");

        let dashboard = db.dashboard(user_id, Some(category.id)).unwrap();
        assert_eq!(dashboard.total_tasks, 1);
        assert_eq!(dashboard.tasks[0].task.description, "filed");
    }

    #[test]
    fn subtasks_render_incomplete_first_each_in_key_order() {
        let db = setup_db();
        let user_id = setup_user(&db);
        let task = quick_task(&db, user_id, "parent");
        let s1 = db.add_subtask(user_id, task.id, "s1").unwrap();
        let s2 = db.add_subtask(user_id, task.id, "s2").unwrap();
        let s3 = db.add_subtask(user_id, task.id, "s3").unwrap();
        db.toggle_subtask(user_id, s2.id).unwrap();

        let dashboard = db.dashboard(user_id, None).unwrap();
        let ids: Vec<i64> = dashboard.tasks[0].subtasks.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![s1.id, s3.id, s2.id]);
    }

    #[test]
    fn dashboard_never_shows_other_users_tasks() {
        let db = setup_db();
        let user_id = setup_user(&db);
        let other = db.create_user("other", None, false).unwrap().id;
        quick_task(&db, other, "theirs");
        quick_task(&db, user_id, "mine");

        let dashboard = db.dashboard(user_id, None).unwrap();
        assert_eq!(dashboard.total_tasks, 1);
        assert_eq!(dashboard.tasks[0].task.description, "mine");
    }
}

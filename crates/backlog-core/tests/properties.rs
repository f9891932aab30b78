//! Property tests for scoping, targeted update, delete, and persistence.

use backlog_core::{
    KeyValueStore, MemoryStore, Priority, Project, Repository, Selection, ServiceError, Status,
    Story, StoryChanges, Task, Tracker, repo::keys,
};
use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop::sample::select(Priority::ALL.to_vec())
}

fn arb_status() -> impl Strategy<Value = Status> {
    prop::sample::select(Status::ALL.to_vec())
}

fn arb_time() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_000_000_000, 0u32..1_000_000_000)
        .prop_map(|(secs, nanos)| Utc.timestamp_opt(secs, nanos).unwrap())
}

/// Stories spread across a handful of project ids, with distinct ids.
fn arb_stories() -> impl Strategy<Value = Vec<Story>> {
    prop::collection::vec(
        (
            "[a-z ]{0,12}",
            arb_priority(),
            arb_status(),
            0usize..4,
            arb_time(),
        ),
        0..24,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (name, priority, status, project, date))| Story {
                id: format!("sty-{i}"),
                name,
                description: format!("story {i}"),
                priority,
                status,
                project_id: format!("prj-{project}"),
                date,
                owner_id: "1".into(),
            })
            .collect()
    })
}

/// Any finite, non-negative estimate, from zero through subnormals to huge.
fn arb_estimate() -> impl Strategy<Value = f64> {
    use prop::num::f64::{NORMAL, POSITIVE, SUBNORMAL, ZERO};
    prop_oneof![
        (0u32..4000).prop_map(|quarters| f64::from(quarters) * 0.25),
        POSITIVE | NORMAL | SUBNORMAL | ZERO,
    ]
}

fn arb_bad_estimate() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
        (-1.0e12f64..-1.0e-9),
    ]
}

fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec(
        (
            "\\PC{0,10}",
            arb_priority(),
            arb_status(),
            0usize..3,
            arb_estimate(),
            prop::option::of(arb_time()),
            prop::option::of(arb_time()),
        ),
        0..16,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (name, priority, status, story, est_time, start, end))| Task {
                id: format!("tsk-{i}"),
                name,
                description: String::new(),
                priority,
                status,
                story_id: format!("sty-{story}"),
                est_time,
                start_time: start,
                end_time: end,
                assignee_id: (i % 3 + 1).to_string(),
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_story_collection_roundtrips(stories in arb_stories()) {
        let repo = Repository::new(MemoryStore::new());
        repo.set_stories(&stories).unwrap();
        prop_assert_eq!(repo.stories(), stories);
    }

    #[test]
    fn prop_task_collection_roundtrips(tasks in arb_tasks()) {
        let repo = Repository::new(MemoryStore::new());
        repo.set_tasks(&tasks).unwrap();
        prop_assert_eq!(repo.tasks(), tasks);
    }

    #[test]
    fn prop_project_collection_roundtrips(names in prop::collection::vec("\\PC{0,16}", 0..10)) {
        let projects: Vec<Project> = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Project { id: format!("prj-{i}"), desc: name.clone(), name })
            .collect();
        let repo = Repository::new(MemoryStore::new());
        repo.set_projects(&projects).unwrap();
        prop_assert_eq!(repo.projects(), projects);
    }

    #[test]
    fn prop_scoped_read_is_ordered_filter(stories in arb_stories(), selected in 0usize..5) {
        let store = MemoryStore::new();
        let tracker = Tracker::new(&store);
        tracker.repository().set_stories(&stories).unwrap();

        let project_id = format!("prj-{selected}");
        let sel = Selection::default().with_project(&project_id);
        let expected: Vec<Story> = stories
            .iter()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect();
        prop_assert_eq!(tracker.stories(&sel), expected);
    }

    #[test]
    fn prop_task_scoping(tasks in arb_tasks(), selected in 0usize..4) {
        let store = MemoryStore::new();
        let tracker = Tracker::new(&store);
        tracker.repository().set_tasks(&tasks).unwrap();

        let story_id = format!("sty-{selected}");
        let sel = Selection::default().with_story(&story_id);
        let expected: Vec<Task> = tasks.iter().filter(|t| t.story_id == story_id).cloned().collect();
        prop_assert_eq!(tracker.tasks(&sel), expected);
    }

    #[test]
    fn prop_update_touches_only_target(
        stories in arb_stories().prop_filter("non-empty", |s| !s.is_empty()),
        pick in any::<prop::sample::Index>(),
        status in arb_status(),
    ) {
        let store = MemoryStore::new();
        let tracker = Tracker::new(&store);
        tracker.repository().set_stories(&stories).unwrap();

        let target = pick.index(stories.len());
        let changes = StoryChanges {
            name: "edited".into(),
            description: "edited".into(),
            priority: Priority::Low,
            status,
        };
        prop_assert!(tracker.update_story(&stories[target].id, changes).unwrap());

        let after = tracker.all_stories();
        prop_assert_eq!(after.len(), stories.len());
        for (i, (old, new)) in stories.iter().zip(&after).enumerate() {
            if i == target {
                prop_assert_eq!(&new.id, &old.id);
                prop_assert_eq!(&new.project_id, &old.project_id);
                prop_assert_eq!(new.date, old.date);
                prop_assert_eq!(new.status, status);
                prop_assert_eq!(&new.name, "edited");
            } else {
                prop_assert_eq!(new, old);
            }
        }
    }

    #[test]
    fn prop_update_absent_leaves_store_unchanged(stories in arb_stories()) {
        let store = MemoryStore::new();
        let tracker = Tracker::new(&store);
        tracker.repository().set_stories(&stories).unwrap();
        prop_assert!(!tracker.update_story("sty-absent", StoryChanges::default()).unwrap());
        prop_assert_eq!(tracker.all_stories(), stories);
    }

    #[test]
    fn prop_delete_removes_exactly_one(
        stories in arb_stories(),
        pick in any::<prop::sample::Index>(),
    ) {
        let store = MemoryStore::new();
        let tracker = Tracker::new(&store);
        tracker.repository().set_stories(&stories).unwrap();

        if stories.is_empty() {
            prop_assert!(!tracker.delete_story("sty-0").unwrap());
            return Ok(());
        }

        let target = pick.index(stories.len());
        prop_assert!(tracker.delete_story(&stories[target].id).unwrap());

        let mut expected = stories.clone();
        expected.remove(target);
        prop_assert_eq!(tracker.all_stories(), expected);

        prop_assert!(!tracker.delete_story(&stories[target].id).unwrap());
        prop_assert_eq!(tracker.all_stories().len(), stories.len() - 1);
    }

    #[test]
    fn prop_done_always_has_end_time(tasks in arb_tasks(), status in arb_status()) {
        let store = MemoryStore::new();
        let tracker = Tracker::new(&store);
        tracker.repository().set_tasks(&tasks).unwrap();

        for task in &tasks {
            let mut changes = task.changes();
            changes.status = status;
            prop_assert!(tracker.update_task(&task.id, changes).unwrap());
            let after = tracker.task(&task.id).unwrap();
            if status == Status::Done {
                prop_assert!(after.end_time.is_some());
            } else {
                prop_assert_eq!(after.end_time, task.end_time);
            }
        }
    }

    #[test]
    fn prop_duplicate_ids_touch_first_match_only(
        stories in arb_stories().prop_filter("non-empty", |s| !s.is_empty()),
        pick in any::<prop::sample::Index>(),
    ) {
        let store = MemoryStore::new();
        let tracker = Tracker::new(&store);
        let target = pick.index(stories.len());
        let mut seeded = stories.clone();
        seeded.push(stories[target].clone());
        tracker.repository().set_stories(&seeded).unwrap();
        let twin_json = serde_json::to_string(&stories[target]).unwrap();

        let changes = StoryChanges { name: "edited".into(), ..StoryChanges::default() };
        prop_assert!(tracker.update_story(&stories[target].id, changes).unwrap());
        let after = tracker.all_stories();
        prop_assert_eq!(&after[target].name, "edited");
        prop_assert_eq!(serde_json::to_string(&after[stories.len()]).unwrap(), twin_json.clone());

        prop_assert!(tracker.delete_story(&stories[target].id).unwrap());
        let after = tracker.all_stories();
        prop_assert_eq!(after.len(), stories.len());
        prop_assert_eq!(serde_json::to_string(&after[stories.len() - 1]).unwrap(), twin_json);
    }

    #[test]
    fn prop_unstorable_estimate_never_reaches_the_store(
        tasks in arb_tasks().prop_filter("non-empty", |t| !t.is_empty()),
        pick in any::<prop::sample::Index>(),
        bad in arb_bad_estimate(),
    ) {
        let store = MemoryStore::new();
        let tracker = Tracker::new(&store);
        tracker.repository().set_tasks(&tasks).unwrap();
        let before = store.get(keys::TASKS).unwrap();

        let target = &tasks[pick.index(tasks.len())];
        let mut changes = target.changes();
        changes.est_time = bad;
        prop_assert!(matches!(
            tracker.update_task(&target.id, changes),
            Err(ServiceError::InvalidEstimate(_))
        ));
        prop_assert_eq!(store.get(keys::TASKS).unwrap(), before);
        prop_assert_eq!(tracker.all_tasks(), tasks);
    }
}

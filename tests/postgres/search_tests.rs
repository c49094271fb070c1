//! `ILIKE` searches and paged listings.

use super::helpers::{member, seed_worker, setup, staff, test_runtime};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use teamboard::persistence::PageRequest;
use teamboard::task::domain::{ActivityKind, NotificationKind, TaskDraft, TaskFilter};
use teamboard::task::ports::{ActivityQuery, NotificationQuery};
use teamboard::task::services::TaskError;

fn search(text: &str) -> TaskFilter {
    TaskFilter {
        search: Some(text.to_owned()),
        ..TaskFilter::default()
    }
}

#[rstest]
#[case("%", &["100% done"])]
#[case("_", &["snake_case"])]
#[case("0%", &["100% done"])]
#[case("e_c", &["snake_case"])]
fn wildcards_in_queries_match_literally(
    shared_test_cluster: &'static TestCluster,
    #[case] query: &str,
    #[case] expected: &[&str],
) {
    let (services, _guard) = setup(shared_test_cluster, "literal_search");
    let rt = test_runtime();
    let lead = rt.block_on(seed_worker(&services.store, "lead"));
    for name in ["100% done", "1000 done", "snake_case", "snakeXcase"] {
        rt.block_on(
            services
                .tasks
                .create(&staff(&lead), TaskDraft::new(name, "").expect("valid draft")),
        )
        .expect("task created");
    }

    let found = rt
        .block_on(services.tasks.search(&search(query)))
        .expect("search runs");

    let names: Vec<&str> = found.iter().map(|task| task.name().as_str()).collect();
    assert_eq!(names, expected);
}

#[rstest]
fn search_pages_count_every_match(shared_test_cluster: &'static TestCluster) {
    let (services, _guard) = setup(shared_test_cluster, "paged_search");
    let rt = test_runtime();
    let lead = rt.block_on(seed_worker(&services.store, "lead"));
    for number in 1..=7 {
        rt.block_on(services.tasks.create(
            &staff(&lead),
            TaskDraft::new(&format!("Report {number}"), "").expect("valid draft"),
        ))
        .expect("task created");
    }
    rt.block_on(
        services
            .tasks
            .create(&staff(&lead), TaskDraft::new("Unrelated", "").expect("valid draft")),
    )
    .expect("task created");

    let second = rt
        .block_on(services.tasks.search_page(&search("report"), PageRequest::new(2, 3)))
        .expect("page fetched");
    assert_eq!(second.total, 7);
    assert_eq!(second.items.len(), 3);

    let beyond = rt
        .block_on(services.tasks.search_page(&search("report"), PageRequest::new(9, 3)))
        .expect("page fetched");
    assert_eq!(beyond.request.number(), 3);
    assert_eq!(beyond.items.len(), 1);
}

#[rstest]
fn audit_trail_searches_task_names_and_usernames(shared_test_cluster: &'static TestCluster) {
    let (services, _guard) = setup(shared_test_cluster, "audit_search");
    let rt = test_runtime();
    let auditor = rt.block_on(seed_worker(&services.store, "auditor"));
    let clerk = rt.block_on(seed_worker(&services.store, "clerk"));
    let invoices = rt
        .block_on(services.tasks.create(
            &staff(&auditor),
            TaskDraft::new("Invoices", "").expect("valid draft"),
        ))
        .expect("task created");
    rt.block_on(
        services
            .tasks
            .create(&staff(&clerk), TaskDraft::new("Filing", "").expect("valid draft")),
    )
    .expect("task created");
    rt.block_on(services.tasks.toggle_completion(&staff(&auditor), invoices.id()))
        .expect("completed");

    let by_actor = rt
        .block_on(services.tasks.audit_trail(
            &staff(&auditor),
            &ActivityQuery {
                kind: Some(ActivityKind::Created),
                search: Some("CLERK".to_owned()),
            },
            PageRequest::first(10),
        ))
        .expect("audit listed");
    assert_eq!(by_actor.total, 1);
    assert_eq!(by_actor.items[0].actor(), Some(clerk.id()));

    let by_task = rt
        .block_on(services.tasks.audit_trail(
            &staff(&auditor),
            &ActivityQuery {
                kind: None,
                search: Some("invoices".to_owned()),
            },
            PageRequest::first(10),
        ))
        .expect("audit listed");
    assert_eq!(by_task.total, 2);

    let completions = rt
        .block_on(services.tasks.audit_trail(
            &staff(&auditor),
            &ActivityQuery {
                kind: Some(ActivityKind::Completed),
                search: None,
            },
            PageRequest::first(10),
        ))
        .expect("audit listed");
    assert_eq!(completions.total, 1);

    let denied = rt.block_on(services.tasks.audit_trail(
        &member(&clerk),
        &ActivityQuery::default(),
        PageRequest::first(10),
    ));
    assert!(matches!(denied, Err(TaskError::AccessDenied(_))));
}

#[rstest]
fn notification_console_searches_recipient_usernames(shared_test_cluster: &'static TestCluster) {
    let (services, _guard) = setup(shared_test_cluster, "notification_search");
    let rt = test_runtime();
    let lead = rt.block_on(seed_worker(&services.store, "lead"));
    let olena = rt.block_on(seed_worker(&services.store, "olena"));
    let taras = rt.block_on(seed_worker(&services.store, "taras"));
    rt.block_on(services.tasks.create(
        &staff(&lead),
        TaskDraft::new("Sprint review", "")
            .expect("valid draft")
            .with_assignees([olena.id(), taras.id()]),
    ))
    .expect("task created");

    let for_taras = rt
        .block_on(services.notifications.admin_list(
            &staff(&lead),
            &NotificationQuery {
                kind: Some(NotificationKind::TaskAssigned),
                search: Some("TARAS".to_owned()),
                ..NotificationQuery::default()
            },
            PageRequest::first(10),
        ))
        .expect("notifications listed");
    assert_eq!(for_taras.total, 1);
    assert_eq!(for_taras.items[0].recipient(), taras.id());

    let completions = rt
        .block_on(services.notifications.admin_list(
            &staff(&lead),
            &NotificationQuery {
                kind: Some(NotificationKind::TaskCompleted),
                ..NotificationQuery::default()
            },
            PageRequest::first(10),
        ))
        .expect("notifications listed");
    assert_eq!(completions.total, 0);
}

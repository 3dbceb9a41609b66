use hostblock_application::services::DomainBlockEngine;
use hostblock_jobs::{ExpiryEvent, ExpiryScheduler, MAX_EXPIRY};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::broadcast;

mod helpers;
use helpers::{InMemoryHostsTable, MockResolverCache};

fn setup(lines: &[&str]) -> (ExpiryScheduler, Arc<DomainBlockEngine>, Arc<InMemoryHostsTable>) {
    let table = Arc::new(InMemoryHostsTable::with_lines(lines));
    let engine = Arc::new(DomainBlockEngine::new(
        table.clone(),
        Arc::new(MockResolverCache::new()),
    ));
    let scheduler = ExpiryScheduler::new(engine.clone(), Handle::current());
    (scheduler, engine, table)
}

fn domains(list: &[&str]) -> Vec<String> {
    list.iter().map(|d| d.to_string()).collect()
}

async fn next_event(events: &mut broadcast::Receiver<ExpiryEvent>) -> ExpiryEvent {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("expiry did not fire")
        .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_expiry_unblocks_after_deadline() {
    let (scheduler, engine, table) = setup(&["127.0.0.1 localhost"]);
    let mut events = scheduler.subscribe();
    engine.block("reddit.com").unwrap();

    let armed = scheduler.arm(Duration::from_millis(100), domains(&["reddit.com"]));
    assert_eq!(armed.generation, 1);
    assert_eq!(scheduler.pending(), Some(armed));

    let event = next_event(&mut events).await;

    assert_eq!(event.generation, 1);
    assert_eq!(event.outcomes.len(), 1);
    assert_eq!(event.outcomes[0].result.as_ref().unwrap().lines_changed, 6);
    assert!(!engine.is_blocked("reddit.com").unwrap());
    assert_eq!(table.lines(), vec!["127.0.0.1 localhost"]);
    assert!(scheduler.pending().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rearm_replaces_pending_expiry() {
    let (scheduler, engine, _) = setup(&[]);
    let mut events = scheduler.subscribe();
    engine.block_batch(&["a.com", "b.com"]);

    scheduler.arm(Duration::from_millis(100), domains(&["a.com"]));
    let second = scheduler.arm(Duration::from_millis(300), domains(&["b.com"]));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(engine.is_blocked("a.com").unwrap());
    assert!(engine.is_blocked("b.com").unwrap());

    let event = next_event(&mut events).await;

    assert_eq!(event.generation, second.generation);
    assert_eq!(event.outcomes.len(), 1);
    assert_eq!(event.outcomes[0].input, "b.com");
    assert!(engine.is_blocked("a.com").unwrap());
    assert!(!engine.is_blocked("b.com").unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_prevents_firing() {
    let (scheduler, engine, _) = setup(&[]);
    let mut events = scheduler.subscribe();
    engine.block("example.com").unwrap();

    scheduler.arm(Duration::from_millis(100), domains(&["example.com"]));
    assert!(scheduler.cancel());
    assert!(!scheduler.cancel());
    assert!(scheduler.pending().is_none());

    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(engine.is_blocked("example.com").unwrap());
    assert!(matches!(
        events.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_without_pending_expiry() {
    let (scheduler, _, _) = setup(&[]);

    assert!(!scheduler.cancel());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_block_for_blocks_missing_and_expires_all() {
    let (scheduler, engine, table) = setup(&["0.0.0.0 a.com"]);
    let mut events = scheduler.subscribe();

    let (outcomes, armed) =
        scheduler.block_for(Duration::from_millis(100), &domains(&["a.com", "b.com"]));

    assert_eq!(outcomes[0].result.as_ref().unwrap().lines_changed, 0);
    assert_eq!(outcomes[1].result.as_ref().unwrap().lines_changed, 6);
    assert_eq!(armed.domains, vec!["a.com", "b.com"]);
    assert_eq!(table.lines().len(), 7);

    next_event(&mut events).await;

    assert!(!engine.is_blocked("a.com").unwrap());
    assert!(!engine.is_blocked("b.com").unwrap());
    assert!(table.lines().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_block_for_skips_invalid_domains() {
    let (scheduler, _, _) = setup(&[]);

    let (outcomes, armed) = scheduler.block_for(
        Duration::from_secs(60),
        &domains(&["WWW.Example.com", "not valid"]),
    );

    assert!(outcomes[0].is_ok());
    assert!(!outcomes[1].is_ok());
    assert_eq!(armed.domains, vec!["example.com"]);
    assert!(armed.remaining() <= Duration::from_secs(60));
    assert!(scheduler.cancel());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_expiry_reports_failures_per_domain() {
    let (scheduler, engine, table) = setup(&[]);
    let mut events = scheduler.subscribe();
    engine.block("a.com").unwrap();

    scheduler.arm(Duration::from_millis(50), domains(&["a.com"]));
    table.fail_with(hostblock_domain::DomainError::AccessDenied(
        "/etc/hosts".to_string(),
    ));

    let event = next_event(&mut events).await;

    assert!(event.outcomes[0].error().is_some_and(|e| e.is_access_denied()));
    assert!(scheduler.pending().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_arm_with_huge_duration_is_clamped() {
    let (scheduler, engine, _) = setup(&[]);
    engine.block("a.com").unwrap();

    let armed = scheduler.arm(
        Duration::from_secs(307_445_734_561_825_860 * 60),
        domains(&["a.com"]),
    );

    assert!(armed.remaining() <= MAX_EXPIRY);
    assert!(armed.remaining() > Duration::from_secs(365 * 24 * 60 * 60));
    assert_eq!(scheduler.pending(), Some(armed));
    assert!(engine.is_blocked("a.com").unwrap());
    assert!(scheduler.cancel());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_during_firing_waits_and_finds_nothing() {
    let (scheduler, engine, table) = setup(&[]);
    let mut events = scheduler.subscribe();
    engine.block("a.com").unwrap();
    table.slow_removals(Duration::from_millis(400));

    scheduler.arm(Duration::from_millis(50), domains(&["a.com"]));
    tokio::time::sleep(Duration::from_millis(200)).await;

    let cancelling = scheduler.clone();
    let cancelled = tokio::task::spawn_blocking(move || cancelling.cancel())
        .await
        .unwrap();

    assert!(!cancelled);
    assert!(!engine.is_blocked("a.com").unwrap());
    assert_eq!(next_event(&mut events).await.generation, 1);
    assert!(scheduler.pending().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_arm_during_firing_is_not_consumed_by_it() {
    let (scheduler, engine, table) = setup(&[]);
    let mut events = scheduler.subscribe();
    engine.block_batch(&["a.com", "b.com"]);
    table.slow_removals(Duration::from_millis(400));

    scheduler.arm(Duration::from_millis(50), domains(&["a.com"]));
    tokio::time::sleep(Duration::from_millis(200)).await;

    let arming = scheduler.clone();
    let second = tokio::task::spawn_blocking(move || {
        arming.arm(Duration::from_secs(60), vec!["b.com".to_string()])
    })
    .await
    .unwrap();

    assert_eq!(second.generation, 2);
    assert!(!engine.is_blocked("a.com").unwrap());
    let event = next_event(&mut events).await;
    assert_eq!(event.generation, 1);
    assert_eq!(event.outcomes.len(), 1);
    assert_eq!(scheduler.pending(), Some(second));
    assert!(engine.is_blocked("b.com").unwrap());
    assert!(scheduler.cancel());
}

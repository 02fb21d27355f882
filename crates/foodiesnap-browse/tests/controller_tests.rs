mod support;

use std::sync::atomic::Ordering;
use std::time::Duration;

use foodiesnap_browse::controller::{INITIAL_LOAD_ERROR, LOAD_MORE_ERROR, SEARCH_ERROR};
use foodiesnap_browse::{BrowseController, LoadOutcome, Phase};
use support::{browse_config, FakeSource};
use tokio::time::sleep;

const PAST_DEBOUNCE: Duration = Duration::from_millis(600);

#[tokio::test(start_paused = true)]
async fn initial_load_fills_first_page() {
    let source = FakeSource::new();
    let ctl = BrowseController::new(source.clone(), browse_config(5));
    let rx = ctl.subscribe();

    assert_eq!(ctl.snapshot().phase(), Phase::Idle);
    assert_eq!(ctl.load_initial().await, LoadOutcome::Applied);

    let state = rx.borrow().clone();
    assert_eq!(state.items.len(), 8);
    assert_eq!(state.page, 1);
    assert!(state.has_more);
    assert!(!state.loading);
    assert_eq!(state.phase(), Phase::Ready);
    assert_eq!(source.random_calls(), 8);
}

#[tokio::test(start_paused = true)]
async fn keystrokes_inside_window_issue_one_search() {
    let source = FakeSource::new();
    let ctl = BrowseController::new(source.clone(), browse_config(5));

    ctl.set_query("p");
    sleep(Duration::from_millis(100)).await;
    ctl.set_query("pa");
    sleep(Duration::from_millis(100)).await;
    ctl.set_query("pas");
    assert_eq!(ctl.snapshot().query, "pas");
    assert!(ctl.has_pending_search());

    sleep(PAST_DEBOUNCE).await;

    assert_eq!(source.searches(), vec!["pas".to_string()]);
    let state = ctl.snapshot();
    assert_eq!(state.items.len(), 2);
    assert_eq!(state.items[0].title, "pas one");
    assert_eq!(state.page, 1);
    assert!(!state.has_more);
    assert!(!ctl.has_pending_search());
}

#[tokio::test(start_paused = true)]
async fn search_uses_trimmed_query_but_keeps_raw_text() {
    let source = FakeSource::new();
    let ctl = BrowseController::new(source.clone(), browse_config(5));

    ctl.set_query("  pie ");
    sleep(PAST_DEBOUNCE).await;

    assert_eq!(source.searches(), vec!["pie".to_string()]);
    assert_eq!(ctl.snapshot().query, "  pie ");
}

#[tokio::test(start_paused = true)]
async fn load_more_appends_until_page_cap() {
    let source = FakeSource::new();
    let ctl = BrowseController::new(source.clone(), browse_config(3));
    ctl.load_initial().await;

    assert_eq!(ctl.load_more().await, LoadOutcome::Applied);
    assert_eq!(ctl.snapshot().page, 2);
    assert!(ctl.snapshot().has_more);

    assert_eq!(ctl.load_more().await, LoadOutcome::Applied);
    let state = ctl.snapshot();
    assert_eq!(state.page, 3);
    assert_eq!(state.items.len(), 16);
    assert!(!state.has_more);

    assert_eq!(ctl.load_more().await, LoadOutcome::Skipped);
    assert_eq!(source.random_calls(), 16);
}

#[tokio::test(start_paused = true)]
async fn single_page_cap_never_offers_more() {
    let source = FakeSource::new();
    let ctl = BrowseController::new(source.clone(), browse_config(1));
    ctl.load_initial().await;

    assert!(!ctl.snapshot().has_more);
    assert_eq!(ctl.load_more().await, LoadOutcome::Skipped);
}

#[tokio::test(start_paused = true)]
async fn overlapping_load_more_is_suppressed() {
    let source = FakeSource::new();
    let ctl = BrowseController::new(source.clone(), browse_config(5));
    ctl.load_initial().await;
    source.set_latency(Duration::from_secs(1));

    let (first, second) = tokio::join!(ctl.load_more(), ctl.load_more());

    assert_eq!(first, LoadOutcome::Applied);
    assert_eq!(second, LoadOutcome::Skipped);
    assert_eq!(source.random_calls(), 12);
    assert_eq!(ctl.snapshot().items.len(), 12);
}

#[tokio::test(start_paused = true)]
async fn only_last_item_triggers_next_page() {
    let source = FakeSource::new();
    let ctl = BrowseController::new(source.clone(), browse_config(5));
    ctl.load_initial().await;

    assert_eq!(ctl.item_visible(3).await, LoadOutcome::Skipped);
    assert_eq!(ctl.item_visible(7).await, LoadOutcome::Applied);
    assert_eq!(ctl.snapshot().items.len(), 12);
}

#[tokio::test(start_paused = true)]
async fn load_more_is_skipped_while_searching() {
    let source = FakeSource::new();
    let ctl = BrowseController::new(source.clone(), browse_config(5));
    ctl.load_initial().await;

    ctl.set_query("pie");
    sleep(PAST_DEBOUNCE).await;

    assert_eq!(ctl.load_more().await, LoadOutcome::Skipped);
    assert_eq!(ctl.item_visible(1).await, LoadOutcome::Skipped);
    assert_eq!(source.random_calls(), 8);
}

#[tokio::test(start_paused = true)]
async fn page_in_flight_is_discarded_when_query_changes() {
    let source = FakeSource::new();
    let ctl = BrowseController::new(source.clone(), browse_config(5));
    ctl.load_initial().await;
    source.set_latency(Duration::from_secs(1));

    let (outcome, ()) = tokio::join!(ctl.load_more(), async {
        sleep(Duration::from_millis(100)).await;
        ctl.set_query("pie");
    });
    assert_eq!(outcome, LoadOutcome::Stale);
    // the stale page never landed
    assert_eq!(ctl.snapshot().items.len(), 8);

    sleep(Duration::from_secs(2)).await;
    let state = ctl.snapshot();
    assert_eq!(state.items.len(), 2);
    assert!(state.items.iter().all(|r| r.title.starts_with("pie")));
    assert_eq!(state.page, 1);
    assert!(!state.has_more);
    assert!(!state.loading_more);
}

#[tokio::test(start_paused = true)]
async fn search_in_flight_is_discarded_when_cleared() {
    let source = FakeSource::new();
    let ctl = BrowseController::new(source.clone(), browse_config(5));
    source.set_latency(Duration::from_secs(1));

    ctl.set_query("pie");
    sleep(PAST_DEBOUNCE).await;
    assert_eq!(ctl.snapshot().phase(), Phase::Searching);

    assert_eq!(ctl.clear_search().await, LoadOutcome::Applied);
    sleep(Duration::from_secs(2)).await;

    let state = ctl.snapshot();
    assert_eq!(state.query, "");
    assert_eq!(state.items.len(), 8);
    assert!(state.items.iter().all(|r| r.title.starts_with("Random")));
    assert_eq!(source.searches(), vec!["pie".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn emptying_query_restarts_random_view() {
    let source = FakeSource::new();
    let ctl = BrowseController::new(source.clone(), browse_config(5));
    ctl.load_initial().await;
    ctl.load_more().await;
    assert_eq!(ctl.snapshot().page, 2);

    ctl.set_query("pie");
    sleep(PAST_DEBOUNCE).await;
    ctl.set_query("   ");
    sleep(PAST_DEBOUNCE).await;

    let state = ctl.snapshot();
    assert_eq!(state.page, 1);
    assert_eq!(state.items.len(), 8);
    assert!(state.has_more);
    assert_eq!(source.searches(), vec!["pie".to_string()]);
    assert_eq!(source.random_calls(), 8 + 4 + 8);
}

#[tokio::test(start_paused = true)]
async fn initial_failure_is_retryable() {
    let source = FakeSource::new();
    let ctl = BrowseController::new(source.clone(), browse_config(5));
    source.fail_random.store(true, Ordering::SeqCst);

    assert_eq!(ctl.load_initial().await, LoadOutcome::Failed);
    let state = ctl.snapshot();
    assert_eq!(state.error.as_deref(), Some(INITIAL_LOAD_ERROR));
    assert!(state.items.is_empty());
    assert_eq!(state.phase(), Phase::Error);

    source.fail_random.store(false, Ordering::SeqCst);
    assert_eq!(ctl.retry().await, LoadOutcome::Applied);
    let state = ctl.snapshot();
    assert_eq!(state.error, None);
    assert_eq!(state.items.len(), 8);
    assert_eq!(ctl.retry().await, LoadOutcome::Skipped);
}

#[tokio::test(start_paused = true)]
async fn failed_page_keeps_items_and_blocks_until_retry() {
    let source = FakeSource::new();
    let ctl = BrowseController::new(source.clone(), browse_config(5));
    ctl.load_initial().await;
    source.fail_random.store(true, Ordering::SeqCst);

    assert_eq!(ctl.load_more().await, LoadOutcome::Failed);
    let state = ctl.snapshot();
    assert_eq!(state.error.as_deref(), Some(LOAD_MORE_ERROR));
    assert_eq!(state.items.len(), 8);
    assert_eq!(state.page, 1);
    assert!(!state.loading_more);
    assert_eq!(ctl.load_more().await, LoadOutcome::Skipped);

    source.fail_random.store(false, Ordering::SeqCst);
    assert_eq!(ctl.retry().await, LoadOutcome::Applied);
    let state = ctl.snapshot();
    assert_eq!(state.page, 2);
    assert_eq!(state.items.len(), 12);
    assert_eq!(state.error, None);
}

#[tokio::test(start_paused = true)]
async fn failed_search_retries_same_query() {
    let source = FakeSource::new();
    let ctl = BrowseController::new(source.clone(), browse_config(5));
    source.fail_search.store(true, Ordering::SeqCst);

    ctl.set_query("pie");
    sleep(PAST_DEBOUNCE).await;
    assert_eq!(ctl.snapshot().error.as_deref(), Some(SEARCH_ERROR));

    source.fail_search.store(false, Ordering::SeqCst);
    assert_eq!(ctl.retry().await, LoadOutcome::Applied);
    assert_eq!(ctl.snapshot().items.len(), 2);
    assert_eq!(source.searches(), vec!["pie".to_string(), "pie".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn retry_ignores_search_for_an_old_query() {
    let source = FakeSource::new();
    let ctl = BrowseController::new(source.clone(), browse_config(5));
    source.fail_search.store(true, Ordering::SeqCst);

    ctl.set_query("pie");
    sleep(PAST_DEBOUNCE).await;
    ctl.set_query("stew");

    assert_eq!(ctl.retry().await, LoadOutcome::Skipped);
    assert_eq!(source.searches(), vec!["pie".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn dispose_cancels_pending_search() {
    let source = FakeSource::new();
    let ctl = BrowseController::new(source.clone(), browse_config(5));

    ctl.set_query("pie");
    ctl.dispose();
    sleep(Duration::from_secs(2)).await;

    assert!(source.searches().is_empty());
    assert_eq!(ctl.load_more().await, LoadOutcome::Skipped);
}

#[tokio::test(start_paused = true)]
async fn dropping_controller_cancels_pending_search() {
    let source = FakeSource::new();
    let ctl = BrowseController::new(source.clone(), browse_config(5));

    ctl.set_query("pie");
    drop(ctl);
    sleep(Duration::from_secs(2)).await;

    assert!(source.searches().is_empty());
}

#[tokio::test(start_paused = true)]
async fn page_started_during_debounce_is_discarded_by_reload() {
    let source = FakeSource::new();
    let ctl = BrowseController::new(source.clone(), browse_config(5));
    ctl.load_initial().await;

    ctl.set_query("p");
    ctl.set_query("");
    source.set_latency(Duration::from_secs(2));

    let (outcome, ()) = tokio::join!(ctl.load_more(), async {
        source.set_latency(Duration::ZERO);
        sleep(Duration::from_millis(610)).await;
        let state = ctl.snapshot();
        assert_eq!((state.page, state.items.len()), (1, 8));
    });

    assert_eq!(outcome, LoadOutcome::Stale);
    let state = ctl.snapshot();
    assert_eq!(state.page, 1);
    assert_eq!(state.items.len(), 8);
    assert!(!state.loading_more);
}

#[tokio::test(start_paused = true)]
async fn huge_visible_index_counts_as_last_item() {
    let source = FakeSource::new();
    let ctl = BrowseController::new(source.clone(), browse_config(5));
    ctl.load_initial().await;

    assert_eq!(ctl.item_visible(usize::MAX).await, LoadOutcome::Applied);
    assert_eq!(ctl.snapshot().page, 2);
}

#[tokio::test(start_paused = true)]
async fn skipped_retry_keeps_page_failure_for_later() {
    let source = FakeSource::new();
    let ctl = BrowseController::new(source.clone(), browse_config(5));
    ctl.load_initial().await;
    source.fail_random.store(true, Ordering::SeqCst);
    assert_eq!(ctl.load_more().await, LoadOutcome::Failed);
    source.fail_random.store(false, Ordering::SeqCst);

    // a search is pending, so the page retry does not apply yet
    ctl.set_query("p");
    assert_eq!(ctl.retry().await, LoadOutcome::Skipped);
    assert_eq!(ctl.snapshot().error.as_deref(), Some(LOAD_MORE_ERROR));

    ctl.set_query("");
    assert_eq!(ctl.retry().await, LoadOutcome::Applied);
    let state = ctl.snapshot();
    assert_eq!(state.page, 2);
    assert_eq!(state.error, None);
}

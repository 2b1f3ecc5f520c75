use super::*;
use crate::fake::{FakeCard, FakePage, FakeStorefront};
use crate::pagination::page_url;

const HOME: &str = "https://store.test/";

fn config() -> Config {
    let mut config = Config::default();
    config.site.base_url = HOME.to_string();
    config
}

fn storefront(config: &Config, links: &[&str]) -> FakeStorefront {
    let store = FakeStorefront::new(&config.site);
    store.add_page(HOME, FakePage::home(&config.site, links));
    store
}

fn prices(summary: &RunSummary) -> Vec<&str> {
    summary.all_records.iter().map(|r| r.price()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_end_to_end_single_department() {
    let config = config();
    let store = storefront(&config, &["/departamentos/mercearia"]);
    let dept = "departamentos/mercearia";
    store.add_page(
        &page_url(HOME, dept, 1),
        FakePage::listing(vec![
            FakeCard::priced("ARROZ 5KG", "R$ 10,00"),
            FakeCard::unpriced("FEIJÃO 1KG"),
            FakeCard::priced("SAL 1KG", "R$ 0,00"),
        ]),
    );
    store.add_page(
        &page_url(HOME, dept, 2),
        FakePage::listing(vec![FakeCard::priced("CAFÉ 500G", "R$ 5,50")]),
    );
    store.add_page(&page_url(HOME, dept, 3), FakePage::listing(vec![]));

    let summary = ExtractionSession::new(store.clone(), &config)
        .unwrap()
        .run()
        .await;

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(prices(&summary), vec!["10.00", "5.50"]);
    assert_eq!(summary.total_seen(), 4);
    assert_eq!(summary.total_positive(), 2);
    assert_eq!(summary.totals.zero_price, 1);
    assert_eq!(summary.totals.missing_price, 1);
    assert_eq!(summary.departments.len(), 1);
    assert_eq!(summary.departments[0].pages_loaded, 2);
    assert!(summary.finished_at >= summary.started_at);
    assert!(store.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_departments_in_discovery_order() {
    let config = config();
    let store = storefront(
        &config,
        &["/departamentos/bebidas", "/departamentos/limpeza", "/departamentos/bebidas"],
    );
    store.add_page(
        &page_url(HOME, "departamentos/bebidas", 1),
        FakePage::listing(vec![FakeCard::priced("SUCO 1L", "R$ 7,00")]),
    );
    store.add_page(
        &page_url(HOME, "departamentos/limpeza", 1),
        FakePage::listing(vec![FakeCard::priced("SABÃO 1KG", "R$ 9,90")]),
    );

    let summary = ExtractionSession::new(store.clone(), &config)
        .unwrap()
        .run()
        .await;

    assert_eq!(prices(&summary), vec!["7.00", "9.90"]);
    let paths: Vec<&str> = summary.departments.iter().map(|d| d.path.as_str()).collect();
    assert_eq!(paths, vec!["departamentos/bebidas", "departamentos/limpeza"]);
}

#[tokio::test(start_paused = true)]
async fn test_missing_menu_aborts_and_closes() {
    let config = config();
    let store = FakeStorefront::new(&config.site);
    store.add_page(
        HOME,
        FakePage::home(&config.site, &["/departamentos/a"])
            .without_element(&config.site.menu_expand_selector),
    );

    let summary = ExtractionSession::new(store.clone(), &config)
        .unwrap()
        .run()
        .await;

    assert!(matches!(summary.outcome, RunOutcome::Aborted(_)));
    assert!(summary.all_records.is_empty());
    assert_eq!(summary.total_seen(), 0);
    assert_eq!(store.navigations(), vec![HOME.to_string()]);
    assert!(store.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_no_departments_aborts() {
    let config = config();
    let store = storefront(&config, &["/institucional/sobre"]);

    let summary = ExtractionSession::new(store.clone(), &config)
        .unwrap()
        .run()
        .await;

    assert_eq!(
        summary.outcome,
        RunOutcome::Aborted(ExtractError::NoDepartments.to_string())
    );
    assert!(store.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_home_navigation_failure_is_fatal() {
    let config = config();
    let store = storefront(&config, &["/departamentos/a"]);
    store.fail_navigation(HOME, 1);

    let summary = ExtractionSession::new(store.clone(), &config)
        .unwrap()
        .run()
        .await;

    assert!(matches!(summary.outcome, RunOutcome::Failed(_)));
    assert!(store.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_panic_keeps_partial_results() {
    let config = config();
    let store = storefront(&config, &["/departamentos/a", "/departamentos/b"]);
    store.add_page(
        &page_url(HOME, "departamentos/a", 1),
        FakePage::listing(vec![FakeCard::priced("ARROZ 5KG", "R$ 20,00")]),
    );
    store.panic_on_navigation(&page_url(HOME, "departamentos/b", 1));

    let summary = ExtractionSession::new(store.clone(), &config)
        .unwrap()
        .run()
        .await;

    match &summary.outcome {
        RunOutcome::Failed(message) => assert!(message.contains("renderer crashed")),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(prices(&summary), vec!["20.00"]);
    assert!(store.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_run_finalizes() {
    let config = config();
    let store = storefront(&config, &["/departamentos/a"]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let summary = ExtractionSession::new(store.clone(), &config)
        .unwrap()
        .with_cancellation(cancel)
        .run()
        .await;

    assert_eq!(summary.outcome, RunOutcome::Cancelled);
    assert!(summary.departments.is_empty());
    assert!(store.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_between_departments_keeps_collected_records() {
    let config = config();
    let store = storefront(&config, &["/departamentos/a", "/departamentos/b", "/departamentos/c"]);
    store.add_page(
        &page_url(HOME, "departamentos/a", 1),
        FakePage::listing(vec![FakeCard::priced("ARROZ 5KG", "R$ 20,00")]),
    );
    store.add_page(
        &page_url(HOME, "departamentos/c", 1),
        FakePage::listing(vec![FakeCard::priced("SUCO 1L", "R$ 7,00")]),
    );
    let cancel = CancellationToken::new();
    store.cancel_on_navigation(&page_url(HOME, "departamentos/b", 1), cancel.clone());

    let summary = ExtractionSession::new(store.clone(), &config)
        .unwrap()
        .with_cancellation(cancel)
        .run()
        .await;

    assert_eq!(summary.outcome, RunOutcome::Cancelled);
    assert_eq!(prices(&summary), vec!["20.00"]);
    assert_eq!(summary.departments.len(), 2);
    assert_eq!(summary.departments[1].stop_reason, StopReason::Cancelled);
    assert!(!store
        .navigations()
        .contains(&page_url(HOME, "departamentos/c", 1)));
    assert!(store.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_modal_dismissed_before_menu() {
    let config = config();
    let store = FakeStorefront::new(&config.site);
    store.add_page(
        HOME,
        FakePage::home(&config.site, &["/departamentos/a"]).with_element(".icon-close"),
    );

    ExtractionSession::new(store.clone(), &config)
        .unwrap()
        .run()
        .await;

    let clicks = store.clicks();
    assert_eq!(clicks[0], (".icon-close".to_string(), false));
    assert_eq!(clicks[1], (config.site.menu_expand_selector.clone(), true));
}

#[tokio::test(start_paused = true)]
async fn test_modal_dismissal_disabled() {
    let mut config = config();
    config.features.dismiss_modals = false;
    let store = FakeStorefront::new(&config.site);
    store.add_page(
        HOME,
        FakePage::home(&config.site, &["/departamentos/a"]).with_element(".icon-close"),
    );

    ExtractionSession::new(store.clone(), &config)
        .unwrap()
        .run()
        .await;

    assert_eq!(
        store.clicks(),
        vec![(config.site.menu_expand_selector.clone(), true)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_session_sets_default_implicit_timeout() {
    let mut config = config();
    config.timing.implicit_wait_ms = 4000;
    let store = FakeStorefront::new(&config.site);

    let _session = ExtractionSession::new(store.clone(), &config).unwrap();

    assert_eq!(store.implicit_timeout(), Duration::from_secs(4));
}

#[test]
fn test_prefix_with_regex_metacharacters() {
    let mut config = config();
    config.site.department_prefix = "(".to_string();
    let store = FakeStorefront::new(&config.site);

    // Escaped, so still a valid pattern.
    assert!(ExtractionSession::new(store, &config).is_ok());
}

#[test]
fn test_panic_message() {
    let boxed: Box<dyn Any + Send> = Box::new("boom");
    assert_eq!(panic_message(boxed.as_ref()), "boom");
    let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
    assert_eq!(panic_message(boxed.as_ref()), "bang");
    let boxed: Box<dyn Any + Send> = Box::new(7_u8);
    assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
}

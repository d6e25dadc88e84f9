//! Search / map / selection pipelines against a scripted geocoder.
//!
//! Time is paused, so debounce windows and response latencies are exact and
//! the out-of-order interleavings below are deterministic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use platemap_backend::BackendClient;
use platemap_core::{LookupKind, Notice, Position, Suggestion};
use platemap_editor::{
    EditorDeps, ForwardGeocoder, MapInteractionAdapter, PositionStore, ProfileEditor,
    ResolveOutcome, ReverseGeocoder, SearchOutcome, SuggestionSearch,
};
use platemap_geocode::GeocodeError;

const DEBOUNCE: Duration = Duration::from_millis(500);

enum Reply<T> {
    Ok(T),
    Fail,
    Unauthorized,
}

impl<T: Clone> Reply<T> {
    fn produce(&self) -> Result<T, GeocodeError> {
        match self {
            Reply::Ok(v) => Ok(v.clone()),
            Reply::Fail => Err(GeocodeError::UnexpectedStatus {
                status: 503,
                url: "http://geocoder.test".to_owned(),
            }),
            Reply::Unauthorized => Err(GeocodeError::Unauthorized { status: 401 }),
        }
    }
}

#[derive(Default)]
struct ScriptedGeocoder {
    forward: HashMap<String, (Duration, Reply<Vec<Suggestion>>)>,
    reverse: HashMap<String, (Duration, Reply<String>)>,
    forward_calls: AtomicUsize,
    reverse_calls: AtomicUsize,
}

impl ScriptedGeocoder {
    fn on_search(mut self, query: &str, latency_ms: u64, reply: Reply<Vec<Suggestion>>) -> Self {
        self.forward
            .insert(query.to_owned(), (Duration::from_millis(latency_ms), reply));
        self
    }

    fn on_reverse(mut self, at: Position, latency_ms: u64, reply: Reply<String>) -> Self {
        self.reverse
            .insert(at.to_string(), (Duration::from_millis(latency_ms), reply));
        self
    }
}

impl ForwardGeocoder for ScriptedGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<Suggestion>, GeocodeError> {
        self.forward_calls.fetch_add(1, Ordering::SeqCst);
        let (latency, reply) = self
            .forward
            .get(query)
            .unwrap_or_else(|| panic!("unscripted search for {query:?}"));
        tokio::time::sleep(*latency).await;
        reply.produce()
    }
}

impl ReverseGeocoder for ScriptedGeocoder {
    async fn reverse(&self, position: Position) -> Result<String, GeocodeError> {
        self.reverse_calls.fetch_add(1, Ordering::SeqCst);
        let (latency, reply) = self
            .reverse
            .get(&position.to_string())
            .unwrap_or_else(|| panic!("unscripted reverse for {position}"));
        tokio::time::sleep(*latency).await;
        reply.produce()
    }
}

fn pos(lat: f64, lng: f64) -> Position {
    Position::new(lat, lng).unwrap()
}

fn suggestion(label: &str, lat: f64, lng: f64) -> Suggestion {
    Suggestion {
        label: label.to_owned(),
        position: pos(lat, lng),
        place_id: None,
    }
}

fn start() -> PositionStore {
    PositionStore::new(pos(21.0285, 105.8542), "Hoan Kiem, Hanoi")
}

#[tokio::test(start_paused = true)]
async fn late_answer_for_older_text_never_overwrites_newer_list() {
    let geocoder = Arc::new(
        ScriptedGeocoder::default()
            .on_search("Ha", 2_000, Reply::Ok(vec![suggestion("Ha Long", 20.95, 107.08)]))
            .on_search(
                "Hano",
                100,
                Reply::Ok(vec![
                    suggestion("Hanoi", 21.03, 105.85),
                    suggestion("Hanoi Train Station", 21.02, 105.84),
                ]),
            ),
    );
    let store = start();
    let search = SuggestionSearch::new(store.clone(), Arc::clone(&geocoder), DEBOUNCE);

    let older = search.search("Ha").unwrap();
    // Let the "Ha" request leave the debounce window before typing on.
    tokio::time::sleep(Duration::from_millis(600)).await;
    let newer = search.search("Hano").unwrap();

    assert_eq!(newer.await.unwrap(), SearchOutcome::Applied { count: 2 });
    assert_eq!(older.await.unwrap(), SearchOutcome::Superseded);

    let labels: Vec<_> = store
        .state()
        .suggestions()
        .iter()
        .map(|s| s.label.clone())
        .collect();
    assert_eq!(labels, ["Hanoi", "Hanoi Train Station"]);
    assert_eq!(geocoder.forward_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn rapid_keystrokes_collapse_into_one_request() {
    let geocoder = Arc::new(
        ScriptedGeocoder::default()
            .on_search("Hano", 50, Reply::Ok(vec![suggestion("Hanoi", 21.03, 105.85)])),
    );
    let store = start();
    let search = SuggestionSearch::new(store.clone(), Arc::clone(&geocoder), DEBOUNCE);

    let mut handles = Vec::new();
    for text in ["H", "Ha", "Han", "Hano"] {
        handles.push(search.search(text).unwrap());
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }
    assert_eq!(
        outcomes,
        [
            SearchOutcome::Superseded,
            SearchOutcome::Superseded,
            SearchOutcome::Superseded,
            SearchOutcome::Applied { count: 1 },
        ]
    );
    assert_eq!(geocoder.forward_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn blank_text_clears_list_without_a_request() {
    let geocoder = Arc::new(
        ScriptedGeocoder::default()
            .on_search("Hanoi", 10, Reply::Ok(vec![suggestion("Hanoi", 21.03, 105.85)])),
    );
    let store = start();
    let search = SuggestionSearch::new(store.clone(), Arc::clone(&geocoder), DEBOUNCE);

    search.search("Hanoi").unwrap().await.unwrap();
    assert_eq!(store.state().suggestions().len(), 1);

    assert!(search.search("   ").is_none());
    assert!(store.state().suggestions().is_empty());
    assert_eq!(geocoder.forward_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn blank_text_cancels_a_pending_search() {
    let geocoder = Arc::new(
        ScriptedGeocoder::default()
            .on_search("Hanoi", 10, Reply::Ok(vec![suggestion("Hanoi", 21.03, 105.85)])),
    );
    let store = start();
    let search = SuggestionSearch::new(store.clone(), Arc::clone(&geocoder), DEBOUNCE);

    let pending = search.search("Hanoi").unwrap();
    assert!(search.search("").is_none());

    assert_eq!(pending.await.unwrap(), SearchOutcome::Superseded);
    assert!(store.state().suggestions().is_empty());
    assert_eq!(geocoder.forward_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_or_empty_search_empties_list_and_reports() {
    let geocoder = Arc::new(
        ScriptedGeocoder::default()
            .on_search("Hanoi", 10, Reply::Ok(vec![suggestion("Hanoi", 21.03, 105.85)]))
            .on_search("zzzz", 10, Reply::Ok(Vec::new()))
            .on_search("boom", 10, Reply::Fail),
    );
    let store = start();
    let search = SuggestionSearch::new(store.clone(), Arc::clone(&geocoder), DEBOUNCE);

    search.search("Hanoi").unwrap().await.unwrap();
    assert_eq!(
        search.search("zzzz").unwrap().await.unwrap(),
        SearchOutcome::Applied { count: 0 }
    );
    let state = store.state();
    assert!(state.suggestions().is_empty());
    assert!(matches!(
        state.notice(),
        Some(Notice::LookupFailed { lookup: LookupKind::Forward, .. })
    ));

    search.search("Hanoi").unwrap().await.unwrap();
    assert!(store.state().notice().is_none());

    assert_eq!(search.search("boom").unwrap().await.unwrap(), SearchOutcome::Failed);
    let state = store.state();
    assert!(state.suggestions().is_empty());
    assert!(matches!(
        state.notice(),
        Some(Notice::LookupFailed { lookup: LookupKind::Forward, .. })
    ));
    assert_eq!(state.address(), "Hoan Kiem, Hanoi");
}

#[tokio::test(start_paused = true)]
async fn rejected_credentials_during_search_report_session_invalid() {
    let geocoder =
        Arc::new(ScriptedGeocoder::default().on_search("Hanoi", 10, Reply::Unauthorized));
    let store = start();
    let search = SuggestionSearch::new(store.clone(), geocoder, DEBOUNCE);

    assert_eq!(
        search.search("Hanoi").unwrap().await.unwrap(),
        SearchOutcome::SessionInvalid
    );
    assert_eq!(store.state().notice(), Some(&Notice::SessionInvalid));
}

#[tokio::test(start_paused = true)]
async fn address_follows_the_last_click_not_the_last_answer() {
    let c1 = pos(21.0, 105.0);
    let c2 = pos(21.1, 105.1);
    let geocoder = Arc::new(
        ScriptedGeocoder::default()
            .on_reverse(c1, 2_000, Reply::Ok("first click".to_owned()))
            .on_reverse(c2, 100, Reply::Ok("second click".to_owned())),
    );
    let store = start();
    let map = MapInteractionAdapter::new(store.clone(), geocoder);

    let first = map.on_click(c1.lat(), c1.lng()).unwrap();
    assert_eq!(store.position(), c1);
    assert_eq!(store.address(), "Hoan Kiem, Hanoi");
    let second = map.on_click(c2.lat(), c2.lng()).unwrap();
    assert_eq!(store.position(), c2);

    assert_eq!(
        second.await.unwrap(),
        ResolveOutcome::Applied("second click".to_owned())
    );
    assert_eq!(first.await.unwrap(), ResolveOutcome::Superseded);

    let state = store.state();
    assert_eq!(state.position(), c2);
    assert_eq!(state.address(), "second click");
    assert!(!state.is_resolving());
}

#[tokio::test(start_paused = true)]
async fn late_success_for_first_click_after_second_click_failed_changes_nothing() {
    let c1 = pos(21.0, 105.0);
    let c2 = pos(21.1, 105.1);
    let geocoder = Arc::new(
        ScriptedGeocoder::default()
            .on_reverse(c1, 2_000, Reply::Ok("first click".to_owned()))
            .on_reverse(c2, 100, Reply::Fail),
    );
    let store = start();
    let map = MapInteractionAdapter::new(store.clone(), geocoder);

    let first = map.on_click(c1.lat(), c1.lng()).unwrap();
    let second = map.on_click(c2.lat(), c2.lng()).unwrap();

    assert_eq!(second.await.unwrap(), ResolveOutcome::Failed);
    let after_failure = store.state();
    assert_eq!(after_failure.address(), "Hoan Kiem, Hanoi");
    assert!(matches!(
        after_failure.notice(),
        Some(Notice::LookupFailed { lookup: LookupKind::Reverse, .. })
    ));

    assert_eq!(first.await.unwrap(), ResolveOutcome::Superseded);
    let state = store.state();
    assert_eq!(state.position(), c2);
    assert_eq!(state.address(), "Hoan Kiem, Hanoi");
    assert_eq!(state.notice(), after_failure.notice());
}

#[tokio::test(start_paused = true)]
async fn out_of_range_click_is_rejected_without_state_change() {
    let geocoder = Arc::new(ScriptedGeocoder::default());
    let store = start();
    let map = MapInteractionAdapter::new(store.clone(), Arc::clone(&geocoder));
    let before = store.state();

    assert!(map.on_click(95.0, 10.0).is_err());
    assert!(map.on_marker_drag_end(10.0, f64::NAN).is_err());

    assert_eq!(store.state(), before);
    assert_eq!(geocoder.reverse_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_reverse_keeps_previous_address() {
    let at = pos(10.77, 106.70);
    let geocoder = Arc::new(ScriptedGeocoder::default().on_reverse(at, 10, Reply::Fail));
    let store = start();
    let map = MapInteractionAdapter::new(store.clone(), geocoder);

    let outcome = map.on_marker_drag_end(at.lat(), at.lng()).unwrap().await.unwrap();

    assert_eq!(outcome, ResolveOutcome::Failed);
    let state = store.state();
    assert_eq!(state.position(), at);
    assert_eq!(state.address(), "Hoan Kiem, Hanoi");
    assert!(matches!(
        state.notice(),
        Some(Notice::LookupFailed { lookup: LookupKind::Reverse, .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn selection_wins_over_inflight_search_and_reverse() {
    let clicked = pos(21.05, 105.80);
    let geocoder = Arc::new(
        ScriptedGeocoder::default()
            .on_search("Hano", 10, Reply::Ok(vec![suggestion("Hanoi", 21.03, 105.85)]))
            .on_search("Hanoi Opera", 1_000, Reply::Ok(vec![suggestion("late", 1.0, 1.0)]))
            .on_reverse(clicked, 1_000, Reply::Ok("from reverse".to_owned())),
    );
    let store = start();
    let search = SuggestionSearch::new(store.clone(), Arc::clone(&geocoder), DEBOUNCE);
    let map = MapInteractionAdapter::new(store.clone(), Arc::clone(&geocoder));

    search.search("Hano").unwrap().await.unwrap();
    let late_search = search.search("Hanoi Opera").unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;
    let late_reverse = map.on_click(clicked.lat(), clicked.lng()).unwrap();

    let picked = map.on_select_index(0).unwrap();
    assert_eq!(picked.label, "Hanoi");

    let state = store.state();
    assert_eq!(state.position(), picked.position);
    assert_eq!(state.address(), "Hanoi");
    assert!(state.suggestions().is_empty());

    assert_eq!(late_search.await.unwrap(), SearchOutcome::Superseded);
    assert_eq!(late_reverse.await.unwrap(), ResolveOutcome::Superseded);

    let state = store.state();
    assert_eq!(state.position(), picked.position);
    assert_eq!(state.address(), "Hanoi");
    assert!(state.suggestions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn selection_is_observed_as_one_change() {
    let geocoder = Arc::new(
        ScriptedGeocoder::default()
            .on_search("Hano", 10, Reply::Ok(vec![suggestion("Hanoi", 21.03, 105.85)])),
    );
    let store = start();
    let search = SuggestionSearch::new(store.clone(), Arc::clone(&geocoder), DEBOUNCE);
    let map = MapInteractionAdapter::new(store.clone(), geocoder);
    search.search("Hano").unwrap().await.unwrap();

    let mut rx = store.subscribe();
    rx.borrow_and_update();
    assert!(map.on_select_index(0).is_some());

    assert!(rx.has_changed().unwrap());
    let seen = rx.borrow_and_update().clone();
    assert_eq!(seen.position(), pos(21.03, 105.85));
    assert_eq!(seen.address(), "Hanoi");
    assert!(seen.suggestions().is_empty());
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test(start_paused = true)]
async fn select_index_out_of_range_changes_nothing() {
    let store = start();
    let map = MapInteractionAdapter::new(store.clone(), Arc::new(ScriptedGeocoder::default()));
    let before = store.state();
    assert!(map.on_select_index(3).is_none());
    assert_eq!(store.state(), before);
}

#[tokio::test(start_paused = true)]
async fn typing_wins_over_a_pending_reverse_lookup() {
    let clicked = pos(21.05, 105.80);
    let geocoder = Arc::new(
        ScriptedGeocoder::default()
            .on_reverse(clicked, 1_000, Reply::Ok("from reverse".to_owned()))
            .on_search(
                "12 Trang Tien",
                10,
                Reply::Ok(vec![suggestion("12 Trang Tien, Hanoi", 21.02, 105.85)]),
            ),
    );
    let backend = Arc::new(BackendClient::new("http://backend.invalid", 5, "token").unwrap());
    let editor = ProfileEditor::with_profile(
        EditorDeps {
            geocoder,
            backend,
            debounce: DEBOUNCE,
            default_position: pos(21.0285, 105.8542),
        },
        None,
    );

    let reverse = editor.click(clicked.lat(), clicked.lng()).unwrap();
    let search = editor.type_address("12 Trang Tien").unwrap();

    assert_eq!(editor.state().address(), "12 Trang Tien");
    assert_eq!(search.await.unwrap(), SearchOutcome::Applied { count: 1 });
    assert_eq!(reverse.await.unwrap(), ResolveOutcome::Superseded);

    let state = editor.state();
    assert_eq!(state.address(), "12 Trang Tien");
    assert_eq!(state.position(), clicked);
    assert_eq!(state.suggestions().len(), 1);
}

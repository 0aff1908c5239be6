//! Adopting content that was loaded before the navigator took over.

use pretty_assertions::assert_eq;
use scene_harness::{history_names, Callback, InMemoryHost, LifecycleRecorder, TestContent};
use scene_navigator::{
    CancellationToken, LoadRequest, NavigationError, NavigatorConfig, SceneNavigator,
    StandardNavigator,
};

#[tokio::test]
async fn initialize_adopts_loaded_content() {
    let host = InMemoryHost::new();
    let rec = LifecycleRecorder::new();
    let boot = TestContent::new("Boot", &host, &rec).preload().await.unwrap();
    let boot_id = boot.content.clone();
    host.set_discoverable(boot);

    let nav = StandardNavigator::new(host.clone());
    nav.initialize().await.unwrap();

    assert_eq!(history_names(&nav), vec!["Boot"]);
    assert_eq!(rec.sequence(), vec!["Boot:Initialize", "Boot:Enter"]);
    assert_eq!(nav.active_content(), Some(boot_id));
    assert_eq!(nav.process_counter().version(), 1);
    assert!(!nav.process_counter().is_busy());

    let next = TestContent::new("Next", &host, &rec).build();
    nav.push(LoadRequest::new(next), CancellationToken::new()).await.unwrap();
    assert_eq!(rec.count("Boot", Callback::Exit), 1);
    assert_eq!(rec.count("Boot", Callback::Finalize), 1);
    assert_eq!(host.loaded(), vec!["Next"]);
}

#[tokio::test]
async fn pre_initialize_runs_when_configured() {
    let host = InMemoryHost::new();
    let rec = LifecycleRecorder::new();
    host.set_discoverable(TestContent::new("Boot", &host, &rec).preload().await.unwrap());

    let nav = StandardNavigator::new(host.clone())
        .with_config(NavigatorConfig::default().with_pre_initialize_adopted(true));
    nav.initialize().await.unwrap();

    assert_eq!(
        rec.sequence(),
        vec!["Boot:PreInitialize", "Boot:Initialize", "Boot:Enter"]
    );
}

#[tokio::test]
async fn initialize_without_loaded_content_is_quiet() {
    let host = InMemoryHost::new();
    let nav = StandardNavigator::new(host.clone());
    nav.initialize().await.unwrap();
    assert!(nav.history().is_empty());
    assert_eq!(nav.process_counter().version(), 0);
    assert!(matches!(nav.initialize().await, Err(NavigationError::AlreadyInitialized)));
}

#[tokio::test]
async fn late_loaded_content_adopted_only_when_idle() {
    let host = InMemoryHost::new();
    let rec = LifecycleRecorder::new();
    let nav = StandardNavigator::new(host.clone());

    let early = TestContent::new("Early", &host, &rec).preload().await.unwrap();
    assert!(matches!(
        nav.on_content_loaded(early.clone()).await,
        Err(NavigationError::NotInitialized)
    ));

    nav.initialize().await.unwrap();
    assert!(nav.on_content_loaded(early).await.unwrap());
    assert_eq!(history_names(&nav), vec!["Early"]);

    let late = TestContent::new("Late", &host, &rec).preload().await.unwrap();
    assert!(!nav.on_content_loaded(late).await.unwrap());
    assert_eq!(history_names(&nav), vec!["Early"]);
    assert_eq!(rec.count("Late", Callback::Initialize), 0);
}

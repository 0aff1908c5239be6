//! Process-wide forwarding wrapper.

use pretty_assertions::assert_eq;
use scene_harness::{history_names, InMemoryHost, LifecycleRecorder, TestContent};
use scene_navigator::{
    CancellationToken, GlobalNavigator, LoadRequest, NavigationError, PopRequest, SceneNavigator,
    SceneNavigatorExt, StandardNavigator,
};
use std::sync::Arc;

#[tokio::test]
async fn forwards_to_registered_navigator() {
    let host = InMemoryHost::new();
    let rec = LifecycleRecorder::new();
    let inner = Arc::new(StandardNavigator::new(host.clone()));
    let global = GlobalNavigator::new();
    global.register(inner.clone()).unwrap();
    global.start().await.unwrap();
    assert!(inner.is_initialized());

    let first = TestContent::new("First", &host, &rec).build();
    let second = TestContent::new("Second", &host, &rec).build();
    global.push(LoadRequest::new(first), CancellationToken::new()).await.unwrap();
    global.push(LoadRequest::new(second), CancellationToken::new()).await.unwrap();

    assert_eq!(history_names(&global), vec!["Second", "First"]);
    assert_eq!(history_names(&*inner), vec!["Second", "First"]);
    assert!(global.can_pop());

    let mut builder = global.history_builder_unsafe().unwrap();
    builder.remove_all_except_current();
    builder.build().unwrap();
    assert!(!global.can_pop());

    global.shutdown();
    assert!(global.history().is_empty());
    assert!(inner.history().is_empty());
    let err = global.pop(PopRequest::default(), CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, NavigationError::NotRegistered));
}

#[tokio::test]
async fn registration_closes_on_start() {
    let global = GlobalNavigator::new();
    global.initialize().await.unwrap();
    let late = Arc::new(StandardNavigator::new(InMemoryHost::new()));
    assert!(matches!(global.register(late), Err(NavigationError::RegistrationClosed)));
    assert!(global.is_started());
}

//! Verbs called while another verb is suspended.

use futures::future::BoxFuture;
use pretty_assertions::assert_eq;
use scene_harness::{
    history_names, navigator, Callback, HookContext, LifecycleFlags, LifecycleRecorder,
    RecordingDirector, TestContent,
};
use scene_navigator::{
    operation, CancellationToken, ContentId, LoadRequest, NavigationError, PopRequest, Result,
    SceneNavigator, StandardNavigator,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Hook that pushes `target` with a fresh token.
fn push_hook(
    nav: &Arc<StandardNavigator>,
    target: &ContentId,
) -> impl Fn(HookContext) -> BoxFuture<'static, Result<()>> + Send + Sync + 'static {
    let nav = nav.clone();
    let target = target.clone();
    move |_ctx: HookContext| -> BoxFuture<'static, Result<()>> {
        let nav = nav.clone();
        let target = target.clone();
        Box::pin(async move { nav.push(LoadRequest::new(target), CancellationToken::new()).await })
    }
}

#[tokio::test]
async fn push_from_on_enter_cancels_outer_push() {
    let (nav, host) = navigator().await;
    let rec = LifecycleRecorder::new();
    let interrupt = TestContent::new("Interrupt", &host, &rec).build();
    let first = TestContent::new("First", &host, &rec)
        .on(Callback::Enter, push_hook(&nav, &interrupt))
        .build();

    let err = nav
        .push(LoadRequest::new(first), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, NavigationError::Canceled));
    assert_eq!(history_names(&*nav), vec!["Interrupt", "First"]);
    assert_eq!(
        rec.sequence(),
        vec![
            "First:Initialize",
            "First:Enter",
            "First:Exit",
            "First:Finalize",
            "Interrupt:Initialize",
            "Interrupt:Enter",
        ]
    );
    assert_eq!(nav.active_content(), Some(interrupt));
    assert_eq!(host.loaded(), vec!["Interrupt"]);
    assert!(!nav.process_counter().is_busy());
}

#[tokio::test]
async fn nested_pushes_from_on_initialize_skip_exit() {
    let (nav, host) = navigator().await;
    let rec = LifecycleRecorder::new();
    let second_interrupt = TestContent::new("Interrupt2", &host, &rec).build();
    let first_interrupt = TestContent::new("Interrupt1", &host, &rec)
        .on(Callback::Initialize, push_hook(&nav, &second_interrupt))
        .build();
    let first = TestContent::new("First", &host, &rec)
        .on(Callback::Initialize, push_hook(&nav, &first_interrupt))
        .build();

    let err = nav
        .push(LoadRequest::new(first), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_canceled());
    assert_eq!(history_names(&*nav), vec!["Interrupt2", "Interrupt1", "First"]);
    assert_eq!(rec.count("First", Callback::Exit), 0);
    assert_eq!(rec.count("Interrupt1", Callback::Exit), 0);
    assert_eq!(
        rec.sequence(),
        vec![
            "First:Initialize",
            "First:Finalize",
            "Interrupt1:Initialize",
            "Interrupt1:Finalize",
            "Interrupt2:Initialize",
            "Interrupt2:Enter",
        ]
    );
    assert_eq!(host.loaded(), vec!["Interrupt2"]);
}

#[tokio::test]
async fn pop_interrupted_by_pop() {
    let (nav, host) = navigator().await;
    let rec = LifecycleRecorder::new();
    for name in ["First", "Second", "Third"] {
        let content = TestContent::new(name, &host, &rec).build();
        nav.push(LoadRequest::new(content), CancellationToken::new()).await.unwrap();
    }

    let inner = nav.clone();
    let interrupt = operation::from_fn(move |_progress, _cancel| {
        let nav = inner.clone();
        async move { nav.pop(PopRequest::default(), CancellationToken::new()).await }
    });
    let err = nav
        .pop(PopRequest::new().with_interrupt(interrupt), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_canceled());
    assert_eq!(history_names(&*nav), vec!["First"]);
    assert_eq!(rec.flags("Second"), LifecycleFlags::ALL);
    assert_eq!(rec.flags("Third"), LifecycleFlags::ALL);
    assert_eq!(rec.count("First", Callback::Initialize), 2);
    assert_eq!(host.loaded(), vec!["First"]);
    assert!(!host.has_placeholder());
}

#[tokio::test]
async fn change_interrupted_by_change() {
    let (nav, host) = navigator().await;
    let rec = LifecycleRecorder::new();
    let first = TestContent::new("First", &host, &rec).build();
    let second = TestContent::new("Second", &host, &rec).build();
    let third = TestContent::new("Third", &host, &rec).build();

    nav.push(LoadRequest::new(first), CancellationToken::new()).await.unwrap();

    let inner = nav.clone();
    let interrupt = operation::from_fn(move |_progress, _cancel| {
        let nav = inner.clone();
        let third = third.clone();
        async move { nav.change(LoadRequest::new(third), CancellationToken::new()).await }
    });
    let err = nav
        .change(LoadRequest::new(second).with_interrupt(interrupt), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_canceled());
    assert_eq!(rec.flags("Second"), LifecycleFlags::NONE);
    assert_eq!(history_names(&*nav), vec!["Third"]);
    assert_eq!(host.loaded(), vec!["Third"]);
}

#[tokio::test]
async fn interrupt_inherits_running_transition() {
    let (nav, host) = navigator().await;
    let rec = LifecycleRecorder::new();
    let outer_director = RecordingDirector::new();
    let inner_director = RecordingDirector::new();
    let first = TestContent::new("First", &host, &rec).build();
    let second = TestContent::new("Second", &host, &rec).build();
    let third = TestContent::new("Third", &host, &rec).build();

    nav.push(LoadRequest::new(first), CancellationToken::new()).await.unwrap();

    let inner = nav.clone();
    let director = inner_director.clone();
    let interrupt = operation::from_fn(move |_progress, _cancel| {
        let nav = inner.clone();
        let request = LoadRequest::new(third.clone()).with_director(Arc::new(director.clone()));
        async move { nav.push(request, CancellationToken::new()).await }
    });
    let err = nav
        .push(
            LoadRequest::new(second)
                .with_director(Arc::new(outer_director.clone()))
                .with_interrupt(interrupt),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(err.is_canceled());
    assert_eq!(outer_director.starts(), 1);
    assert_eq!(outer_director.ends(), 1);
    assert_eq!(inner_director.handles(), 0);
    assert_eq!(history_names(&*nav), vec!["Third", "First"]);
}

#[tokio::test]
async fn caller_cancellation_stops_before_enter() {
    let (nav, host) = navigator().await;
    let rec = LifecycleRecorder::new();
    let director = RecordingDirector::new();
    let caller = CancellationToken::new();

    let trip = caller.clone();
    let first = TestContent::new("First", &host, &rec)
        .on(Callback::Initialize, move |_ctx| {
            let trip = trip.clone();
            async move {
                trip.cancel();
                Ok(())
            }
        })
        .build();
    let second = TestContent::new("Second", &host, &rec).build();

    let err = nav
        .push(LoadRequest::new(first).with_director(Arc::new(director.clone())), caller)
        .await
        .unwrap_err();
    assert!(err.is_canceled());
    assert_eq!(history_names(&*nav), vec!["First"]);
    assert_eq!(rec.flags("First"), LifecycleFlags::INITIALIZE);
    assert_eq!(director.starts(), 1);
    assert_eq!(director.ends(), 0);

    // The unfinished transition is picked up and ended by the next verb, and
    // content that never reached enter is finalized without an exit.
    nav.push(LoadRequest::new(second), CancellationToken::new()).await.unwrap();
    assert_eq!(director.ends(), 1);
    assert_eq!(rec.flags("First"), LifecycleFlags::INITIALIZE | LifecycleFlags::FINALIZE);
    assert_eq!(history_names(&*nav), vec!["Second", "First"]);
}

#[tokio::test]
async fn builder_unavailable_while_verb_runs() {
    let (nav, host) = navigator().await;
    let rec = LifecycleRecorder::new();
    let saw_busy = Arc::new(AtomicBool::new(false));

    let observer = nav.clone();
    let flag = saw_busy.clone();
    let first = TestContent::new("First", &host, &rec)
        .on(Callback::Enter, move |_ctx| {
            let nav = observer.clone();
            let flag = flag.clone();
            async move {
                let busy = nav.process_counter().is_busy()
                    && matches!(nav.history_builder_unsafe(), Err(NavigationError::Busy));
                flag.store(busy, Ordering::SeqCst);
                Ok(())
            }
        })
        .build();

    nav.push(LoadRequest::new(first), CancellationToken::new()).await.unwrap();
    assert!(saw_busy.load(Ordering::SeqCst));
    assert!(nav.history_builder_unsafe().is_ok());
}

#[tokio::test]
async fn superseded_load_is_unloaded() {
    let (nav, host) = navigator().await;
    let rec = LifecycleRecorder::new();
    let first = TestContent::new("First", &host, &rec).build();
    let second = TestContent::new("Second", &host, &rec).build();

    let outer = nav.clone();
    let pending = tokio::spawn(async move {
        outer
            .push(LoadRequest::new(first), CancellationToken::new())
            .await
    });
    // Let the spawned push suspend inside its load.
    tokio::task::yield_now().await;
    nav.push(LoadRequest::new(second), CancellationToken::new())
        .await
        .unwrap();

    let err = pending.await.unwrap().unwrap_err();
    assert!(err.is_canceled());
    assert_eq!(history_names(&*nav), vec!["Second"]);
    assert_eq!(host.loaded(), vec!["Second"]);
    assert_eq!(rec.flags("First"), LifecycleFlags::NONE);
    assert!(!nav.process_counter().is_busy());
}

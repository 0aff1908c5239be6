//! Transition orchestrator.
//!
//! Every verb runs the same six phases against the current history entry:
//!
//! ```text
//!  1 exit         previous stage reached Entering → current.on_exit
//!  2 transition   start the director (reused if a transition is already running)
//!  3 finalize     current.on_finalize → placeholder → unload current
//!  4 interrupt    request.interrupt (may call another verb)
//!  5 load         load target → drop placeholder → resolve entry point → history
//!  6 enter        on_initialize → director end → on_enter
//! ```
//!
//! Each verb call cancels the scope of the one before it and derives its own
//! from the caller's token, so a verb called from inside a callback or an
//! interrupt supersedes the verb that invoked it. The superseded verb fails
//! with `Canceled` at its next checkpoint and never touches state again.
//!
//! State sits behind a mutex that is only held between suspension points.

use super::builder::HistoryBuilder;
use super::{EntryStage, LoadRequest, NavigationVerb, PopRequest, ReloadRequest, SceneNavigator};
use crate::content::{
    ContentHandle, ContentHost, ContentId, DiscoveredContent, EntryPoint, LoadedContent,
};
use crate::data_store::{DataReader, DataStore};
use crate::error::check;
use crate::history::{History, HistoryEntry};
use crate::operation::AsyncOperation;
use crate::process_counter::ProcessCounter;
use crate::progress::{
    self, ProgressDataStore, ProgressFactory, StandardProgressFactory, TransitionProgress,
};
use crate::transition::{self, TransitionDirector, TransitionRunState};
use crate::{NavigationError, NavigatorConfig, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The unit that is currently loaded and driven by the navigator.
#[derive(Clone)]
pub(super) struct ActiveContent {
    pub(super) content: ContentId,
    pub(super) handle: Arc<dyn ContentHandle>,
    pub(super) entry_point: Arc<dyn EntryPoint>,
}

impl ActiveContent {
    fn same_handle(&self, other: &ActiveContent) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.handle), Arc::as_ptr(&other.handle))
    }
}

pub(super) struct NavigatorState {
    pub(super) history: History<HistoryEntry>,
    pub(super) active: Option<ActiveContent>,
    current_stage: Option<EntryStage>,
    previous_stage: Option<EntryStage>,
    transition: Option<TransitionRunState>,
    scope: Option<CancellationToken>,
    initialized: bool,
    disposed: bool,
}

impl NavigatorState {
    pub(super) fn new(history_capacity: usize) -> Self {
        Self {
            history: History::with_capacity(history_capacity),
            active: None,
            current_stage: None,
            previous_stage: None,
            transition: None,
            scope: None,
            initialized: false,
            disposed: false,
        }
    }
}

pub(super) type SharedState = Arc<Mutex<NavigatorState>>;

pub(super) fn lock_state(state: &SharedState) -> MutexGuard<'_, NavigatorState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Stack-based navigator over a [`ContentHost`].
pub struct StandardNavigator {
    state: SharedState,
    counter: ProcessCounter,
    host: Arc<dyn ContentHost>,
    default_director: Arc<dyn TransitionDirector>,
    progress_factory: Arc<dyn ProgressFactory>,
    config: NavigatorConfig,
}

impl StandardNavigator {
    pub fn new(host: Arc<dyn ContentHost>) -> Self {
        let config = NavigatorConfig::default();
        Self {
            state: Arc::new(Mutex::new(NavigatorState::new(config.history_capacity))),
            counter: ProcessCounter::new(),
            host,
            default_director: transition::empty(),
            progress_factory: Arc::new(StandardProgressFactory),
            config,
        }
    }

    pub fn with_config(mut self, config: NavigatorConfig) -> Self {
        self.state = Arc::new(Mutex::new(NavigatorState::new(config.history_capacity)));
        self.config = config;
        self
    }

    /// Director used when a request names none.
    pub fn with_default_director(mut self, director: Arc<dyn TransitionDirector>) -> Self {
        self.default_director = director;
        self
    }

    pub fn with_progress_factory(mut self, factory: Arc<dyn ProgressFactory>) -> Self {
        self.progress_factory = factory;
        self
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn process_counter(&self) -> &ProcessCounter {
        &self.counter
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().initialized
    }

    /// Content currently loaded and driven, if any.
    pub fn active_content(&self) -> Option<ContentId> {
        self.lock().active.as_ref().map(|a| a.content.clone())
    }

    /// Host notification that a unit finished loading outside the navigator.
    ///
    /// The unit is adopted as the first content only when nothing is active
    /// and no verb is in flight. Returns whether it was adopted.
    pub async fn on_content_loaded(&self, discovered: DiscoveredContent) -> Result<bool> {
        self.ensure_ready()?;
        if self.counter.is_busy() || self.lock().active.is_some() {
            debug!(content = %discovered.content, "ignoring loaded content");
            return Ok(false);
        }
        self.adopt(discovered, CancellationToken::new()).await?;
        Ok(true)
    }

    fn lock(&self) -> MutexGuard<'_, NavigatorState> {
        lock_state(&self.state)
    }

    fn ensure_ready(&self) -> Result<()> {
        let state = self.lock();
        if state.disposed {
            Err(NavigationError::Disposed)
        } else if !state.initialized {
            Err(NavigationError::NotInitialized)
        } else {
            Ok(())
        }
    }

    /// Cancel the running scope and derive a fresh one from `caller`.
    fn relink(&self, caller: &CancellationToken) -> CancellationToken {
        let mut state = self.lock();
        state.previous_stage = state.current_stage.take();
        if let Some(previous) = state.scope.take() {
            previous.cancel();
        }
        let scope = caller.child_token();
        state.scope = Some(scope.clone());
        scope
    }

    fn finish(
        &self,
        verb: NavigationVerb,
        label: &str,
        call_id: Uuid,
        result: Result<()>,
    ) -> Result<()> {
        match &result {
            Ok(()) => debug!(%call_id, %verb, content = label, "navigation complete"),
            Err(e) if e.is_canceled() => {
                info!(%call_id, %verb, content = label, "{verb} {label} has been canceled")
            }
            Err(e) => warn!(%call_id, %verb, content = label, error = %e, "{verb} {label} failed"),
        }
        result
    }

    async fn adopt(&self, discovered: DiscoveredContent, cancel: CancellationToken) -> Result<()> {
        check(&cancel)?;
        let DiscoveredContent {
            content,
            handle,
            entry_point,
        } = discovered;
        let store = DataStore::new();
        {
            let mut state = self.lock();
            state.active = Some(ActiveContent {
                content: content.clone(),
                handle,
                entry_point: entry_point.clone(),
            });
            state.history.push(HistoryEntry::new(
                content.clone(),
                self.default_director.clone(),
                store.clone(),
            ));
        }

        let _scope = self.counter.enter();
        let ct = self.relink(&cancel);
        let call_id = Uuid::new_v4();
        let label = content.to_string();
        info!(%call_id, verb = %NavigationVerb::Adopt, content = %label, "adopting loaded content");
        let result = self.run_adopt(entry_point, store.reader(), &ct).await;
        self.finish(NavigationVerb::Adopt, &label, call_id, result)
    }

    async fn run_adopt(
        &self,
        entry_point: Arc<dyn EntryPoint>,
        reader: DataReader,
        ct: &CancellationToken,
    ) -> Result<()> {
        if self.config.pre_initialize_adopted {
            self.lock().current_stage = Some(EntryStage::PreInitializing);
            entry_point.on_first_pre_initialize(reader.clone(), ct.clone()).await?;
            check(ct)?;
        }
        self.lock().current_stage = Some(EntryStage::Initializing);
        entry_point.on_initialize(reader.clone(), progress::none(), ct.clone()).await?;
        check(ct)?;
        self.lock().current_stage = Some(EntryStage::Entering);
        entry_point.on_enter(reader, ct.clone()).await?;
        check(ct)
    }

    // Phase 1
    async fn exit_current(
        &self,
        current: Option<&HistoryEntry>,
        ct: &CancellationToken,
    ) -> Result<()> {
        let entry_point = {
            let state = self.lock();
            if state.previous_stage >= Some(EntryStage::Entering) {
                state.active.as_ref().map(|a| a.entry_point.clone())
            } else {
                None
            }
        };
        if let (Some(entry_point), Some(entry)) = (entry_point, current) {
            debug!(content = %entry.content(), "exit");
            entry_point.on_exit(entry.data_store().writer(), ct.clone()).await?;
            check(ct)?;
        }
        Ok(())
    }

    // Phase 2
    async fn ensure_transition(
        &self,
        director: &Arc<dyn TransitionDirector>,
        ct: &CancellationToken,
    ) -> Result<TransitionProgress> {
        check(ct)?;
        let (run, fresh) = {
            let mut state = self.lock();
            if let Some(run) = state.transition.clone() {
                (run, false)
            } else {
                let run = TransitionRunState::new(director.as_ref());
                state.transition = Some(run.clone());
                (run, true)
            }
        };
        if fresh {
            debug!("transition start");
            run.handle.start(ct.clone()).await?;
            check(ct)?;
        }
        Ok(run.progress)
    }

    // Phase 3
    async fn finalize_and_unload(
        &self,
        current: Option<&HistoryEntry>,
        snapshot: &ProgressDataStore,
        progress: &TransitionProgress,
        ct: &CancellationToken,
    ) -> Result<()> {
        check(ct)?;
        let active = self.lock().active.clone();
        let (Some(entry), Some(active)) = (current, active) else {
            return Ok(());
        };

        debug!(content = %active.content, "finalize");
        active
            .entry_point
            .on_finalize(entry.data_store().writer(), progress.clone(), ct.clone())
            .await?;
        check(ct)?;

        if self.host.loaded_count() < 2 {
            self.host.load_placeholder(ct.clone()).await?;
        }
        let unload_progress = self
            .progress_factory
            .create_progress(snapshot.clone(), progress.clone());
        active.handle.unload(unload_progress, ct.clone()).await?;
        {
            let mut state = self.lock();
            if state.active.as_ref().is_some_and(|a| a.same_handle(&active)) {
                state.active = None;
            }
        }
        check(ct)
    }

    // Phase 4
    async fn run_interrupt(
        &self,
        interrupt: Option<&Arc<dyn AsyncOperation>>,
        progress: &TransitionProgress,
        ct: &CancellationToken,
    ) -> Result<()> {
        check(ct)?;
        if let Some(op) = interrupt {
            debug!("interrupt");
            op.execute(progress.clone(), ct.clone()).await?;
            check(ct)?;
        }
        Ok(())
    }

    // Phase 5
    async fn load_content(
        &self,
        content: &ContentId,
        snapshot: &ProgressDataStore,
        progress: &TransitionProgress,
        ct: &CancellationToken,
    ) -> Result<ActiveContent> {
        check(ct)?;
        debug!(%content, "load");
        let handle = content.create_handle();
        let load_progress = self
            .progress_factory
            .create_progress(snapshot.clone(), progress.clone());
        let loaded = handle.load(load_progress, ct.clone()).await?;
        match self.settle_load(loaded, ct).await {
            Ok(entry_point) => Ok(ActiveContent {
                content: content.clone(),
                handle,
                entry_point,
            }),
            Err(err) => {
                self.discard(content, &handle).await;
                Err(err)
            }
        }
    }

    async fn settle_load(
        &self,
        loaded: LoadedContent,
        ct: &CancellationToken,
    ) -> Result<Arc<dyn EntryPoint>> {
        check(ct)?;
        self.host.unload_placeholder(ct.clone()).await?;
        check(ct)?;
        let LoadedContent { name, entry_point } = loaded;
        entry_point.ok_or(NavigationError::EntryPointNotFound(name))
    }

    /// Unload a unit that was loaded but never became active.
    async fn discard(&self, content: &ContentId, handle: &Arc<dyn ContentHandle>) {
        debug!(%content, "discarding loaded content");
        if let Err(e) = handle.unload(progress::none(), CancellationToken::new()).await {
            warn!(%content, error = %e, "failed to unload discarded content");
        }
    }

    /// Make `active` current and apply `edit` to history, unless `ct` was
    /// canceled in the meantime, in which case the unit is discarded.
    async fn commit<F>(&self, active: ActiveContent, ct: &CancellationToken, edit: F) -> Result<()>
    where
        F: FnOnce(&mut History<HistoryEntry>) + Send,
    {
        let rejected = {
            let mut state = self.lock();
            if ct.is_cancelled() {
                Some(active)
            } else {
                edit(&mut state.history);
                state.active = Some(active);
                None
            }
        };
        match rejected {
            Some(active) => {
                self.discard(&active.content, &active.handle).await;
                Err(NavigationError::Canceled)
            }
            None => Ok(()),
        }
    }

    // Phase 6
    async fn enter_sequence(&self, reader: DataReader, ct: &CancellationToken) -> Result<()> {
        check(ct)?;
        let (entry_point, progress) = {
            let mut state = self.lock();
            state.current_stage = Some(EntryStage::Initializing);
            let entry_point = state
                .active
                .as_ref()
                .map(|a| a.entry_point.clone())
                .ok_or(NavigationError::NoActiveContent)?;
            let progress = state
                .transition
                .as_ref()
                .map(|t| t.progress.clone())
                .unwrap_or_else(progress::none);
            (entry_point, progress)
        };

        entry_point.on_initialize(reader.clone(), progress, ct.clone()).await?;
        check(ct)?;

        let run = self.lock().transition.clone();
        if let Some(run) = run {
            debug!("transition end");
            run.handle.end(ct.clone()).await?;
        }
        self.lock().transition = None;
        check(ct)?;

        self.lock().current_stage = Some(EntryStage::Entering);
        entry_point.on_enter(reader, ct.clone()).await?;
        check(ct)
    }

    async fn run_push(&self, request: LoadRequest, ct: &CancellationToken) -> Result<()> {
        let current = self.lock().history.try_peek().cloned();
        self.exit_current(current.as_ref(), ct).await?;

        let director = request.director.clone().unwrap_or_else(|| self.default_director.clone());
        let progress = self.ensure_transition(&director, ct).await?;
        let snapshot = self.progress_factory.create_snapshot();
        self.finalize_and_unload(current.as_ref(), &snapshot, &progress, ct).await?;
        self.run_interrupt(request.interrupt.as_ref(), &progress, ct).await?;

        let active = self.load_content(&request.content, &snapshot, &progress, ct).await?;
        let store = DataStore::with_data(request.data);
        let entry = HistoryEntry::new(request.content, director, store.clone());
        self.commit(active, ct, |history| history.push(entry)).await?;
        self.enter_sequence(store.reader(), ct).await
    }

    async fn run_pop(&self, request: PopRequest, ct: &CancellationToken) -> Result<()> {
        let (current, target) = {
            let mut state = self.lock();
            let depth = state.history.len();
            if depth < 2 {
                return Err(NavigationError::CannotPop { depth });
            }
            let current = state.history.pop()?;
            let target = state.history.peek()?.clone();
            (current, target)
        };
        self.exit_current(Some(&current), ct).await?;

        let director = request
            .override_director
            .clone()
            .unwrap_or_else(|| current.director().clone());
        let progress = self.ensure_transition(&director, ct).await?;
        let snapshot = self.progress_factory.create_snapshot();
        self.finalize_and_unload(Some(&current), &snapshot, &progress, ct).await?;
        self.run_interrupt(request.interrupt.as_ref(), &progress, ct).await?;

        let active = self.load_content(target.content(), &snapshot, &progress, ct).await?;
        self.commit(active, ct, |_| {}).await?;
        self.enter_sequence(target.reader(), ct).await
    }

    async fn run_change(&self, request: LoadRequest, ct: &CancellationToken) -> Result<()> {
        let current = self.lock().history.try_peek().cloned();
        self.exit_current(current.as_ref(), ct).await?;

        let director = request.director.clone().unwrap_or_else(|| self.default_director.clone());
        let progress = self.ensure_transition(&director, ct).await?;
        let snapshot = self.progress_factory.create_snapshot();
        self.finalize_and_unload(current.as_ref(), &snapshot, &progress, ct).await?;
        self.run_interrupt(request.interrupt.as_ref(), &progress, ct).await?;

        let active = self.load_content(&request.content, &snapshot, &progress, ct).await?;
        let store = DataStore::with_data(request.data);
        let entry = HistoryEntry::new(request.content, director, store.clone());
        self.commit(active, ct, |history| {
            history.clear();
            history.push(entry);
        })
        .await?;
        self.enter_sequence(store.reader(), ct).await
    }

    async fn run_replace(&self, request: LoadRequest, ct: &CancellationToken) -> Result<()> {
        let current = self.lock().history.peek()?.clone();
        self.exit_current(Some(&current), ct).await?;

        let director = request.director.clone().unwrap_or_else(|| self.default_director.clone());
        let progress = self.ensure_transition(&director, ct).await?;
        let snapshot = self.progress_factory.create_snapshot();
        self.finalize_and_unload(Some(&current), &snapshot, &progress, ct).await?;
        self.run_interrupt(request.interrupt.as_ref(), &progress, ct).await?;

        let active = self.load_content(&request.content, &snapshot, &progress, ct).await?;
        let store = DataStore::with_data(request.data);
        let entry = HistoryEntry::new(request.content, director, store.clone());
        self.commit(active, ct, |history| {
            history.try_pop();
            history.push(entry);
        })
        .await?;
        self.enter_sequence(store.reader(), ct).await
    }

    async fn run_reload(&self, request: ReloadRequest, ct: &CancellationToken) -> Result<()> {
        let current = self.lock().history.peek()?.clone();
        self.exit_current(Some(&current), ct).await?;

        let director = request
            .override_director
            .clone()
            .unwrap_or_else(|| current.director().clone());
        let progress = self.ensure_transition(&director, ct).await?;
        let snapshot = self.progress_factory.create_snapshot();
        self.finalize_and_unload(Some(&current), &snapshot, &progress, ct).await?;
        self.run_interrupt(request.interrupt.as_ref(), &progress, ct).await?;

        let active = self.load_content(current.content(), &snapshot, &progress, ct).await?;
        self.commit(active, ct, |_| {}).await?;
        self.enter_sequence(current.reader(), ct).await
    }
}

#[async_trait]
impl SceneNavigator for StandardNavigator {
    async fn initialize(&self) -> Result<()> {
        {
            let mut state = self.lock();
            if state.disposed {
                return Err(NavigationError::Disposed);
            }
            if state.initialized {
                return Err(NavigationError::AlreadyInitialized);
            }
            state.initialized = true;
        }
        info!("navigator initialized");

        match self.host.find_first_entry_point() {
            Some(discovered) => self.adopt(discovered, CancellationToken::new()).await,
            None => Ok(()),
        }
    }

    fn history(&self) -> Vec<HistoryEntry> {
        self.lock().history.iter().cloned().collect()
    }

    async fn push(&self, request: LoadRequest, cancel: CancellationToken) -> Result<()> {
        self.ensure_ready()?;
        check(&cancel)?;
        let _scope = self.counter.enter();
        let ct = self.relink(&cancel);

        let call_id = Uuid::new_v4();
        let label = request.content.to_string();
        info!(%call_id, verb = %NavigationVerb::Push, content = %label, "navigating");
        let result = self.run_push(request, &ct).await;
        self.finish(NavigationVerb::Push, &label, call_id, result)
    }

    async fn pop(&self, request: PopRequest, cancel: CancellationToken) -> Result<()> {
        self.ensure_ready()?;
        let label = {
            let state = self.lock();
            let depth = state.history.len();
            if depth < 2 {
                return Err(NavigationError::CannotPop { depth });
            }
            let label = state
                .history
                .iter()
                .nth(1)
                .map(|entry| entry.content().to_string())
                .unwrap_or_default();
            label
        };
        check(&cancel)?;
        let _scope = self.counter.enter();
        let ct = self.relink(&cancel);

        let call_id = Uuid::new_v4();
        info!(%call_id, verb = %NavigationVerb::Pop, content = %label, "navigating");
        let result = self.run_pop(request, &ct).await;
        self.finish(NavigationVerb::Pop, &label, call_id, result)
    }

    async fn change(&self, request: LoadRequest, cancel: CancellationToken) -> Result<()> {
        self.ensure_ready()?;
        check(&cancel)?;
        let _scope = self.counter.enter();
        let ct = self.relink(&cancel);

        let call_id = Uuid::new_v4();
        let label = request.content.to_string();
        info!(%call_id, verb = %NavigationVerb::Change, content = %label, "navigating");
        let result = self.run_change(request, &ct).await;
        self.finish(NavigationVerb::Change, &label, call_id, result)
    }

    async fn replace(&self, request: LoadRequest, cancel: CancellationToken) -> Result<()> {
        self.ensure_ready()?;
        if self.lock().history.is_empty() {
            return Err(NavigationError::EmptyHistory);
        }
        check(&cancel)?;
        let _scope = self.counter.enter();
        let ct = self.relink(&cancel);

        let call_id = Uuid::new_v4();
        let label = request.content.to_string();
        info!(%call_id, verb = %NavigationVerb::Replace, content = %label, "navigating");
        let result = self.run_replace(request, &ct).await;
        self.finish(NavigationVerb::Replace, &label, call_id, result)
    }

    async fn reload(&self, request: ReloadRequest, cancel: CancellationToken) -> Result<()> {
        self.ensure_ready()?;
        let label = match self.lock().history.try_peek() {
            Some(entry) => entry.content().to_string(),
            None => return Err(NavigationError::EmptyHistory),
        };
        check(&cancel)?;
        let _scope = self.counter.enter();
        let ct = self.relink(&cancel);

        let call_id = Uuid::new_v4();
        info!(%call_id, verb = %NavigationVerb::Reload, content = %label, "navigating");
        let result = self.run_reload(request, &ct).await;
        self.finish(NavigationVerb::Reload, &label, call_id, result)
    }

    fn history_builder_unsafe(&self) -> Result<HistoryBuilder> {
        self.ensure_ready()?;
        if self.counter.is_busy() {
            return Err(NavigationError::Busy);
        }
        Ok(HistoryBuilder::new(self.state.clone(), self.counter.clone()))
    }

    fn dispose(&self) {
        let mut state = self.lock();
        if state.disposed {
            return;
        }
        state.disposed = true;
        if let Some(scope) = state.scope.take() {
            scope.cancel();
        }
        state.active = None;
        state.transition = None;
        state.history.clear();
        info!("navigator disposed");
    }
}

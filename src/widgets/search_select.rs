use crate::config::{ResponseOrdering, WidgetConfig};
use crate::domain::model::{Candidate, Selection, UserId};
use crate::domain::ports::{GeolocationProvider, MapProvider, UserDirectory};
use crate::utils::error::{ErrorCategory, Result, WidgetError};
use crate::utils::validation::Validate;
use crate::widgets::create_form::EntityCreateForm;
use crate::widgets::page::PageHost;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// 下拉選單狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Closed,
    OpenIdle,
    OpenLoading,
    OpenError,
}

/// What the dropdown list area shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ListContent {
    Candidates(Vec<Candidate>),
    NoResults(String),
    Loading(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchSelectEvent {
    Selected(Candidate),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSelectView {
    pub input_text: String,
    pub placeholder: String,
    /// Value of the hidden form input (selected user id).
    pub hidden_value: String,
    pub phase: SearchPhase,
    pub dropdown_open: bool,
    pub list: ListContent,
    pub create_label: String,
    pub selection: Option<Selection>,
}

#[derive(Debug, Clone)]
enum ListState {
    Ready(Vec<Candidate>),
    Loading,
    Failed(String),
}

struct SearchState {
    open: bool,
    input_text: String,
    hidden_value: String,
    /// 預設清單 (初始載入 + 新建立的使用者)
    loaded: Vec<Candidate>,
    list: ListState,
    selection: Option<Selection>,
    debounce: Option<JoinHandle<()>>,
    /// 最後發出的搜尋序號
    issued: u64,
}

struct Inner<D: UserDirectory> {
    directory: Arc<D>,
    config: WidgetConfig,
    page: Arc<PageHost>,
    map_provider: Option<Arc<dyn MapProvider>>,
    geolocation: Option<Arc<dyn GeolocationProvider>>,
    state: Mutex<SearchState>,
    events: broadcast::Sender<SearchSelectEvent>,
}

/// Incremental user search with a dropdown of candidates and a
/// "create new user" fallback.
pub struct SearchSelect<D: UserDirectory + 'static> {
    inner: Arc<Inner<D>>,
}

impl<D: UserDirectory + 'static> Clone for SearchSelect<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: UserDirectory + 'static> SearchSelect<D> {
    /// 建立元件並載入預設清單 (不帶查詢條件)。載入失敗只記錄，不影響使用。
    pub async fn initialize(
        directory: Arc<D>,
        config: WidgetConfig,
        page: Arc<PageHost>,
    ) -> Result<Self> {
        Self::initialize_with_map(directory, config, page, None, None).await
    }

    pub async fn initialize_with_map(
        directory: Arc<D>,
        config: WidgetConfig,
        page: Arc<PageHost>,
        map_provider: Option<Arc<dyn MapProvider>>,
        geolocation: Option<Arc<dyn GeolocationProvider>>,
    ) -> Result<Self> {
        config.search.validate()?;

        let (events, _) = broadcast::channel(64);
        let widget = Self {
            inner: Arc::new(Inner {
                directory,
                config,
                page,
                map_provider,
                geolocation,
                state: Mutex::new(SearchState {
                    open: false,
                    input_text: String::new(),
                    hidden_value: String::new(),
                    loaded: Vec::new(),
                    list: ListState::Ready(Vec::new()),
                    selection: None,
                    debounce: None,
                    issued: 0,
                }),
                events,
            }),
        };

        widget.inner.load_initial().await;
        Ok(widget)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SearchSelectEvent> {
        self.inner.events.subscribe()
    }

    pub fn on_focus(&self) {
        self.inner.state().open = true;
    }

    /// Pointer interaction anywhere on the page; closes the dropdown when it
    /// happened outside the widget root.
    pub fn on_pointer_down(&self, inside_widget: bool) {
        if !inside_widget {
            self.close_dropdown();
        }
    }

    pub fn close_dropdown(&self) {
        self.inner.state().open = false;
    }

    /// 輸入變更：短查詢直接顯示預設清單，否則重新啟動防抖計時器
    pub fn on_input_changed(&self, text: &str) {
        let query = text.trim().to_string();
        let mut state = self.inner.state();
        state.input_text = text.to_string();

        if let Some(pending) = state.debounce.take() {
            pending.abort();
        }

        if query.chars().count() < self.inner.config.search.min_chars {
            if self.inner.config.search.response_ordering == ResponseOrdering::LatestIssued {
                // 讓進行中的搜尋結果失效
                state.issued += 1;
            }
            state.list = ListState::Ready(state.loaded.clone());
            return;
        }

        let inner = Arc::clone(&self.inner);
        let delay = self.inner.config.search.debounce_delay();
        state.debounce = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // 已送出的請求不會因新的輸入而取消
            tokio::spawn(async move { inner.run_search(query).await });
        }));
    }

    pub fn has_pending_search(&self) -> bool {
        self.inner
            .state()
            .debounce
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Runs a search immediately, bypassing the debounce timer.
    pub async fn search(&self, query: &str) {
        self.inner.run_search(query.to_string()).await;
    }

    pub fn select_candidate(&self, candidate: Candidate) {
        self.inner.select_candidate(candidate);
    }

    /// Click on the `index`-th row of the rendered list.
    pub fn select_index(&self, index: usize) -> Option<Candidate> {
        let candidate = match &self.inner.state().list {
            ListState::Ready(candidates) => candidates.get(index).cloned(),
            _ => None,
        }?;
        self.inner.select_candidate(candidate.clone());
        Some(candidate)
    }

    /// 開啟建立使用者對話框
    pub async fn open_create_flow(&self) -> EntityCreateForm<D> {
        let form = EntityCreateForm::new(
            Arc::clone(&self.inner.directory),
            self.inner.config.create_form.clone(),
            self.inner.config.picker.clone(),
            Arc::clone(&self.inner.page),
        )
        .with_map(
            self.inner.map_provider.clone(),
            self.inner.geolocation.clone(),
        );
        form.show().await;
        form
    }

    /// Submits `form`; the created user goes to the top of the list and
    /// becomes the selection.
    pub async fn submit_create_flow(&self, form: &EntityCreateForm<D>) -> Result<Candidate> {
        let created = form.submit().await?;
        let candidate = created.candidate();
        self.accept_created(candidate.clone());
        Ok(candidate)
    }

    pub fn accept_created(&self, candidate: Candidate) {
        {
            let mut state = self.inner.state();
            state.loaded.insert(0, candidate.clone());
            state.list = ListState::Ready(state.loaded.clone());
            state.select(&candidate);
        }
        self.inner.notify_selected(candidate);
    }

    pub fn value(&self) -> Option<UserId> {
        self.inner.state().selection.as_ref().map(Selection::id)
    }

    pub fn selection(&self) -> Option<Selection> {
        self.inner.state().selection.clone()
    }

    /// 由程式設定選取值，不經過搜尋也不發出事件
    pub fn set_value(&self, id: UserId, label: &str) {
        let mut state = self.inner.state();
        state.hidden_value = id.to_string();
        state.input_text = label.to_string();
        state.selection = Some(Selection::Placeholder {
            id,
            label: label.to_string(),
        });
    }

    pub fn clear(&self) {
        let mut state = self.inner.state();
        state.selection = None;
        state.input_text.clear();
        state.hidden_value.clear();
        state.open = false;
    }

    pub fn phase(&self) -> SearchPhase {
        self.inner.state().phase()
    }

    pub fn view(&self) -> SearchSelectView {
        let config = &self.inner.config.search;
        let state = self.inner.state();

        let list = match &state.list {
            ListState::Loading => ListContent::Loading(config.loading_text.clone()),
            ListState::Failed(message) => ListContent::Error(message.clone()),
            ListState::Ready(candidates) if candidates.is_empty() => {
                ListContent::NoResults(config.no_results_text.clone())
            }
            ListState::Ready(candidates) => ListContent::Candidates(candidates.clone()),
        };

        SearchSelectView {
            input_text: state.input_text.clone(),
            placeholder: config.placeholder_text.clone(),
            hidden_value: state.hidden_value.clone(),
            phase: state.phase(),
            dropdown_open: state.open,
            list,
            create_label: config.create_label.clone(),
            selection: state.selection.clone(),
        }
    }
}

impl SearchState {
    fn select(&mut self, candidate: &Candidate) {
        self.input_text = candidate.display_name().to_string();
        self.hidden_value = candidate.id.to_string();
        self.selection = Some(Selection::Candidate(candidate.clone()));
        self.open = false;
    }

    fn phase(&self) -> SearchPhase {
        if !self.open {
            return SearchPhase::Closed;
        }
        match self.list {
            ListState::Ready(_) => SearchPhase::OpenIdle,
            ListState::Loading => SearchPhase::OpenLoading,
            ListState::Failed(_) => SearchPhase::OpenError,
        }
    }
}

impl<D: UserDirectory> Inner<D> {
    fn state(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn load_initial(&self) {
        match self.directory.search(None).await {
            Ok(candidates) => {
                tracing::debug!("Loaded {} initial candidates", candidates.len());
                let mut state = self.state();
                state.loaded = candidates.clone();
                state.list = ListState::Ready(candidates);
            }
            Err(e) => tracing::warn!("Could not load initial candidates: {}", e),
        }
    }

    async fn run_search(&self, query: String) {
        let seq = {
            let mut state = self.state();
            state.issued += 1;
            state.list = ListState::Loading;
            state.issued
        };

        tracing::debug!("Searching users for {:?} (#{})", query, seq);
        let result = self.directory.search(Some(&query)).await;

        let mut state = self.state();
        if self.config.search.response_ordering == ResponseOrdering::LatestIssued
            && seq != state.issued
        {
            tracing::debug!("Dropping stale search response #{} for {:?}", seq, query);
            return;
        }

        state.list = match result {
            Ok(candidates) => {
                tracing::debug!("Search #{} returned {} candidates", seq, candidates.len());
                ListState::Ready(candidates)
            }
            Err(e) => {
                tracing::warn!("❌ Search failed for {:?}: {}", query, e);
                ListState::Failed(self.error_text(&e))
            }
        };
    }

    fn error_text(&self, error: &WidgetError) -> String {
        let config = &self.config.search;
        match error {
            WidgetError::ServiceError {
                message: Some(message),
            } if !message.trim().is_empty() => message.clone(),
            _ if error.category() == ErrorCategory::TransportFailure => {
                config.connection_error_text.clone()
            }
            _ => config.search_error_text.clone(),
        }
    }

    fn select_candidate(&self, candidate: Candidate) {
        self.state().select(&candidate);
        self.notify_selected(candidate);
    }

    /// 在釋放狀態鎖之後才發送事件
    fn notify_selected(&self, candidate: Candidate) {
        tracing::debug!("Selected user {} ({})", candidate.display_name(), candidate.id);
        // 沒有訂閱者時忽略
        let _ = self.events.send(SearchSelectEvent::Selected(candidate));
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use user_search_widget::domain::model::{Candidate, CreatedUser, FieldError};
use user_search_widget::domain::ports::{CreateUserRequest, CreateUserResponse, UserDirectory};
use user_search_widget::{Result, WidgetError};

#[derive(Debug, Clone)]
pub enum SearchBehavior {
    Results(Vec<Candidate>),
    ServiceFailure(Option<String>),
    TransportFailure,
}

#[derive(Debug, Clone)]
pub enum CreateBehavior {
    Succeed(CreatedUser, Option<String>),
    FieldErrors(Vec<FieldError>),
    ServiceFailure(Option<String>),
    TransportFailure,
}

/// 可控制回應與延遲的使用者目錄
pub struct MockDirectory {
    initial: Option<Vec<Candidate>>,
    searches: Mutex<HashMap<String, (SearchBehavior, Duration)>>,
    create: Mutex<(CreateBehavior, Duration)>,
    pub queries: Mutex<Vec<Option<String>>>,
    pub create_requests: Mutex<Vec<CreateUserRequest>>,
}

impl MockDirectory {
    pub fn new(initial: Vec<Candidate>) -> Arc<Self> {
        Self::build(Some(initial))
    }

    /// 初始載入會失敗的目錄
    pub fn unreachable() -> Arc<Self> {
        Self::build(None)
    }

    fn build(initial: Option<Vec<Candidate>>) -> Arc<Self> {
        Arc::new(Self {
            initial,
            searches: Mutex::new(HashMap::new()),
            create: Mutex::new((
                CreateBehavior::ServiceFailure(None),
                Duration::from_millis(0),
            )),
            queries: Mutex::new(Vec::new()),
            create_requests: Mutex::new(Vec::new()),
        })
    }

    pub fn on_search(&self, query: &str, behavior: SearchBehavior) {
        self.on_search_after(query, behavior, Duration::from_millis(0));
    }

    pub fn on_search_after(&self, query: &str, behavior: SearchBehavior, latency: Duration) {
        self.searches
            .lock()
            .unwrap()
            .insert(query.to_string(), (behavior, latency));
    }

    pub fn on_create(&self, behavior: CreateBehavior) {
        self.on_create_after(behavior, Duration::from_millis(0));
    }

    pub fn on_create_after(&self, behavior: CreateBehavior, latency: Duration) {
        *self.create.lock().unwrap() = (behavior, latency);
    }

    pub fn recorded_queries(&self) -> Vec<Option<String>> {
        self.queries.lock().unwrap().clone()
    }

    pub fn recorded_creates(&self) -> Vec<CreateUserRequest> {
        self.create_requests.lock().unwrap().clone()
    }
}

fn transport_error() -> WidgetError {
    WidgetError::SerializationError(serde_json::from_str::<u8>("<html>").unwrap_err())
}

#[async_trait]
impl UserDirectory for MockDirectory {
    async fn search(&self, query: Option<&str>) -> Result<Vec<Candidate>> {
        self.queries
            .lock()
            .unwrap()
            .push(query.map(str::to_string));

        let Some(query) = query else {
            return self.initial.clone().ok_or_else(transport_error);
        };

        let (behavior, latency) = self
            .searches
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or((SearchBehavior::Results(Vec::new()), Duration::from_millis(0)));

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        match behavior {
            SearchBehavior::Results(candidates) => Ok(candidates),
            SearchBehavior::ServiceFailure(message) => Err(WidgetError::ServiceError { message }),
            SearchBehavior::TransportFailure => Err(transport_error()),
        }
    }

    async fn create(&self, request: &CreateUserRequest) -> Result<CreateUserResponse> {
        self.create_requests.lock().unwrap().push(request.clone());
        let (behavior, latency) = self.create.lock().unwrap().clone();

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        match behavior {
            CreateBehavior::Succeed(user, message) => Ok(CreateUserResponse { user, message }),
            CreateBehavior::FieldErrors(errors) => Err(WidgetError::ValidationError { errors }),
            CreateBehavior::ServiceFailure(message) => Err(WidgetError::ServiceError { message }),
            CreateBehavior::TransportFailure => Err(transport_error()),
        }
    }
}

pub fn candidate(id: i64, full_name: &str, username: &str) -> Candidate {
    Candidate {
        id,
        username: username.to_string(),
        email: format!("{}@example.com", username),
        first_name: String::new(),
        last_name: String::new(),
        full_name: Some(full_name.to_string()),
    }
}

pub fn created_user(id: i64, full_name: &str, username: &str) -> CreatedUser {
    CreatedUser {
        account: candidate(id, full_name, username),
        national_id: None,
        phone: None,
        birth_date: None,
        address: None,
        latitude: None,
        longitude: None,
    }
}

/// 讓已排程的任務執行完畢 (時間暫停時會自動前進)
pub async fn settle() {
    for _ in 0..3 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

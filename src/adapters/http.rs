use crate::domain::model::{Candidate, CreatedUser, ErrorPayload};
use crate::domain::ports::{CreateUserRequest, CreateUserResponse, UserDirectory};
use crate::utils::error::{Result, WidgetError};
use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

pub const CSRF_HEADER: &str = "X-CSRFToken";

/// `GET search_url?q=...` 的回應
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    #[serde(default)]
    pub users: Vec<Candidate>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST create_url` 的回應
#[derive(Debug, Deserialize)]
pub struct CreateResponse {
    pub success: bool,
    #[serde(default)]
    pub user: Option<CreatedUser>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

impl SearchResponse {
    pub fn into_result(self) -> Result<Vec<Candidate>> {
        if self.success {
            Ok(self.users)
        } else {
            Err(WidgetError::ServiceError {
                message: self.message,
            })
        }
    }
}

impl CreateResponse {
    /// 錯誤優先順序：欄位錯誤 > `errors` 字串 > `message`
    pub fn into_result(self) -> Result<CreateUserResponse> {
        if self.success {
            return match self.user {
                Some(user) => Ok(CreateUserResponse {
                    user,
                    message: self.message,
                }),
                None => Err(WidgetError::ServiceError {
                    message: Some("Response did not include the created user".to_string()),
                }),
            };
        }

        match self.errors.and_then(ErrorPayload::from_value) {
            Some(ErrorPayload::FieldErrors(errors)) => Err(WidgetError::ValidationError { errors }),
            Some(ErrorPayload::SingleMessage(message)) => Err(WidgetError::ServiceError {
                message: Some(message),
            }),
            None => Err(WidgetError::ServiceError {
                message: self.message,
            }),
        }
    }
}

/// reqwest-backed user directory.
#[derive(Debug, Clone)]
pub struct HttpUserDirectory {
    client: Client,
    search_url: Url,
    create_url: Url,
}

impl HttpUserDirectory {
    pub fn new(search_url: Url, create_url: Url) -> Self {
        Self {
            client: Client::new(),
            search_url,
            create_url,
        }
    }

    /// Endpoints may be absolute URLs or paths resolved against `base_url`.
    pub fn from_endpoints(base_url: Option<&str>, search: &str, create: &str) -> Result<Self> {
        let base = base_url
            .map(|b| {
                Url::parse(b).map_err(|e| WidgetError::InvalidConfigValueError {
                    field: "service.base_url".to_string(),
                    value: b.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let resolve = |field: &str, endpoint: &str| -> Result<Url> {
            let parsed = match &base {
                Some(base) => base.join(endpoint),
                None => Url::parse(endpoint),
            };
            parsed.map_err(|e| WidgetError::InvalidConfigValueError {
                field: field.to_string(),
                value: endpoint.to_string(),
                reason: e.to_string(),
            })
        };

        Ok(Self::new(
            resolve("search.search_url", search)?,
            resolve("create_form.create_url", create)?,
        ))
    }

    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    pub fn create_url(&self) -> &Url {
        &self.create_url
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn search(&self, query: Option<&str>) -> Result<Vec<Candidate>> {
        let mut request = self.client.get(self.search_url.clone());
        if let Some(q) = query {
            request = request.query(&[("q", q)]);
        }

        tracing::debug!("Searching users at {} (query: {:?})", self.search_url, query);
        let response = request.send().await?;
        tracing::debug!("Search response status: {}", response.status());

        let body: SearchResponse = response.json().await?;
        body.into_result()
    }

    async fn create(&self, request: &CreateUserRequest) -> Result<CreateUserResponse> {
        let form = request
            .draft
            .to_pairs()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        tracing::debug!("Creating user at {}", self.create_url);
        let response = self
            .client
            .post(self.create_url.clone())
            .header(CSRF_HEADER, request.csrf_token.as_str())
            .multipart(form)
            .send()
            .await?;
        tracing::debug!("Create response status: {}", response.status());

        let body: CreateResponse = response.json().await?;
        body.into_result()
    }
}

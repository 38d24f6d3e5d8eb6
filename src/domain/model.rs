use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub type UserId = i64;

/// 搜尋結果中的一位使用者
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl Candidate {
    /// 顯示名稱：優先使用全名，否則退回使用者名稱
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}

/// 使用者建立後由服務端回傳的完整資料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedUser {
    #[serde(flatten)]
    pub account: Candidate,
    #[serde(default, rename = "cedula")]
    pub national_id: Option<String>,
    #[serde(default, rename = "telefono")]
    pub phone: Option<String>,
    #[serde(default, rename = "fecha_nacimiento")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, rename = "domicilio")]
    pub address: Option<String>,
    #[serde(default, rename = "latitud")]
    pub latitude: Option<f64>,
    #[serde(default, rename = "longitud")]
    pub longitude: Option<f64>,
}

impl CreatedUser {
    pub fn candidate(&self) -> Candidate {
        self.account.clone()
    }

    pub fn location(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        }
    }
}

/// 目前的選取：一位候選人，或由程式設定的 (id, 標籤)
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Candidate(Candidate),
    Placeholder { id: UserId, label: String },
}

impl Selection {
    pub fn id(&self) -> UserId {
        match self {
            Selection::Candidate(candidate) => candidate.id,
            Selection::Placeholder { id, .. } => *id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Selection::Candidate(candidate) => candidate.display_name(),
            Selection::Placeholder { label, .. } => label,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Range check against [-90, 90] / [-180, 180]. Not enforced by the picker.
    pub fn is_in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lat: {:.6}, Lng: {:.6}", self.lat, self.lng)
    }
}

/// 建立使用者表單的欄位，`wire_name` 為送出時的 multipart 欄位名稱
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormField {
    FirstName,
    LastName,
    Email,
    Username,
    NationalId,
    BirthDate,
    Address,
    Latitude,
    Longitude,
    Password,
}

impl FormField {
    /// Submission order.
    pub const ALL: [FormField; 10] = [
        FormField::FirstName,
        FormField::LastName,
        FormField::Email,
        FormField::Username,
        FormField::NationalId,
        FormField::BirthDate,
        FormField::Address,
        FormField::Latitude,
        FormField::Longitude,
        FormField::Password,
    ];

    pub fn wire_name(&self) -> &'static str {
        match self {
            FormField::FirstName => "first_name",
            FormField::LastName => "last_name",
            FormField::Email => "email",
            FormField::Username => "username",
            FormField::NationalId => "cedula",
            FormField::BirthDate => "fecha_nacimiento",
            FormField::Address => "domicilio",
            FormField::Latitude => "latitud",
            FormField::Longitude => "longitud",
            FormField::Password => "password",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, FormField::Latitude | FormField::Longitude)
    }

    /// Hidden fields are only written through the coordinate picker.
    pub fn is_hidden(&self) -> bool {
        matches!(self, FormField::Latitude | FormField::Longitude)
    }
}

/// 表單目前輸入的值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormDraft {
    values: HashMap<FormField, String>,
}

impl FormDraft {
    pub fn get(&self, field: FormField) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn reset(&mut self) {
        self.values.clear();
    }

    /// 依送出順序列出所有欄位 (包含空值，與瀏覽器表單行為一致)
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        FormField::ALL
            .iter()
            .map(|field| (field.wire_name(), self.get(*field).to_string()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub messages: Vec<String>,
}

/// 服務端錯誤內容，在服務邊界解析一次
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorPayload {
    SingleMessage(String),
    FieldErrors(Vec<FieldError>),
}

impl ErrorPayload {
    /// Resolves the `errors` member of a create response. Per-field values may be
    /// a single string or a list; order follows the payload.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(message) => Some(ErrorPayload::SingleMessage(message)),
            serde_json::Value::Object(map) => Some(ErrorPayload::FieldErrors(
                map.into_iter()
                    .map(|(field, messages)| FieldError {
                        field,
                        messages: messages_from_value(messages),
                    })
                    .collect(),
            )),
            serde_json::Value::Null => None,
            other => Some(ErrorPayload::SingleMessage(other.to_string())),
        }
    }

    pub fn messages(&self) -> Vec<&str> {
        match self {
            ErrorPayload::SingleMessage(message) => vec![message.as_str()],
            ErrorPayload::FieldErrors(errors) => errors
                .iter()
                .flat_map(|e| e.messages.iter().map(String::as_str))
                .collect(),
        }
    }

    /// 所有訊息攤平後以換行串接
    pub fn render(&self) -> String {
        self.messages().join("\n")
    }
}

fn messages_from_value(value: serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::String(message) => vec![message],
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(message) => message,
                other => other.to_string(),
            })
            .collect(),
        serde_json::Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

//! Wire types for the templated push API

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::notify::shapes::PayloadShape;

/// Result code for an accepted request
pub const ERRCODE_OK: i64 = 0;

/// Result code returned when the payload's field names do not match the
/// template bound to `template_id`
pub const ERRCODE_FIELD_MISMATCH: i64 = 40001;

/// One named template field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateField {
    pub value: String,
    pub color: String,
}

impl TemplateField {
    pub fn new(value: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            color: color.into(),
        }
    }
}

/// Template message request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateMessage {
    /// Recipient id
    pub touser: String,
    pub template_id: String,
    /// Field map; ordered so the serialized body is stable
    pub data: BTreeMap<String, TemplateField>,
    /// Shape the field map was built from; not sent
    #[serde(skip)]
    pub shape: Option<PayloadShape>,
}

/// Structured result of a send request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    /// Absent when the endpoint answered with an unrecognized body
    #[serde(default)]
    pub errcode: Option<i64>,
    #[serde(default)]
    pub errmsg: String,
    #[serde(default)]
    pub msgid: Option<i64>,
}

impl SendResponse {
    pub fn ok() -> Self {
        Self {
            errcode: Some(ERRCODE_OK),
            errmsg: "ok".to_string(),
            msgid: None,
        }
    }

    pub fn error(errcode: i64, errmsg: impl Into<String>) -> Self {
        Self {
            errcode: Some(errcode),
            errmsg: errmsg.into(),
            msgid: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.errcode == Some(ERRCODE_OK)
    }

    pub fn is_field_mismatch(&self) -> bool {
        self.errcode == Some(ERRCODE_FIELD_MISMATCH)
    }
}

/// Access token endpoint response
///
/// On failure the endpoint answers 200 with `errcode`/`errmsg` instead of
/// a token.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub errcode: Option<i64>,
    #[serde(default)]
    pub errmsg: Option<String>,
}

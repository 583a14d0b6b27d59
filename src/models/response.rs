use serde::{Deserialize, Serialize};

use super::LostItem;

/// Body of a successful single-item response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResponse {
    pub success: bool,
    pub data: LostItem,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<LostItem>,
}

/// Body of every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ItemResponse {
    pub fn new(data: LostItem) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl ItemListResponse {
    pub fn new(data: Vec<LostItem>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Where a reported item currently is in the hand-back process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    WithFinder,
    Submitted,
    Claimed,
    Verified,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 4] = [
        ItemStatus::WithFinder,
        ItemStatus::Submitted,
        ItemStatus::Claimed,
        ItemStatus::Verified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::WithFinder => "with_finder",
            ItemStatus::Submitted => "submitted",
            ItemStatus::Claimed => "claimed",
            ItemStatus::Verified => "verified",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("status must be one of with_finder, submitted, claimed, verified (got '{0}')")]
pub struct UnknownStatus(pub String);

impl FromStr for ItemStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl TryFrom<String> for ItemStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A stored lost-item report.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LostItem {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub media_id: Option<String>,
    pub location_found: String,
    pub item_type: String,
    pub color: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ItemStatus,
    pub contact_info: String,
    pub contact_number: String,
    // Claim fields: stored and returned, never written by any endpoint yet.
    pub claimed_by: Option<String>,
    pub claimed_info: Option<String>,
    pub claimed_number: Option<String>,
    pub ai_generated: bool,
    pub ai_confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a successful media upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedMedia {
    pub url: String,
    pub public_id: String,
}

/// Raw text fields of a create request, exactly as they arrived.
#[derive(Debug, Clone, Default)]
pub struct ItemForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location_found: Option<String>,
    pub item_type: Option<String>,
    pub color: Option<String>,
    pub contact_info: Option<String>,
    pub contact_number: Option<String>,
    pub status: Option<String>,
    pub ai_generated: Option<String>,
    pub ai_confidence: Option<String>,
}

impl ItemForm {
    /// Assigns a multipart text field by its wire name. Returns false for unknown names.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "name" => &mut self.name,
            "description" => &mut self.description,
            "locationFound" => &mut self.location_found,
            "itemType" => &mut self.item_type,
            "color" => &mut self.color,
            "contactInfo" => &mut self.contact_info,
            "contactNumber" => &mut self.contact_number,
            "status" => &mut self.status,
            "aiGenerated" => &mut self.ai_generated,
            "aiConfidence" => &mut self.ai_confidence,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Normalizes and checks every field. Runs before the photo is uploaded.
    pub fn validate(self) -> AppResult<ItemDraft> {
        let name = required("name", self.name.map(trimmed))?;
        let description = required("description", self.description)?;
        let location_found = required("locationFound", self.location_found)?;
        let item_type = required("itemType", self.item_type.map(trimmed))?;
        let contact_info = required("contactInfo", self.contact_info)?;
        let contact_number = required("contactNumber", self.contact_number)?;
        let color = self.color.map(trimmed).filter(|c| !c.is_empty());

        let status = match self.status.as_deref() {
            None | Some("") => ItemStatus::default(),
            Some(s) => s
                .parse()
                .map_err(|e: UnknownStatus| AppError::Validation(e.to_string()))?,
        };
        let ai_generated = parse_flag("aiGenerated", self.ai_generated.as_deref())?;
        let ai_confidence = parse_confidence(self.ai_confidence.as_deref())?;

        let draft = ItemDraft {
            name,
            description,
            location_found,
            item_type,
            color,
            status,
            contact_info,
            contact_number,
            ai_generated,
            ai_confidence,
        };
        check_description(&draft.description)?;
        Ok(draft)
    }
}

/// Validated report fields still waiting for their photo.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub name: String,
    pub description: String,
    pub location_found: String,
    pub item_type: String,
    pub color: Option<String>,
    pub status: ItemStatus,
    pub contact_info: String,
    pub contact_number: String,
    pub ai_generated: bool,
    pub ai_confidence: Option<f64>,
}

impl ItemDraft {
    pub fn with_media(self, media: UploadedMedia) -> NewItem {
        NewItem {
            name: self.name,
            description: self.description,
            image_url: media.url,
            media_id: Some(media.public_id),
            location_found: self.location_found,
            item_type: self.item_type,
            color: self.color,
            status: self.status,
            contact_info: self.contact_info,
            contact_number: self.contact_number,
            ai_generated: self.ai_generated,
            ai_confidence: self.ai_confidence,
        }
    }
}

/// A record ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub media_id: Option<String>,
    pub location_found: String,
    pub item_type: String,
    pub color: Option<String>,
    pub status: ItemStatus,
    pub contact_info: String,
    pub contact_number: String,
    pub ai_generated: bool,
    pub ai_confidence: Option<f64>,
}

impl NewItem {
    /// Store-side check of the schema constraints.
    pub fn validate(&self) -> AppResult<()> {
        let required_fields = [
            ("name", self.name.trim()),
            ("description", self.description.as_str()),
            ("imageUrl", self.image_url.trim()),
            ("locationFound", self.location_found.as_str()),
            ("itemType", self.item_type.trim()),
            ("contactInfo", self.contact_info.as_str()),
            ("contactNumber", self.contact_number.as_str()),
        ];
        for (field, value) in required_fields {
            if value.is_empty() {
                return Err(AppError::Validation(format!("{} is required", field)));
            }
        }
        check_description(&self.description)?;
        if let Some(confidence) = self.ai_confidence {
            check_confidence(confidence)?;
        }
        Ok(())
    }

    pub fn into_item(self, id: Uuid, now: DateTime<Utc>) -> LostItem {
        LostItem {
            id,
            name: self.name,
            description: self.description,
            image_url: self.image_url,
            media_id: self.media_id,
            location_found: self.location_found,
            item_type: self.item_type,
            color: self.color,
            status: self.status,
            contact_info: self.contact_info,
            contact_number: self.contact_number,
            claimed_by: None,
            claimed_info: None,
            claimed_number: None,
            ai_generated: self.ai_generated,
            ai_confidence: self.ai_confidence,
            created_at: now,
            updated_at: now,
        }
    }
}

fn trimmed(s: String) -> String {
    s.trim().to_string()
}

fn required(field: &str, value: Option<String>) -> AppResult<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

fn check_description(description: &str) -> AppResult<()> {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "description must be at most {} characters",
            DESCRIPTION_MAX_CHARS
        )));
    }
    Ok(())
}

fn check_confidence(confidence: f64) -> AppResult<()> {
    if !(0.0..=1.0).contains(&confidence) {
        return Err(AppError::Validation(
            "aiConfidence must be between 0 and 1".to_string(),
        ));
    }
    Ok(())
}

fn parse_flag(field: &str, value: Option<&str>) -> AppResult<bool> {
    match value.map(str::trim) {
        None | Some("") => Ok(false),
        Some("true") | Some("1") | Some("yes") => Ok(true),
        Some("false") | Some("0") | Some("no") => Ok(false),
        Some(other) => Err(AppError::Validation(format!(
            "{} must be a boolean (got '{}')",
            field, other
        ))),
    }
}

fn parse_confidence(value: Option<&str>) -> AppResult<Option<f64>> {
    let raw = match value.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };
    let confidence: f64 = raw
        .parse()
        .map_err(|_| AppError::Validation(format!("aiConfidence must be a number (got '{}')", raw)))?;
    check_confidence(confidence)?;
    Ok(Some(confidence))
}

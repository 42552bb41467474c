use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Research categories; each selects a different system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResearchCategory {
    General,
    Benefits,
    Dosing,
    Interactions,
    Stacking,
    Evidence,
}

impl ResearchCategory {
    pub const ALL: [ResearchCategory; 6] = [
        ResearchCategory::General,
        ResearchCategory::Benefits,
        ResearchCategory::Dosing,
        ResearchCategory::Interactions,
        ResearchCategory::Stacking,
        ResearchCategory::Evidence,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResearchCategory::General => "general",
            ResearchCategory::Benefits => "benefits",
            ResearchCategory::Dosing => "dosing",
            ResearchCategory::Interactions => "interactions",
            ResearchCategory::Stacking => "stacking",
            ResearchCategory::Evidence => "evidence",
        }
    }

    /// Unknown or absent categories fall back to `General`.
    pub fn parse_or_general(value: Option<&str>) -> Self {
        value
            .and_then(|v| ResearchCategory::from_str(v).ok())
            .unwrap_or(ResearchCategory::General)
    }
}

impl FromStr for ResearchCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResearchCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or(())
    }
}

// ── Database rows ────────────────────────────────────────────────────────────

#[derive(Debug, sqlx::FromRow)]
pub struct SearchRecord {
    pub id: Uuid,
    pub user_id: String,
    pub query: String,
    pub response: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub is_bookmarked: bool,
    pub bookmarked_at: Option<DateTime<Utc>>,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

// ── API types ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResearchRequest {
    pub prompt: String,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveSearchRequest {
    pub query: String,
    pub response: String,
    pub category: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearchResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryItem {
    pub id: Uuid,
    pub query: String,
    pub response: String,
    pub category: ResearchCategory,
    pub timestamp: DateTime<Utc>,
    pub is_bookmarked: bool,
}

impl From<SearchRecord> for SearchHistoryItem {
    fn from(row: SearchRecord) -> Self {
        Self {
            id: row.id,
            query: row.query,
            response: row.response,
            category: ResearchCategory::parse_or_general(Some(&row.category)),
            timestamp: row.created_at,
            is_bookmarked: row.is_bookmarked,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkedResearch {
    pub id: Uuid,
    pub query: String,
    pub response: String,
    pub category: ResearchCategory,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<SearchRecord> for BookmarkedResearch {
    fn from(row: SearchRecord) -> Self {
        Self {
            id: row.id,
            query: row.query,
            response: row.response,
            category: ResearchCategory::parse_or_general(Some(&row.category)),
            timestamp: row.created_at,
            title: row.title,
            notes: row.notes,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkToggleResponse {
    pub is_bookmarked: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BookmarkDetailsRequest {
    pub title: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClearHistoryResponse {
    pub deleted_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchStatsResponse {
    pub total_searches: i64,
    pub total_bookmarks: i64,
    /// Search counts keyed by category name; every category is present.
    pub category_counts: std::collections::BTreeMap<String, i64>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct HistoryQuery {
    /// Max items to return (default 20, max 100)
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_categories_fall_back_to_general() {
        assert_eq!(
            ResearchCategory::parse_or_general(Some("dosing")),
            ResearchCategory::Dosing
        );
        assert_eq!(
            ResearchCategory::parse_or_general(Some("astrology")),
            ResearchCategory::General
        );
        assert_eq!(
            ResearchCategory::parse_or_general(None),
            ResearchCategory::General
        );
    }
}

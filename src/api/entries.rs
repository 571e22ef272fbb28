/// Entry API endpoints
///
/// Entry creation/listing plus the two derived views: the current
/// logging session and the period-scoped history summary.
use crate::{
    context::AppContext,
    entries::{Entry, EntryKind, NewEntry},
    error::{AppError, AppResult},
    stats::{self, DateGroup, MonthGroup, Period},
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Build entry routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/entries", get(list_entries).post(create_entry))
        .route("/api/entries/session", get(session_view))
        .route("/api/entries/stats", get(stats_view))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntriesParams {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// GET /api/entries?userId=...
pub async fn list_entries(
    State(ctx): State<AppContext>,
    Query(params): Query<ListEntriesParams>,
) -> AppResult<Json<Vec<Entry>>> {
    let user_id = require_user_id(params.user_id)?;
    let entries = ctx.entries.list_for_account(&user_id).await?;
    Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    pub user_id: String,
    pub kind: String,
    pub duration_secs: f64,
    pub date: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// POST /api/entries
pub async fn create_entry(
    State(ctx): State<AppContext>,
    Json(body): Json<CreateEntryRequest>,
) -> AppResult<(StatusCode, Json<Entry>)> {
    let user_id = require_user_id(Some(body.user_id))?;
    let kind = parse_kind(&body.kind)?;
    let date = parse_date(&body.date)?;

    let entry = ctx
        .entries
        .create(NewEntry {
            account_id: user_id,
            kind,
            duration_secs: body.duration_secs,
            date,
            location: body.location,
            notes: body.notes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionViewParams {
    #[serde(default)]
    pub user_id: Option<String>,
    pub date: String,
    pub kind: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionViewResponse {
    pub count: usize,
    pub average: Option<f64>,
    pub entries: Vec<Entry>,
}

/// GET /api/entries/session?userId=...&date=...&kind=...
///
/// What the user has logged so far for one date and kind.
pub async fn session_view(
    State(ctx): State<AppContext>,
    Query(params): Query<SessionViewParams>,
) -> AppResult<Json<SessionViewResponse>> {
    let user_id = require_user_id(params.user_id)?;
    let kind = parse_kind(&params.kind)?;
    let date = parse_date(&params.date)?;

    let all = ctx.entries.list_for_account(&user_id).await?;
    let entries = stats::session_entries(&all, date, kind);

    Ok(Json(SessionViewResponse {
        count: entries.len(),
        average: stats::average(&entries),
        entries,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsViewParams {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
}

/// Count, average, and personal record for one kind
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KindSummary {
    pub count: usize,
    pub average: Option<f64>,
    pub personal_record: Option<Entry>,
}

impl KindSummary {
    fn of(entries: &[Entry]) -> Self {
        Self {
            count: entries.len(),
            average: stats::average(entries),
            personal_record: stats::personal_record(entries).cloned(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub label: String,
    pub sprint: KindSummary,
    pub block: KindSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsViewResponse {
    pub period: String,
    pub sprint: KindSummary,
    pub block: KindSummary,
    pub groups: Vec<GroupSummary>,
}

/// GET /api/entries/stats?userId=...&period=7d|30d|all
///
/// The history view: per-kind summaries over the period, grouped by
/// date (or by month when the whole history is requested).
pub async fn stats_view(
    State(ctx): State<AppContext>,
    Query(params): Query<StatsViewParams>,
) -> AppResult<Json<StatsViewResponse>> {
    let user_id = require_user_id(params.user_id)?;
    let period = match params.period.as_deref() {
        None => Period::Week,
        Some(s) => Period::parse(s)
            .ok_or_else(|| AppError::Validation(format!("Unknown period: {}", s)))?,
    };

    let all = ctx.entries.list_for_account(&user_id).await?;
    let scoped = stats::filter_by_period(&all, period, Utc::now().date_naive());

    let sprints: Vec<Entry> = scoped
        .iter()
        .filter(|e| e.kind == EntryKind::Sprint)
        .cloned()
        .collect();
    let blocks: Vec<Entry> = scoped
        .iter()
        .filter(|e| e.kind == EntryKind::Block)
        .cloned()
        .collect();

    let groups = if period == Period::All {
        stats::group_by_month(&scoped)
            .into_iter()
            .map(GroupSummary::from)
            .collect()
    } else {
        stats::group_by_date(&scoped)
            .into_iter()
            .map(GroupSummary::from)
            .collect()
    };

    Ok(Json(StatsViewResponse {
        period: period.as_str().to_string(),
        sprint: KindSummary::of(&sprints),
        block: KindSummary::of(&blocks),
        groups,
    }))
}

impl From<DateGroup> for GroupSummary {
    fn from(group: DateGroup) -> Self {
        Self {
            label: group.date.to_string(),
            sprint: KindSummary::of(&group.sprints),
            block: KindSummary::of(&group.blocks),
        }
    }
}

impl From<MonthGroup> for GroupSummary {
    fn from(group: MonthGroup) -> Self {
        Self {
            label: group.month.clone(),
            sprint: KindSummary::of(&group.sprints),
            block: KindSummary::of(&group.blocks),
        }
    }
}

fn require_user_id(user_id: Option<String>) -> AppResult<String> {
    match user_id {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err(AppError::Validation("userId is required".to_string())),
    }
}

fn parse_kind(kind: &str) -> AppResult<EntryKind> {
    EntryKind::parse(kind)
        .ok_or_else(|| AppError::Validation("kind must be \"sprint\" or \"block\"".to_string()))
}

fn parse_date(date: &str) -> AppResult<NaiveDate> {
    date.parse()
        .map_err(|_| AppError::Validation("date must be YYYY-MM-DD".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_user_id() {
        assert!(require_user_id(None).is_err());
        assert!(require_user_id(Some("  ".to_string())).is_err());
        assert_eq!(require_user_id(Some("u1".to_string())).unwrap(), "u1");
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("sprint").unwrap(), EntryKind::Sprint);
        assert_eq!(parse_kind("block").unwrap(), EntryKind::Block);
        assert!(parse_kind("tempo").is_err());
    }

    #[test]
    fn test_parse_date_requires_iso_form() {
        assert!(parse_date("2024-06-15").is_ok());
        assert!(parse_date("6/15/2024").is_err());
        assert!(parse_date("2024-13-01").is_err());
    }
}

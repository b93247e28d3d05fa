use serde::Deserialize;

use crate::config::ApiConfig;
use crate::database::models::LeadStatus;
use crate::database::PageRequest;
use crate::error::ApiError;
use crate::services::LeadFilter;

/// Raw `page` / `limit` query parameters. Kept as text so that non-numeric
/// input becomes a validation error rather than a generic query rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn resolve(&self, api: &ApiConfig) -> Result<PageRequest, ApiError> {
        let page = parse_positive("page", self.page.as_deref(), 1)?;
        let limit = parse_positive("limit", self.limit.as_deref(), u64::from(api.default_page_size))?;
        let limit = limit.min(u64::from(api.max_page_size));

        // Offsets reach Postgres as BIGINT
        let offset = (page - 1).checked_mul(limit).filter(|offset| i64::try_from(*offset).is_ok());
        if offset.is_none() {
            return Err(ApiError::invalid_field("page", "page is out of range"));
        }
        Ok(PageRequest { page, limit })
    }
}

fn parse_positive(field: &str, raw: Option<&str>, default: u64) -> Result<u64, ApiError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value >= 1 => Ok(value),
        _ => Err(ApiError::invalid_field(field, format!("{} must be a positive integer", field))),
    }
}

/// Query parameters of the lead listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub assigned_to: Option<String>,
}

impl LeadQuery {
    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page.clone(),
            limit: self.limit.clone(),
        }
    }

    pub fn filter(&self) -> Result<LeadFilter, ApiError> {
        let status = match self.status.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(LeadStatus::parse(raw).ok_or_else(|| ApiError::invalid_field("status", "Invalid Lead status"))?),
        };
        let assigned_to = match self.assigned_to.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                uuid::Uuid::parse_str(raw)
                    .map_err(|_| ApiError::invalid_field("assignedTo", "assignedTo must be a user id"))?,
            ),
        };
        Ok(LeadFilter { status, assigned_to })
    }
}

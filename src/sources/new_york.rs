//! New York - Department of State public inquiry API.
//!
//! Pure HTTP/JSON integration: name searches go through the complex-search
//! endpoint, then the chosen DOS ID is resolved through the detail endpoint.
//! Direct ID lookups retry with left-zero-padding, which the API requires for
//! short IDs. Active keyword set: exact `ACTIVE` (the API reports inactive
//! entities with statuses like `INACTIVE - Dissolution`, which contain the
//! word as a substring).

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};

use crate::adapters::{fault, SourceAdapter};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    CandidateSummary, LookupMode, RawRecord, SearchCriteria, SourceResult, StatusClassifier,
};
use crate::services::{select_candidate, MatchOutcome, MatchPolicy};

const SEARCH_ENDPOINT: &str =
    "https://apps.dos.ny.gov/PublicInquiryWeb/api/PublicInquiry/GetComplexSearchMatchingEntities";
const DETAIL_ENDPOINT: &str =
    "https://apps.dos.ny.gov/PublicInquiryWeb/api/PublicInquiry/GetEntityRecordByID";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const STATUS: StatusClassifier = StatusClassifier::exact(&["active"]);

/// DOS IDs are at most ten digits; shorter inputs are retried zero-padded.
const MAX_ID_WIDTH: usize = 10;

pub struct NewYorkAdapter {
    client: reqwest::Client,
    policy: MatchPolicy,
}

impl NewYorkAdapter {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            policy: config.match_policy,
        }
    }

    async fn post(&self, endpoint: &str, body: &JsonValue) -> Result<JsonValue> {
        let response = self
            .client
            .post(endpoint)
            .header("Origin", "https://apps.dos.ny.gov")
            .header("Referer", "https://apps.dos.ny.gov/publicInquiry/")
            .header("User-Agent", "Mozilla/5.0")
            .timeout(REQUEST_TIMEOUT)
            .json(body)
            .send()
            .await
            .map_err(|err| AppError::http(endpoint, err))?
            .error_for_status()
            .map_err(|err| AppError::http(endpoint, err))?;
        response
            .json()
            .await
            .map_err(|err| AppError::http(endpoint, err))
    }

    async fn lookup_by_id(&self, id: &str) -> Result<SourceResult> {
        let id = id.trim();
        for width in id.len()..=MAX_ID_WIDTH {
            let padded = format!("{id:0>width$}");
            let body = json!({ "AssumedNameFlag": "false", "SearchID": padded });
            let data = self.post(DETAIL_ENDPOINT, &body).await?;

            let valid = data["requestStatus"] == "Success"
                && data["resultIndicator"] != "InvalidID"
                && data["entityGeneralInfo"].is_object();
            if valid {
                return Ok(SourceResult::Success(record_from_detail(&data, &padded)));
            }
        }
        Ok(SourceResult::no_match(id))
    }

    async fn search_by_name(&self, name: &str) -> Result<SourceResult> {
        let body = json!({
            "searchValue": name,
            "searchByTypeIndicator": "EntityName",
            "searchExpressionIndicator": "BeginsWith",
            "entityStatusIndicator": "AllStatuses",
            "entityTypeIndicator": [
                "Corporation",
                "LimitedLiabilityCompany",
                "LimitedPartnership",
                "LimitedLiabilityPartnership"
            ],
            "listPaginationInfo": { "listStartRecord": 1, "listEndRecord": 50 }
        });
        let data = self.post(SEARCH_ENDPOINT, &body).await?;

        let rows = data["entitySearchResultList"]
            .as_array()
            .cloned()
            .unwrap_or_default();
        if rows.is_empty() {
            return Ok(SourceResult::no_match(name));
        }

        let candidates: Vec<CandidateSummary> = rows
            .iter()
            .map(|row| {
                CandidateSummary::new(
                    row["entityName"].as_str().unwrap_or_default(),
                    json_id(&row["dosID"]),
                )
            })
            .collect();

        match select_candidate(name, &candidates, self.policy) {
            MatchOutcome::Selected(index) => {
                let dos_id = candidates[index].id.clone();
                if dos_id.is_empty() {
                    return Err(AppError::BadResponse {
                        endpoint: SEARCH_ENDPOINT.into(),
                        detail: "matched search result was missing a DOS ID".into(),
                    });
                }
                self.lookup_by_id(&dos_id).await
            }
            MatchOutcome::Ambiguous(candidates) => Ok(SourceResult::Ambiguous { candidates }),
        }
    }
}

#[async_trait]
impl SourceAdapter for NewYorkAdapter {
    fn key(&self) -> &'static str {
        "ny"
    }

    fn display_name(&self) -> &'static str {
        "New York"
    }

    async fn query(&self, criteria: &SearchCriteria) -> SourceResult {
        let Some(mode) = criteria.lookup() else {
            return SourceResult::invalid_criteria();
        };
        let outcome = match mode {
            LookupMode::Identifier(id) => self.lookup_by_id(id).await,
            LookupMode::Name(name) => self.search_by_name(name).await,
        };
        match outcome {
            Ok(result) => result,
            Err(err) => fault(err),
        }
    }
}

fn record_from_detail(data: &JsonValue, fallback_id: &str) -> crate::models::CanonicalRecord {
    let info = &data["entityGeneralInfo"];
    let registration_date = info["dateOfInitialDosFiling"]
        .as_str()
        .or_else(|| info["effectiveDateInitialFiling"].as_str())
        .map(str::to_string);

    let addresses = &data["addressInformation"];
    let address = ["serviceOfProcessAddress", "principalExecutiveOfficeAddress", "entityPrimaryLocationAddress"]
        .iter()
        .find_map(|key| address_text(&addresses[*key]));

    RawRecord {
        entity_name: info["entityName"].as_str().map(str::to_string),
        registration_date,
        entity_type: info["entityType"].as_str().map(str::to_string),
        business_id: Some(match info["dosID"].as_str() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => fallback_id.to_string(),
        }),
        entity_status: info["entityStatus"].as_str().map(str::to_string),
        address,
    }
    .normalize(&STATUS)
}

/// Address fields arrive either pre-formatted or as structured objects.
fn address_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(text) if !text.trim().is_empty() => Some(text.clone()),
        JsonValue::Object(fields) => {
            let parts: Vec<&str> = ["address1", "address2", "city", "state", "zipCode"]
                .iter()
                .filter_map(|key| fields.get(*key).and_then(JsonValue::as_str))
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        _ => None,
    }
}

fn json_id(value: &JsonValue) -> String {
    match value {
        JsonValue::String(id) => id.clone(),
        JsonValue::Number(id) => id.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detail_payload_maps_to_canonical_record() {
        let data = json!({
            "requestStatus": "Success",
            "entityGeneralInfo": {
                "entityName": "ACME WIDGET CORP",
                "dateOfInitialDosFiling": "2020-01-05T00:00:00",
                "entityType": "DOMESTIC BUSINESS CORPORATION",
                "dosID": "1234567",
                "entityStatus": "ACTIVE"
            },
            "addressInformation": {
                "serviceOfProcessAddress": {
                    "address1": "1 Broadway",
                    "city": "New York",
                    "state": "NY",
                    "zipCode": "10004"
                }
            }
        });
        let record = record_from_detail(&data, "1234567");
        assert_eq!(record.entity_name, "ACME WIDGET CORP");
        assert_eq!(record.registration_date, "01/05/2020");
        assert_eq!(record.business_id, "1234567");
        assert_eq!(record.address, "1 Broadway, New York, NY, 10004");
        assert!(record.status_active);
    }

    #[test]
    fn inactive_status_is_not_classified_active() {
        let data = json!({
            "entityGeneralInfo": {
                "entityName": "GONE LLC",
                "entityStatus": "INACTIVE - Dissolution (Jan 02, 1990)"
            },
            "addressInformation": {}
        });
        let record = record_from_detail(&data, "42");
        assert!(!record.status_active);
        assert_eq!(record.address, "N/A");
        assert_eq!(record.business_id, "42");
    }
}

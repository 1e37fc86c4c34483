//! The canonical record every adapter must normalize into, plus the total
//! normalizer that gets it there from whatever a registry page or API hands us.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Sentinel for fields a source did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Date format every `registration_date` is normalized to.
const CANONICAL_DATE: &str = "%m/%d/%Y";

/// Normalized business entity registration data.
///
/// Every field is always present; unknown values are the literal `"N/A"`.
/// Wire field names follow the report format the registry scrapers have always
/// emitted (`business_identification_number`, `statusActive`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub entity_name: String,
    /// `MM/DD/YYYY`, or `"N/A"`, or the source's own text when unparseable.
    pub registration_date: String,
    pub entity_type: String,
    #[serde(rename = "business_identification_number")]
    pub business_id: String,
    pub entity_status: String,
    #[serde(rename = "statusActive")]
    pub status_active: bool,
    /// Single line, comma-joined.
    pub address: String,
}

/// Raw, heterogeneous field values as scraped or received.
///
/// Values may be multi-line, contain `<br>` markup, or be missing entirely.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    pub entity_name: Option<String>,
    pub registration_date: Option<String>,
    pub entity_type: Option<String>,
    pub business_id: Option<String>,
    pub entity_status: Option<String>,
    pub address: Option<String>,
}

impl RawRecord {
    /// Normalize into a [`CanonicalRecord`].
    ///
    /// Total over its input domain: anything unrecognized passes through
    /// cleaned rather than failing, and re-normalizing an already-normalized
    /// record is a no-op.
    pub fn normalize(self, status: &StatusClassifier) -> CanonicalRecord {
        let entity_status = clean_field(self.entity_status);
        CanonicalRecord {
            entity_name: clean_field(self.entity_name),
            registration_date: normalize_date(&clean_field(self.registration_date)),
            entity_type: clean_field(self.entity_type),
            business_id: clean_field(self.business_id),
            status_active: status.is_active(&entity_status),
            entity_status,
            address: clean_field(self.address),
        }
    }
}

/// Derives `status_active` from a source's status text.
///
/// Each adapter documents its own keyword set; classification is always
/// case-insensitive.
#[derive(Debug, Clone, Copy)]
pub struct StatusClassifier {
    keywords: &'static [&'static str],
    exact: bool,
}

/// Keyword set shared by sources without special status vocabulary.
pub const DEFAULT_ACTIVE_KEYWORDS: &[&str] =
    &["active", "good standing", "current", "existing", "in compliance"];

impl StatusClassifier {
    /// Active when the status contains any keyword as a substring.
    pub const fn substring(keywords: &'static [&'static str]) -> Self {
        Self {
            keywords,
            exact: false,
        }
    }

    /// Active only when the whole status equals one of the keywords.
    pub const fn exact(keywords: &'static [&'static str]) -> Self {
        Self {
            keywords,
            exact: true,
        }
    }

    pub fn is_active(&self, entity_status: &str) -> bool {
        let status = entity_status.trim().to_lowercase();
        if status.is_empty() || status == NOT_AVAILABLE.to_lowercase() {
            return false;
        }
        self.keywords.iter().any(|keyword| {
            if self.exact {
                status == *keyword
            } else {
                status.contains(keyword)
            }
        })
    }
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self::substring(DEFAULT_ACTIVE_KEYWORDS)
    }
}

fn line_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\s*,?\s*(?:<br\s*/?\s*>|\r\n|\r|\n)+\s*").expect("valid regex")
    })
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// Collapse a raw field value to a trimmed single line, or the `"N/A"` sentinel.
pub fn clean_field(raw: Option<String>) -> String {
    let Some(raw) = raw else {
        return NOT_AVAILABLE.to_string();
    };
    let joined = line_break_re().replace_all(&raw, ", ");
    let collapsed = whitespace_re().replace_all(&joined, " ");
    let trimmed = collapsed.trim().trim_matches(',').trim();
    if trimmed.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Normalize a date string to `MM/DD/YYYY`.
///
/// Accepts the formats the state registries actually emit; anything else
/// passes through unchanged.
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == NOT_AVAILABLE {
        return NOT_AVAILABLE.to_string();
    }

    const DATE_FORMATS: [&str; 4] = ["%m/%d/%Y", "%Y-%m-%d", "%B %d, %Y", "%m-%d-%Y"];
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.format(CANONICAL_DATE).to_string();
        }
    }

    // ISO timestamps show up in JSON APIs (New York, Connecticut).
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return datetime.date().format(CANONICAL_DATE).to_string();
        }
    }

    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> StatusClassifier {
        StatusClassifier::default()
    }

    #[test]
    fn missing_fields_become_sentinel() {
        let record = RawRecord::default().normalize(&classifier());
        assert_eq!(record.entity_name, "N/A");
        assert_eq!(record.registration_date, "N/A");
        assert_eq!(record.address, "N/A");
        assert!(!record.status_active);
    }

    #[test]
    fn line_breaks_collapse_to_comma_joined_line() {
        assert_eq!(
            clean_field(Some("123 Main St<br>Suite 4<br/>Boise, ID".into())),
            "123 Main St, Suite 4, Boise, ID"
        );
        assert_eq!(
            clean_field(Some("123 Main St\r\nBoise,\nID   83702".into())),
            "123 Main St, Boise, ID 83702"
        );
    }

    #[test]
    fn repeated_whitespace_collapses() {
        assert_eq!(clean_field(Some("  Acme   Widget   Co.  ".into())), "Acme Widget Co.");
    }

    #[test]
    fn date_formats_normalize_to_canonical() {
        assert_eq!(normalize_date("January 5, 2020"), "01/05/2020");
        assert_eq!(normalize_date("2020-01-05"), "01/05/2020");
        assert_eq!(normalize_date("01/05/2020"), "01/05/2020");
        assert_eq!(normalize_date("1-5-2020"), "01/05/2020");
        assert_eq!(normalize_date("2020-01-05T00:00:00"), "01/05/2020");
    }

    #[test]
    fn unparseable_dates_pass_through() {
        assert_eq!(normalize_date("FY2020"), "FY2020");
        assert_eq!(normalize_date("N/A"), "N/A");
        assert_eq!(normalize_date(""), "N/A");
    }

    #[test]
    fn normalization_is_idempotent() {
        let first = RawRecord {
            entity_name: Some("  Acme\nWidget Co. ".into()),
            registration_date: Some("March 3, 1999".into()),
            entity_type: Some("LLC".into()),
            business_id: Some("C-12345".into()),
            entity_status: Some("Active - Good Standing".into()),
            address: Some("1 Front St<br>Helena, MT".into()),
        }
        .normalize(&classifier());

        let second = RawRecord {
            entity_name: Some(first.entity_name.clone()),
            registration_date: Some(first.registration_date.clone()),
            entity_type: Some(first.entity_type.clone()),
            business_id: Some(first.business_id.clone()),
            entity_status: Some(first.entity_status.clone()),
            address: Some(first.address.clone()),
        }
        .normalize(&classifier());

        assert_eq!(first, second);
    }

    #[test]
    fn status_classification_by_substring_and_exact() {
        let substring = StatusClassifier::substring(&["active", "good standing"]);
        assert!(substring.is_active("Active - In Good Standing"));
        assert!(substring.is_active("GOOD STANDING"));
        assert!(!substring.is_active("Dissolved"));
        assert!(!substring.is_active("N/A"));

        let exact = StatusClassifier::exact(&["active"]);
        assert!(exact.is_active("ACTIVE"));
        assert!(!exact.is_active("Inactive"));
    }

    #[test]
    fn record_serializes_with_report_field_names() {
        let record = RawRecord {
            entity_name: Some("Acme".into()),
            business_id: Some("99".into()),
            entity_status: Some("Active".into()),
            ..Default::default()
        }
        .normalize(&classifier());

        let json = serde_json::to_value(&record).expect("serializes");
        assert_eq!(json["business_identification_number"], "99");
        assert_eq!(json["statusActive"], true);
        assert_eq!(json["registration_date"], "N/A");
    }
}

pub mod criteria;
pub mod record;
pub mod report;

pub use criteria::{LookupMode, SearchCriteria};
pub use record::{
    clean_field, normalize_date, CanonicalRecord, RawRecord, StatusClassifier,
    DEFAULT_ACTIVE_KEYWORDS, NOT_AVAILABLE,
};
pub use report::{CandidateSummary, DispatchReport, ReportTally, SourceResult};

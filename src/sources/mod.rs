//! Per-source integrations and the default registry wiring.
//!
//! Each submodule implements one state registry behind the
//! [`SourceAdapter`](crate::adapters::SourceAdapter) contract. Keys are the
//! lowercase two-letter state codes.

pub mod idaho;
pub mod kansas;
pub mod montana;
pub mod new_york;

use std::sync::Arc;

use phf::phf_map;

use crate::adapters::SourceRegistry;
use crate::config::Config;

pub use idaho::IdahoAdapter;
pub use kansas::kansas_adapter;
pub use montana::MontanaAdapter;
pub use new_york::NewYorkAdapter;

/// Two-letter code to state name, for log output and report headers.
pub static STATE_NAMES: phf::Map<&'static str, &'static str> = phf_map! {
    "al" => "Alabama",
    "ak" => "Alaska",
    "az" => "Arizona",
    "ar" => "Arkansas",
    "ca" => "California",
    "co" => "Colorado",
    "ct" => "Connecticut",
    "de" => "Delaware",
    "fl" => "Florida",
    "ga" => "Georgia",
    "hi" => "Hawaii",
    "id" => "Idaho",
    "il" => "Illinois",
    "in" => "Indiana",
    "ia" => "Iowa",
    "ks" => "Kansas",
    "ky" => "Kentucky",
    "la" => "Louisiana",
    "me" => "Maine",
    "md" => "Maryland",
    "ma" => "Massachusetts",
    "mi" => "Michigan",
    "mn" => "Minnesota",
    "ms" => "Mississippi",
    "mo" => "Missouri",
    "mt" => "Montana",
    "ne" => "Nebraska",
    "nv" => "Nevada",
    "nh" => "New Hampshire",
    "nj" => "New Jersey",
    "nm" => "New Mexico",
    "ny" => "New York",
    "nc" => "North Carolina",
    "nd" => "North Dakota",
    "oh" => "Ohio",
    "ok" => "Oklahoma",
    "or" => "Oregon",
    "pa" => "Pennsylvania",
    "ri" => "Rhode Island",
    "sc" => "South Carolina",
    "sd" => "South Dakota",
    "tn" => "Tennessee",
    "tx" => "Texas",
    "ut" => "Utah",
    "vt" => "Vermont",
    "va" => "Virginia",
    "wa" => "Washington",
    "wv" => "West Virginia",
    "wi" => "Wisconsin",
    "wy" => "Wyoming",
};

/// State name for a source key, falling back to the key itself.
pub fn state_name(key: &str) -> &str {
    STATE_NAMES.get(key).copied().unwrap_or(key)
}

/// The full set of implemented sources.
pub fn default_registry(config: &Config) -> SourceRegistry {
    SourceRegistry::new()
        .register(Arc::new(NewYorkAdapter::new(config)))
        .register(Arc::new(IdahoAdapter::new(config)))
        .register(Arc::new(MontanaAdapter::new(config)))
        .register(Arc::new(kansas_adapter(config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names_cover_all_fifty_states() {
        assert_eq!(STATE_NAMES.len(), 50);
        assert_eq!(state_name("ny"), "New York");
        assert_eq!(state_name("zz"), "zz");
    }

    #[test]
    fn default_registry_wires_every_implemented_source() {
        let registry = default_registry(&Config::default());
        let keys: Vec<_> = registry.keys().collect();
        assert_eq!(keys, vec!["id", "ks", "mt", "ny"]);
        for (key, adapter) in registry.iter() {
            assert_eq!(adapter.display_name(), state_name(key));
        }
    }
}

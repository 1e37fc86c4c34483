/// What the caller is looking for.
///
/// At least one of `identifier` / `name` must be present; when both are given,
/// identifier lookup wins (the convention every state registry follows).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    /// State filing / registration number.
    pub identifier: Option<String>,
    /// Legal entity name.
    pub name: Option<String>,
}

/// The single lookup mode active for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupMode<'a> {
    Identifier(&'a str),
    Name(&'a str),
}

impl SearchCriteria {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            identifier: None,
            name: Some(name.into()),
        }
    }

    pub fn by_identifier(identifier: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            name: None,
        }
    }

    /// Resolve the active lookup mode, or `None` when the criteria are unusable.
    ///
    /// Whitespace-only values count as absent. Adapters call this before doing
    /// any I/O.
    pub fn lookup(&self) -> Option<LookupMode<'_>> {
        if let Some(id) = self.identifier.as_deref() {
            let id = id.trim();
            if !id.is_empty() {
                return Some(LookupMode::Identifier(id));
            }
        }
        if let Some(name) = self.name.as_deref() {
            let name = name.trim();
            if !name.is_empty() {
                return Some(LookupMode::Name(name));
            }
        }
        None
    }

    /// The raw search term, for log lines and no-match messages.
    pub fn term(&self) -> &str {
        match self.lookup() {
            Some(LookupMode::Identifier(id)) => id,
            Some(LookupMode::Name(name)) => name,
            None => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_takes_precedence_over_name() {
        let criteria = SearchCriteria {
            identifier: Some("4711".into()),
            name: Some("Acme Corp".into()),
        };
        assert_eq!(criteria.lookup(), Some(LookupMode::Identifier("4711")));
    }

    #[test]
    fn blank_values_count_as_absent() {
        let criteria = SearchCriteria {
            identifier: Some("   ".into()),
            name: Some("Acme Corp".into()),
        };
        assert_eq!(criteria.lookup(), Some(LookupMode::Name("Acme Corp")));

        let empty = SearchCriteria {
            identifier: Some("".into()),
            name: Some(" ".into()),
        };
        assert_eq!(empty.lookup(), None);
    }

    #[test]
    fn default_criteria_are_invalid() {
        assert_eq!(SearchCriteria::default().lookup(), None);
    }
}

use super::Schema;
use crate::error::TypedFramesError;
use std::collections::HashSet;

impl Schema {
    /// Checks observed column names against the schema and reports every violation.
    ///
    /// Never fails: an empty list means the columns are valid. Descriptors still
    /// waiting on a deferred alias or member list are reported as violations too.
    pub fn validate_columns<S: AsRef<str>>(&self, observed: &[S]) -> Vec<String> {
        let observed: Vec<&str> = observed.iter().map(|name| name.as_ref()).collect();
        let present: HashSet<&str> = observed.iter().copied().collect();
        let mut errors = Vec::new();

        if self.config.enforce_columns {
            for column in self.columns.values() {
                match column.effective_name() {
                    Ok(name) if !present.contains(name) => {
                        errors.push(format!("Missing required column: {}", name));
                    }
                    Ok(_) => {}
                    Err(e) => errors.push(e.to_string()),
                }
            }
        }

        if !self.config.allow_extra_columns {
            let mut defined: HashSet<&str> = HashSet::new();
            for column in self.columns.values() {
                if let Ok(name) = column.effective_name() {
                    defined.insert(name);
                }
            }
            for set in self.column_sets.values() {
                if set.is_deferred() {
                    errors.push(TypedFramesError::SetMembersNotYetDefined(set.name().to_string()).to_string());
                } else if let Some(literal) = set.literal_names() {
                    defined.extend(literal.iter().map(String::as_str));
                }
            }

            for name in &observed {
                if defined.contains(name) {
                    continue;
                }
                let pattern_match = self
                    .column_sets
                    .values()
                    .filter(|set| set.is_regex && !set.is_deferred())
                    .any(|set| set.matches(name).unwrap_or(false));
                if !pattern_match {
                    errors.push(format!("Unexpected column: {}", name));
                }
            }
        }

        errors
    }
}

use super::ConfigError;
use crate::sampler::EnabledMetrics;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

const STATUS_PREFIX: &str = "status.";

/// A flat `key=value` property set.
///
/// Blank lines and lines starting with `#` or `!` are ignored, the first `=`
/// or `:` separates key from value, both sides are trimmed, and a trailing
/// backslash joins the next line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Read and parse a properties file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line has no separator.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse properties from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Malformed` for a non-comment line without `=`/`:`.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut entries = BTreeMap::new();
        let mut pending = String::new();
        let mut start_line = 0;

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if pending.is_empty() {
                if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                    continue;
                }
                start_line = idx + 1;
            }

            if let Some(head) = line.strip_suffix('\\') {
                pending.push_str(head);
                continue;
            }
            pending.push_str(line);

            let logical = std::mem::take(&mut pending);
            let Some(split) = logical.find(['=', ':']) else {
                return Err(ConfigError::Malformed {
                    line: start_line,
                    content: logical,
                });
            };
            let (key, value) = logical.split_at(split);
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::Malformed {
                    line: start_line,
                    content: logical.clone(),
                });
            }
            entries.insert(key.to_string(), value.get(1..).unwrap_or_default().trim().to_string());
        }

        if !pending.is_empty() {
            return Err(ConfigError::Malformed {
                line: start_line,
                content: pending,
            });
        }

        Ok(Self { entries })
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// First non-blank value among `keys`.
    #[must_use]
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.get(key))
            .find(|value| !value.is_empty())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Metrics switched on with `status.<name>=true` (case-insensitive).
    #[must_use]
    pub fn enabled_metrics(&self) -> EnabledMetrics {
        self.entries
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(STATUS_PREFIX)
                    .filter(|_| value.trim().eq_ignore_ascii_case("true"))
            })
            .collect()
    }

    /// Polling period from `period` / `pang.period`, in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPeriod` if the value is not an integer.
    pub fn period(&self) -> Result<Option<Duration>, ConfigError> {
        self.first_of(&["period", "pang.period"])
            .map(|raw| {
                raw.parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|_| ConfigError::InvalidPeriod(raw.to_string()))
            })
            .transpose()
    }

    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.first_of(&["pang.prefix", "prefix"])
    }
}

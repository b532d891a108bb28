//! Serializer configuration.

/// Controls how documents are written.
///
/// With the `serde` feature enabled, options can be read from a host's own
/// configuration file; missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FormatOptions {
    /// Spaces per nesting level; 0 writes everything on one line.
    pub indent: usize,
    /// Fixed number of decimals for floats. `None` writes the shortest text
    /// that reads back to the same value.
    pub float_precision: Option<usize>,
    /// Version written for plugins that do not store one.
    pub plugin_version_fallback: Option<i32>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            float_precision: None,
            plugin_version_fallback: None,
        }
    }
}

impl FormatOptions {
    /// Single-line output.
    pub fn compact() -> Self {
        Self {
            indent: 0,
            ..Self::default()
        }
    }

    pub fn with_float_precision(mut self, decimals: usize) -> Self {
        self.float_precision = Some(decimals);
        self
    }

    pub fn with_plugin_version_fallback(mut self, version: i32) -> Self {
        self.plugin_version_fallback = Some(version);
        self
    }

    pub(crate) fn format_float(&self, value: f32) -> String {
        match self.float_precision {
            Some(decimals) => format!("{value:.decimals$}"),
            None => value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_formatting() {
        let options = FormatOptions::default();
        assert_eq!(options.format_float(0.5), "0.5");
        assert_eq!(options.format_float(1.0), "1");
        assert_eq!(options.format_float(0.1).parse::<f32>().unwrap(), 0.1);

        let fixed = options.with_float_precision(3);
        assert_eq!(fixed.format_float(0.5), "0.500");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_partial() {
        let options: FormatOptions = serde_json::from_str(r#"{"indent": 4}"#).unwrap();
        assert_eq!(options.indent, 4);
        assert_eq!(options.float_precision, None);
    }
}

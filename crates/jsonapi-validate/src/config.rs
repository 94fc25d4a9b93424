//! Validation layer configuration.

/// Configuration passed explicitly to the error translator at construction.
///
/// Set once at startup; request handling only reads it. There is no hidden
/// process-wide state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Attach rule-failure metadata to translated error objects. Off by
    /// default; enable for diagnostics.
    pub include_failed_meta: bool,
    /// The namespace translation keys are resolved under.
    pub translation_namespace: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            include_failed_meta: false,
            translation_namespace: "jsonapi".to_string(),
        }
    }
}

impl ValidationConfig {
    /// The default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable rule-failure metadata on error objects.
    pub fn with_failed_meta(mut self) -> Self {
        self.include_failed_meta = true;
        self
    }

    /// Set the translation namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.translation_namespace = namespace.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ValidationConfig::default();
        assert!(!config.include_failed_meta);
        assert_eq!(config.translation_namespace, "jsonapi");
    }

    #[test]
    fn builders() {
        let config = ValidationConfig::new()
            .with_failed_meta()
            .with_namespace("app");
        assert!(config.include_failed_meta);
        assert_eq!(config.translation_namespace, "app");
    }
}

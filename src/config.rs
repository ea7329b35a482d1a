/// Presentation settings for resource identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LensConfig {
    /// URI scheme the host registered for blame documents
    pub scheme: String,
    /// chrono `strftime` pattern for commit dates
    pub date_format: String,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            scheme: "blame".to_string(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

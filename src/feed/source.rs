use crate::fetcher::Parameters;

/// Where a feed's pages come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSource {
    pub url: String,
    /// Sent with every request, next to the page cursor.
    pub parameters: Parameters,
}

impl FeedSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            parameters: Parameters::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

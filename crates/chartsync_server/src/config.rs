//! Configuration for the reference server.

/// Configuration for the reference server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Hard cap on the page size a pull may request.
    pub max_page_size: usize,
}

impl ServerConfig {
    /// Creates a configuration with the given page cap.
    pub fn new(max_page_size: usize) -> Self {
        Self { max_page_size }
    }

    /// Sets the page cap.
    pub fn with_max_page_size(mut self, max_page_size: usize) -> Self {
        self.max_page_size = max_page_size;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_page_cap() {
        assert_eq!(ServerConfig::default().max_page_size, 1000);
        assert_eq!(ServerConfig::new(10).with_max_page_size(25).max_page_size, 25);
    }
}

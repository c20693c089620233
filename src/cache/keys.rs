//! Cache key naming.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Aggregate report over the whole catalog.
    ProductReport,
}

impl CacheKey {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheKey::ProductReport => "product:report",
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

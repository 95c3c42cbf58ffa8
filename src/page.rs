//! Page identity derived from a navigation location.
use std::fmt;

/// The pages of the dashboard that carry their own initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Dashboard,
    Sensors,
    Crops,
}

impl PageKind {
    /// Derives the page kind from a navigation location.
    ///
    /// The last path segment is taken and its extension stripped; an empty
    /// stem means the index page. Unrecognized stems yield `None` and the
    /// caller performs no page-specific initialization.
    pub fn from_location(location: &str) -> Option<PageKind> {
        let file = location.rsplit('/').next().unwrap_or("");
        let stem = file.split('.').next().unwrap_or("");
        let stem = if stem.is_empty() { "index" } else { stem };

        match stem {
            "index" => Some(PageKind::Dashboard),
            "sensors" => Some(PageKind::Sensors),
            "crops" => Some(PageKind::Crops),
            _ => None,
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            PageKind::Dashboard => "index",
            PageKind::Sensors => "sensors",
            PageKind::Crops => "crops",
        };
        write!(formatter, "{}", label)
    }
}

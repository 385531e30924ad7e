//! Non-fatal failure collection for best-effort aggregation calls

/// Collects warning strings, deduplicated by exact match, in the order
/// they were first seen. Aggregation calls surface these to the caller
/// instead of erroring on partial endpoint failure.
#[derive(Debug, Default)]
pub struct Warnings {
    items: Vec<String>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        if !self.items.contains(&warning) {
            self.items.push(warning);
        }
    }

    /// Record an upstream rejection with a known HTTP status.
    pub fn endpoint_status(&mut self, operation: &str, status: u16, method_and_path: &str) {
        self.push(format!(
            "{operation}: HQ returned HTTP {status} for {method_and_path}"
        ));
    }

    /// Record a transport-level failure (no status available).
    pub fn endpoint_unreachable(&mut self, operation: &str, method_and_path: &str) {
        self.push(format!("{operation}: HQ unreachable for {method_and_path}"));
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduplicates_exact_matches() {
        let mut w = Warnings::new();
        w.endpoint_status("Users", 403, "GET /api/v1/supervisors");
        w.endpoint_status("Users", 403, "GET /api/v1/supervisors");
        w.endpoint_status("Users", 500, "GET /api/v1/interviewers");
        assert_eq!(w.into_vec().len(), 2);
    }

    #[test]
    fn preserves_insertion_order() {
        let mut w = Warnings::new();
        w.push("first");
        w.push("second");
        w.push("first");
        assert_eq!(w.into_vec(), vec!["first", "second"]);
    }

    #[test]
    fn status_warning_carries_status_and_endpoint() {
        let mut w = Warnings::new();
        w.endpoint_status("Users", 403, "GET /api/v1/supervisors");
        let items = w.into_vec();
        assert!(items[0].contains("HTTP 403"));
        assert!(items[0].contains("supervisors"));
    }

    #[test]
    fn transport_warning_has_no_status() {
        let mut w = Warnings::new();
        w.endpoint_unreachable("Users", "GET /api/v1/supervisors");
        assert_eq!(w.into_vec()[0], "Users: HQ unreachable for GET /api/v1/supervisors");
    }
}

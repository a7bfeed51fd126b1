//! Response types for bulk indexing operations.

/// A single document the search engine refused to index.
///
/// Carries enough context to find the source row and fix it by hand.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemFailure {
    /// Identifier of the rejected document.
    pub document_id: String,
    /// HTTP-style status reported for the item.
    pub status: u16,
    /// Reason given by the search engine.
    pub reason: String,
}

/// Summary of one bulk request.
///
/// A bulk request can succeed at the connection level while individual items
/// fail, so callers inspect `failures` rather than relying on `Ok` alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkIndexReport {
    /// Number of documents in the request.
    pub total: usize,
    /// Documents the engine rejected.
    pub failures: Vec<BulkItemFailure>,
}

impl BulkIndexReport {
    /// Report for a request in which every document was accepted.
    pub fn accepted(total: usize) -> Self {
        Self {
            total,
            failures: Vec::new(),
        }
    }

    /// Number of documents that were indexed.
    pub fn succeeded(&self) -> usize {
        self.total.saturating_sub(self.failures.len())
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_succeeded_counts() {
        let report = BulkIndexReport {
            total: 3,
            failures: vec![BulkItemFailure {
                document_id: "b".to_string(),
                status: 400,
                reason: "bad date".to_string(),
            }],
        };

        assert_eq!(report.succeeded(), 2);
        assert!(report.has_failures());
        assert_eq!(BulkIndexReport::accepted(5).succeeded(), 5);
    }
}

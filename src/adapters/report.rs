use crate::domain::model::ExchangeReport;
use crate::domain::ports::Reporter;
use std::sync::{Arc, Mutex};

/// Keeps every exchange in memory so tests can inspect what was reported.
#[derive(Debug, Clone, Default)]
pub struct MemoryReporter {
    exchanges: Arc<Mutex<Vec<ExchangeReport>>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exchanges(&self) -> Vec<ExchangeReport> {
        match self.exchanges.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn last(&self) -> Option<ExchangeReport> {
        self.exchanges().pop()
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.exchanges.lock() {
            guard.clear();
        }
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, exchange: &ExchangeReport) {
        match self.exchanges.lock() {
            Ok(mut guard) => guard.push(exchange.clone()),
            Err(poisoned) => poisoned.into_inner().push(exchange.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Attachment;
    use chrono::Utc;

    fn exchange(title: &str, failed: bool) -> ExchangeReport {
        ExchangeReport {
            title: title.to_string(),
            started_at: Utc::now(),
            failed,
            attachments: vec![Attachment::text("Error Message", "boom".to_string())],
        }
    }

    #[test]
    fn memory_reporter_keeps_order() {
        let reporter = MemoryReporter::new();
        reporter.report(&exchange("GET /a - 1ms", false));
        reporter.report(&exchange("GET /b - 2ms", true));

        let titles: Vec<String> = reporter.exchanges().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["GET /a - 1ms", "GET /b - 2ms"]);
        assert!(reporter.last().unwrap().failed);
    }

    #[test]
    fn clones_share_storage() {
        let reporter = MemoryReporter::new();
        let handle = reporter.clone();
        handle.report(&exchange("DELETE /pet/1 - 3ms", false));
        assert_eq!(reporter.exchanges().len(), 1);

        reporter.clear();
        assert!(handle.exchanges().is_empty());
    }
}

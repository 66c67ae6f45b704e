use crate::domain::model::ExchangeReport;

/// Sink receiving one report per HTTP exchange.
pub trait Reporter: Send + Sync {
    fn report(&self, exchange: &ExchangeReport);
}

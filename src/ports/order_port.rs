//! Order placement port trait.

use crate::domain::error::TradecoreError;
use crate::domain::order::{OrderId, OrderLeg, Variety};

/// Capability to place and cancel orders against the venue.
///
/// `cancel` takes the variety the order was placed with; the venue routes
/// cancellations per variety.
pub trait OrderPort {
    fn place(&self, leg: &OrderLeg) -> Result<OrderId, TradecoreError>;

    fn cancel(&self, variety: Variety, order_id: &OrderId) -> Result<OrderId, TradecoreError>;
}

//! Multi-leg spread placement with partial-failure rollback.
//!
//! Legs are submitted strictly in input order, one at a time; broker-side
//! sequencing matters for spreads (a hedge leg must not be skipped while the
//! main leg is live). On a failed leg, every previously placed leg is
//! cancelled (best effort) before the original error is returned.

use crate::domain::error::TradecoreError;
use crate::domain::order::{OrderId, OrderLeg};
use crate::ports::order_port::OrderPort;

/// Place `legs` as one logical transaction.
///
/// Returns one order id per leg, in submission order, only if every leg was
/// placed. If a leg fails and `cancel_on_failure` is set, each previously
/// placed leg is cancelled in placement order, routed by that leg's variety;
/// cancellation failures are logged and never mask the placement error.
///
/// Not idempotent: retrying a failed batch resubmits every leg. A leg whose
/// success response was lost in transit counts as failed here but may be live
/// at the venue.
pub fn place_spread_order(
    port: &dyn OrderPort,
    legs: &[OrderLeg],
    cancel_on_failure: bool,
) -> Result<Vec<OrderId>, TradecoreError> {
    for leg in legs {
        leg.validate()?;
    }

    let mut order_ids: Vec<OrderId> = Vec::with_capacity(legs.len());
    for (idx, leg) in legs.iter().enumerate() {
        match port.place(leg) {
            Ok(order_id) => order_ids.push(order_id),
            Err(err) => {
                if cancel_on_failure && !order_ids.is_empty() {
                    for (order_id, placed_leg) in order_ids.iter().zip(&legs[..idx]) {
                        if let Err(cancel_err) = port.cancel(placed_leg.variety, order_id) {
                            log::error!("failed to cancel order {order_id}: {cancel_err}");
                        }
                    }
                }
                return Err(err);
            }
        }
    }

    Ok(order_ids)
}

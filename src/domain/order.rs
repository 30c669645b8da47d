//! Order descriptors and venue routing enums.
//!
//! The venue publishes these as bare string constants; here each routing
//! field is a closed enum with an explicit wire name.

use crate::domain::error::TradecoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }

            pub fn parse(s: &str) -> Option<$name> {
                match s {
                    $($wire => Some($name::$variant)),+,
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum!(
    /// Exchange segment an order is routed to.
    Exchange {
        Nse => "NSE",
        Bse => "BSE",
        Nfo => "NFO",
        Cds => "CDS",
        Bfo => "BFO",
        Mcx => "MCX",
    }
);

wire_enum!(
    TransactionType {
        Buy => "BUY",
        Sell => "SELL",
    }
);

wire_enum!(
    OrderType {
        Market => "MARKET",
        Limit => "LIMIT",
        StopLoss => "SL",
        StopLossMarket => "SL-M",
    }
);

wire_enum!(
    Product {
        Cnc => "CNC",
        Nrml => "NRML",
        Mis => "MIS",
    }
);

wire_enum!(
    /// Order variety; also routes cancellations for previously placed orders.
    Variety {
        Regular => "regular",
        Amo => "amo",
        Co => "co",
        Iceberg => "iceberg",
        Auction => "auction",
    }
);

wire_enum!(
    Validity {
        Day => "DAY",
        Ioc => "IOC",
        Ttl => "TTL",
    }
);

/// Identifier the venue assigns to a placed order.
pub type OrderId = String;

/// One order within a multi-leg spread. Stateless input; carries every field
/// the single-order placement call needs.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLeg {
    pub tradingsymbol: String,
    pub exchange: Exchange,
    pub transaction_type: TransactionType,
    pub quantity: u32,
    pub order_type: OrderType,
    pub product: Product,
    pub variety: Variety,
    pub price: Option<f64>,
    pub trigger_price: Option<f64>,
    pub validity: Option<Validity>,
    pub disclosed_quantity: Option<u32>,
    pub tag: Option<String>,
}

impl OrderLeg {
    /// Market order with regular variety; other fields take their defaults.
    pub fn market(
        tradingsymbol: &str,
        exchange: Exchange,
        transaction_type: TransactionType,
        quantity: u32,
        product: Product,
    ) -> Self {
        OrderLeg {
            tradingsymbol: tradingsymbol.to_string(),
            exchange,
            transaction_type,
            quantity,
            order_type: OrderType::Market,
            product,
            variety: Variety::Regular,
            price: None,
            trigger_price: None,
            validity: None,
            disclosed_quantity: None,
            tag: None,
        }
    }

    /// Parameter checks performed before any network call.
    pub fn validate(&self) -> Result<(), TradecoreError> {
        if self.tradingsymbol.is_empty() {
            return Err(TradecoreError::InvalidRequest {
                reason: "tradingsymbol must not be empty".into(),
            });
        }
        if self.quantity == 0 {
            return Err(TradecoreError::InvalidRequest {
                reason: format!("{}: quantity must be positive", self.tradingsymbol),
            });
        }
        if matches!(self.order_type, OrderType::Limit | OrderType::StopLoss)
            && self.price.is_none()
        {
            return Err(TradecoreError::InvalidRequest {
                reason: format!(
                    "{}: {} order requires a price",
                    self.tradingsymbol, self.order_type
                ),
            });
        }
        if matches!(
            self.order_type,
            OrderType::StopLoss | OrderType::StopLossMarket
        ) && self.trigger_price.is_none()
        {
            return Err(TradecoreError::InvalidRequest {
                reason: format!(
                    "{}: {} order requires a trigger price",
                    self.tradingsymbol, self.order_type
                ),
            });
        }
        Ok(())
    }
}

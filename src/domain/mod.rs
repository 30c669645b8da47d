//! Core domain types and logic.

pub mod candle;
pub mod order;
pub mod spread;
pub mod trade;
pub mod strategy;
pub mod backtest;
pub mod metrics;
pub mod optimizer;
pub mod history;
pub mod indicator;
pub mod error;

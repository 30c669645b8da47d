pub mod order_port;
pub mod market_data_port;
pub mod cache_port;
pub mod config_port;

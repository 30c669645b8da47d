pub mod sqlite_cache_adapter;
pub mod http_broker_adapter;
pub mod csv_adapter;
pub mod file_config_adapter;

pub mod bounce_sender;
pub mod config_service;
pub mod event_sink;
pub mod experiment;
pub mod function_invoker;
pub mod object_info;
pub mod page_fetcher;
pub mod queue_client;
pub mod result_store;
pub mod table_store;

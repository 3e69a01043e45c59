//! AWS-backed adapter implementations shared by more than one binary.

pub mod dynamo;
pub mod http_collector;
pub mod lambda_invoker;

pub mod cloudwatch_logs_shipper;
pub mod config_rule_change;
pub mod cors_microservice;
pub mod custom_authorizer;
pub mod edge_ab_test;
pub mod edge_query_auth;
pub mod edge_viewer_country;
pub mod firehose_apachelog_to_json;
pub mod firehose_cloudwatch_logs;
pub mod firehose_syslog_to_csv;
pub mod firehose_unzip;
pub mod hello_http;
pub mod howto_skill;
pub mod http_microservice;
pub mod iot_event_shipper;
pub mod s3_object_logger;
pub mod scheduled_canary;
pub mod ses_notification;
pub mod ses_spam_filter;
pub mod smart_home_adapter;
pub mod sqs_poller;
pub mod test_harness;

//! Delivery-stream transform that turns syslog lines into CSV records.

use blueprint_contracts::firehose::{
    decode_record_data, TransformEvent, TransformRecord, TransformResponse, TransformedRecord,
};
use blueprint_contracts::parsers::{syslog_csv_line, SyslogParser};

pub fn handle(event: TransformEvent) -> TransformResponse {
    let parser = SyslogParser::new();
    let records = event
        .records
        .into_iter()
        .map(|record| transform_record(&parser, record))
        .collect();
    TransformResponse { records }
}

fn transform_record(parser: &SyslogParser, record: TransformRecord) -> TransformedRecord {
    let Ok(bytes) = decode_record_data(&record) else {
        return TransformedRecord::failed_keeping_original(record.record_id, record.data);
    };
    let line = String::from_utf8_lossy(&bytes);
    let Some(parsed) = parser.parse(&line) else {
        return TransformedRecord::failed_keeping_original(record.record_id, record.data);
    };
    match syslog_csv_line(&parsed) {
        Ok(csv) => TransformedRecord::ok(record.record_id, csv.as_bytes()),
        Err(_) => TransformedRecord::failed_keeping_original(record.record_id, record.data),
    }
}

//! Delivery-stream transform that turns Apache common log lines into JSON.

use blueprint_contracts::firehose::{
    decode_record_data, TransformEvent, TransformRecord, TransformResponse, TransformedRecord,
};
use blueprint_contracts::parsers::ApacheLogParser;

/// Lines that are not common log format fail with their original payload
/// kept, so the stream can park them in its error output.
pub fn handle(event: TransformEvent) -> TransformResponse {
    let parser = ApacheLogParser::new();
    let records = event
        .records
        .into_iter()
        .map(|record| transform_record(&parser, record))
        .collect();
    TransformResponse { records }
}

fn transform_record(parser: &ApacheLogParser, record: TransformRecord) -> TransformedRecord {
    let Ok(bytes) = decode_record_data(&record) else {
        return TransformedRecord::failed_keeping_original(record.record_id, record.data);
    };
    let line = String::from_utf8_lossy(&bytes);
    match parser.parse(&line) {
        Some(fields) => TransformedRecord::ok(record.record_id, fields.to_string().as_bytes()),
        None => TransformedRecord::failed_keeping_original(record.record_id, record.data),
    }
}

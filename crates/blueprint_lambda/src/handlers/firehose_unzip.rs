//! Analytics preprocessor that inflates compressed stream records.

use blueprint_contracts::firehose::{
    decode_record_data, TransformEvent, TransformRecord, TransformResponse, TransformedRecord,
};
use blueprint_contracts::logs::inflate;

/// Records may be gzip or raw zlib; anything else fails with its original
/// payload kept.
pub fn handle(event: TransformEvent) -> TransformResponse {
    let records = event.records.into_iter().map(transform_record).collect();
    TransformResponse { records }
}

fn transform_record(record: TransformRecord) -> TransformedRecord {
    let Ok(bytes) = decode_record_data(&record) else {
        return TransformedRecord::failed_keeping_original(record.record_id, record.data);
    };
    match inflate(&bytes) {
        Ok(decompressed) => TransformedRecord::ok(record.record_id, &decompressed),
        Err(_) => TransformedRecord::failed_keeping_original(record.record_id, record.data),
    }
}

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::validation::ValidationError;

const APACHE_COMMON_LOG: &str =
    r#"^([\d.]+) (\S+) (\S+) \[([\w:/]+)(\s[+-]\d{4})?\] "(.+?)" (\d{3}) (\d+)"#;
const APACHE_TIMESTAMP: &str = "%d/%b/%Y:%H:%M:%S";

const SYSLOG_LINE: &str = r"^((?:\b(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|Jun(?:e)?|Jul(?:y)?|Aug(?:ust)?|Sep(?:tember)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)\b\s+(?:(?:0[1-9])|(?:[12][0-9])|(?:3[01])|[1-9])\s+(?:(?:2[0123]|[01]?[0-9]):(?:[0-5][0-9]):(?:(?:[0-5]?[0-9]|60)(?:[:.,][0-9]+)?)))) (?:<[0-9]+.[0-9]+> )?([a-zA-Z0-9._-]+) ([\w._/%-]+)(?:\[([1-9][0-9]*)\])?: (.*)";

/// Parses Apache common log lines into flat JSON fields.
pub struct ApacheLogParser {
    pattern: Regex,
}

impl ApacheLogParser {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(APACHE_COMMON_LOG).expect("apache log pattern should compile"),
        }
    }

    /// Returns `None` when the line is not common log format. Numeric fields
    /// come out as numbers; the timestamp keeps its raw form when it does
    /// not parse.
    pub fn parse(&self, line: &str) -> Option<Value> {
        let captures = self.pattern.captures(line)?;

        let mut fields = Map::new();
        fields.insert("host".to_string(), Value::from(&captures[1]));
        fields.insert("ident".to_string(), Value::from(&captures[2]));
        fields.insert("authuser".to_string(), Value::from(&captures[3]));

        let request = &captures[6];
        fields.insert("request".to_string(), Value::from(request));
        if let Some((verb, _)) = request.split_once(' ') {
            fields.insert("verb".to_string(), Value::from(verb));
        }

        fields.insert("response".to_string(), int_or_string(&captures[7]));
        fields.insert("bytes".to_string(), int_or_string(&captures[8]));

        let raw_timestamp = &captures[4];
        let timestamp = match NaiveDateTime::parse_from_str(raw_timestamp, APACHE_TIMESTAMP) {
            Ok(naive) => naive.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true),
            Err(_) => raw_timestamp.to_string(),
        };
        fields.insert("@timestamp".to_string(), Value::from(timestamp));

        if let Some(offset) = captures.get(5) {
            let timezone = offset.as_str().trim().to_string();
            let with_offset = format!("{raw_timestamp} {timezone}");
            fields.insert("timezone".to_string(), Value::from(timezone));
            if let Ok(parsed) =
                DateTime::parse_from_str(&with_offset, &format!("{APACHE_TIMESTAMP} %z"))
            {
                fields.insert(
                    "@timestamp_utc".to_string(),
                    Value::from(
                        parsed
                            .with_timezone(&Utc)
                            .to_rfc3339_opts(SecondsFormat::Millis, true),
                    ),
                );
            }
        }

        Some(Value::Object(fields))
    }
}

impl Default for ApacheLogParser {
    fn default() -> Self {
        Self::new()
    }
}

fn int_or_string(text: &str) -> Value {
    match text.parse::<u64>() {
        Ok(number) => Value::from(number),
        Err(_) => Value::from(text),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyslogLine {
    pub timestamp: String,
    pub host: String,
    pub program: String,
    pub process_id: Option<String>,
    pub message: String,
}

/// Parses RFC 3164 style syslog lines (`month day time host program[pid]:
/// message`).
pub struct SyslogParser {
    pattern: Regex,
}

impl SyslogParser {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(SYSLOG_LINE).expect("syslog pattern should compile"),
        }
    }

    pub fn parse(&self, line: &str) -> Option<SyslogLine> {
        let captures = self.pattern.captures(line)?;
        Some(SyslogLine {
            timestamp: captures[1].to_string(),
            host: captures[2].to_string(),
            program: captures[3].to_string(),
            process_id: captures.get(4).map(|pid| pid.as_str().to_string()),
            message: captures[5].to_string(),
        })
    }
}

impl Default for SyslogParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders one parsed syslog line as a newline-terminated CSV record. An
/// absent process id becomes an empty field.
pub fn syslog_csv_line(line: &SyslogLine) -> Result<String, ValidationError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer
        .serialize(line)
        .map_err(|error| ValidationError::new(format!("Could not render CSV record: {error}")))?;
    let bytes = writer
        .into_inner()
        .map_err(|error| ValidationError::new(format!("Could not render CSV record: {error}")))?;
    String::from_utf8(bytes)
        .map_err(|error| ValidationError::new(format!("CSV record is not UTF-8: {error}")))
}

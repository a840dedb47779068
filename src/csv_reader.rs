use crate::coerce::CoercionPolicy;
use crate::data::{Dataset, Record};
use csv::{ReaderBuilder, StringRecord, Terminator, Trim};
use log::{debug, info, warn};

/// Parse delimited text into a dataset.
///
/// The first line is the header. Every following line is split on `,` and
/// aligned to the headers by position. This is a plain delimiter split:
/// quotes are ordinary characters, so a field cannot contain an escaped comma,
/// and nothing is trimmed. Lines end at `\n` only; a `\r` stays in the last field.
///
/// Malformed lines never fail the parse:
/// - a short line leaves its trailing columns missing (dock-count columns become 0)
/// - a long line has its excess fields dropped
/// - empty lines, including the one after a trailing newline, are skipped
pub fn parse(raw: &str, policy: &CoercionPolicy) -> Dataset {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(Trim::None)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(raw.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(h) => h.iter().map(str::to_string).collect(),
        Err(e) => {
            warn!("Could not read header line: {}", e);
            return Dataset::default();
        }
    };
    debug!("Headers: {:?}", headers);

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        match row {
            Ok(row) => records.push(build_record(&headers, &row, policy)),
            Err(e) => {
                // Only reachable on reader failures; keep what was read so far
                warn!("Stopped reading CSV at data line {}: {}", line + 1, e);
                break;
            }
        }
    }

    info!("Parsed {} record(s) across {} column(s)", records.len(), headers.len());
    Dataset::new(headers, records)
}

fn build_record(headers: &[String], row: &StringRecord, policy: &CoercionPolicy) -> Record {
    let mut record = Record::new();
    for (idx, column) in headers.iter().enumerate() {
        if let Some(value) = policy.coerce(column, row.get(idx)) {
            record.insert(column.as_str(), value);
        }
    }
    record
}

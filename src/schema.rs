//! Fixed Arrow schemas for the two raw record shapes.
//!
//! Both sources are read under an explicit schema rather than per-file
//! inference, so column types stay stable across heterogeneous input files.

use datafusion::arrow::datatypes::{DataType, Field, Schema};

/// Schema of a raw song-catalog record: one JSON object per catalog entry.
pub fn catalog_schema() -> Schema {
    Schema::new(vec![
        Field::new("num_songs", DataType::Int32, true),
        Field::new("artist_id", DataType::Utf8, true),
        Field::new("artist_latitude", DataType::Float64, true),
        Field::new("artist_longitude", DataType::Float64, true),
        Field::new("artist_location", DataType::Utf8, true),
        Field::new("artist_name", DataType::Utf8, true),
        Field::new("song_id", DataType::Utf8, true),
        Field::new("title", DataType::Utf8, true),
        Field::new("duration", DataType::Float64, true),
        Field::new("year", DataType::Int32, true),
    ])
}

/// Schema of a raw activity-log record: one JSON object per log line.
///
/// `ts` is a millisecond epoch and must be Int64; it does not fit in 32 bits.
pub fn activity_schema() -> Schema {
    Schema::new(vec![
        Field::new("artist", DataType::Utf8, true),
        Field::new("auth", DataType::Utf8, true),
        Field::new("firstName", DataType::Utf8, true),
        Field::new("gender", DataType::Utf8, true),
        Field::new("itemInSession", DataType::Int64, true),
        Field::new("lastName", DataType::Utf8, true),
        Field::new("length", DataType::Float64, true),
        Field::new("level", DataType::Utf8, true),
        Field::new("location", DataType::Utf8, true),
        Field::new("method", DataType::Utf8, true),
        Field::new("page", DataType::Utf8, true),
        Field::new("registration", DataType::Float64, true),
        Field::new("sessionId", DataType::Int64, true),
        Field::new("song", DataType::Utf8, true),
        Field::new("status", DataType::Int64, true),
        Field::new("ts", DataType::Int64, true),
        Field::new("userAgent", DataType::Utf8, true),
        Field::new("userId", DataType::Utf8, true),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_schema_covers_every_raw_column() {
        let schema = catalog_schema();
        assert_eq!(schema.fields().len(), 10);
        for name in ["song_id", "title", "artist_id", "year", "duration"] {
            assert!(schema.field_with_name(name).is_ok(), "missing {name}");
        }
    }

    #[test]
    fn activity_timestamp_is_wide_enough_for_millis() {
        let schema = activity_schema();
        let ts = schema.field_with_name("ts").unwrap();
        assert_eq!(ts.data_type(), &DataType::Int64);
    }

    #[test]
    fn activity_schema_keeps_raw_camel_case_names() {
        let schema = activity_schema();
        for name in ["userId", "firstName", "lastName", "sessionId", "userAgent"] {
            assert!(schema.field_with_name(name).is_ok(), "missing {name}");
        }
    }
}

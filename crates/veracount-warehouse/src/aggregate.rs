//! Day-granularity record counts.

use std::path::PathBuf;

use ::duckdb::Connection;
use time::{Date, Month};
use tracing::debug;

use crate::{parquet_source, quote_identifier, AggregateError};

/// Number of records observed on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DailyCount {
    pub day: Date,
    pub count: u64,
}

/// Count rows per calendar day of `column`.
///
/// Values that cannot be cast to a timestamp are dropped without error. The
/// day boundary is taken from the value as encoded; no time zone conversion
/// happens. Rows come back ordered by ascending day, one row per day.
///
/// # Errors
/// Returns an error if the files cannot be read or a result row cannot be
/// mapped to [`DailyCount`].
pub fn aggregate_daily_counts(
    connection: &Connection,
    files: &[PathBuf],
    column: &str,
) -> Result<Vec<DailyCount>, AggregateError> {
    if files.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        r"
WITH parsed AS (
    SELECT TRY_CAST({column} AS TIMESTAMP) AS ts
    FROM {source}
),
daily AS (
    SELECT CAST(date_trunc('day', ts) AS DATE) AS bucket, COUNT(*)::BIGINT AS count
    FROM parsed
    WHERE ts IS NOT NULL
    GROUP BY 1
)
SELECT year(bucket)::BIGINT, month(bucket)::BIGINT, day(bucket)::BIGINT, count
FROM daily
ORDER BY bucket
",
        column = quote_identifier(column),
        source = parquet_source(files),
    );

    let mut statement = connection.prepare(sql.as_str())?;
    let raw_rows = statement
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let rows = raw_rows
        .into_iter()
        .map(|(year, month, day, count)| to_daily_count((year, month, day), count))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(column, days = rows.len(), "aggregated daily counts");
    Ok(rows)
}

/// Calendar fields as DuckDB reports them: astronomical years, so year 0 is
/// 1 BC.
type EngineDay = (i64, i64, i64);

fn to_daily_count(
    (year, month, day): EngineDay,
    count: i64,
) -> Result<DailyCount, AggregateError> {
    let invalid = || AggregateError::InvalidRow(format!("day {year}-{month}-{day}"));
    let year = i32::try_from(year).map_err(|_| invalid())?;
    let month = u8::try_from(month)
        .ok()
        .and_then(|month| Month::try_from(month).ok())
        .ok_or_else(invalid)?;
    let day_of_month = u8::try_from(day).map_err(|_| invalid())?;
    let day = Date::from_calendar_date(year, month, day_of_month).map_err(|_| invalid())?;
    let count = u64::try_from(count)
        .map_err(|_| AggregateError::InvalidRow(format!("negative count {count} for {day}")))?;
    Ok(DailyCount { day, count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{open_in_memory, write_parquet_fixture};
    use tempfile::tempdir;

    fn day(year: i32, month: Month, day: u8) -> Date {
        Date::from_calendar_date(year, month, day).expect("valid date")
    }

    #[test]
    fn counts_rows_per_day_in_ascending_order() {
        let temp = tempdir().expect("tempdir");
        let file = temp.path().join("part.parquet");
        write_parquet_fixture(
            &file,
            "SELECT * FROM (VALUES \
                (TIMESTAMP '2024-01-02 00:00:00'), \
                (TIMESTAMP '2024-01-01 10:00:00'), \
                (TIMESTAMP '2024-01-01 23:00:00')) t(created_at)",
        );

        let connection = open_in_memory().expect("open");
        let rows = aggregate_daily_counts(&connection, &[file], "created_at").expect("aggregate");

        assert_eq!(
            rows,
            vec![
                DailyCount {
                    day: day(2024, Month::January, 1),
                    count: 2
                },
                DailyCount {
                    day: day(2024, Month::January, 2),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn unparseable_values_are_dropped_silently() {
        let temp = tempdir().expect("tempdir");
        let file = temp.path().join("part.parquet");
        write_parquet_fixture(
            &file,
            "SELECT * FROM (VALUES \
                ('2024-03-05 08:15:00'), \
                ('not a timestamp'), \
                (NULL), \
                ('2024-03-05 21:00:00')) t(verified_at)",
        );

        let connection = open_in_memory().expect("open");
        let rows = aggregate_daily_counts(&connection, &[file], "verified_at").expect("aggregate");

        assert_eq!(
            rows,
            vec![DailyCount {
                day: day(2024, Month::March, 5),
                count: 2
            }]
        );
    }

    #[test]
    fn all_invalid_values_produce_no_rows() {
        let temp = tempdir().expect("tempdir");
        let file = temp.path().join("part.parquet");
        write_parquet_fixture(&file, "SELECT 'garbage' AS \"timestamp\"");

        let connection = open_in_memory().expect("open");
        let rows = aggregate_daily_counts(&connection, &[file], "timestamp").expect("aggregate");

        assert!(rows.is_empty());
    }

    #[test]
    fn counts_span_multiple_files() {
        let temp = tempdir().expect("tempdir");
        let first = temp.path().join("2024").join("a.parquet");
        let second = temp.path().join("2025").join("b.parquet");
        write_parquet_fixture(&first, "SELECT DATE '2024-12-31' AS \"date\"");
        write_parquet_fixture(
            &second,
            "SELECT * FROM (VALUES (DATE '2024-12-31'), (DATE '2025-01-01')) t(\"date\")",
        );

        let connection = open_in_memory().expect("open");
        let rows =
            aggregate_daily_counts(&connection, &[first, second], "date").expect("aggregate");

        assert_eq!(
            rows,
            vec![
                DailyCount {
                    day: day(2024, Month::December, 31),
                    count: 2
                },
                DailyCount {
                    day: day(2025, Month::January, 1),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn five_digit_years_are_counted() {
        let temp = tempdir().expect("tempdir");
        let file = temp.path().join("part.parquet");
        write_parquet_fixture(
            &file,
            "SELECT * FROM (VALUES \
                ('2024-01-01 00:00:00'), \
                ('12024-01-01 00:00:00')) t(created_at)",
        );

        let connection = open_in_memory().expect("open");
        let rows = aggregate_daily_counts(&connection, &[file], "created_at").expect("aggregate");

        assert_eq!(
            rows,
            vec![
                DailyCount {
                    day: day(2024, Month::January, 1),
                    count: 1
                },
                DailyCount {
                    day: day(12024, Month::January, 1),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn rejects_unexpected_engine_values() {
        let error = to_daily_count((2024, 13, 1), 1).expect_err("invalid month");
        assert!(matches!(error, AggregateError::InvalidRow(_)));

        let error = to_daily_count((2024, 2, 30), 1).expect_err("invalid day");
        assert!(matches!(error, AggregateError::InvalidRow(_)));

        let error = to_daily_count((2024, 1, 1), -1).expect_err("negative count");
        assert!(matches!(error, AggregateError::InvalidRow(_)));
    }
}

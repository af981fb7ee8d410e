//! `day,count` CSV output.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use time::Date;
use tracing::info;

use crate::{AggregateError, DailyCount};

/// Header line of the output file.
pub const CSV_HEADER: &str = "day,count";

/// Render rows exactly as they are written to disk.
pub fn render_daily_counts(rows: &[DailyCount]) -> String {
    let mut output = String::with_capacity(16 * (rows.len() + 1));
    output.push_str(CSV_HEADER);
    output.push('\n');

    for row in rows {
        output.push_str(day_label(row.day).as_str());
        output.push(',');
        output.push_str(row.count.to_string().as_str());
        output.push('\n');
    }

    output
}

/// `YYYY-MM-DD` the way DuckDB prints dates: years past 9999 keep all their
/// digits and years before 1 AD carry a ` (BC)` suffix.
pub fn day_label(day: Date) -> String {
    let (year, month, day_of_month) = (day.year(), u8::from(day.month()), day.day());
    if year > 0 {
        format!("{year:04}-{month:02}-{day_of_month:02}")
    } else {
        format!("{:04}-{month:02}-{day_of_month:02} (BC)", 1 - year)
    }
}

/// Write rows to `path`, replacing any previous file.
///
/// The content is staged in a sibling temporary file and renamed into place,
/// so readers never observe a partially written output. Parent directories
/// are created as needed.
pub fn write_daily_counts_csv(
    path: impl AsRef<Path>,
    rows: &[DailyCount],
) -> Result<(), AggregateError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let rendered = render_daily_counts(rows);

    let staged = NamedTempFile::new_in(parent)?;
    let mut writer = BufWriter::new(staged);
    writer.write_all(rendered.as_bytes())?;
    writer.flush()?;
    let staged = writer
        .into_inner()
        .map_err(|error| AggregateError::Io(error.into_error()))?;
    staged.persist(path).map_err(std::io::Error::from)?;

    info!(path = %path.display(), rows = rows.len(), "wrote daily counts");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use time::Month;

    fn row(year: i32, month: Month, day: u8, count: u64) -> DailyCount {
        DailyCount {
            day: Date::from_calendar_date(year, month, day).expect("valid date"),
            count,
        }
    }

    #[test]
    fn renders_header_and_iso_days() {
        let rendered = render_daily_counts(&[
            row(2024, Month::January, 1, 2),
            row(2024, Month::January, 2, 1),
        ]);

        assert_eq!(rendered, "day,count\n2024-01-01,2\n2024-01-02,1\n");
    }

    #[test]
    fn empty_rows_render_header_only() {
        assert_eq!(render_daily_counts(&[]), "day,count\n");
    }

    #[test]
    fn days_outside_four_digit_years_render_like_duckdb() {
        let rendered = render_daily_counts(&[
            row(-43, Month::March, 15, 1),
            row(0, Month::December, 31, 2),
            row(12024, Month::January, 1, 3),
        ]);

        assert_eq!(
            rendered,
            "day,count\n0044-03-15 (BC),1\n0001-12-31 (BC),2\n12024-01-01,3\n"
        );
    }

    #[test]
    fn write_creates_parent_directories_and_replaces_content() {
        let temp = tempdir().expect("tempdir");
        let output = temp.path().join("data").join("nested").join("counts.csv");

        write_daily_counts_csv(&output, &[row(2023, Month::May, 9, 7)]).expect("first write");
        write_daily_counts_csv(&output, &[]).expect("second write");

        let content = fs::read_to_string(&output).expect("read output");
        assert_eq!(content, "day,count\n");

        let leftovers = fs::read_dir(output.parent().expect("parent"))
            .expect("read dir")
            .count();
        assert_eq!(leftovers, 1, "temporary files must not remain next to the output");
    }

    #[test]
    fn repeated_writes_are_byte_identical() {
        let temp = tempdir().expect("tempdir");
        let first = temp.path().join("first.csv");
        let second = temp.path().join("second.csv");
        let rows = [row(2024, Month::February, 29, 3), row(2024, Month::March, 1, 12)];

        write_daily_counts_csv(&first, &rows).expect("first write");
        write_daily_counts_csv(&second, &rows).expect("second write");

        assert_eq!(
            fs::read(&first).expect("read first"),
            fs::read(&second).expect("read second")
        );
    }
}

// Primitives shared by the report readers.

use std::fmt::Write;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::NaiveDateTime;
use csv::StringRecord;

use crate::reports::*;

/// Start time of a meeting, as written in the report headers.
pub const MEETING_DATETIME_FORMAT: &str = "%b %d, %Y %I:%M %p";
/// Submission time of a poll response. Zoom uses a 24 hour clock with seconds here.
pub const RESPONSE_DATETIME_FORMAT: &str = "%b %d, %Y %H:%M:%S";
/// Default format of the display dates used on the chart axes.
pub const DEFAULT_DATE_FORMAT: &str = "%d.%m.";

pub fn simplify_file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Reads the physical lines of a file. The file is closed before returning.
pub fn read_lines(path: &Path) -> ReportResult<Vec<String>> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu {
        path: path.display().to_string(),
    })?;
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(&contents);
    Ok(contents.lines().map(|l| l.to_string()).collect())
}

/// Parses a single line as a CSV record. An empty line gives an empty record.
pub fn parse_line(path: &str, lineno: usize, line: &str) -> ReportResult<StringRecord> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    let mut record = StringRecord::new();
    rdr.read_record(&mut record)
        .context(CsvParseSnafu { path, lineno })?;
    Ok(record)
}

/// Zoom writes meeting ids with dashes in some places and without in others.
pub fn strip_dashes(id: &str) -> String {
    id.replace('-', "")
}

pub fn parse_datetime(content: &str, format: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(content.trim(), format)
}

/// Formats a date with a strftime-style pattern, failing on patterns chrono cannot render.
pub fn format_date(datetime: &NaiveDateTime, format: &str) -> ReportResult<String> {
    let mut res = String::new();
    write!(res, "{}", datetime.format(format))
        .ok()
        .context(InvalidDateFormatSnafu { format })?;
    Ok(res)
}

/// Position of a value in the header block of a report.
///
/// Rows are physical lines and start at 0, columns start at 0.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub row: usize,
    pub column: usize,
}

impl FieldSpec {
    pub const fn new(name: &'static str, row: usize, column: usize) -> FieldSpec {
        FieldSpec { name, row, column }
    }

    fn lineno(&self) -> usize {
        self.row + 1
    }
}

/// The header lines of a report, parsed as CSV records.
#[derive(Debug, Clone)]
pub struct HeaderRows {
    path: String,
    rows: Vec<StringRecord>,
}

impl HeaderRows {
    /// Parses the lines used by a layout and checks that every field of the layout is present.
    pub fn parse(path: &str, lines: &[String], layout: &[FieldSpec]) -> ReportResult<HeaderRows> {
        let last_row = layout.iter().map(|f| f.row).max().unwrap_or(0);
        let mut rows: Vec<StringRecord> = Vec::new();
        for (idx, line) in lines.iter().take(last_row + 1).enumerate() {
            rows.push(parse_line(path, idx + 1, line)?);
        }
        let res = HeaderRows {
            path: path.to_string(),
            rows,
        };
        for field in layout.iter() {
            res.cell(field)?;
        }
        Ok(res)
    }

    pub fn cell(&self, field: &FieldSpec) -> ReportResult<&str> {
        let row = self.rows.get(field.row).context(MissingRowSnafu {
            path: &self.path,
            lineno: field.lineno(),
            field: field.name,
        })?;
        row.get(field.column).context(MissingFieldSnafu {
            path: &self.path,
            lineno: field.lineno(),
            column: field.column + 1,
            field: field.name,
        })
    }

    pub fn int<T>(&self, field: &FieldSpec) -> ReportResult<T>
    where
        T: FromStr<Err = ParseIntError>,
    {
        let content = self.cell(field)?;
        content.trim().parse::<T>().context(ParsingIntSnafu {
            path: &self.path,
            lineno: field.lineno(),
            field: field.name,
            content,
        })
    }

    pub fn float(&self, field: &FieldSpec) -> ReportResult<f64> {
        let content = self.cell(field)?;
        content.trim().parse::<f64>().context(ParsingFloatSnafu {
            path: &self.path,
            lineno: field.lineno(),
            field: field.name,
            content,
        })
    }

    pub fn datetime(&self, field: &FieldSpec, format: &str) -> ReportResult<NaiveDateTime> {
        let content = self.cell(field)?;
        parse_datetime(content, format).context(ParsingDateSnafu {
            path: &self.path,
            lineno: field.lineno(),
            content,
            format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::ReportError;
    use chrono::NaiveDate;
    use std::path::Path;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(|s| s.to_string()).collect()
    }

    #[test]
    fn quoted_cells() {
        let r = parse_line("f", 1, r#""Weekly, Sync",123-456-789,"Mar 03, 2020 10:00 AM",62,"#)
            .unwrap();
        let cells: Vec<&str> = r.iter().collect();
        assert_eq!(
            cells,
            vec!["Weekly, Sync", "123-456-789", "Mar 03, 2020 10:00 AM", "62", ""]
        );
        assert!(parse_line("f", 1, "").unwrap().is_empty());
    }

    #[test]
    fn two_datetime_formats() {
        let meeting = parse_datetime("Mar 03, 2020 01:05 PM", MEETING_DATETIME_FORMAT).unwrap();
        assert_eq!(
            meeting,
            NaiveDate::from_ymd_opt(2020, 3, 3)
                .unwrap()
                .and_hms_opt(13, 5, 0)
                .unwrap()
        );
        let response = parse_datetime("Mar 03, 2020 13:05:09", RESPONSE_DATETIME_FORMAT).unwrap();
        assert_eq!(
            response,
            NaiveDate::from_ymd_opt(2020, 3, 3)
                .unwrap()
                .and_hms_opt(13, 5, 9)
                .unwrap()
        );
        assert!(parse_datetime("Mar 03, 2020 13:05:09", MEETING_DATETIME_FORMAT).is_err());
        assert!(parse_datetime("Mar 03, 2020 01:05 PM", RESPONSE_DATETIME_FORMAT).is_err());
    }

    #[test]
    fn display_dates() {
        let dt = NaiveDate::from_ymd_opt(2020, 3, 7)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(format_date(&dt, DEFAULT_DATE_FORMAT).unwrap(), "07.03.");
        assert_eq!(format_date(&dt, "%Y-%m-%d").unwrap(), "2020-03-07");
        assert!(matches!(
            format_date(&dt, "%Q"),
            Err(ReportError::InvalidDateFormat { .. })
        ));
    }

    #[test]
    fn meeting_ids() {
        assert_eq!(strip_dashes("123-456-7890"), "1234567890");
        assert_eq!(strip_dashes("987654321"), "987654321");
    }

    #[test]
    fn header_layout_is_checked_upfront() {
        let layout = [FieldSpec::new("a", 0, 0), FieldSpec::new("b", 2, 1)];
        let ok = HeaderRows::parse("f", &lines("1\nx\ny, 42 \n"), &layout).unwrap();
        assert_eq!(ok.int::<u32>(&layout[1]).unwrap(), 42);

        let short = HeaderRows::parse("f", &lines("1\nx\n"), &layout);
        assert!(matches!(
            short,
            Err(ReportError::MissingRow { lineno: 3, .. })
        ));
        let narrow = HeaderRows::parse("f", &lines("1\nx\ny\n"), &layout);
        assert!(matches!(
            narrow,
            Err(ReportError::MissingField { column: 2, .. })
        ));
    }

    #[test]
    fn typed_cells() {
        let layout = [FieldSpec::new("n", 0, 0), FieldSpec::new("rate", 0, 1)];
        let rows = HeaderRows::parse("f", &lines("abc,85.5"), &layout).unwrap();
        assert!(matches!(
            rows.int::<u64>(&layout[0]),
            Err(ReportError::ParsingInt { .. })
        ));
        assert_eq!(rows.float(&layout[1]).unwrap(), 85.5);
        assert!(matches!(
            rows.datetime(&layout[1], MEETING_DATETIME_FORMAT),
            Err(ReportError::ParsingDate { .. })
        ));
    }

    #[test]
    fn file_names() {
        assert_eq!(
            simplify_file_name(Path::new("/tmp/a/Sync Poll Report.csv")),
            "Sync Poll Report.csv"
        );
    }
}

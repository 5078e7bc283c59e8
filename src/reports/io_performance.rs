// Reader for the Zoom 'Performance Report' files.

use chrono::NaiveDateTime;

use crate::reports::{
    io_common::{
        format_date, read_lines, simplify_file_name, strip_dashes, FieldSpec, HeaderRows,
        MEETING_DATETIME_FORMAT,
    },
    table::Record,
    *,
};

/// The metadata of one meeting, read from its performance report.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct MeetingRecord {
    /// Meeting title
    pub topic: String,
    /// Zoom meeting id, without dashes
    pub meeting_id: String,
    pub datetime: NaiveDateTime,
    /// Duration in minutes
    pub duration: u32,
    pub registered: u64,
    pub attended: u64,
    /// Attendance rate, as reported by Zoom (not recomputed from the counts)
    pub attendance_rate: f64,
    /// Number of Q&A questions recorded
    pub questions: u64,
    /// Display date for the charts
    pub date_str: String,
}

impl Record for MeetingRecord {
    const COLUMNS: &'static [&'static str] = &[
        "topic",
        "meeting_id",
        "datetime",
        "duration",
        "registered",
        "attended",
        "attendance_rate",
        "questions",
        "date_str",
    ];
}

pub const TOPIC: FieldSpec = FieldSpec::new("topic", 3, 0);
pub const MEETING_ID: FieldSpec = FieldSpec::new("meeting_id", 3, 1);
pub const DATETIME: FieldSpec = FieldSpec::new("datetime", 3, 2);
pub const DURATION: FieldSpec = FieldSpec::new("duration", 3, 3);
pub const REGISTERED: FieldSpec = FieldSpec::new("registered", 6, 0);
pub const ATTENDED: FieldSpec = FieldSpec::new("attended", 6, 1);
pub const ATTENDANCE_RATE: FieldSpec = FieldSpec::new("attendance_rate", 6, 2);
pub const QUESTIONS: FieldSpec = FieldSpec::new("questions", 8, 0);

/// Where the values of a performance report are found.
pub const PERFORMANCE_LAYOUT: [FieldSpec; 8] = [
    TOPIC,
    MEETING_ID,
    DATETIME,
    DURATION,
    REGISTERED,
    ATTENDED,
    ATTENDANCE_RATE,
    QUESTIONS,
];

/// Reads the metadata of a single performance report.
///
/// `date_format` is the strftime pattern of the `date_str` column.
pub fn read_performance_report(path: &Path, date_format: &str) -> ReportResult<MeetingRecord> {
    let p = path.display().to_string();
    let lines = read_lines(path)?;
    let header = HeaderRows::parse(&p, &lines, &PERFORMANCE_LAYOUT)?;

    let datetime = header.datetime(&DATETIME, MEETING_DATETIME_FORMAT)?;
    let record = MeetingRecord {
        topic: header.cell(&TOPIC)?.to_string(),
        meeting_id: strip_dashes(header.cell(&MEETING_ID)?),
        datetime,
        duration: header.int(&DURATION)?,
        registered: header.int(&REGISTERED)?,
        attended: header.int(&ATTENDED)?,
        // The rate is given as a percentage.
        attendance_rate: header.float(&ATTENDANCE_RATE)? / 100.0,
        questions: header.int(&QUESTIONS)?,
        date_str: format_date(&datetime, date_format)?,
    };

    if !(0.0..=1.0).contains(&record.attendance_rate) {
        warn!(
            "read_performance_report: {}: attendance rate out of range: {}",
            simplify_file_name(path),
            record.attendance_rate
        );
    }
    if record.attended > record.registered {
        warn!(
            "read_performance_report: {}: more attendees ({}) than registrations ({})",
            simplify_file_name(path),
            record.attended,
            record.registered
        );
    }
    debug!("read_performance_report: {:?}", record);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::test_data::*;
    use crate::reports::ReportError;
    use chrono::NaiveDate;
    use std::path::Path;

    #[test]
    fn read_one_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_performance_report(
            dir.path(),
            "Sync Performance Report.csv",
            "Weekly, Sync",
            "123-456-789",
            "Mar 03, 2020 10:00 AM",
            40,
            31,
            "77.5",
            5,
        );
        let r = read_performance_report(&path, "%d.%m.").unwrap();
        assert_eq!(r.topic, "Weekly, Sync");
        assert_eq!(r.meeting_id, "123456789");
        assert_eq!(
            r.datetime,
            NaiveDate::from_ymd_opt(2020, 3, 3)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap()
        );
        assert_eq!(r.duration, 62);
        assert_eq!(r.registered, 40);
        assert_eq!(r.attended, 31);
        assert_eq!(r.attendance_rate, 77.5 / 100.0);
        assert_eq!(r.questions, 5);
        assert_eq!(r.date_str, "03.03.");
    }

    #[test]
    fn rate_is_not_recomputed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_performance_report(
            dir.path(),
            "Odd Performance Report.csv",
            "Odd",
            "1-2",
            "Dec 24, 2020 11:30 PM",
            10,
            12,
            "33.3",
            0,
        );
        let r = read_performance_report(&path, "%Y/%m/%d").unwrap();
        assert_eq!(r.attendance_rate, 33.3 / 100.0);
        assert_eq!(r.attended, 12);
        assert_eq!(r.date_str, "2020/12/24");
    }

    #[test]
    fn truncated_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Short Performance Report.csv");
        std::fs::write(
            &path,
            "Report Generated:,x\n\nTopic,Webinar ID\n\"T\",1-2,\"Mar 03, 2020 10:00 AM\",62,\n",
        )
        .unwrap();
        let res = read_performance_report(&path, "%d.%m.");
        assert!(matches!(
            res,
            Err(ReportError::MissingRow { lineno: 7, .. })
        ));
    }

    #[test]
    fn bad_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_performance_report(
            dir.path(),
            "Bad Performance Report.csv",
            "Bad",
            "1-2",
            "Mar 03, 2020 10:00 AM",
            40,
            31,
            "n/a",
            5,
        );
        let res = read_performance_report(&path, "%d.%m.");
        assert!(matches!(res, Err(ReportError::ParsingFloat { .. })));
    }

    #[test]
    fn missing_file() {
        let res = read_performance_report(Path::new("/nonexistent/x Performance Report.csv"), "%d");
        assert!(matches!(res, Err(ReportError::OpeningFile { .. })));
    }
}

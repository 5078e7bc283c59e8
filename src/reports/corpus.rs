// Loading all the reports of a folder.

use chrono::NaiveDateTime;
use std::collections::HashMap;
use walkdir::WalkDir;

use crate::reports::{
    io_common::{simplify_file_name, DEFAULT_DATE_FORMAT},
    io_performance::{read_performance_report, MeetingRecord},
    io_poll::{read_poll_report, read_poll_report_counts, PollAnswerCount, PollResponse},
    table::{Record, Table},
    *,
};

pub const PERFORMANCE_REPORT_SUFFIX: &str = "Performance Report.csv";
pub const POLL_REPORT_SUFFIX: &str = "Poll Report.csv";

/// What to do with a report that cannot be read.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub enum ErrorPolicy {
    /// The first failure aborts the whole load.
    #[default]
    FailFast,
    /// Failing reports are logged and left out.
    SkipInvalid,
}

/// Reads and combines all the reports of a folder.
///
/// ```ignore
/// let loader = CorpusLoader::new("reports").date_format("%d.%m.");
/// let meetings = loader.performance_reports()?;
/// let counts = loader.poll_report_counts()?;
/// ```
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CorpusLoader {
    folder: PathBuf,
    date_format: String,
    error_policy: ErrorPolicy,
}

impl CorpusLoader {
    pub fn new<P: AsRef<Path>>(folder: P) -> CorpusLoader {
        CorpusLoader {
            folder: folder.as_ref().to_path_buf(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            error_policy: ErrorPolicy::FailFast,
        }
    }

    pub fn date_format(self, date_format: &str) -> CorpusLoader {
        CorpusLoader {
            date_format: date_format.to_string(),
            ..self
        }
    }

    pub fn error_policy(self, error_policy: ErrorPolicy) -> CorpusLoader {
        CorpusLoader {
            error_policy,
            ..self
        }
    }

    /// One row per meeting, sorted by meeting date.
    pub fn performance_reports(&self) -> ReportResult<Table<MeetingRecord>> {
        let mut rows = self.read_all(PERFORMANCE_REPORT_SUFFIX, |p| {
            read_performance_report(p, &self.date_format).map(|r| vec![r])
        })?;
        rows.sort_by_key(|r| r.datetime);
        info!(
            "performance_reports: {} meetings in {}",
            rows.len(),
            self.folder.display()
        );
        Ok(Table::new(rows))
    }

    /// One row per respondent and question, sorted by question then answer.
    pub fn poll_reports(&self) -> ReportResult<Table<PollResponse>> {
        let mut rows = self.read_all(POLL_REPORT_SUFFIX, read_poll_report)?;
        rows.sort_by(|a, b| (&a.question, &a.answer).cmp(&(&b.question, &b.answer)));
        info!(
            "poll_reports: {} responses in {}",
            rows.len(),
            self.folder.display()
        );
        Ok(Table::new(rows))
    }

    /// One row per meeting, question and answer, sorted by question then answer.
    pub fn poll_report_counts(&self) -> ReportResult<Table<PollAnswerCount>> {
        let mut rows = self.read_all(POLL_REPORT_SUFFIX, read_poll_report_counts)?;
        rows.sort_by(|a, b| (&a.question, &a.answer).cmp(&(&b.question, &b.answer)));
        info!(
            "poll_report_counts: {} answer counts in {}",
            rows.len(),
            self.folder.display()
        );
        Ok(Table::new(rows))
    }

    fn read_all<R, F>(&self, suffix: &str, read: F) -> ReportResult<Vec<R>>
    where
        R: Record,
        F: Fn(&Path) -> ReportResult<Vec<R>>,
    {
        let mut res: Vec<R> = Vec::new();
        for path in discover_reports(&self.folder, suffix)? {
            debug!("read_all: reading {}", path.display());
            match read(&path) {
                Ok(mut rows) => res.append(&mut rows),
                Err(e) if self.error_policy == ErrorPolicy::SkipInvalid => {
                    warn!("Skipping {}: {}", simplify_file_name(&path), e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(res)
    }
}

/// The reports of a folder whose file name ends with `suffix`, sorted by file name.
///
/// Sub-folders and hidden files are not considered. A missing folder has no reports.
pub fn discover_reports(folder: &Path, suffix: &str) -> ReportResult<Vec<PathBuf>> {
    if !folder.is_dir() {
        warn!("discover_reports: {} is not a folder", folder.display());
        return Ok(Vec::new());
    }
    let mut res: Vec<PathBuf> = Vec::new();
    for entry_r in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry_r.context(ReadingDirectorySnafu {
            path: folder.display().to_string(),
        })?;
        let name = entry.file_name().to_string_lossy();
        if !name.starts_with('.') && name.ends_with(suffix) && entry.path().is_file() {
            res.push(entry.into_path());
        }
    }
    debug!(
        "discover_reports: {} files matching {:?} in {}",
        res.len(),
        suffix,
        folder.display()
    );
    Ok(res)
}

/// An answer count, placed at the date of its meeting.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct DatedAnswerCount {
    pub meeting_id: String,
    pub datetime: NaiveDateTime,
    pub date_str: String,
    pub question: String,
    pub answer: String,
    pub count: u64,
    pub prop: f64,
    pub responses: u64,
}

/// Attaches the meeting dates to the answer counts, matching on the meeting id.
///
/// Counts of meetings without a performance report cannot be placed in time and
/// are left out. A meeting id shared by several meetings dates the counts once per meeting.
pub fn join_meeting_dates(
    counts: &Table<PollAnswerCount>,
    meetings: &Table<MeetingRecord>,
) -> Vec<DatedAnswerCount> {
    let mut by_id: HashMap<&str, Vec<&MeetingRecord>> = HashMap::new();
    for m in meetings.iter() {
        by_id.entry(m.meeting_id.as_str()).or_default().push(m);
    }

    let mut res: Vec<DatedAnswerCount> = Vec::new();
    let mut unmatched: Vec<&str> = Vec::new();
    for c in counts.iter() {
        match by_id.get(c.meeting_id.as_str()) {
            Some(ms) => {
                for m in ms.iter() {
                    res.push(DatedAnswerCount {
                        meeting_id: c.meeting_id.clone(),
                        datetime: m.datetime,
                        date_str: m.date_str.clone(),
                        question: c.question.clone(),
                        answer: c.answer.clone(),
                        count: c.count,
                        prop: c.prop,
                        responses: c.responses,
                    });
                }
            }
            None if !unmatched.contains(&c.meeting_id.as_str()) => {
                unmatched.push(c.meeting_id.as_str());
            }
            None => {}
        }
    }
    for id in unmatched.iter() {
        warn!(
            "join_meeting_dates: no performance report for meeting {}, its poll is not dated",
            id
        );
    }
    res
}

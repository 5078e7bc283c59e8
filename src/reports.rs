use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use zoom_polls::PollErrors;

use crate::args::Args;
use crate::reports::chart::{plot_attendance, plot_question, plot_question_stacked, Figure};
use crate::reports::config_reader::*;
use crate::reports::corpus::{join_meeting_dates, CorpusLoader, DatedAnswerCount};
use crate::reports::io_performance::MeetingRecord;
use crate::reports::io_poll::{PollAnswerCount, PollResponse};
use crate::reports::table::Table;

pub mod chart;
pub mod config_reader;
pub mod corpus;
pub mod io_common;
pub mod io_performance;
pub mod io_poll;
pub mod palette;
pub mod table;

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error listing the reports of {path}"))]
    ReadingDirectory {
        source: walkdir::Error,
        path: String,
    },
    #[snafu(display("{path}:{lineno}: malformed CSV"))]
    CsvParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("{path}:{lineno}: missing line for field {field}"))]
    MissingRow {
        path: String,
        lineno: usize,
        field: String,
    },
    #[snafu(display("{path}:{lineno}: missing column {column} for field {field}"))]
    MissingField {
        path: String,
        lineno: usize,
        column: usize,
        field: String,
    },
    #[snafu(display("{path}:{lineno}: field {field}: not an integer: {content:?}"))]
    ParsingInt {
        source: std::num::ParseIntError,
        path: String,
        lineno: usize,
        field: String,
        content: String,
    },
    #[snafu(display("{path}:{lineno}: field {field}: not a number: {content:?}"))]
    ParsingFloat {
        source: std::num::ParseFloatError,
        path: String,
        lineno: usize,
        field: String,
        content: String,
    },
    #[snafu(display("{path}:{lineno}: {content:?} does not match the date format {format:?}"))]
    ParsingDate {
        source: chrono::ParseError,
        path: String,
        lineno: usize,
        content: String,
        format: String,
    },
    #[snafu(display("Invalid date format {format:?}"))]
    InvalidDateFormat { format: String },
    #[snafu(display("{path}:{lineno}: invalid poll row"))]
    PollRow {
        source: PollErrors,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error writing CSV file {path}"))]
    WritingCsv { source: csv::Error, path: String },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening JSON file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing to JSON"))]
    SerializingJson { source: serde_json::Error },

    #[snafu(display(
        "The answer order of question {question:?} does not contain all the answers: {answers:?}"
    ))]
    IncompleteAnswerSort {
        question: String,
        answers: Vec<String>,
    },
    #[snafu(display("{labels} legend labels given for {series} series"))]
    LegendTooShort { labels: usize, series: usize },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;

/// The tables of a run, as a single JSON document.
pub fn build_summary_js(
    meetings: &Table<MeetingRecord>,
    counts: &Table<PollAnswerCount>,
) -> ReportResult<JSValue> {
    Ok(json!({
        "meetings": meetings.to_json()?,
        "pollCounts": counts.to_json()?
    }))
}

/// The figures of a run, with the name of the file they are written to.
///
/// Without a list of questions, every observed question gets a line chart.
pub fn build_figures(
    settings: &RunSettings,
    meetings: &Table<MeetingRecord>,
    counts: &Table<PollAnswerCount>,
    dated: &[DatedAnswerCount],
) -> ReportResult<Vec<(String, Figure)>> {
    let questions: Vec<QuestionSettings> = match &settings.questions {
        Some(qs) => qs.clone(),
        None => {
            let mut qs: Vec<QuestionSettings> = Vec::new();
            for c in counts.iter() {
                if !qs.iter().any(|q| q.question == c.question) {
                    qs.push(QuestionSettings::new(&c.question));
                }
            }
            qs
        }
    };

    let mut res: Vec<(String, Figure)> = vec![(
        "attendance.json".to_string(),
        plot_attendance(meetings, &settings.attendance)?,
    )];
    for (idx, q) in questions.iter().enumerate() {
        let fig = if q.is_stacked() {
            plot_question_stacked(dated, &q.question, &q.options())?
        } else {
            plot_question(dated, &q.question, &q.options())?
        };
        if fig.renderers.is_empty() {
            warn!("build_figures: no dated answers for question {:?}", q.question);
        }
        res.push((format!("question_{}.json", idx + 1), fig));
    }
    Ok(res)
}

fn write_json(path: &Path, js: &JSValue) -> ReportResult<()> {
    let p = path.display().to_string();
    let pretty = serde_json::to_string_pretty(js).context(SerializingJsonSnafu {})?;
    fs::write(path, pretty).context(WritingFileSnafu { path: &p })?;
    debug!("write_json: {}", p);
    Ok(())
}

pub fn write_outputs(
    out: &Path,
    meetings: &Table<MeetingRecord>,
    responses: &Table<PollResponse>,
    counts: &Table<PollAnswerCount>,
    figures: &[(String, Figure)],
) -> ReportResult<()> {
    fs::create_dir_all(out).context(WritingFileSnafu {
        path: out.display().to_string(),
    })?;
    meetings.write_csv(&out.join("meetings.csv"))?;
    responses.write_csv(&out.join("poll_responses.csv"))?;
    counts.write_csv(&out.join("poll_counts.csv"))?;
    for (name, fig) in figures.iter() {
        write_json(&out.join(name), &fig.to_json()?)?;
    }
    info!(
        "write_outputs: 3 tables and {} figures written to {}",
        figures.len(),
        out.display()
    );
    Ok(())
}

fn check_reference(reference_path: &Path, pretty_js_summary: &str) -> ReportResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(SerializingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_summary {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_summary, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    info!("check_reference: summary matches {}", reference_path.display());
    Ok(())
}

pub fn run_reports(args: &Args) -> ReportResult<()> {
    let settings = resolve_settings(args)?;
    let loader = CorpusLoader::new(&settings.input)
        .date_format(&settings.date_format)
        .error_policy(settings.error_policy);

    let meetings = loader.performance_reports()?;
    let counts = loader.poll_report_counts()?;
    let dated = join_meeting_dates(&counts, &meetings);
    let figures = build_figures(&settings, &meetings, &counts, &dated)?;

    let summary = build_summary_js(&meetings, &counts)?;
    let pretty_js_summary =
        serde_json::to_string_pretty(&summary).context(SerializingJsonSnafu {})?;

    match &settings.output {
        Some(out) => {
            let responses = loader.poll_reports()?;
            write_outputs(out, &meetings, &responses, &counts, &figures)?;
        }
        None => {
            println!("{}", pretty_js_summary);
        }
    }

    if let Some(reference_path) = &settings.reference {
        check_reference(reference_path, &pretty_js_summary)?;
    }
    Ok(())
}

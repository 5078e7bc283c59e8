// Reader for the Zoom 'Poll Report' files.

use chrono::NaiveDateTime;
use csv::StringRecord;
use zoom_polls::{parse_respondent, tally_respondents, Respondent};

use crate::reports::{
    io_common::{
        parse_datetime, read_lines, simplify_file_name, strip_dashes, FieldSpec, HeaderRows,
        RESPONSE_DATETIME_FORMAT,
    },
    table::Record,
    *,
};

/// The meeting id, in the header block of the report.
pub const POLL_MEETING_ID: FieldSpec = FieldSpec::new("meeting_id", 3, 1);
/// Index of the first line with respondents. The lines before hold the
/// report metadata and the column titles.
pub const FIRST_RESPONSE_LINE: usize = 6;

/// One answer of one respondent.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct PollResponse {
    pub meeting_id: String,
    /// Row number of the respondent, only unique within one report
    pub row_no: u64,
    pub name: String,
    pub email: String,
    pub datetime: NaiveDateTime,
    pub question: String,
    pub answer: String,
}

impl Record for PollResponse {
    const COLUMNS: &'static [&'static str] = &[
        "meeting_id",
        "row_no",
        "name",
        "email",
        "datetime",
        "question",
        "answer",
    ];
}

/// Number of respondents of a meeting that gave an answer to a question.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct PollAnswerCount {
    pub meeting_id: String,
    pub question: String,
    pub answer: String,
    pub count: u64,
    /// `count / responses`
    pub prop: f64,
    /// Number of respondents who answered this question
    pub responses: u64,
}

impl Record for PollAnswerCount {
    const COLUMNS: &'static [&'static str] = &[
        "meeting_id",
        "question",
        "answer",
        "count",
        "prop",
        "responses",
    ];
}

// The respondents of a report, with the line they start at.
struct PollFile {
    meeting_id: String,
    respondents: Vec<Respondent>,
    linenos: Vec<usize>,
}

fn read_poll_file(path: &Path) -> ReportResult<PollFile> {
    let p = path.display().to_string();
    let lines = read_lines(path)?;
    let header = HeaderRows::parse(&p, &lines, &[POLL_MEETING_ID])?;
    let meeting_id = strip_dashes(header.cell(&POLL_MEETING_ID)?);

    // Quoted answers may span several lines: the body is read as a whole.
    let body = lines.get(FIRST_RESPONSE_LINE..).unwrap_or(&[]).join("\n");
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut respondents: Vec<Respondent> = Vec::new();
    let mut linenos: Vec<usize> = Vec::new();
    let mut record = StringRecord::new();
    loop {
        let lineno = FIRST_RESPONSE_LINE + rdr.position().line() as usize;
        if !rdr
            .read_record(&mut record)
            .context(CsvParseSnafu { path: &p, lineno })?
        {
            break;
        }
        let fields: Vec<&str> = record.iter().collect();
        match parse_respondent(&fields).context(PollRowSnafu { path: &p, lineno })? {
            Some(r) => {
                respondents.push(r);
                linenos.push(lineno);
            }
            None => {
                debug!("read_poll_file: line {}: no answers, skipping", lineno);
            }
        }
    }
    info!(
        "read_poll_file: {}: meeting {}, {} respondents",
        simplify_file_name(path),
        meeting_id,
        respondents.len()
    );
    Ok(PollFile {
        meeting_id,
        respondents,
        linenos,
    })
}

/// Reads a poll report in long format: one row per respondent and question.
pub fn read_poll_report(path: &Path) -> ReportResult<Vec<PollResponse>> {
    let p = path.display().to_string();
    let pf = read_poll_file(path)?;
    let mut res: Vec<PollResponse> = Vec::new();
    for (r, lineno) in pf.respondents.iter().zip(pf.linenos.iter()) {
        let datetime =
            parse_datetime(&r.submitted, RESPONSE_DATETIME_FORMAT).context(ParsingDateSnafu {
                path: &p,
                lineno: *lineno,
                content: &r.submitted,
                format: RESPONSE_DATETIME_FORMAT,
            })?;
        for qa in r.answers.iter() {
            res.push(PollResponse {
                meeting_id: pf.meeting_id.clone(),
                row_no: r.row_no,
                name: r.name.clone(),
                email: r.email.clone(),
                datetime,
                question: qa.question.clone(),
                answer: qa.answer.clone(),
            });
        }
    }
    Ok(res)
}

/// Reads a poll report and counts the answers given to each question.
///
/// The proportions are relative to the number of respondents of each question.
pub fn read_poll_report_counts(path: &Path) -> ReportResult<Vec<PollAnswerCount>> {
    let pf = read_poll_file(path)?;
    let res = tally_respondents(&pf.respondents)
        .into_iter()
        .map(|c| {
            let prop = c.prop();
            PollAnswerCount {
                meeting_id: pf.meeting_id.clone(),
                question: c.question,
                answer: c.answer,
                count: c.count,
                prop,
                responses: c.responses,
            }
        })
        .collect();
    Ok(res)
}

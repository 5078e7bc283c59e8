/*!

Decoding and tallying of Zoom poll reports.

A poll report lists one respondent per row. The first columns are fixed
(row number, name, email, submission date) and are followed by a flat
sequence of question and answer cells. The width of this sequence depends on
the subset of questions the respondent was shown, and Zoom terminates each
row with an extra empty cell.

```
use zoom_polls::{parse_respondent, tally_respondents};

let rows = vec![
    vec!["1", "Ann", "ann@example.com", "Mar 03, 2020 10:01:02", "Q1", "Yes", "Q2", "X", ""],
    vec!["2", "Bob", "bob@example.com", "Mar 03, 2020 10:01:09", "Q1", "No", ""],
];
let mut respondents = Vec::new();
for row in rows.iter() {
    if let Some(r) = parse_respondent(row)? {
        respondents.push(r);
    }
}
let counts = tally_respondents(&respondents);
assert_eq!(counts.len(), 3);
# Ok::<(), zoom_polls::PollErrors>(())
```
*/

pub mod builder;
mod config;

use log::{debug, info};

pub use crate::config::*;

use crate::builder::PollTally;

/// Decodes one row of a poll report.
///
/// Returns `None` when the row does not carry any (question, answer) pair, whatever
/// the content of the other columns. A single trailing cell that does not complete
/// a pair is ignored.
pub fn parse_respondent<S: AsRef<str>>(fields: &[S]) -> Result<Option<Respondent>, PollErrors> {
    let rest = fields.get(FIXED_COLUMNS..).unwrap_or(&[]);
    let pairs = rest.chunks_exact(2);
    if let [extra] = pairs.remainder() {
        if !extra.as_ref().is_empty() {
            debug!(
                "parse_respondent: dropping unpaired trailing cell {:?}",
                extra.as_ref()
            );
        }
    }

    let answers: Vec<QuestionAnswer> = pairs
        .map(|p| QuestionAnswer {
            question: p[0].as_ref().to_string(),
            answer: p[1].as_ref().to_string(),
        })
        .collect();

    if answers.is_empty() {
        return Ok(None);
    }

    // Having at least one pair guarantees that all the fixed columns are present.
    let row_no_s = fields[0].as_ref();
    let row_no = row_no_s
        .trim()
        .parse::<u64>()
        .map_err(|_| PollErrors::InvalidRowNumber(row_no_s.to_string()))?;

    Ok(Some(Respondent {
        row_no,
        name: fields[1].as_ref().to_string(),
        email: fields[2].as_ref().to_string(),
        submitted: fields[3].as_ref().to_string(),
        answers,
    }))
}

/// Tallies the answers of all the respondents of one poll report.
///
/// The output is sorted by question, then by answer.
pub fn tally_respondents(respondents: &[Respondent]) -> Vec<AnswerCount> {
    let mut tally = PollTally::new();
    for r in respondents.iter() {
        tally.add_respondent(r);
    }
    let counts = tally.counts();
    info!(
        "tally_respondents: {} respondents, {} distinct answers",
        tally.respondents(),
        counts.len()
    );
    counts
}

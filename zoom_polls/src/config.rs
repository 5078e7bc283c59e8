// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// Number of leading columns shared by every respondent row of a poll report:
/// row number, user name, user email and submission date.
pub const FIXED_COLUMNS: usize = 4;

/// One (question, answer) pair of a respondent block.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

/// A respondent, as decoded from one row of a poll report.
///
/// The submission date is kept as it appears in the file. Zoom does not use the
/// same date format here as in the report headers, so parsing is left to the readers.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Respondent {
    pub row_no: u64,
    pub name: String,
    pub email: String,
    pub submitted: String,
    pub answers: Vec<QuestionAnswer>,
}

// ******** Output data structures *********

/// Number of times an answer was given to a question.
///
/// `responses` is the number of respondents who answered this question, which
/// is not necessarily the number of respondents of the whole poll.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AnswerCount {
    pub question: String,
    pub answer: String,
    pub count: u64,
    pub responses: u64,
}

impl AnswerCount {
    /// The share of the respondents of this question that gave this answer.
    pub fn prop(&self) -> f64 {
        self.count as f64 / self.responses as f64
    }
}

/// Errors that prevent a respondent row from being decoded.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum PollErrors {
    /// The first column of a row with answers is not a row number.
    InvalidRowNumber(String),
}

impl Error for PollErrors {}

impl Display for PollErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollErrors::InvalidRowNumber(content) => {
                write!(f, "invalid respondent row number: {:?}", content)
            }
        }
    }
}

pub use crate::config::*;

use log::debug;
use std::collections::BTreeMap;

#[derive(Eq, PartialEq, Debug, Clone, Default)]
struct QuestionTally {
    // Number of (question, answer) pairs seen for this question.
    responses: u64,
    answers: BTreeMap<String, u64>,
}

/// Running answer counts for one poll report.
///
/// Zoom exports the respondents in blocks: people who answered the same subset
/// of questions share a block of columns. The number of respondents is therefore
/// tracked for each question separately, and proportions are computed against it.
///
/// ```
/// use zoom_polls::builder::PollTally;
///
/// let mut tally = PollTally::new();
/// tally.add_answer("Q1", "Yes");
/// tally.add_answer("Q2", "X");
/// tally.add_answer("Q1", "No");
///
/// let counts = tally.counts();
/// assert_eq!(counts.len(), 3);
/// assert_eq!(tally.responses("Q1"), Some(2));
/// assert_eq!(counts[0].prop(), 0.5);
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct PollTally {
    questions: BTreeMap<String, QuestionTally>,
    respondents: u64,
}

impl PollTally {
    pub fn new() -> PollTally {
        PollTally::default()
    }

    /// Adds all the answers of one respondent.
    pub fn add_respondent(&mut self, respondent: &Respondent) {
        debug!(
            "add_respondent: row {} with {} answers",
            respondent.row_no,
            respondent.answers.len()
        );
        self.respondents += 1;
        for qa in respondent.answers.iter() {
            self.add_answer(&qa.question, &qa.answer);
        }
    }

    /// Adds a single answer to a question.
    ///
    /// Each call counts as one response to the question. A question repeated
    /// within the same row is counted twice, so that the counts of a question
    /// always add up to its number of responses.
    pub fn add_answer(&mut self, question: &str, answer: &str) {
        let q = self.questions.entry(question.to_string()).or_default();
        q.responses += 1;
        *q.answers.entry(answer.to_string()).or_insert(0) += 1;
    }

    /// The number of respondents added with `add_respondent`.
    pub fn respondents(&self) -> u64 {
        self.respondents
    }

    /// The number of responses recorded for a question, if it was ever answered.
    pub fn responses(&self, question: &str) -> Option<u64> {
        self.questions.get(question).map(|q| q.responses)
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// The counts for every observed (question, answer) pair, sorted by question then answer.
    pub fn counts(&self) -> Vec<AnswerCount> {
        let mut res: Vec<AnswerCount> = Vec::new();
        for (question, q) in self.questions.iter() {
            for (answer, count) in q.answers.iter() {
                res.push(AnswerCount {
                    question: question.clone(),
                    answer: answer.clone(),
                    count: *count,
                    responses: q.responses,
                });
            }
        }
        res
    }
}

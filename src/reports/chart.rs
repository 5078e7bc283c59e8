// Charts of the attendance and of the poll answers over time.
//
// A chart is described by a `Figure`: categorical x axis of display dates,
// glyph renderers and a legend. Figures serialize to JSON for display.

use std::collections::HashMap;

use crate::reports::{
    corpus::DatedAnswerCount, io_performance::MeetingRecord, palette::Palette, table::Table, *,
};

/// Maximum length of the question in the title of a stacked chart.
pub const TITLE_BUDGET: usize = 60;
/// Maximum length of an answer in the legend of a stacked chart.
pub const LEGEND_BUDGET: usize = 35;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    TopLeft,
    TopRight,
    Center,
    Left,
    Right,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Glyph {
    Line {
        x: Vec<String>,
        y: Vec<f64>,
        line_width: f64,
        color: String,
    },
    Scatter {
        x: Vec<String>,
        y: Vec<f64>,
        size: f64,
        color: String,
    },
    /// One layer of a stack of vertical bars.
    VBar {
        name: String,
        x: Vec<String>,
        bottom: Vec<f64>,
        top: Vec<f64>,
        width: f64,
        color: String,
    },
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct LegendItem {
    pub label: String,
    /// Indexes of the renderers of this entry
    pub renderers: Vec<usize>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct Legend {
    /// Position of the legend inside its panel.
    pub location: Anchor,
    /// `Center` places the legend over the plot area, other values in a side panel.
    pub panel: Anchor,
    pub items: Vec<LegendItem>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct Figure {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Categories of the x axis, in display order
    pub x_range: Vec<String>,
    /// Fixed range of the y axis. Computed from the data when absent.
    pub y_range: Option<(f64, f64)>,
    pub x_axis_label: Option<String>,
    pub y_axis_label: Option<String>,
    pub toolbar_location: Anchor,
    pub renderers: Vec<Glyph>,
    pub legend: Legend,
}

impl Figure {
    fn new(title: &str, width: u32, height: u32, x_range: &[String]) -> Figure {
        // A categorical axis cannot repeat a category.
        let mut factors: Vec<String> = Vec::new();
        for x in x_range.iter() {
            if !factors.contains(x) {
                factors.push(x.clone());
            }
        }
        Figure {
            title: title.to_string(),
            width,
            height,
            x_range: factors,
            y_range: None,
            x_axis_label: None,
            y_axis_label: None,
            toolbar_location: Anchor::Right,
            renderers: Vec::new(),
            legend: Legend {
                location: Anchor::TopRight,
                panel: Anchor::Center,
                items: Vec::new(),
            },
        }
    }

    fn add_glyph(&mut self, glyph: Glyph) -> usize {
        self.renderers.push(glyph);
        self.renderers.len() - 1
    }

    fn add_line_with_markers(&mut self, x: &[String], y: &[f64], color: &str, label: &str) {
        let line = self.add_glyph(Glyph::Line {
            x: x.to_vec(),
            y: y.to_vec(),
            line_width: 2.0,
            color: color.to_string(),
        });
        self.add_glyph(Glyph::Scatter {
            x: x.to_vec(),
            y: y.to_vec(),
            size: 6.0,
            color: color.to_string(),
        });
        self.legend.items.push(LegendItem {
            label: label.to_string(),
            renderers: vec![line],
        });
    }

    pub fn to_json(&self) -> ReportResult<JSValue> {
        serde_json::to_value(self).context(SerializingJsonSnafu {})
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct AttendanceOptions {
    /// Also plot the number of Q&A questions
    pub questions: bool,
    pub title: String,
    /// Labels of the registered, attended and questions series, in this order
    pub legend: Vec<String>,
}

impl Default for AttendanceOptions {
    fn default() -> Self {
        AttendanceOptions {
            questions: false,
            title: "Meeting Attendance".to_string(),
            legend: vec![
                "Registered".to_string(),
                "Attended".to_string(),
                "Questions".to_string(),
            ],
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct QuestionOptions {
    /// Plot percentages instead of counts
    pub prop: bool,
    /// Order of the answers in the legend and in the stacks. Must contain all the observed answers.
    pub answer_sort: Option<Vec<String>>,
}

impl Default for QuestionOptions {
    fn default() -> Self {
        QuestionOptions {
            prop: true,
            answer_sort: None,
        }
    }
}

/// Registrations and attendance (and optionally Q&A questions) across meetings.
pub fn plot_attendance(
    meetings: &Table<MeetingRecord>,
    options: &AttendanceOptions,
) -> ReportResult<Figure> {
    let mut series: Vec<Vec<f64>> = vec![
        meetings.iter().map(|m| m.registered as f64).collect(),
        meetings.iter().map(|m| m.attended as f64).collect(),
    ];
    if options.questions {
        series.push(meetings.iter().map(|m| m.questions as f64).collect());
    }
    ensure!(
        options.legend.len() >= series.len(),
        LegendTooShortSnafu {
            labels: options.legend.len(),
            series: series.len(),
        }
    );

    let dates: Vec<String> = meetings.iter().map(|m| m.date_str.clone()).collect();
    let max_registered = meetings.iter().map(|m| m.registered).max().unwrap_or(0);

    let mut fig = Figure::new(&options.title, 700, 400, &dates);
    let colors = Palette::Set1.colors(series.len());
    for ((ys, color), label) in series.iter().zip(colors.iter()).zip(options.legend.iter()) {
        fig.add_line_with_markers(&dates, ys, color, label);
    }
    fig.x_axis_label = Some("Meeting Date".to_string());
    fig.y_axis_label = Some("Count".to_string());
    fig.y_range = Some((0.0, max_registered as f64 + 10.0));
    fig.legend.location = Anchor::TopLeft;
    Ok(fig)
}

/// The answers to one question over time, one line per answer.
pub fn plot_question(
    data: &[DatedAnswerCount],
    question: &str,
    options: &QuestionOptions,
) -> ReportResult<Figure> {
    let pivot = AnswerPivot::build(data, question, options.prop);
    let answers = resolve_answer_order(question, &pivot.answers, options.answer_sort.as_deref())?;

    let mut fig = Figure::new(question, 600, 400, &pivot.dates);
    let colors = Palette::Set2.colors(answers.len());
    for (answer, color) in answers.iter().zip(colors.iter()) {
        fig.add_line_with_markers(&pivot.dates, &pivot.column(answer), color, answer);
    }
    Ok(fig)
}

/// The answers to one question over time, as stacked bars.
pub fn plot_question_stacked(
    data: &[DatedAnswerCount],
    question: &str,
    options: &QuestionOptions,
) -> ReportResult<Figure> {
    let pivot = AnswerPivot::build(data, question, options.prop);
    let answers = resolve_answer_order(question, &pivot.answers, options.answer_sort.as_deref())?;

    let title = truncate_label(question, TITLE_BUDGET);
    let mut fig = Figure::new(&title, 700, 400, &pivot.dates);
    fig.toolbar_location = Anchor::Left;
    fig.legend.location = Anchor::Center;
    fig.legend.panel = Anchor::Right;

    let colors = Palette::Set2.colors(answers.len());
    let mut bottom: Vec<f64> = vec![0.0; pivot.dates.len()];
    for (answer, color) in answers.iter().zip(colors.iter()) {
        let top: Vec<f64> = bottom
            .iter()
            .zip(pivot.column(answer).iter())
            .map(|(b, v)| b + v)
            .collect();
        let idx = fig.add_glyph(Glyph::VBar {
            name: answer.clone(),
            x: pivot.dates.clone(),
            bottom: bottom.clone(),
            top: top.clone(),
            width: 0.4,
            color: color.clone(),
        });
        fig.legend.items.push(LegendItem {
            label: truncate_label(answer, LEGEND_BUDGET),
            renderers: vec![idx],
        });
        bottom = top;
    }
    Ok(fig)
}

/// Shortens a label for display. Longer labels keep `budget + 1` characters followed by `...`.
pub fn truncate_label(text: &str, budget: usize) -> String {
    if text.chars().count() > budget {
        let head: String = text.chars().take(budget + 1).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// The order in which answers are drawn: the caller's order if given, else the observed one.
///
/// A caller order that leaves out an observed answer is rejected, since the series would be
/// silently dropped.
pub fn resolve_answer_order(
    question: &str,
    observed: &[String],
    answer_sort: Option<&[String]>,
) -> ReportResult<Vec<String>> {
    match answer_sort {
        None => Ok(observed.to_vec()),
        Some(order) => {
            ensure!(
                observed.iter().all(|a| order.contains(a)),
                IncompleteAnswerSortSnafu {
                    question,
                    answers: observed.to_vec(),
                }
            );
            Ok(order.to_vec())
        }
    }
}

/// The values of one question, with one row per display date and one column per answer.
#[derive(PartialEq, Debug, Clone)]
pub struct AnswerPivot {
    /// Display dates, in meeting order
    pub dates: Vec<String>,
    /// Observed answers, in order of appearance
    pub answers: Vec<String>,
    columns: HashMap<String, Vec<f64>>,
}

impl AnswerPivot {
    /// Pivots the counts of a question. Values are percentages when `prop` is set, counts otherwise.
    ///
    /// Several meetings on the same display date are averaged. Missing cells are 0.
    pub fn build(data: &[DatedAnswerCount], question: &str, prop: bool) -> AnswerPivot {
        let mut rows: Vec<&DatedAnswerCount> =
            data.iter().filter(|d| d.question == question).collect();

        let mut answers: Vec<String> = Vec::new();
        for r in rows.iter() {
            if !answers.contains(&r.answer) {
                answers.push(r.answer.clone());
            }
        }

        rows.sort_by_key(|r| r.datetime);
        let mut dates: Vec<String> = Vec::new();
        for r in rows.iter() {
            if !dates.contains(&r.date_str) {
                dates.push(r.date_str.clone());
            }
        }
        let date_idx: HashMap<&str, usize> = dates
            .iter()
            .enumerate()
            .map(|(idx, d)| (d.as_str(), idx))
            .collect();

        let mut sums: HashMap<&str, Vec<(f64, u32)>> = HashMap::new();
        for r in rows.iter() {
            let v = if prop { r.prop * 100.0 } else { r.count as f64 };
            let cells = sums
                .entry(r.answer.as_str())
                .or_insert_with(|| vec![(0.0, 0); dates.len()]);
            let cell = &mut cells[date_idx[r.date_str.as_str()]];
            cell.0 += v;
            cell.1 += 1;
        }
        let columns: HashMap<String, Vec<f64>> = sums
            .into_iter()
            .map(|(answer, cells)| {
                let values = cells
                    .iter()
                    .map(|(s, n)| if *n == 0 { 0.0 } else { s / *n as f64 })
                    .collect();
                (answer.to_string(), values)
            })
            .collect();

        debug!(
            "AnswerPivot::build: {:?}: {} dates, answers {:?}",
            question,
            dates.len(),
            answers
        );
        AnswerPivot {
            dates,
            answers,
            columns,
        }
    }

    /// The values of an answer for every date. Answers that were never given are all zeros.
    pub fn column(&self, answer: &str) -> Vec<f64> {
        self.columns
            .get(answer)
            .cloned()
            .unwrap_or_else(|| vec![0.0; self.dates.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::ReportError;
    use chrono::NaiveDate;

    fn dated(day: u32, question: &str, answer: &str, count: u64, responses: u64) -> DatedAnswerCount {
        DatedAnswerCount {
            meeting_id: format!("m{}", day),
            datetime: NaiveDate::from_ymd_opt(2020, 3, day)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            date_str: format!("{:02}.03.", day),
            question: question.to_string(),
            answer: answer.to_string(),
            count,
            prop: count as f64 / responses as f64,
            responses,
        }
    }

    fn meeting(day: u32, registered: u64, attended: u64, questions: u64) -> MeetingRecord {
        MeetingRecord {
            topic: "Sync".to_string(),
            meeting_id: format!("m{}", day),
            datetime: NaiveDate::from_ymd_opt(2020, 3, day)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            duration: 60,
            registered,
            attended,
            attendance_rate: attended as f64 / registered as f64,
            questions,
            date_str: format!("{:02}.03.", day),
        }
    }

    fn sample() -> Vec<DatedAnswerCount> {
        vec![
            dated(10, "Q", "A", 1, 4),
            dated(10, "Q", "B", 3, 4),
            dated(3, "Q", "A", 2, 2),
            dated(3, "Other", "Z", 1, 1),
        ]
    }

    fn strings(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn attendance() {
        let meetings = Table::new(vec![meeting(3, 40, 31, 5), meeting(10, 52, 40, 2)]);
        let fig = plot_attendance(&meetings, &AttendanceOptions::default()).unwrap();
        assert_eq!(fig.title, "Meeting Attendance");
        assert_eq!((fig.width, fig.height), (700, 400));
        assert_eq!(fig.x_range, strings(&["03.03.", "10.03."]));
        assert_eq!(fig.y_range, Some((0.0, 62.0)));
        assert_eq!(fig.renderers.len(), 4);
        assert_eq!(fig.legend.location, Anchor::TopLeft);
        let labels: Vec<&str> = fig.legend.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Registered", "Attended"]);
        match &fig.renderers[2] {
            Glyph::Line { y, color, .. } => {
                assert_eq!(y, &vec![31.0, 40.0]);
                assert_eq!(color, "#377eb8");
            }
            g => panic!("unexpected glyph {:?}", g),
        }

        let with_questions = AttendanceOptions {
            questions: true,
            ..AttendanceOptions::default()
        };
        let fig = plot_attendance(&meetings, &with_questions).unwrap();
        assert_eq!(fig.legend.items.len(), 3);
        assert_eq!(fig.legend.items[2].label, "Questions");
    }

    #[test]
    fn attendance_legend_too_short() {
        let meetings = Table::new(vec![meeting(3, 40, 31, 5)]);
        let options = AttendanceOptions {
            questions: true,
            title: "T".to_string(),
            legend: strings(&["R", "A"]),
        };
        assert!(matches!(
            plot_attendance(&meetings, &options),
            Err(ReportError::LegendTooShort {
                labels: 2,
                series: 3
            })
        ));
    }

    #[test]
    fn attendance_without_meetings() {
        let fig = plot_attendance(&Table::empty(), &AttendanceOptions::default()).unwrap();
        assert!(fig.x_range.is_empty());
        assert_eq!(fig.y_range, Some((0.0, 10.0)));
    }

    #[test]
    fn pivot_fills_missing_answers() {
        let pivot = AnswerPivot::build(&sample(), "Q", true);
        assert_eq!(pivot.dates, strings(&["03.03.", "10.03."]));
        assert_eq!(pivot.answers, strings(&["A", "B"]));
        assert_eq!(pivot.column("A"), vec![100.0, 25.0]);
        assert_eq!(pivot.column("B"), vec![0.0, 75.0]);
        assert_eq!(pivot.column("never"), vec![0.0, 0.0]);

        let counts = AnswerPivot::build(&sample(), "Q", false);
        assert_eq!(counts.column("B"), vec![0.0, 3.0]);
    }

    #[test]
    fn pivot_averages_same_date() {
        let mut data = sample();
        let mut again = dated(10, "Q", "A", 3, 4);
        again.meeting_id = "other".to_string();
        data.push(again);
        let pivot = AnswerPivot::build(&data, "Q", false);
        assert_eq!(pivot.column("A"), vec![2.0, 2.0]);
    }

    #[test]
    fn lines_per_answer() {
        let fig = plot_question(&sample(), "Q", &QuestionOptions::default()).unwrap();
        assert_eq!(fig.title, "Q");
        assert_eq!((fig.width, fig.height), (600, 400));
        assert_eq!(fig.renderers.len(), 4);
        let labels: Vec<&str> = fig.legend.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B"]);

        let ordered = QuestionOptions {
            prop: false,
            answer_sort: Some(strings(&["B", "A"])),
        };
        let fig = plot_question(&sample(), "Q", &ordered).unwrap();
        match &fig.renderers[0] {
            Glyph::Line { y, color, .. } => {
                assert_eq!(y, &vec![0.0, 3.0]);
                assert_eq!(color, "#66c2a5");
            }
            g => panic!("unexpected glyph {:?}", g),
        }
    }

    #[test]
    fn stacked_bars() {
        let options = QuestionOptions {
            prop: true,
            answer_sort: Some(strings(&["B", "A", "C"])),
        };
        let fig = plot_question_stacked(&sample(), "Q", &options).unwrap();
        assert_eq!(fig.toolbar_location, Anchor::Left);
        assert_eq!(fig.legend.panel, Anchor::Right);
        assert_eq!(fig.renderers.len(), 3);
        let tops: Vec<Vec<f64>> = fig
            .renderers
            .iter()
            .map(|g| match g {
                Glyph::VBar { top, .. } => top.clone(),
                g => panic!("unexpected glyph {:?}", g),
            })
            .collect();
        assert_eq!(tops, vec![vec![0.0, 75.0], vec![100.0, 100.0], vec![100.0, 100.0]]);
        match &fig.renderers[1] {
            Glyph::VBar { bottom, width, .. } => {
                assert_eq!(bottom, &vec![0.0, 75.0]);
                assert_eq!(*width, 0.4);
            }
            g => panic!("unexpected glyph {:?}", g),
        }
    }

    #[test]
    fn answer_sort_must_cover_observed_answers() {
        let options = QuestionOptions {
            prop: true,
            answer_sort: Some(strings(&["A"])),
        };
        let res = plot_question_stacked(&sample(), "Q", &options);
        match res {
            Err(ReportError::IncompleteAnswerSort { question, answers }) => {
                assert_eq!(question, "Q");
                assert_eq!(answers, strings(&["A", "B"]));
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert!(plot_question(&sample(), "Q", &options).is_err());
    }

    #[test]
    fn long_labels_are_truncated_for_display() {
        let question = "x".repeat(70);
        let answer = "é".repeat(40);
        let data = vec![dated(3, &question, &answer, 1, 1)];
        let fig = plot_question_stacked(&data, &question, &QuestionOptions::default()).unwrap();
        assert_eq!(fig.title, format!("{}...", "x".repeat(61)));
        assert_eq!(fig.legend.items[0].label, format!("{}...", "é".repeat(36)));
        match &fig.renderers[0] {
            Glyph::VBar { name, .. } => assert_eq!(name, &answer),
            g => panic!("unexpected glyph {:?}", g),
        }
        assert_eq!(truncate_label("short", TITLE_BUDGET), "short");
        assert_eq!(truncate_label(&"y".repeat(60), TITLE_BUDGET), "y".repeat(60));
    }

    #[test]
    fn figures_serialize() {
        let fig = plot_question_stacked(&sample(), "Q", &QuestionOptions::default()).unwrap();
        let js = fig.to_json().unwrap();
        assert_eq!(js["title"], "Q");
        assert_eq!(js["renderers"][0]["type"], "v_bar");
        assert_eq!(js["legend"]["panel"], "right");
        assert_eq!(js["toolbar_location"], "left");
    }
}

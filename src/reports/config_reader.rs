use crate::args::Args;
use crate::reports::{
    chart::{AttendanceOptions, QuestionOptions},
    corpus::ErrorPolicy,
    io_common::DEFAULT_DATE_FORMAT,
    *,
};

/// Value of `--out` (or `outputDirectory`) that prints the summary instead of writing files.
pub const STDOUT: &str = "stdout";

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceSettings {
    pub title: Option<String>,
    pub legend: Option<Vec<String>>,
    pub questions: Option<bool>,
}

impl AttendanceSettings {
    pub fn options(&self) -> AttendanceOptions {
        let default = AttendanceOptions::default();
        AttendanceOptions {
            questions: self.questions.unwrap_or(default.questions),
            title: self.title.clone().unwrap_or(default.title),
            legend: self.legend.clone().unwrap_or(default.legend),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSettings {
    pub question: String,
    pub prop: Option<bool>,
    pub stacked: Option<bool>,
    #[serde(rename = "answerSort")]
    pub answer_sort: Option<Vec<String>>,
}

impl QuestionSettings {
    pub fn new(question: &str) -> QuestionSettings {
        QuestionSettings {
            question: question.to_string(),
            prop: None,
            stacked: None,
            answer_sort: None,
        }
    }

    pub fn options(&self) -> QuestionOptions {
        QuestionOptions {
            prop: self.prop.unwrap_or(true),
            answer_sort: self.answer_sort.clone(),
        }
    }

    pub fn is_stacked(&self) -> bool {
        self.stacked.unwrap_or(false)
    }
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(rename = "inputDirectory")]
    pub input_directory: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "dateFormat")]
    pub date_format: Option<String>,
    #[serde(rename = "skipInvalidFiles")]
    pub skip_invalid_files: Option<bool>,
    pub attendance: Option<AttendanceSettings>,
    pub questions: Option<Vec<QuestionSettings>>,
}

/// Everything a run needs, once the command line and the configuration file are merged.
#[derive(PartialEq, Debug, Clone)]
pub struct RunSettings {
    pub input: PathBuf,
    /// Folder for the tables and the figures. The summary goes to stdout when absent.
    pub output: Option<PathBuf>,
    pub date_format: String,
    pub error_policy: ErrorPolicy,
    pub attendance: AttendanceOptions,
    /// The question charts. Every observed question gets a line chart when absent.
    pub questions: Option<Vec<QuestionSettings>>,
    pub reference: Option<PathBuf>,
}

pub fn read_config(path: &Path) -> ReportResult<ReportConfig> {
    let p = path.display().to_string();
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path: &p })?;
    let config: ReportConfig =
        serde_json::from_str(&contents).context(ParsingJsonSnafu { path: &p })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &Path) -> ReportResult<JSValue> {
    let p = path.display().to_string();
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path: &p })?;
    let js: JSValue = serde_json::from_str(&contents).context(ParsingJsonSnafu { path: &p })?;
    Ok(js)
}

/// Merges the command line with the configuration file, if any.
///
/// Command line options take precedence. The folders of the configuration file are relative
/// to the file itself.
pub fn resolve_settings(args: &Args) -> ReportResult<RunSettings> {
    let (config, root) = match &args.config {
        Some(config_path) => {
            let path = Path::new(config_path);
            let config = read_config(path)?;
            let root = path.parent().map(|p| p.to_path_buf()).unwrap_or_default();
            (config, root)
        }
        None => (ReportConfig::default(), PathBuf::new()),
    };

    let input = match (&args.input, &config.input_directory) {
        (Some(i), _) => PathBuf::from(i),
        (None, Some(i)) => root.join(i),
        (None, None) => PathBuf::from("."),
    };

    let output = match (&args.out, &config.output_directory) {
        (Some(o), _) if o == STDOUT => None,
        (Some(o), _) => Some(PathBuf::from(o)),
        (None, Some(o)) if o == STDOUT => None,
        (None, Some(o)) => Some(root.join(o)),
        (None, None) => None,
    };

    let date_format = args
        .date_format
        .clone()
        .or_else(|| config.date_format.clone())
        .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string());

    let error_policy = if args.skip_invalid || config.skip_invalid_files.unwrap_or(false) {
        ErrorPolicy::SkipInvalid
    } else {
        ErrorPolicy::FailFast
    };

    let mut attendance = config
        .attendance
        .as_ref()
        .map(|a| a.options())
        .unwrap_or_default();
    if args.questions {
        attendance.questions = true;
    }

    let res = RunSettings {
        input,
        output,
        date_format,
        error_policy,
        attendance,
        questions: config.questions.clone(),
        reference: args.reference.as_ref().map(PathBuf::from),
    };
    info!("resolve_settings: {:?}", res);
    Ok(res)
}

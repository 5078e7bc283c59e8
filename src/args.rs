use clap::Parser;

/// Attendance and poll trends from the reports exported by Zoom.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (folder, default '.') The folder containing the '... Performance Report.csv' and
    /// '... Poll Report.csv' files. Setting this option overrides the inputDirectory of the configuration.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (file path, optional) A JSON file describing the charts to produce and where to write them.
    /// Relative folders in this file are relative to the file itself.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (folder, 'stdout' or empty) If a folder is given, the tables are written there in CSV format
    /// and the charts in JSON format. Otherwise the summary of the reports is printed in JSON format.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (default %d.%m.) The strftime pattern of the meeting dates on the charts.
    #[clap(long, value_parser)]
    pub date_format: Option<String>,

    /// If passed as an argument, the number of Q&A questions is added to the attendance chart.
    #[clap(long, takes_value = false)]
    pub questions: bool,

    /// If passed as an argument, reports that cannot be read are skipped instead of stopping the run.
    #[clap(long, takes_value = false)]
    pub skip_invalid: bool,

    /// (file path) A reference summary in JSON format. If provided, zoomrep will check that the
    /// computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}

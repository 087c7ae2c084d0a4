//! Command-line arguments and the requests they turn into

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use stadix_client::{AnovaRequest, SampleSizeRequest, StatRequest, UploadKind};
use stadix_core::{FrequencyChart, Screen};
use stadix_io::{
    parse_matrix, parse_mixed, parse_numbers, parse_scalar, CsvColumns, InputError, UploadFile,
};

use crate::error::{CliError, CliResult};

#[derive(Debug, Clone, Parser)]
#[command(name = "stadix", author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the statistics service
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Config file to read instead of the default one
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print the raw result as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Capture the result and write a report bundle into DIR
    #[arg(long, global = true, value_name = "DIR")]
    pub report: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Descriptive statistics and frequency table
    Describe(DescribeArgs),
    /// Linear regression and Pearson correlation
    Regress(RegressArgs),
    /// One-sample or two-sample t test
    TTest(TTestArgs),
    /// One-way analysis of variance
    Anova(AnovaArgs),
    /// Chi-square test of independence
    ChiSquare(ChiSquareArgs),
    /// Sample size for estimating a proportion
    SampleSize(SampleSizeArgs),
    /// Binomial probability P(X = k)
    Binomial(BinomialArgs),
    /// Poisson probability P(X = k)
    Poisson(PoissonArgs),
    /// Normal probability P(X <= x)
    Normal(NormalArgs),
    /// Classify a variable as qualitative or quantitative
    Classify(#[clap(flatten)] DataArgs),
    /// Inspect the client configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Print the resolved configuration as TOML
    Show,
}

#[derive(Debug, Clone, Default, Args)]
pub struct DataArgs {
    /// Comma-separated values, e.g. "10, 12, 23"
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,

    /// Read the values from a file
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct DescribeArgs {
    #[clap(flatten)]
    pub data: DataArgs,

    /// Chart drawn for the frequency table in reports
    #[arg(long, value_enum, default_value_t = ChartKind::Bar)]
    pub chart: ChartKind,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartKind {
    /// Histogram bars
    #[default]
    Bar,
    /// Frequency polygon
    Line,
    /// Share of each class
    Pie,
}

impl From<ChartKind> for FrequencyChart {
    fn from(kind: ChartKind) -> Self {
        match kind {
            ChartKind::Bar => FrequencyChart::Bars,
            ChartKind::Line => FrequencyChart::Polygon,
            ChartKind::Pie => FrequencyChart::Pie,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct RegressArgs {
    /// Independent variable values
    #[arg(long, requires = "y", conflicts_with = "file")]
    pub x: Option<String>,

    /// Dependent variable values
    #[arg(long, requires = "x")]
    pub y: Option<String>,

    /// Spreadsheet with the X and Y columns (csv, xls, xlsx)
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct TTestArgs {
    /// Sample for a one-sample test
    #[arg(long, conflicts_with_all = ["group1", "group2"])]
    pub data: Option<String>,

    /// Hypothesized population mean
    #[arg(long, value_parser = scalar)]
    pub mu: Option<f64>,

    /// First group for an independent-samples test
    #[arg(long, requires = "group2")]
    pub group1: Option<String>,

    /// Second group for an independent-samples test
    #[arg(long, requires = "group1")]
    pub group2: Option<String>,

    /// CSV file: one column with --mu, otherwise two groups
    #[arg(long, conflicts_with_all = ["data", "group1"])]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct AnovaArgs {
    /// One group of values; repeat for each group
    #[arg(long = "group", value_name = "VALUES")]
    pub groups: Vec<String>,

    /// CSV file with one group per column
    #[arg(long, conflicts_with = "groups")]
    pub file: Option<PathBuf>,

    /// Number of columns to read from the file
    #[arg(long, default_value_t = AnovaRequest::MIN_GROUPS)]
    pub columns: usize,
}

#[derive(Debug, Clone, Args)]
pub struct ChiSquareArgs {
    /// Observed counts, rows separated by ';' (e.g. "10,20;30,40")
    #[arg(long, conflicts_with = "file")]
    pub matrix: Option<String>,

    /// Text or CSV file with one row per line
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct SampleSizeArgs {
    /// Confidence level in percent
    #[arg(long, default_value = "95", value_parser = scalar)]
    pub confidence: f64,

    /// Margin of error in percent
    #[arg(long, default_value = "5", value_parser = scalar)]
    pub margin: f64,

    /// Expected proportion of success
    #[arg(long, default_value_t = SampleSizeRequest::DEFAULT_P, value_parser = scalar)]
    pub p: f64,

    /// Population size, if finite
    #[arg(long, value_parser = scalar)]
    pub population: Option<f64>,
}

#[derive(Debug, Clone, Args)]
pub struct BinomialArgs {
    /// Number of trials
    #[arg(short, long)]
    pub n: u64,
    /// Probability of success
    #[arg(short, long, value_parser = scalar)]
    pub p: f64,
    /// Number of successes
    #[arg(short, long)]
    pub k: u64,
}

#[derive(Debug, Clone, Args)]
pub struct PoissonArgs {
    /// Mean number of events
    #[arg(short, long, value_parser = scalar)]
    pub lambda: f64,
    /// Number of events
    #[arg(short, long)]
    pub k: u64,
}

#[derive(Debug, Clone, Args)]
pub struct NormalArgs {
    #[arg(long, value_parser = scalar, allow_hyphen_values = true)]
    pub mean: f64,
    /// Standard deviation
    #[arg(long = "std", value_parser = scalar)]
    pub std_dev: f64,
    #[arg(short, long, value_parser = scalar, allow_hyphen_values = true)]
    pub x: f64,
}

/// What a command asks the workspace to do
#[derive(Debug, Clone)]
pub enum Job {
    Send { screen: Screen, request: StatRequest },
    Upload { kind: UploadKind, file: UploadFile },
    ShowConfig,
}

impl Job {
    /// Screen whose panel receives the result
    pub fn screen(&self) -> Option<Screen> {
        match self {
            Job::Send { screen, .. } => Some(*screen),
            Job::Upload { kind, .. } => Some(Screen::for_operation(kind.operation())),
            Job::ShowConfig => None,
        }
    }
}

impl Command {
    /// Frequency chart requested for the descriptive screen
    pub fn frequency_chart(&self) -> Option<FrequencyChart> {
        match self {
            Command::Describe(args) => Some(args.chart.into()),
            _ => None,
        }
    }

    /// Collect and validate the input for this command
    pub fn job(&self) -> CliResult<Job> {
        let request = match self {
            Command::Describe(DescribeArgs { data: args, .. }) => match (&args.data, &args.file) {
                (_, Some(path)) => return upload(UploadKind::Descriptive, path),
                (Some(text), None) => StatRequest::descriptive(numbers(text))?,
                (None, None) => return Err(missing("--data or --file")),
            },
            Command::Regress(args) => match (&args.x, &args.y, &args.file) {
                (_, _, Some(path)) => return upload(UploadKind::Regression, path),
                (Some(x), Some(y), None) => StatRequest::regression(numbers(x), numbers(y))?,
                _ => return Err(missing("--x and --y, or --file")),
            },
            Command::TTest(args) => t_test(args)?,
            Command::Anova(args) => {
                let groups = match &args.file {
                    Some(path) => CsvColumns::read(path, args.columns)?.columns,
                    None if args.groups.is_empty() => return Err(missing("--group or --file")),
                    None => args.groups.iter().map(|g| numbers(g)).collect(),
                };
                StatRequest::anova(groups)?
            }
            Command::ChiSquare(args) => {
                let text = match (&args.matrix, &args.file) {
                    (_, Some(path)) => read_text(path)?,
                    (Some(matrix), None) => matrix.replace(';', "\n"),
                    (None, None) => return Err(missing("--matrix or --file")),
                };
                StatRequest::chi_square(parse_matrix(&text)?)?
            }
            Command::SampleSize(args) => StatRequest::SampleSize(SampleSizeRequest::from_percentages(
                args.confidence,
                args.margin,
                args.p,
                args.population,
            )?),
            Command::Binomial(args) => StatRequest::binomial(args.n, args.p, args.k)?,
            Command::Poisson(args) => StatRequest::poisson(args.lambda, args.k)?,
            Command::Normal(args) => StatRequest::normal(args.mean, args.std_dev, args.x)?,
            Command::Classify(args) => {
                let text = match (&args.data, &args.file) {
                    (_, Some(path)) => read_text(path)?.replace('\n', ","),
                    (Some(text), None) => text.clone(),
                    (None, None) => return Err(missing("--data or --file")),
                };
                StatRequest::classify(parse_mixed(&text))?
            }
            Command::Config { action: ConfigAction::Show } => return Ok(Job::ShowConfig),
        };

        let screen = Screen::for_operation(request.operation());
        Ok(Job::Send { screen, request })
    }
}

fn t_test(args: &TTestArgs) -> CliResult<StatRequest> {
    if let Some(path) = &args.file {
        return Ok(match args.mu {
            Some(mu) => StatRequest::t_test_one_sample(CsvColumns::read(path, 1)?.into_single(), mu)?,
            None => {
                let (group1, group2) = CsvColumns::read(path, 2)?.into_pair()?;
                StatRequest::t_test_independent(group1, group2)?
            }
        });
    }

    match (&args.data, &args.group1, &args.group2) {
        (Some(data), _, _) => {
            let mu = args.mu.ok_or_else(|| missing("--mu"))?;
            Ok(StatRequest::t_test_one_sample(numbers(data), mu)?)
        }
        (None, Some(group1), Some(group2)) => Ok(StatRequest::t_test_independent(
            numbers(group1),
            numbers(group2),
        )?),
        _ => Err(missing("--data with --mu, or --group1 and --group2")),
    }
}

fn upload(kind: UploadKind, path: &Path) -> CliResult<Job> {
    let file = UploadFile::open(path)?;
    Ok(Job::Upload { kind, file })
}

fn numbers(text: &str) -> Vec<f64> {
    parse_numbers(text).into_values()
}

fn read_text(path: &Path) -> CliResult<String> {
    if !path.exists() {
        return Err(InputError::FileNotFound(path.display().to_string()).into());
    }
    std::fs::read_to_string(path).map_err(|e| InputError::ReadFailed(e.to_string()).into())
}

fn missing(what: &str) -> CliError {
    CliError::Usage(format!("Provide {what}"))
}

fn scalar(text: &str) -> Result<f64, String> {
    parse_scalar(text, "value").map_err(|e| e.to_string())
}

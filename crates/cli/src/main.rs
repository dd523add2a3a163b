use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use data_loader::{parser, ColumnNames, InteractionFrame, RatingScale, RatingStats, Trainset};
use evaluation::{RankingReport, RatingReport};
use pipeline::{compute_ranking_predictions, compute_rating_predictions, ColumnConfig};
use scoring::{Fit, MeanBaseline};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// reco-eval - rating and ranking predictions over interaction tables
#[derive(Parser)]
#[command(name = "reco-eval")]
#[command(about = "Produce and evaluate rating/ranking predictions", long_about = None)]
struct Cli {
    /// Layout of every input file
    #[arg(long, value_enum, default_value_t = FileFormat::Csv, global = true)]
    format: FileFormat,

    /// Name of the user column
    #[arg(long, default_value = data_loader::DEFAULT_USER_COL, global = true)]
    user_col: String,

    /// Name of the item column
    #[arg(long, default_value = data_loader::DEFAULT_ITEM_COL, global = true)]
    item_col: String,

    /// Name of the rating column
    #[arg(long, default_value = data_loader::DEFAULT_RATING_COL, global = true)]
    rating_col: String,

    /// Name of the prediction column
    #[arg(long, default_value = data_loader::DEFAULT_PREDICTION_COL, global = true)]
    prediction_col: String,

    /// Lowest valid rating
    #[arg(long, default_value = "1", global = true)]
    rating_min: f64,

    /// Highest valid rating
    #[arg(long, default_value = "5", global = true)]
    rating_max: f64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum FileFormat {
    /// userId::movieId::rating::timestamp, no header
    Movielens,
    /// Comma separated with header
    Csv,
    /// Tab separated with header
    Tsv,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Score the observed pairs
    Rating,
    /// Score the user x item cross product
    Ranking,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a summary of a ratings file
    Inspect {
        /// Ratings file
        #[arg(long)]
        ratings: PathBuf,
    },

    /// Fit the mean baseline on a ratings file and write predictions as CSV
    Predict {
        /// Ratings file used for fitting and as prediction input
        #[arg(long)]
        ratings: PathBuf,

        /// Which prediction table to produce
        #[arg(long, value_enum, default_value_t = Mode::Rating)]
        mode: Mode,

        /// Keep already observed pairs in ranking mode
        #[arg(long)]
        recommend_seen: bool,

        /// Damping added to the baseline's bias denominators
        #[arg(long, default_value = "0")]
        damping: f64,

        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Compute rating and ranking metrics for a prediction file
    Evaluate {
        /// Ratings file with the true ratings
        #[arg(long)]
        truth: PathBuf,

        /// Prediction file (CSV with header)
        #[arg(long)]
        predictions: PathBuf,

        /// Cutoff for ranking metrics
        #[arg(long, default_value = "10")]
        k: usize,

        /// Print the reports as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let columns = ColumnConfig::default()
        .with_user_col(cli.user_col.as_str())
        .with_item_col(cli.item_col.as_str())
        .with_rating_col(cli.rating_col.as_str())
        .with_prediction_col(cli.prediction_col.as_str());
    let scale = RatingScale::try_new(cli.rating_min, cli.rating_max)
        .context("Invalid --rating-min/--rating-max")?;

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Inspect { ratings } => handle_inspect(&ratings, cli.format, &columns, scale)?,
        Commands::Predict {
            ratings,
            mode,
            recommend_seen,
            damping,
            output,
        } => handle_predict(
            &ratings,
            cli.format,
            &columns,
            scale,
            mode,
            recommend_seen,
            damping,
            output.as_deref(),
        )?,
        Commands::Evaluate {
            truth,
            predictions,
            k,
            json,
        } => handle_evaluate(&truth, &predictions, cli.format, &columns, k, json)?,
    }

    Ok(())
}

/// Load a ratings file in the requested layout
fn load_frame(path: &Path, format: FileFormat, columns: &ColumnConfig) -> Result<InteractionFrame> {
    let start = Instant::now();
    let frame = match format {
        FileFormat::Movielens => {
            let names = ColumnNames {
                user: columns.user_col.clone(),
                item: columns.item_col.clone(),
                rating: columns.rating_col.clone(),
                ..ColumnNames::default()
            };
            parser::parse_movielens_ratings(path, &names)
        }
        FileFormat::Csv => parser::parse_delimited(path, b','),
        FileFormat::Tsv => parser::parse_delimited(path, b'\t'),
    }
    .with_context(|| format!("Failed to load {}", path.display()))?;

    info!(
        "Loaded {} rows from {} in {:?}",
        frame.num_rows(),
        path.display(),
        start.elapsed()
    );
    Ok(frame)
}

fn build_trainset(
    frame: &InteractionFrame,
    columns: &ColumnConfig,
    scale: RatingScale,
) -> Result<Trainset> {
    Trainset::from_frame(
        frame,
        &columns.user_col,
        &columns.item_col,
        &columns.rating_col,
        scale,
    )
    .with_context(|| format!("Failed to build trainset (rating scale {} - {})", scale.min, scale.max))
}

/// Smallest, mean and largest rating count over a set of users or items
fn count_summary<'a>(stats: impl Iterator<Item = &'a RatingStats>) -> (u32, f64, u32) {
    let (mut min, mut max, mut total, mut n) = (u32::MAX, 0, 0u64, 0u64);
    for s in stats {
        min = min.min(s.count);
        max = max.max(s.count);
        total += s.count as u64;
        n += 1;
    }
    if n == 0 {
        return (0, 0.0, 0);
    }
    (min, total as f64 / n as f64, max)
}

/// Handle the 'inspect' command
fn handle_inspect(
    path: &Path,
    format: FileFormat,
    columns: &ColumnConfig,
    scale: RatingScale,
) -> Result<()> {
    let frame = load_frame(path, format, columns)?;
    let trainset = build_trainset(&frame, columns, scale)?;

    let cells = trainset.n_users() * trainset.n_items();
    let density = if cells > 0 {
        trainset.n_ratings() as f64 / cells as f64
    } else {
        0.0
    };
    let scale = trainset.rating_scale();

    println!("{}", format!("Ratings file: {}", path.display()).bold().blue());
    for name in frame.column_names() {
        println!("{}{}: {}", "• ".green(), name, frame.dtype(name)?);
    }
    println!("{}Users: {}", "• ".cyan(), trainset.n_users());
    println!("{}Items: {}", "• ".cyan(), trainset.n_items());
    println!("{}Ratings: {}", "• ".cyan(), trainset.n_ratings());
    println!("{}Density: {:.4}%", "• ".cyan(), density * 100.0);
    println!("{}Rating scale: {} - {}", "• ".cyan(), scale.min, scale.max);
    println!("{}Mean rating: {:.3}", "• ".cyan(), trainset.global_mean());

    let (min, mean, max) = count_summary((0..trainset.n_users()).filter_map(|u| trainset.user_stats(u)));
    println!("{}Ratings per user: min {}, mean {:.1}, max {}", "• ".cyan(), min, mean, max);
    let (min, mean, max) = count_summary((0..trainset.n_items()).filter_map(|i| trainset.item_stats(i)));
    println!("{}Ratings per item: min {}, mean {:.1}, max {}", "• ".cyan(), min, mean, max);

    let most_rated = (0..trainset.n_items())
        .filter_map(|i| trainset.item_stats(i).map(|stats| (i, stats)))
        .max_by_key(|(_, stats)| stats.count);
    if let Some((inner, stats)) = most_rated {
        if let Some(raw) = trainset.to_raw_item(inner) {
            println!(
                "{}Most rated item: {} ({} ratings, mean {:.3})",
                "• ".cyan(),
                raw,
                stats.count,
                stats.mean
            );
        }
    }
    Ok(())
}

/// Handle the 'predict' command
fn handle_predict(
    path: &Path,
    format: FileFormat,
    columns: &ColumnConfig,
    scale: RatingScale,
    mode: Mode,
    recommend_seen: bool,
    damping: f64,
    output: Option<&Path>,
) -> Result<()> {
    let frame = load_frame(path, format, columns)?;
    let trainset = build_trainset(&frame, columns, scale)?;

    let mut model = MeanBaseline::new().with_damping(damping)?;
    model.fit(&trainset).context("Failed to fit mean baseline")?;

    let start = Instant::now();
    let predictions = match mode {
        Mode::Rating => compute_rating_predictions(&model, &frame, columns)?,
        Mode::Ranking => compute_ranking_predictions(&model, &frame, columns, recommend_seen)?,
    };
    info!(
        "Produced {} predictions in {:?}",
        predictions.num_rows(),
        start.elapsed()
    );

    match output {
        Some(out) => {
            let file = File::create(out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
            let mut writer = BufWriter::new(file);
            parser::write_delimited(&predictions, &mut writer, b',')?;
            writer.flush()?;
            eprintln!(
                "{} Wrote {} predictions to {}",
                "✓".green(),
                predictions.num_rows(),
                out.display()
            );
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            parser::write_delimited(&predictions, &mut writer, b',')?;
            writer.flush()?;
        }
    }
    Ok(())
}

/// Handle the 'evaluate' command
fn handle_evaluate(
    truth_path: &Path,
    predictions_path: &Path,
    format: FileFormat,
    columns: &ColumnConfig,
    k: usize,
    json: bool,
) -> Result<()> {
    if k == 0 {
        bail!("--k must be at least 1");
    }
    let truth = load_frame(truth_path, format, columns)?;
    // Prediction files are CSV with inferred dtypes; align ids with the truth table
    let predictions = load_frame(predictions_path, FileFormat::Csv, columns)?
        .cast_column(&columns.user_col, truth.dtype(&columns.user_col)?)?
        .cast_column(&columns.item_col, truth.dtype(&columns.item_col)?)?;

    let rating = RatingReport::compute(&truth, &predictions, columns)
        .context("Failed to compute rating metrics")?;
    let ranking = RankingReport::compute(&truth, &predictions, columns, k)
        .context("Failed to compute ranking metrics")?;

    if json {
        let report = serde_json::json!({ "rating": rating, "ranking": ranking });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_reports(&rating, &ranking);
    Ok(())
}

/// Helper function to format and print both reports
fn print_reports(rating: &RatingReport, ranking: &RankingReport) {
    println!("{}", "Rating metrics:".bold().blue());
    println!("  RMSE:      {:.4}", rating.rmse);
    println!("  MAE:       {:.4}", rating.mae);
    println!("  R squared: {:.4}", rating.rsquared);
    println!("  Exp. var:  {:.4}", rating.exp_var);
    println!("  ({} joined pairs)", rating.n_pairs.to_string().green());

    println!("{}", format!("Ranking metrics @ {}:", ranking.k).bold().blue());
    println!("  Precision: {:.4}", ranking.precision_at_k);
    println!("  Recall:    {:.4}", ranking.recall_at_k);
    println!("  NDCG:      {:.4}", ranking.ndcg_at_k);
    println!("  MAP:       {:.4}", ranking.map_at_k);
    println!("  ({} users)", ranking.n_users.to_string().green());
}

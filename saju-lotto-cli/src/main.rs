mod display;
mod import;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};

use saju_lotto_core::calendar::{BirthInput, CalendarKind};
use saju_lotto_core::chart::ChartAnalysis;
use saju_lotto_core::config::{EngineConfig, WeightModel, load_config, save_config};
use saju_lotto_core::report::{ChartReport, PredictionReport};
use saju_lotto_core::selector::date_seed;
use saju_lotto_core::weights::{element_share, number_stats};
use saju_lotto_core::{derive_chart, historical_weights, predict_tickets};
use saju_lotto_db::db::{count_draws, db_path, fetch_last_draws, migrate, open_db};
use saju_lotto_db::rusqlite::Connection;

use crate::display::{
    display_chart, display_draws, display_import_summary, display_stats, display_tickets,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModelArg {
    Frequency,
    Ewma,
    Uniform,
}

#[derive(Parser)]
#[command(name = "saju-lotto", about = "Four pillars chart and element-weighted Lotto 6/45 numbers")]
struct Cli {
    /// Engine configuration file (JSON); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct BirthArgs {
    /// Birth year
    #[arg(long)]
    year: i32,

    /// Birth month
    #[arg(long)]
    month: u32,

    /// Birth day
    #[arg(long)]
    day: u32,

    /// Birth hour (0-23); noon when unknown
    #[arg(long)]
    hour: Option<u32>,

    /// Birth minute (0-59)
    #[arg(long)]
    minute: Option<u32>,

    /// The date is a lunar date
    #[arg(long)]
    lunar: bool,

    /// The lunar date lies in the leap month
    #[arg(long, requires = "lunar")]
    leap: bool,
}

impl BirthArgs {
    fn to_input(&self) -> BirthInput {
        BirthInput {
            year: self.year,
            month: self.month,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
            calendar: if self.lunar { CalendarKind::Lunar } else { CalendarKind::Solar },
            leap_month: self.leap,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Import draws from a CSV file (draw_no,date,n1..n6,bonus)
    Import {
        /// Path to the CSV file
        #[arg(short, long, default_value = "assets/lotto645.csv")]
        file: PathBuf,
    },

    /// Print the database path
    DbPath,

    /// List the latest draws
    List {
        /// Number of draws to show
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Show frequencies, gaps and element share
    Stats {
        /// Analysis window (number of draws)
        #[arg(short, long, default_value = "100")]
        window: u32,
    },

    /// Derive the four pillars chart
    Chart {
        #[command(flatten)]
        birth: BirthArgs,

        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Suggest numbers biased by the chart's dominant elements
    Predict {
        #[command(flatten)]
        birth: BirthArgs,

        /// Base weight model (overrides the config file)
        #[arg(short, long)]
        model: Option<ModelArg>,

        /// Model parameter (frequency: Dirichlet prior, ewma: decay)
        #[arg(short, long)]
        alpha: Option<f64>,

        /// Analysis window (number of draws)
        #[arg(short, long)]
        window: Option<u32>,

        /// Number of tickets
        #[arg(short, long, default_value = "1")]
        count: usize,

        /// Seed for reproducibility (defaults to today's date)
        #[arg(long)]
        seed: Option<u64>,

        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Write the default configuration to a file
    InitConfig {
        #[arg(short, long, default_value = "saju-lotto.json")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Cannot load config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Command::DbPath => {
            println!("{}", db_path().display());
            Ok(())
        }
        Command::InitConfig { output } => cmd_init_config(&output),
        Command::Chart { birth, json } => cmd_chart(&birth, json, &config),
        Command::Import { file } => cmd_import(&open_store()?, &file),
        Command::List { last } => cmd_list(&open_store()?, last),
        Command::Stats { window } => cmd_stats(&open_store()?, window),
        Command::Predict {
            birth,
            model,
            alpha,
            window,
            count,
            seed,
            json,
        } => {
            let config = override_selector(config, model, alpha, window)?;
            cmd_predict(&open_store()?, &birth, count, seed, json, &config)
        }
    }
}

fn open_store() -> Result<Connection> {
    let conn = open_db(&db_path())?;
    migrate(&conn)?;
    Ok(conn)
}

fn override_selector(
    mut config: EngineConfig,
    model: Option<ModelArg>,
    alpha: Option<f64>,
    window: Option<u32>,
) -> Result<EngineConfig> {
    let current = config.selector.model;
    config.selector.model = match (model, alpha) {
        (Some(ModelArg::Frequency), a) => WeightModel::Frequency { alpha: a.unwrap_or(1.0) },
        (Some(ModelArg::Ewma), a) => WeightModel::Ewma { alpha: a.unwrap_or(0.9) },
        (Some(ModelArg::Uniform), _) => WeightModel::Uniform,
        (None, Some(a)) => match current {
            WeightModel::Frequency { .. } => WeightModel::Frequency { alpha: a },
            WeightModel::Ewma { .. } => WeightModel::Ewma { alpha: a },
            WeightModel::Uniform => bail!("--alpha has no meaning for the uniform model"),
        },
        (None, None) => current,
    };
    if window.is_some() {
        config.selector.window = window;
    }
    config.validate()?;
    Ok(config)
}

fn model_label(model: WeightModel) -> String {
    match model {
        WeightModel::Frequency { alpha } => format!("Frequency α={}", alpha),
        WeightModel::Ewma { alpha } => format!("EWMA α={}", alpha),
        WeightModel::Uniform => "Uniform".to_string(),
    }
}

fn cmd_init_config(output: &Path) -> Result<()> {
    if output.exists() {
        bail!("{} already exists", output.display());
    }
    save_config(&EngineConfig::default(), output)?;
    println!("Default configuration written to {}", output.display());
    Ok(())
}

fn cmd_import(conn: &Connection, file: &Path) -> Result<()> {
    let result = import::import_csv(conn, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &Connection, last: u32) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Empty database. Run first: saju-lotto import");
        return Ok(());
    }
    let draws = fetch_last_draws(conn, last)?;
    display_draws(&draws);
    Ok(())
}

fn cmd_stats(conn: &Connection, window: u32) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Empty database. Run first: saju-lotto import");
        return Ok(());
    }
    let effective_window = window.min(n);
    let draws = fetch_last_draws(conn, effective_window)?;

    display_stats(&number_stats(&draws), &element_share(&draws), effective_window);
    Ok(())
}

fn analyze(birth: &BirthArgs, config: &EngineConfig) -> Result<ChartAnalysis> {
    let input = birth.to_input();
    derive_chart(&input, config)
        .with_context(|| format!("Cannot derive chart for {}-{}-{}", input.year, input.month, input.day))
}

fn cmd_chart(birth: &BirthArgs, json: bool, config: &EngineConfig) -> Result<()> {
    let analysis = analyze(birth, config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&ChartReport::from(&analysis))?);
    } else {
        display_chart(&analysis);
    }
    Ok(())
}

fn cmd_predict(
    conn: &Connection,
    birth: &BirthArgs,
    count: usize,
    seed: Option<u64>,
    json: bool,
    config: &EngineConfig,
) -> Result<()> {
    if count == 0 {
        bail!("--count must be at least 1");
    }
    let analysis = analyze(birth, config)?;

    let n = count_draws(conn)?;
    if n == 0 {
        log::warn!("Empty database, predicting without history");
    }
    let limit = config.selector.window.map_or(n, |w| w.min(n));
    let draws = fetch_last_draws(conn, limit)?;
    let historical = historical_weights(&draws, &config.selector)?;

    let seed = seed.unwrap_or_else(date_seed);
    let tickets = predict_tickets(&analysis.distribution, &historical, count, Some(seed), config)?;
    let label = model_label(config.selector.model);

    if json {
        let report = PredictionReport::new(&analysis, &tickets, &label, historical.draws_used)
            .context("No ticket generated")?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display_chart(&analysis);
        display_tickets(&tickets, &label);
    }
    Ok(())
}

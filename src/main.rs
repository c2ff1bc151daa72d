use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sensito::assets::{AssetCategory, AssetLoader};
use sensito::models::{AppConfig, ColorChannelSet, CurveKind, MeasurementSet};
use sensito::services::{
    load_measurement_file, record_lines, reference_files, CurveStore, DatePeriod, Evolution,
    HistoryAnalyzer, MeasurementCatalog,
};
use sensito_gamma::{GammaAnalyzer, GammaMethod, GammaReading, ALL_KEY, REF_KEY};

#[derive(Parser)]
#[command(name = "sensito")]
#[command(about = "Sensitometric gamma analysis for 21-step wedge measurements")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute gamma readings for a measurement file
    Gamma {
        /// Measurement file
        file: PathBuf,

        /// Reference file to compare against
        #[arg(short, long)]
        reference: Option<PathBuf>,

        /// Log-exposure increment per step (e.g. 0.15 or 0.20)
        #[arg(short, long)]
        step: Option<f64>,

        /// Channel letters to include, comma separated (default: all but v)
        #[arg(short, long, value_delimiter = ',')]
        channels: Vec<String>,

        /// Use the earlier max-slope gamma range search
        #[arg(long)]
        legacy: bool,
    },
    /// Show gamma and density drift across measurements
    History {
        /// Reference file (default: first file of the reference directory)
        #[arg(short, long)]
        reference: Option<PathBuf>,

        /// Measurement files (default: every file under the measures directory)
        files: Vec<PathBuf>,

        /// Measures directory to scan
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// List persisted measurements
    List {
        /// Measures directory to scan
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Case-insensitive text filter on the label
        #[arg(short, long, default_value = "")]
        search: String,

        /// Date filter: all, today, month or year
        #[arg(short, long, default_value = "all")]
        period: DatePeriod,
    },
    /// Read densitometer lines from stdin and save them as a measurement
    Capture {
        /// Measurement name
        #[arg(short, long)]
        name: String,

        /// Color mode: vrgb or vcmy
        #[arg(short, long)]
        mode: Option<String>,

        /// Output file (default: generated name in the measures directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Extract embedded assets to filesystem
    Init {
        /// Extract config.yaml
        #[arg(long)]
        config: bool,

        /// Extract sample measurement files into the measures directory
        #[arg(long)]
        samples: bool,

        /// Extract all assets
        #[arg(long)]
        all: bool,

        /// Overwrite existing files
        #[arg(long, short)]
        force: bool,

        /// List embedded assets without extracting
        #[arg(long)]
        list: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sensito=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let loader = AssetLoader::new(std::env::var("CONFIG_FILE").ok().map(PathBuf::from));
    let config = AppConfig::load_from_assets(&loader);

    match cli.command {
        Some(Commands::Gamma {
            file,
            reference,
            step,
            channels,
            legacy,
        }) => run_gamma_command(&config, &file, reference.as_deref(), step, &channels, legacy),
        Some(Commands::History {
            reference,
            files,
            dir,
        }) => run_history_command(&config, reference, &files, dir),
        Some(Commands::List {
            dir,
            search,
            period,
        }) => run_list_command(&config, dir, &search, period),
        Some(Commands::Capture { name, mode, output }) => {
            run_capture_command(&config, &name, mode.as_deref(), output)
        }
        Some(Commands::Init {
            config: with_config,
            samples,
            all,
            force,
            list,
        }) => run_init_command(&loader, &config, with_config, samples, all, force, list),
        None => run_status_command(&loader, &config),
    }
}

/// Per-channel, combined and delta readings for one file
fn run_gamma_command(
    config: &AppConfig,
    file: &Path,
    reference: Option<&Path>,
    step: Option<f64>,
    channels: &[String],
    legacy: bool,
) -> anyhow::Result<()> {
    let mut store = CurveStore::new(config.color_set());
    let summary = match reference {
        Some(reference) => {
            store
                .import_comparison(reference, file)
                .with_context(|| {
                    format!("Failed to import {} against {}", file.display(), reference.display())
                })?
                .1
        }
        None => store
            .import_file(file, CurveKind::Measured)
            .with_context(|| format!("Failed to import {}", file.display()))?,
    };

    let mut options = config.gamma.clone();
    if let Some(step) = step {
        options = options.step_value(step);
    }
    if legacy {
        options = options.method(GammaMethod::MaxSlope);
    }
    let analyzer = GammaAnalyzer::new(options);

    let color_set = store.color_set();
    let slots: Vec<&str> = if channels.is_empty() {
        color_set.gamma_slots()
    } else {
        channels
            .iter()
            .map(|letter| color_set.slot_of(&letter.to_lowercase()))
            .filter(|slot| !slot.is_empty())
            .collect()
    };
    if slots.is_empty() {
        bail!("No channel of {} selected", color_set.name());
    }

    let results = analyzer.get_gamma_from_curve_data(store.snapshot(), &slots);
    tracing::info!(file = %file.display(), readings = results.len(), "Computed gamma readings");

    println!("{} ({})\n", summary.name, color_set.name());
    for slot in &slots {
        let letter = color_set.letter_of(slot);
        print_reading(
            &format!("{} ({})", color_set.name_of(letter), letter.to_uppercase()),
            results.get(*slot),
        );
    }
    print_reading("All channels", results.get(ALL_KEY));
    if reference.is_some() {
        print_reading("Reference", results.get(REF_KEY));

        println!("Delta density |meas - ref|:");
        for slot in &slots {
            let delta = store.snapshot().delta_curve(slot);
            let cells: Vec<String> = delta
                .iter()
                .map(|(step, d)| format!("{step}:{d:.2}"))
                .collect();
            println!(
                "  {:<3} {}",
                color_set.letter_of(slot).to_uppercase(),
                if cells.is_empty() { "--".to_string() } else { cells.join(" ") }
            );
        }
    }

    Ok(())
}

fn print_reading(title: &str, reading: Option<&GammaReading>) {
    println!("{title}");
    match reading {
        Some(reading) => {
            for line in reading.to_string().lines() {
                println!("  {line}");
            }
        }
        None => println!("  --"),
    }
    println!();
}

/// Date-ordered drift table against a reference
fn run_history_command(
    config: &AppConfig,
    reference: Option<PathBuf>,
    files: &[PathBuf],
    dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let reference_dir = config.reference_dir();
    let reference_path = match reference {
        Some(path) => path,
        None => reference_files(&reference_dir)?
            .into_iter()
            .next()
            .with_context(|| {
                format!("No reference given and none found in {}", reference_dir.display())
            })?,
    };
    let reference = load_measurement_file(&reference_path)
        .with_context(|| format!("Failed to load reference {}", reference_path.display()))?;

    let measurements: Vec<MeasurementSet> = if files.is_empty() {
        let dir = dir.unwrap_or_else(|| config.measures_dir.clone());
        MeasurementCatalog::scan(&dir)?.sets_outside(&reference_dir)
    } else {
        files
            .iter()
            .map(|path| {
                load_measurement_file(path)
                    .with_context(|| format!("Failed to load {}", path.display()))
            })
            .collect::<anyhow::Result<_>>()?
    };

    let history = HistoryAnalyzer::new(reference, measurements)
        .with_channels(&config.history_channels)
        .with_options(config.gamma.clone());
    tracing::info!(
        reference = %reference_path.display(),
        measurements = history.measurements().len(),
        "Running history analysis"
    );

    println!("Reference: {}", history.reference().label());
    let reference_gammas = history.reference_gammas();
    for channel in history.channels() {
        println!(
            "  gamma {channel}: {}",
            format_point(reference_gammas.get(channel).copied().flatten())
        );
    }
    println!();

    if history.measurements().is_empty() {
        println!("No measurements.");
        return Ok(());
    }

    print_evolution("Gamma", &history, &history.gamma_evolution());
    print_evolution("D-min", &history, &history.dmin_evolution());
    print_evolution("D-max", &history, &history.dmax_evolution());

    Ok(())
}

fn print_evolution(title: &str, history: &HistoryAnalyzer, evolution: &Evolution) {
    print!("{title:<18}{:<24}", "");
    for channel in history.channels() {
        print!("{channel:>8}");
    }
    println!();

    for (i, (date, set)) in history
        .dates()
        .iter()
        .zip(history.measurements())
        .enumerate()
    {
        print!(
            "{:<18}{:<24}",
            date.format("%Y-%m-%d %H:%M").to_string(),
            set.display_name()
        );
        for channel in history.channels() {
            let point = evolution.get(channel).and_then(|series| series[i]);
            print!("{:>8}", format_point(point));
        }
        println!();
    }
    println!();
}

fn format_point(point: Option<f64>) -> String {
    point
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "--".to_string())
}

/// Catalog listing grouped by folder
fn run_list_command(
    config: &AppConfig,
    dir: Option<PathBuf>,
    search: &str,
    period: DatePeriod,
) -> anyhow::Result<()> {
    let dir = dir.unwrap_or_else(|| config.measures_dir.clone());
    let catalog = MeasurementCatalog::scan(&dir)?;
    let today = chrono::Local::now().date_naive();
    let entries = catalog.filter(search, period, today);

    if entries.is_empty() {
        println!("No measurements in {} ({period})", dir.display());
        return Ok(());
    }

    let mut current_folder = None;
    for entry in entries {
        if current_folder != Some(entry.folder.as_str()) {
            current_folder = Some(entry.folder.as_str());
            if entry.folder != sensito::services::catalog::ROOT_FOLDER {
                println!("--- {}", entry.folder.to_uppercase());
            }
        }
        println!("  {:<48} {}", entry.label(), entry.relative_path.display());
    }

    Ok(())
}

/// Densitometer capture session on stdin
fn run_capture_command(
    config: &AppConfig,
    name: &str,
    mode: Option<&str>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let color_set = match mode {
        Some(mode) => ColorChannelSet::get(mode)
            .with_context(|| format!("Unknown color mode: {mode} (expected vrgb or vcmy)"))?,
        None => config.color_set(),
    };

    let mut store = CurveStore::new(color_set);
    store.subscribe(|snapshot| {
        let measured = snapshot
            .keys()
            .filter(|key| key.starts_with(CurveKind::Measured.as_str()))
            .filter_map(|key| snapshot.get(key))
            .flatten()
            .filter(|point| point.is_some())
            .count();
        eprintln!("  {measured} points measured");
    });

    eprintln!("Reading {} densitometer lines from stdin (Ctrl-D to finish)", color_set.name());
    let stdin = std::io::stdin().lock();
    let echo = |row: usize, line: &str| eprintln!("row {row:>2}: {line}");
    if let Err(e) = record_lines(stdin, &mut store, echo) {
        tracing::warn!(error = %e, "Reading stdin failed, saving the rows recorded so far");
    }

    let path = match output {
        Some(path) => path,
        None => config
            .measures_dir
            .join(store.export_file_name(name, chrono::Local::now())),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    store
        .export(&path, name)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Saved {}", path.display());

    Ok(())
}

/// Extract embedded assets to filesystem
fn run_init_command(
    loader: &AssetLoader,
    config: &AppConfig,
    with_config: bool,
    samples: bool,
    all: bool,
    force: bool,
    list: bool,
) -> anyhow::Result<()> {
    if list {
        println!("Embedded assets:\n");
        println!("Config:");
        for f in AssetLoader::list_embedded(AssetCategory::Config) {
            println!("  {f}");
        }
        println!("\nSamples:");
        for f in AssetLoader::list_embedded(AssetCategory::Samples) {
            println!("  {f}");
        }
        return Ok(());
    }

    let mut categories = Vec::new();
    if all || with_config || !samples {
        categories.push(AssetCategory::Config);
    }
    if all || samples {
        categories.push(AssetCategory::Samples);
    }

    let report = loader.init(&categories, &config.measures_dir, force)?;

    if !report.written.is_empty() {
        println!("Extracted {} files:", report.written.len());
        for f in &report.written {
            println!("  + {f}");
        }
    }
    if !report.skipped.is_empty() {
        println!(
            "\nSkipped {} existing files (use --force to overwrite):",
            report.skipped.len()
        );
        for f in &report.skipped {
            println!("  - {f}");
        }
    }

    if report.written.is_empty() && report.skipped.is_empty() {
        println!("No files to extract.");
    }

    Ok(())
}

/// Display status and configuration information
fn run_status_command(loader: &AssetLoader, config: &AppConfig) -> anyhow::Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    println!("Sensito v{VERSION}");
    println!("Sensitometric gamma analysis for 21-step wedge measurements\n");

    let config_source = match loader.config_file() {
        Some(path) if path.exists() => path.display().to_string(),
        Some(_) => "embedded (file not found)".to_string(),
        None => "embedded".to_string(),
    };
    println!("Configuration:");
    println!("  Config       = {config_source}");
    println!("  Measures     = {}", config.measures_dir.display());
    println!("  References   = {}", config.reference_dir().display());
    println!("  Color mode   = {}", config.color_set());
    println!("  Step value   = {:.2}", config.gamma.step_value);
    println!("  Method       = {:?}", config.gamma.method);

    let catalog = MeasurementCatalog::scan(&config.measures_dir)?;
    let references = reference_files(&config.reference_dir())?;
    println!("\nData:");
    println!(
        "  {} measurements in {} folders, {} reference files",
        catalog.entries().len(),
        catalog.folders().len(),
        references.len()
    );

    println!("\nCommands:");
    println!("  sensito gamma     Gamma readings for one file");
    println!("  sensito history   Gamma and density drift over time");
    println!("  sensito list      Browse persisted measurements");
    println!("  sensito capture   Record densitometer readings from stdin");
    println!("  sensito init      Extract embedded assets");
    println!("\nRun 'sensito --help' for more details.");

    Ok(())
}

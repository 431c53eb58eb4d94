use clap::Parser;
use pageview_trends::core::{ConfigProvider, Pipeline};
use pageview_trends::utils::{logger, validation::Validate};
use pageview_trends::{LocalStorage, TomlConfig, TrendEngine, TrendPipeline};

#[derive(Parser)]
#[command(name = "toml-trends")]
#[command(about = "Page-view trend charts driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "trends-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override chart format from config (png or svg)
    #[arg(long)]
    format: Option<String>,

    /// Dry run - aggregate and fit the trends without writing any chart
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 載入 TOML 配置 (日誌格式取決於配置，所以先載入)
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based trend tool");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(format) = &args.format {
        config.output.format = Some(format.clone());
        tracing::info!("🔧 Chart format overridden to: {}", format);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    display_config_summary(&config, &args);

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    let storage = LocalStorage::current_dir();
    let pipeline = TrendPipeline::new(storage, config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No charts will be written");
        return perform_dry_run(&pipeline).await;
    }

    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let engine = TrendEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Trend analysis completed successfully!");
            println!("✅ Charts written to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Trend analysis failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Input: {}", config.input_path());
    println!("  Output: {}", config.output_path());
    println!("  Title: {}", config.title());
    match config.split_date() {
        Some(date) => println!("  Split: {} ({})", date, config.split_label()),
        None => println!("  Split: disabled"),
    }
    match config.exclude_after() {
        Some(date) => println!("  Outlier cutoff: {}", date),
        None => println!("  Outlier cutoff: disabled"),
    }
    println!("  Format: {}", config.chart_format());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run<P: Pipeline>(pipeline: &P) -> Result<(), Box<dyn std::error::Error>> {
    let rows = pipeline.extract().await?;
    let report = pipeline.transform(rows).await?;

    println!("🔍 Dry Run Analysis:");
    println!("  Rows: {}", report.summary.count);
    println!("  Articles: {}", report.summary.articles);
    println!("  Months: {}", report.monthly.len());

    let figures = std::iter::once(&report.full_trend).chain(report.excluding_outliers.as_ref());
    for figure in figures {
        println!();
        println!("📈 {}", figure.title);
        for (i, segment) in figure.segments.iter().enumerate() {
            match &segment.fit {
                Some(fit) => println!(
                    "  Segment {}: {} months, slope {:.2} views/day, R² {:.3}",
                    i + 1,
                    fit.n,
                    fit.slope,
                    fit.r_squared
                ),
                None => println!(
                    "  Segment {}: {} month(s), too few for a trend",
                    i + 1,
                    segment.points.len()
                ),
            }
        }
    }

    println!();
    println!("✅ Dry run analysis complete.");
    Ok(())
}

use netroute::client::{CliArgs, OutputFormatter};
use netroute::config::{LoggingConfig, NetrouteConfig};
use netroute::dataset::{index_features, load_feature_collection, query_features};
use netroute::{QuadtreeIndex, Rectangle, Result};
use tracing::{info, Level};

fn main() -> Result<()> {
    let args = CliArgs::parse_args();

    // 生成默认配置文件
    if args.generate_config {
        let config = NetrouteConfig::default();
        config.save_to_file(&args.config)?;
        println!("✅ Generated default configuration: {}", args.config);
        return Ok(());
    }

    // 验证参数
    if let Err(e) = args.validate() {
        eprintln!("{}", OutputFormatter::format_error(&e));
        std::process::exit(1);
    }

    // 加载配置
    let mut config = NetrouteConfig::from_file(&args.config)?;
    if let Some(log_level) = args.log_level.clone() {
        config.logging.level = log_level;
    }
    config.validate()?;

    init_logging(&config.logging)?;
    info!("📦 netroute {}", env!("CARGO_PKG_VERSION"));

    let Some(input) = args.input.as_deref() else {
        return Ok(());
    };

    let features = load_feature_collection(input)?;
    let mut index = QuadtreeIndex::with_config(&config.index);
    index_features(&mut index, &features)?;

    match args.bbox {
        Some(window) => run_query(&index, &features, &window, args.exact),
        None => println!(
            "{}",
            OutputFormatter::format_stats(
                index.count(),
                index.depth(),
                index.node_count(),
                index.min_extent()
            )
        ),
    }

    Ok(())
}

fn run_query(
    index: &QuadtreeIndex<usize>,
    features: &[(String, Rectangle)],
    window: &Rectangle,
    exact: bool,
) {
    println!("{}", OutputFormatter::format_query_header(window, exact));
    // 二次过滤：索引只保证不漏检
    let hits = query_features(index, features, window, exact);
    println!("{}", OutputFormatter::format_hits(&hits));
}

/// 初始化日志系统
fn init_logging(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = match config.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    match (config.output.as_str(), &config.log_file) {
        ("file", Some(log_file)) => {
            // 确保日志目录存在
            if let Some(parent) = log_file.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
                .map_err(|e| format!("Failed to open log file {}: {}", log_file.display(), e))?;

            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::sync::Mutex::new(file))
                        .with_ansi(false)
                        .with_target(false),
                )
                .with(tracing_subscriber::filter::LevelFilter::from_level(filter))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false),
                )
                .with(tracing_subscriber::filter::LevelFilter::from_level(filter))
                .init();
        }
    }
    Ok(())
}

use intraday_windows::config::{default_windows, Config};
use intraday_windows::models::window::TimeWindow;
use intraday_windows::scrapers::base::FetchRequest;
use intraday_windows::scrapers::{build_source_pair, SourceKind};
use intraday_windows::services::{acquisition, chart, indicators, report, window_stats};
use intraday_windows::models::price::PriceSeries;
use intraday_windows::util;

use anyhow::Context;
use clap::{App, Arg, ArgMatches, SubCommand};
use log::{error, info};
use std::time::Duration;

fn common_args<'a>(
    cmd: App<'a>,
    symbol: &'a str,
    period: &'a str,
    interval: &'a str,
    tz: &'a str,
) -> App<'a> {
    cmd.arg(
        Arg::with_name("symbol")
            .short('s')
            .long("symbol")
            .value_name("SYMBOL")
            .help("Ticker symbol to fetch")
            .takes_value(true)
            .default_value(symbol),
    )
    .arg(
        Arg::with_name("period")
            .short('p')
            .long("period")
            .value_name("PERIOD")
            .help("Lookback period (e.g. 1d, 5d, 1mo)")
            .takes_value(true)
            .default_value(period),
    )
    .arg(
        Arg::with_name("interval")
            .short('i')
            .long("interval")
            .value_name("INTERVAL")
            .help("Bar interval (e.g. 1m, 5m, 1h)")
            .takes_value(true)
            .default_value(interval),
    )
    .arg(
        Arg::with_name("tz")
            .long("tz")
            .value_name("TIMEZONE")
            .help("Target timezone for days, windows and labels")
            .takes_value(true)
            .default_value(tz),
    )
    .arg(
        Arg::with_name("retries")
            .long("retries")
            .value_name("N")
            .help("Maximum attempts on the fallback transport")
            .takes_value(true)
            .default_value("3"),
    )
    .arg(
        Arg::with_name("retry-delay")
            .long("retry-delay")
            .value_name("SECONDS")
            .help("Fixed delay between fallback attempts")
            .takes_value(true)
            .default_value("2"),
    )
}

// 公共参数构建配置
fn base_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    let tz = util::parse_timezone(matches.value_of("tz").unwrap_or("UTC"))?;
    let retries = matches.value_of("retries")
        .unwrap_or("3")
        .parse::<u32>()
        .context("--retries must be a non-negative integer")?;
    let delay = matches.value_of("retry-delay")
        .unwrap_or("2")
        .parse::<u64>()
        .context("--retry-delay must be whole seconds")?;

    Ok(Config::new()
        .with_target_tz(tz)
        .with_max_retries(retries)
        .with_retry_delay(Duration::from_secs(delay))
        .with_proxy_from_env())
}

fn fetch_request(matches: &ArgMatches) -> FetchRequest {
    FetchRequest::new(
        matches.value_of("symbol").unwrap_or_default(),
        matches.value_of("period").unwrap_or_default(),
        matches.value_of("interval").unwrap_or_default(),
    )
}

// 获取失败时只提示无数据，返回 None
async fn load_series(kind: SourceKind, request: &FetchRequest, config: &Config) -> anyhow::Result<Option<PriceSeries>> {
    let (primary, fallback) = build_source_pair(kind, config.proxy_url.as_deref())?;
    match acquisition::acquire(primary.as_ref(), fallback.as_ref(), request, config).await {
        Ok(series) => Ok(Some(series)),
        Err(e) if e.is_acquisition_failure() => {
            error!("Error fetching data: {}", e);
            println!("No data found. Please check your internet connection or ticker symbol.");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

async fn run_windows(matches: &ArgMatches) -> anyhow::Result<()> {
    let windows = match matches.values_of("window") {
        Some(args) => args
            .map(TimeWindow::from_arg)
            .collect::<Result<Vec<_>, _>>()?,
        None => default_windows(),
    };
    let config = base_config(matches)?.with_windows(windows);
    let request = fetch_request(matches);

    println!("Fetching data for {}...", request.symbol);
    let series = match load_series(SourceKind::Yahoo, &request, &config).await? {
        Some(series) => series,
        None => return Ok(()),
    };

    let stats = window_stats::summarize(&series, &config.windows);
    print!("{}", report::render(series.symbol(), &stats));
    Ok(())
}

async fn run_chart(matches: &ArgMatches) -> anyhow::Result<()> {
    let kind: SourceKind = matches.value_of("source").unwrap_or("polygon").parse()?;
    let points = matches.value_of("points")
        .unwrap_or("40")
        .parse::<usize>()
        .context("--points must be a positive integer")?;
    let config = base_config(matches)?.with_chart_target_points(points);
    let request = fetch_request(matches);

    let series = match load_series(kind, &request, &config).await? {
        Some(series) => series,
        None => return Ok(()),
    };

    let stride = indicators::sample_stride(series.len(), config.chart_target_points);
    info!("Sampling every {} of {} points", stride, series.len());
    let sampled = indicators::compute_indicators(&series, stride, &config.indicators)?;

    println!("{}", serde_json::to_string(&chart::chart_config(&sampled))?);
    Ok(())
}

// 两个子命令的默认值分别对应黄金时段报告与 ETH 图表
fn build_app() -> App<'static> {
    let app = App::new("IntradayWindows")
        .version(env!("CARGO_PKG_VERSION"))
        .author("EgoStrategy Team")
        .about("Intraday window statistics and indicator charts");

    let windows = common_args(SubCommand::with_name("windows"), "GC=F", "5d", "5m", "Asia/Shanghai")
        .about("Summarize fixed clock-time windows per day")
        .arg(
            Arg::with_name("window")
                .short('w')
                .long("window")
                .value_name("START-END[=DESCRIPTION]")
                .help("Window to evaluate, repeatable (default: 16:00-16:30 and 21:00-23:59:59)")
                .takes_value(true)
                .multiple_occurrences(true),
        );

    let chart = common_args(SubCommand::with_name("chart"), "X:ETHUSD", "1d", "1m", "UTC")
        .about("Emit a Chart.js config with price, MACD and RSI")
        .arg(
            Arg::with_name("source")
                .long("source")
                .value_name("SOURCE")
                .help("Data vendor (polygon, yahoo)")
                .takes_value(true)
                .default_value("polygon"),
        )
        .arg(
            Arg::with_name("points")
                .long("points")
                .value_name("N")
                .help("Target number of sampled points")
                .takes_value(true)
                .default_value("40"),
        );

    app.subcommand(windows).subcommand(chart)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let matches = build_app().get_matches();

    match matches.subcommand() {
        Some(("windows", m)) => run_windows(m).await,
        Some(("chart", m)) => run_chart(m).await,
        _ => {
            info!("No command specified. Use --help for usage information.");
            Ok(())
        }
    }
}

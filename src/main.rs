// Console front end for the campaign analytics engine.
//
// - Option [1] refreshes the snapshot from a sheet URL or CSV path.
// - Option [2] prints the dashboard tables and exports them to files.
// - Option [3] shows cache freshness and the active source.
// - Option [4] writes the raw sheet rows and the live subset to CSV.
// A background thread keeps the snapshot current while the menu is open.
use campaign_dashboard::aggregate::live_rows;
use campaign_dashboard::cache::{CacheStatus, RefreshLoop, SnapshotCache};
use campaign_dashboard::config::DashboardConfig;
use campaign_dashboard::loader::SourceFetcher;
use campaign_dashboard::rollup::EntityKind;
use campaign_dashboard::types::Snapshot;
use campaign_dashboard::{output, reports, util};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const TOP_ENTITIES: usize = 15;
const RAW_EXPORT_FILE: &str = "campaign_data_export.csv";
const LIVE_EXPORT_FILE: &str = "live_campaigns.csv";

/// Read a single line of input after printing `prompt`. `None` once stdin is
/// closed or unreadable.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    next_answer(&mut io::stdin().lock())
}

fn next_answer<R: BufRead>(input: &mut R) -> Option<String> {
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Handle option [1]: fetch a source and swap in a new snapshot.
///
/// An empty answer re-fetches the current source. Failures leave the cached
/// snapshot in place.
fn handle_refresh(cache: &SnapshotCache) {
    let current = cache.source();
    let Some(answer) = read_line(&format!("Sheet URL or CSV path [{}]: ", current)) else {
        return;
    };
    let source = if answer.is_empty() { current } else { answer };
    match cache.refresh(&source) {
        Ok(snapshot) => {
            println!(
                "Processing dataset... ({} rows loaded, {} live campaigns)\n",
                util::format_int(snapshot.total_clients),
                util::format_int(snapshot.live_campaigns)
            );
        }
        Err(e) => {
            tracing::error!(source = %source, error = %e, "refresh failed");
            eprintln!("Failed to refresh from {}: {}\n", source, e);
        }
    }
}

fn print_entity_report(snapshot: &Snapshot, kind: EntityKind) {
    let rollups = match kind {
        EntityKind::Client => &snapshot.client_performance,
        EntityKind::Bot => &snapshot.bot_performance,
        EntityKind::ReportingCm => &snapshot.cm_performance,
    };
    let rows = reports::entity_ranking(rollups, rollups.len());
    let file = format!(
        "report_{}_performance.csv",
        kind.label().to_lowercase().replace(' ', "_")
    );
    if let Err(e) = output::write_csv(Path::new(&file), &rows) {
        eprintln!("Write error: {}", e);
    }
    println!("{} Performance (Top {} by Leads Dialled)\n", kind.label(), TOP_ENTITIES);
    output::preview_table_rows(&rows, TOP_ENTITIES);
    println!("(Full table exported to {})\n", file);
}

/// Handle option [2]: print every dashboard table and export the snapshot.
fn handle_generate_reports(cache: &SnapshotCache) {
    let Some(snapshot) = cache.get_fresh() else {
        println!("Error: No data available. Refresh from a source first (option 1).\n");
        return;
    };

    println!("Campaign Overview ({})\n", snapshot.last_updated.format("%Y-%m-%d %H:%M:%S"));
    println!("Total campaigns:        {}", util::format_int(snapshot.total_clients));
    println!("Live campaigns:         {}", util::format_int(snapshot.live_campaigns));
    println!("Leads dialled:          {}", util::format_int(snapshot.total_leads_dialled));
    println!("Connected calls:        {}", util::format_int(snapshot.total_connected_calls));
    println!("Success rate:           {}%", util::format_number(snapshot.success_rate, 2));
    println!("Campaign utilization:   {}%", util::format_number(snapshot.campaign_utilization(), 2));
    println!("Avg leads per campaign: {}", util::format_number(snapshot.avg_leads_per_campaign(), 2));
    println!("Avg calls per campaign: {}\n", util::format_number(snapshot.avg_calls_per_campaign(), 2));

    let total = snapshot.total_clients;
    let sections = [
        ("Campaign Status", &snapshot.campaign_status_breakdown, total),
        ("Application Status (Voice)", &snapshot.application_status_breakdown, total),
        ("Bot Types", &snapshot.bot_types_breakdown, snapshot.bot_types_breakdown.values().sum::<u64>()),
        ("Hourly Distribution", &snapshot.hourly_distribution, snapshot.hourly_distribution.values().sum::<u64>()),
    ];
    for (title, counts, denom) in sections {
        println!("{}\n", title);
        output::preview_table_rows(&reports::breakdown_rows(counts, denom), usize::MAX);
    }

    let patterns = snapshot.time_patterns;
    println!(
        "Time patterns: morning {} | afternoon {} | evening {} | night {}\n",
        patterns.morning, patterns.afternoon, patterns.evening, patterns.night
    );

    for kind in EntityKind::ALL {
        print_entity_report(&snapshot, kind);
    }

    match output::write_json(Path::new("snapshot.json"), snapshot.as_ref()) {
        Ok(()) => println!("Snapshot exported to snapshot.json\n"),
        Err(e) => eprintln!("Write error: {}\n", e),
    }
}

/// Handle option [4]: write the rows behind the current snapshot as CSV,
/// once in full and once filtered to live campaigns.
fn handle_export_raw(cache: &SnapshotCache) {
    let Some(rows) = cache.current_rows() else {
        println!("Error: No data available. Refresh from a source first (option 1).\n");
        return;
    };
    let all: Vec<_> = rows.iter().collect();
    let exports = [(RAW_EXPORT_FILE, all), (LIVE_EXPORT_FILE, live_rows(&rows))];
    for (file, subset) in exports {
        match output::write_rows_csv(Path::new(file), &subset) {
            Ok(written) => println!("Exported {} rows to {}", util::format_int(written), file),
            Err(e) => {
                tracing::error!(file, error = %e, "raw export failed");
                eprintln!("Write error: {}", e);
            }
        }
    }
    println!();
}

/// Handle option [3]: cache state and source.
fn handle_status(cache: &SnapshotCache) {
    let status = match cache.status() {
        CacheStatus::Empty => "empty",
        CacheStatus::Fresh => "fresh",
        CacheStatus::Stale => "stale",
    };
    println!("Source: {}", cache.source());
    if cache.status() == CacheStatus::Empty {
        println!("Cache:  {}\n", status);
    } else {
        println!("Cache:  {} ({}s old)\n", status, cache.snapshot_age().as_secs());
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match DashboardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };
    tracing::info!(
        source = %config.default_source,
        refresh_secs = config.refresh_interval.as_secs(),
        max_cache_age_secs = config.max_cache_age.as_secs(),
        "starting campaign dashboard"
    );

    let fetcher = SourceFetcher::new(config.fetch_timeout, config.sheet_gid.clone());
    let cache = Arc::new(SnapshotCache::from_config(&config, fetcher));
    if cache.get_snapshot().is_none() {
        println!("Initial load failed; use option [1] to pick a source.\n");
    }

    let _refresh = if config.enable_auto_refresh {
        match RefreshLoop::new(Arc::clone(&cache), config.refresh_interval).start() {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(error = %e, "could not start refresh loop");
                None
            }
        }
    } else {
        None
    };

    loop {
        println!("Campaign Dashboard:");
        println!("[1] Refresh from source");
        println!("[2] Generate Reports");
        println!("[3] Cache status");
        println!("[4] Export raw data");
        println!("[0] Exit\n");
        let Some(choice) = read_line("Enter choice: ") else {
            println!("\nInput closed, exiting.");
            break;
        };
        match choice.as_str() {
            "1" => handle_refresh(&cache),
            "2" => {
                println!();
                handle_generate_reports(&cache);
            }
            "3" => handle_status(&cache),
            "4" => handle_export_raw(&cache),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter a number from 0 to 4.\n"),
        }
    }
}

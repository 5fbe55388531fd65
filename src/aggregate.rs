use crate::rollup::{BotType, EntityKind, RollupTable};
use crate::timeslot::{is_scheduled, parse_time, DayPart};
use crate::types::{
    PerformanceMetrics, Row, Snapshot, TimePatterns, APPLICATION_STATUS, CAMPAIGN_STATUS,
    SCHEDULED_TIME_FIELDS, TOTAL_CONNECTED_CALLS, TOTAL_LEADS_DIALLED,
};
use crate::util::{classify_status, coerce_int, coerce_string, percentage, ratio, round2};
use chrono::Local;
use std::collections::BTreeMap;

/// Buckets of `status_trends`; any other status lands in `Unknown`.
const TREND_STATUSES: [&str; 4] = ["Live", "Posted", "No File", "Unknown"];

/// Case-sensitive substring match: "Live - Paused" counts as live.
pub fn is_live(status: &str) -> bool {
    status.contains("Live")
}

#[derive(Debug)]
struct Totals {
    rows: u64,
    live: u64,
    leads: u64,
    calls: u64,
    scheduled_slots: u64,
    campaign_times: Vec<String>,
    campaign_status: BTreeMap<String, u64>,
    application_status: BTreeMap<String, u64>,
    bot_types: BTreeMap<String, u64>,
    reporting_cms: BTreeMap<String, u64>,
    hourly: BTreeMap<String, u64>,
    time_patterns: TimePatterns,
    status_trends: BTreeMap<String, u64>,
    client_status: BTreeMap<String, String>,
    clients: RollupTable,
    bots: RollupTable,
    cms: RollupTable,
}

impl Totals {
    fn new() -> Self {
        Self {
            rows: 0,
            live: 0,
            leads: 0,
            calls: 0,
            scheduled_slots: 0,
            campaign_times: Vec::new(),
            campaign_status: BTreeMap::new(),
            application_status: BTreeMap::new(),
            bot_types: BTreeMap::new(),
            reporting_cms: BTreeMap::new(),
            hourly: BTreeMap::new(),
            time_patterns: TimePatterns::default(),
            status_trends: TREND_STATUSES.iter().map(|s| (s.to_string(), 0)).collect(),
            client_status: BTreeMap::new(),
            clients: RollupTable::new(EntityKind::Client),
            bots: RollupTable::new(EntityKind::Bot),
            cms: RollupTable::new(EntityKind::ReportingCm),
        }
    }

    fn add_row(&mut self, row: &Row) {
        self.rows += 1;

        let status = coerce_string(row, CAMPAIGN_STATUS, "");
        let live = is_live(&status);
        if live {
            self.live += 1;
        }

        let leads = coerce_int(row, TOTAL_LEADS_DIALLED);
        let calls = coerce_int(row, TOTAL_CONNECTED_CALLS);
        self.leads = self.leads.saturating_add(leads);
        self.calls = self.calls.saturating_add(calls);

        if let Some(client) = self.clients.observe_row(row, live, leads, calls) {
            self.client_status.insert(client, status.clone());
        }
        if let Some(bot) = self.bots.observe_row(row, live, leads, calls) {
            *self
                .bot_types
                .entry(BotType::classify(&bot).as_str().to_string())
                .or_insert(0) += 1;
        }
        if let Some(cm) = self.cms.observe_row(row, live, leads, calls) {
            *self.reporting_cms.entry(cm).or_insert(0) += 1;
        }

        for name in SCHEDULED_TIME_FIELDS {
            let Some(text) = row.get(name) else {
                continue;
            };
            if !is_scheduled(text) {
                continue;
            }
            self.scheduled_slots += 1;
            self.campaign_times.push(text.trim().to_string());
            if let Some(slot) = parse_time(text) {
                *self.hourly.entry(slot.bucket_label()).or_insert(0) += 1;
                let bucket = match slot.day_part() {
                    DayPart::Morning => &mut self.time_patterns.morning,
                    DayPart::Afternoon => &mut self.time_patterns.afternoon,
                    DayPart::Evening => &mut self.time_patterns.evening,
                    DayPart::Night => &mut self.time_patterns.night,
                };
                *bucket += 1;
            }
        }

        let trend = if TREND_STATUSES.contains(&status.as_str()) {
            status.as_str()
        } else {
            "Unknown"
        };
        *self.status_trends.entry(trend.to_string()).or_insert(0) += 1;

        *self
            .campaign_status
            .entry(classify_status(&status))
            .or_insert(0) += 1;
        let app_status = coerce_string(row, APPLICATION_STATUS, "");
        *self
            .application_status
            .entry(classify_status(&app_status))
            .or_insert(0) += 1;
    }

    fn finish(self, source: Option<&str>) -> Snapshot {
        let success_rate = round2(percentage(self.calls, self.leads));
        let performance_metrics = PerformanceMetrics {
            total_campaigns: self.rows,
            live_campaigns: self.live,
            inactive_campaigns: self.rows - self.live,
            campaign_utilization: percentage(self.live, self.rows),
            lead_conversion_rate: percentage(self.calls, self.leads),
            avg_leads_per_campaign: ratio(self.leads, self.rows),
            avg_calls_per_campaign: ratio(self.calls, self.rows),
        };
        Snapshot {
            total_clients: self.rows,
            live_campaigns: self.live,
            total_leads_dialled: self.leads,
            total_connected_calls: self.calls,
            success_rate,
            scheduled_slots: self.scheduled_slots,
            campaign_times: self.campaign_times,
            campaign_status_breakdown: self.campaign_status,
            application_status_breakdown: self.application_status,
            bot_types_breakdown: self.bot_types,
            reporting_cms_breakdown: self.reporting_cms,
            hourly_distribution: self.hourly,
            time_patterns: self.time_patterns,
            status_trends: self.status_trends,
            client_status: self.client_status,
            performance_metrics,
            client_performance: self.clients.into_map(),
            bot_performance: self.bots.into_map(),
            cm_performance: self.cms.into_map(),
            last_updated: Local::now(),
            sheet_url: source.map(str::to_string),
        }
    }
}

/// Rows whose trimmed `Campaign Status` counts as live.
pub fn live_rows(rows: &[Row]) -> Vec<&Row> {
    rows.iter()
        .filter(|row| is_live(&coerce_string(row, CAMPAIGN_STATUS, "")))
        .collect()
}

/// Fold a batch of rows into a [`Snapshot`].
///
/// Never fails: missing or malformed cells fall back to the coercion
/// defaults. Output maps are ordered, so two passes over the same rows differ
/// only in `last_updated`.
pub fn aggregate(rows: &[Row], source: Option<&str>) -> Snapshot {
    let mut totals = Totals::new();
    for row in rows {
        totals.add_row(row);
    }
    tracing::debug!(
        rows = totals.rows,
        live = totals.live,
        clients = totals.clients.len(),
        "aggregated campaign rows"
    );
    totals.finish(source)
}

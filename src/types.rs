use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use tabled::Tabled;

/// One record of the campaign sheet: header name -> raw cell text, in sheet
/// column order.
///
/// Fields are not guaranteed to be present on every row; see [`crate::util`]
/// for the lenient accessors the aggregator uses.
pub type Row = IndexMap<String, String>;

pub const CAMPAIGN_STATUS: &str = "Campaign Status";
pub const TOTAL_LEADS_DIALLED: &str = "Total leads dialled";
// The misspelling is part of the upstream sheet and must match literally.
pub const TOTAL_CONNECTED_CALLS: &str = "Total connnected calls";
pub const CLIENT: &str = "Client";
pub const BOT_NAME: &str = "Bot Name";
// Upstream header carries a leading space.
pub const REPORTING_CM: &str = " reporting CM";
pub const REPORTING_CM_TRIMMED: &str = "reporting CM";
pub const APPLICATION_STATUS: &str = "Application Status (Voice)";
pub const SCHEDULED_TIME_FIELDS: [&str; 4] =
    ["1st Campaign", "2nd Campaign", "3rd Campaign", "4th Campaign"];

/// Per-entity accumulation of campaign counts, used for clients, bots and
/// reporting CMs alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRollup {
    pub total_campaigns: u64,
    pub live_campaigns: u64,
    pub leads: u64,
    pub calls: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePatterns {
    pub morning: u64,
    pub afternoon: u64,
    pub evening: u64,
    pub night: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_campaigns: u64,
    pub live_campaigns: u64,
    pub inactive_campaigns: u64,
    pub campaign_utilization: f64,
    pub lead_conversion_rate: f64,
    pub avg_leads_per_campaign: f64,
    pub avg_calls_per_campaign: f64,
}

/// Complete analytics result of one aggregation pass.
///
/// Snapshots are never mutated once built; the cache swaps whole snapshots.
/// Field names match the JSON the dashboard front end already consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub total_clients: u64,
    pub live_campaigns: u64,
    pub total_leads_dialled: u64,
    pub total_connected_calls: u64,
    pub success_rate: f64,
    pub scheduled_slots: u64,
    /// Accepted schedule strings, trimmed, in row order.
    pub campaign_times: Vec<String>,
    pub campaign_status_breakdown: BTreeMap<String, u64>,
    pub application_status_breakdown: BTreeMap<String, u64>,
    pub bot_types_breakdown: BTreeMap<String, u64>,
    pub reporting_cms_breakdown: BTreeMap<String, u64>,
    pub hourly_distribution: BTreeMap<String, u64>,
    pub time_patterns: TimePatterns,
    pub status_trends: BTreeMap<String, u64>,
    pub client_status: BTreeMap<String, String>,
    pub performance_metrics: PerformanceMetrics,
    pub client_performance: BTreeMap<String, EntityRollup>,
    pub bot_performance: BTreeMap<String, EntityRollup>,
    pub cm_performance: BTreeMap<String, EntityRollup>,
    pub last_updated: DateTime<Local>,
    pub sheet_url: Option<String>,
}

impl Snapshot {
    pub fn campaign_utilization(&self) -> f64 {
        self.performance_metrics.campaign_utilization
    }

    pub fn avg_leads_per_campaign(&self) -> f64 {
        self.performance_metrics.avg_leads_per_campaign
    }

    pub fn avg_calls_per_campaign(&self) -> f64 {
        self.performance_metrics.avg_calls_per_campaign
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct EntityRankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Campaigns")]
    #[tabled(rename = "Campaigns")]
    pub total_campaigns: u64,
    #[serde(rename = "Live")]
    #[tabled(rename = "Live")]
    pub live_campaigns: u64,
    #[serde(rename = "Leads")]
    #[tabled(rename = "Leads")]
    pub leads: String,
    #[serde(rename = "Calls")]
    #[tabled(rename = "Calls")]
    pub calls: String,
    #[serde(rename = "ConnectRate")]
    #[tabled(rename = "ConnectRate")]
    pub connect_rate: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct BreakdownRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: u64,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share")]
    pub share: String,
}

//! Per-entity rollups and bot-type classification.
//!
//! The same accumulator backs client, bot and reporting-CM performance; an
//! [`EntityKind`] picks which column of the row supplies the key.

use crate::types::{EntityRollup, Row, BOT_NAME, CLIENT, REPORTING_CM, REPORTING_CM_TRIMMED};
use crate::util::field;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Client,
    Bot,
    ReportingCm,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Client, EntityKind::Bot, EntityKind::ReportingCm];

    /// Header names carrying this entity, most specific first.
    fn columns(self) -> &'static [&'static str] {
        match self {
            EntityKind::Client => &[CLIENT],
            EntityKind::Bot => &[BOT_NAME],
            EntityKind::ReportingCm => &[REPORTING_CM, REPORTING_CM_TRIMMED],
        }
    }

    /// Trimmed entity name for this row, `None` when absent or blank.
    pub fn key(self, row: &Row) -> Option<String> {
        let name = field(row, self.columns())?.trim();
        (!name.is_empty()).then(|| name.to_string())
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Client => "Client",
            EntityKind::Bot => "Bot",
            EntityKind::ReportingCm => "Reporting CM",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RollupTable {
    kind: EntityKind,
    entries: BTreeMap<String, EntityRollup>,
}

impl RollupTable {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            entries: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn observe(&mut self, name: &str, is_live: bool, leads: u64, calls: u64) {
        let entry = self.entries.entry(name.to_string()).or_default();
        entry.total_campaigns += 1;
        if is_live {
            entry.live_campaigns += 1;
        }
        entry.leads = entry.leads.saturating_add(leads);
        entry.calls = entry.calls.saturating_add(calls);
    }

    /// Extract this table's key from `row` and observe it. Rows without a
    /// name for this entity are skipped; returns the key when one was seen.
    pub fn observe_row(&mut self, row: &Row, is_live: bool, leads: u64, calls: u64) -> Option<String> {
        let name = self.kind.key(row)?;
        self.observe(&name, is_live, leads, calls);
        Some(name)
    }

    pub fn get(&self, name: &str) -> Option<&EntityRollup> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<String, EntityRollup> {
        self.entries
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotType {
    Llm,
    Studio,
    Sms,
    Other,
}

impl BotType {
    // Order matters: "LLM Studio Bot" is an LLM bot.
    const RULES: [(&'static str, BotType); 3] = [
        ("LLM", BotType::Llm),
        ("Studio", BotType::Studio),
        ("SMS", BotType::Sms),
    ];

    pub fn classify(bot_name: &str) -> Self {
        Self::RULES
            .iter()
            .find(|(needle, _)| bot_name.contains(needle))
            .map_or(BotType::Other, |(_, kind)| *kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BotType::Llm => "LLM",
            BotType::Studio => "Studio",
            BotType::Sms => "SMS",
            BotType::Other => "Other",
        }
    }
}

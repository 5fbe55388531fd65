use crate::types::{BreakdownRow, EntityRankingRow, EntityRollup};
use crate::util::{format_int, format_number, percentage};
use std::collections::BTreeMap;

/// Rank entities by leads dialled (descending), ties broken by name.
///
/// `ConnectRate` is calls / leads for the entity, 0 when it dialled nothing.
pub fn entity_ranking(
    rollups: &BTreeMap<String, EntityRollup>,
    limit: usize,
) -> Vec<EntityRankingRow> {
    let mut entries: Vec<(&String, &EntityRollup)> = rollups.iter().collect();
    entries.sort_by(|a, b| b.1.leads.cmp(&a.1.leads).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(idx, (name, r))| EntityRankingRow {
            rank: idx + 1,
            name: name.clone(),
            total_campaigns: r.total_campaigns,
            live_campaigns: r.live_campaigns,
            leads: format_int(r.leads),
            calls: format_int(r.calls),
            connect_rate: format_number(percentage(r.calls, r.leads), 2),
        })
        .collect()
}

/// Categories ordered by count (descending) with their share of `total`.
pub fn breakdown_rows(counts: &BTreeMap<String, u64>, total: u64) -> Vec<BreakdownRow> {
    let mut rows: Vec<(&String, &u64)> = counts.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    rows.into_iter()
        .map(|(category, count)| BreakdownRow {
            category: category.clone(),
            count: *count,
            share: format!("{}%", format_number(percentage(*count, total), 1)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rollup(total: u64, live: u64, leads: u64, calls: u64) -> EntityRollup {
        EntityRollup {
            total_campaigns: total,
            live_campaigns: live,
            leads,
            calls,
        }
    }

    #[test]
    fn ranks_by_leads_then_name() {
        let mut map = BTreeMap::new();
        map.insert("Globex".to_string(), rollup(1, 0, 500, 50));
        map.insert("Acme".to_string(), rollup(3, 2, 12_000, 3_000));
        map.insert("Initech".to_string(), rollup(2, 1, 500, 0));
        map.insert("Hooli".to_string(), rollup(1, 1, 0, 0));

        let rows = entity_ranking(&map, 3);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].name, "Acme");
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].leads, "12,000");
        assert_eq!(rows[0].connect_rate, "25.00");
        assert_eq!(rows[1].name, "Globex");
        assert_eq!(rows[2].name, "Initech");
        assert_eq!(rows[2].connect_rate, "0.00");
    }

    #[test]
    fn breakdown_shares_of_total() {
        let mut counts = BTreeMap::new();
        counts.insert("Live".to_string(), 3);
        counts.insert("Posted".to_string(), 1);
        let rows = breakdown_rows(&counts, 4);
        assert_eq!(rows[0].category, "Live");
        assert_eq!(rows[0].share, "75.0%");
        assert_eq!(rows[1].share, "25.0%");
        assert!(breakdown_rows(&BTreeMap::new(), 0).is_empty());
    }
}

use std::collections::HashSet;

use crate::market::{MarketEntity, Timeframe};

#[derive(Clone, Copy, Debug)]
pub(super) struct Candidate<'a> {
    pub(super) entity: &'a MarketEntity,
    pub(super) percentage: f64,
    pub(super) market_cap: f64,
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

pub(super) fn normalize<'a>(
    entities: &'a [MarketEntity],
    timeframe: Timeframe,
    popped: &HashSet<String>,
) -> Vec<Candidate<'a>> {
    let mut seen = HashSet::with_capacity(entities.len());
    entities
        .iter()
        .filter(|entity| !popped.contains(&entity.id))
        .filter(|&entity| seen.insert(entity.id.as_str()))
        .map(|entity| Candidate {
            entity,
            percentage: entity.changes.for_timeframe(timeframe),
            market_cap: finite_or_zero(entity.market_cap).max(0.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::entity::PriceChanges;

    fn entity(id: &str, hour: f64, day: f64) -> MarketEntity {
        MarketEntity {
            id: id.to_owned(),
            symbol: id.to_owned(),
            name: id.to_owned(),
            current_price: 1.0,
            market_cap: f64::NAN,
            market_cap_rank: None,
            changes: PriceChanges {
                hour,
                day,
                ..PriceChanges::default()
            },
            image: String::new(),
        }
    }

    #[test]
    fn picks_active_timeframe_and_skips_popped() {
        let entities = vec![
            entity("a", 1.0, 2.0),
            entity("b", -3.0, f64::NAN),
            entity("c", 0.0, 9.0),
        ];
        let popped = HashSet::from(["c".to_owned()]);

        let hourly = normalize(&entities, Timeframe::OneHour, &popped);
        assert_eq!(hourly.len(), 2);
        assert_eq!(hourly[0].percentage, 1.0);
        assert_eq!(hourly[1].percentage, -3.0);

        let daily = normalize(&entities, Timeframe::Day, &popped);
        assert_eq!(daily[0].percentage, 2.0);
        assert_eq!(daily[1].percentage, 0.0);
        assert_eq!(daily[0].market_cap, 0.0);
    }

    #[test]
    fn duplicate_ids_keep_the_first_entry() {
        let entities = vec![
            entity("a", 1.0, 0.0),
            entity("a", 5.0, 0.0),
            entity("b", 2.0, 0.0),
        ];
        let kept = normalize(&entities, Timeframe::OneHour, &HashSet::new());
        let ids = kept
            .iter()
            .map(|candidate| candidate.entity.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(kept[0].percentage, 1.0);
    }
}

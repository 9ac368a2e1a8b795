use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::entity::{MarketEntity, PriceChanges};

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawMarketEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub(super) id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(super) symbol: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(super) name: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub(super) current_price: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub(super) market_cap: f64,
    #[serde(default, deserialize_with = "lenient_rank")]
    pub(super) market_cap_rank: Option<u32>,
    #[serde(
        default,
        rename = "price_change_percentage_1h_in_currency",
        deserialize_with = "lenient_number"
    )]
    pub(super) change_1h: f64,
    #[serde(
        default,
        rename = "price_change_percentage_24h_in_currency",
        deserialize_with = "lenient_number"
    )]
    pub(super) change_24h: f64,
    #[serde(
        default,
        rename = "price_change_percentage_24h",
        deserialize_with = "lenient_number"
    )]
    pub(super) change_24h_plain: f64,
    #[serde(
        default,
        rename = "price_change_percentage_7d_in_currency",
        deserialize_with = "lenient_number"
    )]
    pub(super) change_7d: f64,
    #[serde(
        default,
        rename = "price_change_percentage_30d_in_currency",
        deserialize_with = "lenient_number"
    )]
    pub(super) change_30d: f64,
    #[serde(
        default,
        rename = "price_change_percentage_1y_in_currency",
        deserialize_with = "lenient_number"
    )]
    pub(super) change_1y: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(super) image: String,
}

impl RawMarketEntry {
    pub(super) fn into_entity(self) -> MarketEntity {
        MarketEntity {
            id: self.id,
            symbol: self.symbol,
            name: self.name,
            current_price: self.current_price,
            market_cap: self.market_cap,
            market_cap_rank: self.market_cap_rank,
            changes: PriceChanges {
                hour: self.change_1h,
                day: if self.change_24h != 0.0 {
                    self.change_24h
                } else {
                    self.change_24h_plain
                },
                week: self.change_7d,
                month: self.change_30d,
                year: self.change_1y,
            },
            image: self.image,
        }
    }
}

fn value_as_f64(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => text.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if parsed.is_finite() { parsed } else { 0.0 }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value))
}

fn lenient_rank<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let rank = value_as_f64(&value);
    if rank >= 1.0 && rank <= u32::MAX as f64 {
        Ok(Some(rank as u32))
    } else {
        Ok(None)
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    })
}

pub(super) fn parse_market_snapshot(raw: &str) -> Result<Vec<MarketEntity>> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in market snapshot")?;

    let rows = match &parsed {
        Value::Array(rows) => rows,
        Value::Object(object) => object
            .get("data")
            .and_then(Value::as_array)
            .ok_or_else(|| anyhow!("market snapshot object has no `data` array"))?,
        _ => return Err(anyhow!("unexpected JSON type in market snapshot")),
    };

    let mut entities = Vec::with_capacity(rows.len());
    for row in rows {
        let Ok(entry) = RawMarketEntry::deserialize(row) else {
            continue;
        };
        if entry.id.trim().is_empty() {
            continue;
        }
        entities.push(entry.into_entity());
    }

    Ok(entities)
}

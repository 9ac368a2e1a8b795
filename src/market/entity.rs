use clap::ValueEnum;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum Timeframe {
    #[value(name = "1h")]
    OneHour,
    #[default]
    #[value(name = "24h")]
    Day,
    #[value(name = "7d")]
    Week,
    #[value(name = "30d")]
    Month,
    #[value(name = "1y")]
    Year,
}

impl Timeframe {
    pub const ALL: [Self; 5] = [
        Self::OneHour,
        Self::Day,
        Self::Week,
        Self::Month,
        Self::Year,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::OneHour => "1H",
            Self::Day => "24H",
            Self::Week => "7D",
            Self::Month => "30D",
            Self::Year => "1Y",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum SizingMode {
    #[default]
    Change,
    #[value(name = "marketcap")]
    MarketCap,
}

impl SizingMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Change => "Change",
            Self::MarketCap => "Market Cap & Day",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PriceChanges {
    pub hour: f64,
    pub day: f64,
    pub week: f64,
    pub month: f64,
    pub year: f64,
}

impl PriceChanges {
    pub fn for_timeframe(&self, timeframe: Timeframe) -> f64 {
        let value = match timeframe {
            Timeframe::OneHour => self.hour,
            Timeframe::Day => self.day,
            Timeframe::Week => self.week,
            Timeframe::Month => self.month,
            Timeframe::Year => self.year,
        };
        if value.is_finite() { value } else { 0.0 }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MarketEntity {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub market_cap: f64,
    pub market_cap_rank: Option<u32>,
    pub changes: PriceChanges,
    pub image: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_change_reads_as_zero() {
        let changes = PriceChanges {
            hour: f64::NAN,
            day: 4.5,
            week: f64::INFINITY,
            ..PriceChanges::default()
        };

        assert_eq!(changes.for_timeframe(Timeframe::OneHour), 0.0);
        assert_eq!(changes.for_timeframe(Timeframe::Day), 4.5);
        assert_eq!(changes.for_timeframe(Timeframe::Week), 0.0);
        assert_eq!(changes.for_timeframe(Timeframe::Year), 0.0);
    }
}

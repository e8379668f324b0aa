use serde::Deserialize;
use serde::{de::Error, Deserializer};

/// Interval written as `<number><unit>` with unit `s`, `m` or `h`, e.g. `5m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerInterval {
    Seconds(u32),
    Minutes(u32),
    Hours(u32),
}

impl SchedulerInterval {
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.len() < 2 || !s.is_char_boundary(s.len() - 1) {
            return Err(format!("Invalid interval '{s}'"));
        }
        let (num, unit) = s.split_at(s.len() - 1);
        let num: u32 = num
            .parse()
            .map_err(|e| format!("Invalid interval '{s}': {e}"))?;
        if num == 0 {
            return Err(format!("Interval '{s}' must be greater than zero"));
        }

        match unit {
            "s" => Ok(SchedulerInterval::Seconds(num)),
            "m" => Ok(SchedulerInterval::Minutes(num)),
            "h" => Ok(SchedulerInterval::Hours(num)),
            _ => Err(format!("Invalid time unit in interval '{s}'")),
        }
    }
}

impl<'de> Deserialize<'de> for SchedulerInterval {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        SchedulerInterval::parse(&s).map_err(D::Error::custom)
    }
}

impl std::fmt::Display for SchedulerInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerInterval::Seconds(s) => write!(f, "{s}s"),
            SchedulerInterval::Minutes(m) => write!(f, "{m}m"),
            SchedulerInterval::Hours(h) => write!(f, "{h}h"),
        }
    }
}

impl From<SchedulerInterval> for clokwerk::Interval {
    fn from(val: SchedulerInterval) -> Self {
        match val {
            SchedulerInterval::Seconds(s) => clokwerk::Interval::Seconds(s),
            SchedulerInterval::Minutes(m) => clokwerk::Interval::Minutes(m),
            SchedulerInterval::Hours(h) => clokwerk::Interval::Hours(h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(SchedulerInterval::parse("5m"), Ok(SchedulerInterval::Minutes(5)));
        assert_eq!(SchedulerInterval::parse("30s"), Ok(SchedulerInterval::Seconds(30)));
        assert_eq!(SchedulerInterval::parse(" 1h "), Ok(SchedulerInterval::Hours(1)));
        assert!(SchedulerInterval::parse("5d").is_err());
        assert!(SchedulerInterval::parse("m").is_err());
        assert!(SchedulerInterval::parse("0s").is_err());
        assert!(SchedulerInterval::parse("").is_err());
    }

    #[test]
    fn test_conversions() {
        let five_minutes = SchedulerInterval::Minutes(5);
        assert!(matches!(
            clokwerk::Interval::from(five_minutes),
            clokwerk::Interval::Minutes(5)
        ));
        assert_eq!(five_minutes.to_string(), "5m");
    }

    #[test]
    fn test_deserialize() {
        let interval: SchedulerInterval = serde_json::from_str("\"45s\"").unwrap();
        assert_eq!(interval, SchedulerInterval::Seconds(45));
        assert!(serde_json::from_str::<SchedulerInterval>("\"soon\"").is_err());
    }
}

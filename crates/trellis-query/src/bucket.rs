use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Relative date bucket used by the `dr` and `ld` operators.
///
/// Buckets are anchored to the local calendar day of "now", which the
/// caller supplies; this module never reads the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBucket {
    /// `lt-1d`: today.
    LastDay,
    /// `lt-2d`: yesterday.
    PrevDay,
    /// `lt-1w`: the trailing 7 calendar days including today.
    LastWeek,
    /// `lt-1m`: the trailing 30 calendar days including today.
    LastMonth,
    /// `lt-1y`: the trailing 365 calendar days including today.
    LastYear,
}

impl DateBucket {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "lt-1d" => Some(Self::LastDay),
            "lt-2d" => Some(Self::PrevDay),
            "lt-1w" => Some(Self::LastWeek),
            "lt-1m" => Some(Self::LastMonth),
            "lt-1y" => Some(Self::LastYear),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LastDay => "lt-1d",
            Self::PrevDay => "lt-2d",
            Self::LastWeek => "lt-1w",
            Self::LastMonth => "lt-1m",
            Self::LastYear => "lt-1y",
        }
    }

    /// Inclusive `[from, to]` window for this bucket, relative to `today`.
    ///
    /// Bounds are full-day: `from` is at 00:00:00 and `to` at 23:59:59.
    pub fn window(self, today: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        let (first, last) = match self {
            Self::LastDay => (today, today),
            Self::PrevDay => {
                let yesterday = today - Duration::days(1);
                (yesterday, yesterday)
            }
            Self::LastWeek => (today - Duration::days(6), today),
            Self::LastMonth => (today - Duration::days(29), today),
            Self::LastYear => (today - Duration::days(364), today),
        };
        (day_start(first), day_end(last))
    }
}

fn day_start(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn day_end(date: NaiveDate) -> NaiveDateTime {
    // 23:59:59 always exists; and_hms_opt only fails on out-of-range input
    date.and_hms_opt(23, 59, 59).unwrap()
}

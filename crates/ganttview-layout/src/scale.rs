//! Linear time scale with calendar-aligned ticks.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc, Weekday};

/// Horizontal pixels per tick used to pick the tick count
pub const PIXELS_PER_TICK: f64 = 70.0;

/// Upper bound on generated ticks
const MAX_TICKS: usize = 1000;

const SECOND: f64 = 1_000.0;
const MINUTE: f64 = 60.0 * SECOND;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const WEEK: f64 = 7.0 * DAY;
const MONTH: f64 = 30.0 * DAY;
const YEAR: f64 = 365.0 * DAY;

/// 1970-01-01 was a Thursday; the Sunday before it, in epoch milliseconds
const SUNDAY_ANCHOR: f64 = -4.0 * DAY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

/// Tick interval: a calendar unit and a step count
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInterval {
    unit: Unit,
    step: f64,
}

const LADDER: [(Unit, f64, f64); 18] = [
    (Unit::Second, 1.0, SECOND),
    (Unit::Second, 5.0, 5.0 * SECOND),
    (Unit::Second, 15.0, 15.0 * SECOND),
    (Unit::Second, 30.0, 30.0 * SECOND),
    (Unit::Minute, 1.0, MINUTE),
    (Unit::Minute, 5.0, 5.0 * MINUTE),
    (Unit::Minute, 15.0, 15.0 * MINUTE),
    (Unit::Minute, 30.0, 30.0 * MINUTE),
    (Unit::Hour, 1.0, HOUR),
    (Unit::Hour, 3.0, 3.0 * HOUR),
    (Unit::Hour, 6.0, 6.0 * HOUR),
    (Unit::Hour, 12.0, 12.0 * HOUR),
    (Unit::Day, 1.0, DAY),
    (Unit::Day, 2.0, 2.0 * DAY),
    (Unit::Week, 1.0, WEEK),
    (Unit::Month, 1.0, MONTH),
    (Unit::Month, 3.0, 3.0 * MONTH),
    (Unit::Year, 1.0, YEAR),
];

/// Number of ticks for an axis of `length` pixels
pub fn tick_count(length: f64) -> usize {
    if length <= 0.0 || !length.is_finite() {
        0
    } else {
        (length / PIXELS_PER_TICK).ceil() as usize
    }
}

/// Linear map from a time domain (epoch milliseconds) to a pixel range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl TimeScale {
    /// A zero-length domain is widened by one second on the right
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, range: (f64, f64)) -> Self {
        let d0 = start.timestamp_millis() as f64;
        let mut d1 = end.timestamp_millis() as f64;
        if d1 <= d0 {
            d1 = d0 + SECOND;
        }
        Self {
            d0,
            d1,
            r0: range.0,
            r1: range.1,
        }
    }

    pub fn domain_millis(&self) -> (f64, f64) {
        (self.d0, self.d1)
    }

    pub fn range(&self) -> (f64, f64) {
        (self.r0, self.r1)
    }

    pub fn map_millis(&self, millis: f64) -> f64 {
        self.r0 + (millis - self.d0) / (self.d1 - self.d0) * (self.r1 - self.r0)
    }

    pub fn map(&self, at: &DateTime<Utc>) -> f64 {
        self.map_millis(at.timestamp_millis() as f64)
    }

    /// Instant at a pixel position; `None` on a degenerate range
    pub fn invert(&self, x: f64) -> Option<DateTime<Utc>> {
        if self.r1 == self.r0 {
            return None;
        }
        let millis = self.d0 + (x - self.r0) / (self.r1 - self.r0) * (self.d1 - self.d0);
        DateTime::from_timestamp_millis(millis.round() as i64)
    }

    /// Interval closest to `span / count`
    pub fn tick_interval(&self, count: usize) -> Option<TickInterval> {
        if count == 0 {
            return None;
        }
        let span = self.d1 - self.d0;
        let target = span / count as f64;
        let i = LADDER.partition_point(|&(_, _, ms)| ms <= target);
        let interval = if i == LADDER.len() {
            TickInterval {
                unit: Unit::Year,
                step: linear_step(span / YEAR, count).max(1.0),
            }
        } else if i == 0 {
            TickInterval {
                unit: Unit::Millisecond,
                step: linear_step(span, count).max(1.0),
            }
        } else {
            let (unit, step, _) =
                if target / LADDER[i - 1].2 < LADDER[i].2 / target {
                    LADDER[i - 1]
                } else {
                    LADDER[i]
                };
            TickInterval { unit, step }
        };
        Some(interval)
    }

    /// Calendar-aligned tick instants inside the domain, ends inclusive
    pub fn ticks(&self, count: usize) -> Vec<DateTime<Utc>> {
        let Some(interval) = self.tick_interval(count) else {
            return Vec::new();
        };
        let millis = match interval.unit {
            Unit::Millisecond => self.fixed(interval.step, 0.0),
            Unit::Second => self.fixed(interval.step * SECOND, 0.0),
            Unit::Minute => self.fixed(interval.step * MINUTE, 0.0),
            Unit::Hour => self.fixed(interval.step * HOUR, 0.0),
            Unit::Week => self.fixed(interval.step * WEEK, SUNDAY_ANCHOR),
            Unit::Day => self.days(interval.step as u32),
            Unit::Month => self.months(interval.step as u32),
            Unit::Year => self.years(interval.step as i32),
        };
        millis
            .into_iter()
            .filter_map(|ms| DateTime::from_timestamp_millis(ms as i64))
            .collect()
    }

    fn fixed(&self, step: f64, anchor: f64) -> Vec<f64> {
        let mut out = Vec::new();
        let mut t = anchor + ((self.d0 - anchor) / step).ceil() * step;
        while t <= self.d1 && out.len() < MAX_TICKS {
            out.push(t);
            t += step;
        }
        out
    }

    fn days(&self, step: u32) -> Vec<f64> {
        let mut out = Vec::new();
        let mut t = (self.d0 / DAY).floor() * DAY;
        while t <= self.d1 && out.len() < MAX_TICKS {
            if t >= self.d0 {
                if let Some(day) = DateTime::from_timestamp_millis(t as i64) {
                    if (day.day() - 1) % step.max(1) == 0 {
                        out.push(t);
                    }
                }
            }
            t += DAY;
        }
        out
    }

    fn months(&self, step: u32) -> Vec<f64> {
        let mut out = Vec::new();
        let Some(first) = DateTime::from_timestamp_millis(self.d0 as i64) else {
            return out;
        };
        let (mut year, mut month0) = (first.year(), first.month0());
        while out.len() < MAX_TICKS {
            let Some(t) = month_start(year, month0) else {
                break;
            };
            if t > self.d1 {
                break;
            }
            if t >= self.d0 && month0 % step.max(1) == 0 {
                out.push(t);
            }
            month0 += 1;
            if month0 == 12 {
                month0 = 0;
                year += 1;
            }
        }
        out
    }

    fn years(&self, step: i32) -> Vec<f64> {
        let mut out = Vec::new();
        let Some(first) = DateTime::from_timestamp_millis(self.d0 as i64) else {
            return out;
        };
        let step = step.max(1);
        let mut year = first.year();
        while out.len() < MAX_TICKS {
            let Some(t) = month_start(year, 0) else {
                break;
            };
            if t > self.d1 {
                break;
            }
            if t >= self.d0 && year.rem_euclid(step) == 0 {
                out.push(t);
            }
            year += 1;
        }
        out
    }
}

fn month_start(year: i32, month0: u32) -> Option<f64> {
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).timestamp_millis() as f64)
}

/// Power-of-ten step times 1, 2, 5 or 10 giving about `count` ticks over `span`
fn linear_step(span: f64, count: usize) -> f64 {
    if span <= 0.0 || count == 0 {
        return 1.0;
    }
    let count = count as f64;
    let mut step = 10f64.powf((span / count).log10().floor());
    let err = count / span * step;
    if err <= 0.15 {
        step *= 10.0;
    } else if err <= 0.35 {
        step *= 5.0;
    } else if err <= 0.75 {
        step *= 2.0;
    }
    step
}

/// Multi-scale tick label picked from the finest non-zero component
pub fn format_tick(at: &DateTime<Utc>) -> String {
    let millis = at.timestamp_subsec_millis();
    if millis != 0 {
        format!(".{:03}", millis)
    } else if at.second() != 0 {
        at.format(":%S").to_string()
    } else if at.minute() != 0 {
        at.format("%I:%M").to_string()
    } else if at.hour() != 0 {
        at.format("%I %p").to_string()
    } else if at.weekday() != Weekday::Sun && at.day() != 1 {
        at.format("%a %d").to_string()
    } else if at.day() != 1 {
        at.format("%b %d").to_string()
    } else if at.month() != 1 {
        at.format("%B").to_string()
    } else {
        at.format("%Y").to_string()
    }
}

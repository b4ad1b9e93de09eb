use std::sync::LazyLock;

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Weekday};
use regex::{Captures, Regex};

/// Turns a natural-language date phrase into an absolute timestamp.
pub trait DateResolver {
    /// `None` when nothing in the phrase reads as a date or time.
    fn resolve(&self, phrase: &str) -> Option<NaiveDateTime>;
}

impl<F> DateResolver for F
where
    F: Fn(&str) -> Option<NaiveDateTime>,
{
    fn resolve(&self, phrase: &str) -> Option<NaiveDateTime> {
        self(phrase)
    }
}

/// Hour used when a phrase names a day but no time.
const DEFAULT_HOUR: u32 = 12;
const TONIGHT_HOUR: u32 = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Today,
    Tonight,
    Tomorrow,
    Yesterday,
    InOffset,
    NextUnit,
    Weekday,
    Iso,
    MonthDay,
    DayMonth,
    Slash,
}

const MONTHS: &str = "january|february|march|april|may|june|july|august|september|october|november|december|\
sept|jan|feb|mar|apr|jun|jul|aug|sep|oct|nov|dec|\
enero|febrero|marzo|abril|mayo|junio|julio|agosto|septiembre|octubre|noviembre|diciembre";

const WEEKDAYS: &str = "monday|tuesday|wednesday|thursday|friday|saturday|sunday|\
tues|thurs|mon|tue|wed|thu|fri|sat|sun";

static DATE_RULES: LazyLock<Vec<(Rule, Regex)>> = LazyLock::new(|| {
    vec![
        (Rule::Today, Regex::new(r"\b(?:today|hoy)\b").unwrap()),
        (Rule::Tonight, Regex::new(r"\btonight\b").unwrap()),
        (Rule::Tomorrow, Regex::new(r"\b(?:tomorrow|tmrw|mañana|manana)\b").unwrap()),
        (Rule::Yesterday, Regex::new(r"\b(?:yesterday|ayer)\b").unwrap()),
        (
            Rule::InOffset,
            Regex::new(r"\bin\s+(?P<count>\d+|an?|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)\s+(?P<unit>days?|weeks?|months?)\b").unwrap(),
        ),
        (Rule::NextUnit, Regex::new(r"\bnext\s+(?P<unit>week|month|year)\b").unwrap()),
        (
            Rule::Weekday,
            Regex::new(&format!(r"\b(?:(?P<modifier>next|this)\s+)?(?P<day>{})\b", WEEKDAYS)).unwrap(),
        ),
        (
            Rule::Iso,
            Regex::new(r"\b(?P<y>\d{4})-(?P<m>\d{1,2})-(?P<d>\d{1,2})\b").unwrap(),
        ),
        (
            Rule::MonthDay,
            Regex::new(&format!(r"\b(?P<month>{})\.?\s+(?P<d>\d{{1,2}})(?:st|nd|rd|th)?\b", MONTHS)).unwrap(),
        ),
        (
            Rule::DayMonth,
            Regex::new(&format!(r"\b(?P<d>\d{{1,2}})(?:st|nd|rd|th)?\s+(?:de\s+|of\s+)?(?P<month>{})\b", MONTHS)).unwrap(),
        ),
        (
            Rule::Slash,
            Regex::new(r"\b(?P<m>\d{1,2})/(?P<d>\d{1,2})(?:/(?P<y>\d{4}))?\b").unwrap(),
        ),
    ]
});

static TIME_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\b(?:at\s+)?(?P<h>\d{1,2})(?::(?P<m>\d{2}))?\s*(?P<ampm>am|pm)\b").unwrap(),
        Regex::new(r"\bat\s+(?P<h>\d{1,2})(?::(?P<m>\d{2}))?\b").unwrap(),
        Regex::new(r"\b(?P<h>\d{1,2}):(?P<m>\d{2})\b").unwrap(),
        Regex::new(r"\b(?P<noon>noon|midday|mediodía)\b").unwrap(),
        Regex::new(r"\b(?P<midnight>midnight|medianoche)\b").unwrap(),
    ]
});

/// Pattern-based resolver for the phrases people type into quick entry.
///
/// Relative expressions are anchored at `now`, which keeps resolution
/// deterministic for a given clock reading.
#[derive(Debug, Clone, Copy)]
pub struct NaturalDateResolver {
    now: NaiveDateTime,
}

impl NaturalDateResolver {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// Anchored at the local wall clock.
    pub fn local() -> Self {
        Self::new(chrono::Local::now().naive_local())
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    fn resolve_rule(&self, rule: Rule, caps: &Captures) -> Option<(NaiveDate, Option<NaiveTime>)> {
        let today = self.now.date();
        let date = match rule {
            Rule::Today => today,
            Rule::Tonight => return Some((today, NaiveTime::from_hms_opt(TONIGHT_HOUR, 0, 0))),
            Rule::Tomorrow => today.succ_opt()?,
            Rule::Yesterday => today.pred_opt()?,
            Rule::InOffset => {
                let count = parse_count(caps.name("count")?.as_str())?;
                let unit = caps.name("unit")?.as_str();
                if unit.starts_with("day") {
                    today.checked_add_days(Days::new(u64::from(count)))?
                } else if unit.starts_with("week") {
                    today.checked_add_signed(TimeDelta::try_weeks(i64::from(count))?)?
                } else {
                    today.checked_add_months(Months::new(count))?
                }
            }
            Rule::NextUnit => match caps.name("unit")?.as_str() {
                "week" => today.checked_add_days(Days::new(7))?,
                "month" => today.checked_add_months(Months::new(1))?,
                _ => today.checked_add_months(Months::new(12))?,
            },
            Rule::Weekday => {
                let target = weekday_from_name(caps.name("day")?.as_str())?;
                let ahead = (7 + target.num_days_from_monday() - today.weekday().num_days_from_monday()) % 7;
                let ahead = if caps.name("modifier").is_some_and(|m| m.as_str() == "next") {
                    ahead + 7
                } else {
                    ahead
                };
                today.checked_add_days(Days::new(u64::from(ahead)))?
            }
            Rule::Iso => NaiveDate::from_ymd_opt(
                caps["y"].parse().ok()?,
                caps["m"].parse().ok()?,
                caps["d"].parse().ok()?,
            )?,
            Rule::MonthDay | Rule::DayMonth => {
                let month = month_from_name(caps.name("month")?.as_str())?;
                let day: u32 = caps["d"].parse().ok()?;
                upcoming_date(today, month, day)?
            }
            Rule::Slash => {
                let month: u32 = caps["m"].parse().ok()?;
                let day: u32 = caps["d"].parse().ok()?;
                match caps.name("y") {
                    Some(y) => NaiveDate::from_ymd_opt(y.as_str().parse().ok()?, month, day)?,
                    None => upcoming_date(today, month, day)?,
                }
            }
        };
        Some((date, None))
    }
}

impl DateResolver for NaturalDateResolver {
    fn resolve(&self, phrase: &str) -> Option<NaiveDateTime> {
        let text = phrase.trim().to_lowercase();
        if text.is_empty() {
            return None;
        }

        // Earliest match in the phrase wins; rule order breaks ties.
        let hit = DATE_RULES
            .iter()
            .filter_map(|(rule, re)| {
                let caps = re.captures(&text)?;
                let start = caps.get(0)?.start();
                Some((start, *rule, caps))
            })
            .min_by_key(|(start, _, _)| *start);

        let explicit_time = parse_time(&text);

        match hit {
            Some((_, rule, caps)) => {
                let (date, implied_time) = self.resolve_rule(rule, &caps)?;
                let time = explicit_time
                    .or(implied_time)
                    .or_else(|| NaiveTime::from_hms_opt(DEFAULT_HOUR, 0, 0))?;
                Some(date.and_time(time))
            }
            None => explicit_time.map(|t| self.now.date().and_time(t)),
        }
    }
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    for re in TIME_RULES.iter() {
        let Some(caps) = re.captures(text) else {
            continue;
        };
        if caps.name("noon").is_some() {
            return NaiveTime::from_hms_opt(12, 0, 0);
        }
        if caps.name("midnight").is_some() {
            return NaiveTime::from_hms_opt(0, 0, 0);
        }
        let mut hour: u32 = caps.name("h")?.as_str().parse().ok()?;
        let minute: u32 = match caps.name("m") {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        match caps.name("ampm").map(|m| m.as_str()) {
            Some("am") if hour == 12 => hour = 0,
            Some("pm") if hour < 12 => hour += 12,
            Some(_) if hour > 12 => return None,
            _ => {}
        }
        if let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) {
            return Some(time);
        }
    }
    None
}

fn parse_count(s: &str) -> Option<u32> {
    let n = match s {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        digits => digits.parse().ok()?,
    };
    Some(n)
}

fn weekday_from_name(s: &str) -> Option<Weekday> {
    let day = match &s[..s.len().min(3)] {
        "mon" => Weekday::Mon,
        "tue" => Weekday::Tue,
        "wed" => Weekday::Wed,
        "thu" => Weekday::Thu,
        "fri" => Weekday::Fri,
        "sat" => Weekday::Sat,
        "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

fn month_from_name(s: &str) -> Option<u32> {
    let month = match s {
        "enero" => 1,
        "febrero" => 2,
        "marzo" => 3,
        "abril" => 4,
        "mayo" => 5,
        "junio" => 6,
        "julio" => 7,
        "agosto" => 8,
        "septiembre" => 9,
        "octubre" => 10,
        "noviembre" => 11,
        "diciembre" => 12,
        other => match other.get(..3)? {
            "jan" => 1,
            "feb" => 2,
            "mar" => 3,
            "apr" => 4,
            "may" => 5,
            "jun" => 6,
            "jul" => 7,
            "aug" => 8,
            "sep" => 9,
            "oct" => 10,
            "nov" => 11,
            "dec" => 12,
            _ => return None,
        },
    };
    Some(month)
}

/// This year's `month`/`day`, or next year's if that has already passed.
fn upcoming_date(today: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
    match this_year {
        Some(date) if date >= today => Some(date),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
    }
}

//! Compact text form of a showroom's weekly opening hours.
//!
//! Encoding groups consecutive days with identical hours, e.g.
//! `Luni-Vineri: 09:00-18:00, Sâmbătă: 09:00-14:00`. Closed days are left
//! out and break a group. Decoding is deliberately narrow: only the
//! `Luni-Vineri: H:MM-H:MM` shape is understood, and everything else gives
//! back [`WeeklySchedule::default`].

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn romanian_name(self) -> &'static str {
        match self {
            Weekday::Monday => "Luni",
            Weekday::Tuesday => "Marți",
            Weekday::Wednesday => "Miercuri",
            Weekday::Thursday => "Joi",
            Weekday::Friday => "Vineri",
            Weekday::Saturday => "Sâmbătă",
            Weekday::Sunday => "Duminică",
        }
    }
}

/// Wall-clock time with minute precision, written `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hour, minute) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("expected H:MM, got '{s}'"))?;
        if minute.len() != 2 {
            return Err(format!("expected two minute digits in '{s}'"));
        }
        let hour: u8 = hour.parse().map_err(|_| format!("invalid hour in '{s}'"))?;
        let minute: u8 = minute
            .parse()
            .map_err(|_| format!("invalid minute in '{s}'"))?;
        ClockTime::new(hour, minute).ok_or_else(|| format!("time out of range: '{s}'"))
    }
}

impl TryFrom<String> for ClockTime {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DayHours {
    Open {
        #[schema(value_type = String)]
        open: ClockTime,
        #[schema(value_type = String)]
        close: ClockTime,
    },
    Closed,
}

impl DayHours {
    fn open(open: (u8, u8), close: (u8, u8)) -> Self {
        // Only called with literal, in-range times.
        match (ClockTime::new(open.0, open.1), ClockTime::new(close.0, close.1)) {
            (Some(open), Some(close)) => DayHours::Open { open, close },
            _ => DayHours::Closed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WeeklySchedule {
    pub monday: DayHours,
    pub tuesday: DayHours,
    pub wednesday: DayHours,
    pub thursday: DayHours,
    pub friday: DayHours,
    pub saturday: DayHours,
    pub sunday: DayHours,
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        let weekday = DayHours::open((9, 0), (18, 0));
        Self {
            monday: weekday,
            tuesday: weekday,
            wednesday: weekday,
            thursday: weekday,
            friday: weekday,
            saturday: DayHours::open((9, 0), (14, 0)),
            sunday: DayHours::Closed,
        }
    }
}

impl WeeklySchedule {
    pub fn day(&self, day: Weekday) -> DayHours {
        match day {
            Weekday::Monday => self.monday,
            Weekday::Tuesday => self.tuesday,
            Weekday::Wednesday => self.wednesday,
            Weekday::Thursday => self.thursday,
            Weekday::Friday => self.friday,
            Weekday::Saturday => self.saturday,
            Weekday::Sunday => self.sunday,
        }
    }

    fn set_workdays(&mut self, hours: DayHours) {
        self.monday = hours;
        self.tuesday = hours;
        self.wednesday = hours;
        self.thursday = hours;
        self.friday = hours;
    }
}

pub const ALL_CLOSED: &str = "Închis";

pub fn encode(schedule: &WeeklySchedule) -> String {
    let mut groups: Vec<(Weekday, Weekday, DayHours)> = Vec::new();
    for day in Weekday::ALL {
        let hours = schedule.day(day);
        match groups.last_mut() {
            Some((_, last, group_hours))
                if *group_hours == hours && is_next_day(*last, day) =>
            {
                *last = day;
            }
            _ => groups.push((day, day, hours)),
        }
    }

    let parts: Vec<String> = groups
        .into_iter()
        .filter_map(|(first, last, hours)| match hours {
            DayHours::Closed => None,
            DayHours::Open { open, close } => {
                let label = if first == last {
                    first.romanian_name().to_string()
                } else {
                    format!("{}-{}", first.romanian_name(), last.romanian_name())
                };
                Some(format!("{label}: {open}-{close}"))
            }
        })
        .collect();

    if parts.is_empty() {
        ALL_CLOSED.to_string()
    } else {
        parts.join(", ")
    }
}

fn is_next_day(previous: Weekday, day: Weekday) -> bool {
    let index = |d: Weekday| Weekday::ALL.iter().position(|w| *w == d);
    matches!((index(previous), index(day)), (Some(p), Some(d)) if d == p + 1)
}

fn workday_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*Luni-Vineri:\s*(\d{1,2}:\d{2})-(\d{1,2}:\d{2})\s*(?:,|$)")
            .expect("Invalid regex")
    })
}

pub fn decode(text: &str) -> WeeklySchedule {
    let mut schedule = WeeklySchedule::default();
    let Some(captures) = workday_pattern().captures(text) else {
        return schedule;
    };
    let open = captures[1].parse::<ClockTime>();
    let close = captures[2].parse::<ClockTime>();
    if let (Ok(open), Ok(close)) = (open, close) {
        schedule.set_workdays(DayHours::Open { open, close });
    }
    schedule
}

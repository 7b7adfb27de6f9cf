//! Resolution of short natural-language date phrases.
//!
//! The grammar is deliberately small and the whole phrase must match it:
//!
//! ```text
//! phrase := date [ "at" ] [ time ] | time [ "on" ] date
//! date   := today | tomorrow | yesterday
//!         | (next | this | last) WEEKDAY
//!         | MONTH DAY [YEAR] | DAY MONTH [YEAR] | YYYY-MM-DD
//! time   := H(am|pm) | H:MM(am|pm) | H (am|pm) | HH:MM | noon | midnight
//! ```
//!
//! A bare weekday, a time with no date, or any word outside the grammar is
//! rejected instead of guessed at. Relative forms and dates without a year
//! need a reference date.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Weekday};

/// Why a phrase could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhraseError {
    #[error("empty expression")]
    Empty,

    #[error("unrecognized wording {0:?}")]
    Unrecognized(String),

    #[error("bare weekday {0:?} is ambiguous")]
    BareWeekday(String),

    #[error("a time was given without a date")]
    MissingDate,

    #[error("relative expression needs a reference date")]
    NeedsReference,

    #[error("{0} is not a valid calendar date")]
    InvalidDate(String),

    #[error("{0:?} is not a valid time of day")]
    InvalidTime(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Next,
    This,
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DateExpr {
    Offset(i64),
    Weekday(Relation, Weekday),
    Fixed(NaiveDate),
    Calendar {
        month: u32,
        day: u32,
        year: Option<i32>,
    },
}

/// Resolve `text` to a timestamp, relative to `reference` when needed.
///
/// A date without a time resolves to midnight.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use llm_output_parsers::output_parser::natural::resolve;
///
/// let reference = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let resolved = resolve("next Tuesday at 2pm", Some(reference)).unwrap();
/// assert_eq!(resolved.to_string(), "2025-03-18 14:00:00");
/// ```
pub fn resolve(text: &str, reference: Option<NaiveDateTime>) -> Result<NaiveDateTime, PhraseError> {
    let normalized = normalize(text);
    let tokens: Vec<&str> = normalized
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return Err(PhraseError::Empty);
    }

    let mut pos = 0;
    let (date, time) = if let Some((date, used)) = parse_date(&tokens)? {
        pos += used;
        let said_at = tokens.get(pos) == Some(&"at");
        if said_at {
            pos += 1;
        }
        match parse_time(&tokens[pos..])? {
            Some((time, used)) => {
                pos += used;
                (date, Some(time))
            }
            None if said_at => {
                return Err(PhraseError::Unrecognized(
                    tokens.get(pos).unwrap_or(&"at").to_string(),
                ))
            }
            None => (date, None),
        }
    } else if let Some((time, used)) = parse_time(&tokens)? {
        pos += used;
        if tokens.get(pos) == Some(&"on") {
            pos += 1;
        }
        match parse_date(&tokens[pos..])? {
            Some((date, used)) => {
                pos += used;
                (date, Some(time))
            }
            None => {
                return Err(match tokens.get(pos) {
                    Some(word) => PhraseError::Unrecognized(word.to_string()),
                    None => PhraseError::MissingDate,
                })
            }
        }
    } else {
        return Err(PhraseError::Unrecognized(tokens[0].to_string()));
    };

    if let Some(extra) = tokens.get(pos) {
        return Err(PhraseError::Unrecognized(extra.to_string()));
    }

    let day = date.resolve(reference)?;
    let (hour, minute) = time.unwrap_or((0, 0));
    day.and_hms_opt(hour, minute, 0)
        .ok_or_else(|| PhraseError::InvalidTime(format!("{hour}:{minute:02}")))
}

fn normalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let lowered = lowered.replace("a.m.", "am").replace("p.m.", "pm");
    lowered.trim_end_matches('.').to_string()
}

fn parse_date(tokens: &[&str]) -> Result<Option<(DateExpr, usize)>, PhraseError> {
    let Some(&first) = tokens.first() else {
        return Ok(None);
    };

    let relation = match first {
        "today" => return Ok(Some((DateExpr::Offset(0), 1))),
        "tomorrow" => return Ok(Some((DateExpr::Offset(1), 1))),
        "yesterday" => return Ok(Some((DateExpr::Offset(-1), 1))),
        "next" => Some(Relation::Next),
        "this" => Some(Relation::This),
        "last" => Some(Relation::Last),
        _ => None,
    };
    if let Some(relation) = relation {
        let second = tokens.get(1).copied().unwrap_or("");
        return match weekday(second) {
            Some(wd) => Ok(Some((DateExpr::Weekday(relation, wd), 2))),
            None => Err(PhraseError::Unrecognized(format!("{first} {second}").trim().to_string())),
        };
    }

    if weekday(first).is_some() {
        return Err(PhraseError::BareWeekday(first.to_string()));
    }

    if let Ok(date) = NaiveDate::parse_from_str(first, "%Y-%m-%d") {
        return Ok(Some((DateExpr::Fixed(date), 1)));
    }

    if let Some(month) = month(first) {
        let day = tokens
            .get(1)
            .and_then(|t| day_number(t))
            .ok_or_else(|| PhraseError::Unrecognized(first.to_string()))?;
        let year = tokens.get(2).and_then(|t| year_number(t));
        let used = if year.is_some() { 3 } else { 2 };
        return Ok(Some((DateExpr::Calendar { month, day, year }, used)));
    }

    if let Some(day) = day_number(first) {
        if let Some(month) = tokens.get(1).and_then(|t| month(t)) {
            let year = tokens.get(2).and_then(|t| year_number(t));
            let used = if year.is_some() { 3 } else { 2 };
            return Ok(Some((DateExpr::Calendar { month, day, year }, used)));
        }
    }

    Ok(None)
}

/// Returns `(hour, minute)` in 24-hour form plus tokens consumed.
fn parse_time(tokens: &[&str]) -> Result<Option<((u32, u32), usize)>, PhraseError> {
    let Some(&first) = tokens.first() else {
        return Ok(None);
    };

    match first {
        "noon" => return Ok(Some(((12, 0), 1))),
        "midnight" => return Ok(Some(((0, 0), 1))),
        _ => {}
    }

    let starts_with_digit = first.starts_with(|c: char| c.is_ascii_digit());
    if !starts_with_digit {
        return Ok(None);
    }

    for (suffix, pm) in [("am", false), ("pm", true)] {
        if let Some(clock) = first.strip_suffix(suffix) {
            return twelve_hour(clock, pm, first).map(|hm| Some((hm, 1)));
        }
    }

    if let Some(&meridiem @ ("am" | "pm")) = tokens.get(1) {
        return twelve_hour(first, meridiem == "pm", first).map(|hm| Some((hm, 2)));
    }

    if first.contains(':') {
        return twenty_four_hour(first).map(|hm| Some((hm, 1)));
    }

    Ok(None)
}

fn twelve_hour(clock: &str, pm: bool, shown: &str) -> Result<(u32, u32), PhraseError> {
    let invalid = || PhraseError::InvalidTime(shown.to_string());
    let (hour, minute) = split_clock(clock).ok_or_else(invalid)?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return Err(invalid());
    }
    let hour = hour % 12 + if pm { 12 } else { 0 };
    Ok((hour, minute))
}

fn twenty_four_hour(clock: &str) -> Result<(u32, u32), PhraseError> {
    let invalid = || PhraseError::InvalidTime(clock.to_string());
    let (hour, minute) = split_clock(clock).ok_or_else(invalid)?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok((hour, minute))
}

/// `"2"` -> `(2, 0)`, `"2:30"` -> `(2, 30)`.
fn split_clock(clock: &str) -> Option<(u32, u32)> {
    let all_digits = |s: &str| !s.is_empty() && s.len() <= 2 && s.bytes().all(|b| b.is_ascii_digit());
    match clock.split_once(':') {
        Some((h, m)) if all_digits(h) && m.len() == 2 && all_digits(m) => {
            Some((h.parse().ok()?, m.parse().ok()?))
        }
        None if all_digits(clock) => Some((clock.parse().ok()?, 0)),
        _ => None,
    }
}

fn weekday(word: &str) -> Option<Weekday> {
    Some(match word {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thur" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    })
}

fn month(word: &str) -> Option<u32> {
    Some(match word {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    })
}

/// `"15"`, `"15th"`, `"1st"` -> day of month.
fn day_number(word: &str) -> Option<u32> {
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| word.strip_suffix(suffix))
        .unwrap_or(word);
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|d| (1..=31).contains(d))
}

fn year_number(word: &str) -> Option<i32> {
    if word.len() == 4 && word.bytes().all(|b| b.is_ascii_digit()) {
        word.parse().ok()
    } else {
        None
    }
}

impl DateExpr {
    fn resolve(&self, reference: Option<NaiveDateTime>) -> Result<NaiveDate, PhraseError> {
        let base = || reference.map(|r| r.date()).ok_or(PhraseError::NeedsReference);
        let overflow = || PhraseError::InvalidDate("out of range".into());

        match *self {
            DateExpr::Fixed(date) => Ok(date),
            DateExpr::Offset(days) => {
                let base = base()?;
                let shifted = if days >= 0 {
                    base.checked_add_days(Days::new(days.unsigned_abs()))
                } else {
                    base.checked_sub_days(Days::new(days.unsigned_abs()))
                };
                shifted.ok_or_else(overflow)
            }
            DateExpr::Weekday(relation, target) => {
                let base = base()?;
                let current = i64::from(base.weekday().num_days_from_monday());
                let target = i64::from(target.num_days_from_monday());
                match relation {
                    Relation::Next | Relation::This => {
                        let mut ahead = (target - current).rem_euclid(7);
                        if ahead == 0 && relation == Relation::Next {
                            ahead = 7;
                        }
                        base.checked_add_days(Days::new(ahead as u64))
                            .ok_or_else(overflow)
                    }
                    Relation::Last => {
                        let mut back = (current - target).rem_euclid(7);
                        if back == 0 {
                            back = 7;
                        }
                        base.checked_sub_days(Days::new(back as u64))
                            .ok_or_else(overflow)
                    }
                }
            }
            DateExpr::Calendar { month, day, year } => {
                let year = match year {
                    Some(y) => y,
                    None => base()?.year(),
                };
                NaiveDate::from_ymd_opt(year, month, day)
                    .ok_or_else(|| PhraseError::InvalidDate(format!("{year}-{month:02}-{day:02}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Wednesday, 12 March 2025, 09:00.
    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 12)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn ok(text: &str) -> NaiveDateTime {
        resolve(text, Some(reference())).unwrap()
    }

    #[test]
    fn next_tuesday_at_two() {
        assert_eq!(ok("next Tuesday at 2pm"), at(2025, 3, 18, 14, 0));
        assert_eq!(ok("Next Tuesday at 2 p.m."), at(2025, 3, 18, 14, 0));
    }

    #[test]
    fn next_same_weekday_is_a_week_out() {
        assert_eq!(ok("next wednesday"), at(2025, 3, 19, 0, 0));
        assert_eq!(ok("this wednesday"), at(2025, 3, 12, 0, 0));
        assert_eq!(ok("last wednesday"), at(2025, 3, 5, 0, 0));
    }

    #[test]
    fn relative_days() {
        assert_eq!(ok("tomorrow at noon"), at(2025, 3, 13, 12, 0));
        assert_eq!(ok("yesterday"), at(2025, 3, 11, 0, 0));
        assert_eq!(ok("today 14:30"), at(2025, 3, 12, 14, 30));
    }

    #[test]
    fn calendar_dates() {
        assert_eq!(ok("June 15, 2025"), at(2025, 6, 15, 0, 0));
        assert_eq!(ok("15th June 2025 at 9:30am"), at(2025, 6, 15, 9, 30));
        assert_eq!(ok("Jan 3"), at(2025, 1, 3, 0, 0));
        assert_eq!(ok("2025-06-15"), at(2025, 6, 15, 0, 0));
    }

    #[test]
    fn time_before_date() {
        assert_eq!(ok("8am on next monday"), at(2025, 3, 17, 8, 0));
        assert_eq!(ok("midnight tomorrow"), at(2025, 3, 13, 0, 0));
    }

    #[test]
    fn twelve_am_and_pm() {
        assert_eq!(ok("today at 12am"), at(2025, 3, 12, 0, 0));
        assert_eq!(ok("today at 12pm"), at(2025, 3, 12, 12, 0));
    }

    #[test]
    fn vague_phrasing_rejected() {
        assert_eq!(
            resolve("by Vikas' desk by 8am Monday morning", Some(reference())),
            Err(PhraseError::Unrecognized("by".into()))
        );
        assert_eq!(
            resolve("sometime next week, maybe", Some(reference())),
            Err(PhraseError::Unrecognized("sometime".into()))
        );
        assert_eq!(
            resolve("next week", Some(reference())),
            Err(PhraseError::Unrecognized("next week".into()))
        );
    }

    #[test]
    fn bare_weekday_is_ambiguous() {
        assert_eq!(
            resolve("8am Monday", Some(reference())),
            Err(PhraseError::BareWeekday("monday".into()))
        );
    }

    #[test]
    fn trailing_words_rejected() {
        assert_eq!(
            resolve("tomorrow morning", Some(reference())),
            Err(PhraseError::Unrecognized("morning".into()))
        );
    }

    #[test]
    fn time_alone_needs_date() {
        assert_eq!(resolve("2pm", Some(reference())), Err(PhraseError::MissingDate));
    }

    #[test]
    fn relative_needs_reference() {
        assert_eq!(resolve("tomorrow", None), Err(PhraseError::NeedsReference));
        assert_eq!(resolve("June 15", None), Err(PhraseError::NeedsReference));
        assert!(resolve("June 15, 2025", None).is_ok());
    }

    #[test]
    fn impossible_values_rejected() {
        assert!(matches!(
            resolve("February 30, 2025", None),
            Err(PhraseError::InvalidDate(_))
        ));
        assert!(matches!(
            resolve("today at 13pm", Some(reference())),
            Err(PhraseError::InvalidTime(_))
        ));
        assert!(matches!(
            resolve("today at 25:00", Some(reference())),
            Err(PhraseError::InvalidTime(_))
        ));
    }

    #[test]
    fn empty_rejected() {
        assert_eq!(resolve(" . ", None), Err(PhraseError::Empty));
    }
}

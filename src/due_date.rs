//! Due-date derivation and today/backlog classification.
//!
//! Everything here is a pure function of its arguments. The caller supplies
//! `today`; nothing in this module reads the clock.

use crate::error::TodoError;
use crate::models::{DuePeriod, Todo};
use chrono::{Datelike, Days, Month, NaiveDate};

pub const ISO_DATE: &str = "%Y-%m-%d";

// Highest week number `week_of_year` can produce (Dec 31 of a leap year starting on Saturday)
const MAX_WEEK: u32 = 54;

/// What the user picked for a period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeriodSelection {
    Day(NaiveDate),
    Week { year: i32, week: u32 },
    Month { year: i32, month: u32 },
    Year(i32),
}

impl PeriodSelection {
    /// Selection covering `today` for the given period.
    pub fn current(period: DuePeriod, today: NaiveDate) -> Option<PeriodSelection> {
        match period {
            DuePeriod::Day => Some(PeriodSelection::Day(today)),
            DuePeriod::Week => {
                let (year, week) = week_of_year(today);
                Some(PeriodSelection::Week { year, week })
            }
            DuePeriod::Month => Some(PeriodSelection::Month {
                year: today.year(),
                month: today.month(),
            }),
            DuePeriod::Year => Some(PeriodSelection::Year(today.year())),
            DuePeriod::Unspecified => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bucket {
    Today,
    Backlog,
}

/// Derives the canonical due date for a period selection.
///
/// A missing selection falls back to the period unit containing `today`.
/// `Unspecified` always yields `None`.
pub fn resolve_due_date(
    period: DuePeriod,
    selection: Option<PeriodSelection>,
    today: NaiveDate,
) -> Result<Option<NaiveDate>, TodoError> {
    if period == DuePeriod::Unspecified {
        return Ok(None);
    }

    let selection = match selection {
        Some(selection) => selection,
        None => match PeriodSelection::current(period, today) {
            Some(selection) => selection,
            None => return Ok(None),
        },
    };

    let date = match (period, selection) {
        (DuePeriod::Day, PeriodSelection::Day(date)) => date,
        (DuePeriod::Week, PeriodSelection::Week { year, week }) => last_day_of_week(year, week)?,
        (DuePeriod::Month, PeriodSelection::Month { year, month }) => {
            last_day_of_month(year, month)?
        }
        (DuePeriod::Year, PeriodSelection::Year(year)) => last_day_of_year(year)?,
        (period, selection) => {
            return Err(TodoError::InvalidPeriodSelection(format!(
                "{:?} does not describe a {}",
                selection, period
            )))
        }
    };

    Ok(Some(date))
}

/// Week number of `date` where week 1 starts on Jan 1 and each following
/// week starts on a Sunday.
pub fn week_of_year(date: NaiveDate) -> (i32, u32) {
    let jan_1_weekday = first_of_year(date.year())
        .map(|jan_1| jan_1.weekday().num_days_from_sunday())
        .unwrap_or(0);
    let week = (date.ordinal() + jan_1_weekday + 6) / 7;
    (date.year(), week)
}

/// Sunday closing the given week: `Jan 1 + (week - 1) * 7` advanced by
/// `7 - weekday` days. A start already on Sunday moves a full week.
pub fn last_day_of_week(year: i32, week: u32) -> Result<NaiveDate, TodoError> {
    if !(1..=MAX_WEEK).contains(&week) {
        return Err(TodoError::InvalidPeriodSelection(format!(
            "week {} is outside 1-{}",
            week, MAX_WEEK
        )));
    }

    let start = first_of_year(year)?
        .checked_add_days(Days::new(u64::from(week - 1) * 7))
        .ok_or_else(|| out_of_range(year))?;
    let weekday = start.weekday().num_days_from_sunday();

    start
        .checked_add_days(Days::new(u64::from(7 - weekday)))
        .ok_or_else(|| out_of_range(year))
}

pub fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate, TodoError> {
    if !(1..=12).contains(&month) {
        return Err(TodoError::InvalidPeriodSelection(format!(
            "month {} is outside 1-12",
            month
        )));
    }

    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1).ok_or_else(|| out_of_range(year))?, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .ok_or_else(|| out_of_range(year))
}

pub fn last_day_of_year(year: i32) -> Result<NaiveDate, TodoError> {
    NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(|| out_of_range(year))
}

fn first_of_year(year: i32) -> Result<NaiveDate, TodoError> {
    NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| out_of_range(year))
}

fn out_of_range(year: i32) -> TodoError {
    TodoError::InvalidPeriodSelection(format!("year {} is out of range", year))
}

/// Which list a todo belongs to, or `None` when it is overdue and not a
/// daily item.
pub fn classify(todo: &Todo, today: NaiveDate) -> Option<Bucket> {
    if todo.due_period == Some(DuePeriod::Day) || todo.due_date == Some(today) {
        return Some(Bucket::Today);
    }

    match todo.due_date {
        None => Some(Bucket::Backlog),
        Some(due) if due > today => Some(Bucket::Backlog),
        Some(_) => None,
    }
}

/// Splits fetched todos into (today, backlog), keeping store order.
pub fn partition(todos: Vec<Todo>, today: NaiveDate) -> (Vec<Todo>, Vec<Todo>) {
    let mut today_list = Vec::new();
    let mut backlog = Vec::new();

    for todo in todos {
        match classify(&todo, today) {
            Some(Bucket::Today) => today_list.push(todo),
            Some(Bucket::Backlog) => backlog.push(todo),
            None => {}
        }
    }

    (today_list, backlog)
}

/// Plain string comparison, valid for zero-padded ISO dates.
pub fn is_overdue(due_date: &str, today: NaiveDate) -> bool {
    due_date < today.format(ISO_DATE).to_string().as_str()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DisplayLocale {
    #[default]
    Korean,
    English,
}

impl DisplayLocale {
    /// Unknown tags fall back to Korean.
    pub fn from_tag(tag: &str) -> DisplayLocale {
        let lang = tag.split(['-', '_']).next().unwrap_or_default();
        if lang.eq_ignore_ascii_case("en") {
            DisplayLocale::English
        } else {
            DisplayLocale::Korean
        }
    }
}

/// Long-form date, e.g. `2025년 3월 1일` or `March 1, 2025`. Empty when
/// `due_date` is not an ISO date.
pub fn format_for_display(due_date: &str, locale: DisplayLocale) -> String {
    let date = match NaiveDate::parse_from_str(due_date, ISO_DATE) {
        Ok(date) => date,
        Err(_) => return String::new(),
    };

    match locale {
        DisplayLocale::Korean => {
            format!("{}년 {}월 {}일", date.year(), date.month(), date.day())
        }
        DisplayLocale::English => {
            let month = u8::try_from(date.month())
                .ok()
                .and_then(|m| Month::try_from(m).ok())
                .map(|m| m.name())
                .unwrap_or_default();
            format!("{} {}, {}", month, date.day(), date.year())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TodoStatus;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn todo(due_period: Option<DuePeriod>, due_date: Option<NaiveDate>) -> Todo {
        let stamp = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Todo {
            id: "id".to_string(),
            title: "title".to_string(),
            status: TodoStatus::Pending,
            due_date,
            due_period,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    fn resolve(period: DuePeriod, selection: PeriodSelection) -> String {
        resolve_due_date(period, Some(selection), date(2025, 6, 15))
            .unwrap()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_month_last_day_handles_leap_years() {
        let leap = PeriodSelection::Month { year: 2024, month: 2 };
        let common = PeriodSelection::Month { year: 2023, month: 2 };
        assert_eq!(resolve(DuePeriod::Month, leap), "2024-02-29");
        assert_eq!(resolve(DuePeriod::Month, common), "2023-02-28");
        assert_eq!(
            resolve(DuePeriod::Month, PeriodSelection::Month { year: 1900, month: 2 }),
            "1900-02-28"
        );
    }

    #[test]
    fn test_month_last_day_for_every_month() {
        let expected = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        for (i, days) in expected.iter().enumerate() {
            let month = i as u32 + 1;
            assert_eq!(last_day_of_month(2025, month).unwrap(), date(2025, month, *days));
        }
    }

    #[test]
    fn test_year_resolves_to_december_31() {
        assert_eq!(resolve(DuePeriod::Year, PeriodSelection::Year(2025)), "2025-12-31");
    }

    #[test]
    fn test_first_week_ends_on_first_sunday() {
        let week_1 = PeriodSelection::Week { year: 2025, week: 1 };
        assert_eq!(resolve(DuePeriod::Week, week_1), "2025-01-05");
    }

    #[test]
    fn test_week_starting_on_sunday_moves_a_full_week() {
        // Jan 1 2023 is a Sunday
        assert_eq!(last_day_of_week(2023, 1).unwrap(), date(2023, 1, 8));
    }

    #[test]
    fn test_late_week_spills_into_next_year() {
        // week 53 starts on Wed Dec 31 2025
        assert_eq!(last_day_of_week(2025, 53).unwrap(), date(2026, 1, 4));
    }

    #[test]
    fn test_week_of_year_convention() {
        assert_eq!(week_of_year(date(2025, 1, 1)), (2025, 1));
        assert_eq!(week_of_year(date(2025, 1, 4)), (2025, 1));
        assert_eq!(week_of_year(date(2025, 1, 5)), (2025, 2));
        assert_eq!(week_of_year(date(2023, 1, 1)), (2023, 1));
        assert_eq!(week_of_year(date(2023, 1, 7)), (2023, 1));
        assert_eq!(week_of_year(date(2023, 1, 8)), (2023, 2));
    }

    #[test]
    fn test_day_is_returned_unchanged() {
        let picked = date(2025, 3, 14);
        assert_eq!(resolve(DuePeriod::Day, PeriodSelection::Day(picked)), "2025-03-14");
    }

    #[test]
    fn test_unspecified_yields_nothing() {
        let today = date(2025, 6, 15);
        assert_eq!(resolve_due_date(DuePeriod::Unspecified, None, today).unwrap(), None);
        assert_eq!(
            resolve_due_date(DuePeriod::Unspecified, Some(PeriodSelection::Year(2030)), today)
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_missing_selection_uses_current_unit() {
        let today = date(2025, 2, 10);
        let month = resolve_due_date(DuePeriod::Month, None, today).unwrap();
        assert_eq!(month, Some(date(2025, 2, 28)));
        let day = resolve_due_date(DuePeriod::Day, None, today).unwrap();
        assert_eq!(day, Some(today));
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let selection = PeriodSelection::Week { year: 2024, week: 20 };
        assert_eq!(
            resolve(DuePeriod::Week, selection),
            resolve(DuePeriod::Week, selection)
        );
    }

    #[test]
    fn test_out_of_range_selections_are_rejected() {
        let today = date(2025, 6, 15);
        let cases = [
            (DuePeriod::Month, PeriodSelection::Month { year: 2025, month: 13 }),
            (DuePeriod::Month, PeriodSelection::Month { year: 2025, month: 0 }),
            (DuePeriod::Week, PeriodSelection::Week { year: 2025, week: 0 }),
            (DuePeriod::Week, PeriodSelection::Week { year: 2025, week: 55 }),
            (DuePeriod::Year, PeriodSelection::Year(i32::MAX)),
        ];
        for (period, selection) in cases {
            let result = resolve_due_date(period, Some(selection), today);
            assert!(
                matches!(result, Err(TodoError::InvalidPeriodSelection(_))),
                "{:?} should be rejected",
                selection
            );
        }
    }

    #[test]
    fn test_mismatched_selection_is_rejected() {
        let result = resolve_due_date(
            DuePeriod::Week,
            Some(PeriodSelection::Month { year: 2025, month: 5 }),
            date(2025, 6, 15),
        );
        assert!(matches!(result, Err(TodoError::InvalidPeriodSelection(_))));
    }

    #[test]
    fn test_daily_todo_is_always_today() {
        let today = date(2025, 6, 15);
        for due in [None, Some(date(2020, 1, 1)), Some(date(2030, 1, 1))] {
            assert_eq!(classify(&todo(Some(DuePeriod::Day), due), today), Some(Bucket::Today));
        }
    }

    #[test]
    fn test_due_today_is_today() {
        let today = date(2025, 6, 15);
        let item = todo(Some(DuePeriod::Week), Some(today));
        assert_eq!(classify(&item, today), Some(Bucket::Today));
    }

    #[test]
    fn test_undated_todo_is_backlog() {
        let today = date(2025, 6, 15);
        assert_eq!(classify(&todo(None, None), today), Some(Bucket::Backlog));
        assert_eq!(
            classify(&todo(Some(DuePeriod::Unspecified), None), today),
            Some(Bucket::Backlog)
        );
    }

    #[test]
    fn test_future_todo_is_backlog() {
        let today = date(2025, 6, 15);
        let item = todo(Some(DuePeriod::Month), Some(date(2025, 6, 30)));
        assert_eq!(classify(&item, today), Some(Bucket::Backlog));
    }

    #[test]
    fn test_overdue_non_daily_todo_is_dropped() {
        let today = date(2025, 6, 15);
        let item = todo(Some(DuePeriod::Year), Some(date(2024, 12, 31)));
        assert_eq!(classify(&item, today), None);
    }

    #[test]
    fn test_partition_keeps_order() {
        let today = date(2025, 6, 15);
        let mut a = todo(None, None);
        a.id = "a".to_string();
        let mut b = todo(Some(DuePeriod::Day), Some(today));
        b.id = "b".to_string();
        let mut c = todo(Some(DuePeriod::Month), Some(date(2025, 1, 31)));
        c.id = "c".to_string();
        let mut d = todo(Some(DuePeriod::Year), Some(date(2025, 12, 31)));
        d.id = "d".to_string();

        let (today_list, backlog) = partition(vec![a, b, c, d], today);
        let ids = |todos: &[Todo]| todos.iter().map(|t| t.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&today_list), vec!["b"]);
        assert_eq!(ids(&backlog), vec!["a", "d"]);
    }

    #[test]
    fn test_is_overdue() {
        let today = date(2025, 1, 2);
        assert!(is_overdue("2025-01-01", today));
        assert!(!is_overdue("2025-01-02", today));
        assert!(!is_overdue("2025-02-01", today));
    }

    #[test]
    fn test_format_for_display() {
        assert_eq!(format_for_display("2025-03-01", DisplayLocale::Korean), "2025년 3월 1일");
        assert_eq!(format_for_display("2025-03-01", DisplayLocale::English), "March 1, 2025");
        assert_eq!(format_for_display("not a date", DisplayLocale::Korean), "");
    }

    #[test]
    fn test_locale_tags() {
        assert_eq!(DisplayLocale::from_tag("en-US"), DisplayLocale::English);
        assert_eq!(DisplayLocale::from_tag("ko-KR"), DisplayLocale::Korean);
        assert_eq!(DisplayLocale::from_tag("fr"), DisplayLocale::Korean);
    }
}

use crate::due_date::{resolve_due_date, week_of_year, PeriodSelection, ISO_DATE};
use crate::error::TodoError;
use crate::models::{DuePeriod, NewTodo, MAX_TITLE_CHARS};
use chrono::NaiveDate;
use regex::Regex;

pub fn normalize_title(input: &str) -> String {
    input.trim().to_string()
}

pub fn validate_title(input: &str) -> Result<String, TodoError> {
    let title = normalize_title(input);

    if title.is_empty() {
        return Err(TodoError::EmptyTitle);
    }

    let len = title.chars().count();
    if len > MAX_TITLE_CHARS {
        return Err(TodoError::TitleTooLong {
            len,
            max: MAX_TITLE_CHARS,
        });
    }

    Ok(title)
}

/// Parses the typed selection for `period`. Empty input selects the unit
/// containing `today`.
pub fn parse_selection(
    period: DuePeriod,
    input: &str,
    today: NaiveDate,
) -> Result<Option<PeriodSelection>, TodoError> {
    let input = input.trim();

    if period == DuePeriod::Unspecified {
        return Ok(None);
    }
    if input.is_empty() {
        return Ok(PeriodSelection::current(period, today));
    }

    let selection = match period {
        DuePeriod::Day => PeriodSelection::Day(parse_date(input)?),
        DuePeriod::Week => {
            let (year, week) = week_of_year(parse_date(input)?);
            PeriodSelection::Week { year, week }
        }
        DuePeriod::Month => {
            let month_re = Regex::new(r"^(-?\d{1,6})-(\d{1,2})$").unwrap();
            let caps = month_re
                .captures(input)
                .ok_or_else(|| invalid(input, period))?;
            let year = caps[1].parse::<i32>().map_err(|_| invalid(input, period))?;
            let month = caps[2].parse::<u32>().map_err(|_| invalid(input, period))?;
            PeriodSelection::Month { year, month }
        }
        DuePeriod::Year => {
            let year_re = Regex::new(r"^-?\d{1,6}$").unwrap();
            if !year_re.is_match(input) {
                return Err(invalid(input, period));
            }
            let year = input.parse::<i32>().map_err(|_| invalid(input, period))?;
            PeriodSelection::Year(year)
        }
        DuePeriod::Unspecified => return Ok(None),
    };

    Ok(Some(selection))
}

/// Validates the title, then resolves the due date.
pub fn build_new_todo(
    title: &str,
    period: DuePeriod,
    selection_input: &str,
    today: NaiveDate,
) -> Result<NewTodo, TodoError> {
    let title = validate_title(title)?;
    let selection = parse_selection(period, selection_input, today)?;
    let due_date = resolve_due_date(period, selection, today)?;

    let due_period = match period {
        DuePeriod::Unspecified => None,
        period => Some(period),
    };

    Ok(NewTodo {
        title,
        due_period,
        due_date,
    })
}

fn parse_date(input: &str) -> Result<NaiveDate, TodoError> {
    NaiveDate::parse_from_str(input, ISO_DATE)
        .map_err(|_| TodoError::InvalidPeriodSelection(format!("'{}' is not a YYYY-MM-DD date", input)))
}

fn invalid(input: &str, period: DuePeriod) -> TodoError {
    TodoError::InvalidPeriodSelection(format!(
        "'{}' is not a valid {} (expected {})",
        input,
        period,
        period.selection_hint()
    ))
}

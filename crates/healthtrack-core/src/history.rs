//! Month calendar and per-day detail for browsing past records.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::nutrition::{FoodRecord, NutritionTotals};
use crate::storage::Store;
use crate::tracking::RunRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub has_data: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

impl MonthCalendar {
    pub fn build(store: &Store, year: i32, month: u32) -> Result<Self> {
        let first = first_of_month(year, month)?;
        let with_data = store.dates_with_data(year, month)?;
        let days = first
            .iter_days()
            .take_while(|d| d.month() == month)
            .map(|date| CalendarDay {
                date,
                has_data: with_data.contains(&date),
            })
            .collect();
        Ok(Self { year, month, days })
    }

    /// Blank cells before the 1st in a Monday-first grid.
    pub fn leading_blanks(&self) -> u32 {
        self.days
            .first()
            .map(|d| d.date.weekday().num_days_from_monday())
            .unwrap_or(0)
    }

    /// Monday-first rows of day numbers, `None` for padding.
    pub fn weeks(&self) -> Vec<[Option<CalendarDay>; 7]> {
        let mut weeks = Vec::new();
        let mut row: [Option<CalendarDay>; 7] = [None; 7];
        let mut col = self.leading_blanks() as usize;
        for day in &self.days {
            row[col] = Some(*day);
            col += 1;
            if col == 7 || day.date.weekday() == Weekday::Sun {
                weeks.push(row);
                row = [None; 7];
                col = 0;
            }
        }
        if col != 0 {
            weeks.push(row);
        }
        weeks
    }

    pub fn previous(&self) -> (i32, u32) {
        if self.month == 1 {
            (self.year - 1, 12)
        } else {
            (self.year, self.month - 1)
        }
    }

    pub fn next(&self) -> (i32, u32) {
        if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        }
    }
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        ValidationError::InvalidValue {
            field: "month".into(),
            message: format!("{year}-{month:02} is not a valid month"),
        }
        .into()
    })
}

/// Everything recorded on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayDetail {
    pub date: NaiveDate,
    pub runs: Vec<RunRecord>,
    pub foods: Vec<FoodRecord>,
    pub nutrition: NutritionTotals,
}

impl DayDetail {
    pub fn load(store: &Store, date: NaiveDate) -> Result<Self> {
        let runs = store.load_runs(date)?.runs;
        let foods = store.load_food_day(date)?.foods;
        let nutrition = NutritionTotals::from_records(&foods);
        Ok(Self {
            date,
            runs,
            foods,
            nutrition,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty() && self.foods.is_empty()
    }

    pub fn total_distance_m(&self) -> f64 {
        self.runs.iter().map(|r| r.distance).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar(year: i32, month: u32) -> MonthCalendar {
        let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
        MonthCalendar {
            year,
            month,
            days: first
                .iter_days()
                .take_while(|d| d.month() == month)
                .map(|date| CalendarDay { date, has_data: false })
                .collect(),
        }
    }

    #[test]
    fn february_grid() {
        // 2026-02-01 is a Sunday.
        let cal = calendar(2026, 2);
        assert_eq!(cal.days.len(), 28);
        assert_eq!(cal.leading_blanks(), 6);
        let weeks = cal.weeks();
        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[0][6].unwrap().date.day(), 1);
        assert!(weeks[0][0].is_none());
        assert_eq!(weeks[4][5].unwrap().date.day(), 28);
        assert!(weeks[4][6].is_none());
    }

    #[test]
    fn month_navigation_wraps_years() {
        assert_eq!(calendar(2026, 1).previous(), (2025, 12));
        assert_eq!(calendar(2026, 12).next(), (2027, 1));
        assert_eq!(calendar(2026, 6).next(), (2026, 7));
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert!(first_of_month(2026, 13).is_err());
    }
}

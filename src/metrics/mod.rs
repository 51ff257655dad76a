//! The analytical vocabulary: pure aggregate functions over normalized tables.
//!
//! Conventions shared by every function here:
//! - inputs are borrowed slices, never mutated
//! - sums over an empty selection are `0`; means, lookups and arg-max/min are `None`
//! - grouped results keep first-encountered order, so ties resolve to the earliest entity
//! - share, velocity and per-SKU figures are averaged; unit and income totals are summed

mod agg;
pub mod channels;
pub mod media;
pub mod organic;
pub mod overall;
pub mod sales;

pub use agg::{name_contains, same_name};

use crate::schema::WeeklyRow;

/// Week / year filter. `None` leaves that dimension unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Period {
    pub week: Option<u32>,
    pub year: Option<i32>,
}

impl Period {
    pub const ALL: Period = Period {
        week: None,
        year: None,
    };

    pub const fn new(week: Option<u32>, year: Option<i32>) -> Self {
        Self { week, year }
    }

    pub const fn week(week: u32) -> Self {
        Self {
            week: Some(week),
            year: None,
        }
    }

    pub fn with_year(self, year: Option<i32>) -> Self {
        Self { year, ..self }
    }

    pub fn matches<R: WeeklyRow + ?Sized>(&self, row: &R) -> bool {
        self.week.map_or(true, |w| row.week() == Some(w))
            && self.year.map_or(true, |y| row.year() == Some(y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Descending,
    Ascending,
}

//! Job-market statistics over the career dataset.

mod filters;
mod query;
mod service;

pub use filters::{
    education_filter, experience_filter, parse_min_salary, state_abbreviation, EducationFilter,
    FilterParams, Filters,
};
pub use service::{CalculationResult, SalaryInfo, StatsService};

//! Statistics calculations over the career dataset.

use serde::Serialize;
use sqlx::{PgPool, Row};
use tracing::debug;

use super::filters::Filters;
use super::query;
use crate::error::Result;

/// Aggregated job-market statistics for one set of filters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    /// Matching jobs as a share of nation-wide employment, in percent.
    pub percentage: f64,
    /// Matching jobs as a share of the queried area's employment.
    pub percentage_region: f64,
    pub matching_jobs: i64,
    pub total_jobs: i64,
    pub total_jobs_region: i64,
    pub location: String,
    /// Whether the median salary of the matching rows clears the floor.
    pub min_salary_met: bool,
    pub salary_info: SalaryInfo,
}

/// Salary distribution across the matching rows, in whole dollars.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryInfo {
    pub median_salary: i64,
    pub pct10_salary: i64,
    pub pct25_salary: i64,
    pub pct75_salary: i64,
    pub pct90_salary: i64,
}

/// Query service over the `career_data` table.
#[derive(Clone)]
pub struct StatsService {
    pool: PgPool,
}

impl StatsService {
    /// Create a service backed by the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the job-opportunity calculation for one set of filters.
    pub async fn calculate(&self, filters: &Filters) -> Result<CalculationResult> {
        debug!(
            location = %filters.location,
            occupation = %filters.occupation,
            "Running calculation"
        );

        let row = query::matching_jobs(filters)
            .build()
            .fetch_one(&self.pool)
            .await?;

        // Aggregates over an empty match are NULL.
        let matching_jobs: Option<f64> = row.try_get("matching_jobs")?;
        let median_salary: Option<f64> = row.try_get("median_salary")?;
        let pct10_salary: Option<f64> = row.try_get("pct10_salary")?;
        let pct25_salary: Option<f64> = row.try_get("pct25_salary")?;
        let pct75_salary: Option<f64> = row.try_get("pct75_salary")?;
        let pct90_salary: Option<f64> = row.try_get("pct90_salary")?;

        let total_jobs: i64 = sqlx::query_scalar(query::NATIONAL_TOTAL)
            .fetch_one(&self.pool)
            .await?;
        let total_jobs_region: i64 = sqlx::query_scalar(query::REGIONAL_TOTAL)
            .bind(&filters.location)
            .fetch_one(&self.pool)
            .await?;

        let matching = matching_jobs.unwrap_or(0.0);

        Ok(CalculationResult {
            percentage: percentage_of(matching, total_jobs),
            percentage_region: percentage_of(matching, total_jobs_region),
            matching_jobs: matching as i64,
            total_jobs,
            total_jobs_region,
            location: filters.location.clone(),
            min_salary_met: meets_min_salary(median_salary, filters.min_salary),
            salary_info: SalaryInfo {
                median_salary: median_salary.unwrap_or(0.0) as i64,
                pct10_salary: pct10_salary.unwrap_or(0.0) as i64,
                pct25_salary: pct25_salary.unwrap_or(0.0) as i64,
                pct75_salary: pct75_salary.unwrap_or(0.0) as i64,
                pct90_salary: pct90_salary.unwrap_or(0.0) as i64,
            },
        })
    }

    /// Distinct occupation titles in the dataset.
    pub async fn occupations(&self) -> Result<Vec<String>> {
        Ok(sqlx::query_scalar(query::OCCUPATIONS)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Distinct area titles, national rollups excluded.
    pub async fn locations(&self) -> Result<Vec<String>> {
        Ok(sqlx::query_scalar(query::LOCATIONS)
            .fetch_all(&self.pool)
            .await?)
    }

    /// State-level area titles.
    pub async fn states(&self) -> Result<Vec<String>> {
        Ok(sqlx::query_scalar(query::STATES)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Area titles relevant to one state.
    pub async fn areas_by_state(&self, state: &str) -> Result<Vec<String>> {
        Ok(query::areas_by_state(state)
            .build_query_scalar::<String>()
            .fetch_all(&self.pool)
            .await?)
    }
}

/// Share of `matching` within `total`, in percent. Zero when the total
/// is unknown or empty.
fn percentage_of(matching: f64, total: i64) -> f64 {
    if total > 0 {
        (matching / total as f64) * 100.0
    } else {
        0.0
    }
}

fn meets_min_salary(median: Option<f64>, min_salary: i64) -> bool {
    match median {
        Some(median) if min_salary > 0 => median >= min_salary as f64,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_of() {
        assert_eq!(percentage_of(50.0, 200), 25.0);
        assert_eq!(percentage_of(0.0, 200), 0.0);
        assert_eq!(percentage_of(50.0, 0), 0.0);
    }

    #[test]
    fn test_meets_min_salary() {
        assert!(meets_min_salary(Some(120000.0), 100000));
        assert!(!meets_min_salary(Some(90000.0), 100000));
        // No floor requested means nothing to meet.
        assert!(!meets_min_salary(Some(120000.0), 0));
        assert!(!meets_min_salary(None, 100000));
    }
}

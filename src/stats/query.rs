//! SQL construction for the statistics queries.

use sqlx::{Postgres, QueryBuilder};

use super::filters::{
    education_filter, experience_filter, state_abbreviation, EducationFilter, Filters,
};

/// Aggregates cast to `float8` so NULL-able averages decode cleanly.
const MATCHING_JOBS_BASE: &str = "SELECT \
     SUM(tot_emp)::float8 AS matching_jobs, \
     AVG(a_median)::float8 AS median_salary, \
     AVG(a_pct10)::float8 AS pct10_salary, \
     AVG(a_pct25)::float8 AS pct25_salary, \
     AVG(a_pct75)::float8 AS pct75_salary, \
     AVG(a_pct90)::float8 AS pct90_salary \
     FROM career_data WHERE 1=1";

/// Distinct occupation titles.
pub const OCCUPATIONS: &str = "SELECT DISTINCT occ_title FROM career_data \
     WHERE occ_title IS NOT NULL AND occ_title <> '' \
     ORDER BY occ_title";

/// Distinct area titles, excluding the nation-wide rollup rows.
pub const LOCATIONS: &str = "SELECT DISTINCT area_title FROM career_data \
     WHERE area_title IS NOT NULL AND area_title <> '' \
     AND area_title NOT IN ('U.S.', 'United States', 'USA', 'US') \
     ORDER BY area_title";

/// State-level area titles: no metro rows (which carry a comma) and no
/// nonmetropolitan subdivisions.
pub const STATES: &str = "SELECT DISTINCT area_title FROM career_data \
     WHERE area_title IS NOT NULL AND area_title <> '' \
     AND area_title NOT IN ('U.S.', 'United States', 'USA', 'US') \
     AND area_title NOT ILIKE '%,%' \
     AND area_title NOT ILIKE '%nonmetropolitan area%' \
     ORDER BY area_title";

/// Nation-wide employment, taken from the all-occupations rollup row.
pub const NATIONAL_TOTAL: &str = "SELECT tot_emp::bigint FROM career_data \
     WHERE occ_code = '00-0000' ORDER BY tot_emp DESC LIMIT 1";

/// Total employment within one area.
pub const REGIONAL_TOTAL: &str =
    "SELECT COALESCE(SUM(tot_emp), 0)::bigint FROM career_data WHERE area_title = $1";

/// Build the aggregate query over rows matching the filters.
pub fn matching_jobs(filters: &Filters) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(MATCHING_JOBS_BASE);

    if !filters.location.is_empty() {
        query.push(" AND area_title ILIKE ");
        query.push_bind(format!("%{}%", filters.location));
    }

    if !filters.occupation.is_empty() {
        query.push(" AND occ_title ILIKE ");
        query.push_bind(format!("%{}%", filters.occupation));
    }

    match education_filter(&filters.education) {
        EducationFilter::Any => {}
        EducationFilter::Exact(value) => {
            query.push(" AND education = ");
            query.push_bind(value);
        }
        EducationFilter::UpTo(values) => {
            query.push(" AND education IN (");
            let mut levels = query.separated(", ");
            for value in values {
                levels.push_bind(value);
            }
            query.push(")");
        }
    }

    let experience = experience_filter(&filters.experience);
    if !experience.is_empty() {
        // Rows with no stated requirement are NULL, not 'None'.
        let includes_none = experience.contains(&"None");
        if includes_none {
            query.push(" AND (experience IS NULL OR experience IN (");
        } else {
            query.push(" AND experience IN (");
        }
        let mut values = query.separated(", ");
        for value in &experience {
            values.push_bind(*value);
        }
        query.push(")");
        if includes_none {
            query.push(")");
        }
    }

    if filters.min_salary > 0 {
        // A job clears the floor if any of its upper percentiles do.
        query.push(" AND (a_median >= ");
        query.push_bind(filters.min_salary);
        query.push(" OR a_pct75 >= ");
        query.push_bind(filters.min_salary);
        query.push(" OR a_pct90 >= ");
        query.push_bind(filters.min_salary);
        query.push(")");
    }

    query
}

/// Build the area lookup for one state: the state row itself, metro areas
/// suffixed with its abbreviation, and its nonmetropolitan areas.
pub fn areas_by_state(state: &str) -> QueryBuilder<'static, Postgres> {
    let abbreviation = state_abbreviation(state);

    let mut query =
        QueryBuilder::new("SELECT DISTINCT area_title FROM career_data WHERE area_title = ");
    query.push_bind(state.to_string());
    query.push(" OR area_title ILIKE ");
    query.push_bind(format!("%, {}%", abbreviation));
    query.push(" OR area_title ILIKE ");
    query.push_bind(format!("%{} nonmetropolitan area%", state));
    query.push(" ORDER BY area_title");

    query
}

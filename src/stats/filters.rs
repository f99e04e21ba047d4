//! Request filters and their matching semantics.

use serde::Deserialize;

/// Education levels as stored in the dataset, least to most advanced.
const EDUCATION_LADDER: [&str; 6] = [
    "No formal educational credential",
    "High school diploma or equivalent",
    "Associate degree",
    "Bachelor's degree",
    "Master's degree",
    "Doctoral or professional degree",
];

/// The one credential outside the ladder; it matches only itself.
const POSTSECONDARY_AWARD: &str = "Postsecondary nondegree award";

/// Raw query parameters as received from the client.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    pub location: String,
    pub occupation: String,
    #[serde(rename = "minSalary")]
    pub min_salary: String,
    pub education: String,
    pub experience: String,
}

/// Validated filters for the statistics queries.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    pub location: String,
    pub occupation: String,
    pub min_salary: i64,
    pub education: String,
    pub experience: String,
}

impl From<FilterParams> for Filters {
    fn from(params: FilterParams) -> Self {
        Self {
            location: params.location,
            occupation: params.occupation,
            min_salary: parse_min_salary(&params.min_salary),
            education: params.education,
            experience: params.experience,
        }
    }
}

/// Parse the minimum salary leniently. Empty or malformed input means
/// no salary floor rather than a rejected request.
pub fn parse_min_salary(raw: &str) -> i64 {
    raw.parse().unwrap_or(0)
}

/// Education values admitted by a minimum-education selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EducationFilter {
    /// No filtering: `Any`, empty, or an unrecognized selection.
    Any,
    /// Exact match on the single non-ladder credential.
    Exact(&'static str),
    /// Every ladder level up to and including the selection.
    UpTo(Vec<&'static str>),
}

/// Resolve a client education selection into the set of dataset values
/// it admits.
///
/// A selection on the ladder admits itself and everything below it, so
/// asking for "Bachelor's degree" also counts jobs that require less.
/// A couple of shorthand spellings used by clients are normalized first.
pub fn education_filter(selection: &str) -> EducationFilter {
    if selection.is_empty() || selection == "Any" {
        return EducationFilter::Any;
    }
    if selection == POSTSECONDARY_AWARD {
        return EducationFilter::Exact(POSTSECONDARY_AWARD);
    }

    let normalized = match selection.to_lowercase().as_str() {
        "no formal education" => "No formal educational credential",
        "high school diploma" => "High school diploma or equivalent",
        _ => selection,
    };

    match EDUCATION_LADDER.iter().position(|level| *level == normalized) {
        Some(index) => EducationFilter::UpTo(EDUCATION_LADDER[..=index].to_vec()),
        None => EducationFilter::Any,
    }
}

/// Experience values admitted by a selection. An empty result means no
/// filtering.
///
/// Selections are cumulative downwards, and jobs with no stated
/// requirement always qualify, which is why every non-empty set
/// includes `None`.
pub fn experience_filter(selection: &str) -> Vec<&'static str> {
    match selection {
        "None" => vec!["None"],
        "Less than 5 years" => vec!["None", "Less than 5 years"],
        "5 years or more" => vec!["None", "Less than 5 years", "5 years or more"],
        _ => Vec::new(),
    }
}

/// USPS abbreviation for a state or territory name. Unknown names pass
/// through unchanged.
pub fn state_abbreviation(state: &str) -> &str {
    match state {
        "Alabama" => "AL",
        "Alaska" => "AK",
        "Arizona" => "AZ",
        "Arkansas" => "AR",
        "California" => "CA",
        "Colorado" => "CO",
        "Connecticut" => "CT",
        "Delaware" => "DE",
        "District of Columbia" => "DC",
        "Florida" => "FL",
        "Georgia" => "GA",
        "Guam" => "GU",
        "Hawaii" => "HI",
        "Idaho" => "ID",
        "Illinois" => "IL",
        "Indiana" => "IN",
        "Iowa" => "IA",
        "Kansas" => "KS",
        "Kentucky" => "KY",
        "Louisiana" => "LA",
        "Maine" => "ME",
        "Maryland" => "MD",
        "Massachusetts" => "MA",
        "Michigan" => "MI",
        "Minnesota" => "MN",
        "Mississippi" => "MS",
        "Missouri" => "MO",
        "Montana" => "MT",
        "Nebraska" => "NE",
        "Nevada" => "NV",
        "New Hampshire" => "NH",
        "New Jersey" => "NJ",
        "New Mexico" => "NM",
        "New York" => "NY",
        "North Carolina" => "NC",
        "North Dakota" => "ND",
        "Ohio" => "OH",
        "Oklahoma" => "OK",
        "Oregon" => "OR",
        "Pennsylvania" => "PA",
        "Puerto Rico" => "PR",
        "Rhode Island" => "RI",
        "South Carolina" => "SC",
        "South Dakota" => "SD",
        "Tennessee" => "TN",
        "Texas" => "TX",
        "Utah" => "UT",
        "Vermont" => "VT",
        "Virgin Islands" => "VI",
        "Virginia" => "VA",
        "Washington" => "WA",
        "West Virginia" => "WV",
        "Wisconsin" => "WI",
        "Wyoming" => "WY",
        _ => state,
    }
}

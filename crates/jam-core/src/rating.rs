//! Review rating aggregation.
//!
//! Rounding rule: star counts round half-up (`f64::round`), so a mean of
//! 3.5 renders as 4 filled stars. The displayed average is the mean to one
//! decimal place; an empty review list displays as "0" rather than NaN.

use crate::models::Review;

/// Arithmetic mean of the ratings, formatted to one decimal place.
/// Empty input yields `"0"`.
pub fn average_rating(reviews: &[Review]) -> String {
    if reviews.is_empty() {
        return "0".to_string();
    }
    let total: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    let mean = f64::from(total) / reviews.len() as f64;
    format!("{mean:.1}")
}

/// Number of filled stars out of 5: the mean rounded half-up.
pub fn star_count(reviews: &[Review]) -> u8 {
    if reviews.is_empty() {
        return 0;
    }
    let total: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    let mean = f64::from(total) / reviews.len() as f64;
    mean.round() as u8
}

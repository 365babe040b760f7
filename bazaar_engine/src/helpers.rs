//! Small shared helpers.

/// The arithmetic mean of a set of ratings, rounded to two decimals, or `None` for an empty set.
pub fn mean_rating(ratings: &[i64]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = ratings.iter().sum::<i64>() as f64 / ratings.len() as f64;
    Some((mean * 100.0).round() / 100.0)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mean_rating_rounds_to_two_decimals() {
        assert_eq!(mean_rating(&[]), None);
        assert_eq!(mean_rating(&[5]), Some(5.0));
        assert_eq!(mean_rating(&[4, 5]), Some(4.5));
        // 1/3 repeating rounds at the second decimal
        assert_eq!(mean_rating(&[5, 5, 4]), Some(4.67));
        assert_eq!(mean_rating(&[1, 2, 2]), Some(1.67));
    }
}

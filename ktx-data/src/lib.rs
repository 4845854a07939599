//! Filtering and aggregation of ridership tables.
//!
//! Everything here is a pure function of its input table. The filter stage
//! narrows the validated table to the user's selection; the aggregation
//! engine then derives one table per dashboard view from the filtered rows.

pub mod filter;
pub mod models;
pub mod views;

pub use filter::filter;
pub use models::*;
pub use views::Aggregations;

/// Ordinary least squares fit used for the scatter view trendlines.
pub mod trendline {
    /// Result of fitting `y = slope * x + intercept`.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Fit {
        pub slope: f64,
        pub intercept: f64,
        pub r_squared: f64,
    }

    /// Fit a line through `points` by ordinary least squares.
    ///
    /// Returns `None` with fewer than two points or when every `x` is equal.
    /// A constant `y` over varying `x` fits exactly, so `r_squared` is 1.
    pub fn fit(points: &[(f64, f64)]) -> Option<Fit> {
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as f64;
        let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

        let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
        for (x, y) in points {
            let dx = x - mean_x;
            let dy = y - mean_y;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }
        if sxx == 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        let r_squared = if syy == 0.0 {
            1.0
        } else {
            (sxy * sxy) / (sxx * syy)
        };
        Some(Fit {
            slope,
            intercept,
            r_squared,
        })
    }

}

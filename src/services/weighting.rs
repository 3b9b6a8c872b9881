//! Indicator normalization and composite rating.
//!
//! Raw indicators live on wildly different scales (counts, seconds,
//! ratios), so each column is first mapped to [0, 1] with a rank-based
//! quantile transform. Cost indicators (kpi6-kpi8) are inverted so that
//! higher is always better. The composite rating is the weighted sum of
//! the normalized values on a fixed [0, 10] scale; the per-indicator
//! display columns carry an additional presentation scale that does not
//! affect the rating.

use crate::api::{KpiRow, Preference, WeightedKpiRow, KPI_COUNT};
use crate::services::{ServiceError, ServiceResult};

/// Weight of the preferred indicator when one is selected.
const PREFERRED_WEIGHT: f64 = 0.2;

/// Presentation scale without a preference: each column tops out at
/// 0.125 * 80 = 10.
const DISPLAY_SCALE_UNIFORM: f64 = 80.0;

/// Presentation scale with a preference: the preferred column tops out at
/// 0.2 * 50 = 10.
const DISPLAY_SCALE_PREFERRED: f64 = 50.0;

/// Rank-based quantile transform onto [0, 1].
///
/// Each value maps to its average rank divided by `n - 1`; ties share the
/// mean of the ranks they span. Requires at least two values.
pub fn quantile_normalize(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    debug_assert!(n >= 2);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut normalized = vec![0.0; n];
    let denom = (n - 1) as f64;
    let mut i = 0;
    while i < n {
        // Find the run of tied values and give every member the mean rank
        let mut j = i + 1;
        while j < n && values[order[j]] == values[order[i]] {
            j += 1;
        }
        let mean_rank = (i + j - 1) as f64 / 2.0;
        for &idx in &order[i..j] {
            normalized[idx] = mean_rank / denom;
        }
        i = j;
    }

    normalized
}

fn weights_for(preference: Preference) -> [f64; KPI_COUNT] {
    match preference.index() {
        None => [1.0 / KPI_COUNT as f64; KPI_COUNT],
        Some(preferred) => {
            let rest = (1.0 - PREFERRED_WEIGHT) / (KPI_COUNT - 1) as f64;
            let mut weights = [rest; KPI_COUNT];
            weights[preferred] = PREFERRED_WEIGHT;
            weights
        }
    }
}

/// Normalize and weight one period's KPI rows.
///
/// Fails with [`ServiceError::NotEnoughData`] when fewer than two airports
/// are present; the quantile transform is undefined on a single row.
pub fn compute_weighted(
    rows: &[KpiRow],
    preference: Preference,
) -> ServiceResult<Vec<WeightedKpiRow>> {
    if rows.len() < 2 {
        return Err(ServiceError::NotEnoughData(format!(
            "Ranking requires at least 2 airports, got {}",
            rows.len()
        )));
    }

    let weights = weights_for(preference);
    let display_scale = if preference.index().is_some() {
        DISPLAY_SCALE_PREFERRED
    } else {
        DISPLAY_SCALE_UNIFORM
    };

    // Normalize column by column, inverting the cost indicators
    let mut normalized: Vec<Vec<f64>> = Vec::with_capacity(KPI_COUNT);
    for index in 0..KPI_COUNT {
        let column: Vec<f64> = rows.iter().map(|row| row.indicator(index)).collect();
        let mut values = quantile_normalize(&column);
        if KpiRow::is_cost_indicator(index) {
            for value in &mut values {
                *value = 1.0 - *value;
            }
        }
        normalized.push(values);
    }

    Ok(rows
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let mut weighted =
                WeightedKpiRow::zeroed(row.airport.clone(), row.airport.clone());
            let mut rating = 0.0;
            for (index, weight) in weights.iter().enumerate() {
                let value = normalized[index][row_idx];
                weighted.set_weighted(index, weight * value * display_scale);
                rating += weight * value;
            }
            weighted.rating = rating * 10.0;
            weighted
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(airport: &str, kpi1: i64, kpi6: f64) -> KpiRow {
        KpiRow {
            airport: airport.to_string(),
            kpi1,
            kpi2: kpi1,
            kpi3: kpi1,
            kpi4: kpi1,
            kpi5: kpi1,
            kpi6,
            kpi7: 0.5,
            kpi8: 3600.0,
        }
    }

    #[test]
    fn test_quantile_normalize_spans_unit_interval() {
        let normalized = quantile_normalize(&[30.0, 10.0, 20.0]);
        assert_eq!(normalized, vec![1.0, 0.0, 0.5]);
    }

    #[test]
    fn test_quantile_normalize_ties_share_rank() {
        let normalized = quantile_normalize(&[10.0, 10.0, 20.0]);
        // Tied values get the mean of ranks 0 and 1
        assert_eq!(normalized[0], 0.25);
        assert_eq!(normalized[1], 0.25);
        assert_eq!(normalized[2], 1.0);
    }

    #[test]
    fn test_single_row_is_rejected() {
        let result = compute_weighted(&[row("KJFK", 10, 3600.0)], Preference::default());
        assert!(matches!(result, Err(ServiceError::NotEnoughData(_))));
    }

    #[test]
    fn test_rating_bounds_and_ordering() {
        // KJFK dominates on every benefit indicator and on the cost ones too
        let rows = vec![row("KJFK", 100, 3600.0), row("KBOS", 10, 7200.0)];
        let weighted = compute_weighted(&rows, Preference::default()).unwrap();

        let jfk = weighted.iter().find(|w| w.airport == "KJFK").unwrap();
        let bos = weighted.iter().find(|w| w.airport == "KBOS").unwrap();
        // kpi7/kpi8 are tied so both sides get 0.5 for those columns
        assert!(jfk.rating > bos.rating);
        assert!(jfk.rating <= 10.0 && bos.rating >= 0.0);
    }

    #[test]
    fn test_cost_indicator_inversion() {
        // Identical everywhere except kpi6: the faster airport must win
        let mut slow = row("SLOW", 10, 7200.0);
        let fast = row("FAST", 10, 3600.0);
        slow.kpi7 = 0.5;
        let weighted = compute_weighted(&[slow, fast], Preference::default()).unwrap();
        let fast_row = weighted.iter().find(|w| w.airport == "FAST").unwrap();
        let slow_row = weighted.iter().find(|w| w.airport == "SLOW").unwrap();
        assert!(fast_row.rating > slow_row.rating);
        assert!(fast_row.kpi6_weighted > slow_row.kpi6_weighted);
    }

    #[test]
    fn test_weights_sum_to_one() {
        let uniform = weights_for(Preference::Na);
        for weight in &uniform {
            assert!((weight - 0.125).abs() < 1e-9);
        }
        assert!((uniform.iter().sum::<f64>() - 1.0).abs() < 1e-9);

        let preferred = weights_for(Preference::Kpi3);
        assert!((preferred[2] - 0.2).abs() < 1e-9);
        for (index, weight) in preferred.iter().enumerate() {
            if index != 2 {
                assert!((weight - 0.8 / 7.0).abs() < 1e-9);
            }
        }
        assert!((preferred.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_dominant_row_rates_ten() {
        // A row that wins every indicator (cost ones by being lowest)
        // collects the full weight budget: rating is exactly 10
        let mut best = row("BEST", 100, 3600.0);
        best.kpi7 = 0.1;
        best.kpi8 = 600.0;
        let worst = row("WORST", 10, 7200.0);
        let weighted = compute_weighted(&[best, worst], Preference::Na).unwrap();
        let top = weighted.iter().find(|w| w.airport == "BEST").unwrap();
        assert!((top.rating - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_preference_upweights_selected_indicator() {
        let rows = vec![row("KJFK", 100, 3600.0), row("KBOS", 10, 7200.0)];

        let uniform = compute_weighted(&rows, Preference::Na).unwrap();
        let preferred = compute_weighted(&rows, Preference::Kpi1).unwrap();

        let jfk_uniform = uniform.iter().find(|w| w.airport == "KJFK").unwrap();
        let jfk_preferred = preferred.iter().find(|w| w.airport == "KJFK").unwrap();

        // Both scalings top the winning column out at 10
        assert!((jfk_uniform.kpi1_weighted - 10.0).abs() < 1e-9);
        assert!((jfk_preferred.kpi1_weighted - 10.0).abs() < 1e-9);
        // With the preference, kpi1 contributes 0.2 of the rating instead of 0.125
        assert!(jfk_preferred.rating > jfk_uniform.rating);
    }
}

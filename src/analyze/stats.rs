use crate::types::scoring::Score;

/// Shannon entropy of `counts`, normalized by log2 of the number of slots.
/// A single slot (or no observations) is maximally concentrated: 0.
pub fn normalized_entropy(counts: &[u64]) -> Score {
    if counts.len() <= 1 {
        return 0.0;
    }
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as Score;
    let entropy: Score = counts
        .iter()
        .filter(|count| **count > 0)
        .map(|count| {
            let p = *count as Score / total;
            -p * p.log2()
        })
        .sum();
    (entropy / (counts.len() as Score).log2()).clamp(0.0, 1.0)
}

/// Ordinary least-squares slope of `values` against their index.
pub fn least_squares_slope(values: &[Score]) -> Score {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let n_f = n as Score;
    let x_mean = (n_f - 1.0) / 2.0;
    let y_mean = values.iter().sum::<Score>() / n_f;
    let (numerator, denominator) =
        values
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(num, den), (index, value)| {
                let dx = index as Score - x_mean;
                (num + dx * (value - y_mean), den + dx * dx)
            });
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

pub fn logistic(x: Score) -> Score {
    1.0 / (1.0 + (-x).exp())
}

/// Nearest-rank percentile over an ascending slice.
pub fn percentile(sorted: &[u64], fraction: Score) -> Option<u64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (fraction.clamp(0.0, 1.0) * sorted.len() as Score).ceil() as usize;
    sorted.get(rank.clamp(1, sorted.len()) - 1).copied()
}

/// Gini coefficient of non-negative values; 0 is perfect equality.
pub fn gini(values: &[u64]) -> Score {
    let total: u64 = values.iter().sum();
    if values.len() < 2 || total == 0 {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let n = sorted.len() as Score;
    let weighted: Score = sorted
        .iter()
        .enumerate()
        .map(|(index, value)| (index as Score + 1.0) * *value as Score)
        .sum();
    ((2.0 * weighted) / (n * total as Score) - (n + 1.0) / n).clamp(0.0, 1.0)
}

pub fn ratio(part: usize, whole: usize) -> Score {
    if whole == 0 {
        0.0
    } else {
        (part as Score / whole as Score).clamp(0.0, 1.0)
    }
}

/// Find the most recent bar, among the last `window` bars, where `fast`
/// crossed above `slow`: `fast[i-1] <= slow[i-1]` and `fast[i] > slow[i]`.
///
/// Both slices are tail-aligned; the longer one is trimmed from the front.
/// Returns how many bars ago the crossing happened (0 = last bar).
pub fn crossed_above_within(fast: &[f64], slow: &[f64], window: usize) -> Option<usize> {
    let n = fast.len().min(slow.len());
    let a = &fast[fast.len() - n..];
    let b = &slow[slow.len() - n..];

    (0..window)
        .take_while(|&ago| ago + 1 < n)
        .find(|&ago| {
            let i = n - 1 - ago;
            a[i - 1] <= b[i - 1] && a[i] > b[i]
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_cross_on_last_bar() {
        let fast = [1.0, 2.0, 4.0];
        let slow = [3.0, 3.0, 3.0];
        assert_eq!(crossed_above_within(&fast, &slow, 3), Some(0));
    }

    #[test]
    fn touching_then_above_counts() {
        let fast = [3.0, 3.5];
        let slow = [3.0, 3.0];
        assert_eq!(crossed_above_within(&fast, &slow, 1), Some(0));
    }

    #[test]
    fn cross_outside_window_is_ignored() {
        // crossed 3 bars ago, then stayed above
        let fast = [1.0, 5.0, 6.0, 7.0, 8.0];
        let slow = [3.0; 5];
        assert_eq!(crossed_above_within(&fast, &slow, 3), None);
        assert_eq!(crossed_above_within(&fast, &slow, 4), Some(3));
    }

    #[test]
    fn most_recent_crossing_wins() {
        let fast = [1.0, 4.0, 2.0, 4.0];
        let slow = [3.0; 4];
        assert_eq!(crossed_above_within(&fast, &slow, 3), Some(0));
    }

    #[test]
    fn aligns_on_tails() {
        let fast = [9.0, 9.0, 1.0, 4.0];
        let slow = [3.0, 3.0];
        assert_eq!(crossed_above_within(&fast, &slow, 5), Some(0));
    }

    #[test]
    fn cross_below_is_not_a_bullish_cross() {
        let fast = [4.0, 2.0];
        let slow = [3.0, 3.0];
        assert_eq!(crossed_above_within(&fast, &slow, 2), None);
    }
}

//! Linear interpolation between two samples.

use super::sample::{Sample, Temperature};
use crate::time::Minutes;

/// Synthesizes a sample at `target` on the line through `a` and `b`.
///
/// The arguments may come in either time order, but `target` must not
/// precede both of them — time is unsigned. When both inputs carry the
/// same timestamp the result is their arithmetic mean (integer division,
/// truncating), whatever the target. The fractional step is computed in
/// f32 and cast back, which truncates toward zero.
pub fn interpolate(a: &Sample, b: &Sample, target: Minutes) -> Sample {
    if a.uptime == b.uptime {
        let mean = (a.temperature.raw() as i32 + b.temperature.raw() as i32) / 2;
        return Sample::new(Temperature::from_raw(mean as i16), target);
    }

    let (earlier, later) = if a.uptime < b.uptime { (a, b) } else { (b, a) };

    // widen the delta so opposite-sign extremes cannot overflow i16
    let delta_value = later.temperature.raw() as i32 - earlier.temperature.raw() as i32;
    let delta_time = later.uptime - earlier.uptime;
    let delta_to_target = target - earlier.uptime;

    let offset = (delta_value as f32 * delta_to_target as f32 / delta_time as f32) as i16;
    Sample::new(
        Temperature::from_raw(earlier.temperature.raw() + offset),
        target,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(uptime: u32, raw: i16) -> Sample {
        Sample::new(Temperature::from_raw(raw), uptime)
    }

    #[test]
    fn test_midpoint() {
        let a = sample(10, 160);
        let b = sample(20, 320);

        let mid = interpolate(&a, &b, 15);
        assert_eq!(mid.uptime, 15);
        assert_eq!(mid.temperature.raw(), 240);
    }

    #[test]
    fn test_argument_order_does_not_matter() {
        let a = sample(10, 160);
        let b = sample(30, 480);

        assert_eq!(interpolate(&a, &b, 20), interpolate(&b, &a, 20));
    }

    #[test]
    fn test_target_at_endpoints() {
        let a = sample(10, 160);
        let b = sample(20, 320);

        assert_eq!(interpolate(&a, &b, 10).temperature.raw(), 160);
        assert_eq!(interpolate(&a, &b, 20).temperature.raw(), 320);
    }

    #[test]
    fn test_equal_timestamps_yield_mean() {
        let a = sample(10, 160);
        let b = sample(10, 320);

        // the mean wins regardless of the requested target
        let result = interpolate(&a, &b, 999);
        assert_eq!(result.temperature.raw(), 240);
        assert_eq!(result.uptime, 999);

        // integer mean truncates
        let odd = interpolate(&sample(10, 160), &sample(10, 161), 10);
        assert_eq!(odd.temperature.raw(), 160);
    }

    #[test]
    fn test_fraction_truncates_toward_zero() {
        // slope 10/3 per minute: at +1 the exact offset is 3.33
        let a = sample(0, 0);
        let b = sample(3, 10);
        assert_eq!(interpolate(&a, &b, 1).temperature.raw(), 3);

        // falling slope truncates toward zero as well
        let c = sample(0, 0);
        let d = sample(3, -10);
        assert_eq!(interpolate(&c, &d, 1).temperature.raw(), -3);
    }
}

// 📐 Visual Scales
// Linear (counts → pixels) and band (categories → rows) scales

// ============================================================================
// LINEAR SCALE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        LinearScale { domain, range }
    }

    /// Maps a domain value into the range. A zero-width domain maps
    /// everything to the middle of the range.
    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;

        let t = if span.is_nan() {
            f64::NAN
        } else if span == 0.0 {
            0.5
        } else {
            (value - d0) / span
        };

        r0 + t * (r1 - r0)
    }

    /// Roughly `count` round values (1, 2 or 5 × 10^k apart) inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (mut start, mut stop) = self.domain;
        if count == 0 || start.is_nan() || stop.is_nan() {
            return Vec::new();
        }
        if start == stop {
            return vec![start];
        }

        let reverse = stop < start;
        if reverse {
            std::mem::swap(&mut start, &mut stop);
        }

        let Some((i1, i2, inc)) = tick_spec(start, stop, count as f64) else {
            return Vec::new();
        };

        let mut ticks: Vec<f64> = (i1..=i2)
            .map(|i| {
                let i = i as f64;
                if inc < 0.0 {
                    i / -inc
                } else {
                    i * inc
                }
            })
            .collect();

        if reverse {
            ticks.reverse();
        }
        ticks
    }
}

/// Returns (first index, last index, increment). A negative increment
/// means "divide by -inc", which keeps fractional ticks exact.
fn tick_spec(start: f64, stop: f64, count: f64) -> Option<(i64, i64, f64)> {
    let e10 = 50f64.sqrt();
    let e5 = 10f64.sqrt();
    let e2 = 2f64.sqrt();

    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= e10 {
        10.0
    } else if error >= e5 {
        5.0
    } else if error >= e2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let scaled = 10f64.powf(-power) / factor;
        i1 = (start * scaled).round();
        i2 = (stop * scaled).round();
        if i1 / scaled < start {
            i1 += 1.0;
        }
        if i2 / scaled > stop {
            i2 -= 1.0;
        }
        inc = -scaled;
    } else {
        let scaled = 10f64.powf(power) * factor;
        i1 = (start / scaled).round();
        i2 = (stop / scaled).round();
        if i1 * scaled < start {
            i1 += 1.0;
        }
        if i2 * scaled > stop {
            i2 -= 1.0;
        }
        inc = scaled;
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    if !(i2 >= i1) || !inc.is_finite() {
        return None;
    }

    Some((i1 as i64, i2 as i64, inc))
}

// ============================================================================
// BAND SCALE
// ============================================================================

/// Splits a pixel range into evenly spaced bands, one per key.
/// Positions and bandwidth are rounded to whole pixels; leftover space is
/// split evenly before the first and after the last band.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale<K> {
    keys: Vec<K>,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl<K: PartialEq> BandScale<K> {
    pub fn new(keys: Vec<K>, range: (f64, f64), padding_inner: f64) -> Self {
        let padding_inner = padding_inner.clamp(0.0, 1.0);
        let n = keys.len() as f64;
        let (lo, hi) = if range.1 < range.0 {
            (range.1, range.0)
        } else {
            range
        };

        let step = ((hi - lo) / (n - padding_inner).max(1.0)).floor();
        let start = (lo + (hi - lo - step * (n - padding_inner)) * 0.5).round();
        let bandwidth = (step * (1.0 - padding_inner)).round();

        BandScale {
            keys,
            start,
            step,
            bandwidth,
        }
    }

    /// Top edge of the key's band, None for keys outside the domain.
    pub fn position(&self, key: &K) -> Option<f64> {
        self.keys
            .iter()
            .position(|k| k == key)
            .map(|i| self.start + self.step * i as f64)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn step(&self) -> f64 {
        self.step
    }
}

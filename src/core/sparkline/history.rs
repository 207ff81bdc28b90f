use std::collections::VecDeque;

/// Normalization range for a sparkline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    Fixed { min: f64, max: f64 },
    /// Running min/max that only ever widens
    Auto,
}

/// Fixed-capacity ring buffer of the most recent samples of one metric.
///
/// Fixed-range buffers start out full of zeros. Auto-scaling buffers start
/// empty and are filled with the first observed value, so the first frame is
/// flat at that value instead of dragging the range down to zero.
#[derive(Debug, Clone)]
pub struct SparklineHistory {
    capacity: usize,
    values: VecDeque<f64>,
    scale: Scale,
    range: Option<(f64, f64)>,
}

impl SparklineHistory {
    pub fn new(capacity: usize, scale: Scale) -> Self {
        let capacity = capacity.max(1);
        let values = match scale {
            Scale::Fixed { .. } => std::iter::repeat(0.0).take(capacity).collect(),
            Scale::Auto => VecDeque::with_capacity(capacity),
        };

        Self {
            capacity,
            values,
            scale,
            range: None,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.values.is_empty() {
            self.values.extend(std::iter::repeat(value).take(self.capacity));
        } else {
            if self.values.len() >= self.capacity {
                self.values.pop_front();
            }
            self.values.push_back(value);
        }

        if self.scale == Scale::Auto {
            self.widen_range();
        }
    }

    fn widen_range(&mut self) {
        let finite = self.values.iter().copied().filter(|v| v.is_finite());
        let buffer_range = finite.fold(None, |acc: Option<(f64, f64)>, v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        });

        self.range = match (self.range, buffer_range) {
            (Some((lo, hi)), Some((blo, bhi))) => Some((lo.min(blo), hi.max(bhi))),
            (prev, None) => prev,
            (None, current) => current,
        };
    }

    /// Range used to normalize the current frame
    pub fn range(&self) -> (f64, f64) {
        match self.scale {
            Scale::Fixed { min, max } => (min, max),
            Scale::Auto => self.range.unwrap_or((0.0, 0.0)),
        }
    }

    /// Buffered values mapped into `[0, 1]`, oldest first.
    ///
    /// Non-finite samples and a zero-width range map to 0.
    pub fn normalized(&self) -> Vec<f64> {
        let (min, max) = self.range();
        let span = max - min;

        self.values
            .iter()
            .map(|&v| {
                if !v.is_finite() || span <= 0.0 {
                    0.0
                } else {
                    ((v - min) / span).clamp(0.0, 1.0)
                }
            })
            .collect()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }
}

/// Summary of the frames since the previous report.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameReport {
    pub frames: u64,
    pub average_frame_ms: f64,
}

/// Accumulates presented-frame timings between reports.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    frames: u64,
    total_secs: f64,
}

impl FrameStats {
    pub fn record(&mut self, dt: f32) {
        self.frames += 1;
        self.total_secs += f64::from(dt);
    }

    /// Returns and resets the accumulated summary once `interval` frames
    /// have been recorded.
    pub fn take_report(&mut self, interval: u64) -> Option<FrameReport> {
        if self.frames == 0 || self.frames < interval {
            return None;
        }
        let report = FrameReport {
            frames: self.frames,
            average_frame_ms: self.total_secs * 1000.0 / self.frames as f64,
        };
        *self = Self::default();
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_report_before_interval() {
        let mut stats = FrameStats::default();
        stats.record(0.01);
        assert!(stats.take_report(2).is_none());
    }

    #[test]
    fn report_averages_and_resets() {
        let mut stats = FrameStats::default();
        stats.record(0.010);
        stats.record(0.020);

        let report = stats.take_report(2).unwrap();
        assert_eq!(report.frames, 2);
        assert!((report.average_frame_ms - 15.0).abs() < 1e-3);
        assert!(stats.take_report(1).is_none());
    }
}

//! Time-series aggregation
//!
//! Folds per-post ensemble records into fixed-width buckets with boundaries
//! aligned to the epoch, so the same wall-clock instant always produces the
//! same grid regardless of when within a bucket the query runs.

use crate::types::{Bucket, EnsembleRecord};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Groups ensemble records into an evenly spaced bucket series.
pub struct TimeSeriesAggregator {
    width_secs: i64,
}

impl TimeSeriesAggregator {
    pub fn new(width_secs: u64) -> Self {
        Self {
            width_secs: width_secs as i64,
        }
    }

    pub fn width(&self) -> Duration {
        Duration::seconds(self.width_secs)
    }

    /// The [start, end) span of the aligned grid covering `lookback` up to
    /// `now`. Fetching records over exactly this span guarantees the series
    /// sees everything it will bucket.
    pub fn grid_bounds(&self, now: DateTime<Utc>, lookback: Duration) -> (DateTime<Utc>, DateTime<Utc>) {
        let (start_epoch, end_epoch, _) = self.grid(now, lookback);
        (self.epoch_time(start_epoch), self.epoch_time(end_epoch))
    }

    fn grid(&self, now: DateTime<Utc>, lookback: Duration) -> (i64, i64, i64) {
        let width = self.width_secs;
        // Grid end snaps to the next bucket boundary at or after `now`.
        let end_epoch = now.timestamp().div_euclid(width) * width + width;
        let lookback_secs = lookback.num_seconds().max(0);
        let count = ((lookback_secs + width - 1) / width).max(1);
        (end_epoch - count * width, end_epoch, count)
    }

    /// Build the bucket series covering `lookback` up to `now`.
    ///
    /// The series always spans the full window: buckets with no records are
    /// kept with a zero count and no mean. Records outside the window are
    /// ignored.
    pub fn aggregate(
        &self,
        keyword: &str,
        records: &[EnsembleRecord],
        now: DateTime<Utc>,
        lookback: Duration,
    ) -> Vec<Bucket> {
        let width = self.width_secs;
        let (start_epoch, end_epoch, count) = self.grid(now, lookback);

        let mut sums = vec![0.0_f64; count as usize];
        let mut sq_sums = vec![0.0_f64; count as usize];
        let mut counts = vec![0_usize; count as usize];

        for record in records {
            let ts = record.timestamp.timestamp();
            if ts < start_epoch || ts >= end_epoch {
                continue;
            }
            let idx = ((ts - start_epoch) / width) as usize;
            sums[idx] += record.weighted_compound;
            sq_sums[idx] += record.weighted_compound * record.weighted_compound;
            counts[idx] += 1;
        }

        (0..count)
            .map(|i| {
                let n = counts[i as usize];
                let window_start = self.epoch_time(start_epoch + i * width);
                let window_end = self.epoch_time(start_epoch + (i + 1) * width);

                let mean_sentiment = (n > 0).then(|| sums[i as usize] / n as f64);
                let score_stddev = (n > 1).then(|| {
                    let n_f = n as f64;
                    let mean = sums[i as usize] / n_f;
                    let var = (sq_sums[i as usize] - n_f * mean * mean) / (n_f - 1.0);
                    var.max(0.0).sqrt()
                });

                Bucket {
                    keyword: keyword.to_string(),
                    window_start,
                    window_end,
                    mean_sentiment,
                    post_count: n,
                    score_stddev,
                }
            })
            .collect()
    }

    fn epoch_time(&self, epoch: i64) -> DateTime<Utc> {
        // Epoch values come from integer arithmetic over valid timestamps.
        Utc.timestamp_opt(epoch, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(keyword: &str, ts: DateTime<Utc>, compound: f64) -> EnsembleRecord {
        EnsembleRecord {
            post_id: format!("p-{}", ts.timestamp()),
            keyword: keyword.to_string(),
            timestamp: ts,
            weighted_compound: compound,
            aggregate_confidence: 0.8,
            contributing_models: vec!["lexicon".to_string()],
        }
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, h, m, 0).unwrap()
    }

    #[test]
    fn builds_full_grid_with_empty_buckets_retained() {
        let agg = TimeSeriesAggregator::new(3600);
        let records = vec![record("acme", at(10, 30), 0.5)];
        let buckets = agg.aggregate("acme", &records, at(12, 15), Duration::hours(6));

        assert_eq!(buckets.len(), 6);
        assert_eq!(buckets.iter().filter(|b| b.is_empty()).count(), 5);
        // Grid ends at the boundary after `now`.
        assert_eq!(buckets.last().unwrap().window_end, at(13, 0));
        assert_eq!(buckets.first().unwrap().window_start, at(7, 0));
    }

    #[test]
    fn partial_lookback_rounds_bucket_count_up() {
        let agg = TimeSeriesAggregator::new(3600);
        let buckets = agg.aggregate("acme", &[], at(12, 0), Duration::minutes(90));
        assert_eq!(buckets.len(), 2);
    }

    #[test]
    fn bucket_mean_and_stddev_over_members() {
        let agg = TimeSeriesAggregator::new(3600);
        let records = vec![
            record("acme", at(10, 5), 0.2),
            record("acme", at(10, 40), 0.6),
            record("acme", at(10, 55), 0.4),
        ];
        let buckets = agg.aggregate("acme", &records, at(10, 59), Duration::hours(1));

        assert_eq!(buckets.len(), 1);
        let bucket = &buckets[0];
        assert_eq!(bucket.post_count, 3);
        assert!((bucket.mean_sentiment.unwrap() - 0.4).abs() < 1e-12);
        // Sample stddev of [0.2, 0.6, 0.4] is 0.2.
        assert!((bucket.score_stddev.unwrap() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn single_member_bucket_has_no_stddev() {
        let agg = TimeSeriesAggregator::new(3600);
        let records = vec![record("acme", at(10, 5), 0.2)];
        let buckets = agg.aggregate("acme", &records, at(10, 59), Duration::hours(1));
        assert!(buckets[0].score_stddev.is_none());
        assert_eq!(buckets[0].mean_sentiment, Some(0.2));
    }

    #[test]
    fn records_outside_window_are_ignored() {
        let agg = TimeSeriesAggregator::new(3600);
        let records = vec![
            record("acme", at(1, 0), 0.9),
            record("acme", at(11, 30), 0.1),
        ];
        let buckets = agg.aggregate("acme", &records, at(12, 0), Duration::hours(2));
        let total: usize = buckets.iter().map(|b| b.post_count).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn same_inputs_give_identical_series() {
        let agg = TimeSeriesAggregator::new(3600);
        let records = vec![
            record("acme", at(9, 10), 0.3),
            record("acme", at(10, 20), -0.1),
        ];
        let a = agg.aggregate("acme", &records, at(12, 7), Duration::hours(4));
        let b = agg.aggregate("acme", &records, at(12, 7), Duration::hours(4));

        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.window_start, y.window_start);
            assert_eq!(x.post_count, y.post_count);
            assert_eq!(
                x.mean_sentiment.map(f64::to_bits),
                y.mean_sentiment.map(f64::to_bits)
            );
        }
    }

    #[test]
    fn queries_within_same_bucket_share_a_grid() {
        let agg = TimeSeriesAggregator::new(3600);
        let a = agg.aggregate("acme", &[], at(12, 1), Duration::hours(3));
        let b = agg.aggregate("acme", &[], at(12, 58), Duration::hours(3));
        assert_eq!(
            a.first().unwrap().window_start,
            b.first().unwrap().window_start
        );
        assert_eq!(a.last().unwrap().window_end, b.last().unwrap().window_end);
    }
}

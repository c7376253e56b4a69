use std::{thread, time::Duration};

use _model::ResultRecord;
use rand::Rng;

use crate::progress::Progress;

/// Fills in a rating and review count for records that have none.
///
/// There is no rating source behind this: the values are random placeholders
/// (rating uniform in 2.0..=5.0, review count in 0..=99) and every record that
/// receives them is marked `is_synthetic`. Records that already carry a rating
/// are passed through untouched.
///
/// Progress runs from 90% towards 100% as records are processed, with `delay`
/// between records to pace the output.
pub fn enrich<R: Rng + ?Sized>(
    records: Vec<ResultRecord>,
    rng: &mut R,
    progress: &mut dyn Progress,
    delay: Duration,
) -> Vec<ResultRecord> {
    let total = records.len();

    records
        .into_iter()
        .enumerate()
        .map(|(i, mut record)| {
            if record.average_rating.is_none() {
                let rating: f64 = rng.random_range(2.0..=5.0);
                record.average_rating = Some(format!("{rating:.1}"));
                record.review_count = Some(rng.random_range(0..100));
                record.is_synthetic = true;
            }

            progress.report(
                90.0 + (i as f64 / total as f64) * 10.0,
                &format!("Processing details ({}/{total})", i + 1),
            );
            if !delay.is_zero() {
                thread::sleep(delay);
            }

            record
        })
        .collect()
}

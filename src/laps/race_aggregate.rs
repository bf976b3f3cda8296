use serde::{Deserialize, Serialize};

use super::{group_by_driver, min_present};
use crate::records::{DriverNumber, LapRecord, Sector, SpeedPoint};

/// Per-driver statistics over every timed lap of a race-like session.
///
/// The best sectors are minimised independently of each other and of the
/// best lap, so they may come from three different laps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RaceAggregate {
    pub driver_number: DriverNumber,
    pub best_lap_duration: Option<f64>,
    pub mean_i1_speed: Option<f64>,
    pub mean_i2_speed: Option<f64>,
    pub mean_st_speed: Option<f64>,
    pub best_sector_1: Option<f64>,
    pub best_sector_2: Option<f64>,
    pub best_sector_3: Option<f64>,
}

#[derive(Default)]
struct MeanAccumulator {
    sum: f64,
    samples: usize,
}

impl MeanAccumulator {
    fn add(&mut self, value: Option<f64>) {
        if let Some(value) = value.filter(|v| !v.is_nan()) {
            self.sum += value;
            self.samples += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.samples > 0).then(|| self.sum / self.samples as f64)
    }
}

fn mean_speed(laps: &[&LapRecord], point: SpeedPoint) -> Option<f64> {
    let mut accumulator = MeanAccumulator::default();
    for lap in laps {
        accumulator.add(lap.speed(point));
    }
    accumulator.mean()
}

fn best_sector(laps: &[&LapRecord], sector: Sector) -> Option<f64> {
    min_present(laps.iter().map(|lap| lap.sector(sector)))
}

/// Computes best lap, best sectors and mean speeds for every driver.
///
/// Missing samples are left out of both the sum and the count of a mean; a
/// driver without any sample for a speed point gets no mean for it.
pub fn race_lap_times(laps: &[LapRecord]) -> Vec<RaceAggregate> {
    group_by_driver(laps)
        .into_iter()
        .map(|(driver_number, driver_laps)| RaceAggregate {
            driver_number: driver_number.clone(),
            best_lap_duration: min_present(driver_laps.iter().map(|lap| lap.lap_duration)),
            mean_i1_speed: mean_speed(&driver_laps, SpeedPoint::Intermediate1),
            mean_i2_speed: mean_speed(&driver_laps, SpeedPoint::Intermediate2),
            mean_st_speed: mean_speed(&driver_laps, SpeedPoint::SpeedTrap),
            best_sector_1: best_sector(&driver_laps, Sector::One),
            best_sector_2: best_sector(&driver_laps, Sector::Two),
            best_sector_3: best_sector(&driver_laps, Sector::Three),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::laps::process_lap_data;
    use crate::laps::tests::arb_lap;
    use proptest::prelude::*;

    #[test]
    fn test_race_aggregate_for_single_driver() {
        let laps = process_lap_data(&[
            LapRecord::new(1, 1)
                .with_duration(90.5)
                .with_sectors(30.0, 30.0, 30.5)
                .with_speeds(200.0, 210.0, 220.0),
            LapRecord::new(1, 2)
                .with_duration(89.0)
                .with_sectors(29.0, 30.0, 30.0)
                .with_speeds(205.0, 215.0, 225.0),
            LapRecord::new(1, 3),
        ]);

        let aggregates = race_lap_times(&laps);
        assert_eq!(
            aggregates,
            vec![RaceAggregate {
                driver_number: DriverNumber::Number(1),
                best_lap_duration: Some(89.0),
                mean_i1_speed: Some(202.5),
                mean_i2_speed: Some(212.5),
                mean_st_speed: Some(222.5),
                best_sector_1: Some(29.0),
                best_sector_2: Some(30.0),
                best_sector_3: Some(30.0),
            }]
        );
    }

    #[test]
    fn test_best_sectors_come_from_different_laps() {
        let laps = vec![
            LapRecord::new(5, 1).with_duration(92.0).with_sectors(29.5, 31.0, 31.5),
            LapRecord::new(5, 2).with_duration(91.0).with_sectors(30.0, 30.5, 30.5),
            LapRecord::new(5, 3).with_duration(93.0).with_sectors(31.0, 32.0, 30.0),
        ];
        let aggregate = &race_lap_times(&laps)[0];
        assert_eq!(aggregate.best_lap_duration, Some(91.0));
        assert_eq!(aggregate.best_sector_1, Some(29.5));
        assert_eq!(aggregate.best_sector_2, Some(30.5));
        assert_eq!(aggregate.best_sector_3, Some(30.0));
    }

    #[test]
    fn test_mean_speed_ignores_missing_samples() {
        let mut missing_speed = LapRecord::new(3, 3).with_duration(95.0);
        missing_speed.i2_speed = Some(250.0);
        let laps = vec![
            LapRecord::new(3, 1).with_duration(90.0).with_speeds(200.0, 210.0, 300.0),
            LapRecord::new(3, 2).with_duration(91.0).with_speeds(210.0, 230.0, 310.0),
            missing_speed,
        ];
        let aggregate = &race_lap_times(&laps)[0];
        assert_eq!(aggregate.mean_i1_speed, Some(205.0));
        assert_eq!(aggregate.mean_i2_speed, Some(230.0));
        assert_eq!(aggregate.mean_st_speed, Some(305.0));
    }

    #[test]
    fn test_driver_without_samples_has_no_mean() {
        let laps = vec![LapRecord::new(9, 1).with_duration(90.0)];
        let aggregate = &race_lap_times(&laps)[0];
        assert_eq!(aggregate.best_lap_duration, Some(90.0));
        assert!(aggregate.mean_i1_speed.is_none());
        assert!(aggregate.mean_st_speed.is_none());
        assert!(aggregate.best_sector_2.is_none());
    }

    #[test]
    fn test_race_aggregate_empty_input() {
        assert!(race_lap_times(&[]).is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_best_sectors_are_true_minimums(laps in proptest::collection::vec(arb_lap(), 1..60)) {
            let filtered = process_lap_data(&laps);
            for aggregate in race_lap_times(&filtered) {
                let driver_laps: Vec<&LapRecord> = filtered
                    .iter()
                    .filter(|lap| lap.driver_number == aggregate.driver_number)
                    .collect();
                for (sector, best) in [
                    (Sector::One, aggregate.best_sector_1),
                    (Sector::Two, aggregate.best_sector_2),
                    (Sector::Three, aggregate.best_sector_3),
                ] {
                    let expected = driver_laps
                        .iter()
                        .filter_map(|lap| lap.sector(sector))
                        .reduce(f64::min);
                    prop_assert_eq!(best, expected);
                }

                let speeds: Vec<f64> = driver_laps.iter().filter_map(|lap| lap.st_speed).collect();
                let expected_mean = (!speeds.is_empty())
                    .then(|| speeds.iter().sum::<f64>() / speeds.len() as f64);
                prop_assert_eq!(aggregate.mean_st_speed, expected_mean);
            }
        }
    }
}

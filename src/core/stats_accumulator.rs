//! Render statistics gathered from worker threads.
//!
//! Workers push counter updates through lock-free channels; the maps are
//! only materialized when the report is printed, so the hot path never
//! contends on a lock.
use crossbeam_channel::{unbounded, Receiver, Sender};
use hashbrown::HashMap;

pub struct StatsAccumulator {
    s_counter: Sender<(String, i64)>,
    r_counter: Receiver<(String, i64)>,
    s_int_distribution: Sender<(String, i64)>,
    r_int_distribution: Receiver<(String, i64)>,
}

lazy_static! {
    static ref INSTANCE: StatsAccumulator = StatsAccumulator::new();
}

impl StatsAccumulator {
    fn new() -> StatsAccumulator {
        let (s_counter, r_counter) = unbounded::<(String, i64)>();
        let (s_int_distribution, r_int_distribution) = unbounded::<(String, i64)>();
        StatsAccumulator {
            s_counter,
            r_counter,
            s_int_distribution,
            r_int_distribution,
        }
    }

    pub fn instance() -> &'static StatsAccumulator {
        &INSTANCE
    }

    pub fn report_counter(&self, name: &str, value: i64) {
        let _ = self.s_counter.send((String::from(name), value));
    }

    pub fn report_int_distribution(&self, name: &str, value: i64) {
        let _ = self.s_int_distribution.send((String::from(name), value));
    }

    /// Drain all pending reports and log them. Categories follow the
    /// "Group/Statistic" naming used at the report sites.
    pub fn print_stats(&self) {
        let mut counters: HashMap<String, i64> = HashMap::new();
        while let Ok((name, value)) = self.r_counter.try_recv() {
            *counters.entry(name).or_insert(0) += value;
        }
        // (sum, count, min, max)
        let mut distributions: HashMap<String, (i64, i64, i64, i64)> = HashMap::new();
        while let Ok((name, value)) = self.r_int_distribution.try_recv() {
            let entry = distributions.entry(name).or_insert((0, 0, i64::MAX, i64::MIN));
            entry.0 += value;
            entry.1 += 1;
            entry.2 = entry.2.min(value);
            entry.3 = entry.3.max(value);
        }

        let mut names: Vec<&String> = counters.keys().collect();
        names.sort();
        info!("Statistics:");
        for name in names {
            info!("    {:<50} {}", name, counters[name]);
        }
        let mut names: Vec<&String> = distributions.keys().collect();
        names.sort();
        for name in names {
            let (sum, count, min, max) = distributions[name];
            let avg = if count > 0 { sum as f64 / count as f64 } else { 0.0 };
            info!(
                "    {:<50} {:.3} avg [range {} - {}]",
                name, avg, min, max
            );
        }
    }
}

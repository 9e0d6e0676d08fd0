use super::options;
use super::pbrt::Float;
use std::io::Write;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use std::thread::{sleep, spawn, JoinHandle};
use std::time::{Duration, Instant};

pub struct ProgressReporter {
    total_work: u64,
    start_time: Instant,
    work_done: Arc<AtomicU64>,
    exit_thread: Arc<AtomicBool>,
    update_thread: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    pub fn new(total_work: u64, title: &'static str) -> ProgressReporter {
        let start_time = Instant::now();
        let mut reporter = ProgressReporter {
            total_work,
            start_time,
            work_done: Arc::new(AtomicU64::new(0)),
            exit_thread: Arc::new(AtomicBool::new(false)),
            update_thread: None,
        };
        // Launch thread to periodically update progress bar
        if !options::options().quiet && total_work > 0 {
            let work_done = reporter.work_done.clone();
            let exit_thread = reporter.exit_thread.clone();
            let width = match terminal_size::terminal_size() {
                Some((terminal_size::Width(w), _)) => w as usize,
                None => 80,
            };
            reporter.update_thread = Some(spawn(move || {
                let bar_length = width.saturating_sub(28).max(10);
                let total_plusses = 2.max(bar_length.saturating_sub(title.len()));
                let mut plusses_printed: usize = 0;

                let mut buf: String = format!("\r{}: [", title);
                let plusses_position = buf.len();
                for _ in 0..total_plusses {
                    buf.push(' ');
                }
                buf.push_str("] ");
                print!("{}", buf);
                let _ = std::io::stdout().flush();

                let mut sleep_duration = Duration::from_millis(250);
                let mut iter_count = 0;
                while !exit_thread.load(Ordering::SeqCst) {
                    sleep(sleep_duration);

                    // Periodically increase sleep_duration to reduce the
                    // overhead of updates.
                    iter_count += 1;
                    if iter_count == 10 {
                        sleep_duration *= 2;
                    } else if iter_count == 70 {
                        sleep_duration *= 2;
                    } else if iter_count == 520 {
                        sleep_duration *= 5;
                    }

                    let percent_done =
                        work_done.load(Ordering::SeqCst) as Float / total_work as Float;
                    let plusses_needed = (total_plusses as Float * percent_done).round() as usize;
                    let mut cur_space = plusses_position;
                    while plusses_printed < plusses_needed.min(total_plusses) {
                        buf.replace_range(cur_space..cur_space + 1, "+");
                        cur_space += 1;
                        plusses_printed += 1;
                    }
                    print!("{}", buf);

                    // Update elapsed time and estimated time to completion
                    let seconds =
                        ((Instant::now() - start_time).as_millis() as f64 / 1000.0) as Float;
                    let est_remaining = seconds / percent_done - seconds;
                    if percent_done >= 1.0 {
                        print!(" ({:.1}s)       ", seconds);
                    } else if est_remaining.is_finite() {
                        print!(" ({:.1}s|{:.1}s)  ", seconds, est_remaining.max(0.0));
                    } else {
                        print!(" ({:.1}s|?s)  ", seconds);
                    }
                    let _ = std::io::stdout().flush();
                }
            }));
        }
        reporter
    }

    pub fn update(&self, num: u64) {
        if num == 0 {
            return;
        }
        self.work_done.fetch_add(num, Ordering::SeqCst);
    }

    pub fn done(&self) {
        self.work_done.store(self.total_work, Ordering::SeqCst);
    }

    pub fn elapsed_ms(&self) -> u128 {
        (Instant::now() - self.start_time).as_millis()
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.work_done.store(self.total_work, Ordering::SeqCst);
        self.exit_thread.store(true, Ordering::SeqCst);
        if let Some(handle) = self.update_thread.take() {
            let _ = handle.join();
            println!();
        }
    }
}

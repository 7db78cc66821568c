use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use log::info;
use log::warn;

/// Collects the durations of named phases of a tool run, for example loading
/// an automaton and converting it.
#[derive(Default)]
pub struct Timing {
    results: Rc<RefCell<Vec<(String, f32)>>>,
}

/// Measures the time between its creation and the call to `finish()`.
///
/// Finish should be called explicitly, a timer that is dropped unfinished is
/// reported as a warning.
pub struct Timer {
    name: String,
    start: Instant,
    results: Rc<RefCell<Vec<(String, f32)>>>,
    registered: bool,
}

impl Timing {
    /// Creates a new timing object to track timers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new timer with the given name.
    pub fn start(&self, name: &str) -> Timer {
        Timer {
            name: name.to_string(),
            start: Instant::now(),
            results: self.results.clone(),
            registered: false,
        }
    }

    /// Returns the total time spent per name, in the order the names were first finished.
    pub fn totals(&self) -> Vec<(String, f32, usize)> {
        let mut totals: Vec<(String, f32, usize)> = Vec::new();
        for (name, time) in self.results.borrow().iter() {
            match totals.iter_mut().find(|(other, _, _)| other == name) {
                Some((_, total, count)) => {
                    *total += time;
                    *count += 1;
                }
                None => totals.push((name.clone(), *time, 1)),
            }
        }

        totals
    }

    /// Prints all the finished timers to stderr.
    pub fn print(&self) {
        for (name, total, count) in self.totals() {
            if count == 1 {
                eprintln!("Time {name}: {total:.3}s");
            } else {
                eprintln!("Time {name}: {total:.3}s, n: {count}");
            }
        }
    }
}

impl Timer {
    /// Finishes the timer and registers the result.
    pub fn finish(&mut self) {
        let time = self.start.elapsed().as_secs_f64();
        info!("Time {}: {:.3}s", self.name, time);

        self.results.borrow_mut().push((self.name.clone(), time as f32));
        self.registered = true
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if !self.registered {
            warn!("Timer {} was dropped before 'finish()'", self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_totals() {
        let timing = Timing::new();

        for _ in 0..2 {
            let mut timer = timing.start("convert");
            timer.finish();
        }
        timing.start("load").finish();

        let totals = timing.totals();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].0, "convert");
        assert_eq!(totals[0].2, 2);
        assert_eq!(totals[1].0, "load");
    }
}

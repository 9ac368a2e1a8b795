pub(in crate::app) trait Scheduler {
    fn start(&mut self, now: f64);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
    fn due_ticks(&mut self, now: f64) -> u32;
}

/// Fixed cadence with an accumulator; a long stall (hidden window) is capped
/// at `max_catch_up` ticks instead of replaying every missed step.
pub(in crate::app) struct FixedStepScheduler {
    step: f64,
    max_catch_up: u32,
    running: bool,
    last: f64,
    accumulator: f64,
}

impl FixedStepScheduler {
    pub(in crate::app) fn new(hz: f64) -> Self {
        Self {
            step: 1.0 / hz.clamp(1.0, 1_000.0),
            max_catch_up: 4,
            running: false,
            last: 0.0,
            accumulator: 0.0,
        }
    }
}

impl Scheduler for FixedStepScheduler {
    fn start(&mut self, now: f64) {
        self.running = true;
        self.last = now;
        // First frame after a (re)start always gets one tick.
        self.accumulator = self.step;
    }

    fn stop(&mut self) {
        self.running = false;
        self.accumulator = 0.0;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn due_ticks(&mut self, now: f64) -> u32 {
        if !self.running {
            return 0;
        }

        self.accumulator += (now - self.last).max(0.0);
        self.last = now;

        let due = (self.accumulator / self.step).floor();
        if due >= f64::from(self.max_catch_up) {
            self.accumulator = 0.0;
            return self.max_catch_up;
        }

        self.accumulator -= due * self.step;
        due as u32
    }
}

#[cfg(test)]
pub(in crate::app) mod testing {
    use super::Scheduler;

    pub(in crate::app) struct SteppedScheduler {
        pub(in crate::app) per_poll: u32,
        pub(in crate::app) running: bool,
    }

    impl SteppedScheduler {
        pub(in crate::app) fn new(per_poll: u32) -> Self {
            Self {
                per_poll,
                running: false,
            }
        }
    }

    impl Scheduler for SteppedScheduler {
        fn start(&mut self, _now: f64) {
            self.running = true;
        }

        fn stop(&mut self) {
            self.running = false;
        }

        fn is_running(&self) -> bool {
            self.running
        }

        fn due_ticks(&mut self, _now: f64) -> u32 {
            if self.running { self.per_poll } else { 0 }
        }
    }
}

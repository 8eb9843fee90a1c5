//! Cancelable deferred tasks on the simulation clock
//!
//! Time only moves when [`Scheduler::advance`] is called, so every task fires
//! on the same thread that owns the session. Cancelling removes the entry
//! immediately; a cancelled task can never fire afterwards.

/// Ticket returned when a task is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    handle: TaskHandle,
    due: f64,
    /// Re-arm interval for repeating tasks
    interval: Option<f64>,
    task: T,
}

/// Deferred task queue driven by simulated time (seconds)
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: f64,
    next_handle: u64,
    entries: Vec<Entry<T>>,
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_handle: 1,
            entries: Vec::new(),
        }
    }

    /// Current simulated time
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of pending tasks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Run `task` once, `delay` seconds from now
    pub fn schedule_once(&mut self, delay: f64, task: T) -> TaskHandle {
        self.push(delay, None, task)
    }

    /// Run `task` every `interval` seconds, first firing one interval from now
    pub fn schedule_repeating(&mut self, interval: f64, task: T) -> TaskHandle {
        self.push(interval, Some(interval), task)
    }

    fn push(&mut self, delay: f64, interval: Option<f64>, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(Entry {
            handle,
            due: self.now + delay.max(0.0),
            interval: interval.filter(|i| *i > 0.0),
            task,
        });
        handle
    }

    /// Remove a pending task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    /// Drop every pending task (the clock keeps running)
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Move the clock forward by `dt` and return the tasks that came due,
    /// earliest first. A repeating task appears once per elapsed interval.
    pub fn advance(&mut self, dt: f64) -> Vec<(TaskHandle, T)> {
        self.now += dt.max(0.0);
        let mut fired: Vec<(f64, TaskHandle, T)> = Vec::new();

        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].due > self.now {
                i += 1;
                continue;
            }
            match self.entries[i].interval {
                Some(interval) => {
                    let entry = &mut self.entries[i];
                    while entry.due <= self.now {
                        fired.push((entry.due, entry.handle, entry.task.clone()));
                        entry.due += interval;
                    }
                    i += 1;
                }
                None => {
                    let entry = self.entries.remove(i);
                    fired.push((entry.due, entry.handle, entry.task));
                }
            }
        }

        // Stable sort keeps scheduling order for simultaneous deadlines
        fired.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        fired.into_iter().map(|(_, h, t)| (h, t)).collect()
    }
}

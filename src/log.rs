use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::Local;

use crate::notify::Notifier;

pub const SYSTEM_MARKER: &str = "[SYSTEM]";
pub const ONLINE_MARKER: &str = "[ONLINE]";

/// Every n-th appended line is forwarded to the notifier regardless of markers.
const NOTIFY_EVERY: u64 = 5;

/// Bounded, timestamped console history for the hosted bot.
///
/// Oldest lines are dropped once `capacity` is reached. A sample of lines
/// (every fifth, plus anything carrying a system or online marker) is
/// forwarded to the [`Notifier`] without its timestamp.
pub struct LogBuffer {
    inner: Mutex<Inner>,
    capacity: usize,
    notifier: Arc<dyn Notifier>,
}

struct Inner {
    lines: VecDeque<String>,
    /// Lines ever appended, used for notification sampling.
    total: u64,
}

impl LogBuffer {
    pub fn new(capacity: usize, notifier: Arc<dyn Notifier>) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Inner {
                lines: VecDeque::with_capacity(capacity),
                total: 0,
            }),
            capacity,
            notifier,
        }
    }

    /// Split `raw` into lines and store every non-blank one.
    pub fn append(&self, raw: &str) {
        let mut forward = Vec::new();
        {
            let Ok(mut inner) = self.inner.lock() else {
                return;
            };
            for line in raw.lines().filter(|l| !l.trim().is_empty()) {
                let stamped = format!("[{}] {}", Local::now().format("%H:%M:%S"), line);
                if inner.lines.len() >= self.capacity {
                    inner.lines.pop_front();
                }
                inner.lines.push_back(stamped);
                inner.total += 1;

                if inner.total % NOTIFY_EVERY == 0
                    || line.contains(SYSTEM_MARKER)
                    || line.contains(ONLINE_MARKER)
                {
                    forward.push(line.to_string());
                }
            }
        }
        // Notify outside the lock so a slow notifier never stalls readers.
        for line in forward {
            self.notifier.notify_text(&line);
        }
    }

    /// Append a supervisor message tagged with the system marker.
    pub fn system(&self, msg: impl std::fmt::Display) {
        self.append(&format!("{SYSTEM_MARKER} {msg}"));
    }

    /// Append a line of bot output tagged with the online marker.
    pub fn online(&self, line: &str) {
        self.append(&format!("{ONLINE_MARKER} {line}"));
    }

    /// Snapshot of all stored lines, oldest first.
    pub fn read_all(&self) -> Vec<String> {
        let Ok(inner) = self.inner.lock() else {
            return vec![];
        };
        inner.lines.iter().cloned().collect()
    }
}

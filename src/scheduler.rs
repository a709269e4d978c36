use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: i64,
    pub due_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScheduledCallback {
    /// Fill the announcer live region with the page title after the delay
    /// assistive technology needs to notice the new element.
    AnnounceTitle { region: NodeId },
    /// Trailing edge of the scroll persistence throttle.
    ScrollFlush,
}

#[derive(Debug, Clone)]
pub(crate) struct ScheduledTask {
    pub(crate) id: i64,
    pub(crate) due_at: i64,
    pub(crate) order: i64,
    pub(crate) callback: ScheduledCallback,
}

/// Deterministic clock and task queue. Time only moves when the caller
/// advances it.
#[derive(Debug)]
pub(crate) struct Scheduler {
    tasks: Vec<ScheduledTask>,
    pub(crate) now_ms: i64,
    next_timer_id: i64,
    next_task_order: i64,
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        Self {
            tasks: Vec::new(),
            now_ms: 0,
            next_timer_id: 1,
            next_task_order: 0,
        }
    }

    pub(crate) fn schedule(&mut self, delay_ms: i64, callback: ScheduledCallback) -> i64 {
        let id = self.next_timer_id;
        self.next_timer_id = self.next_timer_id.saturating_add(1);
        let order = self.next_task_order;
        self.next_task_order = self.next_task_order.saturating_add(1);
        self.tasks.push(ScheduledTask {
            id,
            due_at: self.now_ms.saturating_add(delay_ms.max(0)),
            order,
            callback,
        });
        id
    }

    pub(crate) fn pending(&self) -> Vec<PendingTimer> {
        let mut timers: Vec<_> = self
            .tasks
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
            })
            .collect();
        timers.sort_by_key(|t| (t.due_at, t.id));
        timers
    }

    /// Removes and returns the earliest task due at or before `target`,
    /// advancing the clock to its due time.
    pub(crate) fn pop_due(&mut self, target: i64) -> Option<ScheduledTask> {
        let position = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.due_at <= target)
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)?;
        let task = self.tasks.remove(position);
        if task.due_at > self.now_ms {
            self.now_ms = task.due_at;
        }
        Some(task)
    }
}

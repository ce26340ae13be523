#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement { amount: u64 },
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

/// Batches per-item increments so hot loops do not call the callback for every item.
pub(crate) struct TaskTicker<'r, 'a> {
    reporter: &'r ProgressReporter<'a>,
    batch: u64,
    pending: u64,
}

impl<'r, 'a> TaskTicker<'r, 'a> {
    pub(crate) fn start(reporter: &'r ProgressReporter<'a>, total_steps: u64, batch: u64) -> Self {
        reporter.report(Progress::TaskStart { total_steps });
        Self {
            reporter,
            batch: batch.max(1),
            pending: 0,
        }
    }

    #[inline]
    pub(crate) fn tick(&mut self, amount: u64) {
        self.pending += amount;
        if self.pending >= self.batch {
            self.flush();
        }
    }

    pub(crate) fn finish(mut self) {
        self.flush();
        self.reporter.report(Progress::TaskFinish);
    }

    fn flush(&mut self) {
        if self.pending > 0 {
            self.reporter.report(Progress::TaskIncrement {
                amount: self.pending,
            });
            self.pending = 0;
        }
    }
}

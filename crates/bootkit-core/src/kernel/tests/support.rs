use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::kernel::component::{Entry, EntryMap, RegFunc};
use crate::kernel::scope::Scope;

/// Ordered record of lifecycle calls shared between mock entries.
pub(super) type Journal = Arc<Mutex<Vec<String>>>;

pub(super) fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub(super) fn events(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

pub(super) fn position(journal: &Journal, event: &str) -> usize {
    events(journal)
        .iter()
        .position(|e| e == event)
        .unwrap_or_else(|| panic!("event '{}' not recorded", event))
}

pub(super) const MOCK_ENTRY_TYPE: &str = "MockEntry";

/// Entry that writes `bootstrap:<name>`, `interrupt:<name>` and
/// `interrupted:<name>` to a journal. Interrupt sleeps for `interrupt_delay`
/// and ignores the scope, like a component that does not honour its budget.
pub(super) struct MockEntry {
    name: String,
    entry_type: String,
    journal: Journal,
    interrupt_delay: Duration,
    panic_on_bootstrap: bool,
    panic_on_interrupt: bool,
    interrupt_finished: AtomicBool,
}

impl MockEntry {
    pub(super) fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            entry_type: MOCK_ENTRY_TYPE.to_string(),
            journal: journal.clone(),
            interrupt_delay: Duration::ZERO,
            panic_on_bootstrap: false,
            panic_on_interrupt: false,
            interrupt_finished: AtomicBool::new(false),
        }
    }

    pub(super) fn with_type(mut self, entry_type: &str) -> Self {
        self.entry_type = entry_type.to_string();
        self
    }

    pub(super) fn with_interrupt_delay(mut self, delay: Duration) -> Self {
        self.interrupt_delay = delay;
        self
    }

    pub(super) fn panicking_on_bootstrap(mut self) -> Self {
        self.panic_on_bootstrap = true;
        self
    }

    pub(super) fn panicking_on_interrupt(mut self) -> Self {
        self.panic_on_interrupt = true;
        self
    }

    pub(super) fn interrupt_finished(&self) -> bool {
        self.interrupt_finished.load(Ordering::SeqCst)
    }

    fn record(&self, event: &str) {
        self.journal.lock().unwrap().push(format!("{}:{}", event, self.name));
    }
}

impl fmt::Display for MockEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{\"entryName\":\"{}\",\"entryType\":\"{}\"}}", self.name, self.entry_type)
    }
}

#[async_trait]
impl Entry for MockEntry {
    async fn bootstrap(&self, _scope: &Scope) {
        self.record("bootstrap");
        if self.panic_on_bootstrap {
            panic!("bootstrap of {} exploded", self.name);
        }
    }

    async fn interrupt(&self, _scope: &Scope) {
        self.record("interrupt");
        if self.panic_on_interrupt {
            panic!("interrupt of {} exploded", self.name);
        }
        if !self.interrupt_delay.is_zero() {
            tokio::time::sleep(self.interrupt_delay).await;
        }
        self.interrupt_finished.store(true, Ordering::SeqCst);
        self.record("interrupted");
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn entry_type(&self) -> &str {
        &self.entry_type
    }

    fn description(&self) -> &str {
        "mock entry"
    }
}

/// Construction function handing out the same entries every time, counting calls.
pub(super) fn fixed_reg_func(entries: Vec<Arc<MockEntry>>, calls: &Arc<AtomicUsize>) -> RegFunc {
    let calls = calls.clone();
    Arc::new(move |_raw: &[u8]| {
        calls.fetch_add(1, Ordering::SeqCst);
        entries
            .iter()
            .map(|e| (e.name().to_string(), e.clone() as Arc<dyn Entry>))
            .collect::<EntryMap>()
    })
}

//! Headless clipstack daemon: wires the monitor, sweep, and history engine
//! together and logs activity. A UI shell would subscribe to the same
//! history handle this binary creates.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use clipstack::history::{ClipHistory, HistoryEvent};
use clipstack::{logging, monitor, Settings};
use tracing::info;

fn main() -> Result<()> {
    let _guard = logging::init();

    let settings_path = Settings::default_path();
    let settings = Arc::new(Mutex::new(Settings::load(&settings_path)));

    let history = Arc::new(Mutex::new(ClipHistory::new()));
    history
        .lock()
        .expect("history lock poisoned at startup")
        .subscribe(|event| match event {
            HistoryEvent::HistoryChanged(entries) => {
                info!(count = entries.len(), "History changed");
            }
            HistoryEvent::SelectionChanged(id) => {
                info!(selected = ?id, "Selection changed");
            }
        });

    let _monitor = monitor::start_monitoring(history, settings);
    info!("clipstack running, press Ctrl-C to exit");

    loop {
        std::thread::park();
    }
}

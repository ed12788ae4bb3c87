//! Clipboard monitoring
//!
//! Background threads that feed the history engine: one polls the system
//! clipboard and delivers classified captures in arrival order, one runs the
//! periodic age sweep. Both park on a shared stop flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::bridge::{ClipboardBridge, SystemClipboard};
use crate::history::ClipHistory;
use crate::payload::ClipPayload;
use crate::settings::Settings;

/// Polling interval for clipboard changes.
const POLL_INTERVAL_MS: u64 = 500;

/// Interval between age-eviction sweeps.
const SWEEP_INTERVAL_SECS: u64 = 60;

/// Shared, mutex-guarded history handle used by the monitor threads.
pub type SharedHistory = Arc<Mutex<ClipHistory>>;

/// Shared settings snapshot source.
pub type SharedSettings = Arc<Mutex<Settings>>;

/// Controls the monitor threads after startup.
pub struct MonitorHandle {
    stop: Arc<AtomicBool>,
    enabled: Arc<AtomicBool>,
}

impl MonitorHandle {
    /// Signal both threads to exit at their next tick.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
        info!("Clipboard monitoring stopped");
    }

    /// Pause or resume capture without tearing the threads down.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
        info!(enabled, "Clipboard capture toggled");
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

/// Start the capture and sweep threads.
///
/// The system clipboard is thread-affine, so the capture thread constructs
/// its own bridge; a failure to open the clipboard ends that thread with an
/// error log rather than panicking.
pub fn start_monitoring(history: SharedHistory, settings: SharedSettings) -> MonitorHandle {
    let stop = Arc::new(AtomicBool::new(false));
    let enabled = Arc::new(AtomicBool::new(true));

    let capture_stop = stop.clone();
    let capture_enabled = enabled.clone();
    let capture_history = history.clone();
    let capture_settings = settings.clone();
    thread::spawn(move || match SystemClipboard::new() {
        Ok(mut bridge) => capture_loop(
            &mut bridge,
            capture_history,
            capture_settings,
            capture_stop,
            capture_enabled,
        ),
        Err(e) => error!(error = %e, "Failed to open system clipboard, capture disabled"),
    });

    let sweep_stop = stop.clone();
    thread::spawn(move || sweep_loop(history, settings, sweep_stop));

    info!(
        poll_interval_ms = POLL_INTERVAL_MS,
        sweep_interval_secs = SWEEP_INTERVAL_SECS,
        "Clipboard monitor started"
    );

    MonitorHandle { stop, enabled }
}

fn capture_loop(
    bridge: &mut dyn ClipboardBridge,
    history: SharedHistory,
    settings: SharedSettings,
    stop: Arc<AtomicBool>,
    enabled: Arc<AtomicBool>,
) {
    let poll_interval = Duration::from_millis(POLL_INTERVAL_MS);
    let mut last_payload: Option<ClipPayload> = None;
    let mut consecutive_errors = 0u32;

    loop {
        if stop.load(Ordering::Relaxed) {
            info!("Clipboard capture thread stopping");
            break;
        }

        let start = Instant::now();

        if enabled.load(Ordering::Relaxed) {
            match capture_tick(bridge, &history, &settings, &mut last_payload) {
                Ok(()) => consecutive_errors = 0,
                Err(e) => {
                    consecutive_errors += 1;
                    // Log the first failure and then every tenth to avoid spam.
                    if consecutive_errors == 1 || consecutive_errors % 10 == 0 {
                        warn!(
                            error = %e,
                            consecutive_errors,
                            "Failed to read system clipboard"
                        );
                    }
                }
            }
        }

        let elapsed = start.elapsed();
        if elapsed < poll_interval {
            thread::sleep(poll_interval - elapsed);
        }
    }
}

/// One poll: read, classify, and deliver to the history if the content
/// changed since the last observation.
fn capture_tick(
    bridge: &mut dyn ClipboardBridge,
    history: &Mutex<ClipHistory>,
    settings: &Mutex<Settings>,
    last_payload: &mut Option<ClipPayload>,
) -> Result<(), crate::error::ReadFailure> {
    let raw = bridge.read()?;
    if raw.is_empty() {
        return Ok(());
    }

    let payload = match ClipPayload::classify(&raw) {
        Ok(payload) => payload,
        // Classification failure is non-fatal: the capture is dropped with
        // no entry and no notification.
        Err(_) => {
            debug!("Clipboard offers no supported format, capture dropped");
            return Ok(());
        }
    };

    if last_payload.as_ref() == Some(&payload) {
        return Ok(());
    }

    let snapshot = settings
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    history
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .on_clip_captured(payload.clone(), &snapshot);
    *last_payload = Some(payload);

    Ok(())
}

fn sweep_loop(history: SharedHistory, settings: SharedSettings, stop: Arc<AtomicBool>) {
    let sweep_interval = Duration::from_secs(SWEEP_INTERVAL_SECS);

    loop {
        thread::sleep(sweep_interval);

        if stop.load(Ordering::Relaxed) {
            info!("Sweep thread stopping");
            break;
        }

        let snapshot = settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .evict_expired(Utc::now(), &snapshot);
    }
}

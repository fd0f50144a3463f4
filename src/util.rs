// Formatting helpers and the console logger.

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsValue;

/// Playback position as `m:ss` or `h:mm:ss`.
pub fn format_clock(secs: f64) -> String {
    let total = secs.abs().floor() as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Signed seek offset, e.g. `+0:05` or `-1:02:03`. Zero counts as positive.
pub fn format_offset(secs: f64) -> String {
    let sign = if secs < 0.0 { '-' } else { '+' };
    format!("{}{}", sign, format_clock(secs))
}

/// Clamp a playback position into `[0, duration]`.
///
/// `duration` is NaN until metadata loads and infinite for live streams, so
/// only a finite duration caps the value.
pub fn clamp_time(t: f64, duration: f64) -> f64 {
    let t = t.max(0.0);
    if duration.is_finite() { t.min(duration) } else { t }
}

pub const SHORTCUTS: &[(&str, &str)] = &[
    ("Space / K", "play / pause"),
    ("← / J", "back 5s"),
    ("→ / L", "forward 5s"),
    ("↑", "volume up"),
    ("↓", "volume down"),
    ("F", "fullscreen"),
    ("M", "mute"),
];

pub fn shortcut_hint() -> String {
    let rule = "━".repeat(26);
    let mut out = format!("\n🎬 keyboard shortcuts:\n{rule}\n");
    for (keys, action) in SHORTCUTS {
        out.push_str(&format!("{:<11}: {}\n", keys, action));
    }
    out.push_str(&rule);
    out
}

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&msg),
            Level::Warn => web_sys::console::warn_1(&msg),
            Level::Info => web_sys::console::info_1(&msg),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

/// Route the `log` macros to the browser console. Safe to call twice.
pub fn init_logging(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

//! Helper functions for the GUI
//!
//! Contains notification tags, text truncation and the window icon.

use crate::notifications::Severity;
use eframe::egui;
use std::time::Duration;

const ICON_SIZE: u32 = 64;

/// How often to check on a running background job
pub const JOB_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// When the next frame must run without user input, if ever.
///
/// Running jobs need polling; otherwise the only timed event is the next
/// toast expiring.
pub fn repaint_delay(next_expiry: Option<Duration>, jobs_running: bool) -> Option<Duration> {
    match (next_expiry, jobs_running) {
        (Some(expiry), true) => Some(expiry.min(JOB_POLL_INTERVAL)),
        (None, true) => Some(JOB_POLL_INTERVAL),
        (expiry, false) => expiry,
    }
}

/// ASCII tag shown in front of a notification
pub fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "[OK]",
        Severity::Error => "[XX]",
        Severity::Warning => "[!!]",
        Severity::Info => "[i]",
    }
}

/// Cut `text` to at most `max_chars` characters, adding "..." when cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}

/// Window icon: a blue ring with a bar through it, drawn at startup
pub fn load_icon() -> Option<egui::IconData> {
    let size = ICON_SIZE;
    let center = (size as f32 - 1.0) / 2.0;
    let outer = size as f32 * 0.46;
    let inner = size as f32 * 0.34;
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let distance = (dx * dx + dy * dy).sqrt();
            let on_ring = distance <= outer && distance >= inner;
            // slanted bar across the ring
            let on_bar = distance < outer && (dy + dx * 0.35).abs() < size as f32 * 0.06;
            if on_ring || on_bar {
                rgba.extend_from_slice(&[0, 136, 204, 255]);
            } else {
                rgba.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }

    Some(egui::IconData {
        rgba,
        width: size,
        height: size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== severity_tag tests ====================

    #[test]
    fn test_severity_tags() {
        assert_eq!(severity_tag(Severity::Success), "[OK]");
        assert_eq!(severity_tag(Severity::Error), "[XX]");
        assert_eq!(severity_tag(Severity::Warning), "[!!]");
        assert_eq!(severity_tag(Severity::Info), "[i]");
    }

    // ==================== truncate_chars tests ====================

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_chars("Wallet connected", 40), "Wallet connected");
    }

    #[test]
    fn test_truncate_long_text() {
        assert_eq!(truncate_chars("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn test_truncate_multibyte_safe() {
        assert_eq!(truncate_chars("¡Conectado! 🎉🎉", 11), "¡Conectado!...");
    }

    // ==================== repaint_delay tests ====================

    #[test]
    fn test_repaint_delay_idle_schedules_nothing() {
        assert_eq!(repaint_delay(None, false), None);
    }

    #[test]
    fn test_repaint_delay_waits_for_toast_expiry() {
        let expiry = Duration::from_millis(4_200);
        assert_eq!(repaint_delay(Some(expiry), false), Some(expiry));
    }

    #[test]
    fn test_repaint_delay_polls_running_jobs() {
        assert_eq!(repaint_delay(None, true), Some(JOB_POLL_INTERVAL));
        assert_eq!(repaint_delay(Some(Duration::from_secs(3)), true), Some(JOB_POLL_INTERVAL));
        let soon = Duration::from_millis(20);
        assert_eq!(repaint_delay(Some(soon), true), Some(soon));
    }

    // ==================== load_icon tests ====================

    #[test]
    fn test_load_icon_dimensions() {
        let icon = load_icon().unwrap();
        assert_eq!(icon.width, ICON_SIZE);
        assert_eq!(icon.height, ICON_SIZE);
        assert_eq!(icon.rgba.len(), (ICON_SIZE * ICON_SIZE * 4) as usize);
        // corners stay transparent
        assert_eq!(icon.rgba[3], 0);
    }
}

use eframe::egui;
use std::time::{Duration, Instant};

/// How long a notification stays on screen
pub const TOAST_DURATION: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    shown_at: Instant,
}

/// Transient, self-dismissing notifications
#[derive(Debug, Default)]
pub struct Toasts {
    items: Vec<Toast>,
}

impl Toasts {
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message.into(), ToastLevel::Info, Instant::now());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message.into(), ToastLevel::Error, Instant::now());
    }

    fn push(&mut self, message: String, level: ToastLevel, shown_at: Instant) {
        self.items.push(Toast {
            message,
            level,
            shown_at,
        });
    }

    /// Drop notifications older than [`TOAST_DURATION`] at `now`
    pub fn expire(&mut self, now: Instant) {
        self.items
            .retain(|t| now.saturating_duration_since(t.shown_at) < TOAST_DURATION);
    }

    pub fn items(&self) -> &[Toast] {
        &self.items
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        self.expire(Instant::now());
        if self.items.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -24.0])
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for toast in self.items() {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        let text = egui::RichText::new(&toast.message).size(15.0);
                        let text = match toast.level {
                            ToastLevel::Info => text,
                            ToastLevel::Error => text.color(egui::Color32::from_rgb(220, 60, 50)),
                        };
                        ui.label(text);
                    });
                    ui.add_space(4.0);
                }
            });

        // keep repainting so toasts disappear without user input
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_expire_after_duration() {
        let mut toasts = Toasts::default();
        let start = Instant::now();
        toasts.push("first".to_string(), ToastLevel::Info, start);
        toasts.push(
            "second".to_string(),
            ToastLevel::Error,
            start + Duration::from_secs(2),
        );

        toasts.expire(start + Duration::from_secs(1));
        assert_eq!(toasts.items().len(), 2);

        toasts.expire(start + TOAST_DURATION);
        assert_eq!(toasts.items().len(), 1);
        assert_eq!(toasts.items()[0].message, "second");
        assert_eq!(toasts.items()[0].level, ToastLevel::Error);

        toasts.expire(start + Duration::from_secs(10));
        assert!(toasts.items().is_empty());
    }

    #[test]
    fn test_new_toast_is_visible() {
        let mut toasts = Toasts::default();
        toasts.error("HTTP error: 500");
        toasts.expire(Instant::now());
        assert_eq!(toasts.items().len(), 1);
    }
}

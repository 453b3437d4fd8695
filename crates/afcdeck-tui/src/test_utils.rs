//! Test utilities for TUI rendering verification
//!
//! Helpers for testing widgets and full-screen rendering with ratatui's
//! TestBackend.

use afcdeck_app::{AppState, ConnectSuccess, Message};
use afcdeck_core::{
    AppRecord, ConnectionState, DeviceSnapshot, DirectoryListing, InstallType, PropertyMap,
};
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;
use ratatui::Frame;
use ratatui::Terminal;

/// Standard test terminal size
pub const TEST_WIDTH: u16 = 100;
pub const TEST_HEIGHT: u16 = 30;

/// Wrapper around a ratatui terminal with a TestBackend
pub struct TestTerminal {
    pub terminal: Terminal<TestBackend>,
}

impl TestTerminal {
    pub fn new() -> Self {
        Self::with_size(TEST_WIDTH, TEST_HEIGHT)
    }

    pub fn with_size(width: u16, height: u16) -> Self {
        let backend = TestBackend::new(width, height);
        let terminal = Terminal::new(backend).expect("Failed to create test terminal");
        Self { terminal }
    }

    pub fn area(&self) -> Rect {
        let size = self.terminal.size().expect("Failed to get terminal size");
        Rect::new(0, 0, size.width, size.height)
    }

    pub fn render_widget<W: Widget>(&mut self, widget: W, area: Rect) {
        self.terminal
            .draw(|frame| frame.render_widget(widget, area))
            .expect("Failed to render widget");
    }

    /// Draw a full frame, e.g. with `render::view`
    pub fn draw_with<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Frame),
    {
        self.terminal.draw(f).expect("Failed to draw frame");
    }

    pub fn buffer(&self) -> &Buffer {
        self.terminal.backend().buffer()
    }

    pub fn buffer_contains(&self, text: &str) -> bool {
        buffer_to_string(self.buffer()).contains(text)
    }

    pub fn line_contains(&self, line: u16, text: &str) -> bool {
        get_line_content(self.buffer(), line).contains(text)
    }

    /// Get all content as a string (for debugging)
    pub fn content(&self) -> String {
        buffer_to_string(self.buffer())
    }
}

impl Default for TestTerminal {
    fn default() -> Self {
        Self::new()
    }
}

fn buffer_to_string(buffer: &Buffer) -> String {
    let mut result = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            result.push_str(buffer[(x, y)].symbol());
        }
        result.push('\n');
    }
    result
}

fn get_line_content(buffer: &Buffer, line: u16) -> String {
    let mut result = String::new();
    if line < buffer.area.height {
        for x in 0..buffer.area.width {
            result.push_str(buffer[(x, line)].symbol());
        }
    }
    result
}

/// State of a jailed device showing `/var/mobile/Media` with two apps
pub fn connected_state() -> AppState {
    let mut state = AppState::new();
    state.connection = ConnectionState::Connecting;

    let mut properties = PropertyMap::new();
    properties.insert("DeviceName".into(), "Test iPhone".into());
    properties.insert("ProductVersion".into(), "17.4".into());

    let success = ConnectSuccess {
        snapshot: DeviceSnapshot {
            udid: "00008110-000A".into(),
            name: "Test iPhone".into(),
            properties,
            root_access: false,
            base_path: "/var/mobile/Media".into(),
        },
        listing: DirectoryListing::new(
            "/var/mobile/Media",
            vec!["DCIM".into(), "Downloads".into()],
            vec!["notes.txt".into()],
        ),
        apps: vec![
            AppRecord::new(
                "com.apple.Maps",
                Some("Maps".into()),
                Some("1.0".into()),
                InstallType::System,
            ),
            AppRecord::new(
                "org.videolan.vlc",
                Some("VLC".into()),
                Some("3.5".into()),
                InstallType::User,
            ),
        ],
        apps_error: None,
    };
    let _ = afcdeck_app::update(&mut state, Message::Connected(Box::new(success)));
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_size() {
        let term = TestTerminal::with_size(40, 12);
        assert_eq!(term.area().width, 40);
        assert_eq!(term.area().height, 12);
    }

    #[test]
    fn test_buffer_contains() {
        use ratatui::widgets::Paragraph;

        let mut term = TestTerminal::with_size(20, 5);
        term.render_widget(Paragraph::new("Hello World"), term.area());

        assert!(term.buffer_contains("Hello World"));
        assert!(term.line_contains(0, "Hello"));
        assert!(!term.buffer_contains("Goodbye"));
    }

    #[test]
    fn test_connected_state_has_session() {
        let state = connected_state();
        assert!(state.is_connected());
    }
}

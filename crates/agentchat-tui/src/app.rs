use std::collections::HashSet;
use std::sync::Arc;

use agentchat_core::{exchange, ChatMessage, ChatSession, ChatTransport};
use tokio::sync::mpsc::UnboundedSender;

use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub session: ChatSession,

    // Input box
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Chat pane scrolling
    pub scroll: u16,
    pub follow_tail: bool,
    pub chat_height: u16,      // Inner height of the chat pane, set during render
    pub chat_total_lines: u16, // Wrapped line count of the chat pane, set during render

    // Per-message UI state, keyed by index in the session log
    pub selected: Option<usize>,
    pub expanded_traces: HashSet<usize>,

    // One-line feedback shown in the footer
    pub status: Option<String>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub endpoint: String,
    transport: Arc<dyn ChatTransport>,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        endpoint: impl Into<String>,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            session: ChatSession::new(),

            input: String::new(),
            cursor: 0,

            scroll: 0,
            follow_tail: true,
            chat_height: 0,
            chat_total_lines: 0,

            selected: None,
            expanded_traces: HashSet::new(),

            status: None,

            animation_frame: 0,

            endpoint: endpoint.into(),
            transport,
            events,
        }
    }

    /// Send the current input, unless blank or a request is already in flight.
    pub fn submit(&mut self) {
        let Some(text) = self.session.begin_submit(&self.input) else {
            return;
        };

        self.input.clear();
        self.cursor = 0;
        self.status = None;
        self.animation_frame = 0;
        self.follow_tail = true;

        let transport = Arc::clone(&self.transport);
        let events = self.events.clone();
        tokio::spawn(async move {
            let reply = exchange(transport.as_ref(), &text).await;
            if events.send(AppEvent::Reply(reply)).is_err() {
                tracing::debug!("UI closed before the reply arrived");
            }
        });
    }

    /// Append the reply of the in-flight request and select it.
    pub fn receive_reply(&mut self, reply: ChatMessage) {
        self.session.complete(reply);
        self.selected = Some(self.session.len() - 1);
        self.follow_tail = true;
    }

    pub fn is_busy(&self) -> bool {
        self.session.is_busy()
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Input editing, cursor positions are char indices for UTF-8 safety

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn delete_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete_at_cursor(&mut self) {
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    // Scrolling

    pub fn max_scroll(&self) -> u16 {
        self.chat_total_lines.saturating_sub(self.chat_height)
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines).min(self.max_scroll());
        self.follow_tail = self.scroll >= self.max_scroll();
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
        self.follow_tail = false;
    }

    pub fn half_page(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
        self.follow_tail = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow_tail = true;
        self.scroll = self.max_scroll();
    }

    // Agent message selection

    fn agent_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.session
            .messages()
            .iter()
            .enumerate()
            .filter(|(_, msg)| msg.is_agent())
            .map(|(i, _)| i)
    }

    pub fn select_prev(&mut self) {
        let prev = match self.selected {
            Some(current) => self.agent_indices().filter(|&i| i < current).last(),
            None => self.agent_indices().last(),
        };
        if prev.is_some() {
            self.selected = prev;
        }
    }

    pub fn select_next(&mut self) {
        let next = match self.selected {
            Some(current) => self.agent_indices().find(|&i| i > current),
            None => self.agent_indices().last(),
        };
        if next.is_some() {
            self.selected = next;
        }
    }

    pub fn selected_message(&self) -> Option<&ChatMessage> {
        self.selected.and_then(|i| self.session.get(i))
    }

    /// Expand or collapse the trace block of the selected message.
    pub fn toggle_trace(&mut self) {
        let Some(index) = self.selected else {
            return;
        };
        if self.session.get(index).and_then(ChatMessage::agent_trace).is_none() {
            self.status = Some("No tool trace for this message".to_string());
            return;
        }
        if !self.expanded_traces.remove(&index) {
            self.expanded_traces.insert(index);
        }
    }

    pub fn is_trace_expanded(&self, index: usize) -> bool {
        self.expanded_traces.contains(&index)
    }

    /// Link target of the selected message's `number`th source (1-based).
    pub fn source_target(&self, number: usize) -> Option<String> {
        let sources = self.selected_message()?.agent_sources()?;
        sources.get(number.checked_sub(1)?).cloned()
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use agentchat_core::{AgentReply, TransportError};
    use async_trait::async_trait;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    /// Answers every message with the same reply, or fails when `None`.
    pub struct StubTransport(pub Option<AgentReply>);

    #[async_trait]
    impl ChatTransport for StubTransport {
        async fn send(&self, _message: &str) -> Result<AgentReply, TransportError> {
            match &self.0 {
                Some(reply) => Ok(reply.clone()),
                None => {
                    let err = serde_json::from_str::<AgentReply>("not json").unwrap_err();
                    Err(TransportError::InvalidBody(err))
                }
            }
        }
    }

    pub fn app_with(reply: Option<AgentReply>) -> (App, UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = App::new(Arc::new(StubTransport(reply)), "http://test/api/agent-chat/", tx);
        (app, rx)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::app_with;
    use super::*;
    use agentchat_core::ToolStep;

    fn agent_with_extras() -> ChatMessage {
        ChatMessage::agent(
            "- a\n- b",
            Some(vec![ToolStep::default()]),
            Some(vec!["https://one.fr/".into(), "https://two.fr".into()]),
        )
    }

    #[test]
    fn test_utf8_editing() {
        let (mut app, _rx) = app_with(None);
        for c in "héllo".chars() {
            app.insert_char(c);
        }
        app.cursor_left();
        app.cursor_left();
        app.delete_before_cursor();
        assert_eq!(app.input, "hélo");
        app.cursor_home();
        app.delete_at_cursor();
        assert_eq!(app.input, "élo");
        app.cursor_end();
        assert_eq!(app.cursor, 3);
    }

    #[test]
    fn test_selection_skips_user_messages() {
        let (mut app, _rx) = app_with(None);
        app.session.begin_submit("one");
        app.receive_reply(agent_with_extras());
        app.session.begin_submit("two");
        app.receive_reply(ChatMessage::agent("plain", None, None));

        assert_eq!(app.selected, Some(3));
        app.select_prev();
        assert_eq!(app.selected, Some(1));
        app.select_prev();
        assert_eq!(app.selected, Some(1));
        app.select_next();
        assert_eq!(app.selected, Some(3));
    }

    #[test]
    fn test_toggle_trace_only_with_trace() {
        let (mut app, _rx) = app_with(None);
        app.session.begin_submit("one");
        app.receive_reply(agent_with_extras());
        assert!(!app.is_trace_expanded(1));
        app.toggle_trace();
        assert!(app.is_trace_expanded(1));
        app.toggle_trace();
        assert!(!app.is_trace_expanded(1));

        app.session.begin_submit("two");
        app.receive_reply(ChatMessage::transport_failure());
        app.toggle_trace();
        assert!(app.expanded_traces.is_empty());
        assert!(app.status.is_some());
    }

    #[test]
    fn test_source_target_is_original_url() {
        let (mut app, _rx) = app_with(None);
        app.session.begin_submit("one");
        app.receive_reply(agent_with_extras());
        assert_eq!(app.source_target(1).as_deref(), Some("https://one.fr/"));
        assert_eq!(app.source_target(2).as_deref(), Some("https://two.fr"));
        assert_eq!(app.source_target(3), None);
        assert_eq!(app.source_target(0), None);
    }

    #[test]
    fn test_scroll_bounds() {
        let (mut app, _rx) = app_with(None);
        app.chat_height = 10;
        app.chat_total_lines = 25;
        app.scroll_to_bottom();
        assert_eq!(app.scroll, 15);
        app.scroll_down(5);
        assert_eq!(app.scroll, 15);
        assert!(app.follow_tail);
        app.scroll_up(20);
        assert_eq!(app.scroll, 0);
        assert!(!app.follow_tail);
    }
}

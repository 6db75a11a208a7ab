use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::{Paragraph, Wrap};
use std::cell::Cell;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use crate::blog::{BlogRequest, PromptTemplate, Style};
use crate::config::AppConfig;
use crate::llm::{GenerationError, Generator};
use crate::theme::Theme;

/// How long a status message stays on the status line
const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

/// Lines moved per PageUp/PageDown in the output area
const SCROLL_STEP: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Topic,
    Words,
    Style,
    Generate,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::Topic => Field::Words,
            Field::Words => Field::Style,
            Field::Style => Field::Generate,
            Field::Generate => Field::Topic,
        }
    }

    fn prev(self) -> Self {
        match self {
            Field::Topic => Field::Generate,
            Field::Words => Field::Topic,
            Field::Style => Field::Words,
            Field::Generate => Field::Style,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

/// What the output area shows. Text and error are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Empty,
    Generating,
    Text(String),
    Error(String),
}

type PendingGeneration = JoinHandle<Result<String, GenerationError>>;

pub struct App {
    pub focus: Field,
    pub popup: Popup,

    // Form fields
    pub topic: String,
    pub words: String,
    pub style: Style,

    // Output area
    pub output: Output,
    pub output_scroll: u16,
    pub output_viewport: Cell<(u16, u16)>,  // Inner (width, height), updated on every draw

    // Status message (shown in status line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    pub theme: Theme,
    pub notifications: bool,

    generator: Arc<dyn Generator>,
    template: PromptTemplate,
    pending: Option<PendingGeneration>,
}

impl App {
    pub fn new(config: &AppConfig, generator: Arc<dyn Generator>) -> Self {
        Self {
            focus: Field::Topic,
            popup: Popup::None,

            topic: String::new(),
            words: String::new(),
            style: config.default_style,

            output: Output::Empty,
            output_scroll: 0,
            output_viewport: Cell::new((0, 0)),

            status_message: None,
            status_message_time: None,

            theme: Theme::from_config(&config.theme),
            notifications: config.notifications,

            generator,
            template: config.prompt_template(),
            pending: None,
        }
    }

    pub fn model(&self) -> &str {
        self.generator.model()
    }

    pub fn is_generating(&self) -> bool {
        self.pending.is_some()
    }

    /// Snapshot of the form as a generation request
    pub fn request(&self) -> BlogRequest {
        BlogRequest::new(self.topic.clone(), self.words.clone(), self.style)
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.popup != Popup::None {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Enter | KeyCode::Char('q')) {
                self.popup = Popup::None;
            }
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            // Global keys work from any field
            KeyCode::Esc => {
                if self.is_generating() {
                    self.cancel_generation();
                }
            }
            KeyCode::F(1) => self.popup = Popup::Help,
            KeyCode::F(5) => self.submit(),
            KeyCode::Char('g') if ctrl => self.submit(),
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::PageDown => self.scroll_output_down(),
            KeyCode::PageUp => self.output_scroll = self.output_scroll.saturating_sub(SCROLL_STEP),

            _ => match self.focus {
                Field::Topic => Self::edit_text(&mut self.topic, &mut self.focus, key),
                Field::Words => Self::edit_text(&mut self.words, &mut self.focus, key),
                Field::Style => match key.code {
                    KeyCode::Left | KeyCode::Up => self.style = self.style.prev(),
                    KeyCode::Right | KeyCode::Down | KeyCode::Char(' ') => {
                        self.style = self.style.next()
                    }
                    KeyCode::Enter => self.focus = self.focus.next(),
                    _ => {}
                },
                Field::Generate => {
                    if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                        self.submit();
                    }
                }
            },
        }
    }

    /// Single-line text input: any character is accepted, nothing is filtered
    fn edit_text(buffer: &mut String, focus: &mut Field, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => buffer.push(c),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Enter => *focus = focus.next(),
            _ => {}
        }
    }

    /// Furthest the output can scroll: wrapped rows of the text minus the visible rows
    pub fn max_output_scroll(&self) -> u16 {
        let Output::Text(text) = &self.output else {
            return 0;
        };
        let (width, height) = self.output_viewport.get();
        if width == 0 {
            return 0;
        }

        let rows = Paragraph::new(text.as_str())
            .wrap(Wrap { trim: false })
            .line_count(width);
        u16::try_from(rows.saturating_sub(height as usize)).unwrap_or(u16::MAX)
    }

    fn scroll_output_down(&mut self) {
        self.output_scroll = self
            .output_scroll
            .saturating_add(SCROLL_STEP)
            .min(self.max_output_scroll());
    }

    /// Format the prompt from the form and start generating in the background
    pub fn submit(&mut self) {
        if self.is_generating() {
            self.set_status("Already generating, Esc cancels");
            return;
        }

        let request = self.request();
        let prompt = request.prompt(&self.template);
        tracing::info!(
            "Submitting blog request: style={}, words={:?}, topic {} chars",
            request.style,
            request.words,
            request.topic.chars().count()
        );
        tracing::debug!("Prompt: {}", prompt);

        let generator = Arc::clone(&self.generator);
        self.pending = Some(tokio::spawn(async move { generator.generate(&prompt).await }));
        self.output = Output::Generating;
        self.output_scroll = 0;
    }

    pub fn cancel_generation(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
            self.output = Output::Empty;
            self.set_status("Generation cancelled");
            tracing::info!("Generation cancelled by user");
        }
    }

    /// Wait for the in-flight request (if any) and show its result
    pub async fn finish_generation(&mut self) {
        let Some(handle) = self.pending.take() else {
            return;
        };

        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(GenerationError::Task(e.to_string())),
        };
        self.apply_result(result);
    }

    fn apply_result(&mut self, result: Result<String, GenerationError>) {
        self.output_scroll = 0;
        match result {
            Ok(text) => {
                tracing::info!("Generated {} bytes", text.len());
                self.output = Output::Text(text);
                self.set_status("Blog generated");
                if self.notifications {
                    if let Err(e) = crate::notify("blogsmith", "Your blog is ready") {
                        tracing::warn!("Notification failed: {}", e);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Generation failed: {}", e);
                self.output = Output::Error(e.to_string());
            }
        }
    }

    /// Periodic housekeeping, called once per UI loop iteration
    pub async fn tick(&mut self) {
        if self.pending.as_ref().is_some_and(|h| h.is_finished()) {
            self.finish_generation().await;
        }

        if let Some(time) = self.status_message_time {
            if time.elapsed() >= STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }
}

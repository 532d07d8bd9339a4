use iced::{
    widget::{button, column, row, text, text_input, Space},
    Alignment, Element, Length,
};

use crate::{
    application::{Notice, PromptRequest},
    domain::DownloadPhase,
};

/// Main view state
pub struct DownloadView {
    pub phase: DownloadPhase,
    pub prompt: Option<PromptRequest>,
    pub input: String,
    pub status_message: String,
    /// In-window notice with the id the app uses to close it.
    pub notice: Option<(u64, Notice)>,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            phase: DownloadPhase::Prompting,
            prompt: None,
            input: String::new(),
            status_message: "Starting...".to_string(),
            notice: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    InputChanged(String),
    Submit,
    Dismiss,
    AcknowledgeNotice,
}

impl DownloadView {
    pub fn show_prompt(&mut self, request: PromptRequest) {
        self.input = request.default_text.clone();
        self.prompt = Some(request);
    }

    /// Close the open prompt, returning what was typed into it.
    pub fn take_answer(&mut self) -> Option<String> {
        self.prompt.take()?;
        Some(std::mem::take(&mut self.input))
    }

    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::InputChanged(value) => {
                self.input = value;
            }
            DownloadMessage::Submit
            | DownloadMessage::Dismiss
            | DownloadMessage::AcknowledgeNotice => {
                // Will be handled by the app
            }
        }
    }

    pub fn view(&self) -> Element<'_, DownloadMessage> {
        if let Some((_, notice)) = &self.notice {
            return self.notice_view(notice);
        }
        if let Some(prompt) = &self.prompt {
            return self.prompt_view(prompt);
        }

        let heading = match self.phase {
            DownloadPhase::Prompting => "Video Downloader",
            DownloadPhase::Downloading => "Downloading",
            DownloadPhase::Completed => "Done",
            DownloadPhase::Failed => "Failed",
        };

        column![
            text(heading).size(32),
            Space::new().height(Length::Fixed(20.0)),
            text(&self.status_message).size(14),
        ]
        .padding(20)
        .spacing(10)
        .into()
    }

    fn prompt_view<'a>(&'a self, prompt: &'a PromptRequest) -> Element<'a, DownloadMessage> {
        column![
            text(&prompt.title).size(24),
            Space::new().height(Length::Fixed(10.0)),
            text(&prompt.message).size(16),
            text_input("", &self.input)
                .on_input(DownloadMessage::InputChanged)
                .on_submit(DownloadMessage::Submit)
                .padding(10),
            Space::new().height(Length::Fixed(10.0)),
            row![
                button("OK")
                    .on_press(DownloadMessage::Submit)
                    .padding([8, 20]),
                button("Cancel")
                    .on_press(DownloadMessage::Dismiss)
                    .padding([8, 20]),
            ]
            .spacing(10),
        ]
        .padding(20)
        .spacing(10)
        .into()
    }

    fn notice_view<'a>(&'a self, notice: &'a Notice) -> Element<'a, DownloadMessage> {
        let mut content = column![
            text(&notice.title).size(24),
            Space::new().height(Length::Fixed(10.0)),
            text(&notice.body).size(16),
        ]
        .padding(20)
        .spacing(10)
        .align_x(Alignment::Center)
        .width(Length::Fill);

        if let Some(after) = notice.auto_dismiss {
            content = content.push(text(format!("Closes in {} seconds", after.as_secs())).size(12));
        }

        content
            .push(Space::new().height(Length::Fixed(10.0)))
            .push(
                button("OK")
                    .on_press(DownloadMessage::AcknowledgeNotice)
                    .padding([8, 20]),
            )
            .into()
    }
}

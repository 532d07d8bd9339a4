use std::{collections::HashSet, sync::mpsc};

use futures::channel::mpsc::{unbounded, UnboundedSender};
use iced::Task;

use crate::{
    application::{
        DownloadCoordinator, DownloaderConfig, Notice, NoticeLevel, Prompt, PromptRequest,
        StatusDisplay,
    },
    domain::{AppError, DownloadOutcome, DownloadPhase},
    engine::YtDlpEngine,
    ui::{DownloadMessage, DownloadView},
    utils::{find_ytdlp, truncate_text},
};

/// Everything the download worker asks of the window.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Prompt {
        request: PromptRequest,
        reply: mpsc::Sender<Option<String>>,
    },
    Progress(String),
    Notice(Notice),
    Finished(Result<DownloadOutcome, AppError>),
}

/// Prompt that blocks the worker until the window answers
struct ChannelPrompt {
    events: UnboundedSender<WorkerEvent>,
}

impl Prompt for ChannelPrompt {
    fn ask(&mut self, request: PromptRequest) -> Option<String> {
        let (reply, answer) = mpsc::channel();
        self.events
            .unbounded_send(WorkerEvent::Prompt { request, reply })
            .ok()?;
        // A closed window drops the sender, which reads as a dismissal.
        answer.recv().ok().flatten()
    }
}

struct ChannelStatus {
    events: UnboundedSender<WorkerEvent>,
}

impl StatusDisplay for ChannelStatus {
    fn progress(&self, text: &str) {
        println!("{}", text);
        let _ = self
            .events
            .unbounded_send(WorkerEvent::Progress(text.to_string()));
    }

    fn notify(&self, notice: Notice) {
        let _ = self.events.unbounded_send(WorkerEvent::Notice(notice));
    }
}

pub struct DownloadApp {
    view: DownloadView,
    prompt_reply: Option<mpsc::Sender<Option<String>>>,
    open_notices: HashSet<u64>,
    next_notice_id: u64,
    finished: bool,
}

impl Default for DownloadApp {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadApp {
    pub fn new() -> Self {
        Self {
            view: DownloadView::default(),
            prompt_reply: None,
            open_notices: HashSet::new(),
            next_notice_id: 0,
            finished: false,
        }
    }

    fn answer_prompt(&mut self, answer: Option<String>) {
        if self.view.take_answer().is_none() {
            return;
        }
        if let Some(reply) = self.prompt_reply.take() {
            let _ = reply.send(answer);
        }
        self.view.status_message = "Working...".to_string();
    }

    fn show_notice(&mut self, notice: Notice) -> Task<Message> {
        let id = self.next_notice_id;
        self.next_notice_id += 1;
        self.open_notices.insert(id);

        match notice.level {
            NoticeLevel::Warning | NoticeLevel::Error => {
                let level = if notice.level == NoticeLevel::Warning {
                    rfd::MessageLevel::Warning
                } else {
                    rfd::MessageLevel::Error
                };
                let dialog = rfd::AsyncMessageDialog::new()
                    .set_level(level)
                    .set_title(&notice.title)
                    .set_description(&notice.body)
                    .set_buttons(rfd::MessageButtons::Ok);

                Task::perform(dialog.show(), move |_| Message::NoticeClosed(id))
            }
            NoticeLevel::Info => {
                let timer = notice.auto_dismiss;
                self.view.notice = Some((id, notice));
                match timer {
                    Some(after) => Task::perform(
                        async move { tokio::time::sleep(after).await },
                        move |_| Message::NoticeClosed(id),
                    ),
                    None => Task::none(),
                }
            }
        }
    }

    fn close_notice(&mut self, id: u64) -> Task<Message> {
        self.open_notices.remove(&id);
        if matches!(self.view.notice, Some((shown, _)) if shown == id) {
            self.view.notice = None;
        }
        self.exit_when_idle()
    }

    /// The app lives for a single request: once the worker is done and the
    /// last notice is closed, the window goes away.
    fn exit_when_idle(&self) -> Task<Message> {
        if self.finished && self.open_notices.is_empty() {
            iced::exit()
        } else {
            Task::none()
        }
    }

    fn finish(&mut self, result: Result<DownloadOutcome, AppError>) -> Task<Message> {
        self.finished = true;
        match result {
            Ok(outcome) => {
                self.view.phase = DownloadPhase::Completed;
                self.view.status_message =
                    format!("Saved to: {}", outcome.save_path.display());
                tracing::info!(url = outcome.target.url(), "download completed");
                self.exit_when_idle()
            }
            Err(AppError::Cancelled) => {
                tracing::info!("no URL entered, exiting");
                iced::exit()
            }
            Err(err @ AppError::Plan(_)) => {
                // The coordinator has already shown this one.
                self.view.phase = DownloadPhase::Failed;
                self.view.status_message = err.to_string();
                self.exit_when_idle()
            }
            Err(err @ AppError::Engine(_)) => {
                tracing::error!(%err, "download failed");
                self.view.phase = DownloadPhase::Failed;
                self.view.status_message = err.to_string();
                self.show_notice(Notice::error("Error", err.to_string()))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    Worker(WorkerEvent),
    /// The worker's event channel closed
    WorkerGone,
    NoticeClosed(u64),
}

/// Start the download worker and hand its events to the window.
pub fn boot() -> (DownloadApp, Task<Message>) {
    let app = DownloadApp::new();
    let (events, receiver) = unbounded();

    let binary = find_ytdlp();
    tracing::info!(binary = %binary.display(), "using yt-dlp");
    let coordinator = DownloadCoordinator::new(YtDlpEngine::new(binary), DownloaderConfig::default());

    let spawned = std::thread::Builder::new()
        .name("download-worker".to_string())
        .spawn(move || {
            let mut prompt = ChannelPrompt {
                events: events.clone(),
            };
            let status = ChannelStatus {
                events: events.clone(),
            };
            let result = coordinator.run(&mut prompt, &status);
            let _ = events.unbounded_send(WorkerEvent::Finished(result));
        });

    if let Err(e) = spawned {
        tracing::error!("failed to start download worker: {}", e);
        return (app, iced::exit());
    }

    let task = Task::run(receiver, Message::Worker).chain(Task::done(Message::WorkerGone));
    (app, task)
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                DownloadMessage::Submit => {
                    let answer = app.view.input.clone();
                    app.answer_prompt(Some(answer));
                }
                DownloadMessage::Dismiss => app.answer_prompt(None),
                DownloadMessage::AcknowledgeNotice => {
                    if let Some((id, _)) = app.view.notice {
                        return app.close_notice(id);
                    }
                }
                DownloadMessage::InputChanged(_) => {}
            }
        }
        Message::Worker(event) => match event {
            WorkerEvent::Prompt { request, reply } => {
                app.view.phase = DownloadPhase::Prompting;
                app.view.show_prompt(request);
                app.prompt_reply = Some(reply);
            }
            WorkerEvent::Progress(line) => {
                app.view.phase = DownloadPhase::Downloading;
                app.view.status_message = truncate_text(&line, 80);
            }
            WorkerEvent::Notice(notice) => return app.show_notice(notice),
            WorkerEvent::Finished(result) => return app.finish(result),
        },
        Message::WorkerGone => {
            if !app.finished {
                return app.finish(Err(AppError::Engine(
                    "download worker stopped unexpectedly".to_string(),
                )));
            }
        }
        Message::NoticeClosed(id) => return app.close_notice(id),
    }
    Task::none()
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}

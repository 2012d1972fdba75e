use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use formbot_core::Submission;
use formbot_store::{StoreError, SubmissionStore};

use crate::commands::parse_prefixed;
use crate::embeds::{
    self, Response, HELP_COMMANDS, HELP_ENV, HELP_FILES, HELP_RUN, MESSAGE_INPUT, NAME_INPUT,
    OPEN_FORM, PREVIEW_LIMIT, PREVIEW_LOCAL, SAY_HI, SUBMIT_MODAL,
};
use crate::gateway::{EventResponder, TransportError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRef {
    pub id: String,
    pub username: String,
}

impl UserRef {
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventEnvelope {
    pub event_id: String,
    pub event: InteractionEvent,
}

/// One inbound event, tagged by shape. Each variant carries enough context
/// to produce exactly one response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionEvent {
    /// Legacy text-channel message; only prefixed content is a command.
    Message(MessageEvent),
    /// Native command invocation; the discriminator arrives pre-parsed.
    Command(CommandInvocation),
    /// Button click on a previously sent panel.
    ComponentAction(ComponentActionEvent),
    /// Submitted input form, the deferred half of the modal-open path.
    ModalSubmission(ModalSubmissionEvent),
}

impl InteractionEvent {
    pub fn kind(&self) -> InteractionKind {
        match self {
            Self::Message(_) => InteractionKind::Message,
            Self::Command(_) => InteractionKind::Command,
            Self::ComponentAction(_) => InteractionKind::ComponentAction,
            Self::ModalSubmission(_) => InteractionKind::ModalSubmission,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Message,
    Command,
    ComponentAction,
    ModalSubmission,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageEvent {
    pub channel_id: String,
    pub author: UserRef,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    pub from_bot: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandInvocation {
    pub name: String,
    pub options: Vec<CommandOption>,
    pub channel_id: String,
    pub invoker: UserRef,
    pub issued_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandOption {
    pub name: String,
    pub value: String,
}

impl CommandInvocation {
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.name == name)
            .map(|option| option.value.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentActionEvent {
    pub component_id: String,
    pub channel_id: String,
    pub invoker: UserRef,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModalSubmissionEvent {
    pub modal_id: String,
    pub fields: HashMap<String, String>,
    pub invoker: UserRef,
}

impl ModalSubmissionEvent {
    pub fn field(&self, id: &str) -> Option<&str> {
        self.fields.get(id).map(String::as_str)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

/// What dispatch did with an event, for runner-side logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandlerOutcome {
    Replied,
    ModalOpened,
    Ignored,
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("response delivery failed: {0}")]
    Delivery(#[from] TransportError),
}

/// Maps an inbound event's discriminator to the single matching handler.
///
/// Legacy text commands are matched case-insensitively after prefix
/// stripping; component and modal ids are matched exactly. Unmatched
/// discriminators fall through as [`HandlerOutcome::Ignored`] with no
/// user-visible reaction.
pub struct InteractionRouter {
    store: Arc<dyn SubmissionStore>,
    prefix: String,
}

impl InteractionRouter {
    pub fn new(store: Arc<dyn SubmissionStore>, prefix: impl Into<String>) -> Self {
        Self { store, prefix: prefix.into() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub async fn dispatch(
        &self,
        envelope: &EventEnvelope,
        responder: &EventResponder,
        ctx: &EventContext,
    ) -> Result<HandlerOutcome, HandlerError> {
        match &envelope.event {
            InteractionEvent::Message(message) => self.handle_message(message, responder).await,
            InteractionEvent::Command(command) => self.handle_command(command, responder).await,
            InteractionEvent::ComponentAction(action) => {
                self.handle_component(action, responder).await
            }
            InteractionEvent::ModalSubmission(submission) => {
                self.handle_modal(submission, responder, ctx).await
            }
        }
    }

    async fn handle_message(
        &self,
        message: &MessageEvent,
        responder: &EventResponder,
    ) -> Result<HandlerOutcome, HandlerError> {
        if message.from_bot {
            return Ok(HandlerOutcome::Ignored);
        }
        let Some(command) = parse_prefixed(&message.content, &self.prefix) else {
            return Ok(HandlerOutcome::Ignored);
        };

        match command.name.as_str() {
            "ping" => {
                responder.reply(embeds::ping_message(latency_ms(message.sent_at))).await?;
            }
            "echo" => {
                let text = command.args.join(" ");
                let response = if text.is_empty() {
                    embeds::echo_usage(&self.prefix)
                } else {
                    Response::text(text)
                };
                responder.reply(response).await?;
            }
            "menu" => {
                responder.reply(Response::panel(embeds::menu_panel())).await?;
            }
            "helpview" => {
                responder.reply(Response::panel(embeds::help_view_panel())).await?;
            }
            _ => return Ok(HandlerOutcome::Ignored),
        }

        Ok(HandlerOutcome::Replied)
    }

    async fn handle_command(
        &self,
        command: &CommandInvocation,
        responder: &EventResponder,
    ) -> Result<HandlerOutcome, HandlerError> {
        match command.name.as_str() {
            "ping" => {
                responder.reply(embeds::ping_message(latency_ms(command.issued_at))).await?;
            }
            "echo" => {
                let text = command.option("text").unwrap_or_default();
                let response = if text.is_empty() {
                    embeds::echo_usage(&self.prefix)
                } else {
                    Response::text(text)
                };
                responder.reply(response).await?;
            }
            "menu" => {
                responder.reply(Response::panel(embeds::menu_panel())).await?;
            }
            "helpview" => {
                responder.reply(Response::panel(embeds::help_view_panel())).await?;
            }
            _ => return Ok(HandlerOutcome::Ignored),
        }

        Ok(HandlerOutcome::Replied)
    }

    async fn handle_component(
        &self,
        action: &ComponentActionEvent,
        responder: &EventResponder,
    ) -> Result<HandlerOutcome, HandlerError> {
        match action.component_id.as_str() {
            OPEN_FORM => {
                responder.show_modal(embeds::submission_form()).await?;
                return Ok(HandlerOutcome::ModalOpened);
            }
            SAY_HI => {
                responder.reply(embeds::greeting_message(&action.invoker.mention())).await?;
            }
            PREVIEW_LOCAL => {
                let rows = self.store.preview_first_lines(PREVIEW_LIMIT).await?;
                responder.reply(embeds::preview_message(&rows)).await?;
            }
            HELP_COMMANDS => {
                responder
                    .reply(Response::ephemeral_panel(embeds::help_commands_panel(&self.prefix)))
                    .await?;
            }
            HELP_ENV => {
                responder.reply(Response::ephemeral_panel(embeds::help_env_panel())).await?;
            }
            HELP_FILES => {
                responder.reply(Response::ephemeral_panel(embeds::help_files_panel())).await?;
            }
            HELP_RUN => {
                responder.reply(Response::ephemeral_panel(embeds::help_run_panel())).await?;
            }
            _ => return Ok(HandlerOutcome::Ignored),
        }

        Ok(HandlerOutcome::Replied)
    }

    async fn handle_modal(
        &self,
        submission: &ModalSubmissionEvent,
        responder: &EventResponder,
        ctx: &EventContext,
    ) -> Result<HandlerOutcome, HandlerError> {
        if submission.modal_id != SUBMIT_MODAL {
            return Ok(HandlerOutcome::Ignored);
        }

        let record = Submission::from_form(
            submission.field(NAME_INPUT).map(str::to_owned),
            submission.field(MESSAGE_INPUT).map(str::to_owned),
            submission.invoker.id.clone(),
            submission.invoker.username.clone(),
        );
        if !record.is_complete() {
            // The input surface enforces these constraints; arriving here
            // means the payload bypassed them. Store the coerced record.
            warn!(
                correlation_id = %ctx.correlation_id,
                "form submission arrived with missing or out-of-bound fields"
            );
        }

        self.store.append(&record).await?;
        responder.reply(embeds::saved_confirmation()).await?;

        Ok(HandlerOutcome::Replied)
    }
}

fn latency_ms(issued_at: DateTime<Utc>) -> i64 {
    (Utc::now() - issued_at).num_milliseconds().max(0)
}

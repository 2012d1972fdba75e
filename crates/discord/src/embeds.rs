use serde::Serialize;

use formbot_core::NAME_MAX_LEN;

// Component and modal discriminators. Lookup is exact and case-sensitive.
pub const OPEN_FORM: &str = "open_form";
pub const SAY_HI: &str = "say_hi";
pub const PREVIEW_LOCAL: &str = "preview_local";
pub const HELP_COMMANDS: &str = "help_commands";
pub const HELP_ENV: &str = "help_env";
pub const HELP_FILES: &str = "help_files";
pub const HELP_RUN: &str = "help_run";
pub const SUBMIT_MODAL: &str = "submit_modal";
pub const NAME_INPUT: &str = "name_input";
pub const MESSAGE_INPUT: &str = "message_input";

/// How many of the earliest records a preview shows.
pub const PREVIEW_LIMIT: usize = 10;
/// Rendered previews longer than this ship as an attachment instead of
/// inline text.
pub const INLINE_PREVIEW_MAX: usize = 1900;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Button {
    pub id: String,
    pub label: String,
    pub style: ButtonStyle,
}

impl Button {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self { id: id.into(), label: label.into(), style: ButtonStyle::Secondary }
    }

    pub fn style(mut self, style: ButtonStyle) -> Self {
        self.style = style;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PanelField {
    pub name: String,
    pub value: String,
}

/// A structured message panel: title, optional description, accent color,
/// labeled fields, and a row of action buttons.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Panel {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: u32,
    pub fields: Vec<PanelField>,
    pub buttons: Vec<Button>,
}

pub struct PanelBuilder {
    panel: Panel,
}

impl PanelBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            panel: Panel {
                title: title.into(),
                description: None,
                color: 0,
                fields: Vec::new(),
                buttons: Vec::new(),
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.panel.description = Some(description.into());
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.panel.color = color;
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.panel.fields.push(PanelField { name: name.into(), value: value.into() });
        self
    }

    pub fn button(mut self, button: Button) -> Self {
        self.panel.buttons.push(button);
        self
    }

    pub fn build(self) -> Panel {
        self.panel
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputStyle {
    Short,
    Paragraph,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextInput {
    pub id: String,
    pub label: String,
    pub style: InputStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u16>,
}

impl TextInput {
    pub fn short(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, InputStyle::Short)
    }

    pub fn paragraph(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, InputStyle::Paragraph)
    }

    fn new(id: impl Into<String>, label: impl Into<String>, style: InputStyle) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            style,
            placeholder: None,
            required: false,
            max_length: None,
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn max_length(mut self, max_length: u16) -> Self {
        self.max_length = Some(max_length);
        self
    }
}

/// An input form surfaced to the user; its submission arrives later as a
/// distinct modal-submission event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModalRequest {
    pub id: String,
    pub title: String,
    pub inputs: Vec<TextInput>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttachmentPayload {
    pub filename: String,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBody {
    Text { text: String },
    Panel { panel: Panel },
    Attachment { note: String, attachment: AttachmentPayload },
}

/// One outbound reply. `ephemeral` replies are visible only to the invoker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Response {
    pub body: ResponseBody,
    pub ephemeral: bool,
}

impl Response {
    pub fn text(text: impl Into<String>) -> Self {
        Self { body: ResponseBody::Text { text: text.into() }, ephemeral: false }
    }

    pub fn ephemeral_text(text: impl Into<String>) -> Self {
        Self { body: ResponseBody::Text { text: text.into() }, ephemeral: true }
    }

    pub fn panel(panel: Panel) -> Self {
        Self { body: ResponseBody::Panel { panel }, ephemeral: false }
    }

    pub fn ephemeral_panel(panel: Panel) -> Self {
        Self { body: ResponseBody::Panel { panel }, ephemeral: true }
    }

    pub fn ephemeral_attachment(
        note: impl Into<String>,
        filename: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            body: ResponseBody::Attachment {
                note: note.into(),
                attachment: AttachmentPayload {
                    filename: filename.into(),
                    content: content.into(),
                },
            },
            ephemeral: true,
        }
    }
}

pub fn ping_message(latency_ms: i64) -> Response {
    Response::text(format!("Pong! Latency: {latency_ms}ms"))
}

pub fn echo_usage(prefix: &str) -> Response {
    Response::text(format!("Usage: {prefix}echo <text>"))
}

pub fn greeting_message(mention: &str) -> Response {
    Response::ephemeral_text(format!("Hello, {mention}!"))
}

pub fn saved_confirmation() -> Response {
    Response::ephemeral_text("Thanks - your input was received and saved.")
}

pub fn generic_failure() -> Response {
    Response::ephemeral_text("An error occurred.")
}

pub fn menu_panel() -> Panel {
    PanelBuilder::new("Test Menu")
        .description("Press a button below to open the form, say hi, or preview saved submissions.")
        .color(0x5865F2)
        .field("Note", "Submissions are appended to a local file for later review.")
        .button(Button::new(OPEN_FORM, "Open form").style(ButtonStyle::Primary))
        .button(Button::new(SAY_HI, "Say hi").style(ButtonStyle::Success))
        .button(Button::new(PREVIEW_LOCAL, "Preview saved"))
        .build()
}

pub fn help_view_panel() -> Panel {
    PanelBuilder::new("Interactive Help")
        .description(
            "Click a button for commands, environment variables, files, or run instructions.",
        )
        .color(0x1F8B4C)
        .button(Button::new(HELP_COMMANDS, "Commands").style(ButtonStyle::Primary))
        .button(Button::new(HELP_ENV, "Environment"))
        .button(Button::new(HELP_FILES, "Files"))
        .button(Button::new(HELP_RUN, "Run / Deploy").style(ButtonStyle::Success))
        .build()
}

pub fn help_commands_panel(prefix: &str) -> Panel {
    PanelBuilder::new("Bot Commands")
        .color(0x5865F2)
        .field(format!("{prefix}ping"), "Replies with Pong and latency")
        .field(format!("{prefix}echo <text>"), "Echoes provided text")
        .field(format!("{prefix}menu"), "Sends an interactive menu (buttons + modal).")
        .field(format!("{prefix}helpview"), "Sends this interactive help view.")
        .build()
}

pub fn help_env_panel() -> Panel {
    PanelBuilder::new("Environment Variables")
        .color(0xFFD166)
        .field("BOT_TOKEN", "Bot token (required). Use host secrets or formbot.toml locally.")
        .field("BOT_PREFIX", "Command prefix (optional). Default: !")
        .field("FORMBOT_STORE_PATH", "Where submissions are stored. Default: submissions.csv")
        .field("FORMBOT_KEEP_ALIVE_PORT", "Port for the liveness endpoint. Default: 3000")
        .build()
}

pub fn help_files_panel() -> Panel {
    PanelBuilder::new("Project Files")
        .color(0x6AB04C)
        .field("formbot.toml", "Optional config file (env vars win over it)")
        .field("submissions.csv", "Append-only record store, one quoted row per submission")
        .build()
}

pub fn help_run_panel() -> Panel {
    PanelBuilder::new("Run & Deploy")
        .description(
            "Local: export BOT_TOKEN, then cargo run\n\
             Container: set BOT_TOKEN as a secret and run the formbot-server binary\n\
             Liveness probes can poll GET / on the keep-alive port",
        )
        .color(0x2D9CDB)
        .build()
}

/// The one supported input form. Constraints here mirror the form model;
/// the platform enforces them before a submission event is ever delivered.
pub fn submission_form() -> ModalRequest {
    ModalRequest {
        id: SUBMIT_MODAL.to_string(),
        title: "Submit a record".to_string(),
        inputs: vec![
            TextInput::short(NAME_INPUT, "Name")
                .placeholder("Your name")
                .required()
                .max_length(NAME_MAX_LEN as u16),
            TextInput::paragraph(MESSAGE_INPUT, "Message")
                .placeholder("Your message")
                .required(),
        ],
    }
}

/// Render a store preview for delivery.
///
/// Rows are numbered 1-indexed in append order. A rendered preview longer
/// than [`INLINE_PREVIEW_MAX`] ships as a `preview.txt` attachment;
/// otherwise it goes inline, fenced as a literal block. Both forms are
/// ephemeral.
pub fn preview_message(rows: &[String]) -> Response {
    if rows.is_empty() {
        return Response::ephemeral_text("No saved submissions yet.");
    }

    let content = rows
        .iter()
        .enumerate()
        .map(|(index, row)| format!("{}. {row}", index + 1))
        .collect::<Vec<_>>()
        .join("\n");

    let text = format!("Saved submissions (up to {PREVIEW_LIMIT}):\n{content}");
    if text.chars().count() > INLINE_PREVIEW_MAX {
        Response::ephemeral_attachment("Preview attached.", "preview.txt", content)
    } else {
        Response::ephemeral_text(format!("```\n{content}\n```"))
    }
}

//! Embed payloads sent back to the platform.
//!
//! Embeds are kept deliberately small: a title, a color and a list of fields.
//! Rendering them is the job of the transport, [`Embed::to_markdown`] is only
//! a plain text fallback.

/// Red, used by every error embed.
pub const ERROR_COLOR: u32 = 0xFF0000;

/// Green, used by informational embeds of the built-in commands.
pub const INFO_COLOR: u32 = 0x2ECC71;

/// One titled block of text inside an [`Embed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    /// Field title
    pub name: String,
    /// Field body
    pub value: String,
    /// Whether the field may be displayed next to the previous one
    pub inline: bool,
}

/// A rich message payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Embed {
    /// Optional title shown on top of the embed
    pub title: Option<String>,
    /// Side bar color as `0xRRGGBB`
    pub color: u32,
    /// Ordered fields
    pub fields: Vec<EmbedField>,
}

impl Embed {
    /// Creates an empty embed with the given color.
    pub fn new(color: u32) -> Self {
        Embed {
            title: None,
            color,
            fields: vec![],
        }
    }

    /// Sets the title of the embed.
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_owned());
        self
    }

    /// Appends a field to the embed.
    pub fn field(mut self, name: &str, value: &str, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.to_owned(),
            value: value.to_owned(),
            inline,
        });
        self
    }

    /// Renders the embed as Markdown.
    ///
    /// # Examples
    ///
    /// ```
    /// # use switchboard::platform::Embed;
    /// let embed = Embed::new(0).title("[INFO]").field("Pong", "Latency is fine.", true);
    /// assert_eq!(embed.to_markdown(), "**[INFO]**\n- **Pong**: Latency is fine.");
    /// ```
    pub fn to_markdown(&self) -> String {
        let mut lines = vec![];
        if let Some(title) = &self.title {
            lines.push(format!("**{}**", title));
        }
        lines.extend(
            self.fields
                .iter()
                .map(|field| format!("- **{}**: {}", field.name, field.value)),
        );
        lines.join("\n")
    }
}

/// Embeds sent by the dispatcher itself.
///
/// Built once at start-up and handed to the [`Bot`](crate::bot::Bot), which
/// never mutates them afterwards.
#[derive(Debug, Clone)]
pub struct DefaultEmbeds {
    /// Sent when a member lacks a permission required by a command
    pub no_permission: Embed,
    /// Sent when a command has no usable executor
    pub missing_executor: Embed,
}

impl Default for DefaultEmbeds {
    fn default() -> Self {
        DefaultEmbeds {
            no_permission: Embed::new(ERROR_COLOR).title("[ERROR]").field(
                "Permission refused",
                "You cannot use this command because of missing permission(s).",
                true,
            ),
            missing_executor: Embed::new(ERROR_COLOR).title("[ERROR]").field(
                "No executor",
                "I'm sorry, but it seems that this command is not handled by the bot, please report this to bot developer.",
                true,
            ),
        }
    }
}

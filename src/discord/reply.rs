//! Outgoing message model.
//!
//! Commands build [`Reply`] values made of plain [`Card`]s and in-memory
//! [`TextFile`]s. They are only turned into serenity builders when sent,
//! which keeps every command testable without a gateway.

use rand::Rng;
use serenity::all::{CreateAttachment, CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter};
use tracing::info;

/// Descriptions longer than this are cut and attached in full.
pub const DESCRIPTION_LIMIT: usize = 2048;
/// Field values longer than this are cut and attached in full.
pub const FIELD_LIMIT: usize = 1024;

const TITLE_LIMIT: usize = 256;
const FIELD_NAME_LIMIT: usize = 256;
const FOOTER_LIMIT: usize = 2048;
const MAX_FIELDS: usize = 25;
const EMBED_TOTAL_LIMIT: usize = 6000;

pub const GREEN: u32 = 0x2ecc71;
pub const PURPLE: u32 = 0x9b59b6;
pub const ORANGE: u32 = 0xe67e22;
pub const RED: u32 = 0xe74c3c;
pub const BLUE: u32 = 0x3498db;

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub name: String,
    pub icon_url: Option<String>,
    pub url: Option<String>,
}

/// A single embed, before it is handed to serenity.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub colour: u32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub fields: Vec<Field>,
    pub thumbnail: Option<String>,
    pub footer: Option<String>,
    pub author: Option<Author>,
}

impl Card {
    pub fn new(colour: u32) -> Self {
        Self {
            colour,
            title: None,
            description: None,
            url: None,
            fields: Vec::new(),
            thumbnail: None,
            footer: None,
            author: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Append a field. Empty values are shown as `None`, Discord rejects
    /// them otherwise.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        let value = value.into();
        self.fields.push(Field {
            name: name.into(),
            value: if value.trim().is_empty() {
                "None".to_string()
            } else {
                value
            },
            inline,
        });
        self
    }

    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }

    pub fn author(mut self, name: impl Into<String>, icon_url: Option<String>, url: Option<String>) -> Self {
        self.author = Some(Author {
            name: name.into(),
            icon_url,
            url,
        });
        self
    }

    /// Build the serenity embed, clamped to Discord's hard limits.
    pub fn to_embed(&self) -> CreateEmbed {
        let mut embed = CreateEmbed::new().colour(self.colour);
        let mut budget = EMBED_TOTAL_LIMIT;

        if let Some(ref title) = self.title {
            let title = truncate_chars(title, TITLE_LIMIT);
            budget = budget.saturating_sub(title.chars().count());
            embed = embed.title(title);
        }
        if let Some(ref description) = self.description {
            let description = truncate_chars(description, DESCRIPTION_LIMIT);
            budget = budget.saturating_sub(description.chars().count());
            embed = embed.description(description);
        }
        if let Some(ref footer) = self.footer {
            let footer = truncate_chars(footer, FOOTER_LIMIT);
            budget = budget.saturating_sub(footer.chars().count());
            embed = embed.footer(CreateEmbedFooter::new(footer));
        }
        if let Some(ref author) = self.author {
            let mut builder = CreateEmbedAuthor::new(truncate_chars(&author.name, TITLE_LIMIT));
            if let Some(ref icon) = author.icon_url {
                builder = builder.icon_url(icon);
            }
            if let Some(ref url) = author.url {
                builder = builder.url(url);
            }
            budget = budget.saturating_sub(author.name.chars().count());
            embed = embed.author(builder);
        }
        if let Some(ref url) = self.url {
            embed = embed.url(url);
        }
        if let Some(ref thumbnail) = self.thumbnail {
            embed = embed.thumbnail(thumbnail);
        }

        // Fields that would push the embed over the total size are dropped
        for field in self.fields.iter().take(MAX_FIELDS) {
            let name = truncate_chars(&field.name, FIELD_NAME_LIMIT);
            let value = truncate_chars(&field.value, FIELD_LIMIT);
            let size = name.chars().count() + value.chars().count();
            if size > budget {
                break;
            }
            budget -= size;
            embed = embed.field(name, value, field.inline);
        }

        embed
    }
}

/// A markdown file built in memory and sent as an attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFile {
    pub filename: String,
    pub content: String,
}

impl TextFile {
    /// New file named `<kind>-<random>.md`.
    pub fn new(kind: &str, content: impl Into<String>) -> Self {
        let filename = generate_file_name(kind);
        info!("Creating file: {}", filename);
        Self {
            filename,
            content: content.into(),
        }
    }

    pub fn to_attachment(&self) -> CreateAttachment {
        CreateAttachment::bytes(self.content.as_bytes().to_vec(), self.filename.clone())
    }
}

/// Everything sent back for one command step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    pub cards: Vec<Card>,
    pub files: Vec<TextFile>,
}

impl Reply {
    pub fn card(card: Card) -> Self {
        Self {
            cards: vec![card],
            files: Vec::new(),
        }
    }

    pub fn with_file(mut self, file: TextFile) -> Self {
        self.files.push(file);
        self
    }

    /// Cut over-long descriptions and field values, attaching the full
    /// text as `<kind>-<random>.md` files.
    pub fn finish(mut self, kind: &str) -> Self {
        let mut files = Vec::new();

        for card in &mut self.cards {
            if let Some(description) = card.description.take() {
                if description.chars().count() > DESCRIPTION_LIMIT {
                    let file = TextFile::new(kind, description.as_str());
                    card.description = Some(truncate_chars(&description, DESCRIPTION_LIMIT));
                    card.fields.insert(
                        0,
                        Field {
                            name: "LENGTH OF DESCRIPTION TOO LONG FOR DISCORD".to_string(),
                            value: format!("See `{}` for full description", file.filename),
                            inline: false,
                        },
                    );
                    files.push(file);
                } else {
                    card.description = Some(description);
                }
            }

            for field in &mut card.fields {
                if field.value.chars().count() > FIELD_LIMIT {
                    let file = TextFile::new(kind, format!("## {}\n\n{}", field.name, field.value));
                    let note = format!("...\nSee `{}`", file.filename);
                    let keep = FIELD_LIMIT - note.chars().count();
                    field.value = format!("{}{}", truncate_chars(&field.value, keep), note);
                    files.push(file);
                }
            }
        }

        self.files.extend(files);
        self
    }

    /// Split into messages: one card each, files riding on the last one.
    pub fn into_messages(self) -> Vec<(Option<Card>, Vec<TextFile>)> {
        let mut files = Some(self.files);
        let count = self.cards.len();
        let mut messages: Vec<(Option<Card>, Vec<TextFile>)> = self
            .cards
            .into_iter()
            .enumerate()
            .map(|(i, card)| {
                let attached = if i + 1 == count {
                    files.take().unwrap_or_default()
                } else {
                    Vec::new()
                };
                (Some(card), attached)
            })
            .collect();

        if let Some(files) = files.filter(|f| !f.is_empty()) {
            messages.push((None, files));
        }
        messages
    }
}

/// First `max_chars` characters of `s`.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        s.chars().take(max_chars).collect()
    } else {
        s.to_string()
    }
}

/// `<kind>-<random>.md`
pub fn generate_file_name(kind: &str) -> String {
    format!("{}-{}.md", kind, rand::thread_rng().gen_range(1..1_000_000))
}

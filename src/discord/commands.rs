//! Bot commands (/help, /roll, /search, /searchdir, /lst).
//!
//! Handles command parsing and execution. Execution only produces
//! [`Reply`] values, the handler decides how to deliver them.

use serenity::all::{CommandOptionType, CreateCommand, CreateCommandOption};
use tracing::{debug, info};

use crate::common::error::ResolveResult;
use crate::dice::{self, format_total, RollStep};
use crate::discord::entities::construct_response;
use crate::discord::notices;
use crate::discord::reply::{Card, Reply, TextFile, GREEN, PURPLE};
use crate::open5e::{normalize, Match, Open5eClient, Resolution, ResolutionResult};
use crate::scryfall::ScryfallClient;

/// Longest accepted argument, in characters.
pub const MAX_ARG_LENGTH: usize = 200;
/// Directory listings longer than this are sent as a file.
pub const INLINE_LISTING_LIMIT: usize = 200;
/// `/lst` results that fit as embed fields.
pub const MAX_LIST_FIELDS: usize = 24;

const MAX_ROLL_STEP_FIELDS: usize = 21;

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OghmaCommand {
    Help,
    Roll { calculation: String },
    Search { entity: String },
    SearchDir { directory: String, entity: String },
    Lst { entity: String, directory: String },
}

/// Who issued a command.
#[derive(Debug, Clone, Default)]
pub struct Requester {
    pub name: String,
    pub avatar_url: Option<String>,
}

impl OghmaCommand {
    /// Build from a slash command name and a lookup of its string options.
    pub fn from_slash(name: &str, option: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let opt = |key: &str| option(key).unwrap_or_default();
        match name {
            "help" => Some(OghmaCommand::Help),
            "roll" => Some(OghmaCommand::Roll {
                calculation: opt("calculation"),
            }),
            "search" => Some(OghmaCommand::Search {
                entity: opt("entity"),
            }),
            "searchdir" => Some(OghmaCommand::SearchDir {
                directory: opt("directory"),
                entity: opt("entity"),
            }),
            "lst" => Some(OghmaCommand::Lst {
                entity: opt("entity"),
                directory: opt("directory"),
            }),
            _ => None,
        }
    }

    /// Parse a `!command args` message.
    ///
    /// `!searchdir` takes the directory as its first word. `!lst` only
    /// treats its first word as a directory when it ends with `/`, as in
    /// `!lst spells/ fire`.
    pub fn parse_text(content: &str) -> Option<Self> {
        let content = content.trim().strip_prefix('!')?;
        let (command, args) = match content.split_once(char::is_whitespace) {
            Some((command, args)) => (command, args.trim()),
            None => (content, ""),
        };

        let (head, tail) = match args.split_once(char::is_whitespace) {
            Some((head, tail)) => (head, tail.trim()),
            None => (args, ""),
        };

        match command.to_lowercase().as_str() {
            "help" => Some(OghmaCommand::Help),
            "roll" => Some(OghmaCommand::Roll {
                calculation: args.to_string(),
            }),
            "search" => Some(OghmaCommand::Search {
                entity: args.to_string(),
            }),
            "searchdir" => Some(OghmaCommand::SearchDir {
                directory: head.to_string(),
                entity: tail.to_string(),
            }),
            "lst" => match head.strip_suffix('/') {
                Some(directory) if !directory.is_empty() => Some(OghmaCommand::Lst {
                    entity: tail.to_string(),
                    directory: directory.to_string(),
                }),
                _ => Some(OghmaCommand::Lst {
                    entity: args.to_string(),
                    directory: String::new(),
                }),
            },
            _ => None,
        }
    }

    /// Command as typed, for logs.
    pub fn describe(&self) -> String {
        match self {
            OghmaCommand::Help => "/help".to_string(),
            OghmaCommand::Roll { calculation } => format!("/roll {}", calculation),
            OghmaCommand::Search { entity } => format!("/search {}", entity),
            OghmaCommand::SearchDir { directory, entity } => {
                format!("/searchdir {} {}", directory, entity)
            }
            OghmaCommand::Lst { entity, directory } => format!("/lst {} {}", entity, directory),
        }
    }
}

/// Slash command definitions registered with Discord.
pub fn definitions() -> Vec<CreateCommand> {
    let string = |name: &str, description: &str, required: bool| {
        CreateCommandOption::new(CommandOptionType::String, name, description).required(required)
    };

    vec![
        CreateCommand::new("help").description("Displays a help message that shows usage information"),
        CreateCommand::new("roll")
            .description("Runs a quick & easy dice roller")
            .add_option(string("calculation", "The calculation to conduct", true)),
        CreateCommand::new("search")
            .description("Queries the Open5e API to get the requested entity")
            .add_option(string("entity", "The entity you would like to search for", false)),
        CreateCommand::new("searchdir")
            .description("Queries the Open5e API to get an entity's information from a specified directory.")
            .add_option(string("directory", "The category to search for the entity in", true))
            .add_option(string("entity", "The entity you would like to search for", false)),
        CreateCommand::new("lst")
            .description("Queries the Open5e API to get all the fully and partially matching entities based on the search term")
            .add_option(string("entity", "The entity you would like to search for", true))
            .add_option(string("directory", "The category to search for the entity in", false)),
    ]
}

/// Executes commands against the remote APIs.
pub struct CommandRunner {
    open5e: Open5eClient,
    scryfall: Option<ScryfallClient>,
    max_dice_value: u32,
    text_commands: bool,
}

impl CommandRunner {
    pub fn new(
        open5e: Open5eClient,
        scryfall: Option<ScryfallClient>,
        max_dice_value: u32,
        text_commands: bool,
    ) -> Self {
        Self {
            open5e,
            scryfall,
            max_dice_value,
            text_commands,
        }
    }

    /// Run `command`. Each reply becomes one or more messages.
    pub async fn execute(&self, command: &OghmaCommand, requester: &Requester) -> Vec<Reply> {
        info!("Executing: {} (by {})", command.describe(), requester.name);

        match command {
            OghmaCommand::Help => vec![self.help()],
            OghmaCommand::Roll { calculation } => vec![self.roll(calculation, requester)],
            OghmaCommand::Search { entity } => self.search(entity).await,
            OghmaCommand::SearchDir { directory, entity } => self.search_dir(directory, entity).await,
            OghmaCommand::Lst { entity, directory } => self.list(entity, directory, requester).await,
        }
    }

    fn help(&self) -> Reply {
        let mut description = String::from(
            "__Available commands__\n\n\
             **/help** - Displays this message (duh)\n\n\
             **/roll [ROLLS]d[SIDES]** - Dice roller with calculator logic\n\n\
             **/search [ENTITY]** - Searches the whole Open5e D&D database for your chosen entity.\n\n\
             **/searchdir [DIRECTORY] [ENTITY]** - Searches a specific category of the Open5e D&D database for your chosen entity a lot faster than */search*.\n\n\
             **/lst [ENTITY] [DIRECTORY]** - Queries the API to get all the fully and partially matching entities based on the search term.",
        );
        if self.text_commands {
            description.push_str(
                "\n\nEvery command also works as a message starting with `!`, e.g. `!roll 2d6 + 3` or `!lst spells/ fire`.",
            );
        }

        Reply::card(
            Card::new(PURPLE)
                .title("Oghma")
                .url("https://top.gg/bot/658336624647733258")
                .description(description)
                .author(
                    "Intoxication#0001",
                    Some("https://github.com/M-Davies.png".to_string()),
                    Some("https://github.com/M-Davies".to_string()),
                )
                .thumbnail("https://i.imgur.com/HxuMICy.jpg")
                .field("LINKS", "------------------", false)
                .field("GitHub", "https://github.com/M-Davies/oghma", true)
                .field("Discord", "https://discord.gg/8YZ2NZ5", true)
                .footer("Feedback? Hate? Make it known to us! (see links above)"),
        )
    }

    fn roll(&self, calculation: &str, requester: &Requester) -> Reply {
        if calculation.chars().count() > MAX_ARG_LENGTH {
            info!("Failed to execute /roll, args lengths too long = {}", calculation);
            return Reply::card(notices::arg_length_error());
        }

        let outcome = {
            let mut rng = rand::thread_rng();
            dice::roll(calculation, self.max_dice_value, &mut rng)
        };
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                info!("Rejected /roll {}: {}", calculation, e);
                return Reply::card(notices::dice_error(&e));
            }
        };

        let mut card = Card::new(PURPLE)
            .author(
                format!("Rolled by {}", requester.name),
                requester.avatar_url.clone(),
                None,
            )
            .field("QUERY", outcome.query.join(" "), false)
            .field("TOTAL", format!("`{}`", format_total(outcome.total)), false)
            .field("RESULTS", "----------", false);

        for (index, step) in outcome.steps.iter().take(MAX_ROLL_STEP_FIELDS).enumerate() {
            let number = index + 1;
            card = match step {
                RollStep::Dice {
                    rolls,
                    sides,
                    results,
                    total,
                } => card.field(
                    format!("__STEP {}__\n`{}d{}` ROLLED |", number, rolls, sides),
                    format!("{:?}\n*TOTAL = {}*", results, format_total(*total)),
                    true,
                ),
                RollStep::Operator {
                    operator,
                    previous,
                    operand,
                    total,
                } => card.field(
                    format!("__STEP {}__\n`{}` OPERATOR APPLIED! |", number, operator),
                    format!(
                        "{}\n**{}**\n{}\n*TOTAL = {}*",
                        format_total(*previous),
                        operator,
                        format_total(*operand),
                        format_total(*total)
                    ),
                    true,
                ),
            };
        }
        if outcome.steps.len() > MAX_ROLL_STEP_FIELDS {
            card = card.field(
                "...",
                format!("{} more steps not shown", outcome.steps.len() - MAX_ROLL_STEP_FIELDS),
                false,
            );
        }

        Reply::card(card).finish("roll")
    }

    async fn search(&self, input: &str) -> Vec<Reply> {
        if input.chars().count() > MAX_ARG_LENGTH {
            info!("Failed to execute /search, args lengths too long = {}", input);
            return vec![Reply::card(notices::arg_length_error())];
        }

        if input.trim().is_empty() {
            return self.listing("search", "entsearch", 0).await;
        }

        let normalized = normalize(input);
        let query = self.open5e.search_url(first_word(input));
        let resolution = self
            .open5e
            .request_open5e(&query, &normalized, "search", true, false)
            .await;

        self.present(input, &normalized, "the search/ directory", resolution, true)
            .await
    }

    async fn search_dir(&self, directory: &str, input: &str) -> Vec<Reply> {
        let directories = match self.open5e.directories().await {
            Ok(directories) => directories,
            Err(e) => return vec![Reply::card(notices::code_error(&e))],
        };

        let directory = directory.trim().trim_end_matches('/').to_lowercase();
        if input.chars().count() > MAX_ARG_LENGTH {
            return vec![Reply::card(notices::arg_length_error())];
        }

        // search/ is only served by /search
        if directory.contains("search") {
            return vec![Reply::card(notices::invalid_directory(&directory, &directories, true))];
        }
        if !directories.contains(&directory) {
            return vec![Reply::card(notices::invalid_directory(&directory, &directories, false))];
        }

        if input.trim().is_empty() {
            return self
                .listing(&directory, "entsearchdir", INLINE_LISTING_LIMIT)
                .await;
        }

        let normalized = normalize(input);
        let query = self.open5e.category_url(&directory, first_word(input));
        let resolution = self
            .open5e
            .request_open5e(&query, &normalized, &directory, false, false)
            .await;

        let place = format!("the {} directory", directory);
        self.present(input, &normalized, &place, resolution, false).await
    }

    async fn list(&self, input: &str, directory: &str, requester: &Requester) -> Vec<Reply> {
        if input.chars().count() > MAX_ARG_LENGTH {
            return vec![Reply::card(notices::arg_length_error())];
        }

        let directories = match self.open5e.directories().await {
            Ok(directories) => directories,
            Err(e) => return vec![Reply::card(notices::code_error(&e))],
        };

        let normalized = normalize(input);
        let mut directory = directory.trim().trim_end_matches('/').to_lowercase();
        let mut replies = Vec::new();

        let wide = directory.is_empty() || !directories.contains(&directory);
        let query = if wide {
            replies.push(Reply::card(notices::wide_search_warning(&directory, &directories)));
            directory = "search".to_string();
            self.open5e.search_url(first_word(input))
        } else {
            self.open5e.category_url(&directory, first_word(input))
        };

        let Resolution { result, unknown } = match self
            .open5e
            .request_open5e(&query, &normalized, &directory, wide, true)
            .await
        {
            Ok(resolution) => resolution,
            Err(e) => {
                replies.push(Reply::card(notices::code_error(&e)));
                return replies;
            }
        };

        let matches = match result {
            ResolutionResult::List(matches) => matches,
            ResolutionResult::Single { matched, .. } => vec![matched],
            ResolutionResult::NotFound => Vec::new(),
        };

        if matches.is_empty() {
            info!("No match found for {} in {}/ directory", normalized, directory);
            replies.push(Reply::card(notices::no_match(
                &normalized,
                "the database or requested directory",
            )));
        } else {
            let listed_directory = if wide { None } else { Some(directory.as_str()) };
            replies.push(list_matches(&normalized, &matches, listed_directory, requester));
        }

        if !unknown.is_empty() {
            replies.push(notices::unknown_entities(input, &unknown));
        }
        replies
    }

    /// Every label in `category`.
    async fn listing(&self, category: &str, kind: &str, inline_limit: usize) -> Vec<Reply> {
        match self.open5e.entity_labels(category).await {
            Ok(listing) => {
                let mut replies = vec![notices::entity_listing(kind, &listing.labels, inline_limit)];
                if !listing.unknown.is_empty() {
                    replies.push(notices::unknown_entities(category, &listing.unknown));
                }
                replies
            }
            Err(e) => vec![Reply::card(notices::code_error(&e))],
        }
    }

    /// Turn a single-entity resolution into replies.
    async fn present(
        &self,
        input: &str,
        normalized: &str,
        place: &str,
        resolution: ResolveResult<Resolution>,
        wide: bool,
    ) -> Vec<Reply> {
        let Resolution { result, unknown } = match resolution {
            Ok(resolution) => resolution,
            Err(e) => return vec![Reply::card(notices::code_error(&e))],
        };

        let mut replies = Vec::new();
        match result {
            ResolutionResult::Single { matched, category } => {
                replies.push(self.entity_reply(input, normalized, &matched, &category, wide).await);
            }
            ResolutionResult::List(matches) => match matches.first() {
                Some(matched) => {
                    replies.push(self.entity_reply(input, normalized, matched, place, wide).await)
                }
                None => replies.push(Reply::card(notices::no_match(normalized, place))),
            },
            ResolutionResult::NotFound => {
                info!("No match found for {} in {}", normalized, place);
                let term = if wide {
                    normalized.to_string()
                } else {
                    normalized.to_uppercase()
                };
                replies.push(Reply::card(notices::no_match(&term, place)));
            }
        }

        if !unknown.is_empty() {
            replies.push(notices::unknown_entities(input, &unknown));
        }
        replies
    }

    async fn entity_reply(
        &self,
        input: &str,
        normalized: &str,
        matched: &Match,
        category: &str,
        wide: bool,
    ) -> Reply {
        let mut reply = construct_response(input, category, &matched.entity);

        let thumbnail = match self.scryfall {
            Some(ref scryfall) => {
                let terms: Vec<&str> = input.split_whitespace().collect();
                scryfall.thumbnail(&terms).await
            }
            None => None,
        };

        let footer = match (matched.partial, wide) {
            (true, true) => Some(format!(
                "NOTE: Your search term ({}) was a PARTIAL match to this entity.\nIf this isn't the entity you were expecting, try refining your search term or use /searchdir instead",
                normalized
            )),
            (false, true) => Some(
                "NOTE: If this isn't the entity you were expecting, try refining your search term or use `/searchdir` instead"
                    .to_string(),
            ),
            (true, false) => Some(format!(
                "NOTE: Your search term ({}) was a PARTIAL match to this entity.\nIf this isn't the entity you were expecting, try refining your search term",
                normalized
            )),
            (false, false) => None,
        };

        reply.cards = reply
            .cards
            .into_iter()
            .map(|card| {
                let card = match thumbnail {
                    Some(ref url) => card.thumbnail(url.clone()),
                    None => card,
                };
                match footer {
                    Some(ref text) => card.footer(text.clone()),
                    None => card,
                }
            })
            .collect();

        debug!(
            "Built {} embeds and {} files for '{}'",
            reply.cards.len(),
            reply.files.len(),
            input
        );
        reply
    }
}

/// `/lst` results: fields when they fit, a file otherwise.
///
/// `directory` is `None` for broad searches, where each record names its
/// own route.
fn list_matches(
    normalized: &str,
    matches: &[Match],
    directory: Option<&str>,
    requester: &Requester,
) -> Reply {
    let mut card = Card::new(GREEN)
        .title(format!("SEARCH RESULTS FOR {}", normalized))
        .description(
            "Results ***in italics*** are partial matches and may be less accurate. All others are full matches and line up with your search term as it is.",
        )
        .author(
            format!("Requested by {}", requester.name),
            requester.avatar_url.clone(),
            None,
        );

    let directory_of = |m: &Match| -> String {
        directory
            .or_else(|| m.entity.route())
            .unwrap_or("search")
            .trim_end_matches('/')
            .to_string()
    };

    if matches.len() <= MAX_LIST_FIELDS {
        for m in matches {
            let (name, value) = if m.partial {
                (
                    format!("*{}*", m.entity.label()),
                    format!("*Directory = {}*", directory_of(m)),
                )
            } else {
                (
                    m.entity.label().to_string(),
                    format!("Directory = {}", directory_of(m)),
                )
            };
            card = card.field(name, value, true);
        }
        return Reply::card(card);
    }

    let lines: Vec<String> = matches
        .iter()
        .map(|m| {
            let line = format!("{} : Directory = {}", m.entity.label(), directory_of(m));
            if m.partial {
                format!("*{}*", line)
            } else {
                line
            }
        })
        .collect();
    let file = TextFile::new("matches", lines.join("\n"));

    card = card.field(
        format!("See `{}` for the matched entities", file.filename),
        "Due to discord character limits regarding embeds, the results have to be sent in a file",
        false,
    );
    Reply::card(card).with_file(file)
}

fn first_word(input: &str) -> &str {
    input.split_whitespace().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discord::reply::{BLUE, ORANGE, RED};
    use crate::open5e::transport::fake::FakeTransport;
    use crate::open5e::{FilterPolicy, DEFAULT_RESULT_LIMIT};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;

    const ROOT: &str = "https://api.open5e.com/?format=json";

    fn runner(transport: FakeTransport) -> CommandRunner {
        let open5e = Open5eClient::new(
            Arc::new(transport),
            "https://api.open5e.com/",
            FilterPolicy::default(),
            DEFAULT_RESULT_LIMIT,
        );
        CommandRunner::new(open5e, None, dice::DEFAULT_MAX_VALUE, true)
    }

    fn requester() -> Requester {
        Requester {
            name: "tester".to_string(),
            avatar_url: None,
        }
    }

    fn root() -> serde_json::Value {
        json!({
            "spells": "https://api.open5e.com/spells/",
            "conditions": "https://api.open5e.com/conditions/",
            "search": "https://api.open5e.com/search/"
        })
    }

    #[test]
    fn test_from_slash() {
        let options: HashMap<&str, &str> = [("directory", "spells"), ("entity", "fire ball")].into();
        let get = |key: &str| options.get(key).map(|v| v.to_string());

        assert_eq!(
            OghmaCommand::from_slash("searchdir", get),
            Some(OghmaCommand::SearchDir {
                directory: "spells".to_string(),
                entity: "fire ball".to_string(),
            })
        );
        assert_eq!(OghmaCommand::from_slash("search", |_| None), Some(OghmaCommand::Search { entity: String::new() }));
        assert_eq!(OghmaCommand::from_slash("unknown", |_| None), None);
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(OghmaCommand::parse_text("!help"), Some(OghmaCommand::Help));
        assert_eq!(
            OghmaCommand::parse_text("!roll 3d8 + 8"),
            Some(OghmaCommand::Roll {
                calculation: "3d8 + 8".to_string()
            })
        );
        assert_eq!(
            OghmaCommand::parse_text("!SEARCH magic missile"),
            Some(OghmaCommand::Search {
                entity: "magic missile".to_string()
            })
        );
        assert_eq!(
            OghmaCommand::parse_text("!searchdir spells fire ball"),
            Some(OghmaCommand::SearchDir {
                directory: "spells".to_string(),
                entity: "fire ball".to_string(),
            })
        );
        assert_eq!(
            OghmaCommand::parse_text("!lst spells/ fire"),
            Some(OghmaCommand::Lst {
                entity: "fire".to_string(),
                directory: "spells".to_string(),
            })
        );
        assert_eq!(
            OghmaCommand::parse_text("!lst fire ball"),
            Some(OghmaCommand::Lst {
                entity: "fire ball".to_string(),
                directory: String::new(),
            })
        );
        assert_eq!(OghmaCommand::parse_text("hello"), None);
        assert_eq!(OghmaCommand::parse_text("!who"), None);
    }

    #[test]
    fn test_definitions_cover_every_command() {
        assert_eq!(definitions().len(), 5);
    }

    #[tokio::test]
    async fn test_roll_builds_steps() {
        let replies = runner(FakeTransport::new())
            .execute(
                &OghmaCommand::Roll {
                    calculation: "2d6 + 3".to_string(),
                },
                &requester(),
            )
            .await;

        let card = &replies[0].cards[0];
        assert_eq!(card.colour, PURPLE);
        assert_eq!(card.fields[0].value, "2d6 + 3");
        assert_eq!(card.fields.len(), 5);
        assert!(card.fields[3].name.contains("`2d6` ROLLED"));
        assert!(card.fields[4].name.contains("`+` OPERATOR APPLIED!"));
        assert_eq!(card.author.as_ref().unwrap().name, "Rolled by tester");
    }

    #[tokio::test]
    async fn test_roll_error_and_length() {
        let runner = runner(FakeTransport::new());

        let replies = runner
            .execute(&OghmaCommand::Roll { calculation: "+ 5".to_string() }, &requester())
            .await;
        assert_eq!(replies[0].cards[0].colour, RED);

        let replies = runner
            .execute(&OghmaCommand::Roll { calculation: "1".repeat(201) }, &requester())
            .await;
        assert_eq!(replies[0].cards[0].title.as_deref(), Some("Invalid argument length"));
    }

    #[tokio::test]
    async fn test_search_resolves_through_route() {
        let runner = runner(
            FakeTransport::new()
                .with_json(
                    "https://api.open5e.com/search/?format=json&limit=10000&text=Fireball",
                    json!({"results": [{"name": "Fireball", "route": "spells/"}]}),
                )
                .with_json(
                    "https://api.open5e.com/spells/?format=json&limit=10000&text=Fireball",
                    json!({"results": [{"name": "Fireball", "slug": "fireball", "desc": "Boom", "components": "V"}]}),
                ),
        );

        let replies = runner
            .execute(&OghmaCommand::Search { entity: "Fireball".to_string() }, &requester())
            .await;

        assert_eq!(replies.len(), 1);
        let card = &replies[0].cards[0];
        assert_eq!(card.title.as_deref(), Some("Fireball (SPELL)"));
        assert!(card.footer.as_ref().unwrap().starts_with("NOTE: If this isn't"));
    }

    #[tokio::test]
    async fn test_search_not_found_and_failure() {
        let runner = runner(
            FakeTransport::new()
                .with_json(
                    "https://api.open5e.com/search/?format=json&limit=10000&text=Zzz",
                    json!({"results": []}),
                )
                .with_status(
                    "https://api.open5e.com/search/?format=json&limit=10000&text=Boom",
                    503,
                ),
        );

        let replies = runner
            .execute(&OghmaCommand::Search { entity: "Zzz".to_string() }, &requester())
            .await;
        assert_eq!(replies[0].cards[0].colour, ORANGE);
        assert!(replies[0].cards[0].description.as_ref().unwrap().contains("**zzz**"));

        let replies = runner
            .execute(&OghmaCommand::Search { entity: "Boom".to_string() }, &requester())
            .await;
        assert!(replies[0].cards[0].title.as_ref().unwrap().contains("**503**"));
    }

    #[tokio::test]
    async fn test_search_without_input_attaches_every_label() {
        let runner = runner(FakeTransport::new().with_json(
            "https://api.open5e.com/search/?format=json&limit=10000",
            json!({"results": [{"name": "Fireball"}, {"title": "SRD"}]}),
        ));

        let replies = runner
            .execute(&OghmaCommand::Search { entity: String::new() }, &requester())
            .await;

        assert_eq!(replies[0].files.len(), 1);
        assert_eq!(replies[0].files[0].content, "Fireball\nSRD");
        assert!(replies[0].files[0].filename.starts_with("entsearch-"));
    }

    #[tokio::test]
    async fn test_searchdir_validates_directory() {
        let runner = runner(FakeTransport::new().with_json(ROOT, root()));

        let replies = runner
            .execute(
                &OghmaCommand::SearchDir {
                    directory: "search".to_string(),
                    entity: "fire".to_string(),
                },
                &requester(),
            )
            .await;
        assert_eq!(replies[0].cards[0].fields[0].name, "NOTE");

        let replies = runner
            .execute(
                &OghmaCommand::SearchDir {
                    directory: "gizmos".to_string(),
                    entity: "fire".to_string(),
                },
                &requester(),
            )
            .await;
        let description = replies[0].cards[0].description.clone().unwrap();
        assert!(description.contains("spells, conditions") || description.contains("conditions, spells"));
        assert!(!description.contains("search"));
    }

    #[tokio::test]
    async fn test_searchdir_lists_directory_inline() {
        let runner = runner(
            FakeTransport::new().with_json(ROOT, root()).with_json(
                "https://api.open5e.com/conditions/?format=json&limit=10000",
                json!({"results": [{"name": "Blinded"}, {"name": "Charmed"}]}),
            ),
        );

        let replies = runner
            .execute(
                &OghmaCommand::SearchDir {
                    directory: "Conditions".to_string(),
                    entity: String::new(),
                },
                &requester(),
            )
            .await;

        assert!(replies[0].files.is_empty());
        assert_eq!(replies[0].cards[0].description.as_deref(), Some("Blinded\nCharmed"));
    }

    #[tokio::test]
    async fn test_searchdir_partial_match_footer() {
        let runner = runner(
            FakeTransport::new().with_json(ROOT, root()).with_json(
                "https://api.open5e.com/conditions/?format=json&limit=10000&text=blind",
                json!({"results": [{"name": "Blinded", "desc": "Can't see."}]}),
            ),
        );

        let replies = runner
            .execute(
                &OghmaCommand::SearchDir {
                    directory: "conditions".to_string(),
                    entity: "blind".to_string(),
                },
                &requester(),
            )
            .await;

        let card = &replies[0].cards[0];
        assert_eq!(card.title.as_deref(), Some("Blinded (CONDITION)"));
        assert!(card.footer.as_ref().unwrap().contains("PARTIAL"));
    }

    #[tokio::test]
    async fn test_lst_falls_back_to_broad_search() {
        let runner = runner(FakeTransport::new().with_json(ROOT, root()).with_json(
            "https://api.open5e.com/search/?format=json&limit=10000&text=fire",
            json!({"results": [
                {"name": "Fire Shield", "route": "spells/"},
                {"name": "Fire", "route": "sections/"}
            ]}),
        ));

        let replies = runner
            .execute(
                &OghmaCommand::Lst {
                    entity: "fire".to_string(),
                    directory: "nope".to_string(),
                },
                &requester(),
            )
            .await;

        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].cards[0].colour, BLUE);

        let fields = &replies[1].cards[0].fields;
        assert_eq!(fields[0].name, "Fire");
        assert_eq!(fields[0].value, "Directory = sections");
        assert_eq!(fields[1].name, "*Fire Shield*");
        assert_eq!(fields[1].value, "*Directory = spells*");
    }

    #[tokio::test]
    async fn test_lst_many_results_go_to_file() {
        let results: Vec<_> = (0..30)
            .map(|i| json!({"name": format!("Fire {}", i)}))
            .collect();
        let runner = runner(FakeTransport::new().with_json(ROOT, root()).with_json(
            "https://api.open5e.com/spells/?format=json&limit=10000&search=fire",
            json!({ "results": results }),
        ));

        let replies = runner
            .execute(
                &OghmaCommand::Lst {
                    entity: "fire".to_string(),
                    directory: "spells".to_string(),
                },
                &requester(),
            )
            .await;

        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].files.len(), 1);
        assert_eq!(replies[0].files[0].content.lines().count(), 30);
        assert!(replies[0].files[0].content.contains("*Fire 0 : Directory = spells*"));
    }

    #[tokio::test]
    async fn test_unknown_records_are_reported() {
        let runner = runner(FakeTransport::new().with_json(ROOT, root()).with_json(
            "https://api.open5e.com/conditions/?format=json&limit=10000&text=Blinded",
            json!({"results": [{"slug": "mystery"}, {"name": "Blinded", "desc": "x"}]}),
        ));

        let replies = runner
            .execute(
                &OghmaCommand::SearchDir {
                    directory: "conditions".to_string(),
                    entity: "Blinded".to_string(),
                },
                &requester(),
            )
            .await;

        assert_eq!(replies.len(), 2);
        assert!(replies[1].files[0].content.contains("mystery"));
    }
}

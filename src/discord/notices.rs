//! Error and status embeds shared by the commands.

use tracing::error;

use crate::common::error::{DiceError, ResolveError};
use crate::discord::entities::{ERROR_THUMBNAIL, ISSUES_URL};
use crate::discord::reply::{Card, Reply, TextFile, BLUE, ORANGE, RED};
use crate::open5e::UnknownEntityKind;

const NOTICE_THUMBNAIL: &str = "https://i.imgur.com/obEXyeX.png";

/// A failed Open5e request.
pub fn code_error(err: &ResolveError) -> Card {
    error!("Open5e request failed: {}", err);

    let card = match err.status() {
        Some(status) => Card::new(RED)
            .title(format!("ERROR - API Request FAILED. Status Code: **{}**", status))
            .description(format!("Query: {}", err.query()))
            .field(
                "For more idea on what went wrong:",
                "See status codes at https://www.django-rest-framework.org/api-guide/status-codes/",
                false,
            ),
        None => Card::new(RED)
            .title("ERROR - API Request FAILED")
            .description(format!("Query: {}\n{}", err.query(), err)),
    };
    card.thumbnail(ERROR_THUMBNAIL)
}

pub fn arg_length_error() -> Card {
    Card::new(RED)
        .title("Invalid argument length")
        .description(
            "This command does not support more than 200 words in a single message. Try splitting up your query.",
        )
        .thumbnail(ERROR_THUMBNAIL)
}

pub fn dice_error(err: &DiceError) -> Card {
    let title = match err {
        DiceError::OperatorFirst(_) => "Operator at start of calculation",
        DiceError::UnknownOperator(_) => "Unrecognised numeric operator",
        DiceError::InvalidArgument(_) => "Invalid argument supplied",
        DiceError::InvalidSize(_) => "Invalid size supplied",
        DiceError::DivideByZero => "Division by zero",
        DiceError::Empty => "Nothing to roll",
    };

    Card::new(RED)
        .title(title)
        .description(format!("{}\nSee `/help` for `/roll` usage.", err))
        .thumbnail(ERROR_THUMBNAIL)
}

pub fn no_match(term: &str, place: &str) -> Card {
    Card::new(ORANGE)
        .title("ERROR")
        .description(format!("No matches found for **{}** in {}", term, place))
        .thumbnail(NOTICE_THUMBNAIL)
}

pub fn invalid_directory(requested: &str, directories: &[String], note_search: bool) -> Card {
    let card = Card::new(ORANGE)
        .title(format!(
            "Requested Directory (`{}`) is not a valid directory name",
            requested
        ))
        .description(format!("**Available Directories**\n{}", directories.join(", ")))
        .thumbnail(NOTICE_THUMBNAIL);

    if note_search {
        card.field(
            "NOTE",
            "Use `/search` for searching the `search/` directory",
            false,
        )
    } else {
        card
    }
}

/// Warning sent before `/lst` falls back to the broad search.
pub fn wide_search_warning(requested: &str, directories: &[String]) -> Card {
    Card::new(BLUE)
        .title("FINDING ALL ENTITIES IN SEARCH/ DIRECTORY...")
        .description(format!(
            "WARNING: {} is not a valid directory name. Your query will use the search/ directory instead. If this behaviour is unexpected, pass a valid directory name as your first parameter.",
            if requested.is_empty() { "(none)" } else { requested }
        ))
        .footer(format!("Valid directory names = {}", directories.join(", ")))
}

/// Entity names of a listing: inline when short, attached otherwise.
pub fn entity_listing(kind: &str, labels: &[String], inline_limit: usize) -> Reply {
    if labels.is_empty() || labels.len() <= inline_limit {
        let names = if labels.is_empty() {
            "None".to_string()
        } else {
            labels.join("\n")
        };
        return Reply::card(
            Card::new(ORANGE)
                .title("All searchable entities in this directory")
                .description(names)
                .thumbnail(NOTICE_THUMBNAIL),
        );
    }

    let file = TextFile::new(kind, labels.join("\n"));
    Reply::card(
        Card::new(ORANGE)
            .title(format!(
                "See `{}` for all searchable entities in this directory",
                file.filename
            ))
            .description(
                "Due to discord character limits regarding embeds, the results have to be sent in a file",
            )
            .thumbnail(NOTICE_THUMBNAIL),
    )
    .with_file(file)
}

/// Records that carried neither a title nor a name.
pub fn unknown_entities(input: &str, unknown: &[UnknownEntityKind]) -> Reply {
    let dump = unknown
        .iter()
        .map(|u| serde_json::to_string_pretty(&u.raw).unwrap_or_else(|_| u.raw.to_string()))
        .collect::<Vec<_>>()
        .join("\n\n");
    let file = TextFile::new("badobject", dump);

    Reply::card(
        Card::new(RED)
            .title(format!("{} unrecognised result(s) were skipped", unknown.len()))
            .description(format!(
                "Please create an issue describing this failure and with the following values at {}\n**Input**: {}\n**Troublesome Object**: SEE `{}`",
                ISSUES_URL, input, file.filename
            ))
            .thumbnail(ERROR_THUMBNAIL),
    )
    .with_file(file)
}

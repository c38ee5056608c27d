//! Result embeds, one builder per Open5e category.

use serde_json::Value;
use tracing::warn;

use crate::discord::reply::{Card, Reply, TextFile, GREEN, RED};
use crate::open5e::Entity;

pub const ISSUES_URL: &str = "https://github.com/M-Davies/oghma/issues";
pub const ERROR_THUMBNAIL: &str = "https://i.imgur.com/j3OoT8F.png";

const DOCUMENT_THUMBNAIL: &str = "https://i.imgur.com/lnkhxCe.jpg";
const SPELL_THUMBNAIL: &str = "https://i.imgur.com/W15EmNT.jpg";
const MONSTER_THUMBNAIL: &str = "https://i.imgur.com/6HsoQ7H.jpg";
const BACKGROUND_THUMBNAIL: &str = "https://i.imgur.com/GhGODan.jpg";
const PLANE_THUMBNAIL: &str = "https://i.imgur.com/GJk1HFh.jpg";
const SECTION_THUMBNAIL: &str = "https://i.imgur.com/J75S6bF.jpg";
const FEAT_THUMBNAIL: &str = "https://i.imgur.com/X1l7Aif.jpg";
const CONDITION_THUMBNAIL: &str = "https://i.imgur.com/tOdL5n3.jpg";
const RACE_THUMBNAIL: &str = "https://i.imgur.com/OUSzh8W.jpg";
const CLASS_THUMBNAIL: &str = "https://i.imgur.com/Mjh6AAi.jpg";
const MAGIC_ITEM_THUMBNAIL: &str = "https://i.imgur.com/2wzBEjB.png";
const WEAPON_THUMBNAIL: &str = "https://i.imgur.com/pXEe4L9.png";

/// Build the embeds describing `entity`, picked by the category `route`.
///
/// Categories without a builder produce an "unrecognised type" embed with
/// the record attached.
pub fn construct_response(input: &str, route: &str, entity: &Entity) -> Reply {
    let (kind, reply) = if route.contains("document") {
        ("document", Reply::card(document(entity)))
    } else if route.contains("spell") {
        ("spell", Reply::card(spell(entity)))
    } else if route.contains("monster") {
        ("monster", monster(entity))
    } else if route.contains("background") {
        ("background", background(entity))
    } else if route.contains("plane") {
        ("plane", Reply::card(plane(entity)))
    } else if route.contains("section") {
        ("section", Reply::card(section(entity)))
    } else if route.contains("feat") {
        ("feat", Reply::card(feat(entity)))
    } else if route.contains("condition") {
        ("condition", Reply::card(condition(entity)))
    } else if route.contains("race") {
        ("race", race(entity))
    } else if route.contains("class") {
        ("class", class(entity))
    } else if route.contains("magicitem") {
        ("magicitem", Reply::card(magic_item(entity)))
    } else if route.contains("weapon") {
        ("weapon", Reply::card(weapon(entity)))
    } else {
        return unrecognised_route(input, route, entity);
    };

    reply.finish(kind)
}

/// Embed asking for an issue about a record whose category has no builder.
pub fn unrecognised_route(input: &str, route: &str, entity: &Entity) -> Reply {
    warn!("No embed builder for route '{}' (input '{}')", route, input);
    let file = TextFile::new("badobject", entity.to_pretty_json());
    let card = Card::new(RED)
        .title("The matched item's type (i.e. spell, monster, etc) was not recognized")
        .description(format!(
            "Please create an issue describing this failure and with the following values at {}\n**Input**: {}\n**Route**: {}\n**Troublesome Object**: SEE `{}`",
            ISSUES_URL, input, route, file.filename
        ))
        .thumbnail(ERROR_THUMBNAIL);
    Reply::card(card).with_file(file)
}

/// Field text or `None`.
fn value(entity: &Entity, key: &str) -> String {
    entity.non_empty(key).unwrap_or_else(|| "None".to_string())
}

fn open5e_link(path: &str, entity: &Entity) -> String {
    format!(
        "https://open5e.com/{}/{}/",
        path,
        entity.str_field("slug").unwrap_or_default()
    )
}

/// `**key**: value` lines of a JSON object.
fn key_values(object: Option<&Value>) -> String {
    object
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(k, v)| format!("**{}**: {}", k, scalar(v)))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}

/// `(name, desc)` pairs of an array of objects.
fn named_entries(values: &[Value]) -> Vec<(String, String)> {
    values
        .iter()
        .filter_map(|v| {
            let name = v.get("name").map(scalar)?;
            let desc = v.get("desc").map(scalar).unwrap_or_default();
            Some((name, desc))
        })
        .collect()
}

fn document(entity: &Entity) -> Card {
    let raw_link = entity.text("url").unwrap_or_default();
    let link = if raw_link.contains("http") {
        raw_link
    } else {
        format!("http://{}", raw_link)
    };

    Card::new(GREEN)
        .title(format!("{} (DOCUMENT)", entity.label()))
        .description(value(entity, "desc"))
        .url(link)
        .field("Authors", value(entity, "author"), false)
        .field("Link", value(entity, "url"), true)
        .field("Version Number", value(entity, "version"), true)
        .field("Copyright", value(entity, "copyright"), false)
        .thumbnail(DOCUMENT_THUMBNAIL)
}

fn spell(entity: &Entity) -> Card {
    let mut card = Card::new(GREEN)
        .title(format!("{} (SPELL)", entity.label()))
        .description(value(entity, "desc"))
        .url(open5e_link("spells", entity));

    if let Some(higher) = entity.non_empty("higher_level") {
        card = card.field("Higher Level", higher, false);
    }

    card = card
        .field("School", value(entity, "school"), false)
        .field("Level", value(entity, "level"), true)
        .field("Duration", value(entity, "duration"), true)
        .field("Casting Time", value(entity, "casting_time"), true)
        .field("Range", value(entity, "range"), true)
        .field("Concentration?", value(entity, "concentration"), true)
        .field("Ritual?", value(entity, "ritual"), true);

    let components = value(entity, "components");
    let needs_material = components.contains('M');
    card = card.field("Spell Components", components, true);
    if needs_material {
        card = card.field("Material", value(entity, "material"), true);
    }

    card.field("Page Number", value(entity, "page"), true)
        .thumbnail(SPELL_THUMBNAIL)
}

fn ability(entity: &Entity, key: &str) -> String {
    let score = value(entity, key);
    match entity.text(&format!("{}_save", key)) {
        Some(save) => format!("{} (SAVE: **{}**)", score, save),
        None => score,
    }
}

fn monster(entity: &Entity) -> Reply {
    let name = entity.label();
    let link = open5e_link("monsters", entity);

    let mut stats = Card::new(GREEN)
        .title(format!("{} (MONSTER) - STATS", name))
        .description(format!(
            "**TYPE**: {}\n**SUBTYPE**: {}\n**ALIGNMENT**: {}\n**SIZE**: {}\n**CHALLENGE RATING**: {}",
            value(entity, "type"),
            value(entity, "subtype"),
            value(entity, "alignment"),
            value(entity, "size"),
            value(entity, "challenge_rating"),
        ))
        .url(link.clone());
    for key in ["strength", "dexterity", "constitution", "intelligence", "wisdom", "charisma"] {
        stats = stats.field(key.to_uppercase(), ability(entity, key), true);
    }
    stats = stats
        .field(
            format!("HIT POINTS (**{}**)", value(entity, "hit_points")),
            value(entity, "hit_dice"),
            true,
        )
        .field("SPEED", key_values(entity.get("speed")), true)
        .field(
            "ARMOUR CLASS",
            format!("{} ({})", value(entity, "armor_class"), value(entity, "armor_desc")),
            true,
        );

    let mut skills = Card::new(GREEN)
        .title(format!("{} (MONSTER) - SKILLS & PROFICIENCIES", name))
        .url(link.clone());
    let skill_list = key_values(entity.get("skills"));
    if !skill_list.is_empty() {
        skills = skills.field("SKILLS", skill_list, true);
    }
    skills = skills.field("SENSES", value(entity, "senses"), true);
    if let Some(languages) = entity.non_empty("languages") {
        skills = skills.field("LANGUAGES", languages, true);
    }
    let or_nothing = |key: &str| entity.non_empty(key).unwrap_or_else(|| "Nothing".to_string());
    skills = skills.field(
        "STRENGTHS & WEAKNESSES",
        format!(
            "**VULNERABLE TO:** {}\n**RESISTANT TO:** {}\n**IMMUNE TO:** {}\n**CONDITION IMMUNITIES:** {}",
            or_nothing("damage_vulnerabilities"),
            or_nothing("damage_resistances"),
            or_nothing("damage_immunities"),
            or_nothing("condition_immunities"),
        ),
        false,
    );

    let mut actions = Card::new(GREEN)
        .title(format!("{} (MONSTER) - ACTIONS & ABILITIES", name))
        .url(link.clone());
    for (action, desc) in named_entries(entity.list("actions")) {
        actions = actions.field(format!("{} (ACTION)", action), desc, false);
    }
    for (reaction, desc) in named_entries(entity.list("reactions")) {
        actions = actions.field(format!("{} (REACTION)", reaction), desc, false);
    }
    for (special, desc) in named_entries(entity.list("special_abilities")) {
        actions = actions.field(format!("{} (SPECIAL)", special), desc, false);
    }
    for spell in entity.list("spell_list").iter().filter_map(Value::as_str) {
        // e.g. https://api.open5e.com/spells/light/
        let spell_name = spell
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .replace('-', " ");
        actions = actions.field(
            spell_name.clone(),
            format!("To see spell info, `/searchdir spells {}`", spell_name),
            false,
        );
    }

    let mut cards = vec![stats, skills, actions];

    if let Some(legendary_desc) = entity.non_empty("legendary_desc") {
        let mut legend = Card::new(GREEN)
            .title(format!("{} (MONSTER): LEGENDARY ACTIONS & ABILITIES", name))
            .description(legendary_desc)
            .url(link);
        for (action, desc) in named_entries(entity.list("legendary_actions")) {
            legend = legend.field(action, desc, false);
        }
        cards.push(legend);
    }

    let thumbnail = entity
        .non_empty("img_main")
        .unwrap_or_else(|| MONSTER_THUMBNAIL.to_string());

    Reply {
        cards: cards.into_iter().map(|c| c.thumbnail(thumbnail.clone())).collect(),
        files: Vec::new(),
    }
}

fn background(entity: &Entity) -> Reply {
    let name = entity.label();
    let link = "https://open5e.com/sections/backgrounds";

    let proficiencies = match entity.non_empty("tool_proficiencies") {
        Some(tools) => format!(
            "**SKILLS**: {}\n**TOOLS**: {}",
            value(entity, "skill_proficiencies"),
            tools
        ),
        None => format!("**SKILL**: {}", value(entity, "skill_proficiencies")),
    };

    let mut basics = Card::new(GREEN)
        .title(format!("{} (BACKGROUND) - BASICS", name))
        .description(value(entity, "desc"))
        .url(link)
        .field("PROFICIENCIES", proficiencies, true);
    if let Some(languages) = entity.non_empty("languages") {
        basics = basics.field("LANGUAGES", languages, true);
    }
    basics = basics.field("EQUIPMENT", value(entity, "equipment"), false);

    let feature = Card::new(GREEN)
        .title(format!("{} (BACKGROUND)\nFEATURE ({})", name, value(entity, "feature")))
        .description(value(entity, "feature_desc"))
        .url(link);

    let mut cards = vec![basics, feature];

    if let Some(characteristics) = entity.non_empty("suggested_characteristics") {
        cards.push(
            Card::new(GREEN)
                .title(format!("{} (BACKGROUND): CHARACTERISTICS", name))
                .description(characteristics)
                .url(link),
        );
    }

    Reply {
        cards: cards.into_iter().map(|c| c.thumbnail(BACKGROUND_THUMBNAIL)).collect(),
        files: Vec::new(),
    }
}

fn plane(entity: &Entity) -> Card {
    Card::new(GREEN)
        .title(format!("{} (PLANE)", entity.label()))
        .description(value(entity, "desc"))
        .url("https://open5e.com/sections/planes")
        .thumbnail(PLANE_THUMBNAIL)
}

fn section(entity: &Entity) -> Card {
    Card::new(GREEN)
        .title(format!("{} (SECTION) - {}", entity.label(), value(entity, "parent")))
        .description(value(entity, "desc"))
        .url(open5e_link("sections", entity))
        .thumbnail(SECTION_THUMBNAIL)
}

fn feat(entity: &Entity) -> Card {
    Card::new(GREEN)
        .title(format!("{} (FEAT)", entity.label()))
        .description(format!("PREREQUISITES: **{}**", value(entity, "prerequisite")))
        .field("DESCRIPTION", value(entity, "desc"), false)
        .thumbnail(FEAT_THUMBNAIL)
}

fn condition(entity: &Entity) -> Card {
    Card::new(GREEN)
        .title(format!("{} (CONDITION)", entity.label()))
        .description(value(entity, "desc"))
        .url("https://open5e.com/gameplay-mechanics/conditions")
        .thumbnail(CONDITION_THUMBNAIL)
}

fn race(entity: &Entity) -> Reply {
    let name = entity.label();
    let link = open5e_link("races", entity);

    let mut card = Card::new(GREEN)
        .title(format!("{} (RACE)", name))
        .description(value(entity, "desc"))
        .url(link.clone())
        .field("BENEFITS", value(entity, "asi_desc"), false)
        .field("AGE", value(entity, "age"), true)
        .field("ALIGNMENT", value(entity, "alignment"), true)
        .field("SIZE", value(entity, "size"), true)
        .field("SPEEDS", value(entity, "speed_desc"), false)
        .field("LANGUAGES", value(entity, "languages"), true);
    if let Some(vision) = entity.non_empty("vision") {
        card = card.field("VISION", vision, true);
    }
    if let Some(traits) = entity.non_empty("traits") {
        card = card.field("TRAITS", traits, false);
    }

    let mut cards = vec![card];

    for subrace in entity.list("subraces") {
        let text = |key: &str| {
            subrace
                .get(key)
                .map(scalar)
                .filter(|s| !s.trim().is_empty())
        };
        let mut sub = Card::new(GREEN)
            .title(format!(
                "{} (Subrace of **{}**)",
                text("name").unwrap_or_default(),
                name
            ))
            .description(text("desc").unwrap_or_else(|| "None".to_string()))
            .url(link.clone())
            .field(
                "SUBRACE BENEFITS",
                text("asi_desc").unwrap_or_default(),
                false,
            );
        if let Some(traits) = text("traits") {
            sub = sub.field("TRAITS", traits, false);
        }
        cards.push(sub);
    }

    Reply {
        cards: cards.into_iter().map(|c| c.thumbnail(RACE_THUMBNAIL)).collect(),
        files: Vec::new(),
    }
}

fn class(entity: &Entity) -> Reply {
    let name = entity.label();
    let link = open5e_link("classes", entity);

    let mut basics = Card::new(GREEN)
        .title(format!("{} (CLASS): Basics", name))
        .description(value(entity, "desc"))
        .url(link.clone());
    if let Some(ability) = entity.non_empty("spellcasting_ability") {
        basics = basics.field("CASTING ABILITY", ability, false);
    }

    // The class table never fits an embed
    let mut files = Vec::new();
    if let Some(table) = entity.non_empty("table") {
        let file = TextFile::new("clstable", table);
        basics = basics.field(
            "CLASS TABLE",
            format!("See `{}` for class table", file.filename),
            false,
        );
        files.push(file);
    }

    let details = Card::new(GREEN)
        .title(format!("{} (CLASS): Profs & Details", name))
        .description(format!(
            "**ARMOUR**: {}\n**WEAPONS**: {}\n**TOOLS**: {}\n**SAVE THROWS**: {}\n**SKILLS**: {}",
            value(entity, "prof_armor"),
            value(entity, "prof_weapons"),
            value(entity, "prof_tools"),
            value(entity, "prof_saving_throws"),
            value(entity, "prof_skills"),
        ))
        .url(link.clone())
        .field(
            "Hit points",
            format!(
                "**Hit Dice**: {}\n**HP at first level**: {}\n**HP at other levels**: {}",
                value(entity, "hit_dice"),
                value(entity, "hp_at_1st_level"),
                value(entity, "hp_at_higher_levels"),
            ),
            false,
        )
        .field("EQUIPMENT", value(entity, "equipment"), false);

    let mut cards = vec![basics, details];

    let subtype = entity
        .non_empty("subtypes_name")
        .unwrap_or_else(|| "None".to_string());
    for (archetype, desc) in named_entries(entity.list("archetypes")) {
        cards.push(
            Card::new(GREEN)
                .title(format!("{} (ARCHETYPES)\n{} (SUBTYPE)", archetype, subtype))
                .description(desc)
                .url(link.clone()),
        );
    }

    Reply {
        cards: cards.into_iter().map(|c| c.thumbnail(CLASS_THUMBNAIL)).collect(),
        files,
    }
}

fn magic_item(entity: &Entity) -> Card {
    let attunement = match entity.non_empty("requires_attunement") {
        Some(_) => "YES",
        None => "NO",
    };

    Card::new(GREEN)
        .title(format!("{} (MAGIC ITEM)", entity.label()))
        .description(value(entity, "desc"))
        .url(format!(
            "https://open5e.com/magicitems/{}",
            entity.str_field("slug").unwrap_or_default()
        ))
        .field("TYPE", value(entity, "type"), true)
        .field("RARITY", value(entity, "rarity"), true)
        .field("ATTUNEMENT REQUIRED?", attunement, true)
        .thumbnail(MAGIC_ITEM_THUMBNAIL)
}

fn weapon(entity: &Entity) -> Card {
    let properties: Vec<String> = entity.list("properties").iter().map(scalar).collect();
    let properties = if properties.is_empty() {
        "None".to_string()
    } else {
        properties.join(" | ")
    };

    Card::new(GREEN)
        .title(format!("{} (WEAPON)", entity.label()))
        .description(format!("**PROPERTIES**: {}", properties))
        .url("https://open5e.com/sections/weapons")
        .field(
            "DAMAGE",
            format!("{} ({})", value(entity, "damage_dice"), value(entity, "damage_type")),
            true,
        )
        .field("WEIGHT", value(entity, "weight"), true)
        .field("COST", value(entity, "cost"), true)
        .field("CATEGORY", value(entity, "category"), false)
        .thumbnail(WEAPON_THUMBNAIL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discord::reply::DESCRIPTION_LIMIT;
    use serde_json::json;

    fn entity(value: Value) -> Entity {
        Entity::try_from(value).unwrap()
    }

    #[test]
    fn test_spell_embed() {
        let fireball = entity(json!({
            "name": "Fireball",
            "slug": "fireball",
            "desc": "A bright streak flashes...",
            "higher_level": "",
            "school": "Evocation",
            "level": "3rd-level",
            "duration": "Instantaneous",
            "casting_time": "1 action",
            "range": "150 feet",
            "concentration": "no",
            "ritual": "no",
            "components": "V, S, M",
            "material": "A tiny ball of bat guano and sulfur.",
            "page": "phb 241"
        }));

        let reply = construct_response("fireball", "spells/", &fireball);
        assert_eq!(reply.cards.len(), 1);
        assert!(reply.files.is_empty());

        let card = &reply.cards[0];
        assert_eq!(card.title.as_deref(), Some("Fireball (SPELL)"));
        assert_eq!(card.url.as_deref(), Some("https://open5e.com/spells/fireball/"));
        assert!(card.fields.iter().all(|f| f.name != "Higher Level"));
        assert!(card.fields.iter().any(|f| f.name == "Material"));
    }

    #[test]
    fn test_document_link_gets_scheme() {
        let srd = entity(json!({
            "title": "Systems Reference Document",
            "desc": "Dungeons and Dragons 5th Edition Systems Reference Document",
            "url": "dnd.wizards.com/articles/features/systems-reference-document-srd",
            "author": "Mike Mearls",
            "version": "5.1",
            "copyright": "OGL"
        }));

        let reply = construct_response("srd", "documents/", &srd);
        let card = &reply.cards[0];
        assert_eq!(card.title.as_deref(), Some("Systems Reference Document (DOCUMENT)"));
        assert!(card.url.as_deref().unwrap().starts_with("http://dnd.wizards.com"));
    }

    #[test]
    fn test_monster_embeds() {
        let dragon = entity(json!({
            "name": "Adult Red Dragon",
            "slug": "adult-red-dragon",
            "type": "dragon",
            "subtype": "",
            "alignment": "chaotic evil",
            "size": "Huge",
            "challenge_rating": "17",
            "strength": 27,
            "strength_save": null,
            "dexterity": 10,
            "dexterity_save": 6,
            "constitution": 25,
            "intelligence": 16,
            "wisdom": 13,
            "charisma": 21,
            "hit_points": 256,
            "hit_dice": "19d12+133",
            "speed": {"walk": 40, "climb": 40, "fly": 80},
            "armor_class": 19,
            "armor_desc": "natural armor",
            "skills": {"perception": 13},
            "senses": "blindsight 60 ft.",
            "languages": "Common, Draconic",
            "actions": [{"name": "Bite", "desc": "Melee Weapon Attack"}],
            "reactions": "",
            "special_abilities": [],
            "spell_list": ["https://api.open5e.com/spells/light/"],
            "legendary_desc": "The dragon can take 3 legendary actions",
            "legendary_actions": [{"name": "Detect", "desc": "The dragon makes a Wisdom check."}],
            "img_main": null
        }));

        let reply = construct_response("adultreddragon", "monsters/", &dragon);
        assert_eq!(reply.cards.len(), 4);
        assert!(reply
            .cards
            .iter()
            .all(|c| c.thumbnail.as_deref() == Some(MONSTER_THUMBNAIL)));

        let stats = &reply.cards[0];
        assert!(stats.description.as_ref().unwrap().contains("**SUBTYPE**: None"));
        assert_eq!(stats.fields[0].value, "27");
        assert_eq!(stats.fields[1].value, "10 (SAVE: **6**)");

        let actions = &reply.cards[2];
        assert_eq!(actions.fields[0].name, "Bite (ACTION)");
        assert_eq!(actions.fields[1].name, "light");
    }

    #[test]
    fn test_long_section_is_attached() {
        let rules = entity(json!({
            "name": "Combat",
            "slug": "combat",
            "parent": "Rules",
            "desc": "x".repeat(DESCRIPTION_LIMIT + 100)
        }));

        let reply = construct_response("combat", "sections/", &rules);
        assert_eq!(reply.files.len(), 1);
        assert!(reply.files[0].filename.starts_with("section-"));
        assert_eq!(
            reply.cards[0].description.as_ref().unwrap().chars().count(),
            DESCRIPTION_LIMIT
        );
    }

    #[test]
    fn test_class_table_is_attached() {
        let wizard = entity(json!({
            "name": "Wizard",
            "slug": "wizard",
            "desc": "Arcane study",
            "table": "| Level | Proficiency Bonus |",
            "spellcasting_ability": "Intelligence",
            "archetypes": [{"name": "School of Evocation", "desc": "Evocation"}]
        }));

        let reply = construct_response("wizard", "classes/", &wizard);
        assert_eq!(reply.cards.len(), 3);
        assert!(reply.files.iter().any(|f| f.filename.starts_with("clstable-")));
    }

    #[test]
    fn test_weapon_properties() {
        let club = entity(json!({
            "name": "Club",
            "category": "Simple Melee Weapons",
            "cost": "1 sp",
            "damage_dice": "1d4",
            "damage_type": "bludgeoning",
            "weight": "2 lb.",
            "properties": ["light"]
        }));

        let card = &construct_response("club", "weapons/", &club).cards[0];
        assert_eq!(card.description.as_deref(), Some("**PROPERTIES**: light"));
        assert_eq!(card.fields[0].value, "1d4 (bludgeoning)");
    }

    #[test]
    fn test_unknown_route_attaches_object() {
        let thing = entity(json!({"name": "Thing", "odd": true}));

        let reply = construct_response("thing", "gizmos/", &thing);
        assert_eq!(reply.cards[0].colour, RED);
        assert_eq!(reply.files.len(), 1);
        assert!(reply.files[0].filename.starts_with("badobject-"));
        assert!(reply.files[0].content.contains("\"odd\": true"));
        assert!(reply.cards[0]
            .description
            .as_ref()
            .unwrap()
            .contains(ISSUES_URL));
    }
}

//! A recipe-lookup voice skill with string tables for four locales.
//!
//! The skill answers "how do I craft X" questions from a per-locale recipe
//! table. The last spoken output is kept in the session attributes so the
//! repeat intent can replay it.

use serde_json::{json, Value};
use skill_kit::{HandlerContext, HandlerOutcome, HandlerRegistry, ResponseBuilder, Skill, Translator};

pub fn build_skill() -> Skill {
    Skill::new(registry()).with_translator(resources())
}

pub fn registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register("LaunchRequest", launch);
    registry.register("RecipeIntent", recipe);
    registry.register("AMAZON.HelpIntent", help);
    registry.register("AMAZON.RepeatIntent", repeat);
    registry.register("AMAZON.StopIntent", end_session);
    registry.register("AMAZON.CancelIntent", end_session);
    registry.register("SessionEndedRequest", goodbye);
    registry.register("Unhandled", help);
    registry
}

fn launch(context: &mut HandlerContext<'_>) -> HandlerOutcome {
    let skill_name = context.t_text("SKILL_NAME");
    let speech = context.t_format("WELCOME_MESSAGE", &[&skill_name]);
    let reprompt = context.t_text("WELCOME_REPROMPT");
    remember_speech(context, &speech, &reprompt);
    HandlerOutcome::Respond(ResponseBuilder::new().speak(&speech).listen(&reprompt))
}

fn recipe(context: &mut HandlerContext<'_>) -> HandlerOutcome {
    let item_name = context.slot_value("Item").map(|value| value.to_lowercase());
    let recipes = context.t("RECIPES");
    let recipe = item_name
        .as_deref()
        .and_then(|name| recipes.get(name))
        .and_then(Value::as_str);

    if let Some(recipe) = recipe {
        let skill_name = context.t_text("SKILL_NAME");
        let item = item_name.as_deref().unwrap_or_default();
        let card_title = context.t_format("DISPLAY_CARD_TITLE", &[&skill_name, item]);
        let reprompt = context.t_text("RECIPE_REPEAT_MESSAGE");
        let recipe = recipe.to_string();
        remember_speech(context, &recipe, &reprompt);
        return HandlerOutcome::Respond(
            ResponseBuilder::new()
                .speak(&recipe)
                .listen(&reprompt)
                .card_renderer(&card_title, &recipe, None),
        );
    }

    let reprompt = context.t_text("RECIPE_NOT_FOUND_REPROMPT");
    let mut speech = context.t_text("RECIPE_NOT_FOUND_MESSAGE");
    match item_name.as_deref() {
        Some(item) => {
            speech.push_str(&context.t_format("RECIPE_NOT_FOUND_WITH_ITEM_NAME", &[item]));
        }
        None => speech.push_str(&context.t_text("RECIPE_NOT_FOUND_WITHOUT_ITEM_NAME")),
    }
    speech.push_str(&reprompt);
    remember_speech(context, &speech, &reprompt);
    HandlerOutcome::Respond(ResponseBuilder::new().speak(&speech).listen(&reprompt))
}

fn help(context: &mut HandlerContext<'_>) -> HandlerOutcome {
    let speech = context.t_text("HELP_MESSAGE");
    let reprompt = context.t_text("HELP_REPROMPT");
    remember_speech(context, &speech, &reprompt);
    HandlerOutcome::Respond(ResponseBuilder::new().speak(&speech).listen(&reprompt))
}

fn repeat(context: &mut HandlerContext<'_>) -> HandlerOutcome {
    let speech = stored_text(context, "speechOutput");
    let reprompt = stored_text(context, "repromptSpeech");
    HandlerOutcome::Respond(ResponseBuilder::new().speak(&speech).listen(&reprompt))
}

fn end_session(_context: &mut HandlerContext<'_>) -> HandlerOutcome {
    HandlerOutcome::Emit("SessionEndedRequest".to_string())
}

fn goodbye(context: &mut HandlerContext<'_>) -> HandlerOutcome {
    HandlerOutcome::Respond(ResponseBuilder::new().speak(&context.t_text("STOP_MESSAGE")))
}

fn remember_speech(context: &mut HandlerContext<'_>, speech: &str, reprompt: &str) {
    context
        .attributes
        .insert("speechOutput".to_string(), json!(speech));
    context
        .attributes
        .insert("repromptSpeech".to_string(), json!(reprompt));
}

fn stored_text(context: &HandlerContext<'_>, key: &str) -> String {
    context
        .attributes
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub fn resources() -> Translator {
    Translator::new()
        .with_locale(
            "en",
            json!({
                "RECIPES": english_recipes(),
                "SKILL_NAME": "Minecraft Helper",
                "WELCOME_MESSAGE": "Welcome to %s. You can ask a question like, what's the recipe for a chest? ... Now, what can I help you with?",
                "WELCOME_REPROMPT": "For instructions on what you can say, please say help me.",
                "DISPLAY_CARD_TITLE": "%s  - Recipe for %s.",
                "HELP_MESSAGE": "You can ask questions such as, what's the recipe, or, you can say exit...Now, what can I help you with?",
                "HELP_REPROMPT": "You can say things like, what's the recipe, or you can say exit...Now, what can I help you with?",
                "STOP_MESSAGE": "Goodbye!",
                "RECIPE_REPEAT_MESSAGE": "Try saying repeat.",
                "RECIPE_NOT_FOUND_MESSAGE": "I'm sorry, I currently do not know ",
                "RECIPE_NOT_FOUND_WITH_ITEM_NAME": "the recipe for %s. ",
                "RECIPE_NOT_FOUND_WITHOUT_ITEM_NAME": "that recipe. ",
                "RECIPE_NOT_FOUND_REPROMPT": "What else can I help with?",
            }),
        )
        .with_locale(
            "en-US",
            json!({
                "RECIPES": english_recipes(),
                "SKILL_NAME": "American Minecraft Helper",
            }),
        )
        .with_locale(
            "en-GB",
            json!({
                "RECIPES": english_recipes(),
                "SKILL_NAME": "British Minecraft Helper",
            }),
        )
        .with_locale(
            "de",
            json!({
                "RECIPES": german_recipes(),
                "SKILL_NAME": "Assistent für Minecraft in Deutsch",
                "WELCOME_MESSAGE": "Willkommen bei %s. Du kannst beispielsweise die Frage stellen: Welche Rezepte gibt es für eine Truhe? ... Nun, womit kann ich dir helfen?",
                "WELCOME_REPROMPT": "Wenn du wissen möchtest, was du sagen kannst, sag einfach „Hilf mir“.",
                "DISPLAY_CARD_TITLE": "%s - Rezept für %s.",
                "HELP_MESSAGE": "Du kannst beispielsweise Fragen stellen wie „Wie geht das Rezept für“ oder du kannst „Beenden“ sagen ... Wie kann ich dir helfen?",
                "HELP_REPROMPT": "Du kannst beispielsweise Sachen sagen wie „Wie geht das Rezept für“ oder du kannst „Beenden“ sagen ... Wie kann ich dir helfen?",
                "STOP_MESSAGE": "Auf Wiedersehen!",
                "RECIPE_REPEAT_MESSAGE": "Sage einfach „Wiederholen“.",
                "RECIPE_NOT_FOUND_MESSAGE": "Tut mir leid, ich kenne derzeit ",
                "RECIPE_NOT_FOUND_WITH_ITEM_NAME": "das Rezept für %s nicht. ",
                "RECIPE_NOT_FOUND_WITHOUT_ITEM_NAME": "dieses Rezept nicht. ",
                "RECIPE_NOT_FOUND_REPROMPT": "Womit kann ich dir sonst helfen?",
            }),
        )
}

fn english_recipes() -> Value {
    json!({
        "chest": "A chest is made from eight wooden planks arranged in a ring around an empty middle slot.",
        "torch": "Place a piece of coal or charcoal on top of a stick.",
        "snow golem": "Stack two snow blocks and put a carved pumpkin on top.",
        "furnace": "Arrange eight cobblestone blocks in a ring around an empty middle slot.",
        "bed": "Lay three wool blocks over three wooden planks.",
        "ladder": "Arrange seven sticks in an H shape, leaving the top and bottom middle slots empty.",
        "bookshelf": "Put three books in the middle row between two rows of three wooden planks.",
        "crafting table": "Fill a two by two square with four wooden planks.",
        "cake": "Place three buckets of milk over sugar, an egg, and more sugar, with three wheat along the bottom.",
        "piston": "Under three wooden planks, put cobblestone, an iron ingot, and cobblestone, with cobblestone, redstone, and cobblestone below.",
    })
}

fn german_recipes() -> Value {
    json!({
        "truhe": "Eine Truhe entsteht aus acht Holzbrettern, die ringförmig um ein leeres Mittelfeld gelegt werden.",
        "fackel": "Setze ein Stück Kohle oder Holzkohle auf einen Stock.",
        "schneegolem": "Staple zwei Schneeblöcke und setze einen geschnitzten Kürbis obendrauf.",
        "ofen": "Lege acht Bruchsteine ringförmig um ein leeres Mittelfeld.",
        "bett": "Lege drei Wollblöcke auf drei Holzbretter.",
        "leiter": "Ordne sieben Stöcke in einer H-Form an und lasse oben und unten die Mitte frei.",
        "bücherregal": "Lege drei Bücher in die mittlere Reihe zwischen zwei Reihen aus je drei Holzbrettern.",
        "werkbank": "Fülle ein Quadrat aus zwei mal zwei Feldern mit vier Holzbrettern.",
        "kuchen": "Drei Eimer Milch oben, Zucker, Ei und Zucker in der Mitte, drei Weizen unten.",
        "kolben": "Unter drei Holzbretter kommen Bruchstein, Eisenbarren und Bruchstein, darunter Bruchstein, Redstone und Bruchstein.",
    })
}

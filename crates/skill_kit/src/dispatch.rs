use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::attributes::AttributeStore;
use crate::i18n::{interpolate, Translator};
use crate::response::ResponseBuilder;

/// Session attribute key the conversation state lives under.
pub const STATE_ATTRIBUTE: &str = "STATE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillError {
    message: String,
}

impl SkillError {
    pub fn new(message: impl Into<String>) -> SkillError {
        SkillError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SkillError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.message)
    }
}

impl std::error::Error for SkillError {}

/// What a handler wants done next: respond to the user, or chain into
/// another named event (which re-resolves with the current state appended
/// and the usual `Unhandled` fallback).
pub enum HandlerOutcome {
    Respond(ResponseBuilder),
    Emit(String),
}

pub type Handler = fn(&mut HandlerContext<'_>) -> HandlerOutcome;

/// Everything a handler can see while it runs: the inbound event, the
/// mutable session attributes, the active conversation state, and the
/// skill's translator.
pub struct HandlerContext<'a> {
    pub event: &'a Value,
    pub attributes: &'a mut Map<String, Value>,
    translator: &'a Translator,
    locale: &'a str,
    state: String,
}

impl HandlerContext<'_> {
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn locale(&self) -> &str {
        self.locale
    }

    /// Localized value for a key, which may be structured data.
    pub fn t(&self, key: &str) -> Value {
        self.translator.translate(self.locale, key)
    }

    pub fn t_text(&self, key: &str) -> String {
        self.translator.translate_text(self.locale, key)
    }

    /// Localized text with `%s` placeholders filled positionally.
    pub fn t_format(&self, key: &str, args: &[&str]) -> String {
        interpolate(&self.t_text(key), args)
    }

    /// Spoken value of an intent slot, when the request carries one.
    pub fn slot_value(&self, slot_name: &str) -> Option<&str> {
        self.event
            .get("request")?
            .get("intent")?
            .get("slots")?
            .get(slot_name)?
            .get("value")?
            .as_str()
    }
}

/// Named handlers, looked up by event name with the conversation state
/// already appended.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
}

impl HandlerRegistry {
    pub fn new() -> HandlerRegistry {
        HandlerRegistry::default()
    }

    pub fn register(&mut self, event_name: &str, handler: Handler) {
        self.handlers.insert(event_name.to_string(), handler);
    }

    /// Registers a table of handlers scoped to one conversation state. The
    /// state is appended to every event name at registration time, so
    /// lookups stay exact-match.
    pub fn register_state_handlers(&mut self, state: &str, handlers: &[(&str, Handler)]) {
        for (event_name, handler) in handlers {
            self.handlers.insert(format!("{event_name}{state}"), *handler);
        }
    }

    pub fn contains(&self, event_name: &str) -> bool {
        self.handlers.contains_key(event_name)
    }

    fn lookup(&self, event_name: &str) -> Option<Handler> {
        self.handlers.get(event_name).copied()
    }
}

/// A configured skill: its handlers plus the optional translator,
/// application-id check, and attribute store.
pub struct Skill {
    registry: HandlerRegistry,
    translator: Translator,
    expected_application_id: Option<String>,
    attribute_store: Option<Box<dyn AttributeStore>>,
    save_before_response: bool,
}

impl Skill {
    pub fn new(registry: HandlerRegistry) -> Skill {
        Skill {
            registry,
            translator: Translator::default(),
            expected_application_id: None,
            attribute_store: None,
            save_before_response: false,
        }
    }

    pub fn with_translator(mut self, translator: Translator) -> Skill {
        self.translator = translator;
        self
    }

    /// Rejects events whose application id does not match.
    pub fn with_application_id(mut self, application_id: impl Into<String>) -> Skill {
        self.expected_application_id = Some(application_id.into());
        self
    }

    pub fn with_attribute_store(mut self, store: Box<dyn AttributeStore>) -> Skill {
        self.attribute_store = Some(store);
        self
    }

    /// Saves attributes on every response instead of only when the session
    /// ends.
    pub fn with_save_before_response(mut self) -> Skill {
        self.save_before_response = true;
        self
    }

    /// Routes one request envelope to its handler and renders the speechlet
    /// response.
    pub fn handle(&self, event: &Value) -> Result<Value, SkillError> {
        self.validate_application_id(event)?;

        let mut attributes = session_attributes(event);
        if let Some(store) = &self.attribute_store {
            if is_fresh_session(event) {
                let stored = store.load(user_id(event)).map_err(|error| {
                    SkillError::new(format!("Error fetching user state: {error}"))
                })?;
                for (key, value) in stored {
                    attributes.insert(key, value);
                }
            }
        }

        let locale = event
            .pointer("/request/locale")
            .and_then(Value::as_str)
            .unwrap_or("");
        let mut event_name = {
            let state = current_state(&attributes);
            self.resolve(&base_event_name(event, &self.registry, &state), &state)?
        };

        loop {
            let state = current_state(&attributes);
            let handler = self
                .registry
                .lookup(&event_name)
                .ok_or_else(|| SkillError::new(format!("No handler registered for event: {event_name}")))?;

            let mut context = HandlerContext {
                event,
                attributes: &mut attributes,
                translator: &self.translator,
                locale,
                state: state.clone(),
            };
            match handler(&mut context) {
                HandlerOutcome::Respond(builder) => {
                    if let Some(store) = &self.attribute_store {
                        if self.save_before_response || builder.ends_session() {
                            store.save(user_id(event), &attributes).map_err(|error| {
                                SkillError::new(format!("Error saving state: {error}"))
                            })?;
                        }
                    }
                    return Ok(builder.into_envelope(attributes));
                }
                HandlerOutcome::Emit(name) => {
                    event_name = self.resolve(&name, &current_state(&attributes))?;
                }
            }
        }
    }

    /// Exact-match lookup on name + state, falling back to `Unhandled` +
    /// state.
    fn resolve(&self, base_name: &str, state: &str) -> Result<String, SkillError> {
        let mut event_name = format!("{base_name}{state}");
        if !self.registry.contains(&event_name) {
            event_name = format!("Unhandled{state}");
        }
        if !self.registry.contains(&event_name) {
            return Err(SkillError::new(format!(
                "No 'Unhandled' handler registered for event: {event_name}"
            )));
        }
        Ok(event_name)
    }

    fn validate_application_id(&self, event: &Value) -> Result<(), SkillError> {
        let Some(expected) = &self.expected_application_id else {
            return Ok(());
        };
        let request_application_id = event
            .pointer("/context/System/application/applicationId")
            .or_else(|| event.pointer("/session/application/applicationId"))
            .and_then(Value::as_str)
            .unwrap_or("");
        if request_application_id != expected {
            return Err(SkillError::new(format!("Invalid ApplicationId: {expected}")));
        }
        Ok(())
    }
}

fn session_attributes(event: &Value) -> Map<String, Value> {
    event
        .pointer("/session/attributes")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn current_state(attributes: &Map<String, Value>) -> String {
    attributes
        .get(STATE_ATTRIBUTE)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

fn is_fresh_session(event: &Value) -> bool {
    let session = event.get("session");
    session.and_then(|session| session.get("sessionId")).is_none()
        || session
            .and_then(|session| session.get("new"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
}

fn user_id(event: &Value) -> &str {
    event
        .pointer("/context/System/user/userId")
        .or_else(|| event.pointer("/session/user/userId"))
        .and_then(Value::as_str)
        .unwrap_or("")
}

/// Which named event this request maps to, before the state is appended.
/// Fresh sessions route to `NewSession` only when the skill registered one
/// for the current state.
fn base_event_name(event: &Value, registry: &HandlerRegistry, state: &str) -> String {
    let request_type = event
        .pointer("/request/type")
        .and_then(Value::as_str)
        .unwrap_or("");

    let fresh = event
        .pointer("/session/new")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if fresh && registry.contains(&format!("NewSession{state}")) {
        return "NewSession".to_string();
    }

    match request_type {
        "LaunchRequest" | "SessionEndedRequest" => request_type.to_string(),
        "IntentRequest" => event
            .pointer("/request/intent/name")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        "Display.ElementSelected" => "ElementSelected".to_string(),
        other => {
            if let Some(suffix) = other.strip_prefix("AudioPlayer.") {
                return suffix.to_string();
            }
            if let Some(suffix) = other.strip_prefix("PlaybackController.") {
                return suffix.to_string();
            }
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;

    fn launch_event() -> Value {
        json!({
            "session": {
                "sessionId": "session-1",
                "new": true,
                "application": {"applicationId": "amzn1.ask.skill.test"},
                "user": {"userId": "user-1"},
                "attributes": {},
            },
            "request": {"type": "LaunchRequest", "locale": "en-US"},
        })
    }

    fn intent_event(intent_name: &str, attributes: Value) -> Value {
        json!({
            "session": {
                "sessionId": "session-1",
                "new": false,
                "application": {"applicationId": "amzn1.ask.skill.test"},
                "user": {"userId": "user-1"},
                "attributes": attributes,
            },
            "request": {
                "type": "IntentRequest",
                "locale": "en-US",
                "intent": {"name": intent_name, "slots": {}},
            },
        })
    }

    fn say_welcome(_context: &mut HandlerContext<'_>) -> HandlerOutcome {
        HandlerOutcome::Respond(ResponseBuilder::new().speak("Welcome").listen("Still there?"))
    }

    fn say_goodbye(_context: &mut HandlerContext<'_>) -> HandlerOutcome {
        HandlerOutcome::Respond(ResponseBuilder::new().speak("Goodbye"))
    }

    fn chain_to_goodbye(_context: &mut HandlerContext<'_>) -> HandlerOutcome {
        HandlerOutcome::Emit("SessionEndedRequest".to_string())
    }

    fn record_visit(context: &mut HandlerContext<'_>) -> HandlerOutcome {
        context.attributes.insert("visited".to_string(), json!(true));
        HandlerOutcome::Respond(ResponseBuilder::new().speak("Recorded"))
    }

    fn unhandled(_context: &mut HandlerContext<'_>) -> HandlerOutcome {
        HandlerOutcome::Respond(ResponseBuilder::new().speak("Unhandled"))
    }

    #[test]
    fn launch_requests_route_by_request_type() {
        let mut registry = HandlerRegistry::new();
        registry.register("LaunchRequest", say_welcome);
        let skill = Skill::new(registry);

        let envelope = skill.handle(&launch_event()).expect("dispatch should succeed");
        assert_eq!(envelope["version"], "1.0");
        assert_eq!(
            envelope["response"]["outputSpeech"]["ssml"],
            "<speak> Welcome </speak>"
        );
        assert_eq!(envelope["response"]["shouldEndSession"], json!(false));
        assert_eq!(envelope["sessionAttributes"], json!({}));
    }

    #[test]
    fn fresh_sessions_prefer_a_registered_new_session_handler() {
        let mut registry = HandlerRegistry::new();
        registry.register("NewSession", say_goodbye);
        registry.register("LaunchRequest", say_welcome);
        let skill = Skill::new(registry);

        let envelope = skill.handle(&launch_event()).expect("dispatch should succeed");
        assert_eq!(
            envelope["response"]["outputSpeech"]["ssml"],
            "<speak> Goodbye </speak>"
        );
    }

    #[test]
    fn intent_requests_route_by_intent_name() {
        let mut registry = HandlerRegistry::new();
        registry.register("RecipeIntent", record_visit);
        let skill = Skill::new(registry);

        let envelope = skill
            .handle(&intent_event("RecipeIntent", json!({})))
            .expect("dispatch should succeed");
        assert_eq!(envelope["sessionAttributes"]["visited"], json!(true));
    }

    #[test]
    fn unknown_events_fall_back_to_unhandled() {
        let mut registry = HandlerRegistry::new();
        registry.register("Unhandled", unhandled);
        let skill = Skill::new(registry);

        let envelope = skill
            .handle(&intent_event("NoSuchIntent", json!({})))
            .expect("dispatch should succeed");
        assert_eq!(
            envelope["response"]["outputSpeech"]["ssml"],
            "<speak> Unhandled </speak>"
        );
    }

    #[test]
    fn dispatch_fails_without_an_unhandled_fallback() {
        let skill = Skill::new(HandlerRegistry::new());
        let error = skill
            .handle(&intent_event("NoSuchIntent", json!({})))
            .expect_err("dispatch should fail");
        assert_eq!(
            error.message(),
            "No 'Unhandled' handler registered for event: Unhandled"
        );
    }

    #[test]
    fn state_scoped_handlers_match_on_name_plus_state() {
        let mut registry = HandlerRegistry::new();
        registry.register("AnswerIntent", say_goodbye);
        registry.register_state_handlers("_QUIZ", &[("AnswerIntent", say_welcome)]);
        let skill = Skill::new(registry);

        let envelope = skill
            .handle(&intent_event("AnswerIntent", json!({"STATE": "_QUIZ"})))
            .expect("dispatch should succeed");
        assert_eq!(
            envelope["response"]["outputSpeech"]["ssml"],
            "<speak> Welcome </speak>"
        );
        assert_eq!(envelope["sessionAttributes"]["STATE"], "_QUIZ");
    }

    #[test]
    fn audio_player_requests_route_by_suffix() {
        let mut registry = HandlerRegistry::new();
        registry.register("PlaybackFinished", say_goodbye);
        let skill = Skill::new(registry);

        let event = json!({
            "session": {"sessionId": "session-1", "new": false, "attributes": {}},
            "request": {"type": "AudioPlayer.PlaybackFinished", "locale": "en-US"},
        });
        let envelope = skill.handle(&event).expect("dispatch should succeed");
        assert_eq!(
            envelope["response"]["outputSpeech"]["ssml"],
            "<speak> Goodbye </speak>"
        );
    }

    #[test]
    fn emitted_events_chain_into_other_handlers() {
        let mut registry = HandlerRegistry::new();
        registry.register("AMAZON.StopIntent", chain_to_goodbye);
        registry.register("SessionEndedRequest", say_goodbye);
        let skill = Skill::new(registry);

        let envelope = skill
            .handle(&intent_event("AMAZON.StopIntent", json!({})))
            .expect("dispatch should succeed");
        assert_eq!(
            envelope["response"]["outputSpeech"]["ssml"],
            "<speak> Goodbye </speak>"
        );
    }

    #[test]
    fn mismatched_application_ids_abort_dispatch() {
        let mut registry = HandlerRegistry::new();
        registry.register("LaunchRequest", say_welcome);
        let skill = Skill::new(registry).with_application_id("amzn1.ask.skill.expected");

        let error = skill.handle(&launch_event()).expect_err("dispatch should fail");
        assert_eq!(
            error.message(),
            "Invalid ApplicationId: amzn1.ask.skill.expected"
        );
    }

    #[test]
    fn matching_application_ids_pass_validation() {
        let mut registry = HandlerRegistry::new();
        registry.register("LaunchRequest", say_welcome);
        let skill = Skill::new(registry).with_application_id("amzn1.ask.skill.test");

        skill.handle(&launch_event()).expect("dispatch should succeed");
    }

    #[derive(Clone)]
    struct RecordingStore {
        stored: Map<String, Value>,
        saves: Arc<Mutex<Vec<(String, Map<String, Value>)>>>,
    }

    impl RecordingStore {
        fn new(stored: Value) -> RecordingStore {
            RecordingStore {
                stored: stored.as_object().cloned().unwrap_or_default(),
                saves: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl AttributeStore for RecordingStore {
        fn load(&self, _user_id: &str) -> Result<Map<String, Value>, String> {
            Ok(self.stored.clone())
        }

        fn save(&self, user_id: &str, attributes: &Map<String, Value>) -> Result<(), String> {
            self.saves
                .lock()
                .expect("poisoned mutex")
                .push((user_id.to_string(), attributes.clone()));
            Ok(())
        }
    }

    #[test]
    fn fresh_sessions_load_stored_attributes() {
        let store = RecordingStore::new(json!({"favorite": "snow golem"}));
        let mut registry = HandlerRegistry::new();
        registry.register("LaunchRequest", say_welcome);
        let skill = Skill::new(registry).with_attribute_store(Box::new(store));

        let envelope = skill.handle(&launch_event()).expect("dispatch should succeed");
        assert_eq!(envelope["sessionAttributes"]["favorite"], "snow golem");
    }

    #[test]
    fn session_ending_responses_save_attributes() {
        let store = RecordingStore::new(json!({}));
        let saves = store.saves.clone();
        let mut registry = HandlerRegistry::new();
        registry.register("RecordIntent", record_visit);
        let skill = Skill::new(registry).with_attribute_store(Box::new(store));

        skill
            .handle(&intent_event("RecordIntent", json!({})))
            .expect("dispatch should succeed");

        let saves = saves.lock().expect("poisoned mutex");
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].0, "user-1");
        assert_eq!(saves[0].1.get("visited"), Some(&json!(true)));
    }

    #[test]
    fn open_session_responses_do_not_save_by_default() {
        let store = RecordingStore::new(json!({}));
        let saves = store.saves.clone();
        let mut registry = HandlerRegistry::new();
        registry.register("AskIntent", say_welcome);
        let skill = Skill::new(registry).with_attribute_store(Box::new(store));

        skill
            .handle(&intent_event("AskIntent", json!({})))
            .expect("dispatch should succeed");
        assert!(saves.lock().expect("poisoned mutex").is_empty());
    }
}

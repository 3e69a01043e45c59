use serde_json::{json, Map, Value};

/// Plain speech is always delivered as SSML.
pub(crate) fn ssml_speech(message: &str) -> Value {
    json!({"type": "SSML", "ssml": format!("<speak> {message} </speak>")})
}

/// Image URLs for a standard card. A card with neither URL renders as a
/// simple card instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardImage {
    pub small_image_url: Option<String>,
    pub large_image_url: Option<String>,
}

/// Chainable builder for the `response` object of a speechlet envelope.
/// Sessions end by default; `listen` keeps them open.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    output_speech: Option<Value>,
    reprompt: Option<Value>,
    card: Option<Value>,
    directives: Vec<Value>,
    should_end_session: Option<bool>,
}

impl ResponseBuilder {
    pub fn new() -> ResponseBuilder {
        ResponseBuilder {
            output_speech: None,
            reprompt: None,
            card: None,
            directives: Vec::new(),
            should_end_session: Some(true),
        }
    }

    pub fn speak(mut self, speech: &str) -> ResponseBuilder {
        self.output_speech = Some(ssml_speech(speech));
        self
    }

    /// Sets the reprompt speech and keeps the session open for a reply.
    pub fn listen(mut self, reprompt_speech: &str) -> ResponseBuilder {
        self.reprompt = Some(json!({"outputSpeech": ssml_speech(reprompt_speech)}));
        self.should_end_session = Some(false);
        self
    }

    pub fn card_renderer(
        mut self,
        title: &str,
        content: &str,
        image: Option<&CardImage>,
    ) -> ResponseBuilder {
        self.card = Some(build_card(title, content, image));
        self
    }

    pub fn link_account_card(mut self) -> ResponseBuilder {
        self.card = Some(json!({"type": "LinkAccount"}));
        self
    }

    pub fn permissions_consent_card(mut self, permissions: &[&str]) -> ResponseBuilder {
        self.card = Some(json!({"type": "AskForPermissionsConsent", "permissions": permissions}));
        self
    }

    /// Hands the rest of the dialog to the platform's dialog model. Dialog
    /// directives always keep the session open.
    pub fn dialog_delegate(self, updated_intent: Option<Value>) -> ResponseBuilder {
        self.dialog_directive("Dialog.Delegate", None, updated_intent)
    }

    pub fn dialog_elicit_slot(
        self,
        slot_name: &str,
        updated_intent: Option<Value>,
    ) -> ResponseBuilder {
        self.dialog_directive(
            "Dialog.ElicitSlot",
            Some(("slotToElicit", slot_name)),
            updated_intent,
        )
    }

    pub fn dialog_confirm_slot(
        self,
        slot_name: &str,
        updated_intent: Option<Value>,
    ) -> ResponseBuilder {
        self.dialog_directive(
            "Dialog.ConfirmSlot",
            Some(("slotToConfirm", slot_name)),
            updated_intent,
        )
    }

    pub fn dialog_confirm_intent(self, updated_intent: Option<Value>) -> ResponseBuilder {
        self.dialog_directive("Dialog.ConfirmIntent", None, updated_intent)
    }

    fn dialog_directive(
        mut self,
        dialog_type: &str,
        slot: Option<(&str, &str)>,
        updated_intent: Option<Value>,
    ) -> ResponseBuilder {
        let mut directive = Map::new();
        directive.insert("type".to_string(), json!(dialog_type));
        if let Some((field, slot_name)) = slot {
            directive.insert(field.to_string(), json!(slot_name));
        }
        if let Some(intent) = updated_intent {
            directive.insert("updatedIntent".to_string(), intent);
        }
        self.directives.push(Value::Object(directive));
        self.should_end_session = Some(false);
        self
    }

    pub fn audio_player_play(
        mut self,
        behavior: &str,
        url: &str,
        token: &str,
        expected_previous_token: Option<&str>,
        offset_in_milliseconds: u64,
    ) -> ResponseBuilder {
        let mut stream = Map::new();
        stream.insert("url".to_string(), json!(url));
        stream.insert("token".to_string(), json!(token));
        if let Some(previous) = expected_previous_token {
            stream.insert("expectedPreviousToken".to_string(), json!(previous));
        }
        stream.insert("offsetInMilliseconds".to_string(), json!(offset_in_milliseconds));

        self.directives.push(json!({
            "type": "AudioPlayer.Play",
            "playBehavior": behavior,
            "audioItem": {"stream": stream},
        }));
        self
    }

    pub fn audio_player_stop(mut self) -> ResponseBuilder {
        self.directives.push(json!({"type": "AudioPlayer.Stop"}));
        self
    }

    pub fn audio_player_clear_queue(mut self, clear_behavior: &str) -> ResponseBuilder {
        self.directives.push(json!({
            "type": "AudioPlayer.ClearQueue",
            "clearBehavior": clear_behavior,
        }));
        self
    }

    pub fn render_template(mut self, template: Value) -> ResponseBuilder {
        self.directives.push(json!({
            "type": "Display.RenderTemplate",
            "template": template,
        }));
        self
    }

    pub fn hint(mut self, hint_text: &str) -> ResponseBuilder {
        self.directives.push(json!({
            "type": "Hint",
            "hint": {"type": "PlainText", "text": hint_text},
        }));
        self
    }

    /// The launch-video directive does not allow a `shouldEndSession` flag,
    /// so adding it drops the flag from the response entirely.
    pub fn play_video(mut self, source: &str, metadata: Option<Value>) -> ResponseBuilder {
        let mut video_item = Map::new();
        video_item.insert("source".to_string(), json!(source));
        if let Some(metadata) = metadata {
            video_item.insert("metadata".to_string(), metadata);
        }

        self.should_end_session = None;
        self.directives.push(json!({"type": "VideoApp.Launch", "videoItem": video_item}));
        self
    }

    pub fn ends_session(&self) -> bool {
        self.should_end_session == Some(true)
    }

    pub(crate) fn into_envelope(self, session_attributes: Map<String, Value>) -> Value {
        let mut response = Map::new();
        if let Some(speech) = self.output_speech {
            response.insert("outputSpeech".to_string(), speech);
        }
        if let Some(reprompt) = self.reprompt {
            response.insert("reprompt".to_string(), reprompt);
        }
        if let Some(card) = self.card {
            response.insert("card".to_string(), card);
        }
        if !self.directives.is_empty() {
            response.insert("directives".to_string(), Value::Array(self.directives));
        }
        if let Some(end) = self.should_end_session {
            response.insert("shouldEndSession".to_string(), json!(end));
        }

        json!({
            "version": "1.0",
            "sessionAttributes": session_attributes,
            "response": response,
        })
    }
}

impl Default for ResponseBuilder {
    fn default() -> ResponseBuilder {
        ResponseBuilder::new()
    }
}

fn build_card(title: &str, content: &str, image: Option<&CardImage>) -> Value {
    match image {
        Some(image)
            if image.small_image_url.is_some() || image.large_image_url.is_some() =>
        {
            let mut urls = Map::new();
            if let Some(small) = &image.small_image_url {
                urls.insert("smallImageUrl".to_string(), json!(small));
            }
            if let Some(large) = &image.large_image_url {
                urls.insert("largeImageUrl".to_string(), json!(large));
            }
            json!({
                "type": "Standard",
                "title": title,
                "text": content,
                "image": urls,
            })
        }
        _ => json!({"type": "Simple", "title": title, "content": content}),
    }
}

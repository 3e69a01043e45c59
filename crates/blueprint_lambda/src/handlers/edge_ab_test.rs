//! Edge A/B assignment for an experiment tracking pixel.
//!
//! Requests for the pixel are steered to the control or treatment variant.
//! A previously assigned experiment cookie pins the variant; new viewers are
//! assigned by a weighted draw. Everything else passes through untouched.

use blueprint_contracts::cloudfront::{
    any_cookie_contains, request_uri, set_request_uri, viewer_request,
};
use serde_json::Value;

use crate::adapters::experiment::ExperimentSource;

const EXPERIMENT_URI: &str = "/experiment-pixel.jpg";
const CONTROL_URI: &str = "/experiment-group/control-pixel.jpg";
const TREATMENT_URI: &str = "/experiment-group/treatment-pixel.jpg";

const CONTROL_COOKIE: &str = "X-Experiment-Name=A";
const TREATMENT_COOKIE: &str = "X-Experiment-Name=B";

/// Share of unassigned viewers steered to the control variant.
const CONTROL_WEIGHT: f64 = 0.75;

pub fn handle(event: &Value, experiments: &dyn ExperimentSource) -> Result<Value, String> {
    let mut request = viewer_request(event).map_err(|error| error.message().to_string())?;

    if request_uri(&request) != EXPERIMENT_URI {
        return Ok(request);
    }

    let uri = if any_cookie_contains(&request, CONTROL_COOKIE) {
        CONTROL_URI
    } else if any_cookie_contains(&request, TREATMENT_COOKIE) {
        TREATMENT_URI
    } else if experiments.draw() < CONTROL_WEIGHT {
        CONTROL_URI
    } else {
        TREATMENT_URI
    };
    set_request_uri(&mut request, uri);

    Ok(request)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct FixedDraw(f64);

    impl ExperimentSource for FixedDraw {
        fn draw(&self) -> f64 {
            self.0
        }
    }

    fn pixel_event(uri: &str, cookies: &[&str]) -> Value {
        let cookie_headers: Vec<Value> = cookies
            .iter()
            .map(|value| json!({"key": "Cookie", "value": value}))
            .collect();
        json!({
            "Records": [{
                "cf": {
                    "request": {
                        "uri": uri,
                        "headers": {"cookie": cookie_headers},
                    }
                }
            }]
        })
    }

    #[test]
    fn other_uris_pass_through_unchanged() {
        let request = handle(&pixel_event("/index.html", &[]), &FixedDraw(0.0))
            .expect("request should pass");
        assert_eq!(request["uri"], "/index.html");
    }

    #[test]
    fn an_existing_cookie_pins_the_variant() {
        let event = pixel_event("/experiment-pixel.jpg", &["First=1; X-Experiment-Name=A"]);
        let request = handle(&event, &FixedDraw(0.99)).expect("request should rewrite");
        assert_eq!(request["uri"], "/experiment-group/control-pixel.jpg");

        let event = pixel_event("/experiment-pixel.jpg", &["X-Experiment-Name=B"]);
        let request = handle(&event, &FixedDraw(0.0)).expect("request should rewrite");
        assert_eq!(request["uri"], "/experiment-group/treatment-pixel.jpg");
    }

    #[test]
    fn unassigned_viewers_are_weighted_toward_control() {
        let event = pixel_event("/experiment-pixel.jpg", &[]);

        let request = handle(&event, &FixedDraw(0.74)).expect("request should rewrite");
        assert_eq!(request["uri"], "/experiment-group/control-pixel.jpg");

        let request = handle(&event, &FixedDraw(0.75)).expect("request should rewrite");
        assert_eq!(request["uri"], "/experiment-group/treatment-pixel.jpg");
    }
}

//! Turns pasted form input into a canonical `/wrap/<invoice>` redirect.

use serde::Deserialize;
use url::form_urlencoded;

/// Query key carrying the routing fee hint, in millisatoshis.
pub const ROUTING_MSAT: &str = "routing_msat";

/// Fields of the "paste your invoice" form. They are consumed here and not
/// carried into the redirect target.
const FORM_FIELDS: &[&str] = &["body", "advanced", "routing"];

/// Submission from the landing page form, via query string or POST body.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct WrapForm {
    #[serde(default)]
    pub body: String,
    pub advanced: Option<String>,
    pub routing: Option<String>,
}

impl WrapForm {
    /// The routing fee hint, present only when advanced options were enabled.
    pub fn routing_hint(&self) -> Option<&str> {
        if self.advanced.as_deref() != Some("on") {
            return None;
        }
        self.routing
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

/// Trim, lower-case and drop a `lightning:` scheme from pasted input.
pub fn normalize_invoice(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    match lowered.strip_prefix("lightning:") {
        Some(rest) => rest.to_string(),
        None => lowered,
    }
}

/// Build the redirect target for a form submission.
///
/// Query parameters already on the request survive, except the form's own
/// fields. With advanced options on, `routing_msat` is set (replacing any
/// previous value) to the submitted routing amount.
pub fn redirect_location(form: &WrapForm, request_query: &str) -> String {
    let invoice = normalize_invoice(&form.body);
    let routing = form.routing_hint();

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(request_query.as_bytes()) {
        if FORM_FIELDS.contains(&key.as_ref()) {
            continue;
        }
        if routing.is_some() && key == ROUTING_MSAT {
            continue;
        }
        serializer.append_pair(&key, &value);
    }
    if let Some(routing) = routing {
        serializer.append_pair(ROUTING_MSAT, routing);
    }
    let query = serializer.finish();

    let path = format!("/wrap/{}", urlencoding::encode(&invoice));
    if query.is_empty() {
        path
    } else {
        format!("{path}?{query}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(body: &str) -> WrapForm {
        WrapForm {
            body: body.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_trims_lowercases_and_strips_scheme() {
        assert_eq!(
            normalize_invoice("  LIGHTNING:LNBC1PVJLUEZ  \n"),
            "lnbc1pvjluez"
        );
        assert_eq!(normalize_invoice("lnbc1qq"), "lnbc1qq");
        assert_eq!(normalize_invoice("Lightning:lnbc1qq"), "lnbc1qq");
    }

    #[test]
    fn test_normalize_strips_scheme_only_once() {
        assert_eq!(
            normalize_invoice("lightning:lightning:lnbc1qq"),
            "lightning:lnbc1qq"
        );
    }

    #[test]
    fn test_redirect_without_advanced() {
        let loc = redirect_location(&form(" LIGHTNING:LNBC1PVJLUEZ "), "");
        assert_eq!(loc, "/wrap/lnbc1pvjluez");
    }

    #[test]
    fn test_redirect_sets_routing_when_advanced() {
        let f = WrapForm {
            body: "lnbc1qq".to_string(),
            advanced: Some("on".to_string()),
            routing: Some(" 1000 ".to_string()),
        };
        assert_eq!(redirect_location(&f, ""), "/wrap/lnbc1qq?routing_msat=1000");
    }

    #[test]
    fn test_redirect_ignores_routing_without_advanced() {
        let f = WrapForm {
            body: "lnbc1qq".to_string(),
            advanced: None,
            routing: Some("1000".to_string()),
        };
        assert_eq!(redirect_location(&f, ""), "/wrap/lnbc1qq");
    }

    #[test]
    fn test_redirect_preserves_other_query_params() {
        let f = WrapForm {
            body: "lnbc1qq".to_string(),
            advanced: Some("on".to_string()),
            routing: Some("42".to_string()),
        };
        let loc = redirect_location(
            &f,
            "body=lnbc1qq&advanced=on&routing=42&description_hash=abc&routing_msat=7",
        );
        assert_eq!(loc, "/wrap/lnbc1qq?description_hash=abc&routing_msat=42");
    }

    #[test]
    fn test_redirect_escapes_path_segment() {
        let loc = redirect_location(&form("lnbc/../x1qq"), "");
        assert_eq!(loc, "/wrap/lnbc%2F..%2Fx1qq");
    }
}

use std::sync::OnceLock;

use regex::Regex;

// RFC-5322-ish shape check. This gates the login and registration flows; anything stricter belongs to the
// mail subsystem, which is out of scope here.
const EMAIL_PATTERN: &str = r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z0-9-]+\.)+[a-zA-Z]{2,}))$"#;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

pub fn is_valid_email(candidate: &str) -> bool {
    let re = EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"));
    re.is_match(candidate)
}

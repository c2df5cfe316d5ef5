//! Contact - the portfolio's outbound-email endpoint
//!
//! Validates a `{name, email, message}` submission, renders the mail and
//! hands it to a host-provided `MailTransport`. Every outcome maps to an
//! HTTP status plus a `{ok, error?}` JSON body; transport detail is logged,
//! never returned.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

const REQUIRED_SETTINGS: &str = "SMTP_HOST/SMTP_PORT/SMTP_USER/SMTP_PASS/CONTACT_TO/CONTACT_FROM";
const SMTPS_PORT: u16 = 465;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("Invalid JSON body")]
    InvalidJson,
    #[error("Missing required fields")]
    MissingField,
    #[error("Invalid email")]
    InvalidEmail,
    #[error("Server email is not configured. Missing {}.", REQUIRED_SETTINGS)]
    NotConfigured { missing: Vec<&'static str> },
    #[error("mail transport failed: {0}")]
    Transport(String),
}

impl ContactError {
    pub fn status(&self) -> u16 {
        match self {
            ContactError::InvalidJson | ContactError::MissingField | ContactError::InvalidEmail => 400,
            ContactError::NotConfigured { .. } | ContactError::Transport(_) => 500,
        }
    }

    /// What the submitter gets to see
    pub fn public_message(&self) -> String {
        match self {
            ContactError::Transport(_) => "Internal error".to_string(),
            other => other.to_string(),
        }
    }
}

/// SMTP settings resolved from the environment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MailSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub to: String,
    pub from: String,
    /// Implicit TLS
    pub secure: bool,
}

impl MailSettings {
    /// Empty values count as missing; `CONTACT_FROM` falls back to `SMTP_USER`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ContactError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let host = get("SMTP_HOST");
        let port = get("SMTP_PORT").and_then(|p| p.trim().parse::<u16>().ok()).filter(|p| *p != 0);
        let user = get("SMTP_USER");
        let pass = get("SMTP_PASS");
        let to = get("CONTACT_TO");
        let from = get("CONTACT_FROM").or_else(|| user.clone());

        match (host, port, user, pass, to, from) {
            (Some(host), Some(port), Some(user), Some(pass), Some(to), Some(from)) => Ok(Self {
                host,
                port,
                user,
                pass,
                to,
                from,
                secure: port == SMTPS_PORT,
            }),
            (host, port, user, pass, to, from) => {
                let missing = [
                    ("SMTP_HOST", host.is_none()),
                    ("SMTP_PORT", port.is_none()),
                    ("SMTP_USER", user.is_none()),
                    ("SMTP_PASS", pass.is_none()),
                    ("CONTACT_TO", to.is_none()),
                    ("CONTACT_FROM", from.is_none()),
                ]
                .into_iter()
                .filter_map(|(key, absent)| absent.then_some(key))
                .collect();
                Err(ContactError::NotConfigured { missing })
            }
        }
    }

    pub fn from_env() -> Result<Self, ContactError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// A validated submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactRequest {
    pub fn parse(body: &str) -> Result<Self, ContactError> {
        let value: Value = serde_json::from_str(body).map_err(|_| ContactError::InvalidJson)?;
        if value.is_null() {
            return Err(ContactError::InvalidJson);
        }
        let request = Self {
            name: field(&value, "name"),
            email: field(&value, "email"),
            message: field(&value, "message"),
        };
        if request.name.is_empty() || request.email.is_empty() || request.message.is_empty() {
            return Err(ContactError::MissingField);
        }
        if !is_valid_email(&request.email) {
            return Err(ContactError::InvalidEmail);
        }
        Ok(request)
    }
}

/// Any JSON value coerced to trimmed text; absent or null is empty
fn field(body: &Value, key: &str) -> String {
    match body.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

/// `local@domain.tld`: one `@`, no whitespace, a dot inside the domain
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && domain
            .char_indices()
            .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl OutgoingMail {
    pub fn compose(request: &ContactRequest, settings: &MailSettings) -> Self {
        let ContactRequest { name, email, message } = request;
        let html = format!(
            concat!(
                "<div style=\"font-family: ui-sans-serif, system-ui; line-height: 1.5;\">\n",
                "  <h2>New portfolio contact</h2>\n",
                "  <p><b>Name:</b> {}</p>\n",
                "  <p><b>Email:</b> {}</p>\n",
                "  <p><b>Message:</b></p>\n",
                "  <pre style=\"white-space: pre-wrap;\">{}</pre>\n",
                "</div>\n",
            ),
            escape_html(name),
            escape_html(email),
            escape_html(message),
        );
        Self {
            from: format!("Portfolio Contact <{}>", settings.from),
            to: settings.to.clone(),
            reply_to: email.clone(),
            subject: format!("Portfolio contact from {name}"),
            text: format!("Name: {name}\nEmail: {email}\n\n{message}"),
            html,
        }
    }
}

/// SMTP delivery is supplied by the host
pub trait MailTransport {
    fn send(&mut self, settings: &MailSettings, mail: &OutgoingMail) -> Result<(), String>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContactBody {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactResponse {
    pub status: u16,
    pub body: ContactBody,
}

impl ContactResponse {
    pub fn ok() -> Self {
        Self { status: 200, body: ContactBody { ok: true, error: None } }
    }

    pub fn from_error(error: &ContactError) -> Self {
        Self {
            status: error.status(),
            body: ContactBody { ok: false, error: Some(error.public_message()) },
        }
    }

    pub fn body_json(&self) -> String {
        serde_json::to_string(&self.body).unwrap_or_else(|_| r#"{"ok":false}"#.to_string())
    }
}

/// Handle one POST. Input is validated before the configuration is consulted.
pub fn handle_contact<T: MailTransport + ?Sized>(
    body: &str,
    settings: Result<MailSettings, ContactError>,
    transport: &mut T,
) -> ContactResponse {
    match submit(body, settings, transport) {
        Ok(()) => ContactResponse::ok(),
        Err(e) => {
            match &e {
                ContactError::Transport(detail) => log::error!("contact send failed: {detail}"),
                ContactError::NotConfigured { missing } => {
                    log::error!("contact mail not configured, missing {}", missing.join(", "))
                }
                _ => log::debug!("contact rejected: {e}"),
            }
            ContactResponse::from_error(&e)
        }
    }
}

fn submit<T: MailTransport + ?Sized>(
    body: &str,
    settings: Result<MailSettings, ContactError>,
    transport: &mut T,
) -> Result<(), ContactError> {
    let request = ContactRequest::parse(body)?;
    let settings = settings?;
    let mail = OutgoingMail::compose(&request, &settings);
    transport.send(&settings, &mail).map_err(ContactError::Transport)
}

//! Intent model: what the user wants the symbol to carry.

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Wi-Fi authentication scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WifiEncryption {
    #[serde(rename = "WEP")]
    Wep,
    #[serde(rename = "WPA")]
    Wpa,
    #[default]
    #[serde(rename = "WPA2")]
    Wpa2,
    /// Open network; password is never emitted.
    #[serde(rename = "nopass")]
    None,
}

impl WifiEncryption {
    /// Value of the `T:` field. Empty for open networks.
    pub fn as_field(self) -> &'static str {
        match self {
            Self::Wep => "WEP",
            Self::Wpa => "WPA",
            Self::Wpa2 => "WPA2",
            Self::None => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiCredentials {
    pub ssid: String,
    pub password: String,
    pub encryption: WifiEncryption,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactCard {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub organization: String,
    pub title: String,
    pub phone: String,
    pub email: String,
    pub website: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailDraft {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsDraft {
    pub number: String,
    pub message: String,
}

/// A structured request for what the symbol should encode.
///
/// Serialized as `{"type": "...", "data": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Intent {
    Text(String),
    Url(String),
    Wifi(WifiCredentials),
    #[serde(rename = "vcard")]
    Contact(ContactCard),
    Email(EmailDraft),
    Sms(SmsDraft),
}

/// Discriminant of an [`Intent`], used as the stored `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentKind {
    Text,
    Url,
    Wifi,
    #[serde(rename = "vcard")]
    Contact,
    Email,
    Sms,
}

impl IntentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Url => "url",
            Self::Wifi => "wifi",
            Self::Contact => "vcard",
            Self::Email => "email",
            Self::Sms => "sms",
        }
    }
}

impl Intent {
    pub fn text(value: impl Into<String>) -> Result<Self, ValidationError> {
        Self::Text(value.into()).validated()
    }

    pub fn url(value: impl Into<String>) -> Result<Self, ValidationError> {
        Self::Url(value.into()).validated()
    }

    pub fn wifi(credentials: WifiCredentials) -> Result<Self, ValidationError> {
        Self::Wifi(credentials).validated()
    }

    pub fn contact(card: ContactCard) -> Result<Self, ValidationError> {
        Self::Contact(card).validated()
    }

    pub fn email(draft: EmailDraft) -> Result<Self, ValidationError> {
        Self::Email(draft).validated()
    }

    pub fn sms(draft: SmsDraft) -> Result<Self, ValidationError> {
        Self::Sms(draft).validated()
    }

    pub fn kind(&self) -> IntentKind {
        match self {
            Self::Text(_) => IntentKind::Text,
            Self::Url(_) => IntentKind::Url,
            Self::Wifi(_) => IntentKind::Wifi,
            Self::Contact(_) => IntentKind::Contact,
            Self::Email(_) => IntentKind::Email,
            Self::Sms(_) => IntentKind::Sms,
        }
    }

    /// Check that the primary field of the variant is not blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let (value, field) = match self {
            Self::Text(text) => (text.as_str(), "Text"),
            Self::Url(url) => (url.as_str(), "URL"),
            Self::Wifi(w) => (w.ssid.as_str(), "SSID"),
            Self::Contact(c) => (c.full_name.as_str(), "Full name"),
            Self::Email(e) => (e.to.as_str(), "Email address"),
            Self::Sms(s) => (s.number.as_str(), "Phone number"),
        };
        if value.trim().is_empty() {
            return Err(ValidationError::EmptyField { field });
        }
        Ok(())
    }

    fn validated(self) -> Result<Self, ValidationError> {
        self.validate()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_reject_blank_primary_field() {
        assert!(Intent::text("   ").is_err());
        assert!(Intent::url("").is_err());
        assert!(
            Intent::wifi(WifiCredentials {
                password: "secret".into(),
                ..Default::default()
            })
            .is_err()
        );
        assert!(
            Intent::contact(ContactCard {
                first_name: "Jane".into(),
                ..Default::default()
            })
            .is_err()
        );
        assert!(Intent::email(EmailDraft::default()).is_err());
        assert!(
            Intent::sms(SmsDraft {
                message: "hi".into(),
                ..Default::default()
            })
            .is_err()
        );
    }

    #[test]
    fn validation_error_names_the_field() {
        let err = Intent::sms(SmsDraft::default()).unwrap_err();
        assert_eq!(err.field(), "Phone number");
        assert_eq!(err.to_string(), "Phone number cannot be empty");
    }

    #[test]
    fn intent_deserializes_from_tagged_json() {
        let json = r#"{"type":"wifi","data":{"ssid":"Cafe","encryption":"nopass"}}"#;
        let intent: Intent = serde_json::from_str(json).unwrap();
        assert_eq!(
            intent,
            Intent::Wifi(WifiCredentials {
                ssid: "Cafe".into(),
                encryption: WifiEncryption::None,
                ..Default::default()
            })
        );
        assert_eq!(intent.kind(), IntentKind::Wifi);
    }

    #[test]
    fn contact_uses_vcard_tag_and_camel_case_fields() {
        let json = r#"{"type":"vcard","data":{"fullName":"Jane Roe","lastName":"Roe"}}"#;
        let intent: Intent = serde_json::from_str(json).unwrap();
        let Intent::Contact(card) = &intent else {
            panic!("expected contact intent");
        };
        assert_eq!(card.full_name, "Jane Roe");
        assert_eq!(card.last_name, "Roe");
        assert_eq!(intent.kind().as_str(), "vcard");
    }
}

//! Canonical payload encoding for each intent variant.

use tracing::debug;
use url::form_urlencoded;

use crate::intent::{ContactCard, EmailDraft, Intent, SmsDraft, WifiCredentials, WifiEncryption};
use crate::{EncodablePayload, ValidationError};

impl Intent {
    /// Encode the intent into its canonical payload string.
    pub fn encode(&self) -> Result<EncodablePayload, ValidationError> {
        self.validate()?;

        let payload = match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Url(url) => ensure_http_scheme(url.trim()),
            Self::Wifi(w) => wifi_payload(w),
            Self::Contact(c) => vcard_payload(c),
            Self::Email(e) => mailto_payload(e),
            Self::Sms(s) => sms_payload(s),
        };

        debug!(
            kind = self.kind().as_str(),
            len = payload.len(),
            "Encoded payload"
        );
        Ok(EncodablePayload::new(payload))
    }
}

/// Prefix `http://` unless the value already carries an http(s) scheme.
pub fn ensure_http_scheme(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{url}")
    }
}

fn wifi_payload(w: &WifiCredentials) -> String {
    let password = match w.encryption {
        WifiEncryption::None => "",
        _ => w.password.as_str(),
    };
    format!(
        "WIFI:T:{};S:{};P:{};H:{};;",
        w.encryption.as_field(),
        w.ssid,
        password,
        w.hidden
    )
}

fn vcard_payload(c: &ContactCard) -> String {
    let mut lines = vec![
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("N:{};{};;;", c.last_name, c.first_name),
        format!("FN:{}", c.full_name),
    ];

    let optional = [
        ("ORG:", c.organization.as_str()),
        ("TITLE:", c.title.as_str()),
        ("TEL;TYPE=CELL:", c.phone.as_str()),
        ("EMAIL;TYPE=INTERNET:", c.email.as_str()),
    ];
    for (prefix, value) in optional {
        if !value.trim().is_empty() {
            lines.push(format!("{prefix}{value}"));
        }
    }

    if !c.website.trim().is_empty() {
        lines.push(format!("URL:{}", ensure_http_scheme(&c.website)));
    }

    lines.push("END:VCARD".to_string());
    lines.join("\n")
}

fn mailto_payload(e: &EmailDraft) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if !e.subject.trim().is_empty() {
        query.append_pair("subject", &e.subject);
    }
    if !e.body.trim().is_empty() {
        query.append_pair("body", &e.body);
    }
    let query = query.finish();

    if query.is_empty() {
        format!("mailto:{}", e.to)
    } else {
        format!("mailto:{}?{query}", e.to)
    }
}

fn sms_payload(s: &SmsDraft) -> String {
    format!("SMSTO:{}:{}", s.number, s.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(full_name: &str) -> ContactCard {
        ContactCard {
            first_name: "Jane".into(),
            last_name: "Roe".into(),
            full_name: full_name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn wifi_wpa2_payload() {
        let intent = Intent::Wifi(WifiCredentials {
            ssid: "Home".into(),
            password: "secret1".into(),
            encryption: WifiEncryption::Wpa2,
            hidden: false,
        });
        assert_eq!(
            intent.encode().unwrap().as_str(),
            "WIFI:T:WPA2;S:Home;P:secret1;H:false;;"
        );
    }

    #[test]
    fn wifi_open_network_drops_password() {
        for password in ["", "ignored", "p;w"] {
            let intent = Intent::Wifi(WifiCredentials {
                ssid: "Guest".into(),
                password: password.into(),
                encryption: WifiEncryption::None,
                hidden: true,
            });
            let payload = intent.encode().unwrap();
            assert!(payload.as_str().contains("T:;"));
            assert!(payload.as_str().contains("P:;"));
            assert_eq!(payload.as_str(), "WIFI:T:;S:Guest;P:;H:true;;");
        }
    }

    #[test]
    fn wifi_blank_ssid_is_rejected() {
        let intent = Intent::Wifi(WifiCredentials {
            ssid: "  ".into(),
            ..Default::default()
        });
        assert_eq!(
            intent.encode(),
            Err(ValidationError::EmptyField { field: "SSID" })
        );
    }

    #[test]
    fn sms_payload() {
        let intent = Intent::Sms(SmsDraft {
            number: "+15551234567".into(),
            message: "hi".into(),
        });
        assert_eq!(intent.encode().unwrap().as_str(), "SMSTO:+15551234567:hi");
    }

    #[test]
    fn sms_allows_empty_message() {
        let intent = Intent::Sms(SmsDraft {
            number: "123".into(),
            message: String::new(),
        });
        assert_eq!(intent.encode().unwrap().as_str(), "SMSTO:123:");
    }

    #[test]
    fn text_is_trimmed() {
        let intent = Intent::Text("  hello world \n".into());
        assert_eq!(intent.encode().unwrap().as_str(), "hello world");
    }

    #[test]
    fn url_gets_http_prefix() {
        let intent = Intent::Url("  example.com/path ".into());
        let payload = intent.encode().unwrap();
        assert_eq!(payload.as_str(), "http://example.com/path");
    }

    #[test]
    fn url_encoding_is_idempotent() {
        for raw in [
            "example.com",
            "http://a.b",
            "https://secure.example",
            "ftp.example",
        ] {
            let once = Intent::Url(raw.into()).encode().unwrap();
            let twice = Intent::Url(once.to_string()).encode().unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn vcard_minimal_has_fixed_lines() {
        let payload = Intent::Contact(contact("Jane Roe")).encode().unwrap();
        assert_eq!(
            payload.as_str(),
            "BEGIN:VCARD\nVERSION:3.0\nN:Roe;Jane;;;\nFN:Jane Roe\nEND:VCARD"
        );
    }

    #[test]
    fn vcard_optional_lines_in_fixed_order() {
        let card = ContactCard {
            organization: "Acme".into(),
            title: "Engineer".into(),
            phone: "+100".into(),
            email: "jane@acme.test".into(),
            website: "acme.test".into(),
            ..contact("Jane Roe")
        };
        let payload = Intent::Contact(card).encode().unwrap();
        let lines: Vec<&str> = payload.as_str().lines().collect();
        assert_eq!(
            lines,
            vec![
                "BEGIN:VCARD",
                "VERSION:3.0",
                "N:Roe;Jane;;;",
                "FN:Jane Roe",
                "ORG:Acme",
                "TITLE:Engineer",
                "TEL;TYPE=CELL:+100",
                "EMAIL;TYPE=INTERNET:jane@acme.test",
                "URL:http://acme.test",
                "END:VCARD",
            ]
        );
    }

    #[test]
    fn vcard_skips_blank_optional_fields() {
        let card = ContactCard {
            title: "   ".into(),
            email: "jane@acme.test".into(),
            website: "https://acme.test".into(),
            ..contact("Jane Roe")
        };
        let payload = Intent::Contact(card).encode().unwrap();
        assert!(!payload.as_str().contains("TITLE:"));
        assert!(!payload.as_str().contains("ORG:"));
        assert!(!payload.as_str().contains("TEL"));
        assert!(payload.as_str().contains("URL:https://acme.test\n"));
    }

    #[test]
    fn mailto_without_parameters() {
        let intent = Intent::Email(EmailDraft {
            to: "a@b.test".into(),
            subject: " ".into(),
            body: String::new(),
        });
        assert_eq!(intent.encode().unwrap().as_str(), "mailto:a@b.test");
    }

    #[test]
    fn mailto_encodes_subject_and_body() {
        let intent = Intent::Email(EmailDraft {
            to: "a@b.test".into(),
            subject: "Hello there".into(),
            body: "a&b=c".into(),
        });
        assert_eq!(
            intent.encode().unwrap().as_str(),
            "mailto:a@b.test?subject=Hello+there&body=a%26b%3Dc"
        );
    }

    #[test]
    fn mailto_body_only() {
        let intent = Intent::Email(EmailDraft {
            to: "a@b.test".into(),
            subject: String::new(),
            body: "Hi".into(),
        });
        assert_eq!(
            intent.encode().unwrap().as_str(),
            "mailto:a@b.test?body=Hi"
        );
    }
}

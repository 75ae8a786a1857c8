//! Saved generator templates.
//!
//! Four templates are seeded on migration and flagged as built-in; they
//! cannot be deleted. User templates are appended after them.

use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::{Database, DbError, StoredSettings, new_id};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub default_data: Value,
    pub settings: StoredSettings,
    #[serde(default)]
    pub builtin: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub default_data: Value,
    #[serde(default)]
    pub settings: StoredSettings,
}

fn settings(size: u32, error_correction: &str, foreground: &str) -> StoredSettings {
    StoredSettings {
        size,
        margin: 4,
        error_correction: error_correction.into(),
        foreground_color: foreground.into(),
        background_color: "#ffffff".into(),
    }
}

pub fn builtin_templates() -> Vec<Template> {
    vec![
        Template {
            id: "business-card".into(),
            name: "Business Card".into(),
            description: "Professional vCard with company details".into(),
            kind: "vcard".into(),
            default_data: json!({
                "firstName": "John",
                "lastName": "Doe",
                "fullName": "John Doe",
                "organization": "Company Inc.",
                "title": "Software Engineer",
                "phone": "+1234567890",
                "email": "john@company.com",
                "website": "https://company.com",
            }),
            settings: settings(512, "M", "#1f2937"),
            builtin: true,
        },
        Template {
            id: "wifi-guest".into(),
            name: "Guest WiFi".into(),
            description: "Guest network access".into(),
            kind: "wifi".into(),
            default_data: json!({
                "ssid": "Guest Network",
                "password": "",
                "encryption": "nopass",
                "hidden": false,
            }),
            settings: settings(256, "L", "#059669"),
            builtin: true,
        },
        Template {
            id: "website-link".into(),
            name: "Website Link".into(),
            description: "Company or personal website".into(),
            kind: "url".into(),
            default_data: json!({ "url": "https://example.com" }),
            settings: settings(320, "M", "#2563eb"),
            builtin: true,
        },
        Template {
            id: "contact-email".into(),
            name: "Contact Email".into(),
            description: "Pre-filled email with subject".into(),
            kind: "email".into(),
            default_data: json!({
                "to": "contact@company.com",
                "subject": "Contact Request",
                "body": "Hello, I would like to get in touch...",
            }),
            settings: settings(320, "M", "#dc2626"),
            builtin: true,
        },
    ]
}

fn insert_template(
    conn: &Connection,
    template: &Template,
    or_ignore: bool,
) -> Result<(), DbError> {
    let verb = if or_ignore { "INSERT OR IGNORE" } else { "INSERT" };
    conn.execute(
        &format!(
            "{verb} INTO templates
             (id, name, description, kind, default_data_json, settings_json, builtin)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
        ),
        rusqlite::params![
            template.id,
            template.name,
            template.description,
            template.kind,
            serde_json::to_string(&template.default_data)?,
            serde_json::to_string(&template.settings)?,
            template.builtin,
        ],
    )?;
    Ok(())
}

pub(crate) fn seed_builtin_templates(conn: &Connection) -> Result<(), DbError> {
    for template in builtin_templates() {
        insert_template(conn, &template, true)?;
    }
    Ok(())
}

impl Database {
    /// Built-ins first, then user templates in creation order.
    pub fn get_templates(&self) -> Result<Vec<Template>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, description, kind, default_data_json, settings_json, builtin
                 FROM templates ORDER BY seq ASC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, bool>(6)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(id, name, description, kind, data, settings, builtin)| {
                    Ok(Template {
                        id,
                        name,
                        description,
                        kind,
                        default_data: serde_json::from_str(&data)?,
                        settings: serde_json::from_str(&settings)?,
                        builtin,
                    })
                })
                .collect()
        })
    }

    pub fn save_template(&self, template: NewTemplate) -> Result<Template, DbError> {
        if template.name.trim().is_empty() {
            return Err(DbError::InvalidData("template name cannot be empty".into()));
        }

        let template = Template {
            id: new_id(),
            name: template.name,
            description: template.description,
            kind: template.kind,
            default_data: template.default_data,
            settings: template.settings,
            builtin: false,
        };
        self.with_conn(|conn| insert_template(conn, &template, false))?;
        info!(id = %template.id, name = %template.name, "Saved template");
        Ok(template)
    }

    pub fn delete_template(&self, id: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let builtin: Option<bool> = conn
                .query_row("SELECT builtin FROM templates WHERE id = ?1", [id], |row| {
                    row.get(0)
                })
                .optional()?;

            match builtin {
                None => Err(DbError::NotFound(format!("template {id}"))),
                Some(true) => Err(DbError::BuiltinTemplate(id.to_string())),
                Some(false) => {
                    conn.execute("DELETE FROM templates WHERE id = ?1", [id])?;
                    Ok(())
                }
            }
        })
    }
}

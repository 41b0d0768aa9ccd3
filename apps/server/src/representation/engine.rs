use chrono::{NaiveDate, Utc};
use records_models::{AuditInfo, VoidInfo};
use serde::Serialize;
use serde_json::{json, Map, Value as JsonValue};
use uuid::Uuid;

use super::{Level, Representation};
use crate::{Error, Result};

/// Ordered key/value structure returned by every operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SimpleObject(Map<String, JsonValue>);

impl SimpleObject {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn add(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<JsonValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_value(self) -> JsonValue {
        JsonValue::Object(self.0)
    }
}

impl From<SimpleObject> for JsonValue {
    fn from(obj: SimpleObject) -> Self {
        obj.into_value()
    }
}

/// Per-request inputs that are not part of the entity.
#[derive(Debug, Clone)]
pub struct RepresentationContext {
    /// Absolute or root-relative prefix for `links`, e.g. `/ws/rest/v1`.
    pub base_url: String,
    /// Reference date for computed ages.
    pub today: NaiveDate,
}

impl RepresentationContext {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            today: Utc::now().date_naive(),
        }
    }

    pub fn link(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// One entry of a resource property table.
#[derive(Debug, Clone, Copy)]
pub struct Property {
    pub name: &'static str,
    /// Level for linked entities; `None` for scalars.
    pub nested: Option<Level>,
}

impl Property {
    pub const fn scalar(name: &'static str) -> Self {
        Self { name, nested: None }
    }

    pub const fn nested(name: &'static str, level: Level) -> Self {
        Self {
            name,
            nested: Some(level),
        }
    }
}

/// An entity view that knows its own property tables.
pub trait Representable {
    fn resource_name(&self) -> &'static str;

    fn uuid(&self) -> Uuid;

    fn display(&self) -> String;

    /// Path below the base URL used for the `self` link.
    fn self_path(&self) -> String {
        format!("{}/{}", self.resource_name(), self.uuid())
    }

    fn is_voided(&self) -> bool {
        false
    }

    /// Audit block appended at the `full` level.
    fn audit_info(&self) -> Option<SimpleObject> {
        None
    }

    /// Ordered properties for a fixed level. `uuid` and `display` are
    /// resolved by the engine; everything else goes through [`property`].
    ///
    /// [`property`]: Representable::property
    fn properties(&self, level: Level) -> &'static [Property];

    /// Value of a named property. Linked entities are rendered with `repr`.
    /// Returns `Ok(None)` for names the resource does not expose.
    fn property(
        &self,
        name: &str,
        repr: &Representation,
        ctx: &RepresentationContext,
    ) -> Result<Option<JsonValue>>;
}

/// Render an entity at the requested representation.
pub fn represent<R>(
    entity: &R,
    repr: &Representation,
    ctx: &RepresentationContext,
) -> Result<SimpleObject>
where
    R: Representable + ?Sized,
{
    let mut obj = SimpleObject::new();

    match repr {
        Representation::Ref => {
            obj.insert("uuid", entity.uuid().to_string());
            obj.insert("display", entity.display());
            if entity.is_voided() {
                obj.insert("voided", true);
            }
        }
        Representation::Default | Representation::Full => {
            let level = if *repr == Representation::Full {
                Level::Full
            } else {
                Level::Default
            };
            for prop in entity.properties(level) {
                let value = match prop.name {
                    "uuid" => json!(entity.uuid()),
                    "display" => json!(entity.display()),
                    name => {
                        let nested = prop.nested.unwrap_or(Level::Ref).into();
                        entity.property(name, &nested, ctx)?.ok_or_else(|| {
                            Error::Internal(format!(
                                "{} declares property '{name}' but does not provide it",
                                entity.resource_name()
                            ))
                        })?
                    }
                };
                obj.insert(prop.name, value);
            }
            if level == Level::Full {
                if let Some(audit) = entity.audit_info() {
                    obj.insert("auditInfo", audit);
                }
            }
        }
        Representation::Custom(custom) => {
            for field in &custom.fields {
                let value = match field.name.as_str() {
                    "auditInfo" => {
                        return Err(Error::Conversion(
                            "auditInfo is only available in the full representation".to_string(),
                        ))
                    }
                    // Always appended below.
                    "links" => continue,
                    "uuid" => json!(entity.uuid()),
                    "display" => json!(entity.display()),
                    name => {
                        let nested = field.nested.clone().unwrap_or(Representation::Ref);
                        entity.property(name, &nested, ctx)?.ok_or_else(|| {
                            Error::Conversion(format!(
                                "Unknown property '{name}' on {}",
                                entity.resource_name()
                            ))
                        })?
                    }
                };
                obj.insert(&field.name, value);
            }
        }
    }

    obj.insert(
        "links",
        json!([{ "rel": "self", "uri": ctx.link(&entity.self_path()) }]),
    );
    Ok(obj)
}

/// Render a linked entity as a nested value.
pub fn nested<R>(
    entity: &R,
    repr: &Representation,
    ctx: &RepresentationContext,
) -> Result<JsonValue>
where
    R: Representable + ?Sized,
{
    represent(entity, repr, ctx).map(SimpleObject::into_value)
}

/// Render a collection of linked entities.
pub fn nested_list<'a, R, I>(
    entities: I,
    repr: &Representation,
    ctx: &RepresentationContext,
) -> Result<JsonValue>
where
    R: Representable + 'a,
    I: IntoIterator<Item = &'a R>,
{
    entities
        .into_iter()
        .map(|entity| nested(entity, repr, ctx))
        .collect::<Result<Vec<_>>>()
        .map(JsonValue::Array)
}

/// Build the `auditInfo` block from stored audit and void data.
pub fn audit_object(audit: &AuditInfo, void_info: &VoidInfo) -> SimpleObject {
    let mut obj = SimpleObject::new()
        .add("creator", audit.creator.clone())
        .add("dateCreated", json!(audit.date_created))
        .add("changedBy", json!(audit.changed_by))
        .add("dateChanged", json!(audit.date_changed));
    if void_info.voided {
        obj.insert("voidedBy", json!(void_info.voided_by));
        obj.insert("dateVoided", json!(void_info.date_voided));
    }
    obj
}

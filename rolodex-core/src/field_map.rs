//! Flat external attribute names mapped onto the nested entity graph.
//!
//! The alias table is plain `(name, "segment.segment")` pairs. Each path is
//! parsed into a [`FieldPath`] (relations to follow, then one attribute)
//! when the [`FieldMap`] is built, so a bad alias fails at startup instead
//! of on the first request that touches it.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rolodex_model::{Choice, Gender, Identity, ProfileDetails};
use serde_json::{Map, Value};

use crate::error::{Result, RolodexError};

/// External name -> internal path for the user resource.
pub const USER_ALIASES: &[(&str, &str)] = &[
    ("id", "username"),
    ("created", "created"),
    ("modified", "details.modified"),
    ("email", "email"),
    ("name", "details.name"),
    ("url", "details.url"),
    ("bio", "details.bio"),
    ("born", "details.born"),
    ("gender", "details.gender"),
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Node types of the entity graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Identity,
    ProfileDetails,
}

impl EntityKind {
    fn relation(self, segment: &str) -> Option<Relation> {
        match (self, segment) {
            (EntityKind::Identity, "details") => Some(Relation::Details),
            _ => None,
        }
    }

    fn attribute(self, segment: &str) -> Option<Attribute> {
        Attribute::ALL.iter().copied().find(|attribute| {
            attribute.owner() == self && attribute.as_str() == segment
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Identity => "identity",
            EntityKind::ProfileDetails => "profile_details",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edges between entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Identity -> its ProfileDetails (one-to-one).
    Details,
}

impl Relation {
    pub fn target(self) -> EntityKind {
        match self {
            Relation::Details => EntityKind::ProfileDetails,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Details => "details",
        }
    }
}

/// Leaf attributes addressable through the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Username,
    Email,
    Created,
    Name,
    Url,
    Bio,
    Born,
    Gender,
    Modified,
}

impl Attribute {
    const ALL: &'static [Attribute] = &[
        Attribute::Username,
        Attribute::Email,
        Attribute::Created,
        Attribute::Name,
        Attribute::Url,
        Attribute::Bio,
        Attribute::Born,
        Attribute::Gender,
        Attribute::Modified,
    ];

    /// Entity kind the attribute lives on.
    pub fn owner(self) -> EntityKind {
        match self {
            Attribute::Username | Attribute::Email | Attribute::Created => {
                EntityKind::Identity
            }
            Attribute::Name
            | Attribute::Url
            | Attribute::Bio
            | Attribute::Born
            | Attribute::Gender
            | Attribute::Modified => EntityKind::ProfileDetails,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Username => "username",
            Attribute::Email => "email",
            Attribute::Created => "created",
            Attribute::Name => "name",
            Attribute::Url => "url",
            Attribute::Bio => "bio",
            Attribute::Born => "born",
            Attribute::Gender => "gender",
            Attribute::Modified => "modified",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed alias target: relations to traverse, then the attribute to
/// read or write on the entity reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    relations: Vec<Relation>,
    attribute: Attribute,
}

impl FieldPath {
    /// Parse a dotted path expression starting at `root`.
    pub fn parse(root: EntityKind, expr: &str) -> Result<Self> {
        let segments: Vec<&str> = expr.split('.').collect();
        let Some((last, walk)) = segments.split_last() else {
            return Err(RolodexError::UnknownField(expr.to_string()));
        };

        let mut current = root;
        let mut relations = Vec::with_capacity(walk.len());
        for segment in walk {
            let relation = current.relation(segment).ok_or_else(|| {
                RolodexError::UnknownField(format!(
                    "{expr}: '{segment}' is not a relation of {current}"
                ))
            })?;
            relations.push(relation);
            current = relation.target();
        }

        let attribute = current.attribute(last).ok_or_else(|| {
            RolodexError::UnknownField(format!(
                "{expr}: '{last}' is not an attribute of {current}"
            ))
        })?;

        Ok(Self {
            relations,
            attribute,
        })
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn attribute(&self) -> Attribute {
        self.attribute
    }
}

/// A value read from or written to an entity attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Gender(Gender),
}

impl FieldValue {
    /// External JSON form: RFC 3339 timestamps, `YYYY-MM-DD` dates, choice
    /// labels.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Text(text) => Value::String(text.clone()),
            FieldValue::Date(date) => {
                Value::String(date.format(DATE_FORMAT).to_string())
            }
            FieldValue::Timestamp(ts) => Value::String(ts.to_rfc3339()),
            FieldValue::Gender(gender) => {
                Value::String(gender.label().to_string())
            }
        }
    }

    /// Parse an external JSON value destined for `attribute`.
    pub fn from_external(attribute: Attribute, value: &Value) -> Result<Self> {
        if value.is_null() {
            return Ok(FieldValue::Null);
        }

        match attribute {
            Attribute::Born => value
                .as_str()
                .and_then(|raw| NaiveDate::parse_from_str(raw, DATE_FORMAT).ok())
                .map(FieldValue::Date)
                .ok_or_else(|| {
                    RolodexError::BadRequest(
                        "born must be a date in YYYY-MM-DD format".to_string(),
                    )
                }),
            Attribute::Gender => value
                .as_str()
                .and_then(Gender::from_label)
                .map(FieldValue::Gender)
                .ok_or_else(|| {
                    RolodexError::BadRequest(Gender::constraint_message())
                }),
            Attribute::Created | Attribute::Modified => value
                .as_str()
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map(|ts| FieldValue::Timestamp(ts.with_timezone(&Utc)))
                .ok_or_else(|| {
                    RolodexError::BadRequest(format!(
                        "{attribute} must be an RFC 3339 timestamp"
                    ))
                }),
            Attribute::Username
            | Attribute::Email
            | Attribute::Name
            | Attribute::Url
            | Attribute::Bio => value
                .as_str()
                .map(|text| FieldValue::Text(text.to_string()))
                .ok_or_else(|| {
                    RolodexError::BadRequest(format!(
                        "{attribute} must be a string"
                    ))
                }),
        }
    }
}

/// A node of the entity graph the map can traverse.
pub trait Record {
    fn kind(&self) -> EntityKind;

    fn get(&self, attribute: Attribute) -> Result<FieldValue>;

    fn set(&mut self, attribute: Attribute, value: FieldValue) -> Result<()>;

    fn related(&self, relation: Relation) -> Option<&dyn Record>;

    fn related_mut(&mut self, relation: Relation) -> Option<&mut dyn Record>;
}

fn not_on(kind: EntityKind, attribute: Attribute) -> RolodexError {
    RolodexError::UnknownField(format!("{attribute} is not an attribute of {kind}"))
}

fn mismatch(attribute: Attribute, value: &FieldValue) -> RolodexError {
    RolodexError::InvalidValue(format!("{attribute} cannot hold {value:?}"))
}

fn optional_text(
    attribute: Attribute,
    value: FieldValue,
) -> Result<Option<String>> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Text(text) => Ok(Some(text)),
        other => Err(mismatch(attribute, &other)),
    }
}

fn text_or_null(value: &Option<String>) -> FieldValue {
    value
        .as_ref()
        .map_or(FieldValue::Null, |text| FieldValue::Text(text.clone()))
}

impl Record for Identity {
    fn kind(&self) -> EntityKind {
        EntityKind::Identity
    }

    fn get(&self, attribute: Attribute) -> Result<FieldValue> {
        match attribute {
            Attribute::Username => Ok(FieldValue::Text(self.username.clone())),
            Attribute::Email => Ok(FieldValue::Text(self.email.clone())),
            Attribute::Created => Ok(FieldValue::Timestamp(self.created)),
            other => Err(not_on(self.kind(), other)),
        }
    }

    fn set(&mut self, attribute: Attribute, value: FieldValue) -> Result<()> {
        match (attribute, value) {
            (Attribute::Email, FieldValue::Text(email)) => {
                self.email = email;
                Ok(())
            }
            (Attribute::Username | Attribute::Created, _) => Err(
                RolodexError::InvalidValue(format!("{attribute} is read-only")),
            ),
            (Attribute::Email, other) => Err(mismatch(attribute, &other)),
            (other, _) => Err(not_on(EntityKind::Identity, other)),
        }
    }

    fn related(&self, relation: Relation) -> Option<&dyn Record> {
        match relation {
            Relation::Details => Some(&self.details),
        }
    }

    fn related_mut(&mut self, relation: Relation) -> Option<&mut dyn Record> {
        match relation {
            Relation::Details => Some(&mut self.details),
        }
    }
}

impl Record for ProfileDetails {
    fn kind(&self) -> EntityKind {
        EntityKind::ProfileDetails
    }

    fn get(&self, attribute: Attribute) -> Result<FieldValue> {
        Ok(match attribute {
            Attribute::Name => text_or_null(&self.name),
            Attribute::Url => text_or_null(&self.url),
            Attribute::Bio => text_or_null(&self.bio),
            Attribute::Born => {
                self.born.map_or(FieldValue::Null, FieldValue::Date)
            }
            Attribute::Gender => {
                self.gender.map_or(FieldValue::Null, FieldValue::Gender)
            }
            Attribute::Modified => FieldValue::Timestamp(self.modified),
            other => return Err(not_on(self.kind(), other)),
        })
    }

    fn set(&mut self, attribute: Attribute, value: FieldValue) -> Result<()> {
        match attribute {
            Attribute::Name => self.name = optional_text(attribute, value)?,
            Attribute::Url => self.url = optional_text(attribute, value)?,
            Attribute::Bio => self.bio = optional_text(attribute, value)?,
            Attribute::Born => {
                self.born = match value {
                    FieldValue::Null => None,
                    FieldValue::Date(date) => Some(date),
                    other => return Err(mismatch(attribute, &other)),
                }
            }
            Attribute::Gender => {
                self.gender = match value {
                    FieldValue::Null => None,
                    FieldValue::Gender(gender) => Some(gender),
                    other => return Err(mismatch(attribute, &other)),
                }
            }
            Attribute::Modified => {
                self.modified = match value {
                    FieldValue::Timestamp(ts) => ts,
                    other => return Err(mismatch(attribute, &other)),
                }
            }
            other => return Err(not_on(self.kind(), other)),
        }
        Ok(())
    }

    fn related(&self, _relation: Relation) -> Option<&dyn Record> {
        None
    }

    fn related_mut(&mut self, _relation: Relation) -> Option<&mut dyn Record> {
        None
    }
}

/// Validated alias table. Read-only once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct FieldMap {
    entries: Vec<(&'static str, FieldPath)>,
}

impl FieldMap {
    /// Parse every alias up front. Any path that does not resolve against
    /// the entity graph fails with [`RolodexError::UnknownField`].
    pub fn new(
        root: EntityKind,
        aliases: &[(&'static str, &'static str)],
    ) -> Result<Self> {
        let entries = aliases
            .iter()
            .map(|(name, expr)| Ok((*name, FieldPath::parse(root, expr)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// The user resource map.
    pub fn for_identity() -> Result<Self> {
        Self::new(EntityKind::Identity, USER_ALIASES)
    }

    pub fn resolve(&self, name: &str) -> Result<&FieldPath> {
        self.entries
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, path)| path)
            .ok_or_else(|| RolodexError::UnknownField(name.to_string()))
    }

    /// External names, in table order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn read(&self, record: &dyn Record, name: &str) -> Result<FieldValue> {
        let path = self.resolve(name)?;
        let mut target = record;
        for relation in path.relations() {
            target = target
                .related(*relation)
                .ok_or_else(|| broken_relation(name, *relation))?;
        }
        target.get(path.attribute())
    }

    pub fn write(
        &self,
        record: &mut dyn Record,
        name: &str,
        value: FieldValue,
    ) -> Result<()> {
        let path = self.resolve(name)?;
        let mut target = record;
        for relation in path.relations() {
            target = target
                .related_mut(*relation)
                .ok_or_else(|| broken_relation(name, *relation))?;
        }
        target.set(path.attribute(), value)
    }

    /// Every mapped field of `record`, keyed by external name.
    pub fn render(&self, record: &dyn Record) -> Result<Map<String, Value>> {
        let mut rendered = Map::new();
        for name in self.names() {
            rendered.insert(name.to_string(), self.read(record, name)?.to_json());
        }
        Ok(rendered)
    }
}

fn broken_relation(name: &str, relation: Relation) -> RolodexError {
    RolodexError::Internal(format!(
        "{name}: relation '{}' is not loaded",
        relation.as_str()
    ))
}

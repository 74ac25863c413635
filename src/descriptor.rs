//! Schema descriptor documents (JSON, or YAML by file extension).
//!
//! Decoding is a two-step process: the document is deserialized into the
//! plain data-only [`SchemaDescriptor`], then [`SchemaDescriptor::normalize`]
//! fills every absent property with its default and builds the immutable
//! [`Schema`]. Key lists (`primaryKey`, `foreignKeys.fields`,
//! `foreignKeys.reference.fields`) accept either one name or a list of names
//! through [`KeyList`].

use std::{
    fmt,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
    str::FromStr,
};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, SeqAccess, Visitor},
};

use crate::{
    error::{Error, Result},
    field::{
        DEFAULT_BARE_NUMBER, DEFAULT_DECIMAL_CHAR, DEFAULT_FALSE_VALUES, DEFAULT_FIELD_FORMAT,
        DEFAULT_GROUP_CHAR, DEFAULT_TRUE_VALUES, Field, FieldType,
    },
    schema::{DEFAULT_MISSING_VALUES, ForeignKey, ForeignKeyReference, Schema},
};

/// One field name or a list of field names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyList {
    Single(String),
    Multiple(Vec<String>),
}

impl KeyList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            KeyList::Single(name) => vec![name],
            KeyList::Multiple(names) => names,
        }
    }
}

impl Serialize for KeyList {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            KeyList::Single(name) => serializer.serialize_str(name),
            KeyList::Multiple(names) => names.serialize(serializer),
        }
    }
}

struct KeyListVisitor;

impl<'de> Visitor<'de> for KeyListVisitor {
    type Value = KeyList;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a field name or a list of field names")
    }

    fn visit_str<E>(self, value: &str) -> std::result::Result<KeyList, E>
    where
        E: de::Error,
    {
        Ok(KeyList::Single(value.to_string()))
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<KeyList, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut names = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(name) = seq.next_element::<String>()? {
            names.push(name);
        }
        Ok(KeyList::Multiple(names))
    }
}

impl<'de> Deserialize<'de> for KeyList {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(KeyListVisitor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub false_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal_char: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_char: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bare_number: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyReferenceDescriptor {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<KeyList>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<KeyList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ForeignKeyReferenceDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDescriptor {
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<KeyList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_keys: Option<ForeignKeyDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_values: Option<Vec<String>>,
}

fn defaults(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl FieldDescriptor {
    pub fn normalize(self) -> Field {
        let field_type = self
            .field_type
            .filter(|ty| !ty.is_empty())
            .map(|ty| {
                let Ok(parsed) = FieldType::from_str(&ty);
                parsed
            })
            .unwrap_or_default();
        Field {
            name: self.name,
            field_type,
            format: self
                .format
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| DEFAULT_FIELD_FORMAT.to_string()),
            title: self.title,
            description: self.description,
            true_values: self
                .true_values
                .unwrap_or_else(|| defaults(DEFAULT_TRUE_VALUES)),
            false_values: self
                .false_values
                .unwrap_or_else(|| defaults(DEFAULT_FALSE_VALUES)),
            decimal_char: self
                .decimal_char
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_DECIMAL_CHAR.to_string()),
            group_char: self
                .group_char
                .unwrap_or_else(|| DEFAULT_GROUP_CHAR.to_string()),
            bare_number: self.bare_number.unwrap_or(DEFAULT_BARE_NUMBER),
        }
    }

    /// Describes a field, omitting configuration that equals the defaults.
    pub fn from_field(field: &Field) -> Self {
        let non_default = |values: &[String], default: &[&str]| {
            let is_default = values.len() == default.len()
                && values.iter().zip(default).all(|(v, d)| v == d);
            (!is_default).then(|| values.to_vec())
        };
        FieldDescriptor {
            name: field.name.clone(),
            field_type: Some(field.field_type.to_string()),
            format: Some(field.format.clone()),
            title: field.title.clone(),
            description: field.description.clone(),
            true_values: non_default(&field.true_values, DEFAULT_TRUE_VALUES),
            false_values: non_default(&field.false_values, DEFAULT_FALSE_VALUES),
            decimal_char: (field.decimal_char != DEFAULT_DECIMAL_CHAR)
                .then(|| field.decimal_char.clone()),
            group_char: (field.group_char != DEFAULT_GROUP_CHAR).then(|| field.group_char.clone()),
            bare_number: (field.bare_number != DEFAULT_BARE_NUMBER).then_some(field.bare_number),
        }
    }
}

impl SchemaDescriptor {
    pub fn normalize(self) -> Schema {
        let foreign_keys = self.foreign_keys.unwrap_or_default();
        let reference = foreign_keys.reference.unwrap_or_default();
        Schema {
            fields: self
                .fields
                .into_iter()
                .map(FieldDescriptor::normalize)
                .collect(),
            primary_key: self.primary_key.map(KeyList::into_vec).unwrap_or_default(),
            foreign_keys: ForeignKey {
                fields: foreign_keys.fields.map(KeyList::into_vec).unwrap_or_default(),
                reference: ForeignKeyReference {
                    resource: reference.resource,
                    fields: reference.fields.map(KeyList::into_vec).unwrap_or_default(),
                },
            },
            missing_values: self
                .missing_values
                .unwrap_or_else(|| defaults(DEFAULT_MISSING_VALUES)),
        }
    }

    pub fn from_schema(schema: &Schema) -> Self {
        let missing_values = (schema.missing_values != defaults(DEFAULT_MISSING_VALUES))
            .then(|| schema.missing_values.clone());
        let foreign_keys = (!schema.foreign_keys.is_empty()).then(|| {
            let reference = &schema.foreign_keys.reference;
            ForeignKeyDescriptor {
                fields: Some(KeyList::Multiple(schema.foreign_keys.fields.clone())),
                reference: Some(ForeignKeyReferenceDescriptor {
                    resource: reference.resource.clone(),
                    fields: Some(KeyList::Multiple(reference.fields.clone())),
                }),
            }
        });
        SchemaDescriptor {
            fields: schema.fields.iter().map(FieldDescriptor::from_field).collect(),
            primary_key: (!schema.primary_key.is_empty())
                .then(|| KeyList::Multiple(schema.primary_key.clone())),
            foreign_keys,
            missing_values,
        }
    }
}

fn is_yaml_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"))
}

impl Schema {
    /// Reads a JSON descriptor. The schema is not validated.
    pub fn read<R: Read>(reader: R) -> Result<Self> {
        let descriptor: SchemaDescriptor = serde_json::from_reader(reader)?;
        Ok(descriptor.normalize())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let descriptor: SchemaDescriptor = serde_json::from_str(json)?;
        Ok(descriptor.normalize())
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let descriptor: SchemaDescriptor = serde_yaml::from_str(yaml)?;
        Ok(descriptor.normalize())
    }

    /// Loads a descriptor file; `.yml`/`.yaml` files are read as YAML,
    /// everything else as JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        if is_yaml_path(path) {
            let descriptor: SchemaDescriptor = serde_yaml::from_reader(reader)?;
            Ok(descriptor.normalize())
        } else {
            Schema::read(reader)
        }
    }

    pub fn descriptor(&self) -> SchemaDescriptor {
        SchemaDescriptor::from_schema(self)
    }

    /// Writes the descriptor as pretty-printed JSON.
    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, &self.descriptor())?;
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.descriptor())?)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.descriptor())?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        if is_yaml_path(path) {
            serde_yaml::to_writer(&mut writer, &self.descriptor())?;
        } else {
            self.write(&mut writer)?;
        }
        writer.flush().map_err(Error::from)
    }
}

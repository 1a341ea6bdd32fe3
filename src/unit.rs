use std::fmt;

/// An in-memory unit file: named sections, each holding `Key=Value` entries.
///
/// Sections and the entries inside them keep the order they were first inserted in, which is
/// also the order they are rendered in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitFile {
    sections: Vec<Section>,
}

impl UnitFile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name() == name)
    }

    /// Returns the section called `name`, appending an empty one if it does not exist yet.
    pub fn section_mut(&mut self, name: &str) -> &mut Section {
        let i = match self.sections.iter().position(|section| section.name() == name) {
            Some(i) => i,
            None => {
                self.sections.push(Section::new(name.to_owned()));
                self.sections.len() - 1
            }
        };

        &mut self.sections[i]
    }

    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&Value> {
        self.section(section).and_then(|section| section.get(key))
    }

    /// Shorthand for `self.section_mut(section).set(key, value)`.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<Value>) {
        self.section_mut(section).set(key, value);
    }

    /// Renders the unit file text, without a trailing newline.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for UnitFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::<String>::with_capacity(32);

        for section in &self.sections {
            lines.push(format!("[{}]", section.name()));

            for entry in section.entries() {
                lines.extend(entry.value().iter().map(|v| format!("{}={v}", entry.key())));
            }

            lines.push(String::new());
        }

        f.write_str(lines.join("\n").trim_end())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<Entry>,
}

impl Section {
    #[must_use]
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            entries: Vec::with_capacity(8),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|entry| entry.key() == key)
            .map(Entry::value)
    }

    /// Replaces the value of `key`, keeping its position, or appends a new entry.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let value = value.into();

        match self.entries.iter_mut().find(|entry| entry.key() == key) {
            Some(entry) => entry.value = value,
            None => self.entries.push(Entry::new(key.to_owned(), value)),
        }
    }

    /// Appends `value` to whatever `key` already holds, turning it into a list.
    pub fn append(&mut self, key: &str, value: String) {
        match self.entries.iter_mut().find(|entry| entry.key() == key) {
            Some(entry) => entry.value.push(value),
            None => self
                .entries
                .push(Entry::new(key.to_owned(), Value::List(vec![value]))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: String,
    value: Value,
}

impl Entry {
    #[must_use]
    pub(crate) fn new(key: String, value: Value) -> Self {
        Self { key, value }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// A single value, or the values of a key that is repeated once per element (e.g. `ListenStream`).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Raw(String),
    List(Vec<String>),
}

impl Value {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            Value::Raw(value) => std::slice::from_ref(value),
            Value::List(values) => values,
        };

        values.iter().map(String::as_str)
    }

    /// Coerces `self` into a list and appends `value` to it.
    pub fn push(&mut self, value: String) {
        if let Value::Raw(raw) = self {
            let first = std::mem::take(raw);
            *self = Value::List(vec![first]);
        }

        if let Value::List(values) = self {
            values.push(value);
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Raw(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Raw(value.to_owned())
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::List(value)
    }
}

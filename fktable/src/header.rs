//! Provides the [`FkHeader`] tag store, which holds the metadata of an FK table.
//!
//! A header is a sequence of sections. Key-value sections start with a line `_Title____...`,
//! blobs with a line `{Title____...`; both are padded with underscores to [`SECTION_WIDTH`]
//! characters. Entries of key-value sections have the form `*KEY: value`, blobs contain free text.
//! The header is terminated by the `FastKernel` blob line, after which the data lines follow.

use super::error::{Error, Result};
use std::fmt::{self, Display, Formatter};
use std::io::{BufRead, Write};

/// Width of the section lines.
pub const SECTION_WIDTH: usize = 60;

/// First character of key-value section lines.
pub const DELIN_SECTION: char = '_';

/// First character of blob section lines.
pub const DELIN_BLOB: char = '{';

/// First character of key-value entries and of the delimiting lines of c-factor files.
pub const DELIN_KEY: char = '*';

/// Title of the blob that terminates the header.
pub const FAST_KERNEL: &str = "FastKernel";

/// Blobs written in this order before any other blob; the key-value sections are interleaved as
/// done by [`FkHeader::write`].
const GRID_DESC: &str = "GridDesc";
const FLAVOUR_MAP: &str = "FlavourMap";
const X_GRID: &str = "xGrid";

/// Sections of an [`FkHeader`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Section {
    /// Versions of the programs that generated the table.
    VersionInfo,
    /// Dimensions and name of the table.
    GridInfo,
    /// Theory parameters, among them the initial scale `Q0`.
    TheoryInfo,
    /// Free-text blobs, keyed by their title.
    Blob,
}

impl Section {
    /// Returns the title of the section as it appears in the section line. Blobs have individual
    /// titles, which are their keys.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::VersionInfo => "VersionInfo",
            Self::GridInfo => "GridInfo",
            Self::TheoryInfo => "TheoryInfo",
            Self::Blob => "Blob",
        }
    }

    fn from_title(title: &str) -> Option<Self> {
        match title {
            "VersionInfo" => Some(Self::VersionInfo),
            "GridInfo" => Some(Self::GridInfo),
            "TheoryInfo" => Some(Self::TheoryInfo),
            _ => None,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::VersionInfo => 0,
            Self::GridInfo => 1,
            Self::TheoryInfo => 2,
            Self::Blob => 3,
        }
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Conversion of tag values into typed values, see [`FkHeader::get_tag`].
pub trait FromTag: Sized {
    /// Parses `value`, returning `None` if this isn't possible.
    fn from_tag(value: &str) -> Option<Self>;
}

macro_rules! impl_from_tag {
    ($($t:ty),*) => {
        $(
            impl FromTag for $t {
                fn from_tag(value: &str) -> Option<Self> {
                    value.trim().parse().ok()
                }
            }
        )*
    };
}

impl_from_tag!(i32, i64, u32, u64, usize, f32, f64);

impl FromTag for String {
    fn from_tag(value: &str) -> Option<Self> {
        Some(value.to_owned())
    }
}

impl FromTag for bool {
    fn from_tag(value: &str) -> Option<Self> {
        match value.trim() {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        }
    }
}

enum Current {
    KeyValue(Section),
    Blob(String, Vec<String>),
}

/// Tag store containing the metadata of an FK table, organized in [`Section`]s. The order in
/// which tags were added is preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FkHeader {
    sections: [Vec<(String, String)>; 4],
}

impl FkHeader {
    /// Constructs an empty header.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a header from `reader`. Reading stops right after the `FastKernel` section line, so
    /// that `reader` is positioned at the first data line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::File`] if reading fails and [`Error::Format`] if the header is malformed
    /// or not terminated.
    pub fn read(reader: &mut impl BufRead) -> Result<Self> {
        let mut header = Self::new();
        let mut current = None;

        for line in reader.by_ref().lines() {
            let line = line.map_err(|err| Error::File(format!("failed to read header: {err}")))?;
            let first = line.chars().next();

            if matches!(first, Some(DELIN_SECTION | DELIN_BLOB)) {
                if let Some(Current::Blob(title, lines)) = current.take() {
                    header.push_blob(title, &lines)?;
                }

                let title = line[1..].trim_end().trim_end_matches(DELIN_SECTION);

                // a line consisting only of underscores separates sections
                if title.is_empty() {
                    continue;
                }

                if title == FAST_KERNEL {
                    return Ok(header);
                }

                current = Some(if first == Some(DELIN_BLOB) {
                    Current::Blob(title.to_owned(), Vec::new())
                } else {
                    Current::KeyValue(Section::from_title(title).ok_or_else(|| {
                        Error::Format(format!("unknown header section `{title}`"))
                    })?)
                });

                continue;
            }

            match &mut current {
                None => {
                    if !line.trim().is_empty() {
                        return Err(Error::Format(format!(
                            "unexpected line before the first header section: `{line}`"
                        )));
                    }
                }
                Some(Current::KeyValue(section)) => {
                    let entry = line.trim();

                    if entry.is_empty() {
                        continue;
                    }

                    let (key, value) = entry
                        .strip_prefix(DELIN_KEY)
                        .and_then(|entry| entry.split_once(':'))
                        .ok_or_else(|| {
                            Error::Format(format!("malformed entry in section `{section}`: `{entry}`"))
                        })?;

                    header.add_tag(*section, key.trim(), value.trim())?;
                }
                Some(Current::Blob(_, lines)) => lines.push(line),
            }
        }

        Err(Error::Format(format!(
            "header is not terminated by a `{FAST_KERNEL}` section"
        )))
    }

    fn push_blob(&mut self, title: String, lines: &[String]) -> Result<()> {
        let text = lines.join("\n");
        self.add_tag(Section::Blob, &title, text.trim_end())
    }

    /// Returns the raw value of the tag `key` in `section`.
    #[must_use]
    pub fn tag(&self, section: Section, key: &str) -> Option<&str> {
        self.sections[section.index()]
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v.as_str()))
    }

    /// Returns the value of the tag `key` in `section`, converted to `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] if the tag doesn't exist or can not be converted.
    pub fn get_tag<T: FromTag>(&self, section: Section, key: &str) -> Result<T> {
        let value = self.tag(section, key).ok_or_else(|| {
            Error::Format(format!("missing tag `{key}` in section `{section}`"))
        })?;

        T::from_tag(value).ok_or_else(|| {
            Error::Format(format!(
                "could not convert tag `{key}` in section `{section}`: `{value}`"
            ))
        })
    }

    /// Returns `true` if the tag `key` exists in `section`.
    #[must_use]
    pub fn has_tag(&self, section: Section, key: &str) -> bool {
        self.tag(section, key).is_some()
    }

    /// Returns `true` if `section` contains at least one tag.
    #[must_use]
    pub fn has_section(&self, section: Section) -> bool {
        !self.sections[section.index()].is_empty()
    }

    /// Iterates over all tags of `section` in the order they were added.
    pub fn tags(&self, section: Section) -> impl Iterator<Item = (&str, &str)> {
        self.sections[section.index()]
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Adds a new tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] if the tag already exists.
    pub fn add_tag(&mut self, section: Section, key: &str, value: impl Display) -> Result<()> {
        if self.has_tag(section, key) {
            return Err(Error::Format(format!(
                "tag `{key}` in section `{section}` already exists"
            )));
        }

        self.sections[section.index()].push((key.to_owned(), value.to_string()));

        Ok(())
    }

    /// Sets the tag `key` to `value`, replacing a previous value in place or adding the tag.
    pub fn set_tag(&mut self, section: Section, key: &str, value: impl Display) {
        let entries = &mut self.sections[section.index()];

        if let Some((_, old)) = entries.iter_mut().find(|(k, _)| k == key) {
            *old = value.to_string();
        } else {
            entries.push((key.to_owned(), value.to_string()));
        }
    }

    /// Removes the tag `key` from `section` and returns its value.
    pub fn remove_tag(&mut self, section: Section, key: &str) -> Option<String> {
        let entries = &mut self.sections[section.index()];
        let index = entries.iter().position(|(k, _)| k == key)?;

        Some(entries.remove(index).1)
    }

    /// Returns the section line of a section with `title`.
    #[must_use]
    pub fn section_header(title: &str, blob: bool) -> String {
        let delin = if blob { DELIN_BLOB } else { DELIN_SECTION };
        format!("{:_<SECTION_WIDTH$}", format!("{delin}{title}"))
    }

    fn write_blob(&self, writer: &mut impl Write, title: &str) -> std::io::Result<()> {
        if let Some(text) = self.tag(Section::Blob, title) {
            writeln!(writer, "{}", Self::section_header(title, true))?;
            writeln!(writer, "{text}")?;
        }

        Ok(())
    }

    fn write_section(&self, writer: &mut impl Write, section: Section) -> std::io::Result<()> {
        if self.has_section(section) {
            writeln!(writer, "{}", Self::section_header(section.title(), false))?;

            for (key, value) in self.tags(section) {
                writeln!(writer, "{DELIN_KEY}{key}: {value}")?;
            }
        }

        Ok(())
    }

    /// Writes the header, including the terminating `FastKernel` section line, to `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::File`] if writing fails.
    pub fn write(&self, mut writer: impl Write) -> Result<()> {
        let mut write = || -> std::io::Result<()> {
            self.write_blob(&mut writer, GRID_DESC)?;
            self.write_section(&mut writer, Section::VersionInfo)?;
            self.write_section(&mut writer, Section::GridInfo)?;
            self.write_blob(&mut writer, FLAVOUR_MAP)?;
            self.write_section(&mut writer, Section::TheoryInfo)?;
            self.write_blob(&mut writer, X_GRID)?;

            for (title, _) in self
                .tags(Section::Blob)
                .filter(|(title, _)| ![GRID_DESC, FLAVOUR_MAP, X_GRID].contains(title))
            {
                self.write_blob(&mut writer, title)?;
            }

            writeln!(writer, "{}", Self::section_header(FAST_KERNEL, true))
        };

        write().map_err(|err| Error::File(format!("failed to write header: {err}")))
    }
}

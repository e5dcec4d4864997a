//! Commit object
//!
//! ## Format
//!
//! ```text
//! tree <tree-sha>
//! parent <parent-sha>            (absent for a root commit)
//! author <name> <<email>> <unix-ts> <±hhmm>
//! committer <name> <<email>> <unix-ts> <±hhmm>
//!
//! <message>
//! ```
//!
//! The message is kept byte-for-byte, trailing newline included. Merge
//! commits (more than one parent) are not supported.

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, Local};

/// Identity of an author or committer at a point in time.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: DateTime<FixedOffset>,
}

impl Author {
    /// Create an identity stamped with the current local time.
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(name: String, email: String, timestamp: DateTime<FixedOffset>) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// `Name <email>`
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// `Name <email> <unix-ts> <±hhmm>`
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// Read the author identity from `GIT_AUTHOR_NAME`, `GIT_AUTHOR_EMAIL`
    /// and the optional `GIT_AUTHOR_DATE`.
    pub fn load_from_env() -> Result<Self> {
        let name = required_var("GIT_AUTHOR_NAME")?;
        let email = required_var("GIT_AUTHOR_EMAIL")?;

        match std::env::var("GIT_AUTHOR_DATE").ok() {
            Some(date) => Ok(Author::new_with_timestamp(name, email, parse_date(&date)?)),
            None => Ok(Author::new(name, email)),
        }
    }

    /// Read the committer identity from `GIT_COMMITTER_*`, taking each
    /// missing field from `author`.
    pub fn load_committer_from_env(author: &Author) -> Result<Self> {
        let name = std::env::var("GIT_COMMITTER_NAME").unwrap_or_else(|_| author.name.clone());
        let email = std::env::var("GIT_COMMITTER_EMAIL").unwrap_or_else(|_| author.email.clone());
        let timestamp = match std::env::var("GIT_COMMITTER_DATE").ok() {
            Some(date) => parse_date(&date)?,
            None => author.timestamp,
        };

        Ok(Author::new_with_timestamp(name, email, timestamp))
    }
}

fn required_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| Error::validation(format!("{key} is not set")))
}

/// Parse a `±hhmm` offset.
fn parse_offset(offset: &str) -> Option<FixedOffset> {
    let (sign, digits) = match offset.as_bytes().first()? {
        b'+' => (1, &offset[1..]),
        b'-' => (-1, &offset[1..]),
        _ => return None,
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Parse `<unix-ts> <±hhmm>`.
fn parse_raw_date(date: &str) -> Option<DateTime<FixedOffset>> {
    let (timestamp, offset) = date.trim().split_once(' ')?;
    let timestamp = timestamp.strip_prefix('@').unwrap_or(timestamp).parse::<i64>().ok()?;
    let offset = parse_offset(offset.trim())?;

    Some(DateTime::from_timestamp(timestamp, 0)?.with_timezone(&offset))
}

/// Accepts `<unix-ts> <±hhmm>`, RFC 2822 and `%Y-%m-%d %H:%M:%S %z`.
pub fn parse_date(date: &str) -> Result<DateTime<FixedOffset>> {
    parse_raw_date(date)
        .or_else(|| DateTime::parse_from_rfc2822(date).ok())
        .or_else(|| DateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S %z").ok())
        .ok_or_else(|| Error::validation(format!("unrecognised date {date:?}")))
}

impl TryFrom<&str> for Author {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        let invalid = || Error::format(format!("invalid identity line {value:?}"));

        let email_start = value.find('<').ok_or_else(invalid)?;
        let email_end = value.rfind('>').ok_or_else(invalid)?;
        if email_end < email_start {
            return Err(invalid());
        }

        let name = value[..email_start].trim_end().to_string();
        let email = value[email_start + 1..email_end].to_string();
        let timestamp = parse_raw_date(&value[email_end + 1..]).ok_or_else(invalid)?;

        Ok(Author {
            name,
            email,
            timestamp,
        })
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    parent: Option<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    pub fn new(
        parent: Option<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        committer: Author,
        message: String,
    ) -> Self {
        Commit {
            parent,
            tree_oid,
            author,
            committer,
            message,
        }
    }

    /// Build a commit from a parent list, rejecting merges.
    pub fn try_new(
        parents: Vec<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        committer: Author,
        message: String,
    ) -> Result<Self> {
        if parents.len() > 1 {
            return Err(Error::unsupported(format!(
                "commits with {} parents",
                parents.len()
            )));
        }

        Ok(Self::new(
            parents.into_iter().next(),
            tree_oid,
            author,
            committer,
            message,
        ))
    }

    /// Join `-m` fragments the way `git commit-tree` does: paragraphs
    /// separated by a blank line, ending in a newline.
    pub fn message_from_fragments<S: AsRef<str>>(fragments: &[S]) -> String {
        let mut message = fragments
            .iter()
            .map(|fragment| fragment.as_ref().trim_end_matches('\n'))
            .collect::<Vec<_>>()
            .join("\n\n");
        message.push('\n');
        message
    }

    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent.as_ref()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn committer(&self) -> &Author {
        &self.committer
    }

    fn text(&self) -> String {
        let mut lines = vec![format!("tree {}", self.tree_oid)];
        if let Some(parent) = &self.parent {
            lines.push(format!("parent {parent}"));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        lines.push(String::new());
        lines.push(self.message.clone());

        lines.join("\n")
    }
}

impl Packable for Commit {
    fn payload(&self) -> Result<Bytes> {
        Ok(Bytes::from(self.text()))
    }
}

impl Unpackable for Commit {
    fn deserialize(payload: Bytes) -> Result<Self> {
        let content = std::str::from_utf8(&payload)
            .map_err(|_| Error::format("commit object is not valid UTF-8"))?;
        let (headers, message) = content
            .split_once("\n\n")
            .ok_or_else(|| Error::format("commit object has no message separator"))?;

        let mut lines = headers.lines();
        let header = |line: Option<&str>, key: &str| -> Result<String> {
            line.and_then(|line| line.strip_prefix(key))
                .and_then(|rest| rest.strip_prefix(' '))
                .map(str::to_string)
                .ok_or_else(|| Error::format(format!("commit object is missing its {key} line")))
        };

        let tree_oid = header(lines.next(), "tree")?;
        let tree_oid = ObjectId::try_parse(&tree_oid)
            .map_err(|_| Error::format(format!("invalid tree id {tree_oid:?} in commit")))?;

        let mut parents = Vec::new();
        let mut next = lines.next();
        while let Some(parent) = next.and_then(|line| line.strip_prefix("parent ")) {
            parents.push(
                ObjectId::try_parse(parent)
                    .map_err(|_| Error::format(format!("invalid parent id {parent:?} in commit")))?,
            );
            next = lines.next();
        }

        let author = Author::try_from(header(next, "author")?.as_str())?;
        let committer = Author::try_from(header(lines.next(), "committer")?.as_str())?;

        Self::try_new(parents, tree_oid, author, committer, message.to_string())
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> Bytes {
        Bytes::from(self.text())
    }
}

//! Front-matter parsing and schema validation

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use super::error::ContentError;
use super::post::{Author, PostStatus};

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// The `author` key accepts a bare name or a full profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorField {
    Name(String),
    Profile(Author),
}

impl AuthorField {
    pub fn into_author(self) -> Author {
        match self {
            AuthorField::Name(name) => Author::named(name),
            AuthorField::Profile(author) => author,
        }
    }
}

/// Front-matter data from a post
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub updated: Option<String>,
    pub author: Option<AuthorField>,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub tags: Vec<String>,
    pub category: Option<String>,
    /// List form; the first entry is used as the category
    #[serde(deserialize_with = "string_or_vec", default)]
    pub categories: Vec<String>,
    pub image: Option<String>,
    pub excerpt: Option<String>,
    pub status: Option<String>,
    pub draft: Option<bool>,
    pub slug: Option<String>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str), ContentError> {
        let content = content.trim_start_matches('\u{feff}').trim_start();

        if content.starts_with("---") {
            return Self::parse_yaml(content);
        }

        if content.starts_with(";;;") {
            return Self::parse_json(content);
        }

        Err(ContentError::MissingFrontMatter)
    }

    fn parse_yaml(content: &str) -> Result<(Self, &str), ContentError> {
        let (opening, rest) = split_first_line(content);
        if opening.trim_end() != "---" {
            return Err(ContentError::MissingFrontMatter);
        }

        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            let trimmed = line.trim_end();
            if trimmed == "---" || trimmed == "..." {
                let yaml_content = &rest[..offset];
                let remaining = rest[offset + line.len()..].trim_start_matches(['\n', '\r']);

                if yaml_content.trim().is_empty() {
                    return Err(ContentError::MissingField("title"));
                }

                let fm = serde_yaml::from_str::<FrontMatter>(yaml_content)
                    .map_err(|e| ContentError::InvalidFrontMatter(e.to_string()))?;
                return Ok((fm, remaining));
            }
            offset += line.len();
        }

        Err(ContentError::UnterminatedFrontMatter)
    }

    fn parse_json(content: &str) -> Result<(Self, &str), ContentError> {
        // JSON front-matter is wrapped in ;;; markers
        let rest = &content[3..];
        let end_pos = rest
            .find(";;;")
            .ok_or(ContentError::UnterminatedFrontMatter)?;
        let json_content = rest[..end_pos].trim();
        let remaining = rest[end_pos + 3..].trim_start_matches(['\n', '\r']);

        let fm: FrontMatter = serde_json::from_str(&format!("{{{}}}", json_content))
            .or_else(|_| serde_json::from_str(json_content))
            .map_err(|e| ContentError::InvalidFrontMatter(e.to_string()))?;

        Ok((fm, remaining))
    }

    /// The required, non-empty title
    pub fn title(&self) -> Result<&str, ContentError> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ContentError::MissingField("title"))
    }

    /// The required publication date
    pub fn published_at(&self) -> Result<DateTime<Utc>, ContentError> {
        let raw = self
            .date
            .as_deref()
            .ok_or(ContentError::MissingField("date"))?;
        parse_date_string(raw).ok_or_else(|| ContentError::InvalidDate {
            field: "date",
            value: raw.to_string(),
        })
    }

    /// The optional last-updated date
    pub fn updated_at(&self) -> Result<Option<DateTime<Utc>>, ContentError> {
        match self.updated.as_deref() {
            None => Ok(None),
            Some(raw) => parse_date_string(raw)
                .map(Some)
                .ok_or_else(|| ContentError::InvalidDate {
                    field: "updated",
                    value: raw.to_string(),
                }),
        }
    }

    /// Publication status; `status` wins over the legacy `draft` flag
    pub fn status(&self) -> Result<PostStatus, ContentError> {
        match self.status.as_deref().map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "draft" => Ok(PostStatus::Draft),
            Some(s) if s == "published" => Ok(PostStatus::Published),
            Some(other) => Err(ContentError::InvalidStatus(other)),
            None if self.draft == Some(true) => Ok(PostStatus::Draft),
            None => Ok(PostStatus::Published),
        }
    }

    /// The single category, falling back to the first of `categories`
    pub fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .or_else(|| self.categories.first().map(String::as_str))
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Tags with blanks removed, order preserved
    pub fn tags(&self) -> Vec<String> {
        self.tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn split_first_line(content: &str) -> (&str, &str) {
    match content.find('\n') {
        Some(i) => (&content[..i], &content[i + 1..]),
        None => (content, ""),
    }
}

/// Parse a date string in various formats; naive values are taken as UTC
pub fn parse_date_string(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15 10:30:00
author: Jane Doe
tags:
  - rust
  - agents
category: Tech
image: /img/hello.png
hero_variant: wide
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title().unwrap(), "Hello World");
        assert_eq!(fm.tags(), vec!["rust", "agents"]);
        assert_eq!(fm.category(), Some("Tech"));
        assert_eq!(fm.image.as_deref(), Some("/img/hello.png"));
        assert_eq!(
            fm.author.clone().unwrap().into_author(),
            Author::named("Jane Doe".to_string())
        );
        assert!(fm.extra.contains_key("hero_variant"));
        assert!(remaining.starts_with("This is the content."));
    }

    #[test]
    fn test_author_profile() {
        let content = r#"---
title: Profiles
date: 2024-01-15
author:
  name: Sam Lee
  avatar: /avatars/sam.png
  bio: Writes about agents.
---
Body
"#;
        let (fm, _) = FrontMatter::parse(content).unwrap();
        let author = fm.author.unwrap().into_author();
        assert_eq!(author.name, "Sam Lee");
        assert_eq!(author.avatar.as_deref(), Some("/avatars/sam.png"));
        assert_eq!(author.bio.as_deref(), Some("Writes about agents."));
    }

    #[test]
    fn test_parse_json_frontmatter() {
        let content = r#";;;
"title": "Test Post",
"date": "2024-02-01",
"tags": ["a", "b"]
;;;

This is content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title().unwrap(), "Test Post");
        assert_eq!(fm.tags(), vec!["a", "b"]);
        assert!(remaining.contains("This is content."));
    }

    #[test]
    fn test_parse_date() {
        let fm = FrontMatter {
            date: Some("2024-01-15 10:30:00".to_string()),
            ..Default::default()
        };

        let dt = fm.published_at().unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 10:30");

        assert!(parse_date_string("2024/03/09").is_some());
        assert!(parse_date_string("2024-03-09T08:00:00+02:00").is_some());
        assert!(parse_date_string("next tuesday").is_none());
    }

    #[test]
    fn test_parse_single_string_tags() {
        let content = r#"---
title: Single Tag Post
date: 2024-01-15
tags: Notes
categories: Blog
---

Content here.
"#;

        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags(), vec!["Notes"]);
        assert_eq!(fm.category(), Some("Blog"));
    }

    #[test]
    fn test_missing_frontmatter_is_error() {
        let err = FrontMatter::parse("# Just markdown\n").unwrap_err();
        assert!(matches!(err, ContentError::MissingFrontMatter));
    }

    #[test]
    fn test_unterminated_frontmatter_is_error() {
        let err = FrontMatter::parse("---\ntitle: Oops\n\nBody").unwrap_err();
        assert!(matches!(err, ContentError::UnterminatedFrontMatter));
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        let err = FrontMatter::parse("---\ntitle: [unclosed\n---\nBody").unwrap_err();
        assert!(matches!(err, ContentError::InvalidFrontMatter(_)));
    }

    #[test]
    fn test_required_fields() {
        let (fm, _) = FrontMatter::parse("---\ndate: 2024-01-01\n---\nBody").unwrap();
        assert!(matches!(fm.title(), Err(ContentError::MissingField("title"))));

        let (fm, _) = FrontMatter::parse("---\ntitle: No date\n---\nBody").unwrap();
        assert!(matches!(
            fm.published_at(),
            Err(ContentError::MissingField("date"))
        ));

        let (fm, _) = FrontMatter::parse("---\ntitle: Bad\ndate: someday\n---\n").unwrap();
        assert!(matches!(
            fm.published_at(),
            Err(ContentError::InvalidDate { field: "date", .. })
        ));
    }

    #[test]
    fn test_status() {
        let (fm, _) = FrontMatter::parse("---\ntitle: A\ndraft: true\n---\n").unwrap();
        assert_eq!(fm.status().unwrap(), PostStatus::Draft);

        let (fm, _) = FrontMatter::parse("---\ntitle: A\nstatus: Published\n---\n").unwrap();
        assert_eq!(fm.status().unwrap(), PostStatus::Published);

        let (fm, _) = FrontMatter::parse("---\ntitle: A\n---\n").unwrap();
        assert_eq!(fm.status().unwrap(), PostStatus::Published);

        let (fm, _) = FrontMatter::parse("---\ntitle: A\nstatus: archived\n---\n").unwrap();
        assert!(matches!(fm.status(), Err(ContentError::InvalidStatus(_))));
    }

    #[test]
    fn test_horizontal_rule_in_body_is_kept() {
        let content = "---\ntitle: Rules\ndate: 2024-01-01\n---\nAbove\n\n---\n\nBelow\n";
        let (_, body) = FrontMatter::parse(content).unwrap();
        assert!(body.contains("Above"));
        assert!(body.contains("Below"));
    }
}

//! Inventory source collaborators.
//!
//! The core never fetches data itself. An [`InventorySource`] hands over the
//! current article list and grouped summary; a [`GroupListing`] answers which
//! codes belong to a group. [`FileSource`] reads both from JSON exports.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::SourceError;
use crate::model::{find_duplicate_code, find_invalid_price, Article, GroupFilter, Resumen};

/// One reading of the inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    pub articles: Vec<Article>,
    pub resumen: Resumen,
}

pub trait InventorySource {
    fn fetch(&self) -> Result<Inventory, SourceError>;
}

pub trait GroupListing {
    fn codes_in(&self, filter: &GroupFilter) -> Result<Vec<String>, SourceError>;
}

/// Reject articles the core cannot reason about.
pub fn validate(articles: &[Article]) -> Result<(), SourceError> {
    if let Some(code) = find_duplicate_code(articles) {
        return Err(SourceError::InvalidArticle {
            code: code.to_string(),
            reason: "duplicate code".to_string(),
        });
    }

    if let Some(article) = find_invalid_price(articles) {
        return Err(SourceError::InvalidArticle {
            code: article.code.clone(),
            reason: format!("invalid price {}", article.price),
        });
    }

    Ok(())
}

/// JSON exports on disk.
///
/// `articles` holds an array of articles. `resumen`, when given, holds the
/// grouped summary; otherwise it is tallied from the articles. `groups`, when
/// given, maps group name to its codes, with `""` for the ungrouped list.
#[derive(Debug, Clone)]
pub struct FileSource {
    pub articles: PathBuf,
    pub resumen: Option<PathBuf>,
    pub groups: Option<PathBuf>,
}

impl FileSource {
    pub fn new(articles: impl Into<PathBuf>) -> Self {
        FileSource {
            articles: articles.into(),
            resumen: None,
            groups: None,
        }
    }

    pub fn with_resumen(mut self, path: impl Into<PathBuf>) -> Self {
        self.resumen = Some(path.into());
        self
    }

    pub fn with_groups(mut self, path: impl Into<PathBuf>) -> Self {
        self.groups = Some(path.into());
        self
    }

    fn articles(&self) -> Result<Vec<Article>, SourceError> {
        let articles: Vec<Article> = read_json(&self.articles)?;
        validate(&articles)?;
        Ok(articles)
    }
}

impl InventorySource for FileSource {
    fn fetch(&self) -> Result<Inventory, SourceError> {
        let articles = self.articles()?;
        let resumen = match &self.resumen {
            Some(path) => read_json(path)?,
            None => Resumen::tally(&articles),
        };

        log::debug!(
            "read {} articles from {}",
            articles.len(),
            self.articles.display()
        );

        Ok(Inventory { articles, resumen })
    }
}

impl GroupListing for FileSource {
    fn codes_in(&self, filter: &GroupFilter) -> Result<Vec<String>, SourceError> {
        let Some(path) = &self.groups else {
            // no listing, fall back to the group field on each article
            return Ok(self
                .articles()?
                .into_iter()
                .filter(|a| filter.matches(a))
                .map(|a| a.code)
                .collect());
        };

        let mut listing: HashMap<String, Vec<String>> = read_json(path)?;
        let key = match filter {
            GroupFilter::Named(name) => name.as_str(),
            GroupFilter::Ungrouped => "",
        };
        Ok(listing.remove(key).unwrap_or_default())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
    let raw = fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| SourceError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Shape accepted for a plain list of codes, either bare or wrapped.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum CodeList {
    Bare(Vec<String>),
    Wrapped { codes: Vec<String> },
}

impl CodeList {
    pub fn into_codes(self) -> Vec<String> {
        match self {
            CodeList::Bare(codes) | CodeList::Wrapped { codes } => codes,
        }
    }
}

/// Read a standalone list of codes, e.g. one group's listing.
pub fn read_codes(path: &Path) -> Result<Vec<String>, SourceError> {
    read_json::<CodeList>(path).map(CodeList::into_codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn resumen_tallied_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let articles = write(
            &dir,
            "articles.json",
            r#"[{"code":"A","available":3,"price":1.0,"group":"X"},{"code":"B","available":2,"price":1.0}]"#,
        );

        let inventory = FileSource::new(articles).fetch().unwrap();
        assert_eq!(inventory.articles.len(), 2);
        assert_eq!(inventory.resumen.total, 5);
        assert_eq!(inventory.resumen.sin_grupo, 2);
    }

    #[test]
    fn malformed_file_is_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let articles = write(&dir, "articles.json", "[{");
        let err = FileSource::new(articles).fetch().unwrap_err();
        assert!(matches!(err, SourceError::Malformed { .. }));
    }

    #[test]
    fn missing_file_is_source_error() {
        let err = FileSource::new("/definitely/not/here.json").fetch().unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[test]
    fn negative_price_rejected() {
        let err = validate(&[Article::new("A", 1, -2.0)]).unwrap_err();
        assert!(matches!(err, SourceError::InvalidArticle { code, .. } if code == "A"));
    }

    #[test]
    fn group_listing_from_file_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let articles = write(
            &dir,
            "articles.json",
            r#"[{"code":"A","available":1,"price":1.0,"group":"X"},{"code":"B","available":1,"price":1.0}]"#,
        );
        let groups = write(&dir, "groups.json", r#"{"X":["A","Z"],"":["B"]}"#);

        let fallback = FileSource::new(&articles);
        assert_eq!(fallback.codes_in(&GroupFilter::Named("X".into())).unwrap(), vec!["A"]);
        assert_eq!(fallback.codes_in(&GroupFilter::Ungrouped).unwrap(), vec!["B"]);

        let listed = FileSource::new(&articles).with_groups(groups);
        assert_eq!(listed.codes_in(&GroupFilter::Named("X".into())).unwrap(), vec!["A", "Z"]);
        assert!(listed.codes_in(&GroupFilter::Named("Q".into())).unwrap().is_empty());
    }

    #[test]
    fn code_list_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let bare = write(&dir, "bare.json", r#"["A","B"]"#);
        let wrapped = write(&dir, "wrapped.json", r#"{"codes":["C"]}"#);
        assert_eq!(read_codes(&bare).unwrap(), vec!["A", "B"]);
        assert_eq!(read_codes(&wrapped).unwrap(), vec!["C"]);
    }
}

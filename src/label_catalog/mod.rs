//! The fixed, ordered list of category names the network's outputs index into.

use crate::error::ClassifierError;
use std::path::Path;

/// Number of classes in ImageNet-1K.
pub const CATALOG_SIZE: usize = 1000;

/// Category names for the ImageNet-1K weights, in class-ID order.
static IMAGENET_CLASSES: &str = include_str!("imagenet_classes.txt");

#[derive(Debug, Clone, PartialEq)]
pub struct LabelCatalog {
    labels: Vec<String>,
}

impl LabelCatalog {
    pub fn imagenet() -> Result<Self, ClassifierError> {
        Self::parse(IMAGENET_CLASSES)
    }

    /// Parses one label per line. The list must have exactly [`CATALOG_SIZE`] entries.
    pub fn parse(content: &str) -> Result<Self, ClassifierError> {
        let labels: Vec<String> = content.lines().map(|line| line.trim().to_string()).collect();

        if let Some(blank) = labels.iter().position(|label| label.is_empty()) {
            return Err(ClassifierError::Catalog {
                message: format!("blank label on line {}", blank + 1),
            });
        }

        if labels.len() != CATALOG_SIZE {
            return Err(ClassifierError::Catalog {
                message: format!(
                    "expected {} labels, found {}",
                    CATALOG_SIZE,
                    labels.len()
                ),
            });
        }

        Ok(Self { labels })
    }

    pub fn from_path(path: &Path) -> Result<Self, ClassifierError> {
        let content = std::fs::read_to_string(path).map_err(|e| ClassifierError::Catalog {
            message: format!("failed to read '{}': {}", path.display(), e),
        })?;
        Self::parse(&content)
    }

    /// Name of class `index`. Indices come from the network's own output
    /// range, so anything outside `0..len()` is a caller bug and panics.
    pub fn label(&self, index: usize) -> &str {
        &self.labels[index]
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_imagenet_has_every_class() {
        let catalog = LabelCatalog::imagenet().unwrap();

        assert_eq!(catalog.len(), CATALOG_SIZE);
        assert_eq!(catalog.label(0), "tench");
        assert_eq!(catalog.label(207), "golden retriever");
        assert_eq!(catalog.label(281), "tabby");
        assert_eq!(catalog.label(954), "banana");
        assert_eq!(catalog.label(999), "toilet tissue");
    }

    #[test]
    fn test_get_out_of_range() {
        let catalog = LabelCatalog::imagenet().unwrap();

        assert_eq!(catalog.get(999), Some("toilet tissue"));
        assert_eq!(catalog.get(1000), None);
    }

    #[test]
    #[should_panic]
    fn test_label_out_of_range_panics() {
        let catalog = LabelCatalog::imagenet().unwrap();
        catalog.label(CATALOG_SIZE);
    }

    #[test]
    fn test_parse_rejects_partial_list() {
        let result = LabelCatalog::parse("tench\ngoldfish\ngreat white shark\n");

        match result {
            Err(ClassifierError::Catalog { message }) => {
                assert_eq!(message, "expected 1000 labels, found 3");
            }
            other => panic!("expected catalog error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_blank_line() {
        let mut content: Vec<String> = (0..CATALOG_SIZE).map(|i| format!("class {i}")).collect();
        content[10] = String::new();

        let result = LabelCatalog::parse(&content.join("\n"));

        assert!(matches!(result, Err(ClassifierError::Catalog { .. })));
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = LabelCatalog::from_path(Path::new("/nonexistent/labels.txt"));

        assert!(matches!(result, Err(ClassifierError::Catalog { .. })));
    }

    #[test]
    fn test_parse_accepts_crlf() {
        let content: Vec<String> = (0..CATALOG_SIZE).map(|i| format!("class {i}")).collect();

        let catalog = LabelCatalog::parse(&content.join("\r\n")).unwrap();

        assert_eq!(catalog.label(1), "class 1");
        assert_eq!(catalog.iter().count(), CATALOG_SIZE);
    }
}

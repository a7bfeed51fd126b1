//! OpenSearch index configuration and mappings.
//!
//! This module defines the index settings and mappings for the image search index.

use serde_json::{json, Value};

/// The default name of the search index.
pub const DEFAULT_INDEX_NAME: &str = "openledger";

/// Target index name plus the settings it is created with.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexConfig {
    /// Index (or alias) the documents are written to.
    pub name: String,
    pub number_of_shards: u32,
    pub number_of_replicas: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_NAME)
    }
}

impl IndexConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number_of_shards: 1,
            number_of_replicas: 1,
        }
    }

    /// Body for the create-index call: settings and mappings.
    pub fn index_settings(&self) -> Value {
        json!({
            "settings": {
                "number_of_shards": self.number_of_shards,
                "number_of_replicas": self.number_of_replicas
            },
            "mappings": get_mappings()
        })
    }
}

/// Get the mappings for the image search index.
///
/// The configuration includes:
/// - **text**: Analysed fields for full-text search over titles, creators and tags
/// - **Keyword fields**: For filtering by provider, source and license
/// - **Non-indexed keywords**: URLs that are only returned, never searched
pub fn get_mappings() -> Value {
    json!({
        "properties": {
            "identifier": {
                "type": "keyword"
            },
            "title": {
                "type": "text",
                "fields": {
                    "raw": {
                        "type": "keyword"
                    }
                }
            },
            "creator": {
                "type": "text",
                "fields": {
                    "raw": {
                        "type": "keyword"
                    }
                }
            },
            "creator_url": {
                "type": "keyword",
                "index": false
            },
            "tags_list": {
                "type": "text",
                "fields": {
                    "raw": {
                        "type": "keyword"
                    }
                }
            },
            "url": {
                "type": "keyword",
                "index": false
            },
            "thumbnail": {
                "type": "keyword",
                "index": false
            },
            "foreign_landing_url": {
                "type": "keyword",
                "index": false
            },
            "provider": {
                "type": "keyword"
            },
            "source": {
                "type": "keyword"
            },
            "license": {
                "type": "keyword"
            },
            "license_version": {
                "type": "keyword"
            },
            "created_on": {
                "type": "date"
            },
            "last_synced_with_source": {
                "type": "date"
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_settings_structure() {
        let settings = IndexConfig::default().index_settings();

        // Check settings exist
        assert!(settings["settings"]["number_of_shards"].is_number());
        assert!(settings["settings"]["number_of_replicas"].is_number());

        // Check mappings exist
        assert!(settings["mappings"]["properties"]["identifier"].is_object());
        assert!(settings["mappings"]["properties"]["title"].is_object());

        assert_eq!(settings["mappings"]["properties"]["identifier"]["type"], "keyword");
        assert_eq!(settings["mappings"]["properties"]["title"]["type"], "text");
        assert_eq!(settings["mappings"]["properties"]["url"]["index"], false);
    }

    #[test]
    fn test_index_name() {
        assert_eq!(IndexConfig::default().name, "openledger");
        assert_eq!(IndexConfig::new("testing").name, "testing");
    }
}

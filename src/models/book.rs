use serde::{Deserialize, Serialize};

/// A book record returned to the client, flattened from the Google Books
/// volume schema
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub preview_link: Option<String>,
}

/// Raw Google Books volume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volume {
    pub id: String,
    #[serde(rename = "volumeInfo", default)]
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "imageLinks", default)]
    pub image_links: Option<ImageLinks>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(rename = "previewLink", default)]
    pub preview_link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageLinks {
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// One page of a Google Books volumes response
///
/// The API omits `items` entirely when a query matches nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumesPage {
    #[serde(rename = "totalItems", default)]
    pub total_items: u64,
    #[serde(default)]
    pub items: Vec<Volume>,
}

impl From<Volume> for Book {
    fn from(volume: Volume) -> Self {
        let info = volume.volume_info;
        Book {
            id: volume.id,
            title: info.title,
            authors: info.authors,
            description: info.description,
            thumbnail: info.image_links.and_then(|links| links.thumbnail),
            categories: info.categories,
            preview_link: info.preview_link,
        }
    }
}

/// Book search criteria: any subset of authors, title and genre.
///
/// An all-empty criteria set never triggers a network call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookCriteria {
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub genre: String,
}

impl BookCriteria {
    /// Author names with blanks removed, in input order
    pub fn author_names(&self) -> Vec<&str> {
        self.authors
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .collect()
    }

    pub fn has_authors(&self) -> bool {
        !self.author_names().is_empty()
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    pub fn has_genre(&self) -> bool {
        !self.genre.trim().is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_authors() && !self.has_title() && !self.has_genre()
    }
}

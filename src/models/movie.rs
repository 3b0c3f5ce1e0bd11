use serde::{Deserialize, Serialize};

/// A movie record as returned by the TMDB API
///
/// Pass-through of the upstream schema: fields the UI renders plus the
/// `genre_ids` tag set the composer filters on. Not independently validated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub popularity: Option<f64>,
}

/// One page of a TMDB discover/search response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoviePage {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<Movie>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

fn default_page() -> u32 {
    1
}

/// A person record from TMDB person search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonPage {
    #[serde(default)]
    pub results: Vec<Person>,
}

/// Cast listing for a single movie, from the credits endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// Movie search criteria: any subset of genres, title and actor.
///
/// An all-empty criteria set never triggers a network call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieCriteria {
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub actor: String,
}

impl MovieCriteria {
    pub fn has_genres(&self) -> bool {
        !self.genres.is_empty()
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    pub fn has_actor(&self) -> bool {
        !self.actor.trim().is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_genres() && !self.has_title() && !self.has_actor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criteria_emptiness() {
        let empty = MovieCriteria::default();
        assert!(empty.is_empty());

        let blank_title = MovieCriteria {
            title: "   ".to_string(),
            ..Default::default()
        };
        assert!(blank_title.is_empty());

        let with_genre = MovieCriteria {
            genres: vec!["accion".to_string()],
            ..Default::default()
        };
        assert!(!with_genre.is_empty());
    }

    #[test]
    fn movie_deserializes_with_missing_optional_fields() {
        let json = r#"{"id": 603, "title": "The Matrix"}"#;
        let movie: Movie = serde_json::from_str(json).unwrap();
        assert_eq!(movie.id, 603);
        assert_eq!(movie.title, "The Matrix");
        assert!(movie.genre_ids.is_empty());
        assert!(movie.overview.is_none());
    }
}

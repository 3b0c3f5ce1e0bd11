use unidecode::unidecode;

/// Normalizes a genre/subject token for table lookup: strips diacritics,
/// lowercases and trims. `"Acción "` and `"accion"` compare equal.
pub fn normalize(s: &str) -> String {
    unidecode(s).to_lowercase().trim().to_string()
}

/// Bilingual (es/en) genre name to TMDB numeric genre id
fn movie_genre_id(name: &str) -> Option<u64> {
    let id = match name {
        "accion" | "action" => 28,
        "animacion" | "animation" => 16,
        "comedia" | "comedy" => 35,
        "crimen" | "crime" => 80,
        "documental" | "documentary" => 99,
        "drama" => 18,
        "fantasia" | "fantasy" => 14,
        "horror" | "terror" => 27,
        "romance" => 10749,
        "ciencia ficcion" | "scifi" | "science fiction" => 878,
        "aventura" | "adventure" => 12,
        "thriller" => 53,
        "western" => 37,
        "guerra" | "war" => 10752,
        "musical" => 10402,
        "misterio" | "mystery" => 9648,
        "historia" | "history" => 36,
        "familia" | "family" => 10751,
        _ => return None,
    };
    Some(id)
}

/// Resolves free-text genre tokens to TMDB genre ids.
///
/// All-digit tokens are taken as ids directly, bypassing the name table.
/// Unknown names are silently dropped; an unmapped genre is "no applicable
/// filter", not an error.
pub fn movie_genre_ids(tokens: &[String]) -> Vec<u64> {
    tokens
        .iter()
        .filter_map(|token| {
            let trimmed = token.trim();
            if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
                trimmed.parse().ok()
            } else {
                movie_genre_id(&normalize(trimmed))
            }
        })
        .collect()
}

/// Maps a free-text book genre to the canonical English subject term used in
/// Google Books `subject:` clauses.
///
/// Unknown values pass through normalized, as a literal subject term; whether
/// they match anything is up to the upstream index.
pub fn canonical_subject(genre: &str) -> String {
    let normalized = normalize(genre);
    let canonical = match normalized.as_str() {
        "terror" => "horror",
        "ciencia ficcion" | "scifi" => "science fiction",
        "fantasia" => "fantasy",
        "misterio" => "mystery",
        "historia" => "history",
        "aventura" => "adventure",
        "poesia" => "poetry",
        "biografia" => "biography",
        "comedia" | "humor" => "humor",
        "infantil" => "juvenile fiction",
        "suspense" => "thriller",
        "policiaca" | "policiaco" => "crime",
        other => other,
    };
    canonical.to_string()
}

pub mod book;
pub mod history;
pub mod movie;

pub use book::{Book, BookCriteria, Volume, VolumeInfo, VolumesPage};
pub use history::{SearchHistoryEntry, SearchKind};
pub use movie::{CastMember, Credits, Movie, MovieCriteria, MoviePage, Person, PersonPage};

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::ids::{CreditId, GenreId, MovieId, PersonId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub original_name: Option<String>,
    pub gender: i32,
    pub adult: bool,
    pub known_for_department: Option<String>,
    pub popularity: f64,
    pub profile_path: Option<String>,
    pub also_known_as: Vec<String>,
    pub biography: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub deathday: Option<NaiveDate>,
    pub homepage: Option<String>,
    pub place_of_birth: Option<String>,
}

/// Whether a credit is an acting role or a crew job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreditKind {
    Cast,
    Crew,
}

impl CreditKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CreditKind::Cast => "cast",
            CreditKind::Crew => "crew",
        }
    }
}

impl fmt::Display for CreditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreditKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "cast" => Ok(CreditKind::Cast),
            "crew" => Ok(CreditKind::Crew),
            other => Err(format!("unknown credit type '{other}'")),
        }
    }
}

/// Role record linking one person to one movie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credit {
    pub id: CreditId,
    pub movie_id: MovieId,
    pub person_id: PersonId,
    pub kind: CreditKind,
    pub department: String,
    pub job: String,
    pub character: Option<String>,
    /// Zero-based position of the entry in its source list (cast or crew).
    pub order: i32,
}

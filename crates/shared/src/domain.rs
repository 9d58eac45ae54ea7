use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ParseEnumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geo {
    pub lat: String,
    pub lng: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    pub geo: Geo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    pub catch_phrase: String,
    pub bs: String,
}

/// A directory entry as served by the remote endpoint and persisted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub address: Address,
    pub company: Company,
}

/// The editable part of a [`UserRecord`]; the store assigns the id on create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub address: Address,
    pub company: Company,
}

impl NewUser {
    pub fn into_record(self, id: UserId) -> UserRecord {
        UserRecord {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            website: self.website,
            address: self.address,
            company: self.company,
        }
    }
}

impl UserRecord {
    pub fn fields(&self) -> NewUser {
        NewUser {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            website: self.website.clone(),
            address: self.address.clone(),
            company: self.company.clone(),
        }
    }

    pub fn with_fields(id: UserId, fields: NewUser) -> Self {
        fields.into_record(id)
    }

    pub fn sort_value(&self, key: SortKey) -> &str {
        match key {
            SortKey::Name => &self.name,
            SortKey::Email => &self.email,
            SortKey::Company => &self.company.name,
        }
    }

    pub fn search_value(&self, field: SearchField) -> &str {
        match field {
            SearchField::Name => &self.name,
            SearchField::Email => &self.email,
            SearchField::CompanyName => &self.company.name,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    Email,
    Company,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Email => "email",
            SortKey::Company => "company",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "email" => Ok(SortKey::Email),
            "company" => Ok(SortKey::Company),
            _ => Err(ParseEnumError::new("sort key", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(ParseEnumError::new("sort direction", s)),
        }
    }
}

/// A record attribute that participates in free-text search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Name,
    Email,
    CompanyName,
}

impl SearchField {
    pub const DEFAULT: [SearchField; 2] = [SearchField::Name, SearchField::Email];

    pub fn as_str(self) -> &'static str {
        match self {
            SearchField::Name => "name",
            SearchField::Email => "email",
            SearchField::CompanyName => "company",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SearchField::Name),
            "email" => Ok(SearchField::Email),
            "company" | "company_name" => Ok(SearchField::CompanyName),
            _ => Err(ParseEnumError::new("search field", s)),
        }
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;

//! Paged person listing with substring filter and single-key sort.
//!
//! # Responsibility
//! - Parse caller sort specs into a closed set of sortable columns.
//! - Count filtered rows and return one page with eager-loaded phones.
//!
//! # Invariants
//! - Filter is a case-sensitive substring match over name, address and
//!   email address; an empty filter matches every person.
//! - Ordering is total: ties on the sort key fall back to `id ASC`.
//! - `total_count` is computed before pagination.

use crate::model::person::Person;
use crate::repo::rows::{load_phone_numbers_for, parse_person_row, PERSON_SELECT_SQL};
use crate::repo::{RepoError, RepoResult};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Transaction, TransactionBehavior};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 1000;

static SORT_SPEC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z_]+)(?:\s+([A-Za-z]+))?\s*$").expect("valid sort spec regex")
});

const FILTER_SQL: &str = " WHERE (?1 IS NULL
    OR instr(name, ?1) > 0
    OR instr(COALESCE(address, ''), ?1) > 0
    OR instr(COALESCE(email_address, ''), ?1) > 0)";

/// Sortable person column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    EmailAddress,
    Address,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::EmailAddress => "email_address",
            Self::Address => "address",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }

    /// Resolves `Name`, `emailAddress`, `email_address` and friends.
    fn from_name(value: &str) -> Option<Self> {
        let normalized = value.replace('_', "").to_ascii_lowercase();
        match normalized.as_str() {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "emailaddress" => Some(Self::EmailAddress),
            "address" => Some(Self::Address),
            "createdat" => Some(Self::CreatedAt),
            "updatedat" => Some(Self::UpdatedAt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Single-key sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::Id,
            direction: SortDirection::Asc,
        }
    }
}

impl Display for SortSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}",
            self.field.column(),
            self.direction.keyword().to_ascii_lowercase()
        )
    }
}

impl FromStr for SortSpec {
    type Err = RepoError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_sort_spec(value)
    }
}

/// Parses `"<field> [asc|desc]"`. Blank input selects `id asc`.
pub fn parse_sort_spec(value: &str) -> RepoResult<SortSpec> {
    if value.trim().is_empty() {
        return Ok(SortSpec::default());
    }

    let captures = SORT_SPEC_RE
        .captures(value)
        .ok_or_else(|| RepoError::InvalidArgument(format!("malformed sort spec `{value}`")))?;

    let field_name = &captures[1];
    let field = SortField::from_name(field_name).ok_or_else(|| {
        RepoError::InvalidArgument(format!("unknown sort field `{field_name}`"))
    })?;

    let direction = match captures.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        None => SortDirection::Asc,
        Some(keyword) if keyword == "asc" => SortDirection::Asc,
        Some(keyword) if keyword == "desc" => SortDirection::Desc,
        Some(keyword) => {
            return Err(RepoError::InvalidArgument(format!(
                "unknown sort direction `{keyword}`"
            )));
        }
    };

    Ok(SortSpec { field, direction })
}

/// Page size bounds applied to caller requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl PageLimits {
    /// `0` selects the default; values above the maximum are clamped.
    pub fn normalize(self, requested: u32) -> u32 {
        match requested {
            0 => self.default_page_size.min(self.max_page_size),
            value if value > self.max_page_size => self.max_page_size,
            value => value,
        }
    }
}

/// Normalized paged query over persons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonPageQuery {
    /// `None` or empty matches all persons.
    pub filter: Option<String>,
    pub sort: SortSpec,
    /// Zero-based.
    pub page_index: u32,
    /// Already normalized; always at least 1.
    pub page_size: u32,
}

impl PersonPageQuery {
    pub fn offset(&self) -> u64 {
        u64::from(self.page_index) * u64::from(self.page_size)
    }

    fn effective_filter(&self) -> Option<&str> {
        self.filter.as_deref().filter(|value| !value.is_empty())
    }
}

/// One page of persons plus the pre-pagination match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonPage {
    pub total_count: u64,
    /// Persons with their phone collections loaded.
    pub persons: Vec<Person>,
}

/// Runs one paged query.
///
/// Count and page are read inside one deferred transaction so both
/// observe the same snapshot.
pub fn query_persons_paged(conn: &Connection, query: &PersonPageQuery) -> RepoResult<PersonPage> {
    if query.page_size == 0 {
        return Err(RepoError::InvalidArgument(
            "page size must be at least 1".to_string(),
        ));
    }

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Deferred)?;
    let filter = query
        .effective_filter()
        .map(|value| Value::Text(value.to_string()))
        .unwrap_or(Value::Null);

    let total: i64 = tx.query_row(
        &format!("SELECT COUNT(*) FROM persons{FILTER_SQL};"),
        [filter.clone()],
        |row| row.get(0),
    )?;
    let total_count = u64::try_from(total)
        .map_err(|_| RepoError::InvalidData(format!("negative person count `{total}`")))?;

    let mut sql = format!("{PERSON_SELECT_SQL}{FILTER_SQL}");
    sql.push_str(&format!(
        " ORDER BY {} {}",
        query.sort.field.column(),
        query.sort.direction.keyword()
    ));
    if query.sort.field != SortField::Id {
        sql.push_str(", id ASC");
    }
    sql.push_str(" LIMIT ?2 OFFSET ?3;");

    let offset = i64::try_from(query.offset())
        .map_err(|_| RepoError::InvalidArgument("page offset out of range".to_string()))?;
    let bind_values = vec![
        filter,
        Value::Integer(i64::from(query.page_size)),
        Value::Integer(offset),
    ];

    let mut persons = Vec::new();
    {
        let mut stmt = tx.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        while let Some(row) = rows.next()? {
            persons.push(parse_person_row(row)?);
        }
    }

    let ids = persons.iter().map(|person| person.id).collect::<Vec<_>>();
    let mut phones = load_phone_numbers_for(&tx, &ids)?;
    for person in &mut persons {
        person.phone_numbers = Some(phones.remove(&person.id).unwrap_or_default());
    }

    tx.commit()?;
    Ok(PersonPage {
        total_count,
        persons,
    })
}

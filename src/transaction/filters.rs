//! Translates the query parameters of the transaction list into SQL predicates.

use rusqlite::types::Value;
use serde::Serialize;
use time::{Date, Duration, Month};

use crate::{
    date_input::parse_filter_date,
    reference::EntityId,
    search::{any_column_like, like_pattern, search_terms},
};

/// The query parameters of the transaction list page.
///
/// Every field is kept as text so that unknown or malformed values can be
/// ignored instead of rejecting the request. The query is collected from the
/// raw key/value pairs, so a repeated key keeps its last value.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionListQuery {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub amount: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub date_range: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub start_date: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub end_date: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub type_: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subcategory: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub q: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub o: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
}

impl FromIterator<(String, String)> for TransactionListQuery {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(params: I) -> Self {
        let mut query = Self::default();

        for (key, value) in params {
            let field = match key.as_str() {
                "amount" => &mut query.amount,
                "date_range" => &mut query.date_range,
                "start_date" => &mut query.start_date,
                "end_date" => &mut query.end_date,
                "status" => &mut query.status,
                "type" => &mut query.type_,
                "category" => &mut query.category,
                "subcategory" => &mut query.subcategory,
                "q" => &mut query.q,
                "o" => &mut query.o,
                "page" => {
                    query.page = Some(value);
                    continue;
                }
                _ => continue,
            };

            *field = value;
        }

        query
    }
}

/// The amount buckets of the list filter, in roubles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountBucket {
    /// Less than 1 000.
    Small,
    /// From 1 000 to 10 000 inclusive.
    Medium,
    /// More than 10 000.
    Large,
}

impl AmountBucket {
    /// Every bucket with its query value and label, in display order.
    pub const ALL: [(AmountBucket, &'static str, &'static str); 3] = [
        (AmountBucket::Small, "small", "Small (< 1 000 ₽)"),
        (AmountBucket::Medium, "medium", "Medium (1 000 - 10 000 ₽)"),
        (AmountBucket::Large, "large", "Large (> 10 000 ₽)"),
    ];

    /// Parse the `amount` query value. Unknown values give `None`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .find(|(_, query_value, _)| *query_value == value.trim())
            .map(|(bucket, _, _)| *bucket)
    }

    /// The predicate on the amount column, which holds kopecks.
    fn predicate(self, column: &str) -> String {
        match self {
            AmountBucket::Small => format!("{column} < 100000"),
            AmountBucket::Medium => format!("{column} BETWEEN 100000 AND 1000000"),
            AmountBucket::Large => format!("{column} > 1000000"),
        }
    }
}

/// The date filter of the transaction list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRangeFilter {
    Today,
    /// The last seven days and today.
    Past7Days,
    /// The calendar month containing today.
    ThisMonth,
    /// The calendar year containing today.
    ThisYear,
    /// Either bound may be missing.
    Custom {
        start: Option<Date>,
        end: Option<Date>,
    },
}

impl DateRangeFilter {
    /// The presets with their query value and label, in display order.
    pub const PRESETS: [(&'static str, &'static str); 5] = [
        ("today", "Today"),
        ("past_7_days", "Past 7 days"),
        ("this_month", "This month"),
        ("this_year", "This year"),
        ("custom", "Custom range"),
    ];

    /// Parse the `date_range` query value with the bounds of a custom range.
    ///
    /// Bounds that are not `dd.mm.yyyy` dates are left out.
    pub fn parse(date_range: &str, start_date: &str, end_date: &str) -> Option<Self> {
        match date_range.trim() {
            "today" => Some(Self::Today),
            "past_7_days" => Some(Self::Past7Days),
            "this_month" => Some(Self::ThisMonth),
            "this_year" => Some(Self::ThisYear),
            "custom" => Some(Self::Custom {
                start: parse_filter_date(start_date),
                end: parse_filter_date(end_date),
            }),
            _ => None,
        }
    }

    /// The inclusive bounds of the range relative to `today`.
    pub fn bounds(self, today: Date) -> (Option<Date>, Option<Date>) {
        match self {
            Self::Today => (Some(today), Some(today)),
            Self::Past7Days => (Some(today - Duration::days(7)), Some(today)),
            Self::ThisMonth => (
                today.replace_day(1).ok(),
                last_day_of_month(today.year(), today.month()),
            ),
            Self::ThisYear => (
                Date::from_calendar_date(today.year(), Month::January, 1).ok(),
                Date::from_calendar_date(today.year(), Month::December, 31).ok(),
            ),
            Self::Custom { start, end } => (start, end),
        }
    }
}

fn last_day_of_month(year: i32, month: Month) -> Option<Date> {
    let (next_year, next_month) = match month {
        Month::December => (year + 1, Month::January),
        month => (year, month.next()),
    };

    Date::from_calendar_date(next_year, next_month, 1)
        .ok()?
        .previous_day()
}

/// The ordering of the transaction list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionOrder {
    CreatedAtAscending,
    /// Newest first.
    #[default]
    CreatedAtDescending,
    AmountAscending,
    AmountDescending,
}

impl TransactionOrder {
    /// Parse the `o` query value, falling back to newest first.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "created_at" => Self::CreatedAtAscending,
            "-created_at" => Self::CreatedAtDescending,
            "amount" => Self::AmountAscending,
            "-amount" => Self::AmountDescending,
            _ => Self::default(),
        }
    }

    /// The `o` query value of this ordering.
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::CreatedAtAscending => "created_at",
            Self::CreatedAtDescending => "-created_at",
            Self::AmountAscending => "amount",
            Self::AmountDescending => "-amount",
        }
    }

    /// The `ORDER BY` clause, with ties broken by newest ID first.
    pub(crate) fn order_by_clause(self) -> &'static str {
        match self {
            Self::CreatedAtAscending => "ORDER BY t.created_at ASC, t.id DESC",
            Self::CreatedAtDescending => "ORDER BY t.created_at DESC, t.id DESC",
            Self::AmountAscending => "ORDER BY t.amount ASC, t.id DESC",
            Self::AmountDescending => "ORDER BY t.amount DESC, t.id DESC",
        }
    }
}

/// The validated filters of the transaction list. Unset filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilters {
    pub amount: Option<AmountBucket>,
    pub date_range: Option<DateRangeFilter>,
    pub status_id: Option<EntityId>,
    pub type_id: Option<EntityId>,
    pub category_id: Option<EntityId>,
    pub subcategory_id: Option<EntityId>,
    pub search: String,
}

impl TransactionFilters {
    /// Read the filters from the query parameters, ignoring values that do
    /// not parse.
    pub fn from_query(query: &TransactionListQuery) -> Self {
        let parse_id = |value: &str| value.trim().parse::<EntityId>().ok();

        Self {
            amount: AmountBucket::parse(&query.amount),
            date_range: DateRangeFilter::parse(
                &query.date_range,
                &query.start_date,
                &query.end_date,
            ),
            status_id: parse_id(&query.status),
            type_id: parse_id(&query.type_),
            category_id: parse_id(&query.category),
            subcategory_id: parse_id(&query.subcategory),
            search: query.q.trim().to_owned(),
        }
    }

    /// Build the `WHERE` clause and its numbered parameters.
    ///
    /// The clause refers to the transaction table as `t` and to the joined
    /// `category` and `subcategory` tables by name.
    pub(crate) fn where_clause(&self, today: Date) -> (String, Vec<Value>) {
        let mut predicates = Vec::new();
        let mut params = Vec::new();

        if let Some(bucket) = self.amount {
            predicates.push(bucket.predicate("t.amount"));
        }

        if let Some(date_range) = self.date_range {
            let (start, end) = date_range.bounds(today);

            if let Some(start) = start {
                params.push(Value::Text(start.to_string()));
                predicates.push(format!("t.created_at >= ?{}", params.len()));
            }

            if let Some(end) = end {
                params.push(Value::Text(end.to_string()));
                predicates.push(format!("t.created_at <= ?{}", params.len()));
            }
        }

        for (column, id) in [
            ("t.status_id", self.status_id),
            ("t.type_id", self.type_id),
            ("t.category_id", self.category_id),
            ("t.subcategory_id", self.subcategory_id),
        ] {
            if let Some(id) = id {
                params.push(Value::Integer(id));
                predicates.push(format!("{column} = ?{}", params.len()));
            }
        }

        for term in search_terms(&self.search) {
            params.push(Value::Text(like_pattern(term)));
            predicates.push(any_column_like(
                &[
                    "t.comment",
                    "category.name",
                    "subcategory.name",
                    "printf('%.2f', t.amount / 100.0)",
                ],
                params.len(),
            ));
        }

        if predicates.is_empty() {
            (String::new(), params)
        } else {
            (format!("WHERE {}", predicates.join(" AND ")), params)
        }
    }
}

//! The fixed set of transaction categories.

use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer};

use crate::LedgerError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    FoodAndDrinks,
    Transportation,
    Entertainment,
    Groceries,
    Bills,
    Income,
    Other,
}

impl Category {
    /// Every category, in the order the create form lists them.
    pub const ALL: [Category; 7] = [
        Self::FoodAndDrinks,
        Self::Transportation,
        Self::Entertainment,
        Self::Groceries,
        Self::Bills,
        Self::Income,
        Self::Other,
    ];

    /// Name stored by the remote ledger and shown to users.
    pub fn name(self) -> &'static str {
        match self {
            Self::FoodAndDrinks => "Food & Drinks",
            Self::Transportation => "Transportation",
            Self::Entertainment => "Entertainment",
            Self::Groceries => "Groceries",
            Self::Bills => "Bills",
            Self::Income => "Income",
            Self::Other => "Other",
        }
    }

    /// Short identifier, handy on the command line.
    pub fn id(self) -> &'static str {
        match self {
            Self::FoodAndDrinks => "food",
            Self::Transportation => "transportation",
            Self::Entertainment => "entertainment",
            Self::Groceries => "groceries",
            Self::Bills => "bills",
            Self::Income => "income",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = LedgerError;

    /// Matches either the display name or the short id, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| {
                category.name().eq_ignore_ascii_case(needle)
                    || category.id().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| LedgerError::UnknownCategory(needle.to_string()))
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

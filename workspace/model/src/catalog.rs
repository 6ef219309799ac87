//! Fixed option lists offered by the filter controls.

/// A selectable sort key with its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOption {
    /// Wire form of the key, `-` prefixed for descending.
    pub column: &'static str,
    pub label: &'static str,
}

/// A field the user may add a partial-match filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    pub field: &'static str,
    pub label: &'static str,
}

/// A status code with its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub const SORT_OPTIONS: &[SortOption] = &[
    SortOption { column: "-dateTms", label: "Newest first" },
    SortOption { column: "dateTms", label: "Oldest first" },
    SortOption { column: "codOper", label: "Operation code (A-Z)" },
    SortOption { column: "-codOper", label: "Operation code (Z-A)" },
    SortOption { column: "status", label: "Status (A-Z)" },
    SortOption { column: "-status", label: "Status (Z-A)" },
    SortOption { column: "email", label: "Email (A-Z)" },
    SortOption { column: "-email", label: "Email (Z-A)" },
    SortOption { column: "-amount", label: "Amount, highest first" },
    SortOption { column: "amount", label: "Amount, lowest first" },
];

pub const FILTER_FIELDS: &[FilterField] = &[
    FilterField { field: "codOper", label: "Operation code" },
    FilterField { field: "email", label: "Email" },
    FilterField { field: "cardType", label: "Card type" },
    FilterField { field: "cardholderFullName", label: "Cardholder name" },
    FilterField { field: "merchantName", label: "Merchant name" },
    FilterField { field: "status", label: "Status" },
    FilterField { field: "displayCardNum", label: "Last 4 digits" },
    FilterField { field: "address", label: "Address" },
];

pub const STATUS_OPTIONS: &[StatusOption] = &[
    StatusOption { value: "1", label: "Approved" },
    StatusOption { value: "0", label: "Denied" },
    StatusOption { value: "-1", label: "Pending" },
];

pub const PAGE_SIZE_OPTIONS: &[u32] = &[5, 10, 20, 50];

/// Display label for a filterable field, the raw name when unknown.
pub fn field_label(field: &str) -> &str {
    FILTER_FIELDS
        .iter()
        .find(|option| option.field == field)
        .map_or(field, |option| option.label)
}

/// Display label for a sort key, the raw key when unknown.
pub fn sort_label(column: &str) -> &str {
    SORT_OPTIONS
        .iter()
        .find(|option| option.column == column)
        .map_or(column, |option| option.label)
}

/// Value shown on a filter chip. Status codes are shown by name.
pub fn filter_value_label<'a>(field: &str, value: &'a str) -> &'a str {
    if field == "status" {
        if let Some(option) = STATUS_OPTIONS.iter().find(|option| option.value == value) {
            return option.label;
        }
    }
    value
}

pub fn is_filterable(field: &str) -> bool {
    FILTER_FIELDS.iter().any(|option| option.field == field)
}

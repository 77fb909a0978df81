//! Dataset query parameters and the enumerations the remote service accepts.

use serde::{Deserialize, Deserializer, Serialize};

/// A dataset record as returned by the remote service.
///
/// Records are relayed unchanged, so they stay an opaque JSON object.
pub type DatasetRecord = serde_json::Map<String, serde_json::Value>;

/// Declares a closed set of string values with a fixed wire spelling.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $wire)] $variant),+
        }

        impl $name {
            /// Every accepted value, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire spelling of this value
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }

            /// Wire spellings of every accepted value
            pub fn names() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.as_str()).collect()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .find(|v| v.as_str() == s)
                    .copied()
                    .ok_or_else(|| {
                        format!(
                            "unknown {} '{}', expected one of: {}",
                            $label,
                            s,
                            Self::names().join(", ")
                        )
                    })
            }
        }
    };
}

/// Treat an explicit `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn page_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    Ok(Option::<usize>::deserialize(deserializer)?.unwrap_or(DEFAULT_PAGE))
}

fn page_size_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    Ok(Option::<usize>::deserialize(deserializer)?.unwrap_or(DEFAULT_PAGE_SIZE))
}

wire_enum! {
    /// Property types a dataset may carry
    PropertyType ("property type") {
        AdsorptionEnergy => "adsorption_energy",
        AtomicForces => "atomic_forces",
        AtomizationEnergy => "atomization_energy",
        CauchyStress => "cauchy_stress",
        ElectronicBandGap => "electronic_band_gap",
        Energy => "energy",
        EnergyAboveHull => "energy_above_hull",
        FormationEnergy => "formation_energy",
    }
}

wire_enum! {
    /// Licenses datasets are released under
    License ("license") {
        Apache2 => "APACHE-2.0",
        Bsd3Clause => "BSD-3-CLAUSE",
        CcBy3 => "CC-BY-3.0",
        CcBy4 => "CC-BY-4.0",
        CcByNcNd4 => "CC-BY-NC-ND-4.0",
        CcBySa4 => "CC-BY-SA-4.0",
        Cc0 => "CC0",
        Cc0V1 => "CC0-1.0",
        Gpl2 => "GPL-2.0",
        Gpl2Only => "GPL-2.0-ONLY",
        Gpl3 => "GPL-3.0",
        Gpl3Only => "GPL-3.0-ONLY",
        Lgpl3 => "LGPL-3.0",
        Lgpl3Only => "LGPL-3.0-ONLY",
        Mit => "MIT",
        NistPd => "NIST-PD",
    }
}

wire_enum! {
    /// Fields the remote service can sort datasets by
    SortBy ("sort field") {
        /// Number of configurations
        Nconfigurations => "nconfigurations",
        /// Number of distinct elements
        Nelements => "nelements",
        /// Number of atoms
        Nsites => "nsites",
        /// ColabFit ID
        Id => "id",
        Name => "name",
        Downloads => "downloads",
        DateAdded => "date_added_to_colabfit",
    }
}

wire_enum! {
    /// Sort direction
    SortDirection ("sort direction") {
        Ascending => "ascending",
        Descending => "descending",
    }
}

impl SortBy {
    /// What the field counts or names
    pub fn meaning(&self) -> &'static str {
        match self {
            SortBy::Nconfigurations => "number of configurations",
            SortBy::Nelements => "number of elements",
            SortBy::Nsites => "number of atoms",
            SortBy::Id => "ColabFit ID",
            SortBy::Name => "dataset name",
            SortBy::Downloads => "number of downloads",
            SortBy::DateAdded => "date added to ColabFit",
        }
    }
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Descending
    }
}

/// Filters forwarded to the remote dataset query endpoint.
///
/// Every field is serialized, absent ones as `null`, so the request body
/// always carries the full filter set. Pagination lives in [`Pagination`]
/// and is never sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetFilters {
    /// Dataset name
    #[serde(default)]
    pub name: Option<String>,

    /// Dataset authors
    #[serde(default)]
    pub authors: Option<String>,

    /// Dataset description
    #[serde(default)]
    pub description: Option<String>,

    /// Chemical elements present in the dataset
    #[serde(default)]
    pub elements: Option<Vec<String>>,

    /// Match `elements` as the exact element set instead of a subset
    #[serde(default)]
    pub exact_elements: bool,

    #[serde(default)]
    pub doi: Option<String>,

    /// Configuration count bounds
    #[serde(default)]
    pub min_co: Option<u64>,
    #[serde(default)]
    pub max_co: Option<u64>,

    /// Distinct element count bounds
    #[serde(default)]
    pub min_elements: Option<u64>,
    #[serde(default)]
    pub max_elements: Option<u64>,

    /// Atom count bounds
    #[serde(default)]
    pub min_atoms: Option<u64>,
    #[serde(default)]
    pub max_atoms: Option<u64>,

    #[serde(default)]
    pub property_types: Option<Vec<PropertyType>>,

    #[serde(default)]
    pub license: Option<Vec<License>>,

    /// Restrict to datasets that only contain equilibrium structures
    #[serde(default)]
    pub equilibrium: Option<bool>,

    #[serde(default)]
    pub given_sort_by: Option<SortBy>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub given_sort_direction: SortDirection,

    /// Software used to compute the data, e.g. VASP
    #[serde(default)]
    pub software: Option<Vec<String>>,

    /// Computational methods, e.g. DFT-PBE
    #[serde(default)]
    pub methods_text_filter: Option<Vec<String>>,
}

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page selection applied locally to the full remote result list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page number
    #[serde(default = "default_page", deserialize_with = "page_or_default")]
    pub page: usize,

    #[serde(
        default = "default_page_size",
        deserialize_with = "page_size_or_default"
    )]
    pub page_size: usize,
}

fn default_page() -> usize {
    DEFAULT_PAGE
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    /// Both page and page size must be at least 1
    pub fn is_valid(&self) -> bool {
        self.page >= 1 && self.page_size >= 1
    }

    /// Index of the first record on this page
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Number of pages needed for `total` records
    pub fn total_pages(&self, total: usize) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        total.div_ceil(self.page_size)
    }

    /// Take this page out of the full result list, clipped to its length
    pub fn slice<T>(&self, records: Vec<T>) -> Vec<T> {
        records
            .into_iter()
            .skip(self.offset())
            .take(self.page_size)
            .collect()
    }
}

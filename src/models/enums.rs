use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(AdmissionStatus {
    Active => "Active",
    Discharged => "Discharged",
});

str_enum!(StatusFilter {
    Active => "active",
    Discharged => "discharged",
});

str_enum!(GroupDimension {
    Department => "department",
    Doctor => "doctor",
    AdmissionType => "admission_type",
});

str_enum!(RecentWindow {
    All => "all",
    Today => "today",
    Week => "week",
});

impl Default for RecentWindow {
    fn default() -> Self {
        RecentWindow::All
    }
}

use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
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

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Role {
    Doctor => "doctor",
    Patient => "patient",
});

str_enum!(MealSlot {
    Breakfast => "breakfast",
    Lunch => "lunch",
    Dinner => "dinner",
});

str_enum!(PlanSource {
    Assigned => "assigned",
    Generated => "generated",
});

str_enum!(BmiCategory {
    Underweight => "underweight",
    Normal => "normal",
    Overweight => "overweight",
});

impl MealSlot {
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    /// Suggested time of day shown on the patient dashboard.
    pub fn serving_time(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "8:00 AM",
            MealSlot::Lunch => "1:00 PM",
            MealSlot::Dinner => "7:00 PM",
        }
    }
}

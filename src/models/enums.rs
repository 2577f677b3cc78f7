//! Shared domain enums, stored as lowercase TEXT columns

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Implements Display, FromStr and the SQLx TEXT mapping for a slug enum.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $slug:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $slug),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($slug $(| $alias)* => Ok($name::$variant),)+
                    other => Err(format!("Invalid {} value: {}", stringify!($name), other)),
                }
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: &str = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// DeviceCategory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    Laptop,
    Mobile,
    Tablet,
    Monitor,
    Accessories,
    Storage,
    Ram,
}

text_enum!(DeviceCategory {
    Laptop => "laptop",
    Mobile => "mobile",
    Tablet => "tablet",
    Monitor => "monitor",
    Accessories => "accessories",
    Storage => "storage",
    Ram => "ram",
});

// ---------------------------------------------------------------------------
// DeviceStatus
// ---------------------------------------------------------------------------

/// Inventory status of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Available,
    /// On loan. Older clients call this "inuse".
    #[serde(alias = "inuse")]
    Borrowed,
    Maintenance,
    Updating,
    Storage,
    Discard,
    Transferred,
}

text_enum!(DeviceStatus {
    Available => "available",
    Borrowed => "borrowed" | "inuse",
    Maintenance => "maintenance",
    Updating => "updating",
    Storage => "storage",
    Discard => "discard",
    Transferred => "transferred",
});

// ---------------------------------------------------------------------------
// BorrowStatus
// ---------------------------------------------------------------------------

/// Borrow request lifecycle
///
/// ```text
/// pending ──► approved ──► active ──► returned
///    │            │
///    └────────────┴──► rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BorrowStatus {
    Pending,
    Approved,
    Active,
    Returned,
    Rejected,
}

text_enum!(BorrowStatus {
    Pending => "pending",
    Approved => "approved",
    Active => "active",
    Returned => "returned",
    Rejected => "rejected",
});

impl BorrowStatus {
    /// Statuses that reserve the device for their date range
    pub const RESERVING: [BorrowStatus; 3] =
        [BorrowStatus::Pending, BorrowStatus::Approved, BorrowStatus::Active];

    pub fn is_terminal(&self) -> bool {
        matches!(self, BorrowStatus::Returned | BorrowStatus::Rejected)
    }

    pub fn reserves_device(&self) -> bool {
        Self::RESERVING.contains(self)
    }

    /// Targets reachable from this status in one step
    pub fn allowed_targets(&self) -> &'static [BorrowStatus] {
        match self {
            BorrowStatus::Pending => &[BorrowStatus::Approved, BorrowStatus::Rejected],
            BorrowStatus::Approved => &[BorrowStatus::Active, BorrowStatus::Rejected],
            BorrowStatus::Active => &[BorrowStatus::Returned],
            BorrowStatus::Returned | BorrowStatus::Rejected => &[],
        }
    }

    pub fn can_transition_to(&self, target: BorrowStatus) -> bool {
        self.allowed_targets().contains(&target)
    }
}

// ---------------------------------------------------------------------------
// RenewalStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RenewalStatus {
    Pending,
    Approved,
    Rejected,
}

text_enum!(RenewalStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

// ---------------------------------------------------------------------------
// DeviceCondition
// ---------------------------------------------------------------------------

/// Physical condition reported when a device comes back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCondition {
    Excellent,
    Good,
    Fair,
    Damaged,
}

text_enum!(DeviceCondition {
    Excellent => "excellent",
    Good => "good",
    Fair => "fair",
    Damaged => "damaged",
});

impl DeviceCondition {
    /// Device status after a return in this condition
    pub fn resulting_device_status(&self) -> DeviceStatus {
        match self {
            DeviceCondition::Damaged => DeviceStatus::Maintenance,
            DeviceCondition::Excellent | DeviceCondition::Good | DeviceCondition::Fair => {
                DeviceStatus::Available
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Account role. Ordering follows privilege: user < admin < superuser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Superuser,
}

text_enum!(Role {
    User => "user",
    Admin => "admin",
    Superuser => "superuser",
});

impl Role {
    pub fn is_admin(&self) -> bool {
        *self >= Role::Admin
    }
}

//! Data models for Device Hub

pub mod borrow;
pub mod department;
pub mod device;
pub mod device_return;
pub mod enums;
pub mod renewal;
pub mod user;

// Re-export commonly used types
pub use borrow::{BorrowRequest, BorrowRequestDetails, DateRange};
pub use department::Department;
pub use device::Device;
pub use device_return::ReturnRequest;
pub use enums::{BorrowStatus, DeviceCategory, DeviceCondition, DeviceStatus, RenewalStatus, Role};
pub use renewal::RenewalRequest;
pub use user::{User, UserClaims};

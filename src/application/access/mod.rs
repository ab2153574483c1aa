//! Access policy: sign-in decisions and the login-hours restriction

pub mod policy;
pub mod time_window;

pub use policy::{check_account_status, role_may_sign_in, AccessPolicyEngine};
pub use time_window::{minute_of_day, window_allows, LoginExemption, TimeWindowPolicy};

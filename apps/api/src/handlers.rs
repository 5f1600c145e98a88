pub mod announcements;
pub mod companies;
pub mod health;
pub mod invites;
pub mod personnel;
pub mod profiles;
pub mod reports;
pub mod tasks;

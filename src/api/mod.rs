pub mod agile;
pub mod dev_status;
pub mod jira;
pub mod pagination;
